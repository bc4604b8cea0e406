use std::{
    sync::mpsc::{self, RecvTimeoutError, Sender},
    thread::{self, JoinHandle},
    time::Duration,
};

use anyhow::anyhow;
use log::{info, warn};

use crate::session::{Session, SessionEventHandler};

/// Plays a session by basic strategy on a worker thread, one engine call per
/// tick, until it is stopped or has played enough rounds.
pub struct AutoPlayer<H: SessionEventHandler + Send + 'static> {
    stop_sender: Sender<()>,
    worker: JoinHandle<Session<H>>,
}

impl<H: SessionEventHandler + Send + 'static> AutoPlayer<H> {
    /// `max_rounds` of 0 plays until stopped or until the session cannot
    /// continue, e.g. when the bankroll is gone.
    pub fn start(mut session: Session<H>, interval: Duration, max_rounds: u64) -> Self {
        let (stop_sender, stop_receiver) = mpsc::channel::<()>();
        let worker = thread::spawn(move || {
            let target = session.rounds_completed() + max_rounds;
            loop {
                if max_rounds > 0 && session.rounds_completed() >= target {
                    info!("auto-play finished after {} rounds", max_rounds);
                    break;
                }
                if let Err(err) = session.step() {
                    warn!("auto-play stopped: {}", err);
                    break;
                }
                match stop_receiver.recv_timeout(interval) {
                    Err(RecvTimeoutError::Timeout) => {}
                    Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
                }
            }
            session
        });
        AutoPlayer {
            stop_sender,
            worker,
        }
    }

    pub fn is_finished(&self) -> bool {
        self.worker.is_finished()
    }

    /// Stops between two engine calls and hands the session back.
    pub fn stop(self) -> anyhow::Result<Session<H>> {
        // The worker may already be gone, which is fine.
        _ = self.stop_sender.send(());
        self.worker
            .join()
            .map_err(|_| anyhow!("auto-play worker panicked"))
    }

    /// Waits until the worker ends on its own.
    pub fn wait(self) -> anyhow::Result<Session<H>> {
        let AutoPlayer {
            stop_sender,
            worker,
        } = self;
        let session = worker
            .join()
            .map_err(|_| anyhow!("auto-play worker panicked"));
        drop(stop_sender);
        session
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{session::NoopHandler, Config, ConfigSimulator};
    use bjtrainer::simulation::GamePhase;
    use std::time::Instant;

    fn get_typical_config() -> Config {
        let mut config = Config {
            simulator: ConfigSimulator {
                seed: Some(5),
                ..Default::default()
            },
            ..Default::default()
        };
        config.betting.default_bankroll = 100_000.0;
        config
    }

    #[test]
    fn plays_the_requested_rounds() {
        let session = Session::new(&get_typical_config(), NoopHandler).unwrap();
        let player = AutoPlayer::start(session, Duration::ZERO, 25);
        let session = player.wait().unwrap();
        assert_eq!(session.rounds_completed(), 25);
        assert!(session.round().is_settled());
        assert_eq!(session.round().statistics().hands_played, 25);
    }

    #[test]
    fn stop_returns_the_session_between_calls() {
        let session = Session::new(&get_typical_config(), NoopHandler).unwrap();
        let started = Instant::now();
        let player = AutoPlayer::start(session, Duration::from_secs(3600), 0);
        let session = player.stop().unwrap();
        assert!(started.elapsed() < Duration::from_secs(60));
        // Exactly one call was made: the first deal.
        assert_eq!(session.round().statistics().hands_played, 1);
        assert_ne!(session.round().phase(), GamePhase::Betting);
    }
}
