use std::time::Duration;

use bjtrainer::{
    simulation::summary::{RoundSnapshot, Settlement},
    Decision,
};
use bjtrainer_drivers::{
    autoplay::AutoPlayer,
    session::{Session, SessionEventHandler},
    Config,
};
use log::{debug, info};

use self::private::Statistics;

mod private {
    /// Bankroll swings over the whole run.
    #[derive(Debug, Clone, Copy, Default)]
    pub struct Statistics {
        current_money: f64,
        total_bet: f64,
        min_money: f64,
        max_money: f64,
        max_drawdown: f64,
    }

    impl Statistics {
        pub fn new(bankroll: f64) -> Self {
            Statistics {
                current_money: bankroll,
                min_money: bankroll,
                max_money: bankroll,
                ..Default::default()
            }
        }

        pub fn settle(&mut self, wagered: f64, bankroll: f64) {
            self.total_bet += wagered;
            self.current_money = bankroll;
            self.min_money = self.min_money.min(bankroll);
            self.max_money = self.max_money.max(bankroll);
            self.max_drawdown = self.max_drawdown.max(self.max_money - bankroll);
        }

        pub fn get_total_bet(&self) -> f64 {
            self.total_bet
        }

        pub fn get_min_money(&self) -> f64 {
            self.min_money
        }

        pub fn get_max_money(&self) -> f64 {
            self.max_money
        }

        pub fn get_max_drawdown(&self) -> f64 {
            self.max_drawdown
        }

        pub fn get_current_money(&self) -> f64 {
            self.current_money
        }
    }
}

/// Logs every round as it is played.
#[derive(Debug, Clone)]
pub struct Handler {
    round_id: u64,
    decisions: Vec<Vec<String>>,
    stat: Statistics,
}

impl Handler {
    pub fn new(bankroll: f64) -> Self {
        Handler {
            round_id: 0,
            decisions: Vec::new(),
            stat: Statistics::new(bankroll),
        }
    }

    pub fn report(&self) -> String {
        format!(
            "Money: {:.2}. Total bet: {:.2}. Min money: {:.2}. Max money: {:.2}. Max drawdown: {:.2}.",
            self.stat.get_current_money(),
            self.stat.get_total_bet(),
            self.stat.get_min_money(),
            self.stat.get_max_money(),
            self.stat.get_max_drawdown(),
        )
    }
}

impl SessionEventHandler for Handler {
    fn on_shuffle(&mut self) {
        info!("shoe shuffled before round {}", self.round_id + 1);
    }

    fn on_round_begin(&mut self, snapshot: &RoundSnapshot) {
        self.round_id += 1;
        self.decisions.clear();
        debug!(
            "round #{}: bet {:.2}, running count {}, true count {:.2}, {} cards left",
            self.round_id,
            snapshot.hands[0].bet,
            snapshot.running_count,
            snapshot.true_count,
            snapshot.cards_remaining
        );
    }

    fn on_decision(&mut self, decision: Decision, hand_index: usize, _: Decision) {
        while self.decisions.len() <= hand_index {
            self.decisions.push(Vec::new());
        }
        self.decisions[hand_index].push(String::from(decision.label()));
    }

    fn on_settlement(&mut self, settlement: &Settlement, true_count_at_bet: f64) {
        for (hand_index, decisions) in self.decisions.iter().enumerate() {
            debug!("decisions for hand {}: {}", hand_index, decisions.join(" "));
        }
        for result in &settlement.hands {
            debug!(
                "hand {}: {} with {} against {}, {:+.2}",
                result.hand_index,
                result.outcome.label(),
                result.total,
                settlement.dealer_total,
                result.profit
            );
        }
        self.stat.settle(settlement.wagered(), settlement.bankroll);
        info!(
            "round #{} (tc {:+.1}): {}. {}",
            self.round_id,
            true_count_at_bet,
            settlement.summary(),
            self.report()
        );
    }
}

/// Auto-plays `config.simulator.rounds` rounds and returns the session.
pub fn simulate(config: &Config) -> anyhow::Result<Session<Handler>> {
    let handler = Handler::new(config.betting.default_bankroll);
    let session = Session::new(config, handler)?;
    let interval = Duration::from_millis(config.simulator.interval_ms);
    let player = AutoPlayer::start(session, interval, config.simulator.rounds);
    player.wait()
}
