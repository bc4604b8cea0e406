use bjtrainer::{
    betting::BetSizer,
    counting::CountingStats,
    ev::{EdgeModel, EvCalculator},
    simulation::{summary::RoundSnapshot, summary::Settlement, GamePhase, Round},
    strategy::{BasicStrategy, StrategyTracker},
    Decision, EngineError,
};
use log::{debug, info};

use crate::{
    practice::{DifficultyLevel, PracticeSession, PracticeSummary},
    Config,
};

/// Callbacks for everything a session does. All methods do nothing by default.
pub trait SessionEventHandler {
    fn on_shuffle(&mut self) {}
    fn on_round_begin(&mut self, _snapshot: &RoundSnapshot) {}
    fn on_decision(&mut self, _decision: Decision, _hand_index: usize, _optimal: Decision) {}
    fn on_settlement(&mut self, _settlement: &Settlement, _true_count_at_bet: f64) {}
}

/// A handler that ignores every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopHandler;

impl SessionEventHandler for NoopHandler {}

/// What a single call to [`Session::step`] did.
#[derive(Debug, Clone, PartialEq)]
pub enum Step {
    Shuffled,
    Dealt(RoundSnapshot),
    Acted { decision: Decision, hand_index: usize },
    Settled(Settlement),
}

/// The opening bet and the true count it was sized at.
#[derive(Debug, Clone, Copy)]
struct Opening {
    bet: f64,
    true_count: f64,
}

/// One player at one table: the round engine plus everything that grades
/// and sizes the player's play.
pub struct Session<H: SessionEventHandler> {
    round: Round,
    strategy: BasicStrategy,
    tracker: StrategyTracker,
    sizer: BetSizer,
    ev: EvCalculator,
    counting: CountingStats,
    opening: Option<Opening>,
    rounds_completed: u64,
    difficulty: DifficultyLevel,
    practice: PracticeSession,
    handler: H,
}

impl<H: SessionEventHandler> Session<H> {
    pub fn new(config: &Config, handler: H) -> anyhow::Result<Self> {
        config.validate()?;
        let round = Round::new(&config.rule, &config.betting, config.simulator.seed)?;
        Ok(Self::with_round(config, round, handler))
    }

    /// Uses a round prepared by the caller, e.g. one with a stacked shoe.
    pub fn with_round(config: &Config, round: Round, handler: H) -> Self {
        let mut practice = PracticeSession::new();
        practice.start();
        Session {
            round,
            strategy: BasicStrategy::new(&config.rule),
            tracker: StrategyTracker::new(&config.rule),
            sizer: BetSizer::new(&config.betting),
            ev: EvCalculator::new(EdgeModel::from_config(&config.betting)),
            counting: CountingStats::new(),
            opening: None,
            rounds_completed: 0,
            difficulty: DifficultyLevel::new(config.practice.difficulty),
            practice,
            handler,
        }
    }

    /// Makes exactly one engine call: settle a finished round, shuffle a
    /// spent shoe, deal a new round, or play one decision by basic strategy.
    pub fn step(&mut self) -> Result<Step, EngineError> {
        match self.round.phase() {
            GamePhase::Betting | GamePhase::Complete if !self.round.is_settled() => {
                self.settle().map(Step::Settled)
            }
            GamePhase::Betting | GamePhase::Complete if self.round.needs_shuffle() => {
                self.shuffle()?;
                Ok(Step::Shuffled)
            }
            GamePhase::Betting | GamePhase::Complete => {
                let bet = self.suggested_bet()?;
                self.deal(bet).map(Step::Dealt)
            }
            GamePhase::Playing => {
                let decision = self
                    .round
                    .next_optimal_action(&self.strategy)
                    .ok_or_else(|| EngineError::IllegalAction(String::from("no hand to play")))?;
                let hand_index = self.round.active_hand_index();
                self.act(decision)?;
                Ok(Step::Acted {
                    decision,
                    hand_index,
                })
            }
            GamePhase::DealerTurn => Err(EngineError::IllegalAction(String::from(
                "the dealer is still playing",
            ))),
        }
    }

    /// Steps until the current round has been settled.
    pub fn play_round(&mut self) -> Result<Settlement, EngineError> {
        loop {
            if let Step::Settled(settlement) = self.step()? {
                return Ok(settlement);
            }
        }
    }

    /// Next opening bet from the bet sizer, fitted into the table limits and
    /// the bankroll.
    pub fn suggested_bet(&self) -> Result<f64, EngineError> {
        let limits = self.round.limits();
        let bankroll = self.round.bankroll();
        if bankroll < limits.min_bet {
            return Err(EngineError::IllegalAction(format!(
                "bankroll {:.2} is below the minimum bet",
                bankroll
            )));
        }
        let last_bet = self.opening.map_or(limits.default_bet, |o| o.bet);
        let suggested = self
            .sizer
            .suggest(bankroll, self.round.true_count(), last_bet);
        Ok(suggested
            .max(limits.min_bet)
            .min(limits.max_bet)
            .min(bankroll))
    }

    pub fn shuffle(&mut self) -> Result<(), EngineError> {
        self.round.shuffle()?;
        self.handler.on_shuffle();
        Ok(())
    }

    /// Starts a round with a bet chosen by the caller.
    pub fn deal(&mut self, bet: f64) -> Result<RoundSnapshot, EngineError> {
        let true_count = self.round.true_count();
        let snapshot = self.round.start_round(bet)?;
        self.opening = Some(Opening { bet, true_count });
        self.handler.on_round_begin(&snapshot);
        Ok(snapshot)
    }

    /// Grades `decision` against basic strategy, then applies it.
    pub fn act(&mut self, decision: Decision) -> Result<bool, EngineError> {
        let legal = match decision {
            Decision::Double => self.round.can_double_active(),
            Decision::Split => self.round.can_split_active(),
            Decision::Hit | Decision::Stand => self.round.active_hand().is_some(),
        };
        if !legal {
            // The round rejects it without changing anything.
            return self.round.apply(decision);
        }
        let hand_index = self.round.active_hand_index();
        let optimal = self.tracker.record_round(&self.round, decision);
        let can_continue = self.round.apply(decision)?;
        if let Some((correct, optimal)) = optimal {
            self.practice.record_decision(correct);
            if !correct {
                debug!(
                    "{} on hand {}, basic strategy says {}",
                    decision.label(),
                    hand_index,
                    optimal.label()
                );
            }
            self.handler.on_decision(decision, hand_index, optimal);
        }
        Ok(can_continue)
    }

    pub fn settle(&mut self) -> Result<Settlement, EngineError> {
        let settlement = self.round.settle()?;
        let opening = self.opening.unwrap_or(Opening {
            bet: settlement.wagered(),
            true_count: 0.0,
        });
        // Doubles and splits raise the stake the profit was made on.
        self.ev
            .record_hand(settlement.wagered(), opening.true_count, settlement.net);
        self.rounds_completed += 1;
        self.practice.record_hand_played();
        if self.rounds_completed % 100 == 0 {
            info!(
                "{} rounds played, bankroll {:.2}",
                self.rounds_completed, settlement.bankroll
            );
        }
        self.handler.on_settlement(&settlement, opening.true_count);
        Ok(settlement)
    }

    /// Checks the trainee's announced running count against the real one.
    pub fn check_count(&mut self, announced: i32) -> bool {
        self.counting
            .record(self.round.running_count(), announced)
    }

    pub fn round(&self) -> &Round {
        &self.round
    }

    pub fn tracker(&self) -> &StrategyTracker {
        &self.tracker
    }

    pub fn ev(&self) -> &EvCalculator {
        &self.ev
    }

    pub fn bet_sizer(&self) -> &BetSizer {
        &self.sizer
    }

    pub fn counting(&self) -> &CountingStats {
        &self.counting
    }

    pub fn difficulty(&self) -> &DifficultyLevel {
        &self.difficulty
    }

    /// Switches the practice difficulty by name, e.g. "expert".
    pub fn set_difficulty(&mut self, name: &str) -> bool {
        let changed = self.difficulty.set_level(name);
        if changed {
            info!("practice difficulty set to {}", self.difficulty.level().name());
        }
        changed
    }

    /// Restarts the practice clock and its decision counters.
    pub fn start_practice(&mut self) {
        self.practice.start();
    }

    pub fn end_practice(&mut self) {
        self.practice.end();
    }

    pub fn practice(&self) -> &PracticeSession {
        &self.practice
    }

    pub fn practice_summary(&self) -> PracticeSummary {
        self.practice.summary()
    }

    pub fn rounds_completed(&self) -> u64 {
        self.rounds_completed
    }

    pub fn handler(&self) -> &H {
        &self.handler
    }

    pub fn into_handler(self) -> H {
        self.handler
    }

    pub fn reset_statistics(&mut self) {
        self.round.reset_statistics();
        self.tracker.reset();
        self.ev.reset();
        self.counting.reset();
        self.practice.start();
        self.rounds_completed = 0;
    }

    pub fn summary(&self) -> String {
        let stats = self.round.statistics();
        let practice = self.practice.summary();
        format!(
            "Rounds: {}. Hands: {} won, {} lost, {} pushed ({} blackjacks). Win rate: {:.2}%.\n\
             Bankroll: {:.2} ({:+.2}). Average bet: {:.2}.\n\
             Strategy adherence: {:.1}%. Practice: {} decisions, {:.1}% correct, {:.1} hands/min ({}).\n\
             EV: {}",
            self.rounds_completed,
            stats.wins,
            stats.losses,
            stats.pushes,
            stats.blackjacks,
            stats.win_percentage(),
            self.round.bankroll(),
            self.round.profit(),
            stats.average_bet(),
            self.tracker.adherence(),
            practice.total_decisions,
            practice.accuracy_percentage,
            practice.hands_per_minute,
            self.difficulty.level().name(),
            self.ev.session().summary()
        )
    }
}
