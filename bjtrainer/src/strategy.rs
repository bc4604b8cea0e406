use serde::Serialize;

use crate::{
    simulation::{hand::Hand, Card, Rank, Round},
    Decision, Rule,
};

/// Something that can pick the next move for the active hand of a round.
pub trait Strategy {
    fn decide(&self, round: &Round) -> Option<Decision>;
}

/// A basic strategy chart entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Action {
    Hit,
    Stand,
    /// Double if allowed, otherwise hit.
    DoubleOrHit,
    /// Double if allowed, otherwise stand.
    DoubleOrStand,
    Split,
}

pub fn action_to_category(action: Action) -> Decision {
    match action {
        Action::Hit => Decision::Hit,
        Action::Stand => Decision::Stand,
        Action::DoubleOrHit | Action::DoubleOrStand => Decision::Double,
        Action::Split => Decision::Split,
    }
}

/// How a hand is looked up in the charts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandClass {
    Hard(u8),
    Soft(u8),
    Pair(Rank),
}

impl HandClass {
    pub fn of(hand: &Hand) -> HandClass {
        if hand.can_split() {
            HandClass::Pair(hand.cards()[0].rank)
        } else {
            HandClass::by_total(hand)
        }
    }

    /// Ignores pairs: 5-5 is hard 10 and A-A is soft 12.
    pub fn by_total(hand: &Hand) -> HandClass {
        if hand.is_soft() {
            HandClass::Soft(hand.total())
        } else {
            HandClass::Hard(hand.total())
        }
    }
}

/// Table state the charts cannot see.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoundContext {
    /// The split limit and the bankroll both allow another split.
    pub split_allowed: bool,
}

const H: Action = Action::Hit;
const S: Action = Action::Stand;
const P: Action = Action::Split;
const DH: Action = Action::DoubleOrHit;
const DS: Action = Action::DoubleOrStand;

// Columns: dealer 2, 3, 4, 5, 6, 7, 8, 9, ten-valued, ace.
const HARD_CHART: [[Action; 10]; 17] = [
    [H, H, H, H, H, H, H, H, H, H], // 5
    [H, H, H, H, H, H, H, H, H, H],
    [H, H, H, H, H, H, H, H, H, H],
    [H, H, H, H, H, H, H, H, H, H],
    [H, DH, DH, DH, DH, H, H, H, H, H], // 9
    [DH, DH, DH, DH, DH, DH, DH, DH, H, H],
    [DH, DH, DH, DH, DH, DH, DH, DH, DH, H],
    [H, H, S, S, S, H, H, H, H, H], // 12
    [S, S, S, S, S, H, H, H, H, H],
    [S, S, S, S, S, H, H, H, H, H],
    [S, S, S, S, S, H, H, H, H, H],
    [S, S, S, S, S, H, H, H, H, H], // 16
    [S, S, S, S, S, S, S, S, S, S],
    [S, S, S, S, S, S, S, S, S, S],
    [S, S, S, S, S, S, S, S, S, S],
    [S, S, S, S, S, S, S, S, S, S],
    [S, S, S, S, S, S, S, S, S, S], // 21
];

const SOFT_CHART: [[Action; 10]; 10] = [
    [H, H, H, H, H, H, H, H, H, H], // Ace + Ace, only when not split
    [H, H, H, DH, DH, H, H, H, H, H], // Ace + 2
    [H, H, H, DH, DH, H, H, H, H, H],
    [H, H, DH, DH, DH, H, H, H, H, H],
    [H, H, DH, DH, DH, H, H, H, H, H],
    [H, DH, DH, DH, DH, H, H, H, H, H], // Ace + 6
    [S, DS, DS, DS, DS, S, S, H, H, H],
    [S, S, S, S, S, S, S, S, S, S],
    [S, S, S, S, S, S, S, S, S, S],
    [S, S, S, S, S, S, S, S, S, S], // 21
];

const PAIR_CHART: [[Action; 10]; 10] = [
    [P, P, P, P, P, P, H, H, H, H], // Double 2
    [P, P, P, P, P, P, H, H, H, H],
    [H, H, H, P, P, H, H, H, H, H],
    [DH, DH, DH, DH, DH, DH, DH, DH, H, H], // Double 5, never split
    [P, P, P, P, P, H, H, H, H, H],
    [P, P, P, P, P, P, H, H, H, H],
    [P, P, P, P, P, P, P, P, P, P],
    [P, P, P, P, P, S, P, P, S, S],
    [S, S, S, S, S, S, S, S, S, S], // Ten-valued
    [P, P, P, P, P, P, P, P, P, P], // Double Ace
];

fn column(upcard: Rank) -> usize {
    match upcard.blackjack_value() {
        11 => 9,
        value => (value - 2) as usize,
    }
}

fn pair_row(rank: Rank) -> usize {
    column(rank)
}

fn chart_by_total(total: u8, soft: bool, col: usize) -> Action {
    match total {
        12..=21 if soft => SOFT_CHART[(total - 12) as usize][col],
        0..=4 => Action::Hit,
        5..=21 => HARD_CHART[(total - 5) as usize][col],
        _ => Action::Stand,
    }
}

/// The standard multi-deck chart. Counts are ignored.
#[derive(Debug, Clone)]
pub struct BasicStrategy {
    double_after_split: bool,
}

impl BasicStrategy {
    pub fn new(rule: &Rule) -> BasicStrategy {
        BasicStrategy {
            double_after_split: rule.double_after_split,
        }
    }

    /// The best play for `hand` against `upcard`. A double entry comes back
    /// as a double only when `can_double` is true.
    pub fn optimal_action(
        &self,
        hand: &Hand,
        upcard: &Card,
        can_double: bool,
        can_split: bool,
        context: &RoundContext,
    ) -> Action {
        let col = column(upcard.rank);
        let action = match HandClass::of(hand) {
            HandClass::Pair(rank)
                if can_split && context.split_allowed && self.should_split(rank, col) =>
            {
                Action::Split
            }
            HandClass::Pair(_) => chart_by_total(hand.total(), hand.is_soft(), col),
            HandClass::Soft(total) => chart_by_total(total, true, col),
            HandClass::Hard(total) => chart_by_total(total, false, col),
        };
        match action {
            Action::DoubleOrHit if !can_double => Action::Hit,
            Action::DoubleOrStand if !can_double => Action::Stand,
            action => action,
        }
    }

    fn should_split(&self, rank: Rank, col: usize) -> bool {
        if PAIR_CHART[pair_row(rank)][col] != Action::Split {
            return false;
        }
        if !self.double_after_split {
            match (rank, col) {
                (Rank::Four, 3 | 4) | (Rank::Six, 1) => return false,
                _ => {}
            }
        }
        true
    }
}

impl Strategy for BasicStrategy {
    fn decide(&self, round: &Round) -> Option<Decision> {
        let hand = round.active_hand()?;
        let upcard = round.dealer_upcard()?;
        let action = self.optimal_action(
            hand,
            &upcard,
            round.can_double_active(),
            round.can_split_active(),
            &round.context(),
        );
        Some(action_to_category(action))
    }
}

/// A player decision that did not match the chart.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Deviation {
    pub cards: Vec<Card>,
    pub total: u8,
    pub soft: bool,
    pub dealer_upcard: Card,
    pub player: Decision,
    pub optimal: Decision,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StrategySummary {
    pub total_decisions: u32,
    pub correct_decisions: u32,
    pub adherence_percent: f64,
    pub total_deviations: usize,
    pub recent_deviations: Vec<Deviation>,
}

/// Grades every player decision against basic strategy.
#[derive(Debug, Clone)]
pub struct StrategyTracker {
    strategy: BasicStrategy,
    decisions: u32,
    correct: u32,
    deviations: Vec<Deviation>,
}

impl StrategyTracker {
    pub fn new(rule: &Rule) -> StrategyTracker {
        StrategyTracker {
            strategy: BasicStrategy::new(rule),
            decisions: 0,
            correct: 0,
            deviations: Vec::new(),
        }
    }

    /// Records `player` and returns whether it matched, with the optimal
    /// decision.
    pub fn record(
        &mut self,
        hand: &Hand,
        upcard: &Card,
        player: Decision,
        can_double: bool,
        can_split: bool,
        context: &RoundContext,
    ) -> (bool, Decision) {
        let optimal = action_to_category(
            self.strategy
                .optimal_action(hand, upcard, can_double, can_split, context),
        );
        let correct = player == optimal;
        self.decisions += 1;
        if correct {
            self.correct += 1;
        } else {
            self.deviations.push(Deviation {
                cards: hand.cards().to_vec(),
                total: hand.total(),
                soft: hand.is_soft(),
                dealer_upcard: *upcard,
                player,
                optimal,
            });
        }
        (correct, optimal)
    }

    /// Grades `player` against the active hand of `round`. Must be called
    /// before the decision is applied. None if no decision is pending.
    pub fn record_round(&mut self, round: &Round, player: Decision) -> Option<(bool, Decision)> {
        let hand = round.active_hand()?;
        let upcard = round.dealer_upcard()?;
        Some(self.record(
            hand,
            &upcard,
            player,
            round.can_double_active(),
            round.can_split_active(),
            &round.context(),
        ))
    }

    /// 100 before the first decision.
    pub fn adherence(&self) -> f64 {
        if self.decisions == 0 {
            100.0
        } else {
            self.correct as f64 / self.decisions as f64 * 100.0
        }
    }

    pub fn recent_deviations(&self, count: usize) -> &[Deviation] {
        let start = self.deviations.len().saturating_sub(count);
        &self.deviations[start..]
    }

    pub fn summary(&self) -> StrategySummary {
        StrategySummary {
            total_decisions: self.decisions,
            correct_decisions: self.correct,
            adherence_percent: self.adherence(),
            total_deviations: self.deviations.len(),
            recent_deviations: self.recent_deviations(5).to_vec(),
        }
    }

    pub fn reset(&mut self) {
        self.decisions = 0;
        self.correct = 0;
        self.deviations.clear();
    }
}
