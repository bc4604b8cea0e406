pub mod betting;
pub mod counting;
mod error;
pub mod ev;
pub mod simulation;
pub mod strategy;

use serde::{Deserialize, Serialize};
use serde_enum_str::{Deserialize_enum_str, Serialize_enum_str};

pub use error::EngineError;

/// Table rules consumed by the shoe, the round and the strategy engine.
/// Build one, call [`Rule::validate`], then hand it to the constructors.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Rule {
    pub number_of_decks: u8,
    /// Fraction of the shoe configured as penetration, in [0.5, 0.9].
    pub penetration: f64,
    pub burn_card: bool,
    pub dealer_stand_value: u8,
    #[serde(alias = "dealer_stand_on_soft_17")]
    pub dealer_stand_on_soft17: bool,
    /// Winnings per unit bet on a natural, e.g. 1.5 for 3:2.
    pub blackjack_payout: f64,
    pub double_after_split: bool,
    /// When false, doubling is limited to totals of 10 and 11.
    pub double_on_any_two: bool,
    pub split_aces_one_card: bool,
    /// Hands created by splitting, 0 disables splitting.
    pub max_splits: u8,
}

impl Default for Rule {
    fn default() -> Self {
        Rule {
            number_of_decks: 6,
            penetration: 0.67,
            burn_card: true,
            dealer_stand_value: 17,
            dealer_stand_on_soft17: true,
            blackjack_payout: 1.5,
            double_after_split: true,
            double_on_any_two: true,
            split_aces_one_card: true,
            max_splits: 3,
        }
    }
}

impl Rule {
    /// Checks every range constraint and reports all violations at once.
    pub fn validate(&self) -> Result<(), EngineError> {
        let mut errors = Vec::new();
        if !(1..=8).contains(&self.number_of_decks) {
            errors.push(String::from("number_of_decks must be between 1 and 8"));
        }
        if !(0.5..=0.9).contains(&self.penetration) {
            errors.push(String::from("penetration must be between 0.5 and 0.9"));
        }
        if !(12..=21).contains(&self.dealer_stand_value) {
            errors.push(String::from("dealer_stand_value must be between 12 and 21"));
        }
        if !(self.blackjack_payout >= 1.0) {
            errors.push(String::from("blackjack_payout must be at least 1:1"));
        }
        if self.max_splits > 4 {
            errors.push(String::from("max_splits must be between 0 and 4"));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(EngineError::InvalidConfig(errors))
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize_enum_str, Deserialize_enum_str)]
pub enum BettingStrategy {
    #[serde(rename = "flat")]
    Flat,
    #[serde(rename = "spread")]
    Spread,
    #[serde(rename = "kelly")]
    Kelly,
}

/// Betting limits, bankroll and bet-sizing parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BettingConfig {
    pub min_bet: f64,
    pub max_bet: f64,
    pub default_bet: f64,
    pub bet_increment: f64,
    pub default_bankroll: f64,

    pub betting_strategy: BettingStrategy,
    pub spread_min_multiplier: f64,
    pub spread_max_multiplier: f64,
    pub spread_start_count: f64,
    pub kelly_fraction: f64,

    pub base_house_edge: f64,
    pub per_count_advantage: f64,
}

impl Default for BettingConfig {
    fn default() -> Self {
        BettingConfig {
            min_bet: 5.0,
            max_bet: 500.0,
            default_bet: 25.0,
            bet_increment: 5.0,
            default_bankroll: 1000.0,
            betting_strategy: BettingStrategy::Flat,
            spread_min_multiplier: 1.0,
            spread_max_multiplier: 8.0,
            spread_start_count: 1.0,
            kelly_fraction: 0.25,
            base_house_edge: -0.005,
            per_count_advantage: 0.005,
        }
    }
}

impl BettingConfig {
    /// Checks every range constraint and reports all violations at once.
    pub fn validate(&self) -> Result<(), EngineError> {
        let mut errors = Vec::new();
        if !(self.min_bet >= 1.0) {
            errors.push(String::from("min_bet must be at least 1"));
        }
        if !(self.max_bet >= self.min_bet) {
            errors.push(String::from("max_bet must not be less than min_bet"));
        }
        if !(self.default_bet >= self.min_bet && self.default_bet <= self.max_bet) {
            errors.push(String::from("default_bet must lie between min_bet and max_bet"));
        }
        if !(self.bet_increment > 0.0) {
            errors.push(String::from("bet_increment must be positive"));
        }
        if !(self.default_bankroll > 0.0) {
            errors.push(String::from("default_bankroll must be positive"));
        }
        if !(self.spread_min_multiplier >= 1.0) {
            errors.push(String::from("spread_min_multiplier must be at least 1"));
        }
        if !(self.spread_max_multiplier >= self.spread_min_multiplier) {
            errors.push(String::from(
                "spread_max_multiplier must not be less than spread_min_multiplier",
            ));
        }
        if !(self.spread_start_count < 5.0) {
            errors.push(String::from("spread_start_count must be below 5"));
        }
        if !(self.kelly_fraction > 0.0 && self.kelly_fraction <= 1.0) {
            errors.push(String::from("kelly_fraction must be in (0, 1]"));
        }
        if !self.base_house_edge.is_finite() || !self.per_count_advantage.is_finite() {
            errors.push(String::from("edge parameters must be finite"));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(EngineError::InvalidConfig(errors))
        }
    }
}

/// The four things a player can do with a hand.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Decision {
    Hit,
    Stand,
    Double,
    Split,
}

impl Decision {
    pub fn label(&self) -> &'static str {
        match self {
            Decision::Hit => "hit",
            Decision::Stand => "stand",
            Decision::Double => "double",
            Decision::Split => "split",
        }
    }
}

impl std::str::FromStr for Decision {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "hit" | "h" => Ok(Decision::Hit),
            "stand" | "s" => Ok(Decision::Stand),
            "double" | "d" => Ok(Decision::Double),
            "split" | "p" => Ok(Decision::Split),
            other => Err(EngineError::IllegalAction(format!(
                "unknown decision '{}'",
                other
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_rule_is_valid() {
        assert!(Rule::default().validate().is_ok());
        assert!(BettingConfig::default().validate().is_ok());
    }

    #[test]
    fn out_of_range_rule_reports_every_violation() {
        let rule = Rule {
            number_of_decks: 9,
            penetration: 0.95,
            max_splits: 5,
            ..Default::default()
        };
        match rule.validate() {
            Err(EngineError::InvalidConfig(errors)) => assert_eq!(errors.len(), 3),
            other => panic!("unexpected result {:?}", other),
        }
    }

    #[test]
    fn penetration_bounds_are_inclusive() {
        let mut rule = Rule::default();
        rule.penetration = 0.5;
        assert!(rule.validate().is_ok());
        rule.penetration = 0.9;
        assert!(rule.validate().is_ok());
        rule.penetration = 0.49;
        assert!(rule.validate().is_err());
    }

    #[test]
    fn nan_payout_is_rejected() {
        let rule = Rule {
            blackjack_payout: f64::NAN,
            ..Default::default()
        };
        assert!(rule.validate().is_err());
    }

    #[test]
    fn betting_limits_are_checked() {
        let config = BettingConfig {
            min_bet: 10.0,
            max_bet: 5.0,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = BettingConfig {
            default_bet: 1000.0,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = BettingConfig {
            spread_start_count: 5.0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn betting_strategy_parses_from_name() {
        let strategy: BettingStrategy = "kelly".parse().unwrap();
        assert_eq!(strategy, BettingStrategy::Kelly);
        assert!("martingale".parse::<BettingStrategy>().is_err());
    }

    #[test]
    fn decision_parses_loosely() {
        assert_eq!("Hit".parse::<Decision>().unwrap(), Decision::Hit);
        assert_eq!(" double ".parse::<Decision>().unwrap(), Decision::Double);
        assert!("surrender".parse::<Decision>().is_err());
    }
}
