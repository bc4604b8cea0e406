use crate::{ev::EdgeModel, BettingConfig, BettingStrategy};

const SPREAD_TOP_COUNT: f64 = 5.0;
const SPREAD_BANKROLL_CAP: f64 = 0.1;
const KELLY_BANKROLL_CAP: f64 = 0.2;

/// Suggests the next opening bet from the true count.
#[derive(Debug, Clone)]
pub struct BetSizer {
    config: BettingConfig,
    model: EdgeModel,
}

impl BetSizer {
    pub fn new(config: &BettingConfig) -> BetSizer {
        BetSizer {
            config: *config,
            model: EdgeModel::from_config(config),
        }
    }

    pub fn strategy(&self) -> BettingStrategy {
        self.config.betting_strategy
    }

    /// The suggested bet, in whole units for the count-based strategies.
    /// `current_bet` is what the player has staked now; only the text
    /// helpers compare against it.
    pub fn suggest(&self, bankroll: f64, true_count: f64, _current_bet: f64) -> f64 {
        match self.config.betting_strategy {
            BettingStrategy::Flat => self.config.default_bet,
            BettingStrategy::Spread => self.spread(bankroll, true_count),
            BettingStrategy::Kelly => self.kelly(bankroll, true_count),
        }
    }

    fn spread(&self, bankroll: f64, true_count: f64) -> f64 {
        let c = &self.config;
        let start = c.spread_start_count;
        if true_count < start {
            return c.min_bet;
        }
        let range = SPREAD_TOP_COUNT - start;
        let effective = (true_count - start).min(range);
        let multiplier = c.spread_min_multiplier
            + effective / range * (c.spread_max_multiplier - c.spread_min_multiplier);
        (c.min_bet * multiplier)
            .max(c.min_bet)
            .min(c.max_bet)
            .min(bankroll * SPREAD_BANKROLL_CAP)
            .trunc()
    }

    fn kelly(&self, bankroll: f64, true_count: f64) -> f64 {
        let c = &self.config;
        let edge = self.model.player_edge(true_count);
        if edge <= 0.0 {
            return c.min_bet;
        }
        (bankroll * edge * c.kelly_fraction)
            .max(c.min_bet)
            .min(c.max_bet)
            .min(bankroll * KELLY_BANKROLL_CAP)
            .trunc()
    }

    /// True if the suggestion is at least one bet increment away.
    pub fn should_show_suggestion(&self, current_bet: f64, suggested_bet: f64) -> bool {
        (current_bet - suggested_bet).abs() >= self.config.bet_increment
    }

    pub fn describe(&self) -> String {
        let c = &self.config;
        match c.betting_strategy {
            BettingStrategy::Flat => format!("Flat betting ${} every hand", c.default_bet),
            BettingStrategy::Spread => format!(
                "Spread betting {}x-{}x starting at count +{}",
                c.spread_min_multiplier, c.spread_max_multiplier, c.spread_start_count
            ),
            BettingStrategy::Kelly => {
                format!("Kelly Criterion betting ({:.0}% Kelly)", c.kelly_fraction * 100.0)
            }
        }
    }

    /// Empty when the suggestion is too close to the current bet to mention.
    pub fn suggestion_text(&self, current_bet: f64, suggested_bet: f64, true_count: f64) -> String {
        if !self.should_show_suggestion(current_bet, suggested_bet) {
            return String::new();
        }
        match self.config.betting_strategy {
            BettingStrategy::Flat => format!("Flat betting: ${:.0}", suggested_bet),
            BettingStrategy::Spread => {
                format!("Count {:+.1}: Suggest ${:.0}", true_count, suggested_bet)
            }
            BettingStrategy::Kelly => format!("Kelly suggests: ${:.0}", suggested_bet),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sizer(strategy: BettingStrategy) -> BetSizer {
        BetSizer::new(&BettingConfig {
            betting_strategy: strategy,
            ..Default::default()
        })
    }

    #[test]
    fn flat_ignores_the_count() {
        let sizer = sizer(BettingStrategy::Flat);
        for tc in [-4.0, 0.0, 2.5, 8.0] {
            assert_eq!(sizer.suggest(1000.0, tc, 10.0), 25.0);
        }
    }

    #[test]
    fn spread_below_start_is_min_bet() {
        let sizer = sizer(BettingStrategy::Spread);
        assert_eq!(sizer.suggest(1000.0, 0.99, 25.0), 5.0);
        assert_eq!(sizer.suggest(1000.0, -3.0, 25.0), 5.0);
    }

    #[test]
    fn spread_scales_linearly_to_count_five() {
        let sizer = sizer(BettingStrategy::Spread);
        // min 5, multipliers 1x-8x from +1 to +5.
        assert_eq!(sizer.suggest(10_000.0, 1.0, 5.0), 5.0);
        assert_eq!(sizer.suggest(10_000.0, 3.0, 5.0), 22.0);
        assert_eq!(sizer.suggest(10_000.0, 5.0, 5.0), 40.0);
        assert_eq!(sizer.suggest(10_000.0, 9.0, 5.0), 40.0);
    }

    #[test]
    fn spread_is_capped_by_bankroll() {
        let sizer = sizer(BettingStrategy::Spread);
        assert_eq!(sizer.suggest(200.0, 5.0, 5.0), 20.0);
    }

    #[test]
    fn kelly_bets_only_with_an_edge() {
        let sizer = sizer(BettingStrategy::Kelly);
        assert_eq!(sizer.suggest(1000.0, 0.0, 5.0), 5.0);
        assert_eq!(sizer.suggest(1000.0, 1.0, 5.0), 5.0);
        // Edge 1.5% at +4: 10000 * 0.015 * 0.25 = 37.5.
        assert_eq!(sizer.suggest(10_000.0, 4.0, 5.0), 37.0);
        // Capped at 20% of a small bankroll.
        assert_eq!(sizer.suggest(20.0, 4.0, 5.0), 4.0);
    }

    #[test]
    fn suggestion_text_needs_a_real_difference() {
        let spread = sizer(BettingStrategy::Spread);
        assert!(!spread.should_show_suggestion(25.0, 27.0));
        assert!(spread.should_show_suggestion(25.0, 30.0));
        assert_eq!(spread.suggestion_text(25.0, 27.0, 2.0), "");
        assert_eq!(spread.suggestion_text(5.0, 40.0, 5.0), "Count +5.0: Suggest $40");
        assert_eq!(spread.describe(), "Spread betting 1x-8x starting at count +1");
        assert_eq!(
            sizer(BettingStrategy::Kelly).describe(),
            "Kelly Criterion betting (25% Kelly)"
        );
    }
}
