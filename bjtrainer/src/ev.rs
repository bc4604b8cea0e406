use log::debug;
use serde::Serialize;

use crate::BettingConfig;

/// Linear player edge in the true count.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct EdgeModel {
    /// Edge at a true count of 0, negative for a house edge.
    pub base_house_edge: f64,
    /// Edge gained per point of true count.
    pub per_count_advantage: f64,
}

impl Default for EdgeModel {
    fn default() -> Self {
        EdgeModel {
            base_house_edge: -0.005,
            per_count_advantage: 0.005,
        }
    }
}

impl EdgeModel {
    pub fn from_config(config: &BettingConfig) -> EdgeModel {
        EdgeModel {
            base_house_edge: config.base_house_edge,
            per_count_advantage: config.per_count_advantage,
        }
    }

    /// As a fraction of the bet.
    pub fn player_edge(&self, true_count: f64) -> f64 {
        self.base_house_edge + true_count * self.per_count_advantage
    }

    pub fn player_edge_percent(&self, true_count: f64) -> f64 {
        self.player_edge(true_count) * 100.0
    }

    pub fn ev(&self, true_count: f64, bet: f64) -> f64 {
        bet * self.player_edge(true_count)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct SessionStats {
    pub hands_played: u32,
    pub total_wagered: f64,
    pub expected: f64,
    pub actual: f64,
}

impl SessionStats {
    pub fn add_hand(&mut self, bet: f64, expected: f64, actual: f64) {
        self.hands_played += 1;
        self.total_wagered += bet;
        self.expected += expected;
        self.actual += actual;
    }

    pub fn expected_ev_percent(&self) -> f64 {
        if self.total_wagered == 0.0 {
            0.0
        } else {
            self.expected / self.total_wagered * 100.0
        }
    }

    pub fn actual_ev_percent(&self) -> f64 {
        if self.total_wagered == 0.0 {
            0.0
        } else {
            self.actual / self.total_wagered * 100.0
        }
    }

    /// How far the results ran above (positive) or below expectation.
    pub fn variance(&self) -> f64 {
        self.actual - self.expected
    }

    pub fn summary(&self) -> String {
        format!(
            "{} hands, {:.2} wagered, expected {:+.2} ({:+.2}%), actual {:+.2} ({:+.2}%), variance {:+.2}",
            self.hands_played,
            self.total_wagered,
            self.expected,
            self.expected_ev_percent(),
            self.actual,
            self.actual_ev_percent(),
            self.variance()
        )
    }

    pub fn reset(&mut self) {
        *self = SessionStats::default();
    }
}

/// Tracks what a session should have won against what it did win.
#[derive(Debug, Clone, Default)]
pub struct EvCalculator {
    model: EdgeModel,
    session: SessionStats,
}

impl EvCalculator {
    pub fn new(model: EdgeModel) -> EvCalculator {
        EvCalculator {
            model,
            session: SessionStats::default(),
        }
    }

    pub fn model(&self) -> &EdgeModel {
        &self.model
    }

    /// Records one round: the total staked once doubles and splits are in,
    /// the true count the opening bet was placed at and the signed profit.
    pub fn record_hand(&mut self, bet: f64, true_count: f64, profit: f64) {
        let expected = self.model.ev(true_count, bet);
        self.session.add_hand(bet, expected, profit);
        debug!(
            "ev: bet {} at tc {:.2}, expected {:+.3}, actual {:+.2}",
            bet, true_count, expected, profit
        );
    }

    pub fn session(&self) -> &SessionStats {
        &self.session
    }

    pub fn reset(&mut self) {
        self.session.reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn edge_grows_with_count() {
        let model = EdgeModel::default();
        assert!(close(model.player_edge(0.0), -0.005));
        assert!(close(model.player_edge(1.0), 0.0));
        assert!(close(model.player_edge(3.0), 0.01));
        assert!(close(model.player_edge_percent(-2.0), -1.5));
        assert!(close(model.ev(3.0, 100.0), 1.0));
    }

    #[test]
    fn model_follows_config() {
        let config = BettingConfig {
            base_house_edge: -0.01,
            per_count_advantage: 0.004,
            ..Default::default()
        };
        let model = EdgeModel::from_config(&config);
        assert!(close(model.player_edge(5.0), 0.01));
    }

    #[test]
    fn session_tracks_expected_and_actual() {
        let mut calculator = EvCalculator::new(EdgeModel::default());
        calculator.record_hand(100.0, 3.0, 100.0);
        calculator.record_hand(100.0, -1.0, -100.0);
        calculator.record_hand(50.0, 1.0, 75.0);

        let session = calculator.session();
        assert_eq!(session.hands_played, 3);
        assert_eq!(session.total_wagered, 250.0);
        assert!(close(session.expected, 0.0));
        assert_eq!(session.actual, 75.0);
        assert!(close(session.actual_ev_percent(), 30.0));
        assert!(close(session.variance(), 75.0));
        assert!(session.summary().starts_with("3 hands"));

        calculator.reset();
        assert_eq!(*calculator.session(), SessionStats::default());
        assert_eq!(calculator.session().expected_ev_percent(), 0.0);
    }
}
