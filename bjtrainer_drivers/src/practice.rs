use std::time::{Duration, Instant};

use serde::Serialize;
use serde_enum_str::{Deserialize_enum_str, Serialize_enum_str};
use strum::IntoEnumIterator;
use strum_macros::EnumIter;

/// How much the trainer tells the player while they practise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, Serialize_enum_str, Deserialize_enum_str)]
pub enum Level {
    #[serde(rename = "beginner")]
    Beginner,
    #[serde(rename = "intermediate")]
    Intermediate,
    #[serde(rename = "advanced")]
    Advanced,
    #[serde(rename = "expert")]
    Expert,
}

impl Default for Level {
    fn default() -> Self {
        Level::Beginner
    }
}

/// What a level shows. Everything not shown is left for the player to work
/// out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Visibility {
    pub count: bool,
    pub true_count: bool,
    pub hints: bool,
    pub strategy_feedback: bool,
    pub ev: bool,
    pub bankroll: bool,
    pub auto_deal: bool,
}

impl Level {
    pub fn name(self) -> &'static str {
        match self {
            Level::Beginner => "Beginner",
            Level::Intermediate => "Intermediate",
            Level::Advanced => "Advanced",
            Level::Expert => "Expert",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Level::Beginner => "All information visible for learning",
            Level::Intermediate => "True count hidden, calculate yourself",
            Level::Advanced => "Count and strategy tracking hidden",
            Level::Expert => "Casino conditions - minimal information",
        }
    }

    pub fn visibility(self) -> Visibility {
        match self {
            Level::Beginner => Visibility {
                count: true,
                true_count: true,
                hints: true,
                strategy_feedback: true,
                ev: true,
                bankroll: true,
                auto_deal: true,
            },
            Level::Intermediate => Visibility {
                count: true,
                true_count: false,
                hints: false,
                strategy_feedback: true,
                ev: true,
                bankroll: true,
                auto_deal: true,
            },
            Level::Advanced => Visibility {
                count: false,
                true_count: false,
                hints: false,
                strategy_feedback: false,
                ev: false,
                bankroll: true,
                auto_deal: false,
            },
            Level::Expert => Visibility {
                count: false,
                true_count: false,
                hints: false,
                strategy_feedback: false,
                ev: false,
                bankroll: false,
                auto_deal: false,
            },
        }
    }
}

/// The difficulty a practice session currently runs at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DifficultyLevel {
    level: Level,
}

impl DifficultyLevel {
    pub fn new(level: Level) -> DifficultyLevel {
        DifficultyLevel { level }
    }

    pub fn level(&self) -> Level {
        self.level
    }

    /// Switches to the level named e.g. "advanced". Unknown names leave the
    /// level as it is and return false.
    pub fn set_level(&mut self, name: &str) -> bool {
        match name.parse::<Level>() {
            Ok(level) => {
                self.level = level;
                true
            }
            Err(_) => false,
        }
    }

    pub fn level_names() -> Vec<&'static str> {
        Level::iter().map(Level::name).collect()
    }

    pub fn level_descriptions() -> Vec<(Level, &'static str)> {
        Level::iter().map(|level| (level, level.description())).collect()
    }

    pub fn should_show_count(&self) -> bool {
        self.level.visibility().count
    }

    pub fn should_show_true_count(&self) -> bool {
        self.level.visibility().true_count
    }

    pub fn should_show_hints(&self) -> bool {
        self.level.visibility().hints
    }

    pub fn should_show_strategy_feedback(&self) -> bool {
        self.level.visibility().strategy_feedback
    }

    pub fn should_show_ev(&self) -> bool {
        self.level.visibility().ev
    }

    pub fn should_show_bankroll(&self) -> bool {
        self.level.visibility().bankroll
    }

    pub fn auto_deal_available(&self) -> bool {
        self.level.visibility().auto_deal
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PracticeSummary {
    pub hands_played: u32,
    pub total_decisions: u32,
    pub correct_decisions: u32,
    pub accuracy_percentage: f64,
    pub duration: Duration,
    pub hands_per_minute: f64,
}

/// Decisions and hands of one timed practice run.
#[derive(Debug, Clone, Default)]
pub struct PracticeSession {
    hands_played: u32,
    total_decisions: u32,
    correct_decisions: u32,
    started: Option<Instant>,
    ended: Option<Instant>,
}

impl PracticeSession {
    pub fn new() -> PracticeSession {
        PracticeSession::default()
    }

    /// Clears the counters and starts the clock.
    pub fn start(&mut self) {
        self.start_at(Instant::now());
    }

    pub fn start_at(&mut self, now: Instant) {
        *self = PracticeSession {
            started: Some(now),
            ..Default::default()
        };
    }

    pub fn end(&mut self) {
        self.end_at(Instant::now());
    }

    pub fn end_at(&mut self, now: Instant) {
        if self.started.is_some() && self.ended.is_none() {
            self.ended = Some(now);
        }
    }

    pub fn is_running(&self) -> bool {
        self.started.is_some() && self.ended.is_none()
    }

    pub fn record_decision(&mut self, correct: bool) {
        self.total_decisions += 1;
        if correct {
            self.correct_decisions += 1;
        }
    }

    pub fn record_hand_played(&mut self) {
        self.hands_played += 1;
    }

    pub fn summary(&self) -> PracticeSummary {
        self.summary_at(Instant::now())
    }

    /// A running session is measured up to `now`.
    pub fn summary_at(&self, now: Instant) -> PracticeSummary {
        let duration = match self.started {
            Some(started) => self.ended.unwrap_or(now).saturating_duration_since(started),
            None => Duration::ZERO,
        };
        let accuracy_percentage = if self.total_decisions == 0 {
            0.0
        } else {
            self.correct_decisions as f64 / self.total_decisions as f64 * 100.0
        };
        let minutes = duration.as_secs_f64() / 60.0;
        let hands_per_minute = if minutes > 0.0 {
            self.hands_played as f64 / minutes
        } else {
            0.0
        };
        PracticeSummary {
            hands_played: self.hands_played,
            total_decisions: self.total_decisions,
            correct_decisions: self.correct_decisions,
            accuracy_percentage,
            duration,
            hands_per_minute,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn levels_hide_more_as_they_go_up() {
        let mut difficulty = DifficultyLevel::default();
        assert_eq!(difficulty.level(), Level::Beginner);
        assert!(difficulty.should_show_count());
        assert!(difficulty.should_show_true_count());
        assert!(difficulty.should_show_hints());
        assert!(difficulty.auto_deal_available());

        assert!(difficulty.set_level("intermediate"));
        assert!(difficulty.should_show_count());
        assert!(!difficulty.should_show_true_count());
        assert!(!difficulty.should_show_hints());
        assert!(difficulty.should_show_strategy_feedback());
        assert!(difficulty.should_show_ev());

        assert!(difficulty.set_level("advanced"));
        assert!(!difficulty.should_show_count());
        assert!(!difficulty.should_show_strategy_feedback());
        assert!(!difficulty.should_show_ev());
        assert!(difficulty.should_show_bankroll());
        assert!(!difficulty.auto_deal_available());

        assert!(difficulty.set_level("expert"));
        assert!(!difficulty.should_show_bankroll());
    }

    #[test]
    fn unknown_level_is_ignored() {
        let mut difficulty = DifficultyLevel::new(Level::Advanced);
        assert!(!difficulty.set_level("grandmaster"));
        assert!(!difficulty.set_level("Expert"));
        assert_eq!(difficulty.level(), Level::Advanced);
    }

    #[test]
    fn level_names_in_order() {
        assert_eq!(
            DifficultyLevel::level_names(),
            vec!["Beginner", "Intermediate", "Advanced", "Expert"]
        );
        let descriptions = DifficultyLevel::level_descriptions();
        assert_eq!(descriptions.len(), 4);
        assert_eq!(
            descriptions[1],
            (Level::Intermediate, "True count hidden, calculate yourself")
        );
        assert_eq!(Level::Expert.to_string(), "expert");
    }

    #[test]
    fn practice_summary_counts_and_rates() {
        let started = Instant::now();
        let mut practice = PracticeSession::new();
        practice.start_at(started);
        for correct in [true, true, false, true] {
            practice.record_decision(correct);
        }
        for _ in 0..6 {
            practice.record_hand_played();
        }

        let summary = practice.summary_at(started + Duration::from_secs(120));
        assert_eq!(summary.total_decisions, 4);
        assert_eq!(summary.correct_decisions, 3);
        assert_eq!(summary.accuracy_percentage, 75.0);
        assert_eq!(summary.duration, Duration::from_secs(120));
        assert_eq!(summary.hands_per_minute, 3.0);

        practice.end_at(started + Duration::from_secs(60));
        assert!(!practice.is_running());
        let later = practice.summary_at(started + Duration::from_secs(600));
        assert_eq!(later.duration, Duration::from_secs(60));
        assert_eq!(later.hands_per_minute, 6.0);
    }

    #[test]
    fn unstarted_practice_has_no_rate() {
        let mut practice = PracticeSession::new();
        practice.record_hand_played();
        practice.end();
        let summary = practice.summary();
        assert_eq!(summary.duration, Duration::ZERO);
        assert_eq!(summary.hands_per_minute, 0.0);
        assert_eq!(summary.accuracy_percentage, 0.0);

        practice.start();
        assert!(practice.is_running());
        assert_eq!(practice.summary().hands_played, 0);
    }
}
