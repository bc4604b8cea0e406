use serde::Serialize;

use crate::simulation::Card;

/// Hi-Lo running count over every card seen since the last shuffle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CardCounter {
    running_count: i32,
    cards_seen: u32,
}

impl CardCounter {
    pub fn new() -> CardCounter {
        CardCounter::default()
    }

    pub fn update(&mut self, card: &Card) {
        self.running_count += card.count_tag() as i32;
        self.cards_seen += 1;
    }

    pub fn update_many<'a, I>(&mut self, cards: I)
    where
        I: IntoIterator<Item = &'a Card>,
    {
        for card in cards {
            self.update(card);
        }
    }

    /// Running count per deck left in the shoe. Fewer than half a deck is
    /// treated as half a deck; an empty shoe has a true count of 0.
    pub fn true_count(&self, cards_remaining: usize) -> f64 {
        if cards_remaining == 0 {
            return 0.0;
        }
        let decks_remaining = (cards_remaining as f64 / 52.0).max(0.5);
        self.running_count as f64 / decks_remaining
    }

    pub fn running_count(&self) -> i32 {
        self.running_count
    }

    pub fn cards_seen(&self) -> u32 {
        self.cards_seen
    }

    pub fn reset(&mut self) {
        *self = CardCounter::default();
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CountCheck {
    pub actual: i32,
    pub announced: i32,
    pub correct: bool,
}

/// Drill statistics: how often the trainee's announced count was right.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CountingStats {
    correct: u32,
    total: u32,
    history: Vec<CountCheck>,
}

impl CountingStats {
    pub fn new() -> CountingStats {
        CountingStats::default()
    }

    pub fn record(&mut self, actual: i32, announced: i32) -> bool {
        let correct = actual == announced;
        self.total += 1;
        if correct {
            self.correct += 1;
        }
        self.history.push(CountCheck {
            actual,
            announced,
            correct,
        });
        correct
    }

    /// Percentage of correct announcements, 0 before the first one.
    pub fn accuracy(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.correct as f64 / self.total as f64 * 100.0
        }
    }

    pub fn total(&self) -> u32 {
        self.total
    }

    pub fn history(&self) -> &[CountCheck] {
        &self.history
    }

    pub fn reset(&mut self) {
        *self = CountingStats::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simulation::{Rank, Suit};

    fn card(rank: Rank) -> Card {
        Card::new(rank, Suit::Club)
    }

    #[test]
    fn hi_lo_tags_accumulate() {
        let mut counter = CardCounter::new();
        let cards = [
            card(Rank::Two),
            card(Rank::Five),
            card(Rank::Seven),
            card(Rank::King),
            card(Rank::Ace),
            card(Rank::Six),
        ];
        counter.update_many(&cards);
        assert_eq!(counter.running_count(), 1);
        assert_eq!(counter.cards_seen(), 6);

        counter.reset();
        assert_eq!(counter.running_count(), 0);
        assert_eq!(counter.cards_seen(), 0);
    }

    #[test]
    fn true_count_divides_by_decks_remaining() {
        let mut counter = CardCounter::new();
        for _ in 0..10 {
            counter.update(&card(Rank::Four));
        }
        assert_eq!(counter.true_count(104), 5.0);
        assert_eq!(counter.true_count(312), 10.0 / 6.0);
    }

    #[test]
    fn true_count_denominator_floors_at_half_deck() {
        let mut counter = CardCounter::new();
        for _ in 0..3 {
            counter.update(&card(Rank::Three));
        }
        assert_eq!(counter.true_count(26), 6.0);
        assert_eq!(counter.true_count(10), 6.0);
        assert_eq!(counter.true_count(1), 6.0);
        assert_eq!(counter.true_count(0), 0.0);
    }

    #[test]
    fn true_count_is_monotonic_in_running_count() {
        let mut counter = CardCounter::new();
        for _ in 0..8 {
            counter.update(&card(Rank::Ten));
        }
        let mut previous = counter.true_count(150);
        for _ in 0..16 {
            counter.update(&card(Rank::Two));
            let current = counter.true_count(150);
            assert!(current > previous);
            previous = current;
        }
    }

    #[test]
    fn counting_drill_accuracy() {
        let mut stats = CountingStats::new();
        assert_eq!(stats.accuracy(), 0.0);
        assert!(stats.record(3, 3));
        assert!(!stats.record(-2, 1));
        assert!(stats.record(0, 0));
        assert!(stats.record(5, 5));
        assert_eq!(stats.accuracy(), 75.0);
        assert_eq!(stats.history().len(), 4);
        assert!(!stats.history()[1].correct);

        stats.reset();
        assert_eq!(stats.total(), 0);
        assert!(stats.history().is_empty());
    }
}
