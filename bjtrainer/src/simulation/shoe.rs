use log::{debug, trace};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use strum::IntoEnumIterator;

use super::{Card, Rank, Suit};
use crate::{EngineError, Rule};

/// Represents a shoe in the real world.
///
/// Cards are never removed from `cards`; `dealt_count` is the cursor, so
/// `dealt_count + cards_remaining()` is always the full population.
#[derive(Debug, Clone)]
pub struct Shoe {
    number_of_decks: u8,
    penetration_threshold: usize,
    burn_card: bool,
    cards: Vec<Card>,
    dealt_count: usize,
    needs_shuffle: bool,
    rng: StdRng,
}

impl Shoe {
    /// Creates a new shoe with ordered cards. Call `shuffle` before dealing.
    ///
    /// `penetration` is the configured fraction; the shoe asks for a shuffle
    /// once `round(cards * (1 - penetration))` cards have been dealt.
    pub fn new(number_of_decks: u8, penetration: f64, burn_card: bool) -> Shoe {
        Self::with_rng(number_of_decks, penetration, burn_card, StdRng::from_entropy())
    }

    /// Same as `new`, but shuffles are reproducible.
    pub fn with_seed(number_of_decks: u8, penetration: f64, burn_card: bool, seed: u64) -> Shoe {
        Self::with_rng(
            number_of_decks,
            penetration,
            burn_card,
            StdRng::seed_from_u64(seed),
        )
    }

    /// Builds and shuffles a shoe for the given table rules.
    pub fn from_rule(rule: &Rule, seed: Option<u64>) -> Shoe {
        let mut shoe = match seed {
            Some(seed) => Shoe::with_seed(
                rule.number_of_decks,
                rule.penetration,
                rule.burn_card,
                seed,
            ),
            None => Shoe::new(rule.number_of_decks, rule.penetration, rule.burn_card),
        };
        shoe.shuffle();
        shoe
    }

    fn with_rng(number_of_decks: u8, penetration: f64, burn_card: bool, rng: StdRng) -> Shoe {
        let total = number_of_decks as usize * 52;
        let mut cards = Vec::with_capacity(total);
        for _ in 0..number_of_decks {
            for suit in Suit::iter() {
                for rank in Rank::iter() {
                    cards.push(Card { rank, suit });
                }
            }
        }
        Shoe {
            number_of_decks,
            penetration_threshold: (total as f64 * (1.0 - penetration)).round() as usize,
            burn_card,
            cards,
            dealt_count: 0,
            needs_shuffle: false,
            rng,
        }
    }

    /// Returns every card into the shoe and shuffles. Burns the top card if
    /// the shoe is configured to.
    pub fn shuffle(&mut self) {
        self.cards.shuffle(&mut self.rng);
        self.dealt_count = 0;
        self.needs_shuffle = false;
        if self.burn_card {
            self.advance_cursor();
        }
        debug!(
            "shuffled {} deck(s), cut card after {} cards",
            self.number_of_decks, self.penetration_threshold
        );
    }

    /// Returns every card into the shoe and shuffles, making sure the given
    /// ranks come out first, in order. Nothing is burned so that the stacked
    /// cards are exactly the next ones dealt.
    ///
    /// Fails without touching the shoe if it does not hold enough cards of a
    /// requested rank.
    pub fn stack_front(&mut self, ranks: &[Rank]) -> Result<(), EngineError> {
        let per_rank = self.number_of_decks as usize * 4;
        for rank in Rank::iter() {
            let wanted = ranks.iter().filter(|r| **r == rank).count();
            if wanted > per_rank {
                return Err(EngineError::IllegalAction(format!(
                    "cannot stack {} cards of rank {} in a {}-deck shoe",
                    wanted, rank, self.number_of_decks
                )));
            }
        }

        for (idx, rank) in ranks.iter().enumerate() {
            // Validated above, so a card of this rank is always left in the tail.
            if let Some(offset) = self.cards[idx..].iter().position(|c| c.rank == *rank) {
                self.cards.swap(idx, idx + offset);
            }
        }
        self.cards[ranks.len()..].shuffle(&mut self.rng);
        self.dealt_count = 0;
        self.needs_shuffle = false;
        Ok(())
    }

    /// Deals a card if the shoe is not empty. Returns None if empty.
    pub fn deal_card(&mut self) -> Option<Card> {
        let card = *self.cards.get(self.dealt_count)?;
        self.advance_cursor();
        trace!("dealt {} ({} left)", card, self.cards_remaining());
        Some(card)
    }

    fn advance_cursor(&mut self) {
        self.dealt_count += 1;
        if self.dealt_count >= self.penetration_threshold {
            self.needs_shuffle = true;
        }
    }

    /// Checks if the cut card has been reached.
    pub fn needs_shuffle(&self) -> bool {
        self.needs_shuffle
    }

    pub fn dealt_count(&self) -> usize {
        self.dealt_count
    }

    pub fn cards_remaining(&self) -> usize {
        self.cards.len() - self.dealt_count
    }

    pub fn decks_remaining(&self) -> f64 {
        self.cards_remaining() as f64 / 52.0
    }

    pub fn total_cards(&self) -> usize {
        self.cards.len()
    }

    pub fn penetration_threshold(&self) -> usize {
        self.penetration_threshold
    }

    pub fn number_of_decks(&self) -> u8 {
        self.number_of_decks
    }

    /// The next `number` cards without dealing them.
    pub fn preview(&self, number: usize) -> &[Card] {
        let end = (self.dealt_count + number).min(self.cards.len());
        &self.cards[self.dealt_count..end]
    }
}
