use serde::Serialize;

use super::{Card, Rank};

/// Returns `(total, is_soft)` for a list of cards.
///
/// Every ace starts at 11 and is knocked down to 1, one at a time, while the
/// total is above 21. The hand is soft iff an ace is still counted as 11.
pub fn evaluate(cards: &[Card]) -> (u8, bool) {
    let mut total: u16 = 0;
    let mut aces_as_eleven = 0;
    for card in cards {
        if card.rank == Rank::Ace {
            aces_as_eleven += 1;
        }
        total += card.blackjack_value() as u16;
    }
    while total > 21 && aces_as_eleven > 0 {
        total -= 10;
        aces_as_eleven -= 1;
    }
    (total.min(u8::MAX as u16) as u8, aces_as_eleven > 0 && total <= 21)
}

/// One seat's cards: a player hand (possibly created by a split) or the dealer.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Hand {
    cards: Vec<Card>,
    total: u8,
    soft: bool,
    stood: bool,
    doubled: bool,
    is_blackjack: bool,
    from_split: bool,
}

impl Hand {
    pub fn new() -> Hand {
        Hand {
            cards: Vec::with_capacity(3),
            ..Default::default()
        }
    }

    /// Builds a hand from cards, as if they were dealt in order.
    pub fn from_cards(cards: &[Card]) -> Hand {
        let mut hand = Hand::new();
        for card in cards {
            hand.add_card(*card);
        }
        hand
    }

    pub fn add_card(&mut self, card: Card) {
        self.cards.push(card);
        self.reevaluate();
        if self.cards.len() == 2 && self.total == 21 && !self.from_split {
            self.is_blackjack = true;
        }
    }

    /// Takes the second card away into a new hand. Both halves are marked as
    /// split hands and can no longer be a blackjack.
    pub(crate) fn split_off(&mut self) -> Hand {
        let mut other = Hand::new();
        other.from_split = true;
        if let Some(card) = self.cards.pop() {
            other.add_card(card);
        }
        self.from_split = true;
        self.is_blackjack = false;
        self.reevaluate();
        other
    }

    pub(crate) fn stand(&mut self) {
        self.stood = true;
    }

    pub(crate) fn mark_doubled(&mut self) {
        self.doubled = true;
    }

    fn reevaluate(&mut self) {
        let (total, soft) = evaluate(&self.cards);
        self.total = total;
        self.soft = soft;
    }

    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    pub fn total(&self) -> u8 {
        self.total
    }

    pub fn is_soft(&self) -> bool {
        self.soft
    }

    pub fn is_bust(&self) -> bool {
        self.total > 21
    }

    pub fn is_blackjack(&self) -> bool {
        self.is_blackjack
    }

    pub fn is_from_split(&self) -> bool {
        self.from_split
    }

    pub fn stood(&self) -> bool {
        self.stood
    }

    pub fn doubled(&self) -> bool {
        self.doubled
    }

    /// Exactly two cards of the same rank. A king and a queen are not a pair.
    pub fn can_split(&self) -> bool {
        self.cards.len() == 2 && self.cards[0].rank == self.cards[1].rank
    }

    pub fn can_double(&self) -> bool {
        self.cards.len() == 2 && !self.doubled
    }
}
