use serde::Serialize;

use super::{hand::Hand, Card, GamePhase};

/// How a single player hand ended against the dealer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Outcome {
    Blackjack,
    Win,
    DealerBust,
    Push,
    Lose,
    Bust,
    DealerBlackjack,
}

impl Outcome {
    pub fn label(&self) -> &'static str {
        match self {
            Outcome::Blackjack => "Blackjack!",
            Outcome::Win => "Win",
            Outcome::DealerBust => "Dealer Bust",
            Outcome::Push => "Push",
            Outcome::Lose => "Lose",
            Outcome::Bust => "Bust",
            Outcome::DealerBlackjack => "Dealer Blackjack",
        }
    }

    /// Compares a finished player hand with the finished dealer hand.
    /// Returns the outcome and the multiplier applied to the bet, where 1.0
    /// returns the bet and 0.0 loses it.
    pub fn judge(player: &Hand, dealer: &Hand, blackjack_payout: f64) -> (Outcome, f64) {
        match (player.is_blackjack(), dealer.is_blackjack()) {
            (true, true) => return (Outcome::Push, 1.0),
            (false, true) => return (Outcome::DealerBlackjack, 0.0),
            (true, false) => return (Outcome::Blackjack, 1.0 + blackjack_payout),
            (false, false) => {}
        }

        if player.is_bust() {
            (Outcome::Bust, 0.0)
        } else if dealer.is_bust() {
            (Outcome::DealerBust, 2.0)
        } else if player.total() > dealer.total() {
            (Outcome::Win, 2.0)
        } else if player.total() < dealer.total() {
            (Outcome::Lose, 0.0)
        } else {
            (Outcome::Push, 1.0)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HandResult {
    pub hand_index: usize,
    pub outcome: Outcome,
    pub total: u8,
    pub bet: f64,
    pub multiplier: f64,
    /// `bet * multiplier - bet`.
    pub profit: f64,
}

/// Everything `Round::settle` decided, hand by hand.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Settlement {
    pub hands: Vec<HandResult>,
    pub dealer_total: u8,
    pub net: f64,
    pub bankroll: f64,
}

impl Settlement {
    pub fn wagered(&self) -> f64 {
        self.hands.iter().map(|h| h.bet).sum()
    }

    /// One line for the whole round, e.g. "Blackjack!" or "2 won, 1 lost".
    pub fn summary(&self) -> String {
        if let [single] = self.hands.as_slice() {
            return String::from(single.outcome.label());
        }
        let won = self.hands.iter().filter(|h| h.multiplier > 1.0).count();
        let pushed = self.hands.iter().filter(|h| h.multiplier == 1.0).count();
        let lost = self.hands.len() - won - pushed;
        let mut parts = Vec::new();
        if won > 0 {
            parts.push(format!("{} won", won));
        }
        if lost > 0 {
            parts.push(format!("{} lost", lost));
        }
        if pushed > 0 {
            parts.push(format!("{} pushed", pushed));
        }
        parts.join(", ")
    }
}

/// Session counters kept by the round. They only grow until reset.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct SessionStatistics {
    pub hands_played: u32,
    pub wins: u32,
    pub losses: u32,
    pub pushes: u32,
    pub blackjacks: u32,
    pub total_wagered: f64,
}

impl SessionStatistics {
    pub(crate) fn record(&mut self, outcome: Outcome, bet: f64) {
        self.total_wagered += bet;
        match outcome {
            Outcome::Push => self.pushes += 1,
            Outcome::Blackjack => {
                self.wins += 1;
                self.blackjacks += 1;
            }
            Outcome::Win | Outcome::DealerBust => self.wins += 1,
            Outcome::Lose | Outcome::Bust | Outcome::DealerBlackjack => self.losses += 1,
        }
    }

    /// Wins over decided hands, pushes excluded.
    pub fn win_percentage(&self) -> f64 {
        let decided = self.wins + self.losses;
        if decided == 0 {
            0.0
        } else {
            self.wins as f64 / decided as f64 * 100.0
        }
    }

    pub fn average_bet(&self) -> f64 {
        if self.hands_played == 0 {
            0.0
        } else {
            self.total_wagered / self.hands_played as f64
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HandSnapshot {
    pub cards: Vec<Card>,
    pub total: u8,
    pub soft: bool,
    pub bet: f64,
    pub stood: bool,
    pub doubled: bool,
    pub blackjack: bool,
    pub bust: bool,
}

impl HandSnapshot {
    pub(crate) fn new(hand: &Hand, bet: f64) -> Self {
        HandSnapshot {
            cards: hand.cards().to_vec(),
            total: hand.total(),
            soft: hand.is_soft(),
            bet,
            stood: hand.stood(),
            doubled: hand.doubled(),
            blackjack: hand.is_blackjack(),
            bust: hand.is_bust(),
        }
    }
}

/// What a presentation layer needs to draw the table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RoundSnapshot {
    pub phase: GamePhase,
    pub hands: Vec<HandSnapshot>,
    pub active_hand_index: usize,
    /// Only the upcard until the hole card is revealed.
    pub dealer_cards: Vec<Card>,
    /// `None` while the hole card is hidden.
    pub dealer_total: Option<u8>,
    pub bankroll: f64,
    pub committed: f64,
    pub running_count: i32,
    pub true_count: f64,
    pub cards_remaining: usize,
    pub needs_shuffle: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simulation::{Rank, Suit};

    fn hand(ranks: &[Rank]) -> Hand {
        let cards: Vec<Card> = ranks
            .iter()
            .map(|rank| Card {
                rank: *rank,
                suit: Suit::Heart,
            })
            .collect();
        Hand::from_cards(&cards)
    }

    #[test]
    fn naturals_are_judged_first() {
        let natural = hand(&[Rank::Ace, Rank::King]);
        let dealer_natural = hand(&[Rank::Ace, Rank::Queen]);
        let twenty = hand(&[Rank::King, Rank::Queen]);

        assert_eq!(
            Outcome::judge(&natural, &dealer_natural, 1.5),
            (Outcome::Push, 1.0)
        );
        assert_eq!(
            Outcome::judge(&twenty, &dealer_natural, 1.5),
            (Outcome::DealerBlackjack, 0.0)
        );
        assert_eq!(
            Outcome::judge(&natural, &twenty, 1.5),
            (Outcome::Blackjack, 2.5)
        );
        assert_eq!(
            Outcome::judge(&natural, &twenty, 1.0),
            (Outcome::Blackjack, 2.0)
        );
    }

    #[test]
    fn player_bust_loses_even_if_dealer_busts() {
        let bust = hand(&[Rank::King, Rank::Six, Rank::Nine]);
        let dealer_bust = hand(&[Rank::King, Rank::Six, Rank::Eight]);
        assert_eq!(Outcome::judge(&bust, &dealer_bust, 1.5), (Outcome::Bust, 0.0));
    }

    #[test]
    fn totals_are_compared() {
        let nineteen = hand(&[Rank::King, Rank::Nine]);
        let eighteen = hand(&[Rank::King, Rank::Eight]);
        let dealer_bust = hand(&[Rank::King, Rank::Six, Rank::Eight]);
        assert_eq!(Outcome::judge(&nineteen, &eighteen, 1.5), (Outcome::Win, 2.0));
        assert_eq!(Outcome::judge(&eighteen, &nineteen, 1.5), (Outcome::Lose, 0.0));
        assert_eq!(Outcome::judge(&eighteen, &eighteen, 1.5), (Outcome::Push, 1.0));
        assert_eq!(
            Outcome::judge(&eighteen, &dealer_bust, 1.5),
            (Outcome::DealerBust, 2.0)
        );
    }

    #[test]
    fn statistics_count_outcomes() {
        let mut stats = SessionStatistics::default();
        stats.hands_played = 3;
        stats.record(Outcome::Blackjack, 10.0);
        stats.record(Outcome::Lose, 10.0);
        stats.record(Outcome::Push, 10.0);
        stats.record(Outcome::DealerBust, 20.0);
        assert_eq!(stats.wins, 2);
        assert_eq!(stats.losses, 1);
        assert_eq!(stats.pushes, 1);
        assert_eq!(stats.blackjacks, 1);
        assert_eq!(stats.total_wagered, 50.0);
        assert!((stats.win_percentage() - 66.666).abs() < 0.01);
    }

    #[test]
    fn multi_hand_summary() {
        let result = |multiplier: f64| HandResult {
            hand_index: 0,
            outcome: Outcome::Win,
            total: 20,
            bet: 10.0,
            multiplier,
            profit: 10.0 * multiplier - 10.0,
        };
        let settlement = Settlement {
            hands: vec![result(2.0), result(0.0), result(2.0)],
            dealer_total: 18,
            net: 10.0,
            bankroll: 1010.0,
        };
        assert_eq!(settlement.summary(), "2 won, 1 lost");
        assert_eq!(settlement.wagered(), 30.0);
    }
}
