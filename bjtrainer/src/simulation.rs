pub mod hand;
pub mod shoe;
pub mod summary;

use bjtrainer_macros::allowed_phase;
use log::{debug, info};
use serde::{Deserialize, Serialize};
use strum_macros::EnumIter;

use crate::{
    counting::CardCounter,
    strategy::{RoundContext, Strategy},
    BettingConfig, Decision, EngineError, Rule,
};

use self::{
    hand::Hand,
    shoe::Shoe,
    summary::{HandResult, HandSnapshot, Outcome, RoundSnapshot, SessionStatistics, Settlement},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, Serialize, Deserialize)]
pub enum Suit {
    Diamond = 0,
    Club,
    Heart,
    Spade,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, EnumIter, Serialize, Deserialize,
)]
pub enum Rank {
    Two = 2,
    Three,
    Four,
    Five,
    Six,
    Seven,
    Eight,
    Nine,
    Ten,
    Jack,
    Queen,
    King,
    Ace,
}

impl Rank {
    /// 10 for faces, 11 for an ace, the pip value otherwise.
    pub fn blackjack_value(&self) -> u8 {
        match self {
            Rank::Jack | Rank::Queen | Rank::King => 10,
            Rank::Ace => 11,
            pip => *pip as u8,
        }
    }

    /// Hi-Lo tag: +1 for 2-6, 0 for 7-9, -1 for tens and aces.
    pub fn count_tag(&self) -> i8 {
        match self.blackjack_value() {
            2..=6 => 1,
            7..=9 => 0,
            _ => -1,
        }
    }

    fn symbol(&self) -> char {
        match self {
            Rank::Two => '2',
            Rank::Three => '3',
            Rank::Four => '4',
            Rank::Five => '5',
            Rank::Six => '6',
            Rank::Seven => '7',
            Rank::Eight => '8',
            Rank::Nine => '9',
            Rank::Ten => 'T',
            Rank::Jack => 'J',
            Rank::Queen => 'Q',
            Rank::King => 'K',
            Rank::Ace => 'A',
        }
    }
}

impl std::fmt::Display for Rank {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Rank::Ten => write!(f, "10"),
            other => write!(f, "{}", other.symbol()),
        }
    }
}

/// Represents a card in the real world with a suit and a rank.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Card {
    pub rank: Rank,
    pub suit: Suit,
}

impl Card {
    pub fn new(rank: Rank, suit: Suit) -> Card {
        Card { rank, suit }
    }

    pub fn blackjack_value(&self) -> u8 {
        self.rank.blackjack_value()
    }

    pub fn count_tag(&self) -> i8 {
        self.rank.count_tag()
    }
}

impl std::fmt::Display for Card {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let suit = match self.suit {
            Suit::Diamond => 'D',
            Suit::Club => 'C',
            Suit::Heart => 'H',
            Suit::Spade => 'S',
        };
        write!(f, "{}{}", self.rank.symbol(), suit)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    Betting,
    Playing,
    DealerTurn,
    Complete,
}

/// A player hand together with the money riding on it.
#[derive(Debug, Clone)]
struct SeatedHand {
    hand: Hand,
    bet: f64,
}

/// One seat against the dealer, played round after round from the same shoe.
///
/// The round owns the shoe and the card counter; every card that becomes
/// visible at the table is fed to the counter. All methods run to completion:
/// the dealer plays inside the call that finishes the last player hand.
pub struct Round {
    rule: Rule,
    limits: BettingConfig,

    // Table state
    phase: GamePhase,
    shoe: Shoe,
    counter: CardCounter,
    dealer_hand: Hand,
    hole_card_revealed: bool,

    // Player state
    hands: Vec<SeatedHand>,
    active_hand_index: usize,
    bankroll: f64,
    starting_bankroll: f64,
    settled: bool,
    stats: SessionStatistics,
}

impl Round {
    /// Validates the configuration and opens a table with a freshly shuffled
    /// shoe. Pass a seed to make the shoe reproducible.
    pub fn new(rule: &Rule, limits: &BettingConfig, seed: Option<u64>) -> Result<Self, EngineError> {
        rule.validate()?;
        Self::with_shoe(rule, limits, Shoe::from_rule(rule, seed))
    }

    /// Opens a table with a prepared shoe, e.g. one stacked with
    /// [`Shoe::stack_front`]. The shoe must hold `rule.number_of_decks`
    /// decks; its own penetration and burn card setting are kept.
    pub fn with_shoe(rule: &Rule, limits: &BettingConfig, shoe: Shoe) -> Result<Self, EngineError> {
        rule.validate()?;
        limits.validate()?;
        if shoe.number_of_decks() != rule.number_of_decks {
            return Err(EngineError::InvalidConfig(vec![format!(
                "shoe holds {} decks but the rules ask for {}",
                shoe.number_of_decks(),
                rule.number_of_decks
            )]));
        }
        Ok(Self {
            rule: *rule,
            limits: *limits,
            phase: GamePhase::Betting,
            shoe,
            counter: CardCounter::new(),
            dealer_hand: Hand::new(),
            hole_card_revealed: false,
            hands: Vec::new(),
            active_hand_index: 0,
            bankroll: limits.default_bankroll,
            starting_bankroll: limits.default_bankroll,
            settled: true,
            stats: SessionStatistics::default(),
        })
    }

    /// Shuffles the shoe and resets the count. Only between rounds.
    #[allowed_phase(Betting, Complete)]
    pub fn shuffle(&mut self) -> Result<(), EngineError> {
        self.shoe.shuffle();
        self.counter.reset();
        Ok(())
    }

    /// Deals a new round: player, dealer, player, dealer.
    ///
    /// The shoe is never shuffled here. If it has passed its cut card this
    /// returns `ShuffleRequired` so the caller can tell the player first.
    #[allowed_phase(Betting, Complete)]
    pub fn start_round(&mut self, bet: f64) -> Result<RoundSnapshot, EngineError> {
        if !self.settled {
            return Err(EngineError::IllegalAction(String::from(
                "the previous round has not been settled",
            )));
        }
        if self.shoe.needs_shuffle() {
            return Err(EngineError::ShuffleRequired);
        }
        if !(bet >= self.limits.min_bet && bet <= self.limits.max_bet) {
            return Err(EngineError::IllegalAction(format!(
                "bet {} is outside the table limits {}-{}",
                bet, self.limits.min_bet, self.limits.max_bet
            )));
        }
        if bet > self.bankroll {
            return Err(EngineError::IllegalAction(format!(
                "bet {} exceeds the bankroll {}",
                bet, self.bankroll
            )));
        }

        let mut player = Hand::new();
        let mut dealer = Hand::new();
        player.add_card(self.draw_exposed()?);
        let up_card = self.draw_exposed()?;
        dealer.add_card(up_card);
        player.add_card(self.draw_exposed()?);
        dealer.add_card(self.draw()?);

        self.hands = vec![SeatedHand { hand: player, bet }];
        self.dealer_hand = dealer;
        self.hole_card_revealed = false;
        self.active_hand_index = 0;
        self.settled = false;
        self.stats.hands_played += 1;
        self.phase = GamePhase::Playing;
        debug!(
            "round {} dealt: bet {}, player {:?}, dealer shows {}",
            self.stats.hands_played,
            bet,
            self.hands[0].hand.cards(),
            up_card
        );

        if self.hands[0].hand.is_blackjack() || self.dealer_hand.is_blackjack() {
            self.reveal_hole_card();
            self.active_hand_index = self.hands.len();
            self.phase = GamePhase::Complete;
        }
        Ok(self.snapshot())
    }

    /// Hits the active hand. Returns true if that hand may still act.
    #[allowed_phase(Playing)]
    pub fn hit(&mut self) -> Result<bool, EngineError> {
        self.hit_at(self.active_hand_index)
    }

    #[allowed_phase(Playing)]
    pub fn hit_at(&mut self, hand_index: usize) -> Result<bool, EngineError> {
        self.check_active(hand_index)?;
        let card = self.draw_exposed()?;
        let hand = &mut self.hands[hand_index].hand;
        hand.add_card(card);
        if hand.total() >= 21 {
            self.advance()?;
            return Ok(false);
        }
        Ok(true)
    }

    /// Stands on the active hand. Always returns false.
    #[allowed_phase(Playing)]
    pub fn stand(&mut self) -> Result<bool, EngineError> {
        self.stand_at(self.active_hand_index)
    }

    #[allowed_phase(Playing)]
    pub fn stand_at(&mut self, hand_index: usize) -> Result<bool, EngineError> {
        self.check_active(hand_index)?;
        self.hands[hand_index].hand.stand();
        self.advance()?;
        Ok(false)
    }

    /// Doubles the active hand: twice the bet, exactly one more card.
    /// Always returns false.
    #[allowed_phase(Playing)]
    pub fn double(&mut self) -> Result<bool, EngineError> {
        self.double_at(self.active_hand_index)
    }

    #[allowed_phase(Playing)]
    pub fn double_at(&mut self, hand_index: usize) -> Result<bool, EngineError> {
        self.check_active(hand_index)?;
        self.check_double(hand_index)?;
        let card = self.draw_exposed()?;
        let seat = &mut self.hands[hand_index];
        seat.bet *= 2.0;
        seat.hand.mark_doubled();
        seat.hand.add_card(card);
        seat.hand.stand();
        self.advance()?;
        Ok(false)
    }

    /// Splits the active pair into two hands and deals one card to each.
    /// Returns true if the first new hand may act.
    #[allowed_phase(Playing)]
    pub fn split(&mut self) -> Result<bool, EngineError> {
        self.split_at(self.active_hand_index)
    }

    #[allowed_phase(Playing)]
    pub fn split_at(&mut self, hand_index: usize) -> Result<bool, EngineError> {
        self.check_active(hand_index)?;
        self.check_split(hand_index)?;
        let first_card = self.draw_exposed()?;
        let second_card = self.draw_exposed()?;

        let seat = &mut self.hands[hand_index];
        let bet = seat.bet;
        let splitting_aces = seat.hand.cards()[0].rank == Rank::Ace;
        let mut second = seat.hand.split_off();
        seat.hand.add_card(first_card);
        second.add_card(second_card);
        self.hands
            .insert(hand_index + 1, SeatedHand { hand: second, bet });
        debug!(
            "split hand {} into {} hands",
            hand_index,
            self.hands.len()
        );

        if splitting_aces && self.rule.split_aces_one_card {
            self.hands[hand_index].hand.stand();
            self.hands[hand_index + 1].hand.stand();
            self.advance()?;
            self.advance()?;
            return Ok(false);
        }
        Ok(true)
    }

    /// Applies a decision to the active hand.
    pub fn apply(&mut self, decision: Decision) -> Result<bool, EngineError> {
        match decision {
            Decision::Hit => self.hit(),
            Decision::Stand => self.stand(),
            Decision::Double => self.double(),
            Decision::Split => self.split(),
        }
    }

    /// Pays out every hand against the finished dealer hand. Once per round.
    #[allowed_phase(Complete)]
    pub fn settle(&mut self) -> Result<Settlement, EngineError> {
        if self.settled {
            return Err(EngineError::IllegalAction(String::from(
                "this round has already been settled",
            )));
        }

        let mut hands = Vec::with_capacity(self.hands.len());
        let mut net = 0.0;
        for (hand_index, seat) in self.hands.iter().enumerate() {
            let (outcome, multiplier) =
                Outcome::judge(&seat.hand, &self.dealer_hand, self.rule.blackjack_payout);
            let profit = seat.bet * multiplier - seat.bet;
            net += profit;
            self.stats.record(outcome, seat.bet);
            hands.push(HandResult {
                hand_index,
                outcome,
                total: seat.hand.total(),
                bet: seat.bet,
                multiplier,
                profit,
            });
        }

        self.bankroll += net;
        self.settled = true;
        let settlement = Settlement {
            hands,
            dealer_total: self.dealer_hand.total(),
            net,
            bankroll: self.bankroll,
        };
        info!(
            "round {} settled: {} (net {:+.2}, bankroll {:.2})",
            self.stats.hands_played,
            settlement.summary(),
            net,
            self.bankroll
        );
        Ok(settlement)
    }

    /// What `strategy` would do with the active hand, or None when no player
    /// decision is pending.
    pub fn next_optimal_action<T: Strategy>(&self, strategy: &T) -> Option<Decision> {
        strategy.decide(self)
    }

    pub fn snapshot(&self) -> RoundSnapshot {
        let dealer_cards = if self.hole_card_revealed {
            self.dealer_hand.cards().to_vec()
        } else {
            self.dealer_hand.cards().iter().take(1).copied().collect()
        };
        RoundSnapshot {
            phase: self.phase,
            hands: self
                .hands
                .iter()
                .map(|seat| HandSnapshot::new(&seat.hand, seat.bet))
                .collect(),
            active_hand_index: self.active_hand_index,
            dealer_cards,
            dealer_total: self.hole_card_revealed.then(|| self.dealer_hand.total()),
            bankroll: self.bankroll,
            committed: self.committed(),
            running_count: self.counter.running_count(),
            true_count: self.true_count(),
            cards_remaining: self.shoe.cards_remaining(),
            needs_shuffle: self.shoe.needs_shuffle(),
        }
    }

    pub fn phase(&self) -> GamePhase {
        self.phase
    }

    pub fn rule(&self) -> &Rule {
        &self.rule
    }

    pub fn limits(&self) -> &BettingConfig {
        &self.limits
    }

    pub fn shoe(&self) -> &Shoe {
        &self.shoe
    }

    pub fn needs_shuffle(&self) -> bool {
        self.shoe.needs_shuffle()
    }

    pub fn counter(&self) -> &CardCounter {
        &self.counter
    }

    pub fn running_count(&self) -> i32 {
        self.counter.running_count()
    }

    pub fn true_count(&self) -> f64 {
        self.counter.true_count(self.shoe.cards_remaining())
    }

    pub fn hands(&self) -> Vec<&Hand> {
        self.hands.iter().map(|seat| &seat.hand).collect()
    }

    pub fn bets(&self) -> Vec<f64> {
        self.hands.iter().map(|seat| seat.bet).collect()
    }

    /// Money currently on the table across all hands.
    pub fn committed(&self) -> f64 {
        self.hands.iter().map(|seat| seat.bet).sum()
    }

    pub fn active_hand_index(&self) -> usize {
        self.active_hand_index
    }

    /// The hand waiting for a decision, if any.
    pub fn active_hand(&self) -> Option<&Hand> {
        if self.phase != GamePhase::Playing {
            return None;
        }
        self.hands.get(self.active_hand_index).map(|seat| &seat.hand)
    }

    pub fn dealer_hand(&self) -> &Hand {
        &self.dealer_hand
    }

    pub fn dealer_upcard(&self) -> Option<Card> {
        self.dealer_hand.cards().first().copied()
    }

    pub fn bankroll(&self) -> f64 {
        self.bankroll
    }

    /// Bankroll change since the table opened or the statistics were reset.
    pub fn profit(&self) -> f64 {
        self.bankroll - self.starting_bankroll
    }

    pub fn is_settled(&self) -> bool {
        self.settled
    }

    pub fn statistics(&self) -> &SessionStatistics {
        &self.stats
    }

    pub fn reset_statistics(&mut self) {
        self.stats = SessionStatistics::default();
        self.starting_bankroll = self.bankroll;
    }

    pub fn can_double_active(&self) -> bool {
        self.phase == GamePhase::Playing && self.check_double(self.active_hand_index).is_ok()
    }

    pub fn can_split_active(&self) -> bool {
        self.phase == GamePhase::Playing && self.check_split(self.active_hand_index).is_ok()
    }

    /// What the strategy engine needs to know about the table.
    pub fn context(&self) -> RoundContext {
        RoundContext {
            split_allowed: self.can_split_active(),
        }
    }

    fn check_active(&self, hand_index: usize) -> Result<(), EngineError> {
        if hand_index != self.active_hand_index || hand_index >= self.hands.len() {
            return Err(EngineError::IllegalAction(format!(
                "hand {} cannot act, the active hand is {}",
                hand_index, self.active_hand_index
            )));
        }
        Ok(())
    }

    fn check_double(&self, hand_index: usize) -> Result<(), EngineError> {
        let seat = self.hands.get(hand_index).ok_or_else(|| {
            EngineError::IllegalAction(format!("there is no hand {}", hand_index))
        })?;
        let hand = &seat.hand;
        if !hand.can_double() {
            return Err(EngineError::IllegalAction(String::from(
                "you can only double down on two cards",
            )));
        }
        if hand.is_from_split() && !self.rule.double_after_split {
            return Err(EngineError::IllegalAction(String::from(
                "doubling after a split is not allowed",
            )));
        }
        if !self.rule.double_on_any_two && !matches!(hand.total(), 10 | 11) {
            return Err(EngineError::IllegalAction(String::from(
                "doubling is only allowed on 10 or 11",
            )));
        }
        if self.bankroll < seat.bet {
            return Err(EngineError::IllegalAction(String::from(
                "the bankroll does not cover the extra bet",
            )));
        }
        Ok(())
    }

    fn check_split(&self, hand_index: usize) -> Result<(), EngineError> {
        let seat = self.hands.get(hand_index).ok_or_else(|| {
            EngineError::IllegalAction(format!("there is no hand {}", hand_index))
        })?;
        if !seat.hand.can_split() {
            return Err(EngineError::IllegalAction(String::from(
                "you can only split two cards of the same rank",
            )));
        }
        if self.hands.len() > self.rule.max_splits as usize {
            return Err(EngineError::IllegalAction(String::from(
                "you reached the split limit",
            )));
        }
        if self.bankroll < seat.bet {
            return Err(EngineError::IllegalAction(String::from(
                "the bankroll does not cover the extra bet",
            )));
        }
        Ok(())
    }

    /// Moves to the next hand. Past the last one the dealer plays and the
    /// round completes.
    fn advance(&mut self) -> Result<(), EngineError> {
        self.active_hand_index += 1;
        if self.active_hand_index < self.hands.len() {
            return Ok(());
        }
        self.phase = GamePhase::DealerTurn;
        self.play_dealer()?;
        self.phase = GamePhase::Complete;
        Ok(())
    }

    fn play_dealer(&mut self) -> Result<(), EngineError> {
        self.reveal_hole_card();
        if self.hands.iter().all(|seat| seat.hand.is_bust()) {
            debug!("every player hand is bust, dealer does not draw");
            return Ok(());
        }
        while self
            .rule
            .dealer_must_hit(self.dealer_hand.total(), self.dealer_hand.is_soft())
        {
            let card = self.draw_exposed()?;
            self.dealer_hand.add_card(card);
        }
        debug!(
            "dealer stands with {:?} ({})",
            self.dealer_hand.cards(),
            self.dealer_hand.total()
        );
        Ok(())
    }

    fn reveal_hole_card(&mut self) {
        if self.hole_card_revealed {
            return;
        }
        if let Some(hole) = self.dealer_hand.cards().get(1) {
            self.counter.update(hole);
        }
        self.hole_card_revealed = true;
    }

    fn draw(&mut self) -> Result<Card, EngineError> {
        self.shoe.deal_card().ok_or(EngineError::ShoeExhausted)
    }

    fn draw_exposed(&mut self) -> Result<Card, EngineError> {
        let card = self.draw()?;
        self.counter.update(&card);
        Ok(card)
    }
}

impl Rule {
    /// Dealer draws below the stand value, and on a soft stand value unless
    /// the table stands on soft 17.
    pub fn dealer_must_hit(&self, total: u8, is_soft: bool) -> bool {
        total < self.dealer_stand_value
            || (total == self.dealer_stand_value && is_soft && !self.dealer_stand_on_soft17)
    }
}
