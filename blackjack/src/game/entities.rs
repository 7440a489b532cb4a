use rand::seq::SliceRandom;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

use super::constants;

#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub enum Suit {
    #[serde(rename = "♠")]
    Spade,
    #[serde(rename = "♥")]
    Heart,
    #[serde(rename = "♦")]
    Diamond,
    #[serde(rename = "♣")]
    Club,
}

impl Suit {
    pub const ALL: [Self; 4] = [Self::Spade, Self::Heart, Self::Diamond, Self::Club];
}

impl fmt::Display for Suit {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let repr = match self {
            Self::Spade => "♠",
            Self::Heart => "♥",
            Self::Diamond => "♦",
            Self::Club => "♣",
        };
        write!(f, "{repr}")
    }
}

#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub enum Rank {
    #[serde(rename = "2")]
    Two,
    #[serde(rename = "3")]
    Three,
    #[serde(rename = "4")]
    Four,
    #[serde(rename = "5")]
    Five,
    #[serde(rename = "6")]
    Six,
    #[serde(rename = "7")]
    Seven,
    #[serde(rename = "8")]
    Eight,
    #[serde(rename = "9")]
    Nine,
    #[serde(rename = "10")]
    Ten,
    #[serde(rename = "J")]
    Jack,
    #[serde(rename = "Q")]
    Queen,
    #[serde(rename = "K")]
    King,
    #[serde(rename = "A")]
    Ace,
}

impl Rank {
    pub const ALL: [Self; 13] = [
        Self::Two,
        Self::Three,
        Self::Four,
        Self::Five,
        Self::Six,
        Self::Seven,
        Self::Eight,
        Self::Nine,
        Self::Ten,
        Self::Jack,
        Self::Queen,
        Self::King,
        Self::Ace,
    ];

    /// Base score contribution. Aces count 11 here and are demoted to 1
    /// during hand scoring when the total would bust.
    pub const fn value(self) -> u32 {
        match self {
            Self::Two => 2,
            Self::Three => 3,
            Self::Four => 4,
            Self::Five => 5,
            Self::Six => 6,
            Self::Seven => 7,
            Self::Eight => 8,
            Self::Nine => 9,
            Self::Ten | Self::Jack | Self::Queen | Self::King => 10,
            Self::Ace => 11,
        }
    }
}

impl fmt::Display for Rank {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let repr = match self {
            Self::Two => "2",
            Self::Three => "3",
            Self::Four => "4",
            Self::Five => "5",
            Self::Six => "6",
            Self::Seven => "7",
            Self::Eight => "8",
            Self::Nine => "9",
            Self::Ten => "10",
            Self::Jack => "J",
            Self::Queen => "Q",
            Self::King => "K",
            Self::Ace => "A",
        };
        write!(f, "{repr}")
    }
}

/// A playing card. Immutable once drawn.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub struct Card {
    pub rank: Rank,
    pub suit: Suit,
}

impl Card {
    pub const fn new(rank: Rank, suit: Suit) -> Self {
        Self { rank, suit }
    }
}

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let repr = format!("{}{}", self.rank, self.suit);
        write!(f, "{repr:>3}")
    }
}

/// An ordered sequence of cards, append-only during a turn.
///
/// The score is always derived from the cards, never stored, so it cannot
/// drift from the hand it describes.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct Hand(Vec<Card>);

impl Hand {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, card: Card) {
        self.0.push(card);
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }

    #[must_use]
    pub fn cards(&self) -> &[Card] {
        &self.0
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Score the hand. Aces count 11, then are demoted to 1 one at a time
    /// while the total exceeds the target. Idempotent and independent of
    /// card order; an empty hand scores 0.
    #[must_use]
    pub fn score(&self) -> u32 {
        let mut total = 0;
        let mut soft_aces = 0;
        for card in &self.0 {
            total += card.rank.value();
            if card.rank == Rank::Ace {
                soft_aces += 1;
            }
        }
        while total > constants::TARGET_SCORE && soft_aces > 0 {
            total -= 10;
            soft_aces -= 1;
        }
        total
    }

    /// A natural: exactly two cards totaling the target score.
    #[must_use]
    pub fn is_natural(&self) -> bool {
        self.0.len() == 2 && self.score() == constants::TARGET_SCORE
    }

    #[must_use]
    pub fn is_busted(&self) -> bool {
        self.score() > constants::TARGET_SCORE
    }
}

impl FromIterator<Card> for Hand {
    fn from_iter<T: IntoIterator<Item = Card>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// A table's shoe: an ordered stack of cards drawn from the back.
///
/// Owned exclusively by one table and never shared. A draw against an
/// empty shoe transparently refills it from freshly shuffled local sets
/// first, so drawing can never fail.
#[derive(Debug)]
pub struct Deck {
    cards: Vec<Card>,
    sets: u8,
}

impl Deck {
    /// Build a shoe from `sets` standard decks, uniformly shuffled.
    #[must_use]
    pub fn new(sets: u8) -> Self {
        let sets = sets.clamp(constants::MIN_DECK_SETS, constants::MAX_DECK_SETS);
        Self {
            cards: Self::fresh_cards(sets),
            sets,
        }
    }

    /// Build a shoe with a fixed card order, drawn from the back.
    /// Useful for driving deterministic rounds in tests.
    #[must_use]
    pub fn from_cards(cards: Vec<Card>) -> Self {
        Self {
            cards,
            sets: constants::MIN_DECK_SETS,
        }
    }

    /// A freshly shuffled multiset of `sets` standard 52-card decks.
    /// Every permutation of the multiset is equally likely.
    #[must_use]
    pub fn fresh_cards(sets: u8) -> Vec<Card> {
        let sets = sets.clamp(constants::MIN_DECK_SETS, constants::MAX_DECK_SETS);
        let mut cards =
            Vec::with_capacity(constants::STANDARD_DECK_SIZE * usize::from(sets));
        for _ in 0..sets {
            for rank in Rank::ALL {
                for suit in Suit::ALL {
                    cards.push(Card::new(rank, suit));
                }
            }
        }
        cards.shuffle(&mut rand::rng());
        cards
    }

    /// Draw the top card. Refills the shoe from fresh local sets when
    /// empty, so this never fails.
    pub fn draw(&mut self) -> Card {
        loop {
            match self.cards.pop() {
                Some(card) => return card,
                None => self.replenish(),
            }
        }
    }

    /// Append a freshly shuffled local multiset to the shoe.
    pub fn replenish(&mut self) {
        let mut fresh = Self::fresh_cards(self.sets);
        self.cards.append(&mut fresh);
    }

    /// Append externally sourced cards to the shoe.
    pub fn extend(&mut self, cards: Vec<Card>) {
        self.cards.extend(cards);
    }

    #[must_use]
    pub fn remaining(&self) -> usize {
        self.cards.len()
    }
}

/// Type alias for whole chips. Bets and stacks are whole chips; there is
/// no fractional currency anywhere in the engine.
pub type Chips = u32;

/// Stable player identifier, issued by the client at first join and kept
/// across reconnects. Connection handles are tracked separately and are
/// reassignable.
#[derive(Clone, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub struct PlayerId(String);

impl PlayerId {
    #[must_use]
    pub fn new(s: &str) -> Self {
        Self(s.to_string())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<String> for PlayerId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub struct PlayerName(String);

impl PlayerName {
    pub fn new(s: &str) -> Self {
        let mut name: String = s
            .chars()
            .map(|c| if c.is_ascii_whitespace() { '_' } else { c })
            .collect();
        name.truncate(constants::MAX_NAME_LENGTH);
        Self(name)
    }
}

impl fmt::Display for PlayerName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl<'de> Deserialize<'de> for PlayerName {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Ok(Self::new(&s))
    }
}

impl From<String> for PlayerName {
    fn from(value: String) -> Self {
        Self::new(&value)
    }
}

/// Where a player is within the current round.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PlayerStatus {
    /// Seated but not part of the round in progress.
    Waiting,
    /// Expected to place a wager.
    Betting,
    /// Dealt in and still able to hit.
    Playing,
    /// Standing on the current hand.
    Stayed,
    /// Hand went over the target score.
    Busted,
}

impl fmt::Display for PlayerStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let repr = match self {
            Self::Waiting => "waiting",
            Self::Betting => "betting",
            Self::Playing => "playing",
            Self::Stayed => "stayed",
            Self::Busted => "busted",
        };
        write!(f, "{repr}")
    }
}

/// A seated player. Chips are mutated only by bet placement (debit) and
/// round resolution (credit); per-round fields reset every Betting phase.
#[derive(Clone, Debug)]
pub struct Player {
    pub id: PlayerId,
    pub name: PlayerName,
    pub hand: Hand,
    pub chips: Chips,
    pub bet: Chips,
    pub status: PlayerStatus,
}

impl Player {
    #[must_use]
    pub fn new(id: PlayerId, name: PlayerName, chips: Chips) -> Self {
        Self {
            id,
            name,
            hand: Hand::new(),
            chips,
            bet: 0,
            status: PlayerStatus::Waiting,
        }
    }
}

/// The house hand. Scored exactly like a player's; the raw hand is kept
/// in full even while the hole card is masked for public display.
#[derive(Clone, Debug, Default)]
pub struct Dealer {
    pub hand: Hand,
}
