//! Game-wide constants.

use super::entities::Chips;

/// The score a hand is trying to reach without going over.
pub const TARGET_SCORE: u32 = 21;

/// The dealer draws until reaching this score (dealer stands on 17).
pub const DEALER_STAND: u32 = 17;

/// Chips issued to a player the first time they sit down at a table.
pub const STARTING_CHIPS: Chips = 1000;

/// Maximum number of seats at a single table.
pub const MAX_SEATS: usize = 7;

/// Number of cards in one standard deck.
pub const STANDARD_DECK_SIZE: usize = 52;

/// Bounds on how many standard decks a table's shoe is built from.
pub const MIN_DECK_SETS: u8 = 1;
pub const MAX_DECK_SETS: u8 = 6;

/// Maximum accepted length for a player's display name.
pub const MAX_NAME_LENGTH: usize = 32;
