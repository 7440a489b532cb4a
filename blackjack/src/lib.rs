//! # Blackjack
//!
//! A multi-table blackjack session engine with per-table actors.
//!
//! This library provides the complete table-side game logic for hosting
//! live, multi-seat blackjack rooms: deck lifecycle, turn order, dealer
//! automation, payout resolution, and visibility-masked state projection.
//!
//! ## Architecture
//!
//! Every table is a single unit of mutable state owned by one async actor
//! task. All actions addressed to a table (join, bet, hit, stay, leave)
//! serialize through the actor's message inbox, so no two actions for the
//! same table can interleave their read-modify-write sequence. Tables are
//! fully independent of one another.
//!
//! A round moves through five phases:
//!
//! - **Lobby**: seats are open, no round in progress
//! - **Betting**: seated players place their wagers
//! - **PlayerTurns**: players hit or stay in snapshotted seating order
//! - **DealerTurn**: the dealer draws to seventeen
//! - **Resolved**: outcomes are settled and bets paid out
//!
//! ## Core Modules
//!
//! - [`game`]: card model, hand scoring, deck, table state machine, views
//! - [`source`]: the shuffled-deck capability with local fallback
//! - [`table`]: per-table actor, message protocol, and table registry
//!
//! ## Example
//!
//! ```
//! use blackjack::{Deck, Table, TableId};
//!
//! let table = Table::new(TableId::new_v4(), Deck::new(1), 7, 1000);
//! assert_eq!(table.player_count(), 0);
//! ```

/// Core game logic, entities, and the table state machine.
pub mod game;
pub use game::{
    GameError, Outcome, Phase, Table,
    constants::{self, DEALER_STAND, MAX_SEATS, STARTING_CHIPS, TARGET_SCORE},
    entities::{Card, Chips, Deck, Hand, Player, PlayerId, PlayerName, PlayerStatus, Rank, Suit},
    views::{CardView, DealerView, PlayerView, TableView},
};

/// Shuffled-deck provider capability.
pub mod source;
pub use source::{DeckSource, DeckSourceError, LocalDeckSource};

/// Per-table actor model and the table registry.
pub mod table;
pub use table::{
    ConnectionId, TableActor, TableConfig, TableHandle, TableManager, TableMessage, TableNotice,
    TableResponse, TableSummary,
};

/// Opaque, globally-unique table identifier.
pub type TableId = uuid::Uuid;
