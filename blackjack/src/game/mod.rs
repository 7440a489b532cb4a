//! Blackjack game engine - entities, state machine, and views.
//!
//! This module provides the foundational game implementation including:
//! - Card, hand, and deck entities with derived scoring
//! - The per-table state machine governing phases and turn order
//! - Per-viewer masked projections of table state

pub mod constants;
pub mod entities;
pub mod state_machine;
pub mod views;

pub use state_machine::{GameError, Outcome, Phase, Table};
