//! Table module providing multi-table support with an async actor model.
//!
//! This module implements:
//! - `TableActor`: async actor owning a single blackjack table
//! - `TableManager`: registry mapping table ids to running actors and
//!   connection handles to (table, player) identity
//! - Message-based communication with tokio channels
//!
//! ## Architecture
//!
//! Each table runs in a separate tokio task with an mpsc message inbox,
//! which is the table's exclusive-access scope: all actions addressed to
//! one table serialize through it, while different tables run fully in
//! parallel. The manager spawns actors on demand, routes actions, and
//! reaps a table the moment its last seat empties.

pub mod actor;
pub mod config;
pub mod manager;
pub mod messages;

pub use actor::{TableActor, TableHandle};
pub use config::TableConfig;
pub use manager::{ConnectionId, TableManager};
pub use messages::{TableMessage, TableNotice, TableResponse, TableSummary};
