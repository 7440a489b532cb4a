//! Multi-table blackjack server library.
//!
//! Exposes the API router, configuration, and metrics so integration
//! tests can drive the server in-process.

pub mod api;
pub mod config;
pub mod metrics;
