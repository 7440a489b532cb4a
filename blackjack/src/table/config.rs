//! Table configuration models.

use serde::{Deserialize, Serialize};
use tokio::time::Duration;

use crate::game::constants::{MAX_DECK_SETS, MAX_SEATS, MIN_DECK_SETS, STARTING_CHIPS};
use crate::game::entities::Chips;

/// Table configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableConfig {
    /// Maximum number of seats
    pub max_seats: usize,

    /// Chips issued to a player on first join
    pub starting_chips: Chips,

    /// Number of standard decks in the shoe (1-6)
    pub deck_sets: u8,

    /// Cosmetic pause between the turn-over reveal and the dealer's play.
    /// Purely display timing; no player action is legal during it.
    pub dealer_pause_ms: u64,

    /// Delay before a resolved round automatically restarts
    pub restart_delay_ms: u64,

    /// Time bound on external deck fetches before local fallback
    pub deck_fetch_timeout_ms: u64,
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            max_seats: MAX_SEATS,
            starting_chips: STARTING_CHIPS,
            deck_sets: 1,
            dealer_pause_ms: 1_000,
            restart_delay_ms: 5_000,
            deck_fetch_timeout_ms: 2_000,
        }
    }
}

impl TableConfig {
    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.max_seats == 0 || self.max_seats > MAX_SEATS {
            return Err(format!("Max seats must be between 1 and {MAX_SEATS}"));
        }
        if self.deck_sets < MIN_DECK_SETS || self.deck_sets > MAX_DECK_SETS {
            return Err(format!(
                "Deck sets must be between {MIN_DECK_SETS} and {MAX_DECK_SETS}"
            ));
        }
        if self.starting_chips == 0 {
            return Err("Starting chips must be positive".to_string());
        }
        Ok(())
    }

    pub fn dealer_pause(&self) -> Duration {
        Duration::from_millis(self.dealer_pause_ms)
    }

    pub fn restart_delay(&self) -> Duration {
        Duration::from_millis(self.restart_delay_ms)
    }

    pub fn deck_fetch_timeout(&self) -> Duration {
        Duration::from_millis(self.deck_fetch_timeout_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert!(TableConfig::default().validate().is_ok());
    }

    #[test]
    fn out_of_range_values_rejected() {
        let mut config = TableConfig::default();
        config.deck_sets = 7;
        assert!(config.validate().is_err());
        config.deck_sets = 1;
        config.max_seats = 0;
        assert!(config.validate().is_err());
    }
}
