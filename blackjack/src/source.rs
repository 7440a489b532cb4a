//! Shuffled-deck provider capability.
//!
//! A table's shoe is normally refilled from whatever [`DeckSource`] the
//! process was wired with - a remote dealing service, or the local
//! generator. Remote sources can fail or hang, so every fetch goes
//! through [`fetch_with_fallback`]: the call is time-bounded and a
//! failure silently falls back to a freshly shuffled local multiset. A
//! draw can therefore never fail from the table's point of view.

use async_trait::async_trait;
use log::warn;
use std::time::Duration;
use thiserror::Error;

use crate::game::entities::{Card, Deck};

#[derive(Debug, Error)]
pub enum DeckSourceError {
    #[error("deck source unavailable: {0}")]
    Unavailable(String),
    #[error("deck source returned no cards")]
    Empty,
}

/// A provider of freshly shuffled card sets.
#[async_trait]
pub trait DeckSource: Send + Sync {
    /// Fetch a shuffled multiset of `sets` standard decks.
    async fn fetch_shuffled(&self, sets: u8) -> Result<Vec<Card>, DeckSourceError>;
}

/// The default source: a uniform local shuffle.
#[derive(Clone, Copy, Debug, Default)]
pub struct LocalDeckSource;

#[async_trait]
impl DeckSource for LocalDeckSource {
    async fn fetch_shuffled(&self, sets: u8) -> Result<Vec<Card>, DeckSourceError> {
        Ok(Deck::fresh_cards(sets))
    }
}

/// Fetch cards from `source`, bounded by `timeout`. Any failure - error,
/// empty response, or timeout - falls back to local generation, so the
/// caller always gets a full shuffled multiset.
pub async fn fetch_with_fallback(
    source: &dyn DeckSource,
    sets: u8,
    timeout: Duration,
) -> Vec<Card> {
    match tokio::time::timeout(timeout, source.fetch_shuffled(sets)).await {
        Ok(Ok(cards)) if !cards.is_empty() => cards,
        Ok(Ok(_)) => {
            warn!("deck source returned no cards, generating locally");
            Deck::fresh_cards(sets)
        }
        Ok(Err(e)) => {
            warn!("deck source failed ({e}), generating locally");
            Deck::fresh_cards(sets)
        }
        Err(_) => {
            warn!("deck source timed out after {timeout:?}, generating locally");
            Deck::fresh_cards(sets)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::constants::STANDARD_DECK_SIZE;

    struct FailingSource;

    #[async_trait]
    impl DeckSource for FailingSource {
        async fn fetch_shuffled(&self, _sets: u8) -> Result<Vec<Card>, DeckSourceError> {
            Err(DeckSourceError::Unavailable("connection refused".into()))
        }
    }

    struct StalledSource;

    #[async_trait]
    impl DeckSource for StalledSource {
        async fn fetch_shuffled(&self, _sets: u8) -> Result<Vec<Card>, DeckSourceError> {
            tokio::time::sleep(Duration::from_secs(3600)).await;
            unreachable!()
        }
    }

    #[tokio::test]
    async fn local_source_returns_full_sets() {
        let cards = LocalDeckSource.fetch_shuffled(2).await.unwrap();
        assert_eq!(cards.len(), STANDARD_DECK_SIZE * 2);
    }

    #[tokio::test]
    async fn failing_source_falls_back_locally() {
        let cards =
            fetch_with_fallback(&FailingSource, 1, Duration::from_millis(100)).await;
        assert_eq!(cards.len(), STANDARD_DECK_SIZE);
    }

    #[tokio::test(start_paused = true)]
    async fn stalled_source_is_time_bounded() {
        let cards =
            fetch_with_fallback(&StalledSource, 1, Duration::from_millis(500)).await;
        assert_eq!(cards.len(), STANDARD_DECK_SIZE);
    }
}
