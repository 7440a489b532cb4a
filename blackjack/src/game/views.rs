//! Per-viewer masked projections of table state.
//!
//! A projection is recomputed on every emission - phase and viewer both
//! vary per call, so nothing here is ever cached. The viewer sees their
//! own hand in full; every other hand is replaced by equal-length opaque
//! placeholders with the score omitted, and the dealer's hole card stays
//! hidden until the round resolves.

use serde::{Serialize, Serializer};
use std::collections::HashMap;

use super::entities::{Card, Chips, Hand, PlayerId, PlayerName, PlayerStatus};
use super::state_machine::{Outcome, Phase, Table};
use crate::TableId;

/// A card as a specific viewer is entitled to see it.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum CardView {
    Up(Card),
    Hidden,
}

impl Serialize for CardView {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Self::Up(card) => card.serialize(serializer),
            Self::Hidden => serializer.serialize_str("Hidden"),
        }
    }
}

#[derive(Clone, Debug, Serialize)]
pub struct PlayerView {
    pub id: PlayerId,
    pub name: PlayerName,
    pub status: PlayerStatus,
    pub chips: Chips,
    pub bet: Chips,
    pub hand: Vec<CardView>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<u32>,
}

#[derive(Clone, Debug, Serialize)]
pub struct DealerView {
    pub hand: Vec<CardView>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<u32>,
}

/// The viewer-specific rendering of a table, pushed to clients on every
/// state change.
#[derive(Clone, Debug, Serialize)]
pub struct TableView {
    pub table_id: TableId,
    pub phase: Phase,
    pub players: Vec<PlayerView>,
    pub dealer: DealerView,
    pub deck_count: usize,
    #[serde(skip_serializing_if = "HashMap::is_empty")]
    pub results: HashMap<PlayerId, Outcome>,
}

fn full_hand(hand: &Hand) -> Vec<CardView> {
    hand.cards().iter().copied().map(CardView::Up).collect()
}

fn masked_hand(hand: &Hand) -> Vec<CardView> {
    vec![CardView::Hidden; hand.len()]
}

impl Table {
    /// Project this table for a specific viewer, or for a generic
    /// broadcast when `viewer` is `None` (everything masked).
    #[must_use]
    pub fn project(&self, viewer: Option<&PlayerId>) -> TableView {
        let resolved = self.phase() == Phase::Resolved;

        let players = self
            .players()
            .iter()
            .map(|player| {
                let own = viewer == Some(&player.id);
                let (hand, score) = if own {
                    (full_hand(&player.hand), Some(player.hand.score()))
                } else {
                    (masked_hand(&player.hand), None)
                };
                PlayerView {
                    id: player.id.clone(),
                    name: player.name.clone(),
                    status: player.status,
                    chips: player.chips,
                    bet: player.bet,
                    hand,
                    score,
                }
            })
            .collect();

        let dealer_hand = self.dealer().hand.cards();
        let dealer = if resolved {
            DealerView {
                hand: full_hand(&self.dealer().hand),
                score: Some(self.dealer().hand.score()),
            }
        } else {
            // Up card plus an opaque placeholder per remaining card.
            let mut hand = Vec::with_capacity(dealer_hand.len());
            if let Some(&up) = dealer_hand.first() {
                hand.push(CardView::Up(up));
                hand.extend(std::iter::repeat_n(CardView::Hidden, dealer_hand.len() - 1));
            }
            DealerView { hand, score: None }
        };

        TableView {
            table_id: self.id(),
            phase: self.phase(),
            players,
            dealer,
            deck_count: self.deck_count(),
            results: if resolved {
                self.results().clone()
            } else {
                HashMap::new()
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::entities::{Deck, Rank, Suit};
    use serde_json::Value;

    fn pid(s: &str) -> PlayerId {
        PlayerId::new(s)
    }

    fn dealt_table() -> Table {
        let mut table = Table::new(TableId::new_v4(), Deck::new(1), 7, 1000);
        // The first seat auto-deals a solo round; play it out so both
        // players can bet into the round under test.
        table.seat(pid("a"), PlayerName::new("alice")).unwrap();
        table.seat(pid("b"), PlayerName::new("bob")).unwrap();
        table.stay(&pid("a")).unwrap();
        table.play_dealer().unwrap();
        table.next_round().unwrap();
        table.place_bet(&pid("a"), 100).unwrap();
        table.place_bet(&pid("b"), 100).unwrap();
        table
    }

    #[test]
    fn viewer_sees_own_hand_and_masked_opponents() {
        let table = dealt_table();
        let view = table.project(Some(&pid("a")));

        let alice = view.players.iter().find(|p| p.id == pid("a")).unwrap();
        assert!(alice.hand.iter().all(|c| matches!(c, CardView::Up(_))));
        assert_eq!(alice.score, Some(table.player(&pid("a")).unwrap().hand.score()));

        let bob = view.players.iter().find(|p| p.id == pid("b")).unwrap();
        assert_eq!(bob.hand, vec![CardView::Hidden; 2]);
        assert_eq!(bob.score, None);
        // Public attributes stay visible.
        assert_eq!(bob.chips, 900);
        assert_eq!(bob.bet, 100);
    }

    #[test]
    fn broadcast_projection_masks_every_hand() {
        let table = dealt_table();
        let view = table.project(None);
        for player in &view.players {
            assert!(player.hand.iter().all(|c| matches!(c, CardView::Hidden)));
            assert_eq!(player.score, None);
        }
    }

    #[test]
    fn dealer_hole_card_hidden_until_resolved() {
        let mut table = dealt_table();
        let up_card = table.dealer().hand.cards()[0];

        let view = table.project(Some(&pid("a")));
        assert_eq!(view.dealer.hand[0], CardView::Up(up_card));
        assert_eq!(view.dealer.hand[1], CardView::Hidden);
        assert_eq!(view.dealer.score, None);
        assert!(view.results.is_empty());

        table.stay(&pid("a")).unwrap();
        table.stay(&pid("b")).unwrap();
        table.play_dealer().unwrap();

        let view = table.project(Some(&pid("a")));
        assert!(view.dealer.hand.iter().all(|c| matches!(c, CardView::Up(_))));
        assert_eq!(view.dealer.score, Some(table.dealer().hand.score()));
        assert_eq!(view.results.len(), 2);
    }

    #[test]
    fn projection_never_leaks_opponent_card_values_on_the_wire() {
        let table = dealt_table();
        let view = table.project(Some(&pid("a")));
        let json = serde_json::to_value(&view).unwrap();

        let bob_cards = table.player(&pid("b")).unwrap().hand.cards().to_vec();
        let players = json["players"].as_array().unwrap();
        let bob = players
            .iter()
            .find(|p| p["id"] == Value::from("b"))
            .unwrap();
        for masked in bob["hand"].as_array().unwrap() {
            assert_eq!(masked, &Value::from("Hidden"));
        }
        // The raw rank strings of bob's cards must not appear anywhere in
        // the serialized hand.
        let serialized = serde_json::to_string(&bob["hand"]).unwrap();
        for card in bob_cards {
            assert!(!serialized.contains(&card.rank.to_string()));
        }
    }

    #[test]
    fn hidden_cards_serialize_as_placeholder_strings() {
        let card = Card::new(Rank::Ace, Suit::Spade);
        assert_eq!(
            serde_json::to_value(CardView::Up(card)).unwrap(),
            serde_json::json!({"rank": "A", "suit": "♠"})
        );
        assert_eq!(
            serde_json::to_value(CardView::Hidden).unwrap(),
            Value::from("Hidden")
        );
    }
}
