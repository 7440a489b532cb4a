//! Table actor message types.

use tokio::sync::{mpsc, oneshot};

use crate::TableId;
use crate::game::entities::{Chips, PlayerId, PlayerName};
use crate::game::state_machine::{GameError, Phase};
use crate::game::views::TableView;

/// Messages that can be sent to a `TableActor`.
///
/// Every action carries a oneshot response channel: the result of an
/// action is reported only to the initiating connection, never broadcast.
#[derive(Debug)]
pub enum TableMessage {
    /// Seat a player, or re-attach an existing player id on reconnect
    Join {
        player_id: PlayerId,
        name: PlayerName,
        response: oneshot::Sender<TableResponse>,
    },

    /// Out-of-band start request (lobby, or early restart when resolved)
    Start {
        player_id: PlayerId,
        response: oneshot::Sender<TableResponse>,
    },

    /// Place a wager during the betting phase
    PlaceBet {
        player_id: PlayerId,
        amount: Chips,
        response: oneshot::Sender<TableResponse>,
    },

    /// Draw one card on the player's turn
    Hit {
        player_id: PlayerId,
        response: oneshot::Sender<TableResponse>,
    },

    /// Stand on the current hand
    Stay {
        player_id: PlayerId,
        response: oneshot::Sender<TableResponse>,
    },

    /// Vacate the seat
    Leave {
        player_id: PlayerId,
        response: oneshot::Sender<TableResponse>,
    },

    /// Get the masked projection for a viewer (`None` = generic broadcast)
    GetView {
        viewer: Option<PlayerId>,
        response: oneshot::Sender<TableView>,
    },

    /// Get a summary for table discovery
    GetSummary {
        response: oneshot::Sender<TableSummary>,
    },

    /// Subscribe to state change notifications
    Subscribe {
        player_id: PlayerId,
        sender: mpsc::Sender<TableNotice>,
    },

    /// Unsubscribe from state change notifications
    Unsubscribe { player_id: PlayerId },
}

/// Notification sent when table state changes. Carries no game data;
/// subscribers request their own masked view in response.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum TableNotice {
    /// Phase, hands, or bets changed
    StateChanged,
    /// A player joined or left
    PlayerListChanged,
    /// The round settled; outcomes are available
    RoundResolved,
}

/// Response to a table action.
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum TableResponse {
    /// Action applied
    Success,

    /// Action applied, and the table emptied and shut down
    Closed,

    /// Action rejected; table state is untouched
    Error(GameError),
}

impl TableResponse {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success | Self::Closed)
    }

    pub fn error(&self) -> Option<&GameError> {
        match self {
            Self::Error(e) => Some(e),
            _ => None,
        }
    }
}

/// Table summary for discovery listings.
#[derive(Debug, Clone, serde::Serialize)]
pub struct TableSummary {
    pub table_id: TableId,
    pub phase: Phase,
    pub player_count: usize,
    pub max_seats: usize,
    pub deck_count: usize,
}
