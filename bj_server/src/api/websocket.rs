//! WebSocket handler for real-time table play.
//!
//! This module implements the bidirectional connection for live game
//! communication. Connecting seats the player; after that, every table
//! state change pushes a fresh masked view and the client sends game
//! actions as JSON messages.
//!
//! # Connection Flow
//!
//! 1. Client connects via `GET /ws/:table_id?player_id=<id>&name=<name>`
//! 2. Server seats the player (creating the table if the id is unknown)
//!    and upgrades the connection
//! 3. Server spawns a send task: on each change notification it fetches
//!    the viewer's masked view and pushes it
//! 4. On disconnect the seat is vacated
//!
//! # Client Messages
//!
//! ```json
//! {"type": "place_bet", "amount": 100}
//! {"type": "hit"}
//! {"type": "stay"}
//! {"type": "leave"}
//! ```
//!
//! # Server Messages
//!
//! The server sends two kinds of messages: full table views (objects
//! with a `phase` field), and command responses (`{"type": "success"}`
//! or `{"type": "error", "message": ...}`). Action outcomes go only to
//! the connection that sent the action; state changes reach everyone
//! through view pushes.

use axum::{
    extract::{
        Path, Query, State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::{IntoResponse, Response},
};
use futures_util::{SinkExt, StreamExt};
use log::{info, warn};
use serde::{Deserialize, Serialize};

use blackjack::{
    Chips, ConnectionId, GameError, PlayerId, PlayerName, TableId, TableMessage, TableNotice,
};

use super::{AppState, tables::error_status};
use crate::metrics;

#[derive(Debug, Deserialize)]
pub struct WsQuery {
    player_id: String,
    name: String,
}

/// Client messages received via WebSocket
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ClientMessage {
    /// Place a wager during the betting phase
    PlaceBet { amount: Chips },
    /// Draw a card on this player's turn
    Hit,
    /// Stand on the current hand
    Stay,
    /// Vacate the seat and end the session
    Leave,
}

impl ClientMessage {
    fn action_name(&self) -> &'static str {
        match self {
            Self::PlaceBet { .. } => "place_bet",
            Self::Hit => "hit",
            Self::Stay => "stay",
            Self::Leave => "leave",
        }
    }
}

/// Response messages sent to client
#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ServerResponse {
    Success,
    Error { message: String },
}

/// Upgrade an HTTP connection to a WebSocket game session.
///
/// Seats the player at the table before upgrading, so a full table or a
/// mid-round capacity problem is reported as a plain HTTP error rather
/// than an immediately-closed socket.
pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    Path(table_id): Path<TableId>,
    Query(query): Query<WsQuery>,
    State(state): State<AppState>,
) -> Response {
    let player_id = PlayerId::from(query.player_id);
    let name = PlayerName::new(&query.name);

    let connection_id = match state
        .table_manager
        .join(table_id, player_id.clone(), name)
        .await
    {
        Ok(connection_id) => connection_id,
        Err(e) => {
            return (error_status(&e), e.to_string()).into_response();
        }
    };

    ws.on_upgrade(move |socket| handle_socket(socket, table_id, player_id, connection_id, state))
}

/// Handle an established WebSocket connection.
///
/// Spawns a send task that pushes the viewer's masked view on every
/// table notification, then processes incoming client actions until the
/// socket closes. On disconnect the seat is vacated through the manager.
async fn handle_socket(
    socket: WebSocket,
    table_id: TableId,
    player_id: PlayerId,
    connection_id: ConnectionId,
    state: AppState,
) {
    let (mut sender, mut receiver) = socket.split();

    info!("WebSocket connected: table={table_id}, player={player_id}");
    metrics::websocket_connection_change(1);

    // Channel for command responses produced by the receive loop
    let (response_tx, mut response_rx) = tokio::sync::mpsc::channel::<String>(32);

    // Subscribe to table state change notifications
    let (notification_tx, mut notification_rx) = tokio::sync::mpsc::channel::<TableNotice>(32);

    let subscribed = match state.table_manager.get_table(table_id).await {
        Some(handle) => handle
            .send(TableMessage::Subscribe {
                player_id: player_id.clone(),
                sender: notification_tx,
            })
            .await
            .is_ok(),
        None => false,
    };
    if !subscribed {
        warn!("Failed to subscribe to table {table_id} notifications");
        metrics::websocket_connection_change(-1);
        state.table_manager.disconnect(connection_id).await;
        return;
    }

    // Push the initial view so the client renders without waiting for a
    // state change.
    if let Ok(view) = state
        .table_manager
        .view(table_id, Some(player_id.clone()))
        .await
        && let Ok(json) = serde_json::to_string(&view)
        && sender.send(Message::Text(json.into())).await.is_err()
    {
        metrics::websocket_connection_change(-1);
        state.table_manager.disconnect(connection_id).await;
        return;
    }

    // Send task: view pushes are event-driven off table notifications.
    let send_state = state.clone();
    let send_player = player_id.clone();
    let send_task = tokio::spawn(async move {
        loop {
            tokio::select! {
                notification = notification_rx.recv() => {
                    if notification.is_none() {
                        break;
                    }
                    match send_state
                        .table_manager
                        .view(table_id, Some(send_player.clone()))
                        .await
                    {
                        Ok(view) => {
                            let json = match serde_json::to_string(&view) {
                                Ok(j) => j,
                                Err(e) => {
                                    warn!("Failed to serialize table view: {e}");
                                    continue;
                                }
                            };
                            if sender.send(Message::Text(json.into())).await.is_err() {
                                break;
                            }
                        }
                        // The table is gone; the socket is about to close.
                        Err(_) => break,
                    }
                }
                response = response_rx.recv() => {
                    match response {
                        Some(json) => {
                            if sender.send(Message::Text(json.into())).await.is_err() {
                                break;
                            }
                        }
                        None => break,
                    }
                }
            }
        }
    });

    // Receive messages from the client
    while let Some(msg) = receiver.next().await {
        match msg {
            Ok(Message::Text(text)) => {
                let (response, leaving) = match serde_json::from_str::<ClientMessage>(&text) {
                    Ok(client_msg) => {
                        metrics::player_actions_total(client_msg.action_name());
                        let leaving = matches!(client_msg, ClientMessage::Leave);
                        let result =
                            handle_client_message(client_msg, table_id, &player_id, &state).await;
                        (to_server_response(result), leaving)
                    }
                    Err(e) => {
                        warn!("Failed to parse client message: {e}");
                        (
                            ServerResponse::Error {
                                message: "Invalid message format".to_string(),
                            },
                            false,
                        )
                    }
                };

                let ok = matches!(response, ServerResponse::Success);
                if let Ok(json) = serde_json::to_string(&response)
                    && response_tx.send(json).await.is_err()
                {
                    break;
                }
                if leaving && ok {
                    break;
                }
            }
            Ok(Message::Close(_)) => {
                info!("WebSocket closed: table={table_id}, player={player_id}");
                break;
            }
            Err(e) => {
                warn!("WebSocket error: {e}");
                break;
            }
            _ => {}
        }
    }

    send_task.abort();

    if let Some(handle) = state.table_manager.get_table(table_id).await {
        let _ = handle
            .send(TableMessage::Unsubscribe {
                player_id: player_id.clone(),
            })
            .await;
    }

    // Vacate the seat; a no-op if the client already left explicitly.
    state.table_manager.disconnect(connection_id).await;
    metrics::websocket_connection_change(-1);

    info!("WebSocket disconnected: table={table_id}, player={player_id}");
}

/// Route one client action through the table manager.
async fn handle_client_message(
    msg: ClientMessage,
    table_id: TableId,
    player_id: &PlayerId,
    state: &AppState,
) -> Result<(), GameError> {
    match msg {
        ClientMessage::PlaceBet { amount } => {
            state
                .table_manager
                .place_bet(table_id, player_id.clone(), amount)
                .await
        }
        ClientMessage::Hit => state.table_manager.hit(table_id, player_id.clone()).await,
        ClientMessage::Stay => state.table_manager.stay(table_id, player_id.clone()).await,
        ClientMessage::Leave => {
            state
                .table_manager
                .leave(table_id, player_id.clone())
                .await
        }
    }
}

fn to_server_response(result: Result<(), GameError>) -> ServerResponse {
    match result {
        Ok(()) => ServerResponse::Success,
        Err(e) => ServerResponse::Error {
            message: e.to_string(),
        },
    }
}
