//! Table registry: spawns table actors, routes actions, and maps
//! connection handles to (table, player) identity.

use std::{
    collections::HashMap,
    sync::{
        Arc,
        atomic::{AtomicU64, Ordering},
    },
};
use tokio::sync::{RwLock, oneshot};

use super::{
    actor::{TableActor, TableHandle},
    config::TableConfig,
    messages::{TableMessage, TableResponse, TableSummary},
};
use crate::{
    TableId,
    game::{
        entities::{Chips, PlayerId, PlayerName},
        state_machine::GameError,
    },
    game::views::TableView,
    source::DeckSource,
};

/// Opaque handle for one client connection. Connection handles are
/// reassignable; player identity is carried by [`PlayerId`] instead.
pub type ConnectionId = u64;

/// Process-wide registry of running tables.
///
/// The registry lock guards only creation and deletion of table entries;
/// table internals are owned by their actors. Tables are created on
/// first join to an unknown id and reaped the moment they empty.
pub struct TableManager {
    config: TableConfig,
    deck_source: Arc<dyn DeckSource>,

    /// Active table handles
    tables: Arc<RwLock<HashMap<TableId, TableHandle>>>,

    /// Live connection bindings for disconnect handling
    connections: Arc<RwLock<HashMap<ConnectionId, (TableId, PlayerId)>>>,

    next_connection_id: AtomicU64,
}

impl TableManager {
    pub fn new(config: TableConfig, deck_source: Arc<dyn DeckSource>) -> Self {
        Self {
            config,
            deck_source,
            tables: Arc::new(RwLock::new(HashMap::new())),
            connections: Arc::new(RwLock::new(HashMap::new())),
            next_connection_id: AtomicU64::new(1),
        }
    }

    /// Create and spawn a fresh, empty table.
    pub async fn create_table(&self) -> TableId {
        let table_id = TableId::new_v4();
        let handle = self.spawn_table(table_id).await;
        let mut tables = self.tables.write().await;
        tables.insert(table_id, handle);
        log::info!("Created and spawned table {table_id}");
        table_id
    }

    async fn spawn_table(&self, table_id: TableId) -> TableHandle {
        let (actor, handle) =
            TableActor::new(table_id, self.config.clone(), self.deck_source.clone());
        tokio::spawn(actor.run());
        handle
    }

    pub async fn get_table(&self, table_id: TableId) -> Option<TableHandle> {
        let tables = self.tables.read().await;
        tables.get(&table_id).cloned()
    }

    /// Seat a player at a table, creating the table if the id is unknown
    /// and re-attaching the player id if it is already seated. Returns a
    /// connection handle bound to the (table, player) identity.
    pub async fn join(
        &self,
        table_id: TableId,
        player_id: PlayerId,
        name: PlayerName,
    ) -> Result<ConnectionId, GameError> {
        let handle = match self.get_table(table_id).await {
            Some(handle) => handle,
            None => {
                let mut tables = self.tables.write().await;
                // Someone may have raced us to creation.
                match tables.get(&table_id) {
                    Some(handle) => handle.clone(),
                    None => {
                        let handle = self.spawn_table(table_id).await;
                        tables.insert(table_id, handle.clone());
                        log::info!("Created table {table_id} on first join");
                        handle
                    }
                }
            }
        };

        let (tx, rx) = oneshot::channel();
        handle
            .send(TableMessage::Join {
                player_id: player_id.clone(),
                name,
                response: tx,
            })
            .await?;
        match rx.await.map_err(|_| GameError::TableDoesNotExist)? {
            TableResponse::Success | TableResponse::Closed => {
                let connection_id = self.next_connection_id.fetch_add(1, Ordering::Relaxed);
                let mut connections = self.connections.write().await;
                connections.insert(connection_id, (table_id, player_id));
                Ok(connection_id)
            }
            TableResponse::Error(e) => Err(e),
        }
    }

    /// Vacate a seat, reaping the table if it empties.
    pub async fn leave(&self, table_id: TableId, player_id: PlayerId) -> Result<(), GameError> {
        let handle = self
            .get_table(table_id)
            .await
            .ok_or(GameError::TableDoesNotExist)?;

        let (tx, rx) = oneshot::channel();
        handle
            .send(TableMessage::Leave {
                player_id,
                response: tx,
            })
            .await?;
        match rx.await.map_err(|_| GameError::TableDoesNotExist)? {
            TableResponse::Success => Ok(()),
            TableResponse::Closed => {
                self.remove_table(table_id).await;
                Ok(())
            }
            TableResponse::Error(e) => Err(e),
        }
    }

    /// Connection-loss handling: unbind the handle and vacate the seat it
    /// was attached to. Seats are vacated immediately; a reconnecting
    /// player simply rejoins under the same player id.
    pub async fn disconnect(&self, connection_id: ConnectionId) {
        let binding = {
            let mut connections = self.connections.write().await;
            connections.remove(&connection_id)
        };
        if let Some((table_id, player_id)) = binding {
            log::info!("Connection {connection_id} lost, removing {player_id} from {table_id}");
            if let Err(e) = self.leave(table_id, player_id).await {
                log::debug!("Disconnect cleanup for {table_id}: {e}");
            }
        }
    }

    async fn remove_table(&self, table_id: TableId) {
        let mut tables = self.tables.write().await;
        tables.remove(&table_id);
        drop(tables);

        let mut connections = self.connections.write().await;
        connections.retain(|_, (bound_table, _)| *bound_table != table_id);

        log::info!("Reaped empty table {table_id}");
    }

    /// Route an out-of-band start request.
    pub async fn start_game(
        &self,
        table_id: TableId,
        player_id: PlayerId,
    ) -> Result<(), GameError> {
        self.request(table_id, |response| TableMessage::Start {
            player_id,
            response,
        })
        .await
    }

    pub async fn place_bet(
        &self,
        table_id: TableId,
        player_id: PlayerId,
        amount: Chips,
    ) -> Result<(), GameError> {
        self.request(table_id, |response| TableMessage::PlaceBet {
            player_id,
            amount,
            response,
        })
        .await
    }

    pub async fn hit(&self, table_id: TableId, player_id: PlayerId) -> Result<(), GameError> {
        self.request(table_id, |response| TableMessage::Hit {
            player_id,
            response,
        })
        .await
    }

    pub async fn stay(&self, table_id: TableId, player_id: PlayerId) -> Result<(), GameError> {
        self.request(table_id, |response| TableMessage::Stay {
            player_id,
            response,
        })
        .await
    }

    /// Fetch the masked projection of a table for a viewer.
    pub async fn view(
        &self,
        table_id: TableId,
        viewer: Option<PlayerId>,
    ) -> Result<TableView, GameError> {
        let handle = self
            .get_table(table_id)
            .await
            .ok_or(GameError::TableDoesNotExist)?;
        let (tx, rx) = oneshot::channel();
        handle
            .send(TableMessage::GetView {
                viewer,
                response: tx,
            })
            .await?;
        rx.await.map_err(|_| GameError::TableDoesNotExist)
    }

    /// Summaries of all running tables.
    pub async fn list_tables(&self) -> Vec<TableSummary> {
        let handles: Vec<TableHandle> = {
            let tables = self.tables.read().await;
            tables.values().cloned().collect()
        };

        let mut summaries = Vec::with_capacity(handles.len());
        for handle in handles {
            let (tx, rx) = oneshot::channel();
            if handle
                .send(TableMessage::GetSummary { response: tx })
                .await
                .is_ok()
                && let Ok(summary) = rx.await
            {
                summaries.push(summary);
            }
        }
        summaries
    }

    pub async fn active_table_count(&self) -> usize {
        let tables = self.tables.read().await;
        tables.len()
    }

    async fn request<F>(&self, table_id: TableId, make: F) -> Result<(), GameError>
    where
        F: FnOnce(oneshot::Sender<TableResponse>) -> TableMessage,
    {
        let handle = self
            .get_table(table_id)
            .await
            .ok_or(GameError::TableDoesNotExist)?;
        let (tx, rx) = oneshot::channel();
        handle.send(make(tx)).await?;
        match rx.await.map_err(|_| GameError::TableDoesNotExist)? {
            TableResponse::Success | TableResponse::Closed => Ok(()),
            TableResponse::Error(e) => Err(e),
        }
    }
}
