//! Table actor implementation with async message handling.

use std::{collections::HashMap, sync::Arc};
use tokio::{
    sync::mpsc,
    time::{Duration, Instant, interval},
};

use super::{
    config::TableConfig,
    messages::{TableMessage, TableNotice, TableResponse, TableSummary},
};
use crate::{
    TableId,
    game::{
        entities::{Deck, PlayerId},
        state_machine::{GameError, Phase, Table},
    },
    source::{self, DeckSource},
};

/// Handle for sending messages to a table actor.
#[derive(Clone)]
pub struct TableHandle {
    sender: mpsc::Sender<TableMessage>,
    table_id: TableId,
}

impl TableHandle {
    pub fn new(sender: mpsc::Sender<TableMessage>, table_id: TableId) -> Self {
        Self { sender, table_id }
    }

    pub fn table_id(&self) -> TableId {
        self.table_id
    }

    /// Send a message to the table. Fails once the actor has shut down.
    pub async fn send(&self, message: TableMessage) -> Result<(), GameError> {
        self.sender
            .send(message)
            .await
            .map_err(|_| GameError::TableDoesNotExist)
    }
}

/// Actor owning a single blackjack table.
///
/// The actor task is the table's exclusive-access scope: every mutation
/// of the underlying [`Table`] happens inside `run`, one message at a
/// time. The only await inside the scope is the deck fetch, which is
/// time-bounded with a local fallback.
pub struct TableActor {
    table: Table,
    config: TableConfig,
    inbox: mpsc::Receiver<TableMessage>,
    deck_source: Arc<dyn DeckSource>,

    /// Subscribers for state change notifications
    subscribers: HashMap<PlayerId, mpsc::Sender<TableNotice>>,

    /// When set, the dealer plays out at this instant (cosmetic pause
    /// after the turn-over reveal)
    dealer_due: Option<Instant>,

    /// When set, the resolved round restarts at this instant
    restart_due: Option<Instant>,

    is_closed: bool,
}

impl TableActor {
    pub fn new(
        id: TableId,
        config: TableConfig,
        deck_source: Arc<dyn DeckSource>,
    ) -> (Self, TableHandle) {
        let (sender, inbox) = mpsc::channel(100);
        let table = Table::new(
            id,
            Deck::new(config.deck_sets),
            config.max_seats,
            config.starting_chips,
        );
        let actor = Self {
            table,
            config,
            inbox,
            deck_source,
            subscribers: HashMap::new(),
            dealer_due: None,
            restart_due: None,
            is_closed: false,
        };
        let handle = TableHandle::new(sender, id);
        (actor, handle)
    }

    /// Run the table actor event loop.
    pub async fn run(mut self) {
        log::info!("Table {} starting", self.table.id());

        let mut tick = interval(Duration::from_millis(250));

        loop {
            tokio::select! {
                message = self.inbox.recv() => {
                    match message {
                        Some(message) => self.handle_message(message).await,
                        None => break,
                    }
                    if self.is_closed {
                        break;
                    }
                }
                _ = tick.tick() => {
                    self.tick().await;
                }
            }
        }

        log::info!("Table {} closed", self.table.id());
    }

    async fn handle_message(&mut self, message: TableMessage) {
        match message {
            TableMessage::Join {
                player_id,
                name,
                response,
            } => {
                // A first join may deal immediately (solo auto-start), so
                // make sure the shoe can cover the round up front.
                self.top_up_shoe(1).await;
                let result = self.table.seat(player_id.clone(), name);
                if result.is_ok() {
                    log::info!("Player {player_id} joined table {}", self.table.id());
                    self.notify(TableNotice::PlayerListChanged);
                    self.follow_up();
                }
                let _ = response.send(Self::to_response(result));
            }

            TableMessage::Start {
                player_id,
                response,
            } => {
                self.top_up_shoe(0).await;
                let result = self.table.start(&player_id);
                if result.is_ok() {
                    self.restart_due = None;
                    self.notify(TableNotice::StateChanged);
                    self.follow_up();
                }
                let _ = response.send(Self::to_response(result));
            }

            TableMessage::PlaceBet {
                player_id,
                amount,
                response,
            } => {
                // The last wager in triggers the deal.
                self.top_up_shoe(0).await;
                let result = self.table.place_bet(&player_id, amount);
                if result.is_ok() {
                    self.notify(TableNotice::StateChanged);
                    self.follow_up();
                }
                let _ = response.send(Self::to_response(result));
            }

            TableMessage::Hit {
                player_id,
                response,
            } => {
                let result = self.table.hit(&player_id);
                if result.is_ok() {
                    self.notify(TableNotice::StateChanged);
                    self.follow_up();
                }
                let _ = response.send(Self::to_response(result));
            }

            TableMessage::Stay {
                player_id,
                response,
            } => {
                let result = self.table.stay(&player_id);
                if result.is_ok() {
                    self.notify(TableNotice::StateChanged);
                    self.follow_up();
                }
                let _ = response.send(Self::to_response(result));
            }

            TableMessage::Leave {
                player_id,
                response,
            } => {
                let result = self.table.remove(&player_id);
                match result {
                    Ok(()) => {
                        self.subscribers.remove(&player_id);
                        log::info!("Player {player_id} left table {}", self.table.id());
                        if self.table.player_count() == 0 {
                            // No grace period: an empty table shuts down.
                            self.is_closed = true;
                            let _ = response.send(TableResponse::Closed);
                        } else {
                            self.notify(TableNotice::PlayerListChanged);
                            self.follow_up();
                            let _ = response.send(TableResponse::Success);
                        }
                    }
                    Err(e) => {
                        let _ = response.send(TableResponse::Error(e));
                    }
                }
            }

            TableMessage::GetView { viewer, response } => {
                let _ = response.send(self.table.project(viewer.as_ref()));
            }

            TableMessage::GetSummary { response } => {
                let _ = response.send(TableSummary {
                    table_id: self.table.id(),
                    phase: self.table.phase(),
                    player_count: self.table.player_count(),
                    max_seats: self.config.max_seats,
                    deck_count: self.table.deck_count(),
                });
            }

            TableMessage::Subscribe { player_id, sender } => {
                log::debug!(
                    "Player {player_id} subscribed to table {} state changes",
                    self.table.id()
                );
                self.subscribers.insert(player_id, sender);
            }

            TableMessage::Unsubscribe { player_id } => {
                log::debug!(
                    "Player {player_id} unsubscribed from table {} state changes",
                    self.table.id()
                );
                self.subscribers.remove(&player_id);
            }
        }
    }

    /// Schedule timer-driven follow-ups after a successful action.
    fn follow_up(&mut self) {
        match self.table.phase() {
            Phase::DealerTurn => {
                if self.dealer_due.is_none() {
                    // The reveal was already broadcast; the pause before
                    // the dealer plays is display timing only.
                    self.dealer_due = Some(Instant::now() + self.config.dealer_pause());
                }
            }
            Phase::Resolved => {
                if self.restart_due.is_none() {
                    self.restart_due = Some(Instant::now() + self.config.restart_delay());
                }
            }
            _ => {
                self.dealer_due = None;
            }
        }
    }

    /// Timer-driven progress: dealer play after the cosmetic pause, and
    /// the automatic restart of a resolved round.
    async fn tick(&mut self) {
        if let Some(due) = self.dealer_due
            && Instant::now() >= due
        {
            self.dealer_due = None;
            if self.table.phase() == Phase::DealerTurn && self.table.play_dealer().is_ok() {
                log::debug!(
                    "Table {} dealer played out at {}",
                    self.table.id(),
                    self.table.dealer().hand.score()
                );
                self.restart_due = Some(Instant::now() + self.config.restart_delay());
                self.notify(TableNotice::RoundResolved);
            }
        }

        if let Some(due) = self.restart_due
            && Instant::now() >= due
        {
            self.restart_due = None;
            self.top_up_shoe(0).await;
            if self.table.next_round().is_ok() {
                self.notify(TableNotice::StateChanged);
                // A lone player deals straight back in.
                self.follow_up();
            }
        }
    }

    /// Make sure the shoe covers the next deal, fetching from the deck
    /// source (time-bounded, local fallback) when it runs short.
    async fn top_up_shoe(&mut self, incoming_players: usize) {
        let needed = (self.table.player_count() + incoming_players) * 2 + 2;
        if self.table.deck_count() < needed {
            let cards = source::fetch_with_fallback(
                self.deck_source.as_ref(),
                self.config.deck_sets,
                self.config.deck_fetch_timeout(),
            )
            .await;
            self.table.extend_deck(cards);
        }
    }

    /// Broadcast a state change notification to all subscribers.
    fn notify(&mut self, notice: TableNotice) {
        self.subscribers.retain(|player_id, sender| {
            match sender.try_send(notice) {
                Ok(()) => true,
                Err(mpsc::error::TrySendError::Full(_)) => {
                    log::warn!("Subscriber {player_id} channel full, dropping notification");
                    true
                }
                Err(mpsc::error::TrySendError::Closed(_)) => {
                    log::debug!("Subscriber {player_id} disconnected, removing");
                    false
                }
            }
        });
    }

    fn to_response(result: Result<(), GameError>) -> TableResponse {
        match result {
            Ok(()) => TableResponse::Success,
            Err(e) => TableResponse::Error(e),
        }
    }
}
