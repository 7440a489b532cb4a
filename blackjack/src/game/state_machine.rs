//! Table state machine.
//!
//! A [`Table`] owns its players, dealer, shoe, bets, turn pointer, and
//! phase. Every mutation funnels through it, and any rejected action is a
//! strict no-op on table state.

use serde::{Deserialize, Serialize};
use std::{collections::HashMap, fmt};
use thiserror::Error;

use super::constants::{DEALER_STAND, TARGET_SCORE};
use super::entities::{Chips, Dealer, Deck, Player, PlayerId, PlayerName, PlayerStatus};
use crate::TableId;

/// Errors that can occur when a player acts on a table.
#[derive(Clone, Debug, Deserialize, Eq, Error, PartialEq, Serialize)]
pub enum GameError {
    #[error("table is full")]
    CapacityReached,
    #[error("table does not exist")]
    TableDoesNotExist,
    #[error("player does not exist")]
    PlayerDoesNotExist,
    #[error("not your turn")]
    OutOfTurnAction,
    #[error("action not allowed right now")]
    InvalidPhase,
    #[error("bet must be a positive amount")]
    InvalidBet,
    #[error("bet already placed")]
    BetAlreadyPlaced,
    #[error("need ${amount}, have ${chips}")]
    InsufficientFunds { amount: Chips, chips: Chips },
    #[error("already stayed or busted")]
    NotPlaying,
}

/// The table-wide stage of a round.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Lobby,
    Betting,
    PlayerTurns,
    DealerTurn,
    Resolved,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let repr = match self {
            Self::Lobby => "lobby",
            Self::Betting => "betting",
            Self::PlayerTurns => "player_turns",
            Self::DealerTurn => "dealer_turn",
            Self::Resolved => "resolved",
        };
        write!(f, "{repr}")
    }
}

/// How a player's hand fared against the dealer.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Win,
    Push,
    Lose,
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let repr = match self {
            Self::Win => "win",
            Self::Push => "push",
            Self::Lose => "lose",
        };
        write!(f, "{repr}")
    }
}

/// One isolated game room with its own shoe, players, and dealer.
///
/// Seating order is join order. The turn order is snapshotted from the
/// seating at deal time and fixed for the duration of the round.
#[derive(Debug)]
pub struct Table {
    id: TableId,
    players: Vec<Player>,
    dealer: Dealer,
    deck: Deck,
    phase: Phase,
    turn_order: Vec<PlayerId>,
    turn_idx: usize,
    results: HashMap<PlayerId, Outcome>,
    max_seats: usize,
    starting_chips: Chips,
}

impl Table {
    #[must_use]
    pub fn new(id: TableId, deck: Deck, max_seats: usize, starting_chips: Chips) -> Self {
        Self {
            id,
            players: Vec::with_capacity(max_seats),
            dealer: Dealer::default(),
            deck,
            phase: Phase::Lobby,
            turn_order: Vec::new(),
            turn_idx: 0,
            results: HashMap::new(),
            max_seats,
            starting_chips,
        }
    }

    #[must_use]
    pub fn id(&self) -> TableId {
        self.id
    }

    #[must_use]
    pub fn phase(&self) -> Phase {
        self.phase
    }

    #[must_use]
    pub fn players(&self) -> &[Player] {
        &self.players
    }

    #[must_use]
    pub fn player(&self, id: &PlayerId) -> Option<&Player> {
        self.players.iter().find(|p| &p.id == id)
    }

    #[must_use]
    pub fn player_count(&self) -> usize {
        self.players.len()
    }

    #[must_use]
    pub fn dealer(&self) -> &Dealer {
        &self.dealer
    }

    #[must_use]
    pub fn deck_count(&self) -> usize {
        self.deck.remaining()
    }

    #[must_use]
    pub fn results(&self) -> &HashMap<PlayerId, Outcome> {
        &self.results
    }

    /// The player whose turn it is, valid only during `PlayerTurns`.
    #[must_use]
    pub fn turn_player(&self) -> Option<&PlayerId> {
        if self.phase == Phase::PlayerTurns {
            self.turn_order.get(self.turn_idx)
        } else {
            None
        }
    }

    /// Append externally sourced cards to the shoe.
    pub fn extend_deck(&mut self, cards: Vec<super::entities::Card>) {
        self.deck.extend(cards);
    }

    /// Seat a player, issuing a fresh chip stack on first join. Joining
    /// with an id already at the table is a no-op reconnect.
    ///
    /// A lone player joining an idle table auto-starts the round with an
    /// implicit zero bet.
    pub fn seat(&mut self, id: PlayerId, name: PlayerName) -> Result<(), GameError> {
        if self.player(&id).is_some() {
            return Ok(());
        }
        if self.players.len() >= self.max_seats {
            return Err(GameError::CapacityReached);
        }
        let mut player = Player::new(id, name, self.starting_chips);
        // Joining mid-betting enters the current round; any later phase
        // waits for the next one.
        player.status = if self.phase == Phase::Betting {
            PlayerStatus::Betting
        } else {
            PlayerStatus::Waiting
        };
        self.players.push(player);

        if self.players.len() == 1 && self.phase == Phase::Lobby {
            self.open_betting();
        }
        Ok(())
    }

    /// Remove a player from the table. If the departing player held the
    /// current turn, the turn advances before anything is broadcast.
    pub fn remove(&mut self, id: &PlayerId) -> Result<(), GameError> {
        let pos = self
            .players
            .iter()
            .position(|p| &p.id == id)
            .ok_or(GameError::PlayerDoesNotExist)?;
        self.players.remove(pos);

        if self.players.is_empty() {
            self.reset_to_lobby();
            return Ok(());
        }

        match self.phase {
            Phase::PlayerTurns => {
                if let Some(tpos) = self.turn_order.iter().position(|pid| pid == id) {
                    self.turn_order.remove(tpos);
                    if tpos < self.turn_idx {
                        self.turn_idx -= 1;
                    } else if self.turn_idx >= self.turn_order.len() {
                        self.turn_idx = 0;
                    }
                }
                self.settle_turn();
            }
            // The leaver may have been the last seat without a wager.
            Phase::Betting => self.maybe_deal(),
            _ => {}
        }
        Ok(())
    }

    /// Explicit start request: opens betting from the lobby, or restarts
    /// the next round early once resolved.
    pub fn start(&mut self, requester: &PlayerId) -> Result<(), GameError> {
        if self.player(requester).is_none() {
            return Err(GameError::PlayerDoesNotExist);
        }
        match self.phase {
            Phase::Lobby | Phase::Resolved => {
                self.open_betting();
                Ok(())
            }
            _ => Err(GameError::InvalidPhase),
        }
    }

    /// Begin the next round after resolution. Hands, bets, and statuses
    /// reset; chips and membership carry over.
    pub fn next_round(&mut self) -> Result<(), GameError> {
        if self.phase != Phase::Resolved {
            return Err(GameError::InvalidPhase);
        }
        self.open_betting();
        Ok(())
    }

    /// Place a wager. The bet is debited immediately; a bet exceeding the
    /// player's chips is rejected without mutation.
    pub fn place_bet(&mut self, id: &PlayerId, amount: Chips) -> Result<(), GameError> {
        if self.phase != Phase::Betting {
            return Err(GameError::InvalidPhase);
        }
        let player = self
            .players
            .iter_mut()
            .find(|p| &p.id == id)
            .ok_or(GameError::PlayerDoesNotExist)?;
        if amount == 0 {
            return Err(GameError::InvalidBet);
        }
        if player.bet > 0 {
            return Err(GameError::BetAlreadyPlaced);
        }
        if amount > player.chips {
            return Err(GameError::InsufficientFunds {
                amount,
                chips: player.chips,
            });
        }
        player.chips -= amount;
        player.bet = amount;
        self.maybe_deal();
        Ok(())
    }

    /// Draw one card for the current-turn player. Going over the target
    /// busts the player and forces a turn advance; otherwise they may hit
    /// again.
    pub fn hit(&mut self, id: &PlayerId) -> Result<(), GameError> {
        self.check_turn(id)?;
        let card = self.deck.draw();
        let player = self
            .players
            .iter_mut()
            .find(|p| &p.id == id)
            .ok_or(GameError::PlayerDoesNotExist)?;
        player.hand.push(card);
        if player.hand.is_busted() {
            player.status = PlayerStatus::Busted;
            self.advance_turn();
        }
        Ok(())
    }

    /// Stand on the current hand and pass the turn.
    pub fn stay(&mut self, id: &PlayerId) -> Result<(), GameError> {
        self.check_turn(id)?;
        if let Some(player) = self.players.iter_mut().find(|p| &p.id == id) {
            player.status = PlayerStatus::Stayed;
        }
        self.advance_turn();
        Ok(())
    }

    /// Dealer automation: draw while under the stand threshold, then
    /// settle every hand. Legal only during `DealerTurn`.
    pub fn play_dealer(&mut self) -> Result<(), GameError> {
        if self.phase != Phase::DealerTurn {
            return Err(GameError::InvalidPhase);
        }
        while self.dealer.hand.score() < DEALER_STAND {
            let card = self.deck.draw();
            self.dealer.hand.push(card);
        }
        self.resolve();
        Ok(())
    }

    fn check_turn(&self, id: &PlayerId) -> Result<(), GameError> {
        if self.phase != Phase::PlayerTurns {
            return Err(GameError::InvalidPhase);
        }
        let player = self.player(id).ok_or(GameError::PlayerDoesNotExist)?;
        if self.turn_order.get(self.turn_idx) != Some(id) {
            return Err(GameError::OutOfTurnAction);
        }
        if player.status != PlayerStatus::Playing {
            return Err(GameError::NotPlaying);
        }
        Ok(())
    }

    /// Reset per-round state and open betting. Deals immediately when a
    /// single seat is occupied (implicit zero bet).
    fn open_betting(&mut self) {
        self.phase = Phase::Betting;
        self.results.clear();
        self.dealer.hand.clear();
        self.turn_order.clear();
        self.turn_idx = 0;
        for player in &mut self.players {
            player.hand.clear();
            player.bet = 0;
            player.status = PlayerStatus::Betting;
        }
        self.maybe_deal();
    }

    /// Deal when betting is complete: every seated player wagered, or a
    /// lone player skips betting entirely.
    fn maybe_deal(&mut self) {
        if self.phase != Phase::Betting {
            return;
        }
        let solo = self.players.len() == 1;
        if solo || self.players.iter().all(|p| p.bet > 0) {
            self.deal();
        }
    }

    /// Deal two cards to every seated player and two to the dealer, then
    /// snapshot the turn order from the current seating.
    fn deal(&mut self) {
        for i in 0..self.players.len() {
            let first = self.deck.draw();
            let second = self.deck.draw();
            let player = &mut self.players[i];
            player.hand.clear();
            player.hand.push(first);
            player.hand.push(second);
            player.status = PlayerStatus::Playing;
        }
        self.dealer.hand.clear();
        let up = self.deck.draw();
        let hole = self.deck.draw();
        self.dealer.hand.push(up);
        self.dealer.hand.push(hole);

        self.turn_order = self.players.iter().map(|p| p.id.clone()).collect();
        self.turn_idx = 0;
        self.phase = Phase::PlayerTurns;
    }

    /// Scan forward circularly from just past the current seat for the
    /// next player still playing; hand over to the dealer if none remain.
    fn advance_turn(&mut self) {
        let n = self.turn_order.len();
        for step in 1..=n {
            let idx = (self.turn_idx + step) % n;
            if self.is_playing(&self.turn_order[idx]) {
                self.turn_idx = idx;
                return;
            }
        }
        self.phase = Phase::DealerTurn;
    }

    /// Like `advance_turn`, but the current seat itself may still hold
    /// the turn. Used after a departure reshapes the turn order.
    fn settle_turn(&mut self) {
        let n = self.turn_order.len();
        if n == 0 {
            self.phase = Phase::DealerTurn;
            return;
        }
        for step in 0..n {
            let idx = (self.turn_idx + step) % n;
            if self.is_playing(&self.turn_order[idx]) {
                self.turn_idx = idx;
                return;
            }
        }
        self.phase = Phase::DealerTurn;
    }

    fn is_playing(&self, id: &PlayerId) -> bool {
        self.player(id)
            .is_some_and(|p| p.status == PlayerStatus::Playing)
    }

    /// Settle every dealt hand against the dealer and credit payouts.
    /// Wins pay 2x the bet, a natural adds a half-bet bonus (truncated),
    /// and a push refunds the bet. Bets zero out regardless of outcome.
    fn resolve(&mut self) {
        let dealer_score = self.dealer.hand.score();
        for player in &mut self.players {
            if player.hand.is_empty() {
                // Seated mid-round, never dealt in.
                continue;
            }
            let score = player.hand.score();
            let bet = player.bet;
            let outcome = if score > TARGET_SCORE {
                Outcome::Lose
            } else if dealer_score > TARGET_SCORE || score > dealer_score {
                player.chips += 2 * bet;
                if player.hand.is_natural() {
                    player.chips += bet / 2;
                }
                Outcome::Win
            } else if score == dealer_score {
                player.chips += bet;
                Outcome::Push
            } else {
                Outcome::Lose
            };
            player.bet = 0;
            self.results.insert(player.id.clone(), outcome);
        }
        self.phase = Phase::Resolved;
    }

    fn reset_to_lobby(&mut self) {
        self.phase = Phase::Lobby;
        self.dealer.hand.clear();
        self.turn_order.clear();
        self.turn_idx = 0;
        self.results.clear();
    }
}
