//! Integration tests driving full rounds through the table manager and
//! actors: joins, notifications, dealer automation, and table reaping.

use std::{sync::Arc, time::Duration};

use blackjack::{
    CardView, GameError, LocalDeckSource, Phase, PlayerId, PlayerName, PlayerStatus, TableConfig,
    TableId, TableManager, TableMessage, TableNotice,
};
use tokio::sync::mpsc;

fn manager() -> TableManager {
    TableManager::new(TableConfig::default(), Arc::new(LocalDeckSource))
}

fn player(id: &str) -> (PlayerId, PlayerName) {
    (PlayerId::from(id.to_string()), PlayerName::new(id))
}

#[tokio::test]
async fn join_unknown_table_creates_it() {
    let manager = manager();
    let table_id = TableId::new_v4();
    let (alice, alice_name) = player("alice");

    assert_eq!(manager.active_table_count().await, 0);
    manager.join(table_id, alice, alice_name).await.unwrap();
    assert_eq!(manager.active_table_count().await, 1);
    assert!(manager.get_table(table_id).await.is_some());
}

#[tokio::test]
async fn solo_join_deals_immediately() {
    let manager = manager();
    let table_id = manager.create_table().await;
    let (alice, alice_name) = player("alice");

    manager
        .join(table_id, alice.clone(), alice_name)
        .await
        .unwrap();

    // A lone player needs no wager: the round deals on arrival.
    let view = manager.view(table_id, Some(alice.clone())).await.unwrap();
    assert_eq!(view.phase, Phase::PlayerTurns);
    assert_eq!(view.players.len(), 1);
    assert_eq!(view.players[0].hand.len(), 2);
    assert!(view.players[0].score.is_some());

    // Dealer shows the upcard only.
    assert_eq!(view.dealer.hand.len(), 2);
    assert!(matches!(view.dealer.hand[0], CardView::Up(_)));
    assert_eq!(view.dealer.hand[1], CardView::Hidden);
    assert!(view.dealer.score.is_none());
}

#[tokio::test]
async fn broadcast_view_masks_every_hand() {
    let manager = manager();
    let table_id = manager.create_table().await;
    let (alice, alice_name) = player("alice");
    let (bob, bob_name) = player("bob");

    manager
        .join(table_id, alice.clone(), alice_name)
        .await
        .unwrap();
    manager.join(table_id, bob.clone(), bob_name).await.unwrap();

    let alice_view = manager.view(table_id, Some(alice.clone())).await.unwrap();
    let seat = |view: &blackjack::TableView, id: &PlayerId| {
        view.players
            .iter()
            .position(|p| &p.id == id)
            .expect("player seated")
    };

    // Alice sees her own cards and nobody else's.
    let a = seat(&alice_view, &alice);
    let b = seat(&alice_view, &bob);
    assert!(
        alice_view.players[a]
            .hand
            .iter()
            .all(|c| matches!(c, CardView::Up(_)))
    );
    assert!(
        alice_view.players[b]
            .hand
            .iter()
            .all(|c| *c == CardView::Hidden)
    );

    // The generic broadcast view reveals nothing.
    let broadcast = manager.view(table_id, None).await.unwrap();
    for seat in &broadcast.players {
        assert!(seat.hand.iter().all(|c| *c == CardView::Hidden));
        assert!(seat.score.is_none());
    }
}

#[tokio::test(start_paused = true)]
async fn stay_runs_dealer_and_resolves() {
    let manager = manager();
    let config = TableConfig::default();
    let table_id = manager.create_table().await;
    let (alice, alice_name) = player("alice");

    manager
        .join(table_id, alice.clone(), alice_name)
        .await
        .unwrap();
    manager.stay(table_id, alice.clone()).await.unwrap();

    // Past the dealer pause (plus a tick), the dealer has played out.
    tokio::time::sleep(config.dealer_pause() + Duration::from_millis(500)).await;

    let view = manager.view(table_id, Some(alice.clone())).await.unwrap();
    assert_eq!(view.phase, Phase::Resolved);
    assert!(view.results.contains_key(&alice));

    // The hole card is revealed and the dealer drew to at least 17.
    assert!(
        view.dealer
            .hand
            .iter()
            .all(|c| matches!(c, CardView::Up(_)))
    );
    assert!(view.dealer.score.is_some_and(|s| s >= 17));
}

#[tokio::test(start_paused = true)]
async fn resolved_round_restarts_automatically() {
    let manager = manager();
    let config = TableConfig::default();
    let table_id = manager.create_table().await;
    let (alice, alice_name) = player("alice");

    manager
        .join(table_id, alice.clone(), alice_name)
        .await
        .unwrap();
    manager.stay(table_id, alice.clone()).await.unwrap();

    tokio::time::sleep(config.dealer_pause() + Duration::from_millis(500)).await;
    assert_eq!(
        manager.view(table_id, None).await.unwrap().phase,
        Phase::Resolved
    );

    // After the restart delay a lone player deals straight back in.
    tokio::time::sleep(config.restart_delay() + Duration::from_millis(500)).await;
    let view = manager.view(table_id, Some(alice.clone())).await.unwrap();
    assert_eq!(view.phase, Phase::PlayerTurns);
    assert_eq!(view.players[0].hand.len(), 2);
    assert!(view.results.is_empty());
}

#[tokio::test]
async fn waiting_player_cannot_act_mid_round() {
    let manager = manager();
    let table_id = manager.create_table().await;
    let (alice, alice_name) = player("alice");
    let (bob, bob_name) = player("bob");

    // Alice's solo round is already underway when Bob arrives.
    manager
        .join(table_id, alice.clone(), alice_name)
        .await
        .unwrap();
    manager.join(table_id, bob.clone(), bob_name).await.unwrap();

    let view = manager.view(table_id, Some(bob.clone())).await.unwrap();
    let bob_seat = view.players.iter().find(|p| p.id == bob).unwrap();
    assert_eq!(bob_seat.status, PlayerStatus::Waiting);

    assert_eq!(
        manager.hit(table_id, bob.clone()).await,
        Err(GameError::OutOfTurnAction)
    );
    assert_eq!(
        manager.place_bet(table_id, bob.clone(), 100).await,
        Err(GameError::InvalidPhase)
    );
}

#[tokio::test]
async fn last_leave_reaps_the_table() {
    let manager = manager();
    let table_id = manager.create_table().await;
    let (alice, alice_name) = player("alice");

    manager
        .join(table_id, alice.clone(), alice_name)
        .await
        .unwrap();
    manager.leave(table_id, alice.clone()).await.unwrap();

    assert_eq!(manager.active_table_count().await, 0);
    assert_eq!(
        manager.view(table_id, Some(alice)).await.unwrap_err(),
        GameError::TableDoesNotExist
    );
}

#[tokio::test]
async fn disconnect_vacates_the_seat() {
    let manager = manager();
    let table_id = manager.create_table().await;
    let (alice, alice_name) = player("alice");
    let (bob, bob_name) = player("bob");

    let alice_conn = manager
        .join(table_id, alice.clone(), alice_name)
        .await
        .unwrap();
    manager.join(table_id, bob.clone(), bob_name).await.unwrap();

    manager.disconnect(alice_conn).await;

    let view = manager.view(table_id, Some(bob)).await.unwrap();
    assert_eq!(view.players.len(), 1);
    assert!(view.players.iter().all(|p| p.id != alice));
}

#[tokio::test]
async fn rejoin_keeps_the_same_seat() {
    let manager = manager();
    let table_id = manager.create_table().await;
    let (alice, alice_name) = player("alice");

    manager
        .join(table_id, alice.clone(), alice_name.clone())
        .await
        .unwrap();
    // Reconnect under the same player id: no duplicate seat.
    manager
        .join(table_id, alice.clone(), alice_name)
        .await
        .unwrap();

    let view = manager.view(table_id, Some(alice)).await.unwrap();
    assert_eq!(view.players.len(), 1);
}

#[tokio::test]
async fn subscribers_hear_about_joins() {
    let manager = manager();
    let table_id = manager.create_table().await;
    let (alice, alice_name) = player("alice");
    let (bob, bob_name) = player("bob");

    manager
        .join(table_id, alice.clone(), alice_name)
        .await
        .unwrap();
    let handle = manager.get_table(table_id).await.unwrap();

    let (tx, mut rx) = mpsc::channel(32);
    handle
        .send(TableMessage::Subscribe {
            player_id: alice.clone(),
            sender: tx,
        })
        .await
        .unwrap();

    manager.join(table_id, bob.clone(), bob_name).await.unwrap();

    let mut notices = Vec::new();
    while let Ok(notice) = rx.try_recv() {
        notices.push(notice);
    }
    assert!(notices.contains(&TableNotice::PlayerListChanged));
}
