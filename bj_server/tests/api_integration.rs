//! Integration tests for the HTTP API surface.
//!
//! Drives the router in-process with `tower::ServiceExt::oneshot`; no
//! sockets are opened.

use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use bj_server::api::{AppState, create_router};
use blackjack::{LocalDeckSource, TableConfig, TableManager};
use http_body_util::BodyExt;
use std::sync::Arc;
use tower::ServiceExt; // For `oneshot` method

fn create_test_server() -> (axum::Router, Arc<TableManager>) {
    let table_manager = Arc::new(TableManager::new(
        TableConfig::default(),
        Arc::new(LocalDeckSource),
    ));
    let app = create_router(AppState {
        table_manager: table_manager.clone(),
    });
    (app, table_manager)
}

async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn health_check_reports_healthy() {
    let (app, _) = create_test_server();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["status"], "healthy");
    assert_eq!(json["tables"]["active_count"], 0);
}

#[tokio::test]
async fn create_table_then_list_it() {
    let (app, _) = create_test_server();

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/tables")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let created = body_json(response).await;
    let table_id = created["table_id"].as_str().unwrap().to_string();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/tables")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    let tables = json["tables"].as_array().unwrap();
    assert_eq!(tables.len(), 1);
    assert_eq!(tables[0]["table_id"], table_id.as_str());
    assert_eq!(tables[0]["phase"], "lobby");
    assert_eq!(tables[0]["player_count"], 0);
}

#[tokio::test]
async fn get_table_returns_masked_view() {
    let (app, manager) = create_test_server();
    let table_id = manager.create_table().await;

    let response = app
        .oneshot(
            Request::builder()
                .uri(format!("/api/tables/{table_id}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["phase"], "lobby");
    assert_eq!(json["players"].as_array().unwrap().len(), 0);
    assert_eq!(json["dealer"]["hand"].as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn get_unknown_table_is_not_found() {
    let (app, _) = create_test_server();

    let response = app
        .oneshot(
            Request::builder()
                .uri(format!("/api/tables/{}", uuid::Uuid::new_v4()))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let json = body_json(response).await;
    assert!(json["error"].as_str().is_some());
}

#[tokio::test]
async fn start_on_unknown_table_is_not_found() {
    let (app, _) = create_test_server();

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(format!("/api/tables/{}/start", uuid::Uuid::new_v4()))
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(r#"{"player_id": "alice"}"#))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn start_from_lobby_requires_a_seated_player() {
    let (app, manager) = create_test_server();
    let table_id = manager.create_table().await;

    // The requester is not seated at the table.
    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(format!("/api/tables/{table_id}/start"))
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(r#"{"player_id": "ghost"}"#))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
