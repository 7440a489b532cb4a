//! HTTP/WebSocket API for the blackjack server.
//!
//! This module provides the REST and WebSocket API for the multi-table
//! blackjack platform: table discovery, room lifecycle, and the real-time
//! game connection.
//!
//! # Architecture
//!
//! The API is built with:
//! - **Axum**: Async web framework for HTTP/WebSocket
//! - **Tower**: CORS middleware
//! - **Actor Model**: Table state managed by dedicated actor tasks
//!
//! # Endpoints Overview
//!
//! ```text
//! GET  /health                          - Server health status
//! GET  /api/tables                      - List all tables
//! POST /api/tables                      - Create an empty table
//! GET  /api/tables/{table_id}           - Masked table view
//! POST /api/tables/{table_id}/start     - Start a round early
//! GET  /ws/{table_id}?player_id=&name=  - Establish WebSocket connection
//! ```
//!
//! Game actions (bet, hit, stay, leave) travel over the WebSocket; the
//! HTTP surface covers discovery and out-of-band control.
//!
//! # CORS
//!
//! CORS is configured permissively for development. In production,
//! configure appropriate origins, methods, and headers.

pub mod tables;
pub mod websocket;

use axum::{
    Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::{get, post},
};
use blackjack::TableManager;
use serde_json::json;
use std::sync::Arc;
use tower_http::cors::CorsLayer;

/// Application state shared across all HTTP handlers and WebSocket
/// connections. Cloned per request; the manager is behind an `Arc`.
#[derive(Clone)]
pub struct AppState {
    pub table_manager: Arc<TableManager>,
}

/// Create the complete API router with all endpoints and middleware.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route(
            "/api/tables",
            get(tables::list_tables).post(tables::create_table),
        )
        .route("/api/tables/{table_id}", get(tables::get_table))
        .route("/api/tables/{table_id}/start", post(tables::start_game))
        // WebSocket route identifies the player via query parameters
        .route("/ws/{table_id}", get(websocket::websocket_handler))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Health check endpoint for monitoring and load balancers.
///
/// # Example
///
/// ```bash
/// curl http://localhost:6969/health
/// # {"status":"healthy","version":"1.0.0","tables":{"active_count":3},"timestamp":"..."}
/// ```
async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    let active_count = state.table_manager.active_table_count().await;

    let response = json!({
        "status": "healthy",
        "version": env!("CARGO_PKG_VERSION"),
        "tables": {
            "active_count": active_count
        },
        "timestamp": chrono::Utc::now().to_rfc3339(),
    });

    (StatusCode::OK, Json(response))
}
