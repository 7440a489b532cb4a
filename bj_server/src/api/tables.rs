//! Table management API handlers.
//!
//! HTTP REST endpoints for table operations:
//! - Listing all active tables with phase and seat counts
//! - Creating an empty table ahead of the first join
//! - Fetching a masked table view for a viewer
//! - Starting a round early from the lobby or a resolved round
//!
//! # Examples
//!
//! List all tables:
//! ```bash
//! curl http://localhost:6969/api/tables
//! ```
//!
//! Start a round:
//! ```bash
//! curl -X POST http://localhost:6969/api/tables/<id>/start \
//!   -H "Content-Type: application/json" \
//!   -d '{"player_id": "alice"}'
//! ```

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use blackjack::{GameError, PlayerId, TableId, TableSummary};
use serde::{Deserialize, Serialize};

use super::AppState;
use crate::metrics;

#[derive(Debug, Serialize)]
pub struct TableListResponse {
    pub tables: Vec<TableSummary>,
}

#[derive(Debug, Serialize)]
pub struct CreateTableResponse {
    pub table_id: TableId,
}

#[derive(Debug, Deserialize)]
pub struct StartRequest {
    pub player_id: String,
}

#[derive(Debug, Deserialize)]
pub struct ViewQuery {
    /// Viewer identity for hand visibility; omitted means every hand is
    /// masked
    pub player_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// `GET /api/tables` - list all running tables.
pub async fn list_tables(State(state): State<AppState>) -> impl IntoResponse {
    let tables = state.table_manager.list_tables().await;
    metrics::tables_active(tables.len());
    Json(TableListResponse { tables })
}

/// `POST /api/tables` - create an empty table.
pub async fn create_table(State(state): State<AppState>) -> impl IntoResponse {
    let table_id = state.table_manager.create_table().await;
    metrics::tables_active(state.table_manager.active_table_count().await);
    (StatusCode::CREATED, Json(CreateTableResponse { table_id }))
}

/// `GET /api/tables/{table_id}` - masked view of one table.
pub async fn get_table(
    State(state): State<AppState>,
    Path(table_id): Path<TableId>,
    Query(query): Query<ViewQuery>,
) -> Result<impl IntoResponse, (StatusCode, Json<ErrorResponse>)> {
    let viewer = query.player_id.map(PlayerId::from);
    let view = state
        .table_manager
        .view(table_id, viewer)
        .await
        .map_err(error_response)?;
    Ok(Json(view))
}

/// `POST /api/tables/{table_id}/start` - start a round early.
pub async fn start_game(
    State(state): State<AppState>,
    Path(table_id): Path<TableId>,
    Json(request): Json<StartRequest>,
) -> Result<impl IntoResponse, (StatusCode, Json<ErrorResponse>)> {
    state
        .table_manager
        .start_game(table_id, PlayerId::from(request.player_id))
        .await
        .map_err(error_response)?;
    metrics::player_actions_total("start");
    Ok(StatusCode::NO_CONTENT)
}

/// Map a game error to a response status. Missing entities are 404,
/// seat/bet conflicts are 409, everything else is a plain bad request.
pub fn error_status(error: &GameError) -> StatusCode {
    match error {
        GameError::TableDoesNotExist | GameError::PlayerDoesNotExist => StatusCode::NOT_FOUND,
        GameError::CapacityReached | GameError::BetAlreadyPlaced => StatusCode::CONFLICT,
        _ => StatusCode::BAD_REQUEST,
    }
}

fn error_response(error: GameError) -> (StatusCode, Json<ErrorResponse>) {
    (
        error_status(&error),
        Json(ErrorResponse {
            error: error.to_string(),
        }),
    )
}
