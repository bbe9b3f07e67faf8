//! Status API routes
//!
//! Each request takes its own snapshot, so handlers never hold the status
//! lock while serialising.

use axum::{extract::State, Json};
use std::sync::Arc;

use crate::domain::aggregates::StatusSnapshot;
use crate::domain::entities::Player;
use crate::infrastructure::state::AppState;

/// Full server status document
pub async fn get_status(State(state): State<Arc<AppState>>) -> Json<StatusSnapshot> {
    Json(state.status.snapshot().await)
}

/// Registered players in the order they were first seen
pub async fn list_players(State(state): State<Arc<AppState>>) -> Json<Vec<Player>> {
    Json(state.status.snapshot().await.players)
}
