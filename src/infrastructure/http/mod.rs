//! HTTP REST API routes

mod status_routes;

use axum::{routing::get, Router};
use std::sync::Arc;

use crate::infrastructure::state::AppState;

/// Create all API routes
pub fn create_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api", get(status_routes::get_status))
        .route("/api/players", get(status_routes::list_players))
}
