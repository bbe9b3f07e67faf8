//! Shared application state

use crate::application::services::StatusService;

/// Shared application state handed to HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// Live server status, shared with the ingest worker
    pub status: StatusService,
}

impl AppState {
    pub fn new(status: StatusService) -> Self {
        Self { status }
    }
}
