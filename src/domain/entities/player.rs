//! Player entity - A user connection seen in the console log

use chrono::NaiveDateTime;
use serde::Serialize;

/// A player registered on the server, keyed by `steam_id`
///
/// Players are never removed from the registry. A disconnect is recorded as a
/// status change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Player {
    pub steam_id: String,
    /// Label of the latest user event for this connection
    pub status: String,
    /// Character name, once a character event has been correlated
    pub name: String,
    /// Log time of the latest update for this player
    pub updated_at: Option<NaiveDateTime>,
}

impl Player {
    pub fn new(steam_id: impl Into<String>) -> Self {
        Self {
            steam_id: steam_id.into(),
            status: String::new(),
            name: String::new(),
            updated_at: None,
        }
    }

    pub fn with_status(mut self, status: impl Into<String>) -> Self {
        self.status = status.into();
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_updated_at(mut self, updated_at: NaiveDateTime) -> Self {
        self.updated_at = Some(updated_at);
        self
    }

    /// Merge a partial update into this player.
    ///
    /// Only fields the update actually carries overwrite: an empty status or
    /// name and a missing timestamp leave the recorded value alone.
    pub fn merge(&mut self, update: &Player) {
        if !update.status.is_empty() {
            self.status = update.status.clone();
        }
        if !update.name.is_empty() {
            self.name = update.name.clone();
        }
        if update.updated_at.is_some() {
            self.updated_at = update.updated_at;
        }
    }
}
