//! Status Service - Application service guarding the server status aggregate
//!
//! One `tokio::sync::Mutex` covers every mutation and every snapshot. Work
//! done under the lock is bounded by the player count and never awaits I/O,
//! so readers and the single log writer cannot deadlock.
//!
//! The service is a cheap cloneable handle; clones share the same aggregate.

use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::{debug, instrument, trace};

use crate::domain::aggregates::{
    AggregateError, ServerField, ServerStatus, StatusSnapshot, STATUS_OFFLINE, STATUS_ONLINE,
};
use crate::domain::entities::Player;
use crate::domain::events::{is_unset_log_time, EventType, LogEvent};

/// Shared handle to the live server status
#[derive(Debug, Clone, Default)]
pub struct StatusService {
    inner: Arc<Mutex<ServerStatus>>,
}

impl StatusService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Overwrite one scalar field, empty values included
    #[instrument(skip(self))]
    pub async fn set_field(&self, field: ServerField, value: String) {
        self.inner.lock().await.set_field(field, value);
    }

    /// Register or update a player; `Ok(true)` when the player is new
    #[instrument(skip(self), fields(steam_id = %candidate.steam_id))]
    pub async fn upsert_player(&self, candidate: Player) -> Result<bool, AggregateError> {
        let mut status = self.inner.lock().await;
        let created = status.upsert_player(candidate)?;
        if created {
            debug!(
                active_players = status.active_player_count(),
                "Registered new player"
            );
        }
        Ok(created)
    }

    /// Independent copy of the current status
    pub async fn snapshot(&self) -> StatusSnapshot {
        self.inner.lock().await.snapshot()
    }

    /// Fold one classified log event into the aggregate
    pub async fn apply(&self, event: LogEvent) -> Result<(), AggregateError> {
        trace!(event = %event.event_type, "Applying log event");

        let (field, value) = match event.event_type {
            EventType::GameServerConnected => (ServerField::Status, STATUS_ONLINE.to_string()),
            EventType::GameServerConnectedFailed | EventType::GameServerDisconnected => {
                (ServerField::Status, STATUS_OFFLINE.to_string())
            }
            EventType::ValheimVersion => (ServerField::ValheimVersion, event.value),
            EventType::ServerId => (ServerField::ServerId, event.value),
            EventType::LoadWorld => (ServerField::WorldName, event.value),
            EventType::InitWorldGenSeed => (ServerField::WorldSeed, event.value),
            EventType::DayHasPassed => (ServerField::Day, event.value),
            EventType::Connection
            | EventType::GotHandshake
            | EventType::GotCharacter
            | EventType::Disconnection => {
                return self.upsert_player(player_update(&event)).await.map(|_| ());
            }
        };

        self.set_field(field, value).await;
        Ok(())
    }
}

/// Partial player record carried by a user event
fn player_update(event: &LogEvent) -> Player {
    let mut player = Player::new(event.steam_id.as_str())
        .with_status(event.event_type.label())
        .with_name(event.name.as_str());
    if !is_unset_log_time(&event.timestamp) {
        player = player.with_updated_at(event.timestamp);
    }
    player
}
