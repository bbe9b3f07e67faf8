//! Server Status Aggregate - The root aggregate for one observed server
//!
//! Holds the server and world scalars and the player registry. All
//! modifications go through this aggregate so the derived active player count
//! and the last update time stay consistent with the registry.
//!
//! The aggregate itself is not synchronised; `StatusService` owns the lock.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::domain::entities::Player;
use crate::domain::events::EventType;

/// Server status before any connect/disconnect line has been seen
pub const STATUS_INIT: &str = "init";
pub const STATUS_ONLINE: &str = "Online";
pub const STATUS_OFFLINE: &str = "Offline";

/// Scalar fields of the aggregate that are overwritten unconditionally
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServerField {
    Status,
    ServerId,
    ValheimVersion,
    WorldName,
    WorldSeed,
    Day,
}

/// The Server Status Aggregate Root
#[derive(Debug, Clone)]
pub struct ServerStatus {
    // Server status
    status: String,
    /// Wall-clock time of the most recent mutation
    updated_at: DateTime<Utc>,

    // Server info
    server_id: String,
    valheim_version: String,

    // World info
    world_name: String,
    world_seed: String,
    day: String,

    // Activity
    players: Vec<Player>,
    active_player_count: usize,
}

impl Default for ServerStatus {
    fn default() -> Self {
        Self::new()
    }
}

impl ServerStatus {
    pub fn new() -> Self {
        Self {
            status: STATUS_INIT.to_string(),
            updated_at: Utc::now(),
            server_id: String::new(),
            valheim_version: String::new(),
            world_name: String::new(),
            world_seed: String::new(),
            day: String::new(),
            players: Vec::with_capacity(10),
            active_player_count: 0,
        }
    }

    pub fn active_player_count(&self) -> usize {
        self.active_player_count
    }

    // ========================================================================
    // Mutators
    // ========================================================================

    /// Overwrite a scalar field, empty values included
    pub fn set_field(&mut self, field: ServerField, value: impl Into<String>) {
        let value = value.into();
        match field {
            ServerField::Status => self.status = value,
            ServerField::ServerId => self.server_id = value,
            ServerField::ValheimVersion => self.valheim_version = value,
            ServerField::WorldName => self.world_name = value,
            ServerField::WorldSeed => self.world_seed = value,
            ServerField::Day => self.day = value,
        }
        self.touch();
    }

    /// Register or update a player.
    ///
    /// Returns `true` when the call created a new registry entry.
    ///
    /// # Invariants
    /// - `steam_id` must not be empty
    /// - `active_player_count` equals the number of players not disconnected
    pub fn upsert_player(&mut self, candidate: Player) -> Result<bool, AggregateError> {
        if candidate.steam_id.is_empty() {
            return Err(AggregateError::Validation(
                "player steam_id is not set".to_string(),
            ));
        }

        let created = match self
            .players
            .iter_mut()
            .find(|p| p.steam_id == candidate.steam_id)
        {
            Some(existing) => {
                existing.merge(&candidate);
                false
            }
            None => {
                self.players.push(candidate);
                true
            }
        };

        self.recount_active_players();
        self.touch();
        Ok(created)
    }

    /// Deep copy of the current state
    pub fn snapshot(&self) -> StatusSnapshot {
        StatusSnapshot {
            status: self.status.clone(),
            updated_at: self.updated_at,
            server_id: self.server_id.clone(),
            valheim_version: self.valheim_version.clone(),
            world_name: self.world_name.clone(),
            world_seed: self.world_seed.clone(),
            day: self.day.clone(),
            active_player_count: self.active_player_count,
            players: self.players.clone(),
        }
    }

    fn recount_active_players(&mut self) {
        let disconnected = EventType::Disconnection.label();
        self.active_player_count = self
            .players
            .iter()
            .filter(|p| p.status != disconnected)
            .count();
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

// Read access for tests; production code reads through `snapshot`
#[cfg(test)]
impl ServerStatus {
    pub fn field(&self, field: ServerField) -> &str {
        match field {
            ServerField::Status => &self.status,
            ServerField::ServerId => &self.server_id,
            ServerField::ValheimVersion => &self.valheim_version,
            ServerField::WorldName => &self.world_name,
            ServerField::WorldSeed => &self.world_seed,
            ServerField::Day => &self.day,
        }
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    pub fn players(&self) -> &[Player] {
        &self.players
    }

    pub fn find_player(&self, steam_id: &str) -> Option<&Player> {
        self.players.iter().find(|p| p.steam_id == steam_id)
    }
}

/// Point-in-time copy of the aggregate, owned by the reader
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatusSnapshot {
    pub status: String,
    pub updated_at: DateTime<Utc>,
    pub server_id: String,
    pub valheim_version: String,
    pub world_name: String,
    pub world_seed: String,
    pub day: String,
    pub active_player_count: usize,
    pub players: Vec<Player>,
}

/// Errors that can occur when modifying the aggregate
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AggregateError {
    /// A validation rule was violated
    #[error("Validation error: {0}")]
    Validation(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::events::parse_log_time;

    fn disconnected() -> &'static str {
        EventType::Disconnection.label()
    }

    #[test]
    fn test_new_aggregate() {
        let status = ServerStatus::new();
        assert_eq!(status.field(ServerField::Status), STATUS_INIT);
        assert_eq!(status.active_player_count(), 0);
        assert!(status.players().is_empty());
    }

    #[test]
    fn test_set_field_overwrites_and_touches() {
        let cases = [
            (ServerField::Status, vec!["Online", "Offline", ""]),
            (ServerField::ServerId, vec!["12345678901234567", ""]),
            (ServerField::ValheimVersion, vec!["0.0.1", "1.2.3", ""]),
            (ServerField::WorldName, vec!["valheim-world", ""]),
            (ServerField::WorldSeed, vec!["abcdefg", ""]),
            (ServerField::Day, vec!["1", "12", ""]),
        ];

        let mut status = ServerStatus::new();
        for (field, values) in cases {
            for value in values {
                let before = status.updated_at();
                status.set_field(field, value);
                assert_eq!(status.field(field), value);
                assert!(status.updated_at() >= before);
            }
        }
    }

    #[test]
    fn test_upsert_rejects_empty_steam_id() {
        let mut status = ServerStatus::new();
        status
            .upsert_player(Player::new("1").with_status("Connection"))
            .unwrap();
        let before = status.updated_at();

        let result = status.upsert_player(Player::new("").with_name("Ghost"));

        assert!(matches!(result, Err(AggregateError::Validation(_))));
        assert_eq!(status.players().len(), 1);
        assert_eq!(status.active_player_count(), 1);
        assert_eq!(status.updated_at(), before);
    }

    #[test]
    fn test_upsert_insert_then_update() {
        let mut status = ServerStatus::new();

        let created = status
            .upsert_player(Player::new("100").with_status("Connection"))
            .unwrap();
        assert!(created);

        let created = status
            .upsert_player(
                Player::new("100")
                    .with_status("Got Character")
                    .with_name("Bob")
                    .with_updated_at(parse_log_time("03/14/2021 09:00:00")),
            )
            .unwrap();
        assert!(!created);

        let created = status
            .upsert_player(Player::new("100").with_status(disconnected()))
            .unwrap();
        assert!(!created);

        assert_eq!(status.players().len(), 1);
        let bob = status.find_player("100").unwrap();
        assert_eq!(bob.name, "Bob");
        assert_eq!(bob.status, disconnected());
        assert!(bob.updated_at.is_some());
    }

    #[test]
    fn test_active_count_tracks_disconnections() {
        let mut status = ServerStatus::new();
        for id in ["1", "2", "3"] {
            status
                .upsert_player(Player::new(id).with_status("Connection"))
                .unwrap();
            assert_eq!(
                status.active_player_count(),
                status
                    .players()
                    .iter()
                    .filter(|p| p.status != disconnected())
                    .count()
            );
        }
        assert_eq!(status.active_player_count(), 3);

        status
            .upsert_player(Player::new("2").with_status(disconnected()))
            .unwrap();
        assert_eq!(status.active_player_count(), 2);

        status
            .upsert_player(Player::new("2").with_status("Connection"))
            .unwrap();
        assert_eq!(status.active_player_count(), 3);
    }

    #[test]
    fn test_insertion_order_preserved() {
        let mut status = ServerStatus::new();
        for id in ["30", "10", "20"] {
            status.upsert_player(Player::new(id)).unwrap();
        }
        status.upsert_player(Player::new("10").with_name("x")).unwrap();

        let ids: Vec<&str> = status.players().iter().map(|p| p.steam_id.as_str()).collect();
        assert_eq!(ids, vec!["30", "10", "20"]);
    }

    #[test]
    fn test_snapshot_is_independent() {
        let mut status = ServerStatus::new();
        status
            .upsert_player(Player::new("100").with_name("Bob"))
            .unwrap();

        let mut snapshot = status.snapshot();
        snapshot.players[0].name = "Mallory".to_string();
        snapshot.players.push(Player::new("999"));
        snapshot.world_name = "elsewhere".to_string();

        assert_eq!(status.players().len(), 1);
        assert_eq!(status.find_player("100").unwrap().name, "Bob");
        assert_eq!(status.field(ServerField::WorldName), "");
        assert_ne!(status.snapshot(), snapshot);
    }
}
