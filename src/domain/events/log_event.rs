//! Log events - Structured form of a recognised console log line
//!
//! A `LogEvent` is produced fresh for every classified line. The only field
//! that changes after classification is `steam_id`, which the correlation
//! tracker fills in for character events.

use std::fmt;

use chrono::NaiveDateTime;

/// Timestamp format of the console log line prefix (`MM/DD/YYYY HH:MM:SS`)
pub const LOG_TIME_FORMAT: &str = "%m/%d/%Y %H:%M:%S";

/// Kinds of events recognised in the console log
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventType {
    // ========================================================================
    // Server Events
    // ========================================================================
    ValheimVersion,
    ServerId,
    InitWorldGenSeed,
    LoadWorld,
    GameServerConnected,
    GameServerConnectedFailed,
    GameServerDisconnected,
    DayHasPassed,

    // ========================================================================
    // User Events
    // ========================================================================
    Connection,
    GotHandshake,
    GotCharacter,
    Disconnection,
}

impl EventType {
    /// Human readable label. User event labels double as player status labels.
    pub fn label(&self) -> &'static str {
        match self {
            EventType::ValheimVersion => "Valheim version",
            EventType::ServerId => "Server ID",
            EventType::InitWorldGenSeed => "Initialize world generator seed",
            EventType::LoadWorld => "Load world",
            EventType::GameServerConnected => "Game server connected",
            EventType::GameServerConnectedFailed => "Game server connected failed",
            EventType::GameServerDisconnected => "Game server disconnected",
            EventType::DayHasPassed => "DayHasPassed",
            EventType::Connection => "Connection",
            EventType::GotHandshake => "Got Handshake",
            EventType::GotCharacter => "Got Character",
            EventType::Disconnection => "Disconnection",
        }
    }

    /// Whether the event concerns a single user connection
    pub fn is_user_event(&self) -> bool {
        matches!(
            self,
            EventType::Connection
                | EventType::GotHandshake
                | EventType::GotCharacter
                | EventType::Disconnection
        )
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A structured event extracted from one console log line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEvent {
    pub event_type: EventType,
    /// Time embedded in the line prefix; the Unix epoch when it failed to parse
    pub timestamp: NaiveDateTime,
    /// Generic payload: version, server id, seed, world name or day
    pub value: String,
    /// Connection identifier of user events
    pub steam_id: String,
    /// Character name of `GotCharacter` events
    pub name: String,
}

impl LogEvent {
    pub fn new(event_type: EventType, timestamp: NaiveDateTime) -> Self {
        Self {
            event_type,
            timestamp,
            value: String::new(),
            steam_id: String::new(),
            name: String::new(),
        }
    }

    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = value.into();
        self
    }

    pub fn with_steam_id(mut self, steam_id: impl Into<String>) -> Self {
        self.steam_id = steam_id.into();
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }
}

/// Parse a log prefix timestamp, degrading to the epoch sentinel on failure
pub fn parse_log_time(raw: &str) -> NaiveDateTime {
    NaiveDateTime::parse_from_str(raw, LOG_TIME_FORMAT).unwrap_or_default()
}

/// Whether a log timestamp is the sentinel produced by a failed parse
pub fn is_unset_log_time(timestamp: &NaiveDateTime) -> bool {
    *timestamp == NaiveDateTime::default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};

    #[test]
    fn test_parse_log_time() {
        let ts = parse_log_time("03/14/2021 09:26:53");
        assert_eq!((ts.month(), ts.day(), ts.year()), (3, 14, 2021));
        assert_eq!((ts.hour(), ts.minute(), ts.second()), (9, 26, 53));
        assert!(!is_unset_log_time(&ts));
    }

    #[test]
    fn test_parse_log_time_degrades_to_sentinel() {
        assert!(is_unset_log_time(&parse_log_time("13/45/2021 99:99:99")));
        assert!(is_unset_log_time(&parse_log_time("")));
    }

    #[test]
    fn test_user_event_labels() {
        assert_eq!(EventType::GotCharacter.to_string(), "Got Character");
        assert_eq!(EventType::Disconnection.label(), "Disconnection");
        assert!(EventType::GotHandshake.is_user_event());
        assert!(!EventType::LoadWorld.is_user_event());
    }
}
