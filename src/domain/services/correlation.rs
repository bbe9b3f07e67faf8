//! Correlation Tracker - Joins a handshake to the character event after it
//!
//! The console log names a player's character on a separate line that carries
//! no connection identifier. The tracker remembers the identifier of the most
//! recent handshake and stamps it onto the next character event.
//!
//! The slot holds exactly one identifier. A second handshake before the
//! character line overwrites the first, so the character event is attributed
//! to the later connection. This relies on the server logging each handshake
//! and its character line back to back.

use crate::domain::events::{EventType, LogEvent};

/// One-slot handshake tracker, scoped to a single log stream session
#[derive(Debug, Default)]
pub struct CorrelationTracker {
    pending: Option<String>,
}

impl CorrelationTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Identifier waiting for a character event, if any
    pub fn pending(&self) -> Option<&str> {
        self.pending.as_deref()
    }

    /// Update the slot from `event` and attach a pending identifier to
    /// character events. Other events pass through untouched.
    pub fn correlate(&mut self, mut event: LogEvent) -> LogEvent {
        match event.event_type {
            EventType::GotHandshake => {
                self.pending = Some(event.steam_id.clone());
            }
            EventType::GotCharacter => {
                if let Some(steam_id) = self.pending.take() {
                    event.steam_id = steam_id;
                }
            }
            _ => {}
        }
        event
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::events::parse_log_time;

    fn event(event_type: EventType) -> LogEvent {
        LogEvent::new(event_type, parse_log_time("03/14/2021 10:00:00"))
    }

    fn handshake(id: &str) -> LogEvent {
        event(EventType::GotHandshake).with_steam_id(id)
    }

    fn character(name: &str) -> LogEvent {
        event(EventType::GotCharacter).with_name(name)
    }

    #[test]
    fn test_handshake_then_character() {
        let mut tracker = CorrelationTracker::new();

        let hs = tracker.correlate(handshake("100"));
        assert_eq!(hs.steam_id, "100");
        assert_eq!(tracker.pending(), Some("100"));

        let ch = tracker.correlate(character("Bob"));
        assert_eq!(ch.steam_id, "100");
        assert_eq!(ch.name, "Bob");
        assert_eq!(tracker.pending(), None);
    }

    #[test]
    fn test_character_without_handshake_stays_empty() {
        let mut tracker = CorrelationTracker::new();
        let ch = tracker.correlate(character("Bob"));
        assert!(ch.steam_id.is_empty());

        // Slot is cleared by the first character event
        tracker.correlate(handshake("1"));
        tracker.correlate(character("A"));
        let ch = tracker.correlate(character("B"));
        assert!(ch.steam_id.is_empty());
    }

    #[test]
    fn test_last_handshake_wins() {
        let mut tracker = CorrelationTracker::new();
        tracker.correlate(handshake("1"));
        tracker.correlate(handshake("2"));
        let ch = tracker.correlate(character("Alice"));
        assert_eq!(ch.steam_id, "2");
    }

    #[test]
    fn test_other_events_pass_through() {
        let mut tracker = CorrelationTracker::new();
        tracker.correlate(handshake("5"));

        let conn = event(EventType::Connection).with_steam_id("9");
        assert_eq!(tracker.correlate(conn.clone()), conn);
        let world = event(EventType::LoadWorld).with_value("MyWorld");
        assert_eq!(tracker.correlate(world.clone()), world);
        let closing = event(EventType::Disconnection).with_steam_id("5");
        assert_eq!(tracker.correlate(closing.clone()), closing);

        assert_eq!(tracker.pending(), Some("5"));
    }
}
