//! Event Classifier - Maps one console log line to an optional `LogEvent`
//!
//! Every recognised line starts with a `MM/DD/YYYY HH:MM:SS` prefix followed
//! by `: ` and a message body. The body is tested against an ordered table of
//! patterns, server patterns first and user patterns second; the first pattern
//! that matches builds the event and no other pattern is tried.
//!
//! Classification is pure: the only time that ends up in an event is the one
//! embedded in the line itself.

use chrono::NaiveDateTime;

use crate::domain::events::{parse_log_time, EventType, LogEvent};

/// Length of the `MM/DD/YYYY HH:MM:SS` prefix
const TIMESTAMP_LEN: usize = 19;

/// Length of the world generator seed
const SEED_LEN: usize = 10;

type Builder = fn(NaiveDateTime, &str) -> Option<LogEvent>;

/// Ordered pattern table. Order is the tie-break between categories.
const PATTERNS: &[(EventType, Builder)] = &[
    // Server events
    (EventType::ValheimVersion, valheim_version),
    (EventType::ServerId, server_id),
    (EventType::InitWorldGenSeed, world_gen_seed),
    (EventType::LoadWorld, load_world),
    (EventType::GameServerConnected, game_server_connected),
    (EventType::GameServerConnectedFailed, game_server_connected_failed),
    (EventType::GameServerDisconnected, game_server_disconnected),
    (EventType::DayHasPassed, day_has_passed),
    // User events
    (EventType::Connection, connection),
    (EventType::GotHandshake, got_handshake),
    (EventType::Disconnection, closing_socket),
    (EventType::GotCharacter, got_character),
];

/// Classify a single (already trimmed) console log line.
///
/// Returns `None` for lines without the timestamp prefix and for prefixed
/// lines that match no pattern.
pub fn classify(line: &str) -> Option<LogEvent> {
    let (stamp, rest) = split_timestamp(line)?;
    let body = rest.strip_prefix(": ")?;
    let timestamp = parse_log_time(stamp);

    PATTERNS.iter().find_map(|(_, build)| build(timestamp, body))
}

/// Split off the `MM/DD/YYYY HH:MM:SS` prefix if the line has one
pub fn split_timestamp(line: &str) -> Option<(&str, &str)> {
    let b = line.as_bytes();
    if b.len() < TIMESTAMP_LEN
        || b[2] != b'/'
        || b[5] != b'/'
        || b[10] != b' '
        || b[13] != b':'
        || b[16] != b':'
    {
        return None;
    }

    const DIGITS: [usize; 14] = [0, 1, 3, 4, 6, 7, 8, 9, 11, 12, 14, 15, 17, 18];
    if !DIGITS.iter().all(|&i| b[i].is_ascii_digit()) {
        return None;
    }

    Some(line.split_at(TIMESTAMP_LEN))
}

// ============================================================================
// Server patterns
// ============================================================================

// 03/14/2021 09:26:50: Valheim version:0.147.3
fn valheim_version(ts: NaiveDateTime, body: &str) -> Option<LogEvent> {
    let version = body.strip_prefix("Valheim version:")?;
    if version.is_empty() || !version.bytes().all(|c| c.is_ascii_digit() || c == b'.') {
        return None;
    }
    Some(LogEvent::new(EventType::ValheimVersion, ts).with_value(version))
}

// 03/14/2021 09:26:51: Server ID 90071992547409920
fn server_id(ts: NaiveDateTime, body: &str) -> Option<LogEvent> {
    let id = body.strip_prefix("Server ID ")?;
    is_number(id).then(|| LogEvent::new(EventType::ServerId, ts).with_value(id))
}

// 03/14/2021 09:26:52: Initializing world generator seed:AbCdE12345 ( 1234567 )   menu:False  worldgen:True
fn world_gen_seed(ts: NaiveDateTime, body: &str) -> Option<LogEvent> {
    let rest = body.strip_prefix("Initializing world generator seed:")?;
    let b = rest.as_bytes();
    if b.len() <= SEED_LEN
        || b[SEED_LEN] != b' '
        || !b[..SEED_LEN].iter().all(u8::is_ascii_alphanumeric)
    {
        return None;
    }
    Some(LogEvent::new(EventType::InitWorldGenSeed, ts).with_value(&rest[..SEED_LEN]))
}

// 03/14/2021 09:26:52: Load world MyWorld
fn load_world(ts: NaiveDateTime, body: &str) -> Option<LogEvent> {
    let name = body.strip_prefix("Load world ")?;
    Some(LogEvent::new(EventType::LoadWorld, ts).with_value(name))
}

fn game_server_connected(ts: NaiveDateTime, body: &str) -> Option<LogEvent> {
    (body == "Game server connected").then(|| LogEvent::new(EventType::GameServerConnected, ts))
}

fn game_server_connected_failed(ts: NaiveDateTime, body: &str) -> Option<LogEvent> {
    (body == "Game server connected failed")
        .then(|| LogEvent::new(EventType::GameServerConnectedFailed, ts))
}

fn game_server_disconnected(ts: NaiveDateTime, body: &str) -> Option<LogEvent> {
    (body == "Game server disconnected")
        .then(|| LogEvent::new(EventType::GameServerDisconnected, ts))
}

// 03/14/2021 10:02:11: Time 0000000123.000000, day:7    nextm:0000000345.000000  skipspeed:0000000001.000000
fn day_has_passed(ts: NaiveDateTime, body: &str) -> Option<LogEvent> {
    let rest = body.strip_prefix("Time ")?;
    let (_, rest) = split_decimal(rest)?;
    let rest = rest.strip_prefix(", day:")?;
    let digits = rest.bytes().take_while(u8::is_ascii_digit).count();
    let (day, rest) = rest.split_at(digits);
    let rest = rest.trim_start_matches(' ').strip_prefix("nextm:")?;
    let (_, rest) = split_decimal(rest)?;
    let rest = rest.strip_prefix("  skipspeed:")?;
    split_decimal(rest)?;
    Some(LogEvent::new(EventType::DayHasPassed, ts).with_value(day))
}

// ============================================================================
// User patterns
// ============================================================================

// 03/14/2021 10:00:01: Got connection SteamID 76561198000000000
fn connection(ts: NaiveDateTime, body: &str) -> Option<LogEvent> {
    user_event(EventType::Connection, ts, body, "Got connection SteamID ")
}

// 03/14/2021 10:00:02: Got handshake from client 76561198000000000
fn got_handshake(ts: NaiveDateTime, body: &str) -> Option<LogEvent> {
    user_event(EventType::GotHandshake, ts, body, "Got handshake from client ")
}

// 03/14/2021 11:00:00: Closing socket 76561198000000000
fn closing_socket(ts: NaiveDateTime, body: &str) -> Option<LogEvent> {
    user_event(EventType::Disconnection, ts, body, "Closing socket ")
}

// 03/14/2021 10:00:15: Got character ZDOID from Bob : -123456:1
fn got_character(ts: NaiveDateTime, body: &str) -> Option<LogEvent> {
    let rest = body.strip_prefix("Got character ZDOID from ")?;
    let (name, zdoid) = rest.split_once(" : ")?;

    let mut chars = name.bytes();
    let head_ok = chars.next().is_some_and(|c| c.is_ascii_alphabetic());
    if !head_ok || !chars.all(|c| c.is_ascii_alphanumeric() || c == b'_') {
        return None;
    }

    let (user, id) = zdoid.strip_prefix('-').unwrap_or(zdoid).split_once(':')?;
    if !is_number(user) || !is_number(id) {
        return None;
    }

    Some(LogEvent::new(EventType::GotCharacter, ts).with_name(name))
}

fn user_event(
    event_type: EventType,
    ts: NaiveDateTime,
    body: &str,
    prefix: &str,
) -> Option<LogEvent> {
    let id = body.strip_prefix(prefix)?;
    is_number(id).then(|| LogEvent::new(event_type, ts).with_steam_id(id))
}

// ============================================================================
// Helpers
// ============================================================================

fn is_number(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|c| c.is_ascii_digit())
}

/// Split a leading non-empty run of digits and dots
fn split_decimal(s: &str) -> Option<(&str, &str)> {
    let len = s
        .bytes()
        .take_while(|c| c.is_ascii_digit() || *c == b'.')
        .count();
    (len > 0).then(|| s.split_at(len))
}
