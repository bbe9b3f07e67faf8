//! Domain events - Things the server console log tells us happened

pub mod log_event;

pub use log_event::{is_unset_log_time, parse_log_time, EventType, LogEvent};
