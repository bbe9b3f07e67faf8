//! Domain layer - Core status logic with no I/O
//!
//! This layer contains:
//! - Events: Structured events recognised in the server console log
//! - Entities: Players seen on the server
//! - Aggregates: The server status aggregate and its snapshot
//! - Domain Services: Pure classification and correlation of log lines

pub mod aggregates;
pub mod entities;
pub mod events;
pub mod services;
