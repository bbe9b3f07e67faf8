//! Infrastructure layer - External adapters and implementations
//!
//! This layer contains:
//! - Log source: Replaying and following the server console log
//! - Log directory: Locating the live log and its rotated archives
//! - Ingest worker: Feeding log events into the status service
//! - HTTP: JSON status API
//! - Config: Application configuration
//! - State: Shared application state

pub mod config;
pub mod http;
pub mod ingest_worker;
pub mod log_directory;
pub mod log_source;
pub mod state;
