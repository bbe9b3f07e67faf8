//! Application services - Use case implementations
//!
//! Each service wraps domain objects and exposes the operations the
//! infrastructure layer (log ingestion, HTTP handlers) calls into.

pub mod status_service;

pub use status_service::StatusService;
