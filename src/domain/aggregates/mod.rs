//! Aggregates - Cluster of domain objects treated as a single unit

pub mod server_status;

pub use server_status::{
    AggregateError, ServerField, ServerStatus, StatusSnapshot, STATUS_OFFLINE, STATUS_ONLINE,
};
