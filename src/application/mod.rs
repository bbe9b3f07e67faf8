//! Application layer - Use cases on top of the domain
//!
//! This layer contains the status service that folds classified log events
//! into the shared server status aggregate and hands out snapshots.

pub mod services;
