//! Domain services - Pure operations on console log lines

pub mod classifier;
pub mod correlation;

pub use classifier::classify;
pub use correlation::CorrelationTracker;
