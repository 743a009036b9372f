//! Persistence orchestration core.

/// Failure-swallowing store adapters.
pub mod adapter;
/// Dual-write sequencing and read routing.
pub mod coordinator;
