//! telemetry/mod.rs
//! Per-handle counters and immutable snapshots.
//!
//! Notes:
//! - Each handle owns its counters behind the same lock as its engine, so
//!   recording never needs atomics.
//! - Snapshots are plain values; take one, serialise it, compare it.

pub mod counters;
pub mod snapshot;

pub use counters::*;
pub use snapshot::*;
