//! telemetry/counters.rs
//! Mutable counters updated by the streaming engines.
//!
//! Summary: one set per handle, converted into a [`TelemetrySnapshot`]
//! on demand.
//!
//! [`TelemetrySnapshot`]: crate::telemetry::TelemetrySnapshot
use std::ops::AddAssign;

use serde::{Deserialize, Serialize};

#[derive(Default, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreamCounters {
    /// Public operations that reached the codec.
    pub calls: u64,
    /// Bytes handed to the codec.
    pub bytes_in: u64,
    /// Bytes returned to the caller.
    pub bytes_out: u64,
    /// Frames closed (compression) or fully decoded (decompression).
    pub frames: u64,
    /// Calls that failed inside the codec.
    pub errors: u64,
    /// Output blocks appended beyond the first one.
    pub grows: u64,
    /// Decompression calls whose output buffer was sized from a frame
    /// header up front.
    #[serde(default)]
    pub presized: u64,
}

impl StreamCounters {
    /// Record one successful call.
    pub fn add_call(&mut self, bytes_in: usize, bytes_out: usize) {
        self.calls += 1;
        self.bytes_in += bytes_in as u64;
        self.bytes_out += bytes_out as u64;
    }

    pub fn add_frame(&mut self) {
        self.frames += 1;
    }

    /// A failed call still counts as a call; its output was discarded.
    pub fn add_error(&mut self) {
        self.calls += 1;
        self.errors += 1;
    }

    pub fn add_grows(&mut self, grows: usize) {
        self.grows += grows as u64;
    }

    pub fn add_presized(&mut self) {
        self.presized += 1;
    }

    pub fn merge(&mut self, other: &StreamCounters) {
        self.calls += other.calls;
        self.bytes_in += other.bytes_in;
        self.bytes_out += other.bytes_out;
        self.frames += other.frames;
        self.errors += other.errors;
        self.grows += other.grows;
        self.presized += other.presized;
    }
}

impl AddAssign for StreamCounters {
    fn add_assign(&mut self, rhs: Self) {
        self.merge(&rhs);
    }
}
