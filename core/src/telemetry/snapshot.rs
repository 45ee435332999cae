//! telemetry/snapshot.rs
//! Immutable view of a handle's counters.
use serde::{Deserialize, Serialize};

use crate::telemetry::counters::StreamCounters;
use crate::types::Direction;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TelemetrySnapshot {
    pub direction: Direction,
    pub calls: u64,
    pub bytes_in: u64,
    pub bytes_out: u64,
    pub frames: u64,
    pub errors: u64,
    pub grows: u64,
    #[serde(default)]
    pub presized: u64,
    /// Compressed size over uncompressed size, 0.0 before any data.
    pub compression_ratio: f64,
}

impl TelemetrySnapshot {
    pub fn from_counters(direction: Direction, counters: &StreamCounters) -> Self {
        let (compressed, plain) = match direction {
            Direction::Compression => (counters.bytes_out, counters.bytes_in),
            Direction::Decompression => (counters.bytes_in, counters.bytes_out),
        };
        let compression_ratio = if plain > 0 {
            compressed as f64 / plain as f64
        } else {
            0.0
        };

        Self {
            direction,
            calls: counters.calls,
            bytes_in: counters.bytes_in,
            bytes_out: counters.bytes_out,
            frames: counters.frames,
            errors: counters.errors,
            grows: counters.grows,
            presized: counters.presized,
            compression_ratio,
        }
    }

    /// Uncompressed bytes seen by the handle.
    pub fn plain_bytes(&self) -> u64 {
        match self.direction {
            Direction::Compression => self.bytes_in,
            Direction::Decompression => self.bytes_out,
        }
    }

    /// Counters never contradict each other.
    pub fn sanity_check(&self) -> bool {
        self.errors <= self.calls && self.compression_ratio >= 0.0
    }
}
