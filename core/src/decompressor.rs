//! decompressor.rs
//! Thread-safe decompressor handles: single frame and endless.
use std::fmt;
use std::sync::Mutex;

use crate::codec::{Codec, ZstdCodec};
use crate::dict::DictionaryRef;
use crate::frame::Check;
use crate::options::DecompressorOptions;
use crate::state::ZstdState;
use crate::stream::{DecompressorEngine, FrameMode};
use crate::telemetry::TelemetrySnapshot;
use crate::types::{Direction, Result};
use crate::utils::lock;

/// Decompresses exactly one frame. Bytes after it land in
/// [`unused_data`](Decompressor::unused_data).
pub struct Decompressor<C: Codec = ZstdCodec> {
    engine: Mutex<DecompressorEngine<C>>,
}

impl<C: Codec> Decompressor<C> {
    pub fn new(
        state: &ZstdState<C>,
        options: &DecompressorOptions,
        dict: Option<DictionaryRef<C>>,
    ) -> Result<Self> {
        let engine = DecompressorEngine::new(state.codec().clone(), options, dict, FrameMode::Single)?;
        Ok(Self { engine: Mutex::new(engine) })
    }

    /// Decompress `data`, returning at most `max_length` bytes when bounded.
    /// If the cap stops the call, `needs_input()` is false and a call with
    /// empty `data` continues from where this one stopped.
    pub fn decompress(&self, data: &[u8], max_length: Option<usize>) -> Result<Vec<u8>> {
        lock(&self.engine).decompress(data, max_length)
    }

    pub fn eof(&self) -> bool {
        lock(&self.engine).eof()
    }

    pub fn needs_input(&self) -> bool {
        lock(&self.engine).needs_input()
    }

    pub fn unused_data(&self) -> Vec<u8> {
        lock(&self.engine).unused_data().to_vec()
    }

    pub fn check(&self) -> Check {
        lock(&self.engine).check()
    }

    pub fn telemetry(&self) -> TelemetrySnapshot {
        TelemetrySnapshot::from_counters(Direction::Decompression, lock(&self.engine).counters())
    }
}

/// Decompresses any number of concatenated frames.
pub struct EndlessDecompressor<C: Codec = ZstdCodec> {
    engine: Mutex<DecompressorEngine<C>>,
}

impl<C: Codec> EndlessDecompressor<C> {
    pub fn new(
        state: &ZstdState<C>,
        options: &DecompressorOptions,
        dict: Option<DictionaryRef<C>>,
    ) -> Result<Self> {
        let engine = DecompressorEngine::new(state.codec().clone(), options, dict, FrameMode::Endless)?;
        Ok(Self { engine: Mutex::new(engine) })
    }

    pub fn decompress(&self, data: &[u8], max_length: Option<usize>) -> Result<Vec<u8>> {
        lock(&self.engine).decompress(data, max_length)
    }

    /// True when input and output both ended exactly on a frame boundary.
    pub fn at_frame_edge(&self) -> bool {
        lock(&self.engine).at_frame_edge()
    }

    pub fn needs_input(&self) -> bool {
        lock(&self.engine).needs_input()
    }

    pub fn telemetry(&self) -> TelemetrySnapshot {
        TelemetrySnapshot::from_counters(Direction::Decompression, lock(&self.engine).counters())
    }
}

impl<C: Codec> fmt::Debug for Decompressor<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let engine = lock(&self.engine);
        f.debug_struct("Decompressor")
            .field("eof", &engine.eof())
            .field("needs_input", &engine.needs_input())
            .field("check", &engine.check())
            .finish()
    }
}

impl<C: Codec> fmt::Debug for EndlessDecompressor<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let engine = lock(&self.engine);
        f.debug_struct("EndlessDecompressor")
            .field("at_frame_edge", &engine.at_frame_edge())
            .field("needs_input", &engine.needs_input())
            .finish()
    }
}
