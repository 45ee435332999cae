//! compressor.rs
//! Thread-safe streaming compressor handle.
//!
//! Every method takes the handle's lock for its whole duration; distinct
//! handles run in parallel. A shared [`ZstdDict`](crate::ZstdDict) is the
//! only state two handles can have in common.
use std::fmt;
use std::sync::Mutex;

use crate::codec::{Codec, EndDirective, ZstdCodec};
use crate::dict::DictionaryRef;
use crate::options::CompressorOptions;
use crate::state::ZstdState;
use crate::stream::CompressorEngine;
use crate::telemetry::TelemetrySnapshot;
use crate::types::{Direction, Result};
use crate::utils::lock;

pub struct Compressor<C: Codec = ZstdCodec> {
    engine: Mutex<CompressorEngine<C>>,
}

impl<C: Codec> Compressor<C> {
    pub fn new(
        state: &ZstdState<C>,
        options: &CompressorOptions,
        dict: Option<DictionaryRef<C>>,
    ) -> Result<Self> {
        let engine = CompressorEngine::new(state.codec().clone(), options, dict)?;
        Ok(Self { engine: Mutex::new(engine) })
    }

    pub fn with_level(state: &ZstdState<C>, level: i32) -> Result<Self> {
        Self::new(state, &CompressorOptions::with_level(level), None)
    }

    /// Provide data; returns whatever compressed output is ready, possibly
    /// nothing.
    pub fn compress(&self, data: &[u8], mode: EndDirective) -> Result<Vec<u8>> {
        lock(&self.engine).compress(data, mode)
    }

    /// Flush internal buffers with `FlushBlock` or `FlushFrame`. The handle
    /// stays usable for further frames.
    pub fn flush(&self, mode: EndDirective) -> Result<Vec<u8>> {
        lock(&self.engine).flush(mode)
    }

    /// Declare the uncompressed size of the next frame.
    pub fn set_pledged_input_size(&self, size: Option<u64>) -> Result<()> {
        lock(&self.engine).set_pledged_input_size(size)
    }

    /// Directive of the last successful call; `FlushFrame` when no frame is
    /// open.
    pub fn last_mode(&self) -> EndDirective {
        lock(&self.engine).last_mode()
    }

    pub fn compression_level(&self) -> i32 {
        lock(&self.engine).compression_level()
    }

    /// Whether the handle was configured with worker threads, so `Continue`
    /// calls take the multi-threaded path.
    pub fn use_multithread(&self) -> bool {
        lock(&self.engine).use_multithread()
    }

    pub fn telemetry(&self) -> TelemetrySnapshot {
        TelemetrySnapshot::from_counters(Direction::Compression, lock(&self.engine).counters())
    }
}

impl<C: Codec> fmt::Debug for Compressor<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let engine = lock(&self.engine);
        f.debug_struct("Compressor")
            .field("compression_level", &engine.compression_level())
            .field("last_mode", &engine.last_mode())
            .field("multithread", &engine.use_multithread())
            .finish()
    }
}
