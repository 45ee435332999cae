//! stream/compress.rs
//! Push-based compression engine.
//!
//! Summary: drives the codec's single-step compress primitive against a
//! [`ChunkedOutputBuffer`] until the requested directive is satisfied.
//!
//! Session model:
//! - `last_mode == FlushFrame` means no frame is open (initial state).
//! - `Continue`/`FlushBlock` leave a frame open; `FlushFrame` closes it.
//! - Any failure resets the codec session and returns to "no frame open",
//!   so the next call starts a clean frame.
use std::sync::Arc;

use crate::codec::{
    Codec, CompressionContext, CompressionParameter, EndDirective, ZstdCodec,
};
use crate::constants::DEFAULT_COMPRESSION_LEVEL;
use crate::dict::DictionaryRef;
use crate::options::CompressorOptions;
use crate::stream::buffer::ChunkedOutputBuffer;
use crate::telemetry::StreamCounters;
use crate::types::{Direction, Result, ZstdError};
use crate::utils::parameter_error;

pub struct CompressorEngine<C: Codec = ZstdCodec> {
    codec: Arc<C>,
    cctx: C::CCtx,
    dict: Option<DictionaryRef<C>>,
    last_mode: EndDirective,
    use_multithread: bool,
    compression_level: i32,
    counters: StreamCounters,
}

impl<C: Codec> CompressorEngine<C> {
    /// Create a context, apply `options` (level first), then load `dict`.
    pub fn new(
        codec: Arc<C>,
        options: &CompressorOptions,
        dict: Option<DictionaryRef<C>>,
    ) -> Result<Self> {
        let cctx = codec
            .create_cctx()
            .ok_or_else(|| ZstdError::OutOfMemory("Unable to create ZSTD_CCtx instance.".into()))?;

        let mut engine = Self {
            codec,
            cctx,
            dict: None,
            last_mode: EndDirective::FlushFrame,
            use_multithread: false,
            compression_level: DEFAULT_COMPRESSION_LEVEL,
            counters: StreamCounters::default(),
        };

        if let Some(level) = options.effective_level()? {
            engine.set_parameter(CompressionParameter::CompressionLevel, level)?;
            engine.compression_level = level;
        }
        for (&param, &value) in &options.parameters {
            if param == CompressionParameter::CompressionLevel {
                continue;
            }
            engine.set_parameter(param, value)?;
            if param == CompressionParameter::NbWorkers {
                engine.use_multithread = value > 0;
            }
        }

        if let Some(dict) = dict {
            dict.load_into_cctx(&mut engine.cctx, engine.compression_level)?;
            engine.dict = Some(dict);
        }

        log::debug!(
            "compressor ready: level={}, multithread={}, dict={:?}",
            engine.compression_level,
            engine.use_multithread,
            engine.dict.as_ref().map(|d| (d.dict().dict_id(), d.kind()))
        );
        Ok(engine)
    }

    fn set_parameter(&mut self, param: CompressionParameter, value: i32) -> Result<()> {
        self.cctx.set_parameter(param, value).map_err(|_| {
            parameter_error(
                Direction::Compression,
                param.name(),
                value,
                self.codec.cparam_bounds(param),
                self.codec.version_string(),
            )
        })
    }

    /// Feed `data` with the given directive.
    pub fn compress(&mut self, data: &[u8], directive: EndDirective) -> Result<Vec<u8>> {
        let result = if self.use_multithread && directive == EndDirective::Continue {
            self.compress_mt_continue(data)
        } else {
            self.compress_impl(data, directive, false)
        };
        self.record(data.len(), directive, result)
    }

    /// Flush buffered data. `Continue` is not a flush.
    /// With no frame open there is nothing to flush and nothing is emitted.
    pub fn flush(&mut self, directive: EndDirective) -> Result<Vec<u8>> {
        if directive == EndDirective::Continue {
            return Err(ZstdError::InvalidArgument(
                "mode argument wrong value, it should be FlushFrame (2) or FlushBlock (1)".into(),
            ));
        }
        if self.last_mode == EndDirective::FlushFrame {
            return Ok(Vec::new());
        }
        let result = self.compress_impl(&[], directive, false);
        self.record(0, directive, result)
    }

    /// Compress `data` as one complete frame into a buffer pre-sized to the
    /// codec's worst-case bound, declaring the content size up front.
    pub fn compress_frame(&mut self, data: &[u8]) -> Result<Vec<u8>> {
        if self.last_mode != EndDirective::FlushFrame {
            return Err(ZstdError::InvalidArgument(
                "a frame is already open on this compressor".into(),
            ));
        }
        self.cctx
            .set_pledged_src_size(Some(data.len() as u64))
            .map_err(ZstdError::PledgedSizeFailed)?;
        let result = self.compress_impl(data, EndDirective::FlushFrame, true);
        self.record(data.len(), EndDirective::FlushFrame, result)
    }

    /// Declare the uncompressed size of the next frame (`None` clears it).
    /// The frame header will carry it and the codec will verify it.
    pub fn set_pledged_input_size(&mut self, size: Option<u64>) -> Result<()> {
        if self.last_mode != EndDirective::FlushFrame {
            return Err(ZstdError::InvalidArgument(
                "pledged input size can only be set before a frame is started".into(),
            ));
        }
        self.cctx
            .set_pledged_src_size(size)
            .map_err(ZstdError::PledgedSizeFailed)
    }

    fn record(
        &mut self,
        input_len: usize,
        directive: EndDirective,
        result: Result<Vec<u8>>,
    ) -> Result<Vec<u8>> {
        match result {
            Ok(out) => {
                self.last_mode = directive;
                self.counters.add_call(input_len, out.len());
                if directive == EndDirective::FlushFrame {
                    self.counters.add_frame();
                }
                Ok(out)
            }
            Err(e) => {
                self.last_mode = EndDirective::FlushFrame;
                self.cctx.reset_session();
                self.counters.add_error();
                log::warn!("zstd compression failed, session reset: {e}");
                Err(e)
            }
        }
    }

    fn compress_impl(&mut self, data: &[u8], directive: EndDirective, rich: bool) -> Result<Vec<u8>> {
        let mut buffer = if rich {
            ChunkedOutputBuffer::with_initial_size(None, self.codec.compress_bound(data.len()))?
        } else {
            ChunkedOutputBuffer::with_growth(None)?
        };
        let mut pos = 0;

        loop {
            let progress = match self.cctx.compress_stream(buffer.spare(), &data[pos..], directive) {
                Ok(progress) => progress,
                Err(e) => {
                    buffer.discard();
                    return Err(ZstdError::CompressionFailed(e));
                }
            };
            pos += progress.consumed;
            buffer.advance(progress.produced);

            let finished = match directive {
                EndDirective::Continue => {
                    pos == data.len() && (progress.remaining == 0 || !buffer.is_block_full())
                }
                EndDirective::FlushBlock | EndDirective::FlushFrame => progress.remaining == 0,
            };
            if finished {
                break;
            }
            if buffer.is_block_full() {
                buffer.grow()?;
            }
        }

        self.counters.add_grows(buffer.block_count() - 1);
        buffer.finish()
    }

    /// `Continue` with worker threads: the codec returns early while jobs
    /// run, so keep calling until either side is exhausted.
    fn compress_mt_continue(&mut self, data: &[u8]) -> Result<Vec<u8>> {
        let mut buffer = ChunkedOutputBuffer::with_growth(None)?;
        let mut pos = 0;

        loop {
            loop {
                let progress =
                    match self.cctx.compress_stream(buffer.spare(), &data[pos..], EndDirective::Continue) {
                        Ok(progress) => progress,
                        Err(e) => {
                            buffer.discard();
                            return Err(ZstdError::CompressionFailed(e));
                        }
                    };
                pos += progress.consumed;
                buffer.advance(progress.produced);
                if buffer.is_block_full() || pos == data.len() {
                    break;
                }
            }

            if buffer.is_block_full() {
                buffer.grow()?;
            } else if pos == data.len() {
                break;
            }
        }

        self.counters.add_grows(buffer.block_count() - 1);
        buffer.finish()
    }

    pub fn last_mode(&self) -> EndDirective {
        self.last_mode
    }

    pub fn compression_level(&self) -> i32 {
        self.compression_level
    }

    pub fn use_multithread(&self) -> bool {
        self.use_multithread
    }

    pub fn dict(&self) -> Option<&DictionaryRef<C>> {
        self.dict.as_ref()
    }

    pub fn counters(&self) -> &StreamCounters {
        &self.counters
    }
}
