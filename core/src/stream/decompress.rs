//! stream/decompress.rs
//! Pull-based decompression engine.
//!
//! Two modes share one loop:
//! - `Single` stops at the end of the first frame, sets `eof`, and keeps
//!   whatever followed the frame as unused data. Later calls fail.
//! - `Endless` decodes any number of concatenated frames and tracks
//!   whether the stream currently sits on a frame boundary.
//!
//! `needs_input` means "no more output without more input". A call stopped
//! by `max_length` leaves it false and carries the unread input over to the
//! next call.
use std::borrow::Cow;
use std::sync::Arc;

use crate::codec::{Codec, DecompressionContext, DecompressionParameter, ZstdCodec};
use crate::constants::MAX_PRESIZE_BYTES;
use crate::dict::DictionaryRef;
use crate::frame::{self, Check, HEADER_PROBE_LEN};
use crate::options::DecompressorOptions;
use crate::stream::buffer::ChunkedOutputBuffer;
use crate::telemetry::StreamCounters;
use crate::types::{Direction, Result, ZstdError};
use crate::utils::parameter_error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FrameMode {
    Single,
    Endless,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stop {
    /// Single mode reached the end of its frame.
    FrameEnd,
    InputExhausted,
    OutputCapped,
}

pub struct DecompressorEngine<C: Codec = ZstdCodec> {
    codec: Arc<C>,
    dctx: C::DCtx,
    dict: Option<DictionaryRef<C>>,
    mode: FrameMode,
    /// Input left unread by a call that stopped on `max_length`.
    input_buffer: Vec<u8>,
    unused_data: Vec<u8>,
    eof: bool,
    at_frame_edge: bool,
    needs_input: bool,
    check: Check,
    header_probe: Vec<u8>,
    counters: StreamCounters,
}

impl<C: Codec> DecompressorEngine<C> {
    pub fn new(
        codec: Arc<C>,
        options: &DecompressorOptions,
        dict: Option<DictionaryRef<C>>,
        mode: FrameMode,
    ) -> Result<Self> {
        let dctx = codec
            .create_dctx()
            .ok_or_else(|| ZstdError::OutOfMemory("Unable to create ZSTD_DCtx instance.".into()))?;

        let mut engine = Self {
            codec,
            dctx,
            dict: None,
            mode,
            input_buffer: Vec::new(),
            unused_data: Vec::new(),
            eof: false,
            at_frame_edge: true,
            needs_input: true,
            check: Check::Unknown,
            header_probe: Vec::new(),
            counters: StreamCounters::default(),
        };

        for (&param, &value) in &options.parameters {
            engine.set_parameter(param, value)?;
        }
        if let Some(dict) = dict {
            dict.load_into_dctx(&mut engine.dctx)?;
            engine.dict = Some(dict);
        }

        log::debug!(
            "decompressor ready: mode={:?}, dict={:?}",
            engine.mode,
            engine.dict.as_ref().map(|d| (d.dict().dict_id(), d.kind()))
        );
        Ok(engine)
    }

    fn set_parameter(&mut self, param: DecompressionParameter, value: i32) -> Result<()> {
        self.dctx.set_parameter(param, value).map_err(|_| {
            parameter_error(
                Direction::Decompression,
                param.name(),
                value,
                self.codec.dparam_bounds(param),
                self.codec.version_string(),
            )
        })
    }

    /// Decompress `data`, returning at most `max_length` bytes when bounded.
    ///
    /// # Errors
    /// - `EndOfStreamReuse` once a single-frame decompressor reached `eof`.
    /// - `DecompressionFailed` on corrupt input; the session is reset and the
    ///   next call starts a new stream.
    pub fn decompress(&mut self, data: &[u8], max_length: Option<usize>) -> Result<Vec<u8>> {
        if self.mode == FrameMode::Single && self.eof {
            return Err(ZstdError::EndOfStreamReuse);
        }
        if self.mode == FrameMode::Single {
            self.probe_header(data);
        }

        let carried = std::mem::take(&mut self.input_buffer);
        let input: Cow<'_, [u8]> = if carried.is_empty() {
            Cow::Borrowed(data)
        } else {
            let mut joined = carried;
            joined.extend_from_slice(data);
            Cow::Owned(joined)
        };

        if self.mode == FrameMode::Endless && self.at_frame_edge && input.is_empty() {
            return Ok(Vec::new());
        }

        match self.run(&input, max_length) {
            Ok((out, stop, pos)) => {
                match stop {
                    Stop::FrameEnd => {
                        self.needs_input = false;
                        self.unused_data = input[pos..].to_vec();
                    }
                    Stop::InputExhausted => self.needs_input = true,
                    Stop::OutputCapped => {
                        self.needs_input = false;
                        self.input_buffer = input[pos..].to_vec();
                    }
                }
                self.counters.add_call(pos, out.len());
                Ok(out)
            }
            Err(e) => {
                self.dctx.reset_session();
                self.at_frame_edge = true;
                self.needs_input = true;
                self.check = Check::Unknown;
                self.header_probe.clear();
                self.counters.add_error();
                log::warn!("zstd decompression failed, session reset: {e}");
                Err(e)
            }
        }
    }

    /// Returns the output, why the loop stopped, and how much input it read.
    fn run(&mut self, input: &[u8], max_length: Option<usize>) -> Result<(Vec<u8>, Stop, usize)> {
        let mut buffer = match self.expected_size(input) {
            Some(size) => {
                self.counters.add_presized();
                ChunkedOutputBuffer::with_initial_size(max_length, size)?
            }
            None => ChunkedOutputBuffer::with_growth(max_length)?,
        };
        let mut pos = 0;

        let stop = loop {
            let progress = match self.dctx.decompress_stream(buffer.spare(), &input[pos..]) {
                Ok(progress) => progress,
                Err(e) => {
                    buffer.discard();
                    return Err(ZstdError::DecompressionFailed(e));
                }
            };
            pos += progress.consumed;
            buffer.advance(progress.produced);

            let frame_done = progress.remaining == 0;
            if frame_done {
                self.counters.add_frame();
            }
            match self.mode {
                FrameMode::Single => {
                    if frame_done {
                        self.eof = true;
                        self.at_frame_edge = true;
                        break Stop::FrameEnd;
                    }
                    self.at_frame_edge = false;
                }
                FrameMode::Endless => {
                    self.at_frame_edge = frame_done;
                    if frame_done && pos == input.len() {
                        break Stop::InputExhausted;
                    }
                }
            }

            // Output before input: the codec may still hold decoded bytes.
            if buffer.is_block_full() {
                if buffer.reached_max_length() {
                    break Stop::OutputCapped;
                }
                buffer.grow()?;
            } else if pos == input.len() {
                break Stop::InputExhausted;
            }
        };

        self.counters.add_grows(buffer.block_count() - 1);
        Ok((buffer.finish()?, stop, pos))
    }

    /// Declared content size of the frame starting `input`, when the call
    /// begins on a frame boundary, the whole frame is in `input`, and the
    /// size is small enough to trust. A bare header can declare any size.
    fn expected_size(&self, input: &[u8]) -> Option<usize> {
        if !self.at_frame_edge || self.codec.frame_compressed_size(input).is_err() {
            return None;
        }
        match self.codec.frame_content_size(input) {
            Ok(Some(size)) if size <= MAX_PRESIZE_BYTES as u64 => Some(size as usize),
            _ => None,
        }
    }

    fn probe_header(&mut self, data: &[u8]) {
        if self.check != Check::Unknown || self.header_probe.len() >= HEADER_PROBE_LEN {
            return;
        }
        let take = (HEADER_PROBE_LEN - self.header_probe.len()).min(data.len());
        self.header_probe.extend_from_slice(&data[..take]);
        self.check = frame::check_kind(&self.header_probe);
    }

    pub fn eof(&self) -> bool {
        self.eof
    }

    pub fn at_frame_edge(&self) -> bool {
        self.at_frame_edge
    }

    pub fn needs_input(&self) -> bool {
        self.needs_input
    }

    pub fn unused_data(&self) -> &[u8] {
        &self.unused_data
    }

    pub fn check(&self) -> Check {
        self.check
    }

    pub fn dict(&self) -> Option<&DictionaryRef<C>> {
        self.dict.as_ref()
    }

    pub fn counters(&self) -> &StreamCounters {
        &self.counters
    }
}
