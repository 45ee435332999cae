//! state.rs
//! Explicit library context: the codec every handle is built on, plus the
//! module-level operations (bounds, training, one-shot helpers, frame
//! inspection).
//!
//! A `ZstdState` is cheap to clone; clones share the codec.
use std::fmt;
use std::sync::Arc;

use bytes::Bytes;

use crate::codec::{Codec, CompressionParameter, DecompressionParameter, ParamBounds, ZstdCodec};
use crate::compressor::Compressor;
use crate::decompressor::{Decompressor, EndlessDecompressor};
use crate::dict::{self, DictionaryRef, ZstdDict};
use crate::frame::FrameInfo;
use crate::options::{CompressorOptions, DecompressorOptions};
use crate::stream::{CompressorEngine, DecompressorEngine, FrameMode};
use crate::types::{Direction, Result, ZstdError};

pub struct ZstdState<C: Codec = ZstdCodec> {
    codec: Arc<C>,
}

impl ZstdState<ZstdCodec> {
    /// Context over the linked libzstd.
    pub fn new() -> Self {
        Self::with_codec(ZstdCodec::new())
    }
}

impl Default for ZstdState<ZstdCodec> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Codec> Clone for ZstdState<C> {
    fn clone(&self) -> Self {
        Self { codec: Arc::clone(&self.codec) }
    }
}

impl<C: Codec> fmt::Debug for ZstdState<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ZstdState")
            .field("version", &self.codec.version_string())
            .finish()
    }
}

impl<C: Codec> ZstdState<C> {
    pub fn with_codec(codec: C) -> Self {
        Self { codec: Arc::new(codec) }
    }

    pub fn codec(&self) -> &Arc<C> {
        &self.codec
    }

    /// `major * 10000 + minor * 100 + patch` of the running library.
    pub fn version_number(&self) -> u32 {
        self.codec.version_number()
    }

    pub fn version_string(&self) -> String {
        self.codec.version_string()
    }

    // ── Handles ──────────────────────────────────────────────────────────

    pub fn dict(&self, content: impl Into<Bytes>, allow_raw: bool) -> Result<Arc<ZstdDict<C>>> {
        ZstdDict::new(self, content, allow_raw)
    }

    pub fn compressor(
        &self,
        options: &CompressorOptions,
        dict: Option<DictionaryRef<C>>,
    ) -> Result<Compressor<C>> {
        Compressor::new(self, options, dict)
    }

    pub fn decompressor(
        &self,
        options: &DecompressorOptions,
        dict: Option<DictionaryRef<C>>,
    ) -> Result<Decompressor<C>> {
        Decompressor::new(self, options, dict)
    }

    pub fn endless_decompressor(
        &self,
        options: &DecompressorOptions,
        dict: Option<DictionaryRef<C>>,
    ) -> Result<EndlessDecompressor<C>> {
        EndlessDecompressor::new(self, options, dict)
    }

    // ── Parameter bounds ─────────────────────────────────────────────────

    /// Bounds of the compression parameter with zstd key `key`.
    pub fn cparam_bounds(&self, key: i32) -> Result<ParamBounds> {
        let param = CompressionParameter::from_key(key)?;
        self.codec
            .cparam_bounds(param)
            .map_err(|source| ZstdError::ParameterBoundsFailed {
                direction: Direction::Compression,
                source,
            })
    }

    pub fn dparam_bounds(&self, key: i32) -> Result<ParamBounds> {
        let param = DecompressionParameter::from_key(key)?;
        self.codec
            .dparam_bounds(param)
            .map_err(|source| ZstdError::ParameterBoundsFailed {
                direction: Direction::Decompression,
                source,
            })
    }

    // ── Dictionary building ──────────────────────────────────────────────

    pub fn train_dict(&self, samples: &[u8], sample_sizes: &[usize], dict_size: usize) -> Result<Vec<u8>> {
        dict::train_dict(self.codec.as_ref(), samples, sample_sizes, dict_size)
    }

    pub fn finalize_dict(
        &self,
        custom_dict: &[u8],
        samples: &[u8],
        sample_sizes: &[usize],
        dict_size: usize,
        level: i32,
    ) -> Result<Vec<u8>> {
        dict::finalize_dict(self.codec.as_ref(), custom_dict, samples, sample_sizes, dict_size, level)
    }

    // ── One-shot helpers ─────────────────────────────────────────────────

    /// Compress `data` into a single frame that records its content size.
    pub fn compress(
        &self,
        data: &[u8],
        options: &CompressorOptions,
        dict: Option<DictionaryRef<C>>,
    ) -> Result<Vec<u8>> {
        let mut engine = CompressorEngine::new(Arc::clone(&self.codec), options, dict)?;
        engine.compress_frame(data)
    }

    /// Decompress every frame in `data`.
    ///
    /// # Errors
    /// - `IncompleteFrame` if `data` ends inside a frame.
    pub fn decompress(
        &self,
        data: &[u8],
        options: &DecompressorOptions,
        dict: Option<DictionaryRef<C>>,
    ) -> Result<Vec<u8>> {
        let mut engine =
            DecompressorEngine::new(Arc::clone(&self.codec), options, dict, FrameMode::Endless)?;
        let out = engine.decompress(data, None)?;
        if !engine.at_frame_edge() {
            return Err(ZstdError::IncompleteFrame { decompressed: out.len() });
        }
        Ok(out)
    }

    // ── Frame inspection ─────────────────────────────────────────────────

    /// Declared content size and dictionary id of the frame starting `frame`.
    pub fn frame_info(&self, frame: &[u8]) -> Result<FrameInfo> {
        let content_size = self
            .codec
            .frame_content_size(frame)
            .map_err(ZstdError::FrameInfoFailed)?;
        Ok(FrameInfo {
            content_size,
            dict_id: self.codec.frame_dict_id(frame),
        })
    }

    /// Compressed size of the first complete frame in `frame`.
    pub fn frame_size(&self, frame: &[u8]) -> Result<usize> {
        self.codec
            .frame_compressed_size(frame)
            .map_err(ZstdError::FrameInfoFailed)
    }
}
