//! codec/mod.rs
//! The seam between the streaming layer and the prebuilt codec library.
//!
//! The engines never call zstd directly. They drive the single-step
//! primitives exposed by [`CompressionContext`] and [`DecompressionContext`]
//! and ask the [`Codec`] for everything else (bounds, prepared dictionaries,
//! training). [`ZstdCodec`] binds the traits to libzstd; tests substitute
//! counting or fault-injecting implementations.

pub mod params;
pub mod libzstd;

use std::borrow::Cow;
use std::sync::Arc;

use bytes::Bytes;
use num_enum::TryFromPrimitive;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::{Result, ZstdError};

pub use params::{CompressionParameter, DecompressionParameter, ParamBounds};
pub use libzstd::{ZstdCCtx, ZstdCDict, ZstdCodec, ZstdDCtx, ZstdDDict};

/// Error reported by a codec primitive: its numeric code and readable name.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct CodecError {
    code: usize,
    message: Cow<'static, str>,
}

impl CodecError {
    pub fn new(code: usize, message: impl Into<Cow<'static, str>>) -> Self {
        Self { code, message: message.into() }
    }

    /// Error raised by this layer rather than by a codec call.
    pub fn custom(message: impl Into<Cow<'static, str>>) -> Self {
        Self::new(0, message)
    }

    pub fn code(&self) -> usize {
        self.code
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

/// How much internal state the compressor flushes on a call.
/// Discriminants match `ZSTD_EndDirective`.
#[repr(i32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, TryFromPrimitive, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EndDirective {
    /// Buffer input, emit output only when a block is ready.
    Continue = 0,
    /// Flush a block; the frame stays open.
    FlushBlock = 1,
    /// Flush and close the frame.
    FlushFrame = 2,
}

impl EndDirective {
    /// Convert an integer mode value, rejecting anything unknown.
    pub fn from_mode(mode: i32) -> Result<Self> {
        Self::try_from(mode).map_err(|_| {
            ZstdError::InvalidArgument(format!(
                "mode argument wrong value {mode}, it should be one of \
                 Continue (0), FlushBlock (1), FlushFrame (2)"
            ))
        })
    }
}

/// Result of one single-step primitive call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StreamProgress {
    /// Input bytes consumed by this call.
    pub consumed: usize,
    /// Output bytes written by this call.
    pub produced: usize,
    /// Codec hint: 0 means fully flushed (compress) or frame complete
    /// (decompress); nonzero means more work is pending.
    pub remaining: usize,
}

/// A codec compression context (`ZSTD_CCtx`). Not safe for concurrent use;
/// the owning handle serialises access.
pub trait CompressionContext: Send {
    type CDict: Send + Sync + 'static;

    fn set_parameter(&mut self, param: CompressionParameter, value: i32)
        -> std::result::Result<(), CodecError>;

    /// `None` clears a previous pledge.
    fn set_pledged_src_size(&mut self, size: Option<u64>) -> std::result::Result<(), CodecError>;

    /// Reference a prepared dictionary. The context keeps the `Arc` alive
    /// for as long as the codec may read it.
    fn ref_cdict(&mut self, cdict: Arc<Self::CDict>) -> std::result::Result<(), CodecError>;

    /// Load (copy) raw dictionary content.
    fn load_dictionary(&mut self, content: &[u8]) -> std::result::Result<(), CodecError>;

    /// Reference a prefix for the next frame only.
    fn ref_prefix(&mut self, prefix: Bytes) -> std::result::Result<(), CodecError>;

    /// One `ZSTD_compressStream2` step.
    fn compress_stream(
        &mut self,
        dst: &mut [u8],
        src: &[u8],
        directive: EndDirective,
    ) -> std::result::Result<StreamProgress, CodecError>;

    /// Drop any open session. Never fails; parameters and dictionary stay.
    fn reset_session(&mut self);
}

/// A codec decompression context (`ZSTD_DCtx`).
pub trait DecompressionContext: Send {
    type DDict: Send + Sync + 'static;

    fn set_parameter(&mut self, param: DecompressionParameter, value: i32)
        -> std::result::Result<(), CodecError>;

    fn ref_ddict(&mut self, ddict: Arc<Self::DDict>) -> std::result::Result<(), CodecError>;

    fn load_dictionary(&mut self, content: &[u8]) -> std::result::Result<(), CodecError>;

    fn ref_prefix(&mut self, prefix: Bytes) -> std::result::Result<(), CodecError>;

    /// One `ZSTD_decompressStream` step.
    fn decompress_stream(
        &mut self,
        dst: &mut [u8],
        src: &[u8],
    ) -> std::result::Result<StreamProgress, CodecError>;

    fn reset_session(&mut self);
}

/// The external codec library, treated as a black box.
pub trait Codec: Send + Sync + 'static {
    type CDict: Send + Sync + 'static;
    type DDict: Send + Sync + 'static;
    type CCtx: CompressionContext<CDict = Self::CDict>;
    type DCtx: DecompressionContext<DDict = Self::DDict>;

    /// `major * 10000 + minor * 100 + patch`.
    fn version_number(&self) -> u32;
    fn version_string(&self) -> String;

    /// `None` when the library could not allocate a context.
    fn create_cctx(&self) -> Option<Self::CCtx>;
    fn create_dctx(&self) -> Option<Self::DCtx>;

    /// Worst-case compressed size of `src_len` input bytes.
    fn compress_bound(&self, src_len: usize) -> usize;

    fn cparam_bounds(&self, param: CompressionParameter)
        -> std::result::Result<ParamBounds, CodecError>;
    fn dparam_bounds(&self, param: DecompressionParameter)
        -> std::result::Result<ParamBounds, CodecError>;

    /// Dictionary id stored in a zstd-format dictionary, 0 for raw content.
    fn dict_id(&self, content: &[u8]) -> u32;

    fn prepare_cdict(&self, content: &[u8], level: i32) -> std::result::Result<Self::CDict, CodecError>;
    fn prepare_ddict(&self, content: &[u8]) -> std::result::Result<Self::DDict, CodecError>;

    fn train_dict(
        &self,
        samples: &[u8],
        sample_sizes: &[usize],
        dict_size: usize,
    ) -> std::result::Result<Vec<u8>, CodecError>;

    fn finalize_dict(
        &self,
        custom_dict: &[u8],
        samples: &[u8],
        sample_sizes: &[usize],
        dict_size: usize,
        level: i32,
    ) -> std::result::Result<Vec<u8>, CodecError>;

    /// Declared content size from a frame header; `Ok(None)` when the frame
    /// does not record it.
    fn frame_content_size(&self, frame: &[u8]) -> std::result::Result<Option<u64>, CodecError>;

    /// Size of the first complete frame in `frame`.
    fn frame_compressed_size(&self, frame: &[u8]) -> std::result::Result<usize, CodecError>;

    /// Dictionary id recorded in a frame header, 0 if none.
    fn frame_dict_id(&self, frame: &[u8]) -> u32;
}
