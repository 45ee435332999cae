//! types.rs
//! Shared error type and result alias.
use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::codec::CodecError;

/// Which side of the codec an error or counter belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Compression,
    Decompression,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Compression => f.write_str("compression"),
            Direction::Decompression => f.write_str("decompression"),
        }
    }
}

/// Unified error for every handle, engine and module-level call.
/// - Each failure aborts the current call only; nothing is retried here.
/// - Codec failures carry the codec's own error string.
#[derive(Debug, Error)]
pub enum ZstdError {
    /// Malformed call-site input, rejected before the codec is touched.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Dictionary content rejected at construction.
    #[error("invalid zstd dictionary: {0}")]
    InvalidDictionary(String),

    #[error("Unable to compress zstd data: {0}")]
    CompressionFailed(#[source] CodecError),

    #[error("Unable to decompress zstd data: {0}")]
    DecompressionFailed(#[source] CodecError),

    #[error("Unable to load zstd dictionary or prefix for {direction}: {source}")]
    DictionaryLoadFailed {
        direction: Direction,
        #[source]
        source: CodecError,
    },

    #[error("Unable to train zstd dictionary: {0}")]
    DictionaryTrainFailed(#[source] CodecError),

    #[error("Unable to finalize zstd dictionary: {0}")]
    DictionaryFinalizeFailed(#[source] CodecError),

    /// Single-frame decompressor used again after its frame ended.
    #[error("Already at end of stream")]
    EndOfStreamReuse,

    /// Allocation failure; the current call released all partial output.
    #[error("out of memory: {0}")]
    OutOfMemory(String),

    #[error("{feature} is not supported by zstd v{running}, requires {required}")]
    UnsupportedAtThisLibraryVersion {
        feature: String,
        required: String,
        running: String,
    },

    #[error(
        "Error when setting zstd {direction} parameter \"{name}\", it should \
         {lower} <= value <= {upper}, provided value is {value}. (zstd v{version})"
    )]
    ParameterOutOfBounds {
        direction: Direction,
        name: &'static str,
        lower: i32,
        upper: i32,
        value: i32,
        version: String,
    },

    #[error("Unable to get zstd {direction} parameter bounds: {source}")]
    ParameterBoundsFailed {
        direction: Direction,
        #[source]
        source: CodecError,
    },

    #[error("Unable to set pledged uncompressed content size: {0}")]
    PledgedSizeFailed(#[source] CodecError),

    #[error("Unable to inspect zstd frame: {0}")]
    FrameInfoFailed(#[source] CodecError),

    /// One-shot decompression ran out of input in the middle of a frame.
    #[error("Decompression failed: zstd data ends in an incomplete frame, maybe the input data was truncated. Decompressed data is {decompressed} bytes.")]
    IncompleteFrame { decompressed: usize },
}

impl ZstdError {
    /// True for errors caused by the caller's arguments rather than the codec.
    pub fn is_invalid_argument(&self) -> bool {
        matches!(
            self,
            ZstdError::InvalidArgument(_) | ZstdError::InvalidDictionary(_)
        )
    }

    /// The codec error behind this failure, if any.
    pub fn codec_error(&self) -> Option<&CodecError> {
        match self {
            ZstdError::CompressionFailed(e)
            | ZstdError::DecompressionFailed(e)
            | ZstdError::DictionaryTrainFailed(e)
            | ZstdError::DictionaryFinalizeFailed(e)
            | ZstdError::PledgedSizeFailed(e)
            | ZstdError::FrameInfoFailed(e) => Some(e),
            ZstdError::DictionaryLoadFailed { source, .. }
            | ZstdError::ParameterBoundsFailed { source, .. } => Some(source),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, ZstdError>;
