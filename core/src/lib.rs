//! zstd-stream-core
//!
//! Streaming zstd compressor and decompressor handles.
//! Growable block-list output, end-directive state machine, multi-frame
//! decoding and shared dictionaries with per-level caches.
//!
//! ```no_run
//! use zstd_stream_core::prelude::*;
//!
//! # fn main() -> zstd_stream_core::Result<()> {
//! let state = ZstdState::new();
//! let compressor = state.compressor(&CompressorOptions::with_level(3), None)?;
//! let mut frame = compressor.compress(b"hello zstd", EndDirective::Continue)?;
//! frame.extend(compressor.flush(EndDirective::FlushFrame)?);
//!
//! let decompressor = state.decompressor(&DecompressorOptions::default(), None)?;
//! assert_eq!(decompressor.decompress(&frame, None)?, b"hello zstd");
//! assert!(decompressor.eof());
//! # Ok(())
//! # }
//! ```

#![deny(unsafe_code)]

// Shared and top level
pub mod constants;
pub mod types;
pub mod utils;

// Codec seam
pub mod codec;

// Streaming layer
pub mod stream;
pub mod dict;
pub mod frame;

// Handles and configuration
pub mod compressor;
pub mod decompressor;
pub mod options;
pub mod state;

pub mod telemetry;

pub use codec::{CompressionParameter, DecompressionParameter, EndDirective, ParamBounds};
pub use compressor::Compressor;
pub use decompressor::{Decompressor, EndlessDecompressor};
pub use dict::{DictKind, DictionaryRef, ZstdDict};
pub use frame::{Check, FrameInfo};
pub use options::{CompressorOptions, DecompressorOptions};
pub use state::ZstdState;
pub use types::{Direction, Result, ZstdError};

// -----------------------------------------------------------------------------
// Prelude (Rust users)
// -----------------------------------------------------------------------------
pub mod prelude {
    pub use crate::codec::{CompressionParameter, DecompressionParameter, EndDirective};
    pub use crate::compressor::Compressor;
    pub use crate::decompressor::{Decompressor, EndlessDecompressor};
    pub use crate::dict::{DictKind, DictionaryRef, ZstdDict};
    pub use crate::frame::Check;
    pub use crate::options::{CompressorOptions, DecompressorOptions};
    pub use crate::state::ZstdState;
    pub use crate::types::{Direction, Result, ZstdError};
}
