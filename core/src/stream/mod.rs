//! stream/mod.rs
//! Streaming engines and the output buffer they fill.
//!
//! The engines hold no lock; the handle wrappers in `compressor` and
//! `decompressor` own one engine each behind a `Mutex`.

pub mod buffer;
pub mod compress;
pub mod decompress;

pub use buffer::ChunkedOutputBuffer;
pub use compress::CompressorEngine;
pub use decompress::{DecompressorEngine, FrameMode};
