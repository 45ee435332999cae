//! constants.rs
//! Buffer sizing, dictionary and frame-format constants.

const KB: usize = 1024;
const MB: usize = 1024 * 1024;

/// Block sizes used by the growable output buffer, one entry per grow step.
/// The last entry repeats for every further block.
pub const BUFFER_BLOCK_SIZES: &[usize] = &[
    32 * KB,
    64 * KB,
    256 * KB,
    MB,
    4 * MB,
    8 * MB,
    16 * MB,
    16 * MB,
    32 * MB,
    32 * MB,
    32 * MB,
    32 * MB,
    64 * MB,
    64 * MB,
    128 * MB,
    128 * MB,
    256 * MB,
];

/// Largest declared frame content size honoured when pre-sizing a
/// decompression buffer. Bigger frames fall back to the growable strategy
/// so a forged header cannot trigger one huge allocation.
pub const MAX_PRESIZE_BYTES: usize = 64 * MB;

/// Most samples zstd's trainers accept in one call; the count is passed
/// to the codec as an unsigned 32-bit integer.
pub const MAX_DICT_SAMPLES: usize = u32::MAX as usize;

/// Minimum dictionary content length accepted by `ZstdDict`.
pub const DICT_MIN_LEN: usize = 8;

/// zstd frame magic number (little-endian on the wire).
pub const ZSTD_MAGIC: u32 = 0xFD2F_B528;
/// Skippable frames use magics `0x184D2A50..=0x184D2A5F`.
pub const SKIPPABLE_MAGIC_MIN: u32 = 0x184D_2A50;
pub const SKIPPABLE_MAGIC_MAX: u32 = 0x184D_2A5F;
/// Bit of the frame header descriptor announcing a trailing XXH64 checksum.
pub const FHD_CHECKSUM_FLAG: u8 = 0x04;

/// Level 0 asks the codec for its own default level.
pub const DEFAULT_COMPRESSION_LEVEL: i32 = 0;

/// Version gates (`major * 10000 + minor * 100 + patch`).
pub mod versions {
    /// Dictionary finalisation became part of the stable zdict API.
    pub const FINALIZE_DICT: u32 = 10405;
}
