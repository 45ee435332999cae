//! frame.rs
//! Frame header inspection that needs no codec call.
use serde::{Deserialize, Serialize};

use crate::constants::{FHD_CHECKSUM_FLAG, SKIPPABLE_MAGIC_MAX, SKIPPABLE_MAGIC_MIN, ZSTD_MAGIC};

/// Magic number plus the frame header descriptor byte.
pub const HEADER_PROBE_LEN: usize = 5;

/// Integrity check carried by a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Check {
    /// Header not seen yet, or not a zstd frame.
    Unknown,
    None,
    /// Low 32 bits of XXH64 of the content, after the last block.
    Xxh64,
}

/// Declared properties of a frame, read from its header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameInfo {
    /// `None` when the header does not record the content size.
    pub content_size: Option<u64>,
    /// 0 when no dictionary id is recorded.
    pub dict_id: u32,
}

fn magic(data: &[u8]) -> Option<u32> {
    let bytes: [u8; 4] = data.get(..4)?.try_into().ok()?;
    Some(u32::from_le_bytes(bytes))
}

pub fn is_zstd_frame(data: &[u8]) -> bool {
    magic(data) == Some(ZSTD_MAGIC)
}

pub fn is_skippable_frame(data: &[u8]) -> bool {
    matches!(magic(data), Some(m) if (SKIPPABLE_MAGIC_MIN..=SKIPPABLE_MAGIC_MAX).contains(&m))
}

/// Check kind announced by the header at the start of `header`.
pub fn check_kind(header: &[u8]) -> Check {
    if !is_zstd_frame(header) {
        return Check::Unknown;
    }
    match header.get(4) {
        Some(fhd) if fhd & FHD_CHECKSUM_FLAG != 0 => Check::Xxh64,
        Some(_) => Check::None,
        None => Check::Unknown,
    }
}
