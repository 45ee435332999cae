//! codec/params.rs
//! Named zstd tunables and their integer keys.
use std::fmt;

use num_enum::TryFromPrimitive;
use serde::{Deserialize, Serialize};

use crate::types::{Result, ZstdError};

/// Compression parameters, keyed by their `ZSTD_cParameter` values.
#[repr(i32)]
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, TryFromPrimitive, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum CompressionParameter {
    CompressionLevel = 100,
    WindowLog = 101,
    HashLog = 102,
    ChainLog = 103,
    SearchLog = 104,
    MinMatch = 105,
    TargetLength = 106,
    Strategy = 107,
    EnableLongDistanceMatching = 160,
    LdmHashLog = 161,
    LdmMinMatch = 162,
    LdmBucketSizeLog = 163,
    LdmHashRateLog = 164,
    ContentSizeFlag = 200,
    ChecksumFlag = 201,
    DictIdFlag = 202,
    NbWorkers = 400,
    JobSize = 401,
    OverlapLog = 402,
}

impl CompressionParameter {
    pub const ALL: [CompressionParameter; 19] = [
        CompressionParameter::CompressionLevel,
        CompressionParameter::WindowLog,
        CompressionParameter::HashLog,
        CompressionParameter::ChainLog,
        CompressionParameter::SearchLog,
        CompressionParameter::MinMatch,
        CompressionParameter::TargetLength,
        CompressionParameter::Strategy,
        CompressionParameter::EnableLongDistanceMatching,
        CompressionParameter::LdmHashLog,
        CompressionParameter::LdmMinMatch,
        CompressionParameter::LdmBucketSizeLog,
        CompressionParameter::LdmHashRateLog,
        CompressionParameter::ContentSizeFlag,
        CompressionParameter::ChecksumFlag,
        CompressionParameter::DictIdFlag,
        CompressionParameter::NbWorkers,
        CompressionParameter::JobSize,
        CompressionParameter::OverlapLog,
    ];

    pub fn key(self) -> i32 {
        self as i32
    }

    /// Look a parameter up by integer key.
    pub fn from_key(key: i32) -> Result<Self> {
        Self::try_from(key).map_err(|_| {
            ZstdError::InvalidArgument(format!("unknown compression parameter (key {key})"))
        })
    }

    /// The name zstd documents for this parameter.
    pub fn name(self) -> &'static str {
        match self {
            CompressionParameter::CompressionLevel => "compressionLevel",
            CompressionParameter::WindowLog => "windowLog",
            CompressionParameter::HashLog => "hashLog",
            CompressionParameter::ChainLog => "chainLog",
            CompressionParameter::SearchLog => "searchLog",
            CompressionParameter::MinMatch => "minMatch",
            CompressionParameter::TargetLength => "targetLength",
            CompressionParameter::Strategy => "strategy",
            CompressionParameter::EnableLongDistanceMatching => "enableLongDistanceMatching",
            CompressionParameter::LdmHashLog => "ldmHashLog",
            CompressionParameter::LdmMinMatch => "ldmMinMatch",
            CompressionParameter::LdmBucketSizeLog => "ldmBucketSizeLog",
            CompressionParameter::LdmHashRateLog => "ldmHashRateLog",
            CompressionParameter::ContentSizeFlag => "contentSizeFlag",
            CompressionParameter::ChecksumFlag => "checksumFlag",
            CompressionParameter::DictIdFlag => "dictIDFlag",
            CompressionParameter::NbWorkers => "nbWorkers",
            CompressionParameter::JobSize => "jobSize",
            CompressionParameter::OverlapLog => "overlapLog",
        }
    }
}

impl fmt::Display for CompressionParameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Decompression parameters, keyed by their `ZSTD_dParameter` values.
#[repr(i32)]
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, TryFromPrimitive, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum DecompressionParameter {
    WindowLogMax = 100,
}

impl DecompressionParameter {
    pub const ALL: [DecompressionParameter; 1] = [DecompressionParameter::WindowLogMax];

    pub fn key(self) -> i32 {
        self as i32
    }

    pub fn from_key(key: i32) -> Result<Self> {
        Self::try_from(key).map_err(|_| {
            ZstdError::InvalidArgument(format!("unknown decompression parameter (key {key})"))
        })
    }

    pub fn name(self) -> &'static str {
        match self {
            DecompressionParameter::WindowLogMax => "windowLogMax",
        }
    }
}

impl fmt::Display for DecompressionParameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Inclusive range accepted by a parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParamBounds {
    pub lower: i32,
    pub upper: i32,
}

impl ParamBounds {
    pub fn contains(&self, value: i32) -> bool {
        self.lower <= value && value <= self.upper
    }
}
