//! options.rs
//! Compressor and decompressor configuration.
//!
//! Parameters are keyed by typed enums and serialise with snake_case names:
//!
//! ```json
//! { "level": 19, "parameters": { "checksum_flag": 1, "window_log": 24 } }
//! ```
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::codec::{CompressionParameter, DecompressionParameter};
use crate::types::{Result, ZstdError};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CompressorOptions {
    /// Shorthand for `parameters[compression_level]`; set one or the other.
    pub level: Option<i32>,
    pub parameters: BTreeMap<CompressionParameter, i32>,
}

impl CompressorOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_level(level: i32) -> Self {
        Self {
            level: Some(level),
            ..Self::default()
        }
    }

    pub fn parameter(mut self, param: CompressionParameter, value: i32) -> Self {
        self.parameters.insert(param, value);
        self
    }

    /// Build from integer `(key, value)` pairs, as zstd numbers them.
    pub fn from_keys<I>(pairs: I) -> Result<Self>
    where
        I: IntoIterator<Item = (i32, i32)>,
    {
        let mut options = Self::default();
        for (key, value) in pairs {
            options.parameters.insert(CompressionParameter::from_key(key)?, value);
        }
        Ok(options)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json)
            .map_err(|e| ZstdError::InvalidArgument(format!("invalid compressor options: {e}")))
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(self)
            .map_err(|e| ZstdError::InvalidArgument(format!("unserialisable compressor options: {e}")))
    }

    /// The level these options select, if any.
    pub fn effective_level(&self) -> Result<Option<i32>> {
        match (self.level, self.parameters.get(&CompressionParameter::CompressionLevel)) {
            (Some(_), Some(_)) => Err(ZstdError::InvalidArgument(
                "set either level or parameters[compression_level], not both".into(),
            )),
            (Some(level), None) => Ok(Some(level)),
            (None, param) => Ok(param.copied()),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DecompressorOptions {
    pub parameters: BTreeMap<DecompressionParameter, i32>,
}

impl DecompressorOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn parameter(mut self, param: DecompressionParameter, value: i32) -> Self {
        self.parameters.insert(param, value);
        self
    }

    pub fn from_keys<I>(pairs: I) -> Result<Self>
    where
        I: IntoIterator<Item = (i32, i32)>,
    {
        let mut options = Self::default();
        for (key, value) in pairs {
            options.parameters.insert(DecompressionParameter::from_key(key)?, value);
        }
        Ok(options)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json)
            .map_err(|e| ZstdError::InvalidArgument(format!("invalid decompressor options: {e}")))
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(self)
            .map_err(|e| ZstdError::InvalidArgument(format!("unserialisable decompressor options: {e}")))
    }
}
