//! dict/handle.rs
//! Shared dictionary with lazily prepared codec objects.
//!
//! Design notes:
//! - Content is immutable `Bytes`; handing it out never copies.
//! - Prepared compression dictionaries are cached per level, the prepared
//!   decompression dictionary once. Each cache has its own lock, held across
//!   preparation so concurrent requests prepare exactly once.
//! - [`DictionaryRef`] pairs a dictionary with the loading strategy an engine
//!   applies to its context.
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex};

use bytes::Bytes;

use crate::codec::{Codec, CompressionContext, DecompressionContext, ZstdCodec};
use crate::constants::DICT_MIN_LEN;
use crate::state::ZstdState;
use crate::types::{Direction, Result, ZstdError};
use crate::utils::lock;

pub struct ZstdDict<C: Codec = ZstdCodec> {
    codec: Arc<C>,
    content: Bytes,
    dict_id: u32,
    cdicts: Mutex<HashMap<i32, Arc<C::CDict>>>,
    ddict: Mutex<Option<Arc<C::DDict>>>,
}

impl<C: Codec> ZstdDict<C> {
    /// Validate `content` and wrap it for sharing between handles.
    ///
    /// # Errors
    /// - `InvalidDictionary` if content is shorter than 8 bytes.
    /// - `InvalidDictionary` if content lacks the zstd dictionary format
    ///   (id 0) and `allow_raw` is false.
    pub fn new(state: &ZstdState<C>, content: impl Into<Bytes>, allow_raw: bool) -> Result<Arc<Self>> {
        let content = content.into();
        if content.len() < DICT_MIN_LEN {
            return Err(ZstdError::InvalidDictionary(format!(
                "zstd dictionary content should be at least {DICT_MIN_LEN} bytes, got {}",
                content.len()
            )));
        }

        let codec = Arc::clone(state.codec());
        let dict_id = codec.dict_id(&content);
        if dict_id == 0 && !allow_raw {
            return Err(ZstdError::InvalidDictionary(
                "content is not a zstd format dictionary (dictionary id is 0); \
                 pass allow_raw to use it as raw content"
                    .into(),
            ));
        }

        log::debug!("zstd dictionary loaded: id={dict_id}, {} bytes", content.len());
        Ok(Arc::new(Self {
            codec,
            content,
            dict_id,
            cdicts: Mutex::new(HashMap::new()),
            ddict: Mutex::new(None),
        }))
    }

    /// 0 for raw content dictionaries.
    pub fn dict_id(&self) -> u32 {
        self.dict_id
    }

    pub fn dict_content(&self) -> Bytes {
        self.content.clone()
    }

    pub fn is_raw(&self) -> bool {
        self.dict_id == 0
    }

    /// Levels with a prepared compression dictionary, ascending.
    pub fn cached_levels(&self) -> Vec<i32> {
        let mut levels: Vec<i32> = lock(&self.cdicts).keys().copied().collect();
        levels.sort_unstable();
        levels
    }

    /// Prepared compression dictionary for `level`, built on first request.
    pub fn get_compression_dict(&self, level: i32) -> Result<Arc<C::CDict>> {
        let mut cache = lock(&self.cdicts);
        if let Some(cdict) = cache.get(&level) {
            return Ok(Arc::clone(cdict));
        }

        let cdict = self
            .codec
            .prepare_cdict(&self.content, level)
            .map(Arc::new)
            .map_err(|source| ZstdError::DictionaryLoadFailed {
                direction: Direction::Compression,
                source,
            })?;
        log::debug!("prepared compression dictionary id={} level={level}", self.dict_id);
        cache.insert(level, Arc::clone(&cdict));
        Ok(cdict)
    }

    /// Prepared decompression dictionary, built on first request.
    pub fn get_decompression_dict(&self) -> Result<Arc<C::DDict>> {
        let mut slot = lock(&self.ddict);
        if let Some(ddict) = slot.as_ref() {
            return Ok(Arc::clone(ddict));
        }

        let ddict = self
            .codec
            .prepare_ddict(&self.content)
            .map(Arc::new)
            .map_err(|source| ZstdError::DictionaryLoadFailed {
                direction: Direction::Decompression,
                source,
            })?;
        log::debug!("prepared decompression dictionary id={}", self.dict_id);
        *slot = Some(Arc::clone(&ddict));
        Ok(ddict)
    }

    /// Load as a prepared dictionary. Fastest to reuse; its compression
    /// parameters may override the compressor's own.
    pub fn as_digested_dict(self: &Arc<Self>) -> DictionaryRef<C> {
        DictionaryRef::new(Arc::clone(self), DictKind::Digested)
    }

    /// Load the raw content into the context. Slower to load, keeps every
    /// compressor parameter.
    pub fn as_undigested_dict(self: &Arc<Self>) -> DictionaryRef<C> {
        DictionaryRef::new(Arc::clone(self), DictKind::Undigested)
    }

    /// Reference the content as a prefix for the next frame only.
    pub fn as_prefix(self: &Arc<Self>) -> DictionaryRef<C> {
        DictionaryRef::new(Arc::clone(self), DictKind::Prefix)
    }
}

impl<C: Codec> fmt::Debug for ZstdDict<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ZstdDict")
            .field("dict_id", &self.dict_id)
            .field("len", &self.content.len())
            .finish()
    }
}

/// How a dictionary is applied to a codec context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DictKind {
    Digested,
    Undigested,
    Prefix,
}

/// A dictionary paired with its loading strategy.
pub struct DictionaryRef<C: Codec = ZstdCodec> {
    dict: Arc<ZstdDict<C>>,
    kind: DictKind,
}

impl<C: Codec> DictionaryRef<C> {
    pub fn new(dict: Arc<ZstdDict<C>>, kind: DictKind) -> Self {
        Self { dict, kind }
    }

    pub fn dict(&self) -> &Arc<ZstdDict<C>> {
        &self.dict
    }

    pub fn kind(&self) -> DictKind {
        self.kind
    }

    pub(crate) fn load_into_cctx(&self, cctx: &mut C::CCtx, level: i32) -> Result<()> {
        let loaded = match self.kind {
            DictKind::Digested => {
                let cdict = self.dict.get_compression_dict(level)?;
                cctx.ref_cdict(cdict)
            }
            DictKind::Undigested => cctx.load_dictionary(&self.dict.content),
            DictKind::Prefix => cctx.ref_prefix(self.dict.dict_content()),
        };
        loaded.map_err(|source| ZstdError::DictionaryLoadFailed {
            direction: Direction::Compression,
            source,
        })
    }

    pub(crate) fn load_into_dctx(&self, dctx: &mut C::DCtx) -> Result<()> {
        let loaded = match self.kind {
            DictKind::Digested => {
                let ddict = self.dict.get_decompression_dict()?;
                dctx.ref_ddict(ddict)
            }
            DictKind::Undigested => dctx.load_dictionary(&self.dict.content),
            DictKind::Prefix => dctx.ref_prefix(self.dict.dict_content()),
        };
        loaded.map_err(|source| ZstdError::DictionaryLoadFailed {
            direction: Direction::Decompression,
            source,
        })
    }
}

impl<C: Codec> Clone for DictionaryRef<C> {
    fn clone(&self) -> Self {
        Self {
            dict: Arc::clone(&self.dict),
            kind: self.kind,
        }
    }
}

impl<C: Codec> fmt::Debug for DictionaryRef<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DictionaryRef")
            .field("dict", &self.dict)
            .field("kind", &self.kind)
            .finish()
    }
}

/// A bare dictionary is used digested.
impl<C: Codec> From<Arc<ZstdDict<C>>> for DictionaryRef<C> {
    fn from(dict: Arc<ZstdDict<C>>) -> Self {
        DictionaryRef::new(dict, DictKind::Digested)
    }
}
