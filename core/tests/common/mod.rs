//! Shared test helpers: a codec wrapper that can inject failures and counts
//! dictionary preparations, plus sample data generators.
#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use bytes::Bytes;
use zstd_stream_core::codec::{
    Codec, CodecError, CompressionContext, CompressionParameter, DecompressionContext,
    DecompressionParameter, EndDirective, ParamBounds, StreamProgress, ZstdCCtx, ZstdCDict,
    ZstdCodec, ZstdDCtx, ZstdDDict,
};
use zstd_stream_core::ZstdState;

/// Switches and counters shared between a [`FaultyCodec`] and the test.
#[derive(Default)]
pub struct Faults {
    pub fail_compress: AtomicBool,
    pub fail_decompress: AtomicBool,
    pub cdict_prepares: AtomicUsize,
    pub ddict_prepares: AtomicUsize,
    /// Sleep inside every dictionary preparation, to widen race windows.
    pub prepare_delay_ms: AtomicU64,
}

impl Faults {
    pub fn set_fail_compress(&self, on: bool) {
        self.fail_compress.store(on, Ordering::SeqCst);
    }

    pub fn set_fail_decompress(&self, on: bool) {
        self.fail_decompress.store(on, Ordering::SeqCst);
    }

    pub fn cdict_prepares(&self) -> usize {
        self.cdict_prepares.load(Ordering::SeqCst)
    }

    pub fn ddict_prepares(&self) -> usize {
        self.ddict_prepares.load(Ordering::SeqCst)
    }

    fn delay(&self) {
        let ms = self.prepare_delay_ms.load(Ordering::SeqCst);
        if ms > 0 {
            thread::sleep(Duration::from_millis(ms));
        }
    }
}

pub struct FaultyCodec {
    inner: ZstdCodec,
    faults: Arc<Faults>,
}

/// A state over a [`FaultyCodec`] and the switches that control it.
pub fn faulty_state() -> (ZstdState<FaultyCodec>, Arc<Faults>) {
    let faults = Arc::new(Faults::default());
    let codec = FaultyCodec {
        inner: ZstdCodec::new(),
        faults: Arc::clone(&faults),
    };
    (ZstdState::with_codec(codec), faults)
}

pub struct FaultyCCtx {
    inner: ZstdCCtx,
    faults: Arc<Faults>,
}

pub struct FaultyDCtx {
    inner: ZstdDCtx,
    faults: Arc<Faults>,
}

impl CompressionContext for FaultyCCtx {
    type CDict = ZstdCDict;

    fn set_parameter(&mut self, param: CompressionParameter, value: i32) -> Result<(), CodecError> {
        self.inner.set_parameter(param, value)
    }

    fn set_pledged_src_size(&mut self, size: Option<u64>) -> Result<(), CodecError> {
        self.inner.set_pledged_src_size(size)
    }

    fn ref_cdict(&mut self, cdict: Arc<ZstdCDict>) -> Result<(), CodecError> {
        self.inner.ref_cdict(cdict)
    }

    fn load_dictionary(&mut self, content: &[u8]) -> Result<(), CodecError> {
        self.inner.load_dictionary(content)
    }

    fn ref_prefix(&mut self, prefix: Bytes) -> Result<(), CodecError> {
        self.inner.ref_prefix(prefix)
    }

    fn compress_stream(
        &mut self,
        dst: &mut [u8],
        src: &[u8],
        directive: EndDirective,
    ) -> Result<StreamProgress, CodecError> {
        if self.faults.fail_compress.load(Ordering::SeqCst) {
            return Err(CodecError::new(1, "injected compression failure"));
        }
        self.inner.compress_stream(dst, src, directive)
    }

    fn reset_session(&mut self) {
        self.inner.reset_session()
    }
}

impl DecompressionContext for FaultyDCtx {
    type DDict = ZstdDDict;

    fn set_parameter(&mut self, param: DecompressionParameter, value: i32) -> Result<(), CodecError> {
        self.inner.set_parameter(param, value)
    }

    fn ref_ddict(&mut self, ddict: Arc<ZstdDDict>) -> Result<(), CodecError> {
        self.inner.ref_ddict(ddict)
    }

    fn load_dictionary(&mut self, content: &[u8]) -> Result<(), CodecError> {
        self.inner.load_dictionary(content)
    }

    fn ref_prefix(&mut self, prefix: Bytes) -> Result<(), CodecError> {
        self.inner.ref_prefix(prefix)
    }

    fn decompress_stream(&mut self, dst: &mut [u8], src: &[u8]) -> Result<StreamProgress, CodecError> {
        if self.faults.fail_decompress.load(Ordering::SeqCst) {
            return Err(CodecError::new(1, "injected decompression failure"));
        }
        self.inner.decompress_stream(dst, src)
    }

    fn reset_session(&mut self) {
        self.inner.reset_session()
    }
}

impl Codec for FaultyCodec {
    type CDict = ZstdCDict;
    type DDict = ZstdDDict;
    type CCtx = FaultyCCtx;
    type DCtx = FaultyDCtx;

    fn version_number(&self) -> u32 {
        self.inner.version_number()
    }

    fn version_string(&self) -> String {
        self.inner.version_string()
    }

    fn create_cctx(&self) -> Option<FaultyCCtx> {
        Some(FaultyCCtx {
            inner: self.inner.create_cctx()?,
            faults: Arc::clone(&self.faults),
        })
    }

    fn create_dctx(&self) -> Option<FaultyDCtx> {
        Some(FaultyDCtx {
            inner: self.inner.create_dctx()?,
            faults: Arc::clone(&self.faults),
        })
    }

    fn compress_bound(&self, src_len: usize) -> usize {
        self.inner.compress_bound(src_len)
    }

    fn cparam_bounds(&self, param: CompressionParameter) -> Result<ParamBounds, CodecError> {
        self.inner.cparam_bounds(param)
    }

    fn dparam_bounds(&self, param: DecompressionParameter) -> Result<ParamBounds, CodecError> {
        self.inner.dparam_bounds(param)
    }

    fn dict_id(&self, content: &[u8]) -> u32 {
        self.inner.dict_id(content)
    }

    fn prepare_cdict(&self, content: &[u8], level: i32) -> Result<ZstdCDict, CodecError> {
        self.faults.cdict_prepares.fetch_add(1, Ordering::SeqCst);
        self.faults.delay();
        self.inner.prepare_cdict(content, level)
    }

    fn prepare_ddict(&self, content: &[u8]) -> Result<ZstdDDict, CodecError> {
        self.faults.ddict_prepares.fetch_add(1, Ordering::SeqCst);
        self.faults.delay();
        self.inner.prepare_ddict(content)
    }

    fn train_dict(&self, samples: &[u8], sample_sizes: &[usize], dict_size: usize) -> Result<Vec<u8>, CodecError> {
        self.inner.train_dict(samples, sample_sizes, dict_size)
    }

    fn finalize_dict(
        &self,
        custom_dict: &[u8],
        samples: &[u8],
        sample_sizes: &[usize],
        dict_size: usize,
        level: i32,
    ) -> Result<Vec<u8>, CodecError> {
        self.inner.finalize_dict(custom_dict, samples, sample_sizes, dict_size, level)
    }

    fn frame_content_size(&self, frame: &[u8]) -> Result<Option<u64>, CodecError> {
        self.inner.frame_content_size(frame)
    }

    fn frame_compressed_size(&self, frame: &[u8]) -> Result<usize, CodecError> {
        self.inner.frame_compressed_size(frame)
    }

    fn frame_dict_id(&self, frame: &[u8]) -> u32 {
        self.inner.frame_dict_id(frame)
    }
}

// -----------------------------------------------------------------------------
// Sample data
// -----------------------------------------------------------------------------

/// Compressible text of exactly `len` bytes.
pub fn text(len: usize) -> Vec<u8> {
    let line = b"The quick brown fox jumps over the lazy dog. 0123456789\n";
    line.iter().copied().cycle().take(len).collect()
}

/// Poorly compressible bytes of exactly `len` bytes (xorshift stream).
pub fn noise(len: usize, seed: u64) -> Vec<u8> {
    let mut x = seed | 1;
    (0..len)
        .map(|_| {
            x ^= x << 13;
            x ^= x >> 7;
            x ^= x << 17;
            (x >> 24) as u8
        })
        .collect()
}

/// Small JSON-like records sharing structure, suitable for training.
/// Returns the concatenation and the size of every record.
pub fn training_samples(count: usize) -> (Vec<u8>, Vec<usize>) {
    let mut samples = Vec::new();
    let mut sizes = Vec::with_capacity(count);
    for i in 0..count {
        let record = format!(
            "{{\"id\":{i},\"name\":\"user{}\",\"email\":\"user{}@example.com\",\"active\":{},\"score\":{}}}",
            i * 7 % 1000,
            i * 13 % 1000,
            i % 3 == 0,
            (i * 31) % 997
        );
        sizes.push(record.len());
        samples.extend_from_slice(record.as_bytes());
    }
    (samples, sizes)
}

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}
