//! codec/libzstd.rs
//! [`Codec`] implementation over the prebuilt libzstd.
//!
//! Design notes:
//! - Contexts and prepared dictionaries are the `'static` wrappers from
//!   `zstd-safe`, so they can be owned by the streaming engines.
//! - Every context keeps the `Arc`/`Bytes` it references, so referenced
//!   memory always outlives the reference.
//! - Raw `zstd-sys` is only used where `zstd-safe` has no wrapper: parameter
//!   bounds and dictionary finalization.
//! - Error codes are turned into [`CodecError`] with libzstd's error name.
#![allow(unsafe_code)]

use std::num::NonZeroU32;
use std::sync::Arc;

use bytes::Bytes;
use zstd_safe::{zstd_sys, CCtx, CDict, CParameter, DCtx, DDict, DParameter, InBuffer, OutBuffer, ResetDirective};

use super::{
    Codec, CodecError, CompressionContext, CompressionParameter, DecompressionContext,
    DecompressionParameter, EndDirective, ParamBounds, StreamProgress,
};

type CodecResult<T> = std::result::Result<T, CodecError>;

fn check(result: zstd_safe::SafeResult) -> CodecResult<usize> {
    result.map_err(|code| CodecError::new(code, zstd_safe::get_error_name(code)))
}

/// Same as [`check`] for codes returned by raw `zstd-sys` calls.
fn check_raw(code: usize) -> CodecResult<usize> {
    // SAFETY: ZSTD_isError only inspects the integer.
    if unsafe { zstd_sys::ZSTD_isError(code) } != 0 {
        Err(CodecError::new(code, zstd_safe::get_error_name(code)))
    } else {
        Ok(code)
    }
}

/// Error for a value outside the range libzstd reports for the parameter.
fn out_of_bound() -> CodecError {
    CodecError::custom("Parameter is out of bound")
}

fn end_op(directive: EndDirective) -> zstd_sys::ZSTD_EndDirective {
    match directive {
        EndDirective::Continue => zstd_sys::ZSTD_EndDirective::ZSTD_e_continue,
        EndDirective::FlushBlock => zstd_sys::ZSTD_EndDirective::ZSTD_e_flush,
        EndDirective::FlushFrame => zstd_sys::ZSTD_EndDirective::ZSTD_e_end,
    }
}

fn raw_c_param(param: CompressionParameter) -> zstd_sys::ZSTD_cParameter {
    use zstd_sys::ZSTD_cParameter as P;
    match param {
        CompressionParameter::CompressionLevel => P::ZSTD_c_compressionLevel,
        CompressionParameter::WindowLog => P::ZSTD_c_windowLog,
        CompressionParameter::HashLog => P::ZSTD_c_hashLog,
        CompressionParameter::ChainLog => P::ZSTD_c_chainLog,
        CompressionParameter::SearchLog => P::ZSTD_c_searchLog,
        CompressionParameter::MinMatch => P::ZSTD_c_minMatch,
        CompressionParameter::TargetLength => P::ZSTD_c_targetLength,
        CompressionParameter::Strategy => P::ZSTD_c_strategy,
        CompressionParameter::EnableLongDistanceMatching => P::ZSTD_c_enableLongDistanceMatching,
        CompressionParameter::LdmHashLog => P::ZSTD_c_ldmHashLog,
        CompressionParameter::LdmMinMatch => P::ZSTD_c_ldmMinMatch,
        CompressionParameter::LdmBucketSizeLog => P::ZSTD_c_ldmBucketSizeLog,
        CompressionParameter::LdmHashRateLog => P::ZSTD_c_ldmHashRateLog,
        CompressionParameter::ContentSizeFlag => P::ZSTD_c_contentSizeFlag,
        CompressionParameter::ChecksumFlag => P::ZSTD_c_checksumFlag,
        CompressionParameter::DictIdFlag => P::ZSTD_c_dictIDFlag,
        CompressionParameter::NbWorkers => P::ZSTD_c_nbWorkers,
        CompressionParameter::JobSize => P::ZSTD_c_jobSize,
        CompressionParameter::OverlapLog => P::ZSTD_c_overlapLog,
    }
}

fn raw_d_param(param: DecompressionParameter) -> zstd_sys::ZSTD_dParameter {
    match param {
        DecompressionParameter::WindowLogMax => zstd_sys::ZSTD_dParameter::ZSTD_d_windowLogMax,
    }
}

fn strategy(value: i32) -> CodecResult<zstd_safe::Strategy> {
    use zstd_safe::Strategy as S;
    Ok(match value {
        1 => S::ZSTD_fast,
        2 => S::ZSTD_dfast,
        3 => S::ZSTD_greedy,
        4 => S::ZSTD_lazy,
        5 => S::ZSTD_lazy2,
        6 => S::ZSTD_btlazy2,
        7 => S::ZSTD_btopt,
        8 => S::ZSTD_btultra,
        9 => S::ZSTD_btultra2,
        _ => return Err(out_of_bound()),
    })
}

/// Typed parameter for `value`, or `None` when `value` asks for the
/// context's default (strategy 0, long distance matching 0).
///
/// Integer parameters keep the bit pattern of `value`, so libzstd performs
/// its own range check. Flags follow libzstd and treat any nonzero value as
/// set. Long distance matching can only be enabled through the typed form;
/// asking to force it off (2) is refused.
fn c_param(param: CompressionParameter, value: i32) -> CodecResult<Option<CParameter>> {
    let raw = value as u32;
    let flag = value != 0;
    Ok(Some(match param {
        CompressionParameter::CompressionLevel => CParameter::CompressionLevel(value),
        CompressionParameter::WindowLog => CParameter::WindowLog(raw),
        CompressionParameter::HashLog => CParameter::HashLog(raw),
        CompressionParameter::ChainLog => CParameter::ChainLog(raw),
        CompressionParameter::SearchLog => CParameter::SearchLog(raw),
        CompressionParameter::MinMatch => CParameter::MinMatch(raw),
        CompressionParameter::TargetLength => CParameter::TargetLength(raw),
        CompressionParameter::Strategy if value == 0 => return Ok(None),
        CompressionParameter::Strategy => CParameter::Strategy(strategy(value)?),
        CompressionParameter::EnableLongDistanceMatching => match value {
            0 => return Ok(None),
            1 => CParameter::EnableLongDistanceMatching(true),
            _ => return Err(out_of_bound()),
        },
        CompressionParameter::LdmHashLog => CParameter::LdmHashLog(raw),
        CompressionParameter::LdmMinMatch => CParameter::LdmMinMatch(raw),
        CompressionParameter::LdmBucketSizeLog => CParameter::LdmBucketSizeLog(raw),
        CompressionParameter::LdmHashRateLog => CParameter::LdmHashRateLog(raw),
        CompressionParameter::ContentSizeFlag => CParameter::ContentSizeFlag(flag),
        CompressionParameter::ChecksumFlag => CParameter::ChecksumFlag(flag),
        CompressionParameter::DictIdFlag => CParameter::DictIdFlag(flag),
        CompressionParameter::NbWorkers => CParameter::NbWorkers(raw),
        CompressionParameter::JobSize => CParameter::JobSize(raw),
        CompressionParameter::OverlapLog => CParameter::OverlapSizeLog(raw),
    }))
}

fn d_param(param: DecompressionParameter, value: i32) -> DParameter {
    match param {
        DecompressionParameter::WindowLogMax => DParameter::WindowLogMax(value as u32),
    }
}

/// Extend a borrow of `prefix` to `'static`.
///
/// # Safety
/// The caller must keep `prefix` alive, and its storage unmoved, for as long
/// as the context may read it.
unsafe fn detach(prefix: &Bytes) -> &'static [u8] {
    std::slice::from_raw_parts(prefix.as_ptr(), prefix.len())
}

/// The libzstd library linked into this build.
#[derive(Debug, Clone, Copy, Default)]
pub struct ZstdCodec;

impl ZstdCodec {
    pub fn new() -> Self {
        ZstdCodec
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Prepared dictionaries
// ─────────────────────────────────────────────────────────────────────────────

/// A `ZSTD_CDict` prepared for one compression level.
pub struct ZstdCDict(CDict<'static>);

/// A `ZSTD_DDict`.
pub struct ZstdDDict(DDict<'static>);

// ─────────────────────────────────────────────────────────────────────────────
// Compression context
// ─────────────────────────────────────────────────────────────────────────────

pub struct ZstdCCtx {
    // Declared first so the context is freed before what it references.
    ctx: CCtx<'static>,
    cdict: Option<Arc<ZstdCDict>>,
    prefix: Option<Bytes>,
}

impl CompressionContext for ZstdCCtx {
    type CDict = ZstdCDict;

    fn set_parameter(&mut self, param: CompressionParameter, value: i32) -> CodecResult<()> {
        if let Some(param) = c_param(param, value)? {
            check(self.ctx.set_parameter(param))?;
        }
        Ok(())
    }

    fn set_pledged_src_size(&mut self, size: Option<u64>) -> CodecResult<()> {
        check(self.ctx.set_pledged_src_size(size))?;
        Ok(())
    }

    fn ref_cdict(&mut self, cdict: Arc<ZstdCDict>) -> CodecResult<()> {
        check(self.ctx.ref_cdict(&cdict.0))?;
        self.cdict = Some(cdict);
        self.prefix = None;
        Ok(())
    }

    fn load_dictionary(&mut self, content: &[u8]) -> CodecResult<()> {
        check(self.ctx.load_dictionary(content))?;
        self.cdict = None;
        self.prefix = None;
        Ok(())
    }

    fn ref_prefix(&mut self, prefix: Bytes) -> CodecResult<()> {
        // SAFETY: `Bytes` never moves its storage and is kept in `self.prefix`
        // until the next reference replaces it or the context is dropped.
        check(self.ctx.ref_prefix(unsafe { detach(&prefix) }))?;
        self.cdict = None;
        self.prefix = Some(prefix);
        Ok(())
    }

    fn compress_stream(
        &mut self,
        dst: &mut [u8],
        src: &[u8],
        directive: EndDirective,
    ) -> CodecResult<StreamProgress> {
        let mut output = OutBuffer::around(dst);
        let mut input = InBuffer::around(src);
        let remaining = check(self.ctx.compress_stream2(&mut output, &mut input, end_op(directive)))?;
        Ok(StreamProgress {
            consumed: input.pos,
            produced: output.pos(),
            remaining,
        })
    }

    fn reset_session(&mut self) {
        // A session-only reset cannot fail.
        let _ = self.ctx.reset(ResetDirective::SessionOnly);
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Decompression context
// ─────────────────────────────────────────────────────────────────────────────

pub struct ZstdDCtx {
    ctx: DCtx<'static>,
    ddict: Option<Arc<ZstdDDict>>,
    prefix: Option<Bytes>,
}

impl DecompressionContext for ZstdDCtx {
    type DDict = ZstdDDict;

    fn set_parameter(&mut self, param: DecompressionParameter, value: i32) -> CodecResult<()> {
        check(self.ctx.set_parameter(d_param(param, value)))?;
        Ok(())
    }

    fn ref_ddict(&mut self, ddict: Arc<ZstdDDict>) -> CodecResult<()> {
        check(self.ctx.ref_ddict(&ddict.0))?;
        self.ddict = Some(ddict);
        self.prefix = None;
        Ok(())
    }

    fn load_dictionary(&mut self, content: &[u8]) -> CodecResult<()> {
        check(self.ctx.load_dictionary(content))?;
        self.ddict = None;
        self.prefix = None;
        Ok(())
    }

    fn ref_prefix(&mut self, prefix: Bytes) -> CodecResult<()> {
        // SAFETY: as for the compression context.
        check(self.ctx.ref_prefix(unsafe { detach(&prefix) }))?;
        self.ddict = None;
        self.prefix = Some(prefix);
        Ok(())
    }

    fn decompress_stream(&mut self, dst: &mut [u8], src: &[u8]) -> CodecResult<StreamProgress> {
        let mut output = OutBuffer::around(dst);
        let mut input = InBuffer::around(src);
        let remaining = check(self.ctx.decompress_stream(&mut output, &mut input))?;
        Ok(StreamProgress {
            consumed: input.pos,
            produced: output.pos(),
            remaining,
        })
    }

    fn reset_session(&mut self) {
        let _ = self.ctx.reset(ResetDirective::SessionOnly);
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Library entry points
// ─────────────────────────────────────────────────────────────────────────────

impl Codec for ZstdCodec {
    type CDict = ZstdCDict;
    type DDict = ZstdDDict;
    type CCtx = ZstdCCtx;
    type DCtx = ZstdDCtx;

    fn version_number(&self) -> u32 {
        zstd_safe::version_number()
    }

    fn version_string(&self) -> String {
        zstd_safe::version_string().to_string()
    }

    fn create_cctx(&self) -> Option<ZstdCCtx> {
        let ctx = CCtx::try_create()?;
        Some(ZstdCCtx { ctx, cdict: None, prefix: None })
    }

    fn create_dctx(&self) -> Option<ZstdDCtx> {
        let ctx = DCtx::try_create()?;
        Some(ZstdDCtx { ctx, ddict: None, prefix: None })
    }

    fn compress_bound(&self, src_len: usize) -> usize {
        zstd_safe::compress_bound(src_len)
    }

    fn cparam_bounds(&self, param: CompressionParameter) -> CodecResult<ParamBounds> {
        // SAFETY: pure lookup.
        let bounds = unsafe { zstd_sys::ZSTD_cParam_getBounds(raw_c_param(param)) };
        check_raw(bounds.error)?;
        Ok(ParamBounds {
            lower: bounds.lowerBound,
            upper: bounds.upperBound,
        })
    }

    fn dparam_bounds(&self, param: DecompressionParameter) -> CodecResult<ParamBounds> {
        // SAFETY: pure lookup.
        let bounds = unsafe { zstd_sys::ZSTD_dParam_getBounds(raw_d_param(param)) };
        check_raw(bounds.error)?;
        Ok(ParamBounds {
            lower: bounds.lowerBound,
            upper: bounds.upperBound,
        })
    }

    fn dict_id(&self, content: &[u8]) -> u32 {
        zstd_safe::get_dict_id_from_dict(content).map_or(0, NonZeroU32::get)
    }

    fn prepare_cdict(&self, content: &[u8], level: i32) -> CodecResult<ZstdCDict> {
        CDict::try_create(content, level)
            .map(ZstdCDict)
            .ok_or_else(|| CodecError::custom("Failed to create ZSTD_CDict instance from zstd dictionary content"))
    }

    fn prepare_ddict(&self, content: &[u8]) -> CodecResult<ZstdDDict> {
        DDict::try_create(content)
            .map(ZstdDDict)
            .ok_or_else(|| CodecError::custom("Failed to create ZSTD_DDict instance from zstd dictionary content"))
    }

    fn train_dict(&self, samples: &[u8], sample_sizes: &[usize], dict_size: usize) -> CodecResult<Vec<u8>> {
        ::zstd::dict::from_continuous(samples, sample_sizes, dict_size)
            .map_err(|e| CodecError::custom(e.to_string()))
    }

    fn finalize_dict(
        &self,
        custom_dict: &[u8],
        samples: &[u8],
        sample_sizes: &[usize],
        dict_size: usize,
        level: i32,
    ) -> CodecResult<Vec<u8>> {
        let nb_samples = u32::try_from(sample_sizes.len())
            .map_err(|_| CodecError::custom("too many samples"))?;
        let mut dict = vec![0u8; dict_size];
        let params = zstd_sys::ZDICT_params_t {
            compressionLevel: level,
            notificationLevel: 0,
            dictID: 0,
        };
        // SAFETY: every pointer/length pair describes a live slice and the
        // destination has `dict_size` writable bytes.
        let code = unsafe {
            zstd_sys::ZDICT_finalizeDictionary(
                dict.as_mut_ptr().cast(),
                dict.len(),
                custom_dict.as_ptr().cast(),
                custom_dict.len(),
                samples.as_ptr().cast(),
                sample_sizes.as_ptr(),
                nb_samples,
                params,
            )
        };
        let written = check_raw(code)?;
        dict.truncate(written);
        Ok(dict)
    }

    fn frame_content_size(&self, frame: &[u8]) -> CodecResult<Option<u64>> {
        zstd_safe::get_frame_content_size(frame)
            .map_err(|_| CodecError::custom("invalid or truncated zstd frame header"))
    }

    fn frame_compressed_size(&self, frame: &[u8]) -> CodecResult<usize> {
        check(zstd_safe::find_frame_compressed_size(frame))
    }

    fn frame_dict_id(&self, frame: &[u8]) -> u32 {
        zstd_safe::get_dict_id_from_frame(frame).map_or(0, NonZeroU32::get)
    }
}
