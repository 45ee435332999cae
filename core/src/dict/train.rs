//! dict/train.rs
//! Dictionary training and finalisation over a [`Codec`].
//!
//! Samples are passed the way zstd takes them: one concatenated buffer plus
//! the length of every sample in order.
use crate::codec::Codec;
use crate::constants::{versions, MAX_DICT_SAMPLES};
use crate::types::{Result, ZstdError};

fn check_samples(samples: &[u8], sample_sizes: &[usize], dict_size: usize) -> Result<()> {
    if dict_size == 0 {
        return Err(ZstdError::InvalidArgument(
            "dict_size argument should be a positive number".into(),
        ));
    }
    if sample_sizes.len() > MAX_DICT_SAMPLES {
        return Err(ZstdError::InvalidArgument(format!(
            "{} samples given, at most {MAX_DICT_SAMPLES} are supported",
            sample_sizes.len()
        )));
    }
    let mut total: usize = 0;
    for size in sample_sizes {
        total = total.checked_add(*size).ok_or_else(|| {
            ZstdError::InvalidArgument("sample sizes overflow the address space".into())
        })?;
    }
    if total != samples.len() {
        return Err(ZstdError::InvalidArgument(format!(
            "the sample sizes add up to {total} bytes but the concatenated samples are {} bytes",
            samples.len()
        )));
    }
    Ok(())
}

/// Train a dictionary of at most `dict_size` bytes.
pub fn train_dict<C: Codec>(
    codec: &C,
    samples: &[u8],
    sample_sizes: &[usize],
    dict_size: usize,
) -> Result<Vec<u8>> {
    check_samples(samples, sample_sizes, dict_size)?;
    let dict = codec
        .train_dict(samples, sample_sizes, dict_size)
        .map_err(ZstdError::DictionaryTrainFailed)?;
    log::debug!(
        "trained zstd dictionary: {} bytes from {} samples",
        dict.len(),
        sample_sizes.len()
    );
    Ok(dict)
}

/// Turn `custom_dict` (raw content) into a zstd format dictionary tuned on
/// the samples for `level`.
pub fn finalize_dict<C: Codec>(
    codec: &C,
    custom_dict: &[u8],
    samples: &[u8],
    sample_sizes: &[usize],
    dict_size: usize,
    level: i32,
) -> Result<Vec<u8>> {
    let running = codec.version_number();
    if running < versions::FINALIZE_DICT {
        return Err(ZstdError::UnsupportedAtThisLibraryVersion {
            feature: "finalize_dict".into(),
            required: "zstd v1.4.5 or later".into(),
            running: codec.version_string(),
        });
    }
    check_samples(samples, sample_sizes, dict_size)?;

    codec
        .finalize_dict(custom_dict, samples, sample_sizes, dict_size, level)
        .map_err(ZstdError::DictionaryFinalizeFailed)
}
