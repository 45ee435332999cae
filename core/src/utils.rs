//! utils.rs
//! Small helpers shared by the handles and engines.
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::codec::{CodecError, ParamBounds};
use crate::types::{Direction, ZstdError};

/// Acquire `mutex`, recovering the guard if a previous holder panicked.
/// Engine state is consistent between codec calls, so a poisoned lock
/// carries no half-written state.
pub fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Error for a parameter the codec refused.
/// `bounds` is the codec's answer to a bounds query for that parameter: a
/// failed query means the running library does not know the parameter.
pub(crate) fn parameter_error(
    direction: Direction,
    name: &'static str,
    value: i32,
    bounds: std::result::Result<ParamBounds, CodecError>,
    version: String,
) -> ZstdError {
    match bounds {
        Ok(bounds) => ZstdError::ParameterOutOfBounds {
            direction,
            name,
            lower: bounds.lower,
            upper: bounds.upper,
            value,
            version,
        },
        Err(_) => ZstdError::UnsupportedAtThisLibraryVersion {
            feature: format!("zstd {direction} parameter \"{name}\""),
            required: "a newer zstd release".into(),
            running: version,
        },
    }
}
