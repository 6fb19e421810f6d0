//! Error types for wavetable generation.

use std::collections::TryReserveError;

use randwave_core::cardinal::InterpolateError;
use randwave_core::points::PointSetError;
use thiserror::Error;

/// Result type for generate operations.
pub type GenerateResult<T> = Result<T, GenerateError>;

/// Errors that can stop a generate call. The previous wavetable is always kept.
#[derive(Debug, Error)]
pub enum GenerateError {
    /// A buffer for the new table could not be reserved.
    #[error("could not allocate {what} ({len} entries)")]
    Alloc {
        /// Which buffer failed.
        what: &'static str,
        /// Requested length.
        len: usize,
        #[source]
        source: TryReserveError,
    },

    /// The generated points broke an ordering or anchoring rule.
    #[error("generated point set is malformed: {0}")]
    PointSet(#[from] PointSetError),

    /// Reconstruction rejected its input.
    #[error("interpolation failed: {0}")]
    Interpolate(#[from] InterpolateError),

    /// The audio side of a handoff channel was dropped.
    #[error("playback voice is gone")]
    Disconnected,

    /// The audio thread has not picked up earlier tables yet.
    #[error("{pending} wavetables are already waiting for the audio thread")]
    Backlog {
        /// Tables still queued.
        pending: usize,
    },
}

/// Reserve exactly `len` slots up front so a failed allocation surfaces as an error.
pub(crate) fn try_with_capacity<T>(len: usize, what: &'static str) -> GenerateResult<Vec<T>> {
    let mut v = Vec::new();
    v.try_reserve_exact(len)
        .map_err(|source| GenerateError::Alloc { what, len, source })?;
    Ok(v)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absurd_reservation_is_an_error() {
        let err = try_with_capacity::<f32>(usize::MAX, "samples").unwrap_err();
        assert!(matches!(err, GenerateError::Alloc { what: "samples", .. }));
        assert!(err.to_string().contains("samples"));
    }

    #[test]
    fn reservation_has_room() {
        let v = try_with_capacity::<u8>(64, "scratch").unwrap();
        assert!(v.capacity() >= 64 && v.is_empty());
    }
}
