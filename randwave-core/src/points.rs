//! Control points: the sparse (position, amplitude) pairs a wavetable is grown from.
//!
//! An ordered point set for a table of `size` samples always
//! - starts at `(0, 0.0)` and ends at `(size - 1, 0.0)` (zero crossings at the loop seam),
//! - has strictly increasing positions,
//! - keeps every amplitude inside [-1, 1].
//!
//! [`check_point_set`] reports the first rule a set breaks.

use thiserror::Error;

/// One control point of the waveform.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct ControlPoint {
    /// Sample index in `[0, size - 1]`.
    pub position: usize,
    /// Amplitude in `[-1, 1]`.
    pub amplitude: f32,
}

impl ControlPoint {
    #[inline]
    pub fn new(position: usize, amplitude: f32) -> Self {
        Self { position, amplitude }
    }

    /// Zero-amplitude endpoint at `position`.
    #[inline]
    pub fn anchor(position: usize) -> Self {
        Self { position, amplitude: 0.0 }
    }
}

/// Why an ordered point set is not usable for a given table size.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PointSetError {
    #[error("a point set needs at least 3 points (two anchors and one interior), got {len}")]
    TooFew { len: usize },

    #[error("first point must be (0, 0.0), found ({position}, {amplitude})")]
    FirstNotAnchored { position: usize, amplitude: f32 },

    #[error("last point must be ({expected}, 0.0), found ({position}, {amplitude})")]
    LastNotAnchored { expected: usize, position: usize, amplitude: f32 },

    #[error("positions must strictly increase: point {index} at {position} follows {previous}")]
    NotIncreasing { index: usize, position: usize, previous: usize },

    #[error("point {index} has amplitude {amplitude} outside [-1, 1]")]
    AmplitudeOutOfRange { index: usize, amplitude: f32 },
}

/// Check the ordered-set invariants for a table of `size` samples.
pub fn check_point_set(points: &[ControlPoint], size: usize) -> Result<(), PointSetError> {
    let (Some(first), Some(last)) = (points.first(), points.last()) else {
        return Err(PointSetError::TooFew { len: 0 });
    };
    if points.len() < 3 {
        return Err(PointSetError::TooFew { len: points.len() });
    }

    if first.position != 0 || first.amplitude != 0.0 {
        return Err(PointSetError::FirstNotAnchored {
            position: first.position,
            amplitude: first.amplitude,
        });
    }

    let expected = size.saturating_sub(1);
    if last.position != expected || last.amplitude != 0.0 {
        return Err(PointSetError::LastNotAnchored {
            expected,
            position: last.position,
            amplitude: last.amplitude,
        });
    }

    for (index, pair) in points.windows(2).enumerate() {
        if pair[1].position <= pair[0].position {
            return Err(PointSetError::NotIncreasing {
                index: index + 1,
                position: pair[1].position,
                previous: pair[0].position,
            });
        }
    }

    // NaN fails the range test too.
    if let Some((index, p)) = points
        .iter()
        .enumerate()
        .find(|(_, p)| !(-1.0..=1.0).contains(&p.amplitude))
    {
        return Err(PointSetError::AmplitudeOutOfRange { index, amplitude: p.amplitude });
    }

    Ok(())
}
