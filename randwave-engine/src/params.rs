//! Generate parameters and the fallback policy for host-supplied values.
//!
//! Hosts hand over plain numbers (floats, in a patching environment). They are
//! truncated toward zero, then checked:
//! - wavetable size below [`MIN_WAVETABLE_SIZE`] (negative, NaN, tiny) → [`DEFAULT_WAVETABLE_SIZE`]
//! - interior points outside `1..=size-2` of the *resolved* size → [`DEFAULT_INTERIOR_POINTS`],
//!   clamped to `size - 2` when the table is too small for the default
//!
//! Each substitution is logged at `warn` and returned as a [`ParamWarning`].

use num_traits::ToPrimitive;
use thiserror::Error;

pub const DEFAULT_WAVETABLE_SIZE: usize = 2048;
pub const DEFAULT_INTERIOR_POINTS: usize = 4;

/// Two anchors plus one interior slot.
pub const MIN_WAVETABLE_SIZE: usize = 3;

/// Validated (size, interior point count) pair.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct GenerateParams {
    wavetable_size: usize,
    interior_points: usize,
}

/// Rejected explicit parameters (see [`GenerateParams::new`]).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParamError {
    #[error("wavetable size {size} is below the minimum of 3 (two anchors and one interior point)")]
    SizeTooSmall { size: usize },

    #[error("{points} interior points do not fit a {size}-sample table (allowed 1..={max})")]
    PointsOutOfRange { points: usize, size: usize, max: usize },
}

/// A host value that was replaced by a default.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParamWarning {
    #[error("invalid sample count {requested} for wavetable; using default ({fallback}) instead")]
    InvalidSize { requested: f64, fallback: usize },

    #[error("invalid number of interpolation points {requested}; using {fallback} instead")]
    InvalidPoints { requested: f64, fallback: usize },
}

/// Output of [`GenerateParams::resolve`].
#[derive(Debug, Clone, PartialEq)]
pub struct Resolved {
    pub params: GenerateParams,
    pub warnings: Vec<ParamWarning>,
}

impl Default for GenerateParams {
    fn default() -> Self {
        Self {
            wavetable_size: DEFAULT_WAVETABLE_SIZE,
            interior_points: DEFAULT_INTERIOR_POINTS,
        }
    }
}

impl GenerateParams {
    /// Strict constructor for callers that already hold integers.
    pub fn new(wavetable_size: usize, interior_points: usize) -> Result<Self, ParamError> {
        if wavetable_size < MIN_WAVETABLE_SIZE {
            return Err(ParamError::SizeTooSmall { size: wavetable_size });
        }
        let max = wavetable_size - 2;
        if interior_points == 0 || interior_points > max {
            return Err(ParamError::PointsOutOfRange {
                points: interior_points,
                size: wavetable_size,
                max,
            });
        }
        Ok(Self { wavetable_size, interior_points })
    }

    /// Lenient constructor for raw host values; never fails.
    pub fn resolve(raw_size: f64, raw_points: f64) -> Resolved {
        let mut warnings = Vec::new();

        let wavetable_size = match to_count(raw_size) {
            Some(size) if size >= MIN_WAVETABLE_SIZE => size,
            _ => {
                warnings.push(ParamWarning::InvalidSize {
                    requested: raw_size,
                    fallback: DEFAULT_WAVETABLE_SIZE,
                });
                DEFAULT_WAVETABLE_SIZE
            }
        };

        let max = wavetable_size - 2;
        let interior_points = match to_count(raw_points) {
            Some(points) if (1..=max).contains(&points) => points,
            _ => {
                let fallback = DEFAULT_INTERIOR_POINTS.min(max);
                warnings.push(ParamWarning::InvalidPoints { requested: raw_points, fallback });
                fallback
            }
        };

        for w in &warnings {
            log::warn!("randwave: {w}");
        }

        Resolved {
            params: Self { wavetable_size, interior_points },
            warnings,
        }
    }

    #[inline]
    pub fn wavetable_size(&self) -> usize {
        self.wavetable_size
    }

    #[inline]
    pub fn interior_points(&self) -> usize {
        self.interior_points
    }

    /// Interior points plus the two anchors.
    #[inline]
    pub fn total_points(&self) -> usize {
        self.interior_points + 2
    }
}

/// Truncate toward zero; `None` for NaN, infinities and negatives.
fn to_count(raw: f64) -> Option<usize> {
    raw.to_i64().and_then(|v| usize::try_from(v).ok())
}
