//! One generated waveform: its control points and the reconstructed samples.
//!
//! Points and samples travel together in a single value, so whoever holds a
//! `Wavetable` can never pair a buffer with another table's size.

use randwave_core::cardinal::{interpolate, Reconstruction};

use crate::error::{try_with_capacity, GenerateResult};
use crate::generator::{generate_points, ControlPointSet};
use crate::params::GenerateParams;
use crate::source::PointSource;

#[derive(Clone, Debug, PartialEq)]
pub struct Wavetable {
    points: ControlPointSet,
    samples: Vec<f32>,
}

impl Wavetable {
    /// Draw points from `source` and reconstruct a full table.
    ///
    /// Every buffer is reserved before anything is written; on error nothing
    /// outside this call has changed.
    pub fn generate<S: PointSource + ?Sized>(
        params: GenerateParams,
        source: &mut S,
        mode: Reconstruction,
    ) -> GenerateResult<Self> {
        log::info!(
            "randwave: generating {}-sample wavetable from {} interior points ({mode:?})",
            params.wavetable_size(),
            params.interior_points()
        );

        let points = generate_points(params, source)?;
        for (i, p) in points.iter().enumerate() {
            log::debug!("randwave: point {i}: ({}, {:.6})", p.position, p.amplitude);
        }

        let table = Self::from_points(points, params.wavetable_size(), mode)?;
        log::info!("randwave: waveform generated");
        Ok(table)
    }

    /// Reconstruct a table of `size` samples from an existing point set.
    pub fn from_points(
        points: ControlPointSet,
        size: usize,
        mode: Reconstruction,
    ) -> GenerateResult<Self> {
        let mut samples = try_with_capacity::<f32>(size, "wavetable samples")?;
        samples.resize(size, 0.0);
        let mut weights = try_with_capacity::<f64>(points.len(), "interpolation weights")?;
        weights.resize(points.len(), 0.0);

        interpolate(&points, mode, &mut weights, &mut samples)?;
        Ok(Self { points, samples })
    }

    #[inline]
    pub fn points(&self) -> &ControlPointSet {
        &self.points
    }

    #[inline]
    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}
