//! Randomness behind control-point generation.
//!
//! Everything random in a generate call goes through [`PointSource`]: one uniform
//! index per shuffle step and one uniform amplitude per interior point. Production
//! code uses [`RngSource`] over PCG32 (seedable, so a seed reproduces a waveform);
//! tests can script exact choices.

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

/// Supplies the random choices a generate call makes.
pub trait PointSource {
    /// Uniform index in `[0, upper]` (inclusive).
    fn index_up_to(&mut self, upper: usize) -> usize;

    /// Uniform amplitude in `[-1, 1]`.
    fn amplitude(&mut self) -> f32;
}

impl<S: PointSource + ?Sized> PointSource for &mut S {
    #[inline]
    fn index_up_to(&mut self, upper: usize) -> usize {
        (**self).index_up_to(upper)
    }

    #[inline]
    fn amplitude(&mut self) -> f32 {
        (**self).amplitude()
    }
}

/// [`PointSource`] over any `rand` generator.
#[derive(Clone, Debug)]
pub struct RngSource<R>(R);

/// The default, seedable source.
pub type SeededSource = RngSource<Pcg32>;

impl<R: Rng> RngSource<R> {
    #[inline]
    pub fn new(rng: R) -> Self {
        Self(rng)
    }

    #[inline]
    pub fn into_inner(self) -> R {
        self.0
    }
}

impl RngSource<Pcg32> {
    /// Reproducible source: the same seed yields the same waveforms.
    pub fn seeded(seed: u64) -> Self {
        Self(Pcg32::seed_from_u64(seed))
    }

    /// Source seeded from OS entropy.
    pub fn from_entropy() -> Self {
        Self(Pcg32::from_entropy())
    }
}

impl<R: Rng> PointSource for RngSource<R> {
    #[inline]
    fn index_up_to(&mut self, upper: usize) -> usize {
        self.0.gen_range(0..=upper)
    }

    #[inline]
    fn amplitude(&mut self) -> f32 {
        self.0.gen_range(-1.0..=1.0)
    }
}
