//! Single-threaded randwave instance: point source, current wavetable and playback.
//!
//! `Randwave` starts `Uninitialized`. The first render generates a default table
//! (2048 samples, 4 interior points) and then plays it; call [`Randwave::prepare`]
//! beforehand to keep that allocation off the audio thread. For regenerating from a
//! control thread while audio runs elsewhere, see [`crate::handoff`].

use randwave_core::cardinal::Reconstruction;

use crate::error::GenerateResult;
use crate::graph::Generator;
use crate::params::{GenerateParams, ParamWarning};
use crate::playback::{FrequencyControl, PlaybackEngine};
use crate::source::{PointSource, RngSource, SeededSource};
use crate::store::WavetableStore;
use crate::wavetable::Wavetable;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum InstanceState {
    /// No wavetable yet.
    Uninitialized,
    /// A wavetable is installed and playable.
    Ready,
}

#[derive(Debug)]
pub struct Randwave<S = SeededSource> {
    source: S,
    mode: Reconstruction,
    store: WavetableStore,
    playback: PlaybackEngine,
}

impl Randwave<SeededSource> {
    /// Instance with an entropy-seeded PCG32 source.
    pub fn new() -> Self {
        Self::with_source(RngSource::from_entropy())
    }

    /// Reproducible instance: the same seed and the same generate calls give the
    /// same waveforms.
    pub fn with_seed(seed: u64) -> Self {
        Self::with_source(RngSource::seeded(seed))
    }
}

impl Default for Randwave<SeededSource> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: PointSource> Randwave<S> {
    pub fn with_source(source: S) -> Self {
        Self {
            source,
            mode: Reconstruction::default(),
            store: WavetableStore::new(),
            playback: PlaybackEngine::default(),
        }
    }

    pub fn state(&self) -> InstanceState {
        if self.store.is_empty() {
            InstanceState::Uninitialized
        } else {
            InstanceState::Ready
        }
    }

    /// Generate the default table now if none exists yet.
    pub fn prepare(&mut self) -> GenerateResult<()> {
        if self.store.is_empty() {
            self.generate(GenerateParams::default())?;
        }
        Ok(())
    }

    /// Replace the wavetable with a freshly drawn one. Phase is kept.
    ///
    /// On error the previous wavetable stays installed.
    pub fn generate(&mut self, params: GenerateParams) -> GenerateResult<()> {
        match Wavetable::generate(params, &mut self.source, self.mode) {
            Ok(table) => {
                self.store.replace(table);
                Ok(())
            }
            Err(e) => {
                log::error!("randwave: generate failed, keeping previous wavetable: {e}");
                Err(e)
            }
        }
    }

    /// [`generate`](Self::generate) from raw host values, substituting defaults
    /// for invalid ones. Returns the substitutions made.
    pub fn generate_raw(&mut self, size: f64, points: f64) -> GenerateResult<Vec<ParamWarning>> {
        let resolved = GenerateParams::resolve(size, points);
        self.generate(resolved.params)?;
        Ok(resolved.warnings)
    }

    /// Fill `out` with the next block. See [`PlaybackEngine::render`].
    ///
    /// If the lazy default generate fails, the block is silent and the instance
    /// stays `Uninitialized`.
    pub fn render(&mut self, frequency: Option<&[f32]>, out: &mut [f32]) {
        let block_len = out.len();
        self.render_span(frequency, out, block_len);
    }

    /// Render `out` as one piece of a `block_len`-sample block; see
    /// [`PlaybackEngine::render_span`].
    pub fn render_span(&mut self, frequency: Option<&[f32]>, out: &mut [f32], block_len: usize) {
        if self.store.is_empty() && self.prepare().is_err() {
            out.fill(0.0);
            return;
        }
        let table = self.store.current().map_or(&[][..], Wavetable::samples);
        self.playback.render_span(table, frequency, out, block_len);
    }

    pub fn set_frequency_control(&mut self, control: FrequencyControl) {
        self.playback.set_control(control);
    }

    pub fn frequency_control(&self) -> FrequencyControl {
        self.playback.control()
    }

    /// Reconstruction used by later generates; the current table is untouched.
    pub fn set_reconstruction(&mut self, mode: Reconstruction) {
        self.mode = mode;
    }

    pub fn reconstruction(&self) -> Reconstruction {
        self.mode
    }

    pub fn wavetable(&self) -> Option<&Wavetable> {
        self.store.current()
    }

    /// Samples in the current table, 0 before the first generate.
    pub fn wavetable_size(&self) -> usize {
        self.store.current().map_or(0, Wavetable::len)
    }

    #[inline]
    pub fn phase(&self) -> usize {
        self.playback.phase()
    }

    pub fn source_mut(&mut self) -> &mut S {
        &mut self.source
    }
}

impl<S: PointSource> Generator for Randwave<S> {
    #[inline]
    fn render(&mut self, input: Option<&[f32]>, out: &mut [f32]) {
        Randwave::render(self, input, out);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Source whose amplitudes fail the point-set check; used to force errors.
    struct Broken;

    impl PointSource for Broken {
        fn index_up_to(&mut self, upper: usize) -> usize {
            upper
        }
        fn amplitude(&mut self) -> f32 {
            f32::NAN
        }
    }

    #[test]
    fn first_render_generates_defaults() {
        let mut rw = Randwave::with_seed(1);
        assert_eq!(rw.state(), InstanceState::Uninitialized);
        assert_eq!(rw.wavetable_size(), 0);

        let mut out = [0.0; 64];
        rw.render(None, &mut out);
        assert_eq!(rw.state(), InstanceState::Ready);
        assert_eq!(rw.wavetable_size(), 2048);
        assert_eq!(rw.wavetable().map(|t| t.points().len()), Some(6));
        // 2048 / 64 = 32 per sample, one full period per block.
        assert_eq!(rw.phase(), 0);
        assert_eq!(rw.reconstruction(), Reconstruction::CardinalSum);
        assert_eq!(out[0], rw.wavetable().unwrap().samples()[0]);
    }

    #[test]
    fn regenerate_keeps_phase() {
        let mut rw = Randwave::with_seed(2);
        rw.prepare().unwrap();
        let mut out = [0.0; 48];
        rw.render(None, &mut out);
        let before = rw.phase();
        assert_ne!(before, 0);

        rw.generate(GenerateParams::new(4096, 8).unwrap()).unwrap();
        assert_eq!(rw.phase(), before);
        assert_eq!(rw.wavetable_size(), 4096);
    }

    #[test]
    fn raw_generate_reports_fallbacks() {
        let mut rw = Randwave::with_seed(3);
        let warnings = rw.generate_raw(-1.0, 4.0).unwrap();
        assert_eq!(warnings.len(), 1);
        assert_eq!(rw.wavetable_size(), 2048);
    }

    #[test]
    fn failed_lazy_generate_renders_silence() {
        let mut broken = Randwave::with_source(Broken);
        assert!(broken.generate(GenerateParams::default()).is_err());
        assert_eq!(broken.state(), InstanceState::Uninitialized);

        let mut out = [1.0; 8];
        broken.render(None, &mut out);
        assert_eq!(out, [0.0; 8]);
        assert_eq!(broken.state(), InstanceState::Uninitialized);
    }

    #[test]
    fn failure_after_success_leaves_table_in_place() {
        // Hand over a working source, then swap in one that always fails.
        let mut rw = Randwave::with_source(Switchable { broken: false, inner: RngSource::seeded(9) });
        rw.generate(GenerateParams::new(64, 4).unwrap()).unwrap();
        let before = rw.wavetable().cloned();

        rw.source_mut().broken = true;
        assert!(rw.generate(GenerateParams::new(512, 4).unwrap()).is_err());
        assert_eq!(rw.wavetable().cloned(), before);
        assert_eq!(rw.wavetable_size(), 64);
    }

    struct Switchable {
        broken: bool,
        inner: SeededSource,
    }

    impl PointSource for Switchable {
        fn index_up_to(&mut self, upper: usize) -> usize {
            self.inner.index_up_to(upper)
        }
        fn amplitude(&mut self) -> f32 {
            if self.broken { f32::NAN } else { self.inner.amplitude() }
        }
    }

    #[test]
    fn seeds_are_deterministic() {
        let mut a = Randwave::with_seed(77);
        let mut b = Randwave::with_seed(77);
        let params = GenerateParams::new(300, 6).unwrap();
        a.generate(params).unwrap();
        b.generate(params).unwrap();
        assert_eq!(a.wavetable(), b.wavetable());
    }

    #[test]
    fn reconstruction_applies_to_the_next_generate() {
        let mut rw = Randwave::with_seed(5);
        rw.generate(GenerateParams::new(64, 3).unwrap()).unwrap();
        let before = rw.wavetable().cloned();

        rw.set_reconstruction(Reconstruction::Nodal);
        assert_eq!(rw.reconstruction(), Reconstruction::Nodal);
        assert_eq!(rw.wavetable().cloned(), before);

        rw.generate(GenerateParams::new(64, 3).unwrap()).unwrap();
        let t = rw.wavetable().unwrap();
        for p in t.points().iter() {
            assert!((t.samples()[p.position] - p.amplitude).abs() < 1e-4);
        }
    }

    #[test]
    fn drives_through_the_generator_trait() {
        fn pull<G: Generator>(g: &mut G, out: &mut [f32]) {
            g.render(None, out);
        }
        let mut rw = Randwave::with_seed(6);
        rw.set_frequency_control(FrequencyControl::Multiplier);
        let mut out = [0.0; 16];
        pull(&mut rw, &mut out);
        assert_eq!(rw.frequency_control(), FrequencyControl::Multiplier);
        assert_eq!(rw.state(), InstanceState::Ready);
    }
}
