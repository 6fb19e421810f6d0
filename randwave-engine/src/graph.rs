//! Realtime pull core.
//!
//! Wavetable playback is block-based: the step through the table depends on how
//! many samples are rendered at once. Audio callbacks, on the other hand, hand out
//! buffers of whatever size the backend picked. `Engine<G>` sits between the two:
//! it owns a fixed block buffer (allocated once, up front) and refills it from the
//! generator whenever it runs dry, so the generator always sees the same block size.

/// Default host block size, in samples.
pub const DEFAULT_BLOCK_SIZE: usize = 64;

/// Anything that renders a block of mono samples.
pub trait Generator {
    /// Fill `out`. `input` is an optional per-sample control signal of the same
    /// length (frequency multiplier for wavetable voices).
    fn render(&mut self, input: Option<&[f32]>, out: &mut [f32]);
}

impl<G: Generator + ?Sized> Generator for &mut G {
    #[inline]
    fn render(&mut self, input: Option<&[f32]>, out: &mut [f32]) {
        (**self).render(input, out);
    }
}

/// Fixed-block adapter over a [`Generator`].
pub struct Engine<G: Generator> {
    block: Vec<f32>,
    pos: usize,
    gen: G,
}

impl<G: Generator> Engine<G> {
    #[inline]
    pub fn new(gen: G) -> Self {
        Self::with_block_size(gen, DEFAULT_BLOCK_SIZE)
    }

    /// `block_size` is clamped to at least one sample.
    pub fn with_block_size(gen: G, block_size: usize) -> Self {
        let block = vec![0.0; block_size.max(1)];
        // Start drained so the first pull renders.
        let pos = block.len();
        Self { block, pos, gen }
    }

    /// Next mono sample.
    #[inline]
    pub fn next(&mut self) -> f32 {
        if self.pos == self.block.len() {
            self.gen.render(None, &mut self.block);
            self.pos = 0;
        }
        let y = self.block[self.pos];
        self.pos += 1;
        y
    }

    /// Fill `out` sample by sample, regardless of its length.
    pub fn fill(&mut self, out: &mut [f32]) {
        for y in out.iter_mut() {
            *y = self.next();
        }
    }

    #[inline] pub fn block_size(&self) -> usize { self.block.len() }

    /// Replace the inner generator; the partly consumed block is discarded.
    #[inline]
    pub fn swap_generator(&mut self, gen: G) {
        self.gen = gen;
        self.pos = self.block.len();
    }

    /// Inner generator, for live parameter changes.
    #[inline]
    pub fn generator_mut(&mut self) -> &mut G { &mut self.gen }
}
