//! Real-time wavetable playback.
//!
//! A plain integer phase walks the table: read `table[phase]`, then advance by the
//! step and wrap (floor modulo, so negative steps wrap upward). The step for a
//! block is `ceil(size / block_len)`, i.e. one period per host block.
//!
//! No allocation, no locks, no logging. Phase is re-wrapped on entry to every
//! render, so a table that shrank since the last block is never indexed out of range.

use randwave_core::dsp::{ceil_div, wrap_index};

/// What the per-sample frequency input does to the step.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum FrequencyControl {
    /// Ignore the input; always step by the block's base step.
    #[default]
    Fixed,
    /// Step by `round(base_step * input[i])`: 2.0 doubles the pitch, negative
    /// values play backwards, 0 holds the current sample.
    Multiplier,
}

#[derive(Copy, Clone, Debug, Default)]
pub struct PlaybackEngine {
    phase: usize,
    control: FrequencyControl,
}

impl PlaybackEngine {
    #[inline]
    pub fn new(control: FrequencyControl) -> Self {
        Self { phase: 0, control }
    }

    #[inline] pub fn phase(&self) -> usize { self.phase }
    #[inline] pub fn set_phase(&mut self, phase: usize) { self.phase = phase; }
    #[inline] pub fn control(&self) -> FrequencyControl { self.control }
    #[inline] pub fn set_control(&mut self, control: FrequencyControl) { self.control = control; }

    /// Base step for a block of `block_len` samples over a `size`-sample table.
    #[inline]
    pub fn base_step(size: usize, block_len: usize) -> usize {
        ceil_div(size, block_len)
    }

    /// Fill `out` from `table`, one sample per slot.
    ///
    /// `frequency` is only read in [`FrequencyControl::Multiplier`] mode; missing
    /// trailing values count as 1.0. An empty table renders silence.
    pub fn render(&mut self, table: &[f32], frequency: Option<&[f32]>, out: &mut [f32]) {
        let block_len = out.len();
        self.render_span(table, frequency, out, block_len);
    }

    /// Render `out` as one piece of a host block of `block_len` samples.
    ///
    /// The step comes from `block_len`, so consecutive spans covering a block play
    /// exactly what a single [`render`](Self::render) of the whole block would.
    pub fn render_span(
        &mut self,
        table: &[f32],
        frequency: Option<&[f32]>,
        out: &mut [f32],
        block_len: usize,
    ) {
        let size = table.len();
        if out.is_empty() {
            return;
        }
        if size == 0 {
            out.fill(0.0);
            return;
        }

        let base_step = Self::base_step(size, block_len.max(1));
        let mut phase = self.phase % size;

        match (self.control, frequency) {
            (FrequencyControl::Multiplier, Some(freq)) => {
                for (i, y) in out.iter_mut().enumerate() {
                    *y = table[phase];
                    let mult = freq.get(i).copied().unwrap_or(1.0);
                    phase = advance(phase, scaled_step(base_step, mult), size);
                }
            }
            _ => {
                let step = base_step % size;
                for y in out.iter_mut() {
                    *y = table[phase];
                    phase += step;
                    if phase >= size {
                        phase -= size;
                    }
                }
            }
        }

        self.phase = phase;
    }
}

/// `round(base * mult)`; float→int `as` saturates and maps NaN to 0.
#[inline]
fn scaled_step(base: usize, mult: f32) -> i64 {
    (base as f32 * mult).round() as i64
}

#[inline]
fn advance(phase: usize, step: i64, size: usize) -> usize {
    // Reduce the step first so the sum can't overflow; both terms are < size.
    let next = phase + wrap_index(step, size);
    if next >= size { next - size } else { next }
}
