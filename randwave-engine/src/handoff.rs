//! Regenerate on a control thread while the audio thread keeps playing.
//!
//! [`channel`] splits an instance in two. The [`Regenerator`] draws points and
//! builds whole [`Wavetable`]s (allocation, logging, all of it) on its own thread
//! and posts them over a bounded channel. The [`Voice`] lives on the audio thread:
//! at the start of each render it takes the newest posted table, swaps it in as a
//! unit and posts the retired one back so it is freed on the control side.
//!
//! The voice never blocks and never allocates.

use crossbeam_channel::{bounded, Receiver, Sender, TrySendError};
use randwave_core::cardinal::Reconstruction;

use crate::error::{GenerateError, GenerateResult};
use crate::generator::ControlPointSet;
use crate::graph::Generator;
use crate::params::{GenerateParams, ParamWarning};
use crate::playback::{FrequencyControl, PlaybackEngine};
use crate::source::PointSource;
use crate::store::WavetableStore;
use crate::wavetable::Wavetable;

/// Tables that may wait for the audio thread before `generate` reports a backlog.
pub const QUEUE_DEPTH: usize = 2;

/// Build the default table and return both halves.
///
/// The voice starts `Ready`, so the audio thread never runs the lazy generate.
pub fn channel<S: PointSource>(
    mut source: S,
    mode: Reconstruction,
) -> GenerateResult<(Regenerator<S>, Voice)> {
    let initial = Wavetable::generate(GenerateParams::default(), &mut source, mode)?;

    let (tx, rx) = bounded(QUEUE_DEPTH);
    // Room for every queued table plus the one being played.
    let (retired_tx, retired_rx) = bounded(QUEUE_DEPTH + 1);

    let last_points = initial.points().clone();
    let mut store = WavetableStore::new();
    store.replace(initial);

    Ok((
        Regenerator { source, mode, tx, retired_rx, last_points },
        Voice { store, playback: PlaybackEngine::default(), rx, retired_tx },
    ))
}

/// Control-thread half.
pub struct Regenerator<S> {
    source: S,
    mode: Reconstruction,
    tx: Sender<Wavetable>,
    retired_rx: Receiver<Wavetable>,
    last_points: ControlPointSet,
}

impl<S: PointSource> Regenerator<S> {
    /// Build a table and post it to the voice.
    ///
    /// Fails with [`GenerateError::Backlog`] (before doing any work) when the voice
    /// has not consumed earlier tables, and with [`GenerateError::Disconnected`]
    /// once the voice is dropped.
    pub fn generate(&mut self, params: GenerateParams) -> GenerateResult<()> {
        self.collect_retired();
        if self.tx.is_full() {
            return Err(GenerateError::Backlog { pending: self.tx.len() });
        }

        let table = Wavetable::generate(params, &mut self.source, self.mode).map_err(|e| {
            log::error!("randwave: generate failed, voice keeps its wavetable: {e}");
            e
        })?;

        let points = table.points().clone();
        match self.tx.try_send(table) {
            Ok(()) => {
                self.last_points = points;
                Ok(())
            }
            Err(TrySendError::Full(_)) => Err(GenerateError::Backlog { pending: self.tx.len() }),
            Err(TrySendError::Disconnected(_)) => Err(GenerateError::Disconnected),
        }
    }

    /// Lenient variant taking raw host values; see [`GenerateParams::resolve`].
    pub fn generate_raw(&mut self, size: f64, points: f64) -> GenerateResult<Vec<ParamWarning>> {
        let resolved = GenerateParams::resolve(size, points);
        self.generate(resolved.params)?;
        Ok(resolved.warnings)
    }

    /// Free tables the voice has retired. Returns how many were released.
    pub fn collect_retired(&mut self) -> usize {
        self.retired_rx.try_iter().count()
    }

    pub fn set_reconstruction(&mut self, mode: Reconstruction) {
        self.mode = mode;
    }

    /// Points of the most recently posted table.
    pub fn last_points(&self) -> &ControlPointSet {
        &self.last_points
    }

    /// Tables posted but not yet picked up.
    pub fn pending(&self) -> usize {
        self.tx.len()
    }
}

/// Audio-thread half.
pub struct Voice {
    store: WavetableStore,
    playback: PlaybackEngine,
    rx: Receiver<Wavetable>,
    retired_tx: Sender<Wavetable>,
}

impl Voice {
    /// Install any posted tables (the newest wins), then render.
    pub fn render(&mut self, frequency: Option<&[f32]>, out: &mut [f32]) {
        while let Ok(next) = self.rx.try_recv() {
            if let Some(old) = self.store.replace(next) {
                // A full or closed return path drops the table here instead.
                let _ = self.retired_tx.try_send(old);
            }
        }
        let table = self.store.current().map_or(&[][..], Wavetable::samples);
        self.playback.render(table, frequency, out);
    }

    #[inline]
    pub fn phase(&self) -> usize {
        self.playback.phase()
    }

    pub fn wavetable(&self) -> Option<&Wavetable> {
        self.store.current()
    }

    pub fn wavetable_size(&self) -> usize {
        self.store.current().map_or(0, Wavetable::len)
    }

    pub fn set_frequency_control(&mut self, control: FrequencyControl) {
        self.playback.set_control(control);
    }
}

impl Generator for Voice {
    #[inline]
    fn render(&mut self, input: Option<&[f32]>, out: &mut [f32]) {
        Voice::render(self, input, out);
    }
}
