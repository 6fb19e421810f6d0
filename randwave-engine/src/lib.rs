//! Randwave engine: random control points, wavetables and playback.
//!
//! Crate layout:
//! - [`params`]    : generate parameters and the fallback policy for raw host values
//! - [`source`]    : `PointSource` trait and the PCG32-backed default
//! - [`generator`] : control-point drawing
//! - [`wavetable`] : point set + reconstructed samples, built as one value
//! - [`store`]     : owner of the current wavetable
//! - [`playback`]  : block renderer with wrapping integer phase
//! - [`synth`]     : `Randwave`, the single-threaded instance
//! - [`handoff`]   : control-thread regeneration for a voice on the audio thread
//! - [`graph`]     : `Generator` trait and the fixed-block `Engine<G>`
//!
//! Rendering never allocates, locks or logs. Generating allocates fallibly and
//! leaves the previous wavetable in place on any error.

pub mod error;
pub mod generator;
pub mod graph;
pub mod handoff;
pub mod params;
pub mod playback;
pub mod source;
pub mod store;
pub mod synth;
pub mod wavetable;

pub use error::{GenerateError, GenerateResult};
pub use generator::{generate_points, ControlPointSet};
pub use graph::{Engine, Generator, DEFAULT_BLOCK_SIZE};
pub use params::{GenerateParams, ParamError, ParamWarning, Resolved};
pub use playback::{FrequencyControl, PlaybackEngine};
pub use source::{PointSource, RngSource, SeededSource};
pub use store::WavetableStore;
pub use synth::{InstanceState, Randwave};
pub use wavetable::Wavetable;

pub use randwave_core::cardinal::Reconstruction;
pub use randwave_core::points::ControlPoint;
