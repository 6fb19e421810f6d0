#![cfg_attr(not(feature = "std"), no_std)]
//! Randwave core: no_std-ready math for the stochastic wavetable synth.
//!
//! Features
//! - `std`      : (default) use the Rust standard library
//! - `no-std`   : build with `#![no_std]` and use `libm` for trig
//! - `micromath`: use `micromath` (f32 precision) for trig
//! - `fast-math`: polynomial trig in the interpolation kernels
//! - `simd`     : clip the reconstructed table four lanes at a time (wide)
//!
//! Modules
//! - [`dsp`]      : math backend, clipping, phase wrap helpers
//! - [`points`]   : control points and the ordered-set invariants
//! - [`cardinal`] : trigonometric cardinal kernel and wavetable reconstruction
//!
//! Design
//! - No heap allocations; callers own every buffer (tables, scratch weights)
//! - Pure functions over slices so the engine decides when memory moves

pub mod cardinal;
pub mod dsp;
pub mod points;

/// Commonly used types/functions for convenience:
pub mod prelude {
    pub use crate::cardinal::{cardinal, interpolate, InterpolateError, Reconstruction};
    pub use crate::dsp::{ceil_div, clip_in_place, to_sample, wrap_index, TAU};
    pub use crate::points::{check_point_set, ControlPoint, PointSetError};
}
