//! C ABI wrapper for a randwave instance.
//!
//! Mirrors the life cycle of a patcher object: create, (re)generate with float
//! arguments, perform one block at a time, free.
//!
//! ABI notes
//! - All functions are `extern "C"` and `#[no_mangle]`.
//! - Opaque handle type: `Randwave` (heap-allocated; free it with `randwave_free`).
//! - Every entry point accepts a null handle and does nothing (or returns 0 / an error code).
//!
//! Threading
//! - The object is NOT thread-safe; call all functions from the same thread.
//!   `randwave_generate` allocates, so hosts should call it outside the audio callback.

use std::mem;
use std::ptr;
use std::slice;

use randwave_engine::{FrequencyControl, GenerateError, Randwave as Instance, SeededSource};

/// Generate succeeded (fallback substitutions are logged, not reported).
pub const RANDWAVE_OK: i32 = 0;
/// Null handle.
pub const RANDWAVE_ERR_NULL: i32 = -1;
/// Buffer allocation failed; the previous wavetable is still playing.
pub const RANDWAVE_ERR_ALLOC: i32 = -2;
/// Any other generate failure; the previous wavetable is still playing.
pub const RANDWAVE_ERR_GENERATE: i32 = -3;

/// Opaque instance handed to C.
pub struct Randwave {
    inner: Instance<SeededSource>,
}

fn boxed(inner: Instance<SeededSource>) -> *mut Randwave {
    Box::into_raw(Box::new(Randwave { inner }))
}

// --- Creation / destruction -------------------------------------------------------

/// Create an instance seeded from OS entropy. No wavetable exists until the first
/// generate or perform.
#[no_mangle]
pub extern "C" fn randwave_new() -> *mut Randwave {
    boxed(Instance::new())
}

/// Create a reproducible instance.
#[no_mangle]
pub extern "C" fn randwave_new_seeded(seed: u64) -> *mut Randwave {
    boxed(Instance::with_seed(seed))
}

/// Release an instance and its wavetable.
///
/// # Safety
/// `x` must be null or a pointer from `randwave_new*` not yet freed.
#[no_mangle]
pub unsafe extern "C" fn randwave_free(x: *mut Randwave) {
    if !x.is_null() {
        drop(Box::from_raw(x));
    }
}

// --- Generation -------------------------------------------------------------------

/// Draw a new wavetable. Values are truncated; invalid ones fall back to 2048
/// samples and 4 interior points.
///
/// Returns `RANDWAVE_OK` or a negative `RANDWAVE_ERR_*` code. On error the previous
/// wavetable keeps playing.
///
/// # Safety
/// `x` must be null or a live handle.
#[no_mangle]
pub unsafe extern "C" fn randwave_generate(
    x: *mut Randwave,
    wavetable_size: f32,
    interior_points: f32,
) -> i32 {
    let Some(x) = x.as_mut() else {
        return RANDWAVE_ERR_NULL;
    };
    match x.inner.generate_raw(f64::from(wavetable_size), f64::from(interior_points)) {
        Ok(_) => RANDWAVE_OK,
        Err(GenerateError::Alloc { .. }) => RANDWAVE_ERR_ALLOC,
        Err(_) => RANDWAVE_ERR_GENERATE,
    }
}

// --- Rendering --------------------------------------------------------------------

/// Render `n` mono samples into `out`.
///
/// `freq_in` may be null; when non-null it must hold `n` samples and is read only
/// in frequency-multiplier mode. `freq_in` may equal or partly overlap `out`; the
/// input is then copied aside before it is overwritten. That copy lives on the
/// stack, except for blocks above 4096 samples where `out` starts after `freq_in`,
/// which allocate.
/// Returns the number of samples written (0 on a null handle or buffer).
///
/// # Safety
/// `x` must be null or a live handle; `out` must be null or valid for `n` writes;
/// `freq_in` must be null or valid for `n` reads.
#[no_mangle]
pub unsafe extern "C" fn randwave_perform(
    x: *mut Randwave,
    freq_in: *const f32,
    out: *mut f32,
    n: u32,
) -> u32 {
    let Some(x) = x.as_mut() else {
        return 0;
    };
    if out.is_null() || n == 0 {
        return 0;
    }
    let len = n as usize;

    // Hosts commonly reuse the input buffer for output; copy the control signal
    // out first when the two overlap. Stack chunks keep this allocation-free.
    if !freq_in.is_null() && overlaps(freq_in, out, len) {
        const CHUNK: usize = 4096;
        if len > CHUNK && freq_in < out.cast_const() {
            // Each chunk written would clobber input still to be read.
            let freq = slice::from_raw_parts(freq_in, len).to_vec();
            x.inner.render(Some(&freq), slice::from_raw_parts_mut(out, len));
            return n;
        }
        let mut freq = [0.0f32; CHUNK];
        let mut done = 0;
        while done < len {
            let m = (len - done).min(CHUNK);
            ptr::copy_nonoverlapping(freq_in.add(done), freq.as_mut_ptr(), m);
            let dst = slice::from_raw_parts_mut(out.add(done), m);
            // Step from the whole block so chunking is inaudible.
            x.inner.render_span(Some(&freq[..m]), dst, len);
            done += m;
        }
        return n;
    }

    let dst = slice::from_raw_parts_mut(out, len);
    let freq = (!freq_in.is_null()).then(|| slice::from_raw_parts(freq_in, len));
    x.inner.render(freq, dst);
    n
}

// --- Parameters -------------------------------------------------------------------

/// `true`: the frequency input scales the step per sample. `false` (default):
/// the input is ignored.
///
/// # Safety
/// `x` must be null or a live handle.
#[no_mangle]
pub unsafe extern "C" fn randwave_set_frequency_multiplier(x: *mut Randwave, enabled: bool) {
    let Some(x) = x.as_mut() else { return };
    x.inner.set_frequency_control(if enabled {
        FrequencyControl::Multiplier
    } else {
        FrequencyControl::Fixed
    });
}

/// Current read position in the wavetable.
///
/// # Safety
/// `x` must be null or a live handle.
#[no_mangle]
pub unsafe extern "C" fn randwave_phase(x: *const Randwave) -> u32 {
    x.as_ref().map_or(0, |x| saturating_u32(x.inner.phase()))
}

/// Samples in the current wavetable; 0 before the first generate.
///
/// # Safety
/// `x` must be null or a live handle.
#[no_mangle]
pub unsafe extern "C" fn randwave_wavetable_size(x: *const Randwave) -> u32 {
    x.as_ref().map_or(0, |x| saturating_u32(x.inner.wavetable_size()))
}

/// Whether the `len`-sample ranges at `a` and `b` share any byte.
fn overlaps(a: *const f32, b: *mut f32, len: usize) -> bool {
    let bytes = len.saturating_mul(mem::size_of::<f32>());
    let (a, b) = (a as usize, b as usize);
    a < b.saturating_add(bytes) && b < a.saturating_add(bytes)
}

fn saturating_u32(v: usize) -> u32 {
    u32::try_from(v).unwrap_or(u32::MAX)
}
