//! Math backend and small helpers shared by the interpolator and the player.
//!
//! Design goals:
//! - `no_std` ready (guarded by the crate feature `no-std`)
//! - Math backend selection that works in both `std` and `no_std` contexts
//! - Optional `fast-math` approximations for the reconstruction loop
//! - Integer-only phase helpers, so the render path never touches floats for indexing
//!
//! Features used by this file:
//! - `fast-math` : enables polynomial sine/cosine (faster, approx.)
//! - `simd`      : four-lane clipping in [`clip_in_place`]
//!
//! Conventions:
//! - Reconstruction math runs in `f64`; tables are stored as `f32`.
//! - All functions are `#[inline]` where useful to help the optimizer.

#![allow(clippy::excessive_precision)]

use cfg_if::cfg_if;

// ----------------------------- Math backend selection -----------------------------

cfg_if! {
    // micromath preferred if explicitly requested (works in no_std, f32 precision)
    if #[cfg(feature = "micromath")] {
        use micromath::F32Ext as _;
        #[inline] fn m_sin(x: f64) -> f64 { f64::from((x as f32).sin()) }
        #[inline] fn m_cos(x: f64) -> f64 { f64::from((x as f32).cos()) }
    // libm (C math) in no_std
    } else if #[cfg(feature = "no-std")] {
        #[inline] fn m_sin(x: f64) -> f64 { libm::sin(x) }
        #[inline] fn m_cos(x: f64) -> f64 { libm::cos(x) }
    // std backend
    } else {
        #[inline] fn m_sin(x: f64) -> f64 { x.sin() }
        #[inline] fn m_cos(x: f64) -> f64 { x.cos() }
    }
}

// --------------------------------- Constants -------------------------------------

pub const PI: f64 = core::f64::consts::PI;

/// 2π (one wavetable period in radians)
pub const TAU: f64 = 2.0 * PI;

/// Below this magnitude a kernel denominator is treated as a removable singularity.
pub const SINGULAR_EPS: f64 = 1.0e-9;

// --------------------------------- Utilities -------------------------------------

#[inline]
pub fn clamp(x: f32, lo: f32, hi: f32) -> f32 {
    if x < lo { lo } else if x > hi { hi } else { x }
}

/// `|x|` without relying on the std float methods.
#[inline]
pub fn abs(x: f64) -> f64 {
    if x < 0.0 { -x } else { x }
}

/// Narrow a reconstructed sum to a table sample, unclipped.
///
/// NaN (an undefined 0/0 sum) becomes silence; infinities survive for [`clip_in_place`].
#[inline]
pub fn to_sample(x: f64) -> f32 {
    if x.is_nan() { 0.0 } else { x as f32 }
}

/// Hard-clip a whole table into [-1, 1] in place. NaN must already be scrubbed.
#[inline]
pub fn clip_in_place(buf: &mut [f32]) {
    cfg_if! {
        if #[cfg(feature = "simd")] {
            use wide::f32x4;
            let lo = f32x4::splat(-1.0);
            let hi = f32x4::splat(1.0);
            let mut chunks = buf.chunks_exact_mut(4);
            for c in &mut chunks {
                let v = f32x4::from([c[0], c[1], c[2], c[3]]).max(lo).min(hi);
                c.copy_from_slice(&v.to_array());
            }
            for x in chunks.into_remainder() {
                *x = clamp(*x, -1.0, 1.0);
            }
        } else {
            for x in buf.iter_mut() {
                *x = clamp(*x, -1.0, 1.0);
            }
        }
    }
}

/// `ceil(num / den)` for positive integers. `den == 0` yields 0.
#[inline]
pub fn ceil_div(num: usize, den: usize) -> usize {
    if den == 0 { 0 } else { num.div_ceil(den) }
}

/// Floor-modulo wrap of a signed read position into `[0, len)`.
///
/// Same result as repeatedly adding/subtracting `len` until in range. `len == 0` yields 0.
#[inline]
pub fn wrap_index(pos: i64, len: usize) -> usize {
    let Ok(n) = i64::try_from(len) else {
        // Tables this large cannot exist; anything non-negative is already in range.
        return usize::try_from(pos).unwrap_or(0);
    };
    if n == 0 {
        return 0;
    }
    // rem_euclid of a positive modulus is always in [0, n), which fits usize.
    pos.rem_euclid(n) as usize
}

/// Natural log (exact backend even with `fast-math`; only used once per table).
#[inline]
pub fn ln(x: f64) -> f64 {
    cfg_if! {
        if #[cfg(feature = "micromath")] {
            f64::from((x as f32).ln())
        } else if #[cfg(feature = "no-std")] {
            libm::log(x)
        } else {
            x.ln()
        }
    }
}

/// `e^x` (exact backend even with `fast-math`).
#[inline]
pub fn exp(x: f64) -> f64 {
    cfg_if! {
        if #[cfg(feature = "micromath")] {
            f64::from((x as f32).exp())
        } else if #[cfg(feature = "no-std")] {
            libm::exp(x)
        } else {
            x.exp()
        }
    }
}

// --------------------------------- Trig -------------------------------------------

/// Fast sine: reduce into [-π, π], fold to [-π/2, π/2], 7th-order odd polynomial.
/// Max abs error ~2e-4; used only with `fast-math`.
#[inline]
pub fn fast_sin(x: f64) -> f64 {
    // Integer range reduction keeps this usable without `f64::round` in no_std.
    let k = (x / TAU + if x >= 0.0 { 0.5 } else { -0.5 }) as i64;
    let mut xr = x - (k as f64) * TAU;
    // Fold into [-π/2, π/2] where the polynomial is accurate.
    if xr > 0.5 * PI {
        xr = PI - xr;
    } else if xr < -0.5 * PI {
        xr = -PI - xr;
    }

    let x2 = xr * xr;
    let x3 = x2 * xr;
    xr + (-1.0 / 6.0) * x3 + (1.0 / 120.0) * x3 * x2 + (-1.0 / 5040.0) * x3 * x2 * x2
}

#[inline]
pub fn fast_cos(x: f64) -> f64 {
    // cos(x) = sin(x + π/2)
    fast_sin(x + 0.5 * PI)
}

/// Sine used by the kernels (exact backend unless `fast-math`).
#[inline]
pub fn sin(x: f64) -> f64 {
    cfg_if! {
        if #[cfg(feature = "fast-math")] {
            fast_sin(x)
        } else {
            m_sin(x)
        }
    }
}

/// Cosine used by the kernels (exact backend unless `fast-math`).
#[inline]
pub fn cos(x: f64) -> f64 {
    cfg_if! {
        if #[cfg(feature = "fast-math")] {
            fast_cos(x)
        } else {
            m_cos(x)
        }
    }
}

// --------------------------------- Tests (std only) ------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clamp_holds_both_rails() {
        assert_eq!(clamp(2.0, -1.0, 1.0), 1.0);
        assert_eq!(clamp(-3.0, -1.0, 1.0), -1.0);
        assert_eq!(clamp(0.25, -1.0, 1.0), 0.25);
    }

    #[test]
    fn to_sample_scrubs_nan_only() {
        assert_eq!(to_sample(f64::NAN), 0.0);
        assert_eq!(to_sample(f64::INFINITY), f32::INFINITY);
        assert_eq!(to_sample(-0.5), -0.5);
        assert_eq!(to_sample(3.0), 3.0);
    }

    #[test]
    fn clip_in_place_is_bounded() {
        let mut buf = [-4.0, -1.0, -0.3, 0.0, 0.7, 1.0, 9.0, f32::INFINITY, f32::NEG_INFINITY];
        clip_in_place(&mut buf);
        assert_eq!(buf, [-1.0, -1.0, -0.3, 0.0, 0.7, 1.0, 1.0, 1.0, -1.0]);
    }

    #[test]
    fn wrap_index_matches_repeated_subtraction() {
        for len in [1usize, 3, 16, 2048] {
            let n = len as i64;
            for pos in -(3 * n + 5)..(3 * n + 5) {
                let mut p = pos;
                while p >= n { p -= n; }
                while p < 0 { p += n; }
                assert_eq!(wrap_index(pos, len), p as usize, "pos={pos} len={len}");
            }
        }
        assert_eq!(wrap_index(12, 0), 0);
    }

    #[test]
    fn ceil_div_rounds_up() {
        assert_eq!(ceil_div(2048, 64), 32);
        assert_eq!(ceil_div(16, 4), 4);
        assert_eq!(ceil_div(17, 4), 5);
        assert_eq!(ceil_div(3, 64), 1);
        assert_eq!(ceil_div(5, 0), 0);
    }

    #[test]
    fn fast_sin_is_close() {
        let mut x = -10.0;
        while x < 10.0 {
            assert!((fast_sin(x) - x.sin()).abs() < 1e-3, "x={x}");
            x += 0.01;
        }
    }
}
