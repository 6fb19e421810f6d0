//! Trigonometric cardinal basis and wavetable reconstruction.
//!
//! `cardinal(x, n)` is the periodic sinc-like kernel of trigonometric interpolation
//! through `n` equally spaced nodes (odd `n` uses `sin` in the denominator, even `n`
//! uses `tan`). Every zero of `sin(πx/2)` is a removable singularity with limit 1.
//!
//! Reconstruction (see [`Reconstruction`])
//! - `CardinalSum` : (default) `Σ a_k · cardinal(θ_i − θ_k, n)` evaluated directly on the
//!                   angle difference. Smooth everywhere inside the table; does not pass
//!                   through the points, and may step at the loop seam.
//! - `Nodal`       : barycentric trigonometric interpolant through the control points at
//!                   their real positions. Node angle `θ_k = 2π p_k / size`,
//!                   weights `w_k = 1 / Π_{j≠k} 2 sin((θ_k − θ_j) / 2)`, kernel `csc(d/2)`
//!                   (odd count) or `cot(d/2)` (even count). On a uniform grid each basis
//!                   function equals `cardinal(d / π, n)`. Exact at every control point,
//!                   but poorly conditioned for random node sets.
//!
//! Either way the table is hard-clipped to [-1, 1] afterwards. Cost is
//! `O(size × n)` plus `O(n²)` for the nodal weights, once per generate.

use thiserror::Error;

use crate::dsp::{abs, clip_in_place, cos, exp, ln, sin, to_sample, PI, SINGULAR_EPS, TAU};
use crate::points::ControlPoint;

/// How control points are expanded into a full table.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum Reconstruction {
    /// Plain sum of amplitude-scaled cardinal kernels.
    #[default]
    CardinalSum,
    /// Interpolant that passes through every control point. Clustered or
    /// wrap-adjacent nodes (the anchors sit one sample apart across the seam) can
    /// push it far outside [-1, 1] between nodes, so most tables clip hard.
    Nodal,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InterpolateError {
    #[error("no control points to interpolate")]
    Empty,

    #[error("weight scratch holds {got} values but {needed} points were given")]
    ScratchTooSmall { needed: usize, got: usize },

    #[error("point {index} at position {position} lies outside a {size}-sample table")]
    OutOfRange { index: usize, position: usize, size: usize },

    #[error("positions must strictly increase (point {index})")]
    Unordered { index: usize },
}

/// Trigonometric cardinal function for `n` nodes.
///
/// - `n == 0` → `1`
/// - odd `n`  → `sin(nπx/2) / (n sin(πx/2))`
/// - even `n` → `sin(nπx/2) / (n tan(πx/2))`
#[inline]
pub fn cardinal(x: f64, n: usize) -> f64 {
    if n == 0 {
        return 1.0;
    }
    let half = 0.5 * PI * x;
    let s = sin(half);
    if abs(s) < SINGULAR_EPS {
        return 1.0;
    }
    let nf = n as f64;
    let num = sin(nf * half);
    if n % 2 == 1 {
        num / (nf * s)
    } else {
        // 1/tan = cos/sin; stays finite where tan blows up.
        num * cos(half) / (nf * s)
    }
}

/// Reconstruct `out.len()` samples from `points`.
///
/// `weights` is caller-owned scratch with room for one value per point (only
/// `Nodal` writes to it). Points must be strictly increasing and inside the table.
pub fn interpolate(
    points: &[ControlPoint],
    mode: Reconstruction,
    weights: &mut [f64],
    out: &mut [f32],
) -> Result<(), InterpolateError> {
    if points.is_empty() {
        return Err(InterpolateError::Empty);
    }
    if weights.len() < points.len() {
        return Err(InterpolateError::ScratchTooSmall { needed: points.len(), got: weights.len() });
    }
    let size = out.len();
    for (index, p) in points.iter().enumerate() {
        if p.position >= size {
            return Err(InterpolateError::OutOfRange { index, position: p.position, size });
        }
        if index > 0 && p.position <= points[index - 1].position {
            return Err(InterpolateError::Unordered { index });
        }
    }

    match mode {
        Reconstruction::Nodal => {
            let weights = &mut weights[..points.len()];
            nodal_weights(points, size, weights);
            nodal_fill(points, weights, out);
        }
        Reconstruction::CardinalSum => cardinal_fill(points, out),
    }

    clip_in_place(out);
    Ok(())
}

/// Barycentric weights, scaled so the largest magnitude is 1.
///
/// Magnitudes are accumulated as logs: for a few thousand clustered nodes the raw
/// products leave the f64 range long before their ratios do. With sorted positions
/// less than one period apart, `sin(π(p_k − p_j)/size)` is negative exactly when
/// `j > k`, so the sign of weight `k` is `(-1)^(n-1-k)`.
fn nodal_weights(points: &[ControlPoint], size: usize, weights: &mut [f64]) {
    let half_step = PI / size as f64;
    let n = points.len();
    let mut min_log = f64::INFINITY;

    for (k, pk) in points.iter().enumerate() {
        let mut log_mag = 0.0;
        for (j, pj) in points.iter().enumerate() {
            if j != k {
                let factor = 2.0 * sin(half_step * (pk.position as f64 - pj.position as f64));
                log_mag += ln(abs(factor));
            }
        }
        weights[k] = log_mag;
        if log_mag < min_log {
            min_log = log_mag;
        }
    }

    for (k, w) in weights.iter_mut().enumerate() {
        let mag = exp(min_log - *w);
        *w = if (n - 1 - k) % 2 == 1 { -mag } else { mag };
    }
}

fn nodal_fill(points: &[ControlPoint], weights: &[f64], out: &mut [f32]) {
    let size = out.len();
    let half_step = PI / size as f64;
    let odd = points.len() % 2 == 1;
    let mut next = 0usize;

    for (i, y) in out.iter_mut().enumerate() {
        // Points are sorted, so the next node we can land on only moves forward.
        while next < points.len() && points[next].position < i {
            next += 1;
        }
        if next < points.len() && points[next].position == i {
            *y = points[next].amplitude;
            continue;
        }

        let mut num = 0.0;
        let mut den = 0.0;
        for (p, w) in points.iter().zip(weights) {
            let h = half_step * (i as f64 - p.position as f64);
            let s = sin(h);
            let kernel = if odd { w / s } else { w * cos(h) / s };
            num += kernel * f64::from(p.amplitude);
            den += kernel;
        }
        *y = to_sample(num / den);
    }
}

fn cardinal_fill(points: &[ControlPoint], out: &mut [f32]) {
    let size = out.len() as f64;
    let n = points.len();

    for (i, y) in out.iter_mut().enumerate() {
        let xi = (i as f64 / size) * TAU;
        let mut sum = 0.0;
        for p in points {
            let xk = (p.position as f64 / size) * TAU;
            sum += f64::from(p.amplitude) * cardinal(xi - xk, n);
        }
        *y = to_sample(sum);
    }
}
