//! Monotone cubic (PCHIP) interpolation with anchor-point extensions.
//!
//! The field spectra handled here are smooth but sparsely sampled, and a
//! regular cubic spline overshoots between widely spaced control points. The
//! shape-preserving Hermite scheme of Fritsch & Carlson (*SIAM J. Numer.
//! Anal.* **17**, 238, 1980) avoids that: interpolated values never leave the
//! range of the bracketing control points.
//!
//! Queries outside the sampled band are only meaningful through explicit
//! extension, which comes in two forms:
//!
//! - [`with_zero_anchors`]: synthetic zero-field points at extreme low/high
//!   frequencies, forcing decay toward zero outside the physically sampled
//!   band. Used by the leave-one-out error estimator.
//! - [`with_boundary_ramp`]: a three-point geometric ramp beyond the highest
//!   sample that follows the last sample's trend before reaching the zero
//!   anchor. Used for the final dense reconstruction, where an abrupt zero
//!   anchor would ring through the time transform.

use thiserror::Error;

/// Zero-field anchor far below any physical frequency (Hz).
pub const LOW_ANCHOR_HZ: f64 = 1e-100;
/// Intermediate zero-field anchor, injected when the sampled band tops out
/// below it (Hz).
pub const MID_ANCHOR_HZ: f64 = 1e4;
/// Zero-field anchor far above any physical frequency (Hz).
pub const HIGH_ANCHOR_HZ: f64 = 1e100;

/// Decay factors of the three boundary-ramp points relative to the last
/// sampled field value.
const RAMP_FACTORS: [f64; 3] = [0.75, 0.5, 0.25];

/// Errors from interpolant construction.
#[derive(Debug, Error)]
pub enum InterpolationError {
    #[error("need at least 2 control points for interpolation, got {points}")]
    InsufficientData { points: usize },

    #[error("control frequencies must be strictly increasing (violated at index {index})")]
    NotIncreasing { index: usize },
}

/// A shape-preserving piecewise-cubic Hermite (PCHIP) interpolant for
/// real-valued data over strictly increasing abscissae.
#[derive(Debug, Clone)]
pub struct MonotoneInterpolant {
    /// Sorted x values (control frequencies).
    xs: Vec<f64>,
    /// Corresponding y values.
    ys: Vec<f64>,
    /// Fritsch–Carlson slopes at each control point.
    slopes: Vec<f64>,
}

impl MonotoneInterpolant {
    /// Construct a monotone interpolant from control points.
    ///
    /// # Arguments
    /// * `xs` - Strictly increasing x values.
    /// * `ys` - Corresponding y values (same length as `xs`).
    ///
    /// # Errors
    /// [`InterpolationError::InsufficientData`] for fewer than 2 points,
    /// [`InterpolationError::NotIncreasing`] if `xs` is not strictly
    /// increasing.
    pub fn new(xs: Vec<f64>, ys: Vec<f64>) -> Result<Self, InterpolationError> {
        assert_eq!(xs.len(), ys.len(), "xs and ys must have equal length");
        let n = xs.len();
        if n < 2 {
            return Err(InterpolationError::InsufficientData { points: n });
        }
        for i in 1..n {
            if xs[i] <= xs[i - 1] {
                return Err(InterpolationError::NotIncreasing { index: i });
            }
        }

        let slopes = fritsch_carlson_slopes(&xs, &ys);
        Ok(Self { xs, ys, slopes })
    }

    /// Evaluate the interpolant at a single x value.
    ///
    /// Queries outside `[xs[0], xs[n-1]]` evaluate the boundary cubic; with
    /// the anchor extensions of this module the control range spans the whole
    /// usable frequency axis, so this never happens in practice.
    pub fn evaluate(&self, x: f64) -> f64 {
        let n = self.xs.len();

        // Binary search for the enclosing interval
        let mut lo = 0;
        let mut hi = n - 1;
        while hi - lo > 1 {
            let mid = (lo + hi) / 2;
            if self.xs[mid] > x {
                hi = mid;
            } else {
                lo = mid;
            }
        }

        let h = self.xs[hi] - self.xs[lo];
        let t = (x - self.xs[lo]) / h;
        let t2 = t * t;
        let t3 = t2 * t;

        // Cubic Hermite basis
        let h00 = 2.0 * t3 - 3.0 * t2 + 1.0;
        let h10 = t3 - 2.0 * t2 + t;
        let h01 = -2.0 * t3 + 3.0 * t2;
        let h11 = t3 - t2;

        h00 * self.ys[lo]
            + h10 * h * self.slopes[lo]
            + h01 * self.ys[hi]
            + h11 * h * self.slopes[hi]
    }

    /// Evaluate the interpolant at many x values.
    pub fn evaluate_many(&self, xs: &[f64]) -> Vec<f64> {
        xs.iter().map(|&x| self.evaluate(x)).collect()
    }
}

/// Fritsch–Carlson slope estimates.
///
/// Interior slopes are a weighted harmonic mean of adjacent secants, zeroed
/// at local extrema; endpoint slopes use the one-sided three-point estimate,
/// clipped to preserve monotonicity near the boundary.
fn fritsch_carlson_slopes(xs: &[f64], ys: &[f64]) -> Vec<f64> {
    let n = xs.len();
    let h: Vec<f64> = (0..n - 1).map(|i| xs[i + 1] - xs[i]).collect();
    let d: Vec<f64> = (0..n - 1).map(|i| (ys[i + 1] - ys[i]) / h[i]).collect();

    if n == 2 {
        return vec![d[0], d[0]];
    }

    let mut m = vec![0.0; n];
    for i in 1..n - 1 {
        if d[i - 1] * d[i] <= 0.0 {
            // Local extremum or flat spot: flat tangent
            m[i] = 0.0;
        } else {
            let w1 = 2.0 * h[i] + h[i - 1];
            let w2 = h[i] + 2.0 * h[i - 1];
            m[i] = (w1 + w2) / (w1 / d[i - 1] + w2 / d[i]);
        }
    }
    m[0] = edge_slope(h[0], h[1], d[0], d[1]);
    m[n - 1] = edge_slope(h[n - 2], h[n - 3], d[n - 2], d[n - 3]);
    m
}

/// One-sided three-point endpoint slope with the standard monotonicity clips.
fn edge_slope(h0: f64, h1: f64, d0: f64, d1: f64) -> f64 {
    let m = ((2.0 * h0 + h1) * d0 - h0 * d1) / (h0 + h1);
    if m * d0 <= 0.0 {
        0.0
    } else if d0 * d1 < 0.0 && m.abs() > 3.0 * d0.abs() {
        3.0 * d0
    } else {
        m
    }
}

/// Extend control points with the zero-field anchors used by the error
/// estimator: one far below the band, one at [`MID_ANCHOR_HZ`] when the
/// sampled band tops out below it, and one far above.
///
/// `max_frequency` is the highest frequency of the *full* sample set, which
/// may differ from `freqs.last()` when a sample has been left out.
pub fn with_zero_anchors(
    freqs: &[f64],
    values: &[f64],
    max_frequency: f64,
) -> (Vec<f64>, Vec<f64>) {
    let mut xs = Vec::with_capacity(freqs.len() + 3);
    let mut ys = Vec::with_capacity(values.len() + 3);
    xs.push(LOW_ANCHOR_HZ);
    ys.push(0.0);
    xs.extend_from_slice(freqs);
    ys.extend_from_slice(values);
    if max_frequency < MID_ANCHOR_HZ {
        xs.push(MID_ANCHOR_HZ);
        ys.push(0.0);
    }
    xs.push(HIGH_ANCHOR_HZ);
    ys.push(0.0);
    (xs, ys)
}

/// Extend control points with the boundary ramp used for the final dense
/// reconstruction.
///
/// Three synthetic points continue past the highest sample at log-frequency
/// steps equal to the last inter-sample gap, carrying 0.75, 0.5, and 0.25 of
/// the last field value, before the high zero anchor. The imaginary part also
/// gets the low zero anchor (`low_anchor = true`); the real part does not,
/// since real-part decay toward zero frequency is not assumed.
///
/// # Errors
/// [`InterpolationError::InsufficientData`] if fewer than 2 control points
/// are supplied (the ramp step needs the last inter-sample gap).
pub fn with_boundary_ramp(
    freqs: &[f64],
    values: &[f64],
    low_anchor: bool,
) -> Result<(Vec<f64>, Vec<f64>), InterpolationError> {
    let n = freqs.len();
    if n < 2 {
        return Err(InterpolationError::InsufficientData { points: n });
    }

    let last_log = freqs[n - 1].log10();
    let step = last_log - freqs[n - 2].log10();
    let last_value = values[n - 1];

    let mut xs = Vec::with_capacity(n + 5);
    let mut ys = Vec::with_capacity(n + 5);
    if low_anchor {
        xs.push(LOW_ANCHOR_HZ);
        ys.push(0.0);
    }
    xs.extend_from_slice(freqs);
    ys.extend_from_slice(values);
    for (k, factor) in RAMP_FACTORS.iter().enumerate() {
        xs.push(10f64.powf(last_log + (k as f64 + 1.0) * step));
        ys.push(factor * last_value);
    }
    xs.push(HIGH_ANCHOR_HZ);
    ys.push(0.0);
    Ok((xs, ys))
}
