//! Leave-one-out error estimation.
//!
//! A sample is considered stable when its neighbours alone predict its
//! imaginary field value. For each sample in turn, the estimator rebuilds the
//! monotone interpolant without it (anchors included), evaluates at the
//! omitted frequency, and scores the miss relative to the largest field
//! magnitude in the set:
//!
//! $$ \mathrm{err}_i = \frac{|\Im(E_i^{\mathrm{int}} - E_i)|}{\max_j |E_j|} $$
//!
//! The anchors never enter the scoring; only real samples get an error entry.

use ndarray::Array1;
use num_complex::Complex64;

use crate::adaptive::SelectionError;
use crate::interpolate::{with_zero_anchors, MonotoneInterpolant};
use crate::types::SampleSet;

/// Per-sample leave-one-out estimates and errors for the current sample set.
#[derive(Debug, Clone)]
pub struct ErrorEstimate {
    /// Leave-one-out field estimate per sample. Only the imaginary part is
    /// interpolated; the real part is zero.
    pub loo_estimates: Array1<Complex64>,
    /// Relative error per sample.
    pub errors: Array1<f64>,
    /// Full (non-leave-one-out) interpolation of the imaginary field over
    /// the target grid, when one was supplied. Diagnostics only; it has no
    /// bearing on the errors or the refinement decision.
    pub dense_estimate: Option<Array1<Complex64>>,
}

/// Compute leave-one-out estimates and relative errors for every sample.
///
/// # Errors
/// - [`SelectionError::Interpolation`] if the set holds fewer than 2 samples.
/// - [`SelectionError::DegenerateField`] if every field value is zero, which
///   leaves the relative error undefined.
pub fn leave_one_out(
    samples: &SampleSet,
    target_grid: Option<&[f64]>,
) -> Result<ErrorEstimate, SelectionError> {
    let freqs = samples.frequencies();
    let fields = samples.fields();
    let n = freqs.len();
    if n < 2 {
        return Err(crate::interpolate::InterpolationError::InsufficientData { points: n }.into());
    }

    let max_magnitude = fields.iter().map(|f| f.norm()).fold(0.0, f64::max);
    if max_magnitude == 0.0 {
        return Err(SelectionError::DegenerateField);
    }

    // Mid-anchor decision uses the full set's maximum, also for the
    // leave-one-out passes where the top sample may be the omitted one.
    let max_frequency = samples
        .max_frequency()
        .expect("sample count was checked above");

    let mut loo_estimates = Array1::from_elem(n, Complex64::new(0.0, 0.0));
    let mut errors = Array1::zeros(n);
    let mut held_freqs = Vec::with_capacity(n - 1);
    let mut held_imag = Vec::with_capacity(n - 1);

    for i in 0..n {
        held_freqs.clear();
        held_imag.clear();
        for (j, sample) in samples.iter().enumerate() {
            if j != i {
                held_freqs.push(sample.frequency);
                held_imag.push(sample.field.im);
            }
        }
        let (xs, ys) = with_zero_anchors(&held_freqs, &held_imag, max_frequency);
        let estimate = MonotoneInterpolant::new(xs, ys)?.evaluate(freqs[i]);

        loo_estimates[i] = Complex64::new(0.0, estimate);
        errors[i] = (estimate - fields[i].im).abs() / max_magnitude;
    }

    let dense_estimate = match target_grid {
        Some(grid) => {
            let imag: Vec<f64> = fields.iter().map(|f| f.im).collect();
            let (xs, ys) = with_zero_anchors(freqs, &imag, max_frequency);
            let interp = MonotoneInterpolant::new(xs, ys)?;
            Some(Array1::from_iter(
                grid.iter().map(|&f| Complex64::new(0.0, interp.evaluate(f))),
            ))
        }
        None => None,
    };

    Ok(ErrorEstimate {
        loo_estimates,
        errors,
        dense_estimate,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn imag_samples(freqs: &[f64], imag: &[f64]) -> SampleSet {
        let fields: Vec<Complex64> = imag.iter().map(|&v| Complex64::new(0.0, v)).collect();
        let mut set = SampleSet::new();
        set.merge(freqs, &fields);
        set
    }

    #[test]
    fn test_local_peak_is_unpredictable() {
        // The middle sample is a local peak; its neighbours (plus anchors)
        // cannot reproduce it, so its error must be large.
        let samples = imag_samples(&[1e-2, 1e-1, 1e0], &[0.1, 0.4, 0.05]);
        let estimate = leave_one_out(&samples, None).unwrap();

        // Normalisation is max |field| = 0.4.
        assert!(
            estimate.errors[1] > 0.05,
            "peak error {} should exceed tolerance",
            estimate.errors[1]
        );
        // The estimate itself sits between the neighbours, far from 0.4.
        assert!(estimate.loo_estimates[1].im < 0.2);
    }

    #[test]
    fn test_degenerate_field() {
        let samples = imag_samples(&[1e-2, 1e-1, 1e0], &[0.0, 0.0, 0.0]);
        let err = leave_one_out(&samples, None).unwrap_err();
        assert!(matches!(err, SelectionError::DegenerateField));
    }

    #[test]
    fn test_insufficient_samples() {
        let samples = imag_samples(&[1e-2], &[0.1]);
        let err = leave_one_out(&samples, None).unwrap_err();
        assert!(matches!(err, SelectionError::Interpolation(_)));
    }

    #[test]
    fn test_estimator_is_pure() {
        let samples = imag_samples(&[1e-2, 1e-1, 1e0], &[0.1, 0.4, 0.05]);
        let a = leave_one_out(&samples, None).unwrap();
        let b = leave_one_out(&samples, None).unwrap();
        assert_eq!(a.errors, b.errors);
    }

    #[test]
    fn test_dense_estimate_matches_samples() {
        // The full interpolant passes through its own control points.
        let samples = imag_samples(&[1e-2, 1e-1, 1e0], &[0.1, 0.4, 0.05]);
        let grid = [1e-2, 1e-1, 1e0];
        let estimate = leave_one_out(&samples, Some(&grid)).unwrap();
        let dense = estimate.dense_estimate.unwrap();
        for (value, expected) in dense.iter().zip([0.1, 0.4, 0.05]) {
            assert!((value.im - expected).abs() < 1e-12);
        }
    }
}
