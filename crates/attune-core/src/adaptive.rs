//! The adaptive selection loop and its collaborator traits.
//!
//! One iteration is: evaluate the forward model at the pending frequencies,
//! merge into the sample set, score every sample with the leave-one-out
//! estimator, ask the refinement rule for the next frequency, reconstruct the
//! spectrum on the target grid, and transform it to the time domain. The loop
//! repeats until the refiner proposes nothing, then returns the final
//! time-domain signal together with the selected frequencies and fields.
//!
//! The loop is strictly sequential: each proposal depends on the error vector
//! of the previous merge, so iterations cannot be reordered or parallelised
//! without changing the produced frequency sequence.

use log::{debug, info};
use num_complex::Complex64;

use crate::estimator::leave_one_out;
use crate::interpolate::{with_boundary_ramp, InterpolationError, MonotoneInterpolant};
use crate::refine::{self, Proposal};
use crate::seed::seed_frequencies;
use crate::types::{InitialSpec, IterationRecord, SampleSet, SelectionParams, SelectionResult};
use thiserror::Error;

/// Error type collaborator implementations may return.
pub type CollaboratorError = Box<dyn std::error::Error + Send + Sync>;

/// Errors that can abort an adaptive-selection run.
///
/// None of these are retried internally; a failure means the caller must
/// adjust the tolerance, seed, or model and re-invoke.
#[derive(Debug, Error)]
pub enum SelectionError {
    #[error(transparent)]
    Interpolation(#[from] InterpolationError),

    #[error("maximum field magnitude is zero across the current samples; relative error is undefined")]
    DegenerateField,

    #[error("not converged after {max_iterations} iterations (worst error {worst_error:.2e})")]
    NonConvergence {
        max_iterations: usize,
        worst_error: f64,
    },

    #[error("peak seeding found no local maxima in the reference spectrum")]
    NoPeaks,

    #[error("forward model error: {0}")]
    Forward(#[source] CollaboratorError),

    #[error("time transform error: {0}")]
    Transform(#[source] CollaboratorError),
}

/// The expensive frequency-domain forward solver, treated as opaque.
///
/// Implementations must be deterministic: identical inputs yield identical
/// outputs, which is what makes last-write-wins merging of duplicate
/// frequencies sound.
pub trait ForwardModel {
    /// Evaluate the complex field at the given frequencies (Hz). The output
    /// has the same length and order as the input.
    fn evaluate(&self, frequencies: &[f64]) -> Result<Vec<Complex64>, CollaboratorError>;

    /// Human-readable name of the model.
    fn name(&self) -> &str {
        "forward model"
    }
}

/// The frequency-to-time transform, treated as opaque.
pub trait TimeTransform {
    /// Transform a spectrum given on `freq_grid` to the time-domain response
    /// at `time_grid` for the requested signal kind.
    fn to_time(
        &self,
        freq_grid: &[f64],
        spectrum: &[Complex64],
        time_grid: &[f64],
        signal: crate::types::SignalKind,
    ) -> Result<Vec<f64>, CollaboratorError>;
}

/// Interpolate the sample set onto the target grid, real and imaginary parts
/// separately.
///
/// The imaginary part carries the low zero anchor plus the boundary ramp;
/// the real part gets the ramp only, since real-part decay toward zero
/// frequency is not assumed.
pub fn reconstruct_spectrum(
    samples: &SampleSet,
    target_grid: &[f64],
) -> Result<Vec<Complex64>, InterpolationError> {
    let freqs = samples.frequencies();
    let imag: Vec<f64> = samples.fields().iter().map(|f| f.im).collect();
    let real: Vec<f64> = samples.fields().iter().map(|f| f.re).collect();

    let (xs, ys) = with_boundary_ramp(freqs, &imag, true)?;
    let imag_interp = MonotoneInterpolant::new(xs, ys)?;
    let (xs, ys) = with_boundary_ramp(freqs, &real, false)?;
    let real_interp = MonotoneInterpolant::new(xs, ys)?;

    Ok(target_grid
        .iter()
        .map(|&f| Complex64::new(real_interp.evaluate(f), imag_interp.evaluate(f)))
        .collect())
}

/// Drives repeated evaluation–interpolation–transform cycles until every
/// sample is stable within tolerance.
pub struct AdaptiveLoop<'a> {
    model: &'a dyn ForwardModel,
    transform: &'a dyn TimeTransform,
    /// Times (s) at which the final signal is required.
    time_grid: &'a [f64],
    /// The transform's required frequency grid (Hz), distinct from the
    /// adaptively chosen samples.
    target_grid: &'a [f64],
    params: SelectionParams,
}

impl<'a> AdaptiveLoop<'a> {
    pub fn new(
        model: &'a dyn ForwardModel,
        transform: &'a dyn TimeTransform,
        time_grid: &'a [f64],
        target_grid: &'a [f64],
        params: SelectionParams,
    ) -> Self {
        Self {
            model,
            transform,
            time_grid,
            target_grid,
            params,
        }
    }

    /// Run to convergence, discarding per-iteration records.
    pub fn run(&self, initial: &InitialSpec) -> Result<SelectionResult, SelectionError> {
        self.run_observed(initial, |_| {})
    }

    /// Run to convergence, handing every [`IterationRecord`] to `observe` as
    /// it is produced. This is the seam a live display hangs off; the library
    /// itself only logs.
    pub fn run_observed(
        &self,
        initial: &InitialSpec,
        mut observe: impl FnMut(&IterationRecord),
    ) -> Result<SelectionResult, SelectionError> {
        let mut pending = seed_frequencies(initial, self.model, self.target_grid)?;
        // The leave-one-out test needs at least two samples; fewer seeds can
        // never produce a valid selection, so fail before evaluating anything.
        if pending.len() < 2 {
            return Err(InterpolationError::InsufficientData {
                points: pending.len(),
            }
            .into());
        }
        info!(
            "seeding {} with {} frequencies, rtol={:.1e}",
            self.model.name(),
            pending.len(),
            self.params.rtol
        );

        let mut samples = SampleSet::new();
        let mut time_signal = Vec::new();
        let mut iteration = 0;
        let mut worst_error = f64::INFINITY;

        while !pending.is_empty() {
            if iteration >= self.params.max_iterations {
                return Err(SelectionError::NonConvergence {
                    max_iterations: self.params.max_iterations,
                    worst_error,
                });
            }
            iteration += 1;

            let fields = self
                .model
                .evaluate(&pending)
                .map_err(SelectionError::Forward)?;
            samples.merge(&pending, &fields);

            let estimate = leave_one_out(&samples, Some(self.target_grid))?;
            worst_error = estimate.errors.iter().copied().fold(0.0, f64::max);
            let proposal = refine::propose(samples.frequencies(), &estimate.errors, self.params.rtol);

            let spectrum = reconstruct_spectrum(&samples, self.target_grid)?;
            time_signal = self
                .transform
                .to_time(self.target_grid, &spectrum, self.time_grid, self.params.signal)
                .map_err(SelectionError::Transform)?;

            match proposal {
                Proposal::Refine { frequency, index } => debug!(
                    "iteration {iteration}: {} samples, worst error {worst_error:.2e}, \
                     sample {index} unstable, proposing {frequency:.4e} Hz",
                    samples.len(),
                ),
                Proposal::Converged => debug!(
                    "iteration {iteration}: {} samples, worst error {worst_error:.2e}, converged",
                    samples.len(),
                ),
            }

            let failing = refine::failing_indices(&estimate.errors, self.params.rtol);
            let record = IterationRecord {
                iteration,
                frequencies: samples.frequencies().to_vec(),
                loo_estimates: estimate.loo_estimates,
                errors: estimate.errors,
                failing,
                proposed: proposal.frequency(),
                dense_estimate: estimate
                    .dense_estimate
                    .expect("target grid was supplied to the estimator"),
                time_signal: time_signal.clone(),
            };
            observe(&record);

            pending = proposal.frequency().into_iter().collect();
        }

        info!(
            "converged after {iteration} iterations with {} frequencies",
            samples.len()
        );
        Ok(SelectionResult {
            time_signal,
            frequencies: samples.frequencies().to_vec(),
            fields: samples.fields().to_vec(),
            iterations: iteration,
        })
    }
}

/// Select the smallest stable frequency set for `model` and return the
/// time-domain signal it implies.
///
/// This is the one-call entry point over [`AdaptiveLoop`]; see the module
/// documentation for the iteration semantics.
pub fn adaptive_select(
    model: &dyn ForwardModel,
    transform: &dyn TimeTransform,
    time_grid: &[f64],
    target_grid: &[f64],
    initial: &InitialSpec,
    params: SelectionParams,
) -> Result<SelectionResult, SelectionError> {
    AdaptiveLoop::new(model, transform, time_grid, target_grid, params).run(initial)
}
