//! Core types shared across the attune framework.
//!
//! This module defines the fundamental data structures used throughout the
//! selection pipeline: frequency samples, run parameters, per-iteration
//! records, and result containers.

use ndarray::Array1;
use num_complex::Complex64;
use serde::{Deserialize, Serialize};

/// A single frequency sample: a frequency in Hz paired with the complex
/// field the forward model returned there.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct FrequencySample {
    /// Frequency (Hz). Always positive.
    pub frequency: f64,
    /// Complex field value at this frequency.
    pub field: Complex64,
}

/// The growing set of evaluated frequency samples.
///
/// Frequencies are kept strictly increasing and unique. Merging a frequency
/// that is already present overwrites the stored field (the forward model is
/// deterministic, so the values are identical anyway). The set only ever
/// grows; it is owned exclusively by the adaptive loop for one run.
#[derive(Debug, Clone, Default)]
pub struct SampleSet {
    frequencies: Vec<f64>,
    fields: Vec<Complex64>,
}

impl SampleSet {
    /// Create an empty sample set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of samples.
    pub fn len(&self) -> usize {
        self.frequencies.len()
    }

    /// True if no samples have been merged yet.
    pub fn is_empty(&self) -> bool {
        self.frequencies.is_empty()
    }

    /// Sorted, unique frequencies (Hz).
    pub fn frequencies(&self) -> &[f64] {
        &self.frequencies
    }

    /// Field values aligned with [`Self::frequencies`].
    pub fn fields(&self) -> &[Complex64] {
        &self.fields
    }

    /// Highest frequency in the set, if any.
    pub fn max_frequency(&self) -> Option<f64> {
        self.frequencies.last().copied()
    }

    /// Merge newly evaluated (frequency, field) pairs, preserving strict
    /// ascending order. A duplicate frequency keeps the last-inserted value.
    pub fn merge(&mut self, frequencies: &[f64], fields: &[Complex64]) {
        assert_eq!(
            frequencies.len(),
            fields.len(),
            "frequencies and fields must have equal length"
        );
        for (&f, &v) in frequencies.iter().zip(fields.iter()) {
            match self
                .frequencies
                .binary_search_by(|probe| probe.partial_cmp(&f).expect("frequency is NaN"))
            {
                Ok(i) => self.fields[i] = v,
                Err(i) => {
                    self.frequencies.insert(i, f);
                    self.fields.insert(i, v);
                }
            }
        }
    }

    /// Iterate over the samples in ascending frequency order.
    pub fn iter(&self) -> impl Iterator<Item = FrequencySample> + '_ {
        self.frequencies
            .iter()
            .zip(self.fields.iter())
            .map(|(&frequency, &field)| FrequencySample { frequency, field })
    }
}

/// Source-signal kind of the requested time-domain response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SignalKind {
    /// Switch-off (shut-down step) response.
    SwitchOff,
    /// Impulse response.
    Impulse,
    /// Switch-on (step) response.
    SwitchOn,
}

/// Fourier-method selection for the frequency-to-time transform, resolved
/// once at configuration time rather than re-detected per call.
/// The digital-linear-filter variant is listed first so that untagged
/// deserialisation picks it whenever a `filter` name is present.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FourierMethod {
    /// Sine/cosine digital linear filter.
    ///
    /// `pts_per_dec` follows the filter convention: 0 for the standard DLF,
    /// negative for lagged convolution, positive for the splined variant.
    DigitalLinearFilter { filter: String, pts_per_dec: i64 },
    /// FFTLog with the given number of points per decade.
    FftLog { pts_per_dec: usize },
}

impl Default for FourierMethod {
    fn default() -> Self {
        Self::DigitalLinearFilter {
            filter: "key_201_CosSin_2012".into(),
            pts_per_dec: -1,
        }
    }
}

impl std::fmt::Display for FourierMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DigitalLinearFilter {
                filter,
                pts_per_dec,
            } => write!(f, "DLF {filter} (pts_per_dec {pts_per_dec})"),
            Self::FftLog { pts_per_dec } => write!(f, "FFTLog (pts_per_dec {pts_per_dec})"),
        }
    }
}

/// How the adaptive loop seeds its first frequencies.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum InitialSpec {
    /// Log-spaced seeds between `10^min_log10` and `10^max_log10` Hz.
    LogRange {
        min_log10: f64,
        max_log10: f64,
        count: usize,
    },
    /// Explicit seed frequencies (Hz). Sorted and deduplicated before use.
    Explicit(Vec<f64>),
    /// Seed from the `n` most significant peaks of |Im| of a reference
    /// spectrum evaluated on the target grid, bracketed with log-midpoints
    /// and one left margin.
    Peaks(usize),
}

/// Parameters controlling one adaptive-selection run. Immutable for the run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SelectionParams {
    /// Relative tolerance on the leave-one-out error of the imaginary field,
    /// normalised by the maximum field magnitude over the current samples.
    pub rtol: f64,
    /// Hard cap on iterations; exceeding it aborts with a
    /// non-convergence error rather than looping indefinitely.
    pub max_iterations: usize,
    /// Requested time-domain signal kind.
    pub signal: SignalKind,
}

impl Default for SelectionParams {
    fn default() -> Self {
        Self {
            rtol: 0.01,
            max_iterations: 200,
            signal: SignalKind::Impulse,
        }
    }
}

/// Everything one iteration of the adaptive loop produced, for observation
/// (diagnostics, live display). Recomputed each iteration, never persisted.
#[derive(Debug, Clone)]
pub struct IterationRecord {
    /// 1-based iteration counter.
    pub iteration: usize,
    /// Frequencies in the sample set after this iteration's merge.
    pub frequencies: Vec<f64>,
    /// Leave-one-out field estimate per sample (imaginary part only).
    pub loo_estimates: Array1<Complex64>,
    /// Relative error per sample.
    pub errors: Array1<f64>,
    /// Indices of samples whose error exceeds the tolerance, ascending.
    pub failing: Vec<usize>,
    /// The single frequency proposed for the next iteration, if any.
    pub proposed: Option<f64>,
    /// Full interpolation of the imaginary field over the target grid.
    pub dense_estimate: Array1<Complex64>,
    /// Current time-domain estimate on the caller's time grid.
    pub time_signal: Vec<f64>,
}

/// Output of a converged adaptive-selection run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SelectionResult {
    /// Time-domain signal on the caller's time grid.
    pub time_signal: Vec<f64>,
    /// Final, sorted frequency set (Hz).
    pub frequencies: Vec<f64>,
    /// Field values aligned with `frequencies`.
    pub fields: Vec<Complex64>,
    /// Number of iterations the loop ran.
    pub iterations: usize,
}
