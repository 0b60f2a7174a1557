//! Initial frequency selection.
//!
//! The adaptive loop needs at least two seed frequencies before the
//! leave-one-out test is meaningful. Seeds come from one of three sources
//! ([`InitialSpec`]): explicit log-range bounds, an explicit array, or a
//! peak-detection heuristic over a reference spectrum evaluated on the
//! target grid.

use crate::adaptive::{ForwardModel, SelectionError};
use crate::types::InitialSpec;

/// Build the seed frequencies for a run.
///
/// The forward model is only consulted for [`InitialSpec::Peaks`], which
/// evaluates it once over the whole target grid to locate the spectral peaks
/// of the imaginary field.
pub fn seed_frequencies(
    spec: &InitialSpec,
    model: &dyn ForwardModel,
    target_grid: &[f64],
) -> Result<Vec<f64>, SelectionError> {
    match spec {
        InitialSpec::LogRange {
            min_log10,
            max_log10,
            count,
        } => Ok(log_spaced(*min_log10, *max_log10, *count)),
        InitialSpec::Explicit(freqs) => {
            let mut sorted = freqs.clone();
            sorted.sort_by(|a, b| a.partial_cmp(b).expect("seed frequency is NaN"));
            sorted.dedup();
            Ok(sorted)
        }
        InitialSpec::Peaks(count) => peak_seeds(model, target_grid, *count),
    }
}

/// `count` log-spaced frequencies between `10^min_log10` and `10^max_log10`.
pub fn log_spaced(min_log10: f64, max_log10: f64, count: usize) -> Vec<f64> {
    if count == 1 {
        return vec![10f64.powf(min_log10)];
    }
    (0..count)
        .map(|i| {
            let t = i as f64 / (count - 1) as f64;
            10f64.powf(min_log10 + t * (max_log10 - min_log10))
        })
        .collect()
}

/// Seed from the `count` most significant peaks of |Im| of the reference
/// spectrum: the peak frequencies themselves, the log-midpoints between
/// consecutive peaks, and one margin point a full first-gap below the lowest
/// peak (half a decade when only one peak exists).
fn peak_seeds(
    model: &dyn ForwardModel,
    target_grid: &[f64],
    count: usize,
) -> Result<Vec<f64>, SelectionError> {
    let spectrum = model
        .evaluate(target_grid)
        .map_err(SelectionError::Forward)?;
    let amplitude: Vec<f64> = spectrum.iter().map(|f| f.im.abs()).collect();

    // Strict rise into the peak, non-strict fall out of it, so plateaus
    // report their first grid point only.
    let mut peaks: Vec<usize> = (1..amplitude.len().saturating_sub(1))
        .filter(|&i| amplitude[i] > amplitude[i - 1] && amplitude[i] >= amplitude[i + 1])
        .collect();
    if peaks.is_empty() {
        return Err(SelectionError::NoPeaks);
    }

    peaks.sort_by(|&a, &b| {
        amplitude[b]
            .partial_cmp(&amplitude[a])
            .expect("amplitude is NaN")
    });
    peaks.truncate(count);
    peaks.sort_unstable();

    let logs: Vec<f64> = peaks.iter().map(|&i| target_grid[i].log10()).collect();
    let mut seed_logs = logs.clone();
    for pair in logs.windows(2) {
        seed_logs.push((pair[0] + pair[1]) / 2.0);
    }
    let first_gap = if logs.len() > 1 { logs[1] - logs[0] } else { 0.5 };
    seed_logs.push(logs[0] - first_gap);
    if logs.len() == 1 {
        seed_logs.push(logs[0] + 0.5);
    }

    seed_logs.sort_by(|a, b| a.partial_cmp(b).expect("seed log-frequency is NaN"));
    seed_logs.dedup();
    Ok(seed_logs.into_iter().map(|l| 10f64.powf(l)).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::synthetic::{DebyeRelaxation, RelaxationTerm};
    use approx::assert_relative_eq;

    #[test]
    fn test_log_spaced_endpoints() {
        let seeds = log_spaced(-3.0, 1.0, 5);
        assert_eq!(seeds.len(), 5);
        assert_relative_eq!(seeds[0], 1e-3, epsilon = 1e-15);
        assert_relative_eq!(seeds[4], 1e1, epsilon = 1e-12);
    }

    #[test]
    fn test_explicit_seeds_are_sorted_unique() {
        let model = DebyeRelaxation::new(vec![RelaxationTerm {
            amplitude: 1.0,
            frequency_hz: 1.0,
        }]);
        let spec = InitialSpec::Explicit(vec![1.0, 0.1, 1.0, 10.0]);
        let seeds = seed_frequencies(&spec, &model, &[]).unwrap();
        assert_eq!(seeds, vec![0.1, 1.0, 10.0]);
    }

    #[test]
    fn test_peak_seeds_bracket_two_relaxations() {
        let model = DebyeRelaxation::new(vec![
            RelaxationTerm {
                amplitude: 1.0,
                frequency_hz: 0.05,
            },
            RelaxationTerm {
                amplitude: 1.0,
                frequency_hz: 5.0,
            },
        ]);
        let grid = log_spaced(-4.0, 3.0, 281);
        let seeds = seed_frequencies(&InitialSpec::Peaks(2), &model, &grid).unwrap();

        // Two peaks, one midpoint, one left margin.
        assert_eq!(seeds.len(), 4);
        assert!(seeds.windows(2).all(|w| w[0] < w[1]), "seeds must be sorted");
        // Peaks of |Im| sit at the relaxation frequencies, within the grid
        // resolution (40 points per decade).
        assert!((seeds[1].log10() - (-1.3f64)).abs() < 0.05);
        assert!((seeds[3].log10() - 0.7f64).abs() < 0.05);
    }

    #[test]
    fn test_flat_spectrum_has_no_peaks() {
        let model = DebyeRelaxation::new(vec![]);
        let grid = log_spaced(-2.0, 2.0, 41);
        let err = seed_frequencies(&InitialSpec::Peaks(2), &model, &grid).unwrap_err();
        assert!(matches!(err, SelectionError::NoPeaks));
    }
}
