//! The refinement rule: where (if anywhere) to sample next.
//!
//! Exactly one new frequency is proposed per call, or none. The
//! single-candidate policy bounds each outer iteration to one forward-model
//! evaluation and keeps the produced frequency sequence reproducible.
//!
//! Priority order, strict:
//! 1. No sample exceeds the tolerance — converged.
//! 2. The lowest-frequency sample fails — extend the low tail half a decade
//!    down. The low tail must stabilise before anything else is considered.
//! 3. The highest-frequency sample is the *only* failure — extend half a
//!    decade up.
//! 4. Otherwise — bisect, in log space, between the first failing sample and
//!    its next neighbour.

use ndarray::Array1;

/// Outcome of one refinement decision.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Proposal {
    /// Every sample is within tolerance; stop sampling.
    Converged,
    /// Evaluate the forward model at one more frequency.
    Refine {
        /// The proposed frequency (Hz).
        frequency: f64,
        /// Index of the failing sample that triggered the proposal.
        index: usize,
    },
}

impl Proposal {
    /// The proposed frequency, if any.
    pub fn frequency(&self) -> Option<f64> {
        match self {
            Proposal::Converged => None,
            Proposal::Refine { frequency, .. } => Some(*frequency),
        }
    }
}

/// Indices of samples whose error exceeds the tolerance, ascending.
pub fn failing_indices(errors: &Array1<f64>, rtol: f64) -> Vec<usize> {
    errors
        .iter()
        .enumerate()
        .filter(|(_, &e)| e > rtol)
        .map(|(i, _)| i)
        .collect()
}

/// Apply the refinement rule to the current error vector.
///
/// `frequencies` and `errors` are aligned and sorted by frequency.
pub fn propose(frequencies: &[f64], errors: &Array1<f64>, rtol: f64) -> Proposal {
    debug_assert_eq!(frequencies.len(), errors.len());

    let failing = failing_indices(errors, rtol);
    if failing.is_empty() {
        return Proposal::Converged;
    }

    let n = frequencies.len();
    let first = failing[0];
    let new_log = if first == 0 {
        frequencies[0].log10() - 0.5
    } else if first == n - 1 && failing.len() == 1 {
        frequencies[n - 1].log10() + 0.5
    } else {
        (frequencies[first].log10() + frequencies[first + 1].log10()) / 2.0
    };

    Proposal::Refine {
        frequency: 10f64.powf(new_log),
        index: first,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::array;

    const RTOL: f64 = 0.05;

    fn refined_frequency(proposal: Proposal) -> f64 {
        match proposal {
            Proposal::Refine { frequency, .. } => frequency,
            Proposal::Converged => panic!("expected a refinement"),
        }
    }

    #[test]
    fn test_all_within_tolerance_converges() {
        let freqs = [1e-2, 1e-1, 1e0];
        let errors = array![0.01, 0.02, 0.04];
        assert_eq!(propose(&freqs, &errors, RTOL), Proposal::Converged);
    }

    #[test]
    fn test_boundary_priority_over_interior() {
        // First and an interior sample both fail: the low extension wins.
        let freqs = [1e-2, 1e-1, 1e0, 1e1];
        let errors = array![0.2, 0.01, 0.3, 0.01];
        let f = refined_frequency(propose(&freqs, &errors, RTOL));
        assert_relative_eq!(f, 10f64.powf(-2.5), epsilon = 1e-12);
    }

    #[test]
    fn test_sole_last_extends_upward() {
        let freqs = [1e-2, 1e-1, 1e0, 1e1];
        let errors = array![0.01, 0.02, 0.01, 0.2];
        let f = refined_frequency(propose(&freqs, &errors, RTOL));
        assert_relative_eq!(f, 10f64.powf(1.5), epsilon = 1e-12);
    }

    #[test]
    fn test_last_plus_interior_bisects_interior() {
        // The last sample failing is only an upward extension when it is the
        // sole failure; otherwise the first failing interior sample is
        // bisected toward its neighbour.
        let freqs = [1e-2, 1e-1, 1e0, 1e1];
        let errors = array![0.01, 0.2, 0.01, 0.2];
        let f = refined_frequency(propose(&freqs, &errors, RTOL));
        assert_relative_eq!(f, 10f64.powf(-0.5), epsilon = 1e-12);
    }

    #[test]
    fn test_interior_bisection_is_log_midpoint() {
        let freqs = [1e-2, 1e-1, 1e1];
        let errors = array![0.01, 0.2, 0.01];
        let f = refined_frequency(propose(&freqs, &errors, RTOL));
        assert_relative_eq!(f, 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_proposal_index_reports_trigger() {
        let freqs = [1e-2, 1e-1, 1e0];
        let errors = array![0.01, 0.2, 0.01];
        match propose(&freqs, &errors, RTOL) {
            Proposal::Refine { index, .. } => assert_eq!(index, 1),
            Proposal::Converged => panic!("expected a refinement"),
        }
    }
}
