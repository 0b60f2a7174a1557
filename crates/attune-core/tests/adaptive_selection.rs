//! End-to-end test: adaptive selection on a Debye relaxation model.
//!
//! Validates that the loop converges, that the frequency set grows by at most
//! one sample per iteration, and that the reconstructed time-domain impulse
//! response agrees with the analytical one.

use attune_core::adaptive::{adaptive_select, AdaptiveLoop, SelectionError};
use attune_core::estimator::leave_one_out;
use attune_core::refine::{propose, Proposal};
use attune_core::seed::log_spaced;
use attune_core::synthetic::{DebyeRelaxation, QuadratureTransform, RelaxationTerm};
use attune_core::types::{InitialSpec, SampleSet, SelectionParams, SignalKind};

fn debye() -> DebyeRelaxation {
    DebyeRelaxation::single(0.5)
}

fn seed_spec() -> InitialSpec {
    InitialSpec::LogRange {
        min_log10: -3.0,
        max_log10: 1.0,
        count: 5,
    }
}

#[test]
fn test_selection_converges_and_matches_analytic_impulse() {
    let model = debye();
    let transform = QuadratureTransform;
    let target_grid = log_spaced(-4.0, 3.0, 701);
    let time_grid = [0.2, 0.5, 1.0];
    let params = SelectionParams {
        rtol: 0.01,
        max_iterations: 200,
        signal: SignalKind::Impulse,
    };

    let result = adaptive_select(
        &model,
        &transform,
        &time_grid,
        &target_grid,
        &seed_spec(),
        params,
    )
    .expect("selection should converge");

    eprintln!(
        "converged after {} iterations with {} frequencies",
        result.iterations,
        result.frequencies.len()
    );
    assert!(result.frequencies.len() >= 5);
    assert!(
        result.frequencies.windows(2).all(|w| w[0] < w[1]),
        "frequencies must be strictly increasing"
    );

    for (&t, &value) in time_grid.iter().zip(result.time_signal.iter()) {
        let exact = model.impulse_response(t);
        let rel = (value - exact).abs() / exact.abs();
        eprintln!("t={t}: adaptive {value:.4e}, exact {exact:.4e}, err {:.1}%", rel * 100.0);
        assert!(
            rel < 0.25,
            "time-domain signal at t={t} off by {:.1}%",
            rel * 100.0
        );
    }
}

#[test]
fn test_growth_is_one_sample_per_iteration() {
    let model = debye();
    let transform = QuadratureTransform;
    let target_grid = log_spaced(-4.0, 3.0, 351);
    let time_grid = [0.5];
    let params = SelectionParams {
        rtol: 0.05,
        max_iterations: 200,
        signal: SignalKind::Impulse,
    };

    let adaptive = AdaptiveLoop::new(&model, &transform, &time_grid, &target_grid, params);
    let mut sizes = Vec::new();
    adaptive
        .run_observed(&seed_spec(), |record| {
            sizes.push(record.frequencies.len());
            assert!(record.proposed.iter().all(|f| f.is_finite() && *f > 0.0));
        })
        .expect("selection should converge");

    assert!(!sizes.is_empty());
    for pair in sizes.windows(2) {
        assert!(pair[1] >= pair[0], "frequency set must never shrink");
        assert!(
            pair[1] - pair[0] <= 1,
            "at most one frequency may be added per iteration"
        );
    }
}

#[test]
fn test_converged_set_is_stable_under_reestimation() {
    let model = debye();
    let transform = QuadratureTransform;
    let target_grid = log_spaced(-4.0, 3.0, 351);
    let params = SelectionParams {
        rtol: 0.05,
        max_iterations: 200,
        signal: SignalKind::Impulse,
    };

    let result = adaptive_select(
        &model,
        &transform,
        &[0.5],
        &target_grid,
        &seed_spec(),
        params.clone(),
    )
    .expect("selection should converge");

    // Re-running the estimator on the converged set reports no failures, and
    // the refiner proposes nothing.
    let mut samples = SampleSet::new();
    samples.merge(&result.frequencies, &result.fields);
    let estimate = leave_one_out(&samples, None).expect("estimation should succeed");
    assert!(
        estimate.errors.iter().all(|&e| e <= params.rtol),
        "converged set must satisfy the tolerance everywhere"
    );
    assert_eq!(
        propose(samples.frequencies(), &estimate.errors, params.rtol),
        Proposal::Converged
    );
}

#[test]
fn test_iteration_cap_is_enforced() {
    let model = debye();
    let transform = QuadratureTransform;
    let target_grid = log_spaced(-4.0, 3.0, 351);
    let params = SelectionParams {
        rtol: 1e-6, // unreachable in three iterations
        max_iterations: 3,
        signal: SignalKind::Impulse,
    };

    let err = adaptive_select(
        &model,
        &transform,
        &[0.5],
        &target_grid,
        &seed_spec(),
        params,
    )
    .expect_err("tight tolerance must not converge in 3 iterations");

    match err {
        SelectionError::NonConvergence {
            max_iterations,
            worst_error,
        } => {
            assert_eq!(max_iterations, 3);
            assert!(worst_error > 1e-6);
        }
        other => panic!("expected NonConvergence, got: {other}"),
    }
}

#[test]
fn test_peak_seeding_drives_two_pole_model() {
    let model = DebyeRelaxation::new(vec![
        RelaxationTerm {
            amplitude: 1.0,
            frequency_hz: 0.05,
        },
        RelaxationTerm {
            amplitude: 0.6,
            frequency_hz: 5.0,
        },
    ]);
    let transform = QuadratureTransform;
    let target_grid = log_spaced(-4.0, 3.0, 701);
    let params = SelectionParams {
        rtol: 0.05,
        max_iterations: 200,
        signal: SignalKind::SwitchOn,
    };

    let result = adaptive_select(
        &model,
        &transform,
        &[1.0, 5.0],
        &target_grid,
        &InitialSpec::Peaks(2),
        params,
    )
    .expect("peak-seeded selection should converge");

    eprintln!(
        "two-pole model: {} frequencies after {} iterations",
        result.frequencies.len(),
        result.iterations
    );
    // The converged band must cover both relaxations.
    assert!(*result.frequencies.first().unwrap() < 0.05);
    assert!(*result.frequencies.last().unwrap() > 5.0);

    for (&t, &value) in [1.0, 5.0].iter().zip(result.time_signal.iter()) {
        let exact = model.step_response(t);
        let rel = (value - exact).abs() / exact.abs();
        eprintln!("t={t}: step {value:.4e}, exact {exact:.4e}, err {:.1}%", rel * 100.0);
        assert!(rel < 0.25, "step response at t={t} off by {:.1}%", rel * 100.0);
    }
}

#[test]
fn test_sparse_peak_triggers_low_extension() {
    // Three samples around an unresolved peak: the peak sample is the worst
    // offender, but the lowest sample fails too, and the low tail takes
    // priority over interior bisection.
    let freqs = [1e-2, 1e-1, 1e0];
    let fields: Vec<num_complex::Complex64> = [0.1, 0.4, 0.05]
        .iter()
        .map(|&v| num_complex::Complex64::new(0.0, v))
        .collect();
    let mut samples = SampleSet::new();
    samples.merge(&freqs, &fields);

    let estimate = leave_one_out(&samples, None).expect("estimation should succeed");
    match propose(samples.frequencies(), &estimate.errors, 0.05) {
        Proposal::Refine { frequency, index } => {
            assert_eq!(index, 0);
            assert!((frequency.log10() - (-2.5)).abs() < 1e-12);
        }
        Proposal::Converged => panic!("expected a refinement"),
    }
}

#[test]
fn test_degenerate_seed_fails() {
    let model = debye();
    let transform = QuadratureTransform;
    let target_grid = log_spaced(-4.0, 3.0, 101);
    let err = adaptive_select(
        &model,
        &transform,
        &[0.5],
        &target_grid,
        &InitialSpec::Explicit(vec![1.0]),
        SelectionParams::default(),
    )
    .expect_err("a single seed frequency cannot support leave-one-out");
    assert!(matches!(err, SelectionError::Interpolation(_)));
}

#[test]
fn test_empty_seed_fails() {
    // A run with no seeds at all must fail, not report convergence with an
    // empty frequency set and signal.
    let model = debye();
    let transform = QuadratureTransform;
    let target_grid = log_spaced(-4.0, 3.0, 101);

    for spec in [
        InitialSpec::Explicit(vec![]),
        InitialSpec::LogRange {
            min_log10: -3.0,
            max_log10: 1.0,
            count: 0,
        },
    ] {
        let err = adaptive_select(
            &model,
            &transform,
            &[0.5],
            &target_grid,
            &spec,
            SelectionParams::default(),
        )
        .expect_err("an empty seed must not report convergence");
        assert!(matches!(err, SelectionError::Interpolation(_)));
    }
}
