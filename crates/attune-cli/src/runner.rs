//! Selection runner: ties together model, grids, and the adaptive loop.

use std::path::Path;

use anyhow::{Context, Result};

use attune_core::adaptive::AdaptiveLoop;
use attune_core::synthetic::{DebyeRelaxation, QuadratureTransform};
use attune_core::types::{InitialSpec, SelectionParams, SelectionResult};

use crate::config::JobConfig;

/// Run a full selection from a parsed job configuration.
pub fn run_selection(job: &JobConfig) -> Result<SelectionResult> {
    let target_grid = job.grids.target.values();
    let time_grid = job.grids.time.values();
    anyhow::ensure!(
        target_grid.len() >= 2,
        "target grid needs at least 2 frequencies"
    );
    anyhow::ensure!(!time_grid.is_empty(), "time grid must not be empty");
    anyhow::ensure!(
        !job.model.terms.is_empty(),
        "model needs at least one relaxation term"
    );

    let model = DebyeRelaxation::new(job.model.terms.clone());
    let transform = QuadratureTransform;
    let initial = InitialSpec::from(&job.selection.initial);
    let params = SelectionParams {
        rtol: job.selection.rtol,
        max_iterations: job.selection.max_iterations,
        signal: job.selection.signal,
    };

    println!(
        "Target grid: {} frequencies ({:.1e} - {:.1e} Hz)",
        target_grid.len(),
        target_grid.first().unwrap(),
        target_grid.last().unwrap()
    );
    println!("Fourier method: {}", job.fourier);
    println!("Tolerance: {:.1e}, max iterations: {}", params.rtol, params.max_iterations);

    let adaptive = AdaptiveLoop::new(&model, &transform, &time_grid, &target_grid, params);
    let result = adaptive
        .run_observed(&initial, |record| {
            match record.proposed {
                Some(f) => println!(
                    "  [{}] {} frequencies, worst error {:.2e}, next: {:.4e} Hz",
                    record.iteration,
                    record.frequencies.len(),
                    record.errors.iter().copied().fold(0.0, f64::max),
                    f
                ),
                None => println!(
                    "  [{}] {} frequencies, worst error {:.2e}, converged",
                    record.iteration,
                    record.frequencies.len(),
                    record.errors.iter().copied().fold(0.0, f64::max),
                ),
            }
        })
        .with_context(|| "adaptive selection failed")?;

    Ok(result)
}

/// Write the selected frequencies and fields to a CSV file with a metadata
/// header.
pub fn write_frequencies_csv(
    result: &SelectionResult,
    path: &Path,
    job: &JobConfig,
) -> Result<()> {
    use std::io::Write;

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let mut file = std::fs::File::create(path)?;
    writeln!(file, "# Attune — Adaptively Selected Frequencies")?;
    writeln!(file, "# Version: {}", env!("CARGO_PKG_VERSION"))?;
    writeln!(file, "# rtol: {:.3e}", job.selection.rtol)?;
    writeln!(file, "# fourier: {}", job.fourier)?;
    writeln!(file, "# iterations: {}", result.iterations)?;
    writeln!(file, "#")?;
    writeln!(file, "frequency_hz,field_real,field_imag")?;

    for (f, field) in result.frequencies.iter().zip(result.fields.iter()) {
        writeln!(file, "{:.6e},{:.6e},{:.6e}", f, field.re, field.im)?;
    }

    println!("Frequencies written to: {}", path.display());
    Ok(())
}

/// Write the time-domain signal to a CSV file.
pub fn write_signal_csv(result: &SelectionResult, time_grid: &[f64], path: &Path) -> Result<()> {
    use std::io::Write;

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let mut file = std::fs::File::create(path)?;
    writeln!(file, "# Attune — Time-Domain Signal")?;
    writeln!(file, "#")?;
    writeln!(file, "time_s,signal")?;
    for (t, value) in time_grid.iter().zip(result.time_signal.iter()) {
        writeln!(file, "{:.6e},{:.6e}", t, value)?;
    }

    println!("Signal written to: {}", path.display());
    Ok(())
}

/// Write the full selection result to a JSON file.
pub fn write_result_json(result: &SelectionResult, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let json = serde_json::to_string_pretty(result)
        .map_err(|e| anyhow::anyhow!("JSON serialisation error: {}", e))?;
    std::fs::write(path, json)?;

    println!("Result (JSON) written to: {}", path.display());
    Ok(())
}
