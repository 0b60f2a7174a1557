//! TOML configuration deserialisation for selection jobs.

use attune_core::synthetic::RelaxationTerm;
use attune_core::types::{FourierMethod, InitialSpec, SignalKind};
use serde::Deserialize;

/// Top-level job configuration.
#[derive(Debug, Deserialize)]
pub struct JobConfig {
    pub model: ModelConfig,
    pub selection: SelectionConfig,
    pub grids: GridsConfig,
    /// Fourier-method record for the transform; resolved once here, never
    /// re-detected per call.
    #[serde(default)]
    pub fourier: FourierMethod,
    #[serde(default)]
    pub output: OutputConfig,
}

/// The synthetic forward model the CLI demo runs against.
#[derive(Debug, Deserialize)]
pub struct ModelConfig {
    /// Debye relaxation terms (amplitude + corner frequency in Hz).
    pub terms: Vec<RelaxationTerm>,
}

/// Selection parameters from TOML.
#[derive(Debug, Deserialize)]
pub struct SelectionConfig {
    #[serde(default = "default_rtol")]
    pub rtol: f64,
    #[serde(default = "default_max_iterations")]
    pub max_iterations: usize,
    #[serde(default = "default_signal")]
    pub signal: SignalKind,
    pub initial: InitialConfig,
}

fn default_rtol() -> f64 {
    0.01
}
fn default_max_iterations() -> usize {
    200
}
fn default_signal() -> SignalKind {
    SignalKind::Impulse
}

/// Seed specification: log-range bounds, explicit list, or peak count.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum InitialConfig {
    Range {
        /// [log10 min, log10 max] in Hz.
        range: [f64; 2],
        count: usize,
    },
    List {
        values: Vec<f64>,
    },
    Peaks {
        peaks: usize,
    },
}

impl From<&InitialConfig> for InitialSpec {
    fn from(config: &InitialConfig) -> Self {
        match config {
            InitialConfig::Range { range, count } => InitialSpec::LogRange {
                min_log10: range[0],
                max_log10: range[1],
                count: *count,
            },
            InitialConfig::List { values } => InitialSpec::Explicit(values.clone()),
            InitialConfig::Peaks { peaks } => InitialSpec::Peaks(*peaks),
        }
    }
}

/// The target (frequency) and time grids.
#[derive(Debug, Deserialize)]
pub struct GridsConfig {
    /// The transform's required frequency grid (Hz).
    pub target: GridSpec,
    /// Times (s) at which the signal is required.
    pub time: GridSpec,
}

/// Grid specification: either log-spaced bounds or an explicit list.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum GridSpec {
    Range {
        /// [log10 min, log10 max].
        range: [f64; 2],
        points: usize,
    },
    List {
        values: Vec<f64>,
    },
}

impl GridSpec {
    /// Materialise the grid values.
    pub fn values(&self) -> Vec<f64> {
        match self {
            GridSpec::Range { range, points } => {
                attune_core::seed::log_spaced(range[0], range[1], *points)
            }
            GridSpec::List { values } => values.clone(),
        }
    }
}

/// Output configuration.
#[derive(Debug, Deserialize)]
pub struct OutputConfig {
    /// Output directory (default: "./output").
    #[serde(default = "default_output_dir")]
    pub directory: String,
    /// Whether to save the selected frequencies as CSV (default: true).
    #[serde(default = "default_true")]
    pub save_frequencies: bool,
    /// Whether to save the time-domain signal as CSV (default: true).
    #[serde(default = "default_true")]
    pub save_signal: bool,
    /// Whether to also save the full result as JSON (default: false).
    #[serde(default)]
    pub save_json: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: default_output_dir(),
            save_frequencies: true,
            save_signal: true,
            save_json: false,
        }
    }
}

fn default_output_dir() -> String {
    "./output".into()
}
fn default_true() -> bool {
    true
}

/// Load and parse a TOML job configuration file.
pub fn load_config(path: &std::path::Path) -> anyhow::Result<JobConfig> {
    let content = std::fs::read_to_string(path)?;
    let config: JobConfig = toml::from_str(&content)?;
    Ok(config)
}
