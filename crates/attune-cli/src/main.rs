//! Attune command-line interface.
//!
//! Run adaptive frequency selections from TOML configuration files:
//! ```sh
//! attune-cli run job.toml
//! attune-cli validate job.toml
//! ```

mod config;
mod runner;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "attune-cli")]
#[command(about = "Attune: Adaptive Frequency Selection")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a selection from a TOML configuration file.
    Run {
        /// Path to the job configuration file.
        config: PathBuf,
        /// Output directory (overrides config file setting).
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Validate a configuration file without running the selection.
    Validate {
        /// Path to the job configuration file.
        config: PathBuf,
    },
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Run { config, output } => {
            println!("Attune Adaptive Frequency Selection");
            println!("===================================");
            let job = config::load_config(&config)?;
            println!("Configuration: {}", config.display());

            let result = runner::run_selection(&job)?;
            println!(
                "Converged after {} iterations with {} frequencies.",
                result.iterations,
                result.frequencies.len()
            );

            let out_dir = output.unwrap_or_else(|| PathBuf::from(&job.output.directory));

            if job.output.save_frequencies {
                let path = out_dir.join("frequencies.csv");
                runner::write_frequencies_csv(&result, &path, &job)?;
            }

            if job.output.save_signal {
                let path = out_dir.join("signal.csv");
                runner::write_signal_csv(&result, &job.grids.time.values(), &path)?;
            }

            if job.output.save_json {
                let path = out_dir.join("selection.json");
                runner::write_result_json(&result, &path)?;
            }

            println!("Selection complete.");
            Ok(())
        }
        Commands::Validate { config } => {
            let _job = config::load_config(&config)?;
            println!("Configuration is valid: {}", config.display());
            Ok(())
        }
    }
}
