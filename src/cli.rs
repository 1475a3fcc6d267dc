use std::path::PathBuf;

use clap::Parser;

use crate::config::RunConfig;
use crate::sim::ExecutionMode;

/// Command-line options. Every flag overrides the matching config field.
#[derive(Debug, Parser)]
#[command(name = "horizon-sim")]
#[command(about = "Rolling-horizon unit-commitment simulator", long_about = None)]
pub struct CliOptions {
    /// Path to the TOML run configuration
    #[arg(short, long)]
    pub config: PathBuf,
    /// Windows to solve in continuous mode
    #[arg(long)]
    pub steps: Option<usize>,
    /// Zero-based window index solved in single-step mode
    #[arg(long)]
    pub day: Option<usize>,
    /// Solve a single window at `--day`
    #[arg(long)]
    pub single_step: bool,
    /// Output directory for tables and diagnostics
    #[arg(short, long)]
    pub out: Option<PathBuf>,
}

impl CliOptions {
    /// Applies command-line overrides to a loaded configuration.
    pub fn apply(&self, cfg: &mut RunConfig) {
        if let Some(steps) = self.steps {
            cfg.simulation.steps = steps;
        }
        if let Some(day) = self.day {
            cfg.simulation.simulated_day = day;
        }
        if self.single_step {
            cfg.simulation.mode = ExecutionMode::SingleStep;
        }
        if let Some(out) = &self.out {
            cfg.output.dir = out.clone();
        }
    }
}
