//! TOML-based run configuration.

use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use crate::record::NoiseFilter;
use crate::sim::types::YEAR_HOURS;
use crate::sim::{ExecutionMode, SimConfig};
use crate::solver::external::{DEFAULT_ARGS, DEFAULT_PROGRAM};
use crate::solver::instance::instance_dir_name;
use crate::solver::SolverOptions;
use crate::system::{SystemParams, ThermalUnit};

/// Top-level run configuration parsed from TOML.
///
/// Every section has defaults. Load with [`RunConfig::from_toml_file`] and
/// check with [`RunConfig::validate`] before building a simulator.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RunConfig {
    /// Window sizing, horizon length, and execution mode.
    #[serde(default)]
    pub simulation: SimulationConfig,
    /// Thermal units whose commitment is carried between windows.
    #[serde(default)]
    pub units: Vec<ThermalUnit>,
    /// Engine selection and solver limits.
    #[serde(default)]
    pub solver: SolverConfig,
    /// Noise-repair tolerances.
    #[serde(default)]
    pub extraction: NoiseFilter,
    /// Output locations.
    #[serde(default)]
    pub output: OutputConfig,
}

/// Window sizing and horizon parameters.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SimulationConfig {
    /// System name used in instance, diagnostic, and table file names.
    pub model_name: String,
    /// Hours per window (`T`, must be > 0).
    pub window_hours: usize,
    /// Windows to solve in continuous mode.
    pub steps: usize,
    /// Zero-based window index solved in single-step mode.
    pub simulated_day: usize,
    pub mode: ExecutionMode,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            model_name: "system".to_string(),
            window_hours: 24,
            steps: 1,
            simulated_day: 0,
            mode: ExecutionMode::Continuous,
        }
    }
}

/// Solver engine used for each window.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EngineKind {
    /// Read archived `.sol` files next to each instance.
    #[default]
    Replay,
    /// Run an external solver executable.
    External,
}

/// Engine selection and solver limits.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SolverConfig {
    pub engine: EngineKind,
    /// Directory of archived window instances. Defaults to
    /// `{model_name}_{window_hours}_instances`.
    pub instance_dir: Option<PathBuf>,
    /// External solver executable.
    pub command: String,
    /// External solver arguments with `{model}`, `{solution}`, and
    /// `{options}` placeholders.
    pub args: Vec<String>,
    /// Relative MIP gap (0.0 to 1.0).
    pub mip_gap: Option<f64>,
    /// Time limit per window in seconds.
    pub time_limit: Option<f64>,
    /// Write every window model into the output directory.
    pub write_models: bool,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            engine: EngineKind::Replay,
            instance_dir: None,
            command: DEFAULT_PROGRAM.to_string(),
            args: DEFAULT_ARGS.iter().map(|a| a.to_string()).collect(),
            mip_gap: None,
            time_limit: None,
            write_models: false,
        }
    }
}

/// Output locations.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OutputConfig {
    /// Directory for record tables, diagnostics, and exported models.
    pub dir: PathBuf,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("output"),
        }
    }
}

/// Configuration error with field path and constraint description.
#[derive(Debug, Error)]
#[error("config error: {field}: {message}")]
pub struct ConfigError {
    /// Dotted field path (e.g., `"simulation.window_hours"`).
    pub field: String,
    /// Human-readable constraint description.
    pub message: String,
}

impl ConfigError {
    fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl RunConfig {
    /// Parses a configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the file cannot be read or the TOML is invalid.
    pub fn from_toml_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| {
            ConfigError::new("config", format!("cannot read \"{}\": {e}", path.display()))
        })?;
        Self::from_toml_str(&content)
    }

    /// Parses a configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the TOML is invalid or contains unknown fields.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        toml::from_str(s).map_err(|e| ConfigError::new("toml", e.to_string()))
    }

    /// Validates all fields and returns a list of errors.
    ///
    /// Returns an empty vector if configuration is valid.
    pub fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();
        let s = &self.simulation;

        if s.model_name.trim().is_empty() {
            errors.push(ConfigError::new("simulation.model_name", "must not be empty"));
        }
        if s.window_hours == 0 {
            errors.push(ConfigError::new("simulation.window_hours", "must be > 0"));
        }
        if s.mode == ExecutionMode::Continuous && s.steps == 0 {
            errors.push(ConfigError::new(
                "simulation.steps",
                "must be > 0 in continuous mode",
            ));
        }
        if s.mode == ExecutionMode::SingleStep
            && s.window_hours > 0
            && s.simulated_day >= YEAR_HOURS / s.window_hours
        {
            errors.push(ConfigError::new(
                "simulation.simulated_day",
                format!("must be < {} for {}-hour windows", YEAR_HOURS / s.window_hours, s.window_hours),
            ));
        }

        let mut seen = BTreeSet::new();
        for (i, unit) in self.units.iter().enumerate() {
            if unit.id.trim().is_empty() {
                errors.push(ConfigError::new(format!("units[{i}].id"), "must not be empty"));
            } else if !seen.insert(unit.id.as_str()) {
                errors.push(ConfigError::new(
                    format!("units[{i}].id"),
                    format!("duplicate unit \"{}\"", unit.id),
                ));
            }
        }

        let sol = &self.solver;
        if let Some(gap) = sol.mip_gap {
            if !(0.0..1.0).contains(&gap) {
                errors.push(ConfigError::new("solver.mip_gap", "must be in [0.0, 1.0)"));
            }
        }
        if let Some(limit) = sol.time_limit {
            if limit.is_nan() || limit <= 0.0 {
                errors.push(ConfigError::new("solver.time_limit", "must be > 0"));
            }
        }
        if sol.engine == EngineKind::External {
            if sol.command.trim().is_empty() {
                errors.push(ConfigError::new("solver.command", "must not be empty"));
            }
            for placeholder in ["{model}", "{solution}"] {
                if !sol.args.iter().any(|a| a.contains(placeholder)) {
                    errors.push(ConfigError::new(
                        "solver.args",
                        format!("must reference {placeholder}"),
                    ));
                }
            }
        }
        if sol.write_models && s.window_hours > 0 && self.model_export_dir() == self.instance_dir() {
            errors.push(ConfigError::new(
                "solver.write_models",
                "export directory must differ from solver.instance_dir",
            ));
        }

        let ex = &self.extraction;
        if !(0.0..0.5).contains(&ex.binary_tolerance) {
            errors.push(ConfigError::new(
                "extraction.binary_tolerance",
                "must be in [0.0, 0.5)",
            ));
        }
        if ex.zero_tolerance.is_nan() || ex.zero_tolerance < 0.0 {
            errors.push(ConfigError::new("extraction.zero_tolerance", "must be >= 0"));
        }

        errors
    }

    /// Static system parameters for the extractor.
    ///
    /// # Panics
    ///
    /// Panics if `simulation.window_hours` is zero; call [`RunConfig::validate`] first.
    pub fn system_params(&self) -> SystemParams {
        SystemParams::new(
            self.simulation.model_name.clone(),
            self.simulation.window_hours,
            self.units.clone(),
        )
    }

    pub fn solver_options(&self) -> SolverOptions {
        SolverOptions {
            mip_gap: self.solver.mip_gap,
            time_limit_secs: self.solver.time_limit,
        }
    }

    /// Orchestrator configuration.
    ///
    /// # Panics
    ///
    /// Panics if `simulation.window_hours` is zero; call [`RunConfig::validate`] first.
    pub fn sim_config(&self) -> SimConfig {
        SimConfig::new(
            self.simulation.window_hours,
            self.simulation.mode,
            self.solver_options(),
        )
    }

    /// Directory the instance library reads from.
    pub fn instance_dir(&self) -> PathBuf {
        self.solver.instance_dir.clone().unwrap_or_else(|| {
            PathBuf::from(instance_dir_name(
                &self.simulation.model_name,
                self.simulation.window_hours,
            ))
        })
    }

    /// Directory exported window models are written to.
    pub fn model_export_dir(&self) -> PathBuf {
        self.output.dir.join(instance_dir_name(
            &self.simulation.model_name,
            self.simulation.window_hours,
        ))
    }
}
