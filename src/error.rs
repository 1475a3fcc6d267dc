//! Error types for extraction, model building, solving, and persistence.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while turning raw solver output into records.
///
/// Every variant indicates a contract mismatch between the model builder,
/// the solver, and the extractor. None of them are transient.
#[derive(Debug, Error)]
pub enum ExtractError {
    /// A variable name does not follow `kind[arg1,arg2,...]`.
    #[error("malformed variable name `{name}`: {reason}")]
    MalformedName { name: String, reason: String },

    /// A variable refers to an hour outside the solved window.
    #[error("variable `{name}` has local hour {hour}, outside a window of {window_hours} hours")]
    HourOutOfWindow {
        name: String,
        hour: usize,
        window_hours: usize,
    },

    /// A thermal unit is absent from one of the state variable families.
    #[error("thermal unit `{unit}` has no `{kind}` values in the window solution")]
    MissingUnit { unit: String, kind: &'static str },

    /// `window * window_hours` does not fit the hour type.
    #[error("window {window} of {window_hours} hours lies beyond the representable timeline")]
    OffsetOverflow { window: usize, window_hours: usize },
}

/// Errors raised by a model builder.
#[derive(Debug, Error)]
pub enum BuildError {
    /// No archived instance exists for the requested window.
    #[error("instance file not found: {}", path.display())]
    MissingInstance { path: PathBuf },

    /// Builder-specific failure.
    #[error("model builder failed: {0}")]
    Builder(String),
}

/// Errors raised by a solver engine.
#[derive(Debug, Error)]
pub enum EngineError {
    /// The solver executable could not be started.
    #[error("failed to start solver `{program}`: {source}")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },

    /// The solver process exited unsuccessfully.
    #[error("solver exited with status {code:?}: {stderr}")]
    ProcessFailed { code: Option<i32>, stderr: String },

    /// The solution file could not be parsed.
    #[error("solution file line {line}: {message}")]
    SolutionFormat { line: usize, message: String },

    /// The solve ended without a primal solution and without proving infeasibility.
    #[error("solver finished with status `{status}` and no feasible solution")]
    NoSolution { status: String },

    /// Reading or writing an interchange file failed.
    #[error("solver I/O error: {0}")]
    Io(#[from] io::Error),
}

/// Errors that stop a rolling-horizon run.
///
/// They reach the caller inside [`crate::sim::outcome::RunOutcome::Failed`]
/// together with the partial record. Infeasible windows are not errors;
/// they are reported through [`crate::sim::outcome::RunOutcome::InfeasibleHalt`].
#[derive(Debug, Error)]
pub enum SimError {
    #[error("window {window}: {source}")]
    Build {
        window: usize,
        #[source]
        source: BuildError,
    },

    #[error("window {window}: {source}")]
    Engine {
        window: usize,
        #[source]
        source: EngineError,
    },

    #[error("window {window}: {source}")]
    Extract {
        window: usize,
        #[source]
        source: ExtractError,
    },

    /// Writing a window model to the instance directory failed.
    #[error("window {window}: failed to export model to {}: {source}", path.display())]
    ModelExport {
        window: usize,
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Errors raised while persisting records or diagnostics.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
