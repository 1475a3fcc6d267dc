//! Run outcomes and infeasibility diagnostics.

use std::fs::{self, File};
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use chrono::Local;
use tracing::info;

use crate::error::{ExportError, SimError};
use crate::record::SimulationRecord;
use crate::solver::Model;

/// Timestamp format used in diagnostic file names.
pub const DIAGNOSTIC_TIMESTAMP: &str = "%Y%m%d_%H%M%S";

/// Evidence kept for the window that halted a run.
#[derive(Debug)]
pub struct InfeasibleWindow<M> {
    /// Window index of the failed window.
    pub window: usize,
    pub window_hours: usize,
    /// Solver evidence: an irreducible infeasible subsystem when the engine
    /// provides one, otherwise the solver log.
    pub certificate: String,
    /// The unsolved model.
    pub model: M,
}

/// Paths written by [`InfeasibleWindow::dump`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiagnosticBundle {
    pub certificate: PathBuf,
    pub model: PathBuf,
    pub history: PathBuf,
}

impl<M: Model> InfeasibleWindow<M> {
    /// Base file name `infeasible_{run}_{T}_{window}_{timestamp}`.
    pub fn file_stem(&self, run_name: &str, timestamp: &str) -> String {
        format!(
            "infeasible_{run_name}_{}_{}_{timestamp}",
            self.window_hours, self.window
        )
    }

    /// Writes the certificate (`.ilp`), the model (`.mps`), and a JSON
    /// snapshot of `history` (`.json`) into `dir`.
    ///
    /// # Errors
    ///
    /// Returns an [`ExportError`] if `dir` cannot be created or any file
    /// cannot be written.
    pub fn dump(
        &self,
        dir: &Path,
        run_name: &str,
        history: &SimulationRecord,
    ) -> Result<DiagnosticBundle, ExportError> {
        fs::create_dir_all(dir)?;
        let timestamp = Local::now().format(DIAGNOSTIC_TIMESTAMP).to_string();
        let stem = self.file_stem(run_name, &timestamp);

        let bundle = DiagnosticBundle {
            certificate: dir.join(format!("{stem}.ilp")),
            model: dir.join(format!("{stem}.mps")),
            history: dir.join(format!("{stem}.json")),
        };

        fs::write(&bundle.certificate, &self.certificate)?;
        self.model.write_mps(&bundle.model)?;
        let writer = BufWriter::new(File::create(&bundle.history)?);
        serde_json::to_writer_pretty(writer, history)?;

        info!(
            window = self.window,
            certificate = %bundle.certificate.display(),
            "wrote infeasibility diagnostics"
        );
        Ok(bundle)
    }
}

/// Result of a rolling-horizon run.
///
/// Every variant carries the history accumulated so far. Callers branch on
/// the variant: only a halt has diagnostics to dump, and only `Completed`
/// is a successful run.
#[derive(Debug)]
pub enum RunOutcome<M> {
    /// Every requested window was solved.
    Completed {
        record: SimulationRecord,
        windows_expected: usize,
    },
    /// A window was proven infeasible and the run stopped there.
    InfeasibleHalt {
        record: SimulationRecord,
        diagnostics: InfeasibleWindow<M>,
        windows_expected: usize,
    },
    /// The builder, the engine, or the extractor failed and the run stopped.
    Failed {
        record: SimulationRecord,
        error: SimError,
        windows_expected: usize,
    },
}

impl<M> RunOutcome<M> {
    pub fn is_complete(&self) -> bool {
        matches!(self, Self::Completed { .. })
    }

    pub fn record(&self) -> &SimulationRecord {
        match self {
            Self::Completed { record, .. }
            | Self::InfeasibleHalt { record, .. }
            | Self::Failed { record, .. } => record,
        }
    }

    pub fn into_record(self) -> SimulationRecord {
        match self {
            Self::Completed { record, .. }
            | Self::InfeasibleHalt { record, .. }
            | Self::Failed { record, .. } => record,
        }
    }

    /// Windows whose solutions were appended to the record.
    pub fn windows_solved(&self) -> usize {
        self.record().windows().len()
    }

    pub fn windows_expected(&self) -> usize {
        match self {
            Self::Completed {
                windows_expected, ..
            }
            | Self::InfeasibleHalt {
                windows_expected, ..
            }
            | Self::Failed {
                windows_expected, ..
            } => *windows_expected,
        }
    }

    pub fn infeasible_window(&self) -> Option<&InfeasibleWindow<M>> {
        match self {
            Self::InfeasibleHalt { diagnostics, .. } => Some(diagnostics),
            Self::Completed { .. } | Self::Failed { .. } => None,
        }
    }

    /// The error that stopped a failed run.
    pub fn error(&self) -> Option<&SimError> {
        match self {
            Self::Failed { error, .. } => Some(error),
            Self::Completed { .. } | Self::InfeasibleHalt { .. } => None,
        }
    }
}

impl<M: Model> RunOutcome<M> {
    /// Dumps the diagnostic bundle of an infeasible halt. Does nothing for
    /// completed or failed runs.
    pub fn dump_diagnostics(
        &self,
        dir: &Path,
        run_name: &str,
    ) -> Result<Option<DiagnosticBundle>, ExportError> {
        match self {
            Self::Completed { .. } | Self::Failed { .. } => Ok(None),
            Self::InfeasibleHalt {
                record,
                diagnostics,
                ..
            } => diagnostics.dump(dir, run_name, record).map(Some),
        }
    }
}
