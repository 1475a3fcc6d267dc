//! CSV export of the accumulated simulation record.

use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use tracing::info;

use crate::error::ExportError;
use crate::record::{FlowRecord, InitialConditionRow, NodeTimeRecord, SimulationRecord, SystemWideRecord};
use crate::sim::ExecutionMode;

const NODE_HEADER: [&str; 4] = ["kind", "unit", "hour", "value"];
const FLOW_HEADER: [&str; 4] = ["from_node", "to_node", "hour", "value"];
const SYSTEM_HEADER: [&str; 3] = ["kind", "hour", "value"];
const INITIAL_HEADER: [&str; 4] = ["variable", "unit", "hour", "value"];

/// Table names used as file name suffixes.
pub const TABLES: [&str; 4] = [
    "node_variables",
    "flow_variables",
    "system_variables",
    "initial_conditions",
];

/// Writes node-time records as CSV to any writer.
///
/// # Errors
///
/// Returns a `csv::Error` if writing fails.
pub fn write_node_variables(rows: &[NodeTimeRecord], writer: impl Write) -> csv::Result<()> {
    let mut wtr = csv::WriterBuilder::new().from_writer(writer);
    wtr.write_record(NODE_HEADER)?;
    for r in rows {
        wtr.write_record([
            r.kind.clone(),
            r.unit.clone(),
            r.hour.to_string(),
            r.value.to_string(),
        ])?;
    }
    wtr.flush()?;
    Ok(())
}

/// Writes flow records as CSV to any writer.
pub fn write_flow_variables(rows: &[FlowRecord], writer: impl Write) -> csv::Result<()> {
    let mut wtr = csv::WriterBuilder::new().from_writer(writer);
    wtr.write_record(FLOW_HEADER)?;
    for r in rows {
        wtr.write_record([
            r.from_node.clone(),
            r.to_node.clone(),
            r.hour.to_string(),
            r.value.to_string(),
        ])?;
    }
    wtr.flush()?;
    Ok(())
}

/// Writes system-wide records as CSV to any writer.
pub fn write_system_variables(rows: &[SystemWideRecord], writer: impl Write) -> csv::Result<()> {
    let mut wtr = csv::WriterBuilder::new().from_writer(writer);
    wtr.write_record(SYSTEM_HEADER)?;
    for r in rows {
        wtr.write_record([r.kind.clone(), r.hour.to_string(), r.value.to_string()])?;
    }
    wtr.flush()?;
    Ok(())
}

/// Writes flattened initial conditions as CSV to any writer.
///
/// Remaining-commitment rows have no hour and leave that column empty.
pub fn write_initial_conditions(rows: &[InitialConditionRow], writer: impl Write) -> csv::Result<()> {
    let mut wtr = csv::WriterBuilder::new().from_writer(writer);
    wtr.write_record(INITIAL_HEADER)?;
    for r in rows {
        wtr.write_record([
            r.variable.to_string(),
            r.unit.clone(),
            r.hour.map(|h| h.to_string()).unwrap_or_default(),
            r.value.to_string(),
        ])?;
    }
    wtr.flush()?;
    Ok(())
}

/// File naming for one exported run:
/// `{YYYYmmdd_HHMM}_{model}_D{day}_T{T}_{table}.csv`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputNaming {
    pub timestamp: String,
    pub model_name: String,
    /// `7` for a single-step run of day 7, `1-30` for 30 continuous windows.
    pub day_label: String,
    pub window_hours: usize,
}

impl OutputNaming {
    /// Builds the naming for a run finished at `now`.
    ///
    /// `simulated_day` is zero-based; single-step labels are one-based.
    pub fn new(
        now: DateTime<Local>,
        model_name: impl Into<String>,
        mode: ExecutionMode,
        simulated_day: usize,
        windows_solved: usize,
        window_hours: usize,
    ) -> Self {
        let day_label = match mode {
            ExecutionMode::SingleStep => (simulated_day + 1).to_string(),
            ExecutionMode::Continuous => format!("1-{windows_solved}"),
        };
        Self {
            timestamp: now.format("%Y%m%d_%H%M").to_string(),
            model_name: model_name.into(),
            day_label,
            window_hours,
        }
    }

    pub fn file_name(&self, table: &str) -> String {
        format!(
            "{}_{}_D{}_T{}_{table}.csv",
            self.timestamp, self.model_name, self.day_label, self.window_hours
        )
    }
}

fn create(path: &Path) -> io::Result<io::BufWriter<File>> {
    Ok(io::BufWriter::new(File::create(path)?))
}

/// Exports the four record tables into `dir`.
///
/// Returns the written paths in [`TABLES`] order.
///
/// # Errors
///
/// Returns an [`ExportError`] if `dir` cannot be created or a file cannot be
/// written.
pub fn export_record(
    record: &SimulationRecord,
    dir: &Path,
    naming: &OutputNaming,
) -> Result<Vec<PathBuf>, ExportError> {
    fs::create_dir_all(dir)?;
    let paths: Vec<PathBuf> = TABLES.iter().map(|t| dir.join(naming.file_name(t))).collect();

    write_node_variables(record.node_variables(), create(&paths[0])?)?;
    write_flow_variables(record.flow_variables(), create(&paths[1])?)?;
    write_system_variables(record.system_variables(), create(&paths[2])?)?;
    write_initial_conditions(&record.initial_condition_rows(), create(&paths[3])?)?;

    info!(dir = %dir.display(), windows = record.windows().len(), "exported record tables");
    Ok(paths)
}
