//! Reader for HiGHS raw solution files and writer for HiGHS option files.
//!
//! Only the header and the primal column section are read:
//!
//! ```text
//! Model status
//! Optimal
//!
//! # Primal solution values
//! Feasible
//! Objective 1520.5
//! # Columns 2
//! p[g1,0] 120
//! status[g1,0] 1
//! # Rows 1
//! ...
//! ```

use std::fmt::Write as _;

use super::{Infeasibility, SolutionSource, SolveOutcome, SolverOptions};
use crate::error::EngineError;

/// Parsed contents of a solution file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SolutionFile {
    pub model_status: String,
    /// `Feasible`, `Infeasible`, or `None`.
    pub primal_status: String,
    pub objective: Option<f64>,
    pub columns: Vec<(String, f64)>,
}

impl SolutionFile {
    /// Returns `true` when the solver proved the model infeasible.
    pub fn is_infeasible(&self) -> bool {
        self.model_status.eq_ignore_ascii_case("infeasible")
    }

    /// Returns `true` when the file carries a feasible primal solution.
    pub fn has_primal_solution(&self) -> bool {
        self.primal_status.eq_ignore_ascii_case("feasible")
    }
}

fn format_error(line: usize, message: impl Into<String>) -> EngineError {
    EngineError::SolutionFormat {
        line,
        message: message.into(),
    }
}

/// Parses a HiGHS raw solution file.
///
/// # Errors
///
/// Returns [`EngineError::SolutionFormat`] when the model status is missing,
/// a column line is malformed, or fewer columns follow than announced.
pub fn parse_solution(text: &str) -> Result<SolutionFile, EngineError> {
    let mut lines = text.lines().enumerate().map(|(i, l)| (i + 1, l.trim()));
    let mut file = SolutionFile::default();
    let mut saw_status = false;

    while let Some((no, line)) = lines.next() {
        if line == "Model status" {
            let (_, status) = lines
                .by_ref()
                .find(|(_, l)| !l.is_empty())
                .ok_or_else(|| format_error(no, "missing model status value"))?;
            file.model_status = status.to_string();
            saw_status = true;
        } else if let Some(status) = line.strip_prefix("Model status:") {
            file.model_status = status.trim().to_string();
            saw_status = true;
        } else if line == "# Primal solution values" {
            let (_, status) = lines
                .next()
                .ok_or_else(|| format_error(no, "missing primal solution status"))?;
            file.primal_status = status.to_string();
        } else if let Some(obj) = line.strip_prefix("Objective") {
            let obj = obj.trim();
            file.objective = Some(
                obj.parse()
                    .map_err(|_| format_error(no, format!("invalid objective `{obj}`")))?,
            );
        } else if let Some(count) = line.strip_prefix("# Columns") {
            let count: usize = count
                .trim()
                .parse()
                .map_err(|_| format_error(no, format!("invalid column count `{}`", count.trim())))?;
            file.columns.reserve(count);
            for _ in 0..count {
                let (col_no, col) = lines
                    .next()
                    .ok_or_else(|| format_error(no, format!("expected {count} columns")))?;
                file.columns.push(parse_column(col_no, col)?);
            }
        } else if line.starts_with("# Rows") || line == "# Dual solution values" {
            break;
        }
    }

    if !saw_status {
        return Err(format_error(1, "missing `Model status` header"));
    }
    Ok(file)
}

fn parse_column(no: usize, line: &str) -> Result<(String, f64), EngineError> {
    let mut parts = line.split_whitespace();
    match (parts.next(), parts.next(), parts.next()) {
        (Some(name), Some(value), None) => {
            let value = value
                .parse::<f64>()
                .map_err(|_| format_error(no, format!("invalid value `{value}` for `{name}`")))?;
            Ok((name.to_string(), value))
        }
        _ => Err(format_error(no, format!("expected `name value`, got `{line}`"))),
    }
}

/// Solution read back from a HiGHS solution file.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnSolution {
    file: SolutionFile,
    runtime_secs: f64,
}

impl ColumnSolution {
    pub fn model_status(&self) -> &str {
        &self.file.model_status
    }

    pub fn objective(&self) -> Option<f64> {
        self.file.objective
    }

    pub fn num_columns(&self) -> usize {
        self.file.columns.len()
    }
}

impl SolutionSource for ColumnSolution {
    fn variables(&self) -> Box<dyn Iterator<Item = (&str, f64)> + '_> {
        Box::new(self.file.columns.iter().map(|(n, v)| (n.as_str(), *v)))
    }

    fn runtime_secs(&self) -> f64 {
        self.runtime_secs
    }
}

/// Classifies a parsed solution file.
///
/// `certificate` is only evaluated for infeasible models.
///
/// # Errors
///
/// Returns [`EngineError::NoSolution`] when the solve neither proved
/// infeasibility nor produced a feasible point (e.g. time limit without an
/// incumbent).
pub fn into_outcome(
    file: SolutionFile,
    runtime_secs: f64,
    certificate: impl FnOnce() -> String,
) -> Result<SolveOutcome<ColumnSolution>, EngineError> {
    if file.is_infeasible() {
        return Ok(SolveOutcome::Infeasible(Infeasibility {
            runtime_secs,
            certificate: certificate(),
        }));
    }
    if !file.has_primal_solution() {
        return Err(EngineError::NoSolution {
            status: file.model_status,
        });
    }
    Ok(SolveOutcome::Solved(ColumnSolution { file, runtime_secs }))
}

/// Renders a HiGHS options file for the given limits.
///
/// Always requests the raw solution style read by [`parse_solution`].
pub fn options_file(options: &SolverOptions) -> String {
    let mut out = String::from("write_solution_style = 0\n");
    if let Some(gap) = options.mip_gap {
        let _ = writeln!(out, "mip_rel_gap = {gap}");
    }
    if let Some(limit) = options.time_limit_secs {
        let _ = writeln!(out, "time_limit = {limit}");
    }
    out
}
