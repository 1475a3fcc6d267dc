//! Variable naming grammar shared with the model builder.
//!
//! Every solver variable is named `kind[arg1,arg2,...]`. The kind decides the
//! arity:
//!
//! | kind       | arguments          | family       |
//! |------------|--------------------|--------------|
//! | `flow`     | `(from, to, hour)` | flow         |
//! | `sys_spin` | `(hour)`           | system-wide  |
//! | any other  | `(unit, hour)`     | node-time    |
//!
//! Hours are non-negative integers local to the window.

use super::types::{FlowRecord, NodeTimeRecord, SystemWideRecord};
use crate::error::ExtractError;

/// Unit power output.
pub const POWER: &str = "p";
/// Unit on/off status.
pub const STATUS: &str = "status";
/// Unit startup event.
pub const STARTUP: &str = "start";
/// Unit shutdown event.
pub const SHUTDOWN: &str = "shut";
/// Line flow between two nodes.
pub const FLOW: &str = "flow";
/// System-wide spinning reserve.
pub const SYSTEM_RESERVE: &str = "sys_spin";

/// Unit-indexed kinds that are nominally binary.
pub const BINARY_KINDS: [&str; 3] = [STATUS, STARTUP, SHUTDOWN];

/// A parsed solver variable, already sorted into its record family.
#[derive(Debug, Clone, PartialEq)]
pub enum ParsedVariable {
    NodeTime(NodeTimeRecord),
    Flow(FlowRecord),
    SystemWide(SystemWideRecord),
}

impl ParsedVariable {
    /// Local hour index of the variable.
    pub fn hour(&self) -> usize {
        match self {
            Self::NodeTime(r) => r.hour,
            Self::Flow(r) => r.hour,
            Self::SystemWide(r) => r.hour,
        }
    }
}

/// Number of bracketed arguments a kind takes.
pub fn arity(kind: &str) -> usize {
    match kind {
        FLOW => 3,
        SYSTEM_RESERVE => 1,
        _ => 2,
    }
}

/// Returns `true` for the kinds repaired toward 0 or 1.
pub fn is_binary_kind(kind: &str) -> bool {
    BINARY_KINDS.contains(&kind)
}

/// Parses one `name = value` pair reported by the solver.
///
/// # Errors
///
/// Returns [`ExtractError::MalformedName`] when the name does not follow the
/// grammar or has the wrong number of arguments for its kind.
///
/// # Examples
///
/// ```
/// use horizon_sim::record::naming::{ParsedVariable, parse_variable};
///
/// let parsed = parse_variable("flow[bus_a,bus_b,7]", 12.5).unwrap();
/// assert!(matches!(parsed, ParsedVariable::Flow(ref f) if f.to_node == "bus_b" && f.hour == 7));
/// assert!(parse_variable("p[g1]", 1.0).is_err());
/// ```
pub fn parse_variable(name: &str, value: f64) -> Result<ParsedVariable, ExtractError> {
    let malformed = |reason: String| ExtractError::MalformedName {
        name: name.to_string(),
        reason,
    };

    let (kind, rest) = name
        .split_once('[')
        .ok_or_else(|| malformed("missing `[`".to_string()))?;
    let inner = rest
        .strip_suffix(']')
        .ok_or_else(|| malformed("missing closing `]`".to_string()))?;

    if kind.is_empty() || !kind.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return Err(malformed(format!("invalid kind `{kind}`")));
    }
    if inner.contains(['[', ']']) {
        return Err(malformed("nested brackets".to_string()));
    }

    let args: Vec<&str> = inner.split(',').map(str::trim).collect();
    if args.iter().any(|a| a.is_empty()) {
        return Err(malformed("empty argument".to_string()));
    }
    let expected = arity(kind);
    if args.len() != expected {
        return Err(malformed(format!(
            "`{kind}` takes {expected} argument(s), got {}",
            args.len()
        )));
    }

    let hour_arg = args[expected - 1];
    let hour = hour_arg
        .parse::<usize>()
        .map_err(|_| malformed(format!("hour `{hour_arg}` is not a non-negative integer")))?;

    Ok(match kind {
        FLOW => ParsedVariable::Flow(FlowRecord {
            from_node: args[0].to_string(),
            to_node: args[1].to_string(),
            hour,
            value,
        }),
        SYSTEM_RESERVE => ParsedVariable::SystemWide(SystemWideRecord {
            kind: kind.to_string(),
            hour,
            value,
        }),
        _ => ParsedVariable::NodeTime(NodeTimeRecord {
            kind: kind.to_string(),
            unit: args[0].to_string(),
            hour,
            value,
        }),
    })
}
