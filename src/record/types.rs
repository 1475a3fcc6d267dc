//! Record families, initial conditions, and the accumulated simulation record.

use std::collections::BTreeMap;

use serde::Serialize;

/// One unit-hour value of a unit-indexed variable (`p`, `status`, `start`, `shut`, ...).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NodeTimeRecord {
    pub kind: String,
    pub unit: String,
    pub hour: usize,
    pub value: f64,
}

/// One hourly value of a line flow between two nodes.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FlowRecord {
    pub from_node: String,
    pub to_node: String,
    pub hour: usize,
    pub value: f64,
}

/// One hourly value of a system-wide variable such as reserve.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SystemWideRecord {
    pub kind: String,
    pub hour: usize,
    pub value: f64,
}

/// Values keyed by `(unit, local hour)`.
pub type UnitHourMap = BTreeMap<(String, usize), f64>;

/// State handed from one window to the next.
///
/// Per-hour maps use the local hour indices of the window they were derived
/// from. The remaining-commitment maps hold whole hours.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InitialConditions {
    pub power: UnitHourMap,
    pub status: UnitHourMap,
    pub startup: UnitHourMap,
    pub shutdown: UnitHourMap,
    pub min_on: BTreeMap<String, u32>,
    pub min_off: BTreeMap<String, u32>,
}

/// Flattened row of [`InitialConditions`] for persistence.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InitialConditionRow {
    pub variable: &'static str,
    pub unit: String,
    /// Local hour; `None` for the remaining-commitment rows.
    pub hour: Option<usize>,
    pub value: f64,
}

impl InitialConditions {
    /// Returns `true` when no state has been derived yet (before window 0).
    pub fn is_empty(&self) -> bool {
        self.power.is_empty()
            && self.status.is_empty()
            && self.startup.is_empty()
            && self.shutdown.is_empty()
            && self.min_on.is_empty()
            && self.min_off.is_empty()
    }

    /// `(hour, value)` pairs of `map` for `unit`, ordered by local hour.
    pub fn trace<'a>(map: &'a UnitHourMap, unit: &'a str) -> impl Iterator<Item = (usize, f64)> + 'a {
        map.iter()
            .filter(move |((u, _), _)| u == unit)
            .map(|((_, hour), v)| (*hour, *v))
    }

    /// Flattens every map into `{variable, unit, hour, value}` rows.
    pub fn to_rows(&self) -> Vec<InitialConditionRow> {
        let hourly = [
            ("initial_p", &self.power),
            ("initial_u", &self.status),
            ("initial_v", &self.startup),
            ("initial_w", &self.shutdown),
        ];
        let remaining = [("initial_min_on", &self.min_on), ("initial_min_off", &self.min_off)];

        let mut rows = Vec::new();
        for (variable, map) in hourly {
            rows.extend(map.iter().map(|((unit, hour), value)| InitialConditionRow {
                variable,
                unit: unit.clone(),
                hour: Some(*hour),
                value: *value,
            }));
        }
        for (variable, map) in remaining {
            rows.extend(map.iter().map(|(unit, hours)| InitialConditionRow {
                variable,
                unit: unit.clone(),
                hour: None,
                value: f64::from(*hours),
            }));
        }
        rows
    }
}

/// Per-window solve times in seconds, in solve order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct RuntimeLog(Vec<f64>);

impl RuntimeLog {
    pub fn push(&mut self, seconds: f64) {
        self.0.push(seconds);
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    pub fn total_secs(&self) -> f64 {
        self.0.iter().sum()
    }

    pub fn mean_secs(&self) -> f64 {
        if self.0.is_empty() {
            0.0
        } else {
            self.total_secs() / self.0.len() as f64
        }
    }

    pub fn max_secs(&self) -> f64 {
        self.0.iter().copied().fold(0.0, f64::max)
    }
}

/// Records of one solved window, already on the global timeline.
#[derive(Debug, Clone, Default)]
pub struct WindowBatch {
    pub node_time: Vec<NodeTimeRecord>,
    pub flows: Vec<FlowRecord>,
    pub system_wide: Vec<SystemWideRecord>,
}

impl WindowBatch {
    /// Moves every record from local hours onto the global timeline.
    pub fn shift_hours(&mut self, offset: usize) {
        self.node_time.iter_mut().for_each(|r| r.hour += offset);
        self.flows.iter_mut().for_each(|r| r.hour += offset);
        self.system_wide.iter_mut().for_each(|r| r.hour += offset);
    }

    /// Applies `f` to every value in all three families.
    pub fn map_values(&mut self, f: impl Fn(f64) -> f64) {
        self.node_time.iter_mut().for_each(|r| r.value = f(r.value));
        self.flows.iter_mut().for_each(|r| r.value = f(r.value));
        self.system_wide.iter_mut().for_each(|r| r.value = f(r.value));
    }
}

/// Append-only history of a run plus its runtime log.
///
/// Owned by one orchestrator run. Records are only ever appended; the hour
/// field is global (`local hour + window index * T`).
#[derive(Debug, Clone, Default, Serialize)]
pub struct SimulationRecord {
    window_hours: usize,
    windows: Vec<usize>,
    node_time: Vec<NodeTimeRecord>,
    flows: Vec<FlowRecord>,
    system_wide: Vec<SystemWideRecord>,
    runtimes: RuntimeLog,
    #[serde(skip)]
    initial_conditions: Option<InitialConditions>,
}

impl SimulationRecord {
    pub fn new(window_hours: usize) -> Self {
        Self {
            window_hours,
            ..Self::default()
        }
    }

    /// Appends one window's records, already shifted onto the global timeline.
    pub fn append_window(&mut self, window: usize, batch: WindowBatch) {
        self.windows.push(window);
        self.node_time.extend(batch.node_time);
        self.flows.extend(batch.flows);
        self.system_wide.extend(batch.system_wide);
    }

    /// Appends one solve time, whether or not the window was feasible.
    pub fn record_runtime(&mut self, seconds: f64) {
        self.runtimes.push(seconds);
    }

    /// Stores the most recently derived initial conditions.
    pub fn set_initial_conditions(&mut self, conditions: InitialConditions) {
        self.initial_conditions = Some(conditions);
    }

    pub fn window_hours(&self) -> usize {
        self.window_hours
    }

    /// Indices of the windows whose records were appended, in order.
    pub fn windows(&self) -> &[usize] {
        &self.windows
    }

    pub fn node_variables(&self) -> &[NodeTimeRecord] {
        &self.node_time
    }

    pub fn flow_variables(&self) -> &[FlowRecord] {
        &self.flows
    }

    pub fn system_variables(&self) -> &[SystemWideRecord] {
        &self.system_wide
    }

    pub fn runtimes(&self) -> &RuntimeLog {
        &self.runtimes
    }

    pub fn initial_conditions(&self) -> Option<&InitialConditions> {
        self.initial_conditions.as_ref()
    }

    /// Flattened initial conditions of the last solved window.
    pub fn initial_condition_rows(&self) -> Vec<InitialConditionRow> {
        self.initial_conditions
            .as_ref()
            .map(InitialConditions::to_rows)
            .unwrap_or_default()
    }

    /// Distinct global hours present in the node-time family, ascending.
    pub fn hours(&self) -> Vec<usize> {
        let mut hours: Vec<usize> = self.node_time.iter().map(|r| r.hour).collect();
        hours.sort_unstable();
        hours.dedup();
        hours
    }
}
