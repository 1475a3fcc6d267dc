//! Solution extraction: raw solver output to history and next-window state.

use tracing::debug;

use super::naming::{self, ParsedVariable};
use super::noise::NoiseFilter;
use super::types::{InitialConditions, SimulationRecord, UnitHourMap, WindowBatch};
use crate::error::ExtractError;
use crate::solver::SolutionSource;
use crate::system::SystemParams;

/// Remaining hours of a minimum-duration commitment at the end of a window.
///
/// `events` holds one unit's `(local hour, value)` transition events
/// (startups for minimum up, shutdowns for minimum down). Hours the solver
/// left out count as no event. Only this window is inspected, so a
/// commitment longer than one window is not carried.
///
/// ```
/// use horizon_sim::record::extract::remaining_commitment;
///
/// assert_eq!(remaining_commitment([(0, 0.0), (20, 1.0), (23, 0.0)], 5, 24), 2);
/// assert_eq!(remaining_commitment([(20, 1.0)], 5, 24), 2);
/// assert_eq!(remaining_commitment([(7, 0.0)], 5, 24), 0);
/// ```
pub fn remaining_commitment(
    events: impl IntoIterator<Item = (usize, f64)>,
    min_duration: u32,
    window_hours: usize,
) -> u32 {
    let window = window_hours as i64;
    let last_event = events
        .into_iter()
        .filter(|(_, v)| *v != 0.0)
        .map(|(hour, _)| hour)
        .max();
    let hours_since_event = match last_event {
        Some(last) => window - (last as i64 + 1),
        None => window,
    };
    (i64::from(min_duration) - hours_since_event).max(0) as u32
}

/// Turns one window's solver output into records and next-window state.
#[derive(Debug, Clone)]
pub struct Extractor {
    params: SystemParams,
    filter: NoiseFilter,
}

impl Extractor {
    pub fn new(params: SystemParams, filter: NoiseFilter) -> Self {
        Self { params, filter }
    }

    pub fn params(&self) -> &SystemParams {
        &self.params
    }

    /// Ingests a solved window into `record` and returns the derived initial
    /// conditions for the next window.
    ///
    /// Steps: parse names, repair binary noise, derive state from local
    /// hours, shift onto the global timeline (`window * T`), zero-snap all
    /// families, append, and log the solve time. `record` is untouched when
    /// an error is returned.
    ///
    /// # Errors
    ///
    /// Returns an [`ExtractError`] when a name breaks the naming grammar,
    /// an hour lies outside the window, a thermal unit is missing from the
    /// state variables, or the window's global hour offset overflows.
    pub fn ingest(
        &self,
        solution: &dyn SolutionSource,
        window: usize,
        record: &mut SimulationRecord,
    ) -> Result<InitialConditions, ExtractError> {
        let window_hours = self.params.window_hours;
        let mut batch = WindowBatch::default();

        for (name, value) in solution.variables() {
            let parsed = naming::parse_variable(name, value)?;
            if parsed.hour() >= window_hours {
                return Err(ExtractError::HourOutOfWindow {
                    name: name.to_string(),
                    hour: parsed.hour(),
                    window_hours,
                });
            }
            match parsed {
                ParsedVariable::NodeTime(r) => batch.node_time.push(r),
                ParsedVariable::Flow(r) => batch.flows.push(r),
                ParsedVariable::SystemWide(r) => batch.system_wide.push(r),
            }
        }

        for r in &mut batch.node_time {
            if naming::is_binary_kind(&r.kind) {
                r.value = self.filter.binary(r.value);
            }
        }

        let conditions = self.derive_conditions(&batch)?;

        let offset = window
            .checked_mul(window_hours)
            .ok_or(ExtractError::OffsetOverflow {
                window,
                window_hours,
            })?;
        batch.shift_hours(offset);
        batch.map_values(|v| self.filter.zero(v));

        debug!(
            window,
            node_time = batch.node_time.len(),
            flows = batch.flows.len(),
            system_wide = batch.system_wide.len(),
            "ingested window"
        );

        record.append_window(window, batch);
        record.record_runtime(solution.runtime_secs());
        record.set_initial_conditions(conditions.clone());
        Ok(conditions)
    }

    fn derive_conditions(&self, batch: &WindowBatch) -> Result<InitialConditions, ExtractError> {
        let mut conditions = InitialConditions::default();
        for r in &batch.node_time {
            let slot = match r.kind.as_str() {
                naming::POWER => &mut conditions.power,
                naming::STATUS => &mut conditions.status,
                naming::STARTUP => &mut conditions.startup,
                naming::SHUTDOWN => &mut conditions.shutdown,
                _ => continue,
            };
            slot.insert((r.unit.clone(), r.hour), r.value);
        }

        let window_hours = self.params.window_hours;
        for unit in &self.params.thermal_units {
            let families: [(&'static str, &UnitHourMap); 4] = [
                (naming::POWER, &conditions.power),
                (naming::STATUS, &conditions.status),
                (naming::STARTUP, &conditions.startup),
                (naming::SHUTDOWN, &conditions.shutdown),
            ];
            for (kind, map) in families {
                if InitialConditions::trace(map, &unit.id).next().is_none() {
                    return Err(ExtractError::MissingUnit {
                        unit: unit.id.clone(),
                        kind,
                    });
                }
            }

            let min_on = remaining_commitment(
                InitialConditions::trace(&conditions.startup, &unit.id),
                unit.min_up,
                window_hours,
            );
            let min_off = remaining_commitment(
                InitialConditions::trace(&conditions.shutdown, &unit.id),
                unit.min_down,
                window_hours,
            );
            conditions.min_on.insert(unit.id.clone(), min_on);
            conditions.min_off.insert(unit.id.clone(), min_off);
        }
        Ok(conditions)
    }
}
