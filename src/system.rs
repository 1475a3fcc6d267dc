//! Static system parameters: window sizing and thermal-unit commitment limits.

use serde::Deserialize;

/// A dispatchable unit subject to minimum up and down durations.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ThermalUnit {
    /// Unit identifier as it appears in solver variable names.
    pub id: String,
    /// Minimum number of hours the unit stays on after a startup (TU).
    pub min_up: u32,
    /// Minimum number of hours the unit stays off after a shutdown (TD).
    pub min_down: u32,
}

impl ThermalUnit {
    pub fn new(id: impl Into<String>, min_up: u32, min_down: u32) -> Self {
        Self {
            id: id.into(),
            min_up,
            min_down,
        }
    }
}

/// Parameters shared by the orchestrator and the extractor for one run.
///
/// # Examples
///
/// ```
/// use horizon_sim::system::{SystemParams, ThermalUnit};
///
/// let params = SystemParams::new("demo", 24, vec![ThermalUnit::new("coal_1", 5, 3)]);
/// assert_eq!(params.window_hours, 24);
/// assert_eq!(params.unit("coal_1").map(|u| u.min_up), Some(5));
/// ```
#[derive(Debug, Clone)]
pub struct SystemParams {
    /// Name of the modelled system, used in artifact names.
    pub model_name: String,
    /// Window length T in hours.
    pub window_hours: usize,
    /// Units whose commitment state is carried between windows.
    pub thermal_units: Vec<ThermalUnit>,
}

impl SystemParams {
    /// Creates system parameters.
    ///
    /// # Panics
    ///
    /// Panics if `window_hours` is zero.
    pub fn new(
        model_name: impl Into<String>,
        window_hours: usize,
        thermal_units: Vec<ThermalUnit>,
    ) -> Self {
        assert!(window_hours > 0, "window_hours must be > 0");
        Self {
            model_name: model_name.into(),
            window_hours,
            thermal_units,
        }
    }

    /// Looks up a thermal unit by identifier.
    pub fn unit(&self, id: &str) -> Option<&ThermalUnit> {
        self.thermal_units.iter().find(|u| u.id == id)
    }
}
