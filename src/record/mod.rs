pub mod extract;
pub mod naming;
/// Numerical-noise repair of solver values.
pub mod noise;
pub mod types;

pub use extract::Extractor;
pub use noise::NoiseFilter;
pub use types::{
    FlowRecord, InitialConditionRow, InitialConditions, NodeTimeRecord, RuntimeLog,
    SimulationRecord, SystemWideRecord,
};
