// posefuse_sim/src/prelude.rs

// Re-export the entire posefuse_core prelude so drivers can reach the
// estimators and message types through one import.
pub use posefuse_core::prelude::*;

// Re-export common simulation-specific types.
pub use crate::cli::Cli;
pub use crate::error::{Result, SimError};
pub use crate::simulation::config::{
    discover_scenarios, load_scenario, to_toml, CameraConfig, ImuConfig, MotionProfile,
    ScenarioConfig, Simulation,
};
pub use crate::simulation::core::prng::SimulationRng;
pub use crate::simulation::debugging::state_error::{PoseError, StateErrorReport};
pub use crate::simulation::runner::{run_scenario, CameraStats, RunSummary};
pub use crate::simulation::sensors::{CameraFrame, SyntheticCamera, SyntheticImu};
