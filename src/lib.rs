pub mod analysis;
pub mod constants;
pub mod control;
pub mod errors;
pub mod telemetry_system;
pub mod trajectory_system;

pub use constants::*;
pub use control::deployment::{DeploymentSchedule, DeploymentTrigger};
pub use control::environment::PhysicalConstants;
pub use control::scenario::{Scenario, ScenarioFactory, TriggerConfig};
pub use errors::SimulationError;

// Re-export commonly used items from trajectory_system
pub use trajectory_system::aerodynamics::{
    reference_area_for_terminal_velocity, DragRegime, DragTable, Equipment, TerminalVelocities,
};
pub use trajectory_system::kinematics::{
    Integrator, SimulationState, StopReason, Trajectory, TrajectorySample,
};

// Re-export the scenario analyses
pub use analysis::canopy_sizing::{minimum_canopy_area, CanopySizing};
pub use analysis::density_sweep::{sweep_air_density, DensityRun};
pub use analysis::opening_altitude::{find_minimum_safe_opening, OpeningAltitude};

// Re-export commonly used items from telemetry_system
pub use telemetry_system::telemetry::Telemetry;
