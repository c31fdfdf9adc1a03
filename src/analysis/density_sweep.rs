use rayon::prelude::*;

use crate::control::deployment::DeploymentSchedule;
use crate::errors::SimulationError;
use crate::trajectory_system::kinematics::{Integrator, Trajectory};

#[derive(Debug, Clone, PartialEq)]
pub struct DensityRun {
    pub air_density: f64,
    pub trajectory: Trajectory,
    /// Analytic terminal velocity of the regime active at the last sample.
    pub terminal_velocity: f64,
}

impl DensityRun {
    pub fn late_time_velocity(&self) -> f64 {
        self.trajectory.final_sample().velocity
    }
}

/// One independent run per density, returned in the order given.
pub fn sweep_air_density(
    integrator: &Integrator,
    initial_altitude: f64,
    schedule: &DeploymentSchedule,
    densities: &[f64],
) -> Result<Vec<DensityRun>, SimulationError> {
    densities
        .par_iter()
        .map(|&air_density| -> Result<DensityRun, SimulationError> {
            let snapshot = integrator.with_air_density(air_density)?;
            let trajectory = snapshot.simulate(initial_altitude, schedule)?;
            let terminal_velocity = snapshot
                .select_regime(trajectory.final_sample().height, schedule)
                .terminal_velocity(snapshot.constants.mass, snapshot.constants.gravity);

            Ok(DensityRun {
                air_density,
                trajectory,
                terminal_velocity,
            })
        })
        .collect()
}
