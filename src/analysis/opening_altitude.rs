use rayon::prelude::*;

use crate::control::deployment::{DeploymentSchedule, DeploymentTrigger};
use crate::control::environment::require_positive;
use crate::errors::SimulationError;
use crate::trajectory_system::aerodynamics::Equipment;
use crate::trajectory_system::kinematics::Integrator;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OpeningAltitude {
    pub altitude: f64,
    pub landing_velocity: f64,
}

const MAX_OPENING_CANDIDATES: usize = 100_000;

/// `0, step, 2·step, …` strictly below `initial_altitude`.
pub fn candidate_opening_altitudes(
    initial_altitude: f64,
    step: f64,
) -> Result<Vec<f64>, SimulationError> {
    require_positive("search_step", step)?;
    if !initial_altitude.is_finite() {
        return Err(SimulationError::ConfigurationError(format!(
            "initial altitude must be finite, got {}",
            initial_altitude
        )));
    }

    let count = (initial_altitude / step).ceil();
    if count > MAX_OPENING_CANDIDATES as f64 {
        return Err(SimulationError::ConfigurationError(format!(
            "search step {} m gives more than {} candidates below {} m",
            step, MAX_OPENING_CANDIDATES, initial_altitude
        )));
    }

    Ok((0..=MAX_OPENING_CANDIDATES)
        .map(|i| i as f64 * step)
        .take_while(|&altitude| altitude < initial_altitude)
        .collect())
}

/// Lowest large-canopy opening altitude whose landing velocity is within `safe_landing_velocity`.
///
/// Candidates are probed in parallel; the result is always the first safe
/// candidate in ascending order. Runs that exhaust the time budget never count
/// as safe. Returns `Ok(None)` when no candidate is safe.
pub fn find_minimum_safe_opening(
    integrator: &Integrator,
    initial_altitude: f64,
    step: f64,
    safe_landing_velocity: f64,
) -> Result<Option<OpeningAltitude>, SimulationError> {
    require_positive("initial_altitude", initial_altitude)?;
    require_positive("safe_landing_velocity", safe_landing_velocity)?;

    let candidates = candidate_opening_altitudes(initial_altitude, step)?;

    let found = candidates
        .par_iter()
        .map(|&altitude| probe_opening(integrator, initial_altitude, altitude))
        .find_first(|probe| match probe {
            Ok(Some(opening)) => opening.landing_velocity <= safe_landing_velocity,
            Ok(None) => false,
            Err(_) => true,
        });

    match found {
        Some(Ok(opening)) => Ok(opening),
        Some(Err(e)) => Err(e),
        None => Ok(None),
    }
}

fn probe_opening(
    integrator: &Integrator,
    initial_altitude: f64,
    opening_altitude: f64,
) -> Result<Option<OpeningAltitude>, SimulationError> {
    let schedule = DeploymentSchedule::new(vec![DeploymentTrigger::from_table(
        opening_altitude,
        Equipment::LargeCanopy,
        &integrator.drag_table,
    )]);
    let trajectory = integrator.simulate(initial_altitude, &schedule)?;

    Ok(trajectory
        .landing_velocity()
        .map(|landing_velocity| OpeningAltitude {
            altitude: opening_altitude,
            landing_velocity,
        }))
}
