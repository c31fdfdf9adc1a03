use crate::control::deployment::{DeploymentSchedule, DeploymentTrigger};
use crate::control::environment::require_positive;
use crate::errors::SimulationError;
use crate::trajectory_system::aerodynamics::{reference_area_for_terminal_velocity, Equipment};
use crate::trajectory_system::kinematics::Integrator;

const MAX_BRACKET_DOUBLINGS: u32 = 16;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CanopySizing {
    pub area: f64,
    pub landing_velocity: f64,
    /// Area from the quadratic-drag balance alone, before any simulation.
    pub closed_form_area: f64,
}

/// Smallest large-canopy area that lands a single-opening jump at or below `target_landing_velocity`.
///
/// Bisects on area between zero and an upper bound that starts at the
/// closed-form estimate and doubles until it is safe.
pub fn minimum_canopy_area(
    integrator: &Integrator,
    initial_altitude: f64,
    opening_altitude: f64,
    target_landing_velocity: f64,
    tolerance: f64,
) -> Result<CanopySizing, SimulationError> {
    require_positive("initial_altitude", initial_altitude)?;
    require_positive("target_landing_velocity", target_landing_velocity)?;
    require_positive("sizing_tolerance", tolerance)?;

    let closed_form_area = reference_area_for_terminal_velocity(
        &integrator.constants,
        target_landing_velocity,
        integrator.drag_table.large_canopy.drag_coefficient,
    );
    let landing_velocity =
        |area: f64| probe_landing_velocity(integrator, initial_altitude, opening_altitude, area);

    let at_zero = landing_velocity(0.0)?;
    if at_zero <= target_landing_velocity {
        return Ok(CanopySizing {
            area: 0.0,
            landing_velocity: at_zero,
            closed_form_area,
        });
    }

    let mut upper = closed_form_area;
    let mut upper_velocity = landing_velocity(upper)?;
    let mut doublings = 0;
    while upper_velocity > target_landing_velocity {
        if doublings == MAX_BRACKET_DOUBLINGS {
            return Err(SimulationError::AnalysisError(format!(
                "no canopy up to {:.2} m² lands at {} m/s when opened at {} m",
                upper, target_landing_velocity, opening_altitude
            )));
        }
        upper *= 2.0;
        upper_velocity = landing_velocity(upper)?;
        doublings += 1;
    }

    let mut lower = 0.0;
    while upper - lower > tolerance {
        let mid = 0.5 * (lower + upper);
        let mid_velocity = landing_velocity(mid)?;
        if mid_velocity <= target_landing_velocity {
            upper = mid;
            upper_velocity = mid_velocity;
        } else {
            lower = mid;
        }
    }

    Ok(CanopySizing {
        area: upper,
        landing_velocity: upper_velocity,
        closed_form_area,
    })
}

fn probe_landing_velocity(
    integrator: &Integrator,
    initial_altitude: f64,
    opening_altitude: f64,
    area: f64,
) -> Result<f64, SimulationError> {
    let schedule = DeploymentSchedule::new(vec![DeploymentTrigger::sized(
        opening_altitude,
        Equipment::LargeCanopy,
        area,
        &integrator.drag_table,
    )]);

    let trajectory = integrator.simulate(initial_altitude, &schedule)?;
    trajectory.landing_velocity().ok_or_else(|| {
        SimulationError::AnalysisError(format!(
            "time budget of {} s exhausted before touchdown with a {:.3} m² canopy",
            integrator.max_time, area
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::control::scenario::{ScenarioFactory, TriggerConfig};
    use approx::assert_abs_diff_eq;

    fn reference_integrator() -> Integrator {
        ScenarioFactory::reference_jump().integrator().unwrap()
    }

    #[test]
    fn test_sizing_for_ten_meters_per_second() {
        let integrator = reference_integrator();
        let sizing = minimum_canopy_area(&integrator, 1000.0, 400.0, 10.0, 1e-3).unwrap();

        assert!(sizing.landing_velocity <= 10.0);
        assert!(sizing.area < sizing.closed_form_area);
        assert!(
            sizing.area > 9.53 && sizing.area < 9.56,
            "area = {}",
            sizing.area
        );

        let smaller =
            probe_landing_velocity(&integrator, 1000.0, 400.0, sizing.area - 2e-3).unwrap();
        assert!(smaller > 10.0);
    }

    #[test]
    fn test_low_opening_needs_more_than_closed_form() {
        let integrator = reference_integrator();
        let sizing = minimum_canopy_area(&integrator, 1000.0, 20.0, 10.0, 1e-2).unwrap();

        assert!(sizing.area > sizing.closed_form_area);
        assert!(sizing.landing_velocity <= 10.0);
    }

    #[test]
    fn test_generous_target_needs_no_canopy() {
        let integrator = reference_integrator();
        let sizing = minimum_canopy_area(&integrator, 1000.0, 400.0, 500.0, 1e-3).unwrap();
        assert_eq!(sizing.area, 0.0);
    }

    #[test]
    fn test_opening_at_ground_cannot_be_sized() {
        let integrator = reference_integrator();
        let result = minimum_canopy_area(&integrator, 1000.0, 0.0, 10.0, 1e-3);
        assert!(matches!(result, Err(SimulationError::AnalysisError(_))));
    }

    #[test]
    fn test_sized_area_lands_the_same_from_a_scenario() {
        let integrator = reference_integrator();
        let sizing = minimum_canopy_area(&integrator, 1000.0, 400.0, 10.0, 1e-3).unwrap();

        let mut scenario = ScenarioFactory::single_opening(1000.0, 400.0);
        scenario.triggers = vec![TriggerConfig {
            area: Some(sizing.area),
            ..TriggerConfig::new(400.0, Equipment::LargeCanopy)
        }];
        let trajectory = scenario.run().unwrap();

        assert_abs_diff_eq!(
            trajectory.landing_velocity().unwrap(),
            sizing.landing_velocity,
            epsilon = 1e-12
        );
    }
}
