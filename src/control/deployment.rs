use crate::control::environment::require_non_negative;
use crate::errors::SimulationError;
use crate::trajectory_system::aerodynamics::{
    quadratic_drag_coefficient, DragProfile, DragRegime, DragTable, Equipment,
};

/// Altitude below which the given equipment is deployed, with the drag data it deploys with.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DeploymentTrigger {
    pub altitude: f64,
    pub equipment: Equipment,
    pub reference_area: f64,
    pub drag_coefficient: f64,
    pub linear_coefficient: f64,
}

impl DeploymentTrigger {
    pub fn new(altitude: f64, equipment: Equipment, profile: DragProfile) -> Self {
        DeploymentTrigger {
            altitude,
            equipment,
            reference_area: profile.reference_area,
            drag_coefficient: profile.drag_coefficient,
            linear_coefficient: profile.linear_coefficient,
        }
    }

    /// Trigger using the reference profile of `equipment`.
    pub fn from_table(altitude: f64, equipment: Equipment, table: &DragTable) -> Self {
        DeploymentTrigger::new(altitude, equipment, *table.profile(equipment))
    }

    /// Trigger deploying `equipment` at a non-reference `area`.
    pub fn sized(altitude: f64, equipment: Equipment, area: f64, table: &DragTable) -> Self {
        let drag_coefficient = table.profile(equipment).drag_coefficient;
        DeploymentTrigger::new(
            altitude,
            equipment,
            table.sized_profile(equipment, area, drag_coefficient),
        )
    }
}

/// Staged deployment plan, kept sorted by ascending trigger altitude.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DeploymentSchedule {
    triggers: Vec<DeploymentTrigger>,
}

impl DeploymentSchedule {
    pub fn new(mut triggers: Vec<DeploymentTrigger>) -> Self {
        // stable: equal altitudes keep their input order
        triggers.sort_by(|a, b| a.altitude.total_cmp(&b.altitude));
        DeploymentSchedule { triggers }
    }

    pub fn free_fall() -> Self {
        DeploymentSchedule::default()
    }

    pub fn triggers(&self) -> &[DeploymentTrigger] {
        &self.triggers
    }

    pub fn is_empty(&self) -> bool {
        self.triggers.is_empty()
    }

    pub fn validate(&self) -> Result<(), SimulationError> {
        for trigger in &self.triggers {
            if !trigger.altitude.is_finite() {
                return Err(SimulationError::InitializationError(format!(
                    "trigger altitude must be finite, got {}",
                    trigger.altitude
                )));
            }
            require_non_negative("trigger reference area", trigger.reference_area)?;
            require_non_negative("trigger drag coefficient", trigger.drag_coefficient)?;
            require_non_negative("trigger linear coefficient", trigger.linear_coefficient)?;
        }
        Ok(())
    }

    /// Lowest trigger lying strictly above `height`, i.e. the last one passed on the way down.
    pub fn active_trigger(&self, height: f64) -> Option<&DeploymentTrigger> {
        self.triggers.iter().find(|trigger| height < trigger.altitude)
    }

    /// Drag regime in effect at `height`. Falls back to the body profile above every trigger.
    pub fn select_regime(&self, height: f64, table: &DragTable, air_density: f64) -> DragRegime {
        match self.active_trigger(height) {
            Some(trigger) => DragRegime {
                equipment: trigger.equipment,
                linear_coefficient: trigger.linear_coefficient,
                quadratic_coefficient: quadratic_drag_coefficient(
                    trigger.drag_coefficient,
                    air_density,
                    trigger.reference_area,
                ),
            },
            None => DragRegime {
                equipment: Equipment::Body,
                linear_coefficient: table.body.linear_coefficient,
                quadratic_coefficient: table.body.quadratic_coefficient(air_density),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::control::environment::PhysicalConstants;
    use crate::trajectory_system::aerodynamics::TerminalVelocities;
    use approx::assert_relative_eq;
    use rand::rngs::StdRng;
    use rand::seq::SliceRandom;
    use rand::SeedableRng;

    const RHO: f64 = 1.225;

    fn table() -> DragTable {
        DragTable::from_terminal_velocities(
            &PhysicalConstants::default(),
            &TerminalVelocities::default(),
        )
        .unwrap()
    }

    fn two_stage(table: &DragTable) -> DeploymentSchedule {
        DeploymentSchedule::new(vec![
            DeploymentTrigger::from_table(800.0, Equipment::SmallCanopy, table),
            DeploymentTrigger::from_table(400.0, Equipment::LargeCanopy, table),
        ])
    }

    #[test]
    fn test_schedule_sorted_ascending() {
        let table = table();
        let schedule = two_stage(&table);
        let altitudes: Vec<f64> = schedule.triggers().iter().map(|t| t.altitude).collect();
        assert_eq!(altitudes, vec![400.0, 800.0]);
    }

    #[test]
    fn test_body_regime_above_all_triggers() {
        let table = table();
        let regime = two_stage(&table).select_regime(950.0, &table, RHO);

        assert_eq!(regime.equipment, Equipment::Body);
        assert_eq!(regime.linear_coefficient, table.body.linear_coefficient);
        assert_relative_eq!(
            regime.quadratic_coefficient,
            0.5 * 1.0 * RHO * table.body.reference_area,
            epsilon = 1e-12
        );
    }

    #[test]
    fn test_staged_selection() {
        let table = table();
        let schedule = two_stage(&table);

        let small = schedule.select_regime(700.0, &table, RHO);
        assert_eq!(small.equipment, Equipment::SmallCanopy);
        assert_eq!(
            small.linear_coefficient,
            table.small_canopy.linear_coefficient
        );

        let large = schedule.select_regime(300.0, &table, RHO);
        assert_eq!(large.equipment, Equipment::LargeCanopy);
        assert_relative_eq!(
            large.quadratic_coefficient,
            0.5 * 1.5 * RHO * table.large_canopy.reference_area,
            epsilon = 1e-12
        );
    }

    #[test]
    fn test_threshold_is_strict() {
        let table = table();
        let schedule = two_stage(&table);

        assert_eq!(
            schedule.select_regime(800.0, &table, RHO).equipment,
            Equipment::Body
        );
        assert_eq!(
            schedule.select_regime(400.0, &table, RHO).equipment,
            Equipment::SmallCanopy
        );
        assert_eq!(
            schedule.select_regime(399.999, &table, RHO).equipment,
            Equipment::LargeCanopy
        );
    }

    #[test]
    fn test_empty_schedule_is_free_fall() {
        let table = table();
        let regime = DeploymentSchedule::free_fall().select_regime(10.0, &table, RHO);
        assert_eq!(regime.equipment, Equipment::Body);
    }

    #[test]
    fn test_tied_thresholds_keep_input_order() {
        let table = table();
        let schedule = DeploymentSchedule::new(vec![
            DeploymentTrigger::from_table(500.0, Equipment::LargeCanopy, &table),
            DeploymentTrigger::from_table(500.0, Equipment::SmallCanopy, &table),
        ]);

        assert_eq!(
            schedule.select_regime(100.0, &table, RHO).equipment,
            Equipment::LargeCanopy
        );
    }

    #[test]
    fn test_selection_is_pure() {
        let table = table();
        let schedule = two_stage(&table);

        let first = schedule.select_regime(612.3, &table, RHO);
        let second = schedule.select_regime(612.3, &table, RHO);
        assert_eq!(first, second);
    }

    #[test]
    fn test_selection_independent_of_input_order() {
        let table = table();
        let mut triggers = vec![
            DeploymentTrigger::from_table(900.0, Equipment::SmallCanopy, &table),
            DeploymentTrigger::from_table(650.0, Equipment::LargeCanopy, &table),
            DeploymentTrigger::from_table(420.0, Equipment::SmallCanopy, &table),
            DeploymentTrigger::from_table(150.0, Equipment::LargeCanopy, &table),
        ];
        let reference = DeploymentSchedule::new(triggers.clone());
        let mut rng = StdRng::seed_from_u64(7);

        for _ in 0..20 {
            triggers.shuffle(&mut rng);
            let shuffled = DeploymentSchedule::new(triggers.clone());
            for height in [1000.0, 899.0, 650.0, 500.0, 300.0, 100.0, 0.0] {
                assert_eq!(
                    shuffled.select_regime(height, &table, RHO),
                    reference.select_regime(height, &table, RHO)
                );
            }
        }
    }

    #[test]
    fn test_density_scales_quadratic_term_only() {
        let table = table();
        let schedule = two_stage(&table);

        let dense = schedule.select_regime(300.0, &table, 2.0);
        let thin = schedule.select_regime(300.0, &table, 1.0);
        assert_eq!(dense.linear_coefficient, thin.linear_coefficient);
        assert_relative_eq!(
            dense.quadratic_coefficient,
            2.0 * thin.quadratic_coefficient,
            epsilon = 1e-12
        );
    }

    #[test]
    fn test_validate_rejects_negative_area() {
        let schedule = DeploymentSchedule::new(vec![DeploymentTrigger::new(
            300.0,
            Equipment::LargeCanopy,
            DragProfile {
                reference_area: -1.0,
                drag_coefficient: 1.5,
                linear_coefficient: 0.75,
            },
        )]);
        assert!(schedule.validate().is_err());
    }

    #[test]
    fn test_sized_trigger_carries_its_own_linear_coefficient() {
        let table = table();
        let schedule = DeploymentSchedule::new(vec![DeploymentTrigger::sized(
            400.0,
            Equipment::LargeCanopy,
            30.0,
            &table,
        )]);

        let regime = schedule.select_regime(300.0, &table, RHO);
        assert_relative_eq!(regime.linear_coefficient, 1.0601277482554117, epsilon = 1e-12);
        assert_relative_eq!(
            regime.quadratic_coefficient,
            0.5 * 1.5 * RHO * 30.0,
            epsilon = 1e-12
        );
        assert!(regime.linear_coefficient > table.large_canopy.linear_coefficient);
    }
}
