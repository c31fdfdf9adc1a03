use std::path::Path;

use serde::Deserialize;

use crate::constants::{
    INITIAL_ALTITUDE, MAX_SIMULATION_TIME, OPENING_SEARCH_STEP, SAFE_LANDING_VELOCITY,
    SIZING_TOLERANCE, TIME_STEP,
};
use crate::control::deployment::{DeploymentSchedule, DeploymentTrigger};
use crate::control::environment::{require_non_negative, require_positive, PhysicalConstants};
use crate::errors::SimulationError;
use crate::trajectory_system::aerodynamics::{
    DragProfile, DragTable, Equipment, TerminalVelocities,
};
use crate::trajectory_system::kinematics::{Integrator, Trajectory};

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SimulationSettings {
    pub time_step: f64,
    pub max_time: f64,
    pub initial_altitude: f64,
}

impl Default for SimulationSettings {
    fn default() -> Self {
        SimulationSettings {
            time_step: TIME_STEP,
            max_time: MAX_SIMULATION_TIME,
            initial_altitude: INITIAL_ALTITUDE,
        }
    }
}

/// Trigger as written in a scenario file.
///
/// Either `equipment` or `area` must be present. An area without equipment
/// is matched against the reference canopy areas.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TriggerConfig {
    pub altitude: f64,
    #[serde(default)]
    pub equipment: Option<Equipment>,
    #[serde(default)]
    pub area: Option<f64>,
    #[serde(default)]
    pub drag_coefficient: Option<f64>,
}

impl TriggerConfig {
    pub fn new(altitude: f64, equipment: Equipment) -> Self {
        TriggerConfig {
            altitude,
            equipment: Some(equipment),
            area: None,
            drag_coefficient: None,
        }
    }

    pub fn resolve(&self, table: &DragTable) -> Result<DeploymentTrigger, SimulationError> {
        let equipment = match (self.equipment, self.area) {
            (Some(equipment), _) => equipment,
            (None, Some(area)) => table.classify(area),
            (None, None) => {
                return Err(SimulationError::ConfigurationError(format!(
                    "trigger at {} m needs an equipment or an area",
                    self.altitude
                )))
            }
        };
        let reference = table.profile(equipment);
        let drag_coefficient = self.drag_coefficient.unwrap_or(reference.drag_coefficient);
        let profile = match self.area {
            Some(area) => table.sized_profile(equipment, area, drag_coefficient),
            None => DragProfile {
                drag_coefficient,
                ..*reference
            },
        };

        Ok(DeploymentTrigger::new(self.altitude, equipment, profile))
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AnalysisSettings {
    pub safe_landing_velocity: f64,
    pub search_step: f64,
    pub densities: Vec<f64>,
    pub sizing_tolerance: f64,
}

impl Default for AnalysisSettings {
    fn default() -> Self {
        AnalysisSettings {
            safe_landing_velocity: SAFE_LANDING_VELOCITY,
            search_step: OPENING_SEARCH_STEP,
            densities: vec![1.225, 0.5, 2.0],
            sizing_tolerance: SIZING_TOLERANCE,
        }
    }
}

/// A complete jump description: constants, sizing targets, schedule and analysis settings.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Scenario {
    pub name: String,
    pub physics: PhysicalConstants,
    pub terminal_velocities: TerminalVelocities,
    pub simulation: SimulationSettings,
    pub triggers: Vec<TriggerConfig>,
    pub analysis: AnalysisSettings,
}

impl Default for Scenario {
    fn default() -> Self {
        ScenarioFactory::reference_jump()
    }
}

impl Scenario {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, SimulationError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    pub fn from_toml_str(contents: &str) -> Result<Self, SimulationError> {
        let scenario: Scenario = toml::from_str(contents)?;
        scenario.validate()?;
        Ok(scenario)
    }

    pub fn validate(&self) -> Result<(), SimulationError> {
        let table = self.drag_table()?;
        self.integrator_with(table)?;
        self.schedule_with(&table)?.validate()?;
        require_positive("initial_altitude", self.simulation.initial_altitude)?;
        require_positive("safe_landing_velocity", self.analysis.safe_landing_velocity)?;
        require_positive("search_step", self.analysis.search_step)?;
        require_positive("sizing_tolerance", self.analysis.sizing_tolerance)?;
        for &air_density in &self.analysis.densities {
            require_non_negative("analysis air_density", air_density)?;
        }
        Ok(())
    }

    pub fn drag_table(&self) -> Result<DragTable, SimulationError> {
        DragTable::from_terminal_velocities(&self.physics, &self.terminal_velocities)
    }

    pub fn integrator(&self) -> Result<Integrator, SimulationError> {
        self.integrator_with(self.drag_table()?)
    }

    fn integrator_with(&self, table: DragTable) -> Result<Integrator, SimulationError> {
        Integrator::new(
            self.physics,
            table,
            self.simulation.time_step,
            self.simulation.max_time,
        )
    }

    pub fn schedule(&self) -> Result<DeploymentSchedule, SimulationError> {
        self.schedule_with(&self.drag_table()?)
    }

    fn schedule_with(&self, table: &DragTable) -> Result<DeploymentSchedule, SimulationError> {
        let triggers = self
            .triggers
            .iter()
            .map(|trigger| trigger.resolve(table))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(DeploymentSchedule::new(triggers))
    }

    pub fn run(&self) -> Result<Trajectory, SimulationError> {
        let integrator = self.integrator()?;
        let schedule = self.schedule_with(&integrator.drag_table)?;
        integrator.simulate(self.simulation.initial_altitude, &schedule)
    }
}

pub struct ScenarioFactory;

impl ScenarioFactory {
    /// 1000 m exit, small canopy below 800 m, large canopy below 400 m.
    pub fn reference_jump() -> Scenario {
        Self::staged_jump(
            "Jump 1: 1000m -> 800m(S) -> 400m(L)",
            1000.0,
            vec![
                TriggerConfig::new(800.0, Equipment::SmallCanopy),
                TriggerConfig::new(400.0, Equipment::LargeCanopy),
            ],
        )
    }

    /// 800 m exit, small canopy below 600 m, large canopy below 500 m.
    pub fn second_jump() -> Scenario {
        Self::staged_jump(
            "Jump 2: 800m -> 600m(S) -> 500m(L)",
            800.0,
            vec![
                TriggerConfig::new(600.0, Equipment::SmallCanopy),
                TriggerConfig::new(500.0, Equipment::LargeCanopy),
            ],
        )
    }

    pub fn single_opening(initial_altitude: f64, opening_altitude: f64) -> Scenario {
        Self::staged_jump(
            &format!("Large canopy opened at {}m", opening_altitude),
            initial_altitude,
            vec![TriggerConfig::new(opening_altitude, Equipment::LargeCanopy)],
        )
    }

    /// Large canopy active from the exit altitude down; used for density comparisons.
    pub fn density_sweep_jump(initial_altitude: f64) -> Scenario {
        let mut scenario = Self::single_opening(initial_altitude, initial_altitude);
        scenario.name = "Fall in different media".to_string();
        scenario
    }

    pub fn staged_jump(name: &str, initial_altitude: f64, triggers: Vec<TriggerConfig>) -> Scenario {
        Scenario {
            name: name.to_string(),
            physics: PhysicalConstants::default(),
            terminal_velocities: TerminalVelocities::default(),
            simulation: SimulationSettings {
                initial_altitude,
                ..SimulationSettings::default()
            },
            triggers,
            analysis: AnalysisSettings::default(),
        }
    }
}
