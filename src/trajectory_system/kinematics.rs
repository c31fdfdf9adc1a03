use crate::control::deployment::DeploymentSchedule;
use crate::control::environment::{require_non_negative, require_positive, PhysicalConstants};
use crate::errors::SimulationError;
use crate::trajectory_system::aerodynamics::{DragRegime, DragTable, Equipment};

// Upper bound on up-front sample allocation; longer runs grow the vector.
const MAX_PREALLOCATED_SAMPLES: usize = 1 << 20;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimulationState {
    pub time: f64,
    pub height: f64,
    pub velocity: f64,
}

impl SimulationState {
    pub fn at_rest(height: f64) -> Self {
        SimulationState {
            time: 0.0,
            height,
            velocity: 0.0,
        }
    }
}

/// One point of the output series. `equipment` is the regime that produced it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrajectorySample {
    pub time: f64,
    pub height: f64,
    pub velocity: f64,
    pub equipment: Equipment,
}

impl TrajectorySample {
    fn from_state(state: &SimulationState, equipment: Equipment) -> Self {
        TrajectorySample {
            time: state.time,
            height: state.height,
            velocity: state.velocity,
            equipment,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    Touchdown,
    TimeBudgetExhausted,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Trajectory {
    samples: Vec<TrajectorySample>,
    stop_reason: StopReason,
}

impl Trajectory {
    pub fn samples(&self) -> &[TrajectorySample] {
        &self.samples
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn stop_reason(&self) -> StopReason {
        self.stop_reason
    }

    pub fn touched_down(&self) -> bool {
        self.stop_reason == StopReason::Touchdown
    }

    // the series always holds at least the initial sample
    pub fn final_sample(&self) -> &TrajectorySample {
        &self.samples[self.samples.len() - 1]
    }

    /// Velocity at touchdown, `None` if the time budget ran out first.
    pub fn landing_velocity(&self) -> Option<f64> {
        if self.touched_down() {
            Some(self.final_sample().velocity)
        } else {
            None
        }
    }

    pub fn flight_time(&self) -> f64 {
        self.final_sample().time
    }

    pub fn max_velocity(&self) -> f64 {
        self.samples
            .iter()
            .map(|sample| sample.velocity)
            .fold(0.0, f64::max)
    }

    pub fn heights(&self) -> impl Iterator<Item = f64> + '_ {
        self.samples.iter().map(|sample| sample.height)
    }

    pub fn velocities(&self) -> impl Iterator<Item = f64> + '_ {
        self.samples.iter().map(|sample| sample.velocity)
    }
}

/// Fixed-step semi-implicit Euler integrator for a vertical descent.
///
/// The integrator owns an immutable snapshot of the physical constants, so
/// independent runs with different air densities can execute concurrently.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Integrator {
    pub constants: PhysicalConstants,
    pub drag_table: DragTable,
    pub time_step: f64,
    pub max_time: f64,
}

impl Integrator {
    pub fn new(
        constants: PhysicalConstants,
        drag_table: DragTable,
        time_step: f64,
        max_time: f64,
    ) -> Result<Self, SimulationError> {
        constants.validate()?;
        require_positive("time_step", time_step)?;
        require_positive("max_time", max_time)?;

        Ok(Integrator {
            constants,
            drag_table,
            time_step,
            max_time,
        })
    }

    /// Same integrator with a different air density. Reference areas are left as sized.
    pub fn with_air_density(&self, air_density: f64) -> Result<Self, SimulationError> {
        require_non_negative("air_density", air_density)?;
        Ok(Integrator {
            constants: self.constants.with_air_density(air_density),
            ..*self
        })
    }

    pub fn select_regime(&self, height: f64, schedule: &DeploymentSchedule) -> DragRegime {
        schedule.select_regime(height, &self.drag_table, self.constants.air_density)
    }

    /// Integrate from rest at `initial_height` until touchdown or `max_time`.
    pub fn simulate(
        &self,
        initial_height: f64,
        schedule: &DeploymentSchedule,
    ) -> Result<Trajectory, SimulationError> {
        require_positive("initial_height", initial_height)?;
        schedule.validate()?;

        let capacity = ((self.max_time / self.time_step).ceil() as usize)
            .saturating_add(2)
            .min(MAX_PREALLOCATED_SAMPLES);
        let mut samples = Vec::with_capacity(capacity);

        let mut state = SimulationState::at_rest(initial_height);
        let initial_regime = self.select_regime(state.height, schedule);
        samples.push(TrajectorySample::from_state(&state, initial_regime.equipment));

        let mut steps: u64 = 0;
        while state.height > 0.0 && state.time < self.max_time {
            let regime = self.select_regime(state.height, schedule);
            steps += 1;
            state = self.advance(&state, &regime, steps);
            samples.push(TrajectorySample::from_state(&state, regime.equipment));
        }

        let stop_reason = if state.height <= 0.0 {
            StopReason::Touchdown
        } else {
            StopReason::TimeBudgetExhausted
        };

        Ok(Trajectory {
            samples,
            stop_reason,
        })
    }

    // Position moves with the pre-update velocity.
    fn advance(&self, state: &SimulationState, regime: &DragRegime, steps: u64) -> SimulationState {
        let acceleration =
            self.constants.gravity - regime.drag_force(state.velocity) / self.constants.mass;

        SimulationState {
            time: steps as f64 * self.time_step,
            height: state.height - state.velocity * self.time_step,
            velocity: state.velocity + acceleration * self.time_step,
        }
    }
}
