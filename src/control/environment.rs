use serde::Deserialize;

use crate::constants::{
    AIR_DENSITY_SEA_LEVEL, AIR_VISCOSITY, BODY_DRAG_COEFFICIENT, BODY_RADIUS,
    CANOPY_DRAG_COEFFICIENT, GRAVITY, JUMPER_MASS,
};
use crate::errors::SimulationError;

/// Physical parameters shared by every run of a scenario.
///
/// The struct is `Copy`: a density sweep builds one snapshot per run with
/// [`PhysicalConstants::with_air_density`] instead of mutating a shared value.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PhysicalConstants {
    pub mass: f64,
    pub gravity: f64,
    pub air_density: f64,
    pub viscosity: f64,
    pub body_drag_coefficient: f64,
    pub canopy_drag_coefficient: f64,
    pub body_radius: f64,
}

impl Default for PhysicalConstants {
    fn default() -> Self {
        PhysicalConstants {
            mass: JUMPER_MASS,
            gravity: GRAVITY,
            air_density: AIR_DENSITY_SEA_LEVEL,
            viscosity: AIR_VISCOSITY,
            body_drag_coefficient: BODY_DRAG_COEFFICIENT,
            canopy_drag_coefficient: CANOPY_DRAG_COEFFICIENT,
            body_radius: BODY_RADIUS,
        }
    }
}

impl PhysicalConstants {
    pub fn with_air_density(&self, air_density: f64) -> Self {
        PhysicalConstants {
            air_density,
            ..*self
        }
    }

    /// Weight of the jumper in newtons.
    pub fn weight(&self) -> f64 {
        self.mass * self.gravity
    }

    pub fn validate(&self) -> Result<(), SimulationError> {
        require_positive("mass", self.mass)?;
        require_positive("gravity", self.gravity)?;
        require_non_negative("air_density", self.air_density)?;
        require_non_negative("viscosity", self.viscosity)?;
        require_positive("body_drag_coefficient", self.body_drag_coefficient)?;
        require_positive("canopy_drag_coefficient", self.canopy_drag_coefficient)?;
        require_non_negative("body_radius", self.body_radius)?;
        Ok(())
    }
}

pub(crate) fn require_positive(name: &str, value: f64) -> Result<(), SimulationError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(SimulationError::InitializationError(format!(
            "{} must be a positive finite number, got {}",
            name, value
        )))
    }
}

pub(crate) fn require_non_negative(name: &str, value: f64) -> Result<(), SimulationError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(SimulationError::InitializationError(format!(
            "{} must be a non-negative finite number, got {}",
            name, value
        )))
    }
}
