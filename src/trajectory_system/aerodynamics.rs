use std::f64::consts::PI;
use std::fmt;

use serde::Deserialize;

use crate::constants::{
    AREA_MATCH_TOLERANCE, BODY_TERMINAL_VELOCITY, LARGE_CANOPY_TERMINAL_VELOCITY,
    SMALL_CANOPY_TERMINAL_VELOCITY,
};
use crate::control::environment::{require_positive, PhysicalConstants};
use crate::errors::SimulationError;

/// Equipment state of the jumper; each state has its own drag profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Equipment {
    Body,
    SmallCanopy,
    LargeCanopy,
}

impl Equipment {
    pub const ALL: [Equipment; 3] = [
        Equipment::Body,
        Equipment::SmallCanopy,
        Equipment::LargeCanopy,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Equipment::Body => "body",
            Equipment::SmallCanopy => "small_canopy",
            Equipment::LargeCanopy => "large_canopy",
        }
    }
}

impl fmt::Display for Equipment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Target terminal velocities the reference areas are sized for.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TerminalVelocities {
    pub body: f64,
    pub small_canopy: f64,
    pub large_canopy: f64,
}

impl Default for TerminalVelocities {
    fn default() -> Self {
        TerminalVelocities {
            body: BODY_TERMINAL_VELOCITY,
            small_canopy: SMALL_CANOPY_TERMINAL_VELOCITY,
            large_canopy: LARGE_CANOPY_TERMINAL_VELOCITY,
        }
    }
}

/// Cross-sectional area for which quadratic drag balances weight at `terminal_velocity`.
///
/// Solves `m·g = 0.5·Cx·ρ·S·v²` for `S`; the linear term is ignored.
pub fn reference_area_for_terminal_velocity(
    constants: &PhysicalConstants,
    terminal_velocity: f64,
    drag_coefficient: f64,
) -> f64 {
    let k = constants.weight() / terminal_velocity.powi(2);
    k / (0.5 * drag_coefficient * constants.air_density)
}

/// Radius of a disc with the given area.
pub fn equivalent_radius(area: f64) -> f64 {
    (area / PI).sqrt()
}

/// Stokes drag coefficient `6πμr`.
pub fn linear_drag_coefficient(viscosity: f64, radius: f64) -> f64 {
    6.0 * PI * viscosity * radius
}

pub fn quadratic_drag_coefficient(drag_coefficient: f64, air_density: f64, area: f64) -> f64 {
    0.5 * drag_coefficient * air_density * area
}

/// Steady descent speed where `k1·v + k2·v² = m·g`.
pub fn terminal_velocity(linear: f64, quadratic: f64, mass: f64, gravity: f64) -> f64 {
    let weight = mass * gravity;
    if quadratic > 0.0 {
        (-linear + (linear.powi(2) + 4.0 * quadratic * weight).sqrt()) / (2.0 * quadratic)
    } else if linear > 0.0 {
        weight / linear
    } else {
        f64::INFINITY
    }
}

/// Drag data for one equipment state.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DragProfile {
    pub reference_area: f64,
    pub drag_coefficient: f64,
    pub linear_coefficient: f64,
}

impl DragProfile {
    pub fn quadratic_coefficient(&self, air_density: f64) -> f64 {
        quadratic_drag_coefficient(self.drag_coefficient, air_density, self.reference_area)
    }
}

/// Reference drag profiles for every equipment state, computed once at setup.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DragTable {
    pub body: DragProfile,
    pub small_canopy: DragProfile,
    pub large_canopy: DragProfile,
    viscosity: f64,
}

impl DragTable {
    pub fn from_terminal_velocities(
        constants: &PhysicalConstants,
        targets: &TerminalVelocities,
    ) -> Result<Self, SimulationError> {
        constants.validate()?;
        require_positive("air_density", constants.air_density)?;
        require_positive("body terminal velocity", targets.body)?;
        require_positive("small canopy terminal velocity", targets.small_canopy)?;
        require_positive("large canopy terminal velocity", targets.large_canopy)?;

        let body_area = reference_area_for_terminal_velocity(
            constants,
            targets.body,
            constants.body_drag_coefficient,
        );
        let small_area = reference_area_for_terminal_velocity(
            constants,
            targets.small_canopy,
            constants.canopy_drag_coefficient,
        );
        let large_area = reference_area_for_terminal_velocity(
            constants,
            targets.large_canopy,
            constants.canopy_drag_coefficient,
        );

        Ok(DragTable {
            body: DragProfile {
                reference_area: body_area,
                drag_coefficient: constants.body_drag_coefficient,
                linear_coefficient: linear_drag_coefficient(
                    constants.viscosity,
                    constants.body_radius,
                ),
            },
            small_canopy: Self::canopy_profile(
                constants.viscosity,
                small_area,
                constants.canopy_drag_coefficient,
            ),
            large_canopy: Self::canopy_profile(
                constants.viscosity,
                large_area,
                constants.canopy_drag_coefficient,
            ),
            viscosity: constants.viscosity,
        })
    }

    fn canopy_profile(viscosity: f64, area: f64, drag_coefficient: f64) -> DragProfile {
        DragProfile {
            reference_area: area,
            drag_coefficient,
            linear_coefficient: linear_drag_coefficient(viscosity, equivalent_radius(area)),
        }
    }

    pub fn profile(&self, equipment: Equipment) -> &DragProfile {
        match equipment {
            Equipment::Body => &self.body,
            Equipment::SmallCanopy => &self.small_canopy,
            Equipment::LargeCanopy => &self.large_canopy,
        }
    }

    /// Profile of `equipment` at a non-reference area. Canopy linear
    /// coefficients follow the equivalent radius of `area`; the body keeps its
    /// radius-based coefficient.
    pub fn sized_profile(
        &self,
        equipment: Equipment,
        area: f64,
        drag_coefficient: f64,
    ) -> DragProfile {
        match equipment {
            Equipment::Body => DragProfile {
                reference_area: area,
                drag_coefficient,
                linear_coefficient: self.body.linear_coefficient,
            },
            Equipment::SmallCanopy | Equipment::LargeCanopy => {
                Self::canopy_profile(self.viscosity, area, drag_coefficient)
            }
        }
    }

    /// Match an area against the canopy reference areas. Anything else is treated as the body.
    pub fn classify(&self, area: f64) -> Equipment {
        if (area - self.small_canopy.reference_area).abs() < AREA_MATCH_TOLERANCE {
            Equipment::SmallCanopy
        } else if (area - self.large_canopy.reference_area).abs() < AREA_MATCH_TOLERANCE {
            Equipment::LargeCanopy
        } else {
            Equipment::Body
        }
    }
}

/// Linear and quadratic resistance coefficients active for one step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DragRegime {
    pub equipment: Equipment,
    pub linear_coefficient: f64,
    pub quadratic_coefficient: f64,
}

impl DragRegime {
    pub fn drag_force(&self, velocity: f64) -> f64 {
        self.linear_coefficient * velocity + self.quadratic_coefficient * velocity.powi(2)
    }

    pub fn terminal_velocity(&self, mass: f64, gravity: f64) -> f64 {
        terminal_velocity(
            self.linear_coefficient,
            self.quadratic_coefficient,
            mass,
            gravity,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const EPSILON: f64 = 1e-9;

    fn reference_table() -> DragTable {
        DragTable::from_terminal_velocities(
            &PhysicalConstants::default(),
            &TerminalVelocities::default(),
        )
        .unwrap()
    }

    #[test]
    fn test_reference_areas() {
        let table = reference_table();

        assert_relative_eq!(table.body.reference_area, 0.5765877551020409, epsilon = EPSILON);
        assert_relative_eq!(
            table.small_canopy.reference_area,
            0.7844731361932528,
            epsilon = EPSILON
        );
        assert_relative_eq!(
            table.large_canopy.reference_area,
            15.01530612244898,
            epsilon = EPSILON
        );
    }

    #[test]
    fn test_linear_coefficients() {
        let table = reference_table();

        assert_relative_eq!(
            table.body.linear_coefficient,
            0.13722476710880216,
            epsilon = EPSILON
        );
        assert_relative_eq!(
            table.small_canopy.linear_coefficient,
            0.17142991615498154,
            epsilon = EPSILON
        );
        assert_relative_eq!(
            table.large_canopy.linear_coefficient,
            0.7500058831780441,
            epsilon = EPSILON
        );
    }

    #[test]
    fn test_sized_area_balances_weight_at_target() {
        let constants = PhysicalConstants::default();
        let area = reference_area_for_terminal_velocity(&constants, 8.0, 1.5);
        let drag = quadratic_drag_coefficient(1.5, constants.air_density, area) * 8.0_f64.powi(2);

        assert_relative_eq!(drag, constants.weight(), epsilon = 1e-9);
    }

    #[test]
    fn test_terminal_velocity_below_sizing_target_with_linear_drag() {
        let constants = PhysicalConstants::default();
        let table = reference_table();
        let profile = table.profile(Equipment::LargeCanopy);
        let v = terminal_velocity(
            profile.linear_coefficient,
            profile.quadratic_coefficient(constants.air_density),
            constants.mass,
            constants.gravity,
        );

        assert!(v < 8.0);
        assert_relative_eq!(v, 7.97286282362664, epsilon = 1e-9);
    }

    #[test]
    fn test_terminal_velocity_linear_only() {
        assert_relative_eq!(terminal_velocity(2.0, 0.0, 10.0, 9.81), 49.05, epsilon = EPSILON);
        assert!(terminal_velocity(0.0, 0.0, 10.0, 9.81).is_infinite());
    }

    #[test]
    fn test_classify_matches_within_tolerance() {
        let table = reference_table();

        assert_eq!(table.classify(15.01), Equipment::LargeCanopy);
        assert_eq!(table.classify(0.79), Equipment::SmallCanopy);
        assert_eq!(table.classify(0.5765877551020409), Equipment::Body);
        assert_eq!(table.classify(3.0), Equipment::Body);
    }

    #[test]
    fn test_sized_canopy_recomputes_linear_coefficient() {
        let table = reference_table();
        let resized = table.sized_profile(Equipment::LargeCanopy, 30.0, 1.5);

        assert_eq!(resized.reference_area, 30.0);
        assert_relative_eq!(
            resized.linear_coefficient,
            linear_drag_coefficient(0.0182, equivalent_radius(30.0)),
            epsilon = EPSILON
        );
        assert_relative_eq!(resized.linear_coefficient, 1.0601277482554117, epsilon = EPSILON);

        let nominal = table.sized_profile(
            Equipment::LargeCanopy,
            table.large_canopy.reference_area,
            table.large_canopy.drag_coefficient,
        );
        assert_eq!(nominal, table.large_canopy);
    }

    #[test]
    fn test_sized_body_keeps_radius_coefficient() {
        let table = reference_table();
        let body = table.sized_profile(Equipment::Body, 4.0, 1.0);

        assert_eq!(body.reference_area, 4.0);
        assert_eq!(body.linear_coefficient, table.body.linear_coefficient);
    }

    #[test]
    fn test_drag_table_rejects_zero_target() {
        let targets = TerminalVelocities {
            small_canopy: 0.0,
            ..TerminalVelocities::default()
        };
        let result =
            DragTable::from_terminal_velocities(&PhysicalConstants::default(), &targets);
        assert!(matches!(result, Err(SimulationError::InitializationError(_))));
    }

    #[test]
    fn test_regime_drag_force_balances_at_terminal_velocity() {
        let regime = DragRegime {
            equipment: Equipment::Body,
            linear_coefficient: 0.2,
            quadratic_coefficient: 0.35,
        };
        let v = regime.terminal_velocity(90.0, 9.81);
        assert_relative_eq!(regime.drag_force(v), 90.0 * 9.81, epsilon = 1e-9);
    }
}
