// Physical Constants
pub const GRAVITY: f64 = 9.81; // m/s²
pub const AIR_DENSITY_SEA_LEVEL: f64 = 1.225; // kg/m³
pub const AIR_VISCOSITY: f64 = 0.0182; // Pa·s

// Jumper Constants
pub const JUMPER_MASS: f64 = 90.0; // kg, jumper plus rig
pub const BODY_RADIUS: f64 = 0.4; // m
pub const BODY_DRAG_COEFFICIENT: f64 = 1.0;
pub const CANOPY_DRAG_COEFFICIENT: f64 = 1.5;

// Target terminal velocities used to size reference areas
pub const BODY_TERMINAL_VELOCITY: f64 = 50.0; // m/s
pub const SMALL_CANOPY_TERMINAL_VELOCITY: f64 = 35.0; // m/s
pub const LARGE_CANOPY_TERMINAL_VELOCITY: f64 = 8.0; // m/s

// Simulation Parameters
pub const TIME_STEP: f64 = 0.01; // s
pub const MAX_SIMULATION_TIME: f64 = 300.0; // s
pub const INITIAL_ALTITUDE: f64 = 1000.0; // m

// Analysis Parameters
pub const SAFE_LANDING_VELOCITY: f64 = 10.0; // m/s
pub const OPENING_SEARCH_STEP: f64 = 10.0; // m
pub const SIZING_TOLERANCE: f64 = 1e-3; // m²
pub const AREA_MATCH_TOLERANCE: f64 = 0.01; // m²
