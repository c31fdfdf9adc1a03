pub mod canopy_sizing;
pub mod density_sweep;
pub mod opening_altitude;
