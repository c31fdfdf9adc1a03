use crate::trajectory_system::aerodynamics::Equipment;
use crate::trajectory_system::kinematics::{StopReason, Trajectory, TrajectorySample};

pub struct Telemetry {
    pub log: Vec<String>,
    max_velocity: f64,
    max_deceleration: f64,
    equipment_changes: Vec<(Equipment, f64, f64)>,
    simulation_time: f64,
    log_interval: f64,
    next_log_time: f64,
    last_sample: Option<TrajectorySample>,
    stop_reason: Option<StopReason>,
    gravity: f64,
}

impl Telemetry {
    pub fn new(log_interval: f64, gravity: f64) -> Self {
        Telemetry {
            log: Vec::new(),
            max_velocity: 0.0,
            max_deceleration: 0.0,
            equipment_changes: Vec::new(),
            simulation_time: 0.0,
            log_interval,
            next_log_time: 0.0,
            last_sample: None,
            stop_reason: None,
            gravity,
        }
    }

    pub fn from_trajectory(trajectory: &Trajectory, log_interval: f64, gravity: f64) -> Self {
        let mut telemetry = Telemetry::new(log_interval, gravity);
        for sample in trajectory.samples() {
            telemetry.collect_data(sample);
        }
        telemetry.stop_reason = Some(trajectory.stop_reason());
        telemetry
    }

    pub fn format_time(elapsed_time: f64) -> String {
        if elapsed_time >= 3600.0 {
            let hours = (elapsed_time / 3600.0).floor();
            let minutes = ((elapsed_time % 3600.0) / 60.0).floor();
            let seconds = elapsed_time % 60.0;
            format!("{:.0}h {:.0}m {:.2}s", hours, minutes, seconds)
        } else if elapsed_time >= 60.0 {
            let minutes = (elapsed_time / 60.0).floor();
            let seconds = elapsed_time % 60.0;
            format!("{:.0}m {:.2}s", minutes, seconds)
        } else {
            format!("{:.2}s", elapsed_time)
        }
    }

    pub fn format_altitude(altitude: f64) -> String {
        if altitude.abs() >= 1000.0 {
            format!("{:.2} km", altitude / 1000.0)
        } else {
            format!("{:.2} m", altitude)
        }
    }

    pub fn collect_data(&mut self, sample: &TrajectorySample) {
        self.simulation_time = sample.time;

        if sample.velocity > self.max_velocity {
            self.max_velocity = sample.velocity;
        }
        if let Some(previous) = &self.last_sample {
            let dt = sample.time - previous.time;
            if dt > 0.0 {
                let deceleration = (previous.velocity - sample.velocity) / dt;
                if deceleration > self.max_deceleration {
                    self.max_deceleration = deceleration;
                }
            }
        }

        // Track equipment transitions
        let changed = self
            .equipment_changes
            .last()
            .map_or(true, |(equipment, _, _)| *equipment != sample.equipment);
        if changed {
            self.equipment_changes
                .push((sample.equipment, sample.time, sample.height));
        }

        if sample.time >= self.next_log_time {
            self.log.push(format!(
                "Time: {} | Altitude: {} | Velocity: {:.2} m/s | Equipment: {}",
                Self::format_time(sample.time),
                Self::format_altitude(sample.height),
                sample.velocity,
                sample.equipment
            ));
            self.next_log_time += self.log_interval.max(f64::EPSILON);
        }

        self.last_sample = Some(*sample);
    }

    pub fn max_velocity(&self) -> f64 {
        self.max_velocity
    }

    /// Largest deceleration seen between consecutive samples, in m/s².
    pub fn max_deceleration(&self) -> f64 {
        self.max_deceleration
    }

    /// Equipment in order of activation with the time and altitude it took effect.
    pub fn equipment_changes(&self) -> &[(Equipment, f64, f64)] {
        &self.equipment_changes
    }

    pub fn final_sample(&self) -> Option<&TrajectorySample> {
        self.last_sample.as_ref()
    }

    pub fn display_data(&self) {
        println!("--- Telemetry Data ---");
        for entry in &self.log {
            println!("{}", entry);
        }
        println!("--- End of Telemetry ---");

        println!("\n--- Simulation Summary ---");
        println!("Flight Time: {}", Self::format_time(self.simulation_time));
        println!("Max Velocity: {:.2} m/s", self.max_velocity);
        println!(
            "Max Deceleration: {:.2} m/s² ({:.1} g)",
            self.max_deceleration,
            self.max_deceleration / self.gravity
        );
        if let Some(last) = &self.last_sample {
            match self.stop_reason {
                Some(StopReason::TimeBudgetExhausted) => println!(
                    "Time budget exhausted at {} with {:.2} m/s",
                    Self::format_altitude(last.height),
                    last.velocity
                ),
                _ => println!("Landing Velocity: {:.2} m/s", last.velocity),
            }
        }

        println!("\n--- Equipment Changes ---");
        for (equipment, time, altitude) in &self.equipment_changes {
            println!(
                "{} active from {} at {}",
                equipment,
                Self::format_time(*time),
                Self::format_altitude(*altitude)
            );
        }
    }
}
