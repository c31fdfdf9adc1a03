use std::path::PathBuf;

use clap::{Parser, Subcommand};
use skydive_simulation::telemetry_system::export::write_trajectory_file;
use skydive_simulation::*;

#[derive(Parser)]
#[command(author, version, about = "Staged parachute descent simulator", long_about = None)]
struct Cli {
    /// Scenario file (TOML); defaults to the reference jump
    #[arg(long, global = true)]
    scenario: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Simulate the scenario and print telemetry
    Run {
        /// Seconds between telemetry log lines
        #[arg(long, default_value_t = 5.0)]
        log_interval: f64,

        /// Write the trajectory to this CSV file
        #[arg(long)]
        csv: Option<PathBuf>,
    },

    /// Find the lowest safe large-canopy opening altitude
    SafeAltitude,

    /// Compare descents in media of different density
    DensitySweep {
        /// Densities to compare (kg/m³); defaults to the scenario's list
        #[arg(long, value_delimiter = ',')]
        densities: Option<Vec<f64>>,
    },

    /// Find the smallest large canopy that lands at the safe velocity
    SizeCanopy {
        /// Altitude at which the canopy opens (m)
        #[arg(long, default_value_t = 400.0)]
        opening_altitude: f64,
    },

    /// Print the derived reference areas and drag coefficients
    Table,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let scenario = match &cli.scenario {
        Some(path) => Scenario::load(path)?,
        None => ScenarioFactory::reference_jump(),
    };

    match cli.command {
        Commands::Run { log_interval, csv } => run(&scenario, log_interval, csv)?,
        Commands::SafeAltitude => safe_altitude(&scenario)?,
        Commands::DensitySweep { densities } => {
            let densities = densities.unwrap_or_else(|| scenario.analysis.densities.clone());
            density_sweep(&scenario, &densities)?
        }
        Commands::SizeCanopy { opening_altitude } => size_canopy(&scenario, opening_altitude)?,
        Commands::Table => print_table(&scenario)?,
    }

    Ok(())
}

fn run(
    scenario: &Scenario,
    log_interval: f64,
    csv: Option<PathBuf>,
) -> Result<(), SimulationError> {
    println!("Scenario: {}", scenario.name);
    let trajectory = scenario.run()?;

    let telemetry = Telemetry::from_trajectory(&trajectory, log_interval, scenario.physics.gravity);
    telemetry.display_data();

    if let Some(path) = csv {
        write_trajectory_file(&path, &trajectory)?;
        println!("\nTrajectory written to {}", path.display());
    }
    Ok(())
}

fn safe_altitude(scenario: &Scenario) -> Result<(), SimulationError> {
    let integrator = scenario.integrator()?;
    let analysis = &scenario.analysis;

    println!("--- Safe opening altitude ---");
    match find_minimum_safe_opening(
        &integrator,
        scenario.simulation.initial_altitude,
        analysis.search_step,
        analysis.safe_landing_velocity,
    )? {
        Some(opening) => {
            println!(
                "Opening at {} gives landing speed {:.2} m/s (Safe)",
                Telemetry::format_altitude(opening.altitude),
                opening.landing_velocity
            );
            println!(
                "Minimum safe opening height: {}",
                Telemetry::format_altitude(opening.altitude)
            );
        }
        None => println!("Could not find safe height"),
    }
    Ok(())
}

fn density_sweep(scenario: &Scenario, densities: &[f64]) -> Result<(), SimulationError> {
    let initial_altitude = scenario.simulation.initial_altitude;
    let integrator = scenario.integrator()?;
    let schedule = DeploymentSchedule::new(vec![DeploymentTrigger::from_table(
        initial_altitude,
        Equipment::LargeCanopy,
        &integrator.drag_table,
    )]);

    println!("--- Fall in different media ---");
    for run in sweep_air_density(&integrator, initial_altitude, &schedule, densities)? {
        println!(
            "Rho={:.3} kg/m³: final speed {:.2} m/s (terminal {:.2} m/s) after {}",
            run.air_density,
            run.late_time_velocity(),
            run.terminal_velocity,
            Telemetry::format_time(run.trajectory.flight_time())
        );
    }
    Ok(())
}

fn size_canopy(scenario: &Scenario, opening_altitude: f64) -> Result<(), SimulationError> {
    let integrator = scenario.integrator()?;
    let analysis = &scenario.analysis;
    let sizing = minimum_canopy_area(
        &integrator,
        scenario.simulation.initial_altitude,
        opening_altitude,
        analysis.safe_landing_velocity,
        analysis.sizing_tolerance,
    )?;

    println!("--- Canopy sizing ---");
    println!(
        "Closed-form area for {:.2} m/s: {:.3} m²",
        analysis.safe_landing_velocity, sizing.closed_form_area
    );
    println!(
        "Minimum canopy area opened at {}: {:.3} m² (landing at {:.2} m/s)",
        Telemetry::format_altitude(opening_altitude),
        sizing.area,
        sizing.landing_velocity
    );
    Ok(())
}

fn print_table(scenario: &Scenario) -> Result<(), SimulationError> {
    let table = scenario.drag_table()?;
    println!(
        "Calculated Areas: Body={:.2}, Small={:.2}, Large={:.2}",
        table.body.reference_area,
        table.small_canopy.reference_area,
        table.large_canopy.reference_area
    );
    println!(
        "Linear coefficients: k1_body={:.4}, k1_small={:.4}, k1_large={:.4}",
        table.body.linear_coefficient,
        table.small_canopy.linear_coefficient,
        table.large_canopy.linear_coefficient
    );
    Ok(())
}
