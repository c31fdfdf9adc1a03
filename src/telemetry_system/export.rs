use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::Path;

use crate::trajectory_system::kinematics::Trajectory;

const HEADER: &str = "time,height,velocity,equipment";

/// Write the trajectory as CSV: one header line, then one row per sample.
pub fn write_trajectory<W: Write>(writer: &mut W, trajectory: &Trajectory) -> io::Result<()> {
    writeln!(writer, "{}", HEADER)?;
    for sample in trajectory.samples() {
        writeln!(
            writer,
            "{:.4},{:.6},{:.6},{}",
            sample.time, sample.height, sample.velocity, sample.equipment
        )?;
    }
    Ok(())
}

/// Write trajectory to a CSV file, creating parent directories as needed.
pub fn write_trajectory_file<P: AsRef<Path>>(path: P, trajectory: &Trajectory) -> io::Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    let mut writer = BufWriter::new(File::create(path)?);
    write_trajectory(&mut writer, trajectory)?;
    writer.flush()
}
