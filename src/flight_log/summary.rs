use super::LogError;
use std::{fmt::Write as _, fs, path::Path};

/// Peak values of one flight.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FlightSummary {
    /// Highest altitude above the ground reference in meters.
    pub max_altitude_agl: f32,
    /// Highest velocity estimate along `y` in m/s.
    pub max_velocity_y: f32,
    /// Highest linear acceleration along `y` in m/s².
    pub max_acceleration_y: f32,
}

impl FlightSummary {
    /// One labeled line per metric.
    pub fn render(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "Max altitude : {:.4}m", self.max_altitude_agl);
        let _ = writeln!(out, "Max velocity y : {:.4}m/s", self.max_velocity_y);
        let _ = writeln!(out, "Max acceleration y : {:.4}m/s²", self.max_acceleration_y);
        out
    }
}

/// Persists `summary` next to the flight log.
///
/// # Errors
/// Any I/O failure, classified like flight log failures.
pub fn write_summary<P: AsRef<Path>>(path: P, summary: &FlightSummary) -> Result<(), LogError> {
    fs::write(path, summary.render())?;
    Ok(())
}
