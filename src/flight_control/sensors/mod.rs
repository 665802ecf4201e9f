//! Sensor fusion front end: the two hardware-facing sources and the velocity estimator.
//!
//! The raw read primitives sit behind [`ImuDevice`] and [`BaroDevice`]. Bus setup and
//! register configuration belong to whoever implements those traits.

mod barometric_source;
mod inertial_source;
pub(crate) mod simulated;
mod velocity_estimator;

pub use barometric_source::{BaroReading, BarometricSource};
pub use inertial_source::InertialSource;
pub use velocity_estimator::{IntegrationMode, VelocityEstimator};

use crate::common::Vec3D;
use strum_macros::Display;

/// Failure of a raw sensor read.
#[derive(Debug, Display, Clone, PartialEq, Eq)]
pub enum SensorError {
    /// The bus transaction failed.
    Bus(String),
    /// The device has no fresh conversion available.
    NotReady,
}

impl std::error::Error for SensorError {}

/// Raw access to an accelerometer/gyroscope pair.
pub trait ImuDevice {
    /// Raw acceleration in m/s², gravity included.
    fn acceleration(&mut self) -> Result<Vec3D<f32>, SensorError>;

    /// Angular velocity in rad/s.
    fn angular_velocity(&mut self) -> Result<Vec3D<f32>, SensorError>;
}

/// Raw access to a barometric pressure sensor.
pub trait BaroDevice {
    fn read(&mut self) -> Result<BaroReading, SensorError>;
}
