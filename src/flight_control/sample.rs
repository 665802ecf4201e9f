use super::sensors::BaroReading;
use crate::common::Vec3D;

/// One synchronized reading of all sensors plus the derived velocity.
///
/// Produced once per loop iteration and shared by the classifier, the logger and the
/// maxima tracker of that same iteration.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Sample {
    /// Seconds since the session clock started.
    pub timestamp: f64,
    /// Linear (gravity corrected) acceleration in m/s².
    pub accel: Vec3D<f32>,
    /// Angular velocity in rad/s.
    pub gyro: Vec3D<f32>,
    /// Static pressure in hPa.
    pub pressure: f32,
    /// Altitude above mean sea level in meters.
    pub altitude: f32,
    /// Temperature in °C.
    pub temperature: f32,
    /// Velocity estimate in m/s.
    pub velocity: Vec3D<f32>,
}

impl Sample {
    pub fn new(
        timestamp: f64,
        (accel, gyro): (Vec3D<f32>, Vec3D<f32>),
        baro: BaroReading,
        velocity: Vec3D<f32>,
    ) -> Self {
        Self {
            timestamp,
            accel,
            gyro,
            pressure: baro.pressure,
            altitude: baro.altitude,
            temperature: baro.temperature,
            velocity,
        }
    }
}
