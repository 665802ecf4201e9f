use super::{BaroDevice, SensorError};

/// One barometer reading, bound to named fields.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct BaroReading {
    /// Static pressure in hPa.
    pub pressure: f32,
    /// Altitude above mean sea level in meters.
    pub altitude: f32,
    /// Sensor temperature in °C.
    pub temperature: f32,
}

/// Direct, unfiltered barometer access.
pub struct BarometricSource<D: BaroDevice> {
    device: D,
}

impl<D: BaroDevice> BarometricSource<D> {
    pub fn new(device: D) -> Self { Self { device } }

    pub fn sample(&mut self) -> Result<BaroReading, SensorError> { self.device.read() }
}
