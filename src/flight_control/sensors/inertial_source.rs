use super::{ImuDevice, SensorError};
use crate::common::Vec3D;
use crate::warn;

/// Inertial front end that separates gravity from motion-caused acceleration.
///
/// A per-axis exponential running average tracks the slowly changing gravity component.
/// Subtracting it from every raw reading yields linear acceleration. The estimate lives as
/// long as the source and is updated on every successful read.
pub struct InertialSource<D: ImuDevice> {
    device: D,
    gravity: Vec3D<f32>,
}

impl<D: ImuDevice> InertialSource<D> {
    /// Weight of the previous gravity estimate in the running average.
    pub const GRAVITY_ALPHA: f32 = 0.8;
    /// Number of discarded reads used to let the gravity estimate settle.
    pub const CALIBRATION_SAMPLES: usize = 20;

    pub fn new(device: D) -> Self { Self { device, gravity: Vec3D::zero() } }

    /// Reads one acceleration/angular velocity pair.
    ///
    /// # Returns
    /// `(linear_acceleration, angular_velocity)` where the acceleration has the current
    /// gravity estimate removed and the angular velocity is passed through unmodified.
    ///
    /// # Errors
    /// Propagates the device error. The gravity estimate is left untouched in that case.
    pub fn sample(&mut self) -> Result<(Vec3D<f32>, Vec3D<f32>), SensorError> {
        let raw = self.device.acceleration()?;
        let gyro = self.device.angular_velocity()?;
        let alpha = Self::GRAVITY_ALPHA;
        self.gravity = self.gravity * alpha + raw * (1.0 - alpha);
        Ok((raw - self.gravity, gyro))
    }

    /// Runs [`Self::CALIBRATION_SAMPLES`] reads and discards their output.
    ///
    /// Must run after power-up and before the first classified sample.
    pub fn calibrate(&mut self) {
        let mut failed = 0;
        for _ in 0..Self::CALIBRATION_SAMPLES {
            if let Err(e) = self.sample() {
                failed += 1;
                warn!("Calibration read failed: {e:?}");
            }
        }
        if failed > 0 {
            warn!("{failed}/{} calibration reads failed", Self::CALIBRATION_SAMPLES);
        }
    }

    /// The current gravity-bias estimate.
    pub fn gravity(&self) -> Vec3D<f32> { self.gravity }
}
