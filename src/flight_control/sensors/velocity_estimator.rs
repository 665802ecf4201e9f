use crate::common::Vec3D;
use std::time::Duration;

/// How the estimator treats its state between calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IntegrationMode {
    /// Filter and velocity state restart from zero on every call. The result is
    /// `accel * (1 - S) * dt`, an instantaneous proxy for the rate rather than an integral.
    /// Classification thresholds are tuned against this behavior.
    #[default]
    Instantaneous,
    /// Filter and velocity state carry over between calls (a true Riemann sum).
    Accumulating,
}

/// Derives per-axis velocity from filtered linear acceleration.
#[derive(Debug, Clone, Default)]
pub struct VelocityEstimator {
    mode: IntegrationMode,
    filtered_accel: Vec3D<f32>,
    velocity: Vec3D<f32>,
}

impl VelocityEstimator {
    /// One-pole smoothing factor applied to incoming acceleration.
    pub const SMOOTHING: f32 = 0.75;

    pub fn new(mode: IntegrationMode) -> Self {
        Self { mode, filtered_accel: Vec3D::zero(), velocity: Vec3D::zero() }
    }

    /// Smooths `accel` and integrates it over `dt`.
    ///
    /// # Arguments
    /// * `accel` - Linear acceleration of the current sample in m/s².
    /// * `dt` - Wall-clock duration of the current read-and-process step.
    ///
    /// # Returns
    /// The velocity estimate in m/s.
    pub fn estimate(&mut self, accel: Vec3D<f32>, dt: Duration) -> Vec3D<f32> {
        if self.mode == IntegrationMode::Instantaneous {
            self.filtered_accel = Vec3D::zero();
            self.velocity = Vec3D::zero();
        }
        let s = Self::SMOOTHING;
        self.filtered_accel = self.filtered_accel * s + accel * (1.0 - s);
        self.velocity = self.velocity + self.filtered_accel * dt.as_secs_f32();
        self.velocity
    }
}
