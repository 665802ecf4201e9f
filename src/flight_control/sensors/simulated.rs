//! Simulated sensor hardware driven by a simple single-stage flight profile.
//!
//! Stands in for the accelerometer and barometer drivers when the flight computer runs
//! off-board. Both devices share one [`FlightProfile`] and read it at the current
//! simulated time, so their outputs stay consistent with each other. Every device read
//! advances that time by the emulated bus latency instead of blocking the caller.

use super::{BaroDevice, BaroReading, ImuDevice, SensorError};
use crate::common::Vec3D;
use rand::{Rng, SeedableRng, rngs::StdRng};
use std::{
    sync::{
        Arc,
        atomic::{AtomicU64, Ordering},
    },
    time::Duration,
};

const G: f32 = 9.81;
const SEA_LEVEL_HPA: f32 = 1013.25;
/// Emulated bus transaction time of one device read.
const READ_LATENCY_US: u64 = 4_000;

/// Kinematic state of the simulated rocket at one instant.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProfilePoint {
    /// Height above the pad in meters.
    pub height: f32,
    /// Vertical velocity in m/s.
    pub velocity: f32,
    /// Proper (sensed) acceleration along the rocket axis in m/s², gravity included.
    pub proper_accel: f32,
}

/// Boost, ballistic coast and a fixed-rate descent under canopy.
#[derive(Debug)]
pub struct FlightProfile {
    /// Simulated time since creation in microseconds.
    clock_us: AtomicU64,
    /// Time on the pad before ignition.
    pub pad_hold: f32,
    /// Motor burn duration.
    pub burn_time: f32,
    /// Net upward acceleration while the motor burns.
    pub thrust_accel: f32,
    /// Descent rate under the parachute (positive number).
    pub descent_rate: f32,
    /// Pad elevation above mean sea level.
    pub pad_altitude: f32,
}

impl FlightProfile {
    pub fn new(pad_altitude: f32) -> Self {
        Self {
            clock_us: AtomicU64::new(0),
            pad_hold: 2.0,
            burn_time: 1.6,
            thrust_accel: 45.0,
            descent_rate: 6.0,
            pad_altitude,
        }
    }

    /// Simulated seconds since the profile was created.
    pub fn elapsed(&self) -> f32 {
        Duration::from_micros(self.clock_us.load(Ordering::Relaxed)).as_secs_f32()
    }

    /// Moves the simulated time forward by one bus transaction and evaluates the profile.
    fn read_point(&self) -> ProfilePoint {
        self.clock_us.fetch_add(READ_LATENCY_US, Ordering::Relaxed);
        self.at(self.elapsed())
    }

    /// Evaluates the profile `t` seconds after creation.
    pub fn at(&self, t: f32) -> ProfilePoint {
        let on_pad = ProfilePoint { height: 0.0, velocity: 0.0, proper_accel: G };
        let t = t - self.pad_hold;
        if t <= 0.0 {
            return on_pad;
        }
        let burn = self.burn_time;
        let v_burnout = self.thrust_accel * burn;
        let h_burnout = 0.5 * self.thrust_accel * burn * burn;
        if t <= burn {
            return ProfilePoint {
                height: 0.5 * self.thrust_accel * t * t,
                velocity: self.thrust_accel * t,
                proper_accel: self.thrust_accel + G,
            };
        }
        let t_apogee = v_burnout / G;
        let h_apogee = h_burnout + v_burnout * v_burnout / (2.0 * G);
        let tc = t - burn;
        if tc <= t_apogee {
            return ProfilePoint {
                height: h_burnout + v_burnout * tc - 0.5 * G * tc * tc,
                velocity: v_burnout - G * tc,
                proper_accel: 0.0,
            };
        }
        let td = tc - t_apogee;
        let height = h_apogee - self.descent_rate * td;
        if height <= 0.0 {
            return on_pad;
        }
        ProfilePoint { height, velocity: -self.descent_rate, proper_accel: G }
    }

    /// Seconds from creation until the simulated rocket is back on the ground.
    pub fn touchdown_time(&self) -> f32 {
        let v_burnout = self.thrust_accel * self.burn_time;
        let h_apogee = 0.5 * self.thrust_accel * self.burn_time * self.burn_time
            + v_burnout * v_burnout / (2.0 * G);
        self.pad_hold + self.burn_time + v_burnout / G + h_apogee / self.descent_rate
    }
}

/// International standard atmosphere pressure at `altitude` meters.
pub fn pressure_at(altitude: f32) -> f32 {
    SEA_LEVEL_HPA * (1.0 - 2.255_77e-5 * altitude).powf(5.255_88)
}

pub struct SimulatedImu {
    profile: Arc<FlightProfile>,
    rng: StdRng,
    noise: f32,
}

impl SimulatedImu {
    pub fn new(profile: Arc<FlightProfile>, seed: u64) -> Self {
        Self { profile, rng: StdRng::seed_from_u64(seed), noise: 0.05 }
    }

    fn jitter(&mut self) -> f32 { self.rng.random_range(-self.noise..=self.noise) }
}

impl ImuDevice for SimulatedImu {
    fn acceleration(&mut self) -> Result<Vec3D<f32>, SensorError> {
        let point = self.profile.read_point();
        Ok(Vec3D::new(self.jitter(), point.proper_accel + self.jitter(), self.jitter()))
    }

    fn angular_velocity(&mut self) -> Result<Vec3D<f32>, SensorError> {
        Ok(Vec3D::new(self.jitter(), self.jitter(), self.jitter()))
    }
}

pub struct SimulatedBaro {
    profile: Arc<FlightProfile>,
    rng: StdRng,
    noise: f32,
}

impl SimulatedBaro {
    pub fn new(profile: Arc<FlightProfile>, seed: u64) -> Self {
        Self { profile, rng: StdRng::seed_from_u64(seed), noise: 0.3 }
    }
}

impl BaroDevice for SimulatedBaro {
    fn read(&mut self) -> Result<BaroReading, SensorError> {
        let point = self.profile.read_point();
        let altitude =
            self.profile.pad_altitude + point.height + self.rng.random_range(-self.noise..=self.noise);
        Ok(BaroReading {
            pressure: pressure_at(altitude),
            altitude,
            temperature: 15.0 - 0.0065 * altitude,
        })
    }
}
