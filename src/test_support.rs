//! Scripted hardware and in-memory storage shared by the unit tests.

use crate::common::Vec3D;
use crate::flight_control::sensors::{BaroDevice, BaroReading, ImuDevice, InertialSource, SensorError};
use crate::flight_log::LogSink;
use std::{
    collections::HashSet,
    io,
    sync::{Arc, Mutex, MutexGuard},
};
use tokio_util::sync::CancellationToken;

/// Backing store of a [`MemorySink`], inspectable after the sink was moved away.
#[derive(Debug, Default)]
pub(crate) struct MemoryLog {
    pub lines: Vec<String>,
    /// Size the sink pretends to have before the first append.
    pub base_size: u64,
    pub bytes: u64,
    pub fail_append: Option<io::ErrorKind>,
    pub fail_close: bool,
    pub appends: usize,
    pub closes: usize,
}

#[derive(Debug, Clone, Default)]
pub(crate) struct MemorySink(Arc<Mutex<MemoryLog>>);

impl MemorySink {
    pub fn with_base_size(base_size: u64) -> Self {
        let sink = Self::default();
        sink.log().base_size = base_size;
        sink
    }

    pub fn log(&self) -> MutexGuard<'_, MemoryLog> {
        self.0.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    /// Data rows only, header and trailer excluded.
    pub fn rows(&self) -> Vec<String> {
        self.log().lines.iter().skip(1).filter(|l| !l.starts_with('#')).cloned().collect()
    }
}

impl LogSink for MemorySink {
    fn size(&mut self) -> io::Result<u64> {
        let log = self.log();
        Ok(log.base_size + log.bytes)
    }

    fn append(&mut self, line: &str) -> io::Result<()> {
        let mut log = self.log();
        log.appends += 1;
        if let Some(kind) = log.fail_append {
            return Err(io::Error::new(kind, "injected append failure"));
        }
        log.bytes += line.len() as u64;
        log.lines.push(line.trim_end_matches('\n').to_string());
        Ok(())
    }

    fn close(self) -> io::Result<()> {
        let mut log = self.log();
        log.closes += 1;
        if log.fail_close {
            return Err(io::Error::new(io::ErrorKind::ReadOnlyFilesystem, "injected close failure"));
        }
        Ok(())
    }
}

/// IMU whose *linear* acceleration output follows a script.
///
/// The raw value handed out is back-computed from a mirror of the source's gravity
/// estimate, so the [`InertialSource`] reproduces the scripted linear acceleration.
/// Calibration reads produce zero.
pub(crate) struct ScriptedImu {
    script: Vec<Vec3D<f32>>,
    reads: usize,
    gravity: Vec3D<f32>,
    fail_reads: HashSet<usize>,
    cancel_at: Option<(usize, CancellationToken)>,
    gyro: Vec3D<f32>,
}

impl ScriptedImu {
    pub fn new(script: Vec<Vec3D<f32>>) -> Self {
        Self {
            script,
            reads: 0,
            gravity: Vec3D::zero(),
            fail_reads: HashSet::new(),
            cancel_at: None,
            gyro: Vec3D::new(0.01, -0.02, 0.03),
        }
    }

    /// Script of linear `y` accelerations, zero on the other axes.
    pub fn vertical(accel_y: &[f32]) -> Self {
        Self::new(accel_y.iter().map(|a| Vec3D::new(0.0, *a, 0.0)).collect())
    }

    /// Fails the given flight reads (0-based, calibration excluded).
    pub fn failing_on(mut self, reads: &[usize]) -> Self {
        self.fail_reads.extend(reads);
        self
    }

    /// Cancels `token` while serving flight read `read` (0-based, calibration excluded).
    pub fn cancelling_at(mut self, read: usize, token: CancellationToken) -> Self {
        self.cancel_at = Some((read, token));
        self
    }

    fn flight_read(&self) -> Option<usize> {
        self.reads.checked_sub(InertialSource::<Self>::CALIBRATION_SAMPLES)
    }
}

impl ImuDevice for ScriptedImu {
    fn acceleration(&mut self) -> Result<Vec3D<f32>, SensorError> {
        let read = self.flight_read();
        self.reads += 1;
        if let Some((at, token)) = &self.cancel_at {
            if read == Some(*at) {
                token.cancel();
            }
        }
        if read.is_some_and(|r| self.fail_reads.contains(&r)) {
            return Err(SensorError::Bus("scripted failure".into()));
        }
        let target = read
            .and_then(|r| self.script.get(r).or(self.script.last()))
            .copied()
            .unwrap_or_default();
        let alpha = InertialSource::<Self>::GRAVITY_ALPHA;
        let raw = self.gravity + target * (1.0 / alpha);
        self.gravity = self.gravity * alpha + raw * (1.0 - alpha);
        Ok(raw)
    }

    fn angular_velocity(&mut self) -> Result<Vec3D<f32>, SensorError> { Ok(self.gyro) }
}

/// Barometer replaying a list of altitudes. The first entry is the ground reference,
/// the last one repeats forever.
pub(crate) struct ScriptedBaro {
    altitudes: Vec<f32>,
    reads: usize,
    fail_reads: HashSet<usize>,
}

impl ScriptedBaro {
    pub fn new(altitudes: &[f32]) -> Self {
        Self { altitudes: altitudes.to_vec(), reads: 0, fail_reads: HashSet::new() }
    }

    /// Fails the given reads (0-based, the ground reference read included).
    pub fn failing_on(mut self, reads: &[usize]) -> Self {
        self.fail_reads.extend(reads);
        self
    }
}

impl BaroDevice for ScriptedBaro {
    fn read(&mut self) -> Result<BaroReading, SensorError> {
        let read = self.reads;
        self.reads += 1;
        if self.fail_reads.contains(&read) {
            return Err(SensorError::NotReady);
        }
        let altitude =
            self.altitudes.get(read).or(self.altitudes.last()).copied().unwrap_or_default();
        Ok(BaroReading { pressure: 1013.25 - altitude / 8.3, altitude, temperature: 21.5 })
    }
}
