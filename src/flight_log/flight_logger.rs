use super::{LogError, LogSink};
use crate::flight_control::{Sample, Stage};
use crate::{info, telemetry, warn};

/// Default cap of the durable log in bytes.
pub const DEFAULT_LOG_CAPACITY: u64 = 12_000_000;

/// Where telemetry rows go for the rest of the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogMode {
    /// Size-capped rows on persistent storage.
    Durable,
    /// Uncapped rows on the console only.
    Transient,
}

/// Why a row did not reach the durable sink.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropReason {
    /// The sink already exceeds its capacity.
    Capacity,
    /// The medium rejected the write.
    Storage,
}

/// Result of a single [`FlightLogger::write_row`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowOutcome {
    Written,
    Printed,
    Dropped(DropReason),
}

/// Row counters kept for postflight diagnosis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LogStats {
    pub written: u64,
    pub printed: u64,
    pub dropped_capacity: u64,
    pub dropped_storage: u64,
}

/// Size-bounded, mode-aware sink for per-sample telemetry rows.
pub struct FlightLogger<S: LogSink> {
    mode: LogMode,
    sink: Option<S>,
    capacity: u64,
    overflow: bool,
    stats: LogStats,
}

impl<S: LogSink> FlightLogger<S> {
    pub const HEADER: &'static str = "Timestamp,Altitude,Pressure,Temperature,\
        Velocity_X,Velocity_Y,Velocity_Z,\
        Acceleration_X,Acceleration_Y,Acceleration_Z,\
        Angular_Velocity_X,Angular_Velocity_Y,Angular_Velocity_Z,FlightStage";
    pub const OVERFLOW_TRAILER: &'static str =
        "# Logging stopped: flight log exceeded storage capacity";

    /// Opens the logger for the session.
    ///
    /// In durable mode `opener` creates (or truncates) the log and the header row is
    /// written. Any failure on that path degrades the logger to transient mode; the
    /// flight goes on either way.
    pub fn open<F>(mode: LogMode, capacity: u64, opener: F) -> Self
    where
        F: FnOnce() -> std::io::Result<S>,
    {
        let mut logger =
            Self { mode: LogMode::Transient, sink: None, capacity, overflow: false, stats: LogStats::default() };
        if mode == LogMode::Transient {
            info!("Logging telemetry to console only");
            return logger;
        }
        let opened = opener().and_then(|mut sink| {
            sink.append(&format!("{}\n", Self::HEADER))?;
            Ok(sink)
        });
        match opened {
            Ok(sink) => {
                info!("Opened flight data log");
                logger.mode = LogMode::Durable;
                logger.sink = Some(sink);
            }
            Err(e) => {
                warn!("Unable to open flight data log: {e}");
                warn!("Switching to transient logging");
            }
        }
        logger
    }

    pub fn mode(&self) -> LogMode { self.mode }

    /// `true` once a row has been dropped for capacity. Never resets.
    pub fn overflow(&self) -> bool { self.overflow }

    pub fn stats(&self) -> LogStats { self.stats }

    /// Formats one telemetry row, without the trailing newline.
    pub fn format_row(sample: &Sample, stage: Stage) -> String {
        let (v, a, g) = (sample.velocity, sample.accel, sample.gyro);
        format!(
            "{:.3},{:.2},{:.2},{:.2},{:.4},{:.4},{:.4},{:.4},{:.4},{:.4},{:.4},{:.4},{:.4},{stage}",
            sample.timestamp,
            sample.altitude,
            sample.pressure,
            sample.temperature,
            v.x(),
            v.y(),
            v.z(),
            a.x(),
            a.y(),
            a.z(),
            g.x(),
            g.y(),
            g.z(),
        )
    }

    /// Records one sample.
    ///
    /// # Errors
    /// Only unexpected sink failures are returned; they are fatal to the session.
    /// Storage-class failures and capacity exhaustion drop the row and report it through
    /// the returned [`RowOutcome`].
    pub fn write_row(&mut self, sample: &Sample, stage: Stage) -> Result<RowOutcome, LogError> {
        let row = Self::format_row(sample, stage);
        let Some(sink) = self.sink.as_mut() else {
            telemetry!("{row}");
            self.stats.printed += 1;
            return Ok(RowOutcome::Printed);
        };
        let size = sink.size().map_err(LogError::from);
        let result = match size {
            Ok(size) if size > self.capacity => {
                if !self.overflow {
                    warn!("Flight log exceeded {} bytes, dropping further rows", self.capacity);
                }
                self.overflow = true;
                self.stats.dropped_capacity += 1;
                return Ok(RowOutcome::Dropped(DropReason::Capacity));
            }
            Ok(_) => sink.append(&format!("{row}\n")).map_err(LogError::from),
            Err(e) => Err(e),
        };
        match result {
            Ok(()) => {
                self.stats.written += 1;
                Ok(RowOutcome::Written)
            }
            Err(e) if e.is_recoverable() => {
                warn!("Filesystem not writeable, skipping flight data row: {e:?}");
                self.stats.dropped_storage += 1;
                Ok(RowOutcome::Dropped(DropReason::Storage))
            }
            Err(e) => Err(e),
        }
    }

    /// Finishes the log. Appends the overflow trailer if rows were dropped for capacity.
    ///
    /// Failures are logged and otherwise ignored.
    pub fn close(mut self) -> LogStats {
        let Some(mut sink) = self.sink.take() else {
            return self.stats;
        };
        if self.overflow {
            if let Err(e) = sink.append(&format!("{}\n", Self::OVERFLOW_TRAILER)) {
                warn!("Unable to append overflow trailer: {e}");
            }
        }
        match sink.close() {
            Ok(()) => info!("Closed flight data log"),
            Err(e) => warn!("Unable to close flight data log: {e}"),
        }
        self.stats
    }
}
