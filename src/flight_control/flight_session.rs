use super::{
    flight_stage::Stage,
    sample::Sample,
    sensors::{
        BaroDevice, BaroReading, BarometricSource, ImuDevice, InertialSource, IntegrationMode,
        SensorError, VelocityEstimator,
    },
    stage_classifier::{ClassifierContext, TransitionEffect, classify},
};
use crate::flight_log::{DEFAULT_LOG_CAPACITY, FlightLogger, FlightSummary, LogError, LogMode, LogSink, LogStats};
use crate::{event, info, log, stage, warn};
use std::time::Duration;
use strum_macros::Display;
use tokio::{sync::watch, time::Instant};
use tokio_util::sync::CancellationToken;

/// Lifecycle of a [`FlightSession`].
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    Initializing,
    Active,
    Closed,
}

/// Fatal session errors. The flight log is already closed when one is returned.
#[derive(Debug, Display)]
pub enum FlightError {
    /// No barometric sample could be taken to fix the ground reference.
    NoGroundReference(SensorError),
    /// The flight log failed in a way that is not a storage medium problem.
    Log(LogError),
    /// The requested operation is not valid in the current phase.
    InvalidPhase(SessionPhase),
}

impl std::error::Error for FlightError {}

impl From<LogError> for FlightError {
    fn from(err: LogError) -> Self { FlightError::Log(err) }
}

/// Per-session settings handed over by the boot sequence.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SessionConfig {
    /// Requested logging mode, decided by the storage writability probe.
    pub log_mode: LogMode,
    /// Durable log capacity in bytes.
    pub log_capacity: u64,
    pub integration: IntegrationMode,
    /// Replaces the measured step duration with a constant, for replay and simulation.
    pub fixed_dt: Option<Duration>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            log_mode: LogMode::Transient,
            log_capacity: DEFAULT_LOG_CAPACITY,
            integration: IntegrationMode::Instantaneous,
            fixed_dt: None,
        }
    }
}

/// Counters describing how the session went, for postflight diagnosis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionDiagnostics {
    pub iterations: u64,
    pub skipped_iterations: u64,
    pub log_mode: LogMode,
    pub overflow: bool,
    pub log_stats: LogStats,
}

/// Running maxima of the session. Every field only ever grows.
#[derive(Debug, Clone, Copy, PartialEq)]
struct PeakTracker {
    max_altitude: f32,
    max_velocity_y: f32,
    max_acceleration_y: f32,
}

impl PeakTracker {
    fn new(initial_altitude: f32) -> Self {
        Self { max_altitude: initial_altitude, max_velocity_y: 0.0, max_acceleration_y: 0.0 }
    }

    fn update(&mut self, sample: &Sample) {
        self.max_altitude = self.max_altitude.max(sample.altitude);
        self.max_velocity_y = self.max_velocity_y.max(sample.velocity.y());
        self.max_acceleration_y = self.max_acceleration_y.max(sample.accel.y());
    }
}

/// One flight, from calibration on the pad until the continuation signal is cleared.
///
/// The session exclusively owns both sensor sources and the flight log. It samples,
/// classifies and logs in a single cooperative loop with one suspension point per
/// iteration, and never stops on its own: only the external signal ends it.
pub struct FlightSession<I: ImuDevice, B: BaroDevice, S: LogSink> {
    inertial: InertialSource<I>,
    barometric: BarometricSource<B>,
    estimator: VelocityEstimator,
    config: SessionConfig,
    logger: Option<FlightLogger<S>>,
    phase: SessionPhase,
    stage: Stage,
    stage_tx: watch::Sender<Stage>,
    context: ClassifierContext,
    peaks: PeakTracker,
    clock: Instant,
    iterations: u64,
    skipped_iterations: u64,
    log_mode: LogMode,
    overflow: bool,
    log_stats: LogStats,
}

impl<I: ImuDevice, B: BaroDevice, S: LogSink> FlightSession<I, B, S> {
    /// Barometer reads attempted to fix the ground reference.
    const GROUND_REFERENCE_ATTEMPTS: usize = 10;

    pub fn new(imu: I, baro: B, config: SessionConfig) -> Self {
        let (stage_tx, _) = watch::channel(Stage::LaunchPad);
        Self {
            inertial: InertialSource::new(imu),
            barometric: BarometricSource::new(baro),
            estimator: VelocityEstimator::new(config.integration),
            config,
            logger: None,
            phase: SessionPhase::Initializing,
            stage: Stage::LaunchPad,
            stage_tx,
            context: ClassifierContext::default(),
            peaks: PeakTracker::new(0.0),
            clock: Instant::now(),
            iterations: 0,
            skipped_iterations: 0,
            log_mode: config.log_mode,
            overflow: false,
            log_stats: LogStats::default(),
        }
    }

    pub fn phase(&self) -> SessionPhase { self.phase }

    pub fn stage(&self) -> Stage { self.stage }

    /// Stage updates for outward notification (e.g. the buzzer).
    pub fn subscribe_stage(&self) -> watch::Receiver<Stage> { self.stage_tx.subscribe() }

    pub fn initial_altitude(&self) -> f32 { self.context.initial_altitude }

    pub fn apogee_altitude(&self) -> Option<f32> { self.context.apogee_altitude }

    pub fn log_mode(&self) -> LogMode { self.log_mode }

    pub fn diagnostics(&self) -> SessionDiagnostics {
        let (overflow, log_stats) = match &self.logger {
            Some(logger) => (logger.overflow(), logger.stats()),
            None => (self.overflow, self.log_stats),
        };
        SessionDiagnostics {
            iterations: self.iterations,
            skipped_iterations: self.skipped_iterations,
            log_mode: self.log_mode,
            overflow,
            log_stats,
        }
    }

    /// Peak metrics of the flight. Only available once the session is closed.
    pub fn summary(&self) -> Option<FlightSummary> {
        (self.phase == SessionPhase::Closed).then(|| FlightSummary {
            max_altitude_agl: self.peaks.max_altitude - self.context.initial_altitude,
            max_velocity_y: self.peaks.max_velocity_y,
            max_acceleration_y: self.peaks.max_acceleration_y,
        })
    }

    /// Calibrates the inertial source, fixes the ground reference and opens the log.
    ///
    /// # Arguments
    /// * `opener` - Creates the durable log sink. Only called in durable mode.
    ///
    /// # Errors
    /// [`FlightError::NoGroundReference`] if the barometer never answers, in which case
    /// the session is closed. [`FlightError::InvalidPhase`] if called twice.
    pub async fn initialize<F>(&mut self, opener: F) -> Result<(), FlightError>
    where
        F: FnOnce() -> std::io::Result<S>,
    {
        if self.phase != SessionPhase::Initializing {
            return Err(FlightError::InvalidPhase(self.phase));
        }
        info!("Flight stage: {}", self.stage);
        info!("Starting acceleration stabilisation...");
        self.inertial.calibrate();
        info!("Calibration finished, gravity estimate {}", self.inertial.gravity());

        let ground = match self.ground_reference().await {
            Ok(reading) => reading,
            Err(e) => {
                self.phase = SessionPhase::Closed;
                return Err(FlightError::NoGroundReference(e));
            }
        };
        self.context.initial_altitude = ground.altitude;
        self.peaks = PeakTracker::new(ground.altitude);
        info!("Ground reference fixed at {:.2}m ({:.2}hPa)", ground.altitude, ground.pressure);

        let logger = FlightLogger::open(self.config.log_mode, self.config.log_capacity, opener);
        self.log_mode = logger.mode();
        self.logger = Some(logger);
        self.clock = Instant::now();
        self.phase = SessionPhase::Active;
        Ok(())
    }

    async fn ground_reference(&mut self) -> Result<BaroReading, SensorError> {
        let mut last_err = SensorError::NotReady;
        for _ in 0..Self::GROUND_REFERENCE_ATTEMPTS {
            match self.barometric.sample() {
                Ok(reading) => return Ok(reading),
                Err(e) => {
                    warn!("Ground reference read failed: {e:?}");
                    last_err = e;
                }
            }
            tokio::task::yield_now().await;
        }
        Err(last_err)
    }

    /// Runs the sampling loop until `signal` is cancelled, then closes the session.
    ///
    /// The signal is only checked between iterations, so a started
    /// sample/classify/log cycle always completes.
    ///
    /// # Errors
    /// Unexpected flight log failures end the loop early. The log is closed and the
    /// summary is available in that case too.
    pub async fn fly(&mut self, signal: &CancellationToken) -> Result<FlightSummary, FlightError> {
        if self.phase != SessionPhase::Active {
            return Err(FlightError::InvalidPhase(self.phase));
        }
        let mut outcome = Ok(());
        while !signal.is_cancelled() {
            match self.step() {
                Ok(pause) => Self::suspend(pause).await,
                Err(e) => {
                    outcome = Err(e);
                    break;
                }
            }
        }
        self.close();
        outcome?;
        self.summary().ok_or(FlightError::InvalidPhase(self.phase))
    }

    /// Convenience wrapper around [`Self::initialize`] and [`Self::fly`].
    ///
    /// # Errors
    /// See the two wrapped operations.
    pub async fn run<F>(
        &mut self,
        opener: F,
        signal: &CancellationToken,
    ) -> Result<FlightSummary, FlightError>
    where
        F: FnOnce() -> std::io::Result<S>,
    {
        self.initialize(opener).await?;
        self.fly(signal).await
    }

    /// One sample/classify/log cycle.
    ///
    /// # Returns
    /// The pause to take instead of the regular yield, if the cycle asked for one.
    fn step(&mut self) -> Result<Option<Duration>, FlightError> {
        self.iterations += 1;
        let step_start = std::time::Instant::now();
        let readings = self
            .inertial
            .sample()
            .and_then(|imu| self.barometric.sample().map(|baro| (imu, baro)));
        let (imu, baro) = match readings {
            Ok(readings) => readings,
            Err(e) => {
                warn!("Sensor read failed, skipping iteration {}: {e:?}", self.iterations);
                self.skipped_iterations += 1;
                return Ok(None);
            }
        };
        let dt = self.config.fixed_dt.unwrap_or_else(|| step_start.elapsed());
        let velocity = self.estimator.estimate(imu.0, dt);
        let sample = Sample::new(self.clock.elapsed().as_secs_f64(), imu, baro, velocity);

        let transition = classify(self.stage, &sample, &self.context);
        let mut pause = None;
        if transition.is_change_from(self.stage) {
            if let Some(TransitionEffect::RecordApogee { altitude, settle }) = transition.effect {
                self.context.apogee_altitude.get_or_insert(altitude);
                stage!("Apogee detected at {altitude:.2}m");
                pause = Some(settle);
            }
            self.stage = transition.next;
            stage!("Flight stage: {}", self.stage);
            self.stage_tx.send_replace(self.stage);
        }

        if let Some(logger) = self.logger.as_mut() {
            logger.write_row(&sample, self.stage)?;
        }
        self.peaks.update(&sample);
        event!("{} a={} v={} alt={:.2}", self.stage, sample.accel, sample.velocity, sample.altitude);
        Ok(pause)
    }

    async fn suspend(pause: Option<Duration>) {
        match pause {
            Some(duration) => tokio::time::sleep(duration).await,
            None => tokio::task::yield_now().await,
        }
    }

    fn close(&mut self) {
        if let Some(logger) = self.logger.take() {
            self.overflow = logger.overflow();
            self.log_stats = logger.close();
        }
        self.phase = SessionPhase::Closed;
        log!("Flight stage: {}", self.stage);
        if let Some(summary) = self.summary() {
            log!(
                "Session closed: {} iterations, {} skipped, peak {:.2}m AGL",
                self.iterations,
                self.skipped_iterations,
                summary.max_altitude_agl
            );
        }
    }
}
