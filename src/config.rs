use crate::flight_control::{SessionConfig, sensors::IntegrationMode};
use crate::flight_log::{DEFAULT_LOG_CAPACITY, LogMode};
use crate::warn;
use std::{env, path::PathBuf, str::FromStr, time::Duration};

/// Boot-time configuration of the flight computer.
///
/// Every value has a compiled-in default that can be overridden through the environment.
#[derive(Debug, Clone, PartialEq)]
pub struct FlightConfig {
    pub log_path: PathBuf,
    pub summary_path: PathBuf,
    pub log_capacity: u64,
    /// Forces transient logging regardless of the storage probe.
    pub dev_mode: bool,
    pub integration: IntegrationMode,
    pub fixed_dt: Option<Duration>,
    /// Length of the simulated flight before touchdown is signalled.
    pub sim_duration: Option<Duration>,
    /// Elevation of the simulated pad above mean sea level.
    pub sim_pad_altitude: f32,
}

impl FlightConfig {
    const DEF_LOG_PATH: &'static str = "/data/flight-data.csv";
    const DEF_SUMMARY_PATH: &'static str = "/data/max_data.txt";
    const DEF_SIM_PAD_ALTITUDE: f32 = 120.0;

    /// Reads the configuration from `FLIGHT_*` environment variables.
    pub fn from_env() -> Self { Self::from_lookup(|key| env::var(key).ok()) }

    /// Builds the configuration from an arbitrary key lookup.
    ///
    /// Unparsable values fall back to their default with a warning.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let flag = |key: &str| {
            lookup(key).is_some_and(|v| matches!(v.trim().to_lowercase().as_str(), "1" | "true" | "yes"))
        };
        let log_capacity = parse_or(&lookup, "FLIGHT_LOG_CAPACITY", DEFAULT_LOG_CAPACITY);
        let fixed_dt = parse_opt::<u64>(&lookup, "FLIGHT_FIXED_DT_MS").map(Duration::from_millis);
        let sim_duration = parse_opt::<f32>(&lookup, "FLIGHT_SIM_DURATION")
            .and_then(|secs| match Duration::try_from_secs_f32(secs) {
                Ok(duration) => Some(duration),
                Err(e) => {
                    warn!("Ignoring invalid FLIGHT_SIM_DURATION={secs}: {e}");
                    None
                }
            })
            .filter(|duration| !duration.is_zero());
        Self {
            log_path: lookup("FLIGHT_LOG_PATH").map_or_else(|| Self::DEF_LOG_PATH.into(), PathBuf::from),
            summary_path: lookup("FLIGHT_SUMMARY_PATH")
                .map_or_else(|| Self::DEF_SUMMARY_PATH.into(), PathBuf::from),
            log_capacity,
            dev_mode: flag("FLIGHT_DEV_MODE"),
            integration: if flag("FLIGHT_ACCUMULATE_VELOCITY") {
                IntegrationMode::Accumulating
            } else {
                IntegrationMode::Instantaneous
            },
            fixed_dt,
            sim_duration,
            sim_pad_altitude: parse_or(&lookup, "FLIGHT_SIM_PAD_ALTITUDE", Self::DEF_SIM_PAD_ALTITUDE),
        }
    }

    /// Session settings for the given storage probe result.
    pub fn session_config(&self, storage_writable: bool) -> SessionConfig {
        let log_mode =
            if storage_writable && !self.dev_mode { LogMode::Durable } else { LogMode::Transient };
        SessionConfig {
            log_mode,
            log_capacity: self.log_capacity,
            integration: self.integration,
            fixed_dt: self.fixed_dt,
        }
    }
}

impl Default for FlightConfig {
    fn default() -> Self { Self::from_lookup(|_| None) }
}

fn parse_opt<T: FromStr>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<T> {
    let raw = lookup(key)?;
    match raw.trim().parse() {
        Ok(v) => Some(v),
        Err(_) => {
            warn!("Ignoring invalid {key}={raw:?}");
            None
        }
    }
}

fn parse_or<T: FromStr>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> T {
    parse_opt(lookup, key).unwrap_or(default)
}
