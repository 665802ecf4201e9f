#![allow(dead_code, clippy::similar_names)]
#![warn(clippy::shadow_reuse, clippy::shadow_same, clippy::builtin_type_shadow)]
mod common;
mod config;
mod flight_control;
mod flight_log;
mod logger;
#[cfg(test)]
mod test_support;

use crate::config::FlightConfig;
use crate::flight_control::{
    FlightSession, Stage,
    sensors::simulated::{FlightProfile, SimulatedBaro, SimulatedImu},
};
use crate::flight_log::{FileSink, LogMode, probe_storage, write_summary};
use std::{process::ExitCode, sync::Arc, time::Duration};
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;

/// Stand-in for the light sleep until the launch switch alarm fires.
const LAUNCH_ARM_DELAY: Duration = Duration::from_secs(1);
/// Time the rocket is left lying on the ground before touchdown is signalled.
const TOUCHDOWN_GRACE: Duration = Duration::from_secs(3);
/// Wall-clock interval at which the touchdown switch is sampled.
const TOUCHDOWN_POLL: Duration = Duration::from_millis(1);

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let config = FlightConfig::from_env();
    let storage_writable = probe_storage(&config.log_path);
    let session_config = config.session_config(storage_writable);
    if session_config.log_mode == LogMode::Durable {
        info!("Running in prod mode, logging to {}", config.log_path.display());
    } else {
        info!("Running in dev mode");
    }

    info!("Waiting for launch switch to be triggered...");
    tokio::time::sleep(LAUNCH_ARM_DELAY).await;
    info!("Launch switch triggered!");
    buzz("armed");

    let profile = Arc::new(FlightProfile::new(config.sim_pad_altitude));
    let mut session = FlightSession::new(
        SimulatedImu::new(Arc::clone(&profile), 0x5EED),
        SimulatedBaro::new(Arc::clone(&profile), 0xBA60),
        session_config,
    );
    let continuation = CancellationToken::new();
    tokio::spawn(announce_stages(session.subscribe_stage()));

    let touchdown_after = config.sim_duration.unwrap_or_else(|| {
        Duration::from_secs_f32(profile.touchdown_time()) + TOUCHDOWN_GRACE
    });
    tokio::spawn(touchdown_switch(Arc::clone(&profile), touchdown_after, continuation.clone()));

    info!("Run flight session...");
    let log_path = config.log_path.clone();
    let result = session.run(|| FileSink::create(&log_path), &continuation).await;
    buzz("stopping");

    let diagnostics = session.diagnostics();
    if diagnostics.overflow {
        warn!("Flight log hit its {} byte capacity", config.log_capacity);
    }
    log!(
        "{} rows written, {} printed, {} dropped",
        diagnostics.log_stats.written,
        diagnostics.log_stats.printed,
        diagnostics.log_stats.dropped_capacity + diagnostics.log_stats.dropped_storage
    );

    let summary = match result {
        Ok(summary) => summary,
        Err(e) => {
            error!("Flight session failed: {e:?}");
            return ExitCode::FAILURE;
        }
    };
    match session.apogee_altitude() {
        Some(apogee) => info!("Apogee at {apogee:.2}m, stage at touchdown: {}", session.stage()),
        None => warn!("No apogee detected, stage at touchdown: {}", session.stage()),
    }
    for line in summary.render().lines() {
        info!("{line}");
    }
    if diagnostics.log_mode == LogMode::Durable {
        if let Err(e) = write_summary(&config.summary_path, &summary) {
            warn!("Unable to write flight summary: {e:?}");
        }
    }
    info!("End of flight");
    ExitCode::SUCCESS
}

/// Clears the continuation signal once `after` of simulated flight time has passed.
async fn touchdown_switch(profile: Arc<FlightProfile>, after: Duration, signal: CancellationToken) {
    let after_secs = after.as_secs_f32();
    while profile.elapsed() < after_secs {
        tokio::time::sleep(TOUCHDOWN_POLL).await;
    }
    info!("Touchdown switch triggered!");
    signal.cancel();
}

/// Operator notification on the stages worth a beep.
async fn announce_stages(mut stages: watch::Receiver<Stage>) {
    while stages.changed().await.is_ok() {
        let current = *stages.borrow_and_update();
        if current.is_announced() {
            buzz(&current.to_string());
        }
        if current.is_terminal() {
            break;
        }
    }
}

fn buzz(reason: &str) {
    info!("\x07Buzz ({reason})");
}
