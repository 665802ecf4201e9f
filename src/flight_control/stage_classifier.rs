//! Flight stage classification.
//!
//! [`classify`] is a pure function of the current stage, the fresh sample and the
//! session's reference altitudes. Only the transition out of the current stage is
//! evaluated and at most one transition fires per sample.

use super::{flight_stage::Stage, sample::Sample};
use std::time::Duration;

/// Linear acceleration along `y` above which the motor is considered burning (m/s²).
pub const LAUNCH_ACCEL_Y: f32 = 1.0;
/// Vertical velocity proxy separating ascent from apogee (m/s).
pub const ASCENT_VELOCITY_Y: f32 = 1.0;
/// Required altitude loss below apogee before descent is declared (m).
pub const DESCENT_ALTITUDE_DROP: f32 = 15.0;
/// Maximum distance from the ground reference for a landing (m).
pub const LANDING_ALTITUDE_BAND: f32 = 100.0;
/// Per-axis velocity bound for a landing (m/s).
pub const LANDING_VELOCITY_BAND: f32 = 1.0;
/// Pause after apogee that keeps separation transients out of descent detection.
pub const APOGEE_SETTLE: Duration = Duration::from_secs(1);

/// Reference values the classifier reads from the session.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ClassifierContext {
    /// Ground level altitude captured before the loop started.
    pub initial_altitude: f32,
    /// Altitude recorded when `Apogee` was entered.
    pub apogee_altitude: Option<f32>,
}

/// Side effect the session has to apply together with a transition.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TransitionEffect {
    /// Fix the apogee altitude and suspend sampling for `settle`.
    RecordApogee { altitude: f32, settle: Duration },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StageTransition {
    pub next: Stage,
    pub effect: Option<TransitionEffect>,
}

impl StageTransition {
    const fn stay(stage: Stage) -> Self { Self::to(stage) }

    const fn to(stage: Stage) -> Self { Self { next: stage, effect: None } }

    pub fn is_change_from(&self, current: Stage) -> bool { self.next != current }
}

/// Computes the stage that follows `current` given `sample`.
pub fn classify(current: Stage, sample: &Sample, ctx: &ClassifierContext) -> StageTransition {
    let accel_y = sample.accel.y();
    let velocity_y = sample.velocity.y();
    match current {
        Stage::LaunchPad if accel_y > LAUNCH_ACCEL_Y => StageTransition::to(Stage::PoweredAscent),
        Stage::PoweredAscent if accel_y <= LAUNCH_ACCEL_Y && velocity_y > ASCENT_VELOCITY_Y => {
            StageTransition::to(Stage::CoastingAscent)
        }
        Stage::CoastingAscent if velocity_y <= ASCENT_VELOCITY_Y => StageTransition {
            next: Stage::Apogee,
            effect: Some(TransitionEffect::RecordApogee {
                altitude: sample.altitude,
                settle: APOGEE_SETTLE,
            }),
        },
        Stage::Apogee => match ctx.apogee_altitude {
            Some(apogee) if sample.altitude <= apogee - DESCENT_ALTITUDE_DROP => {
                StageTransition::to(Stage::Descent)
            }
            _ => StageTransition::stay(current),
        },
        Stage::Descent
            if (sample.altitude - ctx.initial_altitude).abs() <= LANDING_ALTITUDE_BAND
                && sample.velocity.within(-LANDING_VELOCITY_BAND, LANDING_VELOCITY_BAND) =>
        {
            StageTransition::to(Stage::Landing)
        }
        _ => StageTransition::stay(current),
    }
}
