mod flight_session;
mod flight_stage;
mod sample;
pub mod sensors;
pub mod stage_classifier;

pub use flight_session::{FlightError, FlightSession, SessionConfig, SessionDiagnostics, SessionPhase};
pub use flight_stage::Stage;
pub use sample::Sample;
