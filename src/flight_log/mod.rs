//! Durable and transient flight telemetry logging.

mod flight_logger;
mod log_error;
mod sink;
mod summary;
#[cfg(test)]
mod tests;

pub use flight_logger::{DEFAULT_LOG_CAPACITY, DropReason, FlightLogger, LogMode, LogStats, RowOutcome};
pub use log_error::LogError;
pub use sink::{FileSink, LogSink, probe_storage};
pub use summary::{FlightSummary, write_summary};
