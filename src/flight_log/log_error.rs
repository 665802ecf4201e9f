use std::io;
use strum_macros::Display;

/// Errors of the durable flight log.
///
/// The split mirrors how the flight reacts: a storage medium that is not ready is
/// survivable and only costs rows, anything else points at a real malfunction.
#[derive(Debug, Display)]
pub enum LogError {
    /// The medium refused the operation (read-only, full, removed, ...).
    StorageUnwritable(io::ErrorKind),
    /// Any other failure. Never masked.
    Unexpected(String),
}

impl LogError {
    pub fn is_recoverable(&self) -> bool { matches!(self, LogError::StorageUnwritable(_)) }
}

impl std::error::Error for LogError {}

impl From<io::Error> for LogError {
    fn from(err: io::Error) -> Self {
        use io::ErrorKind as K;
        match err.kind() {
            K::PermissionDenied
            | K::ReadOnlyFilesystem
            | K::StorageFull
            | K::NotFound
            | K::WriteZero
            | K::Interrupted
            | K::TimedOut
            | K::WouldBlock => LogError::StorageUnwritable(err.kind()),
            kind if err.raw_os_error().is_some() => LogError::StorageUnwritable(kind),
            _ => LogError::Unexpected(err.to_string()),
        }
    }
}
