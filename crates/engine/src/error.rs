//! Error type surfaced by storage engine drivers.

/// An error reported by the storage engine driver.
///
/// Drivers surface failures as opaque messages; the connector layers its own
/// operation context on top. The type is `Clone` because a connection
/// failure is replayed to every subscriber of the connection cell.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct EngineError {
    message: String,
}

impl EngineError {
    /// Create a new engine error with the given message.
    pub fn new(message: impl Into<String>) -> Self {
        Self { message: message.into() }
    }

    /// The driver-supplied error message.
    pub fn message(&self) -> &str {
        &self.message
    }
}
