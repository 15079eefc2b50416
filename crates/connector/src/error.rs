//! Error types for connector operations.
//!
//! Two failure classes exist: connection failures (the open or upgrade
//! request errored; fatal to every pending and future operation on the
//! instance, never retried) and operation failures (a single native request
//! errored, tagged with the operation it came from). Not-found is neither:
//! a missing key is a normal `Ok(None)` from `get` and a no-op success from
//! `remove`.
//!
//! Failures are returned to the caller, not logged or swallowed here;
//! presentation is the host application's responsibility.

use asyncstore_engine::EngineError;
use std::fmt;

/// Result type alias for connector operations.
pub type StoreResult<T, E = StoreError> = Result<T, E>;

/// Contextual tag identifying which operation a failure came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OpContext {
    /// A `get` request.
    Getter,
    /// A `set` request (add or put).
    Setter,
    /// A `remove` request.
    Remover,
    /// A `clear` request.
    Clearer,
}

impl fmt::Display for OpContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Getter => write!(f, "getter"),
            Self::Setter => write!(f, "setter"),
            Self::Remover => write!(f, "remover"),
            Self::Clearer => write!(f, "clearer"),
        }
    }
}

/// Error type for connector operations.
///
/// `Clone` because a connection failure is replayed to every subscriber of
/// the connection cell.
#[derive(Debug, Clone, thiserror::Error)]
pub enum StoreError {
    /// The connection request failed. Fatal to this connector instance;
    /// nothing is retried automatically.
    #[error("connection request failed: {0}")]
    Connection(#[source] EngineError),

    /// A native get/add/put/delete/clear request failed.
    #[error("{context} request failed: {source}")]
    Operation {
        /// Which operation the failing request belonged to.
        context: OpContext,
        /// The underlying driver error.
        #[source]
        source: EngineError,
    },
}

impl StoreError {
    /// Create an operation failure with the given context.
    pub(crate) const fn operation(context: OpContext, source: EngineError) -> Self {
        Self::Operation { context, source }
    }

    /// Whether this is a connection failure.
    pub const fn is_connection_failure(&self) -> bool {
        matches!(self, Self::Connection(_))
    }
}
