//! Error types for configuration and the cycle controller.

use digest_persistence::PersistenceError;
use digest_queue::QueueError;
use thiserror::Error;

/// Invalid or incomplete configuration. Always fatal.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// A required variable is unset or empty.
    #[error("missing required environment variable {0}")]
    MissingVar(&'static str),

    /// A variable is set but cannot be used.
    #[error("invalid value for {name}: {reason}")]
    InvalidVar { name: &'static str, reason: String },
}

/// Unrecoverable errors from a delivery invocation.
///
/// Transport failures are not errors; they become
/// [`Outcome::Failed`](digest_models::Outcome::Failed).
#[derive(Error, Debug)]
pub enum ControllerError {
    /// A persisted document could not be read, parsed, or written.
    #[error("storage error: {0}")]
    Persistence(#[from] PersistenceError),

    /// The queue rejected an operation.
    #[error("queue error: {0}")]
    Queue(#[from] QueueError),
}

/// Result type alias for controller operations.
pub type Result<T> = std::result::Result<T, ControllerError>;
