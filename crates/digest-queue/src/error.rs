//! Error types for delivery queue operations.

use digest_persistence::PersistenceError;
use thiserror::Error;

/// Errors that can occur during delivery queue operations.
#[derive(Error, Debug)]
pub enum QueueError {
    /// Key is not in the pending queue.
    #[error("key is not pending: {0}")]
    NotPending(String),

    /// Persistence error.
    #[error("persistence error: {0}")]
    Persistence(#[from] PersistenceError),
}

/// Result type alias for delivery queue operations.
pub type Result<T> = std::result::Result<T, QueueError>;
