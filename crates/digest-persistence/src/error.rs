//! Error types for the state files.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Failure to load or store a persisted document.
#[derive(Error, Debug)]
pub enum PersistenceError {
    #[error("cannot read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("cannot write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("cannot create state directory {}: {source}", path.display())]
    CreateDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// In-memory state could not be encoded as JSON.
    #[error("cannot encode document: {0}")]
    Encode(#[from] serde_json::Error),

    /// A persisted document exists but cannot be trusted. Never overwritten.
    #[error("corrupt document {}: {reason}", path.display())]
    Corrupt { path: PathBuf, reason: String },
}

/// Result type alias for persistence operations.
pub type Result<T> = std::result::Result<T, PersistenceError>;
