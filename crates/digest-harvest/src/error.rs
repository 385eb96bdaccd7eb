//! Error types for the harvest pipeline.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while harvesting documentation.
///
/// Most of these stop work on a single repository only; the pipeline logs
/// them and moves on.
#[derive(Debug, Error)]
pub enum HarvestError {
    /// HTTP transport failure.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The GitHub API answered with a non-success status.
    #[error("GitHub API returned {status}: {body}")]
    GitHub { status: u16, body: String },

    /// The repository URL has no `owner/repo` path.
    #[error("Not a repository URL: {0}")]
    InvalidRepoUrl(String),

    /// `git clone` failed or could not be started.
    #[error("Failed to clone {url}: {reason}")]
    Clone { url: String, reason: String },

    /// Filesystem error.
    #[error("IO error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Writing the summary file failed.
    #[error("Failed to write summary: {0}")]
    Persistence(#[from] digest_persistence::PersistenceError),
}

/// Result type for harvest operations.
pub type Result<T> = std::result::Result<T, HarvestError>;

impl HarvestError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        HarvestError::Io {
            path: path.into(),
            source,
        }
    }
}
