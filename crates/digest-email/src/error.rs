//! Error types for the email transport.

use thiserror::Error;

/// Errors that can occur while building or sending mail.
#[derive(Debug, Error)]
pub enum EmailError {
    /// Sender or recipient is not a valid mailbox.
    #[error("Invalid email address '{address}': {reason}")]
    InvalidAddress { address: String, reason: String },

    /// The message could not be assembled.
    #[error("Failed to build message: {0}")]
    Build(#[from] lettre::error::Error),

    /// Connection, TLS, authentication, or submission failed.
    #[error("SMTP error: {0}")]
    Smtp(#[from] lettre::transport::smtp::Error),
}

/// Result type for email operations.
pub type Result<T> = std::result::Result<T, EmailError>;
