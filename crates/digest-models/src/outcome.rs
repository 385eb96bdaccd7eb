//! Results of a delivery invocation.

use std::fmt;

/// What one `run_one_delivery` call did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The item with this key was delivered and recorded.
    Sent(String),
    /// There was nothing to send.
    Idle,
    /// Delivery of the head item failed; state is unchanged and it will be
    /// retried on the next invocation.
    Failed { key: String, reason: String },
}

impl Outcome {
    pub fn key(&self) -> Option<&str> {
        match self {
            Outcome::Sent(key) | Outcome::Failed { key, .. } => Some(key),
            Outcome::Idle => None,
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Sent(key) => write!(f, "sent {}", key),
            Outcome::Idle => write!(f, "nothing to send"),
            Outcome::Failed { key, reason } => write!(f, "failed to send {}: {}", key, reason),
        }
    }
}

/// Position of an item within the current cycle, 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Progress {
    pub position: usize,
    pub total: usize,
}

impl fmt::Display for Progress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.position, self.total)
    }
}
