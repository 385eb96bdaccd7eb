//! The delivery seam between the cycle controller and a messaging service.

use async_trait::async_trait;
use digest_models::{Channel, Progress, SummaryItem};
use thiserror::Error;

/// Why a single delivery attempt failed.
///
/// Neither variant is fatal: the controller reports it as a failed outcome
/// and the item stays at the head of the queue.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    /// The summary could not be turned into a message.
    #[error("render failed: {0}")]
    Render(String),

    /// The service rejected the message or could not be reached.
    #[error("send failed: {0}")]
    Send(String),
}

/// A channel that can deliver one summary.
///
/// Implementations must treat a partially delivered item as a failure.
///
/// # Example
///
/// ```ignore
/// struct Stdout;
///
/// #[async_trait]
/// impl Transport for Stdout {
///     fn channel(&self) -> Channel { Channel::Email }
///     async fn deliver(
///         &self,
///         item: &SummaryItem,
///         progress: Progress,
///     ) -> Result<(), TransportError> {
///         println!("[{}] {}", progress, item.content);
///         Ok(())
///     }
/// }
/// ```
#[async_trait]
pub trait Transport: Send + Sync {
    /// Which queue this transport drains.
    fn channel(&self) -> Channel;

    /// Delivers `item`; `progress` is its position in the current cycle.
    async fn deliver(&self, item: &SummaryItem, progress: Progress) -> Result<(), TransportError>;
}
