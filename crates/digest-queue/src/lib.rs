//! Delivery queue for stardigest.
//!
//! This crate provides the [`DeliveryQueue`], the state machine that decides
//! which summary goes out next on a channel:
//!
//! - New summaries are placed at the front of the pending queue, newest first
//! - Sent keys move to the cycle history
//! - When nothing is pending, the history is re-queued in sent order
//! - Keys whose summary disappeared are dropped instead of sent
//!
//! # Example
//!
//! ```no_run
//! use chrono::Utc;
//! use digest_models::Channel;
//! use digest_persistence::{QueueStore, SummaryStore};
//! use digest_queue::DeliveryQueue;
//!
//! let catalog = SummaryStore::new("github_docs").list_available();
//! let mut queue = DeliveryQueue::open(QueueStore::for_channel(".", Channel::Email)).unwrap();
//!
//! queue.prepare(&catalog, Utc::now()).unwrap();
//! if let Some(item) = queue.next_valid(&catalog, Utc::now()).unwrap() {
//!     // ... deliver item.content ...
//!     queue.commit(&item.key).unwrap();
//! }
//! ```

pub mod error;
pub mod queue;

pub use error::{QueueError, Result};
pub use queue::DeliveryQueue;
