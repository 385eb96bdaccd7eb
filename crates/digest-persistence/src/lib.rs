//! Persistence layer for stardigest.
//!
//! This crate owns every file the delivery side reads or writes:
//!
//! - [`QueueStore`]: the per-channel queue document (`pending` + `history`)
//! - [`SentLogStore`]: the per-channel sent log
//! - [`SummaryStore`]: read-only scan of generated `SUMMARY.md` files
//!
//! JSON documents are written atomically (write to temp file, then rename)
//! and are read whole. A missing document is an empty state; a malformed one
//! is reported as [`PersistenceError::Corrupt`] and never overwritten.
//!
//! # Example
//!
//! ```no_run
//! use digest_models::Channel;
//! use digest_persistence::{QueueStore, SummaryStore};
//!
//! let summaries = SummaryStore::new("github_docs");
//! let queue = QueueStore::for_channel(".", Channel::Email);
//!
//! let catalog = summaries.list_available();
//! let state = queue.load().unwrap();
//! println!("{} available, {} pending", catalog.len(), state.pending.len());
//! ```

pub mod atomic;
pub mod error;
pub mod queue_store;
pub mod sent_log_store;
pub mod summary_store;

pub use error::{PersistenceError, Result};
pub use queue_store::QueueStore;
pub use sent_log_store::SentLogStore;
pub use summary_store::{SummaryStore, SUMMARY_FILE_NAME};
