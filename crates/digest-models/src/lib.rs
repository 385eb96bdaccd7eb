//! Core data models for stardigest.
//!
//! This crate provides the fundamental data types used throughout the
//! stardigest system: summaries produced by the harvest pipeline, the
//! persisted delivery state, and the sent log.

pub mod channel;
pub mod outcome;
pub mod state;
pub mod summary;

// Re-export main types
pub use channel::Channel;
pub use outcome::{Outcome, Progress};
pub use state::{CyclePhase, DeliveryState, QueueEntry, SentLog, SentRecord};
pub use summary::{content_hash, Catalog, SummaryItem};
