//! Queue store for the per-channel delivery state.

use std::path::{Path, PathBuf};

use digest_models::{Channel, DeliveryState};
use tracing::debug;

use crate::atomic::{atomic_write_json, read_json_document};
use crate::error::{PersistenceError, Result};

/// Reads and writes the queue document of one channel.
///
/// ```text
/// state_dir/
/// ├── summary_queue.json            # email
/// └── summary_queue_telegram.json   # telegram
/// ```
#[derive(Debug, Clone)]
pub struct QueueStore {
    path: PathBuf,
}

impl QueueStore {
    /// Creates a store backed by an explicit file path.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Creates the store for a channel's standard file under `state_dir`.
    pub fn for_channel(state_dir: impl AsRef<Path>, channel: Channel) -> Self {
        Self::new(state_dir.as_ref().join(channel.queue_file_name()))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads the delivery state, or an empty state if the file is absent.
    ///
    /// Documents with duplicate or overlapping keys are rejected as corrupt.
    pub fn load(&self) -> Result<DeliveryState> {
        let state: DeliveryState = read_json_document(&self.path)?.unwrap_or_default();
        state
            .check_invariants()
            .map_err(|reason| PersistenceError::Corrupt {
                path: self.path.clone(),
                reason,
            })?;
        debug!(
            path = %self.path.display(),
            pending = state.pending.len(),
            history = state.history.len(),
            "Loaded delivery state"
        );
        Ok(state)
    }

    /// Replaces the stored document.
    pub fn save(&self, state: &DeliveryState) -> Result<()> {
        atomic_write_json(&self.path, state)?;
        debug!(path = %self.path.display(), "Saved delivery state");
        Ok(())
    }
}
