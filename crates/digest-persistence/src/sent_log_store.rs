//! Sent log store.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use digest_models::{Channel, SentLog, SentRecord};
use tracing::debug;

use crate::atomic::{atomic_write_json, read_json_document};
use crate::error::Result;

/// Reads and writes the sent log of one channel.
///
/// The log is an audit record (`key -> {hash, sent_at}`) and plays no part in
/// deciding what to send next.
#[derive(Debug, Clone)]
pub struct SentLogStore {
    path: PathBuf,
}

impl SentLogStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Creates the store for a channel's standard file under `state_dir`.
    pub fn for_channel(state_dir: impl AsRef<Path>, channel: Channel) -> Self {
        Self::new(state_dir.as_ref().join(channel.sent_log_file_name()))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads the log; an absent file is an empty log.
    pub fn load(&self) -> Result<SentLog> {
        Ok(read_json_document(&self.path)?.unwrap_or_default())
    }

    /// Replaces the stored log.
    pub fn save(&self, log: &SentLog) -> Result<()> {
        atomic_write_json(&self.path, log)?;
        debug!(path = %self.path.display(), entries = log.len(), "Saved sent log");
        Ok(())
    }

    /// Upserts `key` in `log` and writes the whole log.
    pub fn record(
        &self,
        log: &mut SentLog,
        key: &str,
        hash: &str,
        sent_at: DateTime<Utc>,
    ) -> Result<()> {
        log.insert(
            key.to_string(),
            SentRecord {
                hash: hash.to_string(),
                sent_at,
            },
        );
        self.save(log)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PersistenceError;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_load_missing_is_empty() {
        let dir = tempdir().unwrap();
        let store = SentLogStore::for_channel(dir.path(), Channel::Email);
        assert!(store.load().unwrap().is_empty());
    }

    #[test]
    fn test_record_upserts() {
        let dir = tempdir().unwrap();
        let store = SentLogStore::for_channel(dir.path(), Channel::Email);
        let mut log = store.load().unwrap();

        store.record(&mut log, "a_b", "h1", Utc::now()).unwrap();
        store.record(&mut log, "a_b", "h2", Utc::now()).unwrap();
        store.record(&mut log, "c_d", "h3", Utc::now()).unwrap();

        let loaded = store.load().unwrap();
        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded["a_b"].hash, "h2");
        assert_eq!(loaded, log);
    }

    #[test]
    fn test_document_is_keyed_map() {
        let dir = tempdir().unwrap();
        let store = SentLogStore::new(dir.path().join("sent.json"));
        let mut log = SentLog::new();
        store.record(&mut log, "a_b", "abc", Utc::now()).unwrap();

        let value: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(store.path()).unwrap()).unwrap();
        assert_eq!(value["a_b"]["hash"], "abc");
        assert!(value["a_b"]["sent_at"].is_string());
    }

    #[test]
    fn test_malformed_log_is_corrupt() {
        let dir = tempdir().unwrap();
        let store = SentLogStore::new(dir.path().join("sent.json"));
        fs::write(store.path(), r#"{"a_b": {"hash": 1}}"#).unwrap();

        assert!(matches!(store.load(), Err(PersistenceError::Corrupt { .. })));
    }
}
