//! Persisted delivery state and sent log documents.
//!
//! Both documents are read and written whole. Unknown fields are rejected so
//! that a hand-edited or foreign document is reported instead of silently
//! reinterpreted.

use std::collections::{BTreeMap, HashSet};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A pending reference to a summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct QueueEntry {
    /// Key of the summary item.
    pub key: String,

    /// When the key was placed in the pending queue.
    pub enqueued_at: DateTime<Utc>,
}

impl QueueEntry {
    pub fn new(key: impl Into<String>, enqueued_at: DateTime<Utc>) -> Self {
        Self {
            key: key.into(),
            enqueued_at,
        }
    }
}

/// Where the delivery cycle currently stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CyclePhase {
    /// Nothing pending and nothing sent.
    Empty,
    /// Items are waiting to be sent.
    Cycling,
    /// Every known item has been sent in this cycle.
    Exhausted,
}

impl std::fmt::Display for CyclePhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            CyclePhase::Empty => "empty",
            CyclePhase::Cycling => "cycling",
            CyclePhase::Exhausted => "exhausted",
        };
        write!(f, "{}", s)
    }
}

/// The durable queue document.
///
/// ```json
/// {
///   "pending": [{ "key": "owner_repo", "enqueued_at": "2026-01-01T00:00:00Z" }],
///   "history": ["other_repo"]
/// }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DeliveryState {
    /// Items still to send in this cycle, head first.
    #[serde(default)]
    pub pending: Vec<QueueEntry>,

    /// Keys sent in this cycle, oldest first.
    #[serde(default)]
    pub history: Vec<String>,
}

impl DeliveryState {
    pub fn phase(&self) -> CyclePhase {
        match (self.pending.is_empty(), self.history.is_empty()) {
            (false, _) => CyclePhase::Cycling,
            (true, true) => CyclePhase::Empty,
            (true, false) => CyclePhase::Exhausted,
        }
    }

    /// Returns true if the key is pending or already sent this cycle.
    pub fn is_known(&self, key: &str) -> bool {
        self.pending.iter().any(|e| e.key == key) || self.history.iter().any(|k| k == key)
    }

    /// Checks that keys are unique within and across `pending` and `history`.
    ///
    /// Returns a description of the first violation found.
    pub fn check_invariants(&self) -> Result<(), String> {
        let mut seen = HashSet::new();
        for entry in &self.pending {
            if !seen.insert(entry.key.as_str()) {
                return Err(format!("duplicate pending key '{}'", entry.key));
            }
        }
        let mut sent = HashSet::new();
        for key in &self.history {
            if !sent.insert(key.as_str()) {
                return Err(format!("duplicate history key '{}'", key));
            }
            if seen.contains(key.as_str()) {
                return Err(format!("key '{}' is both pending and sent", key));
            }
        }
        Ok(())
    }
}

/// One sent-log entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SentRecord {
    /// Content hash of the summary at the time it was sent.
    pub hash: String,

    /// When it was delivered.
    pub sent_at: DateTime<Utc>,
}

/// The sent-log document, keyed by item key.
pub type SentLog = BTreeMap<String, SentRecord>;

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(key: &str) -> QueueEntry {
        QueueEntry::new(key, Utc::now())
    }

    #[test]
    fn test_phase() {
        let mut state = DeliveryState::default();
        assert_eq!(state.phase(), CyclePhase::Empty);

        state.history.push("a".into());
        assert_eq!(state.phase(), CyclePhase::Exhausted);

        state.pending.push(entry("b"));
        assert_eq!(state.phase(), CyclePhase::Cycling);
    }

    #[test]
    fn test_check_invariants_accepts_disjoint() {
        let state = DeliveryState {
            pending: vec![entry("a"), entry("b")],
            history: vec!["c".into()],
        };
        assert!(state.check_invariants().is_ok());
        assert!(state.is_known("a"));
        assert!(state.is_known("c"));
        assert!(!state.is_known("d"));
    }

    #[test]
    fn test_check_invariants_rejects_duplicates() {
        let dup_pending = DeliveryState {
            pending: vec![entry("a"), entry("a")],
            history: vec![],
        };
        assert!(dup_pending.check_invariants().is_err());

        let dup_history = DeliveryState {
            pending: vec![],
            history: vec!["a".into(), "a".into()],
        };
        assert!(dup_history.check_invariants().is_err());

        let overlap = DeliveryState {
            pending: vec![entry("a")],
            history: vec!["a".into()],
        };
        let err = overlap.check_invariants().unwrap_err();
        assert!(err.contains("both pending and sent"));
    }

    #[test]
    fn test_document_shape() {
        let json = r#"{
            "pending": [{"key": "a_b", "enqueued_at": "2026-01-01T00:00:00Z"}],
            "history": ["c_d"]
        }"#;
        let state: DeliveryState = serde_json::from_str(json).unwrap();
        assert_eq!(state.pending[0].key, "a_b");
        assert_eq!(state.history, vec!["c_d".to_string()]);

        let empty: DeliveryState = serde_json::from_str("{}").unwrap();
        assert_eq!(empty, DeliveryState::default());
    }

    #[test]
    fn test_unknown_fields_rejected() {
        let legacy = r#"{"queue": [], "sent_order": []}"#;
        assert!(serde_json::from_str::<DeliveryState>(legacy).is_err());

        let record = r#"{"hash": "x", "sent_at": "2026-01-01T00:00:00Z", "extra": 1}"#;
        assert!(serde_json::from_str::<SentRecord>(record).is_err());
    }
}
