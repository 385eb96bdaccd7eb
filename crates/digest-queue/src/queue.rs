//! DeliveryQueue - the per-channel send cycle.
//!
//! States, derived from the persisted document:
//! - `Empty`: nothing pending, nothing sent
//! - `Cycling`: items pending
//! - `Exhausted`: nothing pending, every known item sent this cycle
//!
//! Mutations happen in memory. The queue writes its document only when the
//! in-memory state differs from what was last persisted, so an idle
//! invocation leaves the filesystem untouched.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use digest_models::{Catalog, CyclePhase, DeliveryState, Progress, QueueEntry, SummaryItem};
use digest_persistence::QueueStore;
use tracing::{debug, info, warn};

use crate::error::{QueueError, Result};

/// Durable queue of summaries waiting to be sent on one channel.
///
/// # Ordering Rules
///
/// 1. Newly discovered keys go to the front, most recently modified first,
///    ties broken by ascending key
/// 2. Keys already pending keep their relative order
/// 3. A restarted cycle sends keys in the order they were sent last cycle
///
/// # Invariants
///
/// `pending` and `history` never share a key and neither contains duplicates.
pub struct DeliveryQueue {
    /// Backing document.
    store: QueueStore,
    /// Current in-memory state.
    state: DeliveryState,
    /// State as last read from or written to the store.
    persisted: DeliveryState,
}

impl DeliveryQueue {
    /// Loads the queue from its store; an absent document is an empty queue.
    pub fn open(store: QueueStore) -> Result<Self> {
        let state = store.load()?;
        Ok(Self {
            store,
            persisted: state.clone(),
            state,
        })
    }

    pub fn state(&self) -> &DeliveryState {
        &self.state
    }

    pub fn phase(&self) -> CyclePhase {
        self.state.phase()
    }

    /// Pending keys, head first.
    pub fn pending_keys(&self) -> Vec<&str> {
        self.state.pending.iter().map(|e| e.key.as_str()).collect()
    }

    /// Keys sent this cycle, oldest first.
    pub fn history(&self) -> &[String] {
        &self.state.history
    }

    /// Returns the head of the pending queue without validating it.
    pub fn head(&self) -> Option<&QueueEntry> {
        self.state.pending.first()
    }

    /// Position of the head item in the current cycle.
    ///
    /// Only keys still present in `catalog` are counted, so a summary that
    /// was deleted mid-cycle no longer inflates the total.
    pub fn progress(&self, catalog: &Catalog) -> Progress {
        let sent = self
            .state
            .history
            .iter()
            .filter(|key| catalog.contains(key))
            .count();
        let pending = self
            .state
            .pending
            .iter()
            .filter(|entry| catalog.contains(&entry.key))
            .count();
        Progress {
            position: sent + 1,
            total: sent + pending,
        }
    }

    /// Adds every available key that is neither pending nor sent to the front
    /// of the queue.
    ///
    /// # Returns
    ///
    /// The newly queued keys in their queue order.
    pub fn reconcile(&mut self, catalog: &Catalog, now: DateTime<Utc>) -> Vec<String> {
        let known: HashSet<&str> = self
            .state
            .pending
            .iter()
            .map(|e| e.key.as_str())
            .chain(self.state.history.iter().map(String::as_str))
            .collect();

        let mut arrivals: Vec<&SummaryItem> = catalog
            .items()
            .filter(|item| !known.contains(item.key.as_str()))
            .collect();

        if arrivals.is_empty() {
            return Vec::new();
        }

        // Newest first; key order makes equal timestamps deterministic
        arrivals.sort_by(|a, b| {
            b.modified_at
                .cmp(&a.modified_at)
                .then_with(|| a.key.cmp(&b.key))
        });

        let new_keys: Vec<String> = arrivals.iter().map(|item| item.key.clone()).collect();
        let mut pending: Vec<QueueEntry> = new_keys
            .iter()
            .map(|key| QueueEntry::new(key.clone(), now))
            .collect();
        pending.append(&mut self.state.pending);
        self.state.pending = pending;

        info!(count = new_keys.len(), keys = ?new_keys, "Queued new summaries");
        new_keys
    }

    /// Starts a new cycle when nothing is pending.
    ///
    /// Every sent key whose summary still exists is re-queued in its original
    /// sent order and the history is cleared. Does nothing while items are
    /// pending.
    ///
    /// # Returns
    ///
    /// The number of re-queued keys.
    pub fn restart_cycle(&mut self, catalog: &Catalog, now: DateTime<Utc>) -> usize {
        if !self.state.pending.is_empty() || self.state.history.is_empty() {
            return 0;
        }

        let history = std::mem::take(&mut self.state.history);
        let dropped = history.iter().filter(|k| !catalog.contains(k)).count();
        self.state.pending = history
            .into_iter()
            .filter(|key| catalog.contains(key))
            .map(|key| QueueEntry::new(key, now))
            .collect();

        info!(
            requeued = self.state.pending.len(),
            dropped, "Cycle complete, starting new cycle"
        );
        self.state.pending.len()
    }

    /// Reconciles against the catalog, restarts an exhausted cycle, and
    /// persists the result if anything changed.
    ///
    /// # Returns
    ///
    /// The newly queued keys.
    pub fn prepare(&mut self, catalog: &Catalog, now: DateTime<Utc>) -> Result<Vec<String>> {
        let new_keys = self.reconcile(catalog, now);
        self.restart_cycle(catalog, now);
        self.save_if_changed()?;
        Ok(new_keys)
    }

    /// Returns the summary of the first pending entry that still exists.
    ///
    /// Stale heads are dropped and the queue is persisted after each drop. If
    /// that empties the queue, an exhausted cycle is restarted once.
    ///
    /// The returned item stays pending until [`commit`](Self::commit).
    pub fn next_valid<'c>(
        &mut self,
        catalog: &'c Catalog,
        now: DateTime<Utc>,
    ) -> Result<Option<&'c SummaryItem>> {
        let mut dropped_any = false;

        while let Some(head) = self.state.pending.first() {
            if let Some(item) = catalog.get(&head.key) {
                return Ok(Some(item));
            }
            let stale = self.state.pending.remove(0);
            warn!(key = %stale.key, "Summary no longer exists, dropping from queue");
            self.save_if_changed()?;
            dropped_any = true;
        }

        if dropped_any && self.restart_cycle(catalog, now) > 0 {
            self.save_if_changed()?;
            return Ok(self
                .state
                .pending
                .first()
                .and_then(|head| catalog.get(&head.key)));
        }

        debug!("No pending summaries");
        Ok(None)
    }

    /// Records a successful delivery: moves `key` from pending to the end of
    /// the history and persists.
    pub fn commit(&mut self, key: &str) -> Result<()> {
        let index = self
            .state
            .pending
            .iter()
            .position(|e| e.key == key)
            .ok_or_else(|| QueueError::NotPending(key.to_string()))?;

        let entry = self.state.pending.remove(index);
        self.state.history.push(entry.key);
        self.save_if_changed()?;
        Ok(())
    }

    /// Writes the state if it differs from the last persisted state.
    ///
    /// # Returns
    ///
    /// Whether a write happened.
    pub fn save_if_changed(&mut self) -> Result<bool> {
        if self.state == self.persisted {
            return Ok(false);
        }
        self.store.save(&self.state)?;
        self.persisted = self.state.clone();
        Ok(true)
    }
}
