//! Cycle controller: one delivery per invocation.

use chrono::Utc;
use digest_models::{Channel, CyclePhase, Outcome};
use digest_persistence::{QueueStore, SentLogStore, SummaryStore};
use digest_queue::DeliveryQueue;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::error::Result;
use crate::transport::Transport;

/// Drives one channel's delivery cycle.
///
/// Each call to [`run_one_delivery`](Self::run_one_delivery) re-reads every
/// store, so the controller holds no state between calls.
pub struct CycleController<T> {
    summaries: SummaryStore,
    queue_store: QueueStore,
    sent_log: SentLogStore,
    transport: T,
}

impl<T: Transport> CycleController<T> {
    /// Creates a controller using the configured stores for the transport's
    /// channel.
    pub fn new(config: &Config, transport: T) -> Self {
        let channel = transport.channel();
        Self::with_stores(
            config.summary_store(),
            config.queue_store(channel),
            config.sent_log_store(channel),
            transport,
        )
    }

    pub fn with_stores(
        summaries: SummaryStore,
        queue_store: QueueStore,
        sent_log: SentLogStore,
        transport: T,
    ) -> Self {
        Self {
            summaries,
            queue_store,
            sent_log,
            transport,
        }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Picks the next summary, delivers it, and records the result.
    ///
    /// Transport failures come back as [`Outcome::Failed`] with the queue
    /// and sent log as they were before the attempt. Only unreadable or
    /// unwritable state is an error.
    pub async fn run_one_delivery(&self) -> Result<Outcome> {
        let channel = self.transport.channel();

        // Load both documents before touching either
        let mut queue = DeliveryQueue::open(self.queue_store.clone())?;
        let mut log = self.sent_log.load()?;

        let catalog = self.summaries.list_available();
        let now = Utc::now();

        let new_keys = queue.prepare(&catalog, now)?;
        if !new_keys.is_empty() {
            info!(channel = %channel, count = new_keys.len(), "Queued new summaries");
        }

        let Some(item) = queue.next_valid(&catalog, now)? else {
            info!(channel = %channel, "Nothing to send");
            return Ok(Outcome::Idle);
        };

        let progress = queue.progress(&catalog);
        debug!(channel = %channel, key = %item.key, progress = %progress, "Delivering");

        if let Err(e) = self.transport.deliver(item, progress).await {
            warn!(channel = %channel, key = %item.key, error = %e, "Delivery failed");
            return Ok(Outcome::Failed {
                key: item.key.clone(),
                reason: e.to_string(),
            });
        }

        queue.commit(&item.key)?;
        self.sent_log
            .record(&mut log, &item.key, &item.hash, Utc::now())?;

        info!(channel = %channel, key = %item.key, progress = %progress, "Sent summary");
        Ok(Outcome::Sent(item.key.clone()))
    }
}

/// Read-only snapshot of a channel's delivery state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueueStatus {
    pub channel: Channel,
    pub phase: CyclePhase,
    pub pending: Vec<String>,
    pub history: usize,
    /// Summaries currently on disk.
    pub available: usize,
    /// Entries in the sent log.
    pub sent_logged: usize,
}

/// Reports a channel's state without reconciling or writing anything.
pub fn queue_status(config: &Config, channel: Channel) -> Result<QueueStatus> {
    let state = config.queue_store(channel).load()?;
    let log = config.sent_log_store(channel).load()?;
    let available = config.summary_store().list_available().len();

    Ok(QueueStatus {
        channel,
        phase: state.phase(),
        pending: state.pending.iter().map(|e| e.key.clone()).collect(),
        history: state.history.len(),
        available,
        sent_logged: log.len(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::TransportError;
    use async_trait::async_trait;
    use digest_models::{Progress, SummaryItem};
    use std::fs;
    use tempfile::tempdir;

    struct AlwaysFails;

    #[async_trait]
    impl Transport for AlwaysFails {
        fn channel(&self) -> Channel {
            Channel::Telegram
        }

        async fn deliver(
            &self,
            _: &SummaryItem,
            _: Progress,
        ) -> std::result::Result<(), TransportError> {
            Err(TransportError::Send("chat not found".into()))
        }
    }

    fn config_for(dir: &std::path::Path) -> Config {
        let docs = dir.join("docs").to_string_lossy().into_owned();
        let state = dir.join("state").to_string_lossy().into_owned();
        Config::from_lookup(move |name| match name {
            "STARDIGEST_DOCS_DIR" => Some(docs.clone()),
            "STARDIGEST_STATE_DIR" => Some(state.clone()),
            _ => None,
        })
    }

    #[tokio::test]
    async fn test_failure_keeps_reconciled_queue() {
        let dir = tempdir().unwrap();
        let config = config_for(dir.path());
        let summary = config.summary_store().summary_path("a_b");
        fs::create_dir_all(summary.parent().unwrap()).unwrap();
        fs::write(&summary, "# a_b").unwrap();

        let controller = CycleController::new(&config, AlwaysFails);
        let outcome = controller.run_one_delivery().await.unwrap();

        assert_eq!(
            outcome,
            Outcome::Failed {
                key: "a_b".into(),
                reason: "send failed: chat not found".into()
            }
        );
        let status = queue_status(&config, Channel::Telegram).unwrap();
        assert_eq!(status.pending, vec!["a_b".to_string()]);
        assert_eq!(status.sent_logged, 0);
        assert!(!config.sent_log_store(Channel::Telegram).path().exists());
    }

    #[test]
    fn test_status_of_fresh_state() {
        let dir = tempdir().unwrap();
        let config = config_for(dir.path());

        let status = queue_status(&config, Channel::Email).unwrap();

        assert_eq!(status.phase, CyclePhase::Empty);
        assert!(status.pending.is_empty());
        assert_eq!(status.available, 0);
        assert!(!config.queue_store(Channel::Email).path().exists());
    }
}
