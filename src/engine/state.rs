use std::sync::{Mutex, PoisonError};

use {
    chrono::{DateTime, Utc},
    futures::future::join_all,
    tokio::{sync::watch, task::JoinHandle},
    uuid::Uuid,
};

use super::messages::{MonitorStatus, MonitorTarget};
use crate::utils::BoundedRing;

/// A running monitoring session. Created by `activate`, consumed by `deactivate`.
/// Workers never see this struct, only a clone of the cancel receiver.
pub(crate) struct Session {
    pub id: Uuid,
    pub targets: Vec<MonitorTarget>,
    pub started_at: DateTime<Utc>,
    cancel_tx: watch::Sender<bool>,
    workers: Vec<JoinHandle<()>>,
}

impl Session {
    pub fn new(
        targets: Vec<MonitorTarget>,
        cancel_tx: watch::Sender<bool>,
        workers: Vec<JoinHandle<()>>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            targets,
            started_at: Utc::now(),
            cancel_tx,
            workers,
        }
    }

    pub fn status(&self) -> MonitorStatus {
        MonitorStatus {
            active: true,
            session_id: Some(self.id),
            pairs: self.targets.iter().map(|t| t.name().to_string()).collect(),
            timeframe: self.targets.first().map(|t| t.timeframe().to_string()),
            shard_count: self.workers.len(),
            started_at: Some(self.started_at),
        }
    }

    /// Broadcasts cancel and waits for every worker to exit.
    pub async fn shutdown(self) {
        // Receivers may already be gone if a worker panicked; nothing to signal then.
        let _ = self.cancel_tx.send(true);

        for (shard, result) in join_all(self.workers).await.into_iter().enumerate() {
            if let Err(e) = result {
                log::error!("Shard {} of session {} ended abnormally: {}", shard, self.id, e);
            }
        }
    }
}

/// Bounded history of per-pair sweep summaries and scan failures.
pub struct MonitoringLog {
    entries: Mutex<BoundedRing<String>>,
}

impl MonitoringLog {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: Mutex::new(BoundedRing::new(capacity)),
        }
    }

    pub fn record(&self, line: String) {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(line);
    }

    /// Oldest first.
    pub fn snapshot(&self) -> Vec<String> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .to_vec()
    }
}
