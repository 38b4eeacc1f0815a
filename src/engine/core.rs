use std::sync::{Arc, PoisonError, RwLock};

use tokio::sync::{Mutex, watch};

use crate::alerts::AlertDispatcher;
use crate::analysis::ZigZagParams;
use crate::config::{BINANCE, MONITOR};
use crate::data::MarketDataProvider;
use crate::domain::PairInterval;
use crate::error::StateError;
use crate::models::AlertEvent;

use super::messages::{MonitorStatus, MonitorTarget};
use super::state::{MonitoringLog, Session};
use super::worker::{self, ShardContext};

/// Runtime knobs for a monitoring session. Defaults come from the `MONITOR` / `ZIGZAG` blueprints.
#[derive(Debug, Clone, PartialEq)]
pub struct MonitorSettings {
    pub shard_size: usize,
    pub candle_count: usize,
    pub page_size: usize,
    pub zigzag: ZigZagParams,
}

impl Default for MonitorSettings {
    fn default() -> Self {
        Self {
            shard_size: MONITOR.shard_size,
            candle_count: MONITOR.candle_count,
            page_size: BINANCE.limits.klines_limit,
            zigzag: ZigZagParams::default(),
        }
    }
}

/// Multi-pair scheduler: `Inactive -> Active -> Inactive`.
///
/// `activate` partitions the targets into shards and spawns one polling task per shard.
/// `deactivate` broadcasts cancel and joins every task before returning.
/// Status reads never wait on the session lock.
pub struct PivotMonitor {
    provider: Arc<dyn MarketDataProvider>,
    dispatcher: Arc<AlertDispatcher>,
    journal: Arc<MonitoringLog>,
    settings: MonitorSettings,

    /// Single writer for Activate/Deactivate transitions
    session: Mutex<Option<Session>>,
    /// Published copy of the session state for lock-free-ish reads
    snapshot: RwLock<MonitorStatus>,
}

impl PivotMonitor {
    pub fn new(provider: Arc<dyn MarketDataProvider>, dispatcher: Arc<AlertDispatcher>) -> Self {
        Self {
            provider,
            dispatcher,
            journal: Arc::new(MonitoringLog::new(MONITOR.monitoring_log_capacity)),
            settings: MonitorSettings::default(),
            session: Mutex::new(None),
            snapshot: RwLock::new(MonitorStatus::default()),
        }
    }

    pub fn with_settings(mut self, settings: MonitorSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn settings(&self) -> &MonitorSettings {
        &self.settings
    }

    /// Activation request: `pairs` is a `;`-separated list of `BASE/QUOTE`, `timeframe` e.g. `"1h"`.
    pub async fn activate(
        &self,
        pairs: &str,
        timeframe: &str,
    ) -> Result<MonitorStatus, StateError> {
        let targets = PairInterval::parse_list(pairs, MONITOR.pair_separator, timeframe)?;
        self.activate_targets(targets).await
    }

    pub async fn activate_targets(
        &self,
        targets: Vec<MonitorTarget>,
    ) -> Result<MonitorStatus, StateError> {
        let mut guard = self.session.lock().await;
        if guard.is_some() {
            return Err(StateError::AlreadyActive);
        }
        if targets.is_empty() {
            return Err(StateError::NoTargets);
        }
        if let Some(bad) = targets.iter().find(|t| t.interval_ms <= 0) {
            return Err(StateError::InvalidTimeframe(bad.interval_ms.to_string()));
        }

        let (cancel_tx, cancel_rx) = watch::channel(false);
        let ctx = Arc::new(ShardContext {
            provider: Arc::clone(&self.provider),
            dispatcher: Arc::clone(&self.dispatcher),
            journal: Arc::clone(&self.journal),
            settings: self.settings.clone(),
        });

        let workers = targets
            .chunks(self.settings.shard_size.max(1))
            .enumerate()
            .map(|(shard_id, shard)| {
                worker::spawn_shard_worker(
                    shard_id,
                    shard.to_vec(),
                    Arc::clone(&ctx),
                    cancel_rx.clone(),
                )
            })
            .collect();

        let session = Session::new(targets, cancel_tx, workers);
        let status = session.status();
        log::info!(
            "Monitoring session {} active: {} pairs on {} across {} shards",
            session.id,
            status.pairs.len(),
            status.timeframe.as_deref().unwrap_or("?"),
            status.shard_count
        );

        self.dispatcher.announce_activation(&session.targets);
        self.publish(status.clone());
        *guard = Some(session);
        Ok(status)
    }

    /// Stops every worker and waits for them to exit. Returns false when nothing was running.
    pub async fn deactivate(&self) -> bool {
        let mut guard = self.session.lock().await;
        let Some(session) = guard.take() else {
            return false;
        };

        let id = session.id;
        session.shutdown().await;
        self.publish(MonitorStatus::default());
        log::info!("Monitoring session {} stopped", id);
        true
    }

    pub fn status(&self) -> MonitorStatus {
        self.snapshot
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn is_active(&self) -> bool {
        self.status().active
    }

    /// Sweep summaries and scan failures, oldest first.
    pub fn monitoring_logs(&self) -> Vec<String> {
        self.journal.snapshot()
    }

    pub fn latest_alerts(&self) -> Vec<AlertEvent> {
        self.dispatcher.latest_alerts()
    }

    fn publish(&self, status: MonitorStatus) {
        *self.snapshot.write().unwrap_or_else(PoisonError::into_inner) = status;
    }
}
