use std::sync::{Arc, Mutex, PoisonError};

use crate::{
    alerts::{AlertNotifier, AlertSink},
    config::MONITOR,
    domain::PairInterval,
    models::AlertEvent,
    utils::BoundedRing,
};

#[cfg(debug_assertions)]
use crate::config::DF;

/// Fans confirmed-pivot events out to notifiers and the sink, once per (pair, pivot time).
pub struct AlertDispatcher {
    notifiers: Vec<Arc<dyn AlertNotifier>>,
    sink: Option<Arc<dyn AlertSink>>,
    recent: Mutex<BoundedRing<AlertEvent>>,
}

impl Default for AlertDispatcher {
    fn default() -> Self {
        Self::new(MONITOR.recent_alerts_capacity)
    }
}

impl AlertDispatcher {
    pub fn new(recent_capacity: usize) -> Self {
        Self {
            notifiers: Vec::new(),
            sink: None,
            recent: Mutex::new(BoundedRing::new(recent_capacity)),
        }
    }

    pub fn with_notifier(mut self, notifier: Arc<dyn AlertNotifier>) -> Self {
        self.notifiers.push(notifier);
        self
    }

    pub fn with_sink(mut self, sink: Arc<dyn AlertSink>) -> Self {
        self.sink = Some(sink);
        self
    }

    /// Records `event` and hands it to every collaborator in the background.
    /// Returns false when the same pivot was already dispatched and is still in the ring.
    /// Must be called from within a tokio runtime.
    pub fn dispatch(&self, event: AlertEvent) -> bool {
        {
            let mut recent = self.recent.lock().unwrap_or_else(PoisonError::into_inner);
            if recent.iter().any(|seen| seen.key() == event.key()) {
                #[cfg(debug_assertions)]
                if DF.log_dispatcher {
                    log::info!("DISPATCH: duplicate alert for {} dropped", event.pair);
                }
                return false;
            }
            recent.push(event.clone());
        }

        for notifier in &self.notifiers {
            let notifier = Arc::clone(notifier);
            let event = event.clone();
            tokio::spawn(async move {
                if let Err(e) = notifier.notify(&event).await {
                    log::error!("Notify failed for {}: {:#}", event.pair, e);
                }
            });
        }

        if let Some(sink) = &self.sink {
            let sink = Arc::clone(sink);
            tokio::spawn(async move {
                if let Err(e) = sink.persist(&event).await {
                    log::error!("Persist failed for {}: {:#}", event.pair, e);
                }
            });
        }
        true
    }

    /// Tells every notifier that monitoring started on `targets`.
    pub fn announce_activation(&self, targets: &[PairInterval]) {
        for notifier in &self.notifiers {
            let notifier = Arc::clone(notifier);
            let targets = targets.to_vec();
            tokio::spawn(async move {
                if let Err(e) = notifier.notify_activation(&targets).await {
                    log::error!("Activation notice failed: {:#}", e);
                }
            });
        }
    }

    /// Most recent alerts, oldest first.
    pub fn latest_alerts(&self) -> Vec<AlertEvent> {
        self.recent
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .to_vec()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        models::{Pivot, PivotKind},
        utils::{TimeUtils, epoch_ms_to_utc},
    };
    use anyhow::{Result, bail};
    use async_trait::async_trait;
    use std::time::Duration;

    #[derive(Default)]
    struct Recorder {
        seen: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl AlertNotifier for Recorder {
        async fn notify(&self, event: &AlertEvent) -> Result<()> {
            self.seen.lock().unwrap().push(event.pair.clone());
            Ok(())
        }
    }

    struct Broken;

    #[async_trait]
    impl AlertNotifier for Broken {
        async fn notify(&self, _event: &AlertEvent) -> Result<()> {
            bail!("smtp down")
        }
    }

    fn event(pair: &str, open_ms: i64) -> AlertEvent {
        AlertEvent::new(
            &PairInterval::new(pair, TimeUtils::MS_IN_H),
            Pivot {
                index: 10,
                price: 1.0,
                kind: PivotKind::Low,
                time: epoch_ms_to_utc(open_ms),
            },
        )
    }

    async fn settle() {
        tokio::time::sleep(Duration::from_millis(20)).await;
    }

    #[tokio::test]
    async fn same_pivot_is_dispatched_once() {
        let recorder = Arc::new(Recorder::default());
        let dispatcher = AlertDispatcher::new(10).with_notifier(recorder.clone());

        assert!(dispatcher.dispatch(event("BTC/USDT", 1_000)));
        assert!(!dispatcher.dispatch(event("BTC/USDT", 1_000)));
        assert!(dispatcher.dispatch(event("BTC/USDT", 2_000)));
        assert!(dispatcher.dispatch(event("ETH/USDT", 1_000)));
        settle().await;

        assert_eq!(recorder.seen.lock().unwrap().len(), 3);
        assert_eq!(dispatcher.latest_alerts().len(), 3);
    }

    #[tokio::test]
    async fn ring_keeps_only_the_newest_alerts() {
        let dispatcher = AlertDispatcher::new(2);
        for t in 0..5 {
            dispatcher.dispatch(event("BTC/USDT", t * 1_000));
        }
        let times: Vec<i64> = dispatcher
            .latest_alerts()
            .iter()
            .map(|e| e.pivot.time.timestamp_millis())
            .collect();
        assert_eq!(times, vec![3_000, 4_000]);
    }

    #[tokio::test]
    async fn failing_notifier_does_not_block_others() {
        let recorder = Arc::new(Recorder::default());
        let dispatcher = AlertDispatcher::new(10)
            .with_notifier(Arc::new(Broken))
            .with_notifier(recorder.clone());

        assert!(dispatcher.dispatch(event("SOL/USDT", 1_000)));
        settle().await;
        assert_eq!(*recorder.seen.lock().unwrap(), vec!["SOL/USDT".to_string()]);
    }
}
