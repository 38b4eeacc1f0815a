// Scheduler lifecycle and alert flow against a scripted exchange.
//
// Run with: cargo test --test monitor_flow

mod support;

use std::sync::Arc;
use std::sync::atomic::Ordering;
use std::time::Duration;

use pivot_sentinel::{
    AlertDispatcher, MonitorSettings, PivotMonitor, ZigZagParams, assemble_series,
    error::StateError,
};
use support::{RecordingNotifier, Script, ScriptedProvider, TF, eventually, flat_with_last_low};

// ============================================================================
// Helpers
// ============================================================================

fn settings() -> MonitorSettings {
    MonitorSettings {
        shard_size: 25,
        candle_count: 60,
        zigzag: ZigZagParams::new(5, 1.0, Some(10)),
        ..MonitorSettings::default()
    }
}

fn build(provider: ScriptedProvider) -> (PivotMonitor, Arc<ScriptedProvider>, Arc<RecordingNotifier>) {
    let provider = Arc::new(provider);
    let notifier = Arc::new(RecordingNotifier::default());
    let dispatcher = AlertDispatcher::new(10).with_notifier(notifier.clone());
    let monitor = PivotMonitor::new(provider.clone(), Arc::new(dispatcher)).with_settings(settings());
    (monitor, provider, notifier)
}

// ============================================================================
// Lifecycle
// ============================================================================

#[tokio::test]
async fn second_activation_is_rejected_and_leaves_workers_running() {
    let (monitor, provider, notifier) = build(
        ScriptedProvider::new()
            .with("A/USDT", Script::Candles(flat_with_last_low(60, 99.5)))
            .with("B/USDT", Script::Candles(flat_with_last_low(60, 99.5))),
    );

    let first = monitor.activate("A/USDT;B/USDT", "1h").await.unwrap();
    assert!(first.active);
    assert_eq!(first.pairs, vec!["A/USDT", "B/USDT"]);

    let err = monitor.activate("A/USDT;B/USDT", "1h").await.unwrap_err();
    assert_eq!(err, StateError::AlreadyActive);

    // Same session, still sweeping
    assert_eq!(monitor.status(), first);
    assert!(eventually(|| monitor.monitoring_logs().len() >= 2).await);
    assert!(provider.call_count() >= 2);
    assert!(eventually(|| notifier.activations.load(Ordering::SeqCst) == 1).await);

    assert!(monitor.deactivate().await);
    assert!(!monitor.is_active());
}

#[tokio::test]
async fn deactivate_twice_is_a_no_op() {
    let (monitor, _provider, _notifier) =
        build(ScriptedProvider::new().with("A/USDT", Script::Candles(flat_with_last_low(60, 99.5))));

    assert!(!monitor.deactivate().await);
    monitor.activate("A/USDT", "1h").await.unwrap();
    assert!(monitor.deactivate().await);
    assert!(!monitor.deactivate().await);

    // A fresh session can start after a clean stop
    let again = monitor.activate("A/USDT", "1h").await.unwrap();
    assert!(again.active);
    assert!(monitor.deactivate().await);
}

#[tokio::test]
async fn no_worker_outlives_deactivate() {
    let mut provider = ScriptedProvider::new().with_delay(Duration::from_millis(20));
    let pairs: Vec<String> = (0..30).map(|i| format!("P{}/USDT", i)).collect();
    for pair in &pairs {
        provider = provider.with(pair, Script::Candles(flat_with_last_low(60, 99.5)));
    }
    let (monitor, provider, _notifier) = build(provider);

    let status = monitor.activate(&pairs.join(";"), "1h").await.unwrap();
    assert_eq!(status.shard_count, 2);
    assert!(eventually(|| provider.call_count() >= 2).await);

    assert!(monitor.deactivate().await);
    let calls_at_stop = provider.call_count();
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(provider.call_count(), calls_at_stop);
}

// ============================================================================
// Alert flow
// ============================================================================

#[tokio::test]
async fn failing_pair_does_not_block_its_sibling() {
    let (monitor, _provider, notifier) = build(
        ScriptedProvider::new()
            .with("BAD/USDT", Script::Fails)
            .with("GOOD/USDT", Script::Candles(flat_with_last_low(60, 90.0))),
    );

    let status = monitor.activate("BAD/USDT;GOOD/USDT", "1h").await.unwrap();
    assert_eq!(status.shard_count, 1);

    assert!(eventually(|| monitor.latest_alerts().len() == 1).await);
    assert!(eventually(|| notifier.pairs() == vec!["GOOD/USDT".to_string()]).await);

    let alert = &monitor.latest_alerts()[0];
    assert_eq!(alert.pair, "GOOD/USDT");
    assert_eq!(alert.pivot.index, 59);
    assert_eq!(alert.pivot.price, 90.0);

    let logs = monitor.monitoring_logs();
    assert!(logs.iter().any(|l| l.starts_with("BAD/USDT | scan failed")));
    assert!(logs.iter().any(|l| l.contains("GOOD/USDT") && l.contains("ALERT")));

    assert!(monitor.deactivate().await);
}

#[tokio::test]
async fn older_bottoms_do_not_alert() {
    // Bottom sits mid-window, newest candle is ordinary
    let mut candles = flat_with_last_low(60, 99.5);
    candles[30].low = 90.0;
    let (monitor, _provider, notifier) =
        build(ScriptedProvider::new().with("OLD/USDT", Script::Candles(candles)));

    monitor.activate("OLD/USDT", "1h").await.unwrap();
    assert!(eventually(|| !monitor.monitoring_logs().is_empty()).await);
    tokio::time::sleep(Duration::from_millis(30)).await;

    assert!(monitor.latest_alerts().is_empty());
    assert!(notifier.pairs().is_empty());
    assert!(monitor.deactivate().await);
}

// ============================================================================
// Assembler
// ============================================================================

#[tokio::test]
async fn overlapping_batches_assemble_into_a_clean_series() {
    use async_trait::async_trait;
    use pivot_sentinel::{Candle, MarketDataProvider, PairInterval, error::FetchError};

    /// 500 candles of history; every page starts three candles later than asked.
    struct Overlapping;

    #[async_trait]
    impl MarketDataProvider for Overlapping {
        async fn fetch_batch(
            &self,
            _pair: &PairInterval,
            since: Option<i64>,
            limit: usize,
        ) -> Result<Vec<Candle>, FetchError> {
            let limit = limit as i64;
            let start = match since {
                None => 500 - limit,
                Some(ts) => (ts / TF + 3).max(0),
            };
            Ok((start.max(0)..(start + limit).min(500))
                .map(|i| Candle::new(i * TF, 1.0, 2.0, 0.5, 1.5, 1.0))
                .collect())
        }
    }

    let target = PairInterval::new("BTC/USDT", TF);
    let s = assemble_series(&Overlapping, &target, 200, 50).await.unwrap();

    assert!(s.timestamps.windows(2).all(|w| w[0] < w[1]));
    assert_eq!(*s.timestamps.last().unwrap(), 499 * TF);
    assert!(s.klines() <= 200);
    assert!(s.klines() > 150);
}
