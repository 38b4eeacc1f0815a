// Shared fixtures for integration tests: scripted exchange, recording notifier, synthetic series.
#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;

use pivot_sentinel::{
    AlertEvent, AlertNotifier, Candle, MarketDataProvider, OhlcvTimeSeries, PairInterval,
    error::FetchError, utils::TimeUtils,
};

pub const TF: i64 = TimeUtils::MS_IN_H;

/// How the scripted exchange answers for one pair.
#[derive(Clone)]
pub enum Script {
    /// Serves these candles to the newest-page request, nothing older.
    Candles(Vec<Candle>),
    Fails,
}

/// In-memory exchange keyed by pair name. Unknown pairs are `NotFound`.
#[derive(Default)]
pub struct ScriptedProvider {
    scripts: HashMap<String, Script>,
    delay: Duration,
    pub calls: AtomicUsize,
}

impl ScriptedProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, pair: &str, script: Script) -> Self {
        self.scripts.insert(pair.to_string(), script);
        self
    }

    /// Every fetch sleeps this long first.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl MarketDataProvider for ScriptedProvider {
    async fn fetch_batch(
        &self,
        pair: &PairInterval,
        since: Option<i64>,
        _limit: usize,
    ) -> Result<Vec<Candle>, FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        match self.scripts.get(pair.name()) {
            Some(Script::Candles(c)) if since.is_none() => Ok(c.clone()),
            Some(Script::Candles(_)) => Ok(Vec::new()),
            Some(Script::Fails) => Err(FetchError::Transport(format!("{} unreachable", pair))),
            None => Err(FetchError::NotFound(pair.bn_name())),
        }
    }
}

#[derive(Default)]
pub struct RecordingNotifier {
    pub alerts: Mutex<Vec<AlertEvent>>,
    pub activations: AtomicUsize,
}

impl RecordingNotifier {
    pub fn pairs(&self) -> Vec<String> {
        self.alerts.lock().unwrap().iter().map(|a| a.pair.clone()).collect()
    }
}

#[async_trait]
impl AlertNotifier for RecordingNotifier {
    async fn notify(&self, event: &AlertEvent) -> Result<()> {
        self.alerts.lock().unwrap().push(event.clone());
        Ok(())
    }

    async fn notify_activation(&self, _targets: &[PairInterval]) -> Result<()> {
        self.activations.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// Flat market whose final candle dips `last_low` deep: with legs=5 and 1% deviation
/// the newest candle is a confirmed bottom when `last_low` < 99.495.
pub fn flat_with_last_low(n: usize, last_low: f64) -> Vec<Candle> {
    (0..n)
        .map(|i| {
            let low = if i == n - 1 { last_low } else { 99.5 };
            Candle::new(i as i64 * TF, 100.0, 100.5, low, 100.0, 1.0)
        })
        .collect()
}

pub fn series(pair: &str, candles: &[Candle]) -> OhlcvTimeSeries {
    OhlcvTimeSeries::from_candles(PairInterval::new(pair, TF), candles)
}

/// Deterministic random walk (LCG), so property tests need no rng crate.
pub fn random_walk(n: usize, seed: u64) -> Vec<Candle> {
    let mut state = seed;
    let mut next = move || {
        state = state
            .wrapping_mul(6_364_136_223_846_793_005)
            .wrapping_add(1_442_695_040_888_963_407);
        (state >> 11) as f64 / (1u64 << 53) as f64
    };

    let mut close = 100.0;
    (0..n)
        .map(|i| {
            let open = close;
            close = open * (1.0 + (next() - 0.5) * 0.04);
            let high = open.max(close) * (1.0 + next() * 0.005);
            let low = open.min(close) * (1.0 - next() * 0.005);
            Candle::new(i as i64 * TF, open, high, low, close, 1.0)
        })
        .collect()
}

/// Polls `cond` for up to two seconds.
pub async fn eventually(mut cond: impl FnMut() -> bool) -> bool {
    for _ in 0..200 {
        if cond() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    cond()
}
