use std::sync::Arc;
use std::time::Duration;

use {
    anyhow::{Context, Result},
    tokio::{sync::watch, task::JoinHandle},
};

use super::core::MonitorSettings;
use super::messages::{MonitorTarget, PairScan};
use super::state::MonitoringLog;

use crate::alerts::AlertDispatcher;
use crate::analysis::calculate_zigzag;
#[cfg(debug_assertions)]
use crate::config::DF;
use crate::data::{MarketDataProvider, assemble_series};
use crate::models::{AlertEvent, Pivot, PivotKind};
use crate::utils::{TimeUtils, epoch_ms_to_utc, now_timestamp_ms};

/// Everything a shard worker shares with its siblings. Read-only apart from the two rings.
pub(crate) struct ShardContext {
    pub provider: Arc<dyn MarketDataProvider>,
    pub dispatcher: Arc<AlertDispatcher>,
    pub journal: Arc<MonitoringLog>,
    pub settings: MonitorSettings,
}

/// Spawns the polling loop for one shard. The task ends once `cancel` flips to true (or its sender drops).
pub(crate) fn spawn_shard_worker(
    shard_id: usize,
    targets: Vec<MonitorTarget>,
    ctx: Arc<ShardContext>,
    cancel: watch::Receiver<bool>,
) -> JoinHandle<()> {
    tokio::spawn(run_shard(shard_id, targets, ctx, cancel))
}

async fn run_shard(
    shard_id: usize,
    targets: Vec<MonitorTarget>,
    ctx: Arc<ShardContext>,
    mut cancel: watch::Receiver<bool>,
) {
    let Some(interval_ms) = targets.first().map(|t| t.interval_ms) else {
        return;
    };
    log::info!("Shard {} started with {} pairs", shard_id, targets.len());

    loop {
        for target in &targets {
            if *cancel.borrow() {
                log::info!("Shard {} stopping mid-sweep", shard_id);
                return;
            }

            // Pair failures stay inside this iteration
            match scan_pair(ctx.provider.as_ref(), target, &ctx.settings).await {
                Ok(scan) => {
                    #[cfg(debug_assertions)]
                    if DF.log_pair_scans {
                        log::info!("{}", scan.summary());
                    }
                    ctx.journal.record(scan.summary());
                    if let Some(event) = scan.alert {
                        log::info!("{}", event.message());
                        ctx.dispatcher.dispatch(event);
                    }
                }
                Err(e) => {
                    log::warn!("Scan failed for {}: {:#}", target, e);
                    ctx.journal
                        .record(format!("{} | scan failed: {:#}", target.name(), e));
                }
            }
        }

        if *cancel.borrow() {
            break;
        }

        let wait_ms = TimeUtils::ms_until_next_boundary(interval_ms, now_timestamp_ms());
        tokio::select! {
            _ = tokio::time::sleep(Duration::from_millis(wait_ms.max(0) as u64)) => {}
            _ = cancel.changed() => break,
        }
    }

    log::info!("Shard {} stopped", shard_id);
}

/// Fetch, detect and decide for a single pair. Stateless across calls.
pub async fn scan_pair(
    provider: &dyn MarketDataProvider,
    target: &MonitorTarget,
    settings: &MonitorSettings,
) -> Result<PairScan> {
    let series = assemble_series(provider, target, settings.candle_count, settings.page_size)
        .await
        .with_context(|| format!("assembling {}", target))?;

    let zz = crate::trace_time!(format!("ZigZag [{}]", target), 20_000, {
        calculate_zigzag(&series, &settings.zigzag)
    })
    .with_context(|| format!("detecting pivots on {}", target))?;

    // A bottom on the final candle is new by construction: next cycle the candle is no longer last.
    let alert = match (zz.latest_bottom(), series.last_index()) {
        (Some((idx, price)), Some(last)) if idx == last => Some(AlertEvent::new(
            target,
            Pivot {
                index: idx,
                price,
                kind: PivotKind::Low,
                time: epoch_ms_to_utc(series.timestamps[idx]),
            },
        )),
        _ => None,
    };

    Ok(PairScan {
        pair: target.name().to_string(),
        klines: series.klines(),
        last_close: series.last_close(),
        last_open_time_ms: series.timestamps.last().copied(),
        tops: zz.tops,
        bottoms: zz.bottoms,
        alert,
    })
}
