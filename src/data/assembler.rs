use crate::{
    data::MarketDataProvider,
    domain::{Candle, PairInterval},
    error::AssemblyError,
    models::OhlcvTimeSeries,
};

#[cfg(debug_assertions)]
use crate::config::DF;

/// Pages backwards through the provider until `count` candles are collected or the
/// exchange runs out of history, then normalises the result into a `Series`.
pub async fn assemble_series(
    provider: &dyn MarketDataProvider,
    pair_interval: &PairInterval,
    count: usize,
    page_size: usize,
) -> Result<OhlcvTimeSeries, AssemblyError> {
    let page_size = page_size.max(1);
    let mut all_candles: Vec<Candle> = Vec::new();
    let mut since: Option<i64> = None;
    let mut prev_earliest: Option<i64> = None;

    loop {
        let limit = count.saturating_sub(all_candles.len()).clamp(1, page_size);
        let batch = provider.fetch_batch(pair_interval, since, limit).await?;

        #[cfg(debug_assertions)]
        if DF.log_assembler_pages {
            log::info!(
                "ASSEMBLER [{}]: since {:?} limit {} -> {} candles",
                pair_interval,
                since,
                limit,
                batch.len()
            );
        }

        let Some(earliest) = batch.iter().map(|c| c.open_time_ms).min() else {
            if all_candles.is_empty() {
                return Err(AssemblyError::EmptyBatch {
                    pair: pair_interval.name().to_string(),
                });
            }
            break;
        };

        // Short page == exchange-side history exhausted
        let exhausted = batch.len() < limit;
        all_candles.splice(0..0, batch);

        if exhausted || all_candles.len() >= count {
            break;
        }
        // Provider ignored the cursor: stop rather than loop on the same page
        if prev_earliest.is_some_and(|prev| earliest >= prev) {
            break;
        }
        prev_earliest = Some(earliest);

        let next_limit = count.saturating_sub(all_candles.len()).clamp(1, page_size);
        since = Some(earliest - next_limit as i64 * pair_interval.interval_ms);
    }

    let candles = normalize_candles(pair_interval, all_candles, count)?;
    Ok(OhlcvTimeSeries::from_candles(pair_interval.clone(), &candles))
}

/// Sorts by open time, drops repeated open times (first occurrence wins) and keeps the newest `count`.
pub fn normalize_candles(
    pair_interval: &PairInterval,
    mut candles: Vec<Candle>,
    count: usize,
) -> Result<Vec<Candle>, AssemblyError> {
    if let Some(bad) = candles.iter().find(|c| c.validation_error().is_some()) {
        return Err(AssemblyError::Malformed {
            pair: pair_interval.name().to_string(),
            open_time_ms: bad.open_time_ms,
            reason: bad.validation_error().unwrap_or_default(),
        });
    }

    // Stable sort keeps accumulator order among equal timestamps
    candles.sort_by_key(|c| c.open_time_ms);
    candles.dedup_by_key(|c| c.open_time_ms);

    let excess = candles.len().saturating_sub(count);
    candles.drain(..excess);
    Ok(candles)
}
