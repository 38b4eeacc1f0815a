use crate::models::OhlcvTimeSeries;

/// Exponential moving average over closes, index-aligned with the input.
///
/// Behaviour (pandas `ewm(span=period, adjust=False)`):
///   bar 0  → value = close (no SMA warm-up)
///   bar 1+ → value = α·close + (1−α)·prev   where α = 2/(period+1)
pub fn calculate_ema(closes: &[f64], period: usize) -> Vec<f64> {
    let alpha = 2.0 / (period.max(1) as f64 + 1.0);
    let mut out = Vec::with_capacity(closes.len());
    let mut prev: Option<f64> = None;

    for &close in closes {
        let value = match prev {
            None => close,
            Some(p) => alpha * close + (1.0 - alpha) * p,
        };
        out.push(value);
        prev = Some(value);
    }
    out
}

pub fn series_ema(series: &OhlcvTimeSeries, period: usize) -> Vec<f64> {
    calculate_ema(&series.close_prices, period)
}
