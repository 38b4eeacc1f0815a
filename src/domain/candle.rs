use serde::{Deserialize, Serialize};

// One OHLCV bucket. Immutable once assembled into a series.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Candle {
    pub open_time_ms: i64,

    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,

    pub volume: f64,
}

impl Candle {
    // A constructor for convenience
    pub fn new(open_time_ms: i64, open: f64, high: f64, low: f64, close: f64, volume: f64) -> Self {
        Candle {
            open_time_ms,
            open,
            high,
            low,
            close,
            volume,
        }
    }

    /// Why this candle cannot enter a series, if anything.
    pub fn validation_error(&self) -> Option<String> {
        let prices = [self.open, self.high, self.low, self.close, self.volume];
        if prices.iter().any(|p| !p.is_finite()) {
            return Some("non-finite value".to_string());
        }
        if self.high < self.low {
            return Some(format!("high {} below low {}", self.high, self.low));
        }
        None
    }
}
