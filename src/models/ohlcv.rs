use {
    crate::domain::{Candle, PairInterval},
    serde::{Deserialize, Serialize},
};

/// Index-addressable candle series (0 = oldest), stored column-wise.
/// Open times are strictly increasing: the assembler is the only producer of unchecked input.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct OhlcvTimeSeries {
    pub pair_interval: PairInterval,
    pub timestamps: Vec<i64>,
    pub open_prices: Vec<f64>,
    pub high_prices: Vec<f64>,
    pub low_prices: Vec<f64>,
    pub close_prices: Vec<f64>,
    pub volumes: Vec<f64>,
}

impl OhlcvTimeSeries {
    /// Create a TimeSeries from candles already ordered by open time with no duplicates.
    pub fn from_candles(pair_interval: PairInterval, candles: &[Candle]) -> Self {
        debug_assert!(
            candles
                .windows(2)
                .all(|w| w[0].open_time_ms < w[1].open_time_ms),
            "{}: candles must be strictly increasing in open time",
            pair_interval
        );

        let len = candles.len();
        let mut ts_vec = Vec::with_capacity(len);
        let mut open_vec = Vec::with_capacity(len);
        let mut high_vec = Vec::with_capacity(len);
        let mut low_vec = Vec::with_capacity(len);
        let mut close_vec = Vec::with_capacity(len);
        let mut vol_vec = Vec::with_capacity(len);

        for c in candles {
            ts_vec.push(c.open_time_ms);
            open_vec.push(c.open);
            high_vec.push(c.high);
            low_vec.push(c.low);
            close_vec.push(c.close);
            vol_vec.push(c.volume);
        }

        Self {
            pair_interval,
            timestamps: ts_vec,
            open_prices: open_vec,
            high_prices: high_vec,
            low_prices: low_vec,
            close_prices: close_vec,
            volumes: vol_vec,
        }
    }

    pub fn klines(&self) -> usize {
        self.timestamps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timestamps.is_empty()
    }

    pub fn last_index(&self) -> Option<usize> {
        self.klines().checked_sub(1)
    }

    pub fn last_close(&self) -> Option<f64> {
        self.close_prices.last().copied()
    }

    /// The first `len` candles as an independent series.
    pub fn prefix(&self, len: usize) -> Self {
        let len = len.min(self.klines());
        Self {
            pair_interval: self.pair_interval.clone(),
            timestamps: self.timestamps[..len].to_vec(),
            open_prices: self.open_prices[..len].to_vec(),
            high_prices: self.high_prices[..len].to_vec(),
            low_prices: self.low_prices[..len].to_vec(),
            close_prices: self.close_prices[..len].to_vec(),
            volumes: self.volumes[..len].to_vec(),
        }
    }
}
