use {
    chrono::{DateTime, Utc},
    itertools::Itertools,
    serde::{Deserialize, Serialize},
    uuid::Uuid,
};

use crate::{
    domain::PairInterval,
    models::AlertEvent,
    utils::{calculate_percent_diff, format_table_time},
};

/// One monitored `(pair, timeframe)`. Lives exactly as long as the session that owns it.
pub type MonitorTarget = PairInterval;

/// Read-only view of the scheduler, safe to poll at any rate.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MonitorStatus {
    pub active: bool,
    pub session_id: Option<Uuid>,
    pub pairs: Vec<String>,
    pub timeframe: Option<String>,
    pub shard_count: usize,
    pub started_at: Option<DateTime<Utc>>,
}

/// What one pair scan produced
#[derive(Debug, Clone)]
pub struct PairScan {
    pub pair: String,
    pub klines: usize,
    pub tops: Vec<(usize, f64)>,
    pub bottoms: Vec<(usize, f64)>,
    pub last_close: Option<f64>,
    pub last_open_time_ms: Option<i64>,
    /// Set only when the newest bottom sits on the final candle.
    pub alert: Option<AlertEvent>,
}

impl PairScan {
    /// Last three tops and bottoms plus the closing price, for the monitoring log.
    pub fn summary(&self) -> String {
        let fmt_tail = |points: &[(usize, f64)]| {
            points
                .iter()
                .rev()
                .take(3)
                .rev()
                .map(|(i, p)| format!("{}@{:.4}", i, p))
                .join(" ")
        };

        let close = match (self.last_close, self.bottoms.last()) {
            (Some(close), Some(&(_, bottom))) => format!(
                "{:.4} ({:+.2}% vs last bottom)",
                close,
                calculate_percent_diff(close, bottom)
            ),
            (Some(close), None) => format!("{:.4}", close),
            (None, _) => "n/a".to_string(),
        };

        let time = self
            .last_open_time_ms
            .map(format_table_time)
            .unwrap_or_default();

        format!(
            "[{}] {} | {} candles | tops: [{}] | bottoms: [{}] | last close: {}{}",
            time,
            self.pair,
            self.klines,
            fmt_tail(&self.tops),
            fmt_tail(&self.bottoms),
            close,
            if self.alert.is_some() { " | ALERT" } else { "" }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn summary_shows_only_the_last_three_points() {
        let scan = PairScan {
            pair: "BTC/USDT".into(),
            klines: 100,
            tops: vec![(10, 5.0), (30, 6.0), (50, 7.0), (70, 8.0)],
            bottoms: vec![(20, 4.0)],
            last_close: Some(4.4),
            last_open_time_ms: Some(0),
            alert: None,
        };
        let line = scan.summary();
        assert!(line.starts_with("[01/01/1970 00:00] BTC/USDT | 100 candles"));
        assert!(line.contains("tops: [30@6.0000 50@7.0000 70@8.0000]"));
        assert!(line.contains("bottoms: [20@4.0000]"));
        assert!(line.contains("+10.00% vs last bottom"));
        assert!(!line.contains("ALERT"));
    }
}
