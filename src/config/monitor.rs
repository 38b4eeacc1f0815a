//! Detector and scheduler blueprints. Runtime copies live in `MonitorSettings` / `ZigZagParams`.

pub struct ZigZagDefaults {
    /// Half-width of the extremum window, in candles.
    pub legs: usize,
    /// Minimum reversal from the last pivot, in percent (1.0 == 1%).
    pub deviation_pct: f64,
    pub max_points: Option<usize>,
}

pub struct EmaDefaults {
    pub period: usize,
}

pub struct MonitorDefaults {
    /// Pairs per polling worker.
    pub shard_size: usize,
    /// Candles assembled per pair per sweep.
    pub candle_count: usize,
    pub recent_alerts_capacity: usize,
    pub monitoring_log_capacity: usize,
    /// Separator between pairs in an activation request.
    pub pair_separator: char,
}

pub const ZIGZAG: ZigZagDefaults = ZigZagDefaults {
    legs: 200,
    deviation_pct: 1.0,
    max_points: Some(10),
};

pub const EMA: EmaDefaults = EmaDefaults { period: 200 };

pub const MONITOR: MonitorDefaults = MonitorDefaults {
    shard_size: 25,
    candle_count: 2000,
    recent_alerts_capacity: 10,
    monitoring_log_capacity: 200,
    pair_separator: ';',
};
