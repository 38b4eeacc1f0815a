use {
    crate::{
        analysis::ZigZag,
        models::{BottomRow, ChartPoint, OhlcvTimeSeries},
    },
    serde::Serialize,
};

/// One-shot analysis payload: detector output plus the tail of the trend line.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PivotReport {
    pub pair: String,
    pub timeframe: String,
    pub candles: usize,
    pub last_close: Option<f64>,
    pub ema_period: usize,
    /// Newest EMA values, oldest first
    pub ema_tail: Vec<f64>,
    pub top_count: usize,
    pub bottom_count: usize,
    pub tops: Vec<(usize, f64)>,
    pub bottoms: Vec<(usize, f64)>,
    pub bottom_rows: Vec<BottomRow>,
    pub chart_points: Vec<ChartPoint>,
}

impl PivotReport {
    pub fn new(
        series: &OhlcvTimeSeries,
        zigzag: &ZigZag,
        ema: &[f64],
        ema_period: usize,
        ema_tail_len: usize,
    ) -> Self {
        let tail_start = ema.len().saturating_sub(ema_tail_len);
        Self {
            pair: series.pair_interval.name().to_string(),
            timeframe: series.pair_interval.timeframe().to_string(),
            candles: series.klines(),
            last_close: series.last_close(),
            ema_period,
            ema_tail: ema[tail_start..].to_vec(),
            top_count: zigzag.tops.len(),
            bottom_count: zigzag.bottoms.len(),
            tops: zigzag.tops.clone(),
            bottoms: zigzag.bottoms.clone(),
            bottom_rows: zigzag.bottoms_table(series),
            chart_points: zigzag.chart_points(series),
        }
    }
}
