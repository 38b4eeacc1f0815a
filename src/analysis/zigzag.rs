use {
    crate::{
        config::ZIGZAG,
        error::DetectorError,
        models::{BottomRow, ChartPoint, OhlcvTimeSeries, Pivot, PivotKind},
        utils::{epoch_ms_to_utc, get_max, get_min},
    },
    itertools::Itertools,
    serde::{Deserialize, Serialize},
};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ZigZagParams {
    /// Half-width of the centered extremum window, in candles (>= 1).
    pub legs: usize,
    /// Minimum move from the last pivot, in percent (> 0).
    pub deviation_pct: f64,
    /// Keep only the newest N tops and newest N bottoms.
    pub max_points: Option<usize>,
}

impl Default for ZigZagParams {
    fn default() -> Self {
        Self {
            legs: ZIGZAG.legs,
            deviation_pct: ZIGZAG.deviation_pct,
            max_points: ZIGZAG.max_points,
        }
    }
}

impl ZigZagParams {
    pub fn new(legs: usize, deviation_pct: f64, max_points: Option<usize>) -> Self {
        Self {
            legs,
            deviation_pct,
            max_points,
        }
    }

    pub fn validate(&self) -> Result<(), DetectorError> {
        if self.legs == 0 {
            return Err(DetectorError::InvalidLegs);
        }
        if !(self.deviation_pct.is_finite() && self.deviation_pct > 0.0) {
            return Err(DetectorError::InvalidDeviation(self.deviation_pct));
        }
        Ok(())
    }

    /// Shortest series on which the centered window fits at least once.
    pub fn min_series_len(&self) -> usize {
        2 * self.legs + 1
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Trend {
    #[default]
    None,
    Up,
    Down,
}

/// Scan state of one detector run. Never outlives `calculate_zigzag`.
#[derive(Debug, Clone, Default)]
struct TrendState {
    direction: Trend,
    last_pivot_price: Option<f64>,
    last_pivot_index: Option<usize>,
}

impl TrendState {
    fn clears_top_deviation(&self, high: f64, deviation_pct: f64) -> bool {
        self.last_pivot_price
            .is_none_or(|last| high > last * (1.0 + deviation_pct / 100.0))
    }

    fn clears_bottom_deviation(&self, low: f64, deviation_pct: f64) -> bool {
        self.last_pivot_price
            .is_none_or(|last| low < last * (1.0 - deviation_pct / 100.0))
    }

    fn confirm(&mut self, kind: PivotKind, index: usize, price: f64) {
        self.direction = match kind {
            PivotKind::High => Trend::Up,
            PivotKind::Low => Trend::Down,
        };
        self.last_pivot_price = Some(price);
        self.last_pivot_index = Some(index);
    }
}

/// Detector output. Each entry is `(index, price)`, oldest first.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ZigZag {
    pub tops: Vec<(usize, f64)>,
    pub bottoms: Vec<(usize, f64)>,
}

impl ZigZag {
    pub fn latest_bottom(&self) -> Option<(usize, f64)> {
        self.bottoms.last().copied()
    }

    pub fn latest_top(&self) -> Option<(usize, f64)> {
        self.tops.last().copied()
    }

    pub fn is_empty(&self) -> bool {
        self.tops.is_empty() && self.bottoms.is_empty()
    }

    /// Tops and bottoms merged by index.
    pub fn kinds_in_order(&self) -> Vec<(usize, PivotKind)> {
        let tops = self.tops.iter().map(|&(i, _)| (i, PivotKind::High));
        let bottoms = self.bottoms.iter().map(|&(i, _)| (i, PivotKind::Low));
        tops.merge_by(bottoms, |a, b| a.0 <= b.0).collect()
    }

    /// No two neighbouring pivots share a kind.
    pub fn is_alternating(&self) -> bool {
        self.kinds_in_order()
            .windows(2)
            .all(|w| w[0].1 != w[1].1 && w[0].0 < w[1].0)
    }

    /// Combined, time-sorted pivots. Entries whose index is outside `series` are skipped.
    pub fn pivots(&self, series: &OhlcvTimeSeries) -> Vec<Pivot> {
        let to_pivot = |kind: PivotKind| {
            move |&(index, price): &(usize, f64)| {
                series.timestamps.get(index).map(|&ts| Pivot {
                    index,
                    price,
                    kind,
                    time: epoch_ms_to_utc(ts),
                })
            }
        };
        let tops = self.tops.iter().filter_map(to_pivot(PivotKind::High));
        let bottoms = self.bottoms.iter().filter_map(to_pivot(PivotKind::Low));
        tops.merge_by(bottoms, |a, b| a.index <= b.index).collect()
    }

    pub fn chart_points(&self, series: &OhlcvTimeSeries) -> Vec<ChartPoint> {
        self.pivots(series).iter().map(ChartPoint::from).collect()
    }

    pub fn bottoms_table(&self, series: &OhlcvTimeSeries) -> Vec<BottomRow> {
        self.pivots(series)
            .iter()
            .filter(|p| p.kind == PivotKind::Low)
            .map(BottomRow::from)
            .collect()
    }
}

enum Confirmation {
    /// Candidate must be the extremum of its centered window.
    Windowed { window_high: f64, window_low: f64 },
    /// Trailing edge: the window cannot close yet, deviation alone decides.
    DeviationOnly,
}

/// One scan step. The bottom branch only runs when the top branch's structural test fails.
fn scan_step(
    state: &mut TrendState,
    out: &mut ZigZag,
    index: usize,
    high: f64,
    low: f64,
    rule: Confirmation,
    deviation_pct: f64,
) -> bool {
    let (top_shape, bottom_shape) = match rule {
        Confirmation::Windowed {
            window_high,
            window_low,
        } => (high == window_high, low == window_low),
        Confirmation::DeviationOnly => (true, true),
    };

    if state.direction != Trend::Up && top_shape {
        if state.clears_top_deviation(high, deviation_pct) {
            state.confirm(PivotKind::High, index, high);
            out.tops.push((index, high));
            return true;
        }
    } else if state.direction != Trend::Down && bottom_shape {
        if state.clears_bottom_deviation(low, deviation_pct) {
            state.confirm(PivotKind::Low, index, low);
            out.bottoms.push((index, low));
            return true;
        }
    }
    false
}

/// ZigZag pivot detection.
///
/// Main scan: every `i` in `legs..len-legs` whose high (low) is the extremum of
/// `[i-legs, i+legs]` and moves more than `deviation_pct` from the last pivot
/// becomes a top (bottom), unless the trend already points that way. Ties go to
/// the earliest index because a confirmation flips the trend.
///
/// Trailing edge: the last `legs` candles cannot centre a window, so they are
/// tested against the deviation threshold only, every one of them. This is what
/// lets a bottom on the newest candle surface. A series too short for a single
/// window gets at most one pivot from this pass.
///
/// Pure in `(series, params)`: pivots with index `< len - legs` are unchanged when
/// more candles are appended (before `max_points` truncation).
pub fn calculate_zigzag(
    series: &OhlcvTimeSeries,
    params: &ZigZagParams,
) -> Result<ZigZag, DetectorError> {
    params.validate()?;

    let highs = &series.high_prices;
    let lows = &series.low_prices;
    let len = highs.len().min(lows.len());
    let legs = params.legs;

    let mut state = TrendState::default();
    let mut out = ZigZag::default();

    let main_end = len.saturating_sub(legs);
    for i in legs..main_end {
        let window = (i - legs)..=(i + legs);
        let rule = Confirmation::Windowed {
            window_high: get_max(&highs[window.clone()]),
            window_low: get_min(&lows[window]),
        };
        scan_step(
            &mut state,
            &mut out,
            i,
            highs[i],
            lows[i],
            rule,
            params.deviation_pct,
        );
    }

    let short_series = main_end <= legs;
    for i in legs.max(main_end)..len {
        let confirmed = scan_step(
            &mut state,
            &mut out,
            i,
            highs[i],
            lows[i],
            Confirmation::DeviationOnly,
            params.deviation_pct,
        );
        if confirmed && short_series {
            break;
        }
    }

    debug_assert!(out.is_alternating(), "{}: pivots must alternate", series.pair_interval);

    #[cfg(debug_assertions)]
    if crate::config::DF.log_pair_scans {
        log::debug!(
            "ZIGZAG [{}]: {} candles, {} tops, {} bottoms, last pivot at {:?}",
            series.pair_interval,
            len,
            out.tops.len(),
            out.bottoms.len(),
            state.last_pivot_index
        );
    }

    if let Some(n) = params.max_points {
        keep_latest(&mut out.tops, n);
        keep_latest(&mut out.bottoms, n);
    }

    Ok(out)
}

fn keep_latest<T>(items: &mut Vec<T>, n: usize) {
    let excess = items.len().saturating_sub(n);
    items.drain(..excess);
}
