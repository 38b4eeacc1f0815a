mod alert;
mod ohlcv;
mod pivot;
mod report;

pub use alert::AlertEvent;
pub use ohlcv::OhlcvTimeSeries;
pub use pivot::{BottomRow, ChartPoint, Pivot, PivotKind};
pub use report::PivotReport;
