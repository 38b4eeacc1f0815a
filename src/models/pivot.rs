use {
    crate::utils::format_table_time,
    chrono::{DateTime, Utc},
    serde::{Deserialize, Serialize},
    strum_macros::Display,
    tabled::Tabled,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
pub enum PivotKind {
    #[strum(to_string = "top")]
    #[serde(rename = "top")]
    High,
    #[strum(to_string = "bottom")]
    #[serde(rename = "bottom")]
    Low,
}

/// A confirmed turning point, addressed by its index in the series it was detected on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pivot {
    pub index: usize,
    pub price: f64,
    pub kind: PivotKind,
    pub time: DateTime<Utc>,
}

impl Pivot {
    pub fn formatted_time(&self) -> String {
        format_table_time(self.time.timestamp_millis())
    }
}

/// `{time, value, type}` point for chart overlays.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartPoint {
    pub time: DateTime<Utc>,
    pub value: f64,
    #[serde(rename = "type")]
    pub kind: PivotKind,
}

impl From<&Pivot> for ChartPoint {
    fn from(p: &Pivot) -> Self {
        Self {
            time: p.time,
            value: p.price,
            kind: p.kind,
        }
    }
}

/// One row of the bottoms table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Tabled)]
pub struct BottomRow {
    pub index: usize,
    pub value: f64,
    pub formatted_time: String,
}

impl From<&Pivot> for BottomRow {
    fn from(p: &Pivot) -> Self {
        Self {
            index: p.index,
            value: p.price,
            formatted_time: p.formatted_time(),
        }
    }
}
