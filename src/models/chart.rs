use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ChartSeriesPoint {
    pub date: String,
    pub value: f64,
}

impl ChartSeriesPoint {
    pub fn new(date: impl Into<String>, value: f64) -> Self {
        Self {
            date: date.into(),
            value,
        }
    }
}

/// Both chart series from `/api/chart-data`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ChartData {
    pub volume_data: Vec<ChartSeriesPoint>,
    pub pnl_data: Vec<ChartSeriesPoint>,
}
