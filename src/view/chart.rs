//! Reshapes raw chart series into label/value pairs for the charting layer.

use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::DashboardError;
use crate::models::ChartSeriesPoint;
use crate::utils::time::{parse_date, parse_timestamp};

pub const EMPTY_LABEL: &str = "No data";

pub const POSITIVE_COLOR: &str = "#10b981";
pub const NEGATIVE_COLOR: &str = "#ef4444";
pub const NEUTRAL_COLOR: &str = "#6b7280";

/// Retention window selectable on each chart
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ChartPeriod {
    Week,
    #[default]
    Month,
    Quarter,
    All,
}

impl ChartPeriod {
    pub fn days(&self) -> Option<i64> {
        match self {
            ChartPeriod::Week => Some(7),
            ChartPeriod::Month => Some(30),
            ChartPeriod::Quarter => Some(90),
            ChartPeriod::All => None,
        }
    }
}

impl FromStr for ChartPeriod {
    type Err = DashboardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "7" | "7d" | "week" => Ok(ChartPeriod::Week),
            "30" | "30d" | "month" => Ok(ChartPeriod::Month),
            "90" | "90d" | "quarter" => Ok(ChartPeriod::Quarter),
            "all" => Ok(ChartPeriod::All),
            other => Err(DashboardError::Validation(format!("Unknown chart period '{}'", other))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Positive,
    Negative,
    Neutral,
}

impl Trend {
    pub fn of(value: f64) -> Self {
        if value > 0.0 {
            Trend::Positive
        } else if value < 0.0 {
            Trend::Negative
        } else {
            Trend::Neutral
        }
    }

    pub fn color(&self) -> &'static str {
        match self {
            Trend::Positive => POSITIVE_COLOR,
            Trend::Negative => NEGATIVE_COLOR,
            Trend::Neutral => NEUTRAL_COLOR,
        }
    }
}

/// What the charting layer consumes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartView {
    pub labels: Vec<String>,
    pub values: Vec<f64>,
    /// Sign of the last value
    pub trend: Trend,
    /// Sign of each consecutive delta, `values.len() - 1` entries
    pub segment_trends: Vec<Trend>,
}

impl ChartView {
    pub fn is_placeholder(&self) -> bool {
        self.labels.len() == 1 && self.labels[0] == EMPTY_LABEL
    }
}

/// Ascending by date; points with unreadable dates come first in input order
pub fn sort_by_date(points: &[ChartSeriesPoint]) -> Vec<ChartSeriesPoint> {
    let mut sorted = points.to_vec();
    sorted.sort_by_key(|p| parse_date(&p.date));
    sorted
}

/// Keep points no older than `days` before `now`, evaluated on the unfiltered input.
///
/// Plain dates count as midnight UTC.
pub fn filter_data_by_days(points: &[ChartSeriesPoint], days: i64, now: DateTime<Utc>) -> Vec<ChartSeriesPoint> {
    let cutoff = now - Duration::days(days);
    points
        .iter()
        .filter(|p| parse_timestamp(&p.date).is_some_and(|ts| ts >= cutoff))
        .cloned()
        .collect()
}

pub fn series_trend(values: &[f64]) -> Trend {
    values.last().copied().map(Trend::of).unwrap_or(Trend::Neutral)
}

pub fn segment_trends(values: &[f64]) -> Vec<Trend> {
    values.windows(2).map(|pair| Trend::of(pair[1] - pair[0])).collect()
}

fn short_label(raw: &str) -> String {
    match parse_date(raw) {
        Some(date) => format_label(date),
        None => raw.to_string(),
    }
}

fn format_label(date: NaiveDate) -> String {
    date.format("%b %-d").to_string()
}

/// Sort, window and color one series
pub fn build_chart_view(source: &[ChartSeriesPoint], period: ChartPeriod, now: DateTime<Utc>) -> ChartView {
    let sorted = sort_by_date(source);
    let points = match period.days() {
        Some(days) => filter_data_by_days(&sorted, days, now),
        None => sorted,
    };

    if points.is_empty() {
        return ChartView {
            labels: vec![EMPTY_LABEL.to_string()],
            values: vec![0.0],
            trend: Trend::Neutral,
            segment_trends: Vec::new(),
        };
    }

    let labels = points.iter().map(|p| short_label(&p.date)).collect();
    let values: Vec<f64> = points.iter().map(|p| p.value).collect();

    ChartView {
        trend: series_trend(&values),
        segment_trends: segment_trends(&values),
        labels,
        values,
    }
}

/// One chart's unfiltered source plus its selected period.
///
/// Views are always re-derived from `source`, so switching periods never
/// compounds earlier filters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ChartSeries {
    source: Vec<ChartSeriesPoint>,
    period: ChartPeriod,
}

impl ChartSeries {
    pub fn new(source: Vec<ChartSeriesPoint>, period: ChartPeriod) -> Self {
        Self { source, period }
    }

    pub fn source(&self) -> &[ChartSeriesPoint] {
        &self.source
    }

    pub fn period(&self) -> ChartPeriod {
        self.period
    }

    /// Swap in fresh data, keeping the selected period
    pub fn replace_source(&mut self, source: Vec<ChartSeriesPoint>) {
        self.source = source;
    }

    pub fn select_period(&mut self, period: ChartPeriod, now: DateTime<Utc>) -> ChartView {
        self.period = period;
        self.view(now)
    }

    pub fn view(&self, now: DateTime<Utc>) -> ChartView {
        build_chart_view(&self.source, self.period, now)
    }
}
