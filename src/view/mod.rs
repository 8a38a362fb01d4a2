pub mod chart;
pub mod filter_sort;

pub use chart::{build_chart_view, filter_data_by_days, ChartPeriod, ChartSeries, ChartView, Trend};
pub use filter_sort::{filter_and_sort, filter_trades, sort_trades};
