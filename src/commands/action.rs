use std::str::FromStr;

use crate::error::DashboardError;
use crate::models::{SettingsInput, SortField};
use crate::sync::{ChartKind, Visibility};
use crate::view::ChartPeriod;

pub const HELP: &str = "\
commands:
  refresh                          fetch everything now
  filter [SYMBOL|all]              filter trades by symbol
  limit N                          trades to request (1-1000)
  sort FIELD                       timestamp|symbol|type|amount|price|total_value|status
  period volume|pnl 7d|30d|90d|all chart window
  settings URL [INTERVAL_MS] [--force]
  reset                            restore default endpoint settings
  test                             probe the current endpoint
  show | hide                      host view visibility
  status                           dashboard summary
  quit";

/// Every user intent the dashboard reacts to
#[derive(Debug, Clone)]
pub enum Action {
    Refresh,
    /// Empty string clears the filter
    FilterSymbol(String),
    SetLimit(u32),
    SortBy(SortField),
    SelectChartPeriod { chart: ChartKind, period: ChartPeriod },
    SaveSettings(SettingsInput),
    ResetSettings,
    TestConnection,
    VisibilityChanged(Visibility),
    Status,
    Dispose,
}

fn parse_settings(base_url: &str, rest: &[&str]) -> Result<Action, DashboardError> {
    let mut input = SettingsInput {
        base_url: base_url.to_string(),
        refresh_interval_ms: None,
        allow_unreachable: false,
    };

    for arg in rest {
        if *arg == "--force" {
            input.allow_unreachable = true;
        } else {
            let ms = arg
                .parse::<u64>()
                .map_err(|_| DashboardError::Validation(format!("Invalid refresh interval '{}'", arg)))?;
            input.refresh_interval_ms = Some(ms);
        }
    }

    Ok(Action::SaveSettings(input))
}

impl FromStr for Action {
    type Err = DashboardError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let mut words = line.split_whitespace();
        let Some(verb) = words.next() else {
            return Err(DashboardError::Validation("Empty command".to_string()));
        };
        let args: Vec<&str> = words.collect();

        match (verb.to_ascii_lowercase().as_str(), args.as_slice()) {
            ("refresh", []) => Ok(Action::Refresh),
            ("filter", []) => Ok(Action::FilterSymbol(String::new())),
            ("filter", [symbol]) if symbol.eq_ignore_ascii_case("all") => Ok(Action::FilterSymbol(String::new())),
            ("filter", [symbol]) => Ok(Action::FilterSymbol(symbol.to_string())),
            ("limit", [n]) => n
                .parse::<u32>()
                .map(Action::SetLimit)
                .map_err(|_| DashboardError::Validation(format!("Invalid limit '{}'", n))),
            ("sort", [field]) => Ok(Action::SortBy(field.parse()?)),
            ("period", [chart, period]) => Ok(Action::SelectChartPeriod {
                chart: chart.parse()?,
                period: period.parse()?,
            }),
            ("settings", [base_url, rest @ ..]) => parse_settings(base_url, rest),
            ("reset", []) => Ok(Action::ResetSettings),
            ("test", []) => Ok(Action::TestConnection),
            ("show", []) => Ok(Action::VisibilityChanged(Visibility::Visible)),
            ("hide", []) => Ok(Action::VisibilityChanged(Visibility::Hidden)),
            ("status", []) => Ok(Action::Status),
            ("quit" | "exit" | "dispose", []) => Ok(Action::Dispose),
            _ => Err(DashboardError::Validation(format!("Unknown command '{}'", line.trim()))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple_commands() {
        assert!(matches!("refresh".parse::<Action>().unwrap(), Action::Refresh));
        assert!(matches!("  HIDE ".parse::<Action>().unwrap(), Action::VisibilityChanged(Visibility::Hidden)));
        assert!(matches!("quit".parse::<Action>().unwrap(), Action::Dispose));
        assert!(matches!("limit 200".parse::<Action>().unwrap(), Action::SetLimit(200)));
    }

    #[test]
    fn test_parse_filter() {
        match "filter BTC/USD".parse::<Action>().unwrap() {
            Action::FilterSymbol(symbol) => assert_eq!(symbol, "BTC/USD"),
            other => panic!("unexpected action: {:?}", other),
        }
        match "filter all".parse::<Action>().unwrap() {
            Action::FilterSymbol(symbol) => assert!(symbol.is_empty()),
            other => panic!("unexpected action: {:?}", other),
        }
    }

    #[test]
    fn test_parse_sort_and_period() {
        assert!(matches!("sort total_value".parse::<Action>().unwrap(), Action::SortBy(SortField::TotalValue)));
        assert!(matches!(
            "period pnl 7d".parse::<Action>().unwrap(),
            Action::SelectChartPeriod {
                chart: ChartKind::Pnl,
                period: ChartPeriod::Week
            }
        ));
        assert!(matches!("sort fees".parse::<Action>(), Err(DashboardError::Validation(_))));
        assert!(matches!("period candles 7d".parse::<Action>(), Err(DashboardError::Validation(_))));
    }

    #[test]
    fn test_parse_settings() {
        match "settings http://10.0.0.5:28791 5000 --force".parse::<Action>().unwrap() {
            Action::SaveSettings(input) => {
                assert_eq!(input.base_url, "http://10.0.0.5:28791");
                assert_eq!(input.refresh_interval_ms, Some(5000));
                assert!(input.allow_unreachable);
            }
            other => panic!("unexpected action: {:?}", other),
        }
        assert!("settings http://x soon".parse::<Action>().is_err());
        assert!("settings".parse::<Action>().is_err());
    }

    #[test]
    fn test_unknown_input() {
        assert!(matches!("".parse::<Action>(), Err(DashboardError::Validation(_))));
        assert!(matches!("launch rockets".parse::<Action>(), Err(DashboardError::Validation(_))));
        assert!("refresh now".parse::<Action>().is_err());
    }
}
