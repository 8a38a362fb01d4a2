//! Plain-text rendering of action outcomes for the console front end.

use chrono::{DateTime, Utc};
use std::fmt::Write;

use super::dispatch::ActionOutcome;
use crate::models::Trade;
use crate::sync::{ConnectionState, DashboardState, RefreshOutcome};
use crate::utils::{format_amount, format_currency, format_date, format_number, format_percentage, format_relative_time};
use crate::view::ChartView;

fn refresh_line(outcome: RefreshOutcome) -> &'static str {
    match outcome {
        RefreshOutcome::Committed => "Dashboard updated",
        RefreshOutcome::Rejected => "Refresh failed, showing previous data",
        RefreshOutcome::Skipped => "Refresh already running",
        RefreshOutcome::Discarded => "Dashboard closed",
    }
}

fn trades_table(trades: &[Trade]) -> String {
    if trades.is_empty() {
        return "No trades".to_string();
    }

    let mut out = String::new();
    for trade in trades {
        let _ = writeln!(
            out,
            "{:<18} {:<10} {:<4} {:>12} {:>14} {:>14} {}",
            format_date(&trade.timestamp),
            trade.symbol,
            trade.trade_type.as_str(),
            format_amount(trade.amount),
            format_currency(trade.price),
            format_currency(trade.total_value),
            trade.status.as_str(),
        );
    }
    out.trim_end().to_string()
}

fn chart_listing(view: &ChartView) -> String {
    let mut out = format!("trend {:?} ({})", view.trend, view.trend.color());
    for (label, value) in view.labels.iter().zip(&view.values) {
        let _ = write!(out, "\n  {:<8} {:>12}", label, format_number(*value));
    }
    out
}

fn status_summary(state: &DashboardState, now: DateTime<Utc>) -> String {
    let connection = match state.connection {
        ConnectionState::Connected => "connected",
        ConnectionState::Disconnected => "disconnected",
        ConnectionState::Unknown => "unknown",
    };
    let updated = state
        .last_updated
        .map(|ts| format_relative_time(&ts.to_rfc3339(), now))
        .unwrap_or_else(|| "never".to_string());

    let mut out = format!(
        "{} | updated {}\ntrades {} (buy {}, sell {}) | success {} | volume {} | est. P&L {}",
        connection,
        updated,
        state.stats.total_trades,
        state.stats.buy_trades,
        state.stats.sell_trades,
        format_percentage(state.stats.success_rate),
        format_number(state.stats.total_volume),
        format_currency(state.stats.estimated_pnl()),
    );
    if let Some(address) = &state.account.address {
        let _ = write!(
            out,
            "\naccount {} value {}",
            address,
            format_currency(state.account.perp_account_value)
        );
    }
    for aggregate in &state.aggregates {
        let _ = write!(
            out,
            "\n  {:<10} {:>3} trades ({} buy / {} sell) {:>14}",
            aggregate.symbol,
            aggregate.total_trades,
            aggregate.buy_trades,
            aggregate.sell_trades,
            format_currency(aggregate.total_volume),
        );
    }
    if let Some(error) = &state.last_error {
        let _ = write!(out, "\nlast error: {}", error);
    }
    out
}

pub fn render(outcome: &ActionOutcome, now: DateTime<Utc>) -> String {
    match outcome {
        ActionOutcome::Refreshed(outcome) => refresh_line(*outcome).to_string(),
        ActionOutcome::Visibility(Some(outcome)) => format!("Polling resumed. {}", refresh_line(*outcome)),
        ActionOutcome::Visibility(None) => "Visibility updated".to_string(),
        ActionOutcome::Trades(trades) => trades_table(trades),
        ActionOutcome::Chart(view) => chart_listing(view),
        ActionOutcome::SettingsSaved(saved) => format!(
            "Saved {} every {} ms{}. {}",
            saved.config.base_url,
            saved.config.refresh_interval_ms,
            if saved.reachable { "" } else { " (endpoint not reachable)" },
            refresh_line(saved.reload)
        ),
        ActionOutcome::SettingsReset(reset) => format!(
            "Reset to {} every {} ms. {}",
            reset.config.base_url,
            reset.config.refresh_interval_ms,
            refresh_line(reset.reload)
        ),
        ActionOutcome::Connection(status) if status.connected => "Connected".to_string(),
        ActionOutcome::Connection(status) => {
            format!("Not connected: {}", status.error.as_deref().unwrap_or("unknown error"))
        }
        ActionOutcome::Status(state) => status_summary(state, now),
        ActionOutcome::Disposed => "Bye".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::ConnectionStatus;
    use crate::models::{EndpointConfig, SettingsReset, SettingsSaved, SymbolAggregate, TradingStats};
    use crate::view::Trend;
    use chrono::TimeZone;

    #[test]
    fn test_trades_table() {
        let trades = vec![Trade {
            symbol: "BTC/USD".to_string(),
            amount: 0.5,
            price: 65000.0,
            total_value: 32500.0,
            timestamp: "2025-01-05T14:03:00".to_string(),
            ..Default::default()
        }];
        let text = render(&ActionOutcome::Trades(trades), Utc::now());
        assert!(text.contains("Jan 5, 2025 14:03"));
        assert!(text.contains("$32,500.00"));
        assert!(text.contains("0.5"));

        assert_eq!(render(&ActionOutcome::Trades(vec![]), Utc::now()), "No trades");
    }

    #[test]
    fn test_status_summary() {
        let now = Utc.with_ymd_and_hms(2025, 1, 5, 12, 0, 0).unwrap();
        let state = DashboardState {
            stats: TradingStats {
                total_trades: 4,
                success_rate: 50.0,
                total_volume: 1500.0,
                ..Default::default()
            },
            aggregates: vec![SymbolAggregate {
                symbol: "BTC/USD".to_string(),
                total_volume: 1500.0,
                total_trades: 4,
                buy_trades: 3,
                sell_trades: 1,
            }],
            connection: ConnectionState::Connected,
            last_updated: Some(now - chrono::Duration::minutes(5)),
            ..Default::default()
        };

        let text = render(&ActionOutcome::Status(Box::new(state)), now);
        assert!(text.starts_with("connected | updated 5m ago"));
        assert!(text.contains("volume 1.50K"));
        assert!(text.contains("est. P&L $7.50"));
        assert!(text.contains("50.00%"));
    }

    #[test]
    fn test_misc_outcomes() {
        let view = ChartView {
            labels: vec!["Jan 5".to_string()],
            values: vec![-12.0],
            trend: Trend::Negative,
            segment_trends: vec![],
        };
        assert!(render(&ActionOutcome::Chart(view), Utc::now()).contains("#ef4444"));
        assert_eq!(
            render(&ActionOutcome::Connection(ConnectionStatus::failed("refused")), Utc::now()),
            "Not connected: refused"
        );
        assert_eq!(
            render(&ActionOutcome::Refreshed(RefreshOutcome::Skipped), Utc::now()),
            "Refresh already running"
        );
    }

    #[test]
    fn test_settings_outcomes_report_reload() {
        let saved = SettingsSaved {
            config: EndpointConfig {
                base_url: "https://bot.example.com".to_string(),
                refresh_interval_ms: 5_000,
            },
            reachable: false,
            interval_changed: true,
            reload: RefreshOutcome::Rejected,
        };
        assert_eq!(
            render(&ActionOutcome::SettingsSaved(saved), Utc::now()),
            "Saved https://bot.example.com every 5000 ms (endpoint not reachable). Refresh failed, showing previous data"
        );

        let reset = SettingsReset {
            config: EndpointConfig::default(),
            interval_changed: false,
            reload: RefreshOutcome::Skipped,
        };
        assert!(render(&ActionOutcome::SettingsReset(reset), Utc::now()).ends_with("Refresh already running"));
    }
}
