use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::error::ApiError;
use crate::models::{clamp_limit, AccountSummary, ChartData, TradeFilters, TradeHistory, TradingStats};

/// Query for `/api/trade-history`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct TradeHistoryQuery {
    /// Exact symbol, e.g. "BTC/USD"; empty or None means all symbols
    pub symbol: Option<String>,
    /// Clamped to 1..=1000, defaults to 50
    pub limit: Option<u32>,
}

impl TradeHistoryQuery {
    /// Query-string pairs, with the limit clamped and an empty symbol dropped
    pub fn to_query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = vec![("limit", clamp_limit(self.limit.unwrap_or(0)).to_string())];
        if let Some(symbol) = self.symbol.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            pairs.push(("symbol", symbol.to_string()));
        }
        pairs
    }
}

impl From<&TradeFilters> for TradeHistoryQuery {
    fn from(filters: &TradeFilters) -> Self {
        Self {
            symbol: Some(filters.symbol.clone()).filter(|s| !s.trim().is_empty()),
            limit: Some(filters.limit),
        }
    }
}

/// Outcome of the `/balance` probe
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionStatus {
    pub connected: bool,
    pub error: Option<String>,
}

impl ConnectionStatus {
    pub fn connected() -> Self {
        Self {
            connected: true,
            error: None,
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            connected: false,
            error: Some(error.into()),
        }
    }
}

/// Read surface of the trading backend
#[async_trait]
pub trait DashboardApi: Send + Sync {
    async fn get_trading_stats(&self) -> Result<TradingStats, ApiError>;

    async fn get_trade_history(&self, query: &TradeHistoryQuery) -> Result<TradeHistory, ApiError>;

    async fn get_chart_data(&self) -> Result<ChartData, ApiError>;

    async fn get_account_summary(&self) -> Result<AccountSummary, ApiError>;

    /// Probe an arbitrary base URL; never fails, reports through the status
    async fn test_connection_to(&self, base_url: &str) -> ConnectionStatus;

    /// Probe the currently configured base URL
    async fn test_connection(&self) -> ConnectionStatus {
        let base_url = self.current_base_url();
        self.test_connection_to(&base_url).await
    }

    fn current_base_url(&self) -> String;

    /// Switch endpoints; persistence failures are logged, the new URL still applies
    fn update_base_url(&self, base_url: &str);

    /// Restore the compiled default and forget the persisted override
    fn reset_to_default(&self) -> String;
}
