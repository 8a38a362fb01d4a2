use async_trait::async_trait;
use serde_json::Value;
use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;

use super::client::{ConnectionStatus, DashboardApi, TradeHistoryQuery};
use super::envelope::{evaluate_response, parse_account_summary, parse_chart_data, parse_trade_history, parse_trading_stats};
use super::error::ApiError;
use super::rate_limiter::{RateLimitConfig, RateLimiter};
use crate::db::config_store::{persist_base_url, ConfigStore, BASE_URL_KEY};
use crate::models::{AccountSummary, ChartData, TradeHistory, TradingStats, DEFAULT_BASE_URL};

pub const TRADING_STATS_ENDPOINT: &str = "/api/trading-stats";
pub const TRADE_HISTORY_ENDPOINT: &str = "/api/trade-history";
pub const CHART_DATA_ENDPOINT: &str = "/api/chart-data";
pub const ACCOUNT_SUMMARY_ENDPOINT: &str = "/api/account-summary";
pub const BALANCE_ENDPOINT: &str = "/balance";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// reqwest-backed client for the dashboard endpoints
pub struct ApiClient {
    base_url: RwLock<String>,
    http_client: reqwest::Client,
    rate_limiter: RateLimiter,
    store: Arc<dyn ConfigStore>,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>, store: Arc<dyn ConfigStore>) -> Result<Self, ApiError> {
        let http_client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| ApiError::NetworkError(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            base_url: RwLock::new(normalize_base_url(&base_url.into())),
            http_client,
            rate_limiter: RateLimiter::new(RateLimitConfig::default()),
            store,
        })
    }

    fn endpoint_url(base_url: &str, path: &str) -> String {
        format!("{}{}", normalize_base_url(base_url), path)
    }

    async fn get_envelope(&self, path: &str, query: &[(&'static str, String)]) -> Result<Value, ApiError> {
        self.rate_limiter.acquire().await;

        let url = Self::endpoint_url(&self.current_base_url(), path);
        log::debug!("GET {}", url);

        let response = self.http_client.get(&url).query(query).send().await?;
        let status = response.status().as_u16();
        let body = response.text().await?;

        evaluate_response(status, &body).inspect_err(|e| log::warn!("GET {} failed: {}", url, e))
    }
}

fn normalize_base_url(raw: &str) -> String {
    raw.trim().trim_end_matches('/').to_string()
}

#[async_trait]
impl DashboardApi for ApiClient {
    async fn get_trading_stats(&self) -> Result<TradingStats, ApiError> {
        let envelope = self.get_envelope(TRADING_STATS_ENDPOINT, &[]).await?;
        Ok(parse_trading_stats(&envelope))
    }

    async fn get_trade_history(&self, query: &TradeHistoryQuery) -> Result<TradeHistory, ApiError> {
        let envelope = self
            .get_envelope(TRADE_HISTORY_ENDPOINT, &query.to_query_pairs())
            .await?;
        Ok(parse_trade_history(&envelope))
    }

    async fn get_chart_data(&self) -> Result<ChartData, ApiError> {
        let envelope = self.get_envelope(CHART_DATA_ENDPOINT, &[]).await?;
        Ok(parse_chart_data(&envelope))
    }

    async fn get_account_summary(&self) -> Result<AccountSummary, ApiError> {
        let envelope = self.get_envelope(ACCOUNT_SUMMARY_ENDPOINT, &[]).await?;
        Ok(parse_account_summary(&envelope))
    }

    async fn test_connection_to(&self, base_url: &str) -> ConnectionStatus {
        self.rate_limiter.acquire().await;

        let url = Self::endpoint_url(base_url, BALANCE_ENDPOINT);
        match self.http_client.get(&url).send().await {
            Ok(response) if response.status().is_success() => ConnectionStatus::connected(),
            Ok(response) => ConnectionStatus::failed(format!("{} returned HTTP {}", url, response.status())),
            Err(e) => ConnectionStatus::failed(ApiError::from(e).user_message()),
        }
    }

    fn current_base_url(&self) -> String {
        self.base_url.read().unwrap_or_else(PoisonError::into_inner).clone()
    }

    fn update_base_url(&self, base_url: &str) {
        let normalized = normalize_base_url(base_url);
        *self.base_url.write().unwrap_or_else(PoisonError::into_inner) = normalized.clone();

        if let Err(e) = persist_base_url(self.store.as_ref(), &normalized) {
            log::warn!("Base URL changed to {} for this session only: {}", normalized, e);
        } else {
            log::info!("Base URL changed to {}", normalized);
        }
    }

    fn reset_to_default(&self) -> String {
        *self.base_url.write().unwrap_or_else(PoisonError::into_inner) = DEFAULT_BASE_URL.to_string();

        if let Err(e) = self.store.remove(BASE_URL_KEY) {
            log::warn!("Failed to clear persisted base URL: {}", e);
        }
        DEFAULT_BASE_URL.to_string()
    }
}
