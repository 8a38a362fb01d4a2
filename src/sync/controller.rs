use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};
use std::time::Duration;
use tokio::sync::RwLock;

use super::notifier::{Notification, Notifier};
use super::scheduler::{CycleRunner, RefreshScheduler, SchedulerState, Visibility};
use crate::api::{ApiError, ConnectionStatus, DashboardApi, TradeHistoryQuery};
use crate::db::config_store::{clear_endpoint_config, persist_refresh_interval, ConfigStore};
use crate::error::DashboardError;
use crate::models::{
    clamp_limit, validate_base_url, validate_refresh_interval, AccountSummary, EndpointConfig, SettingsInput,
    SettingsReset, SettingsSaved, SortField, SortSpec, SymbolAggregate, Trade, TradingStats, ViewState,
};

pub use crate::models::RefreshOutcome;
use crate::utils::{extract_symbols, group_trades_by_symbol};
use crate::view::{filter_and_sort, ChartPeriod, ChartSeries, ChartView};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionState {
    #[default]
    Unknown,
    Connected,
    Disconnected,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartKind {
    Volume,
    Pnl,
}

impl FromStr for ChartKind {
    type Err = DashboardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "volume" => Ok(ChartKind::Volume),
            "pnl" => Ok(ChartKind::Pnl),
            other => Err(DashboardError::Validation(format!("Unknown chart '{}'", other))),
        }
    }
}

/// Everything the dashboard renders, replaced wholesale by each committed cycle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct DashboardState {
    pub view: ViewState,
    pub stats: TradingStats,
    pub account: AccountSummary,
    pub aggregates: Vec<SymbolAggregate>,
    pub symbols: Vec<String>,
    pub volume_chart: ChartSeries,
    pub pnl_chart: ChartSeries,
    pub connection: ConnectionState,
    pub last_error: Option<String>,
    pub last_updated: Option<DateTime<Utc>>,
}

/// Holds the in-flight flag for the duration of one cycle
struct InFlightGuard<'a>(&'a AtomicBool);

impl<'a> InFlightGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self(flag))
    }
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Owns the dashboard state and coordinates fetches, view changes and settings.
///
/// Always handled through an `Arc`; the scheduler calls back into it through a
/// weak reference.
pub struct DashboardController {
    api: Arc<dyn DashboardApi>,
    store: Arc<dyn ConfigStore>,
    notifier: Arc<dyn Notifier>,
    scheduler: RefreshScheduler,
    state: RwLock<DashboardState>,
    in_flight: AtomicBool,
    disposed: AtomicBool,
}

impl DashboardController {
    pub fn new(
        api: Arc<dyn DashboardApi>,
        store: Arc<dyn ConfigStore>,
        notifier: Arc<dyn Notifier>,
        refresh_interval_ms: u64,
    ) -> Arc<Self> {
        Arc::new_cyclic(|me: &Weak<Self>| {
            let runner: Weak<dyn CycleRunner> = me.clone();
            Self {
                api,
                store,
                notifier,
                scheduler: RefreshScheduler::new(runner, Duration::from_millis(refresh_interval_ms)),
                state: RwLock::new(DashboardState::default()),
                in_flight: AtomicBool::new(false),
                disposed: AtomicBool::new(false),
            }
        })
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed.load(Ordering::Acquire)
    }

    fn ensure_live(&self) -> Result<(), DashboardError> {
        if self.is_disposed() {
            return Err(DashboardError::Disposed);
        }
        Ok(())
    }

    /// Fetch stats, trades, charts and account together and commit them atomically.
    ///
    /// Never fails: a rejected cycle is recorded in the state and reported once
    /// through the notifier.
    pub async fn refresh(&self) -> RefreshOutcome {
        if self.is_disposed() {
            return RefreshOutcome::Discarded;
        }
        let Some(_guard) = InFlightGuard::acquire(&self.in_flight) else {
            log::debug!("Refresh already in flight, skipping");
            return RefreshOutcome::Skipped;
        };

        let query = TradeHistoryQuery::from(&self.state.read().await.view.filters);

        let (stats, history, chart, account) = futures::join!(
            self.api.get_trading_stats(),
            self.api.get_trade_history(&query),
            self.api.get_chart_data(),
            self.api.get_account_summary(),
        );

        if self.is_disposed() {
            log::debug!("Dashboard disposed during refresh, discarding results");
            return RefreshOutcome::Discarded;
        }

        let (stats, history, chart, account) = match (stats, history, chart, account) {
            (Ok(stats), Ok(history), Ok(chart), Ok(account)) => (stats, history, chart, account),
            (Err(e), _, _, _) | (_, Err(e), _, _) | (_, _, Err(e), _) | (_, _, _, Err(e)) => {
                return self.record_failure(e).await;
            }
        };

        let aggregates = group_trades_by_symbol(&history.trades);
        let symbols = extract_symbols(&history.trades);
        let trade_count = history.trades.len();

        {
            let mut state = self.state.write().await;
            // dispose() may have run while we waited for the lock
            if self.is_disposed() {
                log::debug!("Dashboard disposed during refresh, discarding results");
                return RefreshOutcome::Discarded;
            }
            state.view.trades = history.trades;
            state.stats = stats;
            state.account = account;
            state.aggregates = aggregates;
            state.symbols = symbols;
            state.volume_chart.replace_source(chart.volume_data);
            state.pnl_chart.replace_source(chart.pnl_data);
            state.connection = ConnectionState::Connected;
            state.last_error = None;
            state.last_updated = Some(Utc::now());
        }

        log::info!("Dashboard refreshed ({} trades)", trade_count);
        RefreshOutcome::Committed
    }

    async fn record_failure(&self, error: ApiError) -> RefreshOutcome {
        let message = error.user_message();
        {
            let mut state = self.state.write().await;
            if self.is_disposed() {
                log::debug!("Dashboard disposed during refresh, dropping failure: {}", error);
                return RefreshOutcome::Discarded;
            }
            state.connection = ConnectionState::Disconnected;
            state.last_error = Some(message.clone());
        }

        log::error!("Dashboard refresh failed: {}", error);
        self.notifier.notify(Notification::error("Failed to refresh dashboard", message));
        RefreshOutcome::Rejected
    }

    /// Initial load, then periodic polling
    pub async fn start(&self) -> Result<RefreshOutcome, DashboardError> {
        self.ensure_live()?;
        let outcome = self.refresh().await;
        self.scheduler.start()?;
        Ok(outcome)
    }

    /// Forward a visibility change; resuming triggers an immediate refresh
    pub async fn handle_visibility(&self, visibility: Visibility) -> Result<Option<RefreshOutcome>, DashboardError> {
        self.ensure_live()?;
        if self.scheduler.set_visibility(visibility)? {
            return Ok(Some(self.refresh().await));
        }
        Ok(None)
    }

    pub async fn set_symbol_filter(&self, symbol: &str) -> Result<RefreshOutcome, DashboardError> {
        self.ensure_live()?;
        self.state.write().await.view.filters.symbol = symbol.trim().to_string();
        Ok(self.refresh().await)
    }

    pub async fn set_limit(&self, limit: u32) -> Result<RefreshOutcome, DashboardError> {
        self.ensure_live()?;
        self.state.write().await.view.filters.limit = clamp_limit(limit);
        Ok(self.refresh().await)
    }

    /// Toggle the table sort; purely local
    pub async fn sort_by(&self, field: SortField) -> SortSpec {
        let mut state = self.state.write().await;
        state.view.sort.toggle(field);
        state.view.sort
    }

    /// Committed trades with the current filter and sort applied
    pub async fn displayed_trades(&self) -> Vec<Trade> {
        let state = self.state.read().await;
        filter_and_sort(&state.view.trades, &state.view.filters, &state.view.sort)
    }

    pub async fn select_chart_period(&self, kind: ChartKind, period: ChartPeriod) -> ChartView {
        let mut state = self.state.write().await;
        let series = match kind {
            ChartKind::Volume => &mut state.volume_chart,
            ChartKind::Pnl => &mut state.pnl_chart,
        };
        series.select_period(period, Utc::now())
    }

    pub async fn chart_view(&self, kind: ChartKind) -> ChartView {
        let state = self.state.read().await;
        match kind {
            ChartKind::Volume => state.volume_chart.view(Utc::now()),
            ChartKind::Pnl => state.pnl_chart.view(Utc::now()),
        }
    }

    /// Validate, probe and apply a new endpoint configuration
    pub async fn save_settings(&self, input: SettingsInput) -> Result<SettingsSaved, DashboardError> {
        self.ensure_live()?;

        let base_url = validate_base_url(&input.base_url)?;
        let current_interval = self.refresh_interval_ms();
        let refresh_interval_ms = match input.refresh_interval_ms {
            Some(ms) => validate_refresh_interval(ms)?,
            None => current_interval,
        };

        let probe = self.api.test_connection_to(&base_url).await;
        if !probe.connected && !input.allow_unreachable {
            let reason = probe.error.unwrap_or_else(|| "connection test failed".to_string());
            return Err(DashboardError::Unreachable(format!("{}: {}", base_url, reason)));
        }
        self.ensure_live()?;

        self.api.update_base_url(&base_url);
        if let Err(e) = persist_refresh_interval(self.store.as_ref(), refresh_interval_ms) {
            log::warn!("Refresh interval applied for this session only: {}", e);
        }

        let interval_changed = refresh_interval_ms != current_interval;
        if interval_changed {
            self.scheduler.set_interval(Duration::from_millis(refresh_interval_ms))?;
        }

        self.state.write().await.connection = connection_state(&probe);

        let body = if probe.connected {
            format!("Connected to {}", base_url)
        } else {
            format!("Saved {} without a successful connection test", base_url)
        };
        self.notifier.notify(Notification::success("Settings saved", body));

        let reload = self.refresh().await;

        Ok(SettingsSaved {
            config: EndpointConfig {
                base_url,
                refresh_interval_ms,
            },
            reachable: probe.connected,
            interval_changed,
            reload,
        })
    }

    /// Restore and persist the default endpoint configuration
    pub async fn reset_settings(&self) -> Result<SettingsReset, DashboardError> {
        self.ensure_live()?;

        let defaults = EndpointConfig::default();
        self.api.reset_to_default();
        if let Err(e) = clear_endpoint_config(self.store.as_ref()) {
            log::warn!("Failed to clear persisted settings: {}", e);
        }

        let interval_changed = self.refresh_interval_ms() != defaults.refresh_interval_ms;
        if interval_changed {
            self.scheduler
                .set_interval(Duration::from_millis(defaults.refresh_interval_ms))?;
        }

        self.notifier.notify(Notification::info(
            "Settings reset",
            format!("Using {}", defaults.base_url),
        ));
        let reload = self.refresh().await;

        Ok(SettingsReset {
            config: defaults,
            interval_changed,
            reload,
        })
    }

    pub async fn test_connection(&self) -> ConnectionStatus {
        let status = self.api.test_connection().await;
        self.state.write().await.connection = connection_state(&status);
        status
    }

    /// Stop polling for good; results of an in-flight cycle are dropped
    pub fn dispose(&self) {
        if self.disposed.swap(true, Ordering::AcqRel) {
            return;
        }
        self.scheduler.dispose();
        log::info!("Dashboard disposed");
    }

    pub async fn snapshot(&self) -> DashboardState {
        self.state.read().await.clone()
    }

    pub fn config(&self) -> EndpointConfig {
        EndpointConfig {
            base_url: self.api.current_base_url(),
            refresh_interval_ms: self.refresh_interval_ms(),
        }
    }

    pub fn refresh_interval_ms(&self) -> u64 {
        self.scheduler.interval().as_millis() as u64
    }

    pub fn scheduler_state(&self) -> SchedulerState {
        self.scheduler.state()
    }
}

fn connection_state(status: &ConnectionStatus) -> ConnectionState {
    if status.connected {
        ConnectionState::Connected
    } else {
        ConnectionState::Disconnected
    }
}

#[async_trait]
impl CycleRunner for DashboardController {
    async fn run_cycle(&self) {
        let outcome = self.refresh().await;
        log::debug!("Scheduled refresh: {:?}", outcome);
    }
}
