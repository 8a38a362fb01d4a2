use super::action::Action;
use crate::api::ConnectionStatus;
use crate::error::DashboardError;
use crate::models::{SettingsReset, SettingsSaved, Trade};
use crate::sync::{DashboardController, DashboardState, RefreshOutcome};
use crate::view::ChartView;

/// Result of one dispatched action, ready to render
#[derive(Debug, Clone, PartialEq)]
pub enum ActionOutcome {
    Refreshed(RefreshOutcome),
    /// `Some` when the visibility change resumed polling and refreshed
    Visibility(Option<RefreshOutcome>),
    Trades(Vec<Trade>),
    Chart(ChartView),
    SettingsSaved(SettingsSaved),
    SettingsReset(SettingsReset),
    Connection(ConnectionStatus),
    Status(Box<DashboardState>),
    Disposed,
}

/// Route one action to the controller
pub async fn dispatch(controller: &DashboardController, action: Action) -> Result<ActionOutcome, DashboardError> {
    log::debug!("Dispatching {:?}", action);

    match action {
        Action::Refresh => Ok(ActionOutcome::Refreshed(controller.refresh().await)),
        Action::FilterSymbol(symbol) => Ok(ActionOutcome::Refreshed(controller.set_symbol_filter(&symbol).await?)),
        Action::SetLimit(limit) => Ok(ActionOutcome::Refreshed(controller.set_limit(limit).await?)),
        Action::SortBy(field) => {
            controller.sort_by(field).await;
            Ok(ActionOutcome::Trades(controller.displayed_trades().await))
        }
        Action::SelectChartPeriod { chart, period } => {
            Ok(ActionOutcome::Chart(controller.select_chart_period(chart, period).await))
        }
        Action::SaveSettings(input) => Ok(ActionOutcome::SettingsSaved(controller.save_settings(input).await?)),
        Action::ResetSettings => Ok(ActionOutcome::SettingsReset(controller.reset_settings().await?)),
        Action::TestConnection => Ok(ActionOutcome::Connection(controller.test_connection().await)),
        Action::VisibilityChanged(visibility) => {
            Ok(ActionOutcome::Visibility(controller.handle_visibility(visibility).await?))
        }
        Action::Status => Ok(ActionOutcome::Status(Box::new(controller.snapshot().await))),
        Action::Dispose => {
            controller.dispose();
            Ok(ActionOutcome::Disposed)
        }
    }
}
