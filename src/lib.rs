pub mod api;
pub mod commands;
pub mod db;
pub mod error;
pub mod models;
pub mod sync;
pub mod utils;
pub mod view;

use anyhow::{Context, Result};
use chrono::Utc;
use std::path::Path;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};

use api::{ApiClient, DashboardApi};
use commands::{dispatch, render, Action, ActionOutcome, HELP};
use db::{load_endpoint_config, ConfigStore, Database};
use models::{validate_base_url, EndpointConfig};
use sync::{DashboardController, LogNotifier, Notifier};

/// Composition root: every component is built once here and shared by `Arc`
pub struct Dashboard {
    pub controller: Arc<DashboardController>,
    pub config: EndpointConfig,
}

impl Dashboard {
    /// Wire the API client and controller on top of `store`.
    ///
    /// `base_url_override` replaces the persisted endpoint for this session and
    /// is persisted in turn.
    pub fn build(
        store: Arc<dyn ConfigStore>,
        notifier: Arc<dyn Notifier>,
        base_url_override: Option<&str>,
    ) -> Result<Self> {
        let mut config = load_endpoint_config(store.as_ref());

        let api = ApiClient::new(config.base_url.clone(), store.clone()).context("Failed to create API client")?;
        if let Some(raw) = base_url_override {
            let base_url = validate_base_url(raw)?;
            api.update_base_url(&base_url);
            config.base_url = base_url;
        }

        log::info!(
            "Dashboard backend {} (refresh every {} ms)",
            config.base_url,
            config.refresh_interval_ms
        );

        let controller = DashboardController::new(Arc::new(api), store, notifier, config.refresh_interval_ms);
        Ok(Self { controller, config })
    }

    /// Build on the SQLite settings database at `db_path`
    pub fn open(db_path: impl AsRef<Path>, base_url_override: Option<&str>) -> Result<Self> {
        let db_path = db_path.as_ref();
        let database = Database::new(db_path)
            .with_context(|| format!("Failed to open settings database {}", db_path.display()))?;

        Self::build(Arc::new(database), Arc::new(LogNotifier), base_url_override)
    }
}

/// Run the dashboard against stdin until `quit` or end of input
pub async fn run(db_path: impl AsRef<Path>, base_url_override: Option<String>) -> Result<()> {
    let dashboard = Dashboard::open(db_path, base_url_override.as_deref())?;
    let controller = dashboard.controller;

    let initial = controller.start().await?;
    println!("{}", render(&ActionOutcome::Refreshed(initial), Utc::now()));
    println!("{}", HELP);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await.context("Failed to read console input")? {
        if line.trim().is_empty() {
            continue;
        }

        let action = match line.parse::<Action>() {
            Ok(action) => action,
            Err(e) => {
                println!("{}\n{}", e, HELP);
                continue;
            }
        };
        let quit = matches!(action, Action::Dispose);

        match dispatch(&controller, action).await {
            Ok(outcome) => println!("{}", render(&outcome, Utc::now())),
            Err(e) => println!("{}", e),
        }
        if quit {
            break;
        }
    }

    controller.dispose();
    Ok(())
}
