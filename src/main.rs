use std::env;

const DB_PATH_VAR: &str = "TRADE_DASHBOARD_DB";
const BASE_URL_VAR: &str = "TRADE_DASHBOARD_URL";
const DEFAULT_DB_PATH: &str = "trade_dashboard.db";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let db_path = env::var(DB_PATH_VAR).unwrap_or_else(|_| DEFAULT_DB_PATH.to_string());
    let base_url = env::var(BASE_URL_VAR).ok().filter(|url| !url.trim().is_empty());

    trade_dashboard_lib::run(db_path, base_url).await
}
