use serde::{Deserialize, Serialize};

use crate::error::DashboardError;

pub const DEFAULT_BASE_URL: &str = "http://localhost:28791";
pub const DEFAULT_REFRESH_INTERVAL_MS: u64 = 30_000;
pub const MIN_REFRESH_INTERVAL_MS: u64 = 1_000;

/// Backend location and polling cadence
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EndpointConfig {
    pub base_url: String,
    pub refresh_interval_ms: u64,
}

impl Default for EndpointConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            refresh_interval_ms: DEFAULT_REFRESH_INTERVAL_MS,
        }
    }
}

/// Settings form submitted by the user
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SettingsInput {
    pub base_url: String,
    pub refresh_interval_ms: Option<u64>,
    /// Save even if the connectivity probe against the new URL fails
    #[serde(default)]
    pub allow_unreachable: bool,
}

/// What happened to one refresh request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RefreshOutcome {
    /// All four reads succeeded and were applied
    Committed,
    /// At least one read failed; previous data kept
    Rejected,
    /// Another cycle was already in flight
    Skipped,
    /// The controller was disposed before the results could be applied
    Discarded,
}

/// Returned to the caller after a settings save
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SettingsSaved {
    pub config: EndpointConfig,
    pub reachable: bool,
    pub interval_changed: bool,
    /// Outcome of the reload against the new endpoint
    pub reload: RefreshOutcome,
}

/// Returned to the caller after restoring the defaults
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SettingsReset {
    pub config: EndpointConfig,
    pub interval_changed: bool,
    pub reload: RefreshOutcome,
}

/// Check that `raw` is an absolute http(s) URL and return it without trailing slashes
pub fn validate_base_url(raw: &str) -> Result<String, DashboardError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(DashboardError::Validation("Base URL must not be empty".to_string()));
    }

    let url = reqwest::Url::parse(trimmed)
        .map_err(|e| DashboardError::Validation(format!("Invalid URL '{}': {}", trimmed, e)))?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(DashboardError::Validation(format!(
            "Unsupported URL scheme '{}', expected http or https",
            url.scheme()
        )));
    }
    if url.host_str().is_none() {
        return Err(DashboardError::Validation(format!("URL '{}' has no host", trimmed)));
    }

    Ok(trimmed.trim_end_matches('/').to_string())
}

pub fn validate_refresh_interval(ms: u64) -> Result<u64, DashboardError> {
    if ms < MIN_REFRESH_INTERVAL_MS {
        return Err(DashboardError::Validation(format!(
            "Refresh interval must be at least {} ms, got {}",
            MIN_REFRESH_INTERVAL_MS, ms
        )));
    }
    Ok(ms)
}
