use thiserror::Error;

use crate::api::ApiError;

/// Errors returned by controller operations and action dispatch.
///
/// Refresh cycles never return these; a failed cycle is recorded in the
/// dashboard state instead.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DashboardError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Endpoint unreachable: {0}")]
    Unreachable(String),

    #[error("Dashboard has been disposed")]
    Disposed,

    #[error(transparent)]
    Api(#[from] ApiError),
}

/// Failure reading or writing the persisted endpoint configuration.
///
/// Always non-fatal: the config layer logs it and falls back to defaults.
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Storage lock poisoned: {0}")]
    Lock(String),

    #[error("Invalid stored value for {key}: {value}")]
    InvalidValue { key: String, value: String },
}
