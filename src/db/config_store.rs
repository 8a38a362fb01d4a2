use rusqlite::{params, OptionalExtension};
use std::collections::HashMap;
use std::sync::Mutex;

use super::connection::Database;
use crate::error::StorageError;
use crate::models::{validate_base_url, validate_refresh_interval, EndpointConfig};

pub const BASE_URL_KEY: &str = "base_url";
pub const REFRESH_INTERVAL_KEY: &str = "refresh_interval_ms";

/// Durable key-value storage for endpoint settings
pub trait ConfigStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

impl ConfigStore for Database {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let conn = self.lock()?;
        let value = conn
            .query_row("SELECT value FROM endpoint_settings WHERE key = ?", [key], |row| row.get(0))
            .optional()?;
        Ok(value)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let conn = self.lock()?;
        conn.execute(
            "INSERT INTO endpoint_settings (key, value, updated_at) VALUES (?, ?, strftime('%s', 'now'))
             ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
            params![key, value],
        )?;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        let conn = self.lock()?;
        conn.execute("DELETE FROM endpoint_settings WHERE key = ?", [key])?;
        Ok(())
    }
}

/// Process-local store for tests and throwaway sessions
#[derive(Default)]
pub struct MemoryStore {
    values: Mutex<HashMap<String, String>>,
}

impl ConfigStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let values = self.values.lock().map_err(|e| StorageError::Lock(e.to_string()))?;
        Ok(values.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut values = self.values.lock().map_err(|e| StorageError::Lock(e.to_string()))?;
        values.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        let mut values = self.values.lock().map_err(|e| StorageError::Lock(e.to_string()))?;
        values.remove(key);
        Ok(())
    }
}

fn stored_base_url(store: &dyn ConfigStore) -> Result<Option<String>, StorageError> {
    match store.get(BASE_URL_KEY)? {
        Some(raw) => validate_base_url(&raw)
            .map(Some)
            .map_err(|_| StorageError::InvalidValue {
                key: BASE_URL_KEY.to_string(),
                value: raw,
            }),
        None => Ok(None),
    }
}

fn stored_refresh_interval(store: &dyn ConfigStore) -> Result<Option<u64>, StorageError> {
    match store.get(REFRESH_INTERVAL_KEY)? {
        Some(raw) => raw
            .trim()
            .parse::<u64>()
            .ok()
            .and_then(|ms| validate_refresh_interval(ms).ok())
            .map(Some)
            .ok_or(StorageError::InvalidValue {
                key: REFRESH_INTERVAL_KEY.to_string(),
                value: raw,
            }),
        None => Ok(None),
    }
}

/// Read the endpoint configuration, substituting defaults for anything missing,
/// unreadable or invalid. Never fails.
pub fn load_endpoint_config(store: &dyn ConfigStore) -> EndpointConfig {
    let defaults = EndpointConfig::default();

    let base_url = stored_base_url(store).unwrap_or_else(|e| {
        log::warn!("Falling back to default base URL: {}", e);
        None
    });
    let refresh_interval_ms = stored_refresh_interval(store).unwrap_or_else(|e| {
        log::warn!("Falling back to default refresh interval: {}", e);
        None
    });

    EndpointConfig {
        base_url: base_url.unwrap_or(defaults.base_url),
        refresh_interval_ms: refresh_interval_ms.unwrap_or(defaults.refresh_interval_ms),
    }
}

pub fn persist_base_url(store: &dyn ConfigStore, base_url: &str) -> Result<(), StorageError> {
    store.set(BASE_URL_KEY, base_url)
}

pub fn persist_refresh_interval(store: &dyn ConfigStore, ms: u64) -> Result<(), StorageError> {
    store.set(REFRESH_INTERVAL_KEY, &ms.to_string())
}

pub fn clear_endpoint_config(store: &dyn ConfigStore) -> Result<(), StorageError> {
    store.remove(BASE_URL_KEY)?;
    store.remove(REFRESH_INTERVAL_KEY)
}
