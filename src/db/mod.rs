pub mod config_store;
pub mod connection;
pub mod migration_runner;

pub use config_store::{load_endpoint_config, ConfigStore, MemoryStore};
pub use connection::Database;
