//! Infrastructure layer: datastore adapters, connection pool, configuration.

pub mod config;
pub mod db;
pub mod store;

pub use config::{AppConfig, ConfigError};
pub use store::{PostStore, StoreError, UserStore};
