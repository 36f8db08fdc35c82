//! Infrastructure layer: configuration and storage adapters.

pub mod config;
pub mod store;

pub use config::{AppConfig, ConfigError, RuntimeMode, StoreConfig, load_dotenv};
