//! Process configuration loaded from the environment.
//!
//! An optional `.env` file is loaded with [`load_dotenv`] before anything
//! reads the environment (tracing included); real environment variables take
//! precedence over it.

use core::fmt;
use core::str::FromStr;

use thiserror::Error;

use rolodex_auth::ApiKeyAllowList;

pub const DEFAULT_PORT: u16 = 3000;

/// Load `.env` into the process environment. A missing file is not an error.
pub fn load_dotenv() -> Result<(), dotenvy::Error> {
    match dotenvy::dotenv() {
        Ok(_) => Ok(()),
        Err(e) if e.not_found() => Ok(()),
        Err(e) => Err(e),
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("PORT must be a number between 1 and 65535 (got {0:?})")]
    InvalidPort(String),

    #[error("APP_ENV must be 'production' or 'development' (got {0:?})")]
    InvalidMode(String),

    #[error("API_KEYS is set but contains no keys")]
    EmptyApiKeys,
}

/// Runtime mode. Diagnostic traces are only exposed outside production.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum RuntimeMode {
    #[default]
    Development,
    Production,
}

impl RuntimeMode {
    pub fn is_production(self) -> bool {
        self == RuntimeMode::Production
    }
}

impl FromStr for RuntimeMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "production" | "prod" => Ok(RuntimeMode::Production),
            "development" | "dev" | "test" => Ok(RuntimeMode::Development),
            other => Err(ConfigError::InvalidMode(other.to_string())),
        }
    }
}

impl fmt::Display for RuntimeMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RuntimeMode::Development => f.write_str("development"),
            RuntimeMode::Production => f.write_str("production"),
        }
    }
}

/// Which repository variant backs the service.
#[derive(Clone, PartialEq, Eq)]
pub enum StoreConfig {
    InMemory,
    Postgres { url: String },
}

// Connection strings may carry credentials.
impl fmt::Debug for StoreConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreConfig::InMemory => f.write_str("InMemory"),
            StoreConfig::Postgres { .. } => f.write_str("Postgres { url: <redacted> }"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub port: u16,
    pub mode: RuntimeMode,
    pub store: StoreConfig,
    pub api_keys: ApiKeyAllowList,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            mode: RuntimeMode::default(),
            store: StoreConfig::InMemory,
            api_keys: ApiKeyAllowList::default(),
        }
    }
}

impl AppConfig {
    /// Load from the process environment. Call [`load_dotenv`] first.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let port = match get("PORT") {
            Some(raw) => raw
                .trim()
                .parse::<u16>()
                .ok()
                .filter(|p| *p != 0)
                .ok_or(ConfigError::InvalidPort(raw))?,
            None => DEFAULT_PORT,
        };

        let mode = match get("APP_ENV") {
            Some(raw) => raw.parse()?,
            None => RuntimeMode::default(),
        };

        let store = match get("DATABASE_URL") {
            Some(url) => StoreConfig::Postgres { url },
            None => StoreConfig::InMemory,
        };

        let api_keys = match get("API_KEYS") {
            Some(raw) => {
                let keys = ApiKeyAllowList::new(raw.split(','));
                if keys.is_empty() {
                    return Err(ConfigError::EmptyApiKeys);
                }
                keys
            }
            None => ApiKeyAllowList::default(),
        };

        Ok(Self {
            port,
            mode,
            store,
            api_keys,
        })
    }
}
