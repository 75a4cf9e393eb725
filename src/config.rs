//! Server configuration parsed from environment variables.

use std::time::Duration;

pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_PAGE_OP_TIMEOUT_MS: u64 = 10_000;
pub const DEFAULT_DB_MAX_CONNECTIONS: u32 = 5;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("missing required env var {0}")]
    Missing(&'static str),
    #[error("invalid value for {var}: {value:?}")]
    Invalid { var: &'static str, value: String },
}

impl crate::error::ErrorCode for ConfigError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Missing(_) => "E_CONFIG_MISSING",
            Self::Invalid { .. } => "E_CONFIG_INVALID",
        }
    }
}

/// Which [`crate::services::page_store::PageStore`] backs the service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreBackend {
    Postgres { database_url: String, max_connections: u32 },
    Memory,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub port: u16,
    pub store: StoreBackend,
    pub page_op_timeout: Duration,
    pub renumber_fallback: bool,
}

impl AppConfig {
    /// Build typed config from the process environment.
    ///
    /// Optional:
    /// - `PAGE_STORE`: `postgres` (default) or `memory`
    /// - `DATABASE_URL`: required for `postgres`
    /// - `DB_MAX_CONNECTIONS`: default 5
    /// - `PORT`: default 3000
    /// - `PAGE_OP_TIMEOUT_MS`: default 10000
    /// - `PAGE_RENUMBER_FALLBACK`: `true` (default) or `false`
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] for missing or unparsable values.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`Self::from_env`] but reads values through `lookup`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] for missing or unparsable values.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let store = match lookup("PAGE_STORE").as_deref().unwrap_or("postgres") {
            "postgres" => StoreBackend::Postgres {
                database_url: lookup("DATABASE_URL").ok_or(ConfigError::Missing("DATABASE_URL"))?,
                max_connections: parse_or(&lookup, "DB_MAX_CONNECTIONS", DEFAULT_DB_MAX_CONNECTIONS)?,
            },
            "memory" => StoreBackend::Memory,
            other => return Err(ConfigError::Invalid { var: "PAGE_STORE", value: other.to_owned() }),
        };
        let port = parse_or(&lookup, "PORT", DEFAULT_PORT)?;
        let timeout_ms: u64 = parse_or(&lookup, "PAGE_OP_TIMEOUT_MS", DEFAULT_PAGE_OP_TIMEOUT_MS)?;
        if timeout_ms == 0 {
            return Err(ConfigError::Invalid { var: "PAGE_OP_TIMEOUT_MS", value: "0".into() });
        }
        let renumber_fallback = parse_or(&lookup, "PAGE_RENUMBER_FALLBACK", true)?;

        Ok(Self { port, store, page_op_timeout: Duration::from_millis(timeout_ms), renumber_fallback })
    }
}

fn parse_or<T: std::str::FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    var: &'static str,
    default: T,
) -> Result<T, ConfigError> {
    match lookup(var) {
        None => Ok(default),
        Some(raw) => raw.trim().parse().map_err(|_| ConfigError::Invalid { var, value: raw }),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
