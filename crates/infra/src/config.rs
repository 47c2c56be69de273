//! Centralized configuration (environment variables + defaults).

use core::fmt::Display;
use core::str::FromStr;
use std::net::SocketAddr;

use chrono::Duration;
use thiserror::Error;

use inkwell_observability::LogFormat;

pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
pub const DEFAULT_MAX_CONNECTIONS: u32 = 10;
pub const DEFAULT_TOKEN_TTL_SECS: i64 = 86_400;
/// Ten years.
pub const MAX_TOKEN_TTL_SECS: i64 = 10 * 365 * 86_400;

/// Signing key used when `JWT_SECRET` is unset. Development only.
pub const DEV_JWT_SECRET: &str = "dev-insecure-secret-change-me";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid value '{value}' for {key}: {reason}")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },
}

/// Process configuration.
#[derive(Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub bind_addr: SocketAddr,
    /// `None` runs against in-memory stores.
    pub database_url: Option<String>,
    pub database_max_connections: u32,
    pub jwt_secret: String,
    /// `None` issues tokens without `exp`.
    pub token_ttl: Option<Duration>,
    pub log_format: LogFormat,
}

impl core::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("AppConfig")
            .field("bind_addr", &self.bind_addr)
            .field("database_configured", &self.database_url.is_some())
            .field("database_max_connections", &self.database_max_connections)
            .field("token_ttl", &self.token_ttl)
            .field("log_format", &self.log_format)
            .finish_non_exhaustive()
    }
}

impl AppConfig {
    /// Load from the process environment, reading a `.env` file first when present.
    pub fn from_env() -> Result<Self, ConfigError> {
        let _ = dotenv::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load using `lookup` to resolve each key. Empty values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let bind_addr = parse_or("BIND_ADDR", get("BIND_ADDR"), || {
            SocketAddr::from(([0, 0, 0, 0], 8080))
        })?;

        let database_max_connections = parse_or(
            "DATABASE_MAX_CONNECTIONS",
            get("DATABASE_MAX_CONNECTIONS"),
            || DEFAULT_MAX_CONNECTIONS,
        )?;
        if database_max_connections == 0 {
            return Err(invalid("DATABASE_MAX_CONNECTIONS", "0", "must be at least 1"));
        }

        let ttl_secs: i64 = parse_or("TOKEN_TTL_SECS", get("TOKEN_TTL_SECS"), || {
            DEFAULT_TOKEN_TTL_SECS
        })?;
        let token_ttl = match ttl_secs {
            0 => None,
            secs if secs < 0 => {
                return Err(invalid(
                    "TOKEN_TTL_SECS",
                    secs.to_string(),
                    "must not be negative",
                ));
            }
            secs if secs > MAX_TOKEN_TTL_SECS => {
                return Err(invalid(
                    "TOKEN_TTL_SECS",
                    secs.to_string(),
                    format!("must be at most {MAX_TOKEN_TTL_SECS}"),
                ));
            }
            secs => Some(Duration::seconds(secs)),
        };

        let log_format = match get("LOG_FORMAT") {
            Some(raw) => raw
                .parse::<LogFormat>()
                .map_err(|reason| invalid("LOG_FORMAT", raw, reason))?,
            None => LogFormat::default(),
        };

        Ok(Self {
            bind_addr,
            database_url: get("DATABASE_URL"),
            database_max_connections,
            jwt_secret: get("JWT_SECRET").unwrap_or_else(|| DEV_JWT_SECRET.to_string()),
            token_ttl,
            log_format,
        })
    }

    /// Whether the signing key is the built-in development default.
    pub fn uses_dev_secret(&self) -> bool {
        self.jwt_secret == DEV_JWT_SECRET
    }
}

fn invalid(key: &'static str, value: impl Into<String>, reason: impl Into<String>) -> ConfigError {
    ConfigError::Invalid {
        key,
        value: value.into(),
        reason: reason.into(),
    }
}

fn parse_or<T>(
    key: &'static str,
    raw: Option<String>,
    default: impl FnOnce() -> T,
) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: Display,
{
    match raw {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|e| invalid(key, raw.clone(), e.to_string())),
        None => Ok(default()),
    }
}
