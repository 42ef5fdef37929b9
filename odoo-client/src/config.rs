//! Configuration loaded from the environment
//!
//! Variables are read from the process environment after a `.env` file in
//! the working directory (if any) has been loaded.

use crate::cache::{CacheConfig, InvalidationStrategy};
use crate::error::{OdooError, Result};
use std::str::FromStr;
use std::time::Duration;

/// Connection settings for an Odoo instance
#[derive(Debug, Clone)]
pub struct OdooConfig {
    /// Base URL, without trailing slash
    pub url: String,
    /// Database name
    pub database: String,
    /// Login (usually an email address)
    pub username: String,
    pub password: Option<String>,
    pub api_key: Option<String>,
    /// Request timeout for the transport
    pub timeout: Duration,
    /// Verify TLS certificates; turn off only for development servers
    pub verify_ssl: bool,
}

impl OdooConfig {
    /// Build and validate a connection config using password authentication
    pub fn new(
        url: impl Into<String>,
        database: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Result<Self> {
        let config = Self {
            url: url.into(),
            database: database.into(),
            username: username.into(),
            password: Some(password.into()),
            api_key: None,
            timeout: Duration::from_secs(120),
            verify_ssl: true,
        };
        config.validated()
    }

    /// Use an API key instead of the password
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// The secret sent to the server; an API key wins over a password
    pub fn secret(&self) -> &str {
        self.api_key
            .as_deref()
            .filter(|key| !key.is_empty())
            .or(self.password.as_deref())
            .unwrap_or_default()
    }

    fn validated(mut self) -> Result<Self> {
        if !(self.url.starts_with("http://") || self.url.starts_with("https://")) {
            return Err(OdooError::ConfigError(
                "URL must start with http:// or https://".to_string(),
            ));
        }
        self.url = self.url.trim_end_matches('/').to_string();

        if self.database.is_empty() {
            return Err(OdooError::ConfigError("database must not be empty".to_string()));
        }
        if self.username.is_empty() {
            return Err(OdooError::ConfigError("username must not be empty".to_string()));
        }
        if self.timeout.is_zero() {
            return Err(OdooError::ConfigError("timeout must be positive".to_string()));
        }

        let has_password = self.password.as_deref().is_some_and(|p| !p.is_empty());
        let has_api_key = self.api_key.as_deref().is_some_and(|k| !k.is_empty());
        if !has_password && !has_api_key {
            return Err(OdooError::ConfigError(
                "either password or api_key must be provided".to_string(),
            ));
        }

        Ok(self)
    }
}

/// Complete runtime configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub odoo: OdooConfig,
    pub cache: CacheConfig,
    /// Default log filter when `RUST_LOG` is unset
    pub log_level: String,
}

impl Config {
    /// Load `.env`, then read configuration from the process environment
    pub fn from_env() -> Result<Self> {
        dotenv::dotenv().ok();
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Read configuration through an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |name: &str| {
            lookup(name)
                .ok_or_else(|| OdooError::ConfigError(format!("{} is not set", name)))
        };
        let optional = |name: &str| lookup(name).filter(|v| !v.is_empty());

        let odoo = OdooConfig {
            url: required("ODOO_URL")?,
            database: required("ODOO_DB")?,
            username: required("ODOO_USERNAME")?,
            password: optional("ODOO_PASSWORD"),
            api_key: optional("ODOO_API_KEY"),
            timeout: Duration::from_secs(parse_or(&lookup, "ODOO_TIMEOUT", 120u64)?),
            verify_ssl: parse_bool(&lookup, "ODOO_VERIFY_SSL", true),
        }
        .validated()?;

        let cache = CacheConfig::builder()
            .enabled(parse_bool(&lookup, "CACHE_ENABLED", true))
            .default_ttl(Duration::from_secs(parse_or(&lookup, "CACHE_TTL", 300u64)?))
            .max_entries(parse_or(&lookup, "CACHE_MAX_SIZE", 1_000usize)?)
            .invalidation(parse_or(
                &lookup,
                "CACHE_INVALIDATION",
                InvalidationStrategy::TtlOnly,
            )?)
            .build();
        cache.validate().map_err(OdooError::ConfigError)?;

        let log_level = optional("ODOO_LOG_LEVEL")
            .unwrap_or_else(|| "info".to_string())
            .to_lowercase();
        if !["trace", "debug", "info", "warn", "error"].contains(&log_level.as_str()) {
            return Err(OdooError::ConfigError(format!(
                "ODOO_LOG_LEVEL must be one of trace, debug, info, warn, error (got '{}')",
                log_level
            )));
        }

        Ok(Self {
            odoo,
            cache,
            log_level,
        })
    }
}

fn parse_or<F, T>(lookup: &F, name: &str, default: T) -> Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(name).filter(|v| !v.is_empty()) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|e| OdooError::ConfigError(format!("invalid {}: {}", name, e))),
        None => Ok(default),
    }
}

fn parse_bool<F>(lookup: &F, name: &str, default: bool) -> bool
where
    F: Fn(&str) -> Option<String>,
{
    lookup(name)
        .map(|v| v.trim().eq_ignore_ascii_case("true"))
        .unwrap_or(default)
}
