//! Runtime configuration loaded from the environment

use std::env;
use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

/// Configuration errors raised at startup
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),

    #[error("Invalid value for {key}: {value}")]
    Invalid { key: &'static str, value: String },
}

/// Service configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    pub database_max_connections: u32,
    pub settings_cache_ttl: Duration,
    /// Currency used when a tenant has not saved settings yet
    pub default_currency: String,
}

impl Config {
    /// Read configuration from environment variables.
    ///
    /// Call `dotenvy::dotenv()` first if a `.env` file should be honoured.
    pub fn from_env() -> Result<Self, ConfigError> {
        let database_url =
            env::var("DATABASE_URL").map_err(|_| ConfigError::Missing("DATABASE_URL"))?;

        Ok(Self {
            database_url,
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: parse_or("PORT", 8080)?,
            database_max_connections: parse_or("DATABASE_MAX_CONNECTIONS", 5)?,
            settings_cache_ttl: Duration::from_secs(parse_or("SETTINGS_CACHE_TTL_SECS", 300)?),
            default_currency: env::var("DEFAULT_CURRENCY")
                .map(|c| c.to_uppercase())
                .unwrap_or_else(|_| "LKR".to_string()),
        })
    }

    /// Socket address to bind the HTTP listener to
    pub fn bind_addr(&self) -> Result<SocketAddr, ConfigError> {
        let raw = format!("{}:{}", self.host, self.port);
        raw.parse().map_err(|_| ConfigError::Invalid {
            key: "HOST",
            value: raw,
        })
    }
}

fn parse_or<T: FromStr>(key: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(key) {
        Ok(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { key, value }),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
impl Config {
    /// Configuration for tests that never touch a real database
    pub fn for_tests() -> Self {
        Self {
            database_url: "postgres://localhost/bimbara_test".to_string(),
            host: "127.0.0.1".to_string(),
            port: 0,
            database_max_connections: 1,
            settings_cache_ttl: Duration::from_secs(60),
            default_currency: "LKR".to_string(),
        }
    }
}
