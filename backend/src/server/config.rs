//! Server configuration loaded from the environment.

use std::collections::HashMap;
use std::env;
use std::net::SocketAddr;

use url::Url;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
const DEFAULT_POOL_MAX_SIZE: u32 = 10;

/// Errors raised while loading configuration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    /// `DATABASE_URL` was not set.
    #[error("DATABASE_URL must be set")]
    MissingDatabaseUrl,

    /// `BIND_ADDR` did not parse as a socket address.
    #[error("BIND_ADDR is not a valid socket address: {value}")]
    InvalidBindAddr {
        /// The rejected value.
        value: String,
    },

    /// `CONFIRMATION_WEBHOOK_URL` did not parse as a URL.
    #[error("CONFIRMATION_WEBHOOK_URL is not a valid URL: {value}")]
    InvalidWebhookUrl {
        /// The rejected value.
        value: String,
    },

    /// `DB_POOL_MAX_SIZE` did not parse as a positive integer.
    #[error("DB_POOL_MAX_SIZE is not a positive integer: {value}")]
    InvalidPoolSize {
        /// The rejected value.
        value: String,
    },
}

/// Runtime configuration for the registration server.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// PostgreSQL connection string.
    pub database_url: String,
    /// Address the HTTP server binds to.
    pub bind_addr: SocketAddr,
    /// Optional endpoint for confirmation notifications; absent means
    /// notifications are dropped.
    pub confirmation_webhook_url: Option<Url>,
    /// Maximum number of pooled database connections.
    pub pool_max_size: u32,
}

impl ServerConfig {
    /// Load configuration from process environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        let vars: HashMap<String, String> = env::vars().collect();
        Self::from_lookup(|name| vars.get(name).cloned())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let database_url = lookup("DATABASE_URL").ok_or(ConfigError::MissingDatabaseUrl)?;

        let bind_raw = lookup("BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_owned());
        let bind_addr = bind_raw
            .parse()
            .map_err(|_| ConfigError::InvalidBindAddr { value: bind_raw })?;

        let confirmation_webhook_url = lookup("CONFIRMATION_WEBHOOK_URL")
            .map(|raw| {
                Url::parse(&raw).map_err(|_| ConfigError::InvalidWebhookUrl { value: raw })
            })
            .transpose()?;

        let pool_max_size = match lookup("DB_POOL_MAX_SIZE") {
            Some(raw) => match raw.parse::<u32>() {
                Ok(size) if size > 0 => size,
                _ => return Err(ConfigError::InvalidPoolSize { value: raw }),
            },
            None => DEFAULT_POOL_MAX_SIZE,
        };

        Ok(Self {
            database_url,
            bind_addr,
            confirmation_webhook_url,
            pool_max_size,
        })
    }
}
