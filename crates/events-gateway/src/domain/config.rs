//! Gateway configuration with validation.

use serde::{Deserialize, Serialize};
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::time::Duration;
use thiserror::Error;

/// Main gateway configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GatewayConfig {
    /// HTTP server configuration
    pub http: HttpConfig,
    /// Event stream configuration
    pub stream: StreamConfig,
}

impl GatewayConfig {
    /// Defaults overridden by `EVENTS_HTTP_HOST`, `EVENTS_HTTP_PORT` and
    /// `EVENTS_KEEP_ALIVE_SECS` when set.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(host) = lookup("EVENTS_HTTP_HOST") {
            config.http.host = host
                .parse()
                .map_err(|_| ConfigError::Invalid(format!("EVENTS_HTTP_HOST={host}")))?;
        }
        if let Some(port) = lookup("EVENTS_HTTP_PORT") {
            config.http.port = port
                .parse()
                .map_err(|_| ConfigError::Invalid(format!("EVENTS_HTTP_PORT={port}")))?;
        }
        if let Some(secs) = lookup("EVENTS_KEEP_ALIVE_SECS") {
            let secs: u64 = secs
                .parse()
                .map_err(|_| ConfigError::Invalid(format!("EVENTS_KEEP_ALIVE_SECS={secs}")))?;
            config.stream.keep_alive = Duration::from_secs(secs);
        }

        config.validate()?;
        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.stream.feed_queue_depth == 0 {
            return Err(ConfigError::InvalidLimit(
                "feed_queue_depth cannot be 0".into(),
            ));
        }

        if self.stream.keep_alive.is_zero() {
            return Err(ConfigError::InvalidTimeout(
                "keep_alive cannot be 0".into(),
            ));
        }

        Ok(())
    }

    /// Get HTTP server bind address
    pub fn http_addr(&self) -> SocketAddr {
        SocketAddr::new(self.http.host, self.http.port)
    }
}

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    /// Bind address
    pub host: IpAddr,
    /// Port (default: 3500)
    pub port: u16,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            host: IpAddr::V4(Ipv4Addr::LOCALHOST),
            port: 3500,
        }
    }
}

/// Event stream configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StreamConfig {
    /// Depth of the queue opened on each node feed per stream
    pub feed_queue_depth: usize,
    /// Interval between keep-alive comments on idle streams
    pub keep_alive: Duration,
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            feed_queue_depth: 1,
            keep_alive: Duration::from_secs(15),
        }
    }
}

/// Configuration validation errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// Invalid size or count limit
    #[error("invalid limit: {0}")]
    InvalidLimit(String),
    /// Invalid timeout value
    #[error("invalid timeout: {0}")]
    InvalidTimeout(String),
    /// General configuration error
    #[error("invalid configuration: {0}")]
    Invalid(String),
}
