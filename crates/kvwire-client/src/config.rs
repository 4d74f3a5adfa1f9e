//! Client configuration.
//!
//! [`ClientConfig`] carries everything needed to reach a server: address,
//! optional credentials, the logical database index, timeouts, and the
//! idle-pool bound. It deserializes from TOML so deployments can keep
//! connection settings in a file, and exposes builder-style setters for
//! programmatic use.

use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

use crate::error::{Error, Result};

/// Default server port for Redis-like stores.
pub const DEFAULT_PORT: u16 = 6379;

/// Connection settings for [`Client`](crate::Client) and friends.
///
/// # Examples
///
/// ```
/// use kvwire_client::ClientConfig;
///
/// let config = ClientConfig::new("cache.internal", 6380)
///     .password("secret")
///     .database(2);
/// assert_eq!(config.addr(), "cache.internal:6380");
/// ```
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ClientConfig {
    /// Server hostname or IP address.
    pub host: String,

    /// Server TCP port.
    pub port: u16,

    /// Password for the AUTH handshake. `None` (or empty) skips AUTH.
    pub password: Option<String>,

    /// Logical database index selected after connecting.
    pub database: Option<i64>,

    /// Seconds allowed for establishing the transport.
    pub connect_timeout_secs: u64,

    /// Seconds allowed for a single command reply.
    pub response_timeout_secs: u64,

    /// Upper bound on idle connections kept by [`Pool`](crate::Pool).
    pub max_idle: usize,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: DEFAULT_PORT,
            password: None,
            database: None,
            connect_timeout_secs: 1,
            response_timeout_secs: 5,
            max_idle: 4,
        }
    }
}

impl ClientConfig {
    /// Creates a config for the given host and port, defaults elsewhere.
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            ..Self::default()
        }
    }

    /// Sets the AUTH password.
    pub fn password(mut self, password: impl Into<String>) -> Self {
        self.password = Some(password.into());
        self
    }

    /// Sets the logical database index selected on connect.
    pub fn database(mut self, index: i64) -> Self {
        self.database = Some(index);
        self
    }

    /// Sets the connect timeout in whole seconds.
    pub fn connect_timeout_secs(mut self, secs: u64) -> Self {
        self.connect_timeout_secs = secs;
        self
    }

    /// Sets the per-command response timeout in whole seconds.
    pub fn response_timeout_secs(mut self, secs: u64) -> Self {
        self.response_timeout_secs = secs;
        self
    }

    /// `host:port` string for the dialer.
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Connect timeout as a [`Duration`].
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    /// Response timeout as a [`Duration`].
    pub fn response_timeout(&self) -> Duration {
        Duration::from_secs(self.response_timeout_secs)
    }

    /// Password that should actually be sent: `None` when unset or empty.
    pub fn effective_password(&self) -> Option<&str> {
        self.password.as_deref().filter(|p| !p.is_empty())
    }

    /// Parses a config from TOML text.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        toml::from_str(text).map_err(|e| Error::Config(e.to_string()))
    }

    /// Loads a config from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path.as_ref())
            .map_err(|e| Error::Config(format!("{}: {e}", path.as_ref().display())))?;
        Self::from_toml_str(&text)
    }
}

// ============================================================================
// Tests
// ============================================================================
