//! Configuration Module
//!
//! Handles loading and managing cache configuration from environment variables.

use std::env;
use std::str::FromStr;
use std::time::Duration;

// == Remote Config ==
/// Connection settings for the networked cache tier.
#[derive(Debug, Clone, PartialEq)]
pub struct RemoteConfig {
    /// Whether the networked tier should be used at all
    pub enabled: bool,
    /// Remote store host
    pub host: String,
    /// Remote store port
    pub port: u16,
    /// Database index on the remote store
    pub database: i64,
    /// Read stored values as UTF-8 text rather than raw bytes
    pub decode_responses: bool,
    /// Bound on connection setup and on every individual operation
    pub timeout: Duration,
}

impl RemoteConfig {
    /// Connection URL in `redis://host:port/db` form.
    pub fn url(&self) -> String {
        format!("redis://{}:{}/{}", self.host, self.port, self.database)
    }
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            host: "localhost".to_string(),
            port: 6379,
            database: 0,
            decode_responses: true,
            timeout: Duration::from_millis(2000),
        }
    }
}

// == Config ==
/// Service configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// Networked tier settings
    pub remote: RemoteConfig,
    /// Default TTL in seconds for entries without explicit TTL
    pub default_ttl: u64,
    /// HTTP server port
    pub server_port: u16,
    /// Background purge interval in seconds
    pub cleanup_interval: u64,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `REDIS_ENABLED` - Use the networked tier (default: true)
    /// - `REDIS_HOST` - Remote host (default: localhost)
    /// - `REDIS_PORT` - Remote port (default: 6379)
    /// - `REDIS_DB` - Database index (default: 0)
    /// - `REDIS_DECODE_RESPONSES` - Decode values as text (default: true)
    /// - `REDIS_TIMEOUT_MS` - Connect/operation timeout (default: 2000)
    /// - `DEFAULT_TTL` - Default TTL in seconds (default: 3600)
    /// - `SERVER_PORT` - HTTP server port (default: 3000)
    /// - `CLEANUP_INTERVAL` - Purge frequency in seconds (default: 60)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let remote_defaults = defaults.remote.clone();

        Self {
            remote: RemoteConfig {
                enabled: env_or("REDIS_ENABLED", remote_defaults.enabled),
                host: env::var("REDIS_HOST").unwrap_or(remote_defaults.host),
                port: env_or("REDIS_PORT", remote_defaults.port),
                database: env_or("REDIS_DB", remote_defaults.database),
                decode_responses: env_or(
                    "REDIS_DECODE_RESPONSES",
                    remote_defaults.decode_responses,
                ),
                timeout: Duration::from_millis(env_or(
                    "REDIS_TIMEOUT_MS",
                    remote_defaults.timeout.as_millis() as u64,
                )),
            },
            default_ttl: env_or("DEFAULT_TTL", defaults.default_ttl),
            server_port: env_or("SERVER_PORT", defaults.server_port),
            cleanup_interval: env_or("CLEANUP_INTERVAL", defaults.cleanup_interval),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            remote: RemoteConfig::default(),
            default_ttl: 3600,
            server_port: 3000,
            cleanup_interval: 60,
        }
    }
}

/// Parses an environment variable, falling back to `default` when unset or malformed.
fn env_or<T: FromStr>(name: &str, default: T) -> T {
    env::var(name)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}
