//! Configuration Module
//!
//! Handles loading and managing server configuration from environment variables.

use std::env;
use std::path::PathBuf;

/// Server configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// Lifetime of cached list results in seconds, also the sweep period
    pub cache_ttl: u64,
    /// HTTP bind address
    pub server_host: String,
    /// HTTP server port
    pub server_port: u16,
    /// Page size used when the request carries no usable limit
    pub default_limit: u32,
    /// Upper clamp for the requested page size
    pub max_limit: u32,
    /// Optional JSON file with books for the in-memory storage
    pub books_file: Option<PathBuf>,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `CACHE_TTL` - Cache TTL in seconds (default: 10)
    /// - `SERVER_HOST` - Bind address (default: 127.0.0.1)
    /// - `SERVER_PORT` - HTTP server port (default: 3000)
    /// - `DEFAULT_LIMIT` - Default page size (default: 20)
    /// - `MAX_LIMIT` - Maximum page size (default: 1000)
    /// - `BOOKS_FILE` - Seed file for the in-memory storage (default: none)
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            cache_ttl: env::var("CACHE_TTL")
                .ok()
                .and_then(|v| v.parse().ok())
                .filter(|ttl| *ttl > 0)
                .unwrap_or(defaults.cache_ttl),
            server_host: env::var("SERVER_HOST").unwrap_or(defaults.server_host),
            server_port: env::var("SERVER_PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.server_port),
            default_limit: env::var("DEFAULT_LIMIT")
                .ok()
                .and_then(|v| v.parse().ok())
                .filter(|limit| *limit > 0)
                .unwrap_or(defaults.default_limit),
            max_limit: env::var("MAX_LIMIT")
                .ok()
                .and_then(|v| v.parse().ok())
                .filter(|limit| *limit > 0)
                .unwrap_or(defaults.max_limit),
            books_file: env::var("BOOKS_FILE").ok().map(PathBuf::from),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            cache_ttl: 10,
            server_host: "127.0.0.1".to_string(),
            server_port: 3000,
            default_limit: 20,
            max_limit: 1000,
            books_file: None,
        }
    }
}
