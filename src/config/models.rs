//! Configuration data structures for offline-cache.
//!
//! This module defines the schema for the application settings: the local
//! server, the upstream origin being cached, the cache bucket itself and
//! logging.
//!
//! Author: kelexine (<https://github.com/kelexine>)

use crate::worker::{ASSETS, CACHE_NAME, FALLBACK_PATH};
use serde::{Deserialize, Serialize};

/// The root configuration object for the application.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    /// HTTP server settings (host, port).
    #[serde(default)]
    pub server: ServerConfig,

    /// Origin the cached page is served from.
    #[serde(default)]
    pub upstream: UpstreamConfig,

    /// Cache bucket, asset list and storage location.
    #[serde(default)]
    pub cache: CacheConfig,

    /// Logging and observability settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Settings for the built-in HTTP server.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// The IP address or hostname the server should bind to.
    /// Default: `127.0.0.1`
    #[serde(default = "default_host")]
    pub host: String,

    /// The port number the server should listen on.
    /// Default: `8080`
    #[serde(default = "default_port")]
    pub port: u16,
}

/// Settings for the upstream origin.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpstreamConfig {
    /// Base URL that relative asset paths are resolved against.
    /// Default: `http://127.0.0.1:3000/`
    #[serde(default = "default_origin")]
    pub origin: String,

    /// Whole-request timeout in seconds.
    /// Default: `30`
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,

    /// Connection timeout in seconds.
    /// Default: `10`
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_seconds: u64,
}

/// Settings for the cache bucket.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Bucket identifier. Changing it starts a new, empty bucket.
    /// Default: `watch-tycoon-v1`
    #[serde(default = "default_cache_name")]
    pub name: String,

    /// Paths fetched and stored at install time.
    #[serde(default = "default_assets")]
    pub assets: Vec<String>,

    /// Path served when the network is unreachable.
    /// Default: `./index.html`
    #[serde(default = "default_fallback_path")]
    pub fallback_path: String,

    /// Directory holding the on-disk buckets.
    /// Default: `~/.offline-cache/storage`
    #[serde(default = "default_storage_dir")]
    pub storage_dir: String,

    /// How many times the host attempts install before giving up.
    /// Default: `3`
    #[serde(default = "default_install_retries")]
    pub install_retries: u32,
}

/// Settings for application logging and output format.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Minimum log level (`trace`, `debug`, `info`, `warn`, `error`).
    /// Default: `info`
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Output format for logs (`pretty`, `json`).
    /// Default: `pretty`
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            origin: default_origin(),
            timeout_seconds: default_timeout(),
            connect_timeout_seconds: default_connect_timeout(),
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            name: default_cache_name(),
            assets: default_assets(),
            fallback_path: default_fallback_path(),
            storage_dir: default_storage_dir(),
            install_retries: default_install_retries(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

// Helper functions for serde defaults
fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_origin() -> String {
    "http://127.0.0.1:3000/".to_string()
}

fn default_timeout() -> u64 {
    30
}

fn default_connect_timeout() -> u64 {
    10
}

fn default_cache_name() -> String {
    CACHE_NAME.to_string()
}

fn default_assets() -> Vec<String> {
    ASSETS.iter().map(|a| a.to_string()).collect()
}

fn default_fallback_path() -> String {
    FALLBACK_PATH.to_string()
}

fn default_storage_dir() -> String {
    dirs::home_dir()
        .unwrap_or_else(|| std::path::PathBuf::from("."))
        .join(".offline-cache")
        .join("storage")
        .to_string_lossy()
        .to_string()
}

fn default_install_retries() -> u32 {
    3
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}
