// Configuration module
// Author: kelexine (https://github.com/kelexine)

mod models;

pub use models::*;

use crate::error::{CacheError, Result};
use config::{Config, Environment, File};
use std::path::PathBuf;

impl AppConfig {
    /// Load configuration from multiple sources with precedence:
    /// 1. Environment variables (highest)
    /// 2. Config file
    /// 3. Defaults (lowest)
    ///
    /// `path` overrides the default config file location.
    pub fn load(path: Option<&str>) -> Result<Self> {
        let file = path
            .map(str::to_string)
            .unwrap_or_else(Self::default_config_path);

        let config = Config::builder()
            // Start with defaults
            .add_source(Config::try_from(&Self::default())?)
            // Load from config file; only required when given explicitly
            .add_source(File::with_name(&file).required(path.is_some()))
            // Override with environment variables (e.g. OFFLINE_CACHE__SERVER__PORT)
            .add_source(
                Environment::with_prefix("OFFLINE_CACHE")
                    .prefix_separator("__")
                    .separator("__"),
            )
            .build()
            .map_err(|e| CacheError::Config(e.to_string()))?;

        config
            .try_deserialize()
            .map_err(|e| CacheError::Config(e.to_string()))
    }

    fn default_config_path() -> String {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".offline-cache")
            .join("config.toml")
            .to_string_lossy()
            .to_string()
    }
}
