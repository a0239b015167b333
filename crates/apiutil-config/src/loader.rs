//! Configuration loader with file and environment variable support

use crate::{AppConfig, ConfigError};
use apiutil_common::logging::LogFormat;
use std::env;
use std::path::PathBuf;
use tracing::info;

/// Standard config file search paths
const CONFIG_PATHS: &[&str] = &[
    "apiutil.toml",
    "config.toml",
    "./config/apiutil.toml",
    "/etc/apiutil/config.toml",
];

/// Configuration loader
pub struct ConfigLoader {
    config_path: Option<PathBuf>,
}

impl ConfigLoader {
    /// Create a new configuration loader
    pub fn new() -> Self {
        Self { config_path: None }
    }

    /// Create a loader with a specific config file path
    pub fn with_path<P: Into<PathBuf>>(path: P) -> Self {
        Self {
            config_path: Some(path.into()),
        }
    }

    /// Load configuration from file (if found) with environment variable overrides
    pub fn load(&self) -> Result<AppConfig, ConfigError> {
        self.load_with(|key| env::var(key).ok())
    }

    fn load_with<F>(&self, lookup: F) -> Result<AppConfig, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = AppConfig::default();

        if let Some(path) = self.find_config_file(&lookup) {
            info!(?path, "Loading configuration from file");
            config = AppConfig::from_file(&path)?;
        }

        apply_env_overrides(&mut config, &lookup);

        Ok(config)
    }

    /// Find the configuration file to use
    fn find_config_file<F>(&self, lookup: &F) -> Option<PathBuf>
    where
        F: Fn(&str) -> Option<String>,
    {
        // Check explicit path first
        if let Some(path) = &self.config_path {
            if path.exists() {
                return Some(path.clone());
            }
        }

        if let Some(path) = lookup("APIUTIL_CONFIG") {
            let path = PathBuf::from(path);
            if path.exists() {
                return Some(path);
            }
        }

        // Search standard paths
        for path in CONFIG_PATHS {
            let path = PathBuf::from(path);
            if path.exists() {
                return Some(path);
            }
        }

        None
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

/// Apply environment variable overrides
fn apply_env_overrides<F>(config: &mut AppConfig, lookup: &F)
where
    F: Fn(&str) -> Option<String>,
{
    // API
    if let Some(val) = lookup("APIUTIL_BASE_URL") {
        config.api.base_url = val;
    }
    if let Some(val) = lookup("APIUTIL_API") {
        config.api.name = val;
    }

    // Credentials
    if let Some(val) = lookup("APIUTIL_USER") {
        config.credentials.user = val;
    }
    if let Some(val) = lookup("APIUTIL_PASSWORD") {
        config.credentials.password = val;
    }
    if let Some(val) = lookup("APIUTIL_ACCOUNT_ID") {
        if let Ok(id) = val.parse() {
            config.credentials.account_id = id;
        }
    }

    // HTTP
    if let Some(val) = lookup("APIUTIL_TIMEOUT_SECS") {
        if let Ok(timeout) = val.parse() {
            config.http.timeout_secs = timeout;
        }
    }
    if let Some(val) = lookup("APIUTIL_USER_AGENT") {
        config.http.user_agent = Some(val);
    }

    // Logging
    if let Some(val) = lookup("APIUTIL_LOG_LEVEL") {
        config.logging.level = val;
    }
    if let Some(val) = lookup("LOG_FORMAT") {
        config.logging.format = LogFormat::from(val.as_str());
    }

    // General
    if let Some(val) = lookup("APIUTIL_HARVEST_TOKENS") {
        if let Ok(harvest) = val.parse() {
            config.harvest_tokens = harvest;
        }
    }
}
