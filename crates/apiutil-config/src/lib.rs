//! apiutil Configuration System
//!
//! TOML-based configuration for the API client with environment variable
//! override support. See [`ConfigLoader`] for the search order.

use apiutil_common::logging::LogSettings;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use thiserror::Error;

mod loader;

pub use loader::ConfigLoader;

/// Configuration error types
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

/// Root application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub api: ApiConfig,
    pub credentials: CredentialsConfig,
    pub http: HttpConfig,
    pub logging: LogSettings,

    /// Pick up a `token` response header on any call made without a token
    pub harvest_tokens: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api: ApiConfig::default(),
            credentials: CredentialsConfig::default(),
            http: HttpConfig::default(),
            logging: LogSettings::default(),
            harvest_tokens: true,
        }
    }
}

/// Remote service location
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// e.g. "https://api.example.com"
    pub base_url: String,
    /// API name segment, used for token issuance and resource URLs
    pub name: String,
}

#[derive(Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CredentialsConfig {
    pub user: String,
    pub password: String,
    /// 0 means no account
    pub account_id: u64,
}

impl fmt::Debug for CredentialsConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialsConfig")
            .field("user", &self.user)
            .field("password", &"***")
            .field("account_id", &self.account_id)
            .finish()
    }
}

/// HTTP transport configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    pub timeout_secs: u64,
    pub user_agent: Option<String>,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 30,
            user_agent: None,
        }
    }
}

impl AppConfig {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: AppConfig = toml::from_str(&content)?;
        Ok(config)
    }

    /// Load configuration with environment variable override
    pub fn load() -> Result<Self, ConfigError> {
        let loader = ConfigLoader::new();
        loader.load()
    }

    /// Check the settings every client needs before it can make a call
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.api.base_url.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "api.base_url must be set".to_string(),
            ));
        }
        if self.http.timeout_secs == 0 {
            return Err(ConfigError::ValidationError(
                "http.timeout_secs must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    /// Generate an example TOML configuration
    pub fn example_toml() -> String {
        r#"# apiutil Configuration
# Environment variables override these settings

harvest_tokens = true

[api]
base_url = "https://api.example.com"
name = "publishing"

[credentials]
user = "alice"
password = "secret"
account_id = 0  # 0 = no account

[http]
timeout_secs = 30
# user_agent = "my-app/1.0"

[logging]
level = "info"
format = "text"    # text or json
output = "stderr"  # stderr, stdout, discard, or { file = "apiutil.log" }
"#
        .to_string()
    }
}
