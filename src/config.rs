// Configuration management for the robot console

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StreamConfig {
    pub url: String,
    pub pairs: Vec<String>,
    pub reconnect_initial_secs: u64,
    pub reconnect_max_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    pub base_url: String,
    /// Session token from the credential provider; may be empty until login.
    pub session_token: String,
    pub control_timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub stream: StreamConfig,
    pub api: ApiConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            stream: StreamConfig {
                url: "wss://stream.example-exchange.com/market".to_string(),
                pairs: vec![
                    "btcusdt".to_string(),
                    "ethusdt".to_string(),
                    "xrpusdt".to_string(),
                    "solusdt".to_string(),
                    "adausdt".to_string(),
                    "dogeusdt".to_string(),
                    "ltcusdt".to_string(),
                    "dotusdt".to_string(),
                ],
                reconnect_initial_secs: 1,
                reconnect_max_secs: 60,
            },
            api: ApiConfig {
                base_url: "https://api.example-exchange.com".to_string(),
                session_token: String::new(),
                control_timeout_secs: 10,
            },
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)
            .map_err(|e| ConfigError::FileRead(e.to_string()))?;

        let config: Config = toml::from_str(&content)
            .map_err(|e| ConfigError::Parse(e.to_string()))?;

        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a TOML file
    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| ConfigError::Serialize(e.to_string()))?;

        fs::write(path, content)
            .map_err(|e| ConfigError::FileWrite(e.to_string()))?;

        Ok(())
    }

    /// Load configuration from file, or create default if file doesn't exist
    pub fn load_or_create<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        if path.as_ref().exists() {
            Self::from_file(path)
        } else {
            let config = Self::default();
            config.to_file(&path)?;
            tracing::info!("📁 Created default config file: {}", path.as_ref().display());
            Ok(config)
        }
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.stream.url.starts_with("ws://") && !self.stream.url.starts_with("wss://") {
            return Err(ConfigError::Validation(
                "stream.url must be a ws:// or wss:// URL".to_string(),
            ));
        }

        if self.stream.pairs.is_empty() {
            return Err(ConfigError::Validation(
                "stream.pairs must name at least one pair".to_string(),
            ));
        }

        if self.stream.reconnect_initial_secs == 0 {
            return Err(ConfigError::Validation(
                "stream.reconnect_initial_secs must be greater than 0".to_string(),
            ));
        }

        if self.stream.reconnect_max_secs < self.stream.reconnect_initial_secs {
            return Err(ConfigError::Validation(
                "stream.reconnect_max_secs must be >= reconnect_initial_secs".to_string(),
            ));
        }

        if self.api.base_url.is_empty() {
            return Err(ConfigError::Validation(
                "api.base_url must not be empty".to_string(),
            ));
        }

        if self.api.control_timeout_secs == 0 {
            return Err(ConfigError::Validation(
                "api.control_timeout_secs must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    FileRead(String),

    #[error("Failed to write config file: {0}")]
    FileWrite(String),

    #[error("Failed to parse config: {0}")]
    Parse(String),

    #[error("Failed to serialize config: {0}")]
    Serialize(String),

    #[error("Configuration validation error: {0}")]
    Validation(String),
}
