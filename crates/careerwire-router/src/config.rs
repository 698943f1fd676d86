//! Configuration file parsing for the Router.
//!
//! Loads the bind address, shutdown grace period and the nested
//! `[extractor]` and `[llm]` tables from TOML, then applies environment
//! overrides.

use careerwire_extractor::ExtractorConfig;
use careerwire_llm::LlmConfig;
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;
use tracing::warn;

/// Router configuration error
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read config file
    #[error("Failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),

    /// Failed to parse TOML
    #[error("Failed to parse config TOML: {0}")]
    TomlParse(#[from] toml::de::Error),

    /// A value is out of range
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Router configuration loaded from TOML
#[derive(Debug, Clone, Deserialize)]
pub struct RouterConfig {
    /// Bind address (e.g., "127.0.0.1")
    #[serde(default = "default_bind_address")]
    pub bind_address: String,

    /// Bind port (e.g., 8000)
    #[serde(default = "default_bind_port")]
    pub bind_port: u16,

    /// Seconds to wait after draining before the process exits
    #[serde(default = "default_shutdown_grace")]
    pub shutdown_grace_secs: u64,

    /// Batch dispatch settings
    #[serde(default)]
    pub extractor: ExtractorConfig,

    /// Completion service settings
    #[serde(default)]
    pub llm: LlmConfig,
}

fn default_bind_address() -> String {
    "127.0.0.1".to_string()
}

fn default_bind_port() -> u16 {
    8000
}

fn default_shutdown_grace() -> u64 {
    5
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
            bind_port: default_bind_port(),
            shutdown_grace_secs: default_shutdown_grace(),
            extractor: ExtractorConfig::default(),
            llm: LlmConfig::default(),
        }
    }
}

impl RouterConfig {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml(&contents)
    }

    /// Parse and validate configuration from a TOML string
    pub fn from_toml(contents: &str) -> Result<Self, ConfigError> {
        let config: RouterConfig = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Overlay values from the process environment
    pub fn apply_env(&mut self) {
        self.apply_vars(|key| std::env::var(key).ok());
    }

    /// Overlay values from an arbitrary variable source
    pub fn apply_vars<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(host) = lookup("APPLICATION_HOST") {
            self.bind_address = host;
        }
        if let Some(raw) = lookup("APPLICATION_PORT") {
            match raw.trim().parse() {
                Ok(port) => self.bind_port = port,
                Err(_) => warn!(value = %raw, "Ignoring unparseable APPLICATION_PORT"),
            }
        }
        self.extractor.apply_vars(&lookup);
        self.llm.apply_vars(&lookup);
    }

    /// Check the values the server cannot start without
    ///
    /// Completion credentials are not checked here; they are validated on
    /// the first completion call.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.bind_address.trim().is_empty() {
            return Err(ConfigError::Invalid("bind_address must not be empty".to_string()));
        }
        self.extractor
            .validate()
            .map_err(|e| ConfigError::Invalid(e.to_string()))
    }

    /// Get the full bind address (address:port)
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.bind_address, self.bind_port)
    }

    /// Grace period as Duration
    pub fn shutdown_grace(&self) -> Duration {
        Duration::from_secs(self.shutdown_grace_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_default_config() {
        let config = RouterConfig::default();
        assert_eq!(config.bind_address, "127.0.0.1");
        assert_eq!(config.bind_port, 8000);
        assert_eq!(config.shutdown_grace_secs, 5);
        assert_eq!(config.extractor.batch_size, 5);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_bind_addr() {
        let config = RouterConfig::default();
        assert_eq!(config.bind_addr(), "127.0.0.1:8000");
    }

    #[test]
    fn test_parse_toml() {
        let toml = r#"
            bind_address = "0.0.0.0"
            bind_port = 9000
            shutdown_grace_secs = 1

            [extractor]
            batch_size = 10

            [llm]
            model = "davinci-002"
            max_retries = 2
        "#;

        let config = RouterConfig::from_toml(toml).unwrap();
        assert_eq!(config.bind_address, "0.0.0.0");
        assert_eq!(config.bind_port, 9000);
        assert_eq!(config.shutdown_grace(), Duration::from_secs(1));
        assert_eq!(config.extractor.batch_size, 10);
        assert_eq!(config.llm.model, "davinci-002");
        assert_eq!(config.llm.max_retries, 2);
        assert_eq!(config.llm.seed, 42);
    }

    #[test]
    fn test_zero_batch_size_rejected() {
        let result = RouterConfig::from_toml("[extractor]\nbatch_size = 0\n");
        assert!(matches!(result, Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_env_overrides() {
        let vars: HashMap<&str, &str> = [
            ("APPLICATION_HOST", "0.0.0.0"),
            ("APPLICATION_PORT", "8081"),
            ("BATCH_SIZE", "3"),
            ("OPENAI_API_KEY", "sk-env"),
        ]
        .into_iter()
        .collect();

        let mut config = RouterConfig::default();
        config.apply_vars(|key| vars.get(key).map(|v| v.to_string()));

        assert_eq!(config.bind_addr(), "0.0.0.0:8081");
        assert_eq!(config.extractor.batch_size, 3);
        assert_eq!(config.llm.api_key.as_deref(), Some("sk-env"));
    }

    #[test]
    fn test_missing_file() {
        let result = RouterConfig::from_file("/nonexistent/router.toml");
        assert!(matches!(result, Err(ConfigError::FileRead(_))));
    }
}
