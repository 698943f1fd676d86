//! Completion client configuration
//!
//! Loaded from a `[llm]` TOML table, then overlaid with environment
//! variables. Validation is deferred to the first completion call.

use crate::retry::RetryPolicy;
use crate::LlmError;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::time::Duration;
use tracing::warn;

/// Settings for the text-completion service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LlmConfig {
    /// Bearer credential; required before the first call
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Service base URL, without the `/completions` suffix
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Model identifier sent with every request
    #[serde(default = "default_model")]
    pub model: String,

    /// Sampling temperature
    #[serde(default)]
    pub temperature: f32,

    /// Sampling seed
    #[serde(default = "default_seed")]
    pub seed: u64,

    /// Completion length cap
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    /// Per-request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Total attempts per call, rate-limit retries included
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Backoff base in seconds, doubled per attempt
    #[serde(default = "default_base_delay_secs")]
    pub base_delay_secs: f64,
}

fn default_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_model() -> String {
    "gpt-3.5-turbo-instruct".to_string()
}

fn default_seed() -> u64 {
    42
}

fn default_max_tokens() -> u32 {
    1024
}

fn default_timeout_secs() -> u64 {
    60
}

fn default_max_retries() -> u32 {
    5
}

fn default_base_delay_secs() -> f64 {
    1.0
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_base_url(),
            model: default_model(),
            temperature: 0.0,
            seed: default_seed(),
            max_tokens: default_max_tokens(),
            timeout_secs: default_timeout_secs(),
            max_retries: default_max_retries(),
            base_delay_secs: default_base_delay_secs(),
        }
    }
}

impl LlmConfig {
    /// Create a configuration with the given credential and defaults elsewhere
    pub fn with_api_key(api_key: impl Into<String>) -> Self {
        Self {
            api_key: Some(api_key.into()),
            ..Self::default()
        }
    }

    /// Parse from a TOML string
    pub fn from_toml(toml_str: &str) -> Result<Self, LlmError> {
        toml::from_str(toml_str)
            .map_err(|e| LlmError::Configuration(format!("Failed to parse TOML: {}", e)))
    }

    /// Overlay values from the process environment
    pub fn apply_env(&mut self) {
        self.apply_vars(|key| std::env::var(key).ok());
    }

    /// Overlay values from an arbitrary variable source
    ///
    /// Unparseable numbers are logged and ignored.
    pub fn apply_vars<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(key) = lookup("OPENAI_API_KEY") {
            self.api_key = Some(key);
        }
        if let Some(url) = lookup("OPENAI_BASE_URL") {
            self.base_url = url;
        }
        if let Some(model) = lookup("OPENAI_MODEL_NAME") {
            self.model = model;
        }
        overlay(&lookup, "MODEL_TEMPERATURE", &mut self.temperature);
        overlay(&lookup, "SEED", &mut self.seed);
        overlay(&lookup, "MAX_TOKENS", &mut self.max_tokens);
        overlay(&lookup, "TIMEOUT", &mut self.timeout_secs);
        overlay(&lookup, "MAX_RETRIES", &mut self.max_retries);
        overlay(&lookup, "BASE_DELAY", &mut self.base_delay_secs);
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), LlmError> {
        match self.api_key.as_deref() {
            Some(key) if !key.trim().is_empty() => {}
            _ => {
                return Err(LlmError::Configuration(
                    "API key is not set (OPENAI_API_KEY)".to_string(),
                ))
            }
        }

        if self.base_url.trim().is_empty() {
            return Err(LlmError::Configuration("base_url must not be empty".to_string()));
        }

        if self.timeout_secs == 0 {
            return Err(LlmError::Configuration(
                "timeout_secs must be greater than 0".to_string(),
            ));
        }

        if self.max_retries == 0 {
            return Err(LlmError::Configuration(
                "max_retries must be greater than 0".to_string(),
            ));
        }

        if !self.base_delay_secs.is_finite() || self.base_delay_secs < 0.0 {
            return Err(LlmError::Configuration(
                "base_delay_secs must be a non-negative number".to_string(),
            ));
        }

        Ok(())
    }

    /// Per-request timeout as Duration
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Backoff base as Duration
    pub fn base_delay(&self) -> Duration {
        Duration::try_from_secs_f64(self.base_delay_secs).unwrap_or(Duration::ZERO)
    }

    /// Retry policy derived from these settings
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(self.max_retries, self.base_delay())
    }

    /// Full URL of the completions endpoint
    pub fn completions_url(&self) -> String {
        format!("{}/completions", self.base_url.trim_end_matches('/'))
    }
}

fn overlay<F, T>(lookup: &F, key: &str, target: &mut T)
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    let Some(raw) = lookup(key) else {
        return;
    };
    match raw.trim().parse() {
        Ok(value) => *target = value,
        Err(_) => warn!(variable = key, value = %raw, "Ignoring unparseable environment value"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_default_config() {
        let config = LlmConfig::default();
        assert!(config.api_key.is_none());
        assert_eq!(config.base_url, "https://api.openai.com/v1");
        assert_eq!(config.model, "gpt-3.5-turbo-instruct");
        assert_eq!(config.temperature, 0.0);
        assert_eq!(config.seed, 42);
        assert_eq!(config.max_tokens, 1024);
        assert_eq!(config.timeout_secs, 60);
        assert_eq!(config.max_retries, 5);
        assert_eq!(config.base_delay_secs, 1.0);
    }

    #[test]
    fn test_validation_requires_key() {
        let config = LlmConfig::default();
        assert!(matches!(config.validate(), Err(LlmError::Configuration(_))));

        let blank = LlmConfig::with_api_key("   ");
        assert!(blank.validate().is_err());

        assert!(LlmConfig::with_api_key("sk-test").validate().is_ok());
    }

    #[test]
    fn test_validation_rejects_zero_tunables() {
        let mut config = LlmConfig::with_api_key("sk-test");
        config.timeout_secs = 0;
        assert!(config.validate().is_err());

        let mut config = LlmConfig::with_api_key("sk-test");
        config.max_retries = 0;
        assert!(config.validate().is_err());

        let mut config = LlmConfig::with_api_key("sk-test");
        config.base_delay_secs = -1.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_from_toml_partial() {
        let config = LlmConfig::from_toml(
            r#"
            api_key = "sk-file"
            model = "davinci-002"
            max_retries = 3
            "#,
        )
        .unwrap();

        assert_eq!(config.api_key.as_deref(), Some("sk-file"));
        assert_eq!(config.model, "davinci-002");
        assert_eq!(config.max_retries, 3);
        assert_eq!(config.seed, 42);
    }

    #[test]
    fn test_apply_vars_overlay() {
        let vars: HashMap<&str, &str> = [
            ("OPENAI_API_KEY", "sk-env"),
            ("OPENAI_MODEL_NAME", "gpt-custom"),
            ("MODEL_TEMPERATURE", "0.5"),
            ("MAX_RETRIES", "2"),
            ("BASE_DELAY", "0.25"),
            ("TIMEOUT", "not-a-number"),
        ]
        .into_iter()
        .collect();

        let mut config = LlmConfig::default();
        config.apply_vars(|key| vars.get(key).map(|v| v.to_string()));

        assert_eq!(config.api_key.as_deref(), Some("sk-env"));
        assert_eq!(config.model, "gpt-custom");
        assert_eq!(config.temperature, 0.5);
        assert_eq!(config.max_retries, 2);
        assert_eq!(config.base_delay(), Duration::from_millis(250));
        // Unparseable value leaves the previous setting in place
        assert_eq!(config.timeout_secs, 60);
    }

    #[test]
    fn test_completions_url_trims_slash() {
        let mut config = LlmConfig::default();
        config.base_url = "http://localhost:8080/v1/".to_string();
        assert_eq!(config.completions_url(), "http://localhost:8080/v1/completions");
    }

    #[test]
    fn test_retry_policy_from_config() {
        let mut config = LlmConfig::default();
        config.max_retries = 3;
        config.base_delay_secs = 2.0;
        let policy = config.retry_policy();
        assert_eq!(policy.max_retries(), 3);
        assert_eq!(policy.base_delay_for(1), Duration::from_secs(4));
    }
}
