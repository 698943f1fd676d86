//! Configuration for the extraction pipeline

use crate::error::ExtractorError;
use serde::{Deserialize, Serialize};

/// Configuration for batch dispatch and prompt limits
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractorConfig {
    /// Items processed concurrently per batch
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,

    /// Maximum rendered prompt length (characters)
    #[serde(default = "default_max_prompt_chars")]
    pub max_prompt_chars: usize,
}

fn default_batch_size() -> usize {
    5
}

fn default_max_prompt_chars() -> usize {
    50_000
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            batch_size: default_batch_size(),
            max_prompt_chars: default_max_prompt_chars(),
        }
    }
}

impl ExtractorConfig {
    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ExtractorError> {
        if self.batch_size == 0 {
            return Err(ExtractorError::Input(
                "batch_size must be greater than 0".to_string(),
            ));
        }
        if self.max_prompt_chars == 0 {
            return Err(ExtractorError::Input(
                "max_prompt_chars must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }

    /// Overlay `BATCH_SIZE` from an arbitrary variable source
    pub fn apply_vars<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(raw) = lookup("BATCH_SIZE") {
            match raw.trim().parse() {
                Ok(size) => self.batch_size = size,
                Err(_) => tracing::warn!(value = %raw, "Ignoring unparseable BATCH_SIZE"),
            }
        }
    }

    /// Load configuration from TOML string
    pub fn from_toml(toml_str: &str) -> Result<Self, String> {
        toml::from_str(toml_str).map_err(|e| format!("Failed to parse TOML: {}", e))
    }

    /// Serialize configuration to TOML string
    pub fn to_toml(&self) -> Result<String, String> {
        toml::to_string_pretty(self).map_err(|e| format!("Failed to serialize to TOML: {}", e))
    }
}
