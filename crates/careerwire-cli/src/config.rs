//! Configuration management for the CLI.
//!
//! Precedence: TOML file, then environment, then command-line flags.

use crate::error::{CliError, Result};
use careerwire_extractor::ExtractorConfig;
use careerwire_llm::LlmConfig;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// CLI configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Completion service settings
    #[serde(default)]
    pub llm: LlmConfig,

    /// Batch and prompt settings
    #[serde(default)]
    pub extractor: ExtractorConfig,
}

impl Config {
    /// Load configuration from `path`, or defaults when none is given.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => {
                if !path.exists() {
                    return Err(CliError::Config(format!(
                        "Config file not found: {}",
                        path.display()
                    )));
                }
                let contents = fs::read_to_string(path)?;
                Ok(toml::from_str(&contents)?)
            }
            None => Ok(Self::default()),
        }
    }

    /// Overlay values from the process environment.
    pub fn apply_env(&mut self) {
        self.apply_vars(|key| std::env::var(key).ok());
    }

    /// Overlay values from an arbitrary variable source.
    pub fn apply_vars<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        self.llm.apply_vars(&lookup);
        self.extractor.apply_vars(&lookup);
    }

    /// Apply the `--batch-size` flag, which wins over every other source.
    pub fn with_batch_size(mut self, batch_size: Option<u64>) -> Self {
        if let Some(size) = batch_size {
            self.extractor.batch_size = size as usize;
        }
        self
    }

    /// Validate the settings the run cannot proceed without.
    pub fn validate(&self) -> Result<()> {
        self.extractor
            .validate()
            .map_err(|e| CliError::Config(e.to_string()))
    }
}
