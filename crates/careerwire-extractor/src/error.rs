//! Error types for the extraction pipeline
//!
//! The `Display` text of each variant is exactly what lands in
//! `OutputRecord.error`, so every message starts with the failure class.

use careerwire_llm::LlmError;
use thiserror::Error;

/// Errors raised by a pipeline stage for a single item
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExtractorError {
    /// The prompt could not be built from the input
    #[error("InputError: {0}")]
    Input(String),

    /// The completion client could not be constructed
    #[error("EnvironmentConfigurationError: {0}")]
    Configuration(String),

    /// The completion call failed or ran out of retries
    #[error("CompletionError: {0}")]
    Completion(String),

    /// The completion text was not the expected JSON object
    #[error("MalformedResponseError: {0}")]
    MalformedResponse(String),

    /// The post-processor received something other than a list
    #[error("InputTypeError: {0}")]
    InputType(String),

    /// A change record could not be post-processed
    #[error("PostProcessingError: {0}")]
    PostProcessing(String),

    /// Unexpected failure while processing an item
    #[error("ProcessItemError: {0}")]
    Processing(String),
}

impl From<LlmError> for ExtractorError {
    fn from(e: LlmError) -> Self {
        match e {
            LlmError::Configuration(msg) => ExtractorError::Configuration(msg),
            other => ExtractorError::Completion(other.to_string()),
        }
    }
}

impl From<serde_json::Error> for ExtractorError {
    fn from(e: serde_json::Error) -> Self {
        ExtractorError::MalformedResponse(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_prefixes() {
        assert_eq!(
            ExtractorError::Input("too long".into()).to_string(),
            "InputError: too long"
        );
        assert_eq!(
            ExtractorError::InputType("expected a list".into()).to_string(),
            "InputTypeError: expected a list"
        );
        assert!(ExtractorError::Processing("panic".into())
            .to_string()
            .starts_with("ProcessItemError: "));
    }

    #[test]
    fn test_llm_error_mapping() {
        let config: ExtractorError = LlmError::Configuration("no key".into()).into();
        assert_eq!(
            config,
            ExtractorError::Configuration("no key".to_string())
        );

        let limited: ExtractorError = LlmError::RateLimited {
            status: 429,
            body: "quota".into(),
        }
        .into();
        assert!(matches!(limited, ExtractorError::Completion(ref msg) if msg.contains("429")));
    }
}
