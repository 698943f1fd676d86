//! Careerwire LLM Provider Layer
//!
//! Completion providers behind a single async trait.
//!
//! # Providers
//!
//! - `MockProvider`: Deterministic, scriptable mock for testing
//! - `OpenAiProvider`: Text-completion endpoint over HTTP, with bounded
//!   retry and exponential backoff on rate limiting
//!
//! # Examples
//!
//! ```
//! use careerwire_llm::{CompletionProvider, MockProvider};
//!
//! # async fn example() {
//! let provider = MockProvider::new("Hello from LLM!");
//! let result = provider.complete("test prompt").await.unwrap();
//! assert_eq!(result, "Hello from LLM!");
//! # }
//! ```

#![warn(missing_docs)]

pub mod config;
pub mod openai;
pub mod retry;

use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use thiserror::Error;

pub use config::LlmConfig;
pub use openai::OpenAiProvider;
pub use retry::RetryPolicy;

/// Errors that can occur during LLM operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LlmError {
    /// Credentials or tunables are missing or invalid
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// The service answered with a rate-limit signal (HTTP 429)
    #[error("Rate limit exceeded (HTTP {status}): {body}")]
    RateLimited {
        /// HTTP status code
        status: u16,
        /// Response body, for diagnostics
        body: String,
    },

    /// The service answered with a non-retryable error status
    #[error("Service error (HTTP {status}): {body}")]
    Service {
        /// HTTP status code
        status: u16,
        /// Response body, for diagnostics
        body: String,
    },

    /// Network or transport failure, including timeouts
    #[error("Communication error: {0}")]
    Communication(String),

    /// The service answered but the payload was unusable
    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

impl LlmError {
    /// Whether this error is the rate-limit signal that warrants a retry
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, LlmError::RateLimited { .. })
    }

    /// Whether this error comes from client construction rather than a call
    pub fn is_configuration(&self) -> bool {
        matches!(self, LlmError::Configuration(_))
    }
}

/// A service that turns a prompt into a text completion
///
/// Implementations own their retry behavior: a returned error is final
/// for this call.
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    /// Issue one completion request for `prompt`
    async fn complete(&self, prompt: &str) -> Result<String, LlmError>;

    /// Name of the model answering the requests
    fn model_name(&self) -> &str;
}

/// Mock completion provider for deterministic testing
///
/// Resolution order for each call:
/// 1. the next scripted outcome pushed with [`MockProvider::push_outcome`]
/// 2. the response registered for the first marker contained in the prompt
/// 3. the default outcome
///
/// Latencies registered with [`MockProvider::add_latency`] are applied
/// before answering, so concurrent callers finish out of order.
///
/// # Examples
///
/// ```
/// use careerwire_llm::{CompletionProvider, LlmError, MockProvider};
///
/// # async fn example() {
/// let provider = MockProvider::new("fallback");
/// provider.push_outcome(Err(LlmError::Communication("down".into())));
/// provider.add_response("Acme", "about acme");
///
/// assert!(provider.complete("first").await.is_err());
/// assert_eq!(provider.complete("post about Acme").await.unwrap(), "about acme");
/// assert_eq!(provider.complete("other").await.unwrap(), "fallback");
/// assert_eq!(provider.call_count(), 3);
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct MockProvider {
    default_outcome: Result<String, LlmError>,
    script: Arc<Mutex<VecDeque<Result<String, LlmError>>>>,
    responses: Arc<Mutex<Vec<(String, String)>>>,
    latencies: Arc<Mutex<HashMap<String, Duration>>>,
    call_count: Arc<Mutex<usize>>,
    model: String,
}

impl MockProvider {
    /// Create a new MockProvider with a fixed response for all prompts
    pub fn new(response: impl Into<String>) -> Self {
        Self::with_default(Ok(response.into()))
    }

    /// Create a MockProvider whose every unscripted call fails with `error`
    pub fn failing(error: LlmError) -> Self {
        Self::with_default(Err(error))
    }

    fn with_default(default_outcome: Result<String, LlmError>) -> Self {
        Self {
            default_outcome,
            script: Arc::new(Mutex::new(VecDeque::new())),
            responses: Arc::new(Mutex::new(Vec::new())),
            latencies: Arc::new(Mutex::new(HashMap::new())),
            call_count: Arc::new(Mutex::new(0)),
            model: "mock-model".to_string(),
        }
    }

    /// Queue an outcome for the next unanswered call
    pub fn push_outcome(&self, outcome: Result<String, LlmError>) {
        lock(&self.script).push_back(outcome);
    }

    /// Answer prompts containing `marker` with `response`
    pub fn add_response(&self, marker: impl Into<String>, response: impl Into<String>) {
        lock(&self.responses).push((marker.into(), response.into()));
    }

    /// Delay answers to prompts containing `marker`
    pub fn add_latency(&self, marker: impl Into<String>, latency: Duration) {
        lock(&self.latencies).insert(marker.into(), latency);
    }

    /// Override the reported model name
    pub fn with_model_name(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Get the number of times complete was called
    pub fn call_count(&self) -> usize {
        *lock(&self.call_count)
    }

    /// Reset the call count
    pub fn reset_call_count(&self) {
        *lock(&self.call_count) = 0;
    }

    fn latency_for(&self, prompt: &str) -> Option<Duration> {
        lock(&self.latencies)
            .iter()
            .find(|(marker, _)| prompt.contains(marker.as_str()))
            .map(|(_, latency)| *latency)
    }

    fn answer(&self, prompt: &str) -> Result<String, LlmError> {
        if let Some(outcome) = lock(&self.script).pop_front() {
            return outcome;
        }

        let responses = lock(&self.responses);
        if let Some((_, response)) = responses
            .iter()
            .find(|(marker, _)| prompt.contains(marker.as_str()))
        {
            return Ok(response.clone());
        }

        self.default_outcome.clone()
    }
}

impl Default for MockProvider {
    fn default() -> Self {
        Self::new("Default mock response")
    }
}

#[async_trait]
impl CompletionProvider for MockProvider {
    async fn complete(&self, prompt: &str) -> Result<String, LlmError> {
        *lock(&self.call_count) += 1;

        if let Some(latency) = self.latency_for(prompt) {
            tokio::time::sleep(latency).await;
        }

        self.answer(prompt)
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

// A poisoned mock is still usable: the data is plain values.
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_provider_default() {
        let provider = MockProvider::new("Test response");
        let result = provider.complete("any prompt").await;
        assert_eq!(result.unwrap(), "Test response");
    }

    #[tokio::test]
    async fn test_mock_provider_marker_responses() {
        let provider = MockProvider::default();
        provider.add_response("hello", "world");
        provider.add_response("foo", "bar");

        assert_eq!(provider.complete("say hello").await.unwrap(), "world");
        assert_eq!(provider.complete("foo!").await.unwrap(), "bar");
        assert_eq!(
            provider.complete("unrelated").await.unwrap(),
            "Default mock response"
        );
    }

    #[tokio::test]
    async fn test_mock_provider_script_takes_priority() {
        let provider = MockProvider::new("default");
        provider.add_response("hello", "world");
        provider.push_outcome(Ok("scripted".to_string()));

        assert_eq!(provider.complete("hello").await.unwrap(), "scripted");
        assert_eq!(provider.complete("hello").await.unwrap(), "world");
    }

    #[tokio::test]
    async fn test_mock_provider_failing() {
        let provider = MockProvider::failing(LlmError::Service {
            status: 500,
            body: "boom".to_string(),
        });

        let result = provider.complete("prompt").await;
        assert!(matches!(result, Err(LlmError::Service { status: 500, .. })));
    }

    #[tokio::test]
    async fn test_mock_provider_call_count() {
        let provider = MockProvider::new("test");
        assert_eq!(provider.call_count(), 0);

        provider.complete("prompt1").await.unwrap();
        provider.complete("prompt2").await.unwrap();
        assert_eq!(provider.call_count(), 2);

        provider.reset_call_count();
        assert_eq!(provider.call_count(), 0);
    }

    #[tokio::test]
    async fn test_mock_provider_clone_shares_state() {
        let provider1 = MockProvider::new("test");
        let provider2 = provider1.clone();

        provider1.complete("test").await.unwrap();

        // Both should share the same call count due to Arc
        assert_eq!(provider1.call_count(), 1);
        assert_eq!(provider2.call_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_mock_provider_latency() {
        let provider = MockProvider::new("slow");
        provider.add_latency("wait", Duration::from_secs(3));

        let start = tokio::time::Instant::now();
        provider.complete("please wait").await.unwrap();
        assert!(start.elapsed() >= Duration::from_secs(3));
    }

    #[test]
    fn test_error_classification() {
        let limited = LlmError::RateLimited {
            status: 429,
            body: String::new(),
        };
        assert!(limited.is_rate_limited());
        assert!(!limited.is_configuration());
        assert!(LlmError::Configuration("missing key".into()).is_configuration());
        assert!(!LlmError::Communication("reset".into()).is_rate_limited());
    }
}
