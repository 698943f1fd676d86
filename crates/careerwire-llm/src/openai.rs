//! OpenAI-compatible text-completion provider
//!
//! Speaks the legacy completions wire format:
//! `POST {base_url}/completions` with body
//! `{model, prompt, temperature, seed, max_tokens}`; the completion text is
//! `choices[0].text`.
//!
//! # Examples
//!
//! ```no_run
//! use careerwire_llm::{CompletionProvider, LlmConfig, OpenAiProvider};
//!
//! # async fn example() -> Result<(), careerwire_llm::LlmError> {
//! let mut config = LlmConfig::default();
//! config.apply_env();
//!
//! let provider = OpenAiProvider::new(config);
//! let text = provider.complete("Say hello").await?;
//! println!("{}", text);
//! # Ok(())
//! # }
//! ```

use crate::{CompletionProvider, LlmConfig, LlmError};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::OnceCell;
use tracing::debug;

/// Completion provider backed by an OpenAI-compatible HTTP service
///
/// The HTTP client is built on the first call, after the configuration
/// validates, and is then shared by every concurrent call.
pub struct OpenAiProvider {
    config: LlmConfig,
    client: OnceCell<reqwest::Client>,
}

#[derive(Debug, Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    temperature: f32,
    seed: u64,
    max_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    #[serde(default)]
    choices: Vec<CompletionChoice>,
}

#[derive(Debug, Deserialize)]
struct CompletionChoice {
    #[serde(default)]
    text: String,
}

impl OpenAiProvider {
    /// Create a provider; nothing is validated or connected yet
    pub fn new(config: LlmConfig) -> Self {
        Self {
            config,
            client: OnceCell::new(),
        }
    }

    /// Configuration in use
    pub fn config(&self) -> &LlmConfig {
        &self.config
    }

    async fn handle(&self) -> Result<&reqwest::Client, LlmError> {
        self.client
            .get_or_try_init(|| async {
                self.config.validate()?;
                reqwest::Client::builder()
                    .timeout(self.config.timeout())
                    .build()
                    .map_err(|e| {
                        LlmError::Configuration(format!("Failed to build HTTP client: {}", e))
                    })
            })
            .await
    }

    async fn send_once(
        &self,
        client: &reqwest::Client,
        request: &CompletionRequest<'_>,
    ) -> Result<String, LlmError> {
        let api_key = self.config.api_key.as_deref().unwrap_or_default();

        let response = client
            .post(self.config.completions_url())
            .bearer_auth(api_key)
            .json(request)
            .send()
            .await
            .map_err(|e| LlmError::Communication(format!("Request failed: {}", e)))?;

        let status = response.status();
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            let body = response.text().await.unwrap_or_default();
            return Err(LlmError::RateLimited {
                status: status.as_u16(),
                body,
            });
        }
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(LlmError::Service {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: CompletionResponse = response
            .json()
            .await
            .map_err(|e| LlmError::InvalidResponse(format!("Failed to parse response: {}", e)))?;

        parsed
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.text)
            .ok_or_else(|| LlmError::InvalidResponse("Response contained no choices".to_string()))
    }
}

#[async_trait]
impl CompletionProvider for OpenAiProvider {
    async fn complete(&self, prompt: &str) -> Result<String, LlmError> {
        let client = self.handle().await?;
        let request = CompletionRequest {
            model: &self.config.model,
            prompt,
            temperature: self.config.temperature,
            seed: self.config.seed,
            max_tokens: self.config.max_tokens,
        };

        let request = &request;
        let text = self
            .config
            .retry_policy()
            .run(move |attempt| {
                debug!(attempt = attempt + 1, model = %self.config.model, "Sending completion request");
                self.send_once(client, &request)
            })
            .await?;

        debug!(chars = text.len(), "Received completion");
        Ok(text)
    }

    fn model_name(&self) -> &str {
        &self.config.model
    }
}
