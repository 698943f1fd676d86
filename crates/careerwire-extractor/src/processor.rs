//! Per-item pipeline: prompt, completion, parse, post-process, fan-out
//!
//! Every path ends in at least one [`OutputRecord`]; no stage failure
//! escapes [`ItemProcessor::process`].

use crate::config::ExtractorConfig;
use crate::error::ExtractorError;
use crate::parser::parse_completion;
use crate::post_process::post_process;
use crate::prompt::PromptBuilder;
use careerwire_domain::{Classification, ExtractionResult, InputRecord, OutputRecord};
use careerwire_llm::CompletionProvider;
use std::sync::Arc;
use tracing::{info, info_span, warn, Instrument};

/// Diagnostic attached to posts that announce no job change
pub const IRRELEVANT_MESSAGE: &str =
    "IrrelevantData: LinkedIn post is Irrelevant in this context, hence no data has been extracted";

/// Positional metadata for one item, used only for logging
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemContext {
    /// 0-based position in the whole request
    pub index: usize,
    /// Number of items in the whole request
    pub total: usize,
    /// 1-based batch number
    pub batch_id: usize,
    /// 1-based position inside the batch
    pub batch_item_id: usize,
    /// Correlation id of the surrounding request or run
    pub request_id: String,
}

impl ItemContext {
    /// Context for a single item processed on its own
    pub fn single(request_id: impl Into<String>) -> Self {
        Self {
            index: 0,
            total: 1,
            batch_id: 1,
            batch_item_id: 1,
            request_id: request_id.into(),
        }
    }

    /// Context for the `item_offset`-th item of the `batch_offset`-th batch
    ///
    /// Offsets are 0-based as produced by `enumerate`; the logged ids are 1-based.
    pub fn in_batch(
        batch_offset: usize,
        item_offset: usize,
        batch_size: usize,
        total: usize,
        request_id: impl Into<String>,
    ) -> Self {
        Self {
            index: batch_offset * batch_size + item_offset,
            total,
            batch_id: batch_offset + 1,
            batch_item_id: item_offset + 1,
            request_id: request_id.into(),
        }
    }
}

/// Terminal state of one item
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemOutcome {
    /// The prompt could not be built
    PromptFailed(ExtractorError),
    /// The completion client could not be constructed
    ClientFailed(ExtractorError),
    /// The completion call failed
    CompletionFailed(ExtractorError),
    /// The completion was malformed or failed post-processing
    ParseOrPostProcessFailed(ExtractorError),
    /// The pipeline ran to the end
    Extracted(ExtractionResult),
}

impl ItemOutcome {
    /// The stage error, if the pipeline stopped early
    pub fn error(&self) -> Option<&ExtractorError> {
        match self {
            ItemOutcome::PromptFailed(e)
            | ItemOutcome::ClientFailed(e)
            | ItemOutcome::CompletionFailed(e)
            | ItemOutcome::ParseOrPostProcessFailed(e) => Some(e),
            ItemOutcome::Extracted(_) => None,
        }
    }

    /// Materialize output records for `input`
    ///
    /// Failures and irrelevant posts yield one record; a relevant post
    /// yields one record per surviving change, or one bare record when
    /// none survived.
    pub fn into_records(self, input: &InputRecord) -> Vec<OutputRecord> {
        let result = match self {
            ItemOutcome::Extracted(result) => result,
            failed => {
                let message = failed
                    .error()
                    .map(ToString::to_string)
                    .unwrap_or_default();
                return vec![OutputRecord::failed(input, message)];
            }
        };

        let base = OutputRecord::from_input(input)
            .with_classification(Classification::from_relevant(result.relevant));

        if !result.relevant {
            return vec![base.with_error(IRRELEVANT_MESSAGE)];
        }

        if result.extracted_info.is_empty() {
            return vec![base];
        }

        result
            .extracted_info
            .into_iter()
            .map(|change| {
                let company_name = if change.organization.is_empty() {
                    input.company_name.clone()
                } else {
                    Some(change.organization)
                };
                OutputRecord {
                    job_poster_name: result.poster_name.clone(),
                    job_starter_name: Some(change.person_name),
                    company_name,
                    current_role: Some(change.new_role),
                    ..base.clone()
                }
            })
            .collect()
    }
}

/// Runs the extraction pipeline for single items
#[derive(Clone)]
pub struct ItemProcessor {
    provider: Arc<dyn CompletionProvider>,
    config: ExtractorConfig,
}

impl ItemProcessor {
    /// Create a processor over a shared completion provider
    pub fn new(provider: Arc<dyn CompletionProvider>, config: ExtractorConfig) -> Self {
        Self { provider, config }
    }

    /// Configuration in use
    pub fn config(&self) -> &ExtractorConfig {
        &self.config
    }

    /// Name of the model behind the provider
    pub fn model_name(&self) -> &str {
        self.provider.model_name()
    }

    /// Process one item into its output records
    pub async fn process(&self, input: &InputRecord, ctx: &ItemContext) -> Vec<OutputRecord> {
        let span = info_span!(
            "process_item",
            request_id = %ctx.request_id,
            batch_id = ctx.batch_id,
            batch_item_id = ctx.batch_item_id,
        );

        async {
            info!("Processing item {} of {}", ctx.index + 1, ctx.total);

            let outcome = self.run(input).await;
            if let Some(error) = outcome.error() {
                warn!(error = %error, "Extraction failed for item {}", ctx.index + 1);
            }

            let records = outcome.into_records(input);
            info!(records = records.len(), "Created response data for item {}", ctx.index + 1);
            records
        }
        .instrument(span)
        .await
    }

    /// Drive one item through the pipeline stages
    pub async fn run(&self, input: &InputRecord) -> ItemOutcome {
        let prompt = match PromptBuilder::new(&input.name, &input.about, &input.description)
            .build_checked(self.config.max_prompt_chars)
        {
            Ok(prompt) => prompt,
            Err(e) => return ItemOutcome::PromptFailed(e),
        };

        let completion = match self.provider.complete(&prompt).await {
            Ok(text) => text,
            Err(e) if e.is_configuration() => return ItemOutcome::ClientFailed(e.into()),
            Err(e) => return ItemOutcome::CompletionFailed(e.into()),
        };

        let raw = match parse_completion(&completion) {
            Ok(raw) => raw,
            Err(e) => return ItemOutcome::ParseOrPostProcessFailed(e),
        };

        let cleaned = match post_process(&raw.extracted_info) {
            Ok(cleaned) => cleaned,
            Err(e) => return ItemOutcome::ParseOrPostProcessFailed(e),
        };

        ItemOutcome::Extracted(ExtractionResult {
            poster_name: raw.poster_name,
            post_category: raw.post_category,
            change_count: cleaned.change_count,
            relevant: cleaned.relevant,
            extracted_info: cleaned.extracted_info,
        })
    }
}
