//! Batch fan-out with ordered fan-in
//!
//! Batches run one after another; the items of a batch are polled
//! concurrently on the calling task. Results are flattened in input order.

use crate::error::ExtractorError;
use crate::processor::{ItemContext, ItemProcessor};
use careerwire_domain::{InputRecord, OutputRecord};
use futures::future::join_all;
use futures::FutureExt;
use std::any::Any;
use std::panic::AssertUnwindSafe;
use tracing::{error, info};

/// Flattened records plus counters for one dispatch
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DispatchReport {
    /// Output records in input order
    pub records: Vec<OutputRecord>,
    /// Number of input items processed
    pub items_processed: usize,
    /// Number of batches run
    pub batches: usize,
    /// Items whose task failed outside the pipeline's own error handling
    pub failed_items: usize,
}

/// Runs an [`ItemProcessor`] over a collection in fixed-size batches
#[derive(Clone)]
pub struct BatchDispatcher {
    processor: ItemProcessor,
    batch_size: usize,
}

impl BatchDispatcher {
    /// Create a dispatcher; a batch size of 0 is treated as 1
    pub fn new(processor: ItemProcessor, batch_size: usize) -> Self {
        Self {
            processor,
            batch_size: batch_size.max(1),
        }
    }

    /// Create a dispatcher using the processor's configured batch size
    pub fn from_processor(processor: ItemProcessor) -> Self {
        let batch_size = processor.config().batch_size;
        Self::new(processor, batch_size)
    }

    /// Items per batch
    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    /// Processor driving each item
    pub fn processor(&self) -> &ItemProcessor {
        &self.processor
    }

    /// Process `inputs`, tagging logs with `request_id`
    pub async fn dispatch(&self, inputs: &[InputRecord], request_id: &str) -> DispatchReport {
        let total = inputs.len();
        let mut report = DispatchReport::default();

        for (batch_offset, batch) in inputs.chunks(self.batch_size).enumerate() {
            let batch_id = batch_offset + 1;
            info!(
                request_id,
                batch_id,
                items = batch.len(),
                "Processing batch"
            );

            let tasks = batch.iter().enumerate().map(|(item_offset, input)| {
                let ctx =
                    ItemContext::in_batch(batch_offset, item_offset, self.batch_size, total, request_id);
                async move {
                    AssertUnwindSafe(self.processor.process(input, &ctx))
                        .catch_unwind()
                        .await
                        .map_err(|payload| panic_message(payload.as_ref()))
                }
            });

            let results = join_all(tasks).await;

            for (input, result) in batch.iter().zip(results) {
                match result {
                    Ok(records) => report.records.extend(records),
                    Err(message) => {
                        error!(request_id, batch_id, "Item task failed: {}", message);
                        report.failed_items += 1;
                        let error = ExtractorError::Processing(format!(
                            "Got error while processing item: {}",
                            message
                        ));
                        report
                            .records
                            .push(OutputRecord::failed(input, error.to_string()));
                    }
                }
            }

            report.items_processed += batch.len();
            report.batches += 1;
            info!(
                request_id,
                "Progress: {:.1}% ({}/{} items)",
                report.items_processed as f64 * 100.0 / total as f64,
                report.items_processed,
                total
            );
        }

        info!(
            request_id,
            items = report.items_processed,
            records = report.records.len(),
            batches = report.batches,
            "Dispatch complete"
        );
        report
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ExtractorConfig;
    use async_trait::async_trait;
    use careerwire_llm::{CompletionProvider, LlmError, MockProvider};
    use std::sync::Arc;
    use std::time::Duration;

    fn post(marker: &str) -> InputRecord {
        InputRecord {
            name: format!("Poster {}", marker),
            description: format!("Announcement {}", marker),
            ..InputRecord::default()
        }
    }

    fn change_response(person: &str) -> String {
        format!(
            r#"{{"poster_name": "Poster", "relevant": true,
                "extracted_info": [{{"person_name": "{}", "organization": "Acme", "new_role": "CFO"}}]}}"#,
            person
        )
    }

    fn dispatcher(provider: impl CompletionProvider + 'static, batch_size: usize) -> BatchDispatcher {
        let processor = ItemProcessor::new(Arc::new(provider), ExtractorConfig::default());
        BatchDispatcher::new(processor, batch_size)
    }

    #[tokio::test(start_paused = true)]
    async fn test_order_preserved_despite_latency() {
        let provider = MockProvider::default();
        let markers = ["item-alpha-01", "item-bravo-02", "item-charlie-03", "item-delta-04", "item-echo-05"];
        for (i, marker) in markers.iter().enumerate() {
            provider.add_response(*marker, change_response(marker));
            // Earlier items finish last
            provider.add_latency(*marker, Duration::from_secs((markers.len() - i) as u64));
        }

        let inputs: Vec<InputRecord> = markers.iter().map(|m| post(m)).collect();
        let report = dispatcher(provider, 2).dispatch(&inputs, "req-1").await;

        let starters: Vec<&str> = report
            .records
            .iter()
            .filter_map(|r| r.job_starter_name.as_deref())
            .collect();
        assert_eq!(starters, markers.to_vec());
        assert_eq!(report.items_processed, 5);
        assert_eq!(report.batches, 3);
        assert_eq!(report.failed_items, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_items_within_batch_run_concurrently() {
        let provider = MockProvider::new("{}");
        for marker in ["slow-a", "slow-b", "slow-c"] {
            provider.add_latency(marker, Duration::from_secs(2));
        }
        let inputs = vec![post("slow-a"), post("slow-b"), post("slow-c")];

        let start = tokio::time::Instant::now();
        let report = dispatcher(provider, 3).dispatch(&inputs, "req-2").await;

        assert_eq!(report.records.len(), 3);
        assert!(start.elapsed() < Duration::from_secs(3));
    }

    #[tokio::test(start_paused = true)]
    async fn test_batches_run_sequentially() {
        let provider = MockProvider::new("{}");
        for marker in ["seq-a", "seq-b"] {
            provider.add_latency(marker, Duration::from_secs(2));
        }
        let inputs = vec![post("seq-a"), post("seq-b")];

        let start = tokio::time::Instant::now();
        dispatcher(provider, 1).dispatch(&inputs, "req-3").await;

        assert!(start.elapsed() >= Duration::from_secs(4));
    }

    #[tokio::test]
    async fn test_multi_record_items_are_flattened_in_place() {
        let provider = MockProvider::new(r#"{"relevant": false}"#);
        provider.add_response(
            "item-many",
            r#"{"poster_name": "P", "extracted_info": [
                {"person_name": "One", "organization": "Acme", "new_role": "CEO"},
                {"person_name": "Two", "organization": "Acme", "new_role": "CTO"}
            ]}"#,
        );
        let inputs = vec![post("item-first"), post("item-many"), post("item-last")];

        let report = dispatcher(provider, 5).dispatch(&inputs, "req-4").await;

        let names: Vec<&str> = report.records.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(
            names,
            vec!["Poster item-first", "Poster item-many", "Poster item-many", "Poster item-last"]
        );
        assert_eq!(report.items_processed, 3);
    }

    #[tokio::test]
    async fn test_empty_input() {
        let report = dispatcher(MockProvider::default(), 5).dispatch(&[], "req-5").await;
        assert_eq!(report, DispatchReport::default());
    }

    #[tokio::test]
    async fn test_zero_batch_size_is_clamped() {
        let d = dispatcher(MockProvider::new("{}"), 0);
        assert_eq!(d.batch_size(), 1);
        let report = d.dispatch(&[post("a"), post("b")], "req-6").await;
        assert_eq!(report.batches, 2);
    }

    struct PanickingProvider;

    #[async_trait]
    impl CompletionProvider for PanickingProvider {
        async fn complete(&self, prompt: &str) -> Result<String, LlmError> {
            if prompt.contains("item-explode") {
                panic!("provider exploded");
            }
            Ok(r#"{"relevant": false}"#.to_string())
        }

        fn model_name(&self) -> &str {
            "panicking"
        }
    }

    #[tokio::test]
    async fn test_panicking_item_becomes_error_record() {
        let inputs = vec![post("item-ok-1"), post("item-explode"), post("item-ok-2")];
        let report = dispatcher(PanickingProvider, 2).dispatch(&inputs, "req-7").await;

        assert_eq!(report.records.len(), 3);
        assert_eq!(report.failed_items, 1);
        assert_eq!(report.batches, 2);

        let failed = &report.records[1];
        assert_eq!(failed.name, "Poster item-explode");
        assert!(failed.is_failure());
        let error = failed.error.as_deref().unwrap();
        assert!(error.starts_with("ProcessItemError: "));
        assert!(error.contains("provider exploded"));

        assert!(!report.records[0].is_failure());
        assert!(!report.records[2].is_failure());
    }
}
