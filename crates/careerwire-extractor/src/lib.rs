//! Careerwire Extractor
//!
//! Turns scraped LinkedIn posts into career-change records with an LLM.
//!
//! # Architecture
//!
//! ```text
//! InputRecord → PromptBuilder → CompletionProvider → parse_completion
//!             → post_process → ItemOutcome → OutputRecord(s)
//! ```
//!
//! [`ItemProcessor`] runs that chain for one post and converts every
//! failure into an output record. [`BatchDispatcher`] runs it over a
//! collection in fixed-size batches, concurrently within a batch, and
//! returns the records in input order.
//!
//! # Example Usage
//!
//! ```no_run
//! use careerwire_domain::InputRecord;
//! use careerwire_extractor::{BatchDispatcher, ExtractorConfig, ItemProcessor};
//! use careerwire_llm::MockProvider;
//! use std::sync::Arc;
//!
//! # async fn example() {
//! let llm = MockProvider::new(r#"{"relevant": false}"#);
//! let processor = ItemProcessor::new(Arc::new(llm), ExtractorConfig::default());
//! let dispatcher = BatchDispatcher::from_processor(processor);
//!
//! let posts = vec![InputRecord {
//!     name: "Jane Doe".to_string(),
//!     description: "Happy to share I joined Acme as CFO".to_string(),
//!     ..InputRecord::default()
//! }];
//!
//! let report = dispatcher.dispatch(&posts, "run-1").await;
//! println!("{} records from {} posts", report.records.len(), report.items_processed);
//! # }
//! ```

#![warn(missing_docs)]

mod config;
mod dispatcher;
mod error;
mod parser;
mod post_process;
mod processor;
mod prompt;


pub use config::ExtractorConfig;
pub use dispatcher::{BatchDispatcher, DispatchReport};
pub use error::ExtractorError;
pub use parser::{parse_completion, RawExtraction, DEFAULT_CATEGORY};
pub use post_process::{post_process, PostProcessed};
pub use processor::{ItemContext, ItemOutcome, ItemProcessor, IRRELEVANT_MESSAGE};
pub use prompt::PromptBuilder;
