//! Output document and terminal summary.

use careerwire_domain::OutputRecord;
use colored::*;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tabled::{
    builder::Builder,
    settings::{object::Rows, Alignment, Modify, Style},
};

/// Label written to every output document
pub const PROCESSING_TYPE: &str = "CLI Batch Processing";

/// Run-level counters written alongside the results.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunMetadata {
    /// Local ISO-8601 time the file was written
    pub timestamp: String,
    /// Input items processed
    pub total_processed: usize,
    /// Output records that are not failures
    pub successful_extractions: usize,
    /// Output records that are failures
    pub errors: usize,
    /// Items per batch
    pub batch_size: usize,
    /// Model used for extraction
    pub model_name: String,
    /// Always [`PROCESSING_TYPE`]
    pub processing_type: String,
    /// Correlation id used in logs
    pub run_id: String,
}

/// The document written to the output file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunOutput {
    /// Run-level counters
    pub metadata: RunMetadata,
    /// Output records in input order
    pub results: Vec<OutputRecord>,
}

/// Summary formatter.
pub struct Formatter {
    color_enabled: bool,
}

impl Formatter {
    /// Create a new formatter.
    pub fn new(color_enabled: bool) -> Self {
        Self { color_enabled }
    }

    /// Render the end-of-run summary.
    pub fn summary(&self, metadata: &RunMetadata, output_path: &Path) -> String {
        let mut builder = Builder::default();
        builder.push_record(["Metric", "Value"]);
        builder.push_record(["Items processed".to_string(), metadata.total_processed.to_string()]);
        builder.push_record([
            "Successful extractions".to_string(),
            metadata.successful_extractions.to_string(),
        ]);
        builder.push_record(["Errors".to_string(), metadata.errors.to_string()]);
        builder.push_record(["Batch size".to_string(), metadata.batch_size.to_string()]);
        builder.push_record(["Model".to_string(), metadata.model_name.clone()]);

        let mut table = builder.build();
        table
            .with(Style::rounded())
            .with(Modify::new(Rows::first()).with(Alignment::center()));

        let status = if metadata.errors == 0 {
            self.success("Processing completed successfully!")
        } else {
            self.warning(&format!(
                "Processing completed with {} error(s)",
                metadata.errors
            ))
        };

        format!(
            "{}\n{}\n{}",
            table,
            status,
            self.info(&format!("Results saved to: {}", output_path.display()))
        )
    }

    /// Format a success message.
    pub fn success(&self, message: &str) -> String {
        self.colorize(&format!("✓ {}", message), "green")
    }

    /// Format a warning message.
    pub fn warning(&self, message: &str) -> String {
        self.colorize(&format!("⚠ {}", message), "yellow")
    }

    /// Format an info message.
    pub fn info(&self, message: &str) -> String {
        self.colorize(&format!("ℹ {}", message), "blue")
    }

    fn colorize(&self, text: &str, color: &str) -> String {
        if !self.color_enabled {
            return text.to_string();
        }

        match color {
            "green" => text.green().to_string(),
            "yellow" => text.yellow().to_string(),
            "blue" => text.blue().to_string(),
            "red" => text.red().to_string(),
            _ => text.to_string(),
        }
    }
}
