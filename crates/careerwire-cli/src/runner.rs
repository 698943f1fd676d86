//! Batch run: load, dispatch, save.

use crate::cli::DEFAULT_OUTPUT_DIR;
use crate::error::{CliError, Result};
use crate::output::{RunMetadata, RunOutput, PROCESSING_TYPE};
use careerwire_domain::InputRecord;
use careerwire_extractor::BatchDispatcher;
use chrono::{DateTime, Local};
use serde::Serialize;
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Load input records from a JSON array file.
///
/// Elements that do not match the input shape are skipped with a warning.
pub fn load_inputs(path: &Path) -> Result<Vec<InputRecord>> {
    if !path.exists() {
        return Err(CliError::InputNotFound(path.display().to_string()));
    }

    info!("Loading input data from: {}", path.display());
    let contents = fs::read_to_string(path)?;
    let raw: Value = serde_json::from_str(&contents).map_err(|e| {
        CliError::InvalidInput(format!("Invalid JSON format in {}: {}", path.display(), e))
    })?;

    let Value::Array(items) = raw else {
        return Err(CliError::InvalidInput(
            "Input data must be a JSON array".to_string(),
        ));
    };

    let total = items.len();
    let inputs: Vec<InputRecord> = items
        .into_iter()
        .enumerate()
        .filter_map(|(idx, item)| match serde_json::from_value(item) {
            Ok(input) => Some(input),
            Err(e) => {
                warn!("Skipping invalid item at index {}: {}", idx, e);
                None
            }
        })
        .collect();

    info!(
        "Successfully loaded {} valid items from {} total items",
        inputs.len(),
        total
    );
    Ok(inputs)
}

/// Output path for `input` when none was given: `results/<stem>_processed_<YYYYMMDD_HHMMSS>.json`.
pub fn generate_output_filename(input: &Path, now: DateTime<Local>) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "output".to_string());
    let filename = format!("{}_processed_{}.json", stem, now.format("%Y%m%d_%H%M%S"));
    Path::new(DEFAULT_OUTPUT_DIR).join(filename)
}

/// Run the dispatcher over `inputs` and assemble the output document.
pub async fn process_inputs(
    dispatcher: &BatchDispatcher,
    inputs: &[InputRecord],
    run_id: &str,
) -> RunOutput {
    info!(
        run_id,
        "Starting processing of {} items in batches of {}",
        inputs.len(),
        dispatcher.batch_size()
    );

    let report = dispatcher.dispatch(inputs, run_id).await;
    let errors = report.records.iter().filter(|r| r.is_failure()).count();

    let metadata = RunMetadata {
        timestamp: Local::now().format("%Y-%m-%dT%H:%M:%S%.6f").to_string(),
        total_processed: report.items_processed,
        successful_extractions: report.records.len() - errors,
        errors,
        batch_size: dispatcher.batch_size(),
        model_name: dispatcher.processor().model_name().to_string(),
        processing_type: PROCESSING_TYPE.to_string(),
        run_id: run_id.to_string(),
    };

    RunOutput {
        metadata,
        results: report.records,
    }
}

/// Write the output document, creating parent directories.
pub fn save_output(output: &RunOutput, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    let mut buf = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
    output.serialize(&mut serializer)?;
    fs::write(path, buf)?;

    info!("Results saved to: {}", path.display());
    info!("Total items processed: {}", output.metadata.total_processed);
    info!("Successful extractions: {}", output.metadata.successful_extractions);
    info!("Errors encountered: {}", output.metadata.errors);
    Ok(())
}
