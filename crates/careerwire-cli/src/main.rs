//! Careerwire CLI - batch extraction of career changes from LinkedIn posts.

use careerwire_cli::runner::{generate_output_filename, load_inputs, process_inputs, save_output};
use careerwire_cli::{Cli, Config, Formatter};
use careerwire_extractor::{BatchDispatcher, ItemProcessor};
use careerwire_llm::OpenAiProvider;
use clap::Parser;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

async fn run() -> careerwire_cli::Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .init();

    let mut config = Config::load(cli.config.as_deref())?;
    config.apply_env();
    let config = config.with_batch_size(cli.batch_size);
    config.validate()?;

    let run_id = Uuid::now_v7().to_string();
    info!(run_id = %run_id, "Starting LinkedIn career-change extraction");

    let inputs = load_inputs(&cli.input)?;
    if inputs.is_empty() {
        warn!("No valid input items found. Exiting.");
        return Ok(());
    }

    let output_path = cli
        .output
        .clone()
        .unwrap_or_else(|| generate_output_filename(&cli.input, chrono::Local::now()));

    let provider = OpenAiProvider::new(config.llm.clone());
    let processor = ItemProcessor::new(Arc::new(provider), config.extractor.clone());
    let dispatcher = BatchDispatcher::from_processor(processor);

    let output = process_inputs(&dispatcher, &inputs, &run_id).await;
    save_output(&output, &output_path)?;

    let formatter = Formatter::new(!cli.no_color);
    println!("{}", formatter.summary(&output.metadata, &output_path));

    Ok(())
}
