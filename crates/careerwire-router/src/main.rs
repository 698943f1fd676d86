//! Careerwire Router CLI
//!
//! Starts the extraction HTTP server.

use anyhow::Context;
use careerwire_router::{config::RouterConfig, start_server};
use std::env;
use std::process;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args: Vec<String> = env::args().collect();

    let mut config = if args.len() > 2 && args[1] == "--config" {
        let config_path = &args[2];
        RouterConfig::from_file(config_path)
            .with_context(|| format!("loading router config from {}", config_path))?
    } else if args.len() > 1 && args[1] == "--help" {
        print_help();
        process::exit(0);
    } else {
        tracing::warn!("No config file specified, using defaults and environment");
        RouterConfig::default()
    };

    config.apply_env();

    start_server(config).await.context("running router")?;

    Ok(())
}

fn print_help() {
    println!("Careerwire Router - LinkedIn career-change extraction API");
    println!();
    println!("USAGE:");
    println!("    careerwire-router [--config <path-to-config.toml>]");
    println!();
    println!("OPTIONS:");
    println!("    --config <file>    Load configuration from TOML file");
    println!("    --help             Print this help message");
    println!();
    println!("CONFIGURATION:");
    println!("    The TOML config file may contain:");
    println!("    - bind_address, bind_port, shutdown_grace_secs");
    println!("    - [extractor] batch_size, max_prompt_chars");
    println!("    - [llm] api_key, base_url, model, temperature, seed, max_tokens,");
    println!("      timeout_secs, max_retries, base_delay_secs");
    println!();
    println!("ENVIRONMENT:");
    println!("    APPLICATION_HOST, APPLICATION_PORT, BATCH_SIZE, OPENAI_API_KEY,");
    println!("    OPENAI_BASE_URL, OPENAI_MODEL_NAME, MODEL_TEMPERATURE, SEED,");
    println!("    MAX_TOKENS, TIMEOUT, MAX_RETRIES, BASE_DELAY, RUST_LOG");
    println!();
}
