//! Careerwire Router
//!
//! HTTP front end for the extraction pipeline. Tags every request with a
//! monotonically increasing `X-Request-ID`, refuses new work with `503`
//! once shutdown starts, and drains in-flight requests before exiting.

#![warn(missing_docs)]

pub mod config;
pub mod handlers;
pub mod middleware;

use careerwire_extractor::{BatchDispatcher, ItemProcessor};
use careerwire_llm::OpenAiProvider;
use config::RouterConfig;
use handlers::{create_router, AppState};
use middleware::ShutdownFlag;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{error, info};

/// Router error
#[derive(Debug, thiserror::Error)]
pub enum RouterError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    /// Server binding error
    #[error("Failed to bind server: {0}")]
    Bind(#[from] std::io::Error),

    /// Server error
    #[error("Server error: {0}")]
    Server(String),
}

/// Build the application state for `config`
///
/// The completion client is not contacted here.
pub fn build_state(config: &RouterConfig) -> AppState {
    let provider = OpenAiProvider::new(config.llm.clone());
    let processor = ItemProcessor::new(Arc::new(provider), config.extractor.clone());
    AppState::new(BatchDispatcher::from_processor(processor))
}

/// Start the Router HTTP server
///
/// Serves until SIGINT or SIGTERM, drains in-flight requests, then waits
/// the configured grace period.
pub async fn start_server(config: RouterConfig) -> Result<(), RouterError> {
    config.validate()?;

    info!("Starting Careerwire Router");
    info!("Bind address: {}", config.bind_addr());
    info!("Model: {}", config.llm.model);
    info!("Batch size: {}", config.extractor.batch_size);

    let state = build_state(&config);
    let shutdown = state.shutdown.clone();
    let app = create_router(state);

    let listener = TcpListener::bind(&config.bind_addr()).await?;
    info!("Router listening on {}", config.bind_addr());

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(shutdown))
        .await
        .map_err(|e| RouterError::Server(e.to_string()))?;

    info!(
        grace_secs = config.shutdown_grace_secs,
        "In-flight requests drained, finishing cleanup"
    );
    tokio::time::sleep(config.shutdown_grace()).await;
    info!("Shutdown complete");

    Ok(())
}

async fn shutdown_signal(flag: ShutdownFlag) {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received, refusing new requests");
    flag.trigger();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_state_uses_configured_batch_size() {
        let mut config = RouterConfig::default();
        config.extractor.batch_size = 7;
        config.llm.model = "davinci-002".to_string();

        let state = build_state(&config);
        assert_eq!(state.dispatcher.batch_size(), 7);
        assert_eq!(state.dispatcher.processor().model_name(), "davinci-002");
        assert!(!state.shutdown.is_triggered());
    }
}
