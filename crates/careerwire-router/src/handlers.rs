//! HTTP request handlers for the Router service.
//!
//! `GET /` answers a welcome message; `POST /extract_information` runs a
//! batch extraction and never fails on bad input, it answers `[]` instead.

use crate::middleware::{assign_request_id, shutdown_gate, RequestCounter, RequestId, ShutdownFlag};
use axum::{
    body::Bytes,
    extract::{Extension, State},
    middleware::from_fn_with_state,
    response::Json,
    routing::{get, post},
    Router as AxumRouter,
};
use careerwire_domain::{InputRecord, OutputRecord};
use careerwire_extractor::BatchDispatcher;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use tracing::{info, warn};

/// Body of `GET /`
pub const WELCOME_MESSAGE: &str = "Welcome to the Data Extractor API !";

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Batch pipeline shared by all requests
    pub dispatcher: Arc<BatchDispatcher>,
    /// Request id allocator
    pub counter: RequestCounter,
    /// Shutdown gate
    pub shutdown: ShutdownFlag,
}

impl AppState {
    /// Create state with a fresh counter and an unset shutdown flag
    pub fn new(dispatcher: BatchDispatcher) -> Self {
        Self {
            dispatcher: Arc::new(dispatcher),
            counter: RequestCounter::new(),
            shutdown: ShutdownFlag::new(),
        }
    }
}

/// Welcome response
#[derive(Debug, Serialize, Deserialize)]
pub struct WelcomeResponse {
    /// Greeting text
    pub message: String,
}

/// GET / - Liveness check
async fn home(Extension(request_id): Extension<RequestId>) -> Json<WelcomeResponse> {
    info!(%request_id, "Home endpoint accessed");
    Json(WelcomeResponse {
        message: WELCOME_MESSAGE.to_string(),
    })
}

/// POST /extract_information - Run the extraction pipeline over a batch
async fn extract_information(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    body: Bytes,
) -> Json<Vec<OutputRecord>> {
    let Some(inputs) = decode_inputs(&body, request_id) else {
        return Json(Vec::new());
    };

    info!(%request_id, items = inputs.len(), "Received extraction request");

    let report = state
        .dispatcher
        .dispatch(&inputs, &request_id.to_string())
        .await;

    if report.failed_items > 0 {
        warn!(%request_id, failed = report.failed_items, "Some items failed unexpectedly");
    }
    info!(%request_id, records = report.records.len(), "Returning extraction results");

    Json(report.records)
}

fn decode_inputs(body: &[u8], request_id: RequestId) -> Option<Vec<InputRecord>> {
    let value: Value = match serde_json::from_slice(body) {
        Ok(value) => value,
        Err(e) => {
            warn!(%request_id, "Request body is not valid JSON: {}", e);
            return None;
        }
    };

    if !value.is_array() {
        warn!(%request_id, "Invalid input format: expected a list");
        return None;
    }

    let inputs: Vec<InputRecord> = match serde_json::from_value(value) {
        Ok(inputs) => inputs,
        Err(e) => {
            warn!(%request_id, "Input items do not match the expected shape: {}", e);
            return None;
        }
    };

    if inputs.is_empty() {
        warn!(%request_id, "Empty input list received");
        return None;
    }

    Some(inputs)
}

/// Create the axum router with all routes
pub fn create_router(state: AppState) -> AxumRouter {
    let counter = state.counter.clone();
    let shutdown = state.shutdown.clone();

    AxumRouter::new()
        .route("/", get(home))
        .route("/extract_information", post(extract_information))
        .with_state(state)
        .layer(from_fn_with_state(shutdown, shutdown_gate))
        // Outermost, so 503 answers carry an id too
        .layer(from_fn_with_state(counter, assign_request_id))
}
