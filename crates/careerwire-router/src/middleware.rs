//! Request tagging and shutdown gating

use axum::{
    extract::{Request, State},
    http::{HeaderValue, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{debug, warn};

/// Response header carrying the request id
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Per-process request id, inserted into request extensions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestId(pub u64);

impl std::fmt::Display for RequestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Monotonic request counter shared by all connections
#[derive(Debug, Clone, Default)]
pub struct RequestCounter(Arc<AtomicU64>);

impl RequestCounter {
    /// Create a counter whose first id is 1
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate the next id
    pub fn next(&self) -> RequestId {
        RequestId(self.0.fetch_add(1, Ordering::Relaxed) + 1)
    }
}

/// Set once the process starts shutting down
#[derive(Debug, Clone, Default)]
pub struct ShutdownFlag(Arc<AtomicBool>);

impl ShutdownFlag {
    /// Create an unset flag
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark the process as shutting down
    pub fn trigger(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    /// Whether shutdown has started
    pub fn is_triggered(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Tag the request with the next id and echo it on the response
pub async fn assign_request_id(
    State(counter): State<RequestCounter>,
    mut req: Request,
    next: Next,
) -> Response {
    let id = counter.next();
    req.extensions_mut().insert(id);

    let mut response = next.run(req).await;
    response
        .headers_mut()
        .insert(REQUEST_ID_HEADER, HeaderValue::from(id.0));
    response
}

/// Refuse work once shutdown has started
pub async fn shutdown_gate(
    State(flag): State<ShutdownFlag>,
    req: Request,
    next: Next,
) -> Response {
    let request_id = req.extensions().get::<RequestId>().copied();

    if flag.is_triggered() {
        warn!(request_id = ?request_id.map(|id| id.0), "Server is shutting down, returning 503");
        return (StatusCode::SERVICE_UNAVAILABLE, "Server is shutting down").into_response();
    }

    debug!(request_id = ?request_id.map(|id| id.0), "Processing request");
    next.run(req).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counter_starts_at_one() {
        let counter = RequestCounter::new();
        assert_eq!(counter.next(), RequestId(1));
        assert_eq!(counter.next(), RequestId(2));

        // Clones share the sequence
        let clone = counter.clone();
        assert_eq!(clone.next(), RequestId(3));
    }

    #[test]
    fn test_shutdown_flag() {
        let flag = ShutdownFlag::new();
        assert!(!flag.is_triggered());
        flag.clone().trigger();
        assert!(flag.is_triggered());
    }
}
