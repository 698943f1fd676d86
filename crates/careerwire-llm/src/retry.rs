//! Bounded retry with exponential backoff on rate limiting
//!
//! Attempts are 0-based. A rate-limited attempt `a` that is not the last
//! one is followed by a sleep of `base_delay * 2^a` plus a uniform jitter
//! in `[0, 1)` seconds. Every other error is returned immediately.

use crate::LlmError;
use rand::Rng;
use std::future::Future;
use std::time::Duration;
use tracing::warn;

/// Retry contract for a single completion call
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RetryPolicy {
    max_retries: u32,
    base_delay: Duration,
}

impl RetryPolicy {
    /// Create a policy allowing `max_retries` total attempts
    pub fn new(max_retries: u32, base_delay: Duration) -> Self {
        Self {
            max_retries,
            base_delay,
        }
    }

    /// Total attempts; never less than one
    pub fn max_retries(&self) -> u32 {
        self.max_retries.max(1)
    }

    /// Deterministic part of the backoff after attempt `attempt`
    pub fn base_delay_for(&self, attempt: u32) -> Duration {
        let factor = 2u32.checked_pow(attempt).unwrap_or(u32::MAX);
        self.base_delay.saturating_mul(factor)
    }

    /// Full backoff after attempt `attempt`, jitter included
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let jitter: f64 = rand::thread_rng().gen_range(0.0..1.0);
        self.base_delay_for(attempt)
            .saturating_add(Duration::from_secs_f64(jitter))
    }

    /// Drive `op` until it succeeds, fails without rate limiting, or the
    /// attempts run out
    ///
    /// `op` receives the 0-based attempt number.
    pub async fn run<T, F, Fut>(&self, mut op: F) -> Result<T, LlmError>
    where
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = Result<T, LlmError>>,
    {
        let attempts = self.max_retries();
        let mut attempt = 0;

        loop {
            match op(attempt).await {
                Err(err) if err.is_rate_limited() && attempt + 1 < attempts => {
                    let delay = self.delay_for(attempt);
                    warn!(
                        attempt = attempt + 1,
                        max_retries = attempts,
                        delay_ms = delay.as_millis() as u64,
                        "Rate limited, backing off"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                other => return other,
            }
        }
    }
}
