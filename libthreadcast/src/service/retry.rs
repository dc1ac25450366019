//! Per-segment retry policy
//!
//! The orchestrator makes a single attempt per segment by default, which
//! keeps the total publish time bounded and predictable. `Bounded` retries
//! transient failures (network errors, rate limiting) with exponential
//! backoff without changing how the thread is sequenced or aggregated.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::error::ThreadcastError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum RetryPolicy {
    /// One attempt per segment
    #[default]
    #[serde(rename = "single")]
    SingleAttempt,

    /// Up to `max_attempts` attempts; waits `initial_backoff`, then twice
    /// as long after each further transient failure
    Bounded {
        max_attempts: u32,
        #[serde(with = "crate::config::duration_str")]
        initial_backoff: Duration,
    },
}

impl RetryPolicy {
    pub fn max_attempts(&self) -> u32 {
        match self {
            RetryPolicy::SingleAttempt => 1,
            RetryPolicy::Bounded { max_attempts, .. } => (*max_attempts).max(1),
        }
    }

    /// Whether to try again after `attempt` (1-based) failed with `error`
    pub fn should_retry(&self, error: &ThreadcastError, attempt: u32) -> bool {
        attempt < self.max_attempts() && is_transient_error(error)
    }

    /// How long to wait after failed attempt number `attempt` (1-based)
    pub fn backoff(&self, attempt: u32) -> Duration {
        match self {
            RetryPolicy::SingleAttempt => Duration::ZERO,
            RetryPolicy::Bounded {
                initial_backoff, ..
            } => {
                let factor = 2_u32.saturating_pow(attempt.saturating_sub(1));
                initial_backoff.saturating_mul(factor)
            }
        }
    }
}

/// Check if an error is transient and should be retried
fn is_transient_error(error: &ThreadcastError) -> bool {
    match error {
        ThreadcastError::Platform(platform_error) => platform_error.is_transient(),
        _ => false,
    }
}
