//! Per-request retry policy for GitHub API calls.
//!
//! Every request is driven through a small state machine:
//!
//! ```text
//! Pending ──403──▶ Cooling ──(sleep)──▶ Pending
//!    │
//!    ├──2xx──▶ Succeeded
//!    ├──other status──▶ FailedPermanent
//!    └──network/decode──▶ FailedTransient ──(budget left)──▶ Pending
//!                                       └──(exhausted)──▶ error
//! ```
//!
//! Only `FailedTransient` consumes the attempt budget. A 403 means the quota
//! is exhausted; the request waits out the cooldown and is retried for free.

use std::future::Future;
use std::time::Duration;

use backon::{BackoffBuilder, ConstantBuilder};
use chrono::{DateTime, Utc};

use crate::error::{Result, StargazeError};

/// Default number of attempts per request (the first try included).
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;

/// Default fixed delay between transient-failure attempts.
pub const DEFAULT_RETRY_DELAY_MS: u64 = 2_000;

/// Cooldown used on 403 when the response carries no usable reset header.
pub const DEFAULT_RATE_LIMIT_COOLDOWN_SECS: u64 = 60;

/// Added on top of the advertised reset time.
const RESET_BUFFER: Duration = Duration::from_secs(1);

/// Configuration for retry operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Maximum number of attempts for transient failures.
    pub max_attempts: u32,
    /// Fixed delay between transient-failure attempts.
    pub retry_delay: Duration,
    /// Fallback cooldown after a 403.
    pub rate_limit_cooldown: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            retry_delay: Duration::from_millis(DEFAULT_RETRY_DELAY_MS),
            rate_limit_cooldown: Duration::from_secs(DEFAULT_RATE_LIMIT_COOLDOWN_SECS),
        }
    }
}

impl RetryPolicy {
    /// Create a new retry policy with custom values.
    #[must_use]
    pub fn new(max_attempts: u32, retry_delay: Duration, rate_limit_cooldown: Duration) -> Self {
        Self {
            max_attempts,
            retry_delay,
            rate_limit_cooldown,
        }
    }

    /// Delays to wait between transient attempts.
    ///
    /// Yields one delay per retry still allowed, so the iterator running dry
    /// is exactly the point where the budget is exhausted.
    pub fn transient_backoff(&self) -> impl Iterator<Item = Duration> + Send + use<> {
        ConstantBuilder::default()
            .with_delay(self.retry_delay)
            .with_max_times(self.max_attempts.saturating_sub(1) as usize)
            .build()
    }
}

/// States of a single upstream request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestState<T> {
    /// About to (re)issue the request.
    Pending,
    /// Quota exhausted; wait this long, then go back to `Pending`.
    Cooling(Duration),
    /// Finished with a decoded body.
    Succeeded(T),
    /// Network or decoding failure; retried while budget remains.
    FailedTransient(String),
    /// Non-retryable HTTP status.
    FailedPermanent { status: u16, message: String },
}

/// Compute how long to cool down after a 403.
///
/// GitHub advertises the quota reset as epoch seconds in `X-RateLimit-Reset`.
/// When present the wait is `reset - now + 1s` (never less than the buffer);
/// otherwise the fixed `fallback` applies.
pub fn cooldown_from_reset(
    reset_header: Option<&str>,
    now: DateTime<Utc>,
    fallback: Duration,
) -> Duration {
    let Some(reset_at) = reset_header
        .and_then(|v| v.trim().parse::<i64>().ok())
        .and_then(|secs| DateTime::from_timestamp(secs, 0))
    else {
        return fallback;
    };

    let remaining = (reset_at - now).to_std().unwrap_or(Duration::ZERO);
    remaining + RESET_BUFFER
}

/// Drive one request through the state machine until it terminates.
///
/// `attempt` performs a single try and reports the state it ended in
/// (`Succeeded`, `Cooling`, `FailedTransient` or `FailedPermanent`).
/// `label` identifies the request in log output.
pub async fn run_request<T, F, Fut>(policy: &RetryPolicy, label: &str, mut attempt: F) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = RequestState<T>>,
{
    let mut backoff = policy.transient_backoff();
    let mut failures = 0u32;
    let mut state = RequestState::Pending;

    loop {
        state = match state {
            RequestState::Pending => attempt().await,
            RequestState::Cooling(wait) => {
                tracing::warn!(
                    request = %label,
                    wait_secs = wait.as_secs(),
                    "Rate limit exhausted, cooling down"
                );
                tokio::time::sleep(wait).await;
                RequestState::Pending
            }
            RequestState::FailedTransient(message) => {
                failures += 1;
                match backoff.next() {
                    Some(delay) => {
                        tracing::warn!(
                            request = %label,
                            attempt = failures,
                            retry_in_ms = delay.as_millis() as u64,
                            error = %message,
                            "Request failed, retrying"
                        );
                        tokio::time::sleep(delay).await;
                        RequestState::Pending
                    }
                    None => {
                        return Err(StargazeError::Transient {
                            attempts: failures,
                            message,
                        });
                    }
                }
            }
            RequestState::FailedPermanent { status, message } => {
                return Err(StargazeError::Upstream { status, message });
            }
            RequestState::Succeeded(value) => return Ok(value),
        };
    }
}
