//! Retry policy with linear back-off
//!
//! Attempt `n` of a retried call waits `base_delay * n` first, unless the
//! response named its own `Retry-After`. Rate-limited responses are handled
//! by the executor and never reach this budget.

use std::time::Duration;

use backoff::backoff::Backoff;
use reqwest::{Method, StatusCode};

use crate::config::Config;
use crate::error::{Error, ErrorKind};
use crate::http::error::{ApiError, TransportError};

/// Retry policy configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries allowed after the first attempt
    pub max_retries: u32,
    /// Step of the linear back-off
    pub base_delay: Duration,
}

impl RetryPolicy {
    pub fn new(max_retries: u32, base_delay: Duration) -> Self {
        Self {
            max_retries,
            base_delay,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.max_retries(), config.delay())
    }

    pub fn create_backoff(&self) -> LinearBackoff {
        LinearBackoff::new(self.base_delay)
    }
}

/// `base, 2*base, 3*base, ...`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinearBackoff {
    base: Duration,
    step: u32,
}

impl LinearBackoff {
    pub fn new(base: Duration) -> Self {
        Self { base, step: 0 }
    }
}

impl Backoff for LinearBackoff {
    fn reset(&mut self) {
        self.step = 0;
    }

    fn next_backoff(&mut self) -> Option<Duration> {
        self.step = self.step.saturating_add(1);
        self.base.checked_mul(self.step)
    }
}

/// Decision on whether to retry a request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryDecision {
    /// Retry the request after the specified delay
    Retry { delay: Duration },
    /// The error is permanent
    NoRetry,
    /// The error is transient but the budget is spent
    Exhausted,
}

/// Whether a failed attempt is worth another try
///
/// Decided on the HTTP status and headers alone: 500/503 always, other 5xx
/// only when the body carried no provider code, 409/424 only when the server
/// sent `Retry-After`. Without a status (network failure) only GET is retried,
/// so writes are never submitted twice.
pub fn is_retryable(
    status: Option<StatusCode>,
    error: &Error,
    has_retry_after: bool,
    method: &Method,
) -> bool {
    match status.map(|s| s.as_u16()) {
        Some(500 | 503) => true,
        Some(409 | 424) => has_retry_after,
        Some(501..=599) => error
            .find::<ApiError>()
            .map_or(true, |api| api.code.is_none()),
        Some(_) => false,
        None => {
            error.kind() == ErrorKind::Timeout
                && *method == Method::GET
                && error.find::<TransportError>().is_some()
        }
    }
}

/// Per-call retry state
#[derive(Debug)]
pub struct RetryHandler {
    policy: RetryPolicy,
    retries: u32,
    backoff: LinearBackoff,
}

impl RetryHandler {
    pub fn new(policy: RetryPolicy) -> Self {
        let backoff = policy.create_backoff();
        Self {
            policy,
            retries: 0,
            backoff,
        }
    }

    /// Decide on a failed attempt; `status` is `None` when no response arrived
    pub fn should_retry(
        &mut self,
        status: Option<StatusCode>,
        error: &Error,
        retry_after: Option<Duration>,
        method: &Method,
    ) -> RetryDecision {
        if !is_retryable(status, error, retry_after.is_some(), method) {
            return RetryDecision::NoRetry;
        }
        if self.retries >= self.policy.max_retries {
            return RetryDecision::Exhausted;
        }

        self.retries += 1;
        let linear = self.backoff.next_backoff().unwrap_or(Duration::MAX);
        RetryDecision::Retry {
            delay: retry_after.unwrap_or(linear),
        }
    }

    /// Retries consumed so far
    pub fn retries(&self) -> u32 {
        self.retries
    }

    /// Decorate the last error once the budget is spent
    pub fn exhausted(&self, last: Error) -> Error {
        Error::wrap(
            last.kind(),
            RetriesExhausted {
                attempts: self.retries + 1,
                last,
            },
        )
    }
}

/// The retry budget ran out
#[derive(Debug, thiserror::Error)]
#[error("Maximum number of re-tries has been exhausted with error: {last}")]
pub struct RetriesExhausted {
    pub attempts: u32,
    #[source]
    pub last: Error,
}
