//! Rate-limit and retry hint headers
//!
//! `Ratelimit-Reset` carries the unix time in milliseconds at which the next
//! request is allowed; `Retry-After` carries a number of seconds.

use std::time::Duration;

use chrono::{DateTime, Utc};
use reqwest::header::{HeaderMap, RETRY_AFTER};

/// Header carrying the reset timestamp in milliseconds since the epoch
pub const RATELIMIT_RESET: &str = "ratelimit-reset";

/// Header carrying the provider correlation id
pub const REQUEST_ID: &str = "x-request-id";

/// `Retry-After` as a duration; only the integer-seconds form is understood
pub fn retry_after(headers: &HeaderMap) -> Option<Duration> {
    headers
        .get(RETRY_AFTER)
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.trim().parse::<u64>().ok())
        .map(Duration::from_secs)
}

/// `Ratelimit-Reset` as a timestamp
pub fn ratelimit_reset(headers: &HeaderMap) -> Option<DateTime<Utc>> {
    headers
        .get(RATELIMIT_RESET)
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.trim().parse::<i64>().ok())
        .and_then(DateTime::<Utc>::from_timestamp_millis)
}

/// Time to wait until the reset timestamp, zero if it already passed
pub fn reset_wait(headers: &HeaderMap, now: DateTime<Utc>) -> Option<Duration> {
    let reset = ratelimit_reset(headers)?;
    Some((reset - now).to_std().unwrap_or(Duration::ZERO))
}

/// Wait before re-issuing a request rejected with 429
///
/// Prefers `Ratelimit-Reset`, then `Retry-After`, then `fallback`.
pub fn rate_limit_wait(headers: &HeaderMap, now: DateTime<Utc>, fallback: Duration) -> Duration {
    reset_wait(headers, now)
        .or_else(|| retry_after(headers))
        .unwrap_or(fallback)
}

/// The `X-Request-Id` header value
pub fn request_id(headers: &HeaderMap) -> Option<String> {
    headers
        .get(REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}
