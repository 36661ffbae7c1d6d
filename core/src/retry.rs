//! Retry and backoff policy for transient failures.
//!
//! A rate-limit hint from the server (`Retry-After`) wins over the computed
//! backoff. Without a hint the delay grows exponentially from `base_delay`,
//! is capped at `max_delay`, and then gets up to `max_jitter` of random
//! spread so callers that failed together do not retry together.

use std::time::Duration;

use chrono::{DateTime, Utc};
use rand::Rng;

use crate::http::HttpResponse;

/// Status codes the executor retries: rate limiting and gateway failures.
pub const RETRYABLE_STATUS_CODES: [u16; 4] = [429, 502, 503, 504];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries after the first attempt.
    pub max_retries: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
    /// Floor applied to server-provided `Retry-After` hints.
    pub min_hint_delay: Duration,
    /// Exclusive upper bound of the random jitter. Zero disables jitter.
    pub max_jitter: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 5,
            base_delay: Duration::from_millis(500),
            max_delay: Duration::from_millis(10_000),
            min_hint_delay: Duration::from_millis(250),
            max_jitter: Duration::from_millis(250),
        }
    }
}

impl RetryPolicy {
    pub fn is_retryable_status(status: u16) -> bool {
        RETRYABLE_STATUS_CODES.contains(&status)
    }

    /// Total attempts including the first one.
    pub fn max_attempts(&self) -> u32 {
        self.max_retries.saturating_add(1)
    }

    /// Delay before the retry that follows `attempt` (0-based).
    pub fn delay(&self, attempt: u32, response: Option<&HttpResponse>) -> Duration {
        let retry_after = response.and_then(|r| r.header("retry-after"));
        self.delay_with(attempt, retry_after, Utc::now(), self.random_jitter())
    }

    /// Deterministic core of `delay`: the clock and the jitter are inputs.
    pub fn delay_with(
        &self,
        attempt: u32,
        retry_after: Option<&str>,
        now: DateTime<Utc>,
        jitter: Duration,
    ) -> Duration {
        if let Some(hint) = retry_after.and_then(|value| parse_retry_after(value, now)) {
            return hint.clamp(self.min_hint_delay, self.max_delay);
        }
        self.backoff(attempt) + jitter
    }

    /// `base_delay * 2^attempt`, capped at `max_delay`. No jitter.
    pub fn backoff(&self, attempt: u32) -> Duration {
        let factor = 2u32.checked_pow(attempt).unwrap_or(u32::MAX);
        self.base_delay.saturating_mul(factor).min(self.max_delay)
    }

    fn random_jitter(&self) -> Duration {
        let bound = self.max_jitter.as_millis() as u64;
        if bound == 0 {
            return Duration::ZERO;
        }
        Duration::from_millis(rand::thread_rng().gen_range(0..bound))
    }
}

/// Interpret a `Retry-After` value as either delay-seconds or an HTTP date.
///
/// Seconds may be fractional. A date in the past yields zero. Returns `None`
/// for values that are neither.
pub fn parse_retry_after(value: &str, now: DateTime<Utc>) -> Option<Duration> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }

    if let Ok(seconds) = value.parse::<f64>() {
        if seconds >= 0.0 {
            if let Ok(delay) = Duration::try_from_secs_f64(seconds) {
                return Some(delay);
            }
        }
    }

    let date = DateTime::parse_from_rfc2822(value)
        .or_else(|_| DateTime::parse_from_rfc3339(value))
        .ok()?
        .with_timezone(&Utc);
    Some((date - now).to_std().unwrap_or(Duration::ZERO))
}
