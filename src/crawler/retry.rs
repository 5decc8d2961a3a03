//! Retry policy for listing fetches
//!
//! Timeouts and transport failures are retried up to `max_retries` times with
//! a fixed delay between attempts. HTTP status errors are returned at once.
//! No new attempt starts once the crawl is interrupted.

use crate::crawler::fetcher::Fetcher;
use crate::FetchError;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use url::Url;

/// Default number of retries after the first attempt
pub const DEFAULT_MAX_RETRIES: u32 = 3;

/// Default delay between attempts
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_secs(1);

/// Decision on whether to retry a failed fetch
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RetryDecision {
    /// Try again after `delay`; `attempt` is the 1-indexed attempt about to run
    Retry { delay: Duration, attempt: u32 },

    /// Stop and report the last error
    GiveUp { reason: String },
}

/// Bounded retries with a fixed inter-attempt delay
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    max_retries: u32,
    delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: DEFAULT_MAX_RETRIES,
            delay: DEFAULT_RETRY_DELAY,
        }
    }
}

impl RetryPolicy {
    pub fn new(max_retries: u32, delay: Duration) -> Self {
        Self { max_retries, delay }
    }

    pub fn max_retries(&self) -> u32 {
        self.max_retries
    }

    /// Total attempts for a URL that keeps failing transiently
    pub fn max_attempts(&self) -> u32 {
        self.max_retries + 1
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Decides what to do after `attempt` (1-indexed) failed with `error`
    pub fn decide(&self, error: &FetchError, attempt: u32) -> RetryDecision {
        if !error.is_retryable() {
            return RetryDecision::GiveUp {
                reason: format!("{} is not retryable", error),
            };
        }

        if attempt >= self.max_attempts() {
            return RetryDecision::GiveUp {
                reason: format!("exhausted {} attempts", self.max_attempts()),
            };
        }

        RetryDecision::Retry {
            delay: self.delay,
            attempt: attempt + 1,
        }
    }

    /// Fetches `url`, retrying transient failures
    ///
    /// Returns the first successful body, or the error of the last attempt.
    /// Once `interrupted` is set, the error at hand is returned instead of
    /// starting another attempt.
    pub async fn fetch_with_retry(
        &self,
        fetcher: &dyn Fetcher,
        url: &Url,
        timeout: Duration,
        interrupted: &AtomicBool,
    ) -> Result<String, FetchError> {
        let mut attempt = 1;

        loop {
            let error = match fetcher.fetch(url, timeout).await {
                Ok(body) => return Ok(body),
                Err(error) => error,
            };

            match self.decide(&error, attempt) {
                RetryDecision::Retry { delay, attempt: next } => {
                    if interrupted.load(Ordering::SeqCst) {
                        tracing::debug!("Interrupted, not retrying {}", url);
                        return Err(error);
                    }
                    tracing::warn!(
                        "{} while fetching {}, retrying (attempt {}/{})",
                        error,
                        url,
                        next,
                        self.max_attempts()
                    );
                    if !delay.is_zero() {
                        tokio::time::sleep(delay).await;
                        if interrupted.load(Ordering::SeqCst) {
                            tracing::debug!("Interrupted while waiting to retry {}", url);
                            return Err(error);
                        }
                    }
                    attempt = next;
                }
                RetryDecision::GiveUp { reason } => {
                    tracing::debug!("Giving up on {}: {}", url, reason);
                    return Err(error);
                }
            }
        }
    }
}
