//! Retry policy and the generic attempt-with-backoff helper
//!
//! Retry mechanics live here, apart from any HTTP specifics: the fetcher
//! classifies each attempt, this module decides whether and when to go again.

use crate::config::{RetryConfig, ScraperConfig};
use std::future::Future;
use std::time::Duration;

/// Highest exponent used in `base * 2^attempt`
const MAX_BACKOFF_EXPONENT: u32 = 16;

/// How many times to retry, and how long to wait between attempts
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries after the initial attempt
    pub max_retries: u32,
    /// Backoff before the first retry
    pub base_delay: Duration,
    /// Upper bound on a single backoff
    pub max_delay: Duration,
    /// HTTP status codes worth retrying
    pub retryable_status_codes: Vec<u16>,
}

impl RetryPolicy {
    pub fn from_config(scraper: &ScraperConfig, retry: &RetryConfig) -> Self {
        Self {
            max_retries: scraper.max_retries,
            base_delay: Duration::from_millis(retry.base_delay_ms),
            max_delay: Duration::from_millis(retry.max_delay_ms),
            retryable_status_codes: retry.retryable_status_codes.clone(),
        }
    }

    /// Same policy with a different retry budget
    pub fn with_max_retries(&self, max_retries: u32) -> Self {
        Self {
            max_retries,
            ..self.clone()
        }
    }

    /// Total attempts allowed: the initial one plus every retry
    pub fn max_attempts(&self) -> u32 {
        self.max_retries + 1
    }

    /// Backoff before retry number `attempt + 1`: `base * 2^attempt`, capped
    pub fn backoff_delay(&self, attempt: u32) -> Duration {
        let exponent = attempt.min(MAX_BACKOFF_EXPONENT);
        self.base_delay
            .saturating_mul(2_u32.saturating_pow(exponent))
            .min(self.max_delay)
    }

    pub fn is_retryable_status(&self, status: u16) -> bool {
        self.retryable_status_codes.contains(&status)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from_config(&ScraperConfig::default(), &RetryConfig::default())
    }
}

/// How a single attempt ended
#[derive(Debug, Clone, PartialEq)]
pub enum Attempt<T, E> {
    /// Succeeded; stop
    Done(T),
    /// Failed transiently; go again if budget remains
    Retry(E),
    /// Failed for good; stop
    Fail(E),
}

/// How a whole attempt sequence ended
#[derive(Debug, Clone, PartialEq)]
pub enum RetryOutcome<T, E> {
    Success { value: T, attempts: u32 },
    /// A non-retryable failure stopped the sequence early
    Failed { error: E, attempts: u32 },
    /// Every attempt failed transiently
    Exhausted { error: E, attempts: u32 },
}

impl<T, E> RetryOutcome<T, E> {
    pub fn attempts(&self) -> u32 {
        match self {
            Self::Success { attempts, .. }
            | Self::Failed { attempts, .. }
            | Self::Exhausted { attempts, .. } => *attempts,
        }
    }
}

/// Runs `op` until it succeeds, fails fatally, or exhausts the policy
///
/// `op` receives the zero-based attempt number. Between a transient failure
/// and the next attempt the helper sleeps for [`RetryPolicy::backoff_delay`].
pub async fn attempt_with_backoff<T, E, F, Fut>(policy: &RetryPolicy, mut op: F) -> RetryOutcome<T, E>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Attempt<T, E>>,
{
    let mut attempt = 0;
    loop {
        match op(attempt).await {
            Attempt::Done(value) => {
                return RetryOutcome::Success {
                    value,
                    attempts: attempt + 1,
                }
            }
            Attempt::Fail(error) => {
                return RetryOutcome::Failed {
                    error,
                    attempts: attempt + 1,
                }
            }
            Attempt::Retry(error) => {
                if attempt >= policy.max_retries {
                    return RetryOutcome::Exhausted {
                        error,
                        attempts: attempt + 1,
                    };
                }
                let delay = policy.backoff_delay(attempt);
                tracing::debug!(
                    "Attempt {} of {} failed, retrying in {:?}",
                    attempt + 1,
                    policy.max_attempts(),
                    delay
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
        }
    }
}
