//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for the pipeline, including:
//! - Building the HTTP client with the configured user agent and headers
//! - Spacing requests through the shared [`RateLimiter`]
//! - Retrying transient failures with exponential backoff
//! - Classifying failures into [`ErrorKind`]s
//! - Enforcing the response body size cap

use super::rate_limiter::RateLimiter;
use super::retry::{attempt_with_backoff, Attempt, RetryOutcome, RetryPolicy};
use crate::config::{Config, ScraperConfig};
use crate::url::rate_limit_key;
use crate::ErrorKind;
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, ACCEPT, ACCEPT_LANGUAGE};
use reqwest::{redirect::Policy, Client};
use std::sync::Arc;
use std::time::{Duration, Instant};
use url::Url;

/// Reason recorded when every attempt failed transiently
pub const MAX_RETRIES_EXCEEDED: &str = "max_retries_exceeded";

const MAX_REDIRECTS: usize = 10;

/// Immutable description of one fetch
#[derive(Debug, Clone)]
pub struct FetchRequest {
    pub url: Url,
    pub timeout: Duration,
    /// Extra headers sent on top of the client defaults
    pub headers: HeaderMap,
    pub max_retries: u32,
}

impl FetchRequest {
    pub fn new(url: Url, timeout: Duration, max_retries: u32) -> Self {
        Self {
            url,
            timeout,
            headers: HeaderMap::new(),
            max_retries,
        }
    }

    pub fn with_header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }
}

/// Result of a fetch, after all retries
#[derive(Debug, Clone, PartialEq)]
pub enum FetchOutcome {
    Success {
        status_code: u16,
        body: String,
        elapsed: Duration,
        /// URL after redirects
        final_url: String,
        attempts_made: u32,
    },

    Failure {
        reason: String,
        kind: ErrorKind,
        /// Status of the last response received, if any
        last_status_code: Option<u16>,
        attempts_made: u32,
    },
}

impl FetchOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    /// Status of the final response, if one was received
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Success { status_code, .. } => Some(*status_code),
            Self::Failure {
                last_status_code, ..
            } => *last_status_code,
        }
    }
}

/// Anything that can turn a [`FetchRequest`] into a [`FetchOutcome`]
///
/// Failures are reported through the outcome, never as a panic or error.
#[async_trait]
pub trait FetchProvider: Send + Sync {
    async fn fetch(&self, request: &FetchRequest) -> FetchOutcome;
}

/// Builds an HTTP client with proper configuration
///
/// # Arguments
///
/// * `config` - The scraper configuration
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(reqwest::Error)` - Failed to build client
///
/// # Example
///
/// ```no_run
/// use sumi_sieve::config::ScraperConfig;
/// use sumi_sieve::pipeline::build_http_client;
///
/// let client = build_http_client(&ScraperConfig::default()).unwrap();
/// ```
pub fn build_http_client(config: &ScraperConfig) -> Result<Client, reqwest::Error> {
    let mut headers = HeaderMap::new();
    headers.insert(
        ACCEPT,
        HeaderValue::from_static("text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8"),
    );
    headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.5"));

    Client::builder()
        .user_agent(config.user_agent.as_str())
        .default_headers(headers)
        .timeout(Duration::from_secs(config.timeout_secs))
        .connect_timeout(Duration::from_secs(10))
        .redirect(Policy::limited(MAX_REDIRECTS))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Body and metadata of a successful attempt
#[derive(Debug)]
struct Fetched {
    status_code: u16,
    body: String,
    elapsed: Duration,
    final_url: String,
}

/// Why a single attempt failed
#[derive(Debug)]
struct AttemptError {
    kind: ErrorKind,
    reason: String,
    status: Option<u16>,
}

impl AttemptError {
    fn new(kind: ErrorKind, reason: impl Into<String>, status: Option<u16>) -> Self {
        Self {
            kind,
            reason: reason.into(),
            status,
        }
    }
}

/// reqwest-backed fetch provider
///
/// # Retry Logic
///
/// | Condition | Kind | Action |
/// |-----------|------|--------|
/// | Timeout / connection error | Network | Retry |
/// | Body read stalled or dropped | Network | Retry |
/// | HTTP 429 | RateLimit | Retry |
/// | HTTP 5xx | Server | Retry |
/// | HTTP 403, 404, other status | Http | Stop |
/// | Redirect limit exceeded | Http | Stop |
/// | Body malformed or too large | Http | Stop |
///
/// Status codes are retried only if listed in the policy's retryable codes.
pub struct HttpFetcher {
    client: Client,
    limiter: Arc<RateLimiter>,
    policy: RetryPolicy,
    max_body_bytes: u64,
}

impl HttpFetcher {
    pub fn new(
        client: Client,
        limiter: Arc<RateLimiter>,
        policy: RetryPolicy,
        max_body_bytes: u64,
    ) -> Self {
        Self {
            client,
            limiter,
            policy,
            max_body_bytes,
        }
    }

    /// Builds a fetcher, its client and its rate limiter from a full config
    pub fn from_config(config: &Config) -> Result<Self, reqwest::Error> {
        Ok(Self::new(
            build_http_client(&config.scraper)?,
            Arc::new(RateLimiter::new(config.rate_limit.clone())),
            RetryPolicy::from_config(&config.scraper, &config.retry),
            config.scraper.max_body_bytes,
        ))
    }

    pub fn limiter(&self) -> &Arc<RateLimiter> {
        &self.limiter
    }

    async fn attempt(
        &self,
        request: &FetchRequest,
        key: &str,
        attempt: u32,
    ) -> Attempt<Fetched, AttemptError> {
        self.limiter.wait_if_needed(key).await;
        tracing::trace!("Fetching {} (attempt {})", request.url, attempt + 1);

        let start = Instant::now();
        let response = match self
            .client
            .get(request.url.clone())
            .timeout(request.timeout)
            .headers(request.headers.clone())
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => {
                self.limiter.record_outcome(key, None, start.elapsed()).await;
                return classify_send_error(&e);
            }
        };

        let status = response.status().as_u16();
        let final_url = response.url().to_string();

        if !response.status().is_success() {
            self.limiter
                .record_outcome(key, Some(status), start.elapsed())
                .await;
            return self.classify_status(status);
        }

        if let Some(length) = response.content_length() {
            if length > self.max_body_bytes {
                self.limiter
                    .record_outcome(key, Some(status), start.elapsed())
                    .await;
                return Attempt::Fail(body_too_large(length, self.max_body_bytes, status));
            }
        }

        let bytes = response.bytes().await;
        let elapsed = start.elapsed();
        self.limiter.record_outcome(key, Some(status), elapsed).await;

        let bytes = match bytes {
            Ok(bytes) => bytes,
            Err(e) => return classify_body_error(&e, status),
        };

        // Content-Length may be missing or wrong
        if bytes.len() as u64 > self.max_body_bytes {
            return Attempt::Fail(body_too_large(
                bytes.len() as u64,
                self.max_body_bytes,
                status,
            ));
        }

        Attempt::Done(Fetched {
            status_code: status,
            body: String::from_utf8_lossy(&bytes).into_owned(),
            elapsed,
            final_url,
        })
    }

    fn classify_status(&self, status: u16) -> Attempt<Fetched, AttemptError> {
        let kind = match status {
            429 => ErrorKind::RateLimit,
            500..=599 => ErrorKind::Server,
            _ => ErrorKind::Http,
        };
        let error = AttemptError::new(kind, format!("HTTP {}", status), Some(status));

        if self.policy.is_retryable_status(status) {
            Attempt::Retry(error)
        } else {
            Attempt::Fail(error)
        }
    }
}

fn classify_send_error(e: &reqwest::Error) -> Attempt<Fetched, AttemptError> {
    if e.is_timeout() {
        Attempt::Retry(AttemptError::new(ErrorKind::Network, "request timed out", None))
    } else if e.is_redirect() {
        Attempt::Fail(AttemptError::new(
            ErrorKind::Http,
            format!("redirect error: {}", e),
            None,
        ))
    } else if e.is_connect() {
        Attempt::Retry(AttemptError::new(
            ErrorKind::Network,
            format!("connection failed: {}", e),
            None,
        ))
    } else {
        Attempt::Retry(AttemptError::new(ErrorKind::Network, e.to_string(), None))
    }
}

/// A stalled or dropped body is transient; anything else is a malformed response
fn classify_body_error(e: &reqwest::Error, status: u16) -> Attempt<Fetched, AttemptError> {
    if e.is_timeout() {
        Attempt::Retry(AttemptError::new(
            ErrorKind::Network,
            "request timed out",
            Some(status),
        ))
    } else if e.is_connect() || e.is_body() {
        Attempt::Retry(AttemptError::new(
            ErrorKind::Network,
            format!("connection lost while reading body: {}", e),
            Some(status),
        ))
    } else {
        Attempt::Fail(AttemptError::new(
            ErrorKind::Http,
            format!("malformed response: {}", e),
            Some(status),
        ))
    }
}

fn body_too_large(size: u64, limit: u64, status: u16) -> AttemptError {
    AttemptError::new(
        ErrorKind::Http,
        format!("response body of {} bytes exceeds limit of {} bytes", size, limit),
        Some(status),
    )
}

#[async_trait]
impl FetchProvider for HttpFetcher {
    async fn fetch(&self, request: &FetchRequest) -> FetchOutcome {
        let key = rate_limit_key(&request.url, self.limiter.scope());
        let key = key.as_str();
        let policy = self.policy.with_max_retries(request.max_retries);

        let outcome =
            attempt_with_backoff(&policy, |attempt| self.attempt(request, key, attempt)).await;

        match outcome {
            RetryOutcome::Success { value, attempts } => {
                tracing::debug!(
                    "Fetched {} (HTTP {}) in {} attempt(s)",
                    request.url,
                    value.status_code,
                    attempts
                );
                FetchOutcome::Success {
                    status_code: value.status_code,
                    body: value.body,
                    elapsed: value.elapsed,
                    final_url: value.final_url,
                    attempts_made: attempts,
                }
            }
            RetryOutcome::Failed { error, attempts } => FetchOutcome::Failure {
                reason: error.reason,
                kind: error.kind,
                last_status_code: error.status,
                attempts_made: attempts,
            },
            RetryOutcome::Exhausted { error, attempts } => {
                tracing::debug!(
                    "Giving up on {} after {} attempts: {}",
                    request.url,
                    attempts,
                    error.reason
                );
                FetchOutcome::Failure {
                    reason: MAX_RETRIES_EXCEEDED.to_string(),
                    kind: error.kind,
                    last_status_code: error.status,
                    attempts_made: attempts,
                }
            }
        }
    }
}
