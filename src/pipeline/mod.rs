//! The scrape, extract, categorize and score pipeline
//!
//! This module contains:
//! - [`RateLimiter`]: adaptive spacing of requests per key
//! - [`RetryPolicy`] and [`attempt_with_backoff`]: retry mechanics
//! - [`HttpFetcher`]: the reqwest-backed [`FetchProvider`]
//! - [`Pipeline`]: the per-URL state machine and batch runner

mod fetcher;
mod orchestrator;
mod rate_limiter;
mod record;
mod retry;

pub use fetcher::{
    build_http_client, FetchOutcome, FetchProvider, FetchRequest, HttpFetcher,
    MAX_RETRIES_EXCEEDED,
};
pub use orchestrator::Pipeline;
pub use rate_limiter::RateLimiter;
pub use record::{RecordError, ScoredRecord, WORKER_FAILED_REASON};
pub use retry::{attempt_with_backoff, Attempt, RetryOutcome, RetryPolicy};
