//! Sumi-Sieve: a polite page sifter
//!
//! This crate fetches a bounded list of web pages, extracts their readable text,
//! assigns each page a topic category and a quality score, and folds the results
//! into a batch report.

pub mod analyzer;
pub mod classify;
pub mod config;
pub mod extract;
pub mod output;
pub mod pipeline;
pub mod state;
pub mod url;

use serde::Serialize;
use std::fmt;
use thiserror::Error;

/// Main error type for Sumi-Sieve operations
///
/// Per-URL failures never surface through this type; they are recorded on the
/// URL's [`pipeline::ScoredRecord`]. Only setup and I/O around the batch fail here.
#[derive(Debug, Error)]
pub enum SieveError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("URL error: {0}")]
    UrlError(#[from] UrlError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("Output error: {0}")]
    Output(#[from] output::OutputError),

    #[error("Analyzer error: {0}")]
    Analysis(#[from] analyzer::AnalysisError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
///
/// These are the only errors that abort a batch, and they are raised before
/// any URL is processed.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),

    #[error("Invalid domain pattern: {0}")]
    InvalidPattern(String),
}

/// URL-specific errors
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum UrlError {
    #[error("URL must be a non-empty string")]
    Empty,

    #[error("URL exceeds maximum allowed length of {0} characters")]
    TooLong(usize),

    #[error("Only HTTP and HTTPS URLs are supported")]
    InvalidScheme,

    #[error("Invalid URL format: {0}")]
    Malformed(String),

    #[error("Missing host in URL")]
    MissingDomain,

    #[error("Host {0} is blocked for scraping")]
    Blocked(String),

    #[error("URL contains suspicious pattern '{0}'")]
    Suspicious(String),
}

/// Failure taxonomy attached to failed fetches and errored records
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// The URL was rejected before any network call (never retried)
    Validation,
    /// Connection failure or timeout (retried)
    Network,
    /// HTTP 429 (retried with a lengthened delay)
    RateLimit,
    /// HTTP 5xx (retried)
    Server,
    /// Non-retryable HTTP status or malformed response
    Http,
    /// The body could not be treated as HTML at all
    Extraction,
    /// The batch was stopped before this URL was fetched
    Cancelled,
}

impl ErrorKind {
    /// Returns true if a fetch failing with this kind may be attempted again
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Network | Self::RateLimit | Self::Server)
    }

    /// Stable snake_case name used in exports and reports
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Validation => "validation",
            Self::Network => "network",
            Self::RateLimit => "rate_limit",
            Self::Server => "server",
            Self::Http => "http",
            Self::Extraction => "extraction",
            Self::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result type alias for Sumi-Sieve operations
pub type Result<T> = std::result::Result<T, SieveError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for URL operations
pub type UrlResult<T> = std::result::Result<T, UrlError>;

// Re-export commonly used types
pub use config::Config;
pub use pipeline::{Pipeline, ScoredRecord};
pub use state::UrlState;
pub use url::UrlValidator;
