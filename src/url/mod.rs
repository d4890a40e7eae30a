//! URL handling module for Sumi-Sieve
//!
//! This module decides which URLs may be fetched at all, and maps accepted
//! URLs onto the keys the rate limiter tracks.

mod matcher;
mod validator;

use crate::config::RateLimitScope;
use url::Url;

// Re-export main types and functions
pub use matcher::{matches_any, matches_host_pattern};
pub use validator::UrlValidator;

/// Rate limiter key shared by every URL under [`RateLimitScope::Global`]
pub const GLOBAL_KEY: &str = "*";

/// Extracts the lowercase host from a URL
///
/// # Examples
///
/// ```
/// use url::Url;
/// use sumi_sieve::url::extract_host;
///
/// let url = Url::parse("https://Blog.Example.COM:8080/post").unwrap();
/// assert_eq!(extract_host(&url), Some("blog.example.com".to_string()));
/// ```
pub fn extract_host(url: &Url) -> Option<String> {
    url.host_str().map(|h| h.to_lowercase())
}

/// Returns the rate limiter key for a URL under the given scope
///
/// Per-domain keys are the lowercase host; URLs without a host fall back to
/// the global key.
pub fn rate_limit_key(url: &Url, scope: RateLimitScope) -> String {
    match scope {
        RateLimitScope::Global => GLOBAL_KEY.to_string(),
        RateLimitScope::PerDomain => extract_host(url).unwrap_or_else(|| GLOBAL_KEY.to_string()),
    }
}
