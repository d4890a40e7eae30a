/// Checks if a host matches a blocklist pattern
///
/// Two kinds of pattern are supported:
/// 1. Exact match: "example.com" matches only "example.com"
/// 2. Wildcard match: "*.example.com" matches the bare domain and every
///    subdomain below it, however deep
///
/// Both sides are compared case-insensitively, and a leading "www." is
/// ignored on both, so "www.Example.com" is caught by "example.com".
///
/// # Examples
///
/// ```
/// use sumi_sieve::url::matches_host_pattern;
///
/// assert!(matches_host_pattern("example.com", "www.example.com"));
/// assert!(matches_host_pattern("*.local", "printer.local"));
/// assert!(!matches_host_pattern("*.example.com", "myexample.com"));
/// ```
pub fn matches_host_pattern(pattern: &str, host: &str) -> bool {
    let pattern = strip_www(&pattern.to_ascii_lowercase());
    let host = strip_www(&host.to_ascii_lowercase());

    if let Some(base) = pattern.strip_prefix("*.") {
        host == base || host.ends_with(&format!(".{}", base))
    } else {
        host == pattern
    }
}

/// Returns true if the host matches any pattern in the list
pub fn matches_any<'a, I>(patterns: I, host: &str) -> bool
where
    I: IntoIterator<Item = &'a String>,
{
    patterns
        .into_iter()
        .any(|pattern| matches_host_pattern(pattern, host))
}

fn strip_www(host: &str) -> String {
    host.strip_prefix("www.").unwrap_or(host).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_match() {
        assert!(matches_host_pattern("example.com", "example.com"));
        assert!(!matches_host_pattern("example.com", "other.com"));
        assert!(!matches_host_pattern("example.com", "blog.example.com"));
    }

    #[test]
    fn test_wildcard_matches_bare_and_nested() {
        assert!(matches_host_pattern("*.example.com", "example.com"));
        assert!(matches_host_pattern("*.example.com", "blog.example.com"));
        assert!(matches_host_pattern("*.example.com", "api.v2.example.com"));
    }

    #[test]
    fn test_wildcard_no_partial_match() {
        assert!(!matches_host_pattern("*.example.com", "myexample.com"));
        assert!(!matches_host_pattern("*.example.com", "example.com.org"));
        assert!(!matches_host_pattern("*.local", "localhost"));
    }

    #[test]
    fn test_case_and_www_insensitive() {
        assert!(matches_host_pattern("example.com", "EXAMPLE.COM"));
        assert!(matches_host_pattern("example.com", "www.example.com"));
        assert!(matches_host_pattern("www.example.com", "example.com"));
    }

    #[test]
    fn test_matches_any() {
        let patterns = vec!["localhost".to_string(), "*.internal".to_string()];
        assert!(matches_any(&patterns, "localhost"));
        assert!(matches_any(&patterns, "db.corp.internal"));
        assert!(!matches_any(&patterns, "example.com"));
    }
}
