use crate::config::ValidatorConfig;
use crate::url::matcher::matches_any;
use crate::UrlError;
use once_cell::sync::Lazy;
use regex::Regex;
use url::{Host, Url};

/// One DNS label: alphanumeric, hyphens allowed inside but not at either end
static LABEL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-z0-9]([a-z0-9-]{0,61}[a-z0-9])?$").unwrap());

static TLD: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[a-z]{2,63}$").unwrap());

/// Accepts or rejects candidate URLs before any network call
///
/// The validator is a pure function of its input and the static rules it was
/// built with; it holds no mutable state and can be shared freely.
#[derive(Debug, Clone)]
pub struct UrlValidator {
    config: ValidatorConfig,
    suspicious: Vec<Regex>,
}

impl UrlValidator {
    /// Builds a validator; suspicious patterns that are not valid regexes are skipped
    pub fn new(config: ValidatorConfig) -> Self {
        let suspicious = config
            .suspicious_patterns
            .iter()
            .filter_map(|pattern| match Regex::new(&format!("(?i){}", pattern)) {
                Ok(regex) => Some(regex),
                Err(e) => {
                    tracing::warn!("Ignoring suspicious pattern '{}': {}", pattern, e);
                    None
                }
            })
            .collect();

        Self { config, suspicious }
    }

    /// Validates a URL, returning `(is_valid, reason)`
    ///
    /// Never fails: every rejection is reported as `(false, <reason>)`. Valid
    /// URLs report `(true, "URL is valid")`.
    ///
    /// # Examples
    ///
    /// ```
    /// use sumi_sieve::config::ValidatorConfig;
    /// use sumi_sieve::url::UrlValidator;
    ///
    /// let validator = UrlValidator::new(ValidatorConfig::default());
    /// assert!(validator.validate("https://example.com/page").0);
    /// assert!(!validator.validate("ftp://x.com").0);
    /// assert!(!validator.validate("https://localhost:8000").0);
    /// ```
    pub fn validate(&self, url: &str) -> (bool, String) {
        match self.check(url) {
            Ok(_) => (true, "URL is valid".to_string()),
            Err(e) => (false, e.to_string()),
        }
    }

    /// Validates a URL and returns the parsed form
    ///
    /// # Returns
    ///
    /// * `Ok(Url)` - The parsed URL, safe to hand to a fetcher
    /// * `Err(UrlError)` - The first rule the URL broke
    pub fn check(&self, url: &str) -> Result<Url, UrlError> {
        let url = url.trim();

        if url.is_empty() {
            return Err(UrlError::Empty);
        }

        if url.len() > self.config.max_url_length {
            return Err(UrlError::TooLong(self.config.max_url_length));
        }

        let lower = url.to_ascii_lowercase();
        if !lower.starts_with("http://") && !lower.starts_with("https://") {
            return Err(UrlError::InvalidScheme);
        }

        if url.chars().any(char::is_whitespace) {
            return Err(UrlError::Malformed("URL contains whitespace".to_string()));
        }

        let parsed = Url::parse(url).map_err(|e| UrlError::Malformed(e.to_string()))?;

        let host = parsed.host().ok_or(UrlError::MissingDomain)?;
        match host {
            Host::Domain(domain) => self.check_domain(domain)?,
            Host::Ipv4(ip) => {
                if self.config.block_loopback && (ip.is_loopback() || ip.is_unspecified()) {
                    return Err(UrlError::Blocked(ip.to_string()));
                }
            }
            Host::Ipv6(ip) => {
                if self.config.block_loopback && (ip.is_loopback() || ip.is_unspecified()) {
                    return Err(UrlError::Blocked(ip.to_string()));
                }
            }
        }

        if let Some(regex) = self.suspicious.iter().find(|regex| regex.is_match(url)) {
            let pattern = regex.as_str().trim_start_matches("(?i)");
            return Err(UrlError::Suspicious(pattern.to_string()));
        }

        Ok(parsed)
    }

    fn check_domain(&self, domain: &str) -> Result<(), UrlError> {
        let domain = domain.trim_end_matches('.');

        // Blocklist first so "localhost" reads as blocked rather than malformed
        if matches_any(&self.config.blocked_hosts, domain)
            || matches_any(&self.config.blocked_domains, domain)
        {
            return Err(UrlError::Blocked(domain.to_string()));
        }

        let labels: Vec<&str> = domain.split('.').collect();
        if labels.len() < 2 {
            return Err(UrlError::Malformed(format!(
                "host '{}' is not a fully qualified domain",
                domain
            )));
        }

        if let Some(bad) = labels.iter().find(|label| !LABEL.is_match(label)) {
            return Err(UrlError::Malformed(format!(
                "invalid host label '{}' in '{}'",
                bad, domain
            )));
        }

        // Punycode TLDs ("xn--...") are accepted alongside alphabetic ones
        let tld = labels[labels.len() - 1];
        if !TLD.is_match(tld) && !tld.starts_with("xn--") {
            return Err(UrlError::Malformed(format!(
                "invalid top-level domain '{}'",
                tld
            )));
        }

        Ok(())
    }
}

impl Default for UrlValidator {
    fn default() -> Self {
        Self::new(ValidatorConfig::default())
    }
}
