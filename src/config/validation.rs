use crate::config::types::{
    AnalysisConfig, CategoryEntry, Config, ExtractorConfig, KeywordEntry, QualityConfig,
    RateLimitConfig, RetryConfig, ScraperConfig, ValidatorConfig,
};
use crate::ConfigError;
use regex::Regex;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_scraper_config(&config.scraper)?;
    validate_retry_config(&config.retry)?;
    validate_rate_limit_config(&config.rate_limit)?;
    validate_extractor_config(&config.extractor)?;
    validate_quality_config(&config.quality)?;
    validate_validator_config(&config.validator)?;
    validate_categories(&config.categories)?;
    if let Some(analysis) = &config.analysis {
        validate_analysis_config(analysis)?;
    }
    Ok(())
}

fn validate_scraper_config(config: &ScraperConfig) -> Result<(), ConfigError> {
    if config.timeout_secs < 1 || config.timeout_secs > 600 {
        return Err(ConfigError::Validation(format!(
            "timeout_secs must be between 1 and 600, got {}",
            config.timeout_secs
        )));
    }

    if config.max_retries > 10 {
        return Err(ConfigError::Validation(format!(
            "max_retries must be <= 10, got {}",
            config.max_retries
        )));
    }

    if config.workers < 1 || config.workers > 100 {
        return Err(ConfigError::Validation(format!(
            "workers must be between 1 and 100, got {}",
            config.workers
        )));
    }

    if config.user_agent.trim().is_empty() {
        return Err(ConfigError::Validation(
            "user_agent cannot be empty".to_string(),
        ));
    }

    if config.max_body_bytes == 0 {
        return Err(ConfigError::Validation(
            "max_body_bytes must be > 0".to_string(),
        ));
    }

    Ok(())
}

fn validate_retry_config(config: &RetryConfig) -> Result<(), ConfigError> {
    if config.max_delay_ms < config.base_delay_ms {
        return Err(ConfigError::Validation(format!(
            "retry max_delay_ms ({}) must be >= base_delay_ms ({})",
            config.max_delay_ms, config.base_delay_ms
        )));
    }

    if let Some(code) = config
        .retryable_status_codes
        .iter()
        .find(|code| !(100..=599).contains(*code))
    {
        return Err(ConfigError::Validation(format!(
            "retryable_status_codes contains invalid HTTP status {}",
            code
        )));
    }

    Ok(())
}

fn validate_rate_limit_config(config: &RateLimitConfig) -> Result<(), ConfigError> {
    if config.min_delay_ms < 100 {
        return Err(ConfigError::Validation(format!(
            "min_delay_ms must be >= 100ms, got {}ms",
            config.min_delay_ms
        )));
    }

    if config.base_delay_ms < config.min_delay_ms {
        return Err(ConfigError::Validation(format!(
            "base_delay_ms ({}) must be >= min_delay_ms ({})",
            config.base_delay_ms, config.min_delay_ms
        )));
    }

    if config.max_delay_ms < config.base_delay_ms
        || config.server_error_max_delay_ms < config.base_delay_ms
    {
        return Err(ConfigError::Validation(
            "rate-limit delay caps must be >= base_delay_ms".to_string(),
        ));
    }

    if !(config.decay_factor > 0.0 && config.decay_factor < 1.0) {
        return Err(ConfigError::Validation(format!(
            "decay_factor must be in (0, 1), got {}",
            config.decay_factor
        )));
    }

    if config.success_window < 1 {
        return Err(ConfigError::Validation(
            "success_window must be >= 1".to_string(),
        ));
    }

    Ok(())
}

fn validate_extractor_config(config: &ExtractorConfig) -> Result<(), ConfigError> {
    if !(0.0..=1.0).contains(&config.min_text_ratio) {
        return Err(ConfigError::Validation(format!(
            "min_text_ratio must be between 0 and 1, got {}",
            config.min_text_ratio
        )));
    }

    if config.max_content_chars < config.min_text_length {
        return Err(ConfigError::Validation(format!(
            "max_content_chars ({}) must be >= min_text_length ({})",
            config.max_content_chars, config.min_text_length
        )));
    }

    Ok(())
}

fn validate_quality_config(config: &QualityConfig) -> Result<(), ConfigError> {
    if config.low_word_count > config.medium_word_count {
        return Err(ConfigError::Validation(format!(
            "low_word_count ({}) must be <= medium_word_count ({})",
            config.low_word_count, config.medium_word_count
        )));
    }
    Ok(())
}

fn validate_validator_config(config: &ValidatorConfig) -> Result<(), ConfigError> {
    if config.max_url_length < 10 {
        return Err(ConfigError::Validation(format!(
            "max_url_length must be >= 10, got {}",
            config.max_url_length
        )));
    }

    for pattern in config.blocked_hosts.iter().chain(&config.blocked_domains) {
        validate_host_pattern(pattern)?;
    }

    for pattern in &config.suspicious_patterns {
        if let Err(e) = Regex::new(pattern) {
            return Err(ConfigError::Validation(format!(
                "suspicious pattern '{}' is not a valid regex: {}",
                pattern, e
            )));
        }
    }

    Ok(())
}

fn validate_categories(categories: &[CategoryEntry]) -> Result<(), ConfigError> {
    let mut seen = std::collections::HashSet::new();

    for category in categories {
        let label = category.label.trim();
        if label.is_empty() {
            return Err(ConfigError::Validation(
                "category label cannot be empty".to_string(),
            ));
        }

        if !seen.insert(label.to_lowercase()) {
            return Err(ConfigError::Validation(format!(
                "category '{}' is declared more than once",
                label
            )));
        }

        if category.keywords.is_empty() {
            return Err(ConfigError::Validation(format!(
                "category '{}' must have at least one keyword",
                label
            )));
        }

        for keyword in &category.keywords {
            let (term, weight) = match keyword {
                KeywordEntry::Plain(term) => (term, 1),
                KeywordEntry::Weighted { term, weight } => (term, *weight),
            };
            if term.trim().is_empty() {
                return Err(ConfigError::Validation(format!(
                    "category '{}' contains an empty keyword",
                    label
                )));
            }
            if weight == 0 {
                return Err(ConfigError::Validation(format!(
                    "keyword '{}' in category '{}' must have weight >= 1",
                    term, label
                )));
            }
        }
    }

    Ok(())
}

fn validate_analysis_config(config: &AnalysisConfig) -> Result<(), ConfigError> {
    if !config.enabled {
        return Ok(());
    }

    let endpoint = Url::parse(&config.endpoint)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid analysis endpoint: {}", e)))?;
    if endpoint.scheme() != "http" && endpoint.scheme() != "https" {
        return Err(ConfigError::InvalidUrl(format!(
            "Analysis endpoint '{}' must use HTTP or HTTPS",
            config.endpoint
        )));
    }

    if config.model.trim().is_empty() {
        return Err(ConfigError::Validation(
            "analysis model cannot be empty".to_string(),
        ));
    }

    if !(0.0..=1.0).contains(&config.min_confidence) {
        return Err(ConfigError::Validation(format!(
            "min_confidence must be between 0 and 1, got {}",
            config.min_confidence
        )));
    }

    Ok(())
}

/// Validates a host pattern (supports a leading "*." wildcard)
fn validate_host_pattern(pattern: &str) -> Result<(), ConfigError> {
    let host = pattern.strip_prefix("*.").unwrap_or(pattern);

    if host.is_empty() {
        return Err(ConfigError::InvalidPattern(format!(
            "Host pattern '{}' is empty",
            pattern
        )));
    }

    if !host
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '.' || c == '-')
    {
        return Err(ConfigError::InvalidPattern(format!(
            "Host pattern '{}' contains invalid characters",
            pattern
        )));
    }

    if host.starts_with('.') || host.ends_with('.') || host.contains("..") {
        return Err(ConfigError::InvalidPattern(format!(
            "Host pattern '{}' has misplaced dots",
            pattern
        )));
    }

    Ok(())
}
