use serde::Deserialize;

/// Main configuration structure for Sumi-Sieve
///
/// Every section is optional in the TOML file and falls back to its defaults.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub scraper: ScraperConfig,
    pub retry: RetryConfig,
    #[serde(rename = "rate-limit")]
    pub rate_limit: RateLimitConfig,
    pub extractor: ExtractorConfig,
    pub quality: QualityConfig,
    pub validator: ValidatorConfig,
    pub output: OutputConfig,
    pub input: InputConfig,
    /// Custom category table; the built-in table is used when empty
    pub categories: Vec<CategoryEntry>,
    /// Optional AI analysis collaborator
    pub analysis: Option<AnalysisConfig>,
}

/// Fetch behavior configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct ScraperConfig {
    /// Per-request timeout (seconds)
    pub timeout_secs: u64,

    /// Retries after the initial attempt for transient failures
    pub max_retries: u32,

    /// User agent sent with every request
    pub user_agent: String,

    /// Responses larger than this are rejected without retrying
    pub max_body_bytes: u64,

    /// Number of concurrent workers (1 = sequential)
    pub workers: u32,
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 30,
            max_retries: 3,
            user_agent: format!(
                "SumiSieve/{} (+https://github.com/sumi-sieve)",
                env!("CARGO_PKG_VERSION")
            ),
            max_body_bytes: 5 * 1024 * 1024,
            workers: 1,
        }
    }
}

/// Backoff between attempts of the same request
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct RetryConfig {
    /// Backoff before the first retry (milliseconds); doubles per attempt
    pub base_delay_ms: u64,

    /// Upper bound on a single backoff (milliseconds)
    pub max_delay_ms: u64,

    /// HTTP status codes worth retrying
    pub retryable_status_codes: Vec<u16>,
}

impl Default for RetryConfig {
    fn default() -> Self {
        let mut codes = vec![429];
        codes.extend(500..=599);
        Self {
            base_delay_ms: 1000,
            max_delay_ms: 30_000,
            retryable_status_codes: codes,
        }
    }
}

/// Whether the rate limiter tracks one global key or one key per domain
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RateLimitScope {
    Global,
    PerDomain,
}

/// Spacing between outbound requests
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct RateLimitConfig {
    pub scope: RateLimitScope,

    /// Starting delay between requests for each key (milliseconds)
    pub base_delay_ms: u64,

    /// Adapt the delay to 429s, repeated 5xx, and sustained fast successes
    pub adaptive: bool,

    /// Floor for the decayed delay (milliseconds)
    pub min_delay_ms: u64,

    /// Cap for delays grown by HTTP 429 (milliseconds)
    pub max_delay_ms: u64,

    /// Cap for delays grown by repeated 5xx (milliseconds)
    pub server_error_max_delay_ms: u64,

    /// Number of recent outcomes considered for decay
    pub success_window: usize,

    /// Multiplier applied on decay
    pub decay_factor: f64,

    /// Responses faster than this count as fast (milliseconds)
    pub fast_response_ms: u64,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            scope: RateLimitScope::PerDomain,
            base_delay_ms: 1000,
            adaptive: true,
            min_delay_ms: 100,
            max_delay_ms: 60_000,
            server_error_max_delay_ms: 30_000,
            success_window: 10,
            decay_factor: 0.9,
            fast_response_ms: 2000,
        }
    }
}

/// Content extraction thresholds
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct ExtractorConfig {
    /// Minimum characters of text for a container to count as content
    pub min_text_length: usize,

    /// Minimum text-to-markup ratio for a container to count as content
    pub min_text_ratio: f64,

    /// Body text beyond this many characters is truncated
    pub max_content_chars: usize,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            min_text_length: 100,
            min_text_ratio: 0.25,
            max_content_chars: 10_000,
        }
    }
}

/// Quality scoring thresholds
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct QualityConfig {
    pub min_title_chars: usize,
    pub low_word_count: usize,
    pub medium_word_count: usize,
}

impl Default for QualityConfig {
    fn default() -> Self {
        Self {
            min_title_chars: 10,
            low_word_count: 50,
            medium_word_count: 150,
        }
    }
}

/// URL acceptance rules
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct ValidatorConfig {
    pub max_url_length: usize,

    /// Reject loopback and unspecified IP hosts
    pub block_loopback: bool,

    /// Host patterns for local and internal names
    pub blocked_hosts: Vec<String>,

    /// Additional domains never to scrape (supports "*.example.com")
    pub blocked_domains: Vec<String>,

    /// Case-insensitive regexes; a URL matching any of them is rejected
    pub suspicious_patterns: Vec<String>,
}

impl Default for ValidatorConfig {
    fn default() -> Self {
        Self {
            max_url_length: 2048,
            block_loopback: true,
            blocked_hosts: [
                "localhost",
                "*.localhost",
                "*.local",
                "*.internal",
                "*.lan",
                "*.home.arpa",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
            blocked_domains: Vec::new(),
            suspicious_patterns: [
                "login", "auth", "admin", "private", r"\.exe$", r"\.zip$", r"\.pdf$",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
        }
    }
}

/// Output configuration
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct OutputConfig {
    /// Where to write the JSON export
    pub json_path: Option<String>,

    /// Where to write the CSV export
    pub csv_path: Option<String>,

    /// Where to write the XML export
    pub xml_path: Option<String>,

    /// Where to write the markdown batch report
    pub report_path: Option<String>,
}

/// URLs to process
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct InputConfig {
    pub urls: Vec<String>,
}

/// A category and its keywords, in table order
#[derive(Debug, Clone, Deserialize)]
pub struct CategoryEntry {
    pub label: String,
    pub keywords: Vec<KeywordEntry>,
}

/// Either a bare keyword (weight 1) or a `{ term, weight }` table
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum KeywordEntry {
    Plain(String),
    Weighted { term: String, weight: u32 },
}

/// Settings for the OpenAI-compatible analysis collaborator
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct AnalysisConfig {
    pub enabled: bool,

    /// Base URL of the chat completions API
    pub endpoint: String,

    pub model: String,

    /// Environment variable holding the API key
    pub api_key_env: String,

    /// Body text sent to the analyzer is truncated to this many characters
    pub max_content_chars: usize,

    /// Analyzer results below this confidence do not override the core outputs
    pub min_confidence: f64,

    pub timeout_secs: u64,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            endpoint: "https://api.openai.com/v1".to_string(),
            model: "gpt-4.1-nano".to_string(),
            api_key_env: "OPENAI_API_KEY".to_string(),
            max_content_chars: 4000,
            min_confidence: 0.5,
            timeout_secs: 60,
        }
    }
}
