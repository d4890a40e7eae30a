//! Configuration module for Sumi-Sieve
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//! Every section has defaults, so an empty file is a valid configuration.
//!
//! # Example
//!
//! ```no_run
//! use sumi_sieve::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("sieve.toml")).unwrap();
//! println!("Workers: {}", config.scraper.workers);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    AnalysisConfig, CategoryEntry, Config, ExtractorConfig, InputConfig, KeywordEntry,
    OutputConfig, QualityConfig, RateLimitConfig, RateLimitScope, RetryConfig, ScraperConfig,
    ValidatorConfig,
};

// Re-export parser functions
pub use parser::{
    compute_config_hash, load_config, load_config_with_hash, load_url_list, parse_config,
    parse_url_list,
};
