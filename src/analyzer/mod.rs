//! Optional AI content analysis
//!
//! An analyzer is an external collaborator consulted after scoring. When its
//! confidence clears the configured threshold, its category and quality score
//! replace the keyword categorizer's and quality scorer's; the full analysis is
//! attached to the record either way. Analyzer failures never fail a URL.

mod openai;

pub use openai::OpenAiAnalyzer;

use crate::classify::{CategoryAssignment, MAX_SCORE, MIN_SCORE};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Analyzer errors
#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("API key environment variable {0} is not set")]
    MissingApiKey(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Analyzer API error (HTTP {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Failed to parse analyzer response: {0}")]
    Parse(String),
}

/// Analysis returned by an analyzer
///
/// `confidence` and `quality_score` are fractions in [0, 1].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub category: String,

    #[serde(default)]
    pub confidence: f64,

    #[serde(default)]
    pub quality_score: f64,

    #[serde(default, alias = "keywords")]
    pub key_topics: Vec<String>,

    #[serde(default = "default_sentiment")]
    pub sentiment: String,

    #[serde(default, alias = "reasoning")]
    pub summary: String,
}

fn default_sentiment() -> String {
    "neutral".to_string()
}

impl AnalysisResult {
    /// Clamps the fractional fields into [0, 1] and normalizes the category label
    pub fn normalized(mut self) -> Self {
        self.category = self.category.trim().to_lowercase();
        self.confidence = clamp_fraction(self.confidence);
        self.quality_score = clamp_fraction(self.quality_score);
        self
    }

    /// Returns true if the analysis is confident enough to override core outputs
    pub fn is_confident(&self, min_confidence: f64) -> bool {
        self.confidence >= min_confidence
    }

    /// Overrides the category label and quality score when confident
    ///
    /// The quality score is rescaled to 0-100. An empty category leaves the
    /// label alone. Returns true if anything was overridden.
    pub fn apply(
        &self,
        assignment: &mut CategoryAssignment,
        quality_score: &mut f64,
        min_confidence: f64,
    ) -> bool {
        if !self.is_confident(min_confidence) {
            return false;
        }

        if !self.category.is_empty() {
            assignment.label = self.category.clone();
        }
        *quality_score = (self.quality_score * MAX_SCORE).clamp(MIN_SCORE, MAX_SCORE);
        true
    }
}

fn clamp_fraction(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}

/// Trait for content analyzers
#[async_trait]
pub trait ContentAnalyzer: Send + Sync {
    /// Analyzes one page
    ///
    /// # Arguments
    ///
    /// * `url` - The page URL
    /// * `body_text` - Extracted body text
    /// * `title` - Extracted title, if any
    async fn analyze(
        &self,
        url: &str,
        body_text: &str,
        title: Option<&str>,
    ) -> Result<AnalysisResult, AnalysisError>;
}
