//! Content extraction from HTML
//!
//! Turns a raw page body into a cleaned title, body text, and description:
//! - Ignores non-content subtrees (scripts, navigation, headers, footers)
//! - Picks the main content container by a fixed strategy order
//! - Rejects markup-heavy candidates with a text-to-markup ratio check
//! - Strips boilerplate phrases and normalizes whitespace
//!
//! A page with no usable content yields [`ExtractedContent::empty`], never an error.

mod cleaner;
mod metadata;
mod text;

pub use cleaner::{clean_text, collapse_whitespace, truncate_chars};
pub use metadata::PageMetadata;

use crate::config::ExtractorConfig;
use scraper::Html;
use serde::Serialize;
use thiserror::Error;

/// Elements whose subtrees never contribute text or markup weight
pub(crate) const EXCLUDED_TAGS: &[&str] = &[
    "script", "style", "noscript", "nav", "header", "footer", "aside", "form", "button",
    "iframe", "svg", "template",
];

/// Extraction errors
///
/// Only bodies that cannot be treated as HTML at all are errors; an HTML page
/// without content is a normal, empty result.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ExtractionError {
    #[error("response body is binary, not HTML")]
    BinaryContent,
}

/// Cleaned content of a single page
///
/// Invariant: `word_count == 0` implies `body_text` is empty.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ExtractedContent {
    pub title: Option<String>,
    pub body_text: String,
    pub description: Option<String>,
    pub word_count: usize,
    pub char_count: usize,
}

impl ExtractedContent {
    /// Content for a page where nothing usable was found
    pub fn empty() -> Self {
        Self::default()
    }

    /// Builds content from already-cleaned parts, deriving the counts
    pub fn new(title: Option<String>, body_text: String, description: Option<String>) -> Self {
        let word_count = body_text.split_whitespace().count();
        let body_text = if word_count == 0 {
            String::new()
        } else {
            body_text
        };
        let char_count = body_text.chars().count();

        Self {
            title,
            body_text,
            description,
            word_count,
            char_count,
        }
    }

    /// Returns true if no body text was extracted
    pub fn is_empty(&self) -> bool {
        self.word_count == 0
    }
}

/// Content extractor
#[derive(Debug, Clone)]
pub struct ContentExtractor {
    pub(crate) config: ExtractorConfig,
}

impl ContentExtractor {
    /// Create a new content extractor
    pub fn new(config: ExtractorConfig) -> Self {
        Self { config }
    }

    /// Extracts title, body text, and description from raw HTML
    ///
    /// Never fails. When no container passes the content-rich check the
    /// result is [`ExtractedContent::empty`].
    pub fn extract(&self, raw_html: &str) -> ExtractedContent {
        let document = Html::parse_document(raw_html);

        let Some(raw_text) = self.find_main_text(&document) else {
            return ExtractedContent::empty();
        };

        let body_text = truncate_chars(&clean_text(&raw_text), self.config.max_content_chars);
        if body_text.is_empty() {
            return ExtractedContent::empty();
        }

        ExtractedContent::new(
            self.extract_title(&document),
            body_text,
            self.extract_description(&document),
        )
    }

    /// Like [`extract`](Self::extract), but rejects bodies that are not text
    ///
    /// # Returns
    ///
    /// * `Ok(ExtractedContent)` - The extracted (possibly empty) content
    /// * `Err(ExtractionError)` - The body is malformed beyond recovery
    pub fn extract_checked(&self, raw_body: &str) -> Result<ExtractedContent, ExtractionError> {
        if raw_body.contains('\0') {
            return Err(ExtractionError::BinaryContent);
        }
        Ok(self.extract(raw_body))
    }
}

impl Default for ContentExtractor {
    fn default() -> Self {
        Self::new(ExtractorConfig::default())
    }
}
