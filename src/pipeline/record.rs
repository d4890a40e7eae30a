use crate::analyzer::AnalysisResult;
use crate::classify::CategoryAssignment;
use crate::extract::{ExtractedContent, PageMetadata};
use crate::state::UrlState;
use crate::ErrorKind;
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Reason recorded for a URL whose worker task died before finishing it
pub const WORKER_FAILED_REASON: &str = "worker task failed before this URL finished";

/// Why a URL ended in [`UrlState::Errored`]
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecordError {
    pub kind: ErrorKind,
    pub reason: String,
    /// Fetch attempts made before giving up (0 if none were made)
    pub attempts: u32,
}

impl RecordError {
    pub fn new(kind: ErrorKind, reason: impl Into<String>, attempts: u32) -> Self {
        Self {
            kind,
            reason: reason.into(),
            attempts,
        }
    }
}

/// Final result for one input URL
///
/// Exactly one record exists per input URL. Errored records carry empty
/// content, the `general` category and a score of 0.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredRecord {
    pub url: String,
    pub state: UrlState,
    pub content: ExtractedContent,
    pub category: CategoryAssignment,
    pub quality_score: f64,
    /// Status of the last response, None if no response was received
    pub status_code: Option<u16>,
    pub error: Option<RecordError>,
    /// Auxiliary analyzer output, whether or not it overrode anything
    pub analysis: Option<AnalysisResult>,
    pub metadata: Option<PageMetadata>,
    /// URL after redirects
    pub final_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl ScoredRecord {
    /// Builds an errored record for a URL
    pub fn errored(url: impl Into<String>, error: RecordError, status_code: Option<u16>) -> Self {
        Self {
            url: url.into(),
            state: UrlState::Errored,
            content: ExtractedContent::empty(),
            category: CategoryAssignment::general(),
            quality_score: 0.0,
            status_code,
            error: Some(error),
            analysis: None,
            metadata: None,
            final_url: None,
            created_at: Utc::now(),
        }
    }

    /// Record for a URL the batch was stopped before reaching
    pub fn cancelled(url: impl Into<String>) -> Self {
        Self::errored(
            url,
            RecordError::new(ErrorKind::Cancelled, "batch stopped before this URL was fetched", 0),
            None,
        )
    }

    /// Record for a URL left unfinished by a panicked worker
    pub fn worker_failed(url: impl Into<String>) -> Self {
        Self::errored(
            url,
            RecordError::new(ErrorKind::Cancelled, WORKER_FAILED_REASON, 0),
            None,
        )
    }

    pub fn is_success(&self) -> bool {
        self.state == UrlState::Completed
    }

    pub fn error_kind(&self) -> Option<ErrorKind> {
        self.error.as_ref().map(|e| e.kind)
    }
}
