//! Batch report folded from the final record list

use crate::pipeline::ScoredRecord;
use crate::ErrorKind;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::{BTreeMap, HashSet};
use url::Url;

/// Lower bound of the "high" quality bucket
pub const HIGH_QUALITY_THRESHOLD: f64 = 70.0;

/// Lower bound of the "medium" quality bucket
pub const MEDIUM_QUALITY_THRESHOLD: f64 = 40.0;

/// Completed records per quality band
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct QualityBuckets {
    pub high: u64,
    pub medium: u64,
    pub low: u64,
}

/// Content length statistics over completed records, in characters
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ContentStats {
    pub average_chars: f64,
    pub min_chars: usize,
    pub max_chars: usize,
}

/// Aggregate view of one batch
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchReport {
    pub generated_at: DateTime<Utc>,
    pub config_hash: Option<String>,

    pub total: u64,
    pub completed: u64,
    pub errored: u64,

    /// Completed records per category label
    pub by_category: BTreeMap<String, u64>,
    /// Records per last status code (records without a response are not counted)
    pub by_status: BTreeMap<u16, u64>,
    /// Errored records per failure kind
    pub errors_by_kind: BTreeMap<ErrorKind, u64>,

    pub quality: QualityBuckets,
    /// Mean score over completed records (0 when none completed)
    pub average_quality: f64,
    pub content: ContentStats,

    /// Distinct hosts among all input URLs that parse
    pub unique_domains: u64,
}

impl BatchReport {
    /// Builds the report in one pass over the records
    pub fn from_records(records: &[ScoredRecord]) -> Self {
        let mut by_category = BTreeMap::new();
        let mut by_status = BTreeMap::new();
        let mut errors_by_kind = BTreeMap::new();
        let mut quality = QualityBuckets::default();
        let mut domains = HashSet::new();
        let mut completed = 0u64;
        let mut score_sum = 0.0;
        let mut char_counts = Vec::new();

        for record in records {
            if let Some(host) = Url::parse(&record.url)
                .ok()
                .and_then(|u| u.host_str().map(str::to_lowercase))
            {
                domains.insert(host);
            }

            if let Some(status) = record.status_code {
                *by_status.entry(status).or_insert(0) += 1;
            }

            if let Some(error) = &record.error {
                *errors_by_kind.entry(error.kind).or_insert(0) += 1;
                continue;
            }

            completed += 1;
            score_sum += record.quality_score;
            char_counts.push(record.content.char_count);
            *by_category.entry(record.category.label.clone()).or_insert(0) += 1;

            if record.quality_score >= HIGH_QUALITY_THRESHOLD {
                quality.high += 1;
            } else if record.quality_score >= MEDIUM_QUALITY_THRESHOLD {
                quality.medium += 1;
            } else {
                quality.low += 1;
            }
        }

        let content = if char_counts.is_empty() {
            ContentStats::default()
        } else {
            ContentStats {
                average_chars: char_counts.iter().sum::<usize>() as f64 / char_counts.len() as f64,
                min_chars: char_counts.iter().copied().min().unwrap_or(0),
                max_chars: char_counts.iter().copied().max().unwrap_or(0),
            }
        };

        Self {
            generated_at: Utc::now(),
            config_hash: None,
            total: records.len() as u64,
            completed,
            errored: records.len() as u64 - completed,
            by_category,
            by_status,
            errors_by_kind,
            quality,
            average_quality: if completed == 0 {
                0.0
            } else {
                score_sum / completed as f64
            },
            content,
            unique_domains: domains.len() as u64,
        }
    }

    /// Stamps the hash of the configuration the batch ran with
    pub fn with_config_hash(mut self, hash: impl Into<String>) -> Self {
        self.config_hash = Some(hash.into());
        self
    }

    /// Percentage of records that completed
    pub fn success_rate(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        (self.completed as f64 / self.total as f64) * 100.0
    }

    /// Categories sorted by count, descending (ties alphabetical)
    pub fn top_categories(&self) -> Vec<(&str, u64)> {
        let mut categories: Vec<(&str, u64)> = self
            .by_category
            .iter()
            .map(|(label, count)| (label.as_str(), *count))
            .collect();
        categories.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
        categories
    }
}
