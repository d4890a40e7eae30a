//! Pipeline orchestrator - drives every URL through validate, fetch, extract and score
//!
//! This module contains the batch loop, including:
//! - The per-URL state machine
//! - Sequential and worker-pool execution
//! - Stop-signal handling between URLs
//! - Merging optional analyzer output after scoring

use super::fetcher::{FetchOutcome, FetchProvider, FetchRequest, HttpFetcher};
use super::record::{RecordError, ScoredRecord};
use crate::analyzer::{AnalysisResult, ContentAnalyzer, OpenAiAnalyzer};
use crate::classify::{CategoryTable, Categorizer, QualityScorer};
use crate::config::Config;
use crate::extract::{ContentExtractor, ExtractedContent};
use crate::state::UrlState;
use crate::url::UrlValidator;
use crate::{ErrorKind, SieveError};
use chrono::Utc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Progress is logged every this many finished URLs
const PROGRESS_INTERVAL: usize = 10;

/// Batch pipeline
///
/// Cheap to clone: the fetcher and analyzer are shared, everything else is
/// immutable configuration.
#[derive(Clone)]
pub struct Pipeline {
    validator: UrlValidator,
    fetcher: Arc<dyn FetchProvider>,
    extractor: ContentExtractor,
    categorizer: Categorizer,
    scorer: QualityScorer,
    analyzer: Option<Arc<dyn ContentAnalyzer>>,
    min_confidence: f64,
    timeout: Duration,
    max_retries: u32,
    workers: usize,
}

impl Pipeline {
    /// Creates a pipeline around an explicit fetch provider
    ///
    /// # Arguments
    ///
    /// * `config` - The validated configuration
    /// * `fetcher` - Provider used for every fetch
    pub fn new(config: &Config, fetcher: Arc<dyn FetchProvider>) -> Self {
        Self {
            validator: UrlValidator::new(config.validator.clone()),
            fetcher,
            extractor: ContentExtractor::new(config.extractor.clone()),
            categorizer: Categorizer::new(CategoryTable::from_entries(&config.categories)),
            scorer: QualityScorer::new(config.quality.clone()),
            analyzer: None,
            min_confidence: 0.0,
            timeout: Duration::from_secs(config.scraper.timeout_secs),
            max_retries: config.scraper.max_retries,
            workers: config.scraper.workers.max(1) as usize,
        }
    }

    /// Creates a pipeline with the HTTP fetcher and, when enabled, the OpenAI analyzer
    ///
    /// # Returns
    ///
    /// * `Ok(Pipeline)` - Ready to run
    /// * `Err(SieveError)` - The HTTP client could not be built, or analysis
    ///   is enabled but its API key is missing
    pub fn from_config(config: &Config) -> Result<Self, SieveError> {
        let fetcher = HttpFetcher::from_config(config)?;
        let mut pipeline = Self::new(config, Arc::new(fetcher));

        if let Some(analysis) = config.analysis.as_ref().filter(|a| a.enabled) {
            let analyzer = OpenAiAnalyzer::from_config(analysis)?;
            info!("Content analysis enabled (model {})", analysis.model);
            pipeline = pipeline.with_analyzer(Arc::new(analyzer), analysis.min_confidence);
        }

        Ok(pipeline)
    }

    /// Attaches an analyzer whose results override scoring at or above `min_confidence`
    pub fn with_analyzer(mut self, analyzer: Arc<dyn ContentAnalyzer>, min_confidence: f64) -> Self {
        self.analyzer = Some(analyzer);
        self.min_confidence = min_confidence;
        self
    }

    /// Overrides the configured worker count (minimum 1)
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers.max(1);
        self
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Processes every URL, returning one record per URL in input order
    ///
    /// The stop signal is checked before each URL is started; URLs never
    /// started become `Cancelled` records. URLs already in flight finish.
    pub async fn run(&self, urls: &[String], stop: &CancellationToken) -> Vec<ScoredRecord> {
        info!(
            "Processing {} URLs with {} worker(s)",
            urls.len(),
            self.workers
        );

        if self.workers <= 1 || urls.len() <= 1 {
            return self.run_sequential(urls, stop).await;
        }

        let total = urls.len();
        let urls = Arc::new(urls.to_vec());
        let slots: Arc<Mutex<Vec<Option<ScoredRecord>>>> = Arc::new(Mutex::new(vec![None; total]));
        let cursor = Arc::new(AtomicUsize::new(0));
        let finished = Arc::new(AtomicUsize::new(0));

        let mut handles = Vec::with_capacity(self.workers);
        for worker_id in 0..self.workers.min(total) {
            let pipeline = self.clone();
            let urls = Arc::clone(&urls);
            let slots = Arc::clone(&slots);
            let cursor = Arc::clone(&cursor);
            let finished = Arc::clone(&finished);
            let stop = stop.clone();

            handles.push(tokio::spawn(async move {
                loop {
                    if stop.is_cancelled() {
                        debug!("Worker {} stopping", worker_id);
                        break;
                    }

                    let index = cursor.fetch_add(1, Ordering::SeqCst);
                    let Some(url) = urls.get(index) else {
                        break;
                    };

                    let record = pipeline.process_url(url).await;
                    slots.lock().unwrap_or_else(PoisonError::into_inner)[index] = Some(record);

                    let done = finished.fetch_add(1, Ordering::SeqCst) + 1;
                    log_progress(done, total);
                }
            }));
        }

        for handle in handles {
            if let Err(e) = handle.await {
                warn!("Worker task failed: {}", e);
            }
        }

        // Slots below the cursor were claimed; an empty one lost its worker
        let claimed = cursor.load(Ordering::SeqCst).min(total);
        let slots = std::mem::take(&mut *slots.lock().unwrap_or_else(PoisonError::into_inner));
        slots
            .into_iter()
            .zip(urls.iter())
            .enumerate()
            .map(|(index, (slot, url))| match slot {
                Some(record) => record,
                None if index < claimed || !stop.is_cancelled() => {
                    ScoredRecord::worker_failed(url.as_str())
                }
                None => ScoredRecord::cancelled(url.as_str()),
            })
            .collect()
    }

    async fn run_sequential(&self, urls: &[String], stop: &CancellationToken) -> Vec<ScoredRecord> {
        let mut records = Vec::with_capacity(urls.len());

        for url in urls {
            if stop.is_cancelled() {
                records.push(ScoredRecord::cancelled(url.as_str()));
                continue;
            }
            records.push(self.process_url(url).await);
            log_progress(records.len(), urls.len());
        }

        if stop.is_cancelled() {
            info!("Batch stopped early");
        }
        records
    }

    /// Drives a single URL through the state machine
    ///
    /// Never fails: every failure becomes an errored record.
    pub async fn process_url(&self, raw_url: &str) -> ScoredRecord {
        let mut state = UrlState::Pending;

        advance(&mut state, UrlState::Validating, raw_url);
        let url = match self.validator.check(raw_url) {
            Ok(url) => url,
            Err(e) => {
                return fail(
                    &mut state,
                    raw_url,
                    RecordError::new(ErrorKind::Validation, e.to_string(), 0),
                    None,
                )
            }
        };

        advance(&mut state, UrlState::Fetching, raw_url);
        let request = FetchRequest::new(url, self.timeout, self.max_retries);
        let fetched = self.fetcher.fetch(&request).await;
        let (status_code, body, final_url, attempts) = match fetched {
            FetchOutcome::Success {
                status_code,
                body,
                final_url,
                attempts_made,
                ..
            } => (status_code, body, final_url, attempts_made),
            FetchOutcome::Failure {
                reason,
                kind,
                last_status_code,
                attempts_made,
            } => {
                return fail(
                    &mut state,
                    raw_url,
                    RecordError::new(kind, reason, attempts_made),
                    last_status_code,
                )
            }
        };

        advance(&mut state, UrlState::Extracting, raw_url);
        let content = match self.extractor.extract_checked(&body) {
            Ok(content) => content,
            Err(e) => {
                return fail(
                    &mut state,
                    raw_url,
                    RecordError::new(ErrorKind::Extraction, e.to_string(), attempts),
                    Some(status_code),
                )
            }
        };
        let metadata = self.extractor.extract_metadata(&body);

        advance(&mut state, UrlState::Scoring, raw_url);
        let mut category = self
            .categorizer
            .categorize(&content.body_text, content.title.as_deref());
        let mut quality_score = self.scorer.score(&content);

        let analysis = self.analyze(raw_url, &content).await;
        if let Some(result) = &analysis {
            if result.apply(&mut category, &mut quality_score, self.min_confidence) {
                debug!(
                    "{}: analyzer override to {} (confidence {:.2})",
                    raw_url, category.label, result.confidence
                );
            }
        }

        advance(&mut state, UrlState::Completed, raw_url);
        info!(
            "{}: {} (score {:.1}, {} words)",
            raw_url, category.label, quality_score, content.word_count
        );

        ScoredRecord {
            url: raw_url.to_string(),
            state,
            content,
            category,
            quality_score,
            status_code: Some(status_code),
            error: None,
            analysis,
            metadata: Some(metadata),
            final_url: Some(final_url),
            created_at: Utc::now(),
        }
    }

    async fn analyze(&self, url: &str, content: &ExtractedContent) -> Option<AnalysisResult> {
        let analyzer = self.analyzer.as_ref()?;
        if content.is_empty() {
            return None;
        }

        match analyzer
            .analyze(url, &content.body_text, content.title.as_deref())
            .await
        {
            Ok(result) => Some(result),
            Err(e) => {
                warn!(url = %url, error = %e, "Content analysis failed");
                None
            }
        }
    }
}

fn advance(state: &mut UrlState, next: UrlState, url: &str) {
    debug_assert!(
        state.can_transition_to(next),
        "invalid transition {} -> {}",
        state,
        next
    );
    debug!("{}: {} -> {}", url, state, next);
    *state = next;
}

fn fail(
    state: &mut UrlState,
    url: &str,
    error: RecordError,
    status_code: Option<u16>,
) -> ScoredRecord {
    advance(state, UrlState::Errored, url);
    info!("{}: failed ({}): {}", url, error.kind, error.reason);
    ScoredRecord::errored(url, error, status_code)
}

fn log_progress(done: usize, total: usize) {
    if done % PROGRESS_INTERVAL == 0 || done == total {
        info!("Progress: {}/{} URLs processed", done, total);
    }
}
