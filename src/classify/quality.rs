use crate::config::QualityConfig;
use crate::extract::ExtractedContent;

pub const MAX_SCORE: f64 = 100.0;
pub const MIN_SCORE: f64 = 0.0;

const MISSING_TITLE_PENALTY: f64 = 20.0;
const SHORT_TITLE_PENALTY: f64 = 10.0;
const EMPTY_BODY_PENALTY: f64 = 40.0;
const LOW_WORD_COUNT_PENALTY: f64 = 30.0;
const MEDIUM_WORD_COUNT_PENALTY: f64 = 15.0;
const LONG_TITLE_PENALTY: f64 = 10.0;

/// Computes a 0-100 score from structural signals of extracted content
#[derive(Debug, Clone, Default)]
pub struct QualityScorer {
    config: QualityConfig,
}

impl QualityScorer {
    pub fn new(config: QualityConfig) -> Self {
        Self { config }
    }

    /// Scores extracted content
    ///
    /// Starts at 100 and subtracts:
    ///
    /// | Condition | Penalty |
    /// |-----------|---------|
    /// | No title | 20 |
    /// | Title shorter than `min-title-chars` | 10 |
    /// | Empty body | 40 |
    /// | Fewer words than `low-word-count` | 30 |
    /// | Fewer words than `medium-word-count` | 15 |
    /// | Title longer than half the body | 10 |
    ///
    /// Only one of the three body penalties applies. The result is clamped to [0, 100].
    pub fn score(&self, content: &ExtractedContent) -> f64 {
        let mut score = MAX_SCORE;

        let title_chars = match content.title.as_deref().map(str::trim) {
            None | Some("") => {
                score -= MISSING_TITLE_PENALTY;
                0
            }
            Some(title) => {
                let chars = title.chars().count();
                if chars < self.config.min_title_chars {
                    score -= SHORT_TITLE_PENALTY;
                }
                chars
            }
        };

        if content.is_empty() {
            score -= EMPTY_BODY_PENALTY;
        } else if content.word_count < self.config.low_word_count {
            score -= LOW_WORD_COUNT_PENALTY;
        } else if content.word_count < self.config.medium_word_count {
            score -= MEDIUM_WORD_COUNT_PENALTY;
        }

        if title_chars > 0 && title_chars * 2 > content.char_count {
            score -= LONG_TITLE_PENALTY;
        }

        score.clamp(MIN_SCORE, MAX_SCORE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn content(title: Option<&str>, words: usize) -> ExtractedContent {
        let body = vec!["word"; words].join(" ");
        ExtractedContent::new(title.map(str::to_string), body, None)
    }

    #[test]
    fn test_full_score() {
        let scorer = QualityScorer::default();
        assert_eq!(scorer.score(&content(Some("A perfectly fine title"), 200)), 100.0);
    }

    #[test]
    fn test_empty_content() {
        let scorer = QualityScorer::default();
        let score = scorer.score(&ExtractedContent::empty());
        assert_eq!(score, 40.0);
        assert!(score <= 40.0);
    }

    #[test]
    fn test_word_count_penalties() {
        let scorer = QualityScorer::default();
        let title = Some("A perfectly fine title");

        assert_eq!(scorer.score(&content(title, 49)), 70.0);
        assert_eq!(scorer.score(&content(title, 50)), 85.0);
        assert_eq!(scorer.score(&content(title, 149)), 85.0);
        assert_eq!(scorer.score(&content(title, 150)), 100.0);
    }

    #[test]
    fn test_title_penalties() {
        let scorer = QualityScorer::default();

        assert_eq!(scorer.score(&content(None, 200)), 80.0);
        assert_eq!(scorer.score(&content(Some("   "), 200)), 80.0);
        assert_eq!(scorer.score(&content(Some("Short"), 200)), 90.0);
    }

    #[test]
    fn test_title_long_relative_to_body() {
        let scorer = QualityScorer::default();
        // 4 chars of body, a 22 char title: -30 for few words, -10 for the title
        assert_eq!(scorer.score(&content(Some("A perfectly fine title"), 1)), 60.0);
    }

    #[test]
    fn test_score_bounds() {
        let scorer = QualityScorer::new(QualityConfig {
            min_title_chars: 1000,
            low_word_count: 1000,
            medium_word_count: 2000,
        });
        for words in [0, 1, 10, 100, 5000] {
            for title in [None, Some("t"), Some("a much longer title than usual")] {
                let score = scorer.score(&content(title, words));
                assert!((0.0..=100.0).contains(&score));
            }
        }
    }

    #[test]
    fn test_score_is_deterministic() {
        let scorer = QualityScorer::default();
        let c = content(Some("Some title here"), 75);
        let first = scorer.score(&c);
        for _ in 0..10 {
            assert_eq!(scorer.score(&c), first);
        }
    }
}
