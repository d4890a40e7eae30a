//! Categorization and quality scoring
//!
//! Both components are pure functions of their inputs: the same text and
//! title always produce the same category and score.

mod categorizer;
mod quality;

pub use categorizer::{
    CategoryAssignment, CategoryDef, CategoryTable, Categorizer, Keyword, GENERAL_CATEGORY,
};
pub use quality::{QualityScorer, MAX_SCORE, MIN_SCORE};
