//! Output module for exporting results and reporting on a batch
//!
//! This module handles:
//! - Exporting records as JSON, CSV and XML
//! - Folding records into a [`BatchReport`]
//! - Rendering the report as markdown or printing it to stdout

mod export;
mod markdown;
mod report;

pub use export::{
    export_csv, export_json, export_xml, render_csv, render_json, render_xml, to_output_records,
    OutputRecord, CSV_HEADER,
};
pub use markdown::{format_markdown_report, write_markdown_report};
pub use report::{
    BatchReport, ContentStats, QualityBuckets, HIGH_QUALITY_THRESHOLD, MEDIUM_QUALITY_THRESHOLD,
};

use thiserror::Error;

/// Errors that can occur during output operations
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to serialize JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Failed to write CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("Failed to write XML: {0}")]
    Xml(#[from] quick_xml::Error),
}

/// Result type for output operations
pub type OutputResult<T> = Result<T, OutputError>;

/// Prints a batch report to stdout in a formatted manner
pub fn print_report(report: &BatchReport) {
    println!("=== Batch Report ===\n");

    println!("Overview:");
    println!("  Total URLs: {}", report.total);
    println!(
        "  Completed: {} ({:.1}%)",
        report.completed,
        report.success_rate()
    );
    println!("  Errored: {}", report.errored);
    println!("  Unique domains: {}", report.unique_domains);
    println!("  Average quality: {:.2}", report.average_quality);
    println!();

    if !report.by_category.is_empty() {
        println!("Categories:");
        for (label, count) in report.top_categories() {
            println!("  {}: {}", label, count);
        }
        println!();
    }

    println!(
        "Quality: {} high, {} medium, {} low",
        report.quality.high, report.quality.medium, report.quality.low
    );

    if !report.errors_by_kind.is_empty() {
        println!();
        println!("Errors:");
        for (kind, count) in &report.errors_by_kind {
            println!("  {}: {}", kind, count);
        }
    }
}
