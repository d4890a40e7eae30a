//! Markdown report generation
//!
//! This module renders a [`BatchReport`] as a human-readable markdown
//! document, optionally followed by a per-URL results table.

use super::export::write_file;
use super::report::{BatchReport, HIGH_QUALITY_THRESHOLD, MEDIUM_QUALITY_THRESHOLD};
use super::OutputResult;
use crate::pipeline::ScoredRecord;
use chrono::SecondsFormat;
use std::path::Path;

/// Results table rows beyond this are summarized in one line
const MAX_TABLE_ROWS: usize = 100;

/// Writes the markdown report to `output_path`
///
/// # Arguments
///
/// * `report` - The batch report
/// * `records` - The records the report was built from, for the results table
/// * `output_path` - Path where the markdown file should be written
///
/// # Returns
///
/// * `Ok(())` - Successfully wrote the report
/// * `Err(OutputError)` - Failed to write the report
pub fn write_markdown_report(
    report: &BatchReport,
    records: &[ScoredRecord],
    output_path: &Path,
) -> OutputResult<()> {
    write_file(output_path, &format_markdown_report(report, records))
}

/// Formats a batch report as markdown
pub fn format_markdown_report(report: &BatchReport, records: &[ScoredRecord]) -> String {
    let mut md = String::new();

    md.push_str("# Sumi-Sieve Batch Report\n\n");

    md.push_str("## Run Information\n\n");
    md.push_str(&format!(
        "- **Generated**: {}\n",
        report.generated_at.to_rfc3339_opts(SecondsFormat::Secs, true)
    ));
    if let Some(hash) = &report.config_hash {
        md.push_str(&format!("- **Config Hash**: {}\n", hash));
    }
    md.push('\n');

    md.push_str("## Overall Statistics\n\n");
    md.push_str(&format!("- **Total URLs**: {}\n", report.total));
    md.push_str(&format!("- **Completed**: {}\n", report.completed));
    md.push_str(&format!("- **Errored**: {}\n", report.errored));
    md.push_str(&format!("- **Success Rate**: {:.2}%\n", report.success_rate()));
    md.push_str(&format!("- **Unique Domains**: {}\n", report.unique_domains));
    md.push_str(&format!(
        "- **Average Quality**: {:.2}\n",
        report.average_quality
    ));
    md.push_str(&format!(
        "- **Content Length**: avg {:.0}, min {}, max {} chars\n\n",
        report.content.average_chars, report.content.min_chars, report.content.max_chars
    ));

    if !report.by_category.is_empty() {
        md.push_str("## Categories\n\n");
        md.push_str("| Category | Pages |\n");
        md.push_str("|----------|-------|\n");
        for (label, count) in report.top_categories() {
            md.push_str(&format!("| {} | {} |\n", label, count));
        }
        md.push('\n');
    }

    md.push_str("## Quality\n\n");
    md.push_str("| Band | Pages |\n");
    md.push_str("|------|-------|\n");
    md.push_str(&format!(
        "| High (>= {:.0}) | {} |\n",
        HIGH_QUALITY_THRESHOLD, report.quality.high
    ));
    md.push_str(&format!(
        "| Medium (>= {:.0}) | {} |\n",
        MEDIUM_QUALITY_THRESHOLD, report.quality.medium
    ));
    md.push_str(&format!(
        "| Low (< {:.0}) | {} |\n\n",
        MEDIUM_QUALITY_THRESHOLD, report.quality.low
    ));

    if !report.by_status.is_empty() {
        md.push_str("## Status Codes\n\n");
        md.push_str("| Status | Count |\n");
        md.push_str("|--------|-------|\n");
        for (status, count) in &report.by_status {
            md.push_str(&format!("| {} | {} |\n", status, count));
        }
        md.push('\n');
    }

    if !report.errors_by_kind.is_empty() {
        md.push_str("## Error Summary\n\n");
        md.push_str("| Error Type | Count |\n");
        md.push_str("|------------|-------|\n");
        for (kind, count) in &report.errors_by_kind {
            md.push_str(&format!("| {} | {} |\n", kind, count));
        }
        md.push('\n');
    }

    if !records.is_empty() {
        md.push_str("## Results\n\n");
        md.push_str("| URL | Category | Score | Status |\n");
        md.push_str("|-----|----------|-------|--------|\n");
        for record in records.iter().take(MAX_TABLE_ROWS) {
            let status = match &record.error {
                Some(error) => error.kind.to_string(),
                None => record
                    .status_code
                    .map(|s| s.to_string())
                    .unwrap_or_default(),
            };
            md.push_str(&format!(
                "| {} | {} | {:.1} | {} |\n",
                escape_cell(&record.url),
                record.category.label,
                record.quality_score,
                status
            ));
        }
        if records.len() > MAX_TABLE_ROWS {
            md.push_str(&format!(
                "\n... and {} more\n",
                records.len() - MAX_TABLE_ROWS
            ));
        }
        md.push('\n');
    }

    md
}

fn escape_cell(text: &str) -> String {
    text.replace('|', "\\|")
}
