//! JSON, CSV and XML export of scored records
//!
//! All three formats carry the same flat [`OutputRecord`] shape; XML adds the
//! page metadata when there is some.

use super::OutputResult;
use crate::extract::PageMetadata;
use crate::pipeline::ScoredRecord;
use chrono::{SecondsFormat, Utc};
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use serde::Serialize;
use std::fs::{self, File};
use std::io::Write;
use std::path::Path;

/// CSV header, in column order
pub const CSV_HEADER: [&str; 8] = [
    "url",
    "title",
    "content",
    "category",
    "quality_score",
    "status_code",
    "timestamp",
    "error",
];

/// Longest content written to a CSV cell, in characters
const CSV_CONTENT_CHARS: usize = 1000;

/// Longest content written to an XML `<content>` element before "..." is appended
const XML_CONTENT_CHARS: usize = 2000;

/// Flat, export-facing view of a [`ScoredRecord`]
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OutputRecord {
    pub url: String,
    pub title: String,
    pub content: String,
    pub category: String,
    /// Rounded to two decimals
    pub quality_score: f64,
    /// 0 when no response was received
    pub status_code: u16,
    /// RFC 3339
    pub timestamp: String,
    pub error: Option<String>,
}

impl From<&ScoredRecord> for OutputRecord {
    fn from(record: &ScoredRecord) -> Self {
        Self {
            url: record.url.clone(),
            title: record.content.title.clone().unwrap_or_default(),
            content: record.content.body_text.clone(),
            category: record.category.label.clone(),
            quality_score: round2(record.quality_score),
            status_code: record.status_code.unwrap_or(0),
            timestamp: record.created_at.to_rfc3339_opts(SecondsFormat::Secs, true),
            error: record
                .error
                .as_ref()
                .map(|e| format!("{}: {}", e.kind, e.reason)),
        }
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[derive(Serialize)]
struct JsonExport<'a> {
    export_timestamp: String,
    total_records: usize,
    records: &'a [OutputRecord],
}

pub fn to_output_records(records: &[ScoredRecord]) -> Vec<OutputRecord> {
    records.iter().map(OutputRecord::from).collect()
}

/// Renders records as a pretty-printed JSON document
pub fn render_json(records: &[OutputRecord]) -> OutputResult<String> {
    let export = JsonExport {
        export_timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
        total_records: records.len(),
        records,
    };
    Ok(serde_json::to_string_pretty(&export)?)
}

/// Renders records as CSV with a header row and CRLF line endings
pub fn render_csv(records: &[OutputRecord]) -> OutputResult<String> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .terminator(csv::Terminator::CRLF)
        .from_writer(vec![]);

    writer.write_record(CSV_HEADER)?;
    for record in records {
        let content: String = record.content.chars().take(CSV_CONTENT_CHARS).collect();
        writer.write_record([
            record.url.as_str(),
            record.title.as_str(),
            content.as_str(),
            record.category.as_str(),
            format!("{:.2}", record.quality_score).as_str(),
            record.status_code.to_string().as_str(),
            record.timestamp.as_str(),
            record.error.as_deref().unwrap_or_default(),
        ])?;
    }

    let bytes = writer.into_inner().map_err(|e| e.into_error())?;
    String::from_utf8(bytes)
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e).into())
}

/// Renders records as an indented XML document rooted at `<scraped_data>`
pub fn render_xml(records: &[ScoredRecord]) -> OutputResult<String> {
    let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);
    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
    writer.write_event(Event::Start(BytesStart::new("scraped_data")))?;

    for record in records {
        let output = OutputRecord::from(record);
        writer.write_event(Event::Start(BytesStart::new("item")))?;

        write_text_element(&mut writer, "url", &output.url)?;
        write_text_element(&mut writer, "title", &output.title)?;
        let content = truncate_chars(&output.content, XML_CONTENT_CHARS);
        write_text_element(&mut writer, "content", &content)?;
        write_text_element(&mut writer, "category", &output.category)?;
        let quality = format!("{:.2}", output.quality_score);
        write_text_element(&mut writer, "quality_score", &quality)?;
        write_text_element(&mut writer, "status_code", &output.status_code.to_string())?;
        write_text_element(&mut writer, "timestamp", &output.timestamp)?;
        if let Some(error) = &output.error {
            write_text_element(&mut writer, "error", error)?;
        }
        if let Some(metadata) = &record.metadata {
            write_metadata(&mut writer, metadata)?;
        }

        writer.write_event(Event::End(BytesEnd::new("item")))?;
    }

    writer.write_event(Event::End(BytesEnd::new("scraped_data")))?;

    let bytes = writer.into_inner();
    String::from_utf8(bytes)
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e).into())
}

fn write_metadata(writer: &mut Writer<Vec<u8>>, metadata: &PageMetadata) -> OutputResult<()> {
    writer.write_event(Event::Start(BytesStart::new("metadata")))?;
    if !metadata.keywords.is_empty() {
        write_text_element(writer, "keywords", &metadata.keywords.join(", "))?;
    }
    if let Some(author) = &metadata.author {
        write_text_element(writer, "author", author)?;
    }
    if let Some(language) = &metadata.language {
        write_text_element(writer, "language", language)?;
    }
    if let Some(canonical) = &metadata.canonical_url {
        write_text_element(writer, "canonical_url", canonical)?;
    }
    write_text_element(writer, "links_count", &metadata.links_count.to_string())?;
    write_text_element(writer, "images_count", &metadata.images_count.to_string())?;
    writer.write_event(Event::End(BytesEnd::new("metadata")))?;
    Ok(())
}

/// `<name>text</name>`, with the text escaped
fn write_text_element(writer: &mut Writer<Vec<u8>>, name: &str, text: &str) -> OutputResult<()> {
    writer.write_event(Event::Start(BytesStart::new(name)))?;
    writer.write_event(Event::Text(BytesText::new(text)))?;
    writer.write_event(Event::End(BytesEnd::new(name)))?;
    Ok(())
}

/// Cuts to `max` characters, marking the cut with "..."
fn truncate_chars(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let mut cut: String = text.chars().take(max).collect();
    cut.push_str("...");
    cut
}

/// Writes records to a JSON file, creating parent directories as needed
pub fn export_json(records: &[ScoredRecord], path: &Path) -> OutputResult<()> {
    let json = render_json(&to_output_records(records))?;
    write_file(path, &json)?;
    tracing::info!("Exported {} records to {}", records.len(), path.display());
    Ok(())
}

/// Writes records to a CSV file, creating parent directories as needed
pub fn export_csv(records: &[ScoredRecord], path: &Path) -> OutputResult<()> {
    let csv = render_csv(&to_output_records(records))?;
    write_file(path, &csv)?;
    tracing::info!("Exported {} records to {}", records.len(), path.display());
    Ok(())
}

/// Writes records to an XML file, creating parent directories as needed
pub fn export_xml(records: &[ScoredRecord], path: &Path) -> OutputResult<()> {
    let xml = render_xml(records)?;
    write_file(path, &xml)?;
    tracing::info!("Exported {} records to {}", records.len(), path.display());
    Ok(())
}

pub(super) fn write_file(path: &Path, contents: &str) -> OutputResult<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    let mut file = File::create(path)?;
    file.write_all(contents.as_bytes())?;
    Ok(())
}
