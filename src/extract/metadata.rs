//! Metadata extraction: title, description, keywords, author, language

use scraper::{Html, Selector};
use serde::Serialize;

use super::cleaner::collapse_whitespace;
use super::ContentExtractor;

/// Lightweight page metadata carried alongside the scored record
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PageMetadata {
    pub keywords: Vec<String>,
    pub author: Option<String>,
    pub language: Option<String>,
    pub canonical_url: Option<String>,
    pub links_count: usize,
    pub images_count: usize,
}

impl ContentExtractor {
    /// Extracts metadata from raw HTML
    pub fn extract_metadata(&self, raw_html: &str) -> PageMetadata {
        let document = Html::parse_document(raw_html);

        let keywords = meta_content(&document, "keywords")
            .map(|raw| {
                raw.split(',')
                    .map(|k| k.trim().to_string())
                    .filter(|k| !k.is_empty())
                    .collect()
            })
            .unwrap_or_default();

        let language = first_attr(&document, "html[lang]", "lang")
            .or_else(|| meta_content(&document, "language"))
            .or_else(|| meta_content(&document, "og:locale"));

        PageMetadata {
            keywords,
            author: meta_content(&document, "author"),
            language,
            canonical_url: first_attr(&document, "link[rel='canonical'][href]", "href"),
            links_count: count(&document, "a[href]"),
            images_count: count(&document, "img"),
        }
    }

    /// Page title: `<title>`, then og:title, then twitter:title, then the first `<h1>`
    pub(super) fn extract_title(&self, document: &Html) -> Option<String> {
        first_text(document, "title")
            .or_else(|| meta_content(document, "og:title"))
            .or_else(|| meta_content(document, "twitter:title"))
            .or_else(|| first_text(document, "h1"))
    }

    /// Page description from the meta description tags
    pub(super) fn extract_description(&self, document: &Html) -> Option<String> {
        meta_content(document, "description")
            .or_else(|| meta_content(document, "og:description"))
            .or_else(|| meta_content(document, "twitter:description"))
    }
}

/// Reads a `<meta>` tag by `name` or `property`
fn meta_content(document: &Html, name: &str) -> Option<String> {
    for attr in ["name", "property"] {
        let Ok(selector) = Selector::parse(&format!("meta[{}='{}']", attr, name)) else {
            continue;
        };
        let found = document
            .select(&selector)
            .filter_map(|e| e.value().attr("content"))
            .map(collapse_whitespace)
            .find(|content| !content.is_empty());
        if found.is_some() {
            return found;
        }
    }
    None
}

fn first_text(document: &Html, selector: &str) -> Option<String> {
    let selector = Selector::parse(selector).ok()?;
    document
        .select(&selector)
        .map(|e| collapse_whitespace(&e.text().collect::<String>()))
        .find(|text| !text.is_empty())
}

fn first_attr(document: &Html, selector: &str, attr: &str) -> Option<String> {
    let selector = Selector::parse(selector).ok()?;
    document
        .select(&selector)
        .filter_map(|e| e.value().attr(attr))
        .map(|v| v.trim().to_string())
        .find(|v| !v.is_empty())
}

fn count(document: &Html, selector: &str) -> usize {
    Selector::parse(selector)
        .map(|s| document.select(&s).count())
        .unwrap_or(0)
}
