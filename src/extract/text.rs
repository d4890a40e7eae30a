//! Main content selection and text collection

use scraper::{ElementRef, Html, Selector};

use super::cleaner::collapse_whitespace;
use super::{ContentExtractor, EXCLUDED_TAGS};

/// Semantic containers, tried in order
const SEMANTIC_SELECTORS: &[&str] = &["article", "main", "[role='main']"];

/// Class/id substrings that suggest a content container
const POSITIVE_INDICATORS: &[&str] = &[
    "article", "content", "post", "entry", "story", "main", "body-text",
];

/// Class/id substrings that rule a container out even if it looks positive
const NEGATIVE_INDICATORS: &[&str] = &[
    "comment", "sidebar", "footer", "nav", "menu", "advert", "promo", "related", "share",
];

/// Elements considered by the largest-container fallback
const CONTAINER_SELECTOR: &str = "div, section, td, article, main";

/// Elements whose boundaries separate words
const BLOCK_TAGS: &[&str] = &[
    "p", "div", "br", "li", "ul", "ol", "h1", "h2", "h3", "h4", "h5", "h6", "tr", "td", "th",
    "table", "section", "article", "main", "blockquote", "pre", "dd", "dt", "figcaption",
];

/// Text and markup weight of one candidate container
#[derive(Debug, Clone, Default)]
pub(super) struct TextStats {
    /// Whitespace-collapsed text of the container
    pub text: String,
    /// Serialized size of the visited tags, excluding text
    pub tag_bytes: usize,
}

impl TextStats {
    pub fn text_len(&self) -> usize {
        self.text.chars().count()
    }

    /// Text length over text length plus tag bytes
    pub fn text_ratio(&self) -> f64 {
        let text_len = self.text_len();
        let markup_len = text_len + self.tag_bytes;
        if markup_len == 0 {
            0.0
        } else {
            text_len as f64 / markup_len as f64
        }
    }
}

impl ContentExtractor {
    /// Finds the main content and returns its collapsed raw text
    ///
    /// Strategy order: semantic containers, then class/id heuristics, then the
    /// largest container, then `<body>`. The first strategy that produces a
    /// content-rich candidate wins.
    pub(super) fn find_main_text(&self, document: &Html) -> Option<String> {
        self.find_semantic(document)
            .or_else(|| self.find_by_heuristics(document))
            .or_else(|| self.find_largest(document))
            .or_else(|| self.find_body(document))
            .map(|stats| stats.text)
    }

    /// Checks the content-rich thresholds
    pub(super) fn is_content_rich(&self, stats: &TextStats) -> bool {
        stats.text_len() >= self.config.min_text_length
            && stats.text_ratio() >= self.config.min_text_ratio
    }

    fn find_semantic(&self, document: &Html) -> Option<TextStats> {
        for selector_str in SEMANTIC_SELECTORS {
            let Ok(selector) = Selector::parse(selector_str) else {
                continue;
            };
            for element in document.select(&selector) {
                if has_excluded_ancestor(&element) {
                    continue;
                }
                let stats = collect_text(element);
                if self.is_content_rich(&stats) {
                    tracing::trace!("Content found in <{}>", element.value().name());
                    return Some(stats);
                }
            }
        }
        None
    }

    /// Only container tags qualify, so a `<body class="single-post">` cannot win
    fn find_by_heuristics(&self, document: &Html) -> Option<TextStats> {
        let selector = Selector::parse(CONTAINER_SELECTOR).ok()?;

        document
            .select(&selector)
            .filter(|element| {
                !is_excluded(element) && !has_excluded_ancestor(element) && looks_like_content(element)
            })
            .map(collect_text)
            .filter(|stats| self.is_content_rich(stats))
            .max_by_key(|stats| stats.text_len())
    }

    fn find_largest(&self, document: &Html) -> Option<TextStats> {
        let selector = Selector::parse(CONTAINER_SELECTOR).ok()?;

        document
            .select(&selector)
            .filter(|element| !has_excluded_ancestor(element))
            .map(collect_text)
            .filter(|stats| self.is_content_rich(stats))
            .max_by_key(|stats| stats.text_len())
    }

    fn find_body(&self, document: &Html) -> Option<TextStats> {
        let selector = Selector::parse("body").ok()?;
        let body = document.select(&selector).next()?;
        let stats = collect_text(body);
        self.is_content_rich(&stats).then_some(stats)
    }
}

/// Collects the text and tag weight of an element, skipping excluded subtrees
pub(super) fn collect_text(element: ElementRef) -> TextStats {
    let mut raw = String::new();
    let mut tag_bytes = tag_size(&element);
    walk(element, &mut raw, &mut tag_bytes);

    TextStats {
        text: collapse_whitespace(&raw),
        tag_bytes,
    }
}

fn walk(element: ElementRef, text: &mut String, tag_bytes: &mut usize) {
    for child in element.children() {
        if let Some(child_element) = ElementRef::wrap(child) {
            if is_excluded(&child_element) {
                continue;
            }
            *tag_bytes += tag_size(&child_element);

            let block = BLOCK_TAGS.contains(&child_element.value().name());
            if block {
                text.push(' ');
            }
            walk(child_element, text, tag_bytes);
            if block {
                text.push(' ');
            }
        } else if let Some(text_node) = child.value().as_text() {
            text.push_str(text_node);
        }
    }
}

/// Serialized size of the open and close tags, attributes included
fn tag_size(element: &ElementRef) -> usize {
    let value = element.value();
    let name_len = value.name().len();
    let attrs_len: usize = value
        .attrs()
        .map(|(name, val)| name.len() + val.len() + 4)
        .sum();

    // "<name" + attrs + ">" and "</name>"
    (name_len + 2 + attrs_len) + (name_len + 3)
}

fn is_excluded(element: &ElementRef) -> bool {
    EXCLUDED_TAGS.contains(&element.value().name())
}

/// Check if an element sits inside an excluded subtree
fn has_excluded_ancestor(element: &ElementRef) -> bool {
    let mut current = element.parent();
    while let Some(parent) = current {
        if let Some(elem) = parent.value().as_element() {
            if EXCLUDED_TAGS.contains(&elem.name()) {
                return true;
            }
        }
        current = parent.parent();
    }
    false
}

fn looks_like_content(element: &ElementRef) -> bool {
    let value = element.value();
    let names = format!(
        "{} {}",
        value.attr("class").unwrap_or_default(),
        value.id().unwrap_or_default()
    )
    .to_lowercase();

    POSITIVE_INDICATORS.iter().any(|p| names.contains(p))
        && !NEGATIVE_INDICATORS.iter().any(|n| names.contains(n))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn first(document: &Html, selector: &str) -> TextStats {
        let selector = Selector::parse(selector).unwrap();
        collect_text(document.select(&selector).next().unwrap())
    }

    #[test]
    fn test_collect_text_separates_blocks() {
        let document = Html::parse_document("<div><p>one</p><p>two</p><b>th</b>ree</div>");
        let stats = first(&document, "div");
        assert_eq!(stats.text, "one two three");
    }

    #[test]
    fn test_collect_text_skips_excluded() {
        let document = Html::parse_document(
            "<div>keep<script>drop()</script><nav><a href=\"/\">drop</a></nav></div>",
        );
        let stats = first(&document, "div");
        assert_eq!(stats.text, "keep");
        // only <div></div> counted; excluded subtrees carry no markup weight
        assert_eq!(stats.tag_bytes, 11);
    }

    #[test]
    fn test_tag_size_counts_attributes() {
        let document = Html::parse_document("<div class=\"a\">x</div>");
        let stats = first(&document, "div");
        // <div class="a"> is 15 bytes, </div> is 6
        assert_eq!(stats.tag_bytes, 21);
        assert!((stats.text_ratio() - 1.0 / 22.0).abs() < 1e-9);
    }

    #[test]
    fn test_looks_like_content() {
        let document = Html::parse_document(
            "<div id=\"main-content\"></div><div class=\"comment-content\"></div>\
             <div class=\"layout\"></div>",
        );
        let selector = Selector::parse("div").unwrap();
        let flags: Vec<bool> = document
            .select(&selector)
            .map(|e| looks_like_content(&e))
            .collect();
        assert_eq!(flags, vec![true, false, false]);
    }

    #[test]
    fn test_excluded_ancestor() {
        let document =
            Html::parse_document("<aside><article>x</article></aside><article>y</article>");
        let selector = Selector::parse("article").unwrap();
        let flags: Vec<bool> = document
            .select(&selector)
            .map(|e| has_excluded_ancestor(&e))
            .collect();
        assert_eq!(flags, vec![true, false]);
    }
}
