use once_cell::sync::Lazy;
use regex::Regex;

static BOILERPLATE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)\b(?:click here|read more|continue reading|share this article|subscribe now|sign up for our newsletter|all rights reserved|skip to content|back to top)\b",
    )
    .unwrap()
});

/// Collapses every whitespace run to a single space and trims the ends
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Strips boilerplate phrases and normalizes whitespace
pub fn clean_text(text: &str) -> String {
    let collapsed = collapse_whitespace(text);
    let stripped = BOILERPLATE.replace_all(&collapsed, " ");
    collapse_whitespace(&stripped)
}

/// Truncates to at most `max_chars` characters, marking the cut with "..."
pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let mut truncated: String = text.chars().take(max_chars).collect();
    truncated.push_str("...");
    truncated
}
