use crate::config::{CategoryEntry, KeywordEntry};
use serde::Serialize;
use std::collections::BTreeMap;

/// Label returned when no keyword matched anywhere
pub const GENERAL_CATEGORY: &str = "general";

/// A keyword and its base weight
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Keyword {
    pub term: String,
    pub weight: u32,
}

/// A category label and its keywords
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryDef {
    pub label: String,
    pub keywords: Vec<Keyword>,
}

/// Ordered category table
///
/// Order matters: when two categories tie on score, the one declared first wins.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryTable {
    categories: Vec<CategoryDef>,
}

/// Built-in table, in priority order
const BUILTIN_CATEGORIES: &[(&str, &[&str])] = &[
    (
        "technology",
        &[
            "technology", "software", "hardware", "programming", "developer", "computer",
            "machine learning", "artificial intelligence", "algorithm", "api", "cloud",
            "open source", "code", "app", "database",
        ],
    ),
    (
        "business",
        &[
            "business", "market", "company", "enterprise", "startup", "corporate", "ceo",
            "revenue", "strategy", "management", "industry",
        ],
    ),
    (
        "finance",
        &[
            "finance", "bank", "money", "investment", "stock", "crypto", "trading", "economy",
            "loan", "interest rate", "tax",
        ],
    ),
    (
        "health",
        &[
            "health", "medical", "doctor", "hospital", "medicine", "wellness", "disease",
            "patient", "treatment", "nutrition", "fitness",
        ],
    ),
    (
        "science",
        &[
            "science", "research", "study", "physics", "chemistry", "biology", "experiment",
            "scientist", "climate", "space",
        ],
    ),
    (
        "education",
        &[
            "education", "learn", "course", "tutorial", "university", "college", "school",
            "student", "teacher", "academic",
        ],
    ),
    (
        "news",
        &[
            "news", "breaking", "report", "journalist", "headline", "press", "politics",
            "election", "government",
        ],
    ),
    (
        "ecommerce",
        &[
            "shop", "store", "cart", "buy", "product", "price", "checkout", "shipping",
            "discount", "order",
        ],
    ),
    (
        "entertainment",
        &[
            "movie", "film", "music", "celebrity", "television", "game", "entertainment",
            "concert", "streaming",
        ],
    ),
    (
        "sports",
        &[
            "sports", "football", "soccer", "basketball", "tennis", "team", "league",
            "championship", "player", "match",
        ],
    ),
    (
        "travel",
        &[
            "travel", "hotel", "flight", "destination", "tourism", "vacation", "trip",
            "airline", "booking",
        ],
    ),
];

impl CategoryTable {
    /// Builds a table from label/keyword pairs, preserving order
    pub fn new(categories: Vec<CategoryDef>) -> Self {
        Self { categories }
    }

    /// The built-in table, every keyword at weight 1
    pub fn builtin() -> Self {
        let categories = BUILTIN_CATEGORIES
            .iter()
            .map(|(label, terms)| CategoryDef {
                label: label.to_string(),
                keywords: terms
                    .iter()
                    .map(|term| Keyword {
                        term: term.to_string(),
                        weight: 1,
                    })
                    .collect(),
            })
            .collect();
        Self { categories }
    }

    /// Builds the table from `[[categories]]` config entries
    ///
    /// Falls back to the built-in table when no entries are configured.
    pub fn from_entries(entries: &[CategoryEntry]) -> Self {
        if entries.is_empty() {
            return Self::builtin();
        }

        let categories = entries
            .iter()
            .map(|entry| CategoryDef {
                label: entry.label.trim().to_lowercase(),
                keywords: entry
                    .keywords
                    .iter()
                    .map(|keyword| match keyword {
                        KeywordEntry::Plain(term) => Keyword {
                            term: term.trim().to_lowercase(),
                            weight: 1,
                        },
                        KeywordEntry::Weighted { term, weight } => Keyword {
                            term: term.trim().to_lowercase(),
                            weight: *weight,
                        },
                    })
                    .collect(),
            })
            .collect();
        Self { categories }
    }

    pub fn categories(&self) -> &[CategoryDef] {
        &self.categories
    }

    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.categories.iter().map(|c| c.label.as_str())
    }
}

impl Default for CategoryTable {
    fn default() -> Self {
        Self::builtin()
    }
}

/// Result of categorizing one page
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryAssignment {
    /// Winning label, or "general" when every score is zero
    pub label: String,

    /// Score of every category in the table
    pub scores: BTreeMap<String, u64>,
}

impl CategoryAssignment {
    /// Assignment for a page with no content to score
    pub fn general() -> Self {
        Self {
            label: GENERAL_CATEGORY.to_string(),
            scores: BTreeMap::new(),
        }
    }

    /// Score of the winning label (0 for "general")
    pub fn winning_score(&self) -> u64 {
        self.scores.get(&self.label).copied().unwrap_or(0)
    }
}

/// Assigns topic labels with weighted keyword scoring
#[derive(Debug, Clone, Default)]
pub struct Categorizer {
    table: CategoryTable,
}

impl Categorizer {
    pub fn new(table: CategoryTable) -> Self {
        Self { table }
    }

    pub fn table(&self) -> &CategoryTable {
        &self.table
    }

    /// Categorizes text, weighting keywords that also appear in the title
    ///
    /// For each category the score is the sum over its keywords of
    /// `occurrences × weight × (2 if in title else 1)`, counted whole-word in
    /// the lowercased title and text. The highest score wins, the first
    /// declared category wins ties, and an all-zero table yields "general".
    ///
    /// # Examples
    ///
    /// ```
    /// use sumi_sieve::classify::Categorizer;
    ///
    /// let categorizer = Categorizer::default();
    /// let assignment = categorizer.categorize("New software release notes", None);
    /// assert_eq!(assignment.label, "technology");
    /// ```
    pub fn categorize(&self, text: &str, title: Option<&str>) -> CategoryAssignment {
        let title_lower = title.unwrap_or_default().to_lowercase();
        let combined = format!("{} {}", title_lower, text.to_lowercase());

        let mut scores = BTreeMap::new();
        let mut best: Option<(&str, u64)> = None;

        for category in self.table.categories() {
            let score: u64 = category
                .keywords
                .iter()
                .map(|keyword| {
                    let occurrences = count_whole_word(&combined, &keyword.term) as u64;
                    let importance = if count_whole_word(&title_lower, &keyword.term) > 0 {
                        2
                    } else {
                        1
                    };
                    occurrences * keyword.weight as u64 * importance
                })
                .sum();

            scores.insert(category.label.clone(), score);

            // Strictly greater: the first declared category keeps ties
            if score > 0 && best.map_or(true, |(_, top)| score > top) {
                best = Some((&category.label, score));
            }
        }

        let label = best
            .map(|(label, _)| label.to_string())
            .unwrap_or_else(|| GENERAL_CATEGORY.to_string());

        CategoryAssignment { label, scores }
    }
}

/// Counts non-overlapping occurrences of `needle` bounded by non-alphanumerics
fn count_whole_word(haystack: &str, needle: &str) -> usize {
    if needle.is_empty() {
        return 0;
    }

    haystack
        .match_indices(needle)
        .filter(|(start, matched)| {
            let before = haystack[..*start].chars().next_back();
            let after = haystack[start + matched.len()..].chars().next();
            !before.is_some_and(char::is_alphanumeric) && !after.is_some_and(char::is_alphanumeric)
        })
        .count()
}
