//! Keyword tables and keyword assembly.
//!
//! Two consumers with different rules:
//!
//! - [`generate`] feeds `<news:keywords>` in the news sitemaps. It
//!   concatenates base, category and location keywords in that order and
//!   keeps duplicates; Google News weighs keywords by position.
//! - [`page_keywords`] feeds page metadata. It takes a short prefix of each
//!   table plus title words and tags, collapses duplicates and caps the list.

use crate::models::Article;
use itertools::Itertools;

/// Brand and region terms that lead every keyword list.
pub const BASE_KEYWORDS: &[&str] = &[
    "Tripura news",
    "Agartala news",
    "Tripura Dispatch",
    "Northeast India news",
    "latest Tripura news",
    "Tripura breaking news",
    "Tripura today",
];

/// Sub-regions of Tripura appended after the category keywords.
pub const LOCATION_KEYWORDS: &[&str] = &[
    "Agartala",
    "West Tripura",
    "Sepahijala",
    "Khowai",
    "Gomati",
    "South Tripura",
    "Dhalai",
    "Unakoti",
    "North Tripura",
];

/// Maximum number of entries returned by [`page_keywords`].
pub const MAX_PAGE_KEYWORDS: usize = 15;

/// Keywords for a category slug; empty for unknown slugs.
pub fn category_keywords(slug: &str) -> &'static [&'static str] {
    match slug {
        "tripura" => &[
            "Tripura politics",
            "Tripura government",
            "Agartala city news",
            "Tripura assembly",
            "Tripura police",
        ],
        "national" => &[
            "India news",
            "national news",
            "Indian politics",
            "Parliament",
            "Supreme Court",
        ],
        "world" => &[
            "world news",
            "international news",
            "global affairs",
            "Bangladesh news",
            "South Asia",
        ],
        "sports" => &[
            "sports news",
            "cricket",
            "football",
            "Tripura sports",
            "Olympics",
        ],
        "finance" => &[
            "business news",
            "finance news",
            "Indian economy",
            "stock market",
            "Sensex Nifty",
        ],
        "article" => &["opinion", "editorial", "analysis", "features", "columns"],
        "showbiz" => &[
            "entertainment news",
            "Bollywood",
            "Kokborok cinema",
            "celebrity news",
            "music",
        ],
        "northeast" => &[
            "Northeast news",
            "Assam news",
            "Manipur news",
            "Mizoram news",
            "Meghalaya news",
        ],
        "health" => &[
            "health news",
            "healthcare Tripura",
            "medical news",
            "wellness",
            "public health",
        ],
        "adstender" => &[
            "Tripura tenders",
            "government tenders",
            "advertisements",
            "notices",
            "e-tender Tripura",
        ],
        _ => &[],
    }
}

/// Ordered keyword list for a news sitemap entry.
///
/// Base keywords, then the category's keywords, then location names. No
/// deduplication. Only `category` selects terms; `article` is unused for now.
pub fn generate(_article: &Article, category: &str) -> Vec<String> {
    BASE_KEYWORDS
        .iter()
        .chain(category_keywords(category))
        .chain(LOCATION_KEYWORDS)
        .map(|k| k.to_string())
        .collect()
}

/// Deduplicated keywords for page metadata, in first-seen order, capped at
/// [`MAX_PAGE_KEYWORDS`].
///
/// Sources in order: the first 5 base keywords, the first 3 keywords of
/// `category`, lower-cased title words longer than 3 characters, and `tags`.
pub fn page_keywords(title: Option<&str>, category: Option<&str>, tags: &[String]) -> Vec<String> {
    let base = BASE_KEYWORDS.iter().take(5).map(|k| k.to_string());
    let from_category = category
        .map(category_keywords)
        .unwrap_or_default()
        .iter()
        .take(3)
        .map(|k| k.to_string());
    let from_title = title
        .unwrap_or_default()
        .split_whitespace()
        .map(str::to_lowercase)
        .filter(|word| word.chars().count() > 3);
    let from_tags = tags.iter().map(|t| t.trim().to_string()).filter(|t| !t.is_empty());

    base.chain(from_category)
        .chain(from_title)
        .chain(from_tags)
        .unique()
        .take(MAX_PAGE_KEYWORDS)
        .collect()
}
