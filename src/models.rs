//! Data models shared by the fetch client, the feed builders and the SEO layer.
//!
//! - [`Article`]: one story as delivered by the content API
//! - [`ApiEnvelope`]: the `{ success, data }` wrapper around every API payload
//! - [`Category`]: the fixed table of news sections
//! - [`SitemapEntry`] / [`ChangeFrequency`]: rows of the general sitemap
//!
//! The content API is loosely typed, so [`Article`] fields are deserialized
//! leniently: a missing, `null`, duplicated or oddly typed field falls back
//! to its default instead of rejecting the whole article.

use crate::utils::parse_timestamp;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, de};
use serde_json::{Map, Value};

/// A news article as delivered by the content API.
///
/// `update_timestamp` is the only date the API provides; it serves as both
/// the published and the modified time.
///
/// Several fields arrive under more than one key depending on the endpoint
/// (`urlSlug` / `url_slug` / `slug`, `categorySlug` / `category`, ...). The
/// most specific non-blank key wins, so a payload carrying both spellings
/// still yields an article.
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Article {
    pub id: String,
    pub title: String,
    pub url_slug: String,
    pub category_slug: String,
    pub summary: String,
    pub content: String,
    pub image: Option<String>,
    pub author: String,
    pub update_timestamp: String,
    pub tags: Vec<String>,
}

impl Article {
    /// Parsed update time; `None` makes the article ineligible for feeds.
    pub fn updated_at(&self) -> Option<DateTime<Utc>> {
        parse_timestamp(&self.update_timestamp)
    }

    /// Display name of the author, or `fallback` when the API sent none.
    pub fn author_or<'a>(&'a self, fallback: &'a str) -> &'a str {
        let author = self.author.trim();
        if author.is_empty() { fallback } else { author }
    }

    /// Non-empty image reference, if any.
    pub fn image_ref(&self) -> Option<&str> {
        self.image
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }
}

impl<'de> Deserialize<'de> for Article {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let Value::Object(fields) = Value::deserialize(deserializer)? else {
            return Err(de::Error::custom("article is not a JSON object"));
        };

        Ok(Article {
            id: pick(&fields, &["id", "_id"]).unwrap_or_default(),
            title: pick(&fields, &["title"]).unwrap_or_default(),
            url_slug: pick(&fields, &["urlSlug", "url_slug", "slug"]).unwrap_or_default(),
            category_slug: pick(&fields, &["categorySlug", "category_slug", "category"])
                .or_else(|| {
                    fields
                        .get("category")
                        .and_then(|c| c.get("slug"))
                        .and_then(value_to_string)
                })
                .unwrap_or_default(),
            summary: pick(&fields, &["summary"]).unwrap_or_default(),
            content: pick(&fields, &["content"]).unwrap_or_default(),
            image: pick(&fields, &["image"]),
            author: pick(&fields, &["author"]).unwrap_or_default(),
            update_timestamp: pick(&fields, &["updateTimestamp", "update_timestamp", "updatedAt"])
                .unwrap_or_default(),
            tags: fields.get("tags").map(tags_from_value).unwrap_or_default(),
        })
    }
}

/// First non-blank scalar among `keys`.
fn pick(fields: &Map<String, Value>, keys: &[&str]) -> Option<String> {
    keys.iter()
        .filter_map(|key| fields.get(*key))
        .filter_map(value_to_string)
        .find(|s| !s.trim().is_empty())
}

fn tags_from_value(value: &Value) -> Vec<String> {
    match value {
        Value::Array(items) => items
            .iter()
            .filter_map(value_to_string)
            .filter(|t| !t.trim().is_empty())
            .collect(),
        // Some endpoints send tags as a comma separated string
        Value::String(s) => s
            .split(',')
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_string)
            .collect(),
        _ => Vec::new(),
    }
}

fn value_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// The `{ success, data }` wrapper the content API puts around every payload.
#[derive(Debug, Default, Deserialize)]
pub struct ApiEnvelope {
    #[serde(default)]
    pub success: bool,
    #[serde(default, deserialize_with = "object_or_empty")]
    pub data: Map<String, Value>,
}

fn object_or_empty<'de, D>(deserializer: D) -> Result<Map<String, Value>, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::Object(map) => Ok(map),
        _ => Ok(Map::new()),
    }
}

/// A news section of the site.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Category {
    pub slug: &'static str,
    pub name: &'static str,
    /// Sitemap priority for the category page.
    pub priority: f32,
}

/// Slug of the category whose articles rank highest in the sitemap.
pub const TOP_PRIORITY_CATEGORY: &str = "tripura";

/// Sitemap priority for category slugs missing from [`CATEGORIES`].
pub const DEFAULT_CATEGORY_PRIORITY: f32 = 0.5;

pub const CATEGORIES: &[Category] = &[
    Category { slug: "tripura", name: "Tripura", priority: 0.9 },
    Category { slug: "national", name: "National", priority: 0.8 },
    Category { slug: "world", name: "World", priority: 0.8 },
    Category { slug: "sports", name: "Sports", priority: 0.7 },
    Category { slug: "finance", name: "Finance", priority: 0.7 },
    Category { slug: "article", name: "Articles", priority: 0.6 },
    Category { slug: "showbiz", name: "Showbiz", priority: 0.6 },
    Category { slug: "northeast", name: "Northeast", priority: 0.8 },
    Category { slug: "health", name: "Health", priority: 0.6 },
    Category { slug: "adstender", name: "Ads & Tenders", priority: 0.4 },
];

impl Category {
    pub fn lookup(slug: &str) -> Option<&'static Category> {
        CATEGORIES.iter().find(|c| c.slug == slug)
    }

    pub fn priority_for(slug: &str) -> f32 {
        Self::lookup(slug).map_or(DEFAULT_CATEGORY_PRIORITY, |c| c.priority)
    }

    /// Display name for a slug; unknown slugs are shown as-is.
    pub fn display_name(slug: &str) -> &str {
        Self::lookup(slug).map_or(slug, |c| c.name)
    }
}

/// `<changefreq>` values used by the general sitemap.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeFrequency {
    Hourly,
    Daily,
    Monthly,
    Yearly,
}

impl ChangeFrequency {
    pub fn as_str(self) -> &'static str {
        match self {
            ChangeFrequency::Hourly => "hourly",
            ChangeFrequency::Daily => "daily",
            ChangeFrequency::Monthly => "monthly",
            ChangeFrequency::Yearly => "yearly",
        }
    }
}

/// One row of the general sitemap.
#[derive(Debug, Clone, PartialEq)]
pub struct SitemapEntry {
    pub url: String,
    pub last_modified: Option<DateTime<Utc>>,
    pub change_frequency: ChangeFrequency,
    pub priority: f32,
}
