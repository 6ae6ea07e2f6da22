//! Page metadata assembly.
//!
//! [`assemble`] turns a [`PageContext`] (what the renderer knows about the
//! page) into a [`PageMetadata`] value the renderer can emit as `<title>`,
//! `<meta>` and `<script type="application/ld+json">` tags. Missing inputs fall
//! back to site-wide defaults, so every page gets a complete set.
//!
//! # Title rules
//!
//! | Input title | Result |
//! |-------------|--------|
//! | none | `"{brand} - {tagline}"` |
//! | contains the brand | unchanged |
//! | anything else | `"{title} \| {brand}"` |

use super::jsonld::news_article_schema;
use crate::config::SiteConfig;
use crate::keywords::page_keywords;
use crate::models::{Article, Category};
use crate::outputs::{absolute_image_url, article_url};
use crate::utils::{encode_segment, format_iso8601, strip_html};
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const OG_IMAGE_WIDTH: u32 = 1200;
pub const OG_IMAGE_HEIGHT: u32 = 630;
pub const TWITTER_CARD: &str = "summary_large_image";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PageType {
    #[default]
    Website,
    Article,
}

impl PageType {
    pub fn as_str(self) -> &'static str {
        match self {
            PageType::Website => "website",
            PageType::Article => "article",
        }
    }
}

/// What is known about the page being rendered.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PageContext {
    pub title: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    /// Site-relative path; becomes the canonical URL when set.
    pub path: Option<String>,
    pub article: Option<Article>,
    pub image: Option<String>,
    /// Defaults to `article` when an article is present, else `website`.
    pub page_type: Option<PageType>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageMetadata {
    pub title: String,
    pub description: String,
    pub keywords: Vec<String>,
    pub canonical: String,
    pub open_graph: OpenGraph,
    pub twitter: TwitterCard,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub json_ld: Option<Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OpenGraph {
    #[serde(rename = "type")]
    pub og_type: &'static str,
    pub title: String,
    pub description: String,
    pub url: String,
    pub site_name: String,
    pub locale: String,
    pub images: Vec<OgImage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub article: Option<OgArticle>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OgImage {
    pub url: String,
    pub width: u32,
    pub height: u32,
    pub alt: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OgArticle {
    pub published_time: Option<String>,
    pub modified_time: Option<String>,
    pub section: String,
    pub tags: Vec<String>,
    pub authors: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TwitterCard {
    pub card: &'static str,
    pub site: String,
    pub creator: String,
    pub title: String,
    pub description: String,
    pub images: Vec<String>,
}

/// Assemble the full metadata set for a page.
///
/// # Arguments
///
/// * `ctx` - What the front end knows about the page; every field is optional
/// * `site` - Branding and defaults filled in for missing fields
///
/// # Returns
///
/// Title, description, keywords, canonical URL, Open Graph and Twitter card
/// data. `json_ld` is set only for article pages.
pub fn assemble(ctx: &PageContext, site: &SiteConfig) -> PageMetadata {
    let article = ctx.article.as_ref();
    let raw_title = non_empty(&ctx.title).or_else(|| {
        article
            .map(|a| a.title.trim())
            .filter(|t| !t.is_empty())
    });
    let category = non_empty(&ctx.category).or_else(|| {
        article
            .map(|a| a.category_slug.as_str())
            .filter(|c| !c.is_empty())
    });
    let page_type = ctx.page_type.unwrap_or(if article.is_some() {
        PageType::Article
    } else {
        PageType::Website
    });

    let title = page_title(raw_title, site);
    let description = page_description(ctx, site);
    let tags = article.map(|a| a.tags.as_slice()).unwrap_or_default();
    let keywords = page_keywords(raw_title, category, tags);
    let canonical = canonical_url(ctx, category, site);
    let image = match non_empty(&ctx.image) {
        Some(image) => absolute_image_url(site, Some(image)),
        None => absolute_image_url(site, article.and_then(Article::image_ref)),
    };

    let og_article = match (page_type, article) {
        (PageType::Article, Some(a)) => {
            let newsroom = format!("{} Newsroom", site.brand);
            let updated = a.updated_at().map(|d| format_iso8601(&d));
            Some(OgArticle {
                published_time: updated.clone(),
                modified_time: updated,
                section: Category::display_name(&a.category_slug).to_string(),
                tags: a.tags.clone(),
                authors: vec![a.author_or(&newsroom).to_string()],
            })
        }
        _ => None,
    };

    let json_ld = match (page_type, article) {
        (PageType::Article, Some(a)) => Some(news_article_schema(a, site, &keywords)),
        _ => None,
    };

    PageMetadata {
        open_graph: OpenGraph {
            og_type: page_type.as_str(),
            title: title.clone(),
            description: description.clone(),
            url: canonical.clone(),
            site_name: site.brand.clone(),
            locale: site.locale.clone(),
            images: vec![OgImage {
                url: image.clone(),
                width: OG_IMAGE_WIDTH,
                height: OG_IMAGE_HEIGHT,
                alt: title.clone(),
            }],
            article: og_article,
        },
        twitter: TwitterCard {
            card: TWITTER_CARD,
            site: site.twitter_handle.clone(),
            creator: site.twitter_handle.clone(),
            title: title.clone(),
            description: description.clone(),
            images: vec![image],
        },
        title,
        description,
        keywords,
        canonical,
        json_ld,
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

fn page_title(title: Option<&str>, site: &SiteConfig) -> String {
    match title {
        None => format!("{} - {}", site.brand, site.tagline),
        Some(t) if t.contains(site.brand.as_str()) => t.to_string(),
        Some(t) => format!("{t} | {}", site.brand),
    }
}

fn page_description(ctx: &PageContext, site: &SiteConfig) -> String {
    if let Some(description) = non_empty(&ctx.description) {
        return description.to_string();
    }
    ctx.article
        .as_ref()
        .map(|a| strip_html(&a.summary))
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| site.description.clone())
}

fn canonical_url(ctx: &PageContext, category: Option<&str>, site: &SiteConfig) -> String {
    if let Some(path) = non_empty(&ctx.path) {
        return site.absolute(path);
    }
    if let Some(article) = &ctx.article {
        return article_url(site, article);
    }
    match category {
        Some(slug) => format!("{}/{}", site.site_url, encode_segment(slug)),
        None => site.site_url.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{sample_article, site};

    fn article_page() -> PageMetadata {
        assemble(
            &PageContext {
                article: Some(sample_article()),
                ..PageContext::default()
            },
            &site(),
        )
    }

    #[test]
    fn test_title_gets_brand_suffix() {
        let meta = article_page();
        assert_eq!(meta.title, "City Council Approves Budget | Tripura Dispatch");
    }

    #[test]
    fn test_title_with_brand_is_unchanged() {
        let meta = assemble(
            &PageContext {
                title: Some("About Tripura Dispatch".into()),
                ..PageContext::default()
            },
            &site(),
        );
        assert_eq!(meta.title, "About Tripura Dispatch");

        let lower = assemble(
            &PageContext {
                title: Some("about tripura dispatch".into()),
                ..PageContext::default()
            },
            &site(),
        );
        assert_eq!(lower.title, "about tripura dispatch | Tripura Dispatch");
    }

    #[test]
    fn test_defaults_without_context() {
        let site = site();
        let meta = assemble(&PageContext::default(), &site);
        assert_eq!(meta.title, format!("Tripura Dispatch - {}", site.tagline));
        assert_eq!(meta.description, site.description);
        assert_eq!(meta.canonical, "https://www.tripuradispatch.com");
        assert_eq!(meta.open_graph.og_type, "website");
        assert!(meta.open_graph.article.is_none());
        assert!(meta.json_ld.is_none());
        assert_eq!(meta.keywords.len(), 5);
    }

    #[test]
    fn test_description_falls_back_to_stripped_summary() {
        let article = Article {
            summary: "<p>Budget &amp; more</p>".into(),
            ..sample_article()
        };
        let meta = assemble(
            &PageContext {
                article: Some(article),
                ..PageContext::default()
            },
            &site(),
        );
        assert_eq!(meta.description, "Budget & more");

        let explicit = assemble(
            &PageContext {
                description: Some("Custom".into()),
                article: Some(sample_article()),
                ..PageContext::default()
            },
            &site(),
        );
        assert_eq!(explicit.description, "Custom");
    }

    #[test]
    fn test_article_keywords() {
        let meta = article_page();
        assert_eq!(meta.keywords[0], "Tripura news");
        assert!(meta.keywords.contains(&"Tripura politics".to_string()));
        assert!(meta.keywords.contains(&"council".to_string()));
        assert!(meta.keywords.contains(&"agartala".to_string()));
        assert!(meta.keywords.contains(&"city".to_string()));
        assert!(meta.keywords.len() <= 15);
    }

    #[test]
    fn test_open_graph_and_twitter() {
        let meta = article_page();
        let og = &meta.open_graph;
        assert_eq!(og.og_type, "article");
        assert_eq!(og.locale, "en_IN");
        assert_eq!(og.url, "https://www.tripuradispatch.com/tripura/city-council-budget");
        assert_eq!(og.images[0].width, 1200);
        assert_eq!(og.images[0].height, 630);
        assert_eq!(og.images[0].alt, meta.title);

        let og_article = og.article.as_ref().unwrap();
        assert_eq!(og_article.published_time.as_deref(), Some("2025-01-15T10:00:00Z"));
        assert_eq!(og_article.section, "Tripura");
        assert_eq!(og_article.authors, vec!["J. Doe"]);

        assert_eq!(meta.twitter.card, "summary_large_image");
        assert_eq!(meta.twitter.site, "@tripuradispatch");
        assert_eq!(meta.twitter.images, vec![og.images[0].url.clone()]);
    }

    #[test]
    fn test_article_json_ld() {
        let meta = article_page();
        let json_ld = meta.json_ld.unwrap();
        assert_eq!(json_ld["@type"], "NewsArticle");
        assert_eq!(json_ld["keywords"], meta.keywords.join(", "));
    }

    #[test]
    fn test_category_page_canonical_and_image() {
        let meta = assemble(
            &PageContext {
                title: Some("Sports".into()),
                category: Some("sports".into()),
                image: Some("/images/sports.jpg".into()),
                ..PageContext::default()
            },
            &site(),
        );
        assert_eq!(meta.canonical, "https://www.tripuradispatch.com/sports");
        assert_eq!(
            meta.open_graph.images[0].url,
            "https://www.tripuradispatch.com/images/sports.jpg"
        );
        assert!(meta.keywords.contains(&"sports".to_string()));
    }

    #[test]
    fn test_serializes_camel_case() {
        let value = serde_json::to_value(article_page()).unwrap();
        assert!(value.get("openGraph").is_some());
        assert!(value.get("jsonLd").is_some());
        assert_eq!(value["openGraph"]["type"], "article");
        assert_eq!(value["openGraph"]["siteName"], "Tripura Dispatch");
        assert!(value["openGraph"]["article"]["publishedTime"].is_string());
    }
}
