//! General sitemap: static pages, category landing pages and articles.
//!
//! Entries are collected as [`SitemapEntry`] values first and rendered
//! separately, so the routing layer can still serve static and category
//! entries when the article fetch failed.

use super::{XML_DECLARATION, article_url, close_element, ensure_well_formed, open_element, text_element};
use crate::config::SiteConfig;
use crate::error::BuildError;
use crate::models::{Article, Category, ChangeFrequency, SitemapEntry, TOP_PRIORITY_CATEGORY};
use crate::utils::{encode_segment, format_iso8601};
use chrono::{DateTime, Utc};
use tracing::info;

pub const SITEMAP_CONTENT_TYPE: &str = "application/xml; charset=utf-8";
pub const SITEMAP_CACHE_CONTROL: &str = "public, s-maxage=1800, stale-while-revalidate=600";

const STATIC_ROUTES: &[(&str, f32, ChangeFrequency)] = &[
    ("/", 1.0, ChangeFrequency::Hourly),
    ("/latest", 0.9, ChangeFrequency::Hourly),
    ("/about-us", 0.5, ChangeFrequency::Monthly),
    ("/contact-us", 0.5, ChangeFrequency::Monthly),
    ("/privacy-policy", 0.3, ChangeFrequency::Yearly),
    ("/terms-and-conditions", 0.3, ChangeFrequency::Yearly),
];

const TOP_ARTICLE_PRIORITY: f32 = 0.9;
const ARTICLE_PRIORITY: f32 = 0.8;

/// Collect sitemap entries.
///
/// # Arguments
///
/// * `articles` - `None` when the upstream could not be reached
/// * `site` - Site URL and the category slugs to list
/// * `now` - `lastmod` for static and category entries
///
/// # Returns
///
/// Static routes, then categories, then every article with a parsable
/// timestamp. Without articles only the first two groups are present.
pub fn build_sitemap(
    articles: Option<&[Article]>,
    site: &SiteConfig,
    now: DateTime<Utc>,
) -> Vec<SitemapEntry> {
    let articles = articles.unwrap_or_default();
    let mut entries =
        Vec::with_capacity(STATIC_ROUTES.len() + site.sitemap_categories.len() + articles.len());

    entries.extend(STATIC_ROUTES.iter().map(|(path, priority, freq)| SitemapEntry {
        url: if *path == "/" {
            site.site_url.clone()
        } else {
            site.absolute(path)
        },
        last_modified: Some(now),
        change_frequency: *freq,
        priority: *priority,
    }));

    entries.extend(site.sitemap_categories.iter().map(|slug| SitemapEntry {
        url: format!("{}/{}", site.site_url, encode_segment(slug)),
        last_modified: Some(now),
        change_frequency: ChangeFrequency::Hourly,
        priority: Category::priority_for(slug),
    }));

    let before = entries.len();
    entries.extend(articles.iter().filter_map(|article| {
        let updated = article.updated_at()?;
        let priority = if article.category_slug == TOP_PRIORITY_CATEGORY {
            TOP_ARTICLE_PRIORITY
        } else {
            ARTICLE_PRIORITY
        };
        Some(SitemapEntry {
            url: article_url(site, article),
            last_modified: Some(updated),
            change_frequency: ChangeFrequency::Daily,
            priority,
        })
    }));

    info!(
        entries = entries.len(),
        articles = entries.len() - before,
        excluded = articles.len() - (entries.len() - before),
        "Collected sitemap entries"
    );
    entries
}

/// Render entries as a sitemaps.org `urlset` document.
pub fn render_sitemap(entries: &[SitemapEntry]) -> Result<String, BuildError> {
    let mut xml = String::with_capacity(256 + entries.len() * 192);
    xml.push_str(XML_DECLARATION);
    xml.push_str("<urlset xmlns=\"http://www.sitemaps.org/schemas/sitemap/0.9\">\n");

    for entry in entries {
        open_element(&mut xml, 1, "url");
        text_element(&mut xml, 2, "loc", &entry.url);
        if let Some(modified) = &entry.last_modified {
            text_element(&mut xml, 2, "lastmod", &format_iso8601(modified));
        }
        text_element(&mut xml, 2, "changefreq", entry.change_frequency.as_str());
        text_element(&mut xml, 2, "priority", &format!("{:.1}", entry.priority));
        close_element(&mut xml, 1, "url");
    }

    xml.push_str("</urlset>\n");
    ensure_well_formed(&xml)?;
    Ok(xml)
}
