//! Google News sitemaps.
//!
//! Two variants share one renderer and differ only in which articles qualify:
//!
//! | Variant | Articles | Cache |
//! |---------|----------|-------|
//! | [`NewsVariant::General`] | every article with a valid timestamp | 30 min |
//! | [`NewsVariant::GoogleNews`] | updated in the last 48 hours, first 1000 | 15 min |
//!
//! Both variants percent-encode the category and slug path segments of `<loc>`.

use super::{
    XML_DECLARATION, article_url, cdata_element, close_element, ensure_well_formed,
    open_element, text_element,
};
use crate::config::SiteConfig;
use crate::error::BuildError;
use crate::keywords;
use crate::models::Article;
use crate::utils::format_iso8601;
use chrono::{DateTime, Duration, Utc};
use tracing::info;

pub const NEWS_SITEMAP_CONTENT_TYPE: &str = "application/xml; charset=utf-8";

/// Google News ignores URLs older than two days.
pub const GOOGLE_NEWS_WINDOW_HOURS: i64 = 48;

/// Maximum `<url>` entries in one Google News sitemap.
pub const GOOGLE_NEWS_MAX_URLS: usize = 1000;

/// Articles dated slightly ahead of the server clock are still accepted.
const CLOCK_SKEW_MINUTES: i64 = 5;

const URLSET_OPEN: &str = concat!(
    "<urlset xmlns=\"http://www.sitemaps.org/schemas/sitemap/0.9\"",
    " xmlns:news=\"http://www.google.com/schemas/sitemap-news/0.9\">\n"
);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NewsVariant {
    General,
    GoogleNews,
}

impl NewsVariant {
    pub fn cache_control(self) -> &'static str {
        match self {
            NewsVariant::General => "public, s-maxage=1800, stale-while-revalidate=600",
            NewsVariant::GoogleNews => "public, s-maxage=900, stale-while-revalidate=300",
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            NewsVariant::General => "news-sitemap",
            NewsVariant::GoogleNews => "google-news-sitemap",
        }
    }
}

/// Articles that belong in `variant`, paired with their parsed timestamps.
///
/// Google News filters by age first and truncates second, so the cap applies
/// to recent articles only. Input order is preserved.
pub fn eligible_articles(
    articles: &[Article],
    variant: NewsVariant,
    now: DateTime<Utc>,
) -> Vec<(&Article, DateTime<Utc>)> {
    let dated = articles
        .iter()
        .filter_map(|article| article.updated_at().map(|updated| (article, updated)));

    match variant {
        NewsVariant::General => dated.collect(),
        NewsVariant::GoogleNews => {
            let oldest = now - Duration::hours(GOOGLE_NEWS_WINDOW_HOURS);
            let newest = now + Duration::minutes(CLOCK_SKEW_MINUTES);
            dated
                .filter(|(_, updated)| *updated >= oldest && *updated <= newest)
                .take(GOOGLE_NEWS_MAX_URLS)
                .collect()
        }
    }
}

/// Build the news sitemap document for `variant`.
///
/// # Arguments
///
/// * `articles` - Articles as returned by the content API
/// * `site` - Site URL and publication name
/// * `variant` - [`NewsVariant::General`] for every dated article,
///   [`NewsVariant::GoogleNews`] for the 48-hour window capped at
///   [`GOOGLE_NEWS_MAX_URLS`]
/// * `now` - Reference time for the window
///
/// # Returns
///
/// A `urlset` document in Google News format, or a [`BuildError`] when the
/// result is not well-formed.
pub fn build_news_sitemap(
    articles: &[Article],
    site: &SiteConfig,
    variant: NewsVariant,
    now: DateTime<Utc>,
) -> Result<String, BuildError> {
    let eligible = eligible_articles(articles, variant, now);

    let mut xml = String::with_capacity(1024 + eligible.len() * 1024);
    xml.push_str(XML_DECLARATION);
    xml.push_str(URLSET_OPEN);

    for (article, updated) in &eligible {
        let keywords = keywords::generate(article, &article.category_slug).join(", ");

        open_element(&mut xml, 1, "url");
        text_element(&mut xml, 2, "loc", &article_url(site, article));
        open_element(&mut xml, 2, "news:news");
        open_element(&mut xml, 3, "news:publication");
        text_element(&mut xml, 4, "news:name", &site.brand);
        text_element(&mut xml, 4, "news:language", &site.news_language);
        close_element(&mut xml, 3, "news:publication");
        text_element(&mut xml, 3, "news:publication_date", &format_iso8601(updated));
        cdata_element(&mut xml, 3, "news:title", &article.title);
        cdata_element(&mut xml, 3, "news:keywords", &keywords);
        close_element(&mut xml, 2, "news:news");
        close_element(&mut xml, 1, "url");
    }

    xml.push_str("</urlset>\n");

    info!(
        variant = variant.name(),
        fetched = articles.len(),
        urls = eligible.len(),
        "Built news sitemap"
    );

    ensure_well_formed(&xml)?;
    Ok(xml)
}
