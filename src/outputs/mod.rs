//! Document builders for the crawler- and aggregator-facing endpoints.
//!
//! # Submodules
//!
//! - [`rss`]: RSS 2.0 feed of the latest articles
//! - [`news_sitemap`]: Google News sitemaps (general and 48-hour variants)
//! - [`sitemap`]: general sitemap of static, category and article routes
//! - [`robots`]: robots.txt policy
//!
//! Every builder is a pure function of (articles, site config, now). XML
//! output is checked with [`ensure_well_formed`] before it is returned, so a
//! builder bug surfaces as a [`BuildError`] instead of a broken document.

pub mod news_sitemap;
pub mod robots;
pub mod rss;
pub mod sitemap;

use crate::config::SiteConfig;
use crate::error::BuildError;
use crate::models::Article;
use crate::utils::{cdata, encode_segment, escape_xml};
use quick_xml::Reader;
use quick_xml::events::Event;

pub const XML_DECLARATION: &str = "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n";

/// Canonical article URL: `{site}/{category}/{slug}` with both segments
/// percent-encoded.
pub fn article_url(site: &SiteConfig, article: &Article) -> String {
    format!(
        "{}/{}/{}",
        site.site_url,
        encode_segment(&article.category_slug),
        encode_segment(&article.url_slug)
    )
}

/// Absolute URL for an article image.
///
/// Absolute URLs pass through, protocol-relative ones get `https:`, paths are
/// resolved against the site, and a missing image becomes the placeholder.
pub fn absolute_image_url(site: &SiteConfig, image: Option<&str>) -> String {
    match image.map(str::trim).filter(|s| !s.is_empty()) {
        None => site.placeholder_image_url(),
        Some(img) if img.starts_with("http://") || img.starts_with("https://") => img.to_string(),
        Some(img) if img.starts_with("//") => format!("https:{img}"),
        Some(img) => site.absolute(img),
    }
}

/// Verify that `xml` parses and every element is closed.
pub fn ensure_well_formed(xml: &str) -> Result<(), BuildError> {
    let mut reader = Reader::from_str(xml);
    let mut depth = 0usize;
    loop {
        match reader.read_event()? {
            Event::Start(_) => depth += 1,
            Event::End(_) => depth = depth.saturating_sub(1),
            Event::Eof => break,
            _ => {}
        }
    }
    if depth > 0 {
        return Err(BuildError::Unbalanced(depth));
    }
    Ok(())
}

fn indent(xml: &mut String, level: usize) {
    for _ in 0..level {
        xml.push_str("  ");
    }
}

/// `<name>escaped text</name>` on its own line.
pub(crate) fn text_element(xml: &mut String, level: usize, name: &str, text: &str) {
    indent(xml, level);
    xml.push('<');
    xml.push_str(name);
    xml.push('>');
    xml.push_str(&escape_xml(text));
    xml.push_str("</");
    xml.push_str(name);
    xml.push_str(">\n");
}

/// `<name><![CDATA[text]]></name>` on its own line.
pub(crate) fn cdata_element(xml: &mut String, level: usize, name: &str, text: &str) {
    indent(xml, level);
    xml.push('<');
    xml.push_str(name);
    xml.push('>');
    xml.push_str(&cdata(text));
    xml.push_str("</");
    xml.push_str(name);
    xml.push_str(">\n");
}

pub(crate) fn open_element(xml: &mut String, level: usize, name: &str) {
    indent(xml, level);
    xml.push('<');
    xml.push_str(name);
    xml.push_str(">\n");
}

pub(crate) fn close_element(xml: &mut String, level: usize, name: &str) {
    indent(xml, level);
    xml.push_str("</");
    xml.push_str(name);
    xml.push_str(">\n");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{sample_article, site};

    #[test]
    fn test_article_url() {
        assert_eq!(
            article_url(&site(), &sample_article()),
            "https://www.tripuradispatch.com/tripura/city-council-budget"
        );
    }

    #[test]
    fn test_article_url_encodes_segments() {
        let article = Article {
            category_slug: "ads tenders".into(),
            url_slug: "notice/2025?x".into(),
            ..Article::default()
        };
        assert_eq!(
            article_url(&site(), &article),
            "https://www.tripuradispatch.com/ads%20tenders/notice%2F2025%3Fx"
        );
    }

    #[test]
    fn test_absolute_image_url() {
        let site = site();
        assert_eq!(
            absolute_image_url(&site, Some("https://cdn.example.com/a.jpg")),
            "https://cdn.example.com/a.jpg"
        );
        assert_eq!(
            absolute_image_url(&site, Some("//cdn.example.com/a.jpg")),
            "https://cdn.example.com/a.jpg"
        );
        assert_eq!(
            absolute_image_url(&site, Some("uploads/a.jpg")),
            "https://www.tripuradispatch.com/uploads/a.jpg"
        );
        assert_eq!(
            absolute_image_url(&site, None),
            "https://www.tripuradispatch.com/images/placeholder.jpg"
        );
    }

    #[test]
    fn test_ensure_well_formed() {
        assert!(ensure_well_formed("<a><b/><![CDATA[x < y]]></a>").is_ok());
        assert!(ensure_well_formed("<a><b></a>").is_err());
        assert!(ensure_well_formed("<a><b>").is_err());
    }

    #[test]
    fn test_element_helpers() {
        let mut xml = String::new();
        open_element(&mut xml, 0, "item");
        text_element(&mut xml, 1, "link", "https://x.test/?a=1&b=2");
        cdata_element(&mut xml, 1, "title", "A & B");
        close_element(&mut xml, 0, "item");
        assert_eq!(
            xml,
            "<item>\n  <link>https://x.test/?a=1&amp;b=2</link>\n  <title><![CDATA[A & B]]></title>\n</item>\n"
        );
    }

    #[test]
    fn test_element_helpers_drop_control_characters() {
        let mut xml = String::new();
        open_element(&mut xml, 0, "url");
        text_element(&mut xml, 1, "loc", "https://x.test/a\u{0008}b");
        cdata_element(&mut xml, 1, "news:title", "Budget\u{000B}passed");
        close_element(&mut xml, 0, "url");
        assert!(xml.contains("<loc>https://x.test/ab</loc>"));
        assert!(xml.contains("<news:title><![CDATA[Budgetpassed]]></news:title>"));
        assert!(ensure_well_formed(&xml).is_ok());
    }
}
