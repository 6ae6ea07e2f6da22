//! schema.org JSON-LD documents.

use crate::config::SiteConfig;
use crate::error::BuildError;
use crate::models::{Article, Category};
use crate::outputs::{absolute_image_url, article_url};
use crate::utils::{format_iso8601, slugify, strip_html, truncate_chars};
use serde_json::{Value, json};

const SCHEMA_CONTEXT: &str = "https://schema.org";

/// Google truncates longer headlines in rich results.
pub const MAX_HEADLINE_CHARS: usize = 110;

/// `NewsArticle` document for an article page.
///
/// The content API has one timestamp, so `datePublished` and `dateModified`
/// are equal. Both are omitted when the timestamp does not parse.
pub fn news_article_schema(article: &Article, site: &SiteConfig, keywords: &[String]) -> Value {
    let newsroom = format!("{} Newsroom", site.brand);
    let author = article.author_or(&newsroom);
    let url = article_url(site, article);

    let mut schema = json!({
        "@context": SCHEMA_CONTEXT,
        "@type": "NewsArticle",
        "headline": truncate_chars(&article.title, MAX_HEADLINE_CHARS),
        "description": strip_html(&article.summary),
        "image": [absolute_image_url(site, article.image_ref())],
        "author": {
            "@type": "Person",
            "name": author,
            "url": site.absolute(&format!("/author/{}", slugify(author))),
        },
        "publisher": publisher(site),
        "mainEntityOfPage": {
            "@type": "WebPage",
            "@id": url,
        },
        "articleSection": Category::display_name(&article.category_slug),
        "keywords": keywords.join(", "),
        "mentions": keywords
            .iter()
            .map(|k| json!({ "@type": "Thing", "name": k }))
            .collect::<Vec<_>>(),
        "inLanguage": site.language,
    });

    if let (Some(updated), Some(obj)) = (article.updated_at(), schema.as_object_mut()) {
        let iso = format_iso8601(&updated);
        obj.insert("datePublished".into(), Value::String(iso.clone()));
        obj.insert("dateModified".into(), Value::String(iso));
    }
    schema
}

fn publisher(site: &SiteConfig) -> Value {
    json!({
        "@type": "NewsMediaOrganization",
        "name": site.brand,
        "url": site.site_url,
        "logo": {
            "@type": "ImageObject",
            "url": site.logo_url(),
            "width": 600,
            "height": 60,
        },
    })
}

pub fn organization_schema(site: &SiteConfig) -> Value {
    let mut org = publisher(site);
    if let Some(obj) = org.as_object_mut() {
        obj.insert("@context".into(), json!(SCHEMA_CONTEXT));
        obj.insert("description".into(), json!(site.description));
        let handle = site.twitter_handle.trim_start_matches('@');
        if !handle.is_empty() {
            obj.insert("sameAs".into(), json!([format!("https://twitter.com/{handle}")]));
        }
    }
    org
}

/// `WebSite` document with a sitelinks search box.
pub fn website_schema(site: &SiteConfig) -> Value {
    json!({
        "@context": SCHEMA_CONTEXT,
        "@type": "WebSite",
        "name": site.brand,
        "url": site.site_url,
        "inLanguage": site.language,
        "potentialAction": {
            "@type": "SearchAction",
            "target": format!("{}/search?q={{search_term_string}}", site.site_url),
            "query-input": "required name=search_term_string",
        },
    })
}

/// `BreadcrumbList` from `(name, url)` pairs, root first.
pub fn breadcrumb_schema(items: &[(&str, &str)]) -> Value {
    let elements: Vec<Value> = items
        .iter()
        .enumerate()
        .map(|(i, (name, url))| {
            json!({
                "@type": "ListItem",
                "position": i + 1,
                "name": name,
                "item": url,
            })
        })
        .collect();

    json!({
        "@context": SCHEMA_CONTEXT,
        "@type": "BreadcrumbList",
        "itemListElement": elements,
    })
}

/// Render `value` inside a `<script type="application/ld+json">` tag.
///
/// `</` is escaped so string values cannot close the script element.
pub fn json_ld_script(value: &Value) -> Result<String, BuildError> {
    let body = serde_json::to_string(value)?.replace("</", "<\\/");
    Ok(format!("<script type=\"application/ld+json\">{body}</script>"))
}
