//! Shared fixtures for unit tests.

use crate::config::SiteConfig;
use crate::models::Article;
use axum::Router;
use chrono::{DateTime, TimeZone, Utc};
use serde_json::{Value, json};

/// Serve `router` on an ephemeral localhost port and return its base URL.
pub async fn spawn_upstream(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind stub upstream");
    let addr = listener.local_addr().expect("stub upstream address");
    tokio::spawn(async move {
        axum::serve(listener, router).await.expect("stub upstream");
    });
    format!("http://{addr}")
}

/// The article used throughout the test suite, as the content API sends it.
pub fn sample_article_json() -> Value {
    json!({
        "id": "a1",
        "title": "City Council Approves Budget",
        "urlSlug": "city-council-budget",
        "categorySlug": "tripura",
        "summary": "Budget passed 7-2",
        "content": "<p>The council voted <b>7-2</b> on Tuesday.</p>",
        "author": "J. Doe",
        "updateTimestamp": "2025-01-15T10:00:00Z",
        "tags": ["budget", "agartala"]
    })
}

pub fn sample_article() -> Article {
    serde_json::from_value(sample_article_json()).expect("sample article")
}

/// An article in `category` updated at `updated`.
pub fn article_at(slug: &str, category: &str, updated: DateTime<Utc>) -> Article {
    Article {
        id: slug.to_string(),
        title: format!("Story {slug}"),
        url_slug: slug.to_string(),
        category_slug: category.to_string(),
        summary: format!("Summary of {slug}"),
        author: "Staff Reporter".to_string(),
        update_timestamp: updated.to_rfc3339(),
        ..Article::default()
    }
}

/// Fixed "now" shortly after the sample article was published.
pub fn fixed_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 1, 16, 9, 0, 0).unwrap()
}

pub fn site() -> SiteConfig {
    SiteConfig {
        site_url: "https://www.tripuradispatch.com".to_string(),
        ..SiteConfig::default()
    }
}

/// Assert that `xml` is well-formed and return the number of `name`
/// start tags it contains.
pub fn count_elements(xml: &str, name: &str) -> usize {
    use quick_xml::Reader;
    use quick_xml::events::Event;

    let mut reader = Reader::from_str(xml);
    let mut count = 0;
    let mut depth = 0usize;
    loop {
        match reader.read_event().expect("well-formed XML") {
            Event::Start(e) => {
                depth += 1;
                if e.name().as_ref() == name.as_bytes() {
                    count += 1;
                }
            }
            Event::Empty(e) => {
                if e.name().as_ref() == name.as_bytes() {
                    count += 1;
                }
            }
            Event::End(_) => depth -= 1,
            Event::Eof => break,
            _ => {}
        }
    }
    assert_eq!(depth, 0, "unclosed elements");
    count
}
