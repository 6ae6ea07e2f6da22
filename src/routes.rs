//! HTTP surface of the feed service.
//!
//! | Route | Body |
//! |-------|------|
//! | `/rss.xml`, `/feed` | RSS 2.0 |
//! | `/sitemap.xml` | general sitemap |
//! | `/news-sitemap.xml` | news sitemap, all dated articles |
//! | `/google-news-sitemap.xml` | news sitemap, last 48 hours |
//! | `/robots.txt` | crawler policy |
//! | `/seo/site` | organization and website JSON-LD |
//! | `/seo/category/:slug` | [`PageMetadata`] JSON |
//! | `/seo/article/:category/:slug` | [`PageMetadata`] JSON |
//! | `/healthz` | `ok` |
//!
//! Feed routes never surface upstream failures: the client soft-fails to an
//! empty list and the builders still produce a valid document. Only a build
//! failure changes the status code.

use crate::api::NewsApiClient;
use crate::cli::Document;
use crate::config::SiteConfig;
use crate::error::BuildError;
use crate::models::Category;
use crate::outputs::news_sitemap::{NEWS_SITEMAP_CONTENT_TYPE, NewsVariant, build_news_sitemap};
use crate::outputs::robots::{ROBOTS_CACHE_CONTROL, ROBOTS_CONTENT_TYPE, render_robots};
use crate::outputs::rss::{RSS_CACHE_CONTROL, RSS_CONTENT_TYPE, build_rss, fallback_rss};
use crate::outputs::sitemap::{SITEMAP_CACHE_CONTROL, SITEMAP_CONTENT_TYPE, build_sitemap, render_sitemap};
use crate::seo::jsonld::{breadcrumb_schema, json_ld_script, organization_schema, website_schema};
use crate::seo::{PageContext, PageMetadata, PageType, assemble};
use axum::extract::{Path, State};
use axum::http::{HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use chrono::{DateTime, Utc};
use serde_json::json;
use std::sync::Arc;
use std::time::Instant;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, info, instrument, warn};

const X_ROBOTS_TAG: &str = "x-robots-tag";

/// Shared, read-only state handed to every handler.
#[derive(Debug, Clone)]
pub struct AppState {
    pub site: SiteConfig,
    pub client: NewsApiClient,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/rss.xml", get(rss))
        .route("/feed", get(rss))
        .route("/sitemap.xml", get(sitemap))
        .route("/news-sitemap.xml", get(news_sitemap))
        .route("/google-news-sitemap.xml", get(google_news_sitemap))
        .route("/robots.txt", get(robots))
        .route("/seo/site", get(site_metadata))
        .route("/seo/category/:slug", get(category_metadata))
        .route("/seo/article/:category/:slug", get(article_metadata))
        .route("/healthz", get(|| async { "ok" }))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(Arc::new(state))
}

/// Fetch the upstream data for `document` and build it.
///
/// Upstream failures are absorbed here; the only error left is a build
/// failure.
pub async fn build_document(
    state: &AppState,
    document: Document,
    now: DateTime<Utc>,
) -> Result<String, BuildError> {
    let endpoints = state.client.endpoints();
    match document {
        Document::Rss => {
            let articles = state.client.fetch_or_empty(&endpoints.rss).await;
            build_rss(&articles, &state.site, now)
        }
        Document::Sitemap => {
            let articles = match state.client.fetch(&endpoints.sitemap).await {
                Ok(articles) => Some(articles),
                Err(e) => {
                    warn!(error = %e, "Sitemap articles unavailable; serving static and category entries only");
                    None
                }
            };
            let entries = build_sitemap(articles.as_deref(), &state.site, now);
            render_sitemap(&entries)
        }
        Document::NewsSitemap => {
            let articles = state.client.fetch_or_empty(&endpoints.news_sitemap).await;
            build_news_sitemap(&articles, &state.site, NewsVariant::General, now)
        }
        Document::GoogleNews => {
            let articles = state.client.fetch_or_empty(&endpoints.google_news).await;
            build_news_sitemap(&articles, &state.site, NewsVariant::GoogleNews, now)
        }
        Document::Robots => Ok(render_robots(&state.site)),
    }
}

fn document_response(content_type: &'static str, cache_control: &'static str, body: String) -> Response {
    (
        [
            (header::CONTENT_TYPE, content_type),
            (header::CACHE_CONTROL, cache_control),
        ],
        body,
    )
        .into_response()
}

/// 500 with the minimal RSS shell, still typed as RSS.
fn rss_failure(site: &SiteConfig, e: &BuildError) -> Response {
    error!(error = %e, "Failed to build RSS feed; serving empty channel");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        [(header::CONTENT_TYPE, RSS_CONTENT_TYPE)],
        fallback_rss(site),
    )
        .into_response()
}

/// 500 with a plain-text body naming the document.
fn sitemap_failure(document: &'static str, e: &BuildError) -> Response {
    error!(document, error = %e, "Failed to build sitemap");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
        format!("Error generating {document}"),
    )
        .into_response()
}

#[instrument(level = "info", skip_all)]
async fn rss(State(state): State<Arc<AppState>>) -> Response {
    let t0 = Instant::now();
    match build_document(&state, Document::Rss, Utc::now()).await {
        Ok(xml) => {
            info!(bytes = xml.len(), elapsed_ms = t0.elapsed().as_millis() as u64, "Served RSS feed");
            document_response(RSS_CONTENT_TYPE, RSS_CACHE_CONTROL, xml)
        }
        Err(e) => rss_failure(&state.site, &e),
    }
}

#[instrument(level = "info", skip_all)]
async fn sitemap(State(state): State<Arc<AppState>>) -> Response {
    match build_document(&state, Document::Sitemap, Utc::now()).await {
        Ok(xml) => document_response(SITEMAP_CONTENT_TYPE, SITEMAP_CACHE_CONTROL, xml),
        Err(e) => sitemap_failure("sitemap", &e),
    }
}

#[instrument(level = "info", skip_all)]
async fn news_sitemap(State(state): State<Arc<AppState>>) -> Response {
    match build_document(&state, Document::NewsSitemap, Utc::now()).await {
        Ok(xml) => document_response(
            NEWS_SITEMAP_CONTENT_TYPE,
            NewsVariant::General.cache_control(),
            xml,
        ),
        Err(e) => sitemap_failure("news sitemap", &e),
    }
}

#[instrument(level = "info", skip_all)]
async fn google_news_sitemap(State(state): State<Arc<AppState>>) -> Response {
    match build_document(&state, Document::GoogleNews, Utc::now()).await {
        Ok(xml) => {
            let mut response = document_response(
                NEWS_SITEMAP_CONTENT_TYPE,
                NewsVariant::GoogleNews.cache_control(),
                xml,
            );
            response
                .headers_mut()
                .insert(X_ROBOTS_TAG, HeaderValue::from_static("noindex"));
            response
        }
        Err(e) => sitemap_failure("Google News sitemap", &e),
    }
}

async fn robots(State(state): State<Arc<AppState>>) -> Response {
    document_response(ROBOTS_CONTENT_TYPE, ROBOTS_CACHE_CONTROL, render_robots(&state.site))
}

#[instrument(level = "info", skip(state))]
async fn category_metadata(
    State(state): State<Arc<AppState>>,
    Path(slug): Path<String>,
) -> Json<PageMetadata> {
    let Some(category) = Category::lookup(&slug) else {
        warn!(%slug, "Unknown category; returning site defaults");
        return Json(assemble(&PageContext::default(), &state.site));
    };

    let ctx = PageContext {
        title: Some(format!("{} News", category.name)),
        description: Some(format!(
            "Latest {} news and updates from {}.",
            category.name, state.site.brand
        )),
        category: Some(category.slug.to_string()),
        path: Some(format!("/{}", category.slug)),
        page_type: Some(PageType::Website),
        ..PageContext::default()
    };
    let mut meta = assemble(&ctx, &state.site);
    meta.json_ld = Some(breadcrumb_schema(&[
        ("Home", state.site.site_url.as_str()),
        (category.name, meta.canonical.as_str()),
    ]));
    Json(meta)
}

/// Site-wide structured data for the home page: organization and search box.
#[instrument(level = "info", skip_all)]
async fn site_metadata(State(state): State<Arc<AppState>>) -> Response {
    let organization = organization_schema(&state.site);
    let website = website_schema(&state.site);

    let scripts = [&organization, &website]
        .into_iter()
        .map(json_ld_script)
        .collect::<Result<Vec<_>, _>>();
    match scripts {
        Ok(scripts) => Json(json!({
            "jsonLd": [organization, website],
            "script": scripts.concat(),
        }))
        .into_response(),
        Err(e) => {
            error!(error = %e, "Failed to render site JSON-LD");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": "failed to render structured data" })),
            )
                .into_response()
        }
    }
}

#[instrument(level = "info", skip(state))]
async fn article_metadata(
    State(state): State<Arc<AppState>>,
    Path((category, slug)): Path<(String, String)>,
) -> Response {
    match state.client.fetch_article(&category, &slug).await {
        Ok(Some(article)) => {
            let ctx = PageContext {
                article: Some(article),
                page_type: Some(PageType::Article),
                ..PageContext::default()
            };
            Json(assemble(&ctx, &state.site)).into_response()
        }
        Ok(None) => (
            StatusCode::NOT_FOUND,
            Json(json!({ "error": "article not found" })),
        )
            .into_response(),
        Err(e) => {
            warn!(error = %e, "Article lookup failed");
            (
                StatusCode::BAD_GATEWAY,
                Json(json!({ "error": "content API unavailable" })),
            )
                .into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::UpstreamConfig;
    use crate::test_support::{article_at, count_elements, sample_article_json, site, spawn_upstream};
    use axum::body::{Body, to_bytes};
    use axum::http::Request;
    use serde_json::Value;
    use tower::ServiceExt;

    fn feed(articles: Vec<Value>) -> Json<Value> {
        Json(json!({ "success": true, "data": { "articles": articles } }))
    }

    fn healthy_upstream() -> Router {
        let fresh = serde_json::to_value(article_at("fresh-story", "tripura", Utc::now())).unwrap();
        let fresh_for_news = fresh.clone();
        Router::new()
            .route("/api/v1/feeds/rss", get(|| async { feed(vec![sample_article_json()]) }))
            .route("/api/v1/feeds/sitemap", get(|| async { feed(vec![sample_article_json()]) }))
            .route(
                "/api/v1/feeds/newsitemap",
                get(move || async move { feed(vec![sample_article_json(), fresh_for_news]) }),
            )
            .route(
                "/api/v1/feeds/googlenews",
                get(move || async move { feed(vec![sample_article_json(), fresh]) }),
            )
            .route(
                "/api/v1/articles/tripura/city-council-budget",
                get(|| async { Json(json!({ "success": true, "data": { "article": sample_article_json() } })) }),
            )
            .route(
                "/api/v1/articles/tripura/missing",
                get(|| async { Json(json!({ "success": true, "data": { "article": null } })) }),
            )
    }

    fn failing_upstream() -> Router {
        Router::new().fallback(|| async { StatusCode::SERVICE_UNAVAILABLE })
    }

    async fn app(upstream: Router) -> Router {
        let base_url = spawn_upstream(upstream).await;
        let upstream = UpstreamConfig {
            base_url,
            timeout_secs: 2,
            ..UpstreamConfig::default()
        };
        let client = NewsApiClient::new(&upstream).unwrap();
        router(AppState {
            site: SiteConfig { upstream, ..site() },
            client,
        })
    }

    async fn get_path(app: Router, path: &str) -> (StatusCode, axum::http::HeaderMap, String) {
        let response = app
            .oneshot(Request::builder().uri(path).body(Body::empty()).unwrap())
            .await
            .unwrap();
        read_response(response).await
    }

    async fn read_response(response: Response) -> (StatusCode, axum::http::HeaderMap, String) {
        let status = response.status();
        let headers = response.headers().clone();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, headers, String::from_utf8(body.to_vec()).unwrap())
    }

    #[tokio::test]
    async fn test_rss_failure_serves_shell() {
        let (status, headers, body) =
            read_response(rss_failure(&site(), &BuildError::Unbalanced(1))).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(headers[header::CONTENT_TYPE], RSS_CONTENT_TYPE);
        assert_eq!(body, fallback_rss(&site()));
        assert_eq!(count_elements(&body, "channel"), 1);
        assert_eq!(count_elements(&body, "item"), 0);
    }

    #[tokio::test]
    async fn test_sitemap_failure_is_plain_text() {
        let (status, headers, body) =
            read_response(sitemap_failure("news sitemap", &BuildError::Unbalanced(1))).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(headers[header::CONTENT_TYPE], "text/plain; charset=utf-8");
        assert_eq!(body, "Error generating news sitemap");
    }

    #[tokio::test]
    async fn test_rss_route() {
        let (status, headers, body) = get_path(app(healthy_upstream()).await, "/rss.xml").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(headers[header::CONTENT_TYPE], RSS_CONTENT_TYPE);
        assert_eq!(headers[header::CACHE_CONTROL], RSS_CACHE_CONTROL);
        assert_eq!(count_elements(&body, "item"), 1);
        assert!(body.contains("<pubDate>Wed, 15 Jan 2025 10:00:00 GMT</pubDate>"));
    }

    #[tokio::test]
    async fn test_feed_alias() {
        let (status, _, body) = get_path(app(healthy_upstream()).await, "/feed").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(count_elements(&body, "channel"), 1);
    }

    #[tokio::test]
    async fn test_rss_with_failing_upstream_is_empty_channel() {
        let (status, headers, body) = get_path(app(failing_upstream()).await, "/rss.xml").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(headers[header::CONTENT_TYPE], RSS_CONTENT_TYPE);
        assert_eq!(count_elements(&body, "channel"), 1);
        assert_eq!(count_elements(&body, "item"), 0);
    }

    #[tokio::test]
    async fn test_sitemap_with_failing_upstream_keeps_static_entries() {
        let (status, _, body) = get_path(app(failing_upstream()).await, "/sitemap.xml").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("<loc>https://www.tripuradispatch.com/about-us</loc>"));
        assert!(body.contains("<loc>https://www.tripuradispatch.com/tripura</loc>"));
        assert!(!body.contains("city-council-budget"));
    }

    #[tokio::test]
    async fn test_sitemap_route() {
        let (status, headers, body) = get_path(app(healthy_upstream()).await, "/sitemap.xml").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(headers[header::CONTENT_TYPE], SITEMAP_CONTENT_TYPE);
        assert!(body.contains("<loc>https://www.tripuradispatch.com/tripura/city-council-budget</loc>"));
    }

    #[tokio::test]
    async fn test_news_sitemaps() {
        let app = app(healthy_upstream()).await;

        let (status, headers, body) = get_path(app.clone(), "/news-sitemap.xml").await;
        assert_eq!(status, StatusCode::OK);
        assert!(headers.get(X_ROBOTS_TAG).is_none());
        assert_eq!(count_elements(&body, "url"), 2);

        let (status, headers, body) = get_path(app, "/google-news-sitemap.xml").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(headers[X_ROBOTS_TAG], "noindex");
        assert!(headers[header::CACHE_CONTROL].to_str().unwrap().contains("s-maxage=900"));
        assert_eq!(count_elements(&body, "url"), 1);
        assert!(body.contains("/tripura/fresh-story</loc>"));
    }

    #[tokio::test]
    async fn test_robots_and_health() {
        let app = app(failing_upstream()).await;
        let (status, headers, body) = get_path(app.clone(), "/robots.txt").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(headers[header::CONTENT_TYPE], ROBOTS_CONTENT_TYPE);
        assert!(body.contains("Sitemap: https://www.tripuradispatch.com/news-sitemap.xml"));

        let (status, _, body) = get_path(app, "/healthz").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "ok");
    }

    #[tokio::test]
    async fn test_category_metadata() {
        let app = app(failing_upstream()).await;
        let (status, _, body) = get_path(app.clone(), "/seo/category/sports").await;
        assert_eq!(status, StatusCode::OK);
        let meta: Value = serde_json::from_str(&body).unwrap();
        assert_eq!(meta["title"], "Sports News | Tripura Dispatch");
        assert_eq!(meta["canonical"], "https://www.tripuradispatch.com/sports");
        assert_eq!(meta["openGraph"]["type"], "website");
        assert_eq!(meta["jsonLd"]["@type"], "BreadcrumbList");
        assert_eq!(
            meta["jsonLd"]["itemListElement"][1]["item"],
            "https://www.tripuradispatch.com/sports"
        );

        let (status, _, body) = get_path(app, "/seo/category/weather").await;
        assert_eq!(status, StatusCode::OK);
        let meta: Value = serde_json::from_str(&body).unwrap();
        assert!(meta["title"].as_str().unwrap().starts_with("Tripura Dispatch - "));
    }

    #[tokio::test]
    async fn test_site_metadata() {
        let (status, _, body) = get_path(app(failing_upstream()).await, "/seo/site").await;
        assert_eq!(status, StatusCode::OK);
        let value: Value = serde_json::from_str(&body).unwrap();
        assert_eq!(value["jsonLd"][0]["@type"], "NewsMediaOrganization");
        assert_eq!(value["jsonLd"][1]["@type"], "WebSite");
        let script = value["script"].as_str().unwrap();
        assert_eq!(script.matches("<script type=\"application/ld+json\">").count(), 2);
    }

    #[tokio::test]
    async fn test_article_metadata() {
        let app = app(healthy_upstream()).await;
        let (status, _, body) =
            get_path(app.clone(), "/seo/article/tripura/city-council-budget").await;
        assert_eq!(status, StatusCode::OK);
        let meta: Value = serde_json::from_str(&body).unwrap();
        assert_eq!(meta["title"], "City Council Approves Budget | Tripura Dispatch");
        assert_eq!(meta["jsonLd"]["@type"], "NewsArticle");

        let (status, _, _) = get_path(app, "/seo/article/tripura/missing").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_article_metadata_upstream_failure() {
        let (status, _, body) =
            get_path(app(failing_upstream()).await, "/seo/article/tripura/anything").await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert!(body.contains("error"));
    }
}
