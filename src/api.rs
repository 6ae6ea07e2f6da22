//! Client for the upstream content API.
//!
//! Every feed document is built from exactly one GET against the content API.
//! The response is a JSON envelope:
//!
//! ```json
//! { "success": true, "data": { "articles": [ ... ] } }
//! ```
//!
//! # Failure handling
//!
//! [`NewsApiClient::fetch`] returns a tagged result so callers and tests can
//! tell a healthy empty list from an unavailable upstream.
//! [`NewsApiClient::fetch_or_empty`] is what the feed handlers use: any
//! [`FetchError`] is logged and collapsed into an empty list.
//!
//! # Deadline
//!
//! Requests run with the configured timeout (`upstream.timeout_secs`). A
//! timeout is reported as [`FetchError::Timeout`] and handled like any other
//! unavailable upstream.

use crate::config::{Endpoint, Endpoints, UpstreamConfig};
use crate::error::FetchError;
use crate::models::{ApiEnvelope, Article};
use crate::utils::{encode_segment, truncate_for_log};
use serde_json::Value;
use std::time::Instant;
use tracing::{debug, info, instrument, warn};

/// HTTP client bound to one content API origin.
#[derive(Debug, Clone)]
pub struct NewsApiClient {
    http: reqwest::Client,
    base_url: String,
    endpoints: Endpoints,
}

impl NewsApiClient {
    /// Build a client with the configured deadline and a crate user agent.
    pub fn new(config: &UpstreamConfig) -> Result<Self, FetchError> {
        let user_agent = format!("{}/{}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));
        let http = reqwest::Client::builder()
            .timeout(config.timeout())
            .user_agent(user_agent)
            .build()?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            endpoints: config.endpoints.clone(),
        })
    }

    pub fn endpoints(&self) -> &Endpoints {
        &self.endpoints
    }

    /// Fetch the article list behind `endpoint`.
    #[instrument(level = "info", skip_all, fields(path = %endpoint.path, list = %endpoint.list))]
    pub async fn fetch(&self, endpoint: &Endpoint) -> Result<Vec<Article>, FetchError> {
        let mut envelope = self.get_envelope(&endpoint.path).await?;

        match envelope.data.remove(&endpoint.list) {
            Some(Value::Array(items)) => {
                let articles = parse_articles(items);
                info!(count = articles.len(), "Fetched articles");
                Ok(articles)
            }
            Some(other) => {
                warn!(
                    found = %truncate_for_log(&other.to_string(), 120),
                    "Envelope list field is not an array"
                );
                Err(FetchError::MissingList(endpoint.list.clone()))
            }
            None => Err(FetchError::MissingList(endpoint.list.clone())),
        }
    }

    /// Fetch the article list, treating every failure as "no articles".
    pub async fn fetch_or_empty(&self, endpoint: &Endpoint) -> Vec<Article> {
        match self.fetch(endpoint).await {
            Ok(articles) => articles,
            Err(e) => {
                warn!(path = %endpoint.path, error = %e, "Upstream unavailable; continuing with no articles");
                Vec::new()
            }
        }
    }

    /// Fetch one article through the article-detail endpoint.
    ///
    /// `Ok(None)` means the upstream answered successfully but had no such
    /// article.
    #[instrument(level = "info", skip(self))]
    pub async fn fetch_article(
        &self,
        category: &str,
        slug: &str,
    ) -> Result<Option<Article>, FetchError> {
        let endpoint = &self.endpoints.article;
        let path = endpoint
            .path
            .replace("{category}", &encode_segment(category))
            .replace("{slug}", &encode_segment(slug));

        let mut envelope = self.get_envelope(&path).await?;
        match envelope.data.remove(&endpoint.list) {
            Some(item @ Value::Object(_)) => Ok(serde_json::from_value(item).map(Some)?),
            Some(Value::Null) | None => Ok(None),
            Some(_) => Err(FetchError::MissingList(endpoint.list.clone())),
        }
    }

    async fn get_envelope(&self, path: &str) -> Result<ApiEnvelope, FetchError> {
        let url = format!("{}/{}", self.base_url, path.trim_start_matches('/'));
        let t0 = Instant::now();

        let response = self.http.get(&url).send().await?;
        let status = response.status();
        if !status.is_success() {
            warn!(%url, status = status.as_u16(), elapsed_ms = t0.elapsed().as_millis() as u64, "Upstream returned error status");
            return Err(FetchError::Status(status.as_u16()));
        }

        let body = response.bytes().await?;
        debug!(%url, bytes = body.len(), elapsed_ms = t0.elapsed().as_millis() as u64, "Upstream responded");

        let envelope: ApiEnvelope = serde_json::from_slice(&body)?;
        if !envelope.success {
            return Err(FetchError::Unsuccessful);
        }
        Ok(envelope)
    }
}

/// Deserialize each list element on its own so one bad element cannot sink
/// the whole list.
fn parse_articles(items: Vec<Value>) -> Vec<Article> {
    let total = items.len();
    let articles: Vec<Article> = items
        .into_iter()
        .enumerate()
        .filter_map(|(index, item)| {
            if !item.is_object() {
                warn!(index, "Skipping non-object article entry");
                return None;
            }
            match serde_json::from_value::<Article>(item) {
                Ok(article) => Some(article),
                Err(e) => {
                    warn!(index, error = %e, "Skipping malformed article entry");
                    None
                }
            }
        })
        .collect();

    if articles.len() < total {
        info!(kept = articles.len(), skipped = total - articles.len(), "Dropped malformed article entries");
    }
    articles
}
