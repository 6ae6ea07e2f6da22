//! Site and upstream configuration.
//!
//! Configuration is layered: built-in defaults, then an optional YAML file
//! (`--config`), then command-line flags and environment variables. The
//! resulting [`SiteConfig`] is immutable for the lifetime of the process.
//!
//! # Example
//!
//! ```yaml
//! brand: Tripura Dispatch
//! site_url: https://www.tripuradispatch.com
//! upstream:
//!   base_url: https://api.tripuradispatch.com
//!   timeout_secs: 8
//!   endpoints:
//!     rss:
//!       path: /api/v1/feeds/rss
//!       list: articles
//! ```

use crate::error::ConfigError;
use crate::models::CATEGORIES;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info, instrument};
use url::Url;

/// Production origin of the content API, used when nothing else is configured.
pub const DEFAULT_API_BASE_URL: &str = "https://api.tripuradispatch.com";

/// Public origin of the news site.
pub const DEFAULT_SITE_URL: &str = "https://www.tripuradispatch.com";

/// An upstream API path and the `data.<list>` field carrying its payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Endpoint {
    pub path: String,
    pub list: String,
}

impl Endpoint {
    pub fn new(path: &str, list: &str) -> Self {
        Self {
            path: path.to_string(),
            list: list.to_string(),
        }
    }
}

/// Upstream paths for every document this service builds.
///
/// The `article` path is a template with `{category}` and `{slug}`
/// placeholders.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Endpoints {
    pub rss: Endpoint,
    pub sitemap: Endpoint,
    pub news_sitemap: Endpoint,
    pub google_news: Endpoint,
    pub article: Endpoint,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            rss: Endpoint::new("/api/v1/feeds/rss", "articles"),
            sitemap: Endpoint::new("/api/v1/feeds/sitemap", "articles"),
            news_sitemap: Endpoint::new("/api/v1/feeds/newsitemap", "articles"),
            google_news: Endpoint::new("/api/v1/feeds/googlenews", "articles"),
            article: Endpoint::new("/api/v1/articles/{category}/{slug}", "article"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UpstreamConfig {
    pub base_url: String,
    /// Per-request deadline; a timeout counts as an unavailable upstream.
    pub timeout_secs: u64,
    pub endpoints: Endpoints,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_BASE_URL.to_string(),
            timeout_secs: 10,
            endpoints: Endpoints::default(),
        }
    }
}

impl UpstreamConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.max(1))
    }
}

/// Branding, URLs and feed constants shared by every builder.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    /// Brand name; also the suffix appended to page titles.
    pub brand: String,
    pub tagline: String,
    pub site_url: String,
    pub description: String,
    /// RSS channel language.
    pub language: String,
    /// Open Graph locale.
    pub locale: String,
    /// `<news:language>` value for news sitemaps.
    pub news_language: String,
    /// Domain used for RSS `author` addresses (`editor@<domain>`).
    pub editor_domain: String,
    pub twitter_handle: String,
    pub logo_path: String,
    pub placeholder_image: String,
    /// Category slugs listed in the general sitemap.
    pub sitemap_categories: Vec<String>,
    pub upstream: UpstreamConfig,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            brand: "Tripura Dispatch".to_string(),
            tagline: "Latest News from Tripura, Northeast India and the World".to_string(),
            site_url: DEFAULT_SITE_URL.to_string(),
            description: "Tripura Dispatch brings you breaking news, politics, sports, \
                          business and culture from Tripura, Northeast India and beyond."
                .to_string(),
            language: "en-in".to_string(),
            locale: "en_IN".to_string(),
            news_language: "en".to_string(),
            editor_domain: "tripuradispatch.com".to_string(),
            twitter_handle: "@tripuradispatch".to_string(),
            logo_path: "/images/logo.png".to_string(),
            placeholder_image: "/images/placeholder.jpg".to_string(),
            sitemap_categories: CATEGORIES.iter().map(|c| c.slug.to_string()).collect(),
            upstream: UpstreamConfig::default(),
        }
    }
}

/// Values supplied on the command line or through the environment.
#[derive(Debug, Default, Clone)]
pub struct Overrides {
    pub api_base_url: Option<String>,
    pub site_url: Option<String>,
    pub timeout_secs: Option<u64>,
}

impl SiteConfig {
    /// Load defaults, merge an optional YAML file, then apply overrides.
    #[instrument(level = "info", skip(overrides))]
    pub async fn load(path: Option<&str>, overrides: &Overrides) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) => {
                let raw = tokio::fs::read_to_string(path)
                    .await
                    .map_err(|source| ConfigError::Read {
                        path: path.to_string(),
                        source,
                    })?;
                let parsed = Self::from_yaml(&raw).map_err(|source| ConfigError::Parse {
                    path: path.to_string(),
                    source,
                })?;
                info!(path, "Loaded site configuration");
                parsed
            }
            None => {
                debug!("No config file given; using built-in defaults");
                Self::default()
            }
        };

        config.apply(overrides);
        config.normalize()?;
        Ok(config)
    }

    pub fn from_yaml(raw: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(raw)
    }

    fn apply(&mut self, overrides: &Overrides) {
        if let Some(base) = &overrides.api_base_url {
            self.upstream.base_url = base.clone();
        }
        if let Some(site) = &overrides.site_url {
            self.site_url = site.clone();
        }
        if let Some(secs) = overrides.timeout_secs {
            self.upstream.timeout_secs = secs;
        }
    }

    /// Validate URLs and strip trailing slashes so joins stay predictable.
    pub fn normalize(&mut self) -> Result<(), ConfigError> {
        self.site_url = validated_origin("site_url", &self.site_url)?;
        self.upstream.base_url = validated_origin("upstream.base_url", &self.upstream.base_url)?;
        Ok(())
    }

    /// Absolute URL for a site-relative path.
    pub fn absolute(&self, path: &str) -> String {
        format!("{}/{}", self.site_url, path.trim_start_matches('/'))
    }

    pub fn logo_url(&self) -> String {
        self.absolute(&self.logo_path)
    }

    pub fn placeholder_image_url(&self) -> String {
        self.absolute(&self.placeholder_image)
    }
}

fn validated_origin(field: &'static str, value: &str) -> Result<String, ConfigError> {
    let trimmed = value.trim().trim_end_matches('/');
    match Url::parse(trimmed) {
        Ok(url) if matches!(url.scheme(), "http" | "https") => Ok(trimmed.to_string()),
        _ => Err(ConfigError::InvalidUrl {
            field,
            value: value.to_string(),
        }),
    }
}
