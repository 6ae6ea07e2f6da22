//! Error types for the fetch, build and configuration layers.
//!
//! The three enums map onto the three ways a request can go wrong:
//!
//! - [`FetchError`]: the upstream content API could not deliver an article
//!   list. Feed builders never see this directly; they get an empty list.
//! - [`BuildError`]: assembling an output document failed. Handlers turn this
//!   into a fallback response.
//! - [`ConfigError`]: the site configuration could not be loaded or is invalid.

use thiserror::Error;

/// Reasons the upstream content API did not yield articles.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("upstream request timed out")]
    Timeout,

    #[error("upstream request failed: {0}")]
    Transport(#[source] reqwest::Error),

    #[error("upstream returned HTTP {0}")]
    Status(u16),

    #[error("upstream body is not valid JSON: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("upstream envelope reported success=false")]
    Unsuccessful,

    #[error("upstream envelope has no `data.{0}` list")]
    MissingList(String),
}

impl From<reqwest::Error> for FetchError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            FetchError::Timeout
        } else {
            FetchError::Transport(e)
        }
    }
}

/// Failures while assembling a document.
#[derive(Debug, Error)]
pub enum BuildError {
    #[error("generated XML is not well-formed: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("generated XML has {0} unclosed element(s)")]
    Unbalanced(usize),

    #[error("RSS validation failed: {0}")]
    Rss(#[from] rss::validation::ValidationError),

    #[error("failed to serialize JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Failures while loading [`crate::config::SiteConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot parse config file {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("invalid URL for `{field}`: {value}")]
    InvalidUrl { field: &'static str, value: String },
}
