//! Command-line interface definitions for the feed service.
//!
//! Two subcommands share one set of global options:
//!
//! - `serve` runs the HTTP service.
//! - `render` builds a single document once and writes it to stdout or a file.
//!
//! Global options can also come from environment variables, so the same
//! binary runs unchanged in a container.

use clap::{Args, Parser, Subcommand, ValueEnum};

/// Command-line arguments for the feed service.
///
/// # Examples
///
/// ```sh
/// # Serve feeds on port 3000 against the production content API
/// tripura_dispatch_feeds serve
///
/// # Point at a staging API and bind elsewhere
/// NEWS_API_BASE_URL=https://staging-api.example.com \
///     tripura_dispatch_feeds serve --bind 127.0.0.1:8080
///
/// # Write the Google News sitemap to a file
/// tripura_dispatch_feeds render google-news -o public/google-news-sitemap.xml
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Args, Debug, Clone)]
pub struct GlobalOpts {
    /// Optional path to a site config YAML file
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    /// Base URL of the content API
    #[arg(long, env = "NEWS_API_BASE_URL", global = true)]
    pub api_base_url: Option<String>,

    /// Public URL of the news site
    #[arg(long, env = "SITE_URL", global = true)]
    pub site_url: Option<String>,

    /// Upstream request timeout in seconds
    #[arg(long, env = "NEWS_API_TIMEOUT_SECS", global = true)]
    pub timeout_secs: Option<u64>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Serve the feed, sitemap and SEO endpoints over HTTP
    Serve {
        /// Address to listen on
        #[arg(short, long, env = "BIND_ADDR", default_value = "0.0.0.0:3000")]
        bind: String,
    },
    /// Build one document and write it out
    Render {
        document: Document,

        /// Output file; stdout when omitted
        #[arg(short, long)]
        output: Option<String>,
    },
}

/// Documents the `render` subcommand can produce.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Document {
    Rss,
    Sitemap,
    NewsSitemap,
    GoogleNews,
    Robots,
}
