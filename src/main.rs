//! # Tripura Dispatch Feeds
//!
//! Crawler- and aggregator-facing documents for the Tripura Dispatch news
//! site, built from the upstream content API on every request.
//!
//! ## Features
//!
//! - RSS 2.0 feed of the latest articles
//! - General sitemap (static pages, category pages, articles)
//! - News sitemap and a 48-hour Google News sitemap
//! - robots.txt
//! - Page metadata (title, description, keywords, Open Graph, Twitter card,
//!   schema.org JSON-LD) for the front-end renderer
//!
//! ## Usage
//!
//! ```sh
//! tripura_dispatch_feeds serve --bind 0.0.0.0:3000
//! tripura_dispatch_feeds render rss -o public/rss.xml
//! ```
//!
//! ## Architecture
//!
//! Each document is produced in three steps:
//! 1. **Fetching**: one GET against the content API; failures become an
//!    empty article list
//! 2. **Building**: a pure builder turns articles plus site config into the
//!    document
//! 3. **Serving**: the HTTP layer attaches content type and cache headers, or
//!    the CLI writes the document to disk

use chrono::Utc;
use clap::Parser;
use std::error::Error;
use std::path::Path;
use tracing::{debug, error, info, instrument};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

mod api;
mod cli;
mod config;
mod error;
mod keywords;
mod models;
mod outputs;
mod routes;
mod seo;
mod utils;

#[cfg(test)]
mod test_support;

use api::NewsApiClient;
use cli::{Cli, Command, Document};
use config::{Overrides, SiteConfig};
use routes::{AppState, build_document};

#[tokio::main]
#[instrument]
async fn main() -> Result<(), Box<dyn Error>> {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .with_writer(std::io::stderr)
        .init();

    let args = Cli::parse();
    debug!(?args.global, "Parsed CLI arguments");

    // --- Config & upstream client ---
    let overrides = Overrides {
        api_base_url: args.global.api_base_url.clone(),
        site_url: args.global.site_url.clone(),
        timeout_secs: args.global.timeout_secs,
    };
    let site = SiteConfig::load(args.global.config.as_deref(), &overrides).await?;
    let client = NewsApiClient::new(&site.upstream)?;
    info!(
        site_url = %site.site_url,
        api_base_url = %site.upstream.base_url,
        timeout_secs = site.upstream.timeout_secs,
        "Configuration loaded"
    );

    let state = AppState { site, client };

    match args.command {
        Command::Serve { bind } => serve(state, &bind).await,
        Command::Render { document, output } => render(&state, document, output.as_deref()).await,
    }
}

async fn serve(state: AppState, bind: &str) -> Result<(), Box<dyn Error>> {
    let listener = tokio::net::TcpListener::bind(bind).await.map_err(|e| {
        error!(%bind, error = %e, "Failed to bind listener");
        e
    })?;
    info!(addr = %listener.local_addr()?, "Feed service listening");

    axum::serve(listener, routes::router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Feed service stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "Failed to listen for shutdown signal");
    }
}

async fn render(
    state: &AppState,
    document: Document,
    output: Option<&str>,
) -> Result<(), Box<dyn Error>> {
    let start_time = std::time::Instant::now();
    let body = build_document(state, document, Utc::now()).await?;

    match output {
        Some(path) => {
            if let Some(parent) = Path::new(path).parent().filter(|p| !p.as_os_str().is_empty()) {
                tokio::fs::create_dir_all(parent).await?;
            }
            tokio::fs::write(path, &body).await?;
            info!(
                ?document,
                path,
                bytes = body.len(),
                elapsed_ms = start_time.elapsed().as_millis() as u64,
                "Wrote document"
            );
        }
        None => {
            use tokio::io::AsyncWriteExt;
            let mut stdout = tokio::io::stdout();
            stdout.write_all(body.as_bytes()).await?;
            stdout.flush().await?;
        }
    }
    Ok(())
}
