//! RSS 2.0 feed generation.
//!
//! The channel is assembled with the `rss` crate builders and validated
//! before it is serialized. Items follow the order the content API returned
//! them in; articles whose update timestamp does not parse are left out.
//!
//! `description` and `content:encoded` are written as CDATA by the crate, so
//! a literal `]]>` in them is rewritten to `]]&gt;`, which HTML readers render
//! unchanged. The syndication and Atom self-link elements go through the
//! channel's extension map.

use super::{absolute_image_url, article_url, ensure_well_formed};
use crate::config::SiteConfig;
use crate::error::BuildError;
use crate::models::{Article, Category};
use crate::utils::{format_rfc1123, strip_html, xml_safe};
use chrono::{DateTime, Utc};
use rss::extension::{Extension, ExtensionBuilder, ExtensionMap};
use rss::validation::Validate;
use rss::{CategoryBuilder, ChannelBuilder, EnclosureBuilder, GuidBuilder, ImageBuilder, Item, ItemBuilder};
use std::collections::BTreeMap;
use tracing::{debug, info};

pub const RSS_CONTENT_TYPE: &str = "application/rss+xml; charset=utf-8";
pub const RSS_CACHE_CONTROL: &str = "public, s-maxage=1800, stale-while-revalidate=600";

/// Path the feed is served from, used for the `atom:link rel="self"`.
pub const RSS_PATH: &str = "/rss.xml";

const CONTENT_NS: &str = "http://purl.org/rss/1.0/modules/content/";
const ATOM_NS: &str = "http://www.w3.org/2005/Atom";
const SY_NS: &str = "http://purl.org/rss/1.0/modules/syndication/";

const GENERATOR: &str = concat!(env!("CARGO_PKG_NAME"), " ", env!("CARGO_PKG_VERSION"));

/// Build the RSS document for `articles`.
///
/// # Arguments
///
/// * `articles` - Articles in the order the content API returned them
/// * `site` - Branding and URLs for the channel metadata
/// * `now` - Timestamp written as `lastBuildDate`
///
/// # Returns
///
/// The serialized feed. An empty slice yields a valid channel with no
/// `<item>` elements. Fails with [`BuildError`] when the channel does not
/// pass validation or the serialized document is not well-formed.
pub fn build_rss(
    articles: &[Article],
    site: &SiteConfig,
    now: DateTime<Utc>,
) -> Result<String, BuildError> {
    let items: Vec<Item> = articles
        .iter()
        .filter_map(|article| article_item(site, article))
        .collect();
    let written = items.len();

    let title = channel_title(site);
    let image = ImageBuilder::default()
        .url(site.logo_url())
        .title(title.clone())
        .link(site.site_url.clone())
        .build();

    let channel = ChannelBuilder::default()
        .title(title)
        .link(site.site_url.clone())
        .description(xml_safe(&site.description).into_owned())
        .language(site.language.clone())
        .last_build_date(format_rfc1123(&now))
        .generator(GENERATOR.to_string())
        .image(image)
        .namespaces(namespaces())
        .extensions(channel_extensions(site))
        .items(items)
        .build();

    channel.validate()?;
    let xml = channel.to_string();
    ensure_well_formed(&xml)?;

    info!(items = written, excluded = articles.len() - written, "Built RSS feed");
    Ok(xml)
}

/// Minimal feed served when building the real one failed.
pub fn fallback_rss(site: &SiteConfig) -> String {
    ChannelBuilder::default()
        .title(xml_safe(&site.brand).into_owned())
        .link(site.site_url.clone())
        .description(xml_safe(&site.description).into_owned())
        .build()
        .to_string()
}

fn channel_title(site: &SiteConfig) -> String {
    xml_safe(&format!("{} - {}", site.brand, site.tagline)).into_owned()
}

fn namespaces() -> BTreeMap<String, String> {
    [("content", CONTENT_NS), ("atom", ATOM_NS), ("sy", SY_NS)]
        .into_iter()
        .map(|(prefix, uri)| (prefix.to_string(), uri.to_string()))
        .collect()
}

fn extension(name: &str, value: Option<&str>, attrs: &[(&str, &str)]) -> Extension {
    ExtensionBuilder::default()
        .name(name.to_string())
        .value(value.map(str::to_string))
        .attrs(
            attrs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect::<BTreeMap<_, _>>(),
        )
        .build()
}

fn channel_extensions(site: &SiteConfig) -> ExtensionMap {
    let self_link = site.absolute(RSS_PATH);

    let mut atom = BTreeMap::new();
    atom.insert(
        "link".to_string(),
        vec![extension(
            "atom:link",
            None,
            &[("href", self_link.as_str()), ("rel", "self"), ("type", "application/rss+xml")],
        )],
    );

    let mut sy = BTreeMap::new();
    sy.insert(
        "updatePeriod".to_string(),
        vec![extension("sy:updatePeriod", Some("hourly"), &[])],
    );
    sy.insert(
        "updateFrequency".to_string(),
        vec![extension("sy:updateFrequency", Some("1"), &[])],
    );

    let mut map = ExtensionMap::new();
    map.insert("atom".to_string(), atom);
    map.insert("sy".to_string(), sy);
    map
}

/// Text bound for a CDATA section.
fn cdata_text(s: &str) -> String {
    xml_safe(s).replace("]]>", "]]&gt;")
}

fn article_item(site: &SiteConfig, article: &Article) -> Option<Item> {
    let Some(updated) = article.updated_at() else {
        debug!(id = %article.id, raw = %article.update_timestamp, "Skipping article with unparsable timestamp");
        return None;
    };

    let url = article_url(site, article);
    let newsroom = format!("{} Newsroom", site.brand);
    let author = format!(
        "editor@{} ({})",
        site.editor_domain,
        article.author_or(&newsroom)
    );
    let enclosure = article.image_ref().map(|image| {
        let image_url = absolute_image_url(site, Some(image));
        EnclosureBuilder::default()
            .mime_type(image_mime(&image_url))
            .url(image_url)
            .length("0")
            .build()
    });
    let category = CategoryBuilder::default()
        .name(xml_safe(Category::display_name(&article.category_slug)).into_owned())
        .build();

    Some(
        ItemBuilder::default()
            .title(xml_safe(&article.title).into_owned())
            .link(Some(url.clone()))
            .guid(GuidBuilder::default().permalink(true).value(url).build())
            .description(cdata_text(&article.summary))
            .content(cdata_text(&strip_html(&article.content)))
            .pub_date(format_rfc1123(&updated))
            .categories(vec![category])
            .author(xml_safe(&author).into_owned())
            .enclosure(enclosure)
            .build(),
    )
}

fn image_mime(url: &str) -> &'static str {
    let path = url.split(['?', '#']).next().unwrap_or(url).to_ascii_lowercase();
    if path.ends_with(".png") {
        "image/png"
    } else if path.ends_with(".webp") {
        "image/webp"
    } else if path.ends_with(".gif") {
        "image/gif"
    } else {
        "image/jpeg"
    }
}
