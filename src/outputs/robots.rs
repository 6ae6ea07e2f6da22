//! robots.txt policy.

use crate::config::SiteConfig;

pub const ROBOTS_CONTENT_TYPE: &str = "text/plain; charset=utf-8";
pub const ROBOTS_CACHE_CONTROL: &str = "public, max-age=86400";

/// Sitemaps advertised to crawlers, relative to the site root.
pub const SITEMAP_PATHS: &[&str] = &[
    "/sitemap.xml",
    "/news-sitemap.xml",
    "/google-news-sitemap.xml",
];

struct Rule {
    user_agent: &'static str,
    allow: &'static [&'static str],
    disallow: &'static [&'static str],
}

const RULES: &[Rule] = &[
    Rule {
        user_agent: "*",
        allow: &["/"],
        disallow: &["/api/", "/admin/", "/search"],
    },
    Rule {
        user_agent: "Googlebot-News",
        allow: &["/"],
        disallow: &[],
    },
];

pub fn render_robots(site: &SiteConfig) -> String {
    let mut out = String::with_capacity(512);
    for rule in RULES {
        out.push_str(&format!("User-agent: {}\n", rule.user_agent));
        for path in rule.allow {
            out.push_str(&format!("Allow: {path}\n"));
        }
        for path in rule.disallow {
            out.push_str(&format!("Disallow: {path}\n"));
        }
        out.push('\n');
    }

    for path in SITEMAP_PATHS {
        out.push_str(&format!("Sitemap: {}\n", site.absolute(path)));
    }

    let host = site
        .site_url
        .split_once("://")
        .map_or(site.site_url.as_str(), |(_, host)| host);
    out.push_str(&format!("Host: {host}\n"));
    out
}
