//! Text and time helpers used by every output builder.
//!
//! - XML escaping and CDATA wrapping, minus characters XML 1.0 forbids
//! - Best-effort HTML stripping for feed summaries
//! - URL path-segment encoding
//! - Lenient timestamp parsing and RFC-1123 / ISO-8601 formatting
//! - Slugification and log truncation

use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use std::borrow::Cow;

/// Escape the five XML special characters.
///
/// `&` is replaced first so the entities produced for the other characters are
/// not escaped again. Escaping already-escaped text double-escapes `&`; callers
/// escape raw text exactly once.
///
/// Characters not allowed anywhere in an XML 1.0 document are dropped
/// first; see [`xml_safe`].
pub fn escape_xml(s: &str) -> Cow<'_, str> {
    let s = xml_safe(s);
    if !s.contains(['&', '<', '>', '"', '\'']) {
        return s;
    }

    Cow::Owned(
        s.replace('&', "&amp;")
            .replace('<', "&lt;")
            .replace('>', "&gt;")
            .replace('"', "&quot;")
            .replace('\'', "&apos;"),
    )
}

/// Wrap text in a CDATA section.
///
/// A literal `]]>` would end the section early, so it is split across two
/// sections.
pub fn cdata(s: &str) -> String {
    format!("<![CDATA[{}]]>", xml_safe(s).replace("]]>", "]]]]><![CDATA[>"))
}

fn is_xml_char(c: char) -> bool {
    matches!(
        c,
        '\t' | '\n' | '\r' | '\u{20}'..='\u{D7FF}' | '\u{E000}'..='\u{FFFD}' | '\u{10000}'..='\u{10FFFF}'
    )
}

/// Drop characters outside the XML 1.0 `Char` production.
///
/// Mostly C0 controls pasted in from word processors. Neither escaping nor
/// CDATA makes them legal, so they are removed.
pub fn xml_safe(s: &str) -> Cow<'_, str> {
    if s.chars().all(is_xml_char) {
        Cow::Borrowed(s)
    } else {
        Cow::Owned(s.chars().filter(|c| is_xml_char(*c)).collect())
    }
}

static TAG_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]*>").unwrap());

/// Remove HTML markup and decode the common named entities.
///
/// This is not an HTML parser: unclosed or malformed tags can leave stray
/// text behind. Good enough for feed summaries, not for sanitizing.
pub fn strip_html(html: &str) -> String {
    let text = TAG_RE.replace_all(html, "");
    text.replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&apos;", "'")
        .replace("&#39;", "'")
        .replace("&amp;", "&")
        .trim()
        .to_string()
}

/// Percent-encode a single URL path segment.
pub fn encode_segment(segment: &str) -> Cow<'_, str> {
    urlencoding::encode(segment)
}

/// Parse the API's update timestamp.
///
/// Accepts RFC 3339, naive `YYYY-MM-DDTHH:MM:SS[.f]` or `YYYY-MM-DD HH:MM:SS`
/// (taken as UTC) and a bare `YYYY-MM-DD` (midnight UTC).
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Some(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// RFC-1123 date as used by RSS `pubDate`, e.g. `Wed, 15 Jan 2025 10:00:00 GMT`.
pub fn format_rfc1123(dt: &DateTime<Utc>) -> String {
    dt.format("%a, %d %b %Y %H:%M:%S GMT").to_string()
}

/// ISO-8601 with second precision and a `Z` suffix.
pub fn format_iso8601(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Convert a display name to a URL-friendly slug.
///
/// Lowercases, drops characters other than alphanumerics, spaces and
/// hyphens, and collapses runs of whitespace into a single hyphen.
///
/// ```ignore
/// assert_eq!(slugify("J. Doe"), "j-doe");
/// ```
pub fn slugify(name: &str) -> String {
    name.to_lowercase()
        .replace(|c: char| !c.is_alphanumeric() && c != ' ' && c != '-', "")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("-")
}

/// Truncate to at most `max` characters, never splitting a code point.
pub fn truncate_chars(s: &str, max: usize) -> Cow<'_, str> {
    match s.char_indices().nth(max) {
        Some((idx, _)) => Cow::Owned(s[..idx].to_string()),
        None => Cow::Borrowed(s),
    }
}

/// Truncate a string for logging purposes.
///
/// Long strings are cut to `max` characters with an ellipsis and the number
/// of dropped bytes appended.
pub fn truncate_for_log(s: &str, max: usize) -> String {
    match truncate_chars(s, max) {
        Cow::Borrowed(all) => all.to_string(),
        Cow::Owned(head) => format!("{}…(+{} bytes)", head, s.len() - head.len()),
    }
}
