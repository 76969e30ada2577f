//! Page-level meta tags plus patterns mined from the description text.

use std::sync::LazyLock;

use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use tracing::debug;

use super::parse_count;
use crate::parser::merge::Evidence;

static META: LazyLock<Selector> = LazyLock::new(|| Selector::parse("meta").unwrap());
static FOLLOWERS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)(\d[\d,.]*)\s+(followers|connections)").unwrap());
static BASED_IN_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)Based in ([^.|,]+)").unwrap());

/// A meta tag addressed by `property="…"` (OpenGraph style) or `name="…"`.
#[derive(Debug, Clone, Copy)]
enum Key {
    Property(&'static str),
    Name(&'static str),
}

const NAME_KEYS: &[Key] = &[
    Key::Property("og:title"),
    Key::Property("profile:first_name"),
    Key::Name("name"),
];
// `description` only feeds the follower and location patterns.
const HEADLINE_KEYS: &[Key] = &[Key::Property("og:description"), Key::Name("twitter:description")];
const IMAGE_KEYS: &[Key] = &[Key::Property("og:image"), Key::Name("twitter:image")];
const DESCRIPTION_KEYS: &[Key] = &[Key::Name("description"), Key::Property("og:description")];

pub fn extract(doc: &Html) -> Evidence {
    let tags: Vec<ElementRef<'_>> = doc.select(&META).collect();
    let lookup = |keys: &[Key]| keys.iter().find_map(|k| content(&tags, *k));

    let description = lookup(DESCRIPTION_KEYS);

    Evidence {
        full_name: lookup(NAME_KEYS),
        headline: lookup(HEADLINE_KEYS),
        profile_picture: lookup(IMAGE_KEYS),
        followers: description.as_deref().and_then(followers_in),
        location: description.as_deref().and_then(based_in),
        ..Default::default()
    }
}

/// Follower or connection count mentioned in free text.
pub fn followers_in(text: &str) -> Option<u64> {
    let caps = FOLLOWERS_RE.captures(text)?;
    match parse_count(&caps[1]) {
        Ok(n) => Some(n),
        Err(e) => {
            debug!("ignoring follower count: {}", e);
            None
        }
    }
}

/// Place named by a "Based in …" phrase, up to the next comma, period or pipe.
pub fn based_in(text: &str) -> Option<String> {
    BASED_IN_RE
        .captures(text)
        .map(|c| c[1].trim().to_string())
        .filter(|s| !s.is_empty())
}

fn content(tags: &[ElementRef<'_>], key: Key) -> Option<String> {
    let (attr, wanted) = match key {
        Key::Property(k) => ("property", k),
        Key::Name(k) => ("name", k),
    };
    tags.iter()
        .filter(|t| t.value().attr(attr) == Some(wanted))
        .find_map(|t| t.value().attr("content").map(str::trim).filter(|c| !c.is_empty()))
        .map(String::from)
}
