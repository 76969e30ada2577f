pub mod extract;
pub mod jsonld;
pub mod merge;
pub mod normalize;
pub mod selector;

use scraper::Html;
use tracing::debug;

use crate::error::ParseError;
use crate::record::ProfileRecord;
use merge::Evidence;

/// Three-source pipeline: structured data → meta tags → markup heuristics,
/// merged first-non-empty-wins, then normalized.
pub fn extract_profile(url: &str, html: &str) -> Result<ProfileRecord, ParseError> {
    let doc = parse_document(html)?;

    let mut merged = extract::structured::extract(&doc);
    debug!(url, step = "structured", found = ?summary(&merged));

    let meta = extract::meta::extract(&doc);
    debug!(url, step = "meta", found = ?summary(&meta));
    merged.absorb(meta);

    let markup = extract::markup::extract(&doc);
    debug!(url, step = "markup", found = ?summary(&markup));
    merged.absorb(markup);

    Ok(merged.into_record(url))
}

fn parse_document(html: &str) -> Result<Html, ParseError> {
    if html.trim().is_empty() {
        return Err(ParseError::EmptyDocument);
    }
    if !html.contains('<') {
        return Err(ParseError::NotMarkup);
    }
    Ok(Html::parse_document(html))
}

/// Names of the fields a source produced, for debug logs.
fn summary(ev: &Evidence) -> Vec<&'static str> {
    let scalars = [
        ("fullName", ev.full_name.is_some()),
        ("headline", ev.headline.is_some()),
        ("location", ev.location.is_some()),
        ("about", ev.about.is_some()),
        ("profilePicture", ev.profile_picture.is_some()),
        ("followers", ev.followers.is_some()),
        ("education", !ev.education.is_empty()),
        ("experience", !ev.experience.is_empty()),
        ("skills", !ev.skills.is_empty()),
    ];
    scalars.into_iter().filter(|(_, hit)| *hit).map(|(k, _)| k).collect()
}

// ── Tests ──
