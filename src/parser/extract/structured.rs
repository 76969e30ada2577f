//! Structured-data blocks (`<script type="application/ld+json">`).

use std::sync::LazyLock;

use scraper::{Html, Selector};
use serde_json::Value;
use tracing::debug;

use crate::error::StepError;
use crate::parser::jsonld::{declared_type, records, ValueExt};
use crate::parser::merge::{set_if_absent, Evidence};
use crate::record::{Education, Experience};

static LD_JSON: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(r#"script[type="application/ld+json"]"#).unwrap());

pub fn extract(doc: &Html) -> Evidence {
    let mut evidence = Evidence::default();

    for (idx, script) in doc.select(&LD_JSON).enumerate() {
        let raw = script.text().collect::<String>();
        match parse_block(&raw) {
            Ok(payload) => {
                for record in records(&payload) {
                    apply_record(record, &mut evidence);
                }
            }
            Err(e) => debug!(block = idx, "skipping structured-data block: {}", e),
        }
    }

    evidence
}

fn parse_block(raw: &str) -> Result<Value, StepError> {
    if raw.trim().is_empty() {
        return Ok(Value::Object(Default::default()));
    }
    Ok(serde_json::from_str(raw)?)
}

fn apply_record(record: &Value, evidence: &mut Evidence) {
    // Untyped records are not entity descriptions.
    let Some(kind) = declared_type(record) else {
        return;
    };

    let job_title = record.str_at("jobTitle");

    if kind.eq_ignore_ascii_case("person") {
        set_if_absent(&mut evidence.full_name, record.str_at("name").map(String::from));
        set_if_absent(&mut evidence.headline, job_title.map(String::from));
        set_if_absent(&mut evidence.profile_picture, image_url(record));
        set_if_absent(&mut evidence.location, locality(record));
    }

    for org in record.items_at("worksFor") {
        if let Some(company) = org.str_at("name").filter(|n| !n.trim().is_empty()) {
            evidence.experience.push(Experience {
                company: Some(company.to_string()),
                role: job_title.map(String::from),
                duration: None,
            });
        }
    }

    for school in record.items_at("alumniOf") {
        if let Some(institution) = school.str_at("name").filter(|n| !n.trim().is_empty()) {
            evidence.education.push(Education {
                degree: None,
                institution: Some(institution.to_string()),
                year: None,
            });
        }
    }
}

/// `image` is either a bare URL or an `ImageObject` with a `url`.
fn image_url(record: &Value) -> Option<String> {
    match record.get("image")? {
        Value::String(url) => Some(url.clone()),
        obj @ Value::Object(_) => obj.str_at("url").map(String::from),
        _ => None,
    }
}

/// Locality from `address`, falling back to `homeLocation`; within the place,
/// `addressLocality` before `name`.
fn locality(record: &Value) -> Option<String> {
    ["address", "homeLocation"]
        .iter()
        .find_map(|key| record.get(*key).filter(|v| v.is_object()))
        .and_then(|place| place.first_str(&["addressLocality", "name"]))
        .map(String::from)
}
