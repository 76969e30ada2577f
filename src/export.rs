use std::path::Path;

use anyhow::{Context, Result};
use tracing::info;

use crate::record::ProfileRecord;

/// Indented JSON array. Non-ASCII characters are written as-is.
pub fn to_json_string(records: &[ProfileRecord]) -> serde_json::Result<String> {
    serde_json::to_string_pretty(records)
}

/// Write `records` to `path`, creating parent directories as needed.
pub fn write_json(path: &Path, records: &[ProfileRecord]) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    let json = to_json_string(records)?;
    std::fs::write(path, json).with_context(|| format!("Failed to write {}", path.display()))?;
    info!("Wrote JSON to {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{Education, Experience};

    fn sample() -> ProfileRecord {
        ProfileRecord {
            full_name: Some("Zoë Müller".into()),
            headline: None,
            followers: Some(500),
            profile_picture: None,
            education: vec![Education {
                institution: Some("ETH Zürich".into()),
                ..Default::default()
            }],
            experience: vec![Experience {
                company: Some("Helvetia".into()),
                role: Some("Data Scientist".into()),
                duration: None,
            }],
            location: None,
            about: None,
            skills: vec![],
            profile_url: "https://www.linkedin.com/in/zoe".into(),
        }
    }

    #[test]
    fn schema_keys_and_literal_unicode() {
        let json = to_json_string(&[sample()]).unwrap();
        assert!(json.contains("\"fullName\": \"Zoë Müller\""));
        assert!(json.contains("\"headline\": null"));
        assert!(json.contains("\"profileUrl\": \"https://www.linkedin.com/in/zoe\""));
        assert!(json.contains("\"skills\": []"));
        assert!(json.contains("\n  {"), "expected two-space indentation");

        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        let obj = value[0].as_object().unwrap();
        for key in [
            "fullName", "headline", "followers", "profilePicture", "education",
            "experience", "location", "about", "skills", "profileUrl",
        ] {
            assert!(obj.contains_key(key), "missing {key}");
        }
        assert_eq!(value[0]["education"][0]["degree"], serde_json::Value::Null);
        assert_eq!(value[0]["experience"][0]["role"], "Data Scientist");
    }

    #[test]
    fn writes_nested_path() {
        let dir = std::env::temp_dir().join(format!("profile_scraper_export_{}", std::process::id()));
        let path = dir.join("nested").join("out.json");
        write_json(&path, &[sample(), sample()]).unwrap();
        let back: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(back.as_array().unwrap().len(), 2);
        std::fs::remove_dir_all(&dir).unwrap();
    }
}
