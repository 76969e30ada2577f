//! Per-field merge state shared by the extraction steps.
//!
//! Extractors each return an [`Evidence`]; the controller folds them together
//! in priority order with [`Evidence::absorb`]. Scalars only ever change
//! through [`set_if_absent`], so an earlier source always wins.

use super::normalize::{normalize, normalize_str};
use crate::record::{Education, Experience, ProfileRecord};

/// Partial profile produced by one source, or the running merge of several.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Evidence {
    pub full_name: Option<String>,
    pub headline: Option<String>,
    pub location: Option<String>,
    pub about: Option<String>,
    pub profile_picture: Option<String>,
    pub followers: Option<u64>,
    pub education: Vec<Education>,
    pub experience: Vec<Experience>,
    pub skills: Vec<String>,
}

/// Fill `slot` with `value` unless it already holds something. Blank strings
/// count as absent on both sides. Returns whether the slot changed.
pub fn set_if_absent<T: Presence>(slot: &mut Option<T>, value: Option<T>) -> bool {
    if slot.as_ref().is_some_and(Presence::is_present) {
        return false;
    }
    match value {
        Some(v) if v.is_present() => {
            *slot = Some(v);
            true
        }
        _ => false,
    }
}

pub trait Presence {
    fn is_present(&self) -> bool;
}

impl Presence for String {
    fn is_present(&self) -> bool {
        !self.trim().is_empty()
    }
}

impl Presence for u64 {
    fn is_present(&self) -> bool {
        true
    }
}

impl Evidence {
    /// Merge a lower-priority source into this one. Absent scalars and empty
    /// lists are filled; nothing already present is touched.
    pub fn absorb(&mut self, later: Evidence) {
        set_if_absent(&mut self.full_name, later.full_name);
        set_if_absent(&mut self.headline, later.headline);
        set_if_absent(&mut self.location, later.location);
        set_if_absent(&mut self.about, later.about);
        set_if_absent(&mut self.profile_picture, later.profile_picture);
        set_if_absent(&mut self.followers, later.followers);
        if self.education.is_empty() {
            self.education = later.education;
        }
        if self.experience.is_empty() {
            self.experience = later.experience;
        }
        if self.skills.is_empty() {
            self.skills = later.skills;
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Evidence::default()
    }

    /// Normalize every string and freeze into the output record.
    pub fn into_record(self, profile_url: &str) -> ProfileRecord {
        let education = self
            .education
            .into_iter()
            .map(|e| Education {
                degree: normalize(e.degree.as_deref()),
                institution: normalize(e.institution.as_deref()),
                year: normalize(e.year.as_deref()),
            })
            .filter(|e| !e.is_empty())
            .collect();
        let experience = self
            .experience
            .into_iter()
            .map(|e| Experience {
                company: normalize(e.company.as_deref()),
                role: normalize(e.role.as_deref()),
                duration: normalize(e.duration.as_deref()),
            })
            .filter(|e| !e.is_empty())
            .collect();

        ProfileRecord {
            full_name: normalize(self.full_name.as_deref()),
            headline: normalize(self.headline.as_deref()),
            followers: self.followers,
            profile_picture: normalize(self.profile_picture.as_deref()),
            education,
            experience,
            location: normalize(self.location.as_deref()),
            about: normalize(self.about.as_deref()),
            skills: self.skills.iter().filter_map(|s| normalize_str(s)).collect(),
            profile_url: profile_url.to_string(),
        }
    }
}
