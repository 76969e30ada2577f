use serde::Serialize;

/// One extracted profile. Every key is always present in the JSON output;
/// missing values serialize as `null`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileRecord {
    pub full_name: Option<String>,
    pub headline: Option<String>,
    pub followers: Option<u64>,
    pub profile_picture: Option<String>,
    pub education: Vec<Education>,
    pub experience: Vec<Experience>,
    pub location: Option<String>,
    pub about: Option<String>,
    pub skills: Vec<String>,
    pub profile_url: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Education {
    pub degree: Option<String>,
    pub institution: Option<String>,
    pub year: Option<String>,
}

impl Education {
    pub fn is_empty(&self) -> bool {
        self.degree.is_none() && self.institution.is_none() && self.year.is_none()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Experience {
    pub company: Option<String>,
    pub role: Option<String>,
    pub duration: Option<String>,
}

impl Experience {
    pub fn is_empty(&self) -> bool {
        self.company.is_none() && self.role.is_none() && self.duration.is_none()
    }
}
