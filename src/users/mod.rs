//! Job-seeker profiles. The core only ever reads these: profile mutation and
//! authentication live with upstream collaborators, which hand the service an
//! opaque user id.

use serde::{Deserialize, Serialize};

use crate::store::StoreError;

/// Identifier wrapper for job seekers.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct UserId(pub String);

/// Self-reported experience bucket, mapped onto job experience levels when
/// building recommendation criteria.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExperienceBucket {
    #[serde(rename = "Fresher")]
    Fresher,
    #[serde(rename = "0-1 years")]
    UpToOneYear,
    #[serde(rename = "1-3 years")]
    OneToThreeYears,
    #[serde(rename = "3-5 years")]
    ThreeToFiveYears,
    #[serde(rename = "5+ years")]
    FivePlusYears,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Education {
    pub degree: Option<String>,
    pub institution: Option<String>,
    pub year: Option<u16>,
}

/// Preferences feeding the recommendation criteria. Empty lists mean "no
/// preference" and contribute no criterion.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct JobPreferences {
    pub desired_salary_min: Option<u32>,
    pub desired_salary_max: Option<u32>,
    #[serde(default)]
    pub preferred_locations: Vec<String>,
    #[serde(default)]
    pub preferred_job_types: Vec<crate::jobs::JobType>,
    #[serde(default)]
    pub preferred_work_modes: Vec<crate::jobs::WorkMode>,
    #[serde(default)]
    pub preferred_categories: Vec<crate::jobs::JobCategory>,
}

/// Profile subset the core consumes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: UserId,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub location: Option<String>,
    pub bio: Option<String>,
    pub resume: Option<String>,
    #[serde(default)]
    pub skills: Vec<String>,
    pub experience: Option<ExperienceBucket>,
    #[serde(default)]
    pub education: Education,
    #[serde(default)]
    pub preferences: JobPreferences,
}

impl UserProfile {
    /// Completion percentage shown on the dashboard, one point per filled
    /// field out of ten.
    pub fn profile_completion_percent(&self) -> u8 {
        let checks = [
            !self.name.is_empty(),
            !self.email.is_empty(),
            self.phone.is_some(),
            self.location.is_some(),
            self.bio.is_some(),
            self.resume.is_some(),
            !self.skills.is_empty(),
            self.experience.is_some(),
            self.education.degree.is_some(),
            self.education.institution.is_some(),
        ];

        let completed = checks.iter().filter(|filled| **filled).count();
        ((completed as f64 / checks.len() as f64) * 100.0).round() as u8
    }
}

/// Identity collaborator: resolves an opaque user id to a profile.
pub trait UserDirectory: Send + Sync {
    fn lookup(&self, id: &UserId) -> Result<Option<UserProfile>, StoreError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bare_profile() -> UserProfile {
        UserProfile {
            id: UserId("u-1".to_string()),
            name: "Asha".to_string(),
            email: "asha@example.com".to_string(),
            phone: None,
            location: None,
            bio: None,
            resume: None,
            skills: Vec::new(),
            experience: None,
            education: Education::default(),
            preferences: JobPreferences::default(),
        }
    }

    #[test]
    fn completion_counts_filled_fields() {
        let mut profile = bare_profile();
        assert_eq!(profile.profile_completion_percent(), 20);

        profile.phone = Some("5551234567".to_string());
        profile.skills = vec!["Rust".to_string()];
        profile.experience = Some(ExperienceBucket::OneToThreeYears);
        assert_eq!(profile.profile_completion_percent(), 50);
    }

    #[test]
    fn experience_bucket_uses_display_wire_labels() {
        let json = serde_json::to_string(&ExperienceBucket::ThreeToFiveYears).expect("serializes");
        assert_eq!(json, "\"3-5 years\"");
        let parsed: ExperienceBucket = serde_json::from_str("\"5+ years\"").expect("parses");
        assert_eq!(parsed, ExperienceBucket::FivePlusYears);
    }
}
