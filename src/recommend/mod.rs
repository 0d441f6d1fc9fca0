//! Profile-driven job recommendations.
//!
//! `build_criteria` is a pure function from a profile snapshot to a
//! structured filter value, so the mapping is unit-testable without a store.
//! `recommend` applies the criteria on top of the catalog's eligibility base
//! predicate; callers top up with latest postings and exclude jobs already
//! applied to.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::jobs::{ExperienceLevel, Job, JobCategory, JobFilters, JobId, JobStore, JobType, WorkMode};
use crate::store::StoreError;
use crate::users::{ExperienceBucket, UserProfile};

/// Derived filter set. Empty lists contribute no criterion. Skills and
/// location form an OR group (a posting matching either is a candidate);
/// the classification criteria are AND-combined.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RecommendationCriteria {
    pub skills: Vec<String>,
    pub experience_levels: Vec<ExperienceLevel>,
    pub locations: Vec<String>,
    pub job_types: Vec<JobType>,
    pub work_modes: Vec<WorkMode>,
    pub categories: Vec<JobCategory>,
}

/// Fixed mapping from self-reported experience to the levels worth showing.
pub fn experience_levels_for(bucket: ExperienceBucket) -> &'static [ExperienceLevel] {
    match bucket {
        ExperienceBucket::Fresher | ExperienceBucket::UpToOneYear => &[ExperienceLevel::Entry],
        ExperienceBucket::OneToThreeYears => &[ExperienceLevel::Entry, ExperienceLevel::Mid],
        ExperienceBucket::ThreeToFiveYears => &[ExperienceLevel::Mid, ExperienceLevel::Senior],
        ExperienceBucket::FivePlusYears => {
            &[ExperienceLevel::Senior, ExperienceLevel::Executive]
        }
    }
}

/// Map a profile to recommendation criteria.
pub fn build_criteria(user: &UserProfile) -> RecommendationCriteria {
    let mut criteria = RecommendationCriteria {
        skills: user.skills.clone(),
        ..RecommendationCriteria::default()
    };

    if let Some(bucket) = user.experience {
        criteria.experience_levels = experience_levels_for(bucket).to_vec();
    }

    criteria.locations = user.preferences.preferred_locations.clone();
    criteria.job_types = user.preferences.preferred_job_types.clone();
    criteria.work_modes = user.preferences.preferred_work_modes.clone();
    criteria.categories = user.preferences.preferred_categories.clone();

    criteria
}

impl RecommendationCriteria {
    pub fn is_empty(&self) -> bool {
        self.skills.is_empty()
            && self.experience_levels.is_empty()
            && self.locations.is_empty()
            && self.job_types.is_empty()
            && self.work_modes.is_empty()
            && self.categories.is_empty()
    }

    /// Whether an (already eligible) posting satisfies the criteria.
    pub fn matches(&self, job: &Job) -> bool {
        let skills_wanted = !self.skills.is_empty();
        let locations_wanted = !self.locations.is_empty();
        if skills_wanted || locations_wanted {
            let skills_hit = skills_wanted
                && self
                    .skills
                    .iter()
                    .any(|want| job.skills.iter().any(|have| have.eq_ignore_ascii_case(want)));
            let location_hit = locations_wanted
                && self
                    .locations
                    .iter()
                    .any(|preferred| preferred.eq_ignore_ascii_case(&job.location));
            if !skills_hit && !location_hit {
                return false;
            }
        }

        if !self.experience_levels.is_empty()
            && !self.experience_levels.contains(&job.experience_level)
        {
            return false;
        }
        if !self.job_types.is_empty() && !self.job_types.contains(&job.job_type) {
            return false;
        }
        if !self.work_modes.is_empty() && !self.work_modes.contains(&job.work_mode) {
            return false;
        }
        if !self.categories.is_empty() && !self.categories.contains(&job.category) {
            return false;
        }

        true
    }
}

/// Eligible postings matching the criteria, featured-first/newest-first,
/// capped at `limit`.
pub fn recommend<J: JobStore>(
    jobs: &J,
    criteria: &RecommendationCriteria,
    limit: usize,
    now: DateTime<Utc>,
) -> Result<Vec<Job>, StoreError> {
    let mut candidates = jobs.find_eligible(&JobFilters::default(), now)?;
    candidates.retain(|job| criteria.matches(job));
    candidates.truncate(limit);
    Ok(candidates)
}

/// Full recommendation flow for one user: criteria matches first, topped up
/// with the latest eligible postings, never including jobs already applied
/// to.
pub fn recommended_for_user<J: JobStore>(
    jobs: &J,
    user: &UserProfile,
    applied: &[JobId],
    target: usize,
    now: DateTime<Utc>,
) -> Result<Vec<Job>, StoreError> {
    let criteria = build_criteria(user);
    let mut picks = if criteria.is_empty() {
        Vec::new()
    } else {
        recommend(jobs, &criteria, target, now)?
    };
    picks.retain(|job| !applied.contains(&job.id));

    if picks.len() < target {
        for job in jobs.latest(target + applied.len(), now)? {
            if picks.len() >= target {
                break;
            }
            if applied.contains(&job.id) || picks.iter().any(|picked| picked.id == job.id) {
                continue;
            }
            picks.push(job);
        }
    }

    picks.truncate(target);
    Ok(picks)
}
