use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::domain::{ExperienceLevel, Job, JobCategory, JobId, JobType, WorkMode};
use crate::store::StoreError;

/// Composable browse filters. All present filters are AND-combined on top of
/// the eligibility base predicate.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct JobFilters {
    /// Free-text search over title, description, skills, and tags.
    pub search: Option<String>,
    /// Case-insensitive substring match on location.
    pub location: Option<String>,
    pub category: Option<JobCategory>,
    pub job_type: Option<JobType>,
    pub work_mode: Option<WorkMode>,
    pub experience_level: Option<ExperienceLevel>,
    /// Floor on the advertised minimum salary.
    pub salary_min: Option<u32>,
    /// Ceiling on the advertised maximum salary.
    pub salary_max: Option<u32>,
    /// Matches postings whose skill list intersects this set.
    #[serde(default)]
    pub skills: Vec<String>,
}

impl JobFilters {
    /// Whether a posting satisfies every present filter. Eligibility is the
    /// store's base predicate and is not re-checked here.
    pub fn matches(&self, job: &Job) -> bool {
        if let Some(search) = &self.search {
            if !text_matches(job, search) {
                return false;
            }
        }

        if let Some(location) = &self.location {
            if !contains_ignore_case(&job.location, location) {
                return false;
            }
        }

        if self.category.is_some_and(|c| c != job.category) {
            return false;
        }
        if self.job_type.is_some_and(|t| t != job.job_type) {
            return false;
        }
        if self.work_mode.is_some_and(|m| m != job.work_mode) {
            return false;
        }
        if self
            .experience_level
            .is_some_and(|level| level != job.experience_level)
        {
            return false;
        }

        if let Some(floor) = self.salary_min {
            if !job.salary.min.is_some_and(|min| min >= floor) {
                return false;
            }
        }
        if let Some(ceiling) = self.salary_max {
            if !job.salary.max.is_some_and(|max| max <= ceiling) {
                return false;
            }
        }

        if !self.skills.is_empty() && !skills_intersect(&job.skills, &self.skills) {
            return false;
        }

        true
    }
}

fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

fn text_matches(job: &Job, search: &str) -> bool {
    contains_ignore_case(&job.title, search)
        || contains_ignore_case(&job.description, search)
        || job
            .skills
            .iter()
            .any(|skill| contains_ignore_case(skill, search))
        || job.tags.iter().any(|tag| contains_ignore_case(tag, search))
}

pub(crate) fn skills_intersect(posting: &[String], wanted: &[String]) -> bool {
    wanted
        .iter()
        .any(|want| posting.iter().any(|have| have.eq_ignore_ascii_case(want)))
}

/// Default catalog ordering: featured postings first, then newest first.
pub fn rank_listing(jobs: &mut [Job]) {
    jobs.sort_by(|a, b| {
        b.featured
            .cmp(&a.featured)
            .then_with(|| b.posted_at.cmp(&a.posted_at))
    });
}

/// Counters the store must bump atomically; the core never does
/// read-modify-write on these.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobCounter {
    Views,
    Applications,
}

/// Catalog storage abstraction. Filtering and ordering semantics are defined
/// by [`JobFilters::matches`] and [`rank_listing`]; a backing store may push
/// them down to its query engine as long as the results agree.
pub trait JobStore: Send + Sync {
    fn insert(&self, job: Job) -> Result<(), StoreError>;
    fn fetch(&self, id: &JobId) -> Result<Option<Job>, StoreError>;
    /// Eligible postings matching `filters`, featured-first/newest-first.
    fn find_eligible(&self, filters: &JobFilters, now: DateTime<Utc>)
        -> Result<Vec<Job>, StoreError>;
    /// Eligible postings by recency alone, ignoring the featured flag.
    fn latest(&self, limit: usize, now: DateTime<Utc>) -> Result<Vec<Job>, StoreError>;
    fn increment(&self, id: &JobId, counter: JobCounter) -> Result<(), StoreError>;
}

/// Distinct values over the eligible set, for the browse page's filter
/// dropdowns.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CatalogFacets {
    pub categories: Vec<&'static str>,
    pub locations: Vec<String>,
    pub job_types: Vec<JobType>,
    pub work_modes: Vec<WorkMode>,
}

pub fn facets(eligible: &[Job]) -> CatalogFacets {
    let mut facets = CatalogFacets::default();
    for job in eligible {
        if !facets.categories.contains(&job.category.label()) {
            facets.categories.push(job.category.label());
        }
        if !facets.locations.contains(&job.location) {
            facets.locations.push(job.location.clone());
        }
        if !facets.job_types.contains(&job.job_type) {
            facets.job_types.push(job.job_type);
        }
        if !facets.work_modes.contains(&job.work_mode) {
            facets.work_modes.push(job.work_mode);
        }
    }
    facets.categories.sort_unstable();
    facets.locations.sort_unstable();
    facets
}
