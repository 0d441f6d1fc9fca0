use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::domain::{Application, ApplicationId, ApplicationStatus};
use super::lifecycle::{stalled_in_listing, DEFAULT_FOLLOW_UP_THRESHOLD_DAYS};
use crate::jobs::JobId;
use crate::store::StoreError;
use crate::users::UserId;

/// Listing filters. All present filters are AND-combined; results come back
/// newest-first by submission time.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ApplicationFilters {
    pub applicant: Option<UserId>,
    pub job: Option<JobId>,
    /// Single status or a set; empty means any.
    #[serde(default)]
    pub statuses: Vec<ApplicationStatus>,
    pub submitted_from: Option<DateTime<Utc>>,
    pub submitted_to: Option<DateTime<Utc>>,
    /// Expands to the stalled-application predicate (see
    /// `lifecycle::stalled_in_listing`).
    #[serde(default)]
    pub needs_follow_up: bool,
}

impl ApplicationFilters {
    pub fn for_applicant(applicant: UserId) -> Self {
        Self {
            applicant: Some(applicant),
            ..Self::default()
        }
    }

    pub fn matches(&self, application: &Application, now: DateTime<Utc>) -> bool {
        if self
            .applicant
            .as_ref()
            .is_some_and(|id| *id != application.applicant)
        {
            return false;
        }
        if self.job.as_ref().is_some_and(|id| *id != application.job) {
            return false;
        }
        if !self.statuses.is_empty() && !self.statuses.contains(&application.status) {
            return false;
        }
        if self
            .submitted_from
            .is_some_and(|from| application.submitted_at < from)
        {
            return false;
        }
        if self
            .submitted_to
            .is_some_and(|to| application.submitted_at > to)
        {
            return false;
        }
        if self.needs_follow_up
            && !stalled_in_listing(application, now, DEFAULT_FOLLOW_UP_THRESHOLD_DAYS)
        {
            return false;
        }
        true
    }
}

/// Storage abstraction for application records. The backing store must
/// enforce a unique index over (job, applicant) and report violations as
/// [`StoreError::Conflict`]; an existence check in the service alone would
/// race under concurrent submissions.
pub trait ApplicationRepository: Send + Sync {
    fn insert(&self, application: Application) -> Result<Application, StoreError>;
    fn update(&self, application: Application) -> Result<(), StoreError>;
    fn fetch(&self, id: &ApplicationId) -> Result<Option<Application>, StoreError>;
    fn find_for_pair(
        &self,
        job: &JobId,
        applicant: &UserId,
    ) -> Result<Option<Application>, StoreError>;
    /// Matching records, newest submission first.
    fn find(
        &self,
        filters: &ApplicationFilters,
        now: DateTime<Utc>,
    ) -> Result<Vec<Application>, StoreError>;
    /// Distinct job ids the applicant has applied to.
    fn applied_job_ids(&self, applicant: &UserId) -> Result<Vec<JobId>, StoreError>;
    fn count_all(&self) -> Result<u64, StoreError>;
}
