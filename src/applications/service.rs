use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use serde::Serialize;
use tracing::warn;

use super::domain::{
    validate_personal_notes, Application, ApplicationDetails, ApplicationId, ApplicationStatus,
    FieldViolation,
};
use super::lifecycle::{apply_transition, check_transition, TransitionError};
use super::repository::{ApplicationFilters, ApplicationRepository};
use crate::clock::Clock;
use crate::jobs::{JobCounter, JobId, JobStore};
use crate::store::StoreError;
use crate::users::UserId;

/// History note recorded when a candidate withdraws without giving a reason.
pub const DEFAULT_WITHDRAWAL_NOTE: &str = "application withdrawn by candidate";

/// Typed failures raised by the lifecycle operations. Callers translate
/// these into user-facing messages or status codes; the core never does.
#[derive(Debug, thiserror::Error)]
pub enum ApplicationError {
    #[error("validation failed for {field}: {message}")]
    Validation {
        field: &'static str,
        message: String,
    },
    #[error("entity not found")]
    NotFound,
    #[error("requester does not own this application")]
    Unauthorized,
    #[error("job is closed or past its application deadline")]
    JobNotEligible,
    #[error("an application for this job already exists")]
    DuplicateApplication,
    #[error(transparent)]
    InvalidTransition(#[from] TransitionError),
    #[error(transparent)]
    Store(StoreError),
}

impl From<FieldViolation> for ApplicationError {
    fn from(violation: FieldViolation) -> Self {
        Self::Validation {
            field: violation.field,
            message: violation.message,
        }
    }
}

impl From<StoreError> for ApplicationError {
    fn from(err: StoreError) -> Self {
        match err {
            // A unique-index violation is a duplicate submission, whether it
            // lost a race or repeated an earlier one.
            StoreError::Conflict => Self::DuplicateApplication,
            StoreError::NotFound => Self::NotFound,
            other => Self::Store(other),
        }
    }
}

static APPLICATION_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_application_id() -> ApplicationId {
    let id = APPLICATION_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    ApplicationId(format!("app-{id:06}"))
}

/// Lifecycle manager composing the job catalog, the application repository,
/// and a clock.
pub struct ApplicationService<R, J> {
    repository: Arc<R>,
    jobs: Arc<J>,
    clock: Arc<dyn Clock>,
}

impl<R, J> ApplicationService<R, J>
where
    R: ApplicationRepository + 'static,
    J: JobStore + 'static,
{
    pub fn new(repository: Arc<R>, jobs: Arc<J>, clock: Arc<dyn Clock>) -> Self {
        Self {
            repository,
            jobs,
            clock,
        }
    }

    /// Submit a new application against an eligible job.
    pub fn create(
        &self,
        job_id: JobId,
        applicant: UserId,
        details: ApplicationDetails,
    ) -> Result<Application, ApplicationError> {
        let now = self.clock.now();
        details.validate(now)?;

        let job = self
            .jobs
            .fetch(&job_id)
            .map_err(store_fault)?
            .ok_or(ApplicationError::NotFound)?;
        if !job.is_eligible(now) {
            return Err(ApplicationError::JobNotEligible);
        }

        // Early duplicate check for the common repeat-submit case. The
        // store's unique index is what actually closes the race window.
        if self
            .repository
            .find_for_pair(&job_id, &applicant)
            .map_err(store_fault)?
            .is_some()
        {
            return Err(ApplicationError::DuplicateApplication);
        }

        let application = Application::new(
            next_application_id(),
            job_id.clone(),
            applicant,
            details,
            now,
        );
        let stored = self.repository.insert(application)?;

        // Best effort: a failed counter bump is accepted drift, never a
        // reason to unwind the stored application.
        if let Err(err) = self.jobs.increment(&job_id, JobCounter::Applications) {
            warn!(job = %job_id.0, error = %err, "failed to increment application counter");
        }

        Ok(stored)
    }

    /// Employer-side entry point: move an application to `new_status`.
    pub fn transition_status(
        &self,
        id: &ApplicationId,
        new_status: ApplicationStatus,
        notes: Option<String>,
    ) -> Result<Application, ApplicationError> {
        let mut application = self.fetch(id)?;
        check_transition(application.status, new_status)?;
        apply_transition(&mut application, new_status, notes, self.clock.now());
        self.repository
            .update(application.clone())
            .map_err(store_fault)?;
        Ok(application)
    }

    /// Candidate-invoked withdrawal; the only status change a requester can
    /// trigger directly.
    pub fn withdraw(
        &self,
        id: &ApplicationId,
        requester: &UserId,
        reason: Option<String>,
    ) -> Result<Application, ApplicationError> {
        let mut application = self.fetch_owned(id, requester)?;
        check_transition(application.status, ApplicationStatus::Withdrawn)?;

        let notes = reason
            .filter(|text| !text.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_WITHDRAWAL_NOTE.to_string());
        apply_transition(
            &mut application,
            ApplicationStatus::Withdrawn,
            Some(notes),
            self.clock.now(),
        );
        self.repository
            .update(application.clone())
            .map_err(store_fault)?;
        Ok(application)
    }

    /// Overwrite the applicant's private notes. No history is kept.
    pub fn add_personal_note(
        &self,
        id: &ApplicationId,
        requester: &UserId,
        notes: String,
    ) -> Result<Application, ApplicationError> {
        validate_personal_notes(&notes)?;
        let mut application = self.fetch_owned(id, requester)?;
        application.personal_notes = Some(notes);
        self.repository
            .update(application.clone())
            .map_err(store_fault)?;
        Ok(application)
    }

    /// Record a manual check-in on a stalled application.
    pub fn record_follow_up(
        &self,
        id: &ApplicationId,
        requester: &UserId,
    ) -> Result<Application, ApplicationError> {
        let mut application = self.fetch_owned(id, requester)?;
        application.last_follow_up = Some(self.clock.now());
        application.follow_up_count += 1;
        self.repository
            .update(application.clone())
            .map_err(store_fault)?;
        Ok(application)
    }

    /// Ownership-checked read.
    pub fn get(
        &self,
        id: &ApplicationId,
        requester: &UserId,
    ) -> Result<Application, ApplicationError> {
        self.fetch_owned(id, requester)
    }

    /// Filtered listing, newest submission first.
    pub fn list(
        &self,
        filters: &ApplicationFilters,
    ) -> Result<Vec<Application>, ApplicationError> {
        self.repository
            .find(filters, self.clock.now())
            .map_err(store_fault)
    }

    /// Per-status funnel counts and derived rates for one applicant.
    pub fn user_stats(&self, applicant: &UserId) -> Result<UserApplicationStats, ApplicationError> {
        let filters = ApplicationFilters::for_applicant(applicant.clone());
        let applications = self
            .repository
            .find(&filters, self.clock.now())
            .map_err(store_fault)?;
        Ok(UserApplicationStats::from_applications(&applications))
    }

    fn fetch(&self, id: &ApplicationId) -> Result<Application, ApplicationError> {
        self.repository
            .fetch(id)
            .map_err(store_fault)?
            .ok_or(ApplicationError::NotFound)
    }

    fn fetch_owned(
        &self,
        id: &ApplicationId,
        requester: &UserId,
    ) -> Result<Application, ApplicationError> {
        let application = self.fetch(id)?;
        if application.applicant != *requester {
            return Err(ApplicationError::Unauthorized);
        }
        Ok(application)
    }
}

// Only the submission insert may read Conflict as a duplicate; everywhere
// else a store error keeps its own face.
fn store_fault(err: StoreError) -> ApplicationError {
    match err {
        StoreError::NotFound => ApplicationError::NotFound,
        other => ApplicationError::Store(other),
    }
}

/// Funnel metrics for one applicant. The per-status counts always sum to
/// `total`; both rates are whole-number percentages and zero when the user
/// has no applications.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct UserApplicationStats {
    pub total: u64,
    pub submitted: u64,
    #[serde(rename = "under-review")]
    pub under_review: u64,
    pub shortlisted: u64,
    pub interview: u64,
    pub selected: u64,
    pub rejected: u64,
    pub withdrawn: u64,
    pub response_rate: u8,
    pub success_rate: u8,
}

impl UserApplicationStats {
    pub fn from_applications(applications: &[Application]) -> Self {
        let mut stats = Self::default();
        for application in applications {
            stats.total += 1;
            match application.status {
                ApplicationStatus::Submitted => stats.submitted += 1,
                ApplicationStatus::UnderReview => stats.under_review += 1,
                ApplicationStatus::Shortlisted => stats.shortlisted += 1,
                ApplicationStatus::Interview => stats.interview += 1,
                ApplicationStatus::Selected => stats.selected += 1,
                ApplicationStatus::Rejected => stats.rejected += 1,
                ApplicationStatus::Withdrawn => stats.withdrawn += 1,
            }
        }

        if stats.total > 0 {
            let responded = stats.under_review + stats.shortlisted + stats.interview + stats.selected;
            stats.response_rate = percentage(responded, stats.total);
            stats.success_rate = percentage(stats.selected, stats.total);
        }
        stats
    }
}

fn percentage(part: u64, total: u64) -> u8 {
    ((part as f64 / total as f64) * 100.0).round() as u8
}
