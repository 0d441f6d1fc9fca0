use std::sync::{Arc, Mutex};

use axum::http::StatusCode;
use axum::response::Response;
use chrono::{DateTime, Duration, TimeZone, Utc};
use serde_json::Value;

use crate::applications::domain::{Application, ApplicationDetails, ApplicationId};
use crate::applications::repository::{ApplicationFilters, ApplicationRepository};
use crate::applications::service::ApplicationService;
use crate::clock::Clock;
use crate::jobs::{
    Currency, ExperienceLevel, Job, JobCategory, JobId, JobStatus, JobType, SalaryPeriod,
    SalaryRange, WorkMode,
};
use crate::store::{InMemoryStore, StoreError};
use crate::users::UserId;

pub(super) fn start_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 6, 2, 9, 0, 0)
        .single()
        .expect("valid timestamp")
}

/// Test clock that only moves when a test tells it to.
pub(super) struct ManualClock {
    now: Mutex<DateTime<Utc>>,
}

impl ManualClock {
    pub(super) fn at(start: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(start),
        }
    }

    pub(super) fn advance_days(&self, days: i64) {
        let mut now = self.now.lock().expect("clock mutex poisoned");
        *now += Duration::days(days);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().expect("clock mutex poisoned")
    }
}

pub(super) fn applicant() -> UserId {
    UserId("u-applicant".to_string())
}

pub(super) fn other_user() -> UserId {
    UserId("u-other".to_string())
}

pub(super) fn posting(id: &str, now: DateTime<Utc>) -> Job {
    Job {
        id: JobId(id.to_string()),
        title: "Backend Engineer".to_string(),
        company: "Initech".to_string(),
        description: "Own the billing pipeline".to_string(),
        requirements: "3+ years of server-side development".to_string(),
        location: "Austin, TX".to_string(),
        job_type: JobType::FullTime,
        work_mode: WorkMode::Hybrid,
        experience_level: ExperienceLevel::Mid,
        category: JobCategory::Technology,
        salary: SalaryRange {
            min: Some(95_000),
            max: Some(130_000),
            currency: Currency::Usd,
            period: SalaryPeriod::Annually,
        },
        skills: vec!["Rust".to_string(), "PostgreSQL".to_string()],
        tags: vec!["backend".to_string()],
        application_deadline: now + Duration::days(30),
        status: JobStatus::Active,
        featured: false,
        urgent: false,
        view_count: 0,
        total_applications: 0,
        posted_at: now,
    }
}

pub(super) fn details() -> ApplicationDetails {
    ApplicationDetails {
        cover_letter: "I have shipped reliable backend services in production for several years \
                       and would bring that experience to this role."
            .to_string(),
        ..ApplicationDetails::default()
    }
}

pub(super) fn application_at(now: DateTime<Utc>) -> Application {
    Application::new(
        ApplicationId("app-fixture".to_string()),
        JobId("job-1".to_string()),
        applicant(),
        details(),
        now,
    )
}

/// Service over a shared in-memory store with one eligible posting seeded.
pub(super) fn build_service() -> (
    ApplicationService<InMemoryStore, InMemoryStore>,
    Arc<InMemoryStore>,
    Arc<ManualClock>,
) {
    let store = Arc::new(InMemoryStore::new());
    let clock = Arc::new(ManualClock::at(start_time()));
    crate::jobs::JobStore::insert(store.as_ref(), posting("job-1", start_time()))
        .expect("seed posting");
    let service = ApplicationService::new(store.clone(), store.clone(), clock.clone());
    (service, store, clock)
}

/// Repository double whose unique index always fires, standing in for a
/// racing writer that got there first.
pub(super) struct ConflictRepository;

impl ApplicationRepository for ConflictRepository {
    fn insert(&self, _application: Application) -> Result<Application, StoreError> {
        Err(StoreError::Conflict)
    }

    fn update(&self, _application: Application) -> Result<(), StoreError> {
        Err(StoreError::Unavailable("read only".to_string()))
    }

    fn fetch(&self, _id: &ApplicationId) -> Result<Option<Application>, StoreError> {
        Ok(None)
    }

    fn find_for_pair(
        &self,
        _job: &JobId,
        _applicant: &UserId,
    ) -> Result<Option<Application>, StoreError> {
        Ok(None)
    }

    fn find(
        &self,
        _filters: &ApplicationFilters,
        _now: DateTime<Utc>,
    ) -> Result<Vec<Application>, StoreError> {
        Ok(Vec::new())
    }

    fn applied_job_ids(&self, _applicant: &UserId) -> Result<Vec<JobId>, StoreError> {
        Ok(Vec::new())
    }

    fn count_all(&self) -> Result<u64, StoreError> {
        Ok(0)
    }
}

/// Repository double that accepts the first insert but reports a version
/// conflict on every update, like a store whose optimistic writes keep
/// losing.
#[derive(Default)]
pub(super) struct ContestedUpdateRepository {
    stored: Mutex<Option<Application>>,
}

impl ApplicationRepository for ContestedUpdateRepository {
    fn insert(&self, application: Application) -> Result<Application, StoreError> {
        let mut stored = self.stored.lock().expect("repository mutex poisoned");
        *stored = Some(application.clone());
        Ok(application)
    }

    fn update(&self, _application: Application) -> Result<(), StoreError> {
        Err(StoreError::Conflict)
    }

    fn fetch(&self, id: &ApplicationId) -> Result<Option<Application>, StoreError> {
        let stored = self.stored.lock().expect("repository mutex poisoned");
        Ok(stored.clone().filter(|app| app.id == *id))
    }

    fn find_for_pair(
        &self,
        _job: &JobId,
        _applicant: &UserId,
    ) -> Result<Option<Application>, StoreError> {
        Ok(None)
    }

    fn find(
        &self,
        _filters: &ApplicationFilters,
        _now: DateTime<Utc>,
    ) -> Result<Vec<Application>, StoreError> {
        Ok(Vec::new())
    }

    fn applied_job_ids(&self, _applicant: &UserId) -> Result<Vec<JobId>, StoreError> {
        Ok(Vec::new())
    }

    fn count_all(&self) -> Result<u64, StoreError> {
        Ok(0)
    }
}

pub(super) struct UnavailableRepository;

impl UnavailableRepository {
    fn offline<T>() -> Result<T, StoreError> {
        Err(StoreError::Unavailable("database offline".to_string()))
    }
}

impl ApplicationRepository for UnavailableRepository {
    fn insert(&self, _application: Application) -> Result<Application, StoreError> {
        Self::offline()
    }

    fn update(&self, _application: Application) -> Result<(), StoreError> {
        Self::offline()
    }

    fn fetch(&self, _id: &ApplicationId) -> Result<Option<Application>, StoreError> {
        Self::offline()
    }

    fn find_for_pair(
        &self,
        _job: &JobId,
        _applicant: &UserId,
    ) -> Result<Option<Application>, StoreError> {
        Self::offline()
    }

    fn find(
        &self,
        _filters: &ApplicationFilters,
        _now: DateTime<Utc>,
    ) -> Result<Vec<Application>, StoreError> {
        Self::offline()
    }

    fn applied_job_ids(&self, _applicant: &UserId) -> Result<Vec<JobId>, StoreError> {
        Self::offline()
    }

    fn count_all(&self) -> Result<u64, StoreError> {
        Self::offline()
    }
}

pub(super) fn assert_status(response: &Response, expected: StatusCode) {
    assert_eq!(response.status(), expected);
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
