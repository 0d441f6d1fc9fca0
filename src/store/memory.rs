use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::{Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Utc};

use super::StoreError;
use crate::applications::{Application, ApplicationFilters, ApplicationId, ApplicationRepository};
use crate::jobs::{rank_listing, Job, JobCounter, JobFilters, JobId, JobStore};
use crate::users::{UserDirectory, UserId, UserProfile};

/// In-memory document store. Enforces the (job, applicant) unique index and
/// serves counter increments under the same lock, which gives it the
/// per-document atomicity the core expects from a real store.
#[derive(Default)]
pub struct InMemoryStore {
    jobs: Mutex<BTreeMap<JobId, Job>>,
    applications: Mutex<ApplicationTable>,
    users: Mutex<HashMap<UserId, UserProfile>>,
}

#[derive(Default)]
struct ApplicationTable {
    records: BTreeMap<ApplicationId, Application>,
    // Unique index over (job, applicant).
    pair_index: HashSet<(JobId, UserId)>,
}

fn locked<'a, T>(
    result: Result<MutexGuard<'a, T>, PoisonError<MutexGuard<'a, T>>>,
) -> Result<MutexGuard<'a, T>, StoreError> {
    result.map_err(|_| StoreError::Unavailable("store lock poisoned".to_string()))
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn upsert_user(&self, profile: UserProfile) -> Result<(), StoreError> {
        let mut users = locked(self.users.lock())?;
        users.insert(profile.id.clone(), profile);
        Ok(())
    }
}

impl JobStore for InMemoryStore {
    fn insert(&self, job: Job) -> Result<(), StoreError> {
        let mut jobs = locked(self.jobs.lock())?;
        if jobs.contains_key(&job.id) {
            return Err(StoreError::Conflict);
        }
        jobs.insert(job.id.clone(), job);
        Ok(())
    }

    fn fetch(&self, id: &JobId) -> Result<Option<Job>, StoreError> {
        let jobs = locked(self.jobs.lock())?;
        Ok(jobs.get(id).cloned())
    }

    fn find_eligible(
        &self,
        filters: &JobFilters,
        now: DateTime<Utc>,
    ) -> Result<Vec<Job>, StoreError> {
        let jobs = locked(self.jobs.lock())?;
        let mut matching: Vec<Job> = jobs
            .values()
            .filter(|job| job.is_eligible(now) && filters.matches(job))
            .cloned()
            .collect();
        rank_listing(&mut matching);
        Ok(matching)
    }

    fn latest(&self, limit: usize, now: DateTime<Utc>) -> Result<Vec<Job>, StoreError> {
        let jobs = locked(self.jobs.lock())?;
        let mut eligible: Vec<Job> = jobs
            .values()
            .filter(|job| job.is_eligible(now))
            .cloned()
            .collect();
        eligible.sort_by(|a, b| b.posted_at.cmp(&a.posted_at));
        eligible.truncate(limit);
        Ok(eligible)
    }

    fn increment(&self, id: &JobId, counter: JobCounter) -> Result<(), StoreError> {
        let mut jobs = locked(self.jobs.lock())?;
        let job = jobs.get_mut(id).ok_or(StoreError::NotFound)?;
        match counter {
            JobCounter::Views => job.view_count += 1,
            JobCounter::Applications => job.total_applications += 1,
        }
        Ok(())
    }
}

impl ApplicationRepository for InMemoryStore {
    fn insert(&self, application: Application) -> Result<Application, StoreError> {
        let mut table = locked(self.applications.lock())?;
        let pair = (application.job.clone(), application.applicant.clone());
        if table.pair_index.contains(&pair) || table.records.contains_key(&application.id) {
            return Err(StoreError::Conflict);
        }
        table.pair_index.insert(pair);
        table
            .records
            .insert(application.id.clone(), application.clone());
        Ok(application)
    }

    fn update(&self, application: Application) -> Result<(), StoreError> {
        let mut table = locked(self.applications.lock())?;
        if !table.records.contains_key(&application.id) {
            return Err(StoreError::NotFound);
        }
        table.records.insert(application.id.clone(), application);
        Ok(())
    }

    fn fetch(&self, id: &ApplicationId) -> Result<Option<Application>, StoreError> {
        let table = locked(self.applications.lock())?;
        Ok(table.records.get(id).cloned())
    }

    fn find_for_pair(
        &self,
        job: &JobId,
        applicant: &UserId,
    ) -> Result<Option<Application>, StoreError> {
        let table = locked(self.applications.lock())?;
        Ok(table
            .records
            .values()
            .find(|app| app.job == *job && app.applicant == *applicant)
            .cloned())
    }

    fn find(
        &self,
        filters: &ApplicationFilters,
        now: DateTime<Utc>,
    ) -> Result<Vec<Application>, StoreError> {
        let table = locked(self.applications.lock())?;
        let mut matching: Vec<Application> = table
            .records
            .values()
            .filter(|app| filters.matches(app, now))
            .cloned()
            .collect();
        matching.sort_by(|a, b| b.submitted_at.cmp(&a.submitted_at));
        Ok(matching)
    }

    fn applied_job_ids(&self, applicant: &UserId) -> Result<Vec<JobId>, StoreError> {
        let table = locked(self.applications.lock())?;
        let mut ids: Vec<JobId> = table
            .records
            .values()
            .filter(|app| app.applicant == *applicant)
            .map(|app| app.job.clone())
            .collect();
        ids.sort_unstable();
        ids.dedup();
        Ok(ids)
    }

    fn count_all(&self) -> Result<u64, StoreError> {
        let table = locked(self.applications.lock())?;
        Ok(table.records.len() as u64)
    }
}

impl UserDirectory for InMemoryStore {
    fn lookup(&self, id: &UserId) -> Result<Option<UserProfile>, StoreError> {
        let users = locked(self.users.lock())?;
        Ok(users.get(id).cloned())
    }
}
