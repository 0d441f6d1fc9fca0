//! Read-only aggregation: platform-wide catalog counts and the per-user
//! dashboard summary (funnel stats, activity feed, follow-up count,
//! recommendations).

mod router;

pub use router::stats_router;

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::applications::{
    needs_follow_up, Application, ApplicationFilters, ApplicationId, ApplicationRepository,
    ApplicationStatus, UserApplicationStats, DEFAULT_FOLLOW_UP_THRESHOLD_DAYS,
};
use crate::clock::Clock;
use crate::jobs::{Job, JobFilters, JobStore};
use crate::recommend::recommended_for_user;
use crate::store::StoreError;
use crate::users::{UserDirectory, UserId};

pub const TOP_CATEGORY_LIMIT: usize = 8;
const RECENT_APPLICATION_LIMIT: usize = 5;
const UPCOMING_INTERVIEW_LIMIT: usize = 3;
const RECOMMENDED_TARGET: usize = 6;
const ACTIVITY_LIMIT: usize = 8;

#[derive(Debug, thiserror::Error)]
pub enum StatsError {
    #[error("user not found")]
    UnknownUser,
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Eligible-job count per category, for the browse landing page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryCount {
    pub category: &'static str,
    pub count: u64,
}

/// Platform-wide counts over the currently eligible set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PlatformStats {
    pub total_jobs: u64,
    pub total_companies: u64,
    pub total_applications: u64,
    pub top_categories: Vec<CategoryCount>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityKind {
    Applied,
    StatusUpdate,
}

/// One row in the dashboard activity feed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActivityItem {
    pub kind: ActivityKind,
    pub title: String,
    pub subtitle: String,
    pub date: DateTime<Utc>,
    pub application: ApplicationId,
}

#[derive(Debug, Clone, Serialize)]
pub struct DashboardSummary {
    pub stats: UserApplicationStats,
    pub recent_applications: Vec<Application>,
    pub follow_up_due: u64,
    pub upcoming_interviews: Vec<Application>,
    pub recommended_jobs: Vec<Job>,
    pub activity: Vec<ActivityItem>,
    pub profile_completion: u8,
}

/// Aggregator over the catalog, the application repository, and the user
/// directory. Read-only: it derives views, it never mutates.
pub struct StatsService<R, J, D> {
    repository: Arc<R>,
    jobs: Arc<J>,
    users: Arc<D>,
    clock: Arc<dyn Clock>,
}

impl<R, J, D> StatsService<R, J, D>
where
    R: ApplicationRepository + 'static,
    J: JobStore + 'static,
    D: UserDirectory + 'static,
{
    pub fn new(repository: Arc<R>, jobs: Arc<J>, users: Arc<D>, clock: Arc<dyn Clock>) -> Self {
        Self {
            repository,
            jobs,
            users,
            clock,
        }
    }

    pub fn platform(&self) -> Result<PlatformStats, StatsError> {
        let now = self.clock.now();
        let eligible = self.jobs.find_eligible(&JobFilters::default(), now)?;

        let mut companies: Vec<&str> = eligible.iter().map(|job| job.company.as_str()).collect();
        companies.sort_unstable();
        companies.dedup();

        let mut by_category: BTreeMap<&'static str, u64> = BTreeMap::new();
        for job in &eligible {
            *by_category.entry(job.category.label()).or_default() += 1;
        }
        let mut top_categories: Vec<CategoryCount> = by_category
            .into_iter()
            .map(|(category, count)| CategoryCount { category, count })
            .collect();
        top_categories.sort_by(|a, b| b.count.cmp(&a.count).then(a.category.cmp(b.category)));
        top_categories.truncate(TOP_CATEGORY_LIMIT);

        Ok(PlatformStats {
            total_jobs: eligible.len() as u64,
            total_companies: companies.len() as u64,
            total_applications: self.repository.count_all()?,
            top_categories,
        })
    }

    pub fn dashboard(&self, user_id: &UserId) -> Result<DashboardSummary, StatsError> {
        let user = self
            .users
            .lookup(user_id)?
            .ok_or(StatsError::UnknownUser)?;

        let now = self.clock.now();
        let filters = ApplicationFilters::for_applicant(user_id.clone());
        let applications = self.repository.find(&filters, now)?;

        let stats = UserApplicationStats::from_applications(&applications);

        let follow_up_due = applications
            .iter()
            .filter(|app| needs_follow_up(app, now, DEFAULT_FOLLOW_UP_THRESHOLD_DAYS))
            .count() as u64;

        let mut upcoming_interviews: Vec<Application> = applications
            .iter()
            .filter(|app| {
                app.status == ApplicationStatus::Interview
                    && app.interview.scheduled
                    && app.interview.date_time.is_some_and(|at| at >= now)
            })
            .cloned()
            .collect();
        upcoming_interviews.sort_by_key(|app| app.interview.date_time);
        upcoming_interviews.truncate(UPCOMING_INTERVIEW_LIMIT);

        let applied = self.repository.applied_job_ids(user_id)?;
        let recommended_jobs =
            recommended_for_user(self.jobs.as_ref(), &user, &applied, RECOMMENDED_TARGET, now)?;

        let activity = self.activity_feed(&applications)?;

        let recent_applications = applications
            .into_iter()
            .take(RECENT_APPLICATION_LIMIT)
            .collect();

        Ok(DashboardSummary {
            stats,
            recent_applications,
            follow_up_due,
            upcoming_interviews,
            recommended_jobs,
            activity,
            profile_completion: user.profile_completion_percent(),
        })
    }

    /// Recent submissions plus recent employer status moves, newest first.
    fn activity_feed(&self, applications: &[Application]) -> Result<Vec<ActivityItem>, StatsError> {
        let mut items = Vec::new();

        for application in applications.iter().take(3) {
            let (title, company) = self.job_heading(application)?;
            items.push(ActivityItem {
                kind: ActivityKind::Applied,
                title: format!("Applied for {title}"),
                subtitle: format!("at {company}"),
                date: application.submitted_at,
                application: application.id.clone(),
            });
        }

        let mut updated: Vec<(&Application, &crate::applications::StatusChange)> = applications
            .iter()
            .filter_map(|app| app.latest_change().map(|change| (app, change)))
            .filter(|(_, change)| change.status != ApplicationStatus::Submitted)
            .collect();
        updated.sort_by_key(|(_, change)| std::cmp::Reverse(change.changed_at));
        for (application, change) in updated.into_iter().take(3) {
            let (title, company) = self.job_heading(application)?;
            items.push(ActivityItem {
                kind: ActivityKind::StatusUpdate,
                title: format!(
                    "Application status updated to {}",
                    change.status.display_name()
                ),
                subtitle: format!("for {title} at {company}"),
                date: change.changed_at,
                application: application.id.clone(),
            });
        }

        items.sort_by_key(|item| std::cmp::Reverse(item.date));
        items.truncate(ACTIVITY_LIMIT);
        Ok(items)
    }

    fn job_heading(&self, application: &Application) -> Result<(String, String), StatsError> {
        match self.jobs.fetch(&application.job)? {
            Some(job) => Ok((job.title, job.company)),
            // The posting may have been purged by an admin tool; keep the
            // feed row rather than failing the dashboard.
            None => Ok(("a removed posting".to_string(), "unknown".to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::applications::domain::{Application, ApplicationDetails, ApplicationId};
    use crate::applications::lifecycle::apply_transition;
    use crate::clock::Clock;
    use crate::jobs::{
        Currency, ExperienceLevel, Job, JobCategory, JobId, JobStatus, JobType, SalaryPeriod,
        SalaryRange, WorkMode,
    };
    use crate::store::InMemoryStore;
    use crate::users::{Education, ExperienceBucket, JobPreferences, UserProfile};
    use chrono::{Duration, TimeZone};

    struct FixedClock(DateTime<Utc>);

    impl Clock for FixedClock {
        fn now(&self) -> DateTime<Utc> {
            self.0
        }
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 2, 9, 0, 0)
            .single()
            .expect("valid timestamp")
    }

    fn job(id: &str, company: &str, category: JobCategory) -> Job {
        Job {
            id: JobId(id.to_string()),
            title: format!("{} role", category.label()),
            company: company.to_string(),
            description: "Role description".to_string(),
            requirements: "Requirements".to_string(),
            location: "Austin, TX".to_string(),
            job_type: JobType::FullTime,
            work_mode: WorkMode::Hybrid,
            experience_level: ExperienceLevel::Mid,
            category,
            salary: SalaryRange {
                min: Some(90_000),
                max: Some(120_000),
                currency: Currency::Usd,
                period: SalaryPeriod::Annually,
            },
            skills: vec!["Rust".to_string()],
            tags: Vec::new(),
            application_deadline: now() + Duration::days(30),
            status: JobStatus::Active,
            featured: false,
            urgent: false,
            view_count: 0,
            total_applications: 0,
            posted_at: now(),
        }
    }

    fn profile() -> UserProfile {
        UserProfile {
            id: UserId("u-1".to_string()),
            name: "Asha".to_string(),
            email: "asha@example.com".to_string(),
            phone: None,
            location: None,
            bio: None,
            resume: None,
            skills: vec!["Rust".to_string()],
            experience: Some(ExperienceBucket::ThreeToFiveYears),
            education: Education::default(),
            preferences: JobPreferences::default(),
        }
    }

    fn application(id: &str, job: &str, submitted_at: DateTime<Utc>) -> Application {
        Application::new(
            ApplicationId(id.to_string()),
            JobId(job.to_string()),
            UserId("u-1".to_string()),
            ApplicationDetails {
                cover_letter: "c".repeat(60),
                ..ApplicationDetails::default()
            },
            submitted_at,
        )
    }

    fn service(store: Arc<InMemoryStore>) -> StatsService<InMemoryStore, InMemoryStore, InMemoryStore> {
        StatsService::new(
            store.clone(),
            store.clone(),
            store,
            Arc::new(FixedClock(now())),
        )
    }

    #[test]
    fn platform_counts_cover_the_eligible_set_only() {
        let store = Arc::new(InMemoryStore::new());
        JobStore::insert(store.as_ref(), job("j-1", "Initech", JobCategory::Technology))
            .expect("seed posting");
        JobStore::insert(store.as_ref(), job("j-2", "Initech", JobCategory::Technology))
            .expect("seed posting");
        JobStore::insert(store.as_ref(), job("j-3", "Globex", JobCategory::Design))
            .expect("seed posting");
        let mut closed = job("j-4", "Umbrella", JobCategory::Sales);
        closed.status = JobStatus::Closed;
        JobStore::insert(store.as_ref(), closed).expect("seed posting");

        ApplicationRepository::insert(store.as_ref(), application("app-1", "j-1", now()))
            .expect("seed application");

        let stats = service(store).platform().expect("platform stats");
        assert_eq!(stats.total_jobs, 3);
        assert_eq!(stats.total_companies, 2);
        assert_eq!(stats.total_applications, 1);
        assert_eq!(
            stats.top_categories,
            vec![
                CategoryCount {
                    category: "Technology",
                    count: 2
                },
                CategoryCount {
                    category: "Design",
                    count: 1
                },
            ]
        );
    }

    #[test]
    fn dashboard_requires_a_known_user() {
        let store = Arc::new(InMemoryStore::new());
        let result = service(store).dashboard(&UserId("nobody".to_string()));
        assert!(matches!(result, Err(StatsError::UnknownUser)));
    }

    #[test]
    fn dashboard_summarizes_the_funnel_and_skips_applied_recommendations() {
        let store = Arc::new(InMemoryStore::new());
        store.upsert_user(profile()).expect("seed user");
        JobStore::insert(store.as_ref(), job("j-applied", "Initech", JobCategory::Technology))
            .expect("seed posting");
        JobStore::insert(store.as_ref(), job("j-open", "Globex", JobCategory::Technology))
            .expect("seed posting");

        // Stalled submission: three weeks old with no employer response.
        ApplicationRepository::insert(
            store.as_ref(),
            application("app-1", "j-applied", now() - Duration::days(21)),
        )
        .expect("seed application");

        let summary = service(store)
            .dashboard(&UserId("u-1".to_string()))
            .expect("dashboard");

        assert_eq!(summary.stats.total, 1);
        assert_eq!(summary.stats.submitted, 1);
        assert_eq!(summary.follow_up_due, 1);
        assert_eq!(summary.recent_applications.len(), 1);
        assert!(summary.upcoming_interviews.is_empty());
        assert_eq!(summary.profile_completion, 40);

        let recommended: Vec<&str> = summary
            .recommended_jobs
            .iter()
            .map(|job| job.id.0.as_str())
            .collect();
        assert!(recommended.contains(&"j-open"));
        assert!(!recommended.contains(&"j-applied"));
    }

    #[test]
    fn dashboard_lists_upcoming_interviews_and_recent_moves() {
        let store = Arc::new(InMemoryStore::new());
        store.upsert_user(profile()).expect("seed user");
        JobStore::insert(store.as_ref(), job("j-1", "Initech", JobCategory::Technology))
            .expect("seed posting");

        let mut interviewing = application("app-1", "j-1", now() - Duration::days(7));
        apply_transition(
            &mut interviewing,
            ApplicationStatus::Interview,
            None,
            now() - Duration::days(2),
        );
        interviewing.interview.scheduled = true;
        interviewing.interview.date_time = Some(now() + Duration::days(2));
        ApplicationRepository::insert(store.as_ref(), interviewing).expect("seed application");

        let summary = service(store)
            .dashboard(&UserId("u-1".to_string()))
            .expect("dashboard");

        assert_eq!(summary.upcoming_interviews.len(), 1);
        assert_eq!(summary.upcoming_interviews[0].id.0, "app-1");

        assert!(!summary.activity.is_empty());
        let newest = &summary.activity[0];
        assert_eq!(newest.kind, ActivityKind::StatusUpdate);
        assert!(newest.title.contains("Interview Scheduled"));
        // Feed is newest-first.
        assert!(summary
            .activity
            .windows(2)
            .all(|pair| pair[0].date >= pair[1].date));
    }
}
