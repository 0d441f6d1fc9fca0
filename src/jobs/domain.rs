use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Identifier wrapper for job postings.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct JobId(pub String);

/// Posting lifecycle. Only `Active` postings accept applications.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Active,
    Paused,
    Closed,
    Draft,
}

impl JobStatus {
    pub const fn label(self) -> &'static str {
        match self {
            JobStatus::Active => "active",
            JobStatus::Paused => "paused",
            JobStatus::Closed => "closed",
            JobStatus::Draft => "draft",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum JobType {
    #[serde(rename = "Full-time")]
    FullTime,
    #[serde(rename = "Part-time")]
    PartTime,
    #[serde(rename = "Contract")]
    Contract,
    #[serde(rename = "Internship")]
    Internship,
    #[serde(rename = "Freelance")]
    Freelance,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WorkMode {
    #[serde(rename = "On-site")]
    OnSite,
    #[serde(rename = "Remote")]
    Remote,
    #[serde(rename = "Hybrid")]
    Hybrid,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExperienceLevel {
    #[serde(rename = "Entry Level")]
    Entry,
    #[serde(rename = "Mid Level")]
    Mid,
    #[serde(rename = "Senior Level")]
    Senior,
    #[serde(rename = "Executive")]
    Executive,
}

impl ExperienceLevel {
    pub const fn label(self) -> &'static str {
        match self {
            ExperienceLevel::Entry => "Entry Level",
            ExperienceLevel::Mid => "Mid Level",
            ExperienceLevel::Senior => "Senior Level",
            ExperienceLevel::Executive => "Executive",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum JobCategory {
    Technology,
    Marketing,
    Sales,
    Design,
    Finance,
    #[serde(rename = "Human Resources")]
    HumanResources,
    Operations,
    #[serde(rename = "Customer Service")]
    CustomerService,
    Healthcare,
    Education,
    Legal,
    Manufacturing,
    Other,
}

impl JobCategory {
    pub const fn label(self) -> &'static str {
        match self {
            JobCategory::Technology => "Technology",
            JobCategory::Marketing => "Marketing",
            JobCategory::Sales => "Sales",
            JobCategory::Design => "Design",
            JobCategory::Finance => "Finance",
            JobCategory::HumanResources => "Human Resources",
            JobCategory::Operations => "Operations",
            JobCategory::CustomerService => "Customer Service",
            JobCategory::Healthcare => "Healthcare",
            JobCategory::Education => "Education",
            JobCategory::Legal => "Legal",
            JobCategory::Manufacturing => "Manufacturing",
            JobCategory::Other => "Other",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    Usd,
    Inr,
    Eur,
    Gbp,
    Cad,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SalaryPeriod {
    Hourly,
    Monthly,
    Annually,
}

/// Advertised pay band. Either bound may be open; when both are present the
/// ceiling must not undercut the floor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SalaryRange {
    pub min: Option<u32>,
    pub max: Option<u32>,
    pub currency: Currency,
    pub period: SalaryPeriod,
}

impl SalaryRange {
    pub fn is_ordered(&self) -> bool {
        match (self.min, self.max) {
            (Some(min), Some(max)) => max >= min,
            _ => true,
        }
    }
}

impl Default for SalaryRange {
    fn default() -> Self {
        Self {
            min: None,
            max: None,
            currency: Currency::Usd,
            period: SalaryPeriod::Annually,
        }
    }
}

/// A job posting as stored in the catalog. Created by the employer-side
/// collaborator; the core only reads postings and bumps counters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Job {
    pub id: JobId,
    pub title: String,
    pub company: String,
    pub description: String,
    pub requirements: String,
    pub location: String,
    pub job_type: JobType,
    pub work_mode: WorkMode,
    pub experience_level: ExperienceLevel,
    pub category: JobCategory,
    #[serde(default)]
    pub salary: SalaryRange,
    #[serde(default)]
    pub skills: Vec<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    pub application_deadline: DateTime<Utc>,
    pub status: JobStatus,
    #[serde(default)]
    pub featured: bool,
    #[serde(default)]
    pub urgent: bool,
    #[serde(default)]
    pub view_count: u64,
    #[serde(default)]
    pub total_applications: u64,
    pub posted_at: DateTime<Utc>,
}

/// Constraint violations detected when a posting enters the catalog.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum JobValidationError {
    #[error("application deadline must be in the future")]
    DeadlineNotInFuture,
    #[error("maximum salary must be greater than or equal to minimum salary")]
    SalaryRangeInverted,
}

impl Job {
    /// Still accepting applications: active and the deadline has not passed.
    pub fn is_eligible(&self, now: DateTime<Utc>) -> bool {
        self.status == JobStatus::Active && self.application_deadline >= now
    }

    /// Invariants checked at insertion time. Existing postings may legally
    /// hold an expired deadline; they simply stop being eligible.
    pub fn validate_new(&self, now: DateTime<Utc>) -> Result<(), JobValidationError> {
        if self.application_deadline <= now {
            return Err(JobValidationError::DeadlineNotInFuture);
        }
        if !self.salary.is_ordered() {
            return Err(JobValidationError::SalaryRangeInverted);
        }
        Ok(())
    }
}
