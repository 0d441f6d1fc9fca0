//! Job catalog: postings, eligibility-filtered browse queries, and the
//! atomic counters behind view/application tracking.

pub mod catalog;
pub mod domain;
pub mod router;

pub use catalog::{
    facets, rank_listing, CatalogFacets, JobCounter, JobFilters, JobStore,
};
pub use domain::{
    Currency, ExperienceLevel, Job, JobCategory, JobId, JobStatus, JobType, JobValidationError,
    SalaryPeriod, SalaryRange, WorkMode,
};
pub use router::job_router;
