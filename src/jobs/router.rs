use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;
use tracing::warn;

use super::catalog::{facets, JobCounter, JobFilters, JobStore};
use super::domain::{ExperienceLevel, JobCategory, JobId, JobType, WorkMode};
use crate::clock::Clock;
use crate::store::StoreError;

/// Browse/detail endpoints over the catalog.
pub fn job_router<J>(jobs: Arc<J>, clock: Arc<dyn Clock>) -> Router
where
    J: JobStore + 'static,
{
    let state = CatalogState { jobs, clock };
    Router::new()
        .route("/api/v1/jobs", get(browse_handler::<J>))
        .route("/api/v1/jobs/latest", get(latest_handler::<J>))
        .route("/api/v1/jobs/facets", get(facets_handler::<J>))
        .route("/api/v1/jobs/:id", get(detail_handler::<J>))
        .with_state(state)
}

pub(crate) struct CatalogState<J> {
    jobs: Arc<J>,
    clock: Arc<dyn Clock>,
}

impl<J> Clone for CatalogState<J> {
    fn clone(&self) -> Self {
        Self {
            jobs: self.jobs.clone(),
            clock: self.clock.clone(),
        }
    }
}

fn store_response(err: StoreError) -> Response {
    let status = match err {
        StoreError::NotFound => StatusCode::NOT_FOUND,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (status, Json(json!({ "error": err.to_string() }))).into_response()
}

/// Flat query-string form of [`JobFilters`]; `skills` is comma-separated.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct BrowseQuery {
    search: Option<String>,
    location: Option<String>,
    category: Option<JobCategory>,
    job_type: Option<JobType>,
    work_mode: Option<WorkMode>,
    experience_level: Option<ExperienceLevel>,
    salary_min: Option<u32>,
    salary_max: Option<u32>,
    skills: Option<String>,
}

impl BrowseQuery {
    fn into_filters(self) -> JobFilters {
        let skills = self
            .skills
            .map(|raw| {
                raw.split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();

        JobFilters {
            search: self.search,
            location: self.location,
            category: self.category,
            job_type: self.job_type,
            work_mode: self.work_mode,
            experience_level: self.experience_level,
            salary_min: self.salary_min,
            salary_max: self.salary_max,
            skills,
        }
    }
}

pub(crate) async fn browse_handler<J>(
    State(state): State<CatalogState<J>>,
    Query(query): Query<BrowseQuery>,
) -> Response
where
    J: JobStore + 'static,
{
    let now = state.clock.now();
    match state.jobs.find_eligible(&query.into_filters(), now) {
        Ok(jobs) => (StatusCode::OK, Json(jobs)).into_response(),
        Err(err) => store_response(err),
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct LatestQuery {
    limit: Option<usize>,
}

pub(crate) async fn latest_handler<J>(
    State(state): State<CatalogState<J>>,
    Query(query): Query<LatestQuery>,
) -> Response
where
    J: JobStore + 'static,
{
    let now = state.clock.now();
    match state.jobs.latest(query.limit.unwrap_or(8), now) {
        Ok(jobs) => (StatusCode::OK, Json(jobs)).into_response(),
        Err(err) => store_response(err),
    }
}

pub(crate) async fn facets_handler<J>(State(state): State<CatalogState<J>>) -> Response
where
    J: JobStore + 'static,
{
    let now = state.clock.now();
    match state.jobs.find_eligible(&JobFilters::default(), now) {
        Ok(jobs) => (StatusCode::OK, Json(facets(&jobs))).into_response(),
        Err(err) => store_response(err),
    }
}

pub(crate) async fn detail_handler<J>(
    State(state): State<CatalogState<J>>,
    Path(id): Path<String>,
) -> Response
where
    J: JobStore + 'static,
{
    let id = JobId(id);
    let job = match state.jobs.fetch(&id) {
        Ok(Some(job)) => job,
        Ok(None) => {
            return (
                StatusCode::NOT_FOUND,
                Json(json!({ "error": "job not found" })),
            )
                .into_response()
        }
        Err(err) => return store_response(err),
    };

    // View tracking is best effort; the detail response never fails on it.
    if let Err(err) = state.jobs.increment(&id, JobCounter::Views) {
        warn!(job = %id.0, error = %err, "failed to increment view counter");
    }

    (StatusCode::OK, Json(job)).into_response()
}
