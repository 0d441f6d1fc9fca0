use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;

use super::domain::{ApplicationDetails, ApplicationId, ApplicationStatus};
use super::repository::{ApplicationFilters, ApplicationRepository};
use super::service::{ApplicationError, ApplicationService};
use crate::jobs::{JobId, JobStore};
use crate::users::UserId;

/// Applicant-facing endpoints. The upstream auth layer resolves the session
/// and forwards the opaque user id in the `x-user-id` header.
pub fn application_router<R, J>(service: Arc<ApplicationService<R, J>>) -> Router
where
    R: ApplicationRepository + 'static,
    J: JobStore + 'static,
{
    Router::new()
        .route(
            "/api/v1/applications",
            post(submit_handler::<R, J>).get(list_handler::<R, J>),
        )
        .route("/api/v1/applications/stats", get(stats_handler::<R, J>))
        .route("/api/v1/applications/:id", get(detail_handler::<R, J>))
        .route(
            "/api/v1/applications/:id/withdraw",
            post(withdraw_handler::<R, J>),
        )
        .route("/api/v1/applications/:id/notes", put(notes_handler::<R, J>))
        .route(
            "/api/v1/applications/:id/follow-up",
            post(follow_up_handler::<R, J>),
        )
        .with_state(service)
}

fn current_user(headers: &HeaderMap) -> Result<UserId, Response> {
    headers
        .get("x-user-id")
        .and_then(|value| value.to_str().ok())
        .filter(|id| !id.is_empty())
        .map(|id| UserId(id.to_string()))
        .ok_or_else(|| {
            let payload = json!({ "error": "missing x-user-id header" });
            (StatusCode::UNAUTHORIZED, Json(payload)).into_response()
        })
}

fn error_response(err: ApplicationError) -> Response {
    let status = match &err {
        ApplicationError::Validation { .. } => StatusCode::UNPROCESSABLE_ENTITY,
        ApplicationError::NotFound => StatusCode::NOT_FOUND,
        ApplicationError::Unauthorized => StatusCode::FORBIDDEN,
        ApplicationError::JobNotEligible | ApplicationError::DuplicateApplication => {
            StatusCode::CONFLICT
        }
        ApplicationError::InvalidTransition(_) => StatusCode::BAD_REQUEST,
        ApplicationError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    let payload = json!({ "error": err.to_string() });
    (status, Json(payload)).into_response()
}

#[derive(Debug, Deserialize)]
pub(crate) struct SubmitRequest {
    pub job: String,
    #[serde(flatten)]
    pub details: ApplicationDetails,
}

pub(crate) async fn submit_handler<R, J>(
    State(service): State<Arc<ApplicationService<R, J>>>,
    headers: HeaderMap,
    Json(request): Json<SubmitRequest>,
) -> Response
where
    R: ApplicationRepository + 'static,
    J: JobStore + 'static,
{
    let user = match current_user(&headers) {
        Ok(user) => user,
        Err(response) => return response,
    };

    match service.create(JobId(request.job), user, request.details) {
        Ok(application) => (StatusCode::CREATED, Json(application)).into_response(),
        Err(err) => error_response(err),
    }
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct ListQuery {
    /// Single label or comma-separated set, e.g. `submitted,under-review`.
    status: Option<String>,
    #[serde(default)]
    needs_follow_up: bool,
}

impl ListQuery {
    fn into_filters(self, applicant: UserId) -> Result<ApplicationFilters, Response> {
        let mut statuses = Vec::new();
        if let Some(raw) = &self.status {
            for label in raw.split(',').map(str::trim).filter(|s| !s.is_empty()) {
                match ApplicationStatus::from_label(label) {
                    Some(status) => statuses.push(status),
                    None => {
                        let payload = json!({ "error": format!("unknown status '{label}'") });
                        return Err(
                            (StatusCode::UNPROCESSABLE_ENTITY, Json(payload)).into_response()
                        );
                    }
                }
            }
        }

        Ok(ApplicationFilters {
            applicant: Some(applicant),
            statuses,
            needs_follow_up: self.needs_follow_up,
            ..ApplicationFilters::default()
        })
    }
}

pub(crate) async fn list_handler<R, J>(
    State(service): State<Arc<ApplicationService<R, J>>>,
    headers: HeaderMap,
    Query(query): Query<ListQuery>,
) -> Response
where
    R: ApplicationRepository + 'static,
    J: JobStore + 'static,
{
    let user = match current_user(&headers) {
        Ok(user) => user,
        Err(response) => return response,
    };
    let filters = match query.into_filters(user) {
        Ok(filters) => filters,
        Err(response) => return response,
    };

    match service.list(&filters) {
        Ok(applications) => (StatusCode::OK, Json(applications)).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn stats_handler<R, J>(
    State(service): State<Arc<ApplicationService<R, J>>>,
    headers: HeaderMap,
) -> Response
where
    R: ApplicationRepository + 'static,
    J: JobStore + 'static,
{
    let user = match current_user(&headers) {
        Ok(user) => user,
        Err(response) => return response,
    };

    match service.user_stats(&user) {
        Ok(stats) => (StatusCode::OK, Json(stats)).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn detail_handler<R, J>(
    State(service): State<Arc<ApplicationService<R, J>>>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Response
where
    R: ApplicationRepository + 'static,
    J: JobStore + 'static,
{
    let user = match current_user(&headers) {
        Ok(user) => user,
        Err(response) => return response,
    };

    match service.get(&ApplicationId(id), &user) {
        Ok(application) => (StatusCode::OK, Json(application)).into_response(),
        Err(err) => error_response(err),
    }
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct WithdrawRequest {
    pub reason: Option<String>,
}

pub(crate) async fn withdraw_handler<R, J>(
    State(service): State<Arc<ApplicationService<R, J>>>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(request): Json<WithdrawRequest>,
) -> Response
where
    R: ApplicationRepository + 'static,
    J: JobStore + 'static,
{
    let user = match current_user(&headers) {
        Ok(user) => user,
        Err(response) => return response,
    };

    match service.withdraw(&ApplicationId(id), &user, request.reason) {
        Ok(application) => (StatusCode::OK, Json(application)).into_response(),
        Err(err) => error_response(err),
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct NotesRequest {
    pub personal_notes: String,
}

pub(crate) async fn notes_handler<R, J>(
    State(service): State<Arc<ApplicationService<R, J>>>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(request): Json<NotesRequest>,
) -> Response
where
    R: ApplicationRepository + 'static,
    J: JobStore + 'static,
{
    let user = match current_user(&headers) {
        Ok(user) => user,
        Err(response) => return response,
    };

    match service.add_personal_note(&ApplicationId(id), &user, request.personal_notes) {
        Ok(application) => (StatusCode::OK, Json(application)).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn follow_up_handler<R, J>(
    State(service): State<Arc<ApplicationService<R, J>>>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Response
where
    R: ApplicationRepository + 'static,
    J: JobStore + 'static,
{
    let user = match current_user(&headers) {
        Ok(user) => user,
        Err(response) => return response,
    };

    match service.record_follow_up(&ApplicationId(id), &user) {
        Ok(application) => (StatusCode::OK, Json(application)).into_response(),
        Err(err) => error_response(err),
    }
}
