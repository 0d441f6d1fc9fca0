use std::sync::Arc;

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde_json::json;

use super::{StatsError, StatsService};
use crate::applications::ApplicationRepository;
use crate::jobs::JobStore;
use crate::users::{UserDirectory, UserId};

/// Read-only aggregation endpoints.
pub fn stats_router<R, J, D>(service: Arc<StatsService<R, J, D>>) -> Router
where
    R: ApplicationRepository + 'static,
    J: JobStore + 'static,
    D: UserDirectory + 'static,
{
    Router::new()
        .route("/api/v1/stats/platform", get(platform_handler::<R, J, D>))
        .route("/api/v1/dashboard", get(dashboard_handler::<R, J, D>))
        .with_state(service)
}

fn error_response(err: StatsError) -> Response {
    let status = match err {
        StatsError::UnknownUser => StatusCode::NOT_FOUND,
        StatsError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (status, Json(json!({ "error": err.to_string() }))).into_response()
}

pub(crate) async fn platform_handler<R, J, D>(
    State(service): State<Arc<StatsService<R, J, D>>>,
) -> Response
where
    R: ApplicationRepository + 'static,
    J: JobStore + 'static,
    D: UserDirectory + 'static,
{
    match service.platform() {
        Ok(stats) => (StatusCode::OK, Json(stats)).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn dashboard_handler<R, J, D>(
    State(service): State<Arc<StatsService<R, J, D>>>,
    headers: HeaderMap,
) -> Response
where
    R: ApplicationRepository + 'static,
    J: JobStore + 'static,
    D: UserDirectory + 'static,
{
    let user = match headers
        .get("x-user-id")
        .and_then(|value| value.to_str().ok())
        .filter(|id| !id.is_empty())
    {
        Some(id) => UserId(id.to_string()),
        None => {
            let payload = json!({ "error": "missing x-user-id header" });
            return (StatusCode::UNAUTHORIZED, Json(payload)).into_response();
        }
    };

    match service.dashboard(&user) {
        Ok(summary) => (StatusCode::OK, Json(summary)).into_response(),
        Err(err) => error_response(err),
    }
}
