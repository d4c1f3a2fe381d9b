use axum::{
    Json,
    extract::{Path, Query, State, rejection::JsonRejection},
    http::StatusCode,
    response::IntoResponse,
};
use tracing::{debug, error};

use atlas_types::api::{ActionResult, FeedQuery, NewExperience};

use crate::error::ExperienceError;
use crate::service::ExperienceService;
use crate::state::AppState;

/// Run a blocking store call off the async runtime.
async fn blocking<F, T>(state: AppState, f: F) -> Result<T, StatusCode>
where
    F: FnOnce(&ExperienceService) -> T + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(move || f(&state.service))
        .await
        .map_err(|e| {
            error!("spawn_blocking join error: {}", e);
            StatusCode::INTERNAL_SERVER_ERROR
        })
}

fn action_status(result: &ActionResult) -> StatusCode {
    if result.success {
        StatusCode::OK
    } else {
        StatusCode::INTERNAL_SERVER_ERROR
    }
}

/// GET /experiences
pub async fn list_experiences(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, StatusCode> {
    let experiences = blocking(state, |svc| svc.get_experiences()).await?;
    Ok(Json(experiences))
}

/// POST /experiences. 201 on success, 400 with the joined validation
/// messages (or the body parse error), 500 with a generic message on storage
/// failure.
pub async fn create_experience(
    State(state): State<AppState>,
    payload: Result<Json<NewExperience>, JsonRejection>,
) -> Result<(StatusCode, Json<ActionResult>), StatusCode> {
    let req = match payload {
        Ok(Json(req)) => req,
        Err(rejection) => {
            debug!("Malformed submission body: {}", rejection);
            return Ok((
                StatusCode::BAD_REQUEST,
                Json(ActionResult::failed_with(rejection.body_text())),
            ));
        }
    };

    let result = blocking(state, move |svc| svc.try_create(&req)).await?;

    let status = match &result {
        Ok(_) => StatusCode::CREATED,
        Err(ExperienceError::Validation(_)) => StatusCode::BAD_REQUEST,
        Err(ExperienceError::Persistence(_)) => StatusCode::INTERNAL_SERVER_ERROR,
    };

    Ok((status, Json(ExperienceService::create_outcome(result))))
}

/// GET /experiences/stats
pub async fn get_stats(State(state): State<AppState>) -> Result<impl IntoResponse, StatusCode> {
    let stats = blocking(state, |svc| svc.get_experience_stats()).await?;
    Ok(Json(stats))
}

/// GET /experiences/feed?country=&visa_type=
pub async fn get_feed(
    State(state): State<AppState>,
    Query(query): Query<FeedQuery>,
) -> Result<impl IntoResponse, StatusCode> {
    let views = blocking(state, move |svc| svc.feed(&query)).await?;
    Ok(Json(views))
}

/// POST /experiences/{id}/helpful
pub async fn increment_helpful(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, StatusCode> {
    let result = blocking(state, move |svc| svc.increment_helpful(id)).await?;
    Ok((action_status(&result), Json(result)))
}

/// DELETE /experiences/{id}
pub async fn delete_experience(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, StatusCode> {
    let result = blocking(state, move |svc| svc.delete_experience(id)).await?;
    Ok((action_status(&result), Json(result)))
}
