//! Story handlers.

use crate::api::AppState;
use crate::error::ApiError;
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use tokio_util::sync::CancellationToken;

/// GET /api/stories/:count - Best stories, highest score first
#[utoipa::path(
    get,
    path = "/api/stories/{count}",
    tag = "stories",
    params(
        ("count" = i64, Path, description = "Number of stories to return; zero or negative returns an empty list")
    ),
    responses(
        (status = 200, description = "Stories ordered by score, highest first", body = Vec<crate::types::StoryRecord>),
        (status = 400, description = "Count above the configured maximum", body = ApiError),
        (status = 502, description = "Upstream returned a malformed response", body = ApiError),
        (status = 503, description = "Upstream unavailable after all retries", body = ApiError)
    )
)]
pub async fn get_best_stories(State(state): State<AppState>, Path(count): Path<i64>) -> Response {
    let max_count = state.config.server.max_count;
    if count > max_count {
        return ApiError::validation(format!("count must not exceed {max_count}")).into_response();
    }

    // Dropping the handler (client went away) cancels every pending retry
    let cancel = CancellationToken::new();
    let _guard = cancel.clone().drop_guard();

    match state.service.best_stories_with_cancel(count, &cancel).await {
        Ok(stories) => (StatusCode::OK, Json(stories)).into_response(),
        Err(e) => {
            tracing::error!(error = %e, count, "Failed to fetch best stories");
            e.into_response()
        }
    }
}
