use axum::Json;
use axum::extract::State;
use axum::response::IntoResponse;

use crate::application::errors::{ApiError, AppError};
use crate::application::routes::support::JsonPayload;
use crate::application::state::AppState;
use crate::domain::comics::{ComicRequest, ComicResponse};

#[tracing::instrument(skip(state, request))]
pub(crate) async fn generate_comic(
    State(state): State<AppState>,
    JsonPayload(request): JsonPayload<ComicRequest>,
) -> Result<Json<ComicResponse>, ApiError> {
    let plan = request.validate()?;

    let images = state
        .comic_service
        .generate(&plan)
        .await
        .map_err(AppError::from)?;

    tracing::info!(panels = images.len(), "comic generated");
    Ok(Json(ComicResponse::from(images)))
}

pub(crate) async fn health() -> impl IntoResponse {
    ([("content-type", "application/json")], r#"{"status":"ok"}"#)
}
