//! Single media record lookup.

use crate::error::{ErrorResponse, HttpAppError};
use crate::state::AppState;
use axum::{
    extract::{Path, State},
    Json,
};
use kentcms_core::models::{CategoryResponse, MediaResponse};
use kentcms_core::AppError;
use std::sync::Arc;
use uuid::Uuid;

#[utoipa::path(
    get,
    path = "/api/v0/media/{id}",
    tag = "media",
    params(("id" = Uuid, Path, description = "Media ID")),
    responses(
        (status = 200, description = "Media record", body = MediaResponse),
        (status = 404, description = "Media not found", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state), fields(media_id = %id, operation = "get_media"))]
pub async fn get_media(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<MediaResponse>, HttpAppError> {
    let record = state
        .media_repository
        .get(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Media not found".to_string()))?;

    let category = match record.category_id {
        Some(category_id) => state
            .category_repository
            .get(category_id)
            .await?
            .map(CategoryResponse::from),
        None => None,
    };

    Ok(Json(MediaResponse::from_record(record, category)))
}
