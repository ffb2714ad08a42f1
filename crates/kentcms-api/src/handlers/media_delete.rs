//! Media deletion: database record plus stored file and renditions.

use crate::auth::Session;
use crate::error::{ErrorResponse, HttpAppError};
use crate::state::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
};
use kentcms_core::AppError;
use kentcms_processing::variant_keys;
use kentcms_storage::StorageTarget;
use std::sync::Arc;
use uuid::Uuid;

#[utoipa::path(
    delete,
    path = "/api/v0/media/{id}",
    tag = "media",
    params(("id" = Uuid, Path, description = "Media ID")),
    responses(
        (status = 204, description = "Media deleted"),
        (status = 401, description = "Missing or invalid session", body = ErrorResponse),
        (status = 404, description = "Media not found", body = ErrorResponse)
    ),
    security(("session_token" = []))
)]
#[tracing::instrument(skip(state), fields(media_id = %id, operation = "delete_media"))]
pub async fn delete_media(
    State(state): State<Arc<AppState>>,
    _session: Session,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, HttpAppError> {
    let record = state
        .media_repository
        .delete(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Media not found".to_string()))?;

    // Embeds have no stored file. For uploads, file removal is best-effort:
    // the record is gone either way and orphans are only disk noise.
    if !record.path.is_empty() {
        let mut keys = vec![record.path.clone()];
        if let Some((folder, filename)) = record.path.rsplit_once('/') {
            let target = StorageTarget {
                folder: folder.to_string(),
                used_custom_folder: false,
            };
            keys.extend(variant_keys(&target, filename));
        }
        for key in keys {
            if let Err(e) = state.storage.delete(&key).await {
                tracing::warn!(error = %e, key = %key, "Failed to delete stored file");
            }
        }
    }

    tracing::info!(media_id = %id, "Media deleted");
    Ok(StatusCode::NO_CONTENT)
}
