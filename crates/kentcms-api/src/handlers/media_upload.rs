//! Media upload handler: file uploads and embed links.

use crate::auth::Session;
use crate::error::{ErrorResponse, HttpAppError};
use crate::state::AppState;
use axum::{
    extract::{Multipart, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use kentcms_core::models::{
    CategoryResponse, ImageProcessingSummary, MediaCategory, MediaRecord, MediaResponse, MediaType,
};
use kentcms_core::AppError;
use kentcms_db::NewMedia;
use kentcms_processing::{upload_pipeline, variant_keys, UploadFile};
use serde::Serialize;
use std::sync::Arc;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UploadResponse {
    pub success: bool,
    pub data: MediaResponse,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_processing: Option<ImageProcessingSummary>,
    pub message: String,
}

/// Parsed multipart form for an upload request.
#[derive(Default)]
struct UploadForm {
    file: Option<(Vec<u8>, String, String)>,
    category_id: Option<String>,
    alt: Option<String>,
    caption: Option<String>,
    custom_folder: Option<String>,
    embed_url: Option<String>,
}

async fn parse_upload_form(mut multipart: Multipart) -> Result<UploadForm, AppError> {
    let mut form = UploadForm::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::InvalidInput(format!("Failed to read multipart: {}", e)))?
    {
        let field_name = field.name().map(|s| s.to_string()).unwrap_or_default();

        match field_name.as_str() {
            "file" => {
                if form.file.is_some() {
                    return Err(AppError::InvalidInput(
                        "Multiple file fields are not allowed; send exactly one field named 'file'"
                            .to_string(),
                    ));
                }
                let filename = field
                    .file_name()
                    .map(|s: &str| s.to_string())
                    .unwrap_or_else(|| "unknown".to_string());
                let content_type = field
                    .content_type()
                    .map(|s: &str| s.to_string())
                    .unwrap_or_else(|| "application/octet-stream".to_string());
                let data = field.bytes().await.map_err(|e| {
                    AppError::InvalidInput(format!("Failed to read file data: {}", e))
                })?;
                form.file = Some((data.to_vec(), filename, content_type));
            }
            "categoryId" => form.category_id = read_text(field).await?,
            "alt" => form.alt = read_text(field).await?,
            "caption" => form.caption = read_text(field).await?,
            "customFolder" => form.custom_folder = read_text(field).await?,
            "embedUrl" => form.embed_url = read_text(field).await?,
            other => {
                tracing::debug!(field = %other, "Ignoring unknown multipart field");
            }
        }
    }

    Ok(form)
}

async fn read_text(field: axum::extract::multipart::Field<'_>) -> Result<Option<String>, AppError> {
    let text = field
        .text()
        .await
        .map_err(|e| AppError::InvalidInput(format!("Failed to read form field: {}", e)))?;
    let trimmed = text.trim().to_string();
    Ok(if trimmed.is_empty() { None } else { Some(trimmed) })
}

/// Which path an upload form takes. An embed link always wins: file handling
/// is skipped entirely, even when a file field is also present.
#[derive(Debug)]
enum UploadRoute {
    Embed(String),
    File,
    Rejected,
}

fn route_upload(form: &UploadForm) -> UploadRoute {
    match (&form.embed_url, &form.file) {
        (Some(url), _) => UploadRoute::Embed(url.clone()),
        (None, Some(_)) => UploadRoute::File,
        (None, None) => UploadRoute::Rejected,
    }
}

/// A supplied categoryId must reference an existing category. A category
/// deleted mid-flight degrades to a client error, never a crash.
fn require_category(found: Option<MediaCategory>) -> Result<MediaCategory, AppError> {
    found.ok_or_else(|| AppError::BadRequest("Invalid category".to_string()))
}

/// Category linkage for the persisted record and the response payload.
/// Custom-folder uploads never link a category, even when one was supplied.
fn linked_category(
    used_custom_folder: bool,
    category: Option<MediaCategory>,
) -> Option<MediaCategory> {
    if used_custom_folder {
        None
    } else {
        category
    }
}

/// Upload a media file or register an embed link.
///
/// With a `file` field, the file runs through validation, threat scanning,
/// and (for category images) variant generation before being recorded. With
/// an `embedUrl` field and no file, an embed record is created instead.
#[utoipa::path(
    post,
    path = "/api/v0/media",
    tag = "media",
    request_body(content = inline(Object), content_type = "multipart/form-data"),
    responses(
        (status = 201, description = "Media created", body = UploadResponse),
        (status = 400, description = "Validation failed or threat detected", body = ErrorResponse),
        (status = 401, description = "Missing or invalid session", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    security(("session_token" = []))
)]
#[tracing::instrument(skip(state, headers, multipart), fields(operation = "upload_media"))]
pub async fn upload_media(
    State(state): State<Arc<AppState>>,
    _session: Session,
    headers: HeaderMap,
    multipart: Multipart,
) -> Result<Response, HttpAppError> {
    let form = parse_upload_form(multipart).await?;

    let alt = form.alt.clone().unwrap_or_default();
    let caption = form.caption.clone().unwrap_or_default();

    // An embed link bypasses the file pipeline entirely, even when a file
    // field was also sent
    match route_upload(&form) {
        UploadRoute::Embed(embed_url) => {
            if form.file.is_some() {
                tracing::debug!("Upload carried both a file and an embedUrl; the file is ignored");
            }
            let record = MediaRecord::new_embed(embed_url, alt, caption);
            let inserted = state.media_repository.insert_embed(&record).await?;
            tracing::info!(media_id = %inserted.id, "Embed link recorded");
            return Ok((
                StatusCode::CREATED,
                Json(UploadResponse {
                    success: true,
                    data: MediaResponse::from_record(inserted, None),
                    image_processing: None,
                    message: "Embed link recorded".to_string(),
                }),
            )
                .into_response());
        }
        UploadRoute::File => {}
        UploadRoute::Rejected => {
            return Err(AppError::BadRequest(
                "Provide a file or an embedUrl".to_string(),
            )
            .into());
        }
    }

    let (data, original_filename, content_type) = form.file.unwrap_or_default();

    // The category must exist before anything is written
    let category = match form.category_id.as_deref() {
        Some(raw) => {
            let id: Uuid = raw.parse().map_err(AppError::from)?;
            Some(require_category(
                state.category_repository.get(id).await?,
            )?)
        }
        None => None,
    };

    let origin_hint = headers
        .get(header::REFERER)
        .and_then(|value| value.to_str().ok());
    let target = state
        .resolver
        .resolve(
            category.as_ref().map(|c| c.name.as_str()),
            form.custom_folder.as_deref(),
            origin_hint,
        )
        .ok_or_else(|| {
            AppError::BadRequest(
                "A category or custom folder is required to store the upload".to_string(),
            )
        })?;

    let stored = upload_pipeline(
        UploadFile {
            data,
            original_filename,
            content_type,
        },
        &target,
        &state.policy,
        state.storage.clone(),
        state.scanner.clone(),
    )
    .await?;

    let media_type = MediaType::from_mime(&stored.content_type).ok_or_else(|| {
        AppError::Internal(format!(
            "Stored file has unclassifiable MIME type '{}'",
            stored.content_type
        ))
    })?;

    // The record and the response must agree: a custom-folder upload links
    // no category even when a categoryId was supplied
    let category = linked_category(target.used_custom_folder, category);
    let category_id = category.as_ref().map(|c| c.id);

    let record = state
        .media_repository
        .insert(NewMedia {
            filename: stored.filename.clone(),
            original_name: stored.original_name.clone(),
            mime_type: stored.content_type.clone(),
            file_size: stored.file_size,
            path: stored.key.clone(),
            url: stored.url.clone(),
            alt,
            caption,
            category_id,
            media_type,
        })
        .await;

    let record = match record {
        Ok(record) => record,
        Err(e) => {
            // The file is already on disk; remove it so a failed insert does
            // not leave an orphan, without blocking the error response.
            let storage = state.storage.clone();
            let mut keys = vec![stored.key.clone()];
            if stored.image_processing.is_some() {
                keys.extend(variant_keys(&target, &stored.filename));
            }
            tokio::spawn(async move {
                for key in keys {
                    if let Err(cleanup_err) = storage.delete(&key).await {
                        tracing::warn!(
                            error = %cleanup_err,
                            key = %key,
                            "Failed to cleanup storage file after DB error"
                        );
                    }
                }
            });
            return Err(e.into());
        }
    };

    tracing::info!(
        media_id = %record.id,
        key = %record.path,
        size_bytes = record.file_size,
        "Media uploaded"
    );

    Ok((
        StatusCode::CREATED,
        Json(UploadResponse {
            success: true,
            data: MediaResponse::from_record(record, category.map(CategoryResponse::from)),
            image_processing: stored.image_processing,
            message: "Upload successful".to_string(),
        }),
    )
        .into_response())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn form(file: bool, embed: bool) -> UploadForm {
        UploadForm {
            file: file.then(|| (vec![0xFF], "photo.jpg".to_string(), "image/jpeg".to_string())),
            embed_url: embed.then(|| "https://video.example.org/v/abc123".to_string()),
            ..UploadForm::default()
        }
    }

    fn category() -> MediaCategory {
        MediaCategory {
            id: Uuid::new_v4(),
            name: "Haberler".to_string(),
            icon: "newspaper".to_string(),
            sort_order: 1,
            is_built_in: true,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn embed_url_wins_over_a_file_in_the_same_request() {
        match route_upload(&form(true, true)) {
            UploadRoute::Embed(url) => assert_eq!(url, "https://video.example.org/v/abc123"),
            other => panic!("expected the embed route, got {:?}", other),
        }
    }

    #[test]
    fn file_only_takes_the_file_pipeline() {
        assert!(matches!(route_upload(&form(true, false)), UploadRoute::File));
    }

    #[test]
    fn empty_form_is_rejected() {
        assert!(matches!(
            route_upload(&form(false, false)),
            UploadRoute::Rejected
        ));
    }

    #[test]
    fn missing_category_becomes_a_client_error() {
        let err = require_category(None).unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
        assert!(err.to_string().contains("Invalid category"));
    }

    #[test]
    fn existing_category_passes_through() {
        let found = require_category(Some(category())).unwrap();
        assert_eq!(found.name, "Haberler");
    }

    #[test]
    fn custom_folder_uploads_drop_the_category_link() {
        assert!(linked_category(true, Some(category())).is_none());
        assert_eq!(
            linked_category(false, Some(category())).map(|c| c.name),
            Some("Haberler".to_string())
        );
    }
}
