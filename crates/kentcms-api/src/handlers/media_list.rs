//! Media listing with filtering, sorting, and offset pagination.

use crate::error::{ErrorResponse, HttpAppError};
use crate::state::AppState;
use axum::{
    extract::{Query, State},
    Json,
};
use kentcms_core::models::{CategoryResponse, MediaResponse, Pagination};
use kentcms_db::{MediaListFilter, SortField, SortOrder};
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::Arc;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

const DEFAULT_LIMIT: u32 = 20;
const MAX_LIMIT: u32 = 100;

#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct MediaListQuery {
    /// 1-based page number
    #[serde(default = "default_page")]
    pub page: u32,
    #[serde(default = "default_limit")]
    pub limit: u32,
    pub category_id: Option<Uuid>,
    pub custom_folder: Option<String>,
    /// Substring search over original name, alt text, and caption
    pub search: Option<String>,
    /// Broad kind filter: image, video, or document
    #[serde(rename = "type")]
    pub media_kind: Option<String>,
    pub sort_by: Option<String>,
    pub sort_order: Option<String>,
}

fn default_page() -> u32 {
    1
}

fn default_limit() -> u32 {
    DEFAULT_LIMIT
}

#[derive(Debug, serde::Serialize, ToSchema)]
pub struct MediaListResponse {
    pub data: Vec<MediaResponse>,
    pub pagination: Pagination,
}

#[utoipa::path(
    get,
    path = "/api/v0/media",
    tag = "media",
    params(MediaListQuery),
    responses(
        (status = 200, description = "Media listing", body = MediaListResponse),
        (status = 400, description = "Unknown sort field or order", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state), fields(operation = "list_media"))]
pub async fn list_media(
    State(state): State<Arc<AppState>>,
    Query(query): Query<MediaListQuery>,
) -> Result<Json<MediaListResponse>, HttpAppError> {
    let sort_field = match query.sort_by.as_deref() {
        Some(raw) => SortField::parse(raw)?,
        None => SortField::default(),
    };
    let sort_order = match query.sort_order.as_deref() {
        Some(raw) => SortOrder::parse(raw)?,
        None => SortOrder::default(),
    };

    let filter = MediaListFilter {
        page: query.page.max(1),
        limit: query.limit.clamp(1, MAX_LIMIT),
        category_id: query.category_id,
        custom_folder: query.custom_folder,
        search: query.search,
        media_kind: query.media_kind,
        sort_field,
        sort_order,
    };

    let (records, total) = state.media_repository.list(&filter).await?;

    // One query for all category links instead of one per record
    let categories: HashMap<Uuid, CategoryResponse> = state
        .category_repository
        .list_with_counts()
        .await?
        .into_iter()
        .map(|c| (c.id, CategoryResponse::from(c)))
        .collect();

    let data = records
        .into_iter()
        .map(|record| {
            let category = record
                .category_id
                .and_then(|id| categories.get(&id).cloned());
            MediaResponse::from_record(record, category)
        })
        .collect();

    Ok(Json(MediaListResponse {
        data,
        pagination: Pagination::new(
            i64::from(filter.page),
            i64::from(filter.limit),
            total,
        ),
    }))
}
