//! Media category management.

use crate::auth::Session;
use crate::error::{ErrorResponse, HttpAppError, ValidatedJson};
use crate::state::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use kentcms_core::models::{CategoryResponse, NewCategory};
use serde::Serialize;
use std::sync::Arc;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Serialize, ToSchema)]
pub struct CategoryListResponse {
    pub data: Vec<CategoryResponse>,
}

#[utoipa::path(
    get,
    path = "/api/v0/media/categories",
    tag = "categories",
    responses(
        (status = 200, description = "Categories with media counts", body = CategoryListResponse)
    )
)]
#[tracing::instrument(skip(state), fields(operation = "list_categories"))]
pub async fn list_categories(
    State(state): State<Arc<AppState>>,
) -> Result<Json<CategoryListResponse>, HttpAppError> {
    let data = state
        .category_repository
        .list_with_counts()
        .await?
        .into_iter()
        .map(CategoryResponse::from)
        .collect();

    Ok(Json(CategoryListResponse { data }))
}

#[utoipa::path(
    post,
    path = "/api/v0/media/categories",
    tag = "categories",
    request_body = NewCategory,
    responses(
        (status = 201, description = "Category created", body = CategoryResponse),
        (status = 400, description = "Invalid or duplicate name", body = ErrorResponse),
        (status = 401, description = "Missing or invalid session", body = ErrorResponse)
    ),
    security(("session_token" = []))
)]
#[tracing::instrument(skip(state, new), fields(operation = "create_category"))]
pub async fn create_category(
    State(state): State<Arc<AppState>>,
    _session: Session,
    ValidatedJson(new): ValidatedJson<NewCategory>,
) -> Result<Response, HttpAppError> {
    let category = state.category_repository.create(&new).await?;
    tracing::info!(category = %category.name, "Category created");

    Ok((
        StatusCode::CREATED,
        Json(CategoryResponse::from(category)),
    )
        .into_response())
}

#[utoipa::path(
    delete,
    path = "/api/v0/media/categories/{id}",
    tag = "categories",
    params(("id" = Uuid, Path, description = "Category ID")),
    responses(
        (status = 204, description = "Category deleted"),
        (status = 400, description = "Category is built in", body = ErrorResponse),
        (status = 401, description = "Missing or invalid session", body = ErrorResponse),
        (status = 404, description = "Category not found", body = ErrorResponse)
    ),
    security(("session_token" = []))
)]
#[tracing::instrument(skip(state), fields(category_id = %id, operation = "delete_category"))]
pub async fn delete_category(
    State(state): State<Arc<AppState>>,
    _session: Session,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, HttpAppError> {
    state.category_repository.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
