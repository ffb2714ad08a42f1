//! Media category models.

use crate::error::AppError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// A named grouping of media records with its own storage subdirectory.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct MediaCategory {
    pub id: Uuid,
    pub name: String,
    pub icon: String,
    pub sort_order: i32,
    /// Built-in categories ship with the CMS and cannot be deleted.
    pub is_built_in: bool,
    pub created_at: DateTime<Utc>,
}

impl MediaCategory {
    /// Built-in categories must never be deleted; media_type folders and
    /// the admin UI both depend on them existing.
    pub fn ensure_deletable(&self) -> Result<(), AppError> {
        if self.is_built_in {
            return Err(AppError::BadRequest(format!(
                "Category '{}' is built in and cannot be deleted",
                self.name
            )));
        }
        Ok(())
    }
}

/// Category with its derived media count, as fetched for list responses.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct CategoryWithCount {
    pub id: Uuid,
    pub name: String,
    pub icon: String,
    pub sort_order: i32,
    pub is_built_in: bool,
    pub created_at: DateTime<Utc>,
    pub media_count: i64,
}

/// Payload for creating a category.
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NewCategory {
    pub name: String,
    #[serde(default)]
    pub icon: String,
    #[serde(default)]
    pub order: i32,
}

/// Category as returned by the API.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CategoryResponse {
    pub id: Uuid,
    pub name: String,
    pub icon: String,
    pub order: i32,
    pub is_built_in: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub media_count: Option<i64>,
}

impl From<MediaCategory> for CategoryResponse {
    fn from(category: MediaCategory) -> Self {
        CategoryResponse {
            id: category.id,
            name: category.name,
            icon: category.icon,
            order: category.sort_order,
            is_built_in: category.is_built_in,
            media_count: None,
        }
    }
}

impl From<CategoryWithCount> for CategoryResponse {
    fn from(category: CategoryWithCount) -> Self {
        CategoryResponse {
            id: category.id,
            name: category.name,
            icon: category.icon,
            order: category.sort_order,
            is_built_in: category.is_built_in,
            media_count: Some(category.media_count),
        }
    }
}
