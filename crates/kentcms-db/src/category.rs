//! Category repository.

use kentcms_core::models::{CategoryWithCount, MediaCategory, NewCategory};
use kentcms_core::AppError;
use sqlx::{PgPool, Postgres};
use uuid::Uuid;

const CATEGORY_COLUMNS: &str = "id, name, icon, sort_order, is_built_in, created_at";

#[derive(Clone)]
pub struct CategoryRepository {
    pool: PgPool,
}

impl CategoryRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// List categories with their media counts, ordered for display.
    #[tracing::instrument(skip(self), fields(db.table = "media_categories", db.operation = "select"))]
    pub async fn list_with_counts(&self) -> Result<Vec<CategoryWithCount>, AppError> {
        let categories = sqlx::query_as::<Postgres, CategoryWithCount>(
            r#"
            SELECT c.id, c.name, c.icon, c.sort_order, c.is_built_in, c.created_at,
                   COUNT(m.id) AS media_count
            FROM media_categories c
            LEFT JOIN media m ON m.category_id = c.id
            GROUP BY c.id
            ORDER BY c.sort_order ASC, c.name ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(categories)
    }

    #[tracing::instrument(skip(self), fields(db.table = "media_categories", db.operation = "select", db.record_id = %id))]
    pub async fn get(&self, id: Uuid) -> Result<Option<MediaCategory>, AppError> {
        let category = sqlx::query_as::<Postgres, MediaCategory>(&format!(
            "SELECT {} FROM media_categories WHERE id = $1",
            CATEGORY_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(category)
    }

    #[tracing::instrument(skip(self, new), fields(db.table = "media_categories", db.operation = "insert"))]
    pub async fn create(&self, new: &NewCategory) -> Result<MediaCategory, AppError> {
        let name = new.name.trim();
        if name.is_empty() {
            return Err(AppError::BadRequest("Category name is required".to_string()));
        }

        let duplicate_exists = sqlx::query_scalar::<Postgres, bool>(
            "SELECT EXISTS(SELECT 1 FROM media_categories WHERE lower(name) = lower($1))",
        )
        .bind(name)
        .fetch_one(&self.pool)
        .await?;
        if duplicate_exists {
            return Err(AppError::BadRequest(format!(
                "Category '{}' already exists",
                name
            )));
        }

        let category = sqlx::query_as::<Postgres, MediaCategory>(&format!(
            r#"
            INSERT INTO media_categories (name, icon, sort_order, is_built_in)
            VALUES ($1, $2, $3, false)
            RETURNING {}
            "#,
            CATEGORY_COLUMNS
        ))
        .bind(name)
        .bind(&new.icon)
        .bind(new.order)
        .fetch_one(&self.pool)
        .await?;

        Ok(category)
    }

    /// Delete a category. Built-in categories are refused; media linked to
    /// the deleted category keeps its files and gets a null category.
    #[tracing::instrument(skip(self), fields(db.table = "media_categories", db.operation = "delete", db.record_id = %id))]
    pub async fn delete(&self, id: Uuid) -> Result<(), AppError> {
        let category = self
            .get(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Category {} not found", id)))?;

        category.ensure_deletable()?;

        sqlx::query("DELETE FROM media_categories WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        tracing::info!(category = %category.name, "Category deleted");
        Ok(())
    }
}
