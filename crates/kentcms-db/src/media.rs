//! Media repository: persistence and querying of media records.

use kentcms_core::models::{MediaRecord, MediaType};
use kentcms_core::AppError;
use sqlx::{PgPool, Postgres};
use uuid::Uuid;

const MEDIA_COLUMNS: &str = "id, filename, original_name, mime_type, file_size, path, url, \
     alt, caption, category_id, media_type, embed_url, created_at, updated_at";

/// Column a media listing may be sorted by. Parsed from the client-facing
/// name; anything outside this set is rejected before any SQL is built.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortField {
    #[default]
    CreatedAt,
    OriginalName,
    Size,
    MimeType,
}

impl SortField {
    pub fn parse(value: &str) -> Result<Self, AppError> {
        match value {
            "createdAt" | "created_at" => Ok(SortField::CreatedAt),
            "originalName" | "original_name" => Ok(SortField::OriginalName),
            "size" | "file_size" => Ok(SortField::Size),
            "mimeType" | "mime_type" => Ok(SortField::MimeType),
            other => Err(AppError::InvalidInput(format!(
                "Unknown sort field '{}'; allowed: createdAt, originalName, size, mimeType",
                other
            ))),
        }
    }

    fn column(self) -> &'static str {
        match self {
            SortField::CreatedAt => "created_at",
            SortField::OriginalName => "original_name",
            SortField::Size => "file_size",
            SortField::MimeType => "mime_type",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl SortOrder {
    pub fn parse(value: &str) -> Result<Self, AppError> {
        match value {
            "asc" => Ok(SortOrder::Asc),
            "desc" => Ok(SortOrder::Desc),
            other => Err(AppError::InvalidInput(format!(
                "Unknown sort order '{}'; allowed: asc, desc",
                other
            ))),
        }
    }

    fn sql(self) -> &'static str {
        match self {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        }
    }
}

/// Typed listing filter. All conditions combine with AND.
#[derive(Debug, Clone)]
pub struct MediaListFilter {
    /// 1-based page number.
    pub page: u32,
    pub limit: u32,
    pub category_id: Option<Uuid>,
    /// Custom storage folder; matches the URL or path by folder segment.
    pub custom_folder: Option<String>,
    /// Substring search over original name, alt text, and caption.
    pub search: Option<String>,
    /// Broad kind filter: "image", "video", or "document". Anything else is
    /// a no-op rather than an error.
    pub media_kind: Option<String>,
    pub sort_field: SortField,
    pub sort_order: SortOrder,
}

impl MediaListFilter {
    fn offset(&self) -> i64 {
        (i64::from(self.page.max(1)) - 1) * i64::from(self.limit)
    }
}

/// Static SQL condition for a broad kind filter. Unknown kinds filter nothing.
fn kind_condition(kind: &str) -> Option<&'static str> {
    match kind {
        "image" => Some("mime_type LIKE 'image/%'"),
        "video" => Some("mime_type LIKE 'video/%'"),
        "document" => Some(
            "mime_type IN ('application/pdf', 'application/msword', \
             'application/vnd.openxmlformats-officedocument.wordprocessingml.document', \
             'text/plain')",
        ),
        _ => None,
    }
}

/// Payload for inserting an uploaded (non-embed) media record.
#[derive(Debug, Clone)]
pub struct NewMedia {
    pub filename: String,
    pub original_name: String,
    pub mime_type: String,
    pub file_size: i64,
    pub path: String,
    pub url: String,
    pub alt: String,
    pub caption: String,
    pub category_id: Option<Uuid>,
    pub media_type: MediaType,
}

#[derive(Clone)]
pub struct MediaRepository {
    pool: PgPool,
}

impl MediaRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    #[tracing::instrument(skip(self, new), fields(db.table = "media", db.operation = "insert"))]
    pub async fn insert(&self, new: NewMedia) -> Result<MediaRecord, AppError> {
        let record = sqlx::query_as::<Postgres, MediaRecord>(&format!(
            r#"
            INSERT INTO media (filename, original_name, mime_type, file_size, path, url,
                               alt, caption, category_id, media_type)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING {}
            "#,
            MEDIA_COLUMNS
        ))
        .bind(&new.filename)
        .bind(&new.original_name)
        .bind(&new.mime_type)
        .bind(new.file_size)
        .bind(&new.path)
        .bind(&new.url)
        .bind(&new.alt)
        .bind(&new.caption)
        .bind(new.category_id)
        .bind(new.media_type)
        .fetch_one(&self.pool)
        .await?;

        Ok(record)
    }

    /// Persist an embed record built with [`MediaRecord::new_embed`].
    #[tracing::instrument(skip(self, record), fields(db.table = "media", db.operation = "insert"))]
    pub async fn insert_embed(&self, record: &MediaRecord) -> Result<MediaRecord, AppError> {
        let inserted = sqlx::query_as::<Postgres, MediaRecord>(&format!(
            r#"
            INSERT INTO media (filename, original_name, mime_type, file_size, path, url,
                               alt, caption, category_id, media_type, embed_url)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            RETURNING {}
            "#,
            MEDIA_COLUMNS
        ))
        .bind(&record.filename)
        .bind(&record.original_name)
        .bind(&record.mime_type)
        .bind(record.file_size)
        .bind(&record.path)
        .bind(&record.url)
        .bind(&record.alt)
        .bind(&record.caption)
        .bind(record.category_id)
        .bind(record.media_type)
        .bind(&record.embed_url)
        .fetch_one(&self.pool)
        .await?;

        Ok(inserted)
    }

    #[tracing::instrument(skip(self), fields(db.table = "media", db.operation = "select", db.record_id = %id))]
    pub async fn get(&self, id: Uuid) -> Result<Option<MediaRecord>, AppError> {
        let record = sqlx::query_as::<Postgres, MediaRecord>(&format!(
            "SELECT {} FROM media WHERE id = $1",
            MEDIA_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(record)
    }

    /// Delete a record; returns the deleted row so the caller can remove the
    /// stored file afterwards.
    #[tracing::instrument(skip(self), fields(db.table = "media", db.operation = "delete", db.record_id = %id))]
    pub async fn delete(&self, id: Uuid) -> Result<Option<MediaRecord>, AppError> {
        let record = sqlx::query_as::<Postgres, MediaRecord>(&format!(
            "DELETE FROM media WHERE id = $1 RETURNING {}",
            MEDIA_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(record)
    }

    /// List records matching `filter` plus the unpaginated total, for the
    /// pagination envelope.
    #[tracing::instrument(skip(self, filter), fields(db.table = "media", db.operation = "select"))]
    pub async fn list(&self, filter: &MediaListFilter) -> Result<(Vec<MediaRecord>, i64), AppError> {
        // Conditions carry numbered placeholders; the two queries below bind
        // the same values in the same order.
        let mut conditions: Vec<String> = Vec::new();
        let mut bind_index = 1;

        if filter.category_id.is_some() {
            conditions.push(format!("category_id = ${}", bind_index));
            bind_index += 1;
        }
        if filter.custom_folder.is_some() {
            conditions.push(format!(
                "(url ILIKE ${n} OR path ILIKE ${n})",
                n = bind_index
            ));
            bind_index += 1;
        }
        if filter.search.is_some() {
            conditions.push(format!(
                "(original_name ILIKE ${n} OR alt ILIKE ${n} OR caption ILIKE ${n})",
                n = bind_index
            ));
            bind_index += 1;
        }
        if let Some(kind) = filter.media_kind.as_deref() {
            if let Some(condition) = kind_condition(kind) {
                conditions.push(condition.to_string());
            }
        }

        let where_sql = if conditions.is_empty() {
            String::new()
        } else {
            format!(" WHERE {}", conditions.join(" AND "))
        };

        let folder_pattern = filter
            .custom_folder
            .as_deref()
            .map(|folder| format!("%/{}/%", folder));
        let search_pattern = filter
            .search
            .as_deref()
            .map(|term| format!("%{}%", term));

        let count_sql = format!("SELECT COUNT(*) FROM media{}", where_sql);
        let mut count_query = sqlx::query_scalar::<Postgres, i64>(&count_sql);
        if let Some(category_id) = filter.category_id {
            count_query = count_query.bind(category_id);
        }
        if let Some(ref pattern) = folder_pattern {
            count_query = count_query.bind(pattern);
        }
        if let Some(ref pattern) = search_pattern {
            count_query = count_query.bind(pattern);
        }
        let total = count_query.fetch_one(&self.pool).await?;

        let list_sql = format!(
            "SELECT {} FROM media{} ORDER BY {} {}, id DESC LIMIT ${} OFFSET ${}",
            MEDIA_COLUMNS,
            where_sql,
            filter.sort_field.column(),
            filter.sort_order.sql(),
            bind_index,
            bind_index + 1
        );
        let mut list_query = sqlx::query_as::<Postgres, MediaRecord>(&list_sql);
        if let Some(category_id) = filter.category_id {
            list_query = list_query.bind(category_id);
        }
        if let Some(ref pattern) = folder_pattern {
            list_query = list_query.bind(pattern);
        }
        if let Some(ref pattern) = search_pattern {
            list_query = list_query.bind(pattern);
        }
        let records = list_query
            .bind(i64::from(filter.limit))
            .bind(filter.offset())
            .fetch_all(&self.pool)
            .await?;

        Ok((records, total))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_filter() -> MediaListFilter {
        MediaListFilter {
            page: 1,
            limit: 20,
            category_id: None,
            custom_folder: None,
            search: None,
            media_kind: None,
            sort_field: SortField::default(),
            sort_order: SortOrder::default(),
        }
    }

    #[test]
    fn sort_field_allow_list() {
        assert_eq!(SortField::parse("createdAt").unwrap(), SortField::CreatedAt);
        assert_eq!(
            SortField::parse("originalName").unwrap(),
            SortField::OriginalName
        );
        assert_eq!(SortField::parse("size").unwrap(), SortField::Size);
        assert_eq!(SortField::parse("mimeType").unwrap(), SortField::MimeType);

        let err = SortField::parse("password; DROP TABLE media").unwrap_err();
        assert!(matches!(err, AppError::InvalidInput(_)));
    }

    #[test]
    fn sort_order_allow_list() {
        assert_eq!(SortOrder::parse("asc").unwrap(), SortOrder::Asc);
        assert_eq!(SortOrder::parse("desc").unwrap(), SortOrder::Desc);
        assert!(SortOrder::parse("ASC; --").is_err());
    }

    #[test]
    fn offset_is_page_minus_one_times_limit() {
        let mut filter = base_filter();
        assert_eq!(filter.offset(), 0);

        filter.page = 3;
        filter.limit = 25;
        assert_eq!(filter.offset(), 50);

        // Page 0 is treated as page 1
        filter.page = 0;
        assert_eq!(filter.offset(), 0);
    }

    #[test]
    fn unknown_kind_is_a_noop() {
        assert!(kind_condition("image").is_some());
        assert!(kind_condition("video").is_some());
        assert!(kind_condition("document").is_some());
        assert!(kind_condition("hologram").is_none());
    }

    #[test]
    fn document_kind_covers_word_and_plain_text() {
        let condition = kind_condition("document").unwrap();
        assert!(condition.contains("application/pdf"));
        assert!(condition.contains("msword"));
        assert!(condition.contains("text/plain"));
    }
}
