//! Media domain models and response DTOs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::category::CategoryResponse;

/// Synthetic MIME type recorded for externally hosted embed links.
pub const EMBED_MIME_TYPE: &str = "video/embed";

/// Broad media classification stored alongside each record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "media_type", rename_all = "lowercase")]
#[serde(rename_all = "UPPERCASE")]
pub enum MediaType {
    Image,
    Video,
    Pdf,
    Word,
    Embed,
}

impl MediaType {
    /// Classify an uploaded file by its MIME type. Returns `None` for MIME
    /// types outside the upload allow-list.
    pub fn from_mime(mime_type: &str) -> Option<Self> {
        let mime = mime_type.to_lowercase();
        if mime.starts_with("image/") {
            Some(MediaType::Image)
        } else if mime.starts_with("video/") {
            Some(MediaType::Video)
        } else if mime == "application/pdf" {
            Some(MediaType::Pdf)
        } else if mime == "application/msword"
            || mime == "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
            || mime == "text/plain"
        {
            Some(MediaType::Word)
        } else {
            None
        }
    }
}

/// A persisted media record: an uploaded file or an embed link.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct MediaRecord {
    pub id: Uuid,
    /// Stored (generated) filename.
    pub filename: String,
    /// User-supplied filename, sanitized.
    pub original_name: String,
    pub mime_type: String,
    pub file_size: i64,
    /// Storage key relative to the media root. Empty for embeds.
    pub path: String,
    /// Public URL. Equals `embed_url` for embeds.
    pub url: String,
    pub alt: String,
    pub caption: String,
    /// Null only when a custom folder was used instead of a category,
    /// or when the referenced category was later deleted.
    pub category_id: Option<Uuid>,
    pub media_type: MediaType,
    pub embed_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl MediaRecord {
    /// Build an embed record. Embeds carry no file: size 0, empty path,
    /// URL equal to the embed link, and a synthetic MIME type.
    pub fn new_embed(embed_url: String, alt: String, caption: String) -> Self {
        let now = Utc::now();
        MediaRecord {
            id: Uuid::new_v4(),
            filename: String::new(),
            original_name: String::new(),
            mime_type: EMBED_MIME_TYPE.to_string(),
            file_size: 0,
            path: String::new(),
            url: embed_url.clone(),
            alt,
            caption,
            category_id: None,
            media_type: MediaType::Embed,
            embed_url: Some(embed_url),
            created_at: now,
            updated_at: now,
        }
    }
}

/// Media record as returned by the API.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MediaResponse {
    pub id: Uuid,
    pub filename: String,
    pub original_name: String,
    pub mime_type: String,
    pub size: i64,
    pub path: String,
    pub url: String,
    pub alt: String,
    pub caption: String,
    pub category_id: Option<Uuid>,
    #[serde(rename = "type")]
    pub media_type: MediaType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub embed_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<CategoryResponse>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl MediaResponse {
    pub fn from_record(record: MediaRecord, category: Option<CategoryResponse>) -> Self {
        MediaResponse {
            id: record.id,
            filename: record.filename,
            original_name: record.original_name,
            mime_type: record.mime_type,
            size: record.file_size,
            path: record.path,
            url: record.url,
            alt: record.alt,
            caption: record.caption,
            category_id: record.category_id,
            media_type: record.media_type,
            embed_url: record.embed_url,
            category,
            created_at: record.created_at,
            updated_at: record.updated_at,
        }
    }
}

/// Offset pagination envelope for list responses.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub page: i64,
    pub limit: i64,
    pub total: i64,
    pub total_pages: i64,
    pub has_next_page: bool,
    pub has_prev_page: bool,
}

impl Pagination {
    pub fn new(page: i64, limit: i64, total: i64) -> Self {
        let total_pages = if total == 0 || limit == 0 {
            0
        } else {
            (total + limit - 1) / limit
        };
        Pagination {
            page,
            limit,
            total,
            total_pages,
            has_next_page: page < total_pages,
            has_prev_page: page > 1 && total_pages > 0,
        }
    }
}

/// Size of the original upload, for the image-processing summary.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ImageOriginalInfo {
    pub file_size: u64,
}

/// One derived rendition of an uploaded image.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ImageVariantInfo {
    pub label: String,
    pub width: u32,
    pub height: u32,
    pub file_size: u64,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ImageProcessingStats {
    /// 1 − totalProcessedSize / original.fileSize, both sides in bytes.
    pub compression_ratio: f64,
    pub total_processed_size: u64,
}

/// Summary of variant generation attached to successful image uploads.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ImageProcessingSummary {
    pub original: ImageOriginalInfo,
    pub variants: Vec<ImageVariantInfo>,
    pub metadata: ImageProcessingStats,
}

impl ImageProcessingSummary {
    pub fn new(original_size: u64, variants: Vec<ImageVariantInfo>) -> Self {
        let total_processed_size: u64 = variants.iter().map(|v| v.file_size).sum();
        let compression_ratio = if original_size == 0 {
            0.0
        } else {
            1.0 - (total_processed_size as f64 / original_size as f64)
        };
        ImageProcessingSummary {
            original: ImageOriginalInfo {
                file_size: original_size,
            },
            variants,
            metadata: ImageProcessingStats {
                compression_ratio,
                total_processed_size,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn embed_record_invariants() {
        let record = MediaRecord::new_embed(
            "https://video.example.com/watch?v=abc".to_string(),
            "Town hall".to_string(),
            String::new(),
        );
        assert_eq!(record.media_type, MediaType::Embed);
        assert_eq!(record.file_size, 0);
        assert_eq!(record.path, "");
        assert_eq!(record.mime_type, EMBED_MIME_TYPE);
        assert_eq!(record.url, record.embed_url.clone().unwrap());
        assert!(record.category_id.is_none());
    }

    #[test]
    fn mime_classification() {
        assert_eq!(MediaType::from_mime("image/jpeg"), Some(MediaType::Image));
        assert_eq!(MediaType::from_mime("IMAGE/PNG"), Some(MediaType::Image));
        assert_eq!(MediaType::from_mime("video/mp4"), Some(MediaType::Video));
        assert_eq!(
            MediaType::from_mime("application/pdf"),
            Some(MediaType::Pdf)
        );
        assert_eq!(
            MediaType::from_mime("application/msword"),
            Some(MediaType::Word)
        );
        assert_eq!(MediaType::from_mime("text/plain"), Some(MediaType::Word));
        assert_eq!(MediaType::from_mime("application/x-msdownload"), None);
    }

    #[test]
    fn pagination_empty_set() {
        let p = Pagination::new(1, 20, 0);
        assert_eq!(p.total, 0);
        assert_eq!(p.total_pages, 0);
        assert!(!p.has_next_page);
        assert!(!p.has_prev_page);
    }

    #[test]
    fn pagination_page_math() {
        let p = Pagination::new(2, 20, 45);
        assert_eq!(p.total_pages, 3);
        assert!(p.has_next_page);
        assert!(p.has_prev_page);

        let last = Pagination::new(3, 20, 45);
        assert!(!last.has_next_page);
        assert!(last.has_prev_page);
    }

    #[test]
    fn processing_summary_ratio_in_bytes() {
        let summary = ImageProcessingSummary::new(
            1000,
            vec![
                ImageVariantInfo {
                    label: "thumb".to_string(),
                    width: 150,
                    height: 100,
                    file_size: 100,
                },
                ImageVariantInfo {
                    label: "medium".to_string(),
                    width: 600,
                    height: 400,
                    file_size: 400,
                },
            ],
        );
        assert_eq!(summary.metadata.total_processed_size, 500);
        assert!((summary.metadata.compression_ratio - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn media_type_serializes_uppercase() {
        assert_eq!(
            serde_json::to_string(&MediaType::Embed).unwrap(),
            "\"EMBED\""
        );
        assert_eq!(
            serde_json::to_string(&MediaType::Image).unwrap(),
            "\"IMAGE\""
        );
    }
}
