use kentcms_core::models::ImageProcessingSummary;

/// An upload as received from the request, before any processing.
#[derive(Debug, Clone)]
pub struct UploadFile {
    pub data: Vec<u8>,
    pub original_filename: String,
    pub content_type: String,
}

/// Result of a completed pipeline run. The file is stored, verified, and
/// scanned; `image_processing` is present only when variants were generated.
#[derive(Debug, Clone)]
pub struct StoredUpload {
    /// Generated unique filename, without the folder.
    pub filename: String,
    /// Full storage key (`folder/filename`).
    pub key: String,
    /// Public URL returned by the storage backend.
    pub url: String,
    pub content_type: String,
    pub file_size: i64,
    pub original_name: String,
    pub image_processing: Option<ImageProcessingSummary>,
}
