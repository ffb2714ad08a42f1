//! The upload pipeline.
//!
//! Stages run in a fixed order: pre-save validation, unique naming, storage,
//! post-save content verification, threat scan, image variants. A rejection
//! after the save stage deletes the stored file before the error surfaces;
//! variant generation is the only non-fatal stage.

use crate::scanner::{ScanOutcome, ThreatScanner};
use crate::signature::verify_content;
use crate::upload::types::{StoredUpload, UploadFile};
use crate::validator::UploadPolicy;
use crate::variants::process_image;
use kentcms_core::AppError;
use kentcms_storage::{generate_unique_filename, Storage, StorageTarget};
use std::sync::Arc;

/// Best-effort removal of a file that failed a post-save check. Never masks
/// the rejection that triggered it.
async fn cleanup_rejected(storage: &Arc<dyn Storage>, key: &str) {
    if let Err(e) = storage.delete(key).await {
        tracing::error!(
            key = %key,
            error = %e,
            "Failed to delete rejected upload, file may be orphaned"
        );
    }
}

/// Run an upload through the full pipeline and return the stored result.
///
/// `scanner` is `None` only when threat scanning is disabled by
/// configuration; when a scanner is present, anything other than a clean
/// verdict rejects the upload and deletes the file.
pub async fn upload_pipeline(
    file: UploadFile,
    target: &StorageTarget,
    policy: &UploadPolicy,
    storage: Arc<dyn Storage>,
    scanner: Option<Arc<dyn ThreatScanner>>,
) -> Result<StoredUpload, AppError> {
    let report = policy.pre_validate(
        &file.original_filename,
        &file.content_type,
        file.data.len(),
    );
    if !report.is_valid() {
        tracing::info!(
            filename = %file.original_filename,
            errors = ?report.errors(),
            "Upload rejected by pre-save validation"
        );
        return Err(AppError::Validation(report.into_errors()));
    }

    let filename = generate_unique_filename(&file.original_filename);
    let key = target.key(&filename);
    let file_size = file.data.len() as i64;

    let url = storage
        .save(&key, file.data)
        .await
        .map_err(|e| AppError::Storage(e.to_string()))?;

    // Re-read what was actually written: verification and scanning run over
    // the file as stored, not over the request buffer.
    let stored = match storage.read(&key).await {
        Ok(data) => data,
        Err(e) => {
            cleanup_rejected(&storage, &key).await;
            return Err(AppError::Storage(format!(
                "Failed to read back stored file: {}",
                e
            )));
        }
    };

    if let Err(reason) = verify_content(&stored, &filename) {
        tracing::warn!(
            key = %key,
            reason = %reason,
            "Stored file failed content verification, deleting"
        );
        cleanup_rejected(&storage, &key).await;
        return Err(AppError::Validation(vec![reason]));
    }

    if let Some(scanner) = &scanner {
        match scanner.scan(&stored).await {
            ScanOutcome::Clean => {}
            ScanOutcome::Infected(threat) => {
                tracing::warn!(
                    key = %key,
                    threat = %threat,
                    original_name = %file.original_filename,
                    "Threat detected in upload, deleting"
                );
                cleanup_rejected(&storage, &key).await;
                return Err(AppError::SecurityThreat { threat });
            }
            ScanOutcome::Unavailable(reason) => {
                // An unscanned file is never accepted
                cleanup_rejected(&storage, &key).await;
                return Err(AppError::ScanUnavailable(reason));
            }
        }
    }

    let image_processing = if file.content_type.starts_with("image/") && !target.used_custom_folder
    {
        match process_image(storage.clone(), target, &filename, &stored).await {
            Ok(summary) => Some(summary),
            Err(e) => {
                tracing::warn!(
                    key = %key,
                    error = %e,
                    "Image variant generation failed, keeping original only"
                );
                None
            }
        }
    } else {
        None
    };

    Ok(StoredUpload {
        filename,
        key,
        url,
        content_type: file.content_type,
        file_size,
        original_name: file.original_filename,
        image_processing,
    })
}
