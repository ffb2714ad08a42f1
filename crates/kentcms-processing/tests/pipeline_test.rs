//! End-to-end upload pipeline tests over real local storage.

use async_trait::async_trait;
use image::{ImageFormat, Rgba, RgbaImage};
use kentcms_core::AppError;
use kentcms_processing::{
    upload_pipeline, ScanOutcome, ThreatScanner, UploadFile, UploadPolicy,
};
use kentcms_storage::{LocalStorage, Storage, StorageTarget};
use std::io::Cursor;
use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;

struct CleanScanner;
struct InfectedScanner;
struct DownScanner;

#[async_trait]
impl ThreatScanner for CleanScanner {
    async fn scan(&self, _data: &[u8]) -> ScanOutcome {
        ScanOutcome::Clean
    }
}

#[async_trait]
impl ThreatScanner for InfectedScanner {
    async fn scan(&self, _data: &[u8]) -> ScanOutcome {
        ScanOutcome::Infected("Eicar-Test-Signature".to_string())
    }
}

#[async_trait]
impl ThreatScanner for DownScanner {
    async fn scan(&self, _data: &[u8]) -> ScanOutcome {
        ScanOutcome::Unavailable("connection refused".to_string())
    }
}

fn policy() -> UploadPolicy {
    UploadPolicy::new(10 * 1024 * 1024, 200 * 1024 * 1024, 25 * 1024 * 1024)
}

fn category_target() -> StorageTarget {
    StorageTarget {
        folder: "haberler".to_string(),
        used_custom_folder: false,
    }
}

fn custom_target() -> StorageTarget {
    StorageTarget {
        folder: "hafriyat".to_string(),
        used_custom_folder: true,
    }
}

async fn storage(dir: &TempDir) -> Arc<dyn Storage> {
    Arc::new(
        LocalStorage::new(dir.path(), "/uploads/media".to_string())
            .await
            .unwrap(),
    )
}

fn test_png(width: u32, height: u32) -> Vec<u8> {
    let img = RgbaImage::from_pixel(width, height, Rgba([10, 120, 30, 255]));
    let mut buffer = Vec::new();
    let mut cursor = Cursor::new(&mut buffer);
    img.write_to(&mut cursor, ImageFormat::Png).unwrap();
    buffer
}

fn count_files(dir: &Path) -> usize {
    let mut count = 0;
    if let Ok(entries) = std::fs::read_dir(dir) {
        for entry in entries.flatten() {
            let path = entry.path();
            if path.is_dir() {
                count += count_files(&path);
            } else {
                count += 1;
            }
        }
    }
    count
}

#[tokio::test]
async fn disallowed_type_is_rejected_before_any_write() {
    let dir = TempDir::new().unwrap();
    let storage = storage(&dir).await;

    let file = UploadFile {
        data: b"MZ\x90\x00fake exe".to_vec(),
        original_filename: "tool.exe".to_string(),
        content_type: "application/x-msdownload".to_string(),
    };

    let result = upload_pipeline(file, &category_target(), &policy(), storage, None).await;

    match result {
        Err(AppError::Validation(errors)) => {
            assert!(errors.iter().any(|e| e.contains("not allowed")));
        }
        other => panic!("expected validation error, got {:?}", other.map(|u| u.key)),
    }
    assert_eq!(count_files(dir.path()), 0);
}

#[tokio::test]
async fn spoofed_content_is_deleted_after_save() {
    let dir = TempDir::new().unwrap();
    let storage = storage(&dir).await;

    // Declared metadata is consistent, so pre-save validation passes; the
    // bytes are an executable and fail post-save verification.
    let file = UploadFile {
        data: b"MZ\x90\x00\x03\x00\x00\x00payload".to_vec(),
        original_filename: "photo.jpg".to_string(),
        content_type: "image/jpeg".to_string(),
    };

    let result = upload_pipeline(file, &category_target(), &policy(), storage, None).await;

    match result {
        Err(AppError::Validation(errors)) => {
            assert_eq!(errors.len(), 1);
            assert!(errors[0].contains("application/x-msdownload"), "{:?}", errors);
        }
        other => panic!("expected validation error, got {:?}", other.map(|u| u.key)),
    }
    assert_eq!(count_files(dir.path()), 0, "rejected file must be removed");
}

#[tokio::test]
async fn infected_file_is_deleted_and_named() {
    let dir = TempDir::new().unwrap();
    let storage = storage(&dir).await;

    let file = UploadFile {
        data: test_png(100, 100),
        original_filename: "resim.png".to_string(),
        content_type: "image/png".to_string(),
    };

    let result = upload_pipeline(
        file,
        &category_target(),
        &policy(),
        storage,
        Some(Arc::new(InfectedScanner)),
    )
    .await;

    match result {
        Err(AppError::SecurityThreat { threat }) => {
            assert_eq!(threat, "Eicar-Test-Signature");
        }
        other => panic!("expected security threat, got {:?}", other.map(|u| u.key)),
    }
    assert_eq!(count_files(dir.path()), 0);
}

#[tokio::test]
async fn scanner_outage_rejects_instead_of_passing() {
    let dir = TempDir::new().unwrap();
    let storage = storage(&dir).await;

    let file = UploadFile {
        data: test_png(100, 100),
        original_filename: "resim.png".to_string(),
        content_type: "image/png".to_string(),
    };

    let result = upload_pipeline(
        file,
        &category_target(),
        &policy(),
        storage,
        Some(Arc::new(DownScanner)),
    )
    .await;

    assert!(matches!(result, Err(AppError::ScanUnavailable(_))));
    assert_eq!(count_files(dir.path()), 0, "unscanned file must not remain");
}

#[tokio::test]
async fn category_image_upload_stores_variants() {
    let dir = TempDir::new().unwrap();
    let storage = storage(&dir).await;

    let data = test_png(800, 600);
    let file = UploadFile {
        data: data.clone(),
        original_filename: "park açılışı.png".to_string(),
        content_type: "image/png".to_string(),
    };

    let stored = upload_pipeline(
        file,
        &category_target(),
        &policy(),
        storage.clone(),
        Some(Arc::new(CleanScanner)),
    )
    .await
    .unwrap();

    assert!(stored.key.starts_with("haberler/"));
    assert!(stored.url.starts_with("/uploads/media/haberler/"));
    assert_eq!(stored.file_size, data.len() as i64);
    assert_eq!(stored.original_name, "park açılışı.png");
    assert!(storage.exists(&stored.key).await.unwrap());

    // 800px wide: thumb and medium are generated, large is skipped
    let summary = stored.image_processing.expect("summary expected");
    assert_eq!(summary.variants.len(), 2);
    assert_eq!(count_files(dir.path()), 3);
}

#[tokio::test]
async fn custom_folder_upload_skips_variants() {
    let dir = TempDir::new().unwrap();
    let storage = storage(&dir).await;

    let file = UploadFile {
        data: test_png(800, 600),
        original_filename: "saha.png".to_string(),
        content_type: "image/png".to_string(),
    };

    let stored = upload_pipeline(
        file,
        &custom_target(),
        &policy(),
        storage,
        Some(Arc::new(CleanScanner)),
    )
    .await
    .unwrap();

    assert!(stored.image_processing.is_none());
    assert!(stored.key.starts_with("hafriyat/"));
    assert_eq!(count_files(dir.path()), 1);
}

#[tokio::test]
async fn non_image_upload_has_no_processing_summary() {
    let dir = TempDir::new().unwrap();
    let storage = storage(&dir).await;

    let file = UploadFile {
        data: b"%PDF-1.7\nmeclis karari".to_vec(),
        original_filename: "karar.pdf".to_string(),
        content_type: "application/pdf".to_string(),
    };

    let stored = upload_pipeline(
        file,
        &category_target(),
        &policy(),
        storage,
        Some(Arc::new(CleanScanner)),
    )
    .await
    .unwrap();

    assert!(stored.image_processing.is_none());
    assert_eq!(count_files(dir.path()), 1);
}

#[tokio::test]
async fn concurrent_uploads_with_same_name_get_distinct_files() {
    let dir = TempDir::new().unwrap();
    let storage = storage(&dir).await;

    let make_file = || UploadFile {
        data: b"duyuru metni".to_vec(),
        original_filename: "duyuru.txt".to_string(),
        content_type: "text/plain".to_string(),
    };

    let target = category_target();
    let policy = policy();
    let (a, b) = tokio::join!(
        upload_pipeline(make_file(), &target, &policy, storage.clone(), None),
        upload_pipeline(make_file(), &target, &policy, storage.clone(), None),
    );

    let a = a.unwrap();
    let b = b.unwrap();
    assert_ne!(a.filename, b.filename);
    assert!(storage.exists(&a.key).await.unwrap());
    assert!(storage.exists(&b.key).await.unwrap());
    assert_eq!(count_files(dir.path()), 2);
}
