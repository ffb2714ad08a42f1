//! Storage abstraction for uploaded files.

use async_trait::async_trait;

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("File not found: {0}")]
    NotFound(String),

    #[error("Save failed: {0}")]
    SaveFailed(String),

    #[error("Read failed: {0}")]
    ReadFailed(String),

    #[error("Delete failed: {0}")]
    DeleteFailed(String),

    #[error("Invalid storage key: {0}")]
    InvalidKey(String),

    #[error("Storage configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

pub type StorageResult<T> = Result<T, StorageError>;

/// Filesystem-backed (or compatible) store keyed by folder-relative paths.
///
/// Keys look like `haberler/duyuru-1718000000000-a1b2c3.jpg`; the backend maps
/// them to a physical location and a public URL.
#[async_trait]
pub trait Storage: Send + Sync {
    /// Write `data` under `key`. Returns the public URL.
    async fn save(&self, key: &str, data: Vec<u8>) -> StorageResult<String>;

    /// Read the full content stored under `key`.
    async fn read(&self, key: &str) -> StorageResult<Vec<u8>>;

    /// Remove the file under `key`. Removing a missing file is not an error.
    async fn delete(&self, key: &str) -> StorageResult<()>;

    /// Whether a file exists under `key`.
    async fn exists(&self, key: &str) -> StorageResult<bool>;

    /// Public URL for `key` without touching the filesystem.
    fn public_url(&self, key: &str) -> String;
}
