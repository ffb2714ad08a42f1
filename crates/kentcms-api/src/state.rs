//! Application state shared across handlers.

use kentcms_core::Config;
use kentcms_db::{CategoryRepository, MediaRepository};
use kentcms_processing::{ThreatScanner, UploadPolicy};
use kentcms_storage::{Storage, StorageResolver};
use sqlx::PgPool;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub pool: PgPool,
    pub media_repository: MediaRepository,
    pub category_repository: CategoryRepository,
    pub storage: Arc<dyn Storage>,
    pub resolver: StorageResolver,
    pub policy: UploadPolicy,
    /// None when threat scanning is disabled by configuration.
    pub scanner: Option<Arc<dyn ThreatScanner>>,
}

fn _assert_app_state_send_sync() {
    fn assert_send<T: Send>() {}
    fn assert_sync<T: Sync>() {}
    assert_send::<AppState>();
    assert_sync::<AppState>();
}
