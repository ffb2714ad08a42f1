//! Application setup and initialization.

pub mod database;
pub mod routes;
pub mod server;

use crate::state::AppState;
use anyhow::{Context, Result};
use kentcms_core::Config;
use kentcms_db::{CategoryRepository, MediaRepository};
use kentcms_processing::{ClamAvScanner, ThreatScanner, UploadPolicy};
use kentcms_storage::{LocalStorage, Storage, StorageResolver};
use std::sync::Arc;

/// Initialize the entire application: database, storage, scanner, routes.
pub async fn initialize_app(config: Config) -> Result<(Arc<AppState>, axum::Router)> {
    config
        .validate()
        .context("Configuration validation failed")?;

    let pool = database::setup_database(&config).await?;

    let storage: Arc<dyn Storage> = Arc::new(
        LocalStorage::new(config.media_root.clone(), config.media_base_url.clone())
            .await
            .context("Failed to initialize media storage")?,
    );
    tracing::info!(
        media_root = %config.media_root,
        media_base_url = %config.media_base_url,
        "Media storage initialized"
    );

    let scanner: Option<Arc<dyn ThreatScanner>> = if config.clamav_enabled {
        tracing::info!(
            host = %config.clamav_host,
            port = config.clamav_port,
            "Threat scanning enabled"
        );
        Some(Arc::new(ClamAvScanner::new(
            config.clamav_host.clone(),
            config.clamav_port,
            config.clamav_timeout_secs,
        )))
    } else {
        tracing::warn!("Threat scanning disabled; uploads will not be scanned");
        None
    };

    let state = Arc::new(AppState {
        policy: UploadPolicy::new(
            config.image_max_bytes,
            config.video_max_bytes,
            config.document_max_bytes,
        ),
        media_repository: MediaRepository::new(pool.clone()),
        category_repository: CategoryRepository::new(pool.clone()),
        resolver: StorageResolver::new(),
        storage,
        scanner,
        pool,
        config,
    });

    let router = routes::setup_routes(&state.config, state.clone())?;

    Ok((state, router))
}
