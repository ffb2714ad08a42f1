//! Configuration module
//!
//! Env-based configuration for the API server: database, storage root,
//! upload limits, ClamAV and session settings.

use std::env;

const DEFAULT_SERVER_PORT: u16 = 3000;
const DEFAULT_DB_MAX_CONNECTIONS: u32 = 20;
const DEFAULT_DB_TIMEOUT_SECS: u64 = 30;
const DEFAULT_IMAGE_MAX_BYTES: usize = 10 * 1024 * 1024;
const DEFAULT_VIDEO_MAX_BYTES: usize = 200 * 1024 * 1024;
const DEFAULT_DOCUMENT_MAX_BYTES: usize = 25 * 1024 * 1024;
const DEFAULT_CLAMAV_PORT: u16 = 3310;
const DEFAULT_CLAMAV_TIMEOUT_SECS: u64 = 30;

/// Application configuration, loaded once at startup.
#[derive(Clone, Debug)]
pub struct Config {
    pub server_port: u16,
    pub environment: String,
    pub cors_origins: Vec<String>,
    pub database_url: String,
    pub db_max_connections: u32,
    pub db_timeout_seconds: u64,
    /// HS256 secret for verifying admin session tokens.
    pub session_secret: String,
    /// Root directory for uploaded files (e.g., "/var/lib/kentcms/media").
    pub media_root: String,
    /// Base URL under which uploaded files are served (e.g., "/uploads/media").
    pub media_base_url: String,
    pub image_max_bytes: usize,
    pub video_max_bytes: usize,
    pub document_max_bytes: usize,
    pub clamav_enabled: bool,
    pub clamav_host: String,
    pub clamav_port: u16,
    pub clamav_timeout_secs: u64,
}

fn env_or<T: std::str::FromStr>(key: &str, default: T) -> Result<T, anyhow::Error> {
    match env::var(key) {
        Ok(v) => v
            .parse()
            .map_err(|_| anyhow::anyhow!("Invalid value for {}: {}", key, v)),
        Err(_) => Ok(default),
    }
}

fn env_required(key: &str) -> Result<String, anyhow::Error> {
    env::var(key).map_err(|_| anyhow::anyhow!("Missing required environment variable {}", key))
}

fn env_bool(key: &str, default: bool) -> bool {
    env::var(key)
        .map(|v| matches!(v.to_lowercase().as_str(), "1" | "true" | "yes"))
        .unwrap_or(default)
}

impl Config {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        // Best-effort .env loading; absence is fine in production.
        let _ = dotenvy::dotenv();

        let config = Config {
            server_port: env_or("SERVER_PORT", DEFAULT_SERVER_PORT)?,
            environment: env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string()),
            cors_origins: env::var("CORS_ORIGINS")
                .map(|v| {
                    v.split(',')
                        .map(|s| s.trim().to_string())
                        .filter(|s| !s.is_empty())
                        .collect()
                })
                .unwrap_or_default(),
            database_url: env_required("DATABASE_URL")?,
            db_max_connections: env_or("DB_MAX_CONNECTIONS", DEFAULT_DB_MAX_CONNECTIONS)?,
            db_timeout_seconds: env_or("DB_TIMEOUT_SECONDS", DEFAULT_DB_TIMEOUT_SECS)?,
            session_secret: env_required("SESSION_SECRET")?,
            media_root: env::var("MEDIA_ROOT").unwrap_or_else(|_| "./uploads".to_string()),
            media_base_url: env::var("MEDIA_BASE_URL")
                .unwrap_or_else(|_| "/uploads".to_string()),
            image_max_bytes: env_or("IMAGE_MAX_BYTES", DEFAULT_IMAGE_MAX_BYTES)?,
            video_max_bytes: env_or("VIDEO_MAX_BYTES", DEFAULT_VIDEO_MAX_BYTES)?,
            document_max_bytes: env_or("DOCUMENT_MAX_BYTES", DEFAULT_DOCUMENT_MAX_BYTES)?,
            clamav_enabled: env_bool("CLAMAV_ENABLED", false),
            clamav_host: env::var("CLAMAV_HOST").unwrap_or_else(|_| "localhost".to_string()),
            clamav_port: env_or("CLAMAV_PORT", DEFAULT_CLAMAV_PORT)?,
            clamav_timeout_secs: env_or("CLAMAV_TIMEOUT_SECS", DEFAULT_CLAMAV_TIMEOUT_SECS)?,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if self.session_secret.len() < 32 {
            anyhow::bail!("SESSION_SECRET must be at least 32 characters");
        }
        if self.image_max_bytes == 0 || self.video_max_bytes == 0 || self.document_max_bytes == 0 {
            anyhow::bail!("Upload size limits must be non-zero");
        }
        if self.image_max_bytes > self.video_max_bytes {
            anyhow::bail!("IMAGE_MAX_BYTES must not exceed VIDEO_MAX_BYTES");
        }
        Ok(())
    }

    pub fn is_production(&self) -> bool {
        let env = self.environment.to_lowercase();
        env == "production" || env == "prod"
    }
}
