pub mod config;
pub mod error;
pub mod models;
pub mod reporting;

pub use config::Config;
pub use error::{AppError, ErrorMetadata, LogLevel};
