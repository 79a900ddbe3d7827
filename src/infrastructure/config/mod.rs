//! Application configuration.

/// Configuration model.
pub mod app_config;
/// CLI arguments.
pub mod args;
/// Config file storage.
pub mod storage;

pub use app_config::{AppConfig, ApiConfig, ClientConfig, DEFAULT_API_BASE_URL, LogLevel};
pub use args::CliArgs;
pub use storage::{ConfigError, StorageManager};
