//! Infrastructure layer with external service adapters.

/// Application configuration.
pub mod config;
/// Discord REST client and gateway frames.
pub mod discord;

pub use config::{AppConfig, CliArgs, LogLevel, StorageManager};
pub use discord::{DiscordRestClient, FrameError, GatewayFrame};
