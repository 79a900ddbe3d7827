//! Application configuration.

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use super::args::CliArgs;
use crate::application::ClientOptions;
use crate::domain::entities::DEFAULT_MESSAGE_CACHE_SIZE;

pub(super) const APP_NAME: &str = "oxicord-reconcile";
pub(super) const APP_QUALIFIER: &str = "com";
pub(super) const APP_ORGANIZATION: &str = "linuxmobile";

/// Discord REST base used when none is configured.
pub const DEFAULT_API_BASE_URL: &str = "https://discord.com/api/v9";

/// Log level configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Trace level.
    Trace,
    /// Debug level.
    Debug,
    /// Info level.
    #[default]
    Info,
    /// Warning level.
    Warn,
    /// Error level.
    Error,
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Trace => write!(f, "trace"),
            Self::Debug => write!(f, "debug"),
            Self::Info => write!(f, "info"),
            Self::Warn => write!(f, "warn"),
            Self::Error => write!(f, "error"),
        }
    }
}

/// Application configuration, read from TOML and overridden by CLI flags.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Configuration file path.
    #[serde(skip)]
    pub config: Option<PathBuf>,

    /// Log file path. Logs go to stderr only when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_path: Option<PathBuf>,

    /// Log verbosity level.
    #[serde(default)]
    pub log_level: LogLevel,

    /// Client behavior.
    #[serde(default)]
    pub client: ClientConfig,

    /// REST API settings.
    #[serde(default)]
    pub api: ApiConfig,
}

/// Client behavior configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Redeem gift codes found in incoming messages.
    #[serde(default)]
    pub auto_redeem_nitro: bool,

    /// Messages kept per channel; zero keeps everything.
    #[serde(default = "default_message_cache_size")]
    pub message_cache_size: usize,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            auto_redeem_nitro: false,
            message_cache_size: DEFAULT_MESSAGE_CACHE_SIZE,
        }
    }
}

/// REST API configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Base URL for REST calls, without a trailing slash.
    #[serde(default = "default_api_base_url")]
    pub base_url: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_api_base_url(),
        }
    }
}

const fn default_message_cache_size() -> usize {
    DEFAULT_MESSAGE_CACHE_SIZE
}

fn default_api_base_url() -> String {
    DEFAULT_API_BASE_URL.to_string()
}

impl AppConfig {
    /// Merges CLI arguments into the configuration.
    pub fn merge_with_args(&mut self, args: &CliArgs) {
        if let Some(config_path) = &args.config {
            self.config = Some(config_path.clone());
        }
        if let Some(log_path) = &args.log_path {
            self.log_path = Some(log_path.clone());
        }
        if let Some(log_level) = args.log_level {
            self.log_level = log_level;
        }
        if let Some(auto_redeem_nitro) = args.auto_redeem_nitro {
            self.client.auto_redeem_nitro = auto_redeem_nitro;
        }
        if let Some(message_cache_size) = args.message_cache_size {
            self.client.message_cache_size = message_cache_size;
        }
        if let Some(api_base_url) = &args.api_base_url {
            self.api.base_url.clone_from(api_base_url);
        }
    }

    /// Application-level projection of the client settings.
    #[must_use]
    pub const fn client_options(&self) -> ClientOptions {
        ClientOptions {
            auto_redeem_nitro: self.client.auto_redeem_nitro,
            message_cache_size: self.client.message_cache_size,
        }
    }

    /// Returns default config directory.
    #[must_use]
    pub fn default_config_dir() -> Option<PathBuf> {
        ProjectDirs::from(APP_QUALIFIER, APP_ORGANIZATION, APP_NAME)
            .map(|dirs| dirs.config_dir().to_path_buf())
    }

    /// Returns default config file path.
    #[must_use]
    pub fn default_config_path() -> Option<PathBuf> {
        Self::default_config_dir().map(|dir| dir.join("config.toml"))
    }

    /// Returns effective config path.
    #[must_use]
    pub fn effective_config_path(&self) -> Option<PathBuf> {
        self.config.clone().or_else(Self::default_config_path)
    }

    /// Returns the log file path, if file logging is enabled.
    #[must_use]
    pub fn effective_log_path(&self) -> Option<PathBuf> {
        self.log_path.clone()
    }
}
