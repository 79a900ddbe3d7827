use super::app_config::LogLevel;
use clap::Parser;
use std::path::PathBuf;

/// Command-line arguments.
#[derive(Debug, Parser)]
#[command(
    name = "oxicord-reconcile",
    version,
    about = "Replays Discord gateway frames through the client cache",
    long_about = None
)]
pub struct CliArgs {
    /// Configuration file path.
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Log file path.
    #[arg(long, value_name = "PATH")]
    pub log_path: Option<PathBuf>,

    /// Log verbosity level.
    #[arg(long, value_enum)]
    pub log_level: Option<LogLevel>,

    /// Discord token, used only for REST side effects.
    #[arg(long, env = "DISCORD_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// File of newline-delimited gateway frames. Reads stdin when omitted.
    #[arg(short, long, value_name = "PATH")]
    pub input: Option<PathBuf>,

    /// Redeem gift codes found in incoming messages.
    #[arg(long)]
    pub auto_redeem_nitro: Option<bool>,

    /// Messages kept per channel (0 keeps everything).
    #[arg(long, value_name = "COUNT")]
    pub message_cache_size: Option<usize>,

    /// Base URL for Discord REST calls.
    #[arg(long, value_name = "URL")]
    pub api_base_url: Option<String>,
}
