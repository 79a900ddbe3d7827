use serde::{Deserialize, Serialize};

use crate::domain::entities::ChannelId;

/// Discord API error response structure.
#[derive(Debug, Deserialize)]
pub struct ErrorResponse {
    /// Error message from Discord.
    pub message: String,
    /// Discord's JSON error code, when present.
    #[serde(default)]
    pub code: Option<u64>,
    /// Seconds to wait on a 429.
    #[serde(default)]
    pub retry_after: Option<f64>,
}

/// Body of a gift code redemption.
#[derive(Debug, Serialize)]
pub struct RedeemGiftRequest {
    /// Channel the code was seen in.
    pub channel_id: ChannelId,
}
