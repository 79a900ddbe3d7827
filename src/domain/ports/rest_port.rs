//! REST port for the calls this layer delegates to Discord.

use async_trait::async_trait;

use crate::domain::entities::ChannelId;
use crate::domain::errors::ApiError;

/// Port for the Discord REST calls made by actions and read states.
///
/// Implementations own timeouts; callers never retry.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RestPort: Send + Sync {
    /// Deletes the current user's read state for a channel
    /// (`DELETE /channels/{id}/messages/ack`).
    async fn delete_channel_ack(&self, channel_id: ChannelId) -> Result<(), ApiError>;

    /// Redeems a gift code, reporting the channel it was found in.
    async fn redeem_gift(&self, code: &str, channel_id: ChannelId) -> Result<(), ApiError>;
}
