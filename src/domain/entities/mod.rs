//! Domain entity definitions.

mod channel;
mod guild;
mod message;
mod read_state;
mod snowflake;
mod token;
mod user;

use serde_json::Value;

use crate::domain::errors::PayloadError;

pub use channel::{Channel, ChannelId, ChannelKind, DEFAULT_MESSAGE_CACHE_SIZE, MessageCache};
pub use guild::{Guild, GuildId};
pub use message::{Message, MessageId, MessageRef};
pub use read_state::{
    ChannelReadState, ReadState, ReadStateFlags, ReadStatePayload, ReadStateResource,
    ReadStateType,
};
pub use snowflake::{DISCORD_EPOCH_MS, Snowflake};
pub use token::AuthToken;
pub use user::{User, UserId};

/// Entities built from, and refreshed by, whole gateway payloads.
///
/// There are no partial setters: an update re-applies a complete payload.
pub trait Patchable: Sized {
    /// Builds the entity from a raw payload.
    ///
    /// # Errors
    ///
    /// Returns `PayloadError` if required fields are missing or mistyped.
    fn from_payload(data: &Value) -> Result<Self, PayloadError>;

    /// Replaces the entity's state with what `data` describes.
    ///
    /// # Errors
    ///
    /// Returns `PayloadError` if the payload cannot be decoded; `self` is
    /// left unchanged in that case.
    fn apply_full(&mut self, data: &Value) -> Result<(), PayloadError> {
        *self = Self::from_payload(data)?;
        Ok(())
    }
}
