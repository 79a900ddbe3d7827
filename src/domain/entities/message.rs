use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{ChannelId, GuildId, Patchable, Snowflake, UserId};
use crate::domain::errors::PayloadError;
use crate::domain::serde_utils::lenient_snowflake;

/// Unique identifier for a Discord message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MessageId(#[serde(with = "crate::domain::serde_utils::snowflake")] pub u64);

impl MessageId {
    /// Returns the underlying u64 value.
    #[must_use]
    pub const fn as_u64(self) -> u64 {
        self.0
    }

    /// When the message was sent, derived from the id.
    #[must_use]
    pub fn created_at(self) -> DateTime<Utc> {
        Snowflake(self.0).created_at()
    }
}

impl std::fmt::Display for MessageId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for MessageId {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

impl From<Snowflake> for MessageId {
    fn from(value: Snowflake) -> Self {
        Self(value.0)
    }
}

impl From<MessageId> for Snowflake {
    fn from(value: MessageId) -> Self {
        Self(value.0)
    }
}

/// The two fields needed to route a message payload.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct MessageRef {
    /// Message id.
    pub id: MessageId,
    /// Channel the message was posted in.
    pub channel_id: ChannelId,
}

#[derive(Debug, Deserialize)]
struct MessagePayload {
    id: MessageId,
    channel_id: ChannelId,
    #[serde(
        default,
        deserialize_with = "crate::domain::serde_utils::lenient_snowflake::deserialize"
    )]
    guild_id: Option<u64>,
    #[serde(default, deserialize_with = "crate::domain::serde_utils::lenient_string::deserialize")]
    content: Option<String>,
    #[serde(default)]
    author: Option<Value>,
}

/// A cached Discord message.
///
/// Keeps the payload it was built from so consumers can read fields this
/// type does not model.
#[derive(Debug, Clone, PartialEq)]
pub struct Message {
    id: MessageId,
    channel_id: ChannelId,
    guild_id: Option<GuildId>,
    author_id: Option<UserId>,
    content: Option<String>,
    raw: Value,
}

impl Message {
    /// Message id.
    #[must_use]
    pub const fn id(&self) -> MessageId {
        self.id
    }

    /// Channel the message was posted in.
    #[must_use]
    pub const fn channel_id(&self) -> ChannelId {
        self.channel_id
    }

    /// Guild of the channel, when the payload named it.
    #[must_use]
    pub const fn guild_id(&self) -> Option<GuildId> {
        self.guild_id
    }

    /// Author, when the payload carried a usable one.
    #[must_use]
    pub const fn author_id(&self) -> Option<UserId> {
        self.author_id
    }

    /// Text content, absent when the gateway omitted it (e.g. without the
    /// message content intent).
    #[must_use]
    pub fn content(&self) -> Option<&str> {
        self.content.as_deref()
    }

    /// Creation time derived from the id.
    #[must_use]
    pub fn created_at(&self) -> DateTime<Utc> {
        self.id.created_at()
    }

    /// Payload snapshot taken at creation.
    #[must_use]
    pub const fn raw(&self) -> &Value {
        &self.raw
    }
}

impl Patchable for Message {
    fn from_payload(data: &Value) -> Result<Self, PayloadError> {
        let payload = MessagePayload::deserialize(data)?;
        Ok(Self {
            id: payload.id,
            channel_id: payload.channel_id,
            guild_id: payload.guild_id.map(GuildId),
            author_id: payload
                .author
                .as_ref()
                .and_then(|author| author.get("id"))
                .and_then(lenient_snowflake::from_value)
                .map(UserId),
            content: payload.content,
            raw: data.clone(),
        })
    }
}
