//! Discord channel entity and its message cache.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{GuildId, Message, MessageId, Patchable, Snowflake};
use crate::domain::cache::EntityCache;
use crate::domain::errors::PayloadError;

/// Default number of messages kept per channel.
pub const DEFAULT_MESSAGE_CACHE_SIZE: usize = 200;

/// Unique identifier for a Discord channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChannelId(#[serde(with = "crate::domain::serde_utils::snowflake")] pub u64);

impl ChannelId {
    /// Returns the underlying u64 value.
    #[must_use]
    pub const fn as_u64(self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for ChannelId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for ChannelId {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

impl From<Snowflake> for ChannelId {
    fn from(value: Snowflake) -> Self {
        Self(value.0)
    }
}

impl From<ChannelId> for Snowflake {
    fn from(value: ChannelId) -> Self {
        Self(value.0)
    }
}

/// Discord channel type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[repr(u8)]
pub enum ChannelKind {
    /// Text channel.
    #[default]
    Text = 0,
    /// Direct message channel.
    Dm = 1,
    /// Voice channel.
    Voice = 2,
    /// Group direct message channel.
    GroupDm = 3,
    /// Category channel.
    Category = 4,
    /// Announcement channel.
    Announcement = 5,
    /// Announcement thread channel.
    AnnouncementThread = 10,
    /// Public thread channel.
    PublicThread = 11,
    /// Private thread channel.
    PrivateThread = 12,
    /// Stage voice channel.
    StageVoice = 13,
    /// Directory channel.
    Directory = 14,
    /// Forum channel.
    Forum = 15,
    /// Media channel.
    Media = 16,
    /// A type this client does not know about.
    Unknown = u8::MAX,
}

impl ChannelKind {
    /// Returns true if messages can be posted in this channel type.
    #[must_use]
    pub const fn is_text_based(self) -> bool {
        matches!(
            self,
            Self::Text
                | Self::Dm
                | Self::Voice
                | Self::GroupDm
                | Self::Announcement
                | Self::AnnouncementThread
                | Self::PublicThread
                | Self::PrivateThread
                | Self::StageVoice
        )
    }
}

impl From<u8> for ChannelKind {
    fn from(value: u8) -> Self {
        match value {
            0 => Self::Text,
            1 => Self::Dm,
            2 => Self::Voice,
            3 => Self::GroupDm,
            4 => Self::Category,
            5 => Self::Announcement,
            10 => Self::AnnouncementThread,
            11 => Self::PublicThread,
            12 => Self::PrivateThread,
            13 => Self::StageVoice,
            14 => Self::Directory,
            15 => Self::Forum,
            16 => Self::Media,
            _ => Self::Unknown,
        }
    }
}

/// Channel fields as they arrive from the gateway.
#[derive(Debug, Deserialize)]
struct ChannelPayload {
    id: ChannelId,
    #[serde(rename = "type", default)]
    kind: u8,
    #[serde(default, with = "crate::domain::serde_utils::snowflake::option")]
    guild_id: Option<u64>,
    #[serde(default, deserialize_with = "crate::domain::serde_utils::lenient_string::deserialize")]
    name: Option<String>,
    #[serde(default, with = "crate::domain::serde_utils::snowflake::option")]
    last_message_id: Option<u64>,
}

/// Per-channel message store keyed by message id.
pub type MessageCache = EntityCache<MessageId, Arc<Message>>;

/// Discord channel with its cached messages.
#[derive(Debug)]
pub struct Channel {
    id: ChannelId,
    guild_id: Option<GuildId>,
    name: Option<String>,
    kind: ChannelKind,
    last_message_id: Option<MessageId>,
    messages: MessageCache,
}

impl Channel {
    /// Creates a channel with an empty message cache of the default size.
    #[must_use]
    pub fn new(id: impl Into<ChannelId>, kind: ChannelKind) -> Self {
        Self {
            id: id.into(),
            guild_id: None,
            name: None,
            kind,
            last_message_id: None,
            messages: EntityCache::bounded(DEFAULT_MESSAGE_CACHE_SIZE),
        }
    }

    /// Sets the guild ID for this channel.
    #[must_use]
    pub fn with_guild(mut self, guild_id: impl Into<GuildId>) -> Self {
        self.guild_id = Some(guild_id.into());
        self
    }

    /// Replaces the message cache with an empty one holding at most `size`
    /// messages (zero for unbounded).
    #[must_use]
    pub fn with_message_cache_size(mut self, size: usize) -> Self {
        self.messages = EntityCache::bounded(size);
        self
    }

    /// Channel id.
    #[must_use]
    pub const fn id(&self) -> ChannelId {
        self.id
    }

    /// Owning guild, absent for private channels.
    #[must_use]
    pub const fn guild_id(&self) -> Option<GuildId> {
        self.guild_id
    }

    /// Attaches the channel to a guild.
    pub fn set_guild_id(&mut self, guild_id: GuildId) {
        self.guild_id = Some(guild_id);
    }

    /// Channel name, if it has one.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Channel type.
    #[must_use]
    pub const fn kind(&self) -> ChannelKind {
        self.kind
    }

    /// Returns true if messages can be posted here.
    #[must_use]
    pub const fn is_text_based(&self) -> bool {
        self.kind.is_text_based()
    }

    /// Most recent message seen.
    #[must_use]
    pub const fn last_message_id(&self) -> Option<MessageId> {
        self.last_message_id
    }

    /// Records the most recent message.
    pub fn set_last_message_id(&mut self, message_id: MessageId) {
        self.last_message_id = Some(message_id);
    }

    /// Cached messages, oldest first.
    #[must_use]
    pub const fn messages(&self) -> &MessageCache {
        &self.messages
    }

    /// Mutable message cache.
    pub fn messages_mut(&mut self) -> &mut MessageCache {
        &mut self.messages
    }
}

impl Patchable for Channel {
    fn from_payload(data: &Value) -> Result<Self, PayloadError> {
        let payload = ChannelPayload::deserialize(data)?;
        let mut channel = Self::new(payload.id, ChannelKind::from(payload.kind));
        channel.apply(payload);
        Ok(channel)
    }

    /// Re-applies metadata; cached messages survive.
    fn apply_full(&mut self, data: &Value) -> Result<(), PayloadError> {
        let payload = ChannelPayload::deserialize(data)?;
        if payload.id != self.id {
            return Err(PayloadError::mismatched_id(self.id, payload.id));
        }
        self.kind = ChannelKind::from(payload.kind);
        self.apply(payload);
        Ok(())
    }
}

impl Channel {
    fn apply(&mut self, payload: ChannelPayload) {
        if let Some(guild_id) = payload.guild_id {
            self.guild_id = Some(GuildId(guild_id));
        }
        self.name = payload.name;
        if let Some(last) = payload.last_message_id {
            self.last_message_id = Some(MessageId(last));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use test_case::test_case;

    #[test_case(0, true ; "guild_text")]
    #[test_case(1, true ; "dm")]
    #[test_case(2, true ; "voice_text_chat")]
    #[test_case(11, true ; "public_thread")]
    #[test_case(4, false ; "category")]
    #[test_case(15, false ; "forum")]
    #[test_case(200, false ; "unknown")]
    fn test_kind_is_text_based(raw: u8, expected: bool) {
        assert_eq!(ChannelKind::from(raw).is_text_based(), expected);
    }

    #[test]
    fn test_from_payload() {
        let channel = Channel::from_payload(&json!({
            "id": "100",
            "type": 0,
            "guild_id": "7",
            "name": "general",
            "last_message_id": "55"
        }))
        .unwrap();

        assert_eq!(channel.id(), ChannelId(100));
        assert_eq!(channel.guild_id(), Some(GuildId(7)));
        assert_eq!(channel.name(), Some("general"));
        assert_eq!(channel.last_message_id(), Some(MessageId(55)));
        assert!(channel.is_text_based());
        assert!(channel.messages().is_empty());
    }

    #[test]
    fn test_apply_full_keeps_messages() {
        let mut channel = Channel::new(1_u64, ChannelKind::Text);
        let message = Message::from_payload(&json!({ "id": "9", "channel_id": "1" })).unwrap();
        channel.messages_mut().insert(message.id(), Arc::new(message));

        channel
            .apply_full(&json!({ "id": "1", "type": 5, "name": "news" }))
            .unwrap();

        assert_eq!(channel.kind(), ChannelKind::Announcement);
        assert_eq!(channel.name(), Some("news"));
        assert_eq!(channel.messages().len(), 1);
    }

    #[test]
    fn test_apply_full_rejects_other_id() {
        let mut channel = Channel::new(1_u64, ChannelKind::Text);
        let result = channel.apply_full(&json!({ "id": "2", "type": 0 }));
        assert!(result.is_err());
    }

    #[test]
    fn test_message_cache_size() {
        let channel = Channel::new(1_u64, ChannelKind::Text).with_message_cache_size(3);
        assert_eq!(channel.messages().capacity(), Some(3));
    }
}
