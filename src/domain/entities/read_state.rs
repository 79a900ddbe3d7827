//! Read state entity.
//!
//! A read state records how far the current user has acknowledged a
//! resource. The resource is a channel, a guild-level surface, or the user
//! itself, depending on [`ReadStateType`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{Channel, ChannelId, Guild, GuildId, Patchable, Snowflake, User};
use crate::domain::errors::{ApiError, PayloadError};
use crate::domain::ports::{ResourceResolver, RestPort};
use crate::domain::serde_utils::{format_timestamp, parse_timestamp};

/// Kind of resource a read state tracks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ReadStateType {
    /// A text channel. Also the type used when the payload omits it.
    #[default]
    Channel,
    /// Scheduled events of a guild.
    GuildScheduledEvent,
    /// The notification center (inbox).
    NotificationCenter,
    /// A guild's home feed.
    GuildHome,
    /// A guild's onboarding questions.
    GuildOnboardingQuestion,
    /// Message requests.
    MessageRequests,
    /// A discriminant this client does not know; kept for round-trips.
    Unknown(i64),
}

impl ReadStateType {
    /// Maps the wire discriminant. Missing input is [`Self::Channel`].
    #[must_use]
    pub const fn from_raw(raw: Option<i64>) -> Self {
        match raw {
            None | Some(0) => Self::Channel,
            Some(1) => Self::GuildScheduledEvent,
            Some(2) => Self::NotificationCenter,
            Some(3) => Self::GuildHome,
            Some(4) => Self::GuildOnboardingQuestion,
            Some(5) => Self::MessageRequests,
            Some(other) => Self::Unknown(other),
        }
    }

    /// Wire discriminant.
    #[must_use]
    pub const fn as_raw(self) -> i64 {
        match self {
            Self::Channel => 0,
            Self::GuildScheduledEvent => 1,
            Self::NotificationCenter => 2,
            Self::GuildHome => 3,
            Self::GuildOnboardingQuestion => 4,
            Self::MessageRequests => 5,
            Self::Unknown(raw) => raw,
        }
    }

    /// Returns true if the read state id is a guild id.
    #[must_use]
    pub const fn is_guild_scoped(self) -> bool {
        matches!(
            self,
            Self::GuildScheduledEvent | Self::GuildHome | Self::GuildOnboardingQuestion
        )
    }
}

bitflags::bitflags! {
    /// Read state flags.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
    pub struct ReadStateFlags: u32 {
        /// The channel belongs to a guild.
        const IS_GUILD_CHANNEL = 1 << 0;
        /// The channel is a thread.
        const IS_THREAD = 1 << 1;
    }
}

/// Read state as it appears on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReadStatePayload {
    /// Channel, guild or user id, depending on the type.
    pub id: Snowflake,
    /// Raw type index.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub read_state_type: Option<i64>,
    /// Unread mentions.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mention_count: Option<u32>,
    /// Older name for `mention_count`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub badge_count: Option<u32>,
    /// Days since 2015-01-01.
    #[serde(default)]
    pub last_viewed: Option<u32>,
    /// ISO-8601 time the pins were last viewed.
    #[serde(
        default,
        deserialize_with = "crate::domain::serde_utils::lenient_string::deserialize"
    )]
    pub last_pin_timestamp: Option<String>,
    /// Last acknowledged entity.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_acked_id: Option<Snowflake>,
    /// Fallback for `last_acked_id`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_message_id: Option<Snowflake>,
    /// Raw `ReadStateFlags` bits.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flags: Option<u32>,
}

impl ReadStatePayload {
    /// Payload carrying only an id; every other field takes its default.
    #[must_use]
    pub const fn new(id: Snowflake) -> Self {
        Self {
            id,
            read_state_type: None,
            mention_count: None,
            badge_count: None,
            last_viewed: None,
            last_pin_timestamp: None,
            last_acked_id: None,
            last_message_id: None,
            flags: None,
        }
    }
}

/// The resource a read state points at, borrowed from the registries.
#[derive(Debug, Clone, Copy)]
pub enum ReadStateResource<'a> {
    Channel(&'a Channel),
    Guild(&'a Guild),
    User(&'a User),
}

/// Acknowledgment bookkeeping for one resource.
///
/// Cloning rebuilds the wire payload and parses it again, so a clone is
/// always what a fresh payload would produce.
#[derive(Debug, PartialEq, Eq)]
pub struct ReadState {
    id: Snowflake,
    kind: ReadStateType,
    mention_count: u32,
    last_viewed: Option<u32>,
    last_pin_timestamp: Option<DateTime<Utc>>,
    last_acked_id: Option<Snowflake>,
    flags: ReadStateFlags,
}

impl ReadState {
    /// Id of the resource this state tracks.
    #[must_use]
    pub const fn id(&self) -> Snowflake {
        self.id
    }

    /// What kind of resource the id names.
    #[must_use]
    pub const fn kind(&self) -> ReadStateType {
        self.kind
    }

    /// Unread mentions.
    #[must_use]
    pub const fn mention_count(&self) -> u32 {
        self.mention_count
    }

    /// Days since 2015-01-01 when the resource was last viewed.
    #[must_use]
    pub const fn last_viewed(&self) -> Option<u32> {
        self.last_viewed
    }

    /// When the channel pins were last acknowledged.
    #[must_use]
    pub const fn last_pin_timestamp(&self) -> Option<DateTime<Utc>> {
        self.last_pin_timestamp
    }

    /// Id of the last acknowledged item (a message id for channels).
    #[must_use]
    pub const fn last_acked_id(&self) -> Option<Snowflake> {
        self.last_acked_id
    }

    /// Read-state flags.
    #[must_use]
    pub const fn flags(&self) -> ReadStateFlags {
        self.flags
    }

    /// Wire form of this read state, the inverse of parsing.
    #[must_use]
    pub fn to_payload(&self) -> ReadStatePayload {
        ReadStatePayload {
            read_state_type: Some(self.kind.as_raw()),
            mention_count: Some(self.mention_count),
            last_viewed: self.last_viewed,
            last_pin_timestamp: self.last_pin_timestamp.map(format_timestamp),
            last_acked_id: self.last_acked_id,
            flags: (!self.flags.is_empty()).then(|| self.flags.bits()),
            ..ReadStatePayload::new(self.id)
        }
    }

    /// Looks up the tracked resource without taking ownership of it.
    ///
    /// Returns `None` when the resource is no longer cached.
    #[must_use]
    pub fn resource<'a, R>(&self, resolver: &'a R) -> Option<ReadStateResource<'a>>
    where
        R: ResourceResolver + ?Sized,
    {
        match self.kind {
            ReadStateType::Channel => resolver
                .channel(ChannelId::from(self.id))
                .map(ReadStateResource::Channel),
            kind if kind.is_guild_scoped() => resolver
                .guild(GuildId::from(self.id))
                .map(ReadStateResource::Guild),
            _ => resolver.current_user().map(ReadStateResource::User),
        }
    }

    /// Channel-only operations, available when this tracks a channel.
    #[must_use]
    pub fn as_channel(&self) -> Option<ChannelReadState> {
        matches!(self.kind, ReadStateType::Channel).then(|| ChannelReadState {
            channel_id: ChannelId::from(self.id),
        })
    }
}

impl From<ReadStatePayload> for ReadState {
    fn from(payload: ReadStatePayload) -> Self {
        Self {
            id: payload.id,
            kind: ReadStateType::from_raw(payload.read_state_type),
            mention_count: payload.mention_count.or(payload.badge_count).unwrap_or(0),
            last_viewed: payload.last_viewed,
            last_pin_timestamp: payload
                .last_pin_timestamp
                .as_deref()
                .and_then(parse_timestamp),
            last_acked_id: payload.last_acked_id.or(payload.last_message_id),
            flags: payload
                .flags
                .map(ReadStateFlags::from_bits_truncate)
                .unwrap_or_default(),
        }
    }
}

impl Clone for ReadState {
    fn clone(&self) -> Self {
        Self::from(self.to_payload())
    }
}

impl Patchable for ReadState {
    fn from_payload(data: &Value) -> Result<Self, PayloadError> {
        Ok(Self::from(ReadStatePayload::deserialize(data)?))
    }
}

/// A read state known to track a channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChannelReadState {
    channel_id: ChannelId,
}

impl ChannelReadState {
    /// Channel this state belongs to.
    #[must_use]
    pub const fn channel_id(&self) -> ChannelId {
        self.channel_id
    }

    /// Deletes the channel's read state on the server.
    ///
    /// The local read state is left untouched; callers should refetch or
    /// drop it once this succeeds.
    ///
    /// # Errors
    ///
    /// Returns the transport error unchanged.
    pub async fn delete(&self, rest: &dyn RestPort) -> Result<(), ApiError> {
        rest.delete_channel_ack(self.channel_id).await
    }
}
