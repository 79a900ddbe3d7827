//! Entity registries owned by the client.

use tracing::debug;

use crate::domain::cache::EntityCache;
use crate::domain::entities::{
    Channel, ChannelId, DEFAULT_MESSAGE_CACHE_SIZE, Guild, GuildId, Patchable, ReadState,
    ReadStatePayload, Snowflake, User,
};
use crate::domain::errors::PayloadError;
use crate::domain::ports::ResourceResolver;

/// Channels, guilds, read states and the current user.
///
/// Registries are unbounded; only per-channel message caches evict.
#[derive(Debug)]
pub struct ClientState {
    channels: EntityCache<ChannelId, Channel>,
    guilds: EntityCache<GuildId, Guild>,
    read_states: EntityCache<Snowflake, ReadState>,
    user: Option<User>,
    message_cache_size: usize,
}

impl Default for ClientState {
    fn default() -> Self {
        Self::new(DEFAULT_MESSAGE_CACHE_SIZE)
    }
}

impl ClientState {
    /// Creates empty registries. New channels keep at most
    /// `message_cache_size` messages (zero for unbounded).
    #[must_use]
    pub fn new(message_cache_size: usize) -> Self {
        Self {
            channels: EntityCache::unbounded(),
            guilds: EntityCache::unbounded(),
            read_states: EntityCache::unbounded(),
            user: None,
            message_cache_size,
        }
    }

    /// Message cache size given to new channels.
    #[must_use]
    pub const fn message_cache_size(&self) -> usize {
        self.message_cache_size
    }

    /// Channel registry.
    #[must_use]
    pub const fn channels(&self) -> &EntityCache<ChannelId, Channel> {
        &self.channels
    }

    /// Guild registry.
    #[must_use]
    pub const fn guilds(&self) -> &EntityCache<GuildId, Guild> {
        &self.guilds
    }

    /// Read-state store.
    #[must_use]
    pub const fn read_states(&self) -> &EntityCache<Snowflake, ReadState> {
        &self.read_states
    }

    /// Read state stored under `id`.
    #[must_use]
    pub fn read_state(&self, id: impl Into<Snowflake>) -> Option<&ReadState> {
        self.read_states.get(&id.into())
    }

    /// Records the user this session belongs to.
    pub fn set_current_user(&mut self, user: User) {
        self.user = Some(user);
    }

    /// Inserts a channel, or re-applies `data` to the cached one so its
    /// messages survive.
    ///
    /// Returns the channel id and whether it was newly inserted.
    ///
    /// # Errors
    ///
    /// Returns `PayloadError` if `data` is not a channel payload.
    pub fn upsert_channel(
        &mut self,
        data: &serde_json::Value,
        guild_id: Option<GuildId>,
    ) -> Result<(ChannelId, bool), PayloadError> {
        let mut channel = Channel::from_payload(data)?;
        let id = channel.id();

        if let Some(existing) = self.channels.get_mut(&id) {
            existing.apply_full(data)?;
            if let Some(guild_id) = guild_id {
                existing.set_guild_id(guild_id);
            }
            return Ok((id, false));
        }

        if let Some(guild_id) = guild_id {
            channel.set_guild_id(guild_id);
        }
        self.insert_channel(channel);
        Ok((id, true))
    }

    /// Inserts `channel` with this state's message cache size.
    pub fn insert_channel(&mut self, channel: Channel) {
        let channel = if channel.messages().is_empty() {
            channel.with_message_cache_size(self.message_cache_size)
        } else {
            channel
        };
        debug!(channel_id = %channel.id(), "Caching channel");
        self.channels.insert(channel.id(), channel);
    }

    /// Removes a channel together with its messages.
    pub fn remove_channel(&mut self, id: ChannelId) -> Option<Channel> {
        self.channels.remove(&id)
    }

    /// Inserts or replaces a guild.
    pub fn insert_guild(&mut self, guild: Guild) {
        debug!(guild_id = %guild.id(), "Caching guild");
        self.guilds.insert(guild.id(), guild);
    }

    /// Removes a guild and every channel that belongs to it.
    ///
    /// Returns the guild and how many channels went with it.
    pub fn remove_guild(&mut self, id: GuildId) -> (Option<Guild>, usize) {
        let guild = self.guilds.remove(&id);
        let before = self.channels.len();
        self.channels.retain(|_, channel| channel.guild_id() != Some(id));
        (guild, before - self.channels.len())
    }

    /// Replaces the read state `payload.id` with a fresh parse of `payload`
    /// and returns a copy of the stored value.
    pub fn apply_read_state(&mut self, payload: ReadStatePayload) -> ReadState {
        let state = ReadState::from(payload);
        debug!(read_state_id = %state.id(), kind = ?state.kind(), "Applying read state");
        self.read_states.insert(state.id(), state.clone());
        state
    }
}

impl ResourceResolver for ClientState {
    fn channel(&self, id: ChannelId) -> Option<&Channel> {
        self.channels.get(&id)
    }

    fn channel_mut(&mut self, id: ChannelId) -> Option<&mut Channel> {
        self.channels.get_mut(&id)
    }

    fn guild(&self, id: GuildId) -> Option<&Guild> {
        self.guilds.get(&id)
    }

    fn current_user(&self) -> Option<&User> {
        self.user.as_ref()
    }
}
