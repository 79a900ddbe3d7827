//! Lookup port for the client's entity registries.

use crate::domain::entities::{Channel, ChannelId, Guild, GuildId, User};

/// Non-owning access to cached channels, guilds and the current user.
///
/// Lookups return borrows; an evicted entity is simply `None`.
pub trait ResourceResolver {
    /// Channel with `id`, if cached.
    fn channel(&self, id: ChannelId) -> Option<&Channel>;

    /// Mutable channel lookup.
    fn channel_mut(&mut self, id: ChannelId) -> Option<&mut Channel>;

    /// Guild with `id`, if cached.
    fn guild(&self, id: GuildId) -> Option<&Guild>;

    /// The user this client is logged in as, once known.
    fn current_user(&self) -> Option<&User>;
}
