//! Domain layer with core entities, the entity cache and port definitions.

/// Insertion-ordered entity cache.
pub mod cache;
/// Entity definitions.
pub mod entities;
/// Error types.
pub mod errors;
/// Port definitions.
pub mod ports;
/// Serde utilities.
pub mod serde_utils;

pub use cache::EntityCache;
pub use entities::{
    Channel, ChannelId, Guild, GuildId, Message, MessageId, ReadState, Snowflake, User, UserId,
};
pub use errors::{ApiError, PayloadError};
pub use ports::{ResourceResolver, RestPort};
