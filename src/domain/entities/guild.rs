//! Discord guild entity.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{Patchable, Snowflake};
use crate::domain::errors::PayloadError;

/// Unique identifier for a Discord guild (server).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GuildId(#[serde(with = "crate::domain::serde_utils::snowflake")] pub u64);

impl GuildId {
    /// Returns the underlying u64 value.
    #[must_use]
    pub const fn as_u64(self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for GuildId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for GuildId {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

impl From<Snowflake> for GuildId {
    fn from(value: Snowflake) -> Self {
        Self(value.0)
    }
}

impl From<GuildId> for Snowflake {
    fn from(value: GuildId) -> Self {
        Self(value.0)
    }
}

#[derive(Debug, Deserialize)]
struct GuildPayload {
    id: GuildId,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    unavailable: bool,
}

/// Discord guild (server) information.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Guild {
    id: GuildId,
    name: String,
    unavailable: bool,
}

impl Guild {
    /// Creates a new guild with the given ID and name.
    #[must_use]
    pub fn new(id: impl Into<GuildId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            unavailable: false,
        }
    }

    /// Guild id.
    #[must_use]
    pub const fn id(&self) -> GuildId {
        self.id
    }

    /// Guild name; empty while unavailable.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns true while the guild is in an outage and only its id is known.
    #[must_use]
    pub const fn is_unavailable(&self) -> bool {
        self.unavailable
    }

    /// Flags the guild as in an outage.
    pub fn mark_unavailable(&mut self) {
        self.unavailable = true;
    }
}

impl Patchable for Guild {
    fn from_payload(data: &Value) -> Result<Self, PayloadError> {
        let payload = GuildPayload::deserialize(data)?;
        Ok(Self {
            id: payload.id,
            name: payload.name.unwrap_or_default(),
            unavailable: payload.unavailable,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_from_payload() {
        let guild = Guild::from_payload(&json!({ "id": "12", "name": "Rust" })).unwrap();

        assert_eq!(guild.id(), GuildId(12));
        assert_eq!(guild.name(), "Rust");
        assert!(!guild.is_unavailable());
    }

    #[test]
    fn test_unavailable_guild() {
        let guild = Guild::from_payload(&json!({ "id": 12, "unavailable": true })).unwrap();
        assert!(guild.is_unavailable());
        assert_eq!(guild.name(), "");
    }

    #[test]
    fn test_apply_full_replaces_fields() {
        let mut guild = Guild::new(12_u64, "Old");
        guild
            .apply_full(&json!({ "id": "12", "name": "New" }))
            .unwrap();
        assert_eq!(guild.name(), "New");
    }
}
