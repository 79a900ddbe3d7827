//! Discord user entity.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{Patchable, Snowflake};
use crate::domain::errors::PayloadError;

/// Unique identifier for a Discord user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(#[serde(with = "crate::domain::serde_utils::snowflake")] pub u64);

impl UserId {
    /// Returns the underlying u64 value.
    #[must_use]
    pub const fn as_u64(self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for UserId {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

impl From<Snowflake> for UserId {
    fn from(value: Snowflake) -> Self {
        Self(value.0)
    }
}

impl From<UserId> for Snowflake {
    fn from(value: UserId) -> Self {
        Self(value.0)
    }
}

#[derive(Debug, Deserialize)]
struct UserPayload {
    id: UserId,
    #[serde(default)]
    username: String,
    #[serde(default)]
    bot: bool,
}

/// Discord user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    id: UserId,
    username: String,
    bot: bool,
}

impl User {
    /// Creates a non-bot user.
    #[must_use]
    pub fn new(id: impl Into<UserId>, username: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            username: username.into(),
            bot: false,
        }
    }

    /// User id.
    #[must_use]
    pub const fn id(&self) -> UserId {
        self.id
    }

    /// Username.
    #[must_use]
    pub fn username(&self) -> &str {
        &self.username
    }

    /// Returns true for bot accounts.
    #[must_use]
    pub const fn is_bot(&self) -> bool {
        self.bot
    }
}

impl Patchable for User {
    fn from_payload(data: &Value) -> Result<Self, PayloadError> {
        let payload = UserPayload::deserialize(data)?;
        Ok(Self {
            id: payload.id,
            username: payload.username,
            bot: payload.bot,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_from_payload() {
        let user = User::from_payload(&json!({ "id": "5", "username": "ferris", "bot": true }))
            .unwrap();

        assert_eq!(user.id(), UserId(5));
        assert_eq!(user.username(), "ferris");
        assert!(user.is_bot());
    }

    #[test]
    fn test_missing_id_is_error() {
        assert!(User::from_payload(&json!({ "username": "ghost" })).is_err());
    }
}
