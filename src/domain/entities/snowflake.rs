//! Untyped Discord resource identifier.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Milliseconds between the Unix epoch and the first second of 2015.
pub const DISCORD_EPOCH_MS: i64 = 1_420_070_400_000;

/// Opaque resource id shared by every cacheable entity.
///
/// The upper 42 bits encode the creation time relative to [`DISCORD_EPOCH_MS`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Snowflake(#[serde(with = "crate::domain::serde_utils::snowflake")] pub u64);

impl Snowflake {
    /// Returns the underlying u64 value.
    #[must_use]
    pub const fn as_u64(self) -> u64 {
        self.0
    }

    /// Unix timestamp in milliseconds at which this id was minted.
    #[must_use]
    #[allow(clippy::cast_possible_wrap)]
    pub const fn timestamp_ms(self) -> i64 {
        (self.0 >> 22) as i64 + DISCORD_EPOCH_MS
    }

    /// Creation time of the resource this id names.
    #[must_use]
    pub fn created_at(self) -> DateTime<Utc> {
        DateTime::from_timestamp_millis(self.timestamp_ms()).unwrap_or(DateTime::UNIX_EPOCH)
    }
}

impl std::fmt::Display for Snowflake {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for Snowflake {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

impl FromStr for Snowflake {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse().map(Self)
    }
}
