//! Serde helpers for lenient gateway payloads.

use chrono::{DateTime, NaiveDateTime, SecondsFormat, Utc};
use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serializer};
use serde_json::Value;
use std::fmt;

/// Snowflake IDs that arrive either as strings or as numbers.
pub mod snowflake {
    use super::{de, fmt, Deserializer, Serializer, Visitor};

    /// Serializes a snowflake as a string, the way the gateway sends it.
    ///
    /// # Errors
    ///
    /// Returns an error if the serializer fails.
    pub fn serialize<S>(value: &u64, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&value.to_string())
    }

    /// Deserializes a snowflake from a string or an unsigned integer.
    ///
    /// # Errors
    ///
    /// Returns an error if the value is neither, or the string is not numeric.
    pub fn deserialize<'de, D>(deserializer: D) -> Result<u64, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct SnowflakeVisitor;

        impl Visitor<'_> for SnowflakeVisitor {
            type Value = u64;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("a string or integer snowflake")
            }

            fn visit_u64<E>(self, value: u64) -> Result<Self::Value, E>
            where
                E: de::Error,
            {
                Ok(value)
            }

            fn visit_i64<E>(self, value: i64) -> Result<Self::Value, E>
            where
                E: de::Error,
            {
                u64::try_from(value).map_err(|_| E::custom("negative snowflake"))
            }

            fn visit_str<E>(self, value: &str) -> Result<Self::Value, E>
            where
                E: de::Error,
            {
                value.trim().parse::<u64>().map_err(de::Error::custom)
            }
        }

        deserializer.deserialize_any(SnowflakeVisitor)
    }

    /// Optional snowflakes; `null` and absent both map to `None`.
    pub mod option {
        use super::{de, fmt, Deserializer, Serializer, Visitor};

        /// Serializes an optional snowflake as a string or `null`.
        ///
        /// # Errors
        ///
        /// Returns an error if the serializer fails.
        #[allow(clippy::ref_option)]
        pub fn serialize<S>(value: &Option<u64>, serializer: S) -> Result<S::Ok, S::Error>
        where
            S: Serializer,
        {
            match value {
                Some(v) => super::serialize(v, serializer),
                None => serializer.serialize_none(),
            }
        }

        /// Deserializes an optional snowflake.
        ///
        /// # Errors
        ///
        /// Returns an error if a present value is not a valid snowflake.
        pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
        where
            D: Deserializer<'de>,
        {
            struct OptionVisitor;

            impl<'de> Visitor<'de> for OptionVisitor {
                type Value = Option<u64>;

                fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                    formatter.write_str("an optional snowflake")
                }

                fn visit_none<E>(self) -> Result<Self::Value, E>
                where
                    E: de::Error,
                {
                    Ok(None)
                }

                fn visit_unit<E>(self) -> Result<Self::Value, E>
                where
                    E: de::Error,
                {
                    Ok(None)
                }

                fn visit_some<D>(self, deserializer: D) -> Result<Self::Value, D::Error>
                where
                    D: Deserializer<'de>,
                {
                    super::deserialize(deserializer).map(Some)
                }
            }

            deserializer.deserialize_option(OptionVisitor)
        }
    }
}

/// Optional strings where any non-string value is treated as absent.
pub mod lenient_string {
    use super::{Deserialize, Deserializer, Value};

    /// Deserializes a string, mapping `null` and non-string values to `None`.
    ///
    /// # Errors
    ///
    /// Only fails if the underlying deserializer cannot produce a JSON value.
    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(match Option::<Value>::deserialize(deserializer)? {
            Some(Value::String(s)) => Some(s),
            _ => None,
        })
    }
}

/// Optional snowflakes where anything undecodable is treated as absent.
pub mod lenient_snowflake {
    use super::{Deserialize, Deserializer, Value};

    /// Reads a snowflake from a JSON string or unsigned integer.
    #[must_use]
    pub fn from_value(value: &Value) -> Option<u64> {
        match value {
            Value::String(s) => s.trim().parse().ok(),
            Value::Number(n) => n.as_u64(),
            _ => None,
        }
    }

    /// Deserializes an optional snowflake, mapping bad values to `None`.
    ///
    /// # Errors
    ///
    /// Only fails if the underlying deserializer cannot produce a JSON value.
    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(Option::<Value>::deserialize(deserializer)?
            .as_ref()
            .and_then(from_value))
    }
}

/// Parses an ISO-8601 timestamp, collapsing precision to milliseconds.
///
/// Offsets are normalized to UTC; a missing offset is read as UTC. Anything
/// unparsable yields `None`.
#[must_use]
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    let parsed = DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .or_else(|_| {
            NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f").map(|dt| dt.and_utc())
        })
        .ok()?;

    DateTime::from_timestamp_millis(parsed.timestamp_millis())
}

/// Formats a timestamp the way [`parse_timestamp`] reads it back.
#[must_use]
pub fn format_timestamp(timestamp: DateTime<Utc>) -> String {
    timestamp.to_rfc3339_opts(SecondsFormat::Millis, true)
}
