//! Payload decoding errors.

use std::fmt::Display;

use thiserror::Error;

/// A gateway payload that could not be turned into an entity.
#[derive(Debug, Error)]
#[allow(missing_docs)]
pub enum PayloadError {
    #[error("malformed payload: {message}")]
    Malformed { message: String },

    #[error("payload id {found} does not match entity {expected}")]
    MismatchedId { expected: String, found: String },
}

impl PayloadError {
    /// Creates malformed payload error.
    #[must_use]
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::Malformed {
            message: message.into(),
        }
    }

    /// Creates mismatched id error.
    #[must_use]
    pub fn mismatched_id(expected: impl Display, found: impl Display) -> Self {
        Self::MismatchedId {
            expected: expected.to_string(),
            found: found.to_string(),
        }
    }
}

impl From<serde_json::Error> for PayloadError {
    fn from(err: serde_json::Error) -> Self {
        Self::malformed(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_serde_error() {
        let err = serde_json::from_str::<u32>("\"x\"").unwrap_err();
        let payload_err = PayloadError::from(err);

        assert!(matches!(payload_err, PayloadError::Malformed { .. }));
        assert!(payload_err.to_string().starts_with("malformed payload"));
    }

    #[test]
    fn test_mismatched_id_message() {
        let err = PayloadError::mismatched_id(1, 2);
        assert_eq!(err.to_string(), "payload id 2 does not match entity 1");
    }
}
