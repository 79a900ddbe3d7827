//! Gateway frame decoding.
//!
//! Frames arrive as newline-delimited JSON. Only dispatch frames (opcode 0)
//! carry events the client applies; everything else is skipped.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Opcode of a gateway dispatch.
pub const DISPATCH_OPCODE: u8 = 0;

/// Result of frame decoding.
pub type FrameResult<T> = Result<T, FrameError>;

/// A line that is not a usable gateway frame.
#[derive(Debug, Error)]
#[allow(missing_docs)]
pub enum FrameError {
    #[error("empty frame")]
    Empty,

    #[error("malformed frame: {0}")]
    Json(#[from] serde_json::Error),

    #[error("dispatch frame without an event type")]
    MissingEventType,
}

/// One gateway frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GatewayFrame {
    /// Opcode.
    pub op: u8,
    /// Event data.
    #[serde(default)]
    pub d: Value,
    /// Sequence number, dispatches only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub s: Option<u64>,
    /// Event type, dispatches only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub t: Option<String>,
}

impl GatewayFrame {
    /// Parses a single line of input.
    ///
    /// # Errors
    /// Returns an error for blank input, invalid JSON, or a dispatch frame
    /// missing its `t` field.
    pub fn parse(line: &str) -> FrameResult<Self> {
        let line = line.trim();
        if line.is_empty() {
            return Err(FrameError::Empty);
        }

        let frame: Self = serde_json::from_str(line)?;
        if frame.is_dispatch() && frame.t.as_deref().is_none_or(str::is_empty) {
            return Err(FrameError::MissingEventType);
        }
        Ok(frame)
    }

    /// Returns true for opcode 0.
    #[must_use]
    pub const fn is_dispatch(&self) -> bool {
        self.op == DISPATCH_OPCODE
    }

    /// Splits a dispatch frame into its event type and data.
    #[must_use]
    pub fn into_dispatch(self) -> Option<(String, Value)> {
        if !self.is_dispatch() {
            return None;
        }
        self.t.map(|event_type| (event_type, self.d))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_dispatch() {
        let frame = GatewayFrame::parse(
            r#"{"op":0,"s":42,"t":"MESSAGE_CREATE","d":{"id":"1","channel_id":"10"}}"#,
        )
        .unwrap();

        assert_eq!(frame.s, Some(42));
        let (event_type, data) = frame.into_dispatch().unwrap();
        assert_eq!(event_type, "MESSAGE_CREATE");
        assert_eq!(data, json!({ "id": "1", "channel_id": "10" }));
    }

    #[test]
    fn test_non_dispatch_is_skipped() {
        let frame = GatewayFrame::parse(r#"{"op":11}"#).unwrap();

        assert!(!frame.is_dispatch());
        assert_eq!(frame.d, Value::Null);
        assert!(frame.into_dispatch().is_none());
    }

    #[test]
    fn test_rejects_bad_input() {
        assert!(matches!(GatewayFrame::parse("   "), Err(FrameError::Empty)));
        assert!(matches!(GatewayFrame::parse("{op:0"), Err(FrameError::Json(_))));
        assert!(matches!(
            GatewayFrame::parse(r#"{"op":0,"d":{}}"#),
            Err(FrameError::MissingEventType)
        ));
    }
}
