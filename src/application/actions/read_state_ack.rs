//! Acknowledgment events that re-apply a channel's read state.
//!
//! Both actions merge the event into the current wire form of the read state
//! and parse the result again, so the stored value is always what a full
//! payload would produce.

use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use super::{Action, ActionResult, decode};
use crate::application::client::Client;
use crate::application::events::{ClientEvent, EventName};
use crate::domain::entities::{
    ChannelId, MessageId, ReadState, ReadStatePayload, ReadStateType, Snowflake,
};

#[derive(Debug, Deserialize)]
struct MessageAckPayload {
    channel_id: ChannelId,
    #[serde(default)]
    message_id: Option<MessageId>,
    #[serde(default)]
    mention_count: Option<u32>,
    #[serde(default)]
    badge_count: Option<u32>,
    #[serde(default)]
    flags: Option<u32>,
    #[serde(default)]
    last_viewed: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct ChannelPinsAckPayload {
    channel_id: ChannelId,
    #[serde(
        default,
        deserialize_with = "crate::domain::serde_utils::lenient_string::deserialize"
    )]
    timestamp: Option<String>,
}

/// Current wire form of the channel's read state, or a blank one.
fn current_payload(client: &Client, channel_id: ChannelId) -> ReadStatePayload {
    let id = Snowflake::from(channel_id);
    let mut payload = client
        .state
        .read_state(id)
        .map_or_else(|| ReadStatePayload::new(id), ReadState::to_payload);
    payload.read_state_type = Some(ReadStateType::Channel.as_raw());
    payload
}

fn store(client: &mut Client, name: EventName, payload: ReadStatePayload) -> ActionResult {
    let state = client.state.apply_read_state(payload);
    client.events.emit(name, &ClientEvent::ReadState(state.clone()));
    ActionResult::read_state(state)
}

/// Marks a channel read up to a message.
#[derive(Debug, Clone, Copy, Default)]
pub struct MessageAckAction;

impl Action for MessageAckAction {
    fn event_type(&self) -> &'static str {
        "MESSAGE_ACK"
    }

    fn handle(&self, client: &mut Client, data: &Value) -> ActionResult {
        let Some(ack) = decode::<MessageAckPayload>(self.event_type(), data) else {
            return ActionResult::empty();
        };
        debug!(channel_id = %ack.channel_id, message_id = ?ack.message_id, "Message ack");

        let mut payload = current_payload(client, ack.channel_id);
        if let Some(message_id) = ack.message_id {
            payload.last_acked_id = Some(message_id.into());
        }
        payload.mention_count = Some(ack.mention_count.or(ack.badge_count).unwrap_or(0));
        if ack.flags.is_some() {
            payload.flags = ack.flags;
        }
        if ack.last_viewed.is_some() {
            payload.last_viewed = ack.last_viewed;
        }

        store(client, EventName::MessageAck, payload)
    }
}

/// Records when a channel's pins were last looked at.
#[derive(Debug, Clone, Copy, Default)]
pub struct ChannelPinsAckAction;

impl Action for ChannelPinsAckAction {
    fn event_type(&self) -> &'static str {
        "CHANNEL_PINS_ACK"
    }

    fn handle(&self, client: &mut Client, data: &Value) -> ActionResult {
        let Some(ack) = decode::<ChannelPinsAckPayload>(self.event_type(), data) else {
            return ActionResult::empty();
        };
        debug!(channel_id = %ack.channel_id, "Pins ack");

        let mut payload = current_payload(client, ack.channel_id);
        payload.last_pin_timestamp = ack.timestamp;

        store(client, EventName::ChannelPinsAck, payload)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::actions::test_support::{client, record};
    use crate::domain::entities::ReadStateFlags;
    use serde_json::json;

    #[test]
    fn test_message_ack_creates_read_state() {
        let mut client = client();
        let seen = record(&mut client, EventName::MessageAck);

        let result = client.dispatch(
            "MESSAGE_ACK",
            &json!({ "channel_id": "10", "message_id": "500", "badge_count": 2 }),
        );

        let state = result.read_state.unwrap();
        assert_eq!(state.kind(), ReadStateType::Channel);
        assert_eq!(state.last_acked_id(), Some(Snowflake(500)));
        assert_eq!(state.mention_count(), 2);
        assert_eq!(client.state().read_state(ChannelId(10)), Some(&state));
        assert_eq!(seen.lock().unwrap().len(), 1);
    }

    #[test]
    fn test_message_ack_keeps_unrelated_fields() {
        let mut client = client();
        client.dispatch(
            "MESSAGE_ACK",
            &json!({ "channel_id": "10", "message_id": "500", "mention_count": 4, "flags": 1, "last_viewed": 10 }),
        );
        client.dispatch(
            "CHANNEL_PINS_ACK",
            &json!({ "channel_id": "10", "timestamp": "2024-01-01T00:00:00.000Z" }),
        );

        let result = client.dispatch("MESSAGE_ACK", &json!({ "channel_id": "10", "message_id": "501" }));

        let state = result.read_state.unwrap();
        assert_eq!(state.last_acked_id(), Some(Snowflake(501)));
        assert_eq!(state.mention_count(), 0);
        assert_eq!(state.flags(), ReadStateFlags::IS_GUILD_CHANNEL);
        assert_eq!(state.last_viewed(), Some(10));
        assert!(state.last_pin_timestamp().is_some());
    }

    #[test]
    fn test_pins_ack_sets_timestamp_only() {
        let mut client = client();
        client.dispatch(
            "MESSAGE_ACK",
            &json!({ "channel_id": "10", "message_id": "500", "mention_count": 3 }),
        );
        let seen = record(&mut client, EventName::ChannelPinsAck);

        let result = client.dispatch(
            "CHANNEL_PINS_ACK",
            &json!({ "channel_id": "10", "timestamp": "2024-03-04T05:06:07.890Z" }),
        );

        let state = result.read_state.unwrap();
        assert_eq!(state.mention_count(), 3);
        assert_eq!(state.last_acked_id(), Some(Snowflake(500)));
        assert_eq!(
            state.last_pin_timestamp().map(|t| t.timestamp_millis()),
            Some(1_709_528_767_890)
        );
        assert_eq!(seen.lock().unwrap().len(), 1);
    }

    #[test]
    fn test_pins_ack_with_bad_timestamp() {
        let mut client = client();
        let result = client.dispatch(
            "CHANNEL_PINS_ACK",
            &json!({ "channel_id": "10", "timestamp": "yesterday" }),
        );

        assert_eq!(result.read_state.unwrap().last_pin_timestamp(), None);
    }

    #[test]
    fn test_ack_without_channel_is_empty() {
        let mut client = client();
        assert!(client.dispatch("MESSAGE_ACK", &json!({ "message_id": "1" })).is_empty());
        assert!(client.state().read_states().is_empty());
    }
}
