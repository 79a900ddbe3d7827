use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, warn};

use super::{Action, ActionResult, decode};
use crate::application::client::Client;
use crate::application::events::{ClientEvent, EventName};
use crate::domain::entities::{ChannelId, GuildId};
use crate::domain::ports::ResourceResolver;

#[derive(Debug, Deserialize)]
struct ChannelRef {
    id: ChannelId,
    #[serde(default)]
    guild_id: Option<GuildId>,
}

/// Caches a channel the client has not seen yet.
#[derive(Debug, Clone, Copy, Default)]
pub struct ChannelCreateAction;

impl Action for ChannelCreateAction {
    fn event_type(&self) -> &'static str {
        "CHANNEL_CREATE"
    }

    fn handle(&self, client: &mut Client, data: &Value) -> ActionResult {
        let Some(target) = decode::<ChannelRef>(self.event_type(), data) else {
            return ActionResult::empty();
        };

        if client.state.channel(target.id).is_some() {
            debug!(channel_id = %target.id, "Channel already cached");
            return ActionResult::channel(target.id);
        }

        if let Err(e) = client.state.upsert_channel(data, target.guild_id) {
            warn!(channel_id = %target.id, error = %e, "Dropping malformed channel");
            return ActionResult::empty();
        }

        let Some(channel) = client.state.channel(target.id) else {
            return ActionResult::empty();
        };
        let event = ClientEvent::Channel {
            channel_id: channel.id(),
            guild_id: channel.guild_id(),
            kind: channel.kind(),
        };
        client.events.emit(EventName::ChannelCreate, &event);

        ActionResult::channel(target.id)
    }
}

/// Drops a channel and every message cached for it.
#[derive(Debug, Clone, Copy, Default)]
pub struct ChannelDeleteAction;

impl Action for ChannelDeleteAction {
    fn event_type(&self) -> &'static str {
        "CHANNEL_DELETE"
    }

    fn handle(&self, client: &mut Client, data: &Value) -> ActionResult {
        let Some(target) = decode::<ChannelRef>(self.event_type(), data) else {
            return ActionResult::empty();
        };

        let Some(channel) = client.state.remove_channel(target.id) else {
            debug!(channel_id = %target.id, "Delete for unknown channel");
            return ActionResult::empty();
        };
        debug!(channel_id = %target.id, messages = channel.messages().len(), "Channel removed");

        let event = ClientEvent::Channel {
            channel_id: channel.id(),
            guild_id: channel.guild_id(),
            kind: channel.kind(),
        };
        client.events.emit(EventName::ChannelDelete, &event);

        ActionResult::channel(target.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::actions::test_support::{client, record};
    use crate::domain::entities::ChannelKind;
    use serde_json::json;

    #[test]
    fn test_create_inserts_once() {
        let mut client = client();
        let seen = record(&mut client, EventName::ChannelCreate);
        let data = json!({ "id": "30", "type": 11, "guild_id": "1", "name": "thread" });

        let first = client.dispatch("CHANNEL_CREATE", &data);
        let second = client.dispatch("CHANNEL_CREATE", &data);

        assert_eq!(first.channel, Some(ChannelId(30)));
        assert_eq!(second.channel, Some(ChannelId(30)));
        assert_eq!(seen.lock().unwrap().len(), 1);

        let channel = client.state().channel(ChannelId(30)).unwrap();
        assert_eq!(channel.kind(), ChannelKind::PublicThread);
        assert_eq!(channel.guild_id(), Some(GuildId(1)));
    }

    #[test]
    fn test_created_channel_accepts_messages() {
        let mut client = client();
        client.dispatch("CHANNEL_CREATE", &json!({ "id": "31", "type": 1 }));

        let result = client.dispatch(
            "MESSAGE_CREATE",
            &json!({ "id": "900", "channel_id": "31", "content": "dm" }),
        );
        assert!(result.message.is_some());
    }

    #[test]
    fn test_delete_removes_messages() {
        let mut client = client();
        client.dispatch(
            "MESSAGE_CREATE",
            &json!({ "id": "900", "channel_id": "10", "content": "bye" }),
        );
        let seen = record(&mut client, EventName::ChannelDelete);

        let result = client.dispatch("CHANNEL_DELETE", &json!({ "id": "10", "type": 0 }));

        assert_eq!(result.channel, Some(ChannelId(10)));
        assert!(client.state().channel(ChannelId(10)).is_none());
        assert_eq!(seen.lock().unwrap().len(), 1);

        let late = client.dispatch(
            "MESSAGE_CREATE",
            &json!({ "id": "901", "channel_id": "10", "content": "late" }),
        );
        assert!(late.is_empty());
    }

    #[test]
    fn test_delete_unknown_is_empty() {
        let mut client = client();
        assert!(client.dispatch("CHANNEL_DELETE", &json!({ "id": "404" })).is_empty());
    }
}
