//! Inbound gateway event handlers.
//!
//! Each [`Action`] turns one dispatch payload into cache mutations, a result
//! and emitted events. Handlers never fail: payloads they cannot use produce
//! an empty [`ActionResult`].

mod channel;
mod guild;
mod message_create;
mod read_state_ack;
mod ready;

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::warn;

use crate::application::client::Client;
use crate::domain::entities::{ChannelId, GuildId, Message, ReadState};

pub use channel::{ChannelCreateAction, ChannelDeleteAction};
pub use guild::{GuildCreateAction, GuildDeleteAction};
pub use message_create::MessageCreateAction;
pub use read_state_ack::{ChannelPinsAckAction, MessageAckAction};
pub use ready::ReadyAction;

/// Handler for one gateway dispatch type.
pub trait Action: Send + Sync {
    /// Gateway event type this action is registered under.
    fn event_type(&self) -> &'static str;

    /// Applies `data` to `client`. Never fails; unusable payloads give an empty result.
    fn handle(&self, client: &mut Client, data: &Value) -> ActionResult;
}

/// What an action touched. Every key is absent in the empty result.
#[derive(Debug, Clone, Default)]
pub struct ActionResult {
    /// Message created or found.
    pub message: Option<Arc<Message>>,
    /// Read state after the update.
    pub read_state: Option<ReadState>,
    /// Channel touched.
    pub channel: Option<ChannelId>,
    /// Guild touched.
    pub guild: Option<GuildId>,
}

impl ActionResult {
    /// Result with every key absent.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Result carrying a message.
    #[must_use]
    pub fn message(message: Arc<Message>) -> Self {
        Self {
            message: Some(message),
            ..Self::default()
        }
    }

    /// Result carrying a read state.
    #[must_use]
    pub fn read_state(read_state: ReadState) -> Self {
        Self {
            read_state: Some(read_state),
            ..Self::default()
        }
    }

    /// Result naming a channel.
    #[must_use]
    pub fn channel(channel_id: ChannelId) -> Self {
        Self {
            channel: Some(channel_id),
            ..Self::default()
        }
    }

    /// Result naming a guild.
    #[must_use]
    pub fn guild(guild_id: GuildId) -> Self {
        Self {
            guild: Some(guild_id),
            ..Self::default()
        }
    }

    /// Returns true if no key is set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.message.is_none()
            && self.read_state.is_none()
            && self.channel.is_none()
            && self.guild.is_none()
    }
}

/// Actions keyed by gateway event type.
#[derive(Clone, Default)]
pub struct ActionRegistry {
    actions: HashMap<&'static str, Arc<dyn Action>>,
}

impl ActionRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with every built-in action.
    #[must_use]
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(ReadyAction);
        registry.register(MessageCreateAction);
        registry.register(MessageAckAction);
        registry.register(ChannelPinsAckAction);
        registry.register(ChannelCreateAction);
        registry.register(ChannelDeleteAction);
        registry.register(GuildCreateAction);
        registry.register(GuildDeleteAction);
        registry
    }

    /// Registers `action`, replacing any action with the same event type.
    pub fn register<A: Action + 'static>(&mut self, action: A) {
        self.actions.insert(action.event_type(), Arc::new(action));
    }

    /// Action registered for `event_type`.
    #[must_use]
    pub fn get(&self, event_type: &str) -> Option<Arc<dyn Action>> {
        self.actions.get(event_type).cloned()
    }

    /// Returns true if `event_type` has an action.
    #[must_use]
    pub fn contains(&self, event_type: &str) -> bool {
        self.actions.contains_key(event_type)
    }

    /// Number of registered actions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.actions.len()
    }

    /// Returns true if no key is set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }
}

impl fmt::Debug for ActionRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut types: Vec<_> = self.actions.keys().collect();
        types.sort_unstable();
        f.debug_struct("ActionRegistry")
            .field("actions", &types)
            .finish()
    }
}

/// Decodes `data` into `T`, logging and discarding payloads that don't fit.
fn decode<T: DeserializeOwned>(event_type: &str, data: &Value) -> Option<T> {
    match T::deserialize(data) {
        Ok(value) => Some(value),
        Err(e) => {
            warn!(event_type, error = %e, "Dropping malformed payload");
            None
        }
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::sync::{Arc, Mutex};

    use tokio::sync::mpsc;

    use crate::application::client::{Client, ClientOptions};
    use crate::application::events::{ClientEvent, EventName};
    use crate::application::side_effects::SideEffectFailure;
    use crate::domain::entities::{Channel, ChannelKind};
    use crate::domain::ports::{RecordingRestPort, RestPort};

    /// Builds a client with one text channel (id 10) and a second, non-text
    /// channel (id 20).
    pub fn client_with(
        options: ClientOptions,
        rest: Arc<dyn RestPort>,
    ) -> (Client, mpsc::UnboundedReceiver<SideEffectFailure>) {
        let mut client = Client::new(options, rest);
        client
            .state_mut()
            .insert_channel(Channel::new(10_u64, ChannelKind::Text).with_guild(1_u64));
        client
            .state_mut()
            .insert_channel(Channel::new(20_u64, ChannelKind::Category).with_guild(1_u64));
        let failures = client
            .take_side_effect_failures()
            .expect("fresh client owns its failure sink");
        (client, failures)
    }

    pub fn client() -> Client {
        client_with(ClientOptions::default(), Arc::new(RecordingRestPort::new())).0
    }

    /// Collects every event delivered under `name`.
    pub fn record(client: &mut Client, name: EventName) -> Arc<Mutex<Vec<ClientEvent>>> {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        client.on(name, move |event| sink.lock().unwrap().push(event.clone()));
        seen
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    struct Noop;

    impl Action for Noop {
        fn event_type(&self) -> &'static str {
            "MESSAGE_CREATE"
        }

        fn handle(&self, _client: &mut Client, _data: &Value) -> ActionResult {
            ActionResult::guild(GuildId(1))
        }
    }

    #[test]
    fn test_defaults_cover_builtin_events() {
        let registry = ActionRegistry::with_defaults();

        for event_type in [
            "READY",
            "MESSAGE_CREATE",
            "MESSAGE_ACK",
            "CHANNEL_PINS_ACK",
            "CHANNEL_CREATE",
            "CHANNEL_DELETE",
            "GUILD_CREATE",
            "GUILD_DELETE",
        ] {
            assert!(registry.contains(event_type), "{event_type} missing");
        }
        assert_eq!(registry.len(), 8);
    }

    #[test]
    fn test_register_replaces() {
        let mut registry = ActionRegistry::with_defaults();
        registry.register(Noop);

        let mut client = test_support::client();
        let action = registry.get("MESSAGE_CREATE").unwrap();
        let result = action.handle(&mut client, &json!({}));
        assert_eq!(result.guild, Some(GuildId(1)));
        assert_eq!(registry.len(), 8);
    }

    #[test]
    fn test_empty_result() {
        assert!(ActionResult::empty().is_empty());
        assert!(!ActionResult::channel(ChannelId(1)).is_empty());
    }

    #[test]
    fn test_decode_rejects_wrong_shape() {
        assert!(decode::<ChannelId>("TEST", &json!({ "nope": true })).is_none());
        assert_eq!(decode::<ChannelId>("TEST", &json!("5")), Some(ChannelId(5)));
    }
}
