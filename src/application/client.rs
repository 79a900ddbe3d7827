//! The client: registries, event bus and side-effect runner behind a single
//! dispatch entry point.

use std::fmt;
use std::sync::Arc;

use serde_json::Value;
use tokio::sync::mpsc;
use tracing::{debug, trace};

use crate::application::actions::{ActionRegistry, ActionResult};
use crate::application::events::{ClientEvent, EventBus, EventName};
use crate::application::side_effects::{SideEffectFailure, SideEffectRunner};
use crate::application::state::ClientState;
use crate::domain::entities::DEFAULT_MESSAGE_CACHE_SIZE;
use crate::domain::ports::RestPort;

/// Behavior switches for a [`Client`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClientOptions {
    /// Redeem gift codes found in incoming messages.
    pub auto_redeem_nitro: bool,
    /// Messages kept per channel; zero keeps everything.
    pub message_cache_size: usize,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            auto_redeem_nitro: false,
            message_cache_size: DEFAULT_MESSAGE_CACHE_SIZE,
        }
    }
}

/// Applies gateway dispatches to the local cache, one at a time.
pub struct Client {
    pub(crate) options: ClientOptions,
    pub(crate) state: ClientState,
    pub(crate) events: EventBus,
    pub(crate) effects: SideEffectRunner,
    pub(crate) rest: Arc<dyn RestPort>,
    actions: ActionRegistry,
    failures: Option<mpsc::UnboundedReceiver<SideEffectFailure>>,
}

impl Client {
    /// Creates a client with the built-in actions.
    ///
    /// Side effects run on the runtime current at construction time, or at
    /// scheduling time when there was none.
    #[must_use]
    pub fn new(options: ClientOptions, rest: Arc<dyn RestPort>) -> Self {
        Self::with_actions(options, rest, ActionRegistry::with_defaults())
    }

    /// Creates a client that routes through `actions` instead of the built-ins.
    #[must_use]
    pub fn with_actions(
        options: ClientOptions,
        rest: Arc<dyn RestPort>,
        actions: ActionRegistry,
    ) -> Self {
        let (effects, failures) = SideEffectRunner::new();
        Self {
            options,
            state: ClientState::new(options.message_cache_size),
            events: EventBus::new(),
            effects,
            rest,
            actions,
            failures: Some(failures),
        }
    }

    /// Routes `data` to the action registered for `event_type`.
    ///
    /// Unknown event types produce an empty result.
    pub fn dispatch(&mut self, event_type: &str, data: &Value) -> ActionResult {
        let Some(action) = self.actions.get(event_type) else {
            debug!(event_type, "No action for event");
            return ActionResult::empty();
        };

        trace!(event_type, "Dispatching");
        action.handle(self, data)
    }

    /// Registers a listener; see [`EventBus::on`].
    pub fn on<F>(&mut self, name: EventName, listener: F)
    where
        F: FnMut(&ClientEvent) + Send + 'static,
    {
        self.events.on(name, listener);
    }

    /// Hands out the receiving end of the side-effect failure sink.
    ///
    /// Returns `None` after the first call.
    pub fn take_side_effect_failures(
        &mut self,
    ) -> Option<mpsc::UnboundedReceiver<SideEffectFailure>> {
        self.failures.take()
    }

    /// Behavior switches.
    #[must_use]
    pub const fn options(&self) -> &ClientOptions {
        &self.options
    }

    /// Cached entities.
    #[must_use]
    pub const fn state(&self) -> &ClientState {
        &self.state
    }

    /// Mutable access to cached entities.
    pub fn state_mut(&mut self) -> &mut ClientState {
        &mut self.state
    }

    /// Event bus.
    #[must_use]
    pub const fn events(&self) -> &EventBus {
        &self.events
    }

    /// REST port shared with side effects.
    #[must_use]
    pub fn rest(&self) -> Arc<dyn RestPort> {
        Arc::clone(&self.rest)
    }

    /// Registered actions.
    #[must_use]
    pub const fn actions(&self) -> &ActionRegistry {
        &self.actions
    }
}

impl fmt::Debug for Client {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Client")
            .field("options", &self.options)
            .field("state", &self.state)
            .field("events", &self.events)
            .field("actions", &self.actions)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::{ChannelId, Snowflake};
    use crate::domain::ports::{RecordingRestPort, ResourceResolver};
    use serde_json::json;

    fn client() -> Client {
        Client::new(ClientOptions::default(), Arc::new(RecordingRestPort::new()))
    }

    #[test]
    fn test_unknown_event_is_empty() {
        let mut client = client();
        assert!(client.dispatch("TYPING_START", &json!({})).is_empty());
    }

    #[test]
    fn test_failures_handed_out_once() {
        let mut client = client();
        assert!(client.take_side_effect_failures().is_some());
        assert!(client.take_side_effect_failures().is_none());
    }

    #[test]
    fn test_cache_size_reaches_new_channels() {
        let options = ClientOptions {
            message_cache_size: 7,
            ..ClientOptions::default()
        };
        let mut client = Client::new(options, Arc::new(RecordingRestPort::new()));

        client.dispatch("CHANNEL_CREATE", &json!({ "id": "1", "type": 0 }));

        let channel = client.state().channel(ChannelId(1)).unwrap();
        assert_eq!(channel.messages().capacity(), Some(7));
    }

    #[tokio::test]
    async fn test_channel_read_state_delete_round_trip() {
        let rest = Arc::new(RecordingRestPort::new());
        let mut client = Client::new(ClientOptions::default(), rest.clone());
        client.dispatch("MESSAGE_ACK", &json!({ "channel_id": "12", "message_id": "3" }));

        let handle = client
            .state()
            .read_state(Snowflake(12))
            .and_then(|state| state.as_channel())
            .unwrap();
        tokio_test::assert_ok!(handle.delete(client.rest().as_ref()).await);

        assert_eq!(rest.acks(), vec![ChannelId(12)]);
        assert!(client.state().read_state(Snowflake(12)).is_some());
    }
}
