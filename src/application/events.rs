//! Synchronous client event bus.
//!
//! Listeners run in registration order, inside the `emit` call, before the
//! next event is dispatched.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use tracing::warn;

use crate::domain::entities::{ChannelId, ChannelKind, Guild, GuildId, Message, ReadState, UserId};

/// Names listeners subscribe to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventName {
    Ready,
    MessageCreate,
    /// Deprecated alias of [`EventName::MessageCreate`].
    Message,
    MessageAck,
    ChannelPinsAck,
    ChannelCreate,
    ChannelDelete,
    GuildCreate,
    GuildDelete,
    /// Process-level warnings such as deprecation notices.
    Warning,
}

impl EventName {
    /// Listener-facing event name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Ready => "ready",
            Self::MessageCreate => "messageCreate",
            Self::Message => "message",
            Self::MessageAck => "messageAck",
            Self::ChannelPinsAck => "channelPinsAck",
            Self::ChannelCreate => "channelCreate",
            Self::ChannelDelete => "channelDelete",
            Self::GuildCreate => "guildCreate",
            Self::GuildDelete => "guildDelete",
            Self::Warning => "warning",
        }
    }
}

impl fmt::Display for EventName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A warning meant for whoever runs the process, not for a single caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessWarning {
    /// Warning category, e.g. `DeprecationWarning`.
    pub category: &'static str,
    /// Human-readable notice.
    pub message: String,
}

impl ProcessWarning {
    /// Category used for deprecation notices.
    pub const DEPRECATION: &'static str = "DeprecationWarning";

    /// Notice for a listener still subscribed to a deprecated alias.
    #[must_use]
    pub fn deprecated_alias(alias: EventName, canonical: EventName) -> Self {
        Self {
            category: Self::DEPRECATION,
            message: format!("The {alias} event is deprecated. Use {canonical} instead"),
        }
    }
}

/// Payload handed to listeners.
#[derive(Debug, Clone)]
#[allow(missing_docs)]
pub enum ClientEvent {
    Ready {
        user_id: UserId,
        guild_count: usize,
    },
    Message(Arc<Message>),
    ReadState(ReadState),
    Channel {
        channel_id: ChannelId,
        guild_id: Option<GuildId>,
        kind: ChannelKind,
    },
    Guild(Guild),
    Warning(ProcessWarning),
}

impl ClientEvent {
    /// The message carried by this event, if any.
    #[must_use]
    pub fn message(&self) -> Option<&Arc<Message>> {
        match self {
            Self::Message(message) => Some(message),
            _ => None,
        }
    }
}

type Listener = Box<dyn FnMut(&ClientEvent) + Send>;

/// Ordered fan-out of named events.
///
/// The one-shot deprecation flag lives here, so two clients in one process
/// warn independently.
#[derive(Default)]
pub struct EventBus {
    listeners: HashMap<EventName, Vec<Listener>>,
    deprecation_emitted: bool,
}

impl EventBus {
    /// Creates a bus with no listeners.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `listener` for `name`, after any existing listeners.
    pub fn on<F>(&mut self, name: EventName, listener: F)
    where
        F: FnMut(&ClientEvent) + Send + 'static,
    {
        self.listeners
            .entry(name)
            .or_default()
            .push(Box::new(listener));
    }

    /// Drops every listener registered for `name`.
    pub fn remove_all(&mut self, name: EventName) {
        self.listeners.remove(&name);
    }

    /// Number of listeners registered for `name`.
    #[must_use]
    pub fn listener_count(&self, name: EventName) -> usize {
        self.listeners.get(&name).map_or(0, Vec::len)
    }

    /// Calls every listener for `name` in registration order.
    ///
    /// Returns true if at least one listener ran.
    pub fn emit(&mut self, name: EventName, event: &ClientEvent) -> bool {
        let Some(listeners) = self.listeners.get_mut(&name) else {
            return false;
        };

        for listener in listeners.iter_mut() {
            listener(event);
        }
        !listeners.is_empty()
    }

    /// Emits `event` under `canonical`, then under the deprecated `alias`.
    ///
    /// The first time an alias listener actually runs, a single deprecation
    /// warning is raised for the lifetime of this bus.
    pub fn emit_with_alias(&mut self, canonical: EventName, alias: EventName, event: &ClientEvent) {
        self.emit(canonical, event);

        if self.emit(alias, event) && !self.deprecation_emitted {
            self.deprecation_emitted = true;
            self.warn(ProcessWarning::deprecated_alias(alias, canonical));
        }
    }

    /// Logs `warning` and delivers it to [`EventName::Warning`] listeners.
    pub fn warn(&mut self, warning: ProcessWarning) {
        warn!(category = warning.category, "{}", warning.message);
        self.emit(EventName::Warning, &ClientEvent::Warning(warning));
    }

    /// Returns true once the deprecation notice has gone out.
    #[must_use]
    pub const fn deprecation_emitted(&self) -> bool {
        self.deprecation_emitted
    }
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let counts: HashMap<&str, usize> = self
            .listeners
            .iter()
            .map(|(name, listeners)| (name.as_str(), listeners.len()))
            .collect();

        f.debug_struct("EventBus")
            .field("listeners", &counts)
            .field("deprecation_emitted", &self.deprecation_emitted)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    fn ready() -> ClientEvent {
        ClientEvent::Ready {
            user_id: UserId(1),
            guild_count: 0,
        }
    }

    #[test]
    fn test_listeners_run_in_registration_order() {
        let order = Arc::new(Mutex::new(Vec::new()));
        let mut bus = EventBus::new();

        for tag in ["first", "second", "third"] {
            let order = Arc::clone(&order);
            bus.on(EventName::Ready, move |_| order.lock().unwrap().push(tag));
        }

        assert!(bus.emit(EventName::Ready, &ready()));
        assert_eq!(*order.lock().unwrap(), vec!["first", "second", "third"]);
    }

    #[test]
    fn test_emit_without_listeners() {
        let mut bus = EventBus::new();
        assert!(!bus.emit(EventName::Ready, &ready()));
    }

    #[test]
    fn test_emit_only_reaches_named_listeners() {
        let hits = Arc::new(Mutex::new(0));
        let mut bus = EventBus::new();
        let counter = Arc::clone(&hits);
        bus.on(EventName::GuildCreate, move |_| *counter.lock().unwrap() += 1);

        bus.emit(EventName::Ready, &ready());
        assert_eq!(*hits.lock().unwrap(), 0);
    }

    #[test]
    fn test_alias_warns_once() {
        let warnings = Arc::new(Mutex::new(Vec::new()));
        let mut bus = EventBus::new();
        bus.on(EventName::Message, |_| {});
        let sink = Arc::clone(&warnings);
        bus.on(EventName::Warning, move |event| {
            if let ClientEvent::Warning(w) = event {
                sink.lock().unwrap().push(w.clone());
            }
        });

        for _ in 0..3 {
            bus.emit_with_alias(EventName::MessageCreate, EventName::Message, &ready());
        }

        let warnings = warnings.lock().unwrap();
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].category, "DeprecationWarning");
        assert_eq!(
            warnings[0].message,
            "The message event is deprecated. Use messageCreate instead"
        );
    }

    #[test]
    fn test_alias_without_listener_does_not_warn() {
        let mut bus = EventBus::new();
        bus.on(EventName::MessageCreate, |_| {});

        bus.emit_with_alias(EventName::MessageCreate, EventName::Message, &ready());
        assert!(!bus.deprecation_emitted());
    }

    #[test]
    fn test_buses_warn_independently() {
        let mut a = EventBus::new();
        let mut b = EventBus::new();
        a.on(EventName::Message, |_| {});
        b.on(EventName::Message, |_| {});

        a.emit_with_alias(EventName::MessageCreate, EventName::Message, &ready());
        assert!(a.deprecation_emitted());
        assert!(!b.deprecation_emitted());
    }

    #[test]
    fn test_remove_all() {
        let mut bus = EventBus::new();
        bus.on(EventName::Ready, |_| {});
        bus.remove_all(EventName::Ready);
        assert_eq!(bus.listener_count(EventName::Ready), 0);
    }
}
