//! Application layer: the client, its actions and the event plumbing.

/// Gateway event handlers.
pub mod actions;
/// Client entry point.
pub mod client;
/// Event bus and event payloads.
pub mod events;
/// Application services.
pub mod services;
/// Fire-and-forget side effects.
pub mod side_effects;
/// Entity registries.
pub mod state;

pub use actions::{Action, ActionRegistry, ActionResult};
pub use client::{Client, ClientOptions};
pub use events::{ClientEvent, EventBus, EventName, ProcessWarning};
pub use side_effects::{SideEffectError, SideEffectFailure, SideEffectRunner};
pub use state::ClientState;
