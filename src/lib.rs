//! Oxicord reconcile - the incoming-event layer of a Discord client.
//!
//! This crate applies gateway dispatches to an in-memory cache of channels,
//! guilds, messages and read states, emits client events for each change,
//! and runs fire-and-forget REST side effects such as gift code redemption.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

/// Application layer containing the client, actions and event bus.
pub mod application;
/// Domain layer containing entities, errors, and port definitions.
pub mod domain;
/// Infrastructure layer containing adapters for external services.
pub mod infrastructure;

/// Current version of the application.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name.
pub const NAME: &str = "oxicord-reconcile";
