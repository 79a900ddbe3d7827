//! Discord adapters: REST calls and gateway frame decoding.

mod client;
mod dto;
/// Gateway frame decoding.
pub mod frames;

pub use client::DiscordRestClient;
pub use frames::{FrameError, GatewayFrame};
