use serde::Deserialize;
use serde_json::Value;
use tracing::{info, warn};

use super::guild::seed_guild;
use super::{Action, ActionResult};
use crate::application::client::Client;
use crate::application::events::{ClientEvent, EventName};
use crate::domain::entities::{Guild, Patchable, ReadStatePayload, User};

fn array<'a>(data: &'a Value, key: &str) -> &'a [Value] {
    data.get(key)
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or_default()
}

/// `read_state` arrives either as a bare list or as `{ "entries": [...] }`.
fn read_state_entries(data: &Value) -> &[Value] {
    match data.get("read_state") {
        Some(Value::Array(entries)) => entries.as_slice(),
        Some(wrapper) => array(wrapper, "entries"),
        None => &[],
    }
}

/// Seeds the registries from the session's initial snapshot.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReadyAction;

impl Action for ReadyAction {
    fn event_type(&self) -> &'static str {
        "READY"
    }

    fn handle(&self, client: &mut Client, data: &Value) -> ActionResult {
        let user = match data.get("user").map(User::from_payload) {
            Some(Ok(user)) => user,
            Some(Err(e)) => {
                warn!(error = %e, "READY carried a malformed user");
                return ActionResult::empty();
            }
            None => {
                warn!("READY without a user");
                return ActionResult::empty();
            }
        };
        let user_id = user.id();
        client.state.set_current_user(user);

        let mut guild_count = 0;
        for guild_data in array(data, "guilds") {
            match Guild::from_payload(guild_data) {
                Ok(guild) => {
                    seed_guild(&mut client.state, guild, guild_data);
                    guild_count += 1;
                }
                Err(e) => warn!(error = %e, "Skipping malformed guild"),
            }
        }

        for channel in array(data, "private_channels") {
            if let Err(e) = client.state.upsert_channel(channel, None) {
                warn!(error = %e, "Skipping malformed private channel");
            }
        }

        let mut read_states = 0;
        for entry in read_state_entries(data) {
            match ReadStatePayload::deserialize(entry) {
                Ok(payload) => {
                    client.state.apply_read_state(payload);
                    read_states += 1;
                }
                Err(e) => warn!(error = %e, "Skipping malformed read state"),
            }
        }

        info!(
            user_id = %user_id,
            guilds = guild_count,
            channels = client.state.channels().len(),
            read_states,
            "Session ready"
        );

        client.events.emit(
            EventName::Ready,
            &ClientEvent::Ready {
                user_id,
                guild_count,
            },
        );
        ActionResult::empty()
    }
}
