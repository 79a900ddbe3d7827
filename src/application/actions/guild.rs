use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, warn};

use super::{Action, ActionResult, decode};
use crate::application::client::Client;
use crate::application::events::{ClientEvent, EventName};
use crate::application::state::ClientState;
use crate::domain::entities::{Guild, GuildId, Patchable};

#[derive(Debug, Deserialize)]
struct GuildRef {
    id: GuildId,
    #[serde(default)]
    unavailable: bool,
}

/// Caches `guild` and the channels listed in its payload.
///
/// Returns how many channels were accepted.
pub(super) fn seed_guild(state: &mut ClientState, guild: Guild, data: &Value) -> usize {
    let guild_id = guild.id();
    state.insert_guild(guild);

    let Some(channels) = data.get("channels").and_then(Value::as_array) else {
        return 0;
    };

    channels
        .iter()
        .filter(|channel| match state.upsert_channel(channel, Some(guild_id)) {
            Ok(_) => true,
            Err(e) => {
                warn!(guild_id = %guild_id, error = %e, "Skipping malformed guild channel");
                false
            }
        })
        .count()
}

/// Caches a guild that became available or was joined.
#[derive(Debug, Clone, Copy, Default)]
pub struct GuildCreateAction;

impl Action for GuildCreateAction {
    fn event_type(&self) -> &'static str {
        "GUILD_CREATE"
    }

    fn handle(&self, client: &mut Client, data: &Value) -> ActionResult {
        let guild = match Guild::from_payload(data) {
            Ok(guild) => guild,
            Err(e) => {
                warn!(event_type = self.event_type(), error = %e, "Dropping malformed guild");
                return ActionResult::empty();
            }
        };
        let guild_id = guild.id();

        let channels = seed_guild(&mut client.state, guild.clone(), data);
        debug!(guild_id = %guild_id, channels, "Guild cached");

        client
            .events
            .emit(EventName::GuildCreate, &ClientEvent::Guild(guild));
        ActionResult::guild(guild_id)
    }
}

/// Handles leaving a guild, or the guild going into an outage.
///
/// An outage keeps the guild's channels and only marks it unavailable.
#[derive(Debug, Clone, Copy, Default)]
pub struct GuildDeleteAction;

impl Action for GuildDeleteAction {
    fn event_type(&self) -> &'static str {
        "GUILD_DELETE"
    }

    fn handle(&self, client: &mut Client, data: &Value) -> ActionResult {
        let Some(target) = decode::<GuildRef>(self.event_type(), data) else {
            return ActionResult::empty();
        };

        let guild = if target.unavailable {
            let Some(known) = client.state.guilds().get(&target.id) else {
                debug!(guild_id = %target.id, "Outage for unknown guild");
                return ActionResult::empty();
            };
            let mut outage = known.clone();
            outage.mark_unavailable();
            client.state.insert_guild(outage.clone());
            debug!(guild_id = %target.id, "Guild unavailable");
            outage
        } else {
            let (guild, channels) = client.state.remove_guild(target.id);
            let Some(guild) = guild else {
                debug!(guild_id = %target.id, "Delete for unknown guild");
                return ActionResult::empty();
            };
            debug!(guild_id = %target.id, channels, "Guild removed");
            guild
        };

        client
            .events
            .emit(EventName::GuildDelete, &ClientEvent::Guild(guild));
        ActionResult::guild(target.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::actions::test_support::{client, record};
    use crate::domain::entities::ChannelId;
    use crate::domain::ports::ResourceResolver;
    use serde_json::json;

    fn guild_payload() -> Value {
        json!({
            "id": "2",
            "name": "Rustaceans",
            "channels": [
                { "id": "40", "type": 0, "name": "general" },
                { "id": "41", "type": 2, "name": "voice" },
                { "type": 0 }
            ]
        })
    }

    #[test]
    fn test_create_seeds_channels() {
        let mut client = client();
        let seen = record(&mut client, EventName::GuildCreate);

        let result = client.dispatch("GUILD_CREATE", &guild_payload());

        assert_eq!(result.guild, Some(GuildId(2)));
        assert_eq!(client.state().guild(GuildId(2)).unwrap().name(), "Rustaceans");
        let channel = client.state().channel(ChannelId(40)).unwrap();
        assert_eq!(channel.guild_id(), Some(GuildId(2)));
        assert!(client.state().channel(ChannelId(41)).is_some());
        assert_eq!(seen.lock().unwrap().len(), 1);
    }

    #[test]
    fn test_delete_removes_guild_channels() {
        let mut client = client();
        client.dispatch("GUILD_CREATE", &guild_payload());
        let seen = record(&mut client, EventName::GuildDelete);

        let result = client.dispatch("GUILD_DELETE", &json!({ "id": "2" }));

        assert_eq!(result.guild, Some(GuildId(2)));
        assert!(client.state().guild(GuildId(2)).is_none());
        assert!(client.state().channel(ChannelId(40)).is_none());
        assert!(client.state().channel(ChannelId(10)).is_some());
        assert_eq!(seen.lock().unwrap().len(), 1);
    }

    #[test]
    fn test_outage_keeps_channels() {
        let mut client = client();
        client.dispatch("GUILD_CREATE", &guild_payload());

        let result = client.dispatch("GUILD_DELETE", &json!({ "id": "2", "unavailable": true }));

        assert_eq!(result.guild, Some(GuildId(2)));
        let guild = client.state().guild(GuildId(2)).unwrap();
        assert!(guild.is_unavailable());
        assert_eq!(guild.name(), "Rustaceans");
        assert!(client.state().channel(ChannelId(40)).is_some());
    }

    #[test]
    fn test_delete_unknown_is_empty() {
        let mut client = client();
        assert!(client.dispatch("GUILD_DELETE", &json!({ "id": "404" })).is_empty());
    }
}
