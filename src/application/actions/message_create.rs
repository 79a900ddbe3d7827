use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, trace, warn};

use super::{Action, ActionResult, decode};
use crate::application::client::Client;
use crate::application::events::{ClientEvent, EventName};
use crate::application::services::GiftCodeScanner;
use crate::domain::entities::{Message, MessageRef, Patchable};
use crate::domain::ports::ResourceResolver;

/// Caches a newly posted message and announces it.
///
/// Re-delivery of a cached id returns the cached instance without emitting
/// anything.
#[derive(Debug, Clone, Copy, Default)]
pub struct MessageCreateAction;

impl Action for MessageCreateAction {
    fn event_type(&self) -> &'static str {
        "MESSAGE_CREATE"
    }

    fn handle(&self, client: &mut Client, data: &Value) -> ActionResult {
        let Some(target) = decode::<MessageRef>(self.event_type(), data) else {
            return ActionResult::empty();
        };

        let Some(channel) = client.state.channel_mut(target.channel_id) else {
            debug!(channel_id = %target.channel_id, message_id = %target.id, "Message for unknown channel");
            return ActionResult::empty();
        };

        if !channel.is_text_based() {
            debug!(channel_id = %target.channel_id, kind = ?channel.kind(), "Message for non-text channel");
            return ActionResult::empty();
        }

        if let Some(existing) = channel.messages().get(&target.id) {
            trace!(message_id = %target.id, "Message already cached");
            return ActionResult::message(Arc::clone(existing));
        }

        let message = match Message::from_payload(data) {
            Ok(message) => Arc::new(message),
            Err(e) => {
                warn!(message_id = %target.id, error = %e, "Dropping malformed message");
                return ActionResult::empty();
            }
        };

        if let Some((evicted, _)) = channel
            .messages_mut()
            .insert(message.id(), Arc::clone(&message))
        {
            trace!(channel_id = %target.channel_id, evicted = %evicted, "Evicted oldest message");
        }
        channel.set_last_message_id(message.id());

        if client.options.auto_redeem_nitro {
            schedule_redemptions(client, &message);
        }

        let event = ClientEvent::Message(Arc::clone(&message));
        client
            .events
            .emit_with_alias(EventName::MessageCreate, EventName::Message, &event);

        ActionResult::message(message)
    }
}

fn schedule_redemptions(client: &Client, message: &Message) {
    let Some(content) = message.content().filter(|c| !c.is_empty()) else {
        return;
    };

    let channel_id = message.channel_id();
    for code in GiftCodeScanner::scan(content) {
        debug!(code = %code, channel_id = %channel_id, "Redeeming gift code");
        let rest = Arc::clone(&client.rest);
        let task = format!("redeem gift {code}");
        client.effects.schedule(task, async move {
            rest.redeem_gift(&code, channel_id).await
        });
    }
}
