//! Pinned message events.

use teloxide::dispatching::UpdateHandler;
use teloxide::prelude::*;
use teloxide::types::MaybeInaccessibleMessage;
use tracing::debug;

use super::sent_by_bot;
use crate::bot::dispatcher::AppState;
use crate::pins::{PinNotification, PinSource};

/// Handler for "message pinned" service messages.
pub fn handler() -> UpdateHandler<anyhow::Error> {
    dptree::filter(|msg: Message| msg.pinned_message().is_some()).endpoint(on_pinned)
}

async fn on_pinned(msg: Message, state: AppState) -> anyhow::Result<()> {
    let Some(MaybeInaccessibleMessage::Regular(pinned)) = msg.pinned_message() else {
        debug!("Pinned message in chat {} is inaccessible", msg.chat.id);
        return Ok(());
    };
    let pinned: &Message = pinned;

    state
        .controller
        .on_pinned(PinNotification {
            chat_id: msg.chat.id.0,
            actor_is_bot: sent_by_bot(&msg),
            pinned: PinSource::from(pinned),
        })
        .await
}
