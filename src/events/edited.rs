//! Edited message events.

use teloxide::dispatching::UpdateHandler;
use teloxide::prelude::*;

use super::in_group;
use crate::bot::dispatcher::AppState;
use crate::pins::{MessageEdited, PinSource};

pub fn handler() -> UpdateHandler<anyhow::Error> {
    dptree::filter(|msg: Message| in_group(&msg)).endpoint(on_edited)
}

async fn on_edited(msg: Message, state: AppState) -> anyhow::Result<()> {
    state
        .controller
        .on_edited(MessageEdited {
            chat_id: msg.chat.id.0,
            message: PinSource::from(&msg),
        })
        .await
}
