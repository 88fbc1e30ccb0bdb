//! Group activity.
//!
//! Any message a person writes in a group pushes the summary up the chat
//! history, so the next pin is posted as a fresh summary.

use teloxide::dispatching::UpdateHandler;
use teloxide::prelude::*;

use super::{in_group, sent_by_bot};
use crate::bot::dispatcher::AppState;
use crate::pins::UserMessage;

pub fn handler() -> UpdateHandler<anyhow::Error> {
    dptree::filter(|msg: Message| in_group(&msg) && !sent_by_bot(&msg)).endpoint(on_message)
}

async fn on_message(msg: Message, state: AppState) -> anyhow::Result<()> {
    state
        .controller
        .on_user_message(UserMessage {
            chat_id: Some(msg.chat.id.0),
        })
        .await
}
