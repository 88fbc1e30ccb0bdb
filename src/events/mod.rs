//! Event handlers.
//!
//! Each handler turns one kind of Telegram update into a pin controller
//! event:
//!
//! - `pinned` - "message pinned" service messages
//! - `buttons` - presses on the summary buttons
//! - `edited` - edits of messages that may be pinned
//! - `activity` - ordinary group messages

pub mod activity;
pub mod buttons;
pub mod edited;
pub mod pinned;

use teloxide::types::Message;

/// Whether a bot, this one included, sent the message.
fn sent_by_bot(msg: &Message) -> bool {
    msg.from.as_ref().is_some_and(|user| user.is_bot)
}

fn in_group(msg: &Message) -> bool {
    msg.chat.is_group() || msg.chat.is_supergroup()
}
