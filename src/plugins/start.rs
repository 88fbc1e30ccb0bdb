//! /start command plugin.

use teloxide::prelude::*;
use teloxide::types::ParseMode;

use crate::bot::dispatcher::ThrottledBot;

const START_TEXT: &str = "<b>Hi!</b> 👋\n\n\
Add me to a group as an administrator with the right to pin messages. \
Every message pinned there gets collected into one summary post.\n\n\
Use /help to learn more.";

/// Handle the /start command.
pub async fn start_handler(bot: ThrottledBot, msg: Message) -> anyhow::Result<()> {
    bot.send_message(msg.chat.id, START_TEXT)
        .parse_mode(ParseMode::Html)
        .await?;

    Ok(())
}
