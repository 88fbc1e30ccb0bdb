//! /help command plugin.

use teloxide::prelude::*;
use teloxide::types::{ParseMode, ReplyParameters};

use crate::bot::dispatcher::ThrottledBot;

const HELP_TEXT: &str = "<b>📌 Pin summary</b>\n\n\
Just pin a message and it will be added to the summary. \
The summary lists every pin, newest first, with a link back to the original.\n\n\
<b>Buttons</b>\n\
• <b>➕ Edit</b> shows the controls\n\
• <b>❌ Unpin all</b> clears the summary\n\
• <b>Keep last 🔺</b> keeps only the newest pin\n\
• <b>1 📝</b>, <b>2 🖼</b>, ... remove a single pin\n\n\
Only members allowed to pin messages can use the buttons.\n\n\
If something doesn't work, make sure the bot is an administrator \
with the right to pin messages.";

/// Handle the /help command.
pub async fn help_handler(bot: ThrottledBot, msg: Message) -> anyhow::Result<()> {
    bot.send_message(msg.chat.id, HELP_TEXT)
        .parse_mode(ParseMode::Html)
        .reply_parameters(ReplyParameters::new(msg.id))
        .await?;

    Ok(())
}
