//! Telegram implementation of the controller's outbound actions.

use async_trait::async_trait;
use teloxide::prelude::*;
use teloxide::types::{
    ChatId, InlineKeyboardButton, InlineKeyboardMarkup, LinkPreviewOptions, MessageId, ParseMode,
    UserId,
};

use super::dispatcher::ThrottledBot;
use crate::permissions::Permissions;
use crate::pins::{ButtonLayout, PinApi, PinRights, Post};

/// Sends summaries through the throttled bot.
#[derive(Clone)]
pub struct TelegramApi {
    bot: ThrottledBot,
    permissions: Permissions,
}

impl TelegramApi {
    pub fn new(bot: ThrottledBot, permissions: Permissions) -> Self {
        Self { bot, permissions }
    }
}

fn no_link_preview() -> LinkPreviewOptions {
    LinkPreviewOptions {
        is_disabled: true,
        url: None,
        prefer_small_media: false,
        prefer_large_media: false,
        show_above_text: false,
    }
}

/// Turn a button layout into an inline keyboard.
fn keyboard(layout: &ButtonLayout) -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(layout.iter().map(|row| {
        row.iter()
            .map(|button| {
                InlineKeyboardButton::callback(button.label.clone(), button.action.to_string())
            })
            .collect::<Vec<_>>()
    }))
}

#[async_trait]
impl PinApi for TelegramApi {
    async fn send_post(&self, chat_id: i64, post: &Post) -> anyhow::Result<i32> {
        let sent = self
            .bot
            .send_message(ChatId(chat_id), post.text.clone())
            .parse_mode(ParseMode::Html)
            .link_preview_options(no_link_preview())
            .reply_markup(keyboard(&post.layout))
            .await?;

        Ok(sent.id.0)
    }

    async fn edit_post(&self, chat_id: i64, message_id: i32, post: &Post) -> anyhow::Result<()> {
        self.bot
            .edit_message_text(ChatId(chat_id), MessageId(message_id), post.text.clone())
            .parse_mode(ParseMode::Html)
            .link_preview_options(no_link_preview())
            .reply_markup(keyboard(&post.layout))
            .await?;

        Ok(())
    }

    async fn delete_message(&self, chat_id: i64, message_id: i32) -> anyhow::Result<()> {
        self.bot
            .delete_message(ChatId(chat_id), MessageId(message_id))
            .await?;
        Ok(())
    }

    async fn pin_silently(&self, chat_id: i64, message_id: i32) -> anyhow::Result<()> {
        self.bot
            .pin_chat_message(ChatId(chat_id), MessageId(message_id))
            .disable_notification(true)
            .await?;
        Ok(())
    }

    async fn unpin_message(&self, chat_id: i64, message_id: i32) -> anyhow::Result<()> {
        self.bot
            .unpin_chat_message(ChatId(chat_id))
            .message_id(MessageId(message_id))
            .await?;
        Ok(())
    }

    async fn pin_rights(&self, chat_id: i64, user_id: u64) -> anyhow::Result<PinRights> {
        self.permissions
            .pin_rights(ChatId(chat_id), UserId(user_id))
            .await
    }
}
