//! Per-chat pin controller.
//!
//! Each chat is in one of two states: it has no summary, or it has a summary
//! the bot can edit. Orthogonal to that, a chat may be awaiting a resend
//! because people wrote after the summary was posted, in which case the next
//! publish sends a fresh summary at the bottom of the chat instead of editing
//! the old one.
//!
//! Every handler runs under the lock of its chat, so a store update and the
//! outbound calls that follow it are never interleaved with another event of
//! the same chat.

use std::sync::Arc;

use anyhow::Result;
use tracing::{debug, info, warn};

use super::api::PinApi;
use super::payload::ButtonAction;
use super::record::{PinRecord, PinSource};
use super::render::{ButtonStatus, Post, render_summary};
use crate::lock::KeyedLock;
use crate::store::PinStore;

/// A message was pinned in a chat.
#[derive(Debug, Clone)]
pub struct PinNotification {
    pub chat_id: i64,
    /// Whoever pinned it is a bot, this one included.
    pub actor_is_bot: bool,
    pub pinned: PinSource,
}

/// A summary button was pressed.
#[derive(Debug, Clone, Copy)]
pub struct ButtonPress {
    pub chat_id: i64,
    pub user_id: u64,
    pub action: ButtonAction,
}

#[derive(Debug, Clone)]
pub struct MessageEdited {
    pub chat_id: i64,
    pub message: PinSource,
}

/// Someone other than a bot wrote a message.
#[derive(Debug, Clone, Copy)]
pub struct UserMessage {
    pub chat_id: Option<i64>,
}

/// How a button press ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ButtonOutcome {
    /// The chat has no summary any more.
    Ignored,
    /// The user may not change pins.
    Denied,
    /// The summary was edited.
    Updated,
    /// The last pin went away, so did the summary.
    Removed,
}

pub struct PinController {
    store: Arc<dyn PinStore>,
    api: Arc<dyn PinApi>,
    locks: KeyedLock<i64>,
}

impl PinController {
    pub fn new(store: Arc<dyn PinStore>, api: Arc<dyn PinApi>) -> Self {
        Self {
            store,
            api,
            locks: KeyedLock::new(),
        }
    }

    pub async fn on_pinned(&self, event: PinNotification) -> Result<()> {
        self.locks
            .with_lock(event.chat_id, || self.pinned(event))
            .await?
    }

    pub async fn on_button(&self, press: ButtonPress) -> Result<ButtonOutcome> {
        self.locks
            .with_lock(press.chat_id, || self.button(press))
            .await?
    }

    pub async fn on_edited(&self, event: MessageEdited) -> Result<()> {
        self.locks
            .with_lock(event.chat_id, || self.edited(event))
            .await?
    }

    pub async fn on_user_message(&self, event: UserMessage) -> Result<()> {
        let Some(chat_id) = event.chat_id else {
            return Ok(());
        };

        self.locks
            .with_lock(chat_id, || async {
                self.store.mark_human_message(chat_id).await
            })
            .await??;

        Ok(())
    }

    async fn pinned(&self, event: PinNotification) -> Result<()> {
        let chat_id = event.chat_id;

        if event.actor_is_bot {
            debug!("Ignoring pin by a bot in chat {}", chat_id);
            return Ok(());
        }

        if self.store.editable_id(chat_id).await? == Some(event.pinned.id) {
            debug!("Ignoring re-pin of the summary in chat {}", chat_id);
            return Ok(());
        }

        let record = PinRecord::from_source(&event.pinned);
        debug!("New {:?} pin {} in chat {}", record.kind, record.id, chat_id);
        self.store.add_pin(chat_id, record).await?;

        self.publish(chat_id).await
    }

    /// Bring the summary up to date after a new pin.
    async fn publish(&self, chat_id: i64) -> Result<()> {
        let post = self.render(chat_id, ButtonStatus::Collapsed).await?;
        let previous = self.store.editable_id(chat_id).await?;

        if let Some(message_id) = previous
            && !self.store.needs_resend(chat_id).await?
        {
            self.api.edit_post(chat_id, message_id, &post).await?;
            self.api.pin_silently(chat_id, message_id).await?;
            return Ok(());
        }

        let message_id = self.api.send_post(chat_id, &post).await?;
        self.store.set_editable_id(chat_id, message_id).await?;
        self.api.pin_silently(chat_id, message_id).await?;
        info!("Posted summary {} in chat {}", message_id, chat_id);

        if let Some(old) = previous
            && let Err(e) = self.api.delete_message(chat_id, old).await
        {
            warn!("Failed to delete old summary {} in chat {}: {}", old, chat_id, e);
        }

        Ok(())
    }

    async fn button(&self, press: ButtonPress) -> Result<ButtonOutcome> {
        let chat_id = press.chat_id;

        let Some(summary_id) = self.store.editable_id(chat_id).await? else {
            debug!("Button {} pressed in chat {} without a summary", press.action, chat_id);
            return Ok(ButtonOutcome::Ignored);
        };

        let rights = self.api.pin_rights(chat_id, press.user_id).await?;
        if !rights.allows_edit() {
            debug!("User {} may not edit pins in chat {}", press.user_id, chat_id);
            return Ok(ButtonOutcome::Denied);
        }

        let status = match press.action {
            ButtonAction::UnpinAll => {
                self.store.clear_all(chat_id).await?;
                ButtonStatus::Collapsed
            }
            ButtonAction::KeepLast => {
                self.store.clear_keep_last(chat_id).await?;
                ButtonStatus::Collapsed
            }
            ButtonAction::ExpandButtons => ButtonStatus::Expanded,
            ButtonAction::CollapseButtons => ButtonStatus::Collapsed,
            ButtonAction::UnpinOne { id, index } => {
                self.store.remove_pin(chat_id, id, index).await?;
                ButtonStatus::Expanded
            }
        };

        let post = self.render(chat_id, status).await?;

        if post.is_empty() {
            // Someone may have unpinned the summary by hand already
            if let Err(e) = self.api.unpin_message(chat_id, summary_id).await {
                warn!("Failed to unpin summary {} in chat {}: {}", summary_id, chat_id, e);
            }
            // The id outlives a failed delete so a later press can retry
            self.api.delete_message(chat_id, summary_id).await?;
            self.store.clear_editable_id(chat_id).await?;
            info!("Removed summary {} in chat {}", summary_id, chat_id);
            return Ok(ButtonOutcome::Removed);
        }

        self.api.edit_post(chat_id, summary_id, &post).await?;
        Ok(ButtonOutcome::Updated)
    }

    async fn edited(&self, event: MessageEdited) -> Result<()> {
        let chat_id = event.chat_id;

        let Some(summary_id) = self.store.editable_id(chat_id).await? else {
            return Ok(());
        };

        let record = PinRecord::from_source(&event.message);
        let id = record.id;
        if !self.store.replace_same_id(chat_id, record).await? {
            debug!("Edited message {} in chat {} is not pinned", id, chat_id);
            return Ok(());
        }

        let post = self.render(chat_id, ButtonStatus::Collapsed).await?;
        if let Err(e) = self.api.edit_post(chat_id, summary_id, &post).await {
            warn!("Failed to refresh summary {} in chat {}: {}", summary_id, chat_id, e);
        }

        Ok(())
    }

    async fn render(&self, chat_id: i64, status: ButtonStatus) -> Result<Post> {
        if !self.store.has_pins(chat_id).await? {
            return Ok(Post::empty());
        }

        let pins = self.store.get_pins(chat_id).await?;
        Ok(render_summary(&pins, status))
    }
}
