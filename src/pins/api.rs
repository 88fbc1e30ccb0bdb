//! Outbound actions the controller performs on the chat platform.

use async_trait::async_trait;

use super::render::Post;

/// What the platform says about a user's right to pin in a chat.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PinRights {
    pub is_creator: bool,
    /// Chat-wide permission for ordinary members.
    pub everyone_can_pin: bool,
    /// Per-user setting, `None` when the user has no personal override.
    pub user_override: Option<bool>,
}

impl PinRights {
    /// Whether the user may operate the summary buttons.
    ///
    /// An unset override counts as allowed when everyone can pin, and as
    /// denied otherwise.
    pub fn allows_edit(&self) -> bool {
        if self.is_creator {
            return true;
        }

        let open = self.everyone_can_pin && self.user_override != Some(false);
        let granted = !self.everyone_can_pin && self.user_override == Some(true);
        open != granted
    }
}

#[async_trait]
pub trait PinApi: Send + Sync {
    /// Send a new summary message and return its id.
    async fn send_post(&self, chat_id: i64, post: &Post) -> anyhow::Result<i32>;

    async fn edit_post(&self, chat_id: i64, message_id: i32, post: &Post) -> anyhow::Result<()>;

    async fn delete_message(&self, chat_id: i64, message_id: i32) -> anyhow::Result<()>;

    /// Pin without notifying members.
    async fn pin_silently(&self, chat_id: i64, message_id: i32) -> anyhow::Result<()>;

    async fn unpin_message(&self, chat_id: i64, message_id: i32) -> anyhow::Result<()>;

    async fn pin_rights(&self, chat_id: i64, user_id: u64) -> anyhow::Result<PinRights>;
}
