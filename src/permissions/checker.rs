//! Permission checker with caching.

use std::time::Duration;

use teloxide::prelude::*;
use teloxide::types::{ChatId, ChatMemberKind, ChatPermissions, UserId};
use tracing::debug;

use crate::cache::{CacheConfig, CacheRegistry, TypedCache};
use crate::pins::PinRights;

/// Cache key for rights lookups.
type RightsCacheKey = (i64, u64); // (chat_id, user_id)

/// Pin rights lookup backed by the Bot API.
#[derive(Clone)]
pub struct Permissions {
    bot: Bot,
    cache: TypedCache<RightsCacheKey, PinRights>,
}

impl Permissions {
    pub fn new(bot: Bot, cache_registry: &CacheRegistry) -> Self {
        let cache = cache_registry.get_or_create(
            "pin_rights",
            CacheConfig::with_capacity(10_000).ttl(Duration::from_secs(120)), // 2 minutes
        );

        Self { bot, cache }
    }

    /// Pin rights of a user in a chat.
    pub async fn pin_rights(&self, chat_id: ChatId, user_id: UserId) -> anyhow::Result<PinRights> {
        let cache_key = (chat_id.0, user_id.0);

        if let Some(cached) = self.cache.get(&cache_key) {
            debug!("Rights cache hit for user {} in chat {}", user_id, chat_id);
            return Ok(cached);
        }

        debug!("Rights cache miss for user {} in chat {}", user_id, chat_id);
        let rights = self.fetch_pin_rights(chat_id, user_id).await?;
        self.cache.insert(cache_key, rights);

        Ok(rights)
    }

    async fn fetch_pin_rights(&self, chat_id: ChatId, user_id: UserId) -> anyhow::Result<PinRights> {
        let chat = self.bot.get_chat(chat_id).await?;
        let member = self.bot.get_chat_member(chat_id, user_id).await?;

        let everyone_can_pin = chat
            .permissions()
            .is_some_and(|perms| perms.contains(ChatPermissions::PIN_MESSAGES));

        Ok(rights_for(&member.kind, everyone_can_pin))
    }
}

/// Combine a member status with the chat-wide pin permission.
fn rights_for(kind: &ChatMemberKind, everyone_can_pin: bool) -> PinRights {
    let (is_creator, user_override) = match kind {
        ChatMemberKind::Owner { .. } => (true, None),
        ChatMemberKind::Administrator(admin) => (false, Some(admin.can_pin_messages)),
        ChatMemberKind::Restricted(restricted) => (false, Some(restricted.can_pin_messages)),
        ChatMemberKind::Member { .. } => (false, None),
        _ => (false, Some(false)),
    };

    PinRights {
        is_creator,
        everyone_can_pin,
        user_override,
    }
}
