//! Permission lookups.
//!
//! Answers whether a user may change the pins of a chat, combining the
//! chat-wide pin permission with the user's own member status. Lookups are
//! cached for a short while to keep button presses off the Bot API.
//!
//! ```rust,ignore
//! let perms = Permissions::new(bot.clone(), &cache);
//! let rights = perms.pin_rights(chat_id, user_id).await?;
//! if rights.allows_edit() {
//!     // ...
//! }
//! ```

mod checker;

pub use checker::Permissions;
