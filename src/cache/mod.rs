//! Caching built on Moka.
//!
//! Caches are created through a [`CacheRegistry`] so that components asking
//! for the same name and types share one instance.
//!
//! ```rust,ignore
//! let rights = registry.get_or_create::<(i64, u64), PinRights>("pin_rights", CacheConfig::default());
//! rights.insert((chat_id, user_id), value);
//! let cached = rights.get(&(chat_id, user_id));
//! ```

mod config;
mod registry;
mod typed;

pub use config::CacheConfig;
pub use registry::CacheRegistry;
pub use typed::TypedCache;
