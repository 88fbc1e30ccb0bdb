//! Per-key locking.
//!
//! Event handlers for the same chat must not interleave, while handlers for
//! different chats run freely. `KeyedLock` hands out one async mutex per key,
//! created on first use.
//!
//! ## Usage
//!
//! ```rust,ignore
//! let locks = KeyedLock::new();
//!
//! // Scoped: released on every exit path
//! locks.with_lock(chat_id, || async { /* critical section */ }).await?;
//!
//! // Manual
//! if locks.acquire(chat_id, Some(Duration::from_secs(1))).await {
//!     locks.release(&chat_id)?;
//! }
//! ```

mod keyed;

pub use keyed::{KeyedLock, UnlockedKeyError};
