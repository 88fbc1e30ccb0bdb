//! Keyed lock implementation.

use std::collections::HashMap;
use std::future::Future;
use std::hash::Hash;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use thiserror::Error;
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

/// Releasing a key that is not locked.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum UnlockedKeyError {
    #[error("attempted to release a key that was never locked")]
    NeverLocked,

    #[error("attempted to release a key that is not held")]
    NotHeld,
}

/// Guard of the current holder, tagged with the acquisition that produced it.
struct Holder {
    ticket: u64,
    _guard: OwnedMutexGuard<()>,
}

struct Slot {
    mutex: Arc<AsyncMutex<()>>,
    holder: Option<Holder>,
}

struct Registry<K> {
    slots: HashMap<K, Slot>,
    next_ticket: u64,
}

/// A set of mutexes indexed by key.
///
/// Mutexes are created lazily and never dropped, so memory grows with the
/// number of distinct keys seen. The registry itself sits behind a short-held
/// `parking_lot` mutex that is never held across an `.await`.
pub struct KeyedLock<K> {
    registry: Mutex<Registry<K>>,
}

impl<K> KeyedLock<K>
where
    K: Eq + Hash + Clone,
{
    pub fn new() -> Self {
        Self {
            registry: Mutex::new(Registry {
                slots: HashMap::new(),
                next_ticket: 0,
            }),
        }
    }

    /// Acquire the lock for `key`.
    ///
    /// Waits forever when `timeout` is `None`. Returns `false` if the timeout
    /// elapsed before the lock became free.
    #[allow(dead_code)]
    pub async fn acquire(&self, key: K, timeout: Option<Duration>) -> bool {
        self.acquire_ticket(key, timeout).await.is_some()
    }

    /// Release the lock for `key`, whoever acquired it.
    #[allow(dead_code)]
    pub fn release(&self, key: &K) -> Result<(), UnlockedKeyError> {
        self.release_matching(key, None)
    }

    /// Run `f` while holding the lock for `key`.
    ///
    /// The lock is released when the scope ends, including on panic or when
    /// the returned future is dropped. If `f` released the lock itself, the
    /// scope ends with [`UnlockedKeyError::NotHeld`].
    pub async fn with_lock<F, Fut, T>(&self, key: K, f: F) -> Result<T, UnlockedKeyError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = T>,
    {
        let ticket = self
            .acquire_ticket(key.clone(), None)
            .await
            .ok_or(UnlockedKeyError::NotHeld)?;

        let mut scope = Scope {
            lock: self,
            key: Some(key),
            ticket,
        };
        let value = f().await;
        scope.close()?;

        Ok(value)
    }

    /// Number of keys that have a mutex.
    #[allow(dead_code)]
    pub fn len(&self) -> usize {
        self.registry.lock().slots.len()
    }

    #[allow(dead_code)]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn mutex_for(&self, key: &K) -> Arc<AsyncMutex<()>> {
        let mut registry = self.registry.lock();
        registry
            .slots
            .entry(key.clone())
            .or_insert_with(|| Slot {
                mutex: Arc::new(AsyncMutex::new(())),
                holder: None,
            })
            .mutex
            .clone()
    }

    async fn acquire_ticket(&self, key: K, timeout: Option<Duration>) -> Option<u64> {
        let mutex = self.mutex_for(&key);

        let guard = match timeout {
            Some(limit) => tokio::time::timeout(limit, mutex.lock_owned()).await.ok()?,
            None => mutex.lock_owned().await,
        };

        let mut registry = self.registry.lock();
        let ticket = registry.next_ticket;
        registry.next_ticket += 1;

        // Slots are never removed, the entry made by `mutex_for` is still here.
        let slot = registry.slots.get_mut(&key)?;
        slot.holder = Some(Holder {
            ticket,
            _guard: guard,
        });

        Some(ticket)
    }

    fn release_matching(&self, key: &K, ticket: Option<u64>) -> Result<(), UnlockedKeyError> {
        let holder = {
            let mut registry = self.registry.lock();
            let slot = registry
                .slots
                .get_mut(key)
                .ok_or(UnlockedKeyError::NeverLocked)?;

            match (&slot.holder, ticket) {
                (None, _) => return Err(UnlockedKeyError::NotHeld),
                (Some(held), Some(expected)) if held.ticket != expected => {
                    return Err(UnlockedKeyError::NotHeld);
                }
                _ => slot.holder.take(),
            }
        };

        drop(holder);
        Ok(())
    }
}

impl<K> Default for KeyedLock<K>
where
    K: Eq + Hash + Clone,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K> std::fmt::Debug for KeyedLock<K> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let registry = self.registry.lock();
        f.debug_struct("KeyedLock")
            .field("keys", &registry.slots.len())
            .finish()
    }
}

/// Releases the scope's own acquisition when dropped.
struct Scope<'a, K>
where
    K: Eq + Hash + Clone,
{
    lock: &'a KeyedLock<K>,
    key: Option<K>,
    ticket: u64,
}

impl<K> Scope<'_, K>
where
    K: Eq + Hash + Clone,
{
    fn close(&mut self) -> Result<(), UnlockedKeyError> {
        match self.key.take() {
            Some(key) => self.lock.release_matching(&key, Some(self.ticket)),
            None => Ok(()),
        }
    }
}

impl<K> Drop for Scope<'_, K>
where
    K: Eq + Hash + Clone,
{
    fn drop(&mut self) {
        let _ = self.close();
    }
}
