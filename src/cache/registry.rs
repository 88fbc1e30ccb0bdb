//! Cache registry - Central management for all caches.

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::hash::Hash;
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::debug;

use super::{CacheConfig, TypedCache};

/// Entries are keyed by name and cache type, so two callers only share a
/// cache when they agree on both.
type RegistryKey = (String, TypeId);

/// Central registry of named typed caches.
#[derive(Clone, Default)]
pub struct CacheRegistry {
    caches: Arc<RwLock<HashMap<RegistryKey, Box<dyn Any + Send + Sync>>>>,
}

impl CacheRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the cache registered under `name`, creating it with `config` if needed.
    pub fn get_or_create<K, V>(&self, name: &str, config: CacheConfig) -> TypedCache<K, V>
    where
        K: Hash + Eq + Send + Sync + 'static,
        V: Clone + Send + Sync + 'static,
    {
        let key = (name.to_string(), TypeId::of::<TypedCache<K, V>>());

        if let Some(cache) = self.lookup(&key) {
            return cache;
        }

        let mut caches = self.caches.write();
        // Another caller may have created it between the two locks
        if let Some(cache) = caches
            .get(&key)
            .and_then(|entry| entry.downcast_ref::<TypedCache<K, V>>())
        {
            return cache.clone();
        }

        debug!("Creating cache: {}", name);
        let cache = TypedCache::new(name, config);
        caches.insert(key, Box::new(cache.clone()));
        cache
    }

    fn lookup<K, V>(&self, key: &RegistryKey) -> Option<TypedCache<K, V>>
    where
        K: Hash + Eq + Send + Sync + 'static,
        V: Clone + Send + Sync + 'static,
    {
        self.caches
            .read()
            .get(key)
            .and_then(|entry| entry.downcast_ref::<TypedCache<K, V>>())
            .cloned()
    }
}

impl std::fmt::Debug for CacheRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let caches = self.caches.read();
        f.debug_struct("CacheRegistry")
            .field(
                "cache_names",
                &caches.keys().map(|(name, _)| name).collect::<Vec<_>>(),
            )
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_name_and_types_share_cache() {
        let registry = CacheRegistry::new();

        let first: TypedCache<i64, String> = registry.get_or_create("names", CacheConfig::default());
        first.insert(1, "one".to_string());

        let second: TypedCache<i64, String> =
            registry.get_or_create("names", CacheConfig::default());
        assert_eq!(second.get(&1).as_deref(), Some("one"));
        assert_eq!(format!("{:?}", registry).matches("\"names\"").count(), 1);
    }

    #[test]
    fn test_different_types_do_not_collide() {
        let registry = CacheRegistry::new();

        let strings: TypedCache<i64, String> =
            registry.get_or_create("shared", CacheConfig::default());
        let flags: TypedCache<i64, bool> = registry.get_or_create("shared", CacheConfig::default());

        strings.insert(1, "x".to_string());
        assert_eq!(flags.get(&1), None);
        assert_eq!(format!("{:?}", registry).matches("\"shared\"").count(), 2);
    }
}
