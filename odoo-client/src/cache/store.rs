//! Cache store contract and the in-memory implementation

use crate::cache::{
    config::CacheConfig,
    entry::CacheEntry,
    invalidation::{InvalidationEvent, InvalidationReason},
    types::{CacheKey, CacheStats, CacheValue},
};
use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::{debug, info};

/// Storage the record service reads through
///
/// Implementations never fail: anything that goes wrong inside the store
/// shows up as a miss on the next lookup.
#[async_trait]
pub trait CacheStore: Send + Sync {
    /// Look up a live entry
    async fn get(&self, key: &str) -> Option<CacheValue>;

    /// Store a value; `ttl` of `None` uses the store default
    async fn set(&self, key: CacheKey, value: CacheValue, ttl: Option<Duration>, tags: Vec<String>);

    /// Remove a single entry, returning whether it existed
    async fn remove(&self, key: &str) -> bool;

    /// Remove every entry carrying `tag`, reporting the removed keys
    async fn invalidate_by_tag(&self, tag: &str) -> InvalidationEvent;

    /// Drop all entries
    async fn clear(&self);

    /// Snapshot of the store counters
    async fn stats(&self) -> CacheStats;
}

/// In-memory cache with TTL support and LRU eviction
///
/// This implementation provides:
/// - Thread-safe async access via RwLock
/// - TTL-based expiration checked on every lookup
/// - Purge of expired entries before each insert
/// - LRU eviction once `max_entries` is reached
/// - Tag index for model-scoped invalidation
pub struct MemoryCache {
    config: CacheConfig,

    /// Internal storage
    store: RwLock<Store>,
}

/// Internal cache storage
struct Store {
    /// Main storage: key -> entry
    entries: HashMap<CacheKey, CacheEntry>,

    /// LRU tracking: maintains access order
    lru_queue: VecDeque<CacheKey>,

    /// Current cache statistics
    stats: CacheStats,
}

impl MemoryCache {
    /// Create a new cache with the given configuration
    pub fn new(config: CacheConfig) -> Self {
        info!(
            "Cache initialized - enabled: {}, TTL: {:?}, max_entries: {}, invalidation: {}",
            config.enabled, config.default_ttl, config.max_entries, config.invalidation
        );

        let stats = CacheStats {
            enabled: config.enabled,
            max_entries: config.max_entries,
            default_ttl_secs: config.default_ttl.as_secs(),
            ..Default::default()
        };

        Self {
            config,
            store: RwLock::new(Store {
                entries: HashMap::new(),
                lru_queue: VecDeque::new(),
                stats,
            }),
        }
    }

    /// The configuration this cache was built with
    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    /// Check if a key exists in the cache (without updating access time)
    pub async fn contains_key(&self, key: &str) -> bool {
        let store = self.store.read().await;
        store.entries.get(key).is_some_and(|entry| !entry.is_expired())
    }

    /// Get number of entries in cache
    pub async fn len(&self) -> usize {
        self.store.read().await.entries.len()
    }

    /// Check if cache is empty
    pub async fn is_empty(&self) -> bool {
        self.store.read().await.entries.is_empty()
    }

    /// Remove all expired entries
    pub async fn cleanup_expired(&self) -> Option<InvalidationEvent> {
        let mut store = self.store.write().await;
        Self::purge_expired(&mut store)
    }

    fn purge_expired(store: &mut Store) -> Option<InvalidationEvent> {
        let expired_keys: Vec<CacheKey> = store
            .entries
            .iter()
            .filter(|(_, entry)| entry.is_expired())
            .map(|(key, _)| key.clone())
            .collect();

        if expired_keys.is_empty() {
            return None;
        }

        for key in &expired_keys {
            Self::remove_entry(store, key);
        }
        store.stats.evictions_ttl += expired_keys.len() as u64;

        debug!("Cleaned up {} expired cache entries", expired_keys.len());
        Some(InvalidationEvent::new(InvalidationReason::Expired, expired_keys))
    }

    fn remove_entry(store: &mut Store, key: &str) -> Option<CacheEntry> {
        let entry = store.entries.remove(key)?;
        store.lru_queue.retain(|k| k != key);
        store.stats.entries = store.entries.len();
        Some(entry)
    }

    fn touch(store: &mut Store, key: &str) {
        store.lru_queue.retain(|k| k != key);
        store.lru_queue.push_back(key.to_string());
    }

    /// Evict least recently used entries until there is room for one more
    fn evict_if_needed(&self, store: &mut Store) {
        while store.entries.len() >= self.config.max_entries {
            let Some(key) = store.lru_queue.pop_front() else {
                break;
            };
            debug!("Evicting cache entry due to max_entries limit: {}", key);
            Self::remove_entry(store, &key);
            store.stats.evictions_size += 1;
        }
    }
}

#[async_trait]
impl CacheStore for MemoryCache {
    async fn get(&self, key: &str) -> Option<CacheValue> {
        if !self.config.enabled {
            return None;
        }

        let mut store = self.store.write().await;

        match store.entries.get(key).map(CacheEntry::is_expired) {
            None => {
                debug!("Cache miss: {}", key);
                store.stats.misses += 1;
                return None;
            }
            Some(true) => {
                debug!("Cache expired: {}", key);
                Self::remove_entry(&mut store, key);
                store.stats.misses += 1;
                store.stats.evictions_ttl += 1;
                return None;
            }
            Some(false) => {}
        }

        let entry = store.entries.get_mut(key)?;
        entry.mark_accessed();
        let value = entry.value.clone();
        Self::touch(&mut store, key);
        store.stats.hits += 1;

        debug!("Cache hit: {}", key);
        Some(value)
    }

    async fn set(&self, key: CacheKey, value: CacheValue, ttl: Option<Duration>, tags: Vec<String>) {
        if !self.config.enabled {
            return;
        }

        let ttl = self.config.with_jitter(ttl.unwrap_or(self.config.default_ttl));
        let mut entry = CacheEntry::new(key.clone(), value, ttl);
        for tag in tags {
            entry.add_tag(tag);
        }

        let mut store = self.store.write().await;
        Self::purge_expired(&mut store);

        if store.entries.contains_key(&key) {
            debug!("Updating existing cache entry: {} (TTL: {:?})", key, ttl);
        } else {
            self.evict_if_needed(&mut store);
            debug!("Cache set: {} (TTL: {:?})", key, ttl);
        }

        store.entries.insert(key.clone(), entry);
        Self::touch(&mut store, &key);
        store.stats.entries = store.entries.len();
    }

    async fn remove(&self, key: &str) -> bool {
        let mut store = self.store.write().await;
        if Self::remove_entry(&mut store, key).is_some() {
            store.stats.invalidations += 1;
            debug!("Removed cache entry: {}", key);
            true
        } else {
            false
        }
    }

    async fn invalidate_by_tag(&self, tag: &str) -> InvalidationEvent {
        let mut store = self.store.write().await;

        let keys_to_remove: Vec<CacheKey> = store
            .entries
            .iter()
            .filter(|(_, entry)| entry.has_tag(tag))
            .map(|(key, _)| key.clone())
            .collect();

        for key in &keys_to_remove {
            Self::remove_entry(&mut store, key);
        }

        store.stats.invalidations += keys_to_remove.len() as u64;
        debug!("Invalidated {} cache entries with tag: {}", keys_to_remove.len(), tag);

        InvalidationEvent::new(
            InvalidationReason::Tagged {
                tag: tag.to_string(),
            },
            keys_to_remove,
        )
    }

    async fn clear(&self) {
        let mut store = self.store.write().await;

        let count = store.entries.len();
        store.entries.clear();
        store.lru_queue.clear();
        store.stats.entries = 0;
        store.stats.invalidations += count as u64;

        info!("Cache cleared: {} entries removed", count);
    }

    async fn stats(&self) -> CacheStats {
        let mut store = self.store.write().await;
        Self::purge_expired(&mut store);
        store.stats.clone()
    }
}
