//! Bounded verdict cache with LRU eviction
//!
//! Shared by every session in the process. `get` promotes an entry to
//! most-recently-used; inserting into a full cache evicts the oldest entry.

use std::collections::{HashMap, VecDeque};
use std::hash::Hash;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Default capacity for the classification cache.
pub const DEFAULT_CAPACITY: usize = 100;

/// A capacity-limited map with LRU eviction.
///
/// Cloning is cheap and yields a handle onto the same entries.
pub struct LruCache<K, V> {
    entries: Arc<RwLock<LruInner<K, V>>>,
}

impl<K, V> Clone for LruCache<K, V> {
    fn clone(&self) -> Self {
        Self {
            entries: Arc::clone(&self.entries),
        }
    }
}

struct LruInner<K, V> {
    map: HashMap<K, V>,
    /// front = oldest, back = newest
    order: VecDeque<K>,
    capacity: usize,
}

impl<K, V> LruCache<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    /// Create a cache holding at most `capacity` entries (minimum 1).
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: Arc::new(RwLock::new(LruInner {
                map: HashMap::with_capacity(capacity.min(1024)),
                order: VecDeque::with_capacity(capacity.min(1024)),
                capacity,
            })),
        }
    }

    /// Insert a value, evicting the LRU entry if at capacity.
    /// Returns the evicted key if eviction occurred.
    pub async fn put(&self, key: K, value: V) -> Option<K> {
        let mut inner = self.entries.write().await;

        if inner.map.contains_key(&key) {
            inner.order.retain(|k| *k != key);
        }

        let evicted = if inner.map.len() >= inner.capacity && !inner.map.contains_key(&key) {
            Self::evict_lru(&mut inner)
        } else {
            None
        };

        inner.map.insert(key.clone(), value);
        inner.order.push_back(key);

        evicted
    }

    /// Look up a value, promoting it to most-recently-used.
    pub async fn get(&self, key: &K) -> Option<V> {
        let mut inner = self.entries.write().await;
        let value = inner.map.get(key).cloned()?;
        inner.order.retain(|k| k != key);
        inner.order.push_back(key.clone());
        Some(value)
    }

    /// Look up a value without touching recency.
    pub async fn peek(&self, key: &K) -> Option<V> {
        self.entries.read().await.map.get(key).cloned()
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.map.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.map.is_empty()
    }

    pub async fn capacity(&self) -> usize {
        self.entries.read().await.capacity
    }

    pub async fn clear(&self) {
        let mut inner = self.entries.write().await;
        inner.map.clear();
        inner.order.clear();
    }

    fn evict_lru(inner: &mut LruInner<K, V>) -> Option<K> {
        let oldest = inner.order.pop_front()?;
        inner.map.remove(&oldest);
        Some(oldest)
    }
}
