//! LRU Cache for Text Deduplication
//!
//! A bounded least-recently-used map and, on top of it, [`DedupCache`], the
//! fingerprint store used to drop text fragments that were already emitted.

use std::collections::hash_map::DefaultHasher;
use std::collections::{BTreeMap, HashMap};
use std::hash::{Hash, Hasher};

use crate::text;

/// Texts shorter than this (in characters, after whitespace collapsing) are
/// never fingerprinted.
pub const MIN_DUPLICATE_CHECK_LEN: usize = 10;

/// Bounded map evicting the least recently used entry when full.
///
/// Recency is a monotonically increasing stamp; `order` maps stamps back to
/// keys so the oldest entry is the first one in the `BTreeMap`.
#[derive(Debug, Clone)]
pub struct LruCache<K, V> {
    capacity: usize,
    clock: u64,
    entries: HashMap<K, (V, u64)>,
    order: BTreeMap<u64, K>,
}

impl<K: Hash + Eq + Clone, V> LruCache<K, V> {
    /// Creates a cache holding at most `capacity` entries (at least one).
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            clock: 0,
            entries: HashMap::new(),
            order: BTreeMap::new(),
        }
    }

    /// Maximum number of entries.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if the cache is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn tick(&mut self) -> u64 {
        self.clock += 1;
        self.clock
    }

    /// Returns the value and marks the entry most recently used.
    pub fn get(&mut self, key: &K) -> Option<&V> {
        let stamp = self.tick();
        let (_, old) = self.entries.get(key)?;
        let old = *old;
        if let Some(k) = self.order.remove(&old) {
            self.order.insert(stamp, k);
        }
        let entry = self.entries.get_mut(key)?;
        entry.1 = stamp;
        Some(&entry.0)
    }

    /// Returns the value without touching recency.
    #[must_use]
    pub fn peek(&self, key: &K) -> Option<&V> {
        self.entries.get(key).map(|(v, _)| v)
    }

    /// Returns `true` if the key is present, without touching recency.
    #[must_use]
    pub fn contains(&self, key: &K) -> bool {
        self.entries.contains_key(key)
    }

    /// Inserts or replaces an entry, evicting the least recently used one
    /// when the cache is full.
    pub fn put(&mut self, key: K, value: V) {
        let stamp = self.tick();
        if let Some((_, old)) = self.entries.remove(&key) {
            self.order.remove(&old);
        } else if self.entries.len() >= self.capacity {
            if let Some((_, evicted)) = self.order.pop_first() {
                self.entries.remove(&evicted);
            }
        }
        self.order.insert(stamp, key.clone());
        self.entries.insert(key, (value, stamp));
    }

    /// Removes every entry.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.order.clear();
    }
}

/// Fingerprint store for repeated text fragments.
#[derive(Debug, Clone)]
pub struct DedupCache {
    seen: LruCache<u64, ()>,
}

impl DedupCache {
    /// Creates a cache holding at most `capacity` fingerprints.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            seen: LruCache::new(capacity),
        }
    }

    /// Returns `true` if the (whitespace-normalized) text was seen before.
    ///
    /// Texts shorter than [`MIN_DUPLICATE_CHECK_LEN`] characters always
    /// return `false` and are not stored. A hit does not refresh recency; a
    /// miss records the fingerprint.
    pub fn is_duplicate(&mut self, text: &str) -> bool {
        let normalized = text::trim(text);
        if normalized.chars().count() < MIN_DUPLICATE_CHECK_LEN {
            return false;
        }
        let key = fingerprint(&normalized);
        if self.seen.contains(&key) {
            return true;
        }
        self.seen.put(key, ());
        false
    }

    /// Number of stored fingerprints.
    #[must_use]
    pub fn len(&self) -> usize {
        self.seen.len()
    }

    /// Returns `true` if nothing has been recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }

    /// Forgets every fingerprint.
    pub fn clear(&mut self) {
        self.seen.clear();
    }
}

impl Default for DedupCache {
    fn default() -> Self {
        Self::new(1000)
    }
}

fn fingerprint(text: &str) -> u64 {
    let mut hasher = DefaultHasher::new();
    text.hash(&mut hasher);
    hasher.finish()
}
