//! Cache Store Module
//!
//! Main cache engine combining HashMap storage with LRU tracking and TTL
//! expiration. Keys are derived from an operation prefix plus a parameter
//! set; values are opaque to the store.

use std::collections::HashMap;
use std::time::Duration;

use tracing::{debug, trace};

use crate::cache::key::validate_prefix;
use crate::cache::{CacheEntry, CacheKey, CacheStats, LruTracker, Params};
use crate::error::Result;

// == Cache Store ==
/// Bounded cache of computed results with LRU eviction and TTL support.
///
/// Expiration is lazy: there is no background sweep, and an expired entry is
/// removed by whichever access discovers it. All operations run to completion
/// without suspension; for use across threads wrap the store behind a single
/// lock (see [`CacheHandle`](crate::handle::CacheHandle)) since lookups
/// mutate recency order.
#[derive(Debug)]
pub struct CacheStore<V> {
    /// Key-value storage
    entries: HashMap<CacheKey, CacheEntry<V>>,
    /// LRU access tracker
    lru: LruTracker,
    /// Performance statistics
    stats: CacheStats,
    /// Maximum number of entries allowed
    max_entries: usize,
    /// TTL applied to entries stored without an explicit TTL
    default_ttl: Duration,
}

impl<V: Clone> CacheStore<V> {
    // == Constructor ==
    /// Creates a new CacheStore with the given capacity and default TTL.
    ///
    /// A capacity of zero is clamped to one so insertion can always succeed.
    ///
    /// # Arguments
    /// * `max_entries` - Maximum number of entries the cache can hold
    /// * `default_ttl` - TTL for entries stored without an explicit TTL
    pub fn new(max_entries: usize, default_ttl: Duration) -> Self {
        let max_entries = max_entries.max(1);
        Self {
            entries: HashMap::new(),
            lru: LruTracker::new(),
            stats: CacheStats::new(max_entries),
            max_entries,
            default_ttl,
        }
    }

    // == Set ==
    /// Stores a computed value under `(prefix, params)` with an optional TTL.
    ///
    /// An existing entry under the same key is overwritten silently and its
    /// TTL restarts. When a brand-new key would exceed capacity, the least
    /// recently used entry is evicted first.
    ///
    /// # Arguments
    /// * `prefix` - Operation name, e.g. `"average"`
    /// * `params` - Parameter set identifying this computation
    /// * `value` - The computed value to store
    /// * `ttl` - Optional entry TTL (uses the default TTL if None)
    pub fn set(
        &mut self,
        prefix: &str,
        params: &Params,
        value: V,
        ttl: Option<Duration>,
    ) -> Result<()> {
        let key = CacheKey::build(prefix, params)?;

        let is_overwrite = self.entries.contains_key(&key);

        // Evict before inserting a brand-new key at capacity
        if !is_overwrite && self.entries.len() >= self.max_entries {
            if let Some(evicted) = self.lru.evict_oldest() {
                self.entries.remove(&evicted);
                self.stats.record_eviction();
                debug!(key = evicted.as_str(), "evicted least recently used entry");
            }
        }

        let ttl = ttl.unwrap_or(self.default_ttl);
        self.entries.insert(key.clone(), CacheEntry::new(value, ttl));
        self.lru.touch(&key);
        self.stats.set_entries(self.entries.len());

        Ok(())
    }

    // == Get ==
    /// Looks up the value cached under `(prefix, params)`.
    ///
    /// `Ok(None)` is a miss, not an error; the caller decides whether to fall
    /// through to the uncached calculation. An entry found past its TTL is
    /// removed on the spot and reported as a miss — expired data is never
    /// returned. A valid hit refreshes the entry's recency.
    pub fn get(&mut self, prefix: &str, params: &Params) -> Result<Option<V>> {
        let key = CacheKey::build(prefix, params)?;

        if let Some(entry) = self.entries.get(&key) {
            if entry.is_expired() {
                self.entries.remove(&key);
                self.lru.remove(&key);
                self.stats.record_expiration();
                self.stats.record_miss();
                self.stats.set_entries(self.entries.len());
                trace!(key = key.as_str(), "removed expired entry on access");
                return Ok(None);
            }

            let value = entry.value.clone();
            self.stats.record_hit();
            self.lru.touch(&key);
            Ok(Some(value))
        } else {
            self.stats.record_miss();
            Ok(None)
        }
    }

    // == Invalidate ==
    /// Removes the single entry under `(prefix, params)`.
    ///
    /// Idempotent: removing an absent key is a no-op. Returns whether an
    /// entry was actually removed.
    pub fn invalidate(&mut self, prefix: &str, params: &Params) -> Result<bool> {
        let key = CacheKey::build(prefix, params)?;

        if self.entries.remove(&key).is_some() {
            self.lru.remove(&key);
            self.stats.set_entries(self.entries.len());
            Ok(true)
        } else {
            Ok(false)
        }
    }

    // == Invalidate Prefix ==
    /// Removes every entry stored under `prefix`.
    ///
    /// Scans all stored keys (O(n), acceptable at bounded size). Returns the
    /// number of entries removed.
    pub fn invalidate_prefix(&mut self, prefix: &str) -> Result<usize> {
        validate_prefix(prefix)?;

        // Snapshot matching keys before deleting
        let doomed: Vec<CacheKey> = self
            .entries
            .keys()
            .filter(|key| key.has_prefix(prefix))
            .cloned()
            .collect();

        for key in &doomed {
            self.entries.remove(key);
            self.lru.remove(key);
        }
        self.stats.set_entries(self.entries.len());

        if !doomed.is_empty() {
            debug!(prefix, removed = doomed.len(), "invalidated prefix");
        }
        Ok(doomed.len())
    }

    // == Invalidate Entity Tag ==
    /// Removes every entry whose parameter blob contains `tag` as a literal
    /// substring, e.g. `student_id:42`.
    ///
    /// This relies on callers consistently including identifying tags as
    /// named parameters when storing — it is a convention, not an enforced
    /// contract. Returns the number of entries removed.
    pub fn invalidate_entity_tag(&mut self, tag: &str) -> usize {
        let doomed: Vec<CacheKey> = self
            .entries
            .keys()
            .filter(|key| key.param_blob().contains(tag))
            .cloned()
            .collect();

        for key in &doomed {
            self.entries.remove(key);
            self.lru.remove(key);
        }
        self.stats.set_entries(self.entries.len());

        if !doomed.is_empty() {
            debug!(tag, removed = doomed.len(), "invalidated entity tag");
        }
        doomed.len()
    }

    // == Clear ==
    /// Empties the store unconditionally. Cumulative counters are kept.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.lru.clear();
        self.stats.set_entries(0);
    }

    // == Stats ==
    /// Returns a snapshot of the current cache statistics.
    pub fn stats(&self) -> CacheStats {
        let mut stats = self.stats.clone();
        stats.set_entries(self.entries.len());
        stats
    }

    // == Length ==
    /// Returns the current number of entries in the cache.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    // == Is Empty ==
    /// Returns true if the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
