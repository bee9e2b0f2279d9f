//! Shared Cache Handle
//!
//! One cache per process, passed around explicitly: the handle is constructed
//! once at startup and cloned into every consumer. Clones share the same
//! underlying store.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::cache::{CacheStats, CacheStore, Params};
use crate::config::CacheConfig;
use crate::error::Result;
use crate::typed::Namespace;

/// Cloneable handle to a shared calculation cache.
///
/// The store sits behind a single mutex: a lookup refreshes recency order, so
/// even reads perform a write and a read-write lock would buy nothing. Every
/// operation locks, runs to completion, and unlocks — nothing blocks while
/// holding the lock.
#[derive(Clone)]
pub struct CacheHandle {
    /// Thread-safe shared store; values are stored as JSON
    inner: Arc<Mutex<CacheStore<Value>>>,
}

impl CacheHandle {
    /// Wraps an existing store in a shared handle.
    pub fn new(store: CacheStore<Value>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(store)),
        }
    }

    /// Creates a handle from configuration.
    pub fn from_config(config: &CacheConfig) -> Self {
        Self::new(CacheStore::new(config.max_entries, config.default_ttl()))
    }

    /// Stores a computed value under `(prefix, params)`.
    pub fn set(
        &self,
        prefix: &str,
        params: &Params,
        value: Value,
        ttl: Option<Duration>,
    ) -> Result<()> {
        self.inner.lock().set(prefix, params, value, ttl)
    }

    /// Looks up the value cached under `(prefix, params)`.
    pub fn get(&self, prefix: &str, params: &Params) -> Result<Option<Value>> {
        self.inner.lock().get(prefix, params)
    }

    /// Removes the single entry under `(prefix, params)`. Idempotent.
    pub fn invalidate(&self, prefix: &str, params: &Params) -> Result<bool> {
        self.inner.lock().invalidate(prefix, params)
    }

    /// Removes every entry stored under `prefix`.
    pub fn invalidate_prefix(&self, prefix: &str) -> Result<usize> {
        self.inner.lock().invalidate_prefix(prefix)
    }

    /// Removes every entry whose parameters contain `tag`, e.g. `student_id:42`.
    pub fn invalidate_entity_tag(&self, tag: &str) -> usize {
        self.inner.lock().invalidate_entity_tag(tag)
    }

    /// Empties the cache unconditionally.
    pub fn clear(&self) {
        self.inner.lock().clear()
    }

    /// Returns a snapshot of the current cache statistics.
    pub fn stats(&self) -> CacheStats {
        self.inner.lock().stats()
    }

    /// Returns the current number of entries.
    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    /// Returns true if the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.inner.lock().is_empty()
    }

    /// Creates a strongly-typed view over `prefix`.
    ///
    /// Each calculation kind should get its own namespace so stored shapes
    /// never mix; see [`Namespace`].
    pub fn namespace<T: Serialize + DeserializeOwned>(
        &self,
        prefix: impl Into<String>,
    ) -> Namespace<T> {
        Namespace::new(self.clone(), prefix)
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn test_handle() -> CacheHandle {
        CacheHandle::from_config(&CacheConfig::default())
    }

    #[test]
    fn test_handle_set_and_get() {
        let cache = test_handle();
        let params = Params::new().with("student_id", "42");

        cache.set("average", &params, json!(14.5), None).unwrap();
        let value = cache.get("average", &params).unwrap();

        assert_eq!(value, Some(json!(14.5)));
    }

    #[test]
    fn test_handle_clones_share_state() {
        let cache = test_handle();
        let clone = cache.clone();
        let params = Params::new().with("student_id", "42");

        cache.set("average", &params, json!(14.5), None).unwrap();

        assert_eq!(clone.get("average", &params).unwrap(), Some(json!(14.5)));
        assert_eq!(clone.len(), 1);
    }

    #[test]
    fn test_handle_cached_null_is_distinct_from_miss() {
        let cache = test_handle();
        let params = Params::new().with("student_id", "42");

        cache.set("optional_grade", &params, Value::Null, None).unwrap();

        // A stored null is a hit carrying null, not a miss
        assert_eq!(cache.get("optional_grade", &params).unwrap(), Some(Value::Null));
        assert_eq!(cache.get("other", &params).unwrap(), None);
    }

    #[test]
    fn test_handle_invalidate_entity_tag() {
        let cache = test_handle();

        cache
            .set(
                "average",
                &Params::new().with("student_id", "42").with("semester", 1),
                json!(14.5),
                None,
            )
            .unwrap();
        cache
            .set("ects", &Params::new().with("student_id", "42"), json!(30), None)
            .unwrap();

        assert_eq!(cache.invalidate_entity_tag("student_id:42"), 2);
        assert!(cache.is_empty());
    }

    #[test]
    fn test_handle_stats_and_clear() {
        let cache = test_handle();
        let params = Params::new().with("student_id", "42");

        cache.set("average", &params, json!(14.5), None).unwrap();
        cache.get("average", &params).unwrap();
        cache.clear();

        let stats = cache.stats();
        assert_eq!(stats.entries, 0);
        assert_eq!(stats.hits, 1);
    }
}
