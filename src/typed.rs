//! Typed Namespace Module
//!
//! Strongly-typed views over the shared untyped store. Each calculation kind
//! gets its own namespace (one prefix, one value type), so consumers never
//! handle raw JSON and never cast across calculation kinds.

use std::marker::PhantomData;
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::warn;

use crate::cache::Params;
use crate::error::{CacheError, Result};
use crate::handle::CacheHandle;

/// A typed view over one key prefix of a shared cache.
///
/// Values are encoded through serde on the way in and decoded on the way
/// out. The prefix-per-type convention is what keeps decoding safe; a stored
/// value that does not match `T` is treated as a miss, never returned as
/// garbage.
pub struct Namespace<T> {
    /// Key prefix owned by this namespace
    prefix: String,
    /// The shared cache this namespace reads and writes
    cache: CacheHandle,
    _values: PhantomData<fn() -> T>,
}

impl<T> Clone for Namespace<T> {
    fn clone(&self) -> Self {
        Self {
            prefix: self.prefix.clone(),
            cache: self.cache.clone(),
            _values: PhantomData,
        }
    }
}

impl<T: Serialize + DeserializeOwned> Namespace<T> {
    pub(crate) fn new(cache: CacheHandle, prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            cache,
            _values: PhantomData,
        }
    }

    /// Returns the key prefix this namespace owns.
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Stores a computed value under `params`.
    ///
    /// A value that cannot be encoded fails fast with
    /// [`CacheError::Encoding`] rather than corrupting the store.
    pub fn set(&self, params: &Params, value: &T, ttl: Option<Duration>) -> Result<()> {
        let encoded =
            serde_json::to_value(value).map_err(|err| CacheError::Encoding(err.to_string()))?;
        self.cache.set(&self.prefix, params, encoded, ttl)
    }

    /// Looks up the value cached under `params`.
    ///
    /// A stored value that does not decode as `T` means the prefix-per-type
    /// convention was broken somewhere; the entry is dropped and the lookup
    /// reports a miss.
    pub fn get(&self, params: &Params) -> Result<Option<T>> {
        let Some(raw) = self.cache.get(&self.prefix, params)? else {
            return Ok(None);
        };

        match serde_json::from_value(raw) {
            Ok(value) => Ok(Some(value)),
            Err(err) => {
                warn!(
                    prefix = %self.prefix,
                    %err,
                    "cached value does not match namespace type, dropping entry"
                );
                self.cache.invalidate(&self.prefix, params)?;
                Ok(None)
            }
        }
    }

    /// Removes the single entry under `params`. Idempotent.
    pub fn invalidate(&self, params: &Params) -> Result<bool> {
        self.cache.invalidate(&self.prefix, params)
    }

    /// Removes every entry in this namespace.
    pub fn invalidate_all(&self) -> Result<usize> {
        self.cache.invalidate_prefix(&self.prefix)
    }

    /// Returns the cached value, running `compute` on a miss and caching its
    /// result.
    ///
    /// The cache is an optimization, never a dependency: if the key cannot be
    /// built or the result cannot be stored, the failure is logged and the
    /// freshly computed value is returned anyway.
    pub fn get_or_compute<F>(&self, params: &Params, ttl: Option<Duration>, compute: F) -> T
    where
        F: FnOnce() -> T,
    {
        match self.get(params) {
            Ok(Some(value)) => return value,
            Ok(None) => {}
            Err(err) => {
                warn!(prefix = %self.prefix, %err, "cache lookup failed, computing directly");
                return compute();
            }
        }

        let value = compute();
        if let Err(err) = self.set(params, &value, ttl) {
            warn!(prefix = %self.prefix, %err, "failed to cache computed value");
        }
        value
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CacheConfig;
    use serde::Deserialize;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct GradeSummary {
        average: f64,
        ects_earned: u32,
    }

    fn test_handle() -> CacheHandle {
        CacheHandle::from_config(&CacheConfig::default())
    }

    fn params() -> Params {
        Params::new().with("student_id", "42").with("semester", 1)
    }

    #[test]
    fn test_namespace_round_trip() {
        let cache = test_handle();
        let grades: Namespace<GradeSummary> = cache.namespace("grade_summary");

        let summary = GradeSummary {
            average: 14.5,
            ects_earned: 30,
        };
        grades.set(&params(), &summary, None).unwrap();

        assert_eq!(grades.get(&params()).unwrap(), Some(summary));
    }

    #[test]
    fn test_namespace_miss_is_none() {
        let cache = test_handle();
        let grades: Namespace<GradeSummary> = cache.namespace("grade_summary");

        assert_eq!(grades.get(&params()).unwrap(), None);
    }

    #[test]
    fn test_namespace_type_mismatch_is_miss_and_drops_entry() {
        let cache = test_handle();

        // Break the prefix-per-type convention through the raw handle
        cache
            .set("grade_summary", &params(), json!("not a summary"), None)
            .unwrap();

        let grades: Namespace<GradeSummary> = cache.namespace("grade_summary");
        assert_eq!(grades.get(&params()).unwrap(), None);

        // The bad entry is gone
        assert_eq!(cache.get("grade_summary", &params()).unwrap(), None);
    }

    #[test]
    fn test_namespace_invalidate_all_leaves_other_prefixes() {
        let cache = test_handle();
        let grades: Namespace<GradeSummary> = cache.namespace("grade_summary");
        let averages: Namespace<f64> = cache.namespace("average");

        let summary = GradeSummary {
            average: 14.5,
            ects_earned: 30,
        };
        grades.set(&params(), &summary, None).unwrap();
        averages.set(&params(), &14.5, None).unwrap();

        assert_eq!(grades.invalidate_all().unwrap(), 1);
        assert_eq!(grades.get(&params()).unwrap(), None);
        assert_eq!(averages.get(&params()).unwrap(), Some(14.5));
    }

    #[test]
    fn test_get_or_compute_runs_once() {
        let cache = test_handle();
        let averages: Namespace<f64> = cache.namespace("average");
        let calls = AtomicUsize::new(0);

        let first = averages.get_or_compute(&params(), None, || {
            calls.fetch_add(1, Ordering::SeqCst);
            14.5
        });
        let second = averages.get_or_compute(&params(), None, || {
            calls.fetch_add(1, Ordering::SeqCst);
            0.0
        });

        assert_eq!(first, 14.5);
        assert_eq!(second, 14.5);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_get_or_compute_survives_bad_key() {
        let cache = test_handle();
        let averages: Namespace<f64> = cache.namespace("average");
        let bad_params = Params::new().with("group", "a|b");

        // The calculation still runs even though the key is unusable
        let value = averages.get_or_compute(&bad_params, None, || 14.5);
        assert_eq!(value, 14.5);
        assert!(cache.is_empty());
    }
}
