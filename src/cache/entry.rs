//! Cache Entry Module
//!
//! Defines the structure for individual cache entries with TTL support.

use std::time::{Duration, Instant};

// == Cache Entry ==
/// A single cache entry: the stored value plus its expiry metadata.
///
/// Timestamps use the monotonic clock, so wall-clock adjustments cannot
/// revive or prematurely expire an entry.
#[derive(Debug, Clone)]
pub struct CacheEntry<V> {
    /// The stored value, opaque to the cache
    pub value: V,
    /// Creation time
    created_at: Instant,
    /// Entry-specific time-to-live
    ttl: Duration,
}

impl<V> CacheEntry<V> {
    /// Creates a new cache entry with the given TTL.
    pub fn new(value: V, ttl: Duration) -> Self {
        Self {
            value,
            created_at: Instant::now(),
            ttl,
        }
    }

    // == Is Expired ==
    /// Checks if the entry has expired.
    ///
    /// Boundary condition: an entry is valid while `elapsed <= ttl` and
    /// expired strictly after its TTL has elapsed. Expired entries are inert;
    /// the store removes them on the next access.
    pub fn is_expired(&self) -> bool {
        self.created_at.elapsed() > self.ttl
    }

    /// Returns the remaining TTL, saturating at zero once expired.
    pub fn remaining(&self) -> Duration {
        self.ttl.saturating_sub(self.created_at.elapsed())
    }

    /// Returns the age of the entry.
    pub fn age(&self) -> Duration {
        self.created_at.elapsed()
    }

    /// Creates an entry whose creation time lies `age` in the past.
    #[cfg(test)]
    pub(crate) fn backdated(value: V, ttl: Duration, age: Duration) -> Self {
        Self {
            value,
            created_at: Instant::now() - age,
            ttl,
        }
    }
}
