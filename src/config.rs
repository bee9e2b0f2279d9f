//! Configuration Module
//!
//! Handles loading and managing cache configuration from environment variables.

use std::env;
use std::time::Duration;

/// Cache configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// Maximum number of entries the cache can hold
    pub max_entries: usize,
    /// Default TTL in milliseconds for entries without explicit TTL
    pub default_ttl_ms: u64,
}

impl CacheConfig {
    /// Creates a new CacheConfig by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `CALC_CACHE_MAX_ENTRIES` - Maximum cache entries (default: 1000)
    /// - `CALC_CACHE_DEFAULT_TTL_MS` - Default TTL in milliseconds (default: 300000)
    pub fn from_env() -> Self {
        Self {
            max_entries: env::var("CALC_CACHE_MAX_ENTRIES")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(crate::cache::DEFAULT_MAX_ENTRIES),
            default_ttl_ms: env::var("CALC_CACHE_DEFAULT_TTL_MS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(crate::cache::DEFAULT_TTL_MS),
        }
    }

    /// Returns the default TTL as a [`Duration`].
    pub fn default_ttl(&self) -> Duration {
        Duration::from_millis(self.default_ttl_ms)
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_entries: crate::cache::DEFAULT_MAX_ENTRIES,
            default_ttl_ms: crate::cache::DEFAULT_TTL_MS,
        }
    }
}
