//! Calc Cache - a keyed in-memory calculation cache
//!
//! Stores computed results keyed by an operation prefix plus a parameter set,
//! with per-entry TTL expiration, LRU-bounded storage, and prefix- or
//! entity-tag-based invalidation.
//!
//! Construct one [`CacheHandle`] at process start and clone it into every
//! consumer; give each calculation kind its own typed [`Namespace`].
//!
//! ```
//! use calc_cache::{CacheConfig, CacheHandle, Params};
//!
//! let cache = CacheHandle::from_config(&CacheConfig::default());
//! let averages = cache.namespace::<f64>("average");
//!
//! let params = Params::new().with("student_id", "42").with("semester", 1);
//! let average = averages.get_or_compute(&params, None, || 14.5);
//! assert_eq!(average, 14.5);
//! ```

pub mod cache;
pub mod config;
pub mod error;
pub mod handle;
pub mod typed;

pub use cache::{CacheKey, CacheStats, CacheStore, ParamValue, Params};
pub use config::CacheConfig;
pub use error::{CacheError, Result};
pub use handle::CacheHandle;
pub use typed::Namespace;
