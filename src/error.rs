//! Error types for the calculation cache
//!
//! Provides unified error handling using thiserror.

use thiserror::Error;

// == Cache Error Enum ==
/// Unified error type for the calculation cache.
///
/// A cache miss is never an error; lookups report misses as `Ok(None)`.
/// Errors are raised only for input that cannot produce a well-formed key
/// or a storable value, and they are raised synchronously so the caller can
/// fall through to the uncached calculation.
#[derive(Error, Debug)]
pub enum CacheError {
    /// Key prefix is empty or contains a delimiter character
    #[error("Invalid prefix: {0}")]
    InvalidPrefix(String),

    /// A parameter cannot be deterministically serialized into the key
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// A value could not be encoded for storage
    #[error("Encoding failed: {0}")]
    Encoding(String),
}

// == Result Type Alias ==
/// Convenience Result type for the calculation cache.
pub type Result<T> = std::result::Result<T, CacheError>;
