//! Cache Key Module
//!
//! Derives deterministic cache keys from an operation prefix and a parameter
//! set. Parameters are sorted by name before rendering, so semantically
//! identical parameter sets always produce the same key regardless of the
//! order they were supplied in.

use std::collections::BTreeMap;
use std::fmt;

use crate::cache::MAX_KEY_LENGTH;
use crate::error::{CacheError, Result};

// == Delimiters ==
/// Separates `name:value` pairs in the parameter blob.
pub const PAIR_DELIMITER: char = '|';
/// Separates the prefix from the blob, and names from values within a pair.
pub const SEGMENT_DELIMITER: char = ':';

// == Param Value ==
/// A primitive parameter value usable in a cache key.
///
/// Only scalars are representable; nested structures must be flattened by the
/// caller before keying.
#[derive(Debug, Clone, PartialEq)]
pub enum ParamValue {
    Str(String),
    Int(i64),
    Float(f64),
    Bool(bool),
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamValue::Str(s) => f.write_str(s),
            ParamValue::Int(i) => write!(f, "{}", i),
            ParamValue::Float(x) => write!(f, "{}", x),
            ParamValue::Bool(b) => write!(f, "{}", b),
        }
    }
}

impl From<&str> for ParamValue {
    fn from(value: &str) -> Self {
        ParamValue::Str(value.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(value: String) -> Self {
        ParamValue::Str(value)
    }
}

impl From<i64> for ParamValue {
    fn from(value: i64) -> Self {
        ParamValue::Int(value)
    }
}

impl From<i32> for ParamValue {
    fn from(value: i32) -> Self {
        ParamValue::Int(value.into())
    }
}

impl From<u32> for ParamValue {
    fn from(value: u32) -> Self {
        ParamValue::Int(value.into())
    }
}

impl From<f64> for ParamValue {
    fn from(value: f64) -> Self {
        ParamValue::Float(value)
    }
}

impl From<bool> for ParamValue {
    fn from(value: bool) -> Self {
        ParamValue::Bool(value)
    }
}

// == Params ==
/// A named set of key parameters.
///
/// Backed by a `BTreeMap`, so iteration is always in lexicographic name
/// order; key determinism does not depend on insertion order. Inserting a
/// name twice keeps the last value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Params {
    values: BTreeMap<String, ParamValue>,
}

impl Params {
    /// Creates an empty parameter set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a parameter, consuming and returning the set for chaining.
    pub fn with(mut self, name: impl Into<String>, value: impl Into<ParamValue>) -> Self {
        self.insert(name, value);
        self
    }

    /// Adds a parameter in place.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<ParamValue>) {
        self.values.insert(name.into(), value.into());
    }

    /// Returns the number of parameters.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns true if the set has no parameters.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Iterates parameters in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ParamValue)> {
        self.values.iter().map(|(name, value)| (name.as_str(), value))
    }
}

// == Cache Key ==
/// A derived cache key: `prefix:name:value|name:value|...`.
///
/// The prefix is always segment-delimited from the parameter blob, so two
/// distinct prefixes can never collide.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey(String);

impl CacheKey {
    /// Derives the key for a prefix and parameter set.
    ///
    /// Fails with [`CacheError::InvalidPrefix`] or
    /// [`CacheError::InvalidParameter`] when the input cannot be rendered
    /// deterministically: delimiter characters in the wrong position,
    /// non-finite floats, or a derived key over [`MAX_KEY_LENGTH`] bytes.
    pub fn build(prefix: &str, params: &Params) -> Result<Self> {
        validate_prefix(prefix)?;

        let mut key = String::with_capacity(prefix.len() + 1 + 16 * params.len());
        key.push_str(prefix);
        key.push(SEGMENT_DELIMITER);

        let mut first = true;
        for (name, value) in params.iter() {
            validate_name(name)?;
            validate_value(name, value)?;
            if !first {
                key.push(PAIR_DELIMITER);
            }
            key.push_str(name);
            key.push(SEGMENT_DELIMITER);
            key.push_str(&value.to_string());
            first = false;
        }

        if key.len() > MAX_KEY_LENGTH {
            return Err(CacheError::InvalidParameter(format!(
                "Derived key for prefix '{}' exceeds maximum length of {} bytes",
                prefix, MAX_KEY_LENGTH
            )));
        }

        Ok(CacheKey(key))
    }

    /// Returns the full key string.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the prefix segment of the key.
    pub fn prefix(&self) -> &str {
        match self.0.split_once(SEGMENT_DELIMITER) {
            Some((prefix, _)) => prefix,
            None => &self.0,
        }
    }

    /// Returns the parameter blob: everything after the first delimiter.
    pub fn param_blob(&self) -> &str {
        match self.0.split_once(SEGMENT_DELIMITER) {
            Some((_, blob)) => blob,
            None => "",
        }
    }

    /// Returns true if this key belongs to the given prefix.
    pub fn has_prefix(&self, prefix: &str) -> bool {
        self.prefix() == prefix
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// == Validation ==
/// Checks that a prefix is non-empty and delimiter-free.
pub(crate) fn validate_prefix(prefix: &str) -> Result<()> {
    if prefix.is_empty() {
        return Err(CacheError::InvalidPrefix("Prefix cannot be empty".to_string()));
    }
    if prefix.contains(SEGMENT_DELIMITER) || prefix.contains(PAIR_DELIMITER) {
        return Err(CacheError::InvalidPrefix(format!(
            "Prefix '{}' contains a delimiter character",
            prefix
        )));
    }
    Ok(())
}

fn validate_name(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(CacheError::InvalidParameter(
            "Parameter name cannot be empty".to_string(),
        ));
    }
    if name.contains(SEGMENT_DELIMITER) || name.contains(PAIR_DELIMITER) {
        return Err(CacheError::InvalidParameter(format!(
            "Parameter name '{}' contains a delimiter character",
            name
        )));
    }
    Ok(())
}

fn validate_value(name: &str, value: &ParamValue) -> Result<()> {
    match value {
        // A ':' inside a value cannot collide because names are ':'-free,
        // so only the pair delimiter is rejected here.
        ParamValue::Str(s) if s.contains(PAIR_DELIMITER) => {
            Err(CacheError::InvalidParameter(format!(
                "Value for parameter '{}' contains the '{}' delimiter",
                name, PAIR_DELIMITER
            )))
        }
        ParamValue::Float(x) if !x.is_finite() => Err(CacheError::InvalidParameter(format!(
            "Value for parameter '{}' is not a finite number",
            name
        ))),
        _ => Ok(()),
    }
}
