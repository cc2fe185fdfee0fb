//! Error model for fallible dictionary lookups and inserts.

use thiserror::Error;

/// Result type returned by the fallible `WeakKeyDictionary` entry points.
pub type WeakKeyResult<T> = Result<T, WeakKeyError>;

/// Failures surfaced by `WeakKeyDictionary`.
///
/// Both are contract or expected-miss conditions; neither is transient.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WeakKeyError {
    /// A weak key handle was supplied that no longer refers to a live object.
    #[error("key handle does not refer to a live object")]
    NullKey,

    /// No live entry matched the key.
    #[error("key was not found in the dictionary")]
    KeyNotFound,
}
