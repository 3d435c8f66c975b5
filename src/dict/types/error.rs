//! Custom error types for the dictfile crate.

use thiserror::Error;

/// The primary error type for all operations in this crate.
#[derive(Debug, Error)]
pub enum DictError {
    /// An error originating from I/O operations. Propagated unchanged;
    /// retry policy, if any, belongs to the caller.
    #[error("I/O error: {0:?}")]
    Io(#[from] std::io::Error),

    /// The dictionary file declares a format version this crate does not know.
    /// Raised before any byte past the version field is consumed.
    #[error("Unsupported dictionary version: {0}. Only versions 0 and 1 are supported.")]
    UnsupportedVersion(u32),

    /// The file is structurally corrupt: a broken offset table, a dangling
    /// back-reference, an unknown tag, or a trailer sentinel mismatch.
    /// The file must be treated as unusable.
    #[error("Dictionary file is corrupt: {0}")]
    Corrupt(String),

    /// An element decoder consumed a different number of bytes than the
    /// offset table records for it.
    #[error("Size mismatch for {context}: expected {expected} bytes, but found {found} bytes")]
    SizeMismatch {
        context: &'static str,
        expected: u64,
        found: u64,
    },

    /// A positional lookup outside `[0, len)`. A contract violation by the
    /// caller, not a data problem.
    #[error("Index {index} out of range for list of length {len}")]
    OutOfRange { index: usize, len: usize },

    /// A mutex lock was poisoned, indicating a panic in another thread holding the lock.
    #[error("A mutex lock was poisoned, indicating a panic in another thread holding the lock.")]
    LockPoisoned,
}

/// A convenience `Result` type alias using the crate's `DictError` type.
pub type Result<T> = std::result::Result<T, DictError>;
