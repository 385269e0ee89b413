//! Error types for array operations.
//!
//! Every fallible operation on [`Array`](crate::array::Array) reports one of
//! the [`ArrayError`] kinds. Nothing is ever mutated in place, so an error
//! never leaves a partially updated array behind.

use thiserror::Error;

/// Errors raised by array operations.
///
/// # Examples
///
/// ```rust
/// use xqarray::array::Array;
/// use xqarray::error::ArrayError;
///
/// let empty: Array<i32> = Array::new();
/// assert_eq!(empty.head(), Err(ArrayError::Underflow));
///
/// let array: Array<i32> = (1..=3).collect();
/// assert_eq!(
///     array.get(5),
///     Err(ArrayError::OutOfRange { index: 5, size: 3 })
/// );
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ArrayError {
    /// The operation needs at least one member, but the array is empty.
    #[error("array is empty")]
    Underflow,

    /// An index outside `[0, size)` was used.
    #[error("array index {index} out of bounds (size: {size})")]
    OutOfRange {
        /// The offending index, as given by the caller.
        index: i64,
        /// The size of the array at the time of the access.
        size: usize,
    },

    /// A lookup key of the wrong kind was used.
    #[error("invalid array key: {found}")]
    InvalidKey {
        /// Rendering of the rejected key.
        found: String,
    },

    /// The host requested cancellation during a linear traversal.
    #[error("array operation interrupted")]
    Interrupted,
}

impl ArrayError {
    /// Builds an [`ArrayError::OutOfRange`] from a zero-based position.
    pub(crate) fn out_of_range(index: usize, size: usize) -> Self {
        Self::OutOfRange {
            index: i64::try_from(index).unwrap_or(i64::MAX),
            size,
        }
    }
}

/// A broken structural invariant, reported by the debug-only checker.
///
/// Only an implementation bug can produce this; it is never returned to
/// callers of the public API.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("array invariant violated: {0}")]
pub(crate) struct InvariantViolation(pub(crate) String);

/// Errors raised while writing or reading the binary array format.
#[cfg(feature = "serde")]
#[derive(Debug, Error)]
pub enum PersistError {
    /// A member (or the member count) could not be encoded.
    #[error("failed to write array: {0}")]
    Encode(#[from] bincode::error::EncodeError),

    /// The input was not a valid array encoding.
    #[error("failed to read array: {0}")]
    Decode(#[from] bincode::error::DecodeError),
}
