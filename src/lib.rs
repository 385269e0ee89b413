//! # xqarray
//!
//! Persistent immutable arrays for query-language runtimes.
//!
//! ## Overview
//!
//! An [`Array`](array::Array) is an immutable ordered sequence of opaque
//! members. Every update returns a new version that shares all untouched
//! structure with the old one, so versions are cheap to keep and safe to
//! read from many places at once.
//!
//! - **Arrays**: O(1) amortized access at both ends, O(log n) positional
//!   access, slicing and concatenation
//! - **Builders**: amortized linear construction from members and whole
//!   arrays
//! - **Cursors**: bidirectional, position-addressable traversal
//! - **Member contract**: rendering and materialization of stored values
//!
//! ## Feature Flags
//!
//! - `arc`: share sub-structures through `Arc`, making arrays `Send + Sync`
//! - `serde` (default): serde support and the binary persistence format
//!
//! ## Example
//!
//! ```rust
//! use xqarray::prelude::*;
//!
//! let array: Array<i32> = (1..=20).collect();
//! let reversed = array.reverse_array(&NeverInterrupt).unwrap();
//! assert_eq!(reversed.head(), Ok(&20));
//! assert_eq!(array.concat(&reversed).len(), 40);
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

/// Prelude module for convenient imports.
///
/// # Usage
///
/// ```rust
/// use xqarray::prelude::*;
/// ```
pub mod prelude {
    pub use crate::array::{Array, ArrayBuilder, ArrayCursor};
    pub use crate::error::ArrayError;
    pub use crate::interrupt::{Interrupt, NeverInterrupt};
    pub use crate::member::{ArrayKey, Member};
}

pub mod array;
pub mod error;
pub mod interrupt;
pub mod member;

#[cfg(feature = "serde")]
pub mod persist;
