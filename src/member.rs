//! The contract between an array and the values it stores.
//!
//! An array treats its members as opaque, already immutable values. It
//! only needs three capabilities from them, bundled in [`Member`]:
//!
//! - rendering, item by item, for diagnostics
//! - a "materialized" predicate
//! - materialization (a deep copy that no longer depends on external state)
//!
//! [`ArrayKey`] is the contract for values used to look members up by
//! position with [`Array::lookup`](crate::array::Array::lookup).

use crate::error::ArrayError;
use crate::interrupt::Interrupt;

/// A value that can be stored in an [`Array`](crate::array::Array).
///
/// A member is a sequence of items. Most members hold exactly one item;
/// members with zero or several items are parenthesized when the array is
/// rendered.
///
/// # Examples
///
/// ```rust
/// use xqarray::array::Array;
/// use xqarray::member::Member;
///
/// #[derive(Clone)]
/// struct Pair(i32, i32);
///
/// impl Member for Pair {
///     fn item_count(&self) -> usize {
///         2
///     }
///
///     fn render_item(&self, index: usize, _indent: bool, _level: usize, out: &mut String) {
///         let value = if index == 0 { self.0 } else { self.1 };
///         out.push_str(&value.to_string());
///     }
/// }
///
/// let array = Array::new().snoc(Pair(1, 2)).snoc(Pair(3, 4));
/// assert_eq!(array.to_string(), "[(1, 2), (3, 4)]");
/// ```
pub trait Member: Clone {
    /// Number of items in this member.
    fn item_count(&self) -> usize {
        1
    }

    /// Appends the rendering of the item at `index` to `out`.
    ///
    /// `level` is the current nesting depth; members that render nested
    /// structures pass it on (maps increase it by one).
    fn render_item(&self, index: usize, indent: bool, level: usize, out: &mut String);

    /// Returns `true` if this member can be reused as is.
    fn is_materialized(&self) -> bool {
        true
    }

    /// Returns a copy of this member that is independent of any external state.
    ///
    /// # Errors
    ///
    /// Returns [`ArrayError::Interrupted`] if `interrupt` fires while
    /// copying nested content.
    fn materialize(&self, _interrupt: &dyn Interrupt) -> Result<Self, ArrayError> {
        Ok(self.clone())
    }
}

macro_rules! impl_member_for_display {
    ($($type:ty),* $(,)?) => {
        $(
            impl Member for $type {
                fn render_item(&self, _index: usize, _indent: bool, _level: usize, out: &mut String) {
                    out.push_str(&self.to_string());
                }
            }
        )*
    };
}

impl_member_for_display!(
    i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize, f32, f64, bool, char,
);

impl Member for String {
    fn render_item(&self, _index: usize, _indent: bool, _level: usize, out: &mut String) {
        out.push('"');
        out.push_str(&self.replace('"', "\"\""));
        out.push('"');
    }
}

/// A value that can address an array member by its 1-based position.
///
/// # Examples
///
/// ```rust
/// use xqarray::array::Array;
///
/// let array: Array<i32> = (10..15).collect();
/// assert_eq!(array.lookup(&1_i64), Ok(&10));
/// assert_eq!(array.lookup("5"), Ok(&14));
/// assert!(array.lookup(&1.5_f64).is_err());
/// ```
pub trait ArrayKey {
    /// Returns the 1-based position denoted by this key.
    ///
    /// # Errors
    ///
    /// Returns [`ArrayError::InvalidKey`] if this key is not an integer
    /// and cannot be read as one.
    fn position(&self) -> Result<i64, ArrayError>;
}

macro_rules! impl_array_key_for_integer {
    ($($type:ty),* $(,)?) => {
        $(
            impl ArrayKey for $type {
                #[inline]
                fn position(&self) -> Result<i64, ArrayError> {
                    Ok(i64::from(*self))
                }
            }
        )*
    };
}

impl_array_key_for_integer!(i8, i16, i32, i64, u8, u16, u32);

impl ArrayKey for u64 {
    fn position(&self) -> Result<i64, ArrayError> {
        Ok(i64::try_from(*self).unwrap_or(i64::MAX))
    }
}

impl ArrayKey for usize {
    fn position(&self) -> Result<i64, ArrayError> {
        Ok(i64::try_from(*self).unwrap_or(i64::MAX))
    }
}

/// Untyped keys are cast to integers.
impl ArrayKey for str {
    fn position(&self) -> Result<i64, ArrayError> {
        self.trim()
            .parse::<i64>()
            .map_err(|_| ArrayError::InvalidKey {
                found: format!("\"{self}\""),
            })
    }
}

impl ArrayKey for String {
    fn position(&self) -> Result<i64, ArrayError> {
        self.as_str().position()
    }
}

impl ArrayKey for f64 {
    fn position(&self) -> Result<i64, ArrayError> {
        Err(ArrayError::InvalidKey {
            found: self.to_string(),
        })
    }
}

impl ArrayKey for bool {
    fn position(&self) -> Result<i64, ArrayError> {
        Err(ArrayError::InvalidKey {
            found: format!("{self}()"),
        })
    }
}
