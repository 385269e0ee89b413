//! Persistent immutable arrays.
//!
//! An [`Array`] is an ordered sequence of members with cheap access at both
//! ends, logarithmic positional access, and logarithmic concatenation and
//! slicing. Every operation returns a new array and leaves its input
//! untouched; the two share every sub-structure the operation did not
//! have to rebuild.
//!
//! Internally an array takes one of three shapes:
//!
//! - empty
//! - small: up to [`MAX_SMALL`] members in one flat buffer
//! - deep: a finger tree with a *digit* of members at each end and a
//!   middle array of *nodes* (groups of [`MIN_LEAF`]..=[`MAX_LEAF`]
//!   members), nested one level deeper
//!
//! The shape is an implementation detail: arrays with the same members
//! compare equal and serialize identically whatever their shape.
//!
//! # Examples
//!
//! ```rust
//! use xqarray::array::Array;
//!
//! let array: Array<i32> = (1..=20).collect();
//! assert_eq!(array.get(19), Ok(&20));
//!
//! let middle = array.sub_array(5, 10).unwrap();
//! assert_eq!(middle.iter().copied().collect::<Vec<_>>(), (6..=15).collect::<Vec<_>>());
//!
//! // Structural sharing: the original array is preserved
//! let updated = array.put(0, 100).unwrap();
//! assert_eq!(array.head(), Ok(&1));
//! assert_eq!(updated.head(), Ok(&100));
//! ```

use std::fmt;
use std::hash::{Hash, Hasher};

use static_assertions::const_assert;

use crate::error::ArrayError;
use crate::interrupt::Interrupt;
use crate::member::{ArrayKey, Member};

use level::Members;
use tree::Tree;

// =============================================================================
// Reference Counter Type Alias
// =============================================================================

/// Reference-counted smart pointer shared between array versions.
///
/// `std::sync::Arc` with the `arc` feature, `std::rc::Rc` otherwise.
#[cfg(feature = "arc")]
pub(crate) type ReferenceCounter<T> = std::sync::Arc<T>;

#[cfg(not(feature = "arc"))]
pub(crate) type ReferenceCounter<T> = std::rc::Rc<T>;

// =============================================================================
// Shape Constants
// =============================================================================

/// Minimum number of elements in a node.
pub const MIN_LEAF: usize = 8;
/// Maximum number of elements in a node.
pub const MAX_LEAF: usize = 15;
/// Number of elements a digit keeps after a deep array is created.
pub const MIN_DIGIT: usize = MIN_LEAF / 2;
/// Maximum number of elements in a digit.
pub const MAX_DIGIT: usize = MAX_LEAF + MIN_DIGIT;
/// Maximum number of members of a small array.
pub const MAX_SMALL: usize = 2 * MIN_DIGIT - 1;

/// Capacity of a builder buffer: one element more than a full digit.
pub(crate) const BUFFER_CAPACITY: usize = MAX_DIGIT + 1;

const_assert!(MIN_LEAF <= MAX_LEAF);
const_assert!(2 * MIN_LEAF > MAX_LEAF);
const_assert!(MAX_DIGIT >= MAX_LEAF + MIN_DIGIT);
const_assert!(MAX_SMALL + 1 == 2 * MIN_DIGIT);
const_assert!(MAX_SMALL < MIN_LEAF);

mod builder;
mod cursor;
mod level;
mod node;
#[cfg(feature = "serde")]
mod serialization;
mod tree;

pub use builder::ArrayBuilder;
pub use cursor::ArrayCursor;

// =============================================================================
// Array Definition
// =============================================================================

/// A persistent immutable array.
///
/// Cloning is O(1). Operations that change the array return a new one,
/// sharing all untouched structure with `self`.
///
/// | Operation | Complexity |
/// |---|---|
/// | `len`, `head`, `last` | O(1) |
/// | `cons`, `snoc`, `init`, `tail` | O(1) amortized |
/// | `get`, `put`, `sub_array`, `insert_before`, `remove` | O(log n) |
/// | `concat` | O(log min(n, m)) |
/// | `reverse_array`, `iter` | O(n) |
///
/// # Examples
///
/// ```rust
/// use xqarray::array::Array;
///
/// let array = Array::new().cons(1).snoc(2);
/// assert_eq!(array.get(0), Ok(&1));
/// assert_eq!(array.get(1), Ok(&2));
/// assert_eq!(array.len(), 2);
/// ```
pub struct Array<M> {
    tree: Tree<Members<M>>,
}

impl<M> Clone for Array<M> {
    fn clone(&self) -> Self {
        Self {
            tree: self.tree.clone(),
        }
    }
}

impl<M> Array<M> {
    /// Creates an empty array.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use xqarray::array::Array;
    ///
    /// let array: Array<i32> = Array::new();
    /// assert!(array.is_empty());
    /// ```
    #[inline]
    #[must_use]
    pub const fn new() -> Self {
        Self { tree: Tree::Empty }
    }

    /// Returns the number of members.
    ///
    /// # Complexity
    ///
    /// O(1)
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.tree.size()
    }

    /// Returns `true` if the array has no members.
    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.tree.is_empty()
    }

    /// Returns the member at zero-based `index`.
    ///
    /// # Errors
    ///
    /// Returns [`ArrayError::Underflow`] if the array is empty and
    /// [`ArrayError::OutOfRange`] if `index >= self.len()`.
    ///
    /// # Complexity
    ///
    /// O(log n)
    ///
    /// # Examples
    ///
    /// ```rust
    /// use xqarray::array::Array;
    /// use xqarray::error::ArrayError;
    ///
    /// let array: Array<i32> = (0..100).collect();
    /// assert_eq!(array.get(42), Ok(&42));
    /// assert_eq!(array.get(100), Err(ArrayError::OutOfRange { index: 100, size: 100 }));
    /// ```
    pub fn get(&self, index: usize) -> Result<&M, ArrayError> {
        self.tree
            .get(index)
            .ok_or_else(|| self.bounds_error(index))
    }

    /// Returns the first member.
    ///
    /// # Errors
    ///
    /// Returns [`ArrayError::Underflow`] if the array is empty.
    pub fn head(&self) -> Result<&M, ArrayError> {
        self.tree.first().ok_or(ArrayError::Underflow)
    }

    /// Returns the last member.
    ///
    /// # Errors
    ///
    /// Returns [`ArrayError::Underflow`] if the array is empty.
    pub fn last(&self) -> Result<&M, ArrayError> {
        self.tree.last().ok_or(ArrayError::Underflow)
    }

    /// Returns a cursor over all members, positioned before the first one.
    #[must_use]
    pub fn iter(&self) -> ArrayCursor<'_, M> {
        ArrayCursor::new(&self.tree, 0)
    }

    /// Returns a cursor positioned before the member at `start`.
    ///
    /// `start == self.len()` yields a cursor at the end, which can still
    /// walk backwards.
    ///
    /// # Errors
    ///
    /// Returns [`ArrayError::OutOfRange`] if `start > self.len()`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use xqarray::array::Array;
    ///
    /// let array: Array<i32> = (0..50).collect();
    /// let mut cursor = array.iterator(48).unwrap();
    /// assert_eq!(cursor.next(), Some(&48));
    /// assert_eq!(cursor.previous(), Some(&48));
    /// assert_eq!(cursor.previous(), Some(&47));
    /// ```
    pub fn iterator(&self, start: usize) -> Result<ArrayCursor<'_, M>, ArrayError> {
        if start > self.len() {
            return Err(ArrayError::out_of_range(start, self.len()));
        }
        Ok(ArrayCursor::new(&self.tree, start))
    }

    /// Verifies the internal shape invariants.
    ///
    /// Only debug builds walk the structure; release builds return at
    /// once.
    ///
    /// # Panics
    ///
    /// Panics if an invariant is broken, which indicates a bug in this
    /// crate.
    pub fn check_invariants(&self) {
        if !cfg!(debug_assertions) {
            return;
        }
        if let Err(violation) = self.tree.verify(0) {
            tracing::error!(%violation, size = self.len(), "broken array structure");
            panic!("{violation}");
        }
    }

    fn bounds_error(&self, index: usize) -> ArrayError {
        if self.is_empty() {
            ArrayError::Underflow
        } else {
            ArrayError::out_of_range(index, self.len())
        }
    }
}

impl<M: Clone> Array<M> {
    /// Creates an array with a single member.
    #[inline]
    #[must_use]
    pub fn singleton(member: M) -> Self {
        Self::new().snoc(member)
    }

    /// Returns a new array with `member` prepended.
    ///
    /// # Complexity
    ///
    /// O(1) amortized
    #[must_use]
    pub fn cons(&self, member: M) -> Self {
        Self {
            tree: self.tree.cons(member),
        }
    }

    /// Returns a new array with `member` appended.
    ///
    /// # Complexity
    ///
    /// O(1) amortized
    #[must_use]
    pub fn snoc(&self, member: M) -> Self {
        Self {
            tree: self.tree.snoc(member),
        }
    }

    /// Returns a new array with the member at `index` replaced.
    ///
    /// # Errors
    ///
    /// Returns [`ArrayError::Underflow`] if the array is empty and
    /// [`ArrayError::OutOfRange`] if `index >= self.len()`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use xqarray::array::Array;
    ///
    /// let array: Array<i32> = (0..100).collect();
    /// let updated = array.put(50, -1).unwrap();
    /// assert_eq!(updated.get(50), Ok(&-1));
    /// assert_eq!(array.get(50), Ok(&50));
    /// ```
    pub fn put(&self, index: usize, member: M) -> Result<Self, ArrayError> {
        self.tree
            .put(index, member)
            .map(|tree| Self { tree })
            .ok_or_else(|| self.bounds_error(index))
    }

    /// Returns the concatenation of `self` and `other`.
    ///
    /// # Complexity
    ///
    /// O(log min(n, m))
    ///
    /// # Examples
    ///
    /// ```rust
    /// use xqarray::array::Array;
    ///
    /// let first: Array<i32> = (1..=10).collect();
    /// let second: Array<i32> = (11..=20).collect();
    /// assert_eq!(first.concat(&second), (1..=20).collect::<Array<i32>>());
    /// ```
    #[must_use]
    pub fn concat(&self, other: &Self) -> Self {
        Self {
            tree: self.tree.concat(&other.tree),
        }
    }

    /// Returns the array without its last member.
    ///
    /// # Errors
    ///
    /// Returns [`ArrayError::Underflow`] if the array is empty.
    pub fn init(&self) -> Result<Self, ArrayError> {
        self.tree
            .unsnoc()
            .map(|(tree, _)| Self { tree })
            .ok_or(ArrayError::Underflow)
    }

    /// Returns the array without its first member.
    ///
    /// # Errors
    ///
    /// Returns [`ArrayError::Underflow`] if the array is empty.
    pub fn tail(&self) -> Result<Self, ArrayError> {
        self.tree
            .uncons()
            .map(|(_, tree)| Self { tree })
            .ok_or(ArrayError::Underflow)
    }

    /// Returns the `length` members starting at `position`.
    ///
    /// Nodes that lie entirely inside the range are shared with `self`.
    ///
    /// # Errors
    ///
    /// Returns [`ArrayError::OutOfRange`] if `position + length > self.len()`.
    ///
    /// # Complexity
    ///
    /// O(log n)
    pub fn sub_array(&self, position: usize, length: usize) -> Result<Self, ArrayError> {
        let size = self.len();
        let end = position.saturating_add(length);
        if end > size {
            return Err(ArrayError::out_of_range(end, size));
        }
        if length == size {
            return Ok(self.clone());
        }
        if length == 0 {
            return Ok(Self::new());
        }
        let tail = self.drop_first(position);
        Ok(Self {
            tree: take_first(&tail, length),
        })
    }

    /// Returns the array with its members in reverse order.
    ///
    /// # Errors
    ///
    /// Returns [`ArrayError::Interrupted`] if `interrupt` fires.
    ///
    /// # Complexity
    ///
    /// O(n)
    pub fn reverse_array(&self, interrupt: &dyn Interrupt) -> Result<Self, ArrayError> {
        Ok(Self {
            tree: self.tree.reverse(interrupt)?,
        })
    }

    /// Returns a new array with `member` inserted before `position`.
    ///
    /// `position == self.len()` appends.
    ///
    /// # Errors
    ///
    /// Returns [`ArrayError::OutOfRange`] if `position > self.len()`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use xqarray::array::Array;
    ///
    /// let array: Array<i32> = vec![1, 2, 4].into();
    /// let inserted = array.insert_before(2, 3).unwrap();
    /// assert_eq!(inserted, Array::from(vec![1, 2, 3, 4]));
    /// ```
    pub fn insert_before(&self, position: usize, member: M) -> Result<Self, ArrayError> {
        let size = self.len();
        if position > size {
            return Err(ArrayError::out_of_range(position, size));
        }
        if position == 0 {
            return Ok(self.cons(member));
        }
        if position == size {
            return Ok(self.snoc(member));
        }
        let (before, at, _, after) = self
            .tree
            .split(position)
            .ok_or_else(|| ArrayError::out_of_range(position, size))?;
        Ok(Self {
            tree: before.snoc(member).concat(&after.cons(at)),
        })
    }

    /// Returns a new array without the member at `position`.
    ///
    /// # Errors
    ///
    /// Returns [`ArrayError::Underflow`] if the array is empty and
    /// [`ArrayError::OutOfRange`] if `position >= self.len()`.
    pub fn remove(&self, position: usize) -> Result<Self, ArrayError> {
        let (before, _, _, after) = self
            .tree
            .split(position)
            .ok_or_else(|| self.bounds_error(position))?;
        Ok(Self {
            tree: before.concat(&after),
        })
    }

    /// The members from `count` on; `count < self.len()`.
    fn drop_first(&self, count: usize) -> Tree<Members<M>> {
        if count == 0 {
            return self.tree.clone();
        }
        match self.tree.split(count) {
            Some((_, at, _, after)) => after.cons(at),
            None => Tree::Empty,
        }
    }

    /// Copies all members into a vector.
    ///
    /// # Errors
    ///
    /// Returns [`ArrayError::Interrupted`] if `interrupt` fires.
    pub fn to_vec(&self, interrupt: &dyn Interrupt) -> Result<Vec<M>, ArrayError> {
        let mut members = Vec::with_capacity(self.len());
        for (index, member) in self.iter().enumerate() {
            if index % INTERRUPT_INTERVAL == 0 {
                interrupt.check_stop()?;
            }
            members.push(member.clone());
        }
        Ok(members)
    }
}

/// The first `count` members of `tree`.
fn take_first<M: Clone>(tree: &Tree<Members<M>>, count: usize) -> Tree<Members<M>> {
    match tree.split(count) {
        Some((before, ..)) => before,
        None => tree.clone(),
    }
}

// =============================================================================
// Member Contract
// =============================================================================

impl<M: Member> Array<M> {
    /// Returns the member at 1-based position `key`.
    ///
    /// # Errors
    ///
    /// Returns [`ArrayError::InvalidKey`] if `key` is not an integer,
    /// [`ArrayError::Underflow`] if the array is empty and
    /// [`ArrayError::OutOfRange`] if the position is outside `1..=len`.
    pub fn lookup<K: ArrayKey + ?Sized>(&self, key: &K) -> Result<&M, ArrayError> {
        let position = key.position()?;
        let size = self.len();
        let index = usize::try_from(position)
            .ok()
            .filter(|position| (1..=size).contains(position))
            .map(|position| position - 1);
        match index {
            Some(index) => self.get(index),
            None if size == 0 => Err(ArrayError::Underflow),
            None => Err(ArrayError::OutOfRange {
                index: position,
                size,
            }),
        }
    }

    /// Returns `true` if every member is materialized.
    #[must_use]
    pub fn is_materialized(&self) -> bool {
        self.iter().all(|member| member.is_materialized())
    }

    /// Returns an array whose members are all materialized.
    ///
    /// Returns a clone of `self` if nothing needs to change.
    ///
    /// # Errors
    ///
    /// Returns [`ArrayError::Interrupted`] if `interrupt` fires.
    pub fn materialize(&self, interrupt: &dyn Interrupt) -> Result<Self, ArrayError> {
        if self.is_materialized() {
            return Ok(self.clone());
        }
        tracing::trace!(size = self.len(), "materializing array");
        let mut builder = ArrayBuilder::new();
        for member in self {
            interrupt.check_stop()?;
            builder.append(member.materialize(interrupt)?);
        }
        Ok(builder.finish())
    }

    /// Appends the diagnostic rendering of this array to `out`.
    ///
    /// Members with other than one item are parenthesized. With `indent`,
    /// separators are followed by a space.
    pub fn render(&self, indent: bool, level: usize, out: &mut String) {
        let separator = if indent { ", " } else { "," };
        out.push('[');
        for (position, member) in self.iter().enumerate() {
            if position > 0 {
                out.push_str(separator);
            }
            render_member(member, separator, indent, level, out);
        }
        out.push(']');
    }

    /// Renders this array as an expression, e.g. `[ 1, (2, 3) ]`.
    #[must_use]
    pub fn to_expression(&self) -> String {
        let mut out = String::from("[");
        for (position, member) in self.iter().enumerate() {
            out.push_str(if position == 0 { " " } else { ", " });
            render_member(member, ", ", true, 0, &mut out);
        }
        out.push_str(" ]");
        out
    }
}

/// Number of members copied between two interruption checks.
const INTERRUPT_INTERVAL: usize = 1 << 10;

fn render_member<M: Member>(
    member: &M,
    separator: &str,
    indent: bool,
    level: usize,
    out: &mut String,
) {
    let count = member.item_count();
    if count != 1 {
        out.push('(');
    }
    for index in 0..count {
        if index > 0 {
            out.push_str(separator);
        }
        member.render_item(index, indent, level, out);
    }
    if count != 1 {
        out.push(')');
    }
}

/// Arrays nest: an array is a single-item member of another array.
impl<M: Member> Member for Array<M> {
    fn render_item(&self, _index: usize, indent: bool, level: usize, out: &mut String) {
        self.render(indent, level, out);
    }

    fn is_materialized(&self) -> bool {
        Self::is_materialized(self)
    }

    fn materialize(&self, interrupt: &dyn Interrupt) -> Result<Self, ArrayError> {
        Self::materialize(self, interrupt)
    }
}

// =============================================================================
// Standard Trait Implementations
// =============================================================================

impl<M> Default for Array<M> {
    fn default() -> Self {
        Self::new()
    }
}

impl<M: Clone> FromIterator<M> for Array<M> {
    fn from_iter<I: IntoIterator<Item = M>>(iter: I) -> Self {
        let mut builder = ArrayBuilder::new();
        builder.extend(iter);
        builder.finish()
    }
}

impl<M: Clone> From<Vec<M>> for Array<M> {
    fn from(members: Vec<M>) -> Self {
        members.into_iter().collect()
    }
}

impl<'a, M> IntoIterator for &'a Array<M> {
    type Item = &'a M;
    type IntoIter = ArrayCursor<'a, M>;

    #[inline]
    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<M: PartialEq> PartialEq for Array<M> {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().eq(other.iter())
    }
}

impl<M: Eq> Eq for Array<M> {}

impl<M: Hash> Hash for Array<M> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.len().hash(state);
        for member in self {
            member.hash(state);
        }
    }
}

impl<M: fmt::Debug> fmt::Debug for Array<M> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.debug_list().entries(self.iter()).finish()
    }
}

impl<M: Member> fmt::Display for Array<M> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut out = String::new();
        self.render(true, 0, &mut out);
        formatter.write_str(&out)
    }
}
