//! Incremental construction of arrays.

use arrayvec::ArrayVec;

use super::level::{Level, Members, Nodes};
use super::node::Node;
use super::tree::Tree;
use super::{Array, BUFFER_CAPACITY, MAX_DIGIT, MAX_LEAF, MAX_SMALL, ReferenceCounter};

/// A mutable builder that produces an [`Array`] in amortized linear time.
///
/// Members are collected in two fixed-capacity buffers that mirror the
/// digits of a deep array. Whenever the trailing buffer overflows, a full
/// leaf is moved into the middle tree, so the finished array never needs
/// to be rebalanced. Whole arrays appended with
/// [`append_array`](Self::append_array) are joined structurally instead of
/// member by member.
///
/// # Examples
///
/// ```rust
/// use xqarray::array::{Array, ArrayBuilder};
///
/// let prefix: Array<i32> = (0..500).collect();
///
/// let mut builder = ArrayBuilder::new();
/// builder.append_array(&prefix);
/// builder.extend(500..1000);
/// let array = builder.finish();
///
/// assert_eq!(array.len(), 1000);
/// assert_eq!(array, (0..1000).collect::<Array<i32>>());
/// ```
pub struct ArrayBuilder<M> {
    left: ArrayVec<M, MAX_DIGIT>,
    middle: Tree<Nodes<M>>,
    right: ArrayVec<M, BUFFER_CAPACITY>,
    size: usize,
}

impl<M> ArrayBuilder<M> {
    /// Creates an empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self {
            left: ArrayVec::new(),
            middle: Tree::Empty,
            right: ArrayVec::new(),
            size: 0,
        }
    }

    /// Number of members appended so far.
    #[inline]
    #[must_use]
    pub const fn len(&self) -> usize {
        self.size
    }

    /// Returns `true` if nothing was appended yet.
    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.size == 0
    }
}

impl<M: Clone> ArrayBuilder<M> {
    /// Appends a single member.
    ///
    /// # Complexity
    ///
    /// O(1) amortized
    pub fn append(&mut self, member: M) {
        self.size += 1;
        if self.middle.is_empty() && self.right.is_empty() && !self.left.is_full() {
            self.left.push(member);
            return;
        }
        self.right.push(member);
        if self.right.len() > MAX_DIGIT {
            let leaf: ReferenceCounter<[M]> = self.right.drain(..MAX_LEAF).collect();
            self.middle = self.middle.snoc(Node::Leaf(leaf));
        }
    }

    /// Appends all members of `array`.
    ///
    /// Deep arrays are concatenated with the members collected so far;
    /// their inner nodes are shared, not copied.
    ///
    /// # Complexity
    ///
    /// O(log n) for deep arrays
    pub fn append_array(&mut self, array: &Array<M>) {
        match &array.tree {
            Tree::Empty => {}
            Tree::Small { items, .. } => {
                for member in items.iter() {
                    self.append(member.clone());
                }
            }
            Tree::Deep(_) => {
                let joined = self.snapshot().concat(&array.tree);
                self.reload(&joined);
            }
        }
    }

    /// Finishes building and returns the array in its cheapest shape.
    #[must_use]
    pub fn finish(self) -> Array<M> {
        let tree = self.snapshot();
        tracing::trace!(size = tree.size(), shape = tree.shape(), "array built");
        Array { tree }
    }

    /// The tree holding every member appended so far.
    fn snapshot(&self) -> Tree<Members<M>> {
        let left = self.left.as_slice();
        let right = self.right.as_slice();
        if left.is_empty() {
            return Tree::Empty;
        }
        if self.middle.is_empty() {
            if right.is_empty() {
                return Tree::from_items(left);
            }
            if left.len() + right.len() <= MAX_SMALL {
                return Tree::small(left.iter().chain(right).cloned().collect());
            }
            return Tree::deep(left.into(), Tree::Empty, right.into());
        }
        if right.is_empty() {
            return match self.middle.unsnoc() {
                Some((middle, node)) => {
                    Tree::deep(left.into(), middle, Members::<M>::unwrap(&node).clone())
                }
                None => Tree::from_items(left),
            };
        }
        Tree::deep(left.into(), self.middle.clone(), right.into())
    }

    /// Replaces the builder state with the contents of `tree`.
    fn reload(&mut self, tree: &Tree<Members<M>>) {
        self.left.clear();
        self.right.clear();
        self.middle = Tree::Empty;
        self.size = tree.size();
        match tree {
            Tree::Empty => {}
            Tree::Small { items, .. } => self.left.extend(items.iter().cloned()),
            Tree::Deep(deep) => {
                self.left.extend(deep.left.iter().cloned());
                self.middle = deep.middle.clone();
                self.right.extend(deep.right.iter().cloned());
            }
        }
    }
}

impl<M> Default for ArrayBuilder<M> {
    fn default() -> Self {
        Self::new()
    }
}

impl<M: Clone> Extend<M> for ArrayBuilder<M> {
    fn extend<I: IntoIterator<Item = M>>(&mut self, iter: I) {
        for member in iter {
            self.append(member);
        }
    }
}
