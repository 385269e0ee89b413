//! Bidirectional traversal of an array.
//!
//! A cursor flattens the spine of a deep array into its *segments*: the
//! left digits from the outermost level inwards, the innermost small
//! buffer, then the right digits from the innermost level outwards. Inside
//! a segment of nodes the cursor keeps a stack of frames down to the
//! current leaf, so every step costs O(1) amortized.

use std::fmt;
use std::iter::FusedIterator;

use smallvec::SmallVec;

use super::level::Members;
use super::node::Node;
use super::tree::Tree;

/// A run of elements on the spine, in member order.
enum Segment<'a, M> {
    Members(&'a [M]),
    Nodes(&'a [Node<M>]),
}

impl<M> Clone for Segment<'_, M> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<M> Copy for Segment<'_, M> {}

impl<M> Segment<'_, M> {
    fn size(&self) -> usize {
        match self {
            Self::Members(members) => members.len(),
            Self::Nodes(nodes) => nodes.iter().map(Node::size).sum(),
        }
    }
}

/// A position inside a slice of sibling nodes.
struct Frame<'a, M> {
    nodes: &'a [Node<M>],
    index: usize,
}

impl<M> Clone for Frame<'_, M> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<M> Copy for Frame<'_, M> {}

/// A bidirectional cursor over the members of an [`Array`](super::Array).
///
/// The cursor sits *between* two members. [`next`](Iterator::next)
/// returns the member after it and moves forward,
/// [`previous`](Self::previous) returns the member before it and moves
/// back. Each call to [`Array::iterator`](super::Array::iterator) creates
/// an independent cursor; any number of them can walk the same array at
/// the same time.
///
/// # Examples
///
/// ```rust
/// use xqarray::array::Array;
///
/// let array: Array<i32> = (0..100).collect();
/// let mut cursor = array.iterator(10).unwrap();
///
/// assert_eq!(cursor.next_index(), 10);
/// assert_eq!(cursor.next(), Some(&10));
/// assert_eq!(cursor.next(), Some(&11));
/// assert_eq!(cursor.previous(), Some(&11));
/// assert_eq!(cursor.previous_index(), Some(10));
/// assert_eq!(cursor.len(), 89);
/// ```
pub struct ArrayCursor<'a, M> {
    segments: SmallVec<[Segment<'a, M>; 8]>,
    segment: usize,
    frames: SmallVec<[Frame<'a, M>; 8]>,
    leaf: &'a [M],
    offset: usize,
    /// Index of the member at `leaf[offset]`.
    pointer: usize,
    /// Index of the member returned by the next call to `next`.
    position: usize,
    size: usize,
}

impl<'a, M> ArrayCursor<'a, M> {
    /// Creates a cursor before the member at `start`; `start <= tree.size()`.
    pub(crate) fn new(tree: &'a Tree<Members<M>>, start: usize) -> Self {
        let size = tree.size();
        let mut cursor = Self {
            segments: spine(tree),
            segment: 0,
            frames: SmallVec::new(),
            leaf: &[],
            offset: 0,
            pointer: 0,
            position: start.min(size),
            size,
        };
        if size > 0 {
            cursor.seek(cursor.position.min(size - 1));
        }
        cursor
    }

    /// Returns `true` if [`next`](Iterator::next) would return a member.
    #[inline]
    #[must_use]
    pub const fn has_next(&self) -> bool {
        self.position < self.size
    }

    /// Returns `true` if [`previous`](Self::previous) would return a member.
    #[inline]
    #[must_use]
    pub const fn has_previous(&self) -> bool {
        self.position > 0
    }

    /// Index of the member the next call to [`next`](Iterator::next) returns.
    #[inline]
    #[must_use]
    pub const fn next_index(&self) -> usize {
        self.position
    }

    /// Index of the member the next call to [`previous`](Self::previous)
    /// returns, or `None` at the start.
    #[inline]
    #[must_use]
    pub const fn previous_index(&self) -> Option<usize> {
        self.position.checked_sub(1)
    }

    /// Moves back and returns the member before the cursor.
    pub fn previous(&mut self) -> Option<&'a M> {
        if self.position == 0 {
            return None;
        }
        self.position -= 1;
        if self.pointer > self.position {
            self.retreat();
        }
        self.leaf.get(self.offset)
    }

    /// Positions the pointer on member `index < self.size`.
    fn seek(&mut self, index: usize) {
        let mut remaining = index;
        let mut found = None;
        for (segment, entry) in self.segments.iter().enumerate() {
            let size = entry.size();
            if remaining < size {
                found = Some((segment, *entry));
                break;
            }
            remaining -= size;
        }
        let Some((segment, entry)) = found else {
            return;
        };
        self.segment = segment;
        self.pointer = index;
        self.frames.clear();
        match entry {
            Segment::Members(members) => {
                self.leaf = members;
                self.offset = remaining;
            }
            Segment::Nodes(nodes) => self.descend_to(nodes, remaining),
        }
    }

    fn descend_to(&mut self, nodes: &'a [Node<M>], offset: usize) {
        let mut nodes = nodes;
        let mut remaining = offset;
        loop {
            let Some(index) = child_at(nodes, &mut remaining) else {
                return;
            };
            self.frames.push(Frame { nodes, index });
            match &nodes[index] {
                Node::Leaf(members) => {
                    self.leaf = &members[..];
                    self.offset = remaining;
                    return;
                }
                Node::Branch { children, .. } => nodes = &children[..],
            }
        }
    }

    fn descend_first(&mut self, node: &'a Node<M>) {
        let mut node = node;
        loop {
            match node {
                Node::Leaf(members) => {
                    self.leaf = &members[..];
                    self.offset = 0;
                    return;
                }
                Node::Branch { children, .. } => {
                    self.frames.push(Frame {
                        nodes: children,
                        index: 0,
                    });
                    node = &children[0];
                }
            }
        }
    }

    fn descend_last(&mut self, node: &'a Node<M>) {
        let mut node = node;
        loop {
            match node {
                Node::Leaf(members) => {
                    self.leaf = &members[..];
                    self.offset = members.len() - 1;
                    return;
                }
                Node::Branch { children, .. } => {
                    let index = children.len() - 1;
                    self.frames.push(Frame {
                        nodes: children,
                        index,
                    });
                    node = &children[index];
                }
            }
        }
    }

    /// Moves the pointer to the following member.
    fn advance(&mut self) {
        self.pointer += 1;
        if self.offset + 1 < self.leaf.len() {
            self.offset += 1;
            return;
        }
        while let Some(frame) = self.frames.last_mut() {
            if frame.index + 1 < frame.nodes.len() {
                frame.index += 1;
                let nodes = frame.nodes;
                let index = frame.index;
                self.descend_first(&nodes[index]);
                return;
            }
            self.frames.pop();
        }
        self.segment += 1;
        match self.segments.get(self.segment).copied() {
            Some(Segment::Members(members)) => {
                self.leaf = members;
                self.offset = 0;
            }
            Some(Segment::Nodes(nodes)) => {
                self.frames.push(Frame { nodes, index: 0 });
                self.descend_first(&nodes[0]);
            }
            None => {}
        }
    }

    /// Moves the pointer to the preceding member.
    fn retreat(&mut self) {
        self.pointer -= 1;
        if self.offset > 0 {
            self.offset -= 1;
            return;
        }
        while let Some(frame) = self.frames.last_mut() {
            if frame.index > 0 {
                frame.index -= 1;
                let nodes = frame.nodes;
                let index = frame.index;
                self.descend_last(&nodes[index]);
                return;
            }
            self.frames.pop();
        }
        let Some(segment) = self.segment.checked_sub(1) else {
            return;
        };
        self.segment = segment;
        let entry = self.segments[segment];
        match entry {
            Segment::Members(members) => {
                self.leaf = members;
                self.offset = members.len() - 1;
            }
            Segment::Nodes(nodes) => {
                let index = nodes.len() - 1;
                self.frames.push(Frame { nodes, index });
                self.descend_last(&nodes[index]);
            }
        }
    }
}

/// The segments of `tree` in member order.
fn spine<M>(tree: &Tree<Members<M>>) -> SmallVec<[Segment<'_, M>; 8]> {
    let mut front = SmallVec::new();
    let mut back: SmallVec<[Segment<'_, M>; 8]> = SmallVec::new();
    match tree {
        Tree::Empty => {}
        Tree::Small { items, .. } => front.push(Segment::Members(&**items)),
        Tree::Deep(deep) => {
            front.push(Segment::Members(&*deep.left));
            back.push(Segment::Members(&*deep.right));
            let mut middle = &deep.middle;
            loop {
                match middle {
                    Tree::Empty => break,
                    Tree::Small { items, .. } => {
                        front.push(Segment::Nodes(&**items));
                        break;
                    }
                    Tree::Deep(deep) => {
                        front.push(Segment::Nodes(&*deep.left));
                        back.push(Segment::Nodes(&*deep.right));
                        middle = &deep.middle;
                    }
                }
            }
        }
    }
    front.extend(back.into_iter().rev());
    front
}

/// Index of the node containing member `*offset`; `*offset` becomes the
/// offset inside that node.
fn child_at<M>(nodes: &[Node<M>], offset: &mut usize) -> Option<usize> {
    for (index, node) in nodes.iter().enumerate() {
        let size = node.size();
        if *offset < size {
            return Some(index);
        }
        *offset -= size;
    }
    None
}

impl<'a, M> Iterator for ArrayCursor<'a, M> {
    type Item = &'a M;

    fn next(&mut self) -> Option<Self::Item> {
        if self.position >= self.size {
            return None;
        }
        if self.pointer < self.position {
            self.advance();
        }
        self.position += 1;
        self.leaf.get(self.offset)
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.size - self.position;
        (remaining, Some(remaining))
    }
}

impl<M> ExactSizeIterator for ArrayCursor<'_, M> {
    #[inline]
    fn len(&self) -> usize {
        self.size - self.position
    }
}

impl<M> FusedIterator for ArrayCursor<'_, M> {}

impl<M> Clone for ArrayCursor<'_, M> {
    fn clone(&self) -> Self {
        Self {
            segments: self.segments.clone(),
            segment: self.segment,
            frames: self.frames.clone(),
            leaf: self.leaf,
            offset: self.offset,
            pointer: self.pointer,
            position: self.position,
            size: self.size,
        }
    }
}

impl<M> fmt::Debug for ArrayCursor<'_, M> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("ArrayCursor")
            .field("position", &self.position)
            .field("size", &self.size)
            .finish_non_exhaustive()
    }
}
