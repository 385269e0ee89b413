//! Nesting levels of the deep structure.
//!
//! The outermost tree stores members directly, while every middle tree
//! stores [`Node`]s. Instead of nesting the element type at each level
//! (`Node<Node<...>>`), which Rust cannot monomorphize, the tree is
//! parameterized by a [`Level`]: [`Members`] for the outermost level and
//! [`Nodes`] for every level below it. A node of depth `d` is a leaf when
//! `d == 1` and a branch of depth `d - 1` nodes otherwise.

use std::marker::PhantomData;

use super::ReferenceCounter;
use super::node::Node;
use crate::error::{ArrayError, InvariantViolation};
use crate::interrupt::Interrupt;

/// Read-only view of the elements stored at one nesting level.
pub(crate) trait Level {
    /// The array member type.
    type Member;
    /// The element stored in digits and small buffers at this level.
    type Item;

    /// Number of members covered by `item`.
    fn weight(item: &Self::Item) -> usize;

    /// The member at `offset` inside `item`.
    fn member(item: &Self::Item, offset: usize) -> Option<&Self::Member>;

    /// Groups `items` into a node of the level below.
    fn wrap(items: ReferenceCounter<[Self::Item]>) -> Node<Self::Member>;

    /// The items grouped by `node`, a node taken from the level below.
    fn unwrap(node: &Node<Self::Member>) -> &ReferenceCounter<[Self::Item]>;

    /// Checks `item` at nesting `depth` and returns its weight.
    fn verify(item: &Self::Item, depth: usize) -> Result<usize, InvariantViolation>;
}

/// Element operations that copy members.
pub(crate) trait Rebuild: Level {
    /// Returns a copy of `item` whose member at `offset` is replaced.
    fn put(item: &Self::Item, offset: usize, member: Self::Member) -> Self::Item;

    /// Returns `item` with the order of all its members reversed.
    fn reverse(item: &Self::Item, interrupt: &dyn Interrupt) -> Result<Self::Item, ArrayError>;
}

/// The outermost level: items are the members themselves.
pub(crate) struct Members<M>(PhantomData<fn() -> M>);

/// Any level below the outermost one: items are nodes.
pub(crate) struct Nodes<M>(PhantomData<fn() -> M>);

impl<M> Level for Members<M> {
    type Member = M;
    type Item = M;

    #[inline]
    fn weight(_item: &M) -> usize {
        1
    }

    #[inline]
    fn member(item: &M, offset: usize) -> Option<&M> {
        (offset == 0).then_some(item)
    }

    fn wrap(items: ReferenceCounter<[M]>) -> Node<M> {
        Node::Leaf(items)
    }

    fn unwrap(node: &Node<M>) -> &ReferenceCounter<[M]> {
        match node {
            Node::Leaf(members) => members,
            Node::Branch { .. } => unreachable!("nodes below the member level are leaves"),
        }
    }

    fn verify(_item: &M, _depth: usize) -> Result<usize, InvariantViolation> {
        Ok(1)
    }
}

impl<M> Level for Nodes<M> {
    type Member = M;
    type Item = Node<M>;

    #[inline]
    fn weight(item: &Node<M>) -> usize {
        item.size()
    }

    fn member(item: &Node<M>, offset: usize) -> Option<&M> {
        item.get(offset)
    }

    fn wrap(items: ReferenceCounter<[Node<M>]>) -> Node<M> {
        Node::branch(items)
    }

    fn unwrap(node: &Node<M>) -> &ReferenceCounter<[Node<M>]> {
        match node {
            Node::Branch { children, .. } => children,
            Node::Leaf(_) => unreachable!("nodes below a node level are branches"),
        }
    }

    fn verify(item: &Node<M>, depth: usize) -> Result<usize, InvariantViolation> {
        item.verify(depth)
    }
}

impl<M: Clone> Rebuild for Members<M> {
    fn put(_item: &M, _offset: usize, member: M) -> M {
        member
    }

    fn reverse(item: &M, _interrupt: &dyn Interrupt) -> Result<M, ArrayError> {
        Ok(item.clone())
    }
}

impl<M: Clone> Rebuild for Nodes<M> {
    fn put(item: &Node<M>, offset: usize, member: M) -> Node<M> {
        item.put(offset, member)
    }

    fn reverse(item: &Node<M>, interrupt: &dyn Interrupt) -> Result<Node<M>, ArrayError> {
        item.reverse(interrupt)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interrupt::NeverInterrupt;
    use rstest::rstest;

    fn leaf(range: std::ops::Range<i32>) -> Node<i32> {
        Node::Leaf(range.collect())
    }

    #[rstest]
    fn test_member_level_weight_and_access() {
        assert_eq!(Members::<i32>::weight(&5), 1);
        assert_eq!(Members::<i32>::member(&5, 0), Some(&5));
        assert_eq!(Members::<i32>::member(&5, 1), None);
    }

    #[rstest]
    fn test_member_level_wrap_roundtrip() {
        let items: ReferenceCounter<[i32]> = (0..8).collect();
        let node = Members::<i32>::wrap(items.clone());
        assert!(ReferenceCounter::ptr_eq(Members::<i32>::unwrap(&node), &items));
    }

    #[rstest]
    fn test_node_level_weight_and_access() {
        let node = leaf(0..10);
        assert_eq!(Nodes::<i32>::weight(&node), 10);
        assert_eq!(Nodes::<i32>::member(&node, 3), Some(&3));
    }

    #[rstest]
    fn test_node_level_wrap_caches_size() {
        let children: ReferenceCounter<[Node<i32>]> =
            vec![leaf(0..8), leaf(8..20), leaf(20..29)].into();
        let node = Nodes::<i32>::wrap(children);
        assert_eq!(node.size(), 29);
        assert_eq!(Nodes::<i32>::unwrap(&node).len(), 3);
    }

    #[rstest]
    fn test_rebuild_put_and_reverse() {
        let node = leaf(0..8);
        let updated = Nodes::<i32>::put(&node, 2, 100);
        assert_eq!(updated.get(2), Some(&100));
        assert_eq!(node.get(2), Some(&2));

        let reversed = Nodes::<i32>::reverse(&node, &NeverInterrupt).unwrap();
        assert_eq!(reversed.get(0), Some(&7));
        assert_eq!(Members::<i32>::put(&1, 0, 9), 9);
    }
}
