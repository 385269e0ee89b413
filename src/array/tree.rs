//! The generic finger-tree shapes shared by every nesting level.
//!
//! A [`Tree`] is empty, a small flat buffer, or a deep structure made of
//! two digits and a middle tree of [`Node`]s. The same code runs at every
//! level: the outermost tree stores members, its middle stores leaves,
//! the middle of that stores branches of leaves, and so on.
//!
//! Every operation allocates only along the spine it touches. Digits,
//! nodes and middle trees that are not affected are shared by reference
//! with the input.

use std::fmt;

use super::ReferenceCounter;
use super::level::{Level, Nodes, Rebuild};
use super::node::Node;
use super::{MAX_DIGIT, MAX_LEAF, MAX_SMALL, MIN_LEAF};
use crate::error::{ArrayError, InvariantViolation};
use crate::interrupt::Interrupt;

pub(crate) enum Tree<L: Level> {
    /// No elements.
    Empty,
    /// `1..=MAX_SMALL` elements in a flat buffer.
    Small {
        items: ReferenceCounter<[L::Item]>,
        size: usize,
    },
    /// Two digits around a middle tree of nodes.
    Deep(ReferenceCounter<Deep<L>>),
}

pub(crate) struct Deep<L: Level> {
    /// `1..=MAX_DIGIT` leading elements.
    pub(crate) left: ReferenceCounter<[L::Item]>,
    pub(crate) middle: Tree<Nodes<L::Member>>,
    /// `1..=MAX_DIGIT` trailing elements.
    pub(crate) right: ReferenceCounter<[L::Item]>,
    /// Number of members below this structure.
    pub(crate) size: usize,
}

/// A split around one element: everything before it, the element, the
/// offset of the requested member inside it, and everything after it.
pub(crate) type Split<L> = (Tree<L>, <L as Level>::Item, usize, Tree<L>);

impl<L: Level> Clone for Tree<L> {
    fn clone(&self) -> Self {
        match self {
            Self::Empty => Self::Empty,
            Self::Small { items, size } => Self::Small {
                items: items.clone(),
                size: *size,
            },
            Self::Deep(deep) => Self::Deep(deep.clone()),
        }
    }
}

impl<L: Level> Default for Tree<L> {
    fn default() -> Self {
        Self::Empty
    }
}

impl<L: Level> fmt::Debug for Tree<L>
where
    L::Item: fmt::Debug,
    L::Member: fmt::Debug,
{
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => formatter.write_str("Empty"),
            Self::Small { items, .. } => formatter.debug_tuple("Small").field(items).finish(),
            Self::Deep(deep) => formatter
                .debug_struct("Deep")
                .field("size", &deep.size)
                .field("left", &deep.left)
                .field("middle", &deep.middle)
                .field("right", &deep.right)
                .finish(),
        }
    }
}

// =============================================================================
// Read-only operations
// =============================================================================

impl<L: Level> Tree<L> {
    /// Number of members below this tree.
    #[inline]
    pub(crate) fn size(&self) -> usize {
        match self {
            Self::Empty => 0,
            Self::Small { size, .. } => *size,
            Self::Deep(deep) => deep.size,
        }
    }

    #[inline]
    pub(crate) const fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }

    pub(crate) const fn shape(&self) -> &'static str {
        match self {
            Self::Empty => "empty",
            Self::Small { .. } => "small",
            Self::Deep(_) => "deep",
        }
    }

    /// Creates a small tree, computing its size.
    pub(crate) fn small(items: ReferenceCounter<[L::Item]>) -> Self {
        if items.is_empty() {
            return Self::Empty;
        }
        let size = weigh::<L>(&items);
        Self::Small { items, size }
    }

    /// Creates a deep tree, computing its size.
    pub(crate) fn deep(
        left: ReferenceCounter<[L::Item]>,
        middle: Tree<Nodes<L::Member>>,
        right: ReferenceCounter<[L::Item]>,
    ) -> Self {
        let size = weigh::<L>(&left) + middle.size() + weigh::<L>(&right);
        Self::Deep(ReferenceCounter::new(Deep {
            left,
            middle,
            right,
            size,
        }))
    }

    pub(crate) fn first(&self) -> Option<&L::Item> {
        match self {
            Self::Empty => None,
            Self::Small { items, .. } => items.first(),
            Self::Deep(deep) => deep.left.first(),
        }
    }

    pub(crate) fn last(&self) -> Option<&L::Item> {
        match self {
            Self::Empty => None,
            Self::Small { items, .. } => items.last(),
            Self::Deep(deep) => deep.right.last(),
        }
    }

    /// The member at `index`, or `None` if `index >= self.size()`.
    pub(crate) fn get(&self, index: usize) -> Option<&L::Member> {
        match self {
            Self::Empty => None,
            Self::Small { items, .. } => member_in::<L>(items, index),
            Self::Deep(deep) => {
                let left_size = weigh::<L>(&deep.left);
                if index < left_size {
                    return member_in::<L>(&deep.left, index);
                }
                let index = index - left_size;
                let middle_size = deep.middle.size();
                if index < middle_size {
                    deep.middle.get(index)
                } else {
                    member_in::<L>(&deep.right, index - middle_size)
                }
            }
        }
    }

    /// Checks all shape invariants and returns the number of members.
    ///
    /// `depth` is the nesting depth of this tree; the outermost tree has
    /// depth 0 and its nodes have depth 1.
    pub(crate) fn verify(&self, depth: usize) -> Result<usize, InvariantViolation> {
        match self {
            Self::Empty => Ok(0),
            Self::Small { items, size } => {
                if items.is_empty() || items.len() > MAX_SMALL {
                    return Err(InvariantViolation(format!(
                        "small buffer holds {} elements at depth {depth}",
                        items.len()
                    )));
                }
                check_size(verify_items::<L>(items, depth)?, *size)
            }
            Self::Deep(deep) => {
                check_digit(deep.left.len(), "left", depth)?;
                check_digit(deep.right.len(), "right", depth)?;
                let total = verify_items::<L>(&deep.left, depth)?
                    + deep.middle.verify(depth + 1)?
                    + verify_items::<L>(&deep.right, depth)?;
                check_size(total, deep.size)
            }
        }
    }
}

// =============================================================================
// Structural operations
// =============================================================================

impl<L> Tree<L>
where
    L: Rebuild,
    L::Item: Clone,
    L::Member: Clone,
{
    /// Builds the cheapest tree holding exactly `items`.
    ///
    /// `items` holds at most `2 * MAX_DIGIT` elements.
    pub(crate) fn from_items(items: &[L::Item]) -> Self {
        if items.len() <= MAX_SMALL {
            return Self::small(items.into());
        }
        let half = items.len() / 2;
        Self::deep(items[..half].into(), Tree::Empty, items[half..].into())
    }

    /// Prepends an element.
    pub(crate) fn cons(&self, item: L::Item) -> Self {
        match self {
            Self::Empty => Self::small(ReferenceCounter::from(vec![item])),
            Self::Small { items, .. } => {
                let joined = prepended(item, items);
                if joined.len() <= MAX_SMALL {
                    Self::small(joined.into())
                } else {
                    Self::from_items(&joined)
                }
            }
            Self::Deep(deep) => {
                if deep.left.len() < MAX_DIGIT {
                    return Self::deep(
                        prepended(item, &deep.left).into(),
                        deep.middle.clone(),
                        deep.right.clone(),
                    );
                }
                // The digit is full: keep the first few, push a node of the rest.
                let joined = prepended(item, &deep.left);
                let split = joined.len() - MAX_LEAF;
                let node = L::wrap(joined[split..].into());
                Self::deep(
                    joined[..split].into(),
                    deep.middle.cons(node),
                    deep.right.clone(),
                )
            }
        }
    }

    /// Appends an element.
    pub(crate) fn snoc(&self, item: L::Item) -> Self {
        match self {
            Self::Empty => Self::small(ReferenceCounter::from(vec![item])),
            Self::Small { items, .. } => {
                let joined = appended(items, item);
                if joined.len() <= MAX_SMALL {
                    Self::small(joined.into())
                } else {
                    Self::from_items(&joined)
                }
            }
            Self::Deep(deep) => {
                if deep.right.len() < MAX_DIGIT {
                    return Self::deep(
                        deep.left.clone(),
                        deep.middle.clone(),
                        appended(&deep.right, item).into(),
                    );
                }
                let joined = appended(&deep.right, item);
                let node = L::wrap(joined[..MAX_LEAF].into());
                Self::deep(
                    deep.left.clone(),
                    deep.middle.snoc(node),
                    joined[MAX_LEAF..].into(),
                )
            }
        }
    }

    /// Splits off the first element.
    pub(crate) fn uncons(&self) -> Option<(L::Item, Self)> {
        match self {
            Self::Empty => None,
            Self::Small { items, .. } => {
                let (first, rest) = items.split_first()?;
                Some((first.clone(), Self::small(rest.into())))
            }
            Self::Deep(deep) => {
                let (first, rest) = deep.left.split_first()?;
                let tail = Self::deep_left(rest, deep.middle.clone(), deep.right.clone());
                Some((first.clone(), tail))
            }
        }
    }

    /// Splits off the last element.
    pub(crate) fn unsnoc(&self) -> Option<(Self, L::Item)> {
        match self {
            Self::Empty => None,
            Self::Small { items, .. } => {
                let (last, rest) = items.split_last()?;
                Some((Self::small(rest.into()), last.clone()))
            }
            Self::Deep(deep) => {
                let (last, rest) = deep.right.split_last()?;
                let init = Self::deep_right(deep.left.clone(), deep.middle.clone(), rest);
                Some((init, last.clone()))
            }
        }
    }

    /// Returns a copy with the member at `index` replaced, or `None` if
    /// `index >= self.size()`.
    pub(crate) fn put(&self, index: usize, member: L::Member) -> Option<Self> {
        match self {
            Self::Empty => None,
            Self::Small { items, size } => Some(Self::Small {
                items: replaced::<L>(items, index, member)?,
                size: *size,
            }),
            Self::Deep(deep) => {
                let left_size = weigh::<L>(&deep.left);
                let middle_size = deep.middle.size();
                let (left, middle, right) = if index < left_size {
                    (
                        replaced::<L>(&deep.left, index, member)?,
                        deep.middle.clone(),
                        deep.right.clone(),
                    )
                } else if index < left_size + middle_size {
                    (
                        deep.left.clone(),
                        deep.middle.put(index - left_size, member)?,
                        deep.right.clone(),
                    )
                } else {
                    (
                        deep.left.clone(),
                        deep.middle.clone(),
                        replaced::<L>(&deep.right, index - left_size - middle_size, member)?,
                    )
                };
                Some(Self::Deep(ReferenceCounter::new(Deep {
                    left,
                    middle,
                    right,
                    size: deep.size,
                })))
            }
        }
    }

    /// Concatenates two trees.
    ///
    /// Only the spine at the junction is rebuilt: the left digit of `self`
    /// and the right digit of `other` are reused as they are.
    pub(crate) fn concat(&self, other: &Self) -> Self {
        match (self, other) {
            (Self::Empty, _) => other.clone(),
            (_, Self::Empty) => self.clone(),
            (Self::Small { items: first, .. }, Self::Small { items: second, .. }) => {
                let joined: Vec<L::Item> = first.iter().chain(second.iter()).cloned().collect();
                Self::from_items(&joined)
            }
            (Self::Small { items, .. }, Self::Deep(_)) => items
                .iter()
                .rev()
                .fold(other.clone(), |tree, item| tree.cons(item.clone())),
            (Self::Deep(_), Self::Small { items, .. }) => items
                .iter()
                .fold(self.clone(), |tree, item| tree.snoc(item.clone())),
            (Self::Deep(first), Self::Deep(second)) => Self::concat_deep(first, second),
        }
    }

    fn concat_deep(first: &Deep<L>, second: &Deep<L>) -> Self {
        let mut junction: Vec<L::Item> = first
            .right
            .iter()
            .chain(second.left.iter())
            .cloned()
            .collect();
        let mut before = first.middle.clone();
        let mut after = second.middle.clone();

        if junction.len() < MIN_LEAF {
            // Too few elements for a node: borrow one from a neighbour.
            if let Some((rest, node)) = before.unsnoc() {
                junction = L::unwrap(&node)
                    .iter()
                    .cloned()
                    .chain(junction)
                    .collect();
                before = rest;
            } else if let Some((node, rest)) = after.uncons() {
                junction.extend(L::unwrap(&node).iter().cloned());
                after = rest;
            } else {
                junction.extend(second.right.iter().cloned());
                return Self::deep_with_trailing(first.left.clone(), &junction);
            }
        }

        let middle = group::<L>(junction)
            .into_iter()
            .fold(before, |tree, node| tree.snoc(node))
            .concat(&after);
        Self::deep(first.left.clone(), middle, second.right.clone())
    }

    /// A deep tree with an empty middle whose trailing elements may not fit
    /// into a single digit.
    fn deep_with_trailing(left: ReferenceCounter<[L::Item]>, trailing: &[L::Item]) -> Self {
        if trailing.len() <= MAX_DIGIT {
            return Self::deep(left, Tree::Empty, trailing.into());
        }
        // At most MIN_LEAF - 1 + MAX_DIGIT elements: one full node leaves a
        // valid digit behind.
        let node = L::wrap(trailing[..MAX_LEAF].into());
        Self::deep(
            left,
            Tree::small(ReferenceCounter::from(vec![node])),
            trailing[MAX_LEAF..].into(),
        )
    }

    /// Splits around the element containing the member at `index`.
    ///
    /// Returns `None` if `index >= self.size()`.
    pub(crate) fn split(&self, index: usize) -> Option<Split<L>> {
        match self {
            Self::Empty => None,
            Self::Small { items, .. } => {
                let (position, offset) = locate::<L>(items, index)?;
                Some((
                    Self::small(items[..position].into()),
                    items[position].clone(),
                    offset,
                    Self::small(items[position + 1..].into()),
                ))
            }
            Self::Deep(deep) => {
                let left_size = weigh::<L>(&deep.left);
                if index < left_size {
                    let (position, offset) = locate::<L>(&deep.left, index)?;
                    return Some((
                        Self::from_items(&deep.left[..position]),
                        deep.left[position].clone(),
                        offset,
                        Self::deep_left(
                            &deep.left[position + 1..],
                            deep.middle.clone(),
                            deep.right.clone(),
                        ),
                    ));
                }

                let index = index - left_size;
                let middle_size = deep.middle.size();
                if index < middle_size {
                    let (before, node, node_offset, after) = deep.middle.split(index)?;
                    let children = L::unwrap(&node);
                    let (position, offset) = locate::<L>(children, node_offset)?;
                    return Some((
                        Self::deep_right(deep.left.clone(), before, &children[..position]),
                        children[position].clone(),
                        offset,
                        Self::deep_left(&children[position + 1..], after, deep.right.clone()),
                    ));
                }

                let (position, offset) = locate::<L>(&deep.right, index - middle_size)?;
                Some((
                    Self::deep_right(
                        deep.left.clone(),
                        deep.middle.clone(),
                        &deep.right[..position],
                    ),
                    deep.right[position].clone(),
                    offset,
                    Self::from_items(&deep.right[position + 1..]),
                ))
            }
        }
    }

    /// Reverses the order of all members.
    pub(crate) fn reverse(&self, interrupt: &dyn Interrupt) -> Result<Self, ArrayError> {
        match self {
            Self::Empty => Ok(Self::Empty),
            Self::Small { items, size } => Ok(Self::Small {
                items: reversed::<L>(items, interrupt)?,
                size: *size,
            }),
            Self::Deep(deep) => Ok(Self::Deep(ReferenceCounter::new(Deep {
                left: reversed::<L>(&deep.right, interrupt)?,
                middle: deep.middle.reverse(interrupt)?,
                right: reversed::<L>(&deep.left, interrupt)?,
                size: deep.size,
            }))),
        }
    }

    /// A deep tree whose left digit may be empty.
    fn deep_left(
        left: &[L::Item],
        middle: Tree<Nodes<L::Member>>,
        right: ReferenceCounter<[L::Item]>,
    ) -> Self {
        if !left.is_empty() {
            return Self::deep(left.into(), middle, right);
        }
        match middle.uncons() {
            Some((node, rest)) => Self::deep(L::unwrap(&node).clone(), rest, right),
            None => Self::from_items(&right),
        }
    }

    /// A deep tree whose right digit may be empty.
    fn deep_right(
        left: ReferenceCounter<[L::Item]>,
        middle: Tree<Nodes<L::Member>>,
        right: &[L::Item],
    ) -> Self {
        if !right.is_empty() {
            return Self::deep(left, middle, right.into());
        }
        match middle.unsnoc() {
            Some((rest, node)) => Self::deep(left, rest, L::unwrap(&node).clone()),
            None => Self::from_items(&left),
        }
    }
}

#[cfg(test)]
impl<M> Tree<Nodes<M>> {
    /// Addresses of every leaf below this middle tree, in order.
    pub(crate) fn leaf_addresses(&self, out: &mut Vec<*const M>) {
        match self {
            Self::Empty => {}
            Self::Small { items, .. } => {
                for node in items.iter() {
                    node.leaf_addresses(out);
                }
            }
            Self::Deep(deep) => {
                for node in deep.left.iter() {
                    node.leaf_addresses(out);
                }
                deep.middle.leaf_addresses(out);
                for node in deep.right.iter() {
                    node.leaf_addresses(out);
                }
            }
        }
    }
}

#[cfg(test)]
impl<M> Tree<super::level::Members<M>> {
    /// Addresses of the leaves held by the middle tree.
    pub(crate) fn middle_leaves(&self) -> Vec<*const M> {
        let mut out = Vec::new();
        if let Self::Deep(deep) = self {
            deep.middle.leaf_addresses(&mut out);
        }
        out
    }
}

// =============================================================================
// Helpers
// =============================================================================

/// Groups `items` into nodes of `MIN_LEAF..=MAX_LEAF` elements each.
///
/// `items` holds at least `MIN_LEAF` elements.
pub(crate) fn group<L: Level>(items: Vec<L::Item>) -> Vec<Node<L::Member>> {
    let count = items.len().div_ceil(MAX_LEAF);
    let base = items.len() / count.max(1);
    let extra = items.len() % count.max(1);
    let mut remaining = items.into_iter();
    (0..count)
        .map(|index| {
            let length = if index < extra { base + 1 } else { base };
            L::wrap(remaining.by_ref().take(length).collect())
        })
        .collect()
}

fn weigh<L: Level>(items: &[L::Item]) -> usize {
    items.iter().map(L::weight).sum()
}

/// Position of the element containing member `index`, and the offset inside it.
fn locate<L: Level>(items: &[L::Item], index: usize) -> Option<(usize, usize)> {
    let mut remaining = index;
    for (position, item) in items.iter().enumerate() {
        let weight = L::weight(item);
        if remaining < weight {
            return Some((position, remaining));
        }
        remaining -= weight;
    }
    None
}

fn member_in<L: Level>(items: &[L::Item], index: usize) -> Option<&L::Member> {
    let (position, offset) = locate::<L>(items, index)?;
    L::member(&items[position], offset)
}

fn replaced<L>(
    items: &[L::Item],
    index: usize,
    member: L::Member,
) -> Option<ReferenceCounter<[L::Item]>>
where
    L: Rebuild,
    L::Item: Clone,
{
    let (position, offset) = locate::<L>(items, index)?;
    let mut copy = items.to_vec();
    copy[position] = L::put(&items[position], offset, member);
    Some(copy.into())
}

fn reversed<L>(
    items: &[L::Item],
    interrupt: &dyn Interrupt,
) -> Result<ReferenceCounter<[L::Item]>, ArrayError>
where
    L: Rebuild,
{
    interrupt.check_stop()?;
    items
        .iter()
        .rev()
        .map(|item| L::reverse(item, interrupt))
        .collect()
}

fn prepended<T: Clone>(item: T, items: &[T]) -> Vec<T> {
    let mut joined = Vec::with_capacity(items.len() + 1);
    joined.push(item);
    joined.extend_from_slice(items);
    joined
}

fn appended<T: Clone>(items: &[T], item: T) -> Vec<T> {
    let mut joined = Vec::with_capacity(items.len() + 1);
    joined.extend_from_slice(items);
    joined.push(item);
    joined
}

fn verify_items<L: Level>(items: &[L::Item], depth: usize) -> Result<usize, InvariantViolation> {
    items.iter().map(|item| L::verify(item, depth)).sum()
}

fn check_digit(length: usize, side: &str, depth: usize) -> Result<(), InvariantViolation> {
    if (1..=MAX_DIGIT).contains(&length) {
        Ok(())
    } else {
        Err(InvariantViolation(format!(
            "{side} digit holds {length} elements at depth {depth}"
        )))
    }
}

fn check_size(actual: usize, cached: usize) -> Result<usize, InvariantViolation> {
    if actual == cached {
        Ok(actual)
    } else {
        Err(InvariantViolation(format!(
            "cached size {cached} differs from actual size {actual}"
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::array::level::Members;
    use crate::interrupt::NeverInterrupt;
    use rstest::rstest;

    type Flat = Tree<Members<usize>>;

    fn appended_tree(count: usize) -> Flat {
        (0..count).fold(Flat::Empty, |tree, member| tree.snoc(member))
    }

    fn prepended_tree(count: usize) -> Flat {
        (0..count).rev().fold(Flat::Empty, |tree, member| tree.cons(member))
    }

    fn members(tree: &Flat) -> Vec<usize> {
        (0..tree.size()).filter_map(|index| tree.get(index).copied()).collect()
    }

    fn assert_valid(tree: &Flat, expected: &[usize]) {
        assert_eq!(tree.verify(0), Ok(expected.len()));
        assert_eq!(members(tree), expected);
        assert_eq!(tree.get(expected.len()), None);
    }

    #[rstest]
    #[case(0)]
    #[case(1)]
    #[case(7)]
    #[case(8)]
    #[case(40)]
    #[case(500)]
    fn test_snoc_and_cons_keep_invariants(#[case] count: usize) {
        let expected: Vec<usize> = (0..count).collect();
        assert_valid(&appended_tree(count), &expected);
        assert_valid(&prepended_tree(count), &expected);
    }

    #[rstest]
    fn test_small_becomes_deep_on_overflow() {
        let tree = appended_tree(MAX_SMALL + 1);
        let Tree::Deep(deep) = &tree else {
            panic!("expected a deep tree");
        };
        assert_eq!(deep.left.len(), 4);
        assert_eq!(deep.right.len(), 4);
        assert!(deep.middle.is_empty());
    }

    #[rstest]
    fn test_full_digit_pushes_a_node() {
        let tree = appended_tree(4 + MAX_DIGIT + 1);
        let Tree::Deep(deep) = &tree else {
            panic!("expected a deep tree");
        };
        assert_eq!(deep.middle.size(), MAX_LEAF);
        assert_eq!(deep.right.len(), MAX_DIGIT + 1 - MAX_LEAF);
    }

    #[rstest]
    #[case(1)]
    #[case(9)]
    #[case(60)]
    #[case(300)]
    fn test_uncons_and_unsnoc_drain_in_order(#[case] count: usize) {
        let mut tree = appended_tree(count);
        let mut expected: Vec<usize> = (0..count).collect();
        while let Some((first, rest)) = tree.uncons() {
            assert_eq!(first, expected.remove(0));
            assert_valid(&rest, &expected);
            tree = match rest.unsnoc() {
                Some((init, last)) => {
                    assert_eq!(Some(last), expected.pop());
                    init
                }
                None => rest,
            };
            assert_valid(&tree, &expected);
        }
        assert!(expected.is_empty());
    }

    #[rstest]
    fn test_put_shares_unaffected_digits() {
        let tree = appended_tree(200);
        let updated = tree.put(100, 1000).unwrap();
        assert_eq!(updated.get(100), Some(&1000));
        assert_eq!(tree.get(100), Some(&100));
        assert_eq!(updated.verify(0), Ok(200));

        let (Tree::Deep(old), Tree::Deep(new)) = (&tree, &updated) else {
            panic!("expected deep trees");
        };
        assert!(ReferenceCounter::ptr_eq(&old.left, &new.left));
        assert!(ReferenceCounter::ptr_eq(&old.right, &new.right));
        assert!(tree.put(200, 0).is_none());
    }

    #[rstest]
    #[case(0, 0)]
    #[case(3, 5)]
    #[case(7, 7)]
    #[case(8, 1)]
    #[case(1, 8)]
    #[case(30, 30)]
    #[case(100, 3)]
    #[case(3, 100)]
    #[case(250, 333)]
    #[case(1000, 1000)]
    fn test_concat_keeps_order_and_invariants(#[case] first: usize, #[case] second: usize) {
        let left = appended_tree(first);
        let right = (0..second).fold(Flat::Empty, |tree, member| tree.snoc(first + member));
        let joined = left.concat(&right);
        let expected: Vec<usize> = (0..first + second).collect();
        assert_valid(&joined, &expected);
    }

    #[rstest]
    fn test_concat_with_empty_is_identity() {
        let tree = appended_tree(50);
        let Tree::Deep(original) = &tree else {
            panic!("expected a deep tree");
        };
        for joined in [tree.concat(&Flat::Empty), Flat::Empty.concat(&tree)] {
            let Tree::Deep(deep) = &joined else {
                panic!("expected a deep tree");
            };
            assert!(ReferenceCounter::ptr_eq(original, deep));
        }
    }

    #[rstest]
    #[case(500, 500)]
    #[case(40, 3000)]
    #[case(3000, 40)]
    fn test_concat_reuses_outer_digits_and_middle_leaves(
        #[case] first: usize,
        #[case] second: usize,
    ) {
        let left = appended_tree(first);
        let right = (0..second).fold(Flat::Empty, |tree, member| tree.snoc(first + member));
        let joined = left.concat(&right);

        let (Tree::Deep(before), Tree::Deep(after), Tree::Deep(result)) = (&left, &right, &joined)
        else {
            panic!("expected deep trees");
        };
        assert!(ReferenceCounter::ptr_eq(&before.left, &result.left));
        assert!(ReferenceCounter::ptr_eq(&after.right, &result.right));

        let leaves = joined.middle_leaves();
        let sources: Vec<_> = left
            .middle_leaves()
            .into_iter()
            .chain(right.middle_leaves())
            .collect();
        let shared = sources.iter().filter(|leaf| leaves.contains(*leaf)).count();
        // A short junction may absorb one neighbouring leaf.
        assert!(shared + 1 >= sources.len());
        assert!(!sources.is_empty());
    }

    #[rstest]
    fn test_repeated_concat_stays_balanced() {
        let mut tree = Flat::Empty;
        let mut expected = Vec::new();
        for round in 0..40 {
            let chunk = appended_tree(round % 23 + 1);
            expected.extend(0..round % 23 + 1);
            tree = tree.concat(&chunk);
            assert_eq!(tree.verify(0), Ok(expected.len()));
        }
        assert_eq!(members(&tree), expected);
    }

    #[rstest]
    #[case(1)]
    #[case(8)]
    #[case(45)]
    #[case(400)]
    fn test_split_at_every_index(#[case] count: usize) {
        let tree = appended_tree(count);
        for index in 0..count {
            let (before, item, offset, after) = tree.split(index).unwrap();
            assert_eq!(item, index);
            assert_eq!(offset, 0);
            assert_valid(&before, &(0..index).collect::<Vec<_>>());
            assert_valid(&after, &(index + 1..count).collect::<Vec<_>>());
        }
        assert!(tree.split(count).is_none());
    }

    #[rstest]
    #[case(0)]
    #[case(5)]
    #[case(77)]
    #[case(1234)]
    fn test_reverse(#[case] count: usize) {
        let reversed = appended_tree(count).reverse(&NeverInterrupt).unwrap();
        let expected: Vec<usize> = (0..count).rev().collect();
        assert_valid(&reversed, &expected);
    }

    #[rstest]
    fn test_verify_reports_oversized_digit() {
        let digit: ReferenceCounter<[usize]> = (0..MAX_DIGIT + 1).collect();
        let tree = Flat::deep(digit, Tree::Empty, ReferenceCounter::from(vec![0]));
        assert!(tree.verify(0).is_err());
    }

    #[rstest]
    #[case(8, vec![8])]
    #[case(15, vec![15])]
    #[case(16, vec![8, 8])]
    #[case(26, vec![13, 13])]
    #[case(38, vec![13, 13, 12])]
    fn test_group_sizes(#[case] count: usize, #[case] expected: Vec<usize>) {
        let nodes = group::<Members<usize>>((0..count).collect());
        let sizes: Vec<usize> = nodes.iter().map(Node::size).collect();
        assert_eq!(sizes, expected);
    }
}
