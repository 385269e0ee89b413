//! Nodes: the unit of structural sharing inside a deep array.
//!
//! A node groups between [`MIN_LEAF`] and [`MAX_LEAF`] elements of the
//! level above it. Leaves group members, branches group nodes of equal
//! depth. Each node caches the number of members it covers, so that
//! positional access never has to walk the members themselves.

use std::fmt;

use super::ReferenceCounter;
use super::{MAX_LEAF, MIN_LEAF};
use crate::error::{ArrayError, InvariantViolation};
use crate::interrupt::Interrupt;

pub(crate) enum Node<M> {
    /// Depth-1 node holding members.
    Leaf(ReferenceCounter<[M]>),
    /// Node holding child nodes of one depth less.
    Branch {
        children: ReferenceCounter<[Node<M>]>,
        size: usize,
    },
}

impl<M> Clone for Node<M> {
    fn clone(&self) -> Self {
        match self {
            Self::Leaf(members) => Self::Leaf(members.clone()),
            Self::Branch { children, size } => Self::Branch {
                children: children.clone(),
                size: *size,
            },
        }
    }
}

impl<M: fmt::Debug> fmt::Debug for Node<M> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Leaf(members) => formatter.debug_tuple("Leaf").field(members).finish(),
            Self::Branch { children, size } => formatter
                .debug_struct("Branch")
                .field("size", size)
                .field("children", children)
                .finish(),
        }
    }
}

impl<M> Node<M> {
    /// Creates a branch, computing its size from the children.
    pub(crate) fn branch(children: ReferenceCounter<[Self]>) -> Self {
        let size = children.iter().map(Self::size).sum();
        Self::Branch { children, size }
    }

    /// Number of members below this node.
    #[inline]
    pub(crate) fn size(&self) -> usize {
        match self {
            Self::Leaf(members) => members.len(),
            Self::Branch { size, .. } => *size,
        }
    }

    /// The member at `offset`, descending through the branches.
    pub(crate) fn get(&self, offset: usize) -> Option<&M> {
        let mut node = self;
        let mut offset = offset;
        loop {
            match node {
                Self::Leaf(members) => return members.get(offset),
                Self::Branch { children, .. } => {
                    let (index, inner) = locate_child(children, offset)?;
                    node = &children[index];
                    offset = inner;
                }
            }
        }
    }

    /// Checks the arity and cached sizes of a node of the given depth.
    pub(crate) fn verify(&self, depth: usize) -> Result<usize, InvariantViolation> {
        match self {
            Self::Leaf(members) => {
                if depth != 1 {
                    return Err(InvariantViolation(format!(
                        "leaf found at depth {depth}"
                    )));
                }
                check_arity(members.len())?;
                Ok(members.len())
            }
            Self::Branch { children, size } => {
                if depth < 2 {
                    return Err(InvariantViolation(format!(
                        "branch found at depth {depth}"
                    )));
                }
                check_arity(children.len())?;
                let mut total = 0;
                for child in children.iter() {
                    total += child.verify(depth - 1)?;
                }
                if total == *size {
                    Ok(total)
                } else {
                    Err(InvariantViolation(format!(
                        "branch caches size {size}, children hold {total}"
                    )))
                }
            }
        }
    }
}

impl<M: Clone> Node<M> {
    /// Returns a copy of this node with the member at `offset` replaced.
    ///
    /// Only the path from this node down to the leaf is copied.
    pub(crate) fn put(&self, offset: usize, member: M) -> Self {
        match self {
            Self::Leaf(members) => {
                let mut copy = members.to_vec();
                copy[offset] = member;
                Self::Leaf(copy.into())
            }
            Self::Branch { children, size } => {
                let Some((index, inner)) = locate_child(children, offset) else {
                    unreachable!("offset {offset} outside a branch of {size} members");
                };
                let mut copy = children.to_vec();
                copy[index] = children[index].put(inner, member);
                Self::Branch {
                    children: copy.into(),
                    size: *size,
                }
            }
        }
    }

    /// Reverses the order of all members below this node.
    pub(crate) fn reverse(&self, interrupt: &dyn Interrupt) -> Result<Self, ArrayError> {
        match self {
            Self::Leaf(members) => {
                interrupt.check_stop()?;
                Ok(Self::Leaf(members.iter().rev().cloned().collect()))
            }
            Self::Branch { children, size } => Ok(Self::Branch {
                children: children
                    .iter()
                    .rev()
                    .map(|child| child.reverse(interrupt))
                    .collect::<Result<_, _>>()?,
                size: *size,
            }),
        }
    }
}

#[cfg(test)]
impl<M> Node<M> {
    /// Addresses of the member buffers of every leaf below this node.
    pub(crate) fn leaf_addresses(&self, out: &mut Vec<*const M>) {
        match self {
            Self::Leaf(members) => out.push(members.as_ptr()),
            Self::Branch { children, .. } => {
                for child in children.iter() {
                    child.leaf_addresses(out);
                }
            }
        }
    }
}

fn locate_child<M>(children: &[Node<M>], offset: usize) -> Option<(usize, usize)> {
    let mut remaining = offset;
    for (index, child) in children.iter().enumerate() {
        let size = child.size();
        if remaining < size {
            return Some((index, remaining));
        }
        remaining -= size;
    }
    None
}

fn check_arity(length: usize) -> Result<(), InvariantViolation> {
    if (MIN_LEAF..=MAX_LEAF).contains(&length) {
        Ok(())
    } else {
        Err(InvariantViolation(format!(
            "node holds {length} elements, expected {MIN_LEAF}..={MAX_LEAF}"
        )))
    }
}
