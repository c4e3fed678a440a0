//! Arena nodes of the thread forest
//!
//! Nodes live in a `Vec` owned by [`ThreadTree`](super::ThreadTree) and point
//! at each other by index. Each node has two links:
//! - `next`: the following sibling at the same level (or the following root)
//! - `replies`: the first direct reply
//!
//! Both sibling chains are kept in timestamp order.

use std::fmt;

/// Index of a node inside one [`ThreadTree`](super::ThreadTree).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// One message in the thread forest.
#[derive(Debug)]
pub struct ThreadNode<'a, M> {
    /// The message this node stands for (borrowed, never owned)
    message: &'a M,

    /// Next sibling in timestamp order
    pub(crate) next: Option<NodeId>,

    /// Earliest direct reply
    pub(crate) replies: Option<NodeId>,
}

impl<'a, M> ThreadNode<'a, M> {
    pub(crate) fn new(message: &'a M) -> Self {
        ThreadNode {
            message,
            next: None,
            replies: None,
        }
    }

    pub fn message(&self) -> &'a M {
        self.message
    }

    pub fn next(&self) -> Option<NodeId> {
        self.next
    }

    pub fn replies(&self) -> Option<NodeId> {
        self.replies
    }

    pub fn has_replies(&self) -> bool {
        self.replies.is_some()
    }
}
