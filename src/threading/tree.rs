//! The thread forest built by [`ThreadTreeBuilder`](super::ThreadTreeBuilder)

use std::io;

use serde::Serialize;

use super::algorithm::tree_traversal::{PreOrder, collect_thread_members, find_node};
use super::node::{NodeId, ThreadNode};
use crate::config::DEFAULT_INDENT_WIDTH;
use crate::error::{ThreadingResult, UsageError};
use crate::message::ThreadableMessage;
use crate::ordering::goes_before;
use crate::render;

/// A forest of reply threads.
///
/// Roots are chained through `next` in timestamp order, and so are the
/// replies of every node. Dropping the tree releases the arena in one
/// sweep and leaves the messages alone.
#[derive(Debug)]
pub struct ThreadTree<'a, M> {
    nodes: Vec<ThreadNode<'a, M>>,
    first_root: Option<NodeId>,
    last_root: Option<NodeId>,
    indent_width: usize,
}

impl<M> Default for ThreadTree<'_, M> {
    fn default() -> Self {
        ThreadTree {
            nodes: Vec::new(),
            first_root: None,
            last_root: None,
            indent_width: DEFAULT_INDENT_WIDTH,
        }
    }
}

/// Summary of one thread, rooted at a top-level message
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ThreadSummary<T> {
    /// Message-ID of the root message
    pub root_message_id: String,

    /// Subject of the root message, when known
    pub subject: Option<String>,

    /// Earliest timestamp in the thread
    pub start_date: T,

    /// Latest timestamp in the thread
    pub last_date: T,

    /// (message_id, depth) for every message, in display order
    pub messages: Vec<(String, usize)>,
}

impl<'a, M: ThreadableMessage> ThreadTree<'a, M> {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn with_capacity(capacity: usize, indent_width: usize) -> ThreadingResult<Self> {
        let mut tree = Self::new();
        tree.nodes.try_reserve(capacity)?;
        tree.indent_width = indent_width;
        Ok(tree)
    }

    /// Store a detached node for `message`
    pub(crate) fn allocate(&mut self, message: &'a M) -> ThreadingResult<NodeId> {
        self.nodes.try_reserve(1)?;
        let id = NodeId(self.nodes.len());
        self.nodes.push(ThreadNode::new(message));
        Ok(id)
    }

    /// Append a root after the current last root.
    ///
    /// Roots normally arrive in timestamp order; one that does not is
    /// inserted at its ordered position instead.
    pub(crate) fn append_root(&mut self, id: NodeId) {
        match self.last_root {
            Some(last) if goes_before(self.nodes[last.0].message(), self.nodes[id.0].message()) => {
                self.nodes[last.0].next = Some(id);
                self.last_root = Some(id);
            }
            Some(_) => self.insert_root(id),
            None => {
                self.first_root = Some(id);
                self.last_root = Some(id);
            }
        }
    }

    /// Insert a root at its timestamp position
    pub(crate) fn insert_root(&mut self, id: NodeId) {
        self.first_root = self.link_ordered(self.first_root, id);
        if self.nodes[id.0].next.is_none() {
            self.last_root = Some(id);
        }
    }

    /// Insert `id` among the replies of `parent` at its timestamp position
    pub(crate) fn insert_reply(&mut self, parent: NodeId, id: NodeId) {
        let head = self.nodes[parent.0].replies;
        self.nodes[parent.0].replies = self.link_ordered(head, id);
    }

    /// Link `id` into the sibling chain starting at `head` and return the
    /// chain's new head.
    ///
    /// The node goes before the first sibling it does not come after, the
    /// same rule the ordered list applies.
    fn link_ordered(&mut self, head: Option<NodeId>, id: NodeId) -> Option<NodeId> {
        let incoming = self.nodes[id.0].message();
        let mut previous: Option<NodeId> = None;
        let mut cursor = head;

        while let Some(current) = cursor {
            if goes_before(incoming, self.nodes[current.0].message()) {
                break;
            }
            previous = Some(current);
            cursor = self.nodes[current.0].next;
        }

        self.nodes[id.0].next = cursor;
        match previous {
            Some(previous) => {
                self.nodes[previous.0].next = Some(id);
                head
            }
            None => Some(id),
        }
    }

    pub(crate) fn first_root(&self) -> Option<NodeId> {
        self.first_root
    }

    /// Number of messages in the forest
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn node(&self, id: NodeId) -> Option<&ThreadNode<'a, M>> {
        self.nodes.get(id.0)
    }

    pub fn message(&self, id: NodeId) -> Option<&'a M> {
        self.node(id).map(ThreadNode::message)
    }

    /// Top-level messages, oldest first
    pub fn roots(&self) -> Siblings<'_, 'a, M> {
        Siblings {
            tree: self,
            cursor: self.first_root,
        }
    }

    pub fn root_count(&self) -> usize {
        self.roots().count()
    }

    /// Direct replies of `id`, oldest first
    pub fn children(&self, id: NodeId) -> ThreadingResult<Siblings<'_, 'a, M>> {
        let node = self.node(id).ok_or(UsageError::UnknownNode(id.0))?;
        Ok(Siblings {
            tree: self,
            cursor: node.replies,
        })
    }

    /// Locate the node for `identifier`, searching the whole forest
    pub fn find(&self, identifier: &str) -> Option<NodeId> {
        find_node(self, identifier)
    }

    /// Depth of `id`, 0 for roots
    pub fn depth_of(&self, id: NodeId) -> ThreadingResult<usize> {
        if id.0 >= self.nodes.len() {
            return Err(UsageError::UnknownNode(id.0).into());
        }
        self.pre_order()
            .find(|(_, node)| *node == id)
            .map(|(depth, _)| depth)
            .ok_or_else(|| UsageError::UnknownNode(id.0).into())
    }

    /// Depth-first walk: each message, then its replies, then its next sibling
    pub fn pre_order(&self) -> PreOrder<'_, 'a, M> {
        PreOrder::forest(self)
    }

    /// Visit every message with its depth, in display order
    pub fn traverse<F>(&self, mut visit: F)
    where
        F: FnMut(usize, &'a M),
    {
        for (depth, id) in self.pre_order() {
            visit(depth, self.nodes[id.0].message());
        }
    }

    /// One summary per root, in root order
    pub fn threads(&self) -> Vec<ThreadSummary<M::Timestamp>> {
        self.roots()
            .map(|root| self.summarize(root))
            .collect()
    }

    fn summarize(&self, root: NodeId) -> ThreadSummary<M::Timestamp> {
        let root_message = self.nodes[root.0].message();
        let members = collect_thread_members(self, root);

        let mut start_date = root_message.timestamp();
        let mut last_date = root_message.timestamp();
        let mut messages = Vec::with_capacity(members.len());
        for (id, depth) in members {
            let message = self.nodes[id.0].message();
            let timestamp = message.timestamp();
            if timestamp < start_date {
                start_date = timestamp.clone();
            }
            if timestamp > last_date {
                last_date = timestamp;
            }
            messages.push((message.identifier().to_string(), depth));
        }

        ThreadSummary {
            root_message_id: root_message.identifier().to_string(),
            subject: root_message.subject().map(str::to_string),
            start_date,
            last_date,
            messages,
        }
    }

    /// Spaces per depth level in [`write_to`](Self::write_to) listings,
    /// taken from the builder's configuration
    pub fn indent_width(&self) -> usize {
        self.indent_width
    }

    /// Write the forest as an indented listing
    pub fn write_to<W: io::Write>(&self, out: &mut W) -> io::Result<()>
    where
        M: std::fmt::Display,
    {
        render::write_tree(self, out, self.indent_width)
    }
}

/// Iterator over one sibling chain
#[derive(Debug, Clone)]
pub struct Siblings<'t, 'a, M> {
    tree: &'t ThreadTree<'a, M>,
    cursor: Option<NodeId>,
}

impl<M> Iterator for Siblings<'_, '_, M> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let current = self.cursor?;
        self.cursor = self.tree.nodes.get(current.0).and_then(|node| node.next);
        Some(current)
    }
}
