//! Tree traversal utilities for the thread forest
//!
//! Every walk follows both links of a node: the reply subtree and the next
//! sibling. All functions use an explicit stack so deeply nested threads
//! cannot overflow the call stack, and a visited set so a malformed chain
//! is never walked twice.

use super::super::node::NodeId;
use super::super::tree::ThreadTree;
use crate::message::ThreadableMessage;

/// Pre-order walk yielding `(depth, node)`.
///
/// A node is yielded before its replies (at `depth + 1`), and its whole
/// reply subtree before its next sibling.
#[derive(Debug)]
pub struct PreOrder<'t, 'a, M> {
    tree: &'t ThreadTree<'a, M>,
    // (node, depth, follow the node's next sibling)
    stack: Vec<(NodeId, usize, bool)>,
    visited: Vec<bool>,
}

impl<'t, 'a, M: ThreadableMessage> PreOrder<'t, 'a, M> {
    /// Walk every root and all of its descendants
    pub fn forest(tree: &'t ThreadTree<'a, M>) -> Self {
        let stack = tree.first_root().map(|root| (root, 0, true)).into_iter().collect();
        PreOrder {
            tree,
            stack,
            visited: vec![false; tree.len()],
        }
    }

    /// Walk `node` and its descendants only, with `node` at depth 0
    pub fn subtree(tree: &'t ThreadTree<'a, M>, node: NodeId) -> Self {
        PreOrder {
            tree,
            stack: vec![(node, 0, false)],
            visited: vec![false; tree.len()],
        }
    }
}

impl<M> Iterator for PreOrder<'_, '_, M>
where
    M: ThreadableMessage,
{
    type Item = (usize, NodeId);

    fn next(&mut self) -> Option<(usize, NodeId)> {
        while let Some((current, depth, follow_next)) = self.stack.pop() {
            let Some(node) = self.tree.node(current) else {
                continue;
            };
            if std::mem::replace(&mut self.visited[current.index()], true) {
                log::warn!("thread node {} reached twice, skipping", current);
                continue;
            }

            // Sibling goes below the first reply so the whole subtree comes first
            if follow_next {
                if let Some(next) = node.next() {
                    self.stack.push((next, depth, true));
                }
            }
            if let Some(first_reply) = node.replies() {
                self.stack.push((first_reply, depth + 1, true));
            }

            return Some((depth, current));
        }
        None
    }
}

/// Find the node whose message identifier equals `identifier`
///
/// The search is exhaustive: no branch is abandoned because another one
/// exists, and `None` means every node reachable from the roots was
/// examined.
pub fn find_node<M: ThreadableMessage>(tree: &ThreadTree<'_, M>, identifier: &str) -> Option<NodeId> {
    PreOrder::forest(tree)
        .map(|(_, id)| id)
        .find(|id| {
            tree.message(*id)
                .is_some_and(|message| message.identifier() == identifier)
        })
}

/// Collect a thread's members with their depth, starting at `root`
///
/// The root itself is at depth 0. Siblings of `root` are not part of its
/// thread and are skipped.
pub fn collect_thread_members<M: ThreadableMessage>(
    tree: &ThreadTree<'_, M>,
    root: NodeId,
) -> Vec<(NodeId, usize)> {
    PreOrder::subtree(tree, root)
        .map(|(depth, id)| (id, depth))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{TestMessage, msg};

    /// Forest used by the tests below:
    ///
    /// ```text
    /// a
    /// ├── b
    /// │   └── d
    /// └── c
    /// e
    /// └── f
    /// ```
    fn create_test_tree(messages: &[TestMessage]) -> ThreadTree<'_, TestMessage> {
        let mut tree = ThreadTree::new();
        let a = tree_node(&mut tree, &messages[0]);
        let b = tree_node(&mut tree, &messages[1]);
        let c = tree_node(&mut tree, &messages[2]);
        let d = tree_node(&mut tree, &messages[3]);
        let e = tree_node(&mut tree, &messages[4]);
        let f = tree_node(&mut tree, &messages[5]);
        tree.append_root(a);
        tree.append_root(e);
        tree.insert_reply(a, b);
        tree.insert_reply(a, c);
        tree.insert_reply(b, d);
        tree.insert_reply(e, f);
        tree
    }

    fn tree_node<'a>(tree: &mut ThreadTree<'a, TestMessage>, message: &'a TestMessage) -> NodeId {
        tree.allocate(message).unwrap()
    }

    fn create_test_messages() -> Vec<TestMessage> {
        vec![
            msg("a", 1, None),
            msg("b", 2, Some("a")),
            msg("c", 3, Some("a")),
            msg("d", 4, Some("b")),
            msg("e", 5, None),
            msg("f", 6, Some("e")),
        ]
    }

    #[test]
    fn test_pre_order_forest() {
        let messages = create_test_messages();
        let tree = create_test_tree(&messages);

        let visited: Vec<(usize, String)> = PreOrder::forest(&tree)
            .map(|(depth, id)| (depth, tree.message(id).unwrap().id.clone()))
            .collect();

        assert_eq!(
            visited,
            vec![
                (0, "a".to_string()),
                (1, "b".to_string()),
                (2, "d".to_string()),
                (1, "c".to_string()),
                (0, "e".to_string()),
                (1, "f".to_string()),
            ]
        );
    }

    #[test]
    fn test_find_in_sibling_of_node_with_replies() {
        // `c` is only reachable through the next link of `b`, which has replies
        let messages = create_test_messages();
        let tree = create_test_tree(&messages);

        let found = find_node(&tree, "c").and_then(|id| tree.message(id));
        assert_eq!(found.map(|m| m.time), Some(3));
    }

    #[test]
    fn test_find_in_later_root_subtree() {
        let messages = create_test_messages();
        let tree = create_test_tree(&messages);

        assert!(find_node(&tree, "f").is_some());
        assert!(find_node(&tree, "d").is_some());
        assert!(find_node(&tree, "missing").is_none());
    }

    #[test]
    fn test_find_in_empty_tree() {
        let tree: ThreadTree<'_, TestMessage> = ThreadTree::new();
        assert!(find_node(&tree, "a").is_none());
        assert_eq!(PreOrder::forest(&tree).count(), 0);
    }

    #[test]
    fn test_collect_thread_members_skips_root_siblings() {
        let messages = create_test_messages();
        let tree = create_test_tree(&messages);
        let a = find_node(&tree, "a").unwrap();

        let members: Vec<(String, usize)> = collect_thread_members(&tree, a)
            .into_iter()
            .map(|(id, depth)| (tree.message(id).unwrap().id.clone(), depth))
            .collect();

        assert_eq!(
            members,
            vec![
                ("a".to_string(), 0),
                ("b".to_string(), 1),
                ("d".to_string(), 2),
                ("c".to_string(), 1),
            ]
        );
    }
}
