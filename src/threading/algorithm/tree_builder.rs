//! Two-pass thread tree construction
//!
//! ## Algorithm Overview
//!
//! 1. **Root pass**: scan the ordered list once; every message without a
//!    reply target, or whose target the index does not know, is appended as
//!    a root. The list is time-ordered, so appending keeps the roots ordered.
//! 2. **Attachment pass**: every other message is attached under the node
//!    whose identifier equals its reply target, found with an exhaustive
//!    forest search, and inserted among that node's replies by timestamp.
//! 3. **Deferred replies**: a reply whose parent is not in the forest yet
//!    waits on the parent's identifier and is attached as soon as that
//!    parent is. Replies still waiting at the end are blocked by a parent
//!    missing from the list or by a reply cycle; the blocker is promoted to
//!    a root and its waiters follow it into the tree.

use std::collections::{HashMap, HashSet};
use std::ptr;
use std::time::Instant;

use super::super::node::NodeId;
use super::super::tree::ThreadTree;
use super::cycle_detection::detect_reply_cycle;
use super::tree_traversal::find_node;
use crate::config::{SelfReplyPolicy, ThreadingConfig};
use crate::error::{ThreadingError, ThreadingResult, UsageError};
use crate::index::MessageIndex;
use crate::message::ThreadableMessage;
use crate::ordered_list::OrderedMessageList;

/// Builds a [`ThreadTree`] from an ordered list and an identifier index.
#[derive(Debug, Clone)]
pub struct ThreadTreeBuilder {
    config: ThreadingConfig,
}

impl Default for ThreadTreeBuilder {
    fn default() -> Self {
        Self::new(ThreadingConfig::default())
    }
}

impl ThreadTreeBuilder {
    pub fn new(config: ThreadingConfig) -> Self {
        ThreadTreeBuilder { config }
    }

    pub fn config(&self) -> &ThreadingConfig {
        &self.config
    }

    /// Build the thread forest for every message in `ordered`.
    ///
    /// Every message appears exactly once in the result. Unknown or
    /// unreachable reply targets make roots, never errors.
    ///
    /// ## Errors
    ///
    /// - `Usage(UnorderedInput)` if order verification is enabled and the
    ///   list is not sorted
    /// - `SelfReply` for a self-reply under [`SelfReplyPolicy::Reject`]
    /// - `Allocation` if node storage cannot grow
    pub fn build<'a, M, I>(
        &self,
        ordered: &OrderedMessageList<'a, M>,
        index: &I,
    ) -> ThreadingResult<ThreadTree<'a, M>>
    where
        M: ThreadableMessage,
        I: MessageIndex<M> + ?Sized,
    {
        if self.config.verify_order && !ordered.is_ordered() {
            return Err(UsageError::UnorderedInput.into());
        }

        let start_time = Instant::now();
        let mut tree = ThreadTree::with_capacity(ordered.len(), self.config.indent_width)?;

        // Pass 1: roots
        let pending = self.promote_roots(ordered, index, &mut tree)?;
        log::debug!(
            "root pass: {} roots, {} replies pending",
            tree.len(),
            pending.len()
        );

        // Pass 2: replies
        let orphans = self.attach_replies(pending, index, &mut tree)?;

        log::debug!(
            "thread tree complete: {} messages, {} roots, {} orphans in {:.2}ms",
            tree.len(),
            tree.root_count(),
            orphans,
            start_time.elapsed().as_secs_f64() * 1000.0
        );

        Ok(tree)
    }

    /// Append every root to `tree` and return the messages left to attach,
    /// in list order
    fn promote_roots<'a, M, I>(
        &self,
        ordered: &OrderedMessageList<'a, M>,
        index: &I,
        tree: &mut ThreadTree<'a, M>,
    ) -> ThreadingResult<Vec<&'a M>>
    where
        M: ThreadableMessage,
        I: MessageIndex<M> + ?Sized,
    {
        let mut pending = Vec::new();
        pending.try_reserve(ordered.len())?;

        for message in ordered.start_scan() {
            if self.is_root(message, index)? {
                let id = tree.allocate(message)?;
                tree.append_root(id);
            } else {
                pending.push(message);
            }
        }

        Ok(pending)
    }

    fn is_root<M, I>(&self, message: &M, index: &I) -> ThreadingResult<bool>
    where
        M: ThreadableMessage,
        I: MessageIndex<M> + ?Sized,
    {
        let Some(target) = message.reply_target() else {
            return Ok(true);
        };

        if message.is_self_reply() {
            return match self.config.self_reply {
                SelfReplyPolicy::Root => {
                    log::warn!(
                        "message {} replies to itself, treating it as a root",
                        message.identifier()
                    );
                    Ok(true)
                }
                SelfReplyPolicy::Reject => Err(ThreadingError::self_reply(message.identifier())),
            };
        }

        Ok(!index.contains(target))
    }

    /// Attach `pending` replies under their parents; returns how many had to
    /// be promoted to roots instead
    fn attach_replies<'a, M, I>(
        &self,
        pending: Vec<&'a M>,
        index: &I,
        tree: &mut ThreadTree<'a, M>,
    ) -> ThreadingResult<usize>
    where
        M: ThreadableMessage,
        I: MessageIndex<M> + ?Sized,
    {
        let mut waiting = Waiting::default();
        let mut attached = 0;
        let mut orphans = 0;

        for (position, message) in pending.into_iter().enumerate() {
            let Some(target) = message.reply_target() else {
                continue;
            };

            match find_node(tree, target) {
                Some(parent) => attached += place(tree, &mut waiting, Some(parent), message)?,
                None if self.config.retry_deferred => waiting.push(target, position, message)?,
                None => {
                    log::warn!(
                        "parent {} of message {} is not in the thread tree, promoting to root",
                        target,
                        message.identifier()
                    );
                    attached += place(tree, &mut waiting, None, message)?;
                    orphans += 1;
                }
            }
        }

        log::debug!(
            "attachment pass: {} attached, {} waiting",
            attached,
            waiting.len()
        );

        // Whatever still waits is blocked by a parent missing from the list
        // or by a reply cycle. Promote one blocker at a time; its waiters
        // follow it into the tree.
        while let Some(stall) = waiting.next_stall() {
            let blocker = match stall {
                Stall::MissingParent(blocker) => {
                    log::warn!(
                        "parent {} of message {} is not in the message list, promoting to root",
                        blocker.reply_target().unwrap_or_default(),
                        blocker.identifier()
                    );
                    blocker
                }
                Stall::Cycle(blocker) => {
                    if detect_reply_cycle(index, blocker) {
                        log::warn!(
                            "reply cycle through message {}, breaking it by promoting to root",
                            blocker.identifier()
                        );
                    } else {
                        log::warn!(
                            "message {} waits on itself through the list, promoting to root",
                            blocker.identifier()
                        );
                    }
                    blocker
                }
            };

            waiting.remove(blocker);
            place(tree, &mut waiting, None, blocker)?;
            orphans += 1;
        }

        Ok(orphans)
    }
}

/// Put `message` under `parent`, or among the roots when `parent` is
/// `None`, then everything that was waiting on it. Returns how many
/// messages were placed.
fn place<'a, M: ThreadableMessage>(
    tree: &mut ThreadTree<'a, M>,
    waiting: &mut Waiting<'a, M>,
    parent: Option<NodeId>,
    message: &'a M,
) -> ThreadingResult<usize> {
    let mut placed = 0;
    let mut stack = vec![(parent, message)];

    while let Some((parent, message)) = stack.pop() {
        let id = tree.allocate(message)?;
        match parent {
            Some(parent) => tree.insert_reply(parent, id),
            None => tree.insert_root(id),
        }
        placed += 1;

        for waiter in waiting.wake(message.identifier()) {
            stack.try_reserve(1)?;
            stack.push((Some(id), waiter));
        }
    }

    Ok(placed)
}

/// What keeps the earliest stalled messages out of the tree
enum Stall<'a, M> {
    /// Its reply target is not any waiting message, so the parent is not in
    /// the list at all
    MissingParent(&'a M),
    /// Following reply targets through the waiting messages comes back to
    /// this one
    Cycle(&'a M),
}

/// Replies whose parent is not in the tree yet, keyed by that parent's
/// identifier. Each entry keeps its position in the list.
struct Waiting<'a, M> {
    by_target: HashMap<&'a str, Vec<(usize, &'a M)>>,
}

impl<M> Default for Waiting<'_, M> {
    fn default() -> Self {
        Waiting {
            by_target: HashMap::new(),
        }
    }
}

impl<'a, M: ThreadableMessage> Waiting<'a, M> {
    fn push(&mut self, target: &'a str, position: usize, message: &'a M) -> ThreadingResult<()> {
        let waiters = self.by_target.entry(target).or_default();
        waiters.try_reserve(1)?;
        waiters.push((position, message));
        Ok(())
    }

    fn len(&self) -> usize {
        self.by_target.values().map(Vec::len).sum()
    }

    /// Take every message waiting on `identifier`, latest in the list first
    fn wake(&mut self, identifier: &str) -> Vec<&'a M> {
        self.by_target
            .remove(identifier)
            .map(|waiters| waiters.into_iter().rev().map(|(_, message)| message).collect())
            .unwrap_or_default()
    }

    fn remove(&mut self, message: &'a M) {
        let Some(target) = message.reply_target() else {
            return;
        };
        if let Some(waiters) = self.by_target.get_mut(target) {
            waiters.retain(|(_, waiter)| !ptr::eq(*waiter, message));
            if waiters.is_empty() {
                self.by_target.remove(target);
            }
        }
    }

    /// Pick the next message to promote.
    ///
    /// The earliest waiting message whose parent is missing from the list
    /// goes first. With none left, every waiting message hangs off a reply
    /// cycle: follow reply targets from the earliest one until an
    /// identifier repeats and promote that cycle member.
    fn next_stall(&self) -> Option<Stall<'a, M>> {
        let mut stalled: Vec<(usize, &'a M)> = self.by_target.values().flatten().copied().collect();
        stalled.sort_by_key(|(position, _)| *position);

        let mut by_identifier: HashMap<&str, &'a M> = HashMap::with_capacity(stalled.len());
        for (_, message) in &stalled {
            by_identifier.entry(message.identifier()).or_insert(*message);
        }

        if let Some((_, blocker)) = stalled.iter().find(|(_, message)| {
            message
                .reply_target()
                .is_none_or(|target| !by_identifier.contains_key(target))
        }) {
            return Some(Stall::MissingParent(*blocker));
        }

        let (_, mut current) = *stalled.first()?;
        let mut seen: HashSet<&str> = HashSet::new();
        while seen.insert(current.identifier()) {
            match current.reply_target().and_then(|target| by_identifier.get(target)) {
                Some(next) => current = *next,
                None => return Some(Stall::MissingParent(current)),
            }
        }
        Some(Stall::Cycle(current))
    }
}

/// Build a thread tree with the configuration read from the environment
pub fn build_thread_tree<'a, M, I>(
    ordered: &OrderedMessageList<'a, M>,
    index: &I,
) -> ThreadingResult<ThreadTree<'a, M>>
where
    M: ThreadableMessage,
    I: MessageIndex<M> + ?Sized,
{
    ThreadTreeBuilder::default().build(ordered, index)
}
