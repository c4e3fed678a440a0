//! Cycle detection for reply chains
//!
//! Replies are attached by following `reply_target` through the identifier
//! index. A chain that loops back on itself (a self-reply, or A replying to
//! B replying to A) can never be attached under an existing root, so the
//! builder has to break it.

use std::collections::HashSet;

use crate::index::MessageIndex;
use crate::message::ThreadableMessage;

/// Check whether following reply targets from `message` loops
///
/// Walks up the reply chain through the index. Returns `true` as soon as an
/// identifier is seen twice, `false` when the chain ends at a message with
/// no reply target or at an identifier the index does not know.
///
/// ## Example
///
/// ```text
/// A → B → C → (none)      no cycle
/// A → B → A               cycle
/// A → A                   cycle (self-reply)
/// ```
pub fn detect_reply_cycle<M, I>(index: &I, message: &M) -> bool
where
    M: ThreadableMessage,
    I: MessageIndex<M> + ?Sized,
{
    let mut visited_ids: HashSet<&str> = HashSet::new();
    visited_ids.insert(message.identifier());
    let mut current_target = message.reply_target();

    while let Some(target) = current_target {
        if !visited_ids.insert(target) {
            return true;
        }
        current_target = index.find(target).and_then(|found| found.reply_target());
    }

    false
}
