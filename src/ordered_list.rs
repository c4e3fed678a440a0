//! Messages kept in send-time order
//!
//! The list borrows every message it holds; dropping the list never drops a
//! message. Scans are cursors owned by the caller, so any number of them can
//! run over the same list. A scan borrows the list, which rules out
//! inserting while one is alive.

use std::io;
use std::iter::FusedIterator;
use std::slice;

use crate::error::{ThreadingResult, UsageError};
use crate::message::ThreadableMessage;
use crate::ordering::{goes_before, is_sorted_by_timestamp};
use crate::render;

/// Borrowed messages in non-decreasing timestamp order.
///
/// A message inserted with the same timestamp as messages already present
/// lands immediately before the earliest of them. The order of equal
/// timestamps therefore depends on insertion order: inserting A then B
/// yields B, A, and inserting B then A yields A, B.
#[derive(Debug, Clone)]
pub struct OrderedMessageList<'a, M> {
    messages: Vec<&'a M>,
}

impl<M> Default for OrderedMessageList<'_, M> {
    fn default() -> Self {
        OrderedMessageList {
            messages: Vec::new(),
        }
    }
}

impl<'a, M: ThreadableMessage> OrderedMessageList<'a, M> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a list by inserting every message in iteration order
    pub fn try_from_messages<I>(messages: I) -> ThreadingResult<Self>
    where
        I: IntoIterator<Item = &'a M>,
    {
        let mut list = Self::new();
        for message in messages {
            list.insert(message)?;
        }
        Ok(list)
    }

    /// Insert `message` keeping the list ordered.
    ///
    /// The position is the first element the message does not come after;
    /// with no such element the message is appended. The only failure is
    /// running out of memory for the new slot.
    pub fn insert(&mut self, message: &'a M) -> ThreadingResult<()> {
        debug_assert!(self.is_ordered());

        self.messages.try_reserve(1)?;
        let position = self
            .messages
            .partition_point(|existing| !goes_before(message, *existing));
        self.messages.insert(position, message);
        Ok(())
    }

    pub fn is_ordered(&self) -> bool {
        is_sorted_by_timestamp(self.messages.iter().copied())
    }

    /// Start a new scan from the first message.
    pub fn start_scan(&self) -> Scan<'_, 'a, M> {
        Scan {
            remaining: self.messages.iter(),
        }
    }

    pub fn iter(&self) -> Scan<'_, 'a, M> {
        self.start_scan()
    }

    pub fn get(&self, position: usize) -> Option<&'a M> {
        self.messages.get(position).copied()
    }

    pub fn first(&self) -> Option<&'a M> {
        self.messages.first().copied()
    }

    pub fn last(&self) -> Option<&'a M> {
        self.messages.last().copied()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Write one line per message, oldest first
    pub fn write_to<W: io::Write>(&self, out: &mut W) -> io::Result<()>
    where
        M: std::fmt::Display,
    {
        render::write_list(self, out)
    }
}

impl<'l, 'a, M: ThreadableMessage> IntoIterator for &'l OrderedMessageList<'a, M> {
    type Item = &'a M;
    type IntoIter = Scan<'l, 'a, M>;

    fn into_iter(self) -> Self::IntoIter {
        self.start_scan()
    }
}

/// Forward cursor over an [`OrderedMessageList`].
///
/// Once ended, `next` keeps returning `None`.
#[derive(Debug, Clone)]
pub struct Scan<'l, 'a, M> {
    remaining: slice::Iter<'l, &'a M>,
}

impl<'a, M> Scan<'_, 'a, M> {
    pub fn is_ended(&self) -> bool {
        self.remaining.as_slice().is_empty()
    }

    /// Like `next`, but reports reading past the end as a usage error.
    pub fn try_next(&mut self) -> ThreadingResult<&'a M> {
        self.remaining
            .next()
            .copied()
            .ok_or_else(|| UsageError::ScanExhausted.into())
    }
}

impl<'a, M> Iterator for Scan<'_, 'a, M> {
    type Item = &'a M;

    fn next(&mut self) -> Option<&'a M> {
        self.remaining.next().copied()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.remaining.size_hint()
    }
}

impl<M> ExactSizeIterator for Scan<'_, '_, M> {}

impl<M> FusedIterator for Scan<'_, '_, M> {}
