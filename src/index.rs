//! Message-ID index
//!
//! Threading only asks the index whether an identifier names a known
//! message. [`MessageIdIndex`] is the default implementation; plain maps
//! keyed by identifier work as well.

use std::collections::{BTreeMap, HashMap};

use crate::message::ThreadableMessage;

/// Read-only lookup of messages by identifier.
pub trait MessageIndex<M> {
    fn find(&self, identifier: &str) -> Option<&M>;

    fn contains(&self, identifier: &str) -> bool {
        self.find(identifier).is_some()
    }
}

/// Ordered identifier index over borrowed messages.
#[derive(Debug)]
pub struct MessageIdIndex<'a, M> {
    by_identifier: BTreeMap<String, &'a M>,
}

impl<M> Default for MessageIdIndex<'_, M> {
    fn default() -> Self {
        MessageIdIndex {
            by_identifier: BTreeMap::new(),
        }
    }
}

impl<'a, M: ThreadableMessage> MessageIdIndex<'a, M> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_messages<I>(messages: I) -> Self
    where
        I: IntoIterator<Item = &'a M>,
    {
        let mut index = Self::new();
        for message in messages {
            index.insert(message);
        }
        index
    }

    /// Add a message. Returns `false` and keeps the earlier entry when the
    /// identifier is already present.
    pub fn insert(&mut self, message: &'a M) -> bool {
        let identifier = message.identifier();
        if self.by_identifier.contains_key(identifier) {
            log::warn!("duplicate message id {}, keeping first occurrence", identifier);
            return false;
        }
        self.by_identifier.insert(identifier.to_string(), message);
        true
    }

    pub fn len(&self) -> usize {
        self.by_identifier.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_identifier.is_empty()
    }

    /// Indexed messages in identifier order
    pub fn messages(&self) -> impl Iterator<Item = &'a M> + '_ {
        self.by_identifier.values().copied()
    }
}

impl<M> MessageIndex<M> for MessageIdIndex<'_, M> {
    fn find(&self, identifier: &str) -> Option<&M> {
        self.by_identifier.get(identifier).copied()
    }
}

impl<M> MessageIndex<M> for HashMap<String, &M> {
    fn find(&self, identifier: &str) -> Option<&M> {
        self.get(identifier).copied()
    }
}

impl<M> MessageIndex<M> for BTreeMap<String, &M> {
    fn find(&self, identifier: &str) -> Option<&M> {
        self.get(identifier).copied()
    }
}
