//! Timestamp comparison shared by the ordered list and the thread tree

use crate::message::ThreadableMessage;

pub fn before<T: Ord>(a: &T, b: &T) -> bool {
    a < b
}

pub fn after<T: Ord>(a: &T, b: &T) -> bool {
    a > b
}

pub fn same_instant<T: Ord>(a: &T, b: &T) -> bool {
    !before(a, b) && !after(a, b)
}

/// Whether `incoming` belongs immediately before `existing`.
///
/// True when `incoming` is strictly earlier or ties with `existing`, so a
/// message is always placed ahead of any element sharing its timestamp.
/// Every sequence in the crate is maintained with this one rule.
pub fn goes_before<M: ThreadableMessage + ?Sized>(incoming: &M, existing: &M) -> bool {
    !after(&incoming.timestamp(), &existing.timestamp())
}

/// Whether the messages are in non-decreasing timestamp order
pub fn is_sorted_by_timestamp<'a, M, I>(messages: I) -> bool
where
    M: ThreadableMessage + 'a + ?Sized,
    I: IntoIterator<Item = &'a M>,
{
    let mut previous: Option<M::Timestamp> = None;
    for message in messages {
        let current = message.timestamp();
        if let Some(previous) = &previous {
            if after(previous, &current) {
                return false;
            }
        }
        previous = Some(current);
    }
    true
}
