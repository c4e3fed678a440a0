//! Thread tree construction and traversal
//!
//! Use [`ThreadTreeBuilder`] (or [`build_thread_tree`]) to thread an ordered
//! message list.

pub(crate) mod cycle_detection;
mod tree_builder;
pub(crate) mod tree_traversal;

pub use cycle_detection::detect_reply_cycle;
pub use tree_builder::{ThreadTreeBuilder, build_thread_tree};
pub use tree_traversal::{PreOrder, collect_thread_members, find_node};
