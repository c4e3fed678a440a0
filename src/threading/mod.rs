//! Reply threading
//!
//! Messages are organized into a forest: each root is a message with no
//! reply target (or one that cannot be resolved), and each node's children
//! are its direct replies. Roots and every reply list are kept in
//! timestamp order.
//!
//! ## Module Structure
//!
//! - `node`: arena node and its index type
//! - `tree`: the forest, its queries and per-thread summaries
//! - `algorithm`: two-pass construction, exhaustive search, cycle handling

pub mod algorithm;
pub mod node;
pub mod tree;

pub use algorithm::{ThreadTreeBuilder, build_thread_tree};
pub use node::{NodeId, ThreadNode};
pub use tree::{Siblings, ThreadSummary, ThreadTree};
