//! Ordering and threading of mail messages
//!
//! Two views over a set of borrowed messages:
//!
//! - [`OrderedMessageList`]: every message in send-time order
//! - [`ThreadTree`]: a forest of reply threads, built from the ordered list
//!   and a [`MessageIndex`] by [`ThreadTreeBuilder`]
//!
//! ```
//! use chrono::{TimeZone, Utc};
//! use mail_threads::{
//!     MailMessage, MessageIdIndex, OrderedMessageList, ThreadTreeBuilder, ThreadingConfig,
//! };
//!
//! let at = |minute| Utc.with_ymd_and_hms(2019, 2, 1, 9, minute, 0).unwrap();
//! let messages = [
//!     MailMessage::new("a", at(10)),
//!     MailMessage::new("c", at(15)),
//!     MailMessage::new("b", at(20)).with_reply_to("a"),
//! ];
//! let ordered = OrderedMessageList::try_from_messages(messages.iter())?;
//! let index = MessageIdIndex::from_messages(messages.iter());
//! let tree = ThreadTreeBuilder::new(ThreadingConfig::from_lookup(|_| None)).build(&ordered, &index)?;
//!
//! let mut layout = Vec::new();
//! tree.traverse(|depth, message| layout.push((depth, message.message_id.clone())));
//! assert_eq!(layout, [(0, "a".to_string()), (1, "b".to_string()), (0, "c".to_string())]);
//! # Ok::<(), mail_threads::ThreadingError>(())
//! ```

pub mod config;
pub mod error;
pub mod index;
pub mod message;
pub mod ordered_list;
pub mod ordering;
pub mod render;
pub mod threading;

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

pub use config::{ConfigError, SelfReplyPolicy, ThreadingConfig};
pub use error::{ThreadingError, ThreadingResult, UsageError};
pub use index::{MessageIdIndex, MessageIndex};
pub use message::{MailMessage, MessageError, ThreadableMessage};
pub use ordered_list::{OrderedMessageList, Scan};
pub use threading::{NodeId, ThreadSummary, ThreadTree, ThreadTreeBuilder, build_thread_tree};
