use std::collections::TryReserveError;
use thiserror::Error;

pub type ThreadingResult<T> = Result<T, ThreadingError>;

/// Errors returned while ordering or threading messages.
///
/// A reply whose target cannot be found is not an error: it becomes a
/// thread root.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ThreadingError {
    #[error("allocation failed: {0}")]
    Allocation(#[from] TryReserveError),
    #[error("message {message_id} replies to itself")]
    SelfReply { message_id: String },
    #[error("usage error: {0}")]
    Usage(#[from] UsageError),
}

/// Violated preconditions of the list and tree APIs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum UsageError {
    #[error("message list is not in timestamp order")]
    UnorderedInput,
    #[error("scan has already ended")]
    ScanExhausted,
    #[error("node {0} does not belong to this tree")]
    UnknownNode(usize),
}

impl ThreadingError {
    pub fn self_reply(message_id: impl Into<String>) -> Self {
        ThreadingError::SelfReply {
            message_id: message_id.into(),
        }
    }

    pub fn is_usage(&self) -> bool {
        matches!(self, ThreadingError::Usage(_))
    }
}
