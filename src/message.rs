//! Message records consumed by the ordering and threading code
//!
//! The crate never owns messages. Anything implementing [`ThreadableMessage`]
//! can be ordered and threaded; [`MailMessage`] is the record type used by
//! the mail reader itself.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The three fields threading needs from a message.
pub trait ThreadableMessage {
    /// Send time. Must be a total order.
    type Timestamp: Ord + Clone + fmt::Debug;

    /// Unique identifier (the Message-ID without angle brackets).
    fn identifier(&self) -> &str;

    fn timestamp(&self) -> Self::Timestamp;

    /// Identifier of the message this one replies to, if any.
    fn reply_target(&self) -> Option<&str>;

    /// Subject line, when the record carries one.
    fn subject(&self) -> Option<&str> {
        None
    }

    fn is_self_reply(&self) -> bool {
        self.reply_target() == Some(self.identifier())
    }
}

/// Errors raised while building a [`MailMessage`] from raw header values
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MessageError {
    #[error("message has no Message-ID")]
    MissingMessageId,
    #[error("message {message_id} has no Date header")]
    MissingDate { message_id: String },
    #[error("invalid Date header `{raw}` for message {message_id}: {error}")]
    InvalidDate {
        message_id: String,
        raw: String,
        error: String,
    },
}

/// A parsed mail message, reduced to what listings and threading need.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MailMessage {
    /// Message-ID, normalized (no angle brackets, no surrounding whitespace)
    pub message_id: String,

    /// Date the message was sent
    pub date: DateTime<Utc>,

    /// In-Reply-To value, normalized like `message_id`
    pub in_reply_to: Option<String>,

    /// Sender as it appeared in the From header
    pub from: String,

    pub subject: String,
}

impl MailMessage {
    pub fn new(message_id: impl Into<String>, date: DateTime<Utc>) -> Self {
        MailMessage {
            message_id: message_id.into(),
            date,
            in_reply_to: None,
            from: String::new(),
            subject: String::new(),
        }
    }

    pub fn with_reply_to(mut self, in_reply_to: impl Into<String>) -> Self {
        self.in_reply_to = normalize_message_id(&in_reply_to.into());
        self
    }

    pub fn with_sender(mut self, from: impl Into<String>) -> Self {
        self.from = from.into();
        self
    }

    pub fn with_subject(mut self, subject: impl Into<String>) -> Self {
        self.subject = subject.into();
        self
    }

    /// Build a message from header values already extracted by the parser.
    ///
    /// Message ids are normalized and the Date value is parsed with
    /// `dateparser`, so RFC 2822 dates as well as most ad-hoc formats are
    /// accepted. An empty In-Reply-To is treated as absent.
    pub fn from_headers(
        message_id: &str,
        date: &str,
        in_reply_to: Option<&str>,
    ) -> Result<Self, MessageError> {
        let message_id = normalize_message_id(message_id).ok_or(MessageError::MissingMessageId)?;
        let date = parse_date(date, &message_id)?;
        let in_reply_to = in_reply_to.and_then(normalize_message_id);

        Ok(MailMessage {
            message_id,
            date,
            in_reply_to,
            from: String::new(),
            subject: String::new(),
        })
    }
}

impl ThreadableMessage for MailMessage {
    type Timestamp = DateTime<Utc>;

    fn identifier(&self) -> &str {
        &self.message_id
    }

    fn timestamp(&self) -> DateTime<Utc> {
        self.date
    }

    fn reply_target(&self) -> Option<&str> {
        self.in_reply_to.as_deref()
    }

    fn subject(&self) -> Option<&str> {
        if self.subject.is_empty() {
            None
        } else {
            Some(&self.subject)
        }
    }
}

impl fmt::Display for MailMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} <{}>", self.date.format("%Y-%m-%d %H:%M:%S"), self.message_id)?;
        if !self.from.is_empty() {
            write!(f, " {}", self.from)?;
        }
        if !self.subject.is_empty() {
            write!(f, " {}", self.subject)?;
        }
        Ok(())
    }
}

/// Strip angle brackets and whitespace from a message id
pub fn normalize_message_id(raw: &str) -> Option<String> {
    let cleaned = raw.trim().trim_matches(&['<', '>'][..]).trim();
    if cleaned.is_empty() {
        None
    } else {
        Some(cleaned.to_string())
    }
}

fn parse_date(raw: &str, message_id: &str) -> Result<DateTime<Utc>, MessageError> {
    if raw.trim().is_empty() {
        log::warn!("message {} has no Date header", message_id);
        return Err(MessageError::MissingDate {
            message_id: message_id.to_string(),
        });
    }

    dateparser::parse(raw)
        .map(|parsed| parsed.with_timezone(&Utc))
        .map_err(|source| {
            log::warn!("message {} has invalid date `{}`: {}", message_id, raw, source);
            MessageError::InvalidDate {
                message_id: message_id.to_string(),
                raw: raw.to_string(),
                error: source.to_string(),
            }
        })
}
