//! Fixtures shared by unit and integration tests.

use std::fmt;
use std::sync::Once;

use chrono::{DateTime, Duration, TimeZone, Utc};

use crate::message::{MailMessage, ThreadableMessage};

static LOGGER: Once = Once::new();

/// Route `log` output through the test harness. Safe to call from every test.
pub fn init_test_logger() {
    LOGGER.call_once(|| {
        let _ = env_logger::builder()
            .is_test(true)
            .filter_level(log::LevelFilter::Debug)
            .try_init();
    });
}

/// Minimal message with an integer clock, for tests that only care about order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestMessage {
    pub id: String,
    pub time: i64,
    pub reply_to: Option<String>,
}

impl ThreadableMessage for TestMessage {
    type Timestamp = i64;

    fn identifier(&self) -> &str {
        &self.id
    }

    fn timestamp(&self) -> i64 {
        self.time
    }

    fn reply_target(&self) -> Option<&str> {
        self.reply_to.as_deref()
    }
}

impl fmt::Display for TestMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.id, self.time)
    }
}

pub fn msg(id: &str, time: i64, reply_to: Option<&str>) -> TestMessage {
    TestMessage {
        id: id.to_string(),
        time,
        reply_to: reply_to.map(str::to_string),
    }
}

/// Fixed epoch for [`mail`] so tests are reproducible.
pub fn base_date() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2019, 2, 1, 9, 0, 0)
        .single()
        .unwrap_or(DateTime::<Utc>::UNIX_EPOCH)
}

/// A [`MailMessage`] sent `minutes` after [`base_date`].
pub fn mail(id: &str, minutes: i64, reply_to: Option<&str>) -> MailMessage {
    let message = MailMessage::new(id, base_date() + Duration::minutes(minutes))
        .with_subject(format!("Test {}", id));
    match reply_to {
        Some(target) => message.with_reply_to(target),
        None => message,
    }
}

/// Identifiers of `messages`, in order.
pub fn ids<'a, M, I>(messages: I) -> Vec<String>
where
    M: ThreadableMessage + 'a,
    I: IntoIterator<Item = &'a M>,
{
    messages
        .into_iter()
        .map(|message| message.identifier().to_string())
        .collect()
}
