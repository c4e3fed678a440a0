use std::env;
use std::fmt;
use std::str::FromStr;

use thiserror::Error;

pub(crate) const DEFAULT_INDENT_WIDTH: usize = 2;
const MAX_INDENT_WIDTH: usize = 16;

fn env_bool(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: bool) -> bool {
    lookup(key)
        .map(|value| matches!(value.to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
        .unwrap_or(default)
}

fn env_usize(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: usize) -> usize {
    lookup(key)
        .and_then(|value| value.trim().parse::<usize>().ok())
        .unwrap_or(default)
}

/// Invalid configuration values
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("invalid value `{value}` for {key}")]
    InvalidValue { key: &'static str, value: String },
}

/// What to do with a message that names itself as its reply target.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SelfReplyPolicy {
    /// Treat the target as unresolved; the message becomes a root
    #[default]
    Root,
    /// Fail the build with `ThreadingError::SelfReply`
    Reject,
}

impl FromStr for SelfReplyPolicy {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "root" => Ok(SelfReplyPolicy::Root),
            "reject" => Ok(SelfReplyPolicy::Reject),
            _ => Err(ConfigError::InvalidValue {
                key: "THREADING_SELF_REPLY",
                value: value.to_string(),
            }),
        }
    }
}

impl fmt::Display for SelfReplyPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SelfReplyPolicy::Root => f.write_str("root"),
            SelfReplyPolicy::Reject => f.write_str("reject"),
        }
    }
}

/// Runtime configuration for threading and listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThreadingConfig {
    pub self_reply: SelfReplyPolicy,
    /// Retry replies whose parent is not in the forest yet before orphaning them
    pub retry_deferred: bool,
    /// Check that the input list is ordered before building
    pub verify_order: bool,
    /// Spaces per depth level in tree listings
    pub indent_width: usize,
}

impl ThreadingConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Read settings through `lookup`, falling back to defaults for missing
    /// or unparsable values.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let self_reply = lookup("THREADING_SELF_REPLY")
            .and_then(|value| match SelfReplyPolicy::from_str(&value) {
                Ok(policy) => Some(policy),
                Err(err) => {
                    log::warn!("{}, using default", err);
                    None
                }
            })
            .unwrap_or_default();

        let indent_width = env_usize(&lookup, "THREADING_INDENT_WIDTH", DEFAULT_INDENT_WIDTH)
            .clamp(1, MAX_INDENT_WIDTH);

        Self {
            self_reply,
            retry_deferred: env_bool(&lookup, "THREADING_RETRY_DEFERRED", true),
            verify_order: env_bool(&lookup, "THREADING_VERIFY_ORDER", true),
            indent_width,
        }
    }

    pub fn with_self_reply(mut self, policy: SelfReplyPolicy) -> Self {
        self.self_reply = policy;
        self
    }

    pub fn with_retry_deferred(mut self, retry: bool) -> Self {
        self.retry_deferred = retry;
        self
    }

    pub fn with_verify_order(mut self, verify: bool) -> Self {
        self.verify_order = verify;
        self
    }

    pub fn with_indent_width(mut self, width: usize) -> Self {
        self.indent_width = width.clamp(1, MAX_INDENT_WIDTH);
        self
    }
}

impl Default for ThreadingConfig {
    fn default() -> Self {
        Self::from_env()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let values: HashMap<String, String> = pairs
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect();
        move |key: &str| values.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = ThreadingConfig::from_lookup(|_| None);
        assert_eq!(config.self_reply, SelfReplyPolicy::Root);
        assert!(config.retry_deferred);
        assert!(config.verify_order);
        assert_eq!(config.indent_width, 2);
    }

    #[test]
    fn test_values_from_lookup() {
        let config = ThreadingConfig::from_lookup(lookup_from(&[
            ("THREADING_SELF_REPLY", "Reject"),
            ("THREADING_RETRY_DEFERRED", "no"),
            ("THREADING_VERIFY_ORDER", "0"),
            ("THREADING_INDENT_WIDTH", "4"),
        ]));

        assert_eq!(config.self_reply, SelfReplyPolicy::Reject);
        assert!(!config.retry_deferred);
        assert!(!config.verify_order);
        assert_eq!(config.indent_width, 4);
    }

    #[test]
    fn test_invalid_values_fall_back() {
        let config = ThreadingConfig::from_lookup(lookup_from(&[
            ("THREADING_SELF_REPLY", "ignore"),
            ("THREADING_INDENT_WIDTH", "lots"),
        ]));

        assert_eq!(config.self_reply, SelfReplyPolicy::Root);
        assert_eq!(config.indent_width, 2);
    }

    #[test]
    fn test_indent_width_is_clamped() {
        let config = ThreadingConfig::from_lookup(lookup_from(&[("THREADING_INDENT_WIDTH", "0")]));
        assert_eq!(config.indent_width, 1);

        let config = ThreadingConfig::from_lookup(|_| None).with_indent_width(100);
        assert_eq!(config.indent_width, 16);
    }

    #[test]
    fn test_self_reply_policy_parse() {
        assert_eq!("root".parse::<SelfReplyPolicy>(), Ok(SelfReplyPolicy::Root));
        assert_eq!(" REJECT ".parse::<SelfReplyPolicy>(), Ok(SelfReplyPolicy::Reject));
        assert!("drop".parse::<SelfReplyPolicy>().is_err());
        assert_eq!(SelfReplyPolicy::Reject.to_string(), "reject");
    }
}
