//! Bridge configuration: topic names, wait bounds and the reply matching mode.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const DEFAULT_COMMANDS_TOPIC: &str = "InTopic";
pub const DEFAULT_REPLIES_TOPIC: &str = "OutTopic";
pub const DEFAULT_REPLY_TIMEOUT: Duration = Duration::from_millis(50_000);
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Poll bound in whole milliseconds, never below 1 ms. A zero bound would
/// turn the listener loops into busy spins.
pub(crate) fn poll_millis(interval: Duration) -> u64 {
    u64::try_from(interval.as_millis()).unwrap_or(u64::MAX).max(1)
}

/// How a waiting caller is matched with a reply.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ReplyMatching {
    /// Match replies to waiters by the `correlation-id` header. One router
    /// thread demultiplexes the replies topic into per-request slots.
    #[default]
    Correlated,
    /// Callers take turns and each takes whatever reply arrives next.
    ///
    /// A reply that arrives after its caller timed out is handed to the next
    /// caller. Only sound when replies come back strictly in call order.
    NextReply,
}

impl fmt::Display for ReplyMatching {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReplyMatching::Correlated => f.write_str("correlated"),
            ReplyMatching::NextReply => f.write_str("next-reply"),
        }
    }
}

impl FromStr for ReplyMatching {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "correlated" => Ok(ReplyMatching::Correlated),
            "next-reply" | "next_reply" => Ok(ReplyMatching::NextReply),
            other => Err(format!("expected `correlated` or `next-reply`, got `{}`", other)),
        }
    }
}

/// Error raised while reading configuration from the environment.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("invalid value `{value}` for {key}: {reason}")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },
}

/// Configuration for a `Bridge` (and the worker on the other side).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BridgeConfig {
    /// Topic commands are sent to
    pub commands_topic: String,
    /// Topic replies are read from
    pub replies_topic: String,
    /// Hard upper bound on one caller's wait for its reply
    #[serde(with = "millis")]
    pub reply_timeout: Duration,
    /// Poll bound of background listener loops (router, worker)
    #[serde(with = "millis")]
    pub poll_interval: Duration,
    pub matching: ReplyMatching,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            commands_topic: DEFAULT_COMMANDS_TOPIC.to_string(),
            replies_topic: DEFAULT_REPLIES_TOPIC.to_string(),
            reply_timeout: DEFAULT_REPLY_TIMEOUT,
            poll_interval: DEFAULT_POLL_INTERVAL,
            matching: ReplyMatching::default(),
        }
    }
}

impl BridgeConfig {
    pub const COMMANDS_TOPIC_VAR: &'static str = "COMMENTS_COMMANDS_TOPIC";
    pub const REPLIES_TOPIC_VAR: &'static str = "COMMENTS_REPLIES_TOPIC";
    pub const REPLY_TIMEOUT_VAR: &'static str = "COMMENTS_REPLY_TIMEOUT_MS";
    pub const POLL_INTERVAL_VAR: &'static str = "COMMENTS_POLL_INTERVAL_MS";
    pub const MATCHING_VAR: &'static str = "COMMENTS_REPLY_MATCHING";

    pub fn with_commands_topic(mut self, topic: impl Into<String>) -> Self {
        self.commands_topic = topic.into();
        self
    }

    pub fn with_replies_topic(mut self, topic: impl Into<String>) -> Self {
        self.replies_topic = topic.into();
        self
    }

    pub fn with_reply_timeout(mut self, timeout: Duration) -> Self {
        self.reply_timeout = timeout;
        self
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    pub fn with_matching(mut self, matching: ReplyMatching) -> Self {
        self.matching = matching;
        self
    }

    /// Read overrides from the process environment; unset variables keep
    /// their defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read overrides through an arbitrary lookup function.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(topic) = lookup(Self::COMMANDS_TOPIC_VAR) {
            config.commands_topic = topic;
        }
        if let Some(topic) = lookup(Self::REPLIES_TOPIC_VAR) {
            config.replies_topic = topic;
        }
        if let Some(value) = lookup(Self::REPLY_TIMEOUT_VAR) {
            config.reply_timeout = parse_millis(Self::REPLY_TIMEOUT_VAR, &value)?;
        }
        if let Some(value) = lookup(Self::POLL_INTERVAL_VAR) {
            let interval = parse_millis(Self::POLL_INTERVAL_VAR, &value)?;
            if interval.is_zero() {
                return Err(ConfigError::Invalid {
                    key: Self::POLL_INTERVAL_VAR,
                    value,
                    reason: "must be at least 1".into(),
                });
            }
            config.poll_interval = interval;
        }
        if let Some(value) = lookup(Self::MATCHING_VAR) {
            config.matching = value.parse().map_err(|reason| ConfigError::Invalid {
                key: Self::MATCHING_VAR,
                value: value.clone(),
                reason,
            })?;
        }

        Ok(config)
    }
}

fn parse_millis(key: &'static str, value: &str) -> Result<Duration, ConfigError> {
    value
        .trim()
        .parse::<u64>()
        .map(Duration::from_millis)
        .map_err(|e| ConfigError::Invalid {
            key,
            value: value.to_string(),
            reason: e.to_string(),
        })
}

mod millis {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(u64::try_from(value.as_millis()).unwrap_or(u64::MAX))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}
