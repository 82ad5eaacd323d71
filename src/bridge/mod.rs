//! Bridge - synchronous request/reply over the asynchronous bus.
//!
//! ## Flow
//!
//! ```text
//!  caller ── execute(cmd) ──► Bridge ── send(InTopic) ──► worker
//!                               │                            │
//!                        cache get/put/evict                 │
//!                               │                            ▼
//!  caller ◄── Resolved ──── wait slot ◄── ReplyRouter ◄── OutTopic
//! ```
//!
//! GETs consult the cache first and populate it on success. PUT and DELETE
//! evict their target before the command leaves. Replies are matched to
//! callers by correlation id (`ReplyMatching::Correlated`) or, to reproduce
//! the single-consumer behaviour, by taking the next reply in turn
//! (`ReplyMatching::NextReply`).

mod bridge;
mod command;
mod config;
mod error;
mod router;
mod serial;

pub use bridge::Bridge;
pub use command::{Command, Operation, Reply, Resolved, ResourceId};
pub use config::{
    BridgeConfig, ConfigError, ReplyMatching, DEFAULT_COMMANDS_TOPIC, DEFAULT_POLL_INTERVAL,
    DEFAULT_REPLIES_TOPIC, DEFAULT_REPLY_TIMEOUT,
};
pub(crate) use config::poll_millis;
pub use error::{BridgeError, NOT_FOUND_CODE};
pub use router::{PendingReply, ReplyRouter, RouterStats};
pub use serial::{ReplyGate, SerialReplies};
