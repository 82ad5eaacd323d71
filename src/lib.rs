//! comment_bridge - synchronous comment CRUD over an asynchronous
//! command/reply bus.
//!
//! Every request becomes a command on the commands topic; the caller blocks
//! until the matching reply shows up on the replies topic (or the wait times
//! out). A read-through cache answers repeated GETs without a round trip.
//!
//! - [`bus`]: topic-addressed `Sender`/`Listener` traits and an in-memory queue
//! - [`cache`]: the `CacheStore` trait and an in-memory cache
//! - [`bridge`]: the request/reply bridge, reply routing and configuration
//! - [`worker`]: the command consumer answering on the replies topic
//! - [`comments`]: the comment resource and its service
//! - `http` (feature `http`): axum routes over the comment service

pub mod bridge;
pub mod bus;
pub mod cache;
pub mod comments;
pub mod worker;

#[cfg(feature = "http")]
pub mod http;

pub use bridge::{
    Bridge, BridgeConfig, BridgeError, Command, Operation, Reply, ReplyMatching, Resolved,
    ResourceId,
};
pub use cache::{CacheStore, InMemoryCache};
pub use comments::{CommentError, CommentService};
