//! Worker - the consumer side of the command/reply exchange.
//!
//! A `WorkerThread` listens on the commands topic, hands each command to a
//! `CommandHandler` and sends the handler's reply to the replies topic,
//! echoing the command's correlation id.
//!
//! ## Quick Start
//!
//! ```ignore
//! use comment_bridge::bus::{Bus, InMemoryQueue};
//! use comment_bridge::bridge::BridgeConfig;
//! use comment_bridge::worker::{InMemoryComments, WorkerThread};
//!
//! let queue = InMemoryQueue::new();
//! let worker = WorkerThread::spawn(
//!     InMemoryComments::<CommentPayload>::new(),
//!     Bus::from_queue(queue.clone()),
//!     &BridgeConfig::default(),
//! );
//!
//! // ... bridges send commands to the queue ...
//!
//! let stats = worker.stop();
//! ```

mod handler;
mod thread;

pub use handler::{CommandHandler, InMemoryComments};
pub use thread::{WorkerStats, WorkerThread};
