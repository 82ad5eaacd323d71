//! Service Bus - topic-addressed messaging abstractions
//!
//! This module provides the traits and the in-memory implementation used to
//! carry comment commands and replies between services.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    Bus (per service)                         │
//! │  - Wraps Sender + Listener                                  │
//! │  - send(topic, msg) / listen(topic, timeout)                │
//! └─────────────────────────────────────────────────────────────┘
//!                            │
//!                            ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                Sender + Listener Traits                      │
//! │  Sender:   send(topic, message)                             │
//! │  Listener: listen(topic, timeout) -> Vec<Record>            │
//! └─────────────────────────────────────────────────────────────┘
//!          │                  │                     │
//!          ▼                  ▼                     ▼
//! ┌─────────────┐    ┌─────────────┐    ┌─────────────────────┐
//! │InMemoryQueue│    │ KafkaQueue  │    │ RedisStreamQueue    │
//! │ (included)  │    │ (external)  │    │    (external)       │
//! └─────────────┘    └─────────────┘    └─────────────────────┘
//! ```
//!
//! The bus gives no request/reply correlation of its own. Correlation is
//! layered on top by the bridge through the `correlation-id` header.

mod bus;
mod error;
mod in_memory_queue;
mod listener;
mod message;
mod sender;

pub use bus::Bus;
pub use error::BusError;
pub use in_memory_queue::InMemoryQueue;
pub use listener::Listener;
pub use message::{Message, Record, CORRELATION_ID_HEADER};
pub use sender::Sender;
