//! Sender trait for point-to-point messaging.

use super::{BusError, Message};

/// Trait for sending messages to a named topic.
///
/// Each message sent to a topic is consumed by exactly one listener on that
/// topic (competing consumers).
pub trait Sender: Send + Sync {
    /// Send a message to a named topic.
    fn send(&self, topic: &str, message: Message) -> Result<(), BusError>;
}

impl<T: Sender + ?Sized> Sender for std::sync::Arc<T> {
    fn send(&self, topic: &str, message: Message) -> Result<(), BusError> {
        (**self).send(topic, message)
    }
}
