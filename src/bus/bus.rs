//! Service Bus - wraps a sender and a listener for a service.

use super::{BusError, Listener, Message, Record, Sender};

/// Service bus - wraps a sender and a listener for a service.
///
/// Each side of the comment exchange owns one: the bridge sends commands and
/// listens for replies, the worker listens for commands and sends replies.
///
/// ## Example
///
/// ```ignore
/// // Separate producer and consumer clients
/// let bus = Bus::new(kafka_producer, kafka_consumer);
///
/// // Or a unified queue implementation
/// let bus = Bus::from_queue(InMemoryQueue::new());
///
/// bus.send("InTopic", message)?;
/// for record in bus.listen("OutTopic", 1000)? {
///     // ...
/// }
/// ```
pub struct Bus<S: Sender, L: Listener> {
    sender: S,
    listener: L,
}

impl<S: Sender, L: Listener> Bus<S, L> {
    /// Create a new bus with the given sender and listener.
    pub fn new(sender: S, listener: L) -> Self {
        Self { sender, listener }
    }

    /// Send a message to a named topic.
    pub fn send(&self, topic: &str, message: Message) -> Result<(), BusError> {
        self.sender.send(topic, message)
    }

    /// Poll a named topic, blocking until records arrive or the timeout expires.
    pub fn listen(&self, topic: &str, timeout_ms: u64) -> Result<Vec<Record>, BusError> {
        self.listener.listen(topic, timeout_ms)
    }

    /// Get a reference to the underlying sender.
    pub fn sender(&self) -> &S {
        &self.sender
    }

    /// Get a reference to the underlying listener.
    pub fn listener(&self) -> &L {
        &self.listener
    }

    /// Split the bus into its sender and listener.
    pub fn into_parts(self) -> (S, L) {
        (self.sender, self.listener)
    }
}

// Convenience: when sender and listener are the same type (e.g., InMemoryQueue)
impl<T: Sender + Listener + Clone> Bus<T, T> {
    /// Create a bus from a unified queue that implements both `Sender` and `Listener`.
    pub fn from_queue(queue: T) -> Self {
        Self {
            sender: queue.clone(),
            listener: queue,
        }
    }
}
