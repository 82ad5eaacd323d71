//! Listener trait for point-to-point messaging.

use super::{BusError, Record};

/// Trait for listening on a named topic.
///
/// `listen` follows broker poll semantics: it returns as soon as at least one
/// record is available, or an empty batch once the timeout expires. It never
/// blocks longer than `timeout_ms`.
pub trait Listener: Send + Sync {
    /// Poll a named topic for up to `timeout_ms` milliseconds.
    fn listen(&self, topic: &str, timeout_ms: u64) -> Result<Vec<Record>, BusError>;
}

impl<T: Listener + ?Sized> Listener for std::sync::Arc<T> {
    fn listen(&self, topic: &str, timeout_ms: u64) -> Result<Vec<Record>, BusError> {
        (**self).listen(topic, timeout_ms)
    }
}

impl<T: Listener + ?Sized> Listener for Box<T> {
    fn listen(&self, topic: &str, timeout_ms: u64) -> Result<Vec<Record>, BusError> {
        (**self).listen(topic, timeout_ms)
    }
}
