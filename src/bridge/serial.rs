//! Single-flight reply matching: callers take turns on one shared listener.

use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard};
use std::time::{Duration, Instant};

use crate::bus::{BusError, Listener, Record};

use super::error::BridgeError;

/// A shared listener guarded by a gate. The gate holder takes the next
/// reply, whatever command it answers.
///
/// Records that arrive in the same poll batch are buffered for the next
/// gate holder, in arrival order.
pub struct SerialReplies {
    listener: Box<dyn Listener>,
    topic: String,
    buffered: Mutex<VecDeque<Record>>,
}

impl SerialReplies {
    pub fn new<L: Listener + 'static>(listener: L, topic: impl Into<String>) -> Self {
        Self {
            listener: Box::new(listener),
            topic: topic.into(),
            buffered: Mutex::new(VecDeque::new()),
        }
    }

    /// Wait for the gate. Callers queue here until the current holder drops
    /// its `ReplyGate`.
    pub fn acquire(&self) -> Result<ReplyGate<'_>, BridgeError> {
        let buffered = self
            .buffered
            .lock()
            .map_err(|e| BridgeError::Channel(BusError::Poisoned(e.to_string())))?;
        Ok(ReplyGate {
            buffered,
            listener: &*self.listener,
            topic: &self.topic,
        })
    }
}

/// Exclusive access to the shared reply listener.
pub struct ReplyGate<'a> {
    buffered: MutexGuard<'a, VecDeque<Record>>,
    listener: &'a dyn Listener,
    topic: &'a str,
}

impl ReplyGate<'_> {
    /// Take the next reply, waiting at most `timeout`.
    pub fn next(&mut self, timeout: Duration) -> Result<Option<Record>, BridgeError> {
        if let Some(record) = self.buffered.pop_front() {
            return Ok(Some(record));
        }

        let deadline = Instant::now() + timeout;
        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            let remaining_ms = u64::try_from(remaining.as_millis()).unwrap_or(u64::MAX);
            let mut records = self.listener.listen(self.topic, remaining_ms)?.into_iter();

            if let Some(first) = records.next() {
                self.buffered.extend(records);
                return Ok(Some(first));
            }
            if Instant::now() >= deadline {
                return Ok(None);
            }
        }
    }
}
