//! In-memory queue for testing and single-process scenarios.
//!
//! This module provides a thread-safe in-memory queue that implements
//! both `Sender` and `Listener`, useful for:
//! - Unit and integration testing without a broker
//! - Running the comment service and its worker in one process

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Condvar, Mutex, MutexGuard};
use std::time::{Duration, Instant};

use super::{BusError, Listener, Message, Record, Sender};

/// The in-memory queue has a single partition per topic.
const PARTITION: u32 = 0;

#[derive(Default)]
struct Topic {
    /// Records not yet taken by a listener
    pending: VecDeque<Record>,
    /// Messages sent, in order (only when history is on)
    history: Vec<Message>,
    /// Also the number of messages ever sent
    next_offset: u64,
}

struct Shared {
    topics: Mutex<HashMap<String, Topic>>,
    arrived: Condvar,
    keep_history: bool,
}

/// In-memory queue for testing and single-process scenarios.
///
/// Features:
/// - Thread-safe (can be shared across threads via `Clone`)
/// - Named topics, created on first use
/// - Competing consumers: each record is handed to one listener
/// - Listeners wake as soon as a record arrives (no busy wait)
/// - A send count per topic, and an opt-in send history for assertions
///
/// ## Example
///
/// ```
/// use comment_bridge::bus::{InMemoryQueue, Listener, Message, Sender};
///
/// let queue = InMemoryQueue::new();
/// queue.send("InTopic", Message::new("1", b"{}".to_vec())).unwrap();
///
/// let records = queue.listen("InTopic", 100).unwrap();
/// assert_eq!(records.len(), 1);
/// assert_eq!(records[0].offset, 0);
/// ```
#[derive(Clone)]
pub struct InMemoryQueue {
    shared: Arc<Shared>,
}

impl Default for InMemoryQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryQueue {
    /// Create a new in-memory queue. Sent messages are not retained once
    /// they have been consumed.
    pub fn new() -> Self {
        Self::build(false)
    }

    /// Create a queue that also keeps a copy of every sent message, for
    /// `sent()`.
    pub fn with_history() -> Self {
        Self::build(true)
    }

    fn build(keep_history: bool) -> Self {
        Self {
            shared: Arc::new(Shared {
                topics: Mutex::new(HashMap::new()),
                arrived: Condvar::new(),
                keep_history,
            }),
        }
    }

    fn topics(&self) -> Result<MutexGuard<'_, HashMap<String, Topic>>, BusError> {
        self.shared
            .topics
            .lock()
            .map_err(|e| BusError::Poisoned(e.to_string()))
    }

    /// All messages sent to a topic, in send order. Always empty unless the
    /// queue was created `with_history()`.
    pub fn sent(&self, topic: &str) -> Vec<Message> {
        self.topics()
            .map(|t| t.get(topic).map(|t| t.history.clone()).unwrap_or_default())
            .unwrap_or_default()
    }

    /// Number of messages ever sent to a topic.
    pub fn sent_count(&self, topic: &str) -> usize {
        self.topics()
            .map(|t| {
                t.get(topic)
                    .map_or(0, |t| usize::try_from(t.next_offset).unwrap_or(usize::MAX))
            })
            .unwrap_or(0)
    }

    /// Number of records waiting to be taken from a topic.
    pub fn pending(&self, topic: &str) -> usize {
        self.topics()
            .map(|t| t.get(topic).map_or(0, |t| t.pending.len()))
            .unwrap_or(0)
    }

    /// Drop all topics, pending records and history.
    pub fn clear(&self) {
        if let Ok(mut topics) = self.topics() {
            topics.clear();
        }
    }
}

impl Sender for InMemoryQueue {
    fn send(&self, topic: &str, message: Message) -> Result<(), BusError> {
        let mut topics = self.topics()?;
        let entry = topics.entry(topic.to_string()).or_default();
        let offset = entry.next_offset;
        entry.next_offset += 1;
        if self.shared.keep_history {
            entry.history.push(message.clone());
        }
        entry.pending.push_back(Record {
            topic: topic.to_string(),
            partition: PARTITION,
            offset,
            message,
        });
        drop(topics);
        self.shared.arrived.notify_all();
        Ok(())
    }
}

impl Listener for InMemoryQueue {
    fn listen(&self, topic: &str, timeout_ms: u64) -> Result<Vec<Record>, BusError> {
        let deadline = Instant::now() + Duration::from_millis(timeout_ms);
        let mut topics = self.topics()?;

        loop {
            if let Some(entry) = topics.get_mut(topic) {
                if !entry.pending.is_empty() {
                    return Ok(entry.pending.drain(..).collect());
                }
            }

            let now = Instant::now();
            if now >= deadline {
                return Ok(Vec::new());
            }

            let (guard, _) = self
                .shared
                .arrived
                .wait_timeout(topics, deadline - now)
                .map_err(|e| BusError::Poisoned(e.to_string()))?;
            topics = guard;
        }
    }
}
