//! Shared fixtures: payload type, configs, probing senders and workers.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use comment_bridge::bridge::{Bridge, BridgeConfig, Command, Operation, Reply, ReplyMatching};
use comment_bridge::bus::{Bus, BusError, InMemoryQueue, Listener, Message, Sender};
use comment_bridge::cache::InMemoryCache;
use comment_bridge::worker::{InMemoryComments, WorkerThread};
use comment_bridge::ResourceId;

pub const COMMANDS: &str = "InTopic";
pub const REPLIES: &str = "OutTopic";

/// Minimal comment payload.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Text {
    pub text: String,
}

pub fn text(s: &str) -> Text {
    Text { text: s.to_string() }
}

pub type TextCache = InMemoryCache<ResourceId, Text>;
pub type TextBridge<S> = Bridge<Text, S, TextCache>;

pub fn config() -> BridgeConfig {
    BridgeConfig::default()
        .with_reply_timeout(Duration::from_millis(500))
        .with_poll_interval(Duration::from_millis(10))
}

pub fn next_reply_config() -> BridgeConfig {
    config().with_matching(ReplyMatching::NextReply)
}

/// A bridge over `queue` with a fresh cache.
pub fn bridge(queue: &InMemoryQueue, config: BridgeConfig) -> TextBridge<InMemoryQueue> {
    Bridge::new(queue.clone(), queue.clone(), TextCache::new(), config)
}

/// A worker over `queue` whose store is seeded with `rows`.
pub fn worker(queue: &InMemoryQueue, rows: &[(ResourceId, &str)]) -> WorkerThread {
    let store = InMemoryComments::new();
    for (id, t) in rows {
        store.insert(*id, text(t));
    }
    WorkerThread::spawn(store, Bus::from_queue(queue.clone()), &config())
}

/// What the cache looked like when a command left.
#[derive(Clone, Debug, PartialEq)]
pub struct SendProbe {
    pub operation: Operation,
    pub resource_id: Option<ResourceId>,
    pub cached_at_send: bool,
}

/// Sender that records cache membership of the target id at send time,
/// then forwards to the queue.
#[derive(Clone)]
pub struct ProbeSender {
    pub queue: InMemoryQueue,
    pub cache: TextCache,
    pub probes: Arc<Mutex<Vec<SendProbe>>>,
}

impl ProbeSender {
    pub fn new(queue: InMemoryQueue, cache: TextCache) -> Self {
        Self {
            queue,
            cache,
            probes: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn probes(&self) -> Vec<SendProbe> {
        self.probes.lock().unwrap().clone()
    }
}

impl Sender for ProbeSender {
    fn send(&self, topic: &str, message: Message) -> Result<(), BusError> {
        let command: Command<Text> = message.decode().unwrap();
        let cached_at_send = command
            .resource_id
            .map(|id| self.cache.contains(&id))
            .unwrap_or(false);
        self.probes.lock().unwrap().push(SendProbe {
            operation: command.operation,
            resource_id: command.resource_id,
            cached_at_send,
        });
        self.queue.send(topic, message)
    }
}

/// Sender whose broker is unreachable.
pub struct FailingSender;

impl Sender for FailingSender {
    fn send(&self, _topic: &str, _message: Message) -> Result<(), BusError> {
        Err(BusError::ConnectionFailed("broker unreachable".into()))
    }
}

/// Collect `n` commands, then answer them in reverse order, echoing each
/// command's GET id with a payload of `"reply-<id>"`.
pub fn reversing_worker(queue: &InMemoryQueue, n: usize) -> JoinHandle<()> {
    let queue = queue.clone();
    thread::spawn(move || {
        let mut pending = Vec::new();
        while pending.len() < n {
            pending.extend(queue.listen(COMMANDS, 1_000).unwrap());
        }
        for record in pending.into_iter().rev() {
            let command: Command<Text> = record.message.decode().unwrap();
            let id = command.resource_id.unwrap();
            let reply = Reply::found(id, text(&format!("reply-{id}")));
            let mut message = Message::encode(id.to_string(), &reply).unwrap();
            if let Some(correlation_id) = record.message.correlation_id() {
                message = message.with_correlation_id(correlation_id);
            }
            queue.send(REPLIES, message).unwrap();
        }
    })
}
