//! Bridge - makes one command/reply exchange over the bus look synchronous.

use std::collections::HashMap;
use std::marker::PhantomData;
use std::sync::{Mutex, MutexGuard};

use serde::{de::DeserializeOwned, Serialize};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::bus::{Bus, Listener, Message, Record, Sender};
use crate::cache::{CacheError, CacheStore};

use super::command::{Command, Operation, Reply, Resolved, ResourceId};
use super::config::{BridgeConfig, ReplyMatching};
use super::error::BridgeError;
use super::router::ReplyRouter;
use super::serial::SerialReplies;

enum Replies {
    Routed(ReplyRouter),
    Serial(SerialReplies),
}

/// Synchronous facade over the commands and replies topics, with a
/// read-through cache in front of GETs.
///
/// `P` is the resource payload carried by commands, replies and cache
/// entries. The bridge never retries: one `execute` sends at most one
/// command.
///
/// ## Example
///
/// ```ignore
/// let bridge = Bridge::new(queue.clone(), queue, InMemoryCache::new(), BridgeConfig::default());
///
/// let comment = bridge.execute(Command::get(5))?;   // bus round trip, cached
/// let again = bridge.execute(Command::get(5))?;     // served from the cache
/// assert!(again.cached);
///
/// bridge.execute(Command::put(5, updated))?;        // evicts 5 before sending
/// ```
pub struct Bridge<P, S, C> {
    sender: S,
    cache: C,
    replies: Replies,
    config: BridgeConfig,
    /// Per-id count of writes that touched the cache. Every cache mutation
    /// made by `execute` happens under this lock.
    writes: Mutex<HashMap<ResourceId, u64>>,
    _payload: PhantomData<fn() -> P>,
}

impl<P, S, C> Bridge<P, S, C>
where
    P: Serialize + DeserializeOwned + Clone + Send + Sync + 'static,
    S: Sender,
    C: CacheStore<ResourceId, P>,
{
    /// Create a bridge sending on `sender` and reading replies from `listener`.
    ///
    /// In `Correlated` mode this spawns the reply router thread; it stops
    /// when the bridge is dropped.
    pub fn new<L>(sender: S, listener: L, cache: C, config: BridgeConfig) -> Self
    where
        L: Listener + 'static,
    {
        let replies = match config.matching {
            ReplyMatching::Correlated => Replies::Routed(ReplyRouter::spawn(
                listener,
                config.replies_topic.clone(),
                config.poll_interval,
            )),
            ReplyMatching::NextReply => {
                Replies::Serial(SerialReplies::new(listener, config.replies_topic.clone()))
            }
        };

        Self {
            sender,
            cache,
            replies,
            config,
            writes: Mutex::new(HashMap::new()),
            _payload: PhantomData,
        }
    }

    /// Create a bridge from a service bus.
    pub fn from_bus<L>(bus: Bus<S, L>, cache: C, config: BridgeConfig) -> Self
    where
        L: Listener + 'static,
    {
        let (sender, listener) = bus.into_parts();
        Self::new(sender, listener, cache, config)
    }

    pub fn config(&self) -> &BridgeConfig {
        &self.config
    }

    pub fn cache(&self) -> &C {
        &self.cache
    }

    /// Drop the cache entry for `id`.
    pub fn evict(&self, id: ResourceId) -> Result<bool, BridgeError> {
        Ok(self.cache.evict(&id)?)
    }

    /// Run one command through the bus and wait for its reply.
    ///
    /// - GET with an id is answered from the cache when possible.
    /// - PUT/DELETE evict the target before the command is sent, and again
    ///   once the exchange ends, whatever its outcome.
    /// - A reply without payload is `NotFound`; no reply within
    ///   `reply_timeout` is `Timeout`.
    /// - A successful non-cached GET populates the cache, unless a write to
    ///   the same id started or finished while it was waiting.
    pub fn execute(&self, command: Command<P>) -> Result<Resolved<P>, BridgeError> {
        let operation = command.operation;
        let target = command.resource_id;
        let mut seen = None;

        if let Some(id) = target {
            if operation == Operation::Get {
                if let Some(payload) = self.cache.get(&id)? {
                    debug!(id, "cache hit");
                    return Ok(Resolved {
                        resource_id: Some(id),
                        payload,
                        cached: true,
                    });
                }
                debug!(id, "cache miss");
                seen = Some(self.generation(id)?);
            } else if operation.is_write() {
                let evicted = self.invalidate(id)?;
                debug!(id, evicted, operation = %operation, "evicted before write");
            }
        }

        let reply = self.round_trip(command);
        if let Some(id) = target.filter(|_| operation.is_write()) {
            self.invalidate(id)?;
        }

        let reply = reply?;
        let Some(payload) = reply.payload else {
            debug!(id = ?target, operation = %operation, "reply signalled not found");
            return Err(BridgeError::not_found("Not found"));
        };

        if let (Some(id), Some(seen)) = (target, seen) {
            self.fill(id, seen, payload.clone())?;
        }

        Ok(Resolved {
            resource_id: reply.resource_id,
            payload,
            cached: false,
        })
    }

    fn writes(&self) -> Result<MutexGuard<'_, HashMap<ResourceId, u64>>, BridgeError> {
        self.writes
            .lock()
            .map_err(|e| BridgeError::Cache(CacheError::Poisoned(e.to_string())))
    }

    fn generation(&self, id: ResourceId) -> Result<u64, BridgeError> {
        Ok(self.writes()?.get(&id).copied().unwrap_or(0))
    }

    /// Record a write to `id` and drop its cache entry.
    fn invalidate(&self, id: ResourceId) -> Result<bool, BridgeError> {
        let mut writes = self.writes()?;
        *writes.entry(id).or_insert(0) += 1;
        Ok(self.cache.evict(&id)?)
    }

    /// Cache a GET reply if no write to `id` overlapped the round trip.
    fn fill(&self, id: ResourceId, seen: u64, payload: P) -> Result<(), BridgeError> {
        let writes = self.writes()?;
        if writes.get(&id).copied().unwrap_or(0) != seen {
            debug!(id, "write overlapped the read; reply not cached");
            return Ok(());
        }
        self.cache.put(id, payload)?;
        Ok(())
    }

    fn round_trip(&self, command: Command<P>) -> Result<Reply<P>, BridgeError> {
        let correlation_id = Uuid::new_v4().to_string();
        let operation = command.operation;
        let message =
            Message::encode(correlation_id.clone(), &command)?.with_correlation_id(&correlation_id);
        let timeout = self.config.reply_timeout;

        let record = match &self.replies {
            Replies::Routed(router) => {
                let pending = router.register(&correlation_id)?;
                self.publish(message, operation, &correlation_id)?;
                pending.wait(timeout)
            }
            Replies::Serial(serial) => {
                let mut gate = serial.acquire()?;
                self.publish(message, operation, &correlation_id)?;
                match gate.next(timeout)? {
                    Some(record) => {
                        if record.message.correlation_id() != Some(correlation_id.as_str()) {
                            warn!(
                                expected = %correlation_id,
                                received = ?record.message.correlation_id(),
                                "taking next reply without a matching correlation id"
                            );
                        }
                        Ok(record)
                    }
                    None => Err(BridgeError::Timeout { waited: timeout }),
                }
            }
        };

        let record = record.inspect_err(|e| {
            if e.is_timeout() {
                warn!(
                    correlation_id = %correlation_id,
                    operation = %operation,
                    timeout_ms = u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX),
                    "no reply before timeout"
                );
            }
        })?;

        decode_reply(&record)
    }

    fn publish(
        &self,
        message: Message,
        operation: Operation,
        correlation_id: &str,
    ) -> Result<(), BridgeError> {
        self.sender.send(&self.config.commands_topic, message)?;
        debug!(
            topic = %self.config.commands_topic,
            correlation_id,
            operation = %operation,
            "command sent"
        );
        Ok(())
    }
}

fn decode_reply<P: DeserializeOwned>(record: &Record) -> Result<Reply<P>, BridgeError> {
    debug!(
        key = %record.message.key,
        partition = record.partition,
        offset = record.offset,
        "reply received"
    );
    Ok(record.message.decode()?)
}
