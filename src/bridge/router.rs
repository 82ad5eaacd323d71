//! Reply router - demultiplexes the shared replies topic to waiting callers.
//!
//! One background thread polls the replies topic. Every caller registers a
//! one-shot slot under its correlation id *before* sending its command; the
//! router hands each incoming record to the slot named by the record's
//! `correlation-id` header.

use std::collections::HashMap;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, SyncSender, TryRecvError};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::bus::{BusError, Listener, Record};

use super::config::poll_millis;
use super::error::BridgeError;

/// Statistics from the reply router thread.
#[derive(Debug, Default, Clone)]
pub struct RouterStats {
    /// Number of poll cycles completed.
    pub polls: usize,
    /// Replies handed to a waiting caller.
    pub routed: usize,
    /// Replies with no (or an unknown) correlation id.
    pub orphaned: usize,
    /// Failed polls.
    pub errors: usize,
}

struct Slots {
    open: bool,
    waiters: HashMap<String, SyncSender<Record>>,
}

type SharedSlots = Arc<Mutex<Slots>>;

fn poisoned<T>(e: std::sync::PoisonError<T>) -> BridgeError {
    BridgeError::Channel(BusError::Poisoned(e.to_string()))
}

/// Routes replies from a shared listener to per-request wait slots.
///
/// Dropping the router signals its thread to stop; `stop()` also joins it.
pub struct ReplyRouter {
    slots: SharedSlots,
    stop_tx: mpsc::Sender<()>,
    handle: Option<JoinHandle<RouterStats>>,
}

impl ReplyRouter {
    /// Spawn the router thread polling `topic` on `listener`.
    pub fn spawn<L>(listener: L, topic: impl Into<String>, poll_interval: Duration) -> Self
    where
        L: Listener + 'static,
    {
        let topic = topic.into();
        let slots: SharedSlots = Arc::new(Mutex::new(Slots {
            open: true,
            waiters: HashMap::new(),
        }));
        let (stop_tx, stop_rx) = mpsc::channel();
        let thread_slots = Arc::clone(&slots);
        let poll_ms = poll_millis(poll_interval);

        let handle = thread::spawn(move || {
            info!(topic = %topic, "reply router started");
            let mut stats = RouterStats::default();

            loop {
                match stop_rx.try_recv() {
                    Ok(()) | Err(TryRecvError::Disconnected) => break,
                    Err(TryRecvError::Empty) => {}
                }

                stats.polls += 1;

                match listener.listen(&topic, poll_ms) {
                    Ok(records) => {
                        for record in records {
                            route(&thread_slots, record, &mut stats);
                        }
                    }
                    Err(e) => {
                        stats.errors += 1;
                        warn!(topic = %topic, error = %e, "reply poll failed");
                        thread::sleep(Duration::from_millis(poll_ms));
                    }
                }
            }

            // Close and drop every slot so waiters observe the shutdown.
            if let Ok(mut slots) = thread_slots.lock() {
                slots.open = false;
                slots.waiters.clear();
            }
            info!(
                topic = %topic,
                routed = stats.routed,
                orphaned = stats.orphaned,
                "reply router stopped"
            );
            stats
        });

        Self {
            slots,
            stop_tx,
            handle: Some(handle),
        }
    }

    /// Reserve the wait slot for `correlation_id`.
    ///
    /// Must be called before the command is sent, so the reply cannot
    /// arrive ahead of its slot.
    pub fn register(&self, correlation_id: &str) -> Result<PendingReply, BridgeError> {
        let (tx, rx) = mpsc::sync_channel(1);
        let mut slots = self.slots.lock().map_err(poisoned)?;
        if !slots.open {
            return Err(BridgeError::Shutdown);
        }
        slots.waiters.insert(correlation_id.to_string(), tx);

        Ok(PendingReply {
            correlation_id: correlation_id.to_string(),
            rx,
            slots: Arc::clone(&self.slots),
        })
    }

    /// Number of callers currently waiting.
    pub fn waiting(&self) -> usize {
        self.slots.lock().map(|s| s.waiters.len()).unwrap_or(0)
    }

    /// Stop the router and wait for it to finish. Returns stats.
    pub fn stop(mut self) -> RouterStats {
        let _ = self.stop_tx.send(());
        match self.handle.take() {
            Some(handle) => handle.join().unwrap_or_default(),
            None => RouterStats::default(),
        }
    }
}

impl Drop for ReplyRouter {
    fn drop(&mut self) {
        let _ = self.stop_tx.send(());
    }
}

fn route(slots: &SharedSlots, record: Record, stats: &mut RouterStats) {
    debug!(
        topic = %record.topic,
        partition = record.partition,
        offset = record.offset,
        key = %record.message.key,
        "received reply"
    );

    let Some(correlation_id) = record.message.correlation_id().map(str::to_string) else {
        stats.orphaned += 1;
        warn!(offset = record.offset, "reply without correlation id dropped");
        return;
    };

    let waiter = match slots.lock() {
        Ok(mut slots) => slots.waiters.remove(&correlation_id),
        Err(_) => None,
    };

    let delivered = match waiter {
        Some(tx) => tx.try_send(record).is_ok(),
        None => false,
    };

    if delivered {
        stats.routed += 1;
    } else {
        stats.orphaned += 1;
        warn!(correlation_id = %correlation_id, "reply matched no waiting caller");
    }
}

/// A reserved wait slot for one command's reply.
///
/// Dropping it (after a timeout, or without waiting) releases the slot.
pub struct PendingReply {
    correlation_id: String,
    rx: Receiver<Record>,
    slots: SharedSlots,
}

impl PendingReply {
    pub fn correlation_id(&self) -> &str {
        &self.correlation_id
    }

    /// Block until the reply arrives or `timeout` elapses.
    pub fn wait(self, timeout: Duration) -> Result<Record, BridgeError> {
        match self.rx.recv_timeout(timeout) {
            Ok(record) => Ok(record),
            Err(RecvTimeoutError::Timeout) => Err(BridgeError::Timeout { waited: timeout }),
            Err(RecvTimeoutError::Disconnected) => Err(BridgeError::Shutdown),
        }
    }
}

impl Drop for PendingReply {
    fn drop(&mut self) {
        if let Ok(mut slots) = self.slots.lock() {
            slots.waiters.remove(&self.correlation_id);
        }
    }
}
