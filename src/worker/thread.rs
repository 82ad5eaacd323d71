//! Background thread answering commands from the commands topic.

use std::sync::mpsc::{channel, Sender as StopSender, TryRecvError};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use serde::{de::DeserializeOwned, Serialize};
use tracing::{debug, info, warn};

use crate::bridge::{poll_millis, BridgeConfig, Command};
use crate::bus::{Bus, BusError, Listener, Message, Record, Sender};

use super::handler::CommandHandler;

/// Statistics from the worker thread.
#[derive(Debug, Default, Clone)]
pub struct WorkerStats {
    /// Commands answered with a reply.
    pub handled: usize,
    /// Commands that could not be decoded or answered.
    pub failed: usize,
    /// Number of poll cycles completed.
    pub polls: usize,
}

/// A background thread that listens on the commands topic and replies on
/// the replies topic.
///
/// Spawn it, let it work, then stop it and collect stats.
pub struct WorkerThread {
    stop_tx: StopSender<()>,
    handle: Option<JoinHandle<WorkerStats>>,
}

impl WorkerThread {
    /// Spawn a worker that answers commands with `handler`.
    pub fn spawn<P, H, S, L>(handler: H, bus: Bus<S, L>, config: &BridgeConfig) -> Self
    where
        P: Serialize + DeserializeOwned + Send + 'static,
        H: CommandHandler<P> + 'static,
        S: Sender + 'static,
        L: Listener + 'static,
    {
        let commands_topic = config.commands_topic.clone();
        let replies_topic = config.replies_topic.clone();
        let poll_ms = poll_millis(config.poll_interval);
        let (stop_tx, stop_rx) = channel();

        let handle = thread::spawn(move || {
            info!(topic = %commands_topic, "worker started");
            let mut stats = WorkerStats::default();

            loop {
                match stop_rx.try_recv() {
                    Ok(()) | Err(TryRecvError::Disconnected) => break,
                    Err(TryRecvError::Empty) => {}
                }

                stats.polls += 1;

                match bus.listen(&commands_topic, poll_ms) {
                    Ok(records) => {
                        for record in records {
                            match answer::<P, _, _, _>(&handler, &bus, &replies_topic, &record) {
                                Ok(()) => stats.handled += 1,
                                Err(e) => {
                                    stats.failed += 1;
                                    warn!(offset = record.offset, error = %e, "command not answered");
                                }
                            }
                        }
                    }
                    Err(e) => {
                        warn!(topic = %commands_topic, error = %e, "command poll failed");
                        thread::sleep(Duration::from_millis(poll_ms));
                    }
                }
            }

            info!(handled = stats.handled, failed = stats.failed, "worker stopped");
            stats
        });

        Self {
            stop_tx,
            handle: Some(handle),
        }
    }

    /// Signal the worker to stop and wait for it to finish.
    /// Returns the worker statistics.
    pub fn stop(mut self) -> WorkerStats {
        let _ = self.stop_tx.send(());
        match self.handle.take() {
            Some(handle) => handle.join().unwrap_or_default(),
            None => WorkerStats::default(),
        }
    }

    /// Signal the worker to stop without waiting.
    pub fn signal_stop(&self) {
        let _ = self.stop_tx.send(());
    }
}

impl Drop for WorkerThread {
    fn drop(&mut self) {
        let _ = self.stop_tx.send(());
    }
}

fn answer<P, H, S, L>(
    handler: &H,
    bus: &Bus<S, L>,
    replies_topic: &str,
    record: &Record,
) -> Result<(), BusError>
where
    P: Serialize + DeserializeOwned,
    H: CommandHandler<P>,
    S: Sender,
    L: Listener,
{
    let command: Command<P> = record
        .message
        .decode()
        .map_err(|e| BusError::Rejected(format!("undecodable command: {}", e)))?;
    let operation = command.operation;
    let reply = handler.handle(command);

    let key = reply
        .resource_id
        .map(|id| id.to_string())
        .unwrap_or_default();
    let mut message = Message::encode(key, &reply)
        .map_err(|e| BusError::Rejected(format!("unencodable reply: {}", e)))?;
    if let Some(correlation_id) = record.message.correlation_id() {
        message = message.with_correlation_id(correlation_id);
    }

    bus.send(replies_topic, message)?;
    debug!(
        operation = %operation,
        id = ?reply.resource_id,
        found = !reply.is_not_found(),
        "reply sent"
    );
    Ok(())
}
