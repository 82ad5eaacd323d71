//! Command handlers run by the worker.

use std::collections::BTreeMap;
use std::sync::RwLock;

use tracing::warn;

use crate::bridge::{Command, Operation, Reply, ResourceId};

/// Turns one command into its reply.
pub trait CommandHandler<P>: Send + Sync {
    fn handle(&self, command: Command<P>) -> Reply<P>;
}

impl<P, F> CommandHandler<P> for F
where
    F: Fn(Command<P>) -> Reply<P> + Send + Sync,
{
    fn handle(&self, command: Command<P>) -> Reply<P> {
        self(command)
    }
}

struct Table<P> {
    rows: BTreeMap<ResourceId, P>,
    next_id: ResourceId,
}

/// Handler keeping resources in memory, keyed by id.
///
/// - GET: the stored value, or not-found
/// - POST: stores under the next id (starting at 1)
/// - PUT: replaces an existing id, or not-found
/// - DELETE: removes an existing id (the reply carries the removed value),
///   or not-found
pub struct InMemoryComments<P> {
    table: RwLock<Table<P>>,
}

impl<P> Default for InMemoryComments<P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P> InMemoryComments<P> {
    pub fn new() -> Self {
        Self {
            table: RwLock::new(Table {
                rows: BTreeMap::new(),
                next_id: 1,
            }),
        }
    }

    /// Number of stored resources.
    pub fn len(&self) -> usize {
        self.table.read().map(|t| t.rows.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<P: Clone> InMemoryComments<P> {
    /// Seed a resource under a fixed id.
    pub fn insert(&self, id: ResourceId, payload: P) {
        if let Ok(mut table) = self.table.write() {
            table.rows.insert(id, payload);
            if id >= table.next_id {
                table.next_id = id + 1;
            }
        }
    }

    pub fn get(&self, id: ResourceId) -> Option<P> {
        self.table
            .read()
            .ok()
            .and_then(|t| t.rows.get(&id).cloned())
    }
}

impl<P: Clone + Send + Sync> CommandHandler<P> for InMemoryComments<P> {
    fn handle(&self, command: Command<P>) -> Reply<P> {
        let Ok(mut table) = self.table.write() else {
            warn!("comment table poisoned");
            return Reply::not_found();
        };

        match (command.operation, command.resource_id, command.payload) {
            (Operation::Get, Some(id), _) => match table.rows.get(&id) {
                Some(payload) => Reply::found(id, payload.clone()),
                None => Reply::not_found(),
            },
            (Operation::Post, _, Some(payload)) => {
                let id = table.next_id;
                table.next_id += 1;
                table.rows.insert(id, payload.clone());
                Reply::found(id, payload)
            }
            (Operation::Put, Some(id), Some(payload)) => match table.rows.get_mut(&id) {
                Some(row) => {
                    *row = payload.clone();
                    Reply::found(id, payload)
                }
                None => Reply::not_found(),
            },
            (Operation::Delete, Some(id), _) => match table.rows.remove(&id) {
                Some(payload) => Reply::found(id, payload),
                None => Reply::not_found(),
            },
            _ => Reply::not_found(),
        }
    }
}
