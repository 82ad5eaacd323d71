//! Commands sent to the worker and the replies it answers with.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Identifier of a resource carried by commands and replies.
pub type ResourceId = i64;

/// The CRUD operation a command asks the worker to perform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Operation {
    Get,
    Post,
    Put,
    Delete,
}

impl Operation {
    /// Wire name of the operation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::Get => "GET",
            Operation::Post => "POST",
            Operation::Put => "PUT",
            Operation::Delete => "DELETE",
        }
    }

    /// Whether this operation changes the resource (and must evict it).
    pub fn is_write(&self) -> bool {
        matches!(self, Operation::Put | Operation::Delete)
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Operation {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "GET" => Ok(Operation::Get),
            "POST" => Ok(Operation::Post),
            "PUT" => Ok(Operation::Put),
            "DELETE" => Ok(Operation::Delete),
            other => Err(format!("unknown operation: {}", other)),
        }
    }
}

/// A requested CRUD operation, published on the commands topic.
///
/// Immutable once published. The worker infers everything it needs from
/// these fields; correlation travels in the message headers, not here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Command<P> {
    pub operation: Operation,
    pub resource_id: Option<ResourceId>,
    pub payload: Option<P>,
    pub locale: Option<String>,
}

impl<P> Command<P> {
    /// Read a single resource.
    pub fn get(id: ResourceId) -> Self {
        Self {
            operation: Operation::Get,
            resource_id: Some(id),
            payload: None,
            locale: None,
        }
    }

    /// Create a resource; the worker assigns the id.
    pub fn post(payload: P) -> Self {
        Self {
            operation: Operation::Post,
            resource_id: None,
            payload: Some(payload),
            locale: None,
        }
    }

    /// Replace an existing resource.
    pub fn put(id: ResourceId, payload: P) -> Self {
        Self {
            operation: Operation::Put,
            resource_id: Some(id),
            payload: Some(payload),
            locale: None,
        }
    }

    /// Remove a resource.
    pub fn delete(id: ResourceId) -> Self {
        Self {
            operation: Operation::Delete,
            resource_id: Some(id),
            payload: None,
            locale: None,
        }
    }

    /// Set the locale the request was made in.
    pub fn with_locale(mut self, locale: impl Into<String>) -> Self {
        self.locale = Some(locale.into());
        self
    }
}

/// The worker's answer to a command, read from the replies topic.
///
/// An absent payload means the target resource was not found.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reply<P> {
    pub resource_id: Option<ResourceId>,
    pub payload: Option<P>,
}

impl<P> Reply<P> {
    /// A reply carrying the resource.
    pub fn found(id: ResourceId, payload: P) -> Self {
        Self {
            resource_id: Some(id),
            payload: Some(payload),
        }
    }

    /// A reply signalling the resource does not exist.
    pub fn not_found() -> Self {
        Self {
            resource_id: None,
            payload: None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.payload.is_none()
    }
}

/// A successful `Bridge::execute` result.
#[derive(Debug, Clone, PartialEq)]
pub struct Resolved<P> {
    /// Resource id reported by the reply (or the requested id on a cache hit)
    pub resource_id: Option<ResourceId>,
    /// The resource payload
    pub payload: P,
    /// True when served from the cache without touching the bus
    pub cached: bool,
}
