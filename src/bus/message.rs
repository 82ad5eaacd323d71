//! Transport units for the command/reply bus.

use serde::{de::DeserializeOwned, Serialize};

/// Header carrying the token that links a command to its reply.
pub const CORRELATION_ID_HEADER: &str = "correlation-id";

/// A message sent to (or received from) a bus topic.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Message {
    /// Message key (partitioning hint; not used for correlation)
    pub key: String,
    /// Serialized payload (bitcode for commands and replies)
    pub payload: Vec<u8>,
    /// Transport headers (correlation ID, source, ...)
    pub headers: Vec<(String, String)>,
}

impl Message {
    /// Create a new message with the given key and raw payload.
    pub fn new(key: impl Into<String>, payload: Vec<u8>) -> Self {
        Self {
            key: key.into(),
            payload,
            headers: Vec::new(),
        }
    }

    /// Create a message with a bitcode-serialized payload.
    pub fn encode<T: Serialize>(key: impl Into<String>, payload: &T) -> Result<Self, bitcode::Error> {
        let bytes = bitcode::serialize(payload)?;
        Ok(Self::new(key, bytes))
    }

    /// Decode the payload from bitcode binary format.
    pub fn decode<T: DeserializeOwned>(&self) -> Result<T, bitcode::Error> {
        bitcode::deserialize(&self.payload)
    }

    /// Add a header to the message.
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Look up the first header with the given name.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    /// Attach a correlation ID header.
    pub fn with_correlation_id(self, id: impl Into<String>) -> Self {
        self.with_header(CORRELATION_ID_HEADER, id)
    }

    /// The correlation ID header, if present.
    pub fn correlation_id(&self) -> Option<&str> {
        self.header(CORRELATION_ID_HEADER)
    }
}

/// A message as delivered by a `Listener`, tagged with where it came from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Record {
    /// Topic the message was read from
    pub topic: String,
    /// Partition within the topic
    pub partition: u32,
    /// Offset within the partition
    pub offset: u64,
    /// The message itself
    pub message: Message,
}
