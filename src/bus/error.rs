//! Error type for bus operations.

use thiserror::Error;

/// Error type for send and listen operations.
#[derive(Debug, Error)]
pub enum BusError {
    /// Connection to the broker failed
    #[error("connection failed: {0}")]
    ConnectionFailed(String),
    /// The broker rejected the message
    #[error("message rejected: {0}")]
    Rejected(String),
    /// A lock guarding in-process queue state was poisoned
    #[error("bus state poisoned: {0}")]
    Poisoned(String),
    /// Other error
    #[error("bus error: {0}")]
    Other(#[from] Box<dyn std::error::Error + Send + Sync>),
}
