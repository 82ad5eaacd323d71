//! Error type for bridge operations.

use std::time::Duration;

use thiserror::Error;

use crate::bus::BusError;
use crate::cache::CacheError;

/// Code reported when the target (or its parent) does not exist.
pub const NOT_FOUND_CODE: i64 = 40400;

/// Error type for `Bridge::execute`.
///
/// `NotFound` and `Timeout` are expected outcomes of an exchange and are kept
/// apart so callers can map them to different responses.
#[derive(Debug, Error)]
pub enum BridgeError {
    /// The reply carried no payload, or a precondition lookup failed.
    #[error("{message}")]
    NotFound { code: i64, message: String },
    /// No reply arrived within the configured bound.
    #[error("no reply within {}ms", .waited.as_millis())]
    Timeout { waited: Duration },
    /// Sending to or listening on the bus failed.
    #[error("channel failure: {0}")]
    Channel(#[from] BusError),
    /// A command could not be encoded or a reply could not be decoded.
    #[error("codec error: {0}")]
    Codec(String),
    /// The cache store failed.
    #[error(transparent)]
    Cache(#[from] CacheError),
    /// The reply router stopped while a caller was waiting.
    #[error("reply router has shut down")]
    Shutdown,
}

impl From<bitcode::Error> for BridgeError {
    fn from(err: bitcode::Error) -> Self {
        BridgeError::Codec(err.to_string())
    }
}

impl BridgeError {
    /// A `NotFound` with the standard code.
    pub fn not_found(message: impl Into<String>) -> Self {
        BridgeError::NotFound {
            code: NOT_FOUND_CODE,
            message: message.into(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, BridgeError::NotFound { .. })
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, BridgeError::Timeout { .. })
    }

    /// Map this error to an HTTP-style status code.
    pub fn status_code(&self) -> u16 {
        match self {
            BridgeError::NotFound { .. } => 404,
            BridgeError::Timeout { .. } => 504,
            BridgeError::Channel(_) => 502,
            BridgeError::Codec(_) => 500,
            BridgeError::Cache(_) => 500,
            BridgeError::Shutdown => 503,
        }
    }

    /// Numeric error code reported to clients (status code followed by two digits).
    pub fn code(&self) -> i64 {
        match self {
            BridgeError::NotFound { code, .. } => *code,
            other => i64::from(other.status_code()) * 100,
        }
    }
}
