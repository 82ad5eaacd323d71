//! Error type for comment operations.

use thiserror::Error;

use crate::bridge::{BridgeError, NOT_FOUND_CODE};

/// Error type for `CommentService` operations.
#[derive(Debug, Error)]
pub enum CommentError {
    /// The request body failed validation.
    #[error("{0}")]
    BadRequest(String),
    /// The parent issue does not exist.
    #[error("Issue not found!")]
    IssueNotFound(i64),
    /// The bridge exchange failed (not found, timeout, channel, ...).
    #[error(transparent)]
    Bridge(#[from] BridgeError),
    /// The blocking task running the exchange failed.
    #[error("internal error: {0}")]
    Internal(String),
}

impl CommentError {
    /// Map this error to an HTTP-style status code.
    pub fn status_code(&self) -> u16 {
        match self {
            CommentError::BadRequest(_) => 400,
            CommentError::IssueNotFound(_) => 404,
            CommentError::Bridge(e) => e.status_code(),
            CommentError::Internal(_) => 500,
        }
    }

    /// Numeric error code reported to clients.
    pub fn code(&self) -> i64 {
        match self {
            CommentError::BadRequest(_) => 40000,
            CommentError::IssueNotFound(_) => NOT_FOUND_CODE,
            CommentError::Bridge(e) => e.code(),
            CommentError::Internal(_) => 50000,
        }
    }
}
