//! Comments - the comment resource served through the bridge.
//!
//! `CommentService` is what the HTTP surface calls: it defaults the locale,
//! checks that the parent issue exists, builds the command and maps the
//! bridge outcome to a `CommentResponse` or a `CommentError`.
//!
//! ## Example
//!
//! ```ignore
//! let service = CommentService::new(bridge, InMemoryIssues::with_ids([9]));
//!
//! let created = service.create(
//!     CommentRequest::new(9, "first!"),
//!     Some("de"),
//! )?;
//! let loaded = service.get(created.id)?;
//! ```

mod dto;
mod error;
mod issues;
mod service;

pub use dto::{CommentPayload, CommentRequest, CommentResponse};
pub use error::CommentError;
pub use issues::{InMemoryIssues, IssueDirectory};
pub use service::{resolve_locale, CommentService, DEFAULT_LOCALE};
