//! CommentService - maps comment operations onto bridge commands.

use tracing::debug;

use crate::bridge::{Bridge, BridgeError, Command, Resolved, ResourceId};
use crate::bus::Sender;
use crate::cache::CacheStore;

use super::dto::{CommentPayload, CommentRequest, CommentResponse};
use super::error::CommentError;
use super::issues::IssueDirectory;

/// Locale used when the client sends no `Accept-Language`.
pub const DEFAULT_LOCALE: &str = "en";

const MIN_CONTENT_LEN: usize = 2;
const MAX_CONTENT_LEN: usize = 2048;

/// The locale carried by a command: the header value, or `"en"` when it is
/// missing or blank.
pub fn resolve_locale(header: Option<&str>) -> String {
    header
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .unwrap_or(DEFAULT_LOCALE)
        .to_string()
}

/// Comment operations backed by a `Bridge`.
pub struct CommentService<S, C, I> {
    bridge: Bridge<CommentPayload, S, C>,
    issues: I,
}

impl<S, C, I> CommentService<S, C, I>
where
    S: Sender,
    C: CacheStore<ResourceId, CommentPayload>,
    I: IssueDirectory,
{
    pub fn new(bridge: Bridge<CommentPayload, S, C>, issues: I) -> Self {
        Self { bridge, issues }
    }

    pub fn bridge(&self) -> &Bridge<CommentPayload, S, C> {
        &self.bridge
    }

    pub fn issues(&self) -> &I {
        &self.issues
    }

    /// Read one comment (cache first).
    pub fn get(&self, id: ResourceId) -> Result<CommentResponse, CommentError> {
        let resolved = self.bridge.execute(Command::get(id))?;
        to_response(resolved, Some(id))
    }

    /// Create a comment under an existing issue.
    ///
    /// A missing issue is reported before anything is sent.
    pub fn create(
        &self,
        request: CommentRequest,
        locale: Option<&str>,
    ) -> Result<CommentResponse, CommentError> {
        let locale = resolve_locale(locale);
        let payload = validate(request.issue_id, request.content, &locale)?;

        if !self.issues.exists(payload.issue_id) {
            debug!(issue_id = payload.issue_id, "refusing comment on missing issue");
            return Err(CommentError::IssueNotFound(payload.issue_id));
        }

        let resolved = self
            .bridge
            .execute(Command::post(payload).with_locale(locale))?;
        to_response(resolved, None)
    }

    /// Replace an existing comment. The request must carry the id.
    pub fn update(
        &self,
        request: CommentRequest,
        locale: Option<&str>,
    ) -> Result<CommentResponse, CommentError> {
        let id = request
            .id
            .ok_or_else(|| CommentError::BadRequest("id is required".into()))?;
        let locale = resolve_locale(locale);
        let payload = validate(request.issue_id, request.content, &locale)?;

        let resolved = self
            .bridge
            .execute(Command::put(id, payload).with_locale(locale))?;
        to_response(resolved, Some(id))
    }

    /// Remove a comment.
    pub fn delete(&self, id: ResourceId) -> Result<(), CommentError> {
        self.bridge.execute(Command::delete(id))?;
        Ok(())
    }
}

fn validate(
    issue_id: Option<i64>,
    content: Option<String>,
    locale: &str,
) -> Result<CommentPayload, CommentError> {
    let issue_id = issue_id.ok_or_else(|| CommentError::BadRequest("issueId is required".into()))?;
    let content = content.ok_or_else(|| CommentError::BadRequest("content is required".into()))?;

    let len = content.chars().count();
    if !(MIN_CONTENT_LEN..=MAX_CONTENT_LEN).contains(&len) {
        return Err(CommentError::BadRequest(format!(
            "content must be between {} and {} characters",
            MIN_CONTENT_LEN, MAX_CONTENT_LEN
        )));
    }

    Ok(CommentPayload {
        issue_id,
        content,
        country: Some(locale.to_string()),
    })
}

fn to_response(
    resolved: Resolved<CommentPayload>,
    requested: Option<ResourceId>,
) -> Result<CommentResponse, CommentError> {
    let id = resolved
        .resource_id
        .or(requested)
        .ok_or_else(|| BridgeError::Codec("reply carried no resource id".into()))?;
    Ok(CommentResponse::new(id, resolved.payload))
}
