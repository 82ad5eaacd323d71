//! Comment request/response bodies and the payload carried on the bus.

use serde::{Deserialize, Serialize};

use crate::bridge::ResourceId;

/// Inbound comment body (POST and PUT).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentRequest {
    /// Required on PUT, ignored on POST.
    #[serde(default)]
    pub id: Option<ResourceId>,
    #[serde(default)]
    pub issue_id: Option<i64>,
    #[serde(default)]
    pub content: Option<String>,
    /// Accepted for compatibility; the stored value always comes from
    /// `Accept-Language`.
    #[serde(default)]
    pub country: Option<String>,
}

impl CommentRequest {
    pub fn new(issue_id: i64, content: impl Into<String>) -> Self {
        Self {
            id: None,
            issue_id: Some(issue_id),
            content: Some(content.into()),
            country: None,
        }
    }

    pub fn with_id(mut self, id: ResourceId) -> Self {
        self.id = Some(id);
        self
    }
}

/// Comment fields as carried in commands, replies and the cache.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommentPayload {
    pub issue_id: i64,
    pub content: String,
    /// Locale the comment was written in (from `Accept-Language`).
    pub country: Option<String>,
}

/// Outbound comment body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentResponse {
    pub id: ResourceId,
    pub issue_id: i64,
    pub content: String,
    pub country: Option<String>,
}

impl CommentResponse {
    pub fn new(id: ResourceId, payload: CommentPayload) -> Self {
        Self {
            id,
            issue_id: payload.issue_id,
            content: payload.content,
            country: payload.country,
        }
    }
}
