//! HTTP transport for comments: maps HTTP verbs to bridge commands.
//!
//! Requires the `http` feature. Uses axum for routing.
//!
//! ## Routes
//!
//! - `GET /api/v1.0/comments/:id`: read one comment (cache first).
//! - `POST /api/v1.0/comments`: create; `Accept-Language` becomes the locale.
//! - `PUT /api/v1.0/comments`: update; the body carries the id.
//! - `DELETE /api/v1.0/comments/:id`: remove; 204 without body.
//! - `GET /health`: `{ "ok": true }`.
//!
//! The bridge blocks while it waits for a reply, so every exchange runs on
//! tokio's blocking pool.

use std::future::Future;
use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::json;
use tracing::{error, info};

use crate::bridge::ResourceId;
use crate::bus::Sender;
use crate::cache::CacheStore;
use crate::comments::{
    CommentError, CommentPayload, CommentRequest, CommentResponse, CommentService, IssueDirectory,
};

/// Base path of the comment routes.
pub const COMMENTS_PATH: &str = "/api/v1.0/comments";

type SharedService<S, C, I> = Arc<CommentService<S, C, I>>;

/// Error returned by the HTTP handlers.
///
/// Body: `{ "errorMessage": "...", "errorCode": 40400 }`.
#[derive(Debug)]
pub struct ApiError(pub CommentError);

impl From<CommentError> for ApiError {
    fn from(err: CommentError) -> Self {
        ApiError(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.0.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        if status.is_server_error() {
            error!(status = status.as_u16(), error = %self.0, "comment request failed");
        }
        let body = json!({ "errorMessage": self.0.to_string(), "errorCode": self.0.code() });
        (status, Json(body)).into_response()
    }
}

/// Build an axum `Router` serving comments through the given service.
pub fn router<S, C, I>(service: SharedService<S, C, I>) -> Router
where
    S: Sender + 'static,
    C: CacheStore<ResourceId, CommentPayload> + 'static,
    I: IssueDirectory + 'static,
{
    Router::new()
        .route("/health", get(health_handler))
        .route(
            COMMENTS_PATH,
            post(create_handler::<S, C, I>).put(update_handler::<S, C, I>),
        )
        .route(
            &format!("{}/:id", COMMENTS_PATH),
            get(get_handler::<S, C, I>).delete(delete_handler::<S, C, I>),
        )
        .with_state(service)
}

/// Serve comments over HTTP at the given address (e.g. `"0.0.0.0:24110"`)
/// until `shutdown` resolves.
pub async fn serve<S, C, I, F>(
    service: SharedService<S, C, I>,
    addr: &str,
    shutdown: F,
) -> Result<(), std::io::Error>
where
    S: Sender + 'static,
    C: CacheStore<ResourceId, CommentPayload> + 'static,
    I: IssueDirectory + 'static,
    F: Future<Output = ()> + Send + 'static,
{
    let app = router(service);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(addr = %listener.local_addr()?, "comment service listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await
}

/// Run a bridge exchange on the blocking pool.
async fn blocking<T, F>(f: F) -> Result<T, ApiError>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T, CommentError> + Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| CommentError::Internal(e.to_string()))?
        .map_err(ApiError::from)
}

fn accept_language(headers: &HeaderMap) -> Option<String> {
    headers
        .get(header::ACCEPT_LANGUAGE)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}

/// `GET /health`: returns `{ "ok": true }`.
async fn health_handler() -> impl IntoResponse {
    Json(json!({ "ok": true }))
}

/// `GET /api/v1.0/comments/:id`
async fn get_handler<S, C, I>(
    State(service): State<SharedService<S, C, I>>,
    Path(id): Path<ResourceId>,
) -> Result<Json<CommentResponse>, ApiError>
where
    S: Sender + 'static,
    C: CacheStore<ResourceId, CommentPayload> + 'static,
    I: IssueDirectory + 'static,
{
    let comment = blocking(move || service.get(id)).await?;
    Ok(Json(comment))
}

/// `POST /api/v1.0/comments`
async fn create_handler<S, C, I>(
    State(service): State<SharedService<S, C, I>>,
    headers: HeaderMap,
    Json(request): Json<CommentRequest>,
) -> Result<(StatusCode, Json<CommentResponse>), ApiError>
where
    S: Sender + 'static,
    C: CacheStore<ResourceId, CommentPayload> + 'static,
    I: IssueDirectory + 'static,
{
    let locale = accept_language(&headers);
    let comment = blocking(move || service.create(request, locale.as_deref())).await?;
    Ok((StatusCode::CREATED, Json(comment)))
}

/// `PUT /api/v1.0/comments`
async fn update_handler<S, C, I>(
    State(service): State<SharedService<S, C, I>>,
    headers: HeaderMap,
    Json(request): Json<CommentRequest>,
) -> Result<Json<CommentResponse>, ApiError>
where
    S: Sender + 'static,
    C: CacheStore<ResourceId, CommentPayload> + 'static,
    I: IssueDirectory + 'static,
{
    let locale = accept_language(&headers);
    let comment = blocking(move || service.update(request, locale.as_deref())).await?;
    Ok(Json(comment))
}

/// `DELETE /api/v1.0/comments/:id`
async fn delete_handler<S, C, I>(
    State(service): State<SharedService<S, C, I>>,
    Path(id): Path<ResourceId>,
) -> Result<StatusCode, ApiError>
where
    S: Sender + 'static,
    C: CacheStore<ResourceId, CommentPayload> + 'static,
    I: IssueDirectory + 'static,
{
    blocking(move || service.delete(id)).await?;
    Ok(StatusCode::NO_CONTENT)
}
