//! HTTP transport integration tests.
//!
//! Starts an axum server over a bridge and an in-process worker and
//! exercises it with reqwest.

#![cfg(feature = "http")]

use std::sync::Arc;
use std::time::Duration;

use serde_json::{json, Value};

use comment_bridge::bridge::{Bridge, BridgeConfig, ResourceId};
use comment_bridge::bus::{Bus, InMemoryQueue};
use comment_bridge::cache::InMemoryCache;
use comment_bridge::comments::{CommentPayload, CommentService, InMemoryIssues};
use comment_bridge::http;
use comment_bridge::worker::{InMemoryComments, WorkerThread};

const COMMENTS: &str = "/api/v1.0/comments";

struct Harness {
    base: String,
    queue: InMemoryQueue,
    _worker: Option<WorkerThread>,
}

fn config() -> BridgeConfig {
    BridgeConfig::default()
        .with_reply_timeout(Duration::from_millis(500))
        .with_poll_interval(Duration::from_millis(10))
}

/// Bind to port 0 and return the actual address.
async fn start_server(issues: &[i64], with_worker: bool) -> Harness {
    let queue = InMemoryQueue::new();
    let worker = with_worker.then(|| {
        let comments = InMemoryComments::<CommentPayload>::new();
        comments.insert(
            5,
            CommentPayload {
                issue_id: 9,
                content: "hi".into(),
                country: Some("en".into()),
            },
        );
        WorkerThread::spawn(comments, Bus::from_queue(queue.clone()), &config())
    });

    let bridge = Bridge::new(
        queue.clone(),
        queue.clone(),
        InMemoryCache::<ResourceId, CommentPayload>::new(),
        config(),
    );
    let service = Arc::new(CommentService::new(
        bridge,
        InMemoryIssues::with_ids(issues.iter().copied()),
    ));

    let app = http::router(service);
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    Harness {
        base: format!("http://{addr}"),
        queue,
        _worker: worker,
    }
}

#[tokio::test]
async fn health_check() {
    let harness = start_server(&[], false).await;
    let resp = reqwest::get(format!("{}/health", harness.base)).await.unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["ok"], true);
}

#[tokio::test]
async fn get_is_served_from_cache_the_second_time() {
    let harness = start_server(&[], true).await;
    let client = reqwest::Client::new();

    for _ in 0..2 {
        let resp = client
            .get(format!("{}{COMMENTS}/5", harness.base))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), 200);
        let body: Value = resp.json().await.unwrap();
        assert_eq!(body["id"], 5);
        assert_eq!(body["content"], "hi");
    }

    assert_eq!(harness.queue.sent_count("InTopic"), 1);
}

#[tokio::test]
async fn create_requires_existing_issue() {
    let harness = start_server(&[], true).await;
    let client = reqwest::Client::new();

    let resp = client
        .post(format!("{}{COMMENTS}", harness.base))
        .json(&json!({ "issueId": 9, "content": "hello" }))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), 404);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["errorCode"], 40400);
    assert_eq!(body["errorMessage"], "Issue not found!");
    assert_eq!(harness.queue.sent_count("InTopic"), 0);
}

#[tokio::test]
async fn create_uses_accept_language() {
    let harness = start_server(&[9], true).await;
    let client = reqwest::Client::new();

    let resp = client
        .post(format!("{}{COMMENTS}", harness.base))
        .header("Accept-Language", "fr")
        .json(&json!({ "issueId": 9, "content": "bonjour" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 201);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["country"], "fr");
    assert_eq!(body["issueId"], 9);
    assert_eq!(body["id"], 6);

    let resp = client
        .post(format!("{}{COMMENTS}", harness.base))
        .json(&json!({ "issueId": 9, "content": "hello" }))
        .send()
        .await
        .unwrap();
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["country"], "en");
}

#[tokio::test]
async fn update_then_delete() {
    let harness = start_server(&[9], true).await;
    let client = reqwest::Client::new();

    let resp = client
        .put(format!("{}{COMMENTS}", harness.base))
        .json(&json!({ "id": 5, "issueId": 9, "content": "bye" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["content"], "bye");

    let resp = client
        .delete(format!("{}{COMMENTS}/5", harness.base))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 204);
    assert!(resp.bytes().await.unwrap().is_empty());

    let resp = client
        .get(format!("{}{COMMENTS}/5", harness.base))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 404);
}

#[tokio::test]
async fn silence_maps_to_gateway_timeout() {
    let harness = start_server(&[], false).await;

    let resp = reqwest::get(format!("{}{COMMENTS}/7", harness.base))
        .await
        .unwrap();

    assert_eq!(resp.status(), 504);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["errorCode"], 50400);
}

#[tokio::test]
async fn invalid_body_is_a_bad_request() {
    let harness = start_server(&[9], true).await;
    let client = reqwest::Client::new();

    let resp = client
        .post(format!("{}{COMMENTS}", harness.base))
        .json(&json!({ "content": "no issue" }))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), 400);
    assert_eq!(harness.queue.sent_count("InTopic"), 0);
}

#[tokio::test]
async fn serve_returns_once_shutdown_resolves() {
    let queue = InMemoryQueue::new();
    let bridge = Bridge::new(
        queue.clone(),
        queue,
        InMemoryCache::<ResourceId, CommentPayload>::new(),
        config(),
    );
    let service = Arc::new(CommentService::new(bridge, InMemoryIssues::new()));

    let (stop_tx, stop_rx) = tokio::sync::oneshot::channel::<()>();
    let server = tokio::spawn(http::serve(service, "127.0.0.1:0", async move {
        let _ = stop_rx.await;
    }));

    stop_tx.send(()).unwrap();
    let result = tokio::time::timeout(Duration::from_secs(5), server)
        .await
        .expect("server did not stop")
        .unwrap();
    assert!(result.is_ok());
}
