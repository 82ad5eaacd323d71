//! Comment service binary: HTTP front end, bridge and an in-process worker
//! sharing one in-memory queue.

use std::env;
use std::error::Error;
use std::sync::Arc;

use comment_bridge::bridge::{Bridge, BridgeConfig, ResourceId};
use comment_bridge::bus::{Bus, InMemoryQueue};
use comment_bridge::cache::InMemoryCache;
use comment_bridge::comments::{CommentPayload, CommentService, InMemoryIssues};
use comment_bridge::http;
use comment_bridge::worker::{InMemoryComments, WorkerThread};
use tracing::info;
use tracing_subscriber::EnvFilter;

const BIND_ADDR_VAR: &str = "COMMENTS_BIND_ADDR";
const ISSUES_VAR: &str = "COMMENTS_ISSUES";
const DEFAULT_BIND_ADDR: &str = "0.0.0.0:24110";

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error + Send + Sync>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = BridgeConfig::from_env()?;
    let addr = env::var(BIND_ADDR_VAR).unwrap_or_else(|_| DEFAULT_BIND_ADDR.to_string());
    let issues = match env::var(ISSUES_VAR) {
        Ok(list) => InMemoryIssues::parse_list(&list)?,
        Err(_) => InMemoryIssues::new(),
    };

    info!(
        commands = %config.commands_topic,
        replies = %config.replies_topic,
        timeout_ms = u64::try_from(config.reply_timeout.as_millis()).unwrap_or(u64::MAX),
        matching = %config.matching,
        "starting comment service"
    );

    let queue = InMemoryQueue::new();
    let worker = WorkerThread::spawn(
        InMemoryComments::<CommentPayload>::new(),
        Bus::from_queue(queue.clone()),
        &config,
    );
    let bridge = Bridge::from_bus(
        Bus::from_queue(queue),
        InMemoryCache::<ResourceId, CommentPayload>::new(),
        config,
    );
    let service = Arc::new(CommentService::new(bridge, issues));

    http::serve(service, &addr, shutdown_signal()).await?;

    let stats = worker.stop();
    info!(handled = stats.handled, failed = stats.failed, "shut down");
    Ok(())
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_err() {
        // No signal handler available; run until killed.
        std::future::pending::<()>().await;
    }
}
