//! End-to-end scenarios: bridge + worker over one in-memory queue.

use comment_bridge::bridge::Command;
use comment_bridge::bus::InMemoryQueue;
use comment_bridge::cache::CacheStore;

use crate::support::{bridge, config, text, worker, COMMANDS};

#[test]
fn get_miss_then_hit_then_put_then_get() {
    let queue = InMemoryQueue::new();
    let worker = worker(&queue, &[(5, "hi")]);
    let bridge = bridge(&queue, config());

    // 1. Empty cache: one command, reply cached.
    let first = bridge.execute(Command::get(5)).unwrap();
    assert_eq!(first.payload, text("hi"));
    assert!(!first.cached);
    assert_eq!(queue.sent_count(COMMANDS), 1);
    assert_eq!(bridge.cache().get(&5).unwrap(), Some(text("hi")));

    // 2. Same id again: served from the cache, nothing sent.
    let second = bridge.execute(Command::get(5)).unwrap();
    assert_eq!(second.payload, text("hi"));
    assert!(second.cached);
    assert_eq!(queue.sent_count(COMMANDS), 1);

    // 4. PUT: entry evicted, command sent, reply returned, cache stays empty.
    let updated = bridge
        .execute(Command::put(5, text("bye")).with_locale("en"))
        .unwrap();
    assert_eq!(updated.payload, text("bye"));
    assert_eq!(updated.resource_id, Some(5));
    assert_eq!(queue.sent_count(COMMANDS), 2);
    assert_eq!(bridge.cache().get(&5).unwrap(), None);

    // The next GET goes back to the worker and repopulates.
    let reread = bridge.execute(Command::get(5)).unwrap();
    assert_eq!(reread.payload, text("bye"));
    assert!(!reread.cached);
    assert_eq!(queue.sent_count(COMMANDS), 3);
    assert_eq!(bridge.cache().get(&5).unwrap(), Some(text("bye")));

    let stats = worker.stop();
    assert_eq!(stats.handled, 3);
}

#[test]
fn published_command_carries_operation_id_and_locale() {
    let queue = InMemoryQueue::with_history();
    let worker = worker(&queue, &[(5, "hi")]);
    let bridge = bridge(&queue, config());

    bridge
        .execute(Command::put(5, text("bye")).with_locale("de"))
        .unwrap();
    worker.stop();

    let sent = queue.sent(COMMANDS);
    assert_eq!(sent.len(), 1);
    assert!(sent[0].correlation_id().is_some());
    let command: Command<crate::support::Text> = sent[0].decode().unwrap();
    assert_eq!(command, Command::put(5, text("bye")).with_locale("de"));
}

#[test]
fn post_returns_assigned_id_without_caching() {
    let queue = InMemoryQueue::new();
    let worker = worker(&queue, &[(5, "hi")]);
    let bridge = bridge(&queue, config());

    let created = bridge.execute(Command::post(text("new"))).unwrap();
    worker.stop();

    assert_eq!(created.resource_id, Some(6));
    assert!(bridge.cache().is_empty());
}

#[test]
fn get_of_unknown_id_is_not_found() {
    let queue = InMemoryQueue::new();
    let worker = worker(&queue, &[]);
    let bridge = bridge(&queue, config());

    let err = bridge.execute(Command::get(42)).unwrap_err();
    worker.stop();

    assert!(err.is_not_found());
    assert_eq!(err.code(), 40400);
    assert!(bridge.cache().is_empty());
}

#[test]
fn get_without_reply_times_out() {
    // 5. Nobody answers.
    let queue = InMemoryQueue::new();
    let bridge = bridge(&queue, config());

    let err = bridge.execute(Command::get(7)).unwrap_err();

    assert!(err.is_timeout());
    assert!(!err.is_not_found());
    assert_eq!(err.status_code(), 504);
    assert_eq!(queue.sent_count(COMMANDS), 1);
}

#[test]
fn next_reply_mode_round_trips_in_order() {
    let queue = InMemoryQueue::new();
    let worker = worker(&queue, &[(1, "one"), (2, "two")]);
    let bridge = bridge(&queue, crate::support::next_reply_config());

    assert_eq!(bridge.execute(Command::get(1)).unwrap().payload, text("one"));
    assert_eq!(bridge.execute(Command::get(2)).unwrap().payload, text("two"));
    worker.stop();
}
