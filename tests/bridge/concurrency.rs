//! Many callers sharing one bridge.

use std::sync::Arc;
use std::thread;

use comment_bridge::bridge::Command;
use comment_bridge::bus::InMemoryQueue;
use comment_bridge::cache::CacheStore;

use crate::support::{bridge, config, reversing_worker, text, worker, COMMANDS};

#[test]
fn correlated_callers_get_their_own_replies() {
    let queue = InMemoryQueue::new();
    let bridge = Arc::new(bridge(&queue, config()));
    let worker = reversing_worker(&queue, 4);

    let callers: Vec<_> = (1..=4)
        .map(|id| {
            let bridge = Arc::clone(&bridge);
            thread::spawn(move || (id, bridge.execute(Command::get(id)).unwrap()))
        })
        .collect();

    for caller in callers {
        let (id, resolved) = caller.join().unwrap();
        assert_eq!(resolved.resource_id, Some(id));
        assert_eq!(resolved.payload, text(&format!("reply-{id}")));
    }
    worker.join().unwrap();

    for id in 1..=4 {
        assert_eq!(
            bridge.cache().get(&id).unwrap(),
            Some(text(&format!("reply-{id}")))
        );
    }
}

#[test]
fn concurrent_reads_and_writes_on_different_ids() {
    let queue = InMemoryQueue::new();
    let worker = worker(&queue, &[(1, "one"), (2, "two")]);
    let bridge = Arc::new(bridge(&queue, config()));

    let reader = {
        let bridge = Arc::clone(&bridge);
        thread::spawn(move || bridge.execute(Command::get(1)).unwrap())
    };
    let writer = {
        let bridge = Arc::clone(&bridge);
        thread::spawn(move || bridge.execute(Command::put(2, text("deux"))).unwrap())
    };

    assert_eq!(reader.join().unwrap().payload, text("one"));
    assert_eq!(writer.join().unwrap().payload, text("deux"));
    worker.stop();

    // Any serialization of the two ends with exactly this cache state.
    assert_eq!(bridge.cache().get(&1).unwrap(), Some(text("one")));
    assert_eq!(bridge.cache().get(&2).unwrap(), None);
    assert_eq!(queue.sent_count(COMMANDS), 2);
}

#[test]
fn many_callers_through_the_worker() {
    let queue = InMemoryQueue::new();
    let rows: Vec<(i64, String)> = (1..=16).map(|id| (id, format!("c{id}"))).collect();
    let seeded: Vec<(i64, &str)> = rows.iter().map(|(id, t)| (*id, t.as_str())).collect();
    let worker = worker(&queue, &seeded);
    let bridge = Arc::new(bridge(&queue, config()));

    let callers: Vec<_> = (1..=16)
        .map(|id| {
            let bridge = Arc::clone(&bridge);
            thread::spawn(move || bridge.execute(Command::get(id)).unwrap())
        })
        .collect();

    for (id, caller) in (1..=16).zip(callers) {
        assert_eq!(caller.join().unwrap().payload, text(&format!("c{id}")));
    }
    let stats = worker.stop();
    assert_eq!(stats.handled, 16);
}
