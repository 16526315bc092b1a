//! Isolation and suspension behavior of the ambient context under concurrency.

use request_context::context::{ContextData, ContextKey};
use request_context::keys::REQUEST_ID;
use request_context::testing::{assert_no_leak, run_parallel, run_parallel_spawned};
use request_context::{current, get, propagation, require, run, set};
use serde_json::json;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Barrier;

const STEP: ContextKey<u32> = ContextKey::new("step");

fn seed(i: usize) -> ContextData {
    ContextData::from([(REQUEST_ID.name().to_string(), json!(format!("req-{i}")))])
}

async fn observe(i: usize) -> (String, String) {
    run(seed(i), || async move {
        tokio::task::yield_now().await;
        tokio::time::sleep(Duration::from_micros((i % 7) as u64 * 50)).await;
        let seen = require(&REQUEST_ID).unwrap();
        (format!("req-{i}"), seen)
    })
    .await
}

fn assert_all_match(observed: &[(String, String)], n: usize) {
    assert_eq!(observed.len(), n);
    for (expected, seen) in observed {
        assert_eq!(expected, seen);
    }
    let distinct: HashSet<_> = observed.iter().map(|(_, seen)| seen).collect();
    assert_eq!(distinct.len(), n);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_isolation_across_spawned_tasks() {
    for n in [1, 10, 100] {
        let observed = run_parallel_spawned(n, observe).await;
        assert_all_match(&observed, n);
    }
}

#[tokio::test]
async fn test_isolation_within_one_task() {
    for n in [1, 10, 100] {
        let observed = run_parallel(n, observe).await;
        assert_all_match(&observed, n);
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_no_leak_in_captured_contexts() {
    let results = run_parallel_spawned(50, |i| {
        run(seed(i), move || async move {
            tokio::task::yield_now().await;
            current().unwrap().to_dict()
        })
    })
    .await;

    assert!(assert_no_leak(&results).is_ok());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_value_survives_await_while_others_run() {
    let n = 8;
    let barrier = Arc::new(Barrier::new(n));

    let results = run_parallel_spawned(n, |i| {
        let barrier = Arc::clone(&barrier);
        run(seed(i), move || async move {
            set(&STEP, u32::try_from(i).unwrap()).unwrap();

            // Every unit sets its value, then waits for all the others to
            // have done the same before reading it back.
            barrier.wait().await;
            tokio::time::sleep(Duration::from_millis(2)).await;

            (i, get(&STEP).unwrap(), require(&REQUEST_ID).unwrap())
        })
    })
    .await;

    for (i, step, id) in results {
        assert_eq!(step, Some(u32::try_from(i).unwrap()));
        assert_eq!(id, format!("req-{i}"));
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_propagated_tasks_share_the_unit_context() {
    let keys = run(seed(0), || async {
        set(&STEP, 0).unwrap();

        let handles: Vec<_> = (1..=3u32)
            .map(|i| {
                propagation::spawn(async move {
                    assert_eq!(require(&REQUEST_ID).unwrap(), "req-0");
                    let worker: ContextKey<u32> = ContextKey::from_name(format!("worker{i}"));
                    set(&worker, i).unwrap();
                })
            })
            .collect();

        for handle in handles {
            handle.await.unwrap();
        }

        for i in 1..=3u32 {
            let worker: ContextKey<u32> = ContextKey::from_name(format!("worker{i}"));
            assert_eq!(get(&worker).unwrap(), Some(i));
        }
        current().unwrap().len()
    })
    .await;

    // requestId, step and one entry per worker
    assert_eq!(keys, 5);
    assert!(current().is_none());
}

#[tokio::test]
async fn test_nothing_ambient_between_units() {
    run(seed(1), || async {}).await;
    assert!(current().is_none());
    assert!(get(&REQUEST_ID).is_err());
}
