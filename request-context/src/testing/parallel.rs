//! Concurrent execution helpers.

use futures::future::join_all;
use std::future::Future;

/// Runs `handler(0..n)` concurrently on the current task, preserving order.
///
/// All futures are polled interleaved by one task, which exercises the
/// per-future isolation of the ambient context.
pub async fn run_parallel<T, F, Fut>(n: usize, handler: F) -> Vec<T>
where
    F: FnMut(usize) -> Fut,
    Fut: Future<Output = T>,
{
    join_all((0..n).map(handler)).await
}

/// Runs `handler(0..n)` as separate tokio tasks, preserving order.
///
/// On a multi-thread runtime the tasks run in parallel on worker threads.
///
/// # Panics
///
/// Panics if a task panics, re-raising its payload.
pub async fn run_parallel_spawned<T, F, Fut>(n: usize, mut handler: F) -> Vec<T>
where
    F: FnMut(usize) -> Fut,
    Fut: Future<Output = T> + Send + 'static,
    T: Send + 'static,
{
    let handles: Vec<_> = (0..n).map(|i| tokio::spawn(handler(i))).collect();

    let mut results = Vec::with_capacity(n);
    for joined in join_all(handles).await {
        match joined {
            Ok(value) => results.push(value),
            Err(err) if err.is_panic() => std::panic::resume_unwind(err.into_panic()),
            Err(err) => panic!("Task join error: {err}"),
        }
    }
    results
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_run_parallel_preserves_order() {
        let results = run_parallel(5, |i| async move {
            tokio::time::sleep(Duration::from_millis((5 - i) as u64)).await;
            i * 10
        })
        .await;

        assert_eq!(results, vec![0, 10, 20, 30, 40]);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_run_parallel_spawned_preserves_order() {
        let results = run_parallel_spawned(8, |i| async move { i + 1 }).await;
        assert_eq!(results, (1..=8).collect::<Vec<_>>());
    }

    #[tokio::test]
    async fn test_run_parallel_zero() {
        let results: Vec<usize> = run_parallel(0, |i| async move { i }).await;
        assert!(results.is_empty());
    }
}
