//! Shard processing helpers.
//!
//! Both helpers run on the caller's task. Shard bodies overlap on I/O waits
//! (reasoning calls, cache lookups) rather than running on separate threads.

use crate::types::Shard;
use futures::future::join_all;
use hive_core::config::ProcessingMode;
use std::future::Future;
use std::time::Duration;
use tracing::debug;

/// Fan out every shard at once and wait for all of them.
///
/// Every shard is processed exactly once; callers must not depend on the
/// order of the returned results.
pub async fn process_concurrent<T, R, F, Fut>(shards: Vec<Shard<T>>, f: F) -> Vec<R>
where
    F: Fn(Shard<T>) -> Fut,
    Fut: Future<Output = R>,
{
    debug!("Processing {} shards concurrently", shards.len());
    join_all(shards.into_iter().map(f)).await
}

/// Process shards strictly one at a time, pausing between consecutive shards.
///
/// Bounds the aggregate rate of external calls at the cost of latency.
pub async fn process_throttled<T, R, F, Fut>(shards: Vec<Shard<T>>, pause: Duration, f: F) -> Vec<R>
where
    F: Fn(Shard<T>) -> Fut,
    Fut: Future<Output = R>,
{
    debug!(
        "Processing {} shards sequentially with {:?} pause",
        shards.len(),
        pause
    );
    let mut results = Vec::with_capacity(shards.len());
    for (i, shard) in shards.into_iter().enumerate() {
        if i > 0 && !pause.is_zero() {
            tokio::time::sleep(pause).await;
        }
        results.push(f(shard).await);
    }
    results
}

/// Dispatch to [`process_concurrent`] or [`process_throttled`].
pub async fn process_shards<T, R, F, Fut>(
    mode: ProcessingMode,
    pause: Duration,
    shards: Vec<Shard<T>>,
    f: F,
) -> Vec<R>
where
    F: Fn(Shard<T>) -> Fut,
    Fut: Future<Output = R>,
{
    match mode {
        ProcessingMode::Concurrent => process_concurrent(shards, f).await,
        ProcessingMode::Throttled => process_throttled(shards, pause, f).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::GridPartitioner;
    use hive_core::types::GridPos;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn shards() -> Vec<Shard<GridPos>> {
        let grid = GridPartitioner::new(20, 20, 2);
        grid.partition(vec![
            GridPos::new(1, 1),
            GridPos::new(15, 1),
            GridPos::new(1, 15),
            GridPos::new(15, 15),
            GridPos::new(2, 2),
        ])
    }

    #[tokio::test]
    async fn concurrent_overlaps_shard_bodies() {
        let active = Arc::new(AtomicUsize::new(0));
        let peak = Arc::new(AtomicUsize::new(0));

        let counts = process_concurrent(shards(), |shard| {
            let active = active.clone();
            let peak = peak.clone();
            async move {
                let now = active.fetch_add(1, Ordering::SeqCst) + 1;
                peak.fetch_max(now, Ordering::SeqCst);
                tokio::time::sleep(Duration::from_millis(20)).await;
                active.fetch_sub(1, Ordering::SeqCst);
                shard.len()
            }
        })
        .await;

        assert_eq!(counts.iter().sum::<usize>(), 5);
        assert_eq!(peak.load(Ordering::SeqCst), 4);
    }

    #[tokio::test]
    async fn throttled_runs_one_at_a_time() {
        let active = Arc::new(AtomicUsize::new(0));
        let peak = Arc::new(AtomicUsize::new(0));
        let start = tokio::time::Instant::now();

        let ids = process_throttled(shards(), Duration::from_millis(10), |shard| {
            let active = active.clone();
            let peak = peak.clone();
            async move {
                let now = active.fetch_add(1, Ordering::SeqCst) + 1;
                peak.fetch_max(now, Ordering::SeqCst);
                tokio::task::yield_now().await;
                active.fetch_sub(1, Ordering::SeqCst);
                shard.id
            }
        })
        .await;

        assert_eq!(ids.len(), 4);
        assert_eq!(peak.load(Ordering::SeqCst), 1);
        // three pauses between four shards
        assert!(start.elapsed() >= Duration::from_millis(30));
    }
}
