//! Periodic worker-set resizing between `min_workers` and `max_workers`.
//!
//! The controller runs on a fixed cadence, deliberately decoupled from
//! task arrivals. Between the scale-up and scale-down thresholds sits a
//! dead band where neither rule fires, which keeps the roster from
//! oscillating around a steady queue depth.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::{self, MissedTickBehavior};
use tracing::debug;

use crate::{
    lock::Lock,
    pool::Shared,
    worker::{spawn_worker, WorkerHandle},
};

/// Controller cadence. Fixed; never tied to submission rate.
pub(crate) const ADJUST_INTERVAL: Duration = Duration::from_millis(100);

/// Controller loop. Owns the live roster; on shutdown joins every worker
/// it ever supervised before returning.
pub(crate) async fn run<T, L>(shared: Arc<Shared<T, L>>, mut roster: Vec<WorkerHandle>)
where
    T: Send + 'static,
    L: Lock,
{
    let mut retired: Vec<WorkerHandle> = Vec::new();
    let mut ticker = time::interval(ADJUST_INTERVAL);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            _ = shared.shutdown.cancelled() => break,
            _ = ticker.tick() => adjust(&shared, &mut roster, &mut retired),
        }
    }

    // Release closed the queue before signalling shutdown, so every
    // worker drains whatever is left and exits on its own.
    for worker in roster.drain(..).chain(retired.drain(..)) {
        let _ = worker.handle.await;
    }
}

fn adjust<T, L>(
    shared: &Arc<Shared<T, L>>,
    roster: &mut Vec<WorkerHandle>,
    retired: &mut Vec<WorkerHandle>,
) where
    T: Send + 'static,
    L: Lock,
{
    retired.retain(|w| !w.handle.is_finished());

    let depth = shared.queue.len();
    let count = roster.len();
    let min = shared.min_workers;
    let max = shared.max_workers;

    if depth > min + (max - min) / 2 && shared.live_workers() < max {
        let worker = spawn_worker(shared);
        debug!(worker = worker.id, depth, workers = count + 1, "scaling up");
        roster.push(worker);
    } else if depth < min && count > min {
        // Retire the newest worker: it finishes its current task, if
        // any, then exits.
        if let Some(worker) = roster.pop() {
            debug!(worker = worker.id, depth, workers = count - 1, "scaling down");
            worker.stop.cancel();
            retired.push(worker);
        }
    }
}
