//! # Run a single attempt of a task with optional timeout.
//!
//! This helper drives one execution of an envelope's callable, with
//! cooperative cancellation and panic capture.
//!
//! # High-level flow:
//!
//! ```text
//!   ┌────────────┐
//!   │  TaskKind  │
//!   └──────┬─────┘
//!     run_attempt()
//!          ▼
//!  child token ──► spawn ──► timeout? ──► outcome
//! ```
//! - The callable runs as its own tokio task so the worker survives a
//!   panic inside it and can walk away from a timed-out attempt.
//! - If `timeout` is `Some(dur)`, the attempt is bounded by
//!   [`tokio::time::timeout`]. On expiry the child token is cancelled and
//!   [`TaskError::Timeout`] is returned; the callable itself is only
//!   *signaled*. A runaway callable keeps running detached and is never
//!   forcibly killed.
//! - A panic escaping the callable surfaces as a join error and is
//!   converted to [`TaskError::Panic`].

use std::any::Any;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time;
use tokio_util::sync::CancellationToken;

use crate::{
    envelope::TaskKind,
    error::TaskError,
};

/// Executes a single attempt, yielding `Some(value)` for result-bearing
/// tasks and `None` for fire-and-forget ones.
pub(crate) async fn run_attempt<T: Send + 'static>(
    kind: &TaskKind<T>,
    parent: &CancellationToken,
    timeout: Option<Duration>,
) -> Result<Option<T>, TaskError> {
    let child = parent.child_token();
    let handle = spawn_attempt(kind, child.clone());

    let joined = if let Some(dur) = timeout {
        match time::timeout(dur, handle).await {
            Ok(joined) => joined,
            Err(_elapsed) => {
                // Signal the callable and move on; the detached attempt
                // task finishes (or not) on its own.
                child.cancel();
                return Err(TaskError::Timeout { timeout: dur });
            }
        }
    } else {
        handle.await
    };

    match joined {
        Ok(outcome) => outcome,
        Err(join_err) if join_err.is_panic() => Err(TaskError::Panic {
            reason: panic_reason(join_err.into_panic()),
        }),
        Err(_) => Err(TaskError::Canceled),
    }
}

fn spawn_attempt<T: Send + 'static>(
    kind: &TaskKind<T>,
    ctx: CancellationToken,
) -> JoinHandle<Result<Option<T>, TaskError>> {
    match kind {
        TaskKind::Fire(task) => {
            let task = task.clone();
            tokio::spawn(async move { task.run(ctx).await.map(|()| None) })
        }
        TaskKind::Yielding(task) => {
            let task = task.clone();
            tokio::spawn(async move { task.run(ctx).await.map(Some) })
        }
    }
}

fn panic_reason(payload: Box<dyn Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "opaque panic payload".to_string()
    }
}
