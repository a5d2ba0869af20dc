//! # taskpool
//!
//! **Taskpool** is a lightweight async worker pool.
//!
//! It accepts an unbounded stream of short-lived tasks and executes them
//! across a bounded, dynamically-sized set of long-lived workers,
//! amortizing spawn cost, capping concurrency, and wrapping every task in
//! a timeout/retry/callback envelope. The crate is designed as a building
//! block for services that fan work out to downstream systems.
//!
//! ## Features
//!
//! | Area                | Description                                                              | Key types / traits              |
//! |---------------------|--------------------------------------------------------------------------|---------------------------------|
//! | **Dispatch**        | FIFO handoff from any number of producers to the worker set.             | [`Pool::submit`], [`Pool::submit_yielding`] |
//! | **Dynamic sizing**  | Periodic controller grows/shrinks the worker set between min and max.    | [`Options::with_min_workers`]   |
//! | **Task envelope**   | Per-attempt timeout, retry budget, panic capture.                        | [`Options`], [`TaskError`]      |
//! | **Callbacks**       | Error / result / completion hooks invoked on the executing worker.       | [`Options::with_error_callback`], [`Options::with_result_callback`] |
//! | **Lock capability** | Pool is generic over a two-operation mutual-exclusion primitive.         | [`Lock`], [`MutexLock`], [`SpinLock`] |
//! | **Tasks**           | Define tasks as async functions or trait impls, cancelable by token.     | [`Task`], [`TaskFn`], [`TaskRef`] |
//! | **Errors**          | Typed errors for the facade and for task execution.                      | [`PoolError`], [`TaskError`]    |
//!
//! ## Semantics in brief
//!
//! - Dispatch order is FIFO; completion order is unspecified.
//! - [`Pool::wait`] resolves only at quiescence: empty queue, nothing in
//!   flight, every callback already run.
//! - Cancellation is cooperative. A timed-out or abandoned callable is
//!   *signaled* through its [`CancellationToken`](tokio_util::sync::CancellationToken)
//!   and never forcibly killed.
//! - A panicking task (or callback) never takes a worker down.
//!
//! ```no_run
//! use std::time::Duration;
//! use taskpool::{Options, Pool, TaskFn};
//!
//! #[tokio::main(flavor = "multi_thread")]
//! async fn main() -> Result<(), taskpool::PoolError> {
//!     let options = Options::new()
//!         .with_min_workers(8)
//!         .with_timeout(Duration::from_secs(5))
//!         .with_retry_count(2)
//!         .with_error_callback(|err| eprintln!("task failed: {err}"));
//!
//!     let pool: Pool = Pool::new(64, options)?;
//!
//!     for i in 0..1000 {
//!         pool.submit(TaskFn::arc(move |ctx| async move {
//!             if ctx.is_cancelled() {
//!                 return Err(taskpool::TaskError::Canceled);
//!             }
//!             // do work for item i...
//!             let _ = i;
//!             Ok(())
//!         }))?;
//!     }
//!
//!     pool.wait().await;
//!     pool.release().await;
//!     Ok(())
//! }
//! ```
//!
//! ---

mod adjust;
mod config;
mod envelope;
mod error;
mod lock;
mod pool;
mod queue;
mod runner;
mod task;
mod worker;

// ---- Public re-exports ----

pub use config::{ErrorCallback, Options, ResultCallback, TaskCallback};
pub use error::{PoolError, TaskError};
pub use lock::{Lock, MutexLock, SpinLock};
pub use pool::Pool;
pub use task::{Task, TaskFn, TaskRef};
