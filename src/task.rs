//! # Task abstraction and function-backed task implementation.
//!
//! This module defines the [`Task`] trait (async, cancelable, yielding a value) and a convenient
//! function-backed implementation [`TaskFn`]. The common handle type is [`TaskRef`], an
//! `Arc<dyn Task>` suitable for sharing across the runtime.
//!
//! A task receives a [`CancellationToken`] and should periodically check it to
//! stop cooperatively when its attempt times out or the pool is force-released.
//!
//! Fire-and-forget submissions use `Task<()>`; result-bearing submissions use
//! `Task<T>` for the pool's value type.

use std::{future::Future, sync::Arc};

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio_util::sync::CancellationToken;

use crate::error::TaskError;

/// # Shared handle to a task object.
///
/// This is the primary type accepted by [`Pool::submit`](crate::Pool::submit)
/// and [`Pool::submit_yielding`](crate::Pool::submit_yielding).
pub type TaskRef<T> = Arc<dyn Task<T>>;

/// # Asynchronous, cancelable unit of work.
///
/// A `Task` has an async [`run`](Task::run) method that receives a [`CancellationToken`]
/// and yields a value on success. Implementors should regularly check cancellation and
/// exit promptly once it fires: a timed-out attempt is signaled, never killed.
///
/// The pool may invoke `run` more than once when a retry budget is configured, so the
/// method takes `&self`.
///
/// # Example
/// ```
/// use tokio_util::sync::CancellationToken;
/// use async_trait::async_trait;
/// use taskpool::{Task, TaskError};
///
/// struct Demo;
///
/// #[async_trait]
/// impl Task<u32> for Demo {
///     async fn run(&self, ctx: CancellationToken) -> Result<u32, TaskError> {
///         if ctx.is_cancelled() {
///             return Err(TaskError::Canceled);
///         }
///         Ok(42)
///     }
/// }
/// ```
#[async_trait]
pub trait Task<T>: Send + Sync + 'static {
    /// Executes one attempt of the task until completion or cancellation.
    ///
    /// Implementations should check `ctx.is_cancelled()` and return quickly to honor
    /// attempt timeouts and forced shutdown.
    async fn run(&self, ctx: CancellationToken) -> Result<T, TaskError>;
}

/// # Function-backed task implementation.
///
/// [`TaskFn`] wraps a closure `Fnc: FnMut(CancellationToken) -> Fut`.
/// The closure is protected by a [`Mutex`] to allow calling `run(&self, ...)` for every
/// retry attempt even though the closure is `FnMut`. Use [`TaskFn::arc`] for a one-liner
/// that returns a [`TaskRef`].
///
/// ### Concurrency semantics:
/// The mutex is held ONLY during the creation of the future (calling the closure), not
/// during its execution. If your closure captures mutable state that is accessed INSIDE
/// the returned future, you must add your own synchronization (`Arc<Mutex<_>>`, etc.);
/// the `TaskFn` mutex protects the closure's captured state only at future-creation time.
///
/// # Example
/// ```
/// use tokio_util::sync::CancellationToken;
/// use taskpool::{TaskFn, TaskRef, TaskError};
///
/// let t: TaskRef<()> = TaskFn::arc(|ctx: CancellationToken| async move {
///     if ctx.is_cancelled() {
///         return Err(TaskError::Canceled);
///     }
///     // do work...
///     Ok(())
/// });
/// ```
pub struct TaskFn<Fnc, Fut>
where
    Fnc: FnMut(CancellationToken) -> Fut + Send + 'static,
    Fut: Future + Send + 'static,
{
    /// Underlying function (guarded by a mutex to allow `FnMut` with `&self`).
    func: Mutex<Fnc>,
}

impl<Fnc, Fut> TaskFn<Fnc, Fut>
where
    Fnc: FnMut(CancellationToken) -> Fut + Send + 'static,
    Fut: Future + Send + 'static,
{
    /// Creates a new function-backed task.
    ///
    /// Prefer [`TaskFn::arc`] when you immediately need a [`TaskRef`].
    pub fn new(func: Fnc) -> Self {
        Self {
            func: Mutex::new(func),
        }
    }

    /// Creates the task and returns it as a shared handle (`Arc<dyn Task>`).
    pub fn arc<T>(func: Fnc) -> TaskRef<T>
    where
        Fut: Future<Output = Result<T, TaskError>>,
        T: Send + 'static,
    {
        Arc::new(Self::new(func))
    }
}

#[async_trait]
impl<Fnc, Fut, T> Task<T> for TaskFn<Fnc, Fut>
where
    Fnc: FnMut(CancellationToken) -> Fut + Send + 'static,
    Fut: Future<Output = Result<T, TaskError>> + Send + 'static,
    T: Send + 'static,
{
    async fn run(&self, ctx: CancellationToken) -> Result<T, TaskError> {
        let fut = {
            let mut f = self.func.lock();
            (f)(ctx)
        };
        fut.await
    }
}
