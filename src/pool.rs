//! # Pool facade: construction, submission, quiescence, shutdown.

use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;

use tokio::sync::{Mutex as AsyncMutex, Notify};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::{
    adjust,
    config::Options,
    envelope::{Envelope, TaskKind},
    error::{PoolError, TaskError},
    lock::{guard, Lock, MutexLock},
    queue::TaskQueue,
    task::TaskRef,
    worker::{shielded, spawn_worker},
};

/// State shared between the facade, the workers, and the controller.
///
/// Counter and flag transitions take the injected lock; the worker roster
/// itself is confined to its single owner (the controller task, or the
/// constructor for static pools), with its size mirrored in `workers` for
/// observers.
pub(crate) struct Shared<T, L: Lock> {
    pub(crate) options: Options<T>,
    pub(crate) max_workers: usize,
    pub(crate) min_workers: usize,
    pub(crate) queue: TaskQueue<T>,
    /// Parent of every attempt's cancellation token. Cancelled only by
    /// [`Pool::release_now`].
    pub(crate) abort: CancellationToken,
    /// Stops the adjustment controller loop.
    pub(crate) shutdown: CancellationToken,
    lock: L,
    inflight: AtomicUsize,
    released: AtomicBool,
    workers: AtomicUsize,
    next_task_id: AtomicU64,
    next_worker_id: AtomicU64,
    idle: Notify,
}

impl<T, L: Lock> Shared<T, L> {
    pub(crate) fn next_worker_id(&self) -> u64 {
        self.next_worker_id.fetch_add(1, Ordering::Relaxed)
    }

    pub(crate) fn worker_started(&self) {
        let _g = guard(&self.lock);
        self.workers.fetch_add(1, Ordering::SeqCst);
    }

    pub(crate) fn worker_exited(&self) {
        let _g = guard(&self.lock);
        self.workers.fetch_sub(1, Ordering::SeqCst);
    }

    /// Worker-set size including retired workers that have not yet
    /// exited. The scale-up gate uses this so a draining worker still
    /// counts against `max_workers`.
    pub(crate) fn live_workers(&self) -> usize {
        self.workers.load(Ordering::SeqCst)
    }

    /// Terminal accounting for one envelope: decrement in-flight and wake
    /// `wait` at quiescence. Runs after all callbacks for the task.
    pub(crate) fn task_done(&self) {
        let remaining = {
            let _g = guard(&self.lock);
            self.inflight.fetch_sub(1, Ordering::SeqCst) - 1
        };
        if remaining == 0 {
            self.idle.notify_waiters();
        }
    }

    fn quiescent(&self) -> bool {
        self.inflight.load(Ordering::SeqCst) == 0 && self.queue.is_empty()
    }
}

struct JoinStore {
    controller: Option<JoinHandle<()>>,
    workers: Vec<JoinHandle<()>>,
}

/// # Worker pool over a bounded, dynamically-sized worker set.
///
/// `Pool` accepts an unbounded stream of short-lived tasks and executes
/// them across long-lived workers. `T` is the value type yielded by
/// result-bearing submissions (`()` when only fire-and-forget tasks are
/// used); `L` is the injected mutual-exclusion capability.
///
/// Construction must happen inside a tokio runtime, since workers are
/// spawned immediately.
///
/// # Example
/// ```no_run
/// use taskpool::{Options, Pool, TaskFn};
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() -> Result<(), taskpool::PoolError> {
/// let pool: Pool = Pool::new(8, Options::new())?;
///
/// pool.submit(TaskFn::arc(|_ctx| async {
///     // do work...
///     Ok(())
/// }))?;
///
/// pool.wait().await;
/// pool.release().await;
/// # Ok(())
/// # }
/// ```
pub struct Pool<T = (), L: Lock = MutexLock> {
    shared: Arc<Shared<T, L>>,
    joins: AsyncMutex<JoinStore>,
}

impl<T: Send + 'static> Pool<T> {
    /// Creates a pool with the default blocking lock.
    ///
    /// Validates `max_workers >= 1` and `min_workers <= max_workers`.
    /// With `Options::min_workers` unset the worker set is static at
    /// `max_workers`; otherwise `min_workers` workers start now and the
    /// adjustment controller resizes the set under load.
    pub fn new(max_workers: usize, options: Options<T>) -> Result<Self, PoolError> {
        Self::with_lock(max_workers, options, MutexLock::new())
    }
}

impl<T: Send + 'static, L: Lock> Pool<T, L> {
    /// Creates a pool serializing its internal state through `lock`.
    ///
    /// Use this to inject e.g. a [`SpinLock`](crate::SpinLock) where the
    /// counter hot path is contended and critical sections stay short.
    pub fn with_lock(max_workers: usize, options: Options<T>, lock: L) -> Result<Self, PoolError> {
        if max_workers == 0 {
            return Err(PoolError::Config {
                reason: "max_workers must be >= 1".into(),
            });
        }
        if let Some(min) = options.min_workers {
            if min > max_workers {
                return Err(PoolError::Config {
                    reason: format!("min_workers ({min}) must not exceed max_workers ({max_workers})"),
                });
            }
        }

        let min_workers = options.min_workers.unwrap_or(max_workers);
        let dynamic = min_workers != max_workers;

        let shared = Arc::new(Shared {
            options,
            max_workers,
            min_workers,
            queue: TaskQueue::unbounded(),
            abort: CancellationToken::new(),
            shutdown: CancellationToken::new(),
            lock,
            inflight: AtomicUsize::new(0),
            released: AtomicBool::new(false),
            workers: AtomicUsize::new(0),
            next_task_id: AtomicU64::new(0),
            next_worker_id: AtomicU64::new(0),
            idle: Notify::new(),
        });

        let initial: Vec<_> = (0..min_workers).map(|_| spawn_worker(&shared)).collect();

        let mut joins = JoinStore {
            controller: None,
            workers: Vec::new(),
        };
        if dynamic {
            joins.controller = Some(tokio::spawn(adjust::run(Arc::clone(&shared), initial)));
        } else {
            joins.workers = initial.into_iter().map(|w| w.handle).collect();
        }

        info!(max_workers, min_workers, dynamic, "pool started");
        Ok(Self {
            shared,
            joins: AsyncMutex::new(joins),
        })
    }

    /// Submits a fire-and-forget task.
    ///
    /// Never blocks: the task is wrapped with the configured retry budget
    /// and enqueued. Success of the task means its attempt finished
    /// without timeout, panic, or error.
    ///
    /// # Errors
    /// [`PoolError::Released`] once [`release`](Pool::release) has begun.
    pub fn submit(&self, task: TaskRef<()>) -> Result<(), PoolError> {
        self.enqueue(TaskKind::Fire(task))
    }

    /// Submits a result-bearing task; its yielded value is delivered to
    /// the configured result callback.
    ///
    /// # Errors
    /// [`PoolError::Released`] once [`release`](Pool::release) has begun.
    pub fn submit_yielding(&self, task: TaskRef<T>) -> Result<(), PoolError> {
        self.enqueue(TaskKind::Yielding(task))
    }

    fn enqueue(&self, kind: TaskKind<T>) -> Result<(), PoolError> {
        {
            let _g = guard(&self.shared.lock);
            if self.shared.released.load(Ordering::SeqCst) {
                return Err(PoolError::Released);
            }
            self.shared.inflight.fetch_add(1, Ordering::SeqCst);
        }

        let id = self.shared.next_task_id.fetch_add(1, Ordering::Relaxed);
        let envelope = Envelope::new(id, kind, self.shared.options.retry_count);
        match self.shared.queue.push(envelope) {
            Ok(()) => {
                debug!(task = id, "task submitted");
                Ok(())
            }
            Err(_envelope) => {
                // The queue closed between the released check and the
                // push; undo the in-flight claim.
                self.shared.task_done();
                Err(PoolError::Released)
            }
        }
    }

    /// Resolves once the queue is empty and no task is in flight.
    ///
    /// Every callback of every submitted task completes before `wait`
    /// returns. Does not stop workers; a pool can cycle through
    /// submit/wait rounds indefinitely.
    pub async fn wait(&self) {
        loop {
            let notified = self.shared.idle.notified();
            tokio::pin!(notified);
            // Register before checking, so a final task finishing between
            // the check and the await cannot slip past us.
            notified.as_mut().enable();
            if self.shared.quiescent() {
                return;
            }
            notified.await;
        }
    }

    /// Graceful shutdown: stops accepting submissions, lets workers drain
    /// the queue, stops the controller, and joins every worker.
    ///
    /// Idempotent; concurrent callers all return once shutdown finished.
    /// A task that ignores its cancellation token can delay this
    /// indefinitely; the pool never kills a running callable.
    pub async fn release(&self) {
        let mut joins = self.joins.lock().await;
        self.begin_release();
        Self::join_all(&mut joins).await;
        info!("pool released");
    }

    /// Forced shutdown: like [`release`](Pool::release), but abandons
    /// queued tasks that no worker has started.
    ///
    /// Each abandoned task is delivered to the error callback as
    /// [`TaskError::Released`] and counted as done, so a concurrent
    /// [`wait`](Pool::wait) still resolves. Tasks already running are
    /// signalled through their cancellation tokens and finish
    /// cooperatively.
    pub async fn release_now(&self) {
        let mut joins = self.joins.lock().await;
        self.begin_release();
        self.shared.abort.cancel();

        let mut abandoned = 0usize;
        while let Some(envelope) = self.shared.queue.try_pop() {
            abandoned += 1;
            debug!(task = envelope.id, "abandoning queued task");
            if let Some(cb) = &self.shared.options.error_callback {
                let cb = Arc::clone(cb);
                shielded(move || cb(TaskError::Released));
            }
            if let Some(cb) = &self.shared.options.task_callback {
                let cb = Arc::clone(cb);
                shielded(move || cb());
            }
            self.shared.task_done();
        }

        Self::join_all(&mut joins).await;
        info!(abandoned, "pool released (forced)");
    }

    async fn join_all(joins: &mut JoinStore) {
        if let Some(controller) = joins.controller.take() {
            let _ = controller.await;
        }
        for handle in joins.workers.drain(..) {
            let _ = handle.await;
        }
    }
}

impl<T, L: Lock> Pool<T, L> {
    /// Current size of the worker set, draining workers included.
    pub fn worker_count(&self) -> usize {
        self.shared.workers.load(Ordering::SeqCst)
    }

    /// Envelopes queued but not yet picked up by a worker.
    pub fn queue_depth(&self) -> usize {
        self.shared.queue.len()
    }

    /// Tasks submitted but not yet terminally completed, retries included.
    pub fn inflight(&self) -> usize {
        self.shared.inflight.load(Ordering::SeqCst)
    }

    /// Whether shutdown has begun.
    pub fn is_released(&self) -> bool {
        self.shared.released.load(Ordering::SeqCst)
    }

    fn begin_release(&self) {
        {
            let _g = guard(&self.shared.lock);
            self.shared.released.store(true, Ordering::SeqCst);
        }
        self.shared.queue.close();
        self.shared.shutdown.cancel();
    }
}

impl<T, L: Lock> Drop for Pool<T, L> {
    /// Best-effort shutdown signal so workers drain and exit on their
    /// own. [`Pool::release`] is the deterministic path.
    fn drop(&mut self) {
        self.begin_release();
    }
}
