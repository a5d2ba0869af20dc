use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::{
    envelope::Envelope,
    lock::Lock,
    pool::Shared,
    runner::run_attempt,
};

/// Roster entry: the stop token lets the controller retire this worker
/// without touching the others.
pub(crate) struct WorkerHandle {
    pub(crate) id: u64,
    pub(crate) stop: CancellationToken,
    pub(crate) handle: JoinHandle<()>,
}

pub(crate) fn spawn_worker<T, L>(shared: &Arc<Shared<T, L>>) -> WorkerHandle
where
    T: Send + 'static,
    L: Lock,
{
    let id = shared.next_worker_id();
    let stop = CancellationToken::new();
    shared.worker_started();

    let worker = Worker {
        id,
        stop: stop.clone(),
        shared: Arc::clone(shared),
    };
    let rx = shared.queue.receiver();
    let handle = tokio::spawn(worker.run(rx));

    WorkerHandle { id, stop, handle }
}

struct Worker<T, L: Lock> {
    id: u64,
    stop: CancellationToken,
    shared: Arc<Shared<T, L>>,
}

impl<T, L> Worker<T, L>
where
    T: Send + 'static,
    L: Lock,
{
    async fn run(self, rx: flume::Receiver<Envelope<T>>) {
        debug!(worker = self.id, "worker started");

        loop {
            tokio::select! {
                biased;
                // Targeted shrink: finish nothing new, exit now. The
                // current envelope (if any) already completed above.
                _ = self.stop.cancelled() => break,
                recv = rx.recv_async() => match recv {
                    Ok(envelope) => self.execute(envelope).await,
                    // Queue closed and drained: graceful exit.
                    Err(_) => break,
                },
            }
        }

        self.shared.worker_exited();
        debug!(worker = self.id, "worker exited");
    }

    async fn execute(&self, mut envelope: Envelope<T>) {
        let timeout = self.shared.options.attempt_timeout();
        let mut attempt: u32 = 1;

        let outcome = loop {
            match run_attempt(&envelope.kind, &self.shared.abort, timeout).await {
                Ok(value) => break Ok(value),
                Err(err) if err.is_retryable() && envelope.attempts_left > 0 => {
                    envelope.attempts_left -= 1;
                    attempt += 1;
                    debug!(
                        worker = self.id,
                        task = envelope.id,
                        attempt,
                        error = %err,
                        "retrying failed task"
                    );
                }
                Err(err) => break Err(err),
            }
        };

        match outcome {
            Ok(Some(value)) => {
                if let Some(cb) = &self.shared.options.result_callback {
                    let cb = Arc::clone(cb);
                    shielded(move || cb(value));
                }
            }
            Ok(None) => {}
            Err(err) => {
                warn!(
                    worker = self.id,
                    task = envelope.id,
                    attempts = attempt,
                    error = %err,
                    "task failed terminally"
                );
                if let Some(cb) = &self.shared.options.error_callback {
                    let cb = Arc::clone(cb);
                    shielded(move || cb(err));
                }
            }
        }

        if let Some(cb) = &self.shared.options.task_callback {
            let cb = Arc::clone(cb);
            shielded(move || cb());
        }
        self.shared.task_done();
    }
}

/// Runs a user callback, containing any panic it raises. A callback
/// panic must not take the worker down with it.
pub(crate) fn shielded(f: impl FnOnce()) {
    if catch_unwind(AssertUnwindSafe(f)).is_err() {
        warn!("user callback panicked; swallowed");
    }
}
