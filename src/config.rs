//! # Pool construction options.
//!
//! [`Options`] defines a pool's behavior: dynamic sizing floor, per-attempt
//! timeout, retry budget, and the callbacks a worker invokes as tasks
//! reach their terminal outcome.
//!
//! # Example
//! ```
//! use std::time::Duration;
//! use taskpool::Options;
//!
//! let opts: Options<String> = Options::new()
//!     .with_min_workers(4)
//!     .with_timeout(Duration::from_secs(5))
//!     .with_retry_count(2)
//!     .with_result_callback(|value| println!("done: {value}"));
//!
//! assert_eq!(opts.min_workers, Some(4));
//! assert_eq!(opts.retry_count, 2);
//! ```

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use crate::error::TaskError;

/// Invoked after a task's final failure with the terminal error.
pub type ErrorCallback = Arc<dyn Fn(TaskError) + Send + Sync>;

/// Invoked on success of a result-bearing task with the yielded value.
pub type ResultCallback<T> = Arc<dyn Fn(T) + Send + Sync>;

/// Invoked after each task terminates, for accounting/tracing.
pub type TaskCallback = Arc<dyn Fn() + Send + Sync>;

/// Options applied at pool construction.
///
/// All fields have inert defaults: static sizing, no timeout, no retries,
/// no callbacks. Callbacks run on the worker that ran the task and must be
/// thread-safe; the pool imposes no serialization on them.
pub struct Options<T> {
    /// Floor for dynamic sizing. `None` keeps the worker set static at
    /// `max_workers`; `Some(k)` starts `k` workers and lets the
    /// adjustment controller resize between `k` and `max_workers`.
    pub min_workers: Option<usize>,
    /// Upper bound for each task attempt (zero disables the timeout).
    pub timeout: Duration,
    /// How many additional attempts a failing task gets.
    pub retry_count: u32,
    /// Receiver of terminal task errors.
    pub error_callback: Option<ErrorCallback>,
    /// Receiver of yielded values from successful result-bearing tasks.
    pub result_callback: Option<ResultCallback<T>>,
    /// Per-task completion hook.
    pub task_callback: Option<TaskCallback>,
}

impl<T> Options<T> {
    /// Options with every knob at its inert default.
    pub fn new() -> Self {
        Self {
            min_workers: None,
            timeout: Duration::ZERO,
            retry_count: 0,
            error_callback: None,
            result_callback: None,
            task_callback: None,
        }
    }

    /// Enables dynamic sizing with floor `k`.
    pub fn with_min_workers(mut self, k: usize) -> Self {
        self.min_workers = Some(k);
        self
    }

    /// Bounds each task attempt by `timeout`. Zero disables.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Retries a failing task up to `retries` additional times.
    pub fn with_retry_count(mut self, retries: u32) -> Self {
        self.retry_count = retries;
        self
    }

    /// Invokes `f` with the terminal error after a task's final failure.
    pub fn with_error_callback(mut self, f: impl Fn(TaskError) + Send + Sync + 'static) -> Self {
        self.error_callback = Some(Arc::new(f));
        self
    }

    /// Invokes `f` with the yielded value when a result-bearing task succeeds.
    pub fn with_result_callback(mut self, f: impl Fn(T) + Send + Sync + 'static) -> Self {
        self.result_callback = Some(Arc::new(f));
        self
    }

    /// Invokes `f` after each task terminates, success or failure.
    pub fn with_task_callback(mut self, f: impl Fn() + Send + Sync + 'static) -> Self {
        self.task_callback = Some(Arc::new(f));
        self
    }

    /// The attempt timeout as the runner consumes it.
    pub(crate) fn attempt_timeout(&self) -> Option<Duration> {
        (!self.timeout.is_zero()).then_some(self.timeout)
    }
}

impl<T> Default for Options<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for Options<T> {
    fn clone(&self) -> Self {
        Self {
            min_workers: self.min_workers,
            timeout: self.timeout,
            retry_count: self.retry_count,
            error_callback: self.error_callback.clone(),
            result_callback: self.result_callback.clone(),
            task_callback: self.task_callback.clone(),
        }
    }
}

impl<T> fmt::Debug for Options<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Options")
            .field("min_workers", &self.min_workers)
            .field("timeout", &self.timeout)
            .field("retry_count", &self.retry_count)
            .field("error_callback", &self.error_callback.is_some())
            .field("result_callback", &self.result_callback.is_some())
            .field("task_callback", &self.task_callback.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_inert() {
        let opts: Options<()> = Options::default();
        assert_eq!(opts.min_workers, None);
        assert!(opts.timeout.is_zero());
        assert_eq!(opts.retry_count, 0);
        assert!(opts.attempt_timeout().is_none());
    }

    #[test]
    fn zero_timeout_means_disabled() {
        let opts: Options<()> = Options::new().with_timeout(Duration::ZERO);
        assert!(opts.attempt_timeout().is_none());

        let opts = opts.with_timeout(Duration::from_millis(250));
        assert_eq!(opts.attempt_timeout(), Some(Duration::from_millis(250)));
    }
}
