//! # Error types used by the pool and by task executions.
//!
//! This module defines two main error enums:
//!
//! - [`PoolError`] errors raised by the pool facade itself.
//! - [`TaskError`] errors raised by individual task attempts.
//!
//! Both types provide helper methods `as_label` for log/metric labels.
//! [`TaskError`] has an additional method: `is_retryable()`.

use std::time::Duration;

use thiserror::Error;

/// # Errors produced by the pool facade.
///
/// These represent misuse of the pool surface, not task failures.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum PoolError {
    /// Submission was attempted after shutdown began.
    #[error("pool already released")]
    Released,

    /// Invalid construction arguments.
    #[error("invalid pool configuration: {reason}")]
    Config {
        /// What was wrong with the arguments.
        reason: String,
    },
}

impl PoolError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            PoolError::Released => "pool_released",
            PoolError::Config { .. } => "pool_config",
        }
    }
}

/// # Errors produced by task execution.
///
/// These represent failures of individual task attempts run by a worker.
/// Some errors are retryable (`Timeout`, `Panic`, `Fail`), the rest are
/// terminal on first sight.
///
/// # Example
/// ```
/// use taskpool::TaskError;
///
/// let e = TaskError::Fail { reason: "upstream 503".into() };
/// assert!(e.is_retryable());
/// assert_eq!(e.as_label(), "task_failed");
/// ```
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum TaskError {
    /// Task attempt exceeded its timeout duration.
    #[error("timed out after {timeout:?}")]
    Timeout { timeout: Duration },

    /// A panic escaped the task callable and was captured by the worker.
    #[error("task panicked: {reason}")]
    Panic { reason: String },

    /// Task execution failed but may succeed if retried.
    #[error("execution failed: {reason}")]
    Fail { reason: String },

    /// Task observed cancellation and terminated intentionally.
    ///
    /// This is **not an error** in the traditional sense, but signals
    /// intentional termination.
    #[error("context canceled")]
    Canceled,

    /// Task was abandoned in the queue by a forced release.
    #[error("pool released before execution")]
    Released,
}

impl TaskError {
    /// Returns a short stable label.
    pub fn as_label(&self) -> &'static str {
        match self {
            TaskError::Timeout { .. } => "task_timeout",
            TaskError::Panic { .. } => "task_panic",
            TaskError::Fail { .. } => "task_failed",
            TaskError::Canceled => "task_canceled",
            TaskError::Released => "task_released",
        }
    }

    /// Indicates whether the error consumes retry budget and may be retried.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            TaskError::Timeout { .. } | TaskError::Panic { .. } | TaskError::Fail { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn retryable_kinds() {
        assert!(TaskError::Timeout { timeout: Duration::from_secs(1) }.is_retryable());
        assert!(TaskError::Panic { reason: "boom".into() }.is_retryable());
        assert!(TaskError::Fail { reason: "nope".into() }.is_retryable());
        assert!(!TaskError::Canceled.is_retryable());
        assert!(!TaskError::Released.is_retryable());
    }

    #[test]
    fn labels_are_stable() {
        assert_eq!(PoolError::Released.as_label(), "pool_released");
        assert_eq!(
            PoolError::Config { reason: "max_workers must be >= 1".into() }.as_label(),
            "pool_config"
        );
        assert_eq!(TaskError::Canceled.as_label(), "task_canceled");
    }
}
