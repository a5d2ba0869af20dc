use std::fmt;

use crate::task::TaskRef;

/// The two task shapes the pool dispatches.
///
/// Downstream callback delivery keys off the variant: only `Yielding`
/// successes reach the result callback. Fire-and-forget success means the
/// attempt finished without timeout, panic, or error.
pub(crate) enum TaskKind<T> {
    Fire(TaskRef<()>),
    Yielding(TaskRef<T>),
}

impl<T> TaskKind<T> {
    pub(crate) fn as_label(&self) -> &'static str {
        match self {
            TaskKind::Fire(_) => "fire",
            TaskKind::Yielding(_) => "yielding",
        }
    }
}

/// Internal record wrapping a submitted task with its retry state.
///
/// Created at submission, destroyed after a worker delivers the terminal
/// outcome to the configured callbacks and decrements the in-flight
/// counter. `attempts_left` counts the retries remaining after the
/// current attempt.
pub(crate) struct Envelope<T> {
    pub(crate) id: u64,
    pub(crate) kind: TaskKind<T>,
    pub(crate) attempts_left: u32,
}

impl<T> Envelope<T> {
    pub(crate) fn new(id: u64, kind: TaskKind<T>, retry_count: u32) -> Self {
        Self {
            id,
            kind,
            attempts_left: retry_count,
        }
    }
}

impl<T> fmt::Debug for Envelope<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Envelope")
            .field("id", &self.id)
            .field("kind", &self.kind.as_label())
            .field("attempts_left", &self.attempts_left)
            .finish()
    }
}
