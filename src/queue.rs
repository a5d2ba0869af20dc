//! # FIFO handoff between producers and workers.
//!
//! [`TaskQueue`] is a thin wrapper around an unbounded [`flume`] MPMC
//! channel. Producers push without blocking; every worker holds its own
//! receiver clone and suspends on it while idle.
//!
//! [`TaskQueue::close`] drops the sender: queued envelopes keep draining
//! to workers, and once the buffer is empty receivers observe a
//! disconnect. That disconnect is the pool's graceful-drain signal, so
//! the queue needs no separate stop flag.
//!
//! Dispatch discipline lives entirely in this module; a different queue
//! (e.g. priority-ordered) would slot in behind the same surface.

use parking_lot::Mutex;

use crate::envelope::Envelope;

pub(crate) struct TaskQueue<T> {
    tx: Mutex<Option<flume::Sender<Envelope<T>>>>,
    rx: flume::Receiver<Envelope<T>>,
}

impl<T> TaskQueue<T> {
    pub(crate) fn unbounded() -> Self {
        let (tx, rx) = flume::unbounded();
        Self {
            tx: Mutex::new(Some(tx)),
            rx,
        }
    }

    /// Enqueues an envelope. Returns it back if the queue is closed.
    pub(crate) fn push(&self, envelope: Envelope<T>) -> Result<(), Envelope<T>> {
        match self.tx.lock().as_ref() {
            Some(tx) => tx.send(envelope).map_err(|flume::SendError(e)| e),
            None => Err(envelope),
        }
    }

    /// A receiver clone for one worker.
    pub(crate) fn receiver(&self) -> flume::Receiver<Envelope<T>> {
        self.rx.clone()
    }

    /// Pops a queued envelope without waiting. Used by forced release to
    /// drain abandoned work.
    pub(crate) fn try_pop(&self) -> Option<Envelope<T>> {
        self.rx.try_recv().ok()
    }

    /// Stops accepting new envelopes; already-queued ones still drain.
    pub(crate) fn close(&self) {
        self.tx.lock().take();
    }

    pub(crate) fn len(&self) -> usize {
        self.rx.len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.rx.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::envelope::TaskKind;
    use crate::task::TaskFn;

    fn envelope(id: u64) -> Envelope<()> {
        Envelope::new(id, TaskKind::Fire(TaskFn::arc(|_ctx| async { Ok(()) })), 0)
    }

    #[test]
    fn push_pop_is_fifo() {
        let queue: TaskQueue<()> = TaskQueue::unbounded();
        for id in 0..4 {
            queue.push(envelope(id)).unwrap();
        }
        assert_eq!(queue.len(), 4);
        for id in 0..4 {
            assert_eq!(queue.try_pop().unwrap().id, id);
        }
        assert!(queue.is_empty());
    }

    #[test]
    fn close_rejects_push_but_drains() {
        let queue: TaskQueue<()> = TaskQueue::unbounded();
        queue.push(envelope(1)).unwrap();
        queue.close();

        assert!(queue.push(envelope(2)).is_err());
        assert_eq!(queue.try_pop().unwrap().id, 1);
        assert!(queue.try_pop().is_none());
    }

    #[tokio::test]
    async fn receiver_disconnects_after_close_and_drain() {
        let queue: TaskQueue<()> = TaskQueue::unbounded();
        let rx = queue.receiver();

        queue.push(envelope(7)).unwrap();
        queue.close();

        assert_eq!(rx.recv_async().await.unwrap().id, 7);
        assert!(rx.recv_async().await.is_err());
    }
}
