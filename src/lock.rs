//! # Injected mutual-exclusion capability.
//!
//! The pool serializes mutations of its counters and roster through a
//! caller-supplied [`Lock`] rather than a concrete mutex type. Any
//! implementation that upholds mutual exclusion is acceptable; two are
//! provided:
//!
//! - [`MutexLock`], the default: a blocking lock built on
//!   `parking_lot`'s `Mutex` + `Condvar`.
//! - [`SpinLock`]: a busy-waiting lock for short critical sections on
//!   contended hot paths.
//!
//! Internally the pool only ever acquires through [`Guard`], so a panic
//! inside a critical section still releases the lock.
//!
//! # Example
//!
//! ```
//! use taskpool::{Lock, SpinLock};
//!
//! let lock = SpinLock::new();
//! lock.acquire();
//! // ...exclusive section...
//! lock.release();
//! ```

use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::{Condvar, Mutex};

/// # Two-operation mutual-exclusion capability.
///
/// [`acquire`](Lock::acquire) blocks until exclusive access is held;
/// [`release`](Lock::release) yields it. Implementations must be safe to
/// share across threads and must pair one `release` with each `acquire`.
pub trait Lock: Send + Sync + 'static {
    /// Blocks the caller until exclusive access is held.
    fn acquire(&self);

    /// Yields exclusive access. Must only be called by the current holder.
    fn release(&self);
}

/// Blocking lock backed by `parking_lot`.
///
/// Waiters park on a condition variable, so an uncontended
/// acquire/release pair stays cheap while contended waiters do not burn
/// CPU. `parking_lot` primitives do not poison, so a panicking holder
/// cannot wedge later acquisitions.
pub struct MutexLock {
    held: Mutex<bool>,
    available: Condvar,
}

impl MutexLock {
    /// Creates an unheld lock.
    pub fn new() -> Self {
        Self {
            held: Mutex::new(false),
            available: Condvar::new(),
        }
    }
}

impl Default for MutexLock {
    fn default() -> Self {
        Self::new()
    }
}

impl Lock for MutexLock {
    fn acquire(&self) {
        let mut held = self.held.lock();
        while *held {
            self.available.wait(&mut held);
        }
        *held = true;
    }

    fn release(&self) {
        let mut held = self.held.lock();
        *held = false;
        self.available.notify_one();
    }
}

/// Busy-waiting lock over a single atomic flag.
///
/// Suited to critical sections of a few instructions; a waiter spins with
/// [`std::hint::spin_loop`] instead of parking.
pub struct SpinLock {
    locked: AtomicBool,
}

impl SpinLock {
    /// Creates an unheld lock.
    pub fn new() -> Self {
        Self {
            locked: AtomicBool::new(false),
        }
    }
}

impl Default for SpinLock {
    fn default() -> Self {
        Self::new()
    }
}

impl Lock for SpinLock {
    fn acquire(&self) {
        loop {
            if self
                .locked
                .compare_exchange_weak(false, true, Ordering::Acquire, Ordering::Relaxed)
                .is_ok()
            {
                return;
            }
            while self.locked.load(Ordering::Relaxed) {
                std::hint::spin_loop();
            }
        }
    }

    fn release(&self) {
        self.locked.store(false, Ordering::Release);
    }
}

/// RAII wrapper: releases the lock when dropped, including on unwind.
pub(crate) struct Guard<'a, L: Lock>(&'a L);

impl<L: Lock> Drop for Guard<'_, L> {
    fn drop(&mut self) {
        self.0.release();
    }
}

/// Acquires `lock` and returns a [`Guard`] holding it.
pub(crate) fn guard<L: Lock>(lock: &L) -> Guard<'_, L> {
    lock.acquire();
    Guard(lock)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicU64;
    use std::sync::Arc;
    use std::thread;

    /// Split load/store increment: lost updates are guaranteed to show up
    /// unless the lock actually provides mutual exclusion.
    fn hammer<L: Lock>(lock: Arc<L>, counter: Arc<AtomicU64>) {
        let mut handles = vec![];
        for _ in 0..8 {
            let lock = Arc::clone(&lock);
            let counter = Arc::clone(&counter);
            handles.push(thread::spawn(move || {
                for _ in 0..1000 {
                    let _g = guard(lock.as_ref());
                    let n = counter.load(Ordering::Relaxed);
                    counter.store(n + 1, Ordering::Relaxed);
                }
            }));
        }
        for handle in handles {
            handle.join().unwrap();
        }
    }

    #[test]
    fn mutex_lock_serializes_increments() {
        let counter = Arc::new(AtomicU64::new(0));
        hammer(Arc::new(MutexLock::new()), Arc::clone(&counter));
        assert_eq!(counter.load(Ordering::Relaxed), 8 * 1000);
    }

    #[test]
    fn spin_lock_serializes_increments() {
        let counter = Arc::new(AtomicU64::new(0));
        hammer(Arc::new(SpinLock::new()), Arc::clone(&counter));
        assert_eq!(counter.load(Ordering::Relaxed), 8 * 1000);
    }

    #[test]
    fn guard_releases_on_panic() {
        let lock = Arc::new(MutexLock::new());
        let inner = Arc::clone(&lock);
        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(move || {
            let _g = guard(inner.as_ref());
            panic!("section panicked");
        }));
        assert!(result.is_err());

        // A panicking holder must not wedge the lock.
        lock.acquire();
        lock.release();
    }
}
