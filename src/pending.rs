//! Single-assignment result cells for in-flight node operations.
//!
//! Each node of a fan-out gets exactly one [`PendingResult`], written once
//! by that node's own task through a [`Completer`] and observed by exactly
//! one aggregator. The cell supports both thread-blocking waits (sync
//! aggregation) and async waits (async aggregation) over the same state.

use std::sync::Arc;
use std::time::Instant;

use parking_lot::{Condvar, Mutex};
use tokio::sync::Notify;
use tokio::task::AbortHandle;

use crate::error::{Error, Result};

/// Terminal-or-not state of one node operation.
#[derive(Debug)]
enum State<T> {
    Pending,
    Completed(T),
    Failed(Error),
}

struct Inner<T> {
    state: Mutex<State<T>>,
    cond: Condvar,
    notify: Notify,
    abort: Mutex<Option<AbortHandle>>,
}

impl<T> Inner<T> {
    /// First write wins; later writes are ignored.
    fn settle(&self, state: State<T>) {
        {
            let mut guard = self.state.lock();
            if !matches!(*guard, State::Pending) {
                return;
            }
            *guard = state;
        }
        self.cond.notify_all();
        self.notify.notify_waiters();
    }
}

/// The read side of a node operation's result cell.
///
/// Transitions PENDING → COMPLETED(value) or PENDING → FAILED(cause),
/// exactly once.
pub struct PendingResult<T> {
    inner: Arc<Inner<T>>,
}

/// The write side: completes its cell at most once. Dropping a `Completer`
/// without writing marks the cell failed with [`Error::Interrupted`] so
/// waiters never hang on a vanished producer.
pub struct Completer<T> {
    inner: Option<Arc<Inner<T>>>,
}

impl<T> PendingResult<T> {
    /// Create a fresh pending cell and its completer.
    pub fn new() -> (PendingResult<T>, Completer<T>) {
        let inner = Arc::new(Inner {
            state: Mutex::new(State::Pending),
            cond: Condvar::new(),
            notify: Notify::new(),
            abort: Mutex::new(None),
        });
        (
            PendingResult {
                inner: Arc::clone(&inner),
            },
            Completer { inner: Some(inner) },
        )
    }

    /// Returns `true` once the cell is terminal (completed or failed).
    pub fn is_done(&self) -> bool {
        !matches!(*self.inner.state.lock(), State::Pending)
    }

    /// Returns `true` if the cell is terminal with a failure.
    pub fn is_failed(&self) -> bool {
        matches!(*self.inner.state.lock(), State::Failed(_))
    }

    /// The failure cause, if the cell is FAILED.
    pub fn failure(&self) -> Option<Error> {
        match &*self.inner.state.lock() {
            State::Failed(err) => Some(err.clone()),
            _ => None,
        }
    }

    /// Attach the dispatched task's abort handle for best-effort
    /// cancellation.
    pub(crate) fn attach_abort(&self, handle: AbortHandle) {
        *self.inner.abort.lock() = Some(handle);
    }

    /// Request best-effort cancellation: marks the cell FAILED(Cancelled)
    /// if still pending and aborts the dispatched task. The remote effect
    /// is not undone.
    pub fn cancel(&self) {
        self.inner.settle(State::Failed(Error::Cancelled));
        if let Some(handle) = self.inner.abort.lock().take() {
            handle.abort();
        }
    }

    /// Block the calling thread until the cell is terminal or `deadline`
    /// passes. Returns `true` if terminal.
    pub(crate) fn wait_until(&self, deadline: Instant) -> bool {
        let mut guard = self.inner.state.lock();
        while matches!(*guard, State::Pending) {
            if self.inner.cond.wait_until(&mut guard, deadline).timed_out() {
                return !matches!(*guard, State::Pending);
            }
        }
        true
    }
}

impl<T: Clone> PendingResult<T> {
    /// The completed value, if the cell is COMPLETED.
    pub fn value(&self) -> Option<T> {
        match &*self.inner.state.lock() {
            State::Completed(value) => Some(value.clone()),
            _ => None,
        }
    }

    /// The terminal outcome, if any.
    pub fn outcome(&self) -> Option<Result<T>> {
        match &*self.inner.state.lock() {
            State::Pending => None,
            State::Completed(value) => Some(Ok(value.clone())),
            State::Failed(err) => Some(Err(err.clone())),
        }
    }

    /// Await the terminal outcome without blocking the thread.
    pub async fn resolved(&self) -> Result<T> {
        loop {
            let notified = self.inner.notify.notified();
            if let Some(outcome) = self.outcome() {
                return outcome;
            }
            notified.await;
        }
    }
}

impl<T> Completer<T> {
    /// Complete the cell with a value.
    pub fn complete(mut self, value: T) {
        if let Some(inner) = self.inner.take() {
            inner.settle(State::Completed(value));
        }
    }

    /// Complete the cell with a failure cause.
    pub fn fail(mut self, cause: Error) {
        if let Some(inner) = self.inner.take() {
            inner.settle(State::Failed(cause));
        }
    }
}

impl<T> Drop for Completer<T> {
    fn drop(&mut self) {
        if let Some(inner) = self.inner.take() {
            inner.settle(State::Failed(Error::Interrupted));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_complete_then_read() {
        let (pending, completer) = PendingResult::new();
        assert!(!pending.is_done());

        completer.complete(7u32);
        assert!(pending.is_done());
        assert!(!pending.is_failed());
        assert_eq!(pending.value(), Some(7));
    }

    #[test]
    fn test_first_write_wins() {
        let (pending, completer) = PendingResult::new();
        completer.complete(1u32);
        pending.cancel();
        assert_eq!(pending.value(), Some(1));
    }

    #[test]
    fn test_dropped_completer_marks_interrupted() {
        let (pending, completer) = PendingResult::<u32>::new();
        drop(completer);
        assert!(matches!(pending.failure(), Some(Error::Interrupted)));
    }

    #[test]
    fn test_cancel_pending_cell() {
        let (pending, _completer) = PendingResult::<u32>::new();
        pending.cancel();
        assert!(matches!(pending.failure(), Some(Error::Cancelled)));
    }

    #[test]
    fn test_wait_until_observes_completion_from_other_thread() {
        let (pending, completer) = PendingResult::new();
        let writer = std::thread::spawn(move || {
            std::thread::sleep(Duration::from_millis(20));
            completer.complete("done");
        });

        assert!(pending.wait_until(Instant::now() + Duration::from_secs(2)));
        assert_eq!(pending.value(), Some("done"));
        writer.join().unwrap();
    }

    #[test]
    fn test_wait_until_times_out_while_pending() {
        let (pending, _completer) = PendingResult::<u32>::new();
        assert!(!pending.wait_until(Instant::now() + Duration::from_millis(20)));
    }

    #[tokio::test]
    async fn test_resolved_wakes_async_waiter() {
        let (pending, completer) = PendingResult::new();
        let waiter = {
            let pending = PendingResult {
                inner: Arc::clone(&pending.inner),
            };
            tokio::spawn(async move { pending.resolved().await })
        };

        tokio::time::sleep(Duration::from_millis(10)).await;
        completer.complete(42u32);
        assert_eq!(waiter.await.unwrap().unwrap(), 42);
    }
}
