//! Deadline-bounded blocking waits over pending results.
//!
//! These primitives park the calling thread, so they must be used from
//! outside the async runtime (the fan-out tasks keep running on it in the
//! background). [`await_all`] consumes one depleting wall-clock budget
//! across a list of operations; [`await_or_cancel`] waits on a single
//! operation and cancels it on timeout.

use std::time::{Duration, Instant};

use crate::error::{Error, Result};
use crate::pending::PendingResult;

/// Wait until `result` is terminal or `timeout` elapses.
///
/// On timeout, best-effort cancellation is requested (the remote effect is
/// not undone) and [`Error::Timeout`] is returned. A recognized command
/// execution error ([`Error::Command`]) is returned unwrapped; any other
/// failure cause is wrapped in [`Error::ExecutionFailure`]. A vanished
/// producer surfaces as [`Error::Interrupted`].
pub fn await_or_cancel<T: Clone>(result: &PendingResult<T>, timeout: Duration) -> Result<T> {
    if !result.wait_until(Instant::now() + timeout) {
        result.cancel();
        return Err(Error::Timeout { nodes: Vec::new() });
    }

    match result.outcome() {
        Some(Ok(value)) => Ok(value),
        Some(Err(cause)) if cause.is_command_error() => Err(cause),
        Some(Err(Error::Interrupted)) => Err(Error::Interrupted),
        Some(Err(cause)) => Err(Error::ExecutionFailure {
            nodes: Vec::new(),
            causes: vec![cause],
        }),
        // Terminal per wait_until, so unreachable in practice.
        None => Err(Error::Interrupted),
    }
}

/// Wait until every result is terminal, sharing one depleting `timeout`.
///
/// The waits are sequential polls in list order against work that is
/// already running concurrently; budget spent on one operation is gone for
/// the rest. Returns `false` the instant the budget is exhausted before
/// the next wait, without touching the remaining operations. Per-operation
/// failures are swallowed here and stay visible through each cell's own
/// state. Nothing is cancelled on timeout.
pub fn await_all<T>(timeout: Duration, results: &[&PendingResult<T>]) -> bool {
    let deadline = Instant::now() + timeout;

    for result in results {
        if Instant::now() >= deadline {
            return false;
        }
        if !result.wait_until(deadline) {
            return false;
        }
    }

    true
}
