//! Shared test utilities for ferrite-cluster integration tests.
//!
//! Import via `mod common;` in integration test files:
//! ```rust,ignore
//! mod common;
//! use common::*;
//! ```

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use futures::future::{BoxFuture, FutureExt};
use futures::stream::BoxStream;
use futures::StreamExt;

use ferrite_cluster::connection::{AsyncCommands, CommandCall, NodeConnection, ReactiveCommands};
use ferrite_cluster::error::{Error, Result};
use ferrite_cluster::node::{NodeId, NodeSelection};
use ferrite_cluster::types::Value;

// ============================================================================
// Mock connection
// ============================================================================

/// Scripted behavior for one mock node connection.
#[derive(Debug, Clone)]
#[allow(dead_code)]
pub enum Behavior {
    /// Reply immediately with a value.
    Value(Value),
    /// Reply with a value after a delay.
    ValueAfter(Value, Duration),
    /// Fail immediately with a cause.
    Fail(Error),
    /// Fail with a cause after a delay.
    FailAfter(Error, Duration),
    /// Stream these items in order (reactive view).
    Stream(Vec<Result<Value>>),
}

/// A scriptable in-memory node connection.
///
/// Counts dispatches so tests can assert when work actually started.
pub struct MockConnection {
    behavior: Behavior,
    dispatches: AtomicUsize,
}

#[allow(dead_code)]
impl MockConnection {
    pub fn new(behavior: Behavior) -> Arc<Self> {
        Arc::new(Self {
            behavior,
            dispatches: AtomicUsize::new(0),
        })
    }

    /// How many times either view has been asked to dispatch.
    pub fn dispatch_count(&self) -> usize {
        self.dispatches.load(Ordering::SeqCst)
    }
}

impl NodeConnection for MockConnection {
    fn async_view(&self) -> &dyn AsyncCommands {
        self
    }

    fn reactive_view(&self) -> &dyn ReactiveCommands {
        self
    }
}

impl AsyncCommands for MockConnection {
    fn dispatch(&self, _call: CommandCall) -> BoxFuture<'static, Result<Value>> {
        self.dispatches.fetch_add(1, Ordering::SeqCst);
        let behavior = self.behavior.clone();
        async move {
            match behavior {
                Behavior::Value(value) => Ok(value),
                Behavior::ValueAfter(value, delay) => {
                    tokio::time::sleep(delay).await;
                    Ok(value)
                }
                Behavior::Fail(cause) => Err(cause),
                Behavior::FailAfter(cause, delay) => {
                    tokio::time::sleep(delay).await;
                    Err(cause)
                }
                Behavior::Stream(items) => items
                    .into_iter()
                    .next()
                    .unwrap_or(Ok(Value::Nil)),
            }
        }
        .boxed()
    }
}

impl ReactiveCommands for MockConnection {
    fn dispatch(&self, _call: CommandCall) -> BoxStream<'static, Result<Value>> {
        self.dispatches.fetch_add(1, Ordering::SeqCst);
        let behavior = self.behavior.clone();
        match behavior {
            Behavior::Stream(items) => futures::stream::iter(items).boxed(),
            Behavior::Value(value) => futures::stream::iter([Ok(value)]).boxed(),
            Behavior::ValueAfter(value, delay) => futures::stream::once(async move {
                tokio::time::sleep(delay).await;
                Ok(value)
            })
            .boxed(),
            Behavior::Fail(cause) => futures::stream::iter([Err(cause)]).boxed(),
            Behavior::FailAfter(cause, delay) => futures::stream::once(async move {
                tokio::time::sleep(delay).await;
                Err(cause)
            })
            .boxed(),
        }
    }
}

// ============================================================================
// Selection helpers
// ============================================================================

/// A node identity with a loopback address and a port derived from its id.
#[allow(dead_code)]
pub fn node(id: &str, port: u16) -> NodeId {
    NodeId::with_addr(id, "127.0.0.1", port)
}

/// Add a node whose connection is already established.
#[allow(dead_code)]
pub fn add_ready(
    selection: &mut NodeSelection,
    id: NodeId,
    behavior: Behavior,
) -> Arc<MockConnection> {
    let conn = MockConnection::new(behavior);
    selection.push_ready(id, conn.clone());
    conn
}

/// Add a node whose connection never becomes ready.
#[allow(dead_code)]
pub fn add_never_ready(selection: &mut NodeSelection, id: NodeId) {
    let fut: BoxFuture<'static, Result<Arc<dyn NodeConnection>>> =
        futures::future::pending().boxed();
    selection.push(id, fut.shared());
}

/// Add a node whose connection handle fails to resolve.
#[allow(dead_code)]
pub fn add_failing_connection(selection: &mut NodeSelection, id: NodeId, message: &str) {
    let cause = Error::Connection(message.to_string());
    let fut: BoxFuture<'static, Result<Arc<dyn NodeConnection>>> =
        futures::future::ready(Err(cause)).boxed();
    selection.push(id, fut.shared());
}

/// A status value, as servers reply to SET/PING.
#[allow(dead_code)]
pub fn ok() -> Value {
    Value::Status("OK".to_string())
}

/// A bulk string value.
#[allow(dead_code)]
pub fn string(s: &str) -> Value {
    Value::String(Bytes::copy_from_slice(s.as_bytes()))
}
