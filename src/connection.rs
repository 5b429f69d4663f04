//! Connection capability views consumed by the fan-out executor.
//!
//! Physical connection establishment, reconnection, and wire-protocol
//! encoding live in the connection layer; this core only requires that a
//! resolved connection expose the two dispatch views below over the same
//! command surface. The blocking (sync) consumption model reuses the async
//! view and differs only in how results are awaited.

use bytes::Bytes;
use futures::future::BoxFuture;
use futures::stream::BoxStream;

use crate::error::Result;
use crate::types::Value;

/// Reply cardinality of a command, as declared in the method table.
///
/// Controls the expected shape of the reactive view's stream: `Single`
/// commands yield one item, `Multi` commands may yield many.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplyShape {
    /// Exactly one reply value (e.g. GET, SET).
    Single,
    /// Zero or more reply values (e.g. KEYS, SMEMBERS element streams).
    Multi,
}

/// One fully shaped command invocation, ready to send to a node.
#[derive(Debug, Clone)]
pub struct CommandCall {
    /// Command name (e.g. `"GET"`).
    pub name: &'static str,
    /// Encoded arguments, in order.
    pub args: Vec<Bytes>,
    /// Declared reply cardinality.
    pub reply: ReplyShape,
}

/// A resolved connection to a single cluster node.
///
/// Implementations are provided by the connection layer.
pub trait NodeConnection: Send + Sync + 'static {
    /// The future-returning command view.
    fn async_view(&self) -> &dyn AsyncCommands;

    /// The stream-returning command view.
    fn reactive_view(&self) -> &dyn ReactiveCommands;
}

/// Future-based command dispatch over one connection.
pub trait AsyncCommands: Send + Sync {
    /// Issue `call` and return a handle to its eventual reply.
    fn dispatch(&self, call: CommandCall) -> BoxFuture<'static, Result<Value>>;
}

/// Stream-based command dispatch over one connection.
///
/// Returned streams must be lazy: no work until first polled.
pub trait ReactiveCommands: Send + Sync {
    /// Issue `call` on subscription and stream its reply value(s).
    fn dispatch(&self, call: CommandCall) -> BoxStream<'static, Result<Value>>;
}
