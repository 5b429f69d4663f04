//! Fan-out dispatch of one resolved command to every selected node.
//!
//! For the future-consuming models (sync and async) each node gets its own
//! tokio task, chained onto that node's shared connection future: once the
//! connection resolves, the command is issued through the async view and
//! the node's [`PendingResult`] is settled. Connection or dispatch failures
//! settle the cell FAILED; nothing is ever thrown back at the dispatch
//! caller. The dispatch loop itself never awaits, so no node waits on
//! another.
//!
//! The reactive model spawns nothing: Rust streams are lazy, so the
//! per-node stream resolves its connection and subscribes to the reactive
//! view only once first polled.

use bytes::Bytes;
use futures::stream::BoxStream;
use futures::{StreamExt, TryFutureExt};
use tokio::runtime::Handle;
use tracing::{debug, trace};

use crate::commands::MethodDescriptor;
use crate::error::Result;
use crate::node::{NodeId, NodeSelection};
use crate::pending::PendingResult;
use crate::types::Value;

/// Order-preserving per-node pending results of one fan-out.
pub type PendingExecutions = Vec<(NodeId, PendingResult<Value>)>;

/// Order-preserving per-node reply streams of one reactive fan-out.
pub type PendingStreams = Vec<(NodeId, BoxStream<'static, Result<Value>>)>;

/// Issue `descriptor` with `args` on every node's async view, one task per
/// node, and return the per-node pending results in selection order.
pub fn dispatch(
    descriptor: &'static MethodDescriptor,
    args: &[Bytes],
    selection: &NodeSelection,
    runtime: &Handle,
) -> PendingExecutions {
    debug!(
        command = descriptor.command,
        nodes = selection.len(),
        "fanning out command"
    );

    let mut executions = Vec::with_capacity(selection.len());
    for (node, connection) in selection.iter() {
        let call = descriptor.call(args.to_vec());
        let (pending, completer) = PendingResult::new();
        let connection = connection.clone();
        let node_id = node.clone();

        let task = runtime.spawn(async move {
            match connection.await {
                Ok(conn) => match conn.async_view().dispatch(call).await {
                    Ok(value) => {
                        trace!(node = %node_id, "node completed");
                        completer.complete(value);
                    }
                    Err(cause) => {
                        trace!(node = %node_id, %cause, "node failed");
                        completer.fail(cause);
                    }
                },
                Err(cause) => {
                    trace!(node = %node_id, %cause, "connection failed");
                    completer.fail(cause);
                }
            }
        });
        pending.attach_abort(task.abort_handle());

        executions.push((node.clone(), pending));
    }
    executions
}

/// Build the per-node lazy reply streams for a reactive fan-out, in
/// selection order. No work happens until a stream is polled.
pub fn dispatch_reactive(
    descriptor: &'static MethodDescriptor,
    args: &[Bytes],
    selection: &NodeSelection,
) -> PendingStreams {
    debug!(
        command = descriptor.command,
        nodes = selection.len(),
        "building reactive fan-out"
    );

    selection
        .iter()
        .map(|(node, connection)| {
            let call = descriptor.call(args.to_vec());
            let connection = connection.clone();
            let stream = connection
                .map_ok(move |conn| conn.reactive_view().dispatch(call))
                .try_flatten_stream()
                .boxed();
            (node.clone(), stream)
        })
        .collect()
}
