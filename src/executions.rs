//! Per-node execution views, one per consumption model.
//!
//! Every view exposes the nodes of the originating selection, in selection
//! order, so callers can zip identity with outcome deterministically.

use futures::stream::BoxStream;

use crate::error::Result;
use crate::node::NodeId;
use crate::pending::PendingResult;
use crate::types::Value;

/// The aggregator's model-specific return value — a closed set, matched
/// exhaustively wherever a model is handled.
pub enum ExecutionOutcome {
    /// All nodes already resolved; values available without blocking.
    Sync(SyncExecutions),
    /// Per-node in-flight handles; completion observed by the caller.
    Async(AsyncExecutions),
    /// Per-node lazy reply streams; work starts on subscription.
    Reactive(ReactiveExecutions),
}

impl ExecutionOutcome {
    /// The sync view, if this outcome is one.
    pub fn into_sync(self) -> Option<SyncExecutions> {
        match self {
            ExecutionOutcome::Sync(executions) => Some(executions),
            _ => None,
        }
    }

    /// The async view, if this outcome is one.
    pub fn into_async(self) -> Option<AsyncExecutions> {
        match self {
            ExecutionOutcome::Async(executions) => Some(executions),
            _ => None,
        }
    }

    /// The reactive view, if this outcome is one.
    pub fn into_reactive(self) -> Option<ReactiveExecutions> {
        match self {
            ExecutionOutcome::Reactive(executions) => Some(executions),
            _ => None,
        }
    }
}

/// Resolved per-node values of a completed synchronous fan-out.
pub struct SyncExecutions {
    entries: Vec<(NodeId, Value)>,
}

impl SyncExecutions {
    pub(crate) fn new(entries: Vec<(NodeId, Value)>) -> Self {
        Self { entries }
    }

    /// The value produced by `node`, if it was part of the selection.
    pub fn get(&self, node: &NodeId) -> Option<&Value> {
        self.entries
            .iter()
            .find(|(candidate, _)| candidate == node)
            .map(|(_, value)| value)
    }

    /// Node identities, in selection order.
    pub fn nodes(&self) -> Vec<NodeId> {
        self.entries.iter().map(|(node, _)| node.clone()).collect()
    }

    /// Iterate `(node, value)` pairs in selection order.
    pub fn iter(&self) -> impl Iterator<Item = &(NodeId, Value)> {
        self.entries.iter()
    }

    /// Number of per-node results.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if the selection was empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl IntoIterator for SyncExecutions {
    type Item = (NodeId, Value);
    type IntoIter = std::vec::IntoIter<(NodeId, Value)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

/// Per-node in-flight handles of an asynchronous fan-out.
///
/// Never blocks and never inspects completion state; failures surface only
/// when a caller awaits an individual node's handle.
pub struct AsyncExecutions {
    entries: Vec<(NodeId, PendingResult<Value>)>,
}

impl AsyncExecutions {
    pub(crate) fn new(entries: Vec<(NodeId, PendingResult<Value>)>) -> Self {
        Self { entries }
    }

    /// The in-flight handle for `node`, if it was part of the selection.
    pub fn get(&self, node: &NodeId) -> Option<&PendingResult<Value>> {
        self.entries
            .iter()
            .find(|(candidate, _)| candidate == node)
            .map(|(_, pending)| pending)
    }

    /// Node identities, in selection order.
    pub fn nodes(&self) -> Vec<NodeId> {
        self.entries.iter().map(|(node, _)| node.clone()).collect()
    }

    /// Iterate `(node, handle)` pairs in selection order.
    pub fn iter(&self) -> impl Iterator<Item = &(NodeId, PendingResult<Value>)> {
        self.entries.iter()
    }

    /// Number of per-node handles.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if the selection was empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl IntoIterator for AsyncExecutions {
    type Item = (NodeId, PendingResult<Value>);
    type IntoIter = std::vec::IntoIter<(NodeId, PendingResult<Value>)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

/// Per-node lazy reply streams of a reactive fan-out.
///
/// Each stream performs no work until polled; its cardinality matches the
/// command's declared reply shape.
pub struct ReactiveExecutions {
    entries: Vec<(NodeId, BoxStream<'static, Result<Value>>)>,
}

impl ReactiveExecutions {
    pub(crate) fn new(entries: Vec<(NodeId, BoxStream<'static, Result<Value>>)>) -> Self {
        Self { entries }
    }

    /// Remove and return the stream for `node`.
    pub fn take(&mut self, node: &NodeId) -> Option<BoxStream<'static, Result<Value>>> {
        let index = self
            .entries
            .iter()
            .position(|(candidate, _)| candidate == node)?;
        Some(self.entries.remove(index).1)
    }

    /// Node identities, in selection order.
    pub fn nodes(&self) -> Vec<NodeId> {
        self.entries.iter().map(|(node, _)| node.clone()).collect()
    }

    /// Number of per-node streams.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if the selection was empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl IntoIterator for ReactiveExecutions {
    type Item = (NodeId, BoxStream<'static, Result<Value>>);
    type IntoIter = std::vec::IntoIter<(NodeId, BoxStream<'static, Result<Value>>)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}
