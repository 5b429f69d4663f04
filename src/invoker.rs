//! The node selection's capability surface.
//!
//! A [`NodeSelectionInvoker`] is built once per selection with a fixed
//! execution model. Invoking a command resolves its dispatch target, fans
//! it out to every selected node, and aggregates the per-node outcomes the
//! way the model prescribes. Only the sync model ever blocks, and only
//! inside the budget waiter.

use std::time::Duration;

use tokio::runtime::Handle;
use tracing::debug;

use crate::commands::{MethodCall, MethodDescriptor, MethodSignature, COMMAND_METHODS};
use crate::error::{Error, Result};
use crate::executions::{AsyncExecutions, ExecutionOutcome, ReactiveExecutions, SyncExecutions};
use crate::executor::{self, PendingExecutions};
use crate::node::{NodeId, NodeSelection};
use crate::resolver::{self, MethodResolver, Resolution, SelectionReply};
use crate::wait;

/// How fan-out results are consumed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutionModel {
    /// Block the calling thread until all nodes resolve or the budget
    /// expires.
    Sync,
    /// Return per-node in-flight handles immediately.
    Async,
    /// Return per-node lazy reply streams immediately.
    Reactive,
}

/// Per-model execution state, fixed at construction.
enum ModelState {
    Sync { timeout: Duration, runtime: Handle },
    Async { runtime: Handle },
    Reactive,
}

impl ModelState {
    fn model(&self) -> ExecutionModel {
        match self {
            ModelState::Sync { .. } => ExecutionModel::Sync,
            ModelState::Async { .. } => ExecutionModel::Async,
            ModelState::Reactive => ExecutionModel::Reactive,
        }
    }
}

/// Result of one surface invocation.
pub enum Invoked {
    /// The reserved zero-argument `commands` accessor: the surface itself.
    Commands,
    /// A selection-level method, dispatched without fan-out.
    Selection(SelectionReply),
    /// A fanned-out command, aggregated per the execution model.
    Executions(ExecutionOutcome),
}

impl std::fmt::Debug for Invoked {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Invoked::Commands => f.write_str("Commands"),
            Invoked::Selection(reply) => f.debug_tuple("Selection").field(reply).finish(),
            Invoked::Executions(_) => f.debug_tuple("Executions").finish_non_exhaustive(),
        }
    }
}

/// Capability surface over one node selection.
pub struct NodeSelectionInvoker {
    selection: NodeSelection,
    resolver: MethodResolver,
    state: ModelState,
}

impl NodeSelectionInvoker {
    /// Build a blocking surface. `timeout` is the per-invocation budget
    /// and must be non-zero.
    ///
    /// Invocations park the calling thread, so they must happen outside
    /// the async runtime (`runtime` keeps driving the node tasks in the
    /// background).
    pub fn sync(selection: NodeSelection, timeout: Duration, runtime: Handle) -> Result<Self> {
        if timeout.is_zero() {
            return Err(Error::InvalidConfig(
                "timeout must be greater than zero when using sync mode".into(),
            ));
        }
        Ok(Self::with_state(
            selection,
            ModelState::Sync { timeout, runtime },
        ))
    }

    /// Build a future-returning surface.
    pub fn asynchronous(selection: NodeSelection, runtime: Handle) -> Self {
        Self::with_state(selection, ModelState::Async { runtime })
    }

    /// Build a stream-returning surface.
    pub fn reactive(selection: NodeSelection) -> Self {
        Self::with_state(selection, ModelState::Reactive)
    }

    fn with_state(selection: NodeSelection, state: ModelState) -> Self {
        Self {
            selection,
            resolver: MethodResolver::new(COMMAND_METHODS),
            state,
        }
    }

    /// The execution model fixed at construction.
    pub fn model(&self) -> ExecutionModel {
        self.state.model()
    }

    /// The underlying selection.
    pub fn selection(&self) -> &NodeSelection {
        &self.selection
    }

    /// The reserved identity accessor: the capability surface itself.
    pub fn commands(&self) -> &Self {
        self
    }

    /// Invoke a method on the capability surface.
    ///
    /// Command methods are fanned out to every selected node;
    /// selection-level methods dispatch against the selection itself;
    /// anything else fails with [`Error::MethodNotFound`].
    pub fn invoke(&self, call: MethodCall) -> Result<Invoked> {
        // Identity escape hatch, handled before any resolution.
        if call.signature == MethodSignature::new("commands", 0) {
            return Ok(Invoked::Commands);
        }

        match self.resolver.resolve(call.signature) {
            Resolution::Connection(descriptor) => self
                .execute(descriptor, &call)
                .map(Invoked::Executions),
            Resolution::Selection(method) => {
                resolver::dispatch_selection(method, &self.selection, &call.args)
                    .map(Invoked::Selection)
            }
            Resolution::Absent => Err(Error::MethodNotFound {
                name: call.signature.name.to_string(),
                arity: call.signature.arity,
            }),
        }
    }

    fn execute(
        &self,
        descriptor: &'static MethodDescriptor,
        call: &MethodCall,
    ) -> Result<ExecutionOutcome> {
        match &self.state {
            ModelState::Sync { timeout, runtime } => {
                let pendings = executor::dispatch(descriptor, &call.args, &self.selection, runtime);
                self.aggregate_sync(pendings, *timeout)
            }
            ModelState::Async { runtime } => {
                let pendings = executor::dispatch(descriptor, &call.args, &self.selection, runtime);
                Ok(ExecutionOutcome::Async(AsyncExecutions::new(pendings)))
            }
            ModelState::Reactive => {
                let streams = executor::dispatch_reactive(descriptor, &call.args, &self.selection);
                Ok(ExecutionOutcome::Reactive(ReactiveExecutions::new(streams)))
            }
        }
    }

    /// Sync aggregation: PENDING_ALL → (ALL_DONE | BUDGET_EXPIRED) →
    /// (SUCCESS | PARTIAL_FAILURE). Raises exactly one of Timeout or
    /// ExecutionFailure, never both.
    fn aggregate_sync(
        &self,
        pendings: PendingExecutions,
        timeout: Duration,
    ) -> Result<ExecutionOutcome> {
        let handles: Vec<_> = pendings.iter().map(|(_, pending)| pending).collect();

        if !wait::await_all(timeout, &handles) {
            let nodes = Self::pending_nodes(&pendings);
            debug!(nodes = ?nodes, "fan-out budget expired");
            return Err(Error::Timeout { nodes });
        }

        let (nodes, causes) = Self::failed_nodes(&pendings);
        if !nodes.is_empty() {
            debug!(nodes = ?nodes, "fan-out completed with failures");
            return Err(Error::ExecutionFailure { nodes, causes });
        }

        let mut values = Vec::with_capacity(pendings.len());
        for (node, pending) in pendings {
            match pending.value() {
                Some(value) => values.push((node, value)),
                None => return Err(Error::Interrupted),
            }
        }
        Ok(ExecutionOutcome::Sync(SyncExecutions::new(values)))
    }

    /// Nodes still PENDING at budget expiry, in selection order.
    fn pending_nodes(pendings: &PendingExecutions) -> Vec<NodeId> {
        pendings
            .iter()
            .filter(|(_, pending)| !pending.is_done())
            .map(|(node, _)| node.clone())
            .collect()
    }

    /// Nodes that completed exceptionally, in selection order, paired with
    /// their causes.
    fn failed_nodes(pendings: &PendingExecutions) -> (Vec<NodeId>, Vec<Error>) {
        let mut nodes = Vec::new();
        let mut causes = Vec::new();
        for (node, pending) in pendings {
            if let Some(cause) = pending.failure() {
                nodes.push(node.clone());
                causes.push(cause);
            }
        }
        (nodes, causes)
    }
}
