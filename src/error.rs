//! Error types for multi-node command execution.

use crate::node::NodeId;

/// Result type alias for cluster execution operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while fanning a command out to selected nodes.
///
/// `Clone` is deliberate: a single cause may live both in a node's
/// [`PendingResult`](crate::pending::PendingResult) and, attributed to that
/// node, inside an aggregated [`Error::ExecutionFailure`].
#[derive(Debug, Clone, thiserror::Error)]
pub enum Error {
    /// The invoked method matches neither the per-connection command
    /// surface nor the selection-level support surface.
    #[error("no method {name}/{arity} on the command or selection surface")]
    MethodNotFound {
        /// Invoked method name.
        name: String,
        /// Invoked argument count.
        arity: usize,
    },

    /// The time budget elapsed before every node reached a terminal state.
    #[error("command timed out{}", describe_nodes(.nodes, " for node(s): "))]
    Timeout {
        /// Nodes still pending when the budget expired, in selection order.
        nodes: Vec<NodeId>,
    },

    /// One or more nodes completed with an error within budget.
    #[error("{}", execution_failure_message(.nodes, .causes))]
    ExecutionFailure {
        /// Nodes whose operation failed, in selection order.
        nodes: Vec<NodeId>,
        /// The per-node causes, matching `nodes` positionally when
        /// aggregated (empty `nodes` means a single unattributed cause).
        causes: Vec<Error>,
    },

    /// The wait ended because the producing task vanished before
    /// completing its result.
    #[error("command wait interrupted")]
    Interrupted,

    /// Best-effort cancellation was issued after a single-operation
    /// timeout; the remote side may still have executed the command.
    #[error("command cancelled")]
    Cancelled,

    /// The server rejected the command (an execution error reply such as
    /// `WRONGTYPE`). Propagated unwrapped by the budget waiter.
    #[error("command execution error: {0}")]
    Command(String),

    /// The node's connection handle failed to resolve.
    #[error("connection failed: {0}")]
    Connection(String),

    /// Invalid invoker construction parameters.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Formats the affected-node subset as `"id (host:port), id (host:port)"`.
fn describe_nodes(nodes: &[NodeId], prefix: &str) -> String {
    if nodes.is_empty() {
        return String::new();
    }
    let joined = nodes
        .iter()
        .map(NodeId::to_string)
        .collect::<Vec<_>>()
        .join(", ");
    format!("{}{}", prefix, joined)
}

fn execution_failure_message(nodes: &[NodeId], causes: &[Error]) -> String {
    if nodes.is_empty() {
        // Single-operation wrap from the budget waiter.
        match causes.first() {
            Some(cause) => format!("command execution failed: {}", cause),
            None => "command execution failed".to_string(),
        }
    } else {
        format!(
            "multi-node command execution failed on node(s):{}",
            describe_nodes(nodes, " ")
        )
    }
}

impl Error {
    /// Returns `true` for the distinguished remote execution error kind
    /// that must be propagated without re-wrapping.
    pub fn is_command_error(&self) -> bool {
        matches!(self, Error::Command(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(id: &str, port: u16) -> NodeId {
        NodeId::with_addr(id, "127.0.0.1", port)
    }

    #[test]
    fn test_timeout_message_lists_nodes_in_order() {
        let err = Error::Timeout {
            nodes: vec![node("a", 7001), node("c", 7003)],
        };
        assert_eq!(
            err.to_string(),
            "command timed out for node(s): a (127.0.0.1:7001), c (127.0.0.1:7003)"
        );
    }

    #[test]
    fn test_timeout_message_without_nodes() {
        let err = Error::Timeout { nodes: vec![] };
        assert_eq!(err.to_string(), "command timed out");
    }

    #[test]
    fn test_execution_failure_message_names_nodes() {
        let err = Error::ExecutionFailure {
            nodes: vec![node("b", 7002)],
            causes: vec![Error::Command("WRONGTYPE".into())],
        };
        assert_eq!(
            err.to_string(),
            "multi-node command execution failed on node(s): b (127.0.0.1:7002)"
        );
    }

    #[test]
    fn test_single_cause_wrap_message() {
        let err = Error::ExecutionFailure {
            nodes: vec![],
            causes: vec![Error::Connection("refused".into())],
        };
        assert_eq!(
            err.to_string(),
            "command execution failed: connection failed: refused"
        );
    }

    #[test]
    fn test_command_error_recognition() {
        assert!(Error::Command("WRONGTYPE".into()).is_command_error());
        assert!(!Error::Cancelled.is_command_error());
    }
}
