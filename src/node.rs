//! Node identity and node selection types.
//!
//! A [`NodeSelection`] is supplied by the topology layer: an ordered list of
//! cluster nodes, each paired with a connection handle that may still be
//! resolving. This core treats the selection as read-only and preserves its
//! order in every per-node view it produces.

use std::fmt;
use std::sync::Arc;

use futures::future::{BoxFuture, FutureExt, Shared};

use crate::connection::NodeConnection;
use crate::error::Result;

/// A connection handle that resolves asynchronously.
///
/// `Shared` so that many invocations can chain onto the same in-flight
/// connection establishment.
pub type ConnectionFuture = Shared<BoxFuture<'static, Result<Arc<dyn NodeConnection>>>>;

/// Identity of a cluster node, used only for diagnostics and error text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeId {
    id: String,
    addr: Option<(String, u16)>,
}

impl NodeId {
    /// Create a node identity without a known network address.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            addr: None,
        }
    }

    /// Create a node identity with host and port.
    pub fn with_addr(id: impl Into<String>, host: impl Into<String>, port: u16) -> Self {
        Self {
            id: id.into(),
            addr: Some((host.into(), port)),
        }
    }

    /// The opaque node id.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// The node's network address, if known.
    pub fn addr(&self) -> Option<(&str, u16)> {
        self.addr.as_ref().map(|(h, p)| (h.as_str(), *p))
    }
}

impl fmt::Display for NodeId {
    /// Renders the diagnostic descriptor `"id (host:port)"`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.addr {
            Some((host, port)) => write!(f, "{} ({}:{})", self.id, host, port),
            None => write!(f, "{} ()", self.id),
        }
    }
}

/// An ordered mapping from node identity to its connection handle.
///
/// Owned by the topology/connection layer; order is significant and is
/// preserved by every execution view derived from it.
#[derive(Clone, Default)]
pub struct NodeSelection {
    entries: Vec<(NodeId, ConnectionFuture)>,
}

impl NodeSelection {
    /// Create an empty selection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a node with a still-resolving connection handle.
    pub fn push(&mut self, node: NodeId, connection: ConnectionFuture) {
        self.entries.push((node, connection));
    }

    /// Append a node whose connection is already established.
    pub fn push_ready(&mut self, node: NodeId, connection: Arc<dyn NodeConnection>) {
        let fut: BoxFuture<'static, Result<Arc<dyn NodeConnection>>> =
            futures::future::ready(Ok(connection)).boxed();
        self.entries.push((node, fut.shared()));
    }

    /// Number of nodes in the selection.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if no nodes are selected.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The node identity at `index`, if in range.
    pub fn node(&self, index: usize) -> Option<&NodeId> {
        self.entries.get(index).map(|(node, _)| node)
    }

    /// All node identities, in selection order.
    pub fn nodes(&self) -> Vec<NodeId> {
        self.entries.iter().map(|(node, _)| node.clone()).collect()
    }

    /// Iterate `(NodeId, ConnectionFuture)` pairs in selection order.
    pub fn iter(&self) -> impl Iterator<Item = &(NodeId, ConnectionFuture)> {
        self.entries.iter()
    }
}

impl fmt::Debug for NodeSelection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.entries.iter().map(|(node, _)| node))
            .finish()
    }
}
