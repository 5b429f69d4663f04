//! Memoized resolution of invoked methods to their dispatch target.
//!
//! A signature resolves to a per-connection command method (fanned out to
//! every node), to a selection-level support method (dispatched against the
//! selection itself), or to nothing. All three outcomes are cached so
//! repeated invocations never rescan the tables; concurrent fills for the
//! same key are idempotent, so the map's own consistency is enough.

use std::sync::atomic::{AtomicUsize, Ordering};

use bytes::Bytes;
use dashmap::DashMap;
use tracing::debug;

use crate::commands::{MethodDescriptor, MethodSignature};
use crate::error::{Error, Result};
use crate::node::{NodeId, NodeSelection};

/// Selection-level support methods, dispatched without fan-out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionMethod {
    /// `size()` — number of selected nodes.
    Size,
    /// `node(index)` — identity of the node at an index.
    Node,
    /// `nodes()` — all selected node identities, in order.
    Nodes,
}

/// The selection-level support surface.
static SELECTION_METHODS: &[(MethodSignature, SelectionMethod)] = &[
    (MethodSignature::new("size", 0), SelectionMethod::Size),
    (MethodSignature::new("node", 1), SelectionMethod::Node),
    (MethodSignature::new("nodes", 0), SelectionMethod::Nodes),
];

/// Reply of a selection-level method.
#[derive(Debug, Clone, PartialEq)]
pub enum SelectionReply {
    /// Result of `size()`.
    Size(usize),
    /// Result of `node(index)`; `None` when the index is out of range.
    Node(Option<NodeId>),
    /// Result of `nodes()`.
    Nodes(Vec<NodeId>),
}

/// A resolved dispatch target, as stored in the cache.
///
/// `Absent` is an explicit cache value, so misses also stop rescanning.
#[derive(Debug, Clone, Copy)]
pub enum Resolution {
    /// Fan the call out through the per-connection command surface.
    Connection(&'static MethodDescriptor),
    /// Dispatch against the selection itself.
    Selection(SelectionMethod),
    /// No matching method on either surface.
    Absent,
}

/// Signature-to-target resolver with a publish-once-per-key cache.
pub struct MethodResolver {
    commands: &'static [MethodDescriptor],
    cache: DashMap<MethodSignature, Resolution>,
    scans: AtomicUsize,
}

impl MethodResolver {
    /// Create a resolver over the given per-connection command table.
    pub fn new(commands: &'static [MethodDescriptor]) -> Self {
        Self {
            commands,
            cache: DashMap::new(),
            scans: AtomicUsize::new(0),
        }
    }

    /// Resolve `signature`, consulting the cache first.
    pub fn resolve(&self, signature: MethodSignature) -> Resolution {
        if let Some(cached) = self.cache.get(&signature) {
            return *cached;
        }

        self.scans.fetch_add(1, Ordering::Relaxed);
        let resolution = self.scan(signature);
        debug!(
            name = signature.name,
            arity = signature.arity,
            ?resolution,
            "resolved method"
        );
        self.cache.insert(signature, resolution);
        resolution
    }

    fn scan(&self, signature: MethodSignature) -> Resolution {
        if let Some(descriptor) = self.commands.iter().find(|m| m.signature == signature) {
            return Resolution::Connection(descriptor);
        }

        if let Some((_, method)) = SELECTION_METHODS
            .iter()
            .find(|(candidate, _)| *candidate == signature)
        {
            return Resolution::Selection(*method);
        }

        Resolution::Absent
    }

    /// Number of full table scans performed so far (diagnostics).
    pub fn scan_count(&self) -> usize {
        self.scans.load(Ordering::Relaxed)
    }
}

/// Dispatch a selection-level method directly against the selection.
pub fn dispatch_selection(
    method: SelectionMethod,
    selection: &NodeSelection,
    args: &[Bytes],
) -> Result<SelectionReply> {
    match method {
        SelectionMethod::Size => Ok(SelectionReply::Size(selection.len())),
        SelectionMethod::Nodes => Ok(SelectionReply::Nodes(selection.nodes())),
        SelectionMethod::Node => {
            let index = parse_index(args.first())?;
            Ok(SelectionReply::Node(selection.node(index).cloned()))
        }
    }
}

fn parse_index(arg: Option<&Bytes>) -> Result<usize> {
    let arg = arg.ok_or_else(|| Error::InvalidConfig("node(index) requires an index".into()))?;
    std::str::from_utf8(arg)
        .ok()
        .and_then(|s| s.parse().ok())
        .ok_or_else(|| Error::InvalidConfig("node index must be an unsigned integer".into()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::COMMAND_METHODS;
    use crate::types::ToArg;

    #[test]
    fn test_resolves_connection_method_and_caches() {
        let resolver = MethodResolver::new(COMMAND_METHODS);
        let signature = MethodSignature::new("get", 1);

        for _ in 0..5 {
            match resolver.resolve(signature) {
                Resolution::Connection(descriptor) => assert_eq!(descriptor.command, "GET"),
                other => panic!("expected connection method, got {other:?}"),
            }
        }
        assert_eq!(resolver.scan_count(), 1);
    }

    #[test]
    fn test_resolves_selection_method() {
        let resolver = MethodResolver::new(COMMAND_METHODS);
        match resolver.resolve(MethodSignature::new("size", 0)) {
            Resolution::Selection(SelectionMethod::Size) => {}
            other => panic!("expected selection method, got {other:?}"),
        }
    }

    #[test]
    fn test_absent_outcome_is_cached_too() {
        let resolver = MethodResolver::new(COMMAND_METHODS);
        let signature = MethodSignature::new("no_such_method", 3);

        for _ in 0..5 {
            assert!(matches!(resolver.resolve(signature), Resolution::Absent));
        }
        assert_eq!(resolver.scan_count(), 1);
    }

    #[test]
    fn test_arity_is_part_of_the_signature() {
        let resolver = MethodResolver::new(COMMAND_METHODS);
        assert!(matches!(
            resolver.resolve(MethodSignature::new("get", 2)),
            Resolution::Absent
        ));
        assert!(matches!(
            resolver.resolve(MethodSignature::new("get", 1)),
            Resolution::Connection(_)
        ));
    }

    #[test]
    fn test_selection_dispatch() {
        use crate::connection::NodeConnection;
        use futures::future::{BoxFuture, FutureExt};
        use std::sync::Arc;

        let mut selection = NodeSelection::new();
        let (a, b) = (NodeId::new("a"), NodeId::new("b"));
        for node in [&a, &b] {
            let fut: BoxFuture<'static, Result<Arc<dyn NodeConnection>>> =
                futures::future::pending().boxed();
            selection.push(node.clone(), fut.shared());
        }

        assert_eq!(
            dispatch_selection(SelectionMethod::Size, &selection, &[]).unwrap(),
            SelectionReply::Size(2)
        );
        assert_eq!(
            dispatch_selection(SelectionMethod::Node, &selection, &[1usize.to_arg()]).unwrap(),
            SelectionReply::Node(Some(b.clone()))
        );
        assert_eq!(
            dispatch_selection(SelectionMethod::Node, &selection, &[9usize.to_arg()]).unwrap(),
            SelectionReply::Node(None)
        );
        assert_eq!(
            dispatch_selection(SelectionMethod::Nodes, &selection, &[]).unwrap(),
            SelectionReply::Nodes(vec![a, b])
        );
    }

    #[test]
    fn test_node_index_must_parse() {
        let selection = NodeSelection::new();
        let err = dispatch_selection(
            SelectionMethod::Node,
            &selection,
            &[Bytes::from_static(b"not-a-number")],
        )
        .unwrap_err();
        assert!(matches!(err, Error::InvalidConfig(_)));
    }
}
