//! The per-connection command method table and typed call builders.
//!
//! The command surface is a hand-written static dispatch table: the
//! resolver scans it once per signature and memoizes the hit (or its
//! absence). The builders shape a [`MethodCall`] the same way the
//! single-node client's command builders shape their argument vectors.

use bytes::Bytes;

use crate::connection::{CommandCall, ReplyShape};
use crate::types::ToArg;

/// An invoked method's signature: name plus argument count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MethodSignature {
    /// Method name as invoked on the capability surface.
    pub name: &'static str,
    /// Number of arguments.
    pub arity: usize,
}

impl MethodSignature {
    /// Shorthand constructor.
    pub const fn new(name: &'static str, arity: usize) -> Self {
        Self { name, arity }
    }
}

/// One entry of the per-connection command table.
#[derive(Debug)]
pub struct MethodDescriptor {
    /// Signature the resolver matches against.
    pub signature: MethodSignature,
    /// Wire command name sent to the node.
    pub command: &'static str,
    /// Declared reply cardinality.
    pub reply: ReplyShape,
}

impl MethodDescriptor {
    const fn new(
        name: &'static str,
        arity: usize,
        command: &'static str,
        reply: ReplyShape,
    ) -> Self {
        Self {
            signature: MethodSignature::new(name, arity),
            command,
            reply,
        }
    }

    /// Shape a dispatchable [`CommandCall`] from this descriptor and the
    /// invocation's arguments.
    pub fn call(&self, args: Vec<Bytes>) -> CommandCall {
        CommandCall {
            name: self.command,
            args,
            reply: self.reply,
        }
    }
}

/// The per-connection command interface scanned by the resolver.
///
/// Commands not yet covered here are the business of the full per-command
/// catalogs outside this crate.
pub static COMMAND_METHODS: &[MethodDescriptor] = &[
    MethodDescriptor::new("get", 1, "GET", ReplyShape::Single),
    MethodDescriptor::new("set", 2, "SET", ReplyShape::Single),
    MethodDescriptor::new("del", 1, "DEL", ReplyShape::Single),
    MethodDescriptor::new("exists", 1, "EXISTS", ReplyShape::Single),
    MethodDescriptor::new("incr", 1, "INCR", ReplyShape::Single),
    MethodDescriptor::new("ping", 0, "PING", ReplyShape::Single),
    MethodDescriptor::new("info", 0, "INFO", ReplyShape::Single),
    MethodDescriptor::new("dbsize", 0, "DBSIZE", ReplyShape::Single),
    MethodDescriptor::new("flushdb", 0, "FLUSHDB", ReplyShape::Single),
    MethodDescriptor::new("keys", 1, "KEYS", ReplyShape::Multi),
];

/// A surface invocation: which method, with which arguments.
#[derive(Debug, Clone)]
pub struct MethodCall {
    /// Invoked signature.
    pub signature: MethodSignature,
    /// Encoded arguments, in order.
    pub args: Vec<Bytes>,
}

impl MethodCall {
    /// Build a call for an arbitrary signature.
    pub fn new(signature: MethodSignature, args: Vec<Bytes>) -> Self {
        Self { signature, args }
    }
}

// ── Typed call builders ──────────────────────────────────────────────────────

/// GET key.
pub fn get(key: impl ToArg) -> MethodCall {
    MethodCall::new(MethodSignature::new("get", 1), vec![key.to_arg()])
}

/// SET key value.
pub fn set(key: impl ToArg, value: impl ToArg) -> MethodCall {
    MethodCall::new(
        MethodSignature::new("set", 2),
        vec![key.to_arg(), value.to_arg()],
    )
}

/// DEL key.
pub fn del(key: impl ToArg) -> MethodCall {
    MethodCall::new(MethodSignature::new("del", 1), vec![key.to_arg()])
}

/// EXISTS key.
pub fn exists(key: impl ToArg) -> MethodCall {
    MethodCall::new(MethodSignature::new("exists", 1), vec![key.to_arg()])
}

/// INCR key.
pub fn incr(key: impl ToArg) -> MethodCall {
    MethodCall::new(MethodSignature::new("incr", 1), vec![key.to_arg()])
}

/// PING.
pub fn ping() -> MethodCall {
    MethodCall::new(MethodSignature::new("ping", 0), Vec::new())
}

/// INFO.
pub fn info() -> MethodCall {
    MethodCall::new(MethodSignature::new("info", 0), Vec::new())
}

/// DBSIZE.
pub fn dbsize() -> MethodCall {
    MethodCall::new(MethodSignature::new("dbsize", 0), Vec::new())
}

/// FLUSHDB.
pub fn flushdb() -> MethodCall {
    MethodCall::new(MethodSignature::new("flushdb", 0), Vec::new())
}

/// KEYS pattern.
pub fn keys(pattern: impl ToArg) -> MethodCall {
    MethodCall::new(MethodSignature::new("keys", 1), vec![pattern.to_arg()])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_matches_table_entry() {
        let call = set("k", "v");
        let descriptor = COMMAND_METHODS
            .iter()
            .find(|m| m.signature == call.signature)
            .expect("set/2 in table");
        assert_eq!(descriptor.command, "SET");
        assert_eq!(descriptor.reply, ReplyShape::Single);

        let shaped = descriptor.call(call.args.clone());
        assert_eq!(shaped.name, "SET");
        assert_eq!(shaped.args.len(), 2);
    }

    #[test]
    fn test_signatures_are_unique() {
        for (i, a) in COMMAND_METHODS.iter().enumerate() {
            for b in &COMMAND_METHODS[i + 1..] {
                assert_ne!(a.signature, b.signature);
            }
        }
    }
}
