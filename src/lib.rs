//! # ferrite-cluster — multi-node command execution for Ferrite
//!
//! The execution core of the Ferrite cluster client: take a caller-supplied
//! selection of cluster nodes, fan a single logical command out to every
//! selected node's connection concurrently, and present the per-node
//! outcomes under one of three consumption models.
//!
//! ## Features
//!
//! - **Three consumption models** — blocking ([`ExecutionModel::Sync`]),
//!   future-based ([`ExecutionModel::Async`]), and stream-based
//!   ([`ExecutionModel::Reactive`]), all fed by one dispatch path
//! - **Deterministic ordering** — every per-node view preserves the
//!   selection's node order, whatever the completion order
//! - **Time-budgeted blocking** — the sync model waits under one depleting
//!   wall-clock budget and reports exactly which nodes missed it
//! - **Partial-failure attribution** — failed nodes are named in the error,
//!   with each node's cause attached
//! - **Memoized method resolution** — invoked signatures resolve once per
//!   surface and are cached, hits and misses alike
//!
//! Connection establishment, wire encoding, topology discovery, and the
//! full per-command catalogs live in other layers; this crate consumes
//! connections through the capability views in [`connection`].
//!
//! ## Quick start (async)
//!
//! ```ignore
//! use ferrite_cluster::{commands, Invoked, NodeSelectionInvoker};
//!
//! let invoker = NodeSelectionInvoker::asynchronous(selection, tokio::runtime::Handle::current());
//! if let Invoked::Executions(outcome) = invoker.invoke(commands::get("user:1"))? {
//!     let executions = outcome.into_async().unwrap();
//!     for (node, handle) in executions {
//!         println!("{node}: {:?}", handle.resolved().await);
//!     }
//! }
//! ```
//!
//! ## Quick start (blocking)
//!
//! ```ignore
//! use std::time::Duration;
//! use ferrite_cluster::{commands, Invoked, NodeSelectionInvoker};
//!
//! // Must be called from outside the runtime; `handle` drives the fan-out.
//! let invoker = NodeSelectionInvoker::sync(selection, Duration::from_millis(200), handle)?;
//! if let Invoked::Executions(outcome) = invoker.invoke(commands::ping())? {
//!     for (node, value) in outcome.into_sync().unwrap() {
//!         println!("{node}: {value}");
//!     }
//! }
//! ```

pub mod commands;
pub mod connection;
pub mod error;
pub mod executions;
pub mod executor;
pub mod invoker;
pub mod node;
pub mod pending;
pub mod resolver;
pub mod types;
pub mod wait;

// ── Re-exports for ergonomic top-level usage ────────────────────────────────

pub use commands::{MethodCall, MethodSignature};
pub use connection::{AsyncCommands, CommandCall, NodeConnection, ReactiveCommands, ReplyShape};
pub use error::{Error, Result};
pub use executions::{AsyncExecutions, ExecutionOutcome, ReactiveExecutions, SyncExecutions};
pub use invoker::{ExecutionModel, Invoked, NodeSelectionInvoker};
pub use node::{ConnectionFuture, NodeId, NodeSelection};
pub use pending::{Completer, PendingResult};
pub use resolver::{MethodResolver, Resolution, SelectionReply};
pub use types::{ToArg, Value};
