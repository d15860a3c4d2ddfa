//! Graph-construction errors.
//!
//! [`CoreError`] is the `thiserror` enum returned by the
//! [`Program`](crate::graph::Program) builder methods. Each variant names
//! the invariant that was violated while adding functions, nodes, or
//! edges.

use thiserror::Error;

use crate::id::{FunctionId, NodeId};
use crate::ops::Arity;

/// Errors produced while building a program graph.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Registering a function under a name the program already uses.
    #[error("duplicate function name: `{name}`")]
    DuplicateFunctionName { name: String },

    /// Adding a node whose name is already taken within its owning
    /// function.
    #[error("duplicate node name `{name}` in function `{function}`")]
    DuplicateNodeName { function: String, name: String },

    /// The given handle does not refer to a registered function.
    #[error("no function registered under id {id}")]
    FunctionNotFound { id: FunctionId },

    /// The given handle does not refer to a node in the graph.
    #[error("no node in the graph under id {id}")]
    NodeNotFound { id: NodeId },

    /// An operation was given the wrong number of inputs.
    #[error("op `{op}` expects {expected} inputs, found {found}")]
    ArityMismatch {
        op: &'static str,
        expected: Arity,
        found: usize,
    },

    /// An argument edge would cross a function boundary or otherwise
    /// violate the graph's structure.
    #[error("edge rejected: {reason}")]
    InvalidEdge { reason: String },
}
