//! Serialization error types.
//!
//! [`SerialError`] is the closed taxonomy of ways a serialize or
//! deserialize call can fail. Every error is fatal to the call that
//! produced it; partially constructed graphs are discarded by the caller.
//! Diagnostics carry the offending function and/or node name.

use thiserror::Error;

use tensorgraph_core::FunctionId;

/// Errors produced by serializing or deserializing a graph document.
#[derive(Debug, Error)]
pub enum SerialError {
    /// Structural parse failure, missing required keys, or an otherwise
    /// unusable document.
    #[error("malformed document: {detail}")]
    MalformedDocument { detail: String },

    /// Op tag not in the taxonomy.
    #[error("unknown operation `{op}` (node `{node}` in function `{function}`)")]
    UnknownOperation {
        function: String,
        node: String,
        op: String,
    },

    /// An element-type quadruple matched no registered member.
    #[error(
        "unknown element type ({bitwidth}, real={is_real}, signed={is_signed}, \
         \"{c_type}\") in function `{function}`"
    )]
    UnknownElementType {
        function: String,
        bitwidth: u64,
        is_real: bool,
        is_signed: bool,
        c_type: String,
    },

    /// An op-specific attribute is missing or has the wrong shape, or the
    /// node's input count does not fit the operation's constructor.
    #[error("malformed node `{node}` in function `{function}`: {detail}")]
    MalformedNode {
        function: String,
        node: String,
        detail: String,
    },

    /// A node input names a node not defined earlier in the function.
    #[error("node `{node}` in function `{function}` references unknown input `{input}`")]
    DanglingReference {
        function: String,
        node: String,
        input: String,
    },

    /// A callee function was referenced before its definition.
    #[error(
        "node `{node}` in function `{function}` references function `{callee}` \
         before its definition"
    )]
    ForwardFunctionReference {
        function: String,
        node: String,
        callee: String,
    },

    /// The writer detected a cycle while linearizing a function body.
    #[error("cycle detected while linearizing function `{function}`")]
    GraphNotAcyclic { function: String },

    /// Two functions in the document share a name.
    #[error("duplicate function name `{name}`")]
    DuplicateFunctionName { name: String },

    /// Two nodes within one function share a name.
    #[error("duplicate node name `{node}` in function `{function}`")]
    DuplicateNodeName { function: String, node: String },

    /// The declared result does not name a node in the function.
    #[error("result `{node}` of function `{function}` not found in ops")]
    ResultNotFound { function: String, node: String },

    /// A declared parameter does not name a parameter node in the function.
    #[error("parameter `{node}` of function `{function}` not found in ops")]
    ParameterNotFound { function: String, node: String },

    /// The declared result view disagrees with the result node.
    #[error(
        "function `{function}` declares result {declared} but result node \
         `{node}` produces {actual}"
    )]
    ResultTypeMismatch {
        function: String,
        node: String,
        declared: String,
        actual: String,
    },

    /// Serializing an unregistered function ID.
    #[error("no function registered under id {id}")]
    FunctionNotFound { id: FunctionId },

    /// Serializing a function whose parameters and result were never wired.
    #[error("function `{function}` has no result node")]
    IncompleteFunction { function: String },

    /// An internal graph inconsistency surfaced during writing.
    #[error("invalid graph: {reason}")]
    InvalidGraph { reason: String },
}

impl From<serde_json::Error> for SerialError {
    fn from(err: serde_json::Error) -> Self {
        SerialError::MalformedDocument {
            detail: err.to_string(),
        }
    }
}
