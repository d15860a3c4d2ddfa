//! Node wrapper for the computation graph.
//!
//! All nodes live in a single flat `StableGraph`. Function boundaries are
//! represented via the `owner` field -- a function's nodes are those with
//! `owner == function_id`. Node names are unique within their owning
//! function and double as the serialization key.

use serde::{Deserialize, Serialize};

use crate::element::ElementType;
use crate::id::FunctionId;
use crate::ops::Op;

/// A single operation instance in the graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpNode {
    /// Name, unique within the owning function.
    pub name: String,
    /// The operation this node performs, with its attributes.
    pub op: Op,
    /// Element type of the value this node produces.
    pub element_type: ElementType,
    /// Which function owns this node.
    pub owner: FunctionId,
}

impl OpNode {
    /// Creates a new node.
    pub fn new(name: &str, op: Op, element_type: ElementType, owner: FunctionId) -> Self {
        OpNode {
            name: name.to_string(),
            op,
            element_type,
            owner,
        }
    }

    /// The wire tag of this node's operation.
    pub fn tag(&self) -> &'static str {
        self.op.tag()
    }

    /// `true` if this node is a function parameter.
    pub fn is_parameter(&self) -> bool {
        matches!(self.op, Op::Parameter { .. })
    }
}
