//! Function definitions.
//!
//! [`FunctionDef`] is the function metadata -- the body lives as nodes
//! owned by this function's ID in the flat graph. A definition starts as a
//! signature shell (declared result view, no parameters or result wired);
//! [`Program::set_signature`](crate::graph::Program::set_signature) fills
//! in the parameter and result handles once the body has been built.

use serde::{Deserialize, Serialize};

use crate::element::ElementType;
use crate::id::{FunctionId, NodeId};
use crate::types::{Shape, ViewType};

/// A named, closed subgraph with declared parameters and a single result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionDef {
    /// Unique identity for this function.
    pub id: FunctionId,
    /// Function name, unique across the program.
    pub name: String,
    /// Declared element type of the result.
    pub result_type: ElementType,
    /// Declared shape of the result.
    pub result_shape: Shape,
    /// Parameter nodes in declaration order. Empty until the body is wired.
    pub params: Vec<NodeId>,
    /// The result node. `None` until the body is wired.
    pub result: Option<NodeId>,
}

impl FunctionDef {
    /// Creates a signature shell with no body wired yet.
    pub fn new(id: FunctionId, name: &str, result_type: ElementType, result_shape: Shape) -> Self {
        FunctionDef {
            id,
            name: name.to_string(),
            result_type,
            result_shape,
            params: Vec::new(),
            result: None,
        }
    }

    /// Number of parameters.
    pub fn arity(&self) -> usize {
        self.params.len()
    }

    /// The declared result view.
    pub fn result_view(&self) -> ViewType {
        ViewType::new(self.result_type, self.result_shape.clone())
    }
}
