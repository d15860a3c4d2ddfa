//! Program: the graph container.
//!
//! [`Program`] is the single entry point for constructing and querying
//! computation graphs. All nodes live in one flat `StableGraph`; function
//! boundaries are logical (each node records its owning function). All
//! mutations go through `Program` methods, which enforce the structural
//! invariants the serializer depends on:
//!
//! - function names are unique across the program;
//! - node names are unique within their owning function;
//! - every argument edge stays inside one function (cross-function
//!   references go through `FunctionCall`/`Reduce` attributes, not edges);
//! - an operation receives exactly the inputs its constructor accepts.
//!
//! Nodes are shared by handle: a node consumed by many users exists once
//! and is referenced by [`NodeId`]. The graph of argument edges is acyclic
//! by construction, since an edge can only point at an already-existing
//! node.

use std::collections::HashMap;

use indexmap::IndexMap;
use petgraph::graph::NodeIndex;
use petgraph::stable_graph::StableGraph;
use petgraph::visit::EdgeRef;
use petgraph::{Directed, Direction};
use serde::{Deserialize, Serialize};

use crate::edge::ArgEdge;
use crate::element::ElementType;
use crate::error::CoreError;
use crate::function::FunctionDef;
use crate::id::{FunctionId, NodeId};
use crate::node::OpNode;
use crate::ops::Op;
use crate::types::Shape;

/// The graph container: nodes, argument edges, and function registry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Program {
    /// Flat node graph with ordered argument edges.
    graph: StableGraph<OpNode, ArgEdge, Directed, u32>,
    /// Function definitions in registration order.
    functions: IndexMap<FunctionId, FunctionDef>,
    /// Program-wide function name index.
    function_names: HashMap<String, FunctionId>,
    /// Per-function node name indexes.
    node_names: HashMap<FunctionId, HashMap<String, NodeId>>,
    /// Next function ID counter.
    next_function_id: u32,
}

impl Program {
    /// Creates an empty program.
    pub fn new() -> Self {
        Program {
            graph: StableGraph::new(),
            functions: IndexMap::new(),
            function_names: HashMap::new(),
            node_names: HashMap::new(),
            next_function_id: 0,
        }
    }

    // -----------------------------------------------------------------------
    // Function methods
    // -----------------------------------------------------------------------

    /// Registers a function shell with its declared result view.
    ///
    /// The body is added afterwards with [`add_op`](Self::add_op) and wired
    /// up with [`set_signature`](Self::set_signature).
    pub fn add_function(
        &mut self,
        name: &str,
        result_type: ElementType,
        result_shape: Shape,
    ) -> Result<FunctionId, CoreError> {
        if self.function_names.contains_key(name) {
            return Err(CoreError::DuplicateFunctionName {
                name: name.to_string(),
            });
        }

        let id = FunctionId(self.next_function_id);
        self.next_function_id += 1;

        self.functions
            .insert(id, FunctionDef::new(id, name, result_type, result_shape));
        self.function_names.insert(name.to_string(), id);
        Ok(id)
    }

    /// Wires a function's parameter and result handles.
    ///
    /// Parameters must be `Parameter` nodes owned by the function; the
    /// result must be owned by the function.
    pub fn set_signature(
        &mut self,
        function: FunctionId,
        params: Vec<NodeId>,
        result: NodeId,
    ) -> Result<(), CoreError> {
        if !self.functions.contains_key(&function) {
            return Err(CoreError::FunctionNotFound { id: function });
        }

        for &param in &params {
            let node = self
                .node(param)
                .ok_or(CoreError::NodeNotFound { id: param })?;
            if node.owner != function {
                return Err(CoreError::InvalidEdge {
                    reason: format!("parameter `{}` belongs to another function", node.name),
                });
            }
            if !node.is_parameter() {
                return Err(CoreError::InvalidEdge {
                    reason: format!("node `{}` is not a Parameter", node.name),
                });
            }
        }

        let result_node = self
            .node(result)
            .ok_or(CoreError::NodeNotFound { id: result })?;
        if result_node.owner != function {
            return Err(CoreError::InvalidEdge {
                reason: format!("result `{}` belongs to another function", result_node.name),
            });
        }

        match self.functions.get_mut(&function) {
            Some(def) => {
                def.params = params;
                def.result = Some(result);
                Ok(())
            }
            None => Err(CoreError::FunctionNotFound { id: function }),
        }
    }

    /// Looks up a function definition by ID.
    pub fn function(&self, id: FunctionId) -> Option<&FunctionDef> {
        self.functions.get(&id)
    }

    /// Looks up a function ID by name.
    pub fn function_by_name(&self, name: &str) -> Option<FunctionId> {
        self.function_names.get(name).copied()
    }

    /// All function definitions, in registration order.
    pub fn functions(&self) -> &IndexMap<FunctionId, FunctionDef> {
        &self.functions
    }

    // -----------------------------------------------------------------------
    // Node methods
    // -----------------------------------------------------------------------

    /// Adds an operation node to a function's body.
    ///
    /// Enforces name uniqueness within the function, the operation's input
    /// arity, and that every input is an existing node of the same
    /// function. Argument edges record input order; passing the same node
    /// twice yields two parallel edges.
    pub fn add_op(
        &mut self,
        owner: FunctionId,
        name: &str,
        op: Op,
        element_type: ElementType,
        inputs: &[NodeId],
    ) -> Result<NodeId, CoreError> {
        let function_name = match self.functions.get(&owner) {
            Some(def) => def.name.clone(),
            None => return Err(CoreError::FunctionNotFound { id: owner }),
        };

        if self
            .node_names
            .get(&owner)
            .is_some_and(|names| names.contains_key(name))
        {
            return Err(CoreError::DuplicateNodeName {
                function: function_name,
                name: name.to_string(),
            });
        }

        if !op.arity().accepts(inputs.len()) {
            return Err(CoreError::ArityMismatch {
                op: op.tag(),
                expected: op.arity(),
                found: inputs.len(),
            });
        }

        for &input in inputs {
            let idx: NodeIndex<u32> = input.into();
            match self.graph.node_weight(idx) {
                None => return Err(CoreError::NodeNotFound { id: input }),
                Some(node) if node.owner != owner => {
                    return Err(CoreError::InvalidEdge {
                        reason: format!(
                            "input `{}` belongs to another function than `{}`",
                            node.name, function_name
                        ),
                    });
                }
                Some(_) => {}
            }
        }

        let idx = self
            .graph
            .add_node(OpNode::new(name, op, element_type, owner));
        let id = NodeId::from(idx);

        for (position, &input) in inputs.iter().enumerate() {
            self.graph
                .add_edge(input.into(), idx, ArgEdge::new(position as u32));
        }

        self.node_names
            .entry(owner)
            .or_default()
            .insert(name.to_string(), id);
        Ok(id)
    }

    /// Looks up a node by ID.
    pub fn node(&self, id: NodeId) -> Option<&OpNode> {
        let idx: NodeIndex<u32> = id.into();
        self.graph.node_weight(idx)
    }

    /// Resolves a node name within a function.
    pub fn resolve(&self, function: FunctionId, name: &str) -> Option<NodeId> {
        self.node_names.get(&function)?.get(name).copied()
    }

    /// A node's inputs in argument order (with duplicates preserved).
    pub fn inputs(&self, id: NodeId) -> Vec<NodeId> {
        let idx: NodeIndex<u32> = id.into();
        let mut args: Vec<(u32, NodeId)> = self
            .graph
            .edges_directed(idx, Direction::Incoming)
            .map(|edge| (edge.weight().position, NodeId::from(edge.source())))
            .collect();
        args.sort_by_key(|(position, _)| *position);
        args.into_iter().map(|(_, id)| id).collect()
    }

    // -----------------------------------------------------------------------
    // Query methods
    // -----------------------------------------------------------------------

    /// Read-only access to the underlying graph.
    pub fn graph(&self) -> &StableGraph<OpNode, ArgEdge, Directed, u32> {
        &self.graph
    }

    /// All node IDs owned by a function, in insertion order.
    pub fn function_nodes(&self, id: FunctionId) -> Vec<NodeId> {
        self.graph
            .node_indices()
            .filter(|&idx| {
                self.graph
                    .node_weight(idx)
                    .is_some_and(|node| node.owner == id)
            })
            .map(NodeId::from)
            .collect()
    }

    /// Number of nodes in the graph.
    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Number of argument edges in the graph.
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Number of registered functions.
    pub fn function_count(&self) -> usize {
        self.functions.len()
    }
}

impl Default for Program {
    fn default() -> Self {
        Self::new()
    }
}
