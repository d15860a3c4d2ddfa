//! Identifier newtypes for nodes and functions.
//!
//! A [`NodeId`] is the stable handle to one operation node in the flat
//! graph; it wraps the `u32` index of the underlying petgraph slot, and
//! conversions to/from `NodeIndex<u32>` are provided for traversal code.
//! A [`FunctionId`] identifies a registered function. Wrapping both in
//! distinct newtypes keeps a node handle from ever standing in for a
//! function handle (or vice versa) at compile time.
//!
//! `Display` prints the bare index; diagnostics that need more context
//! (node or function names) attach it themselves.

use std::fmt;

use petgraph::graph::NodeIndex;
use serde::{Deserialize, Serialize};

/// Handle to an operation node in the graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NodeId(pub u32);

/// Handle to a registered function.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FunctionId(pub u32);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for FunctionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// NodeId <-> NodeIndex<u32> bridge for petgraph traversals.

impl From<NodeIndex<u32>> for NodeId {
    fn from(idx: NodeIndex<u32>) -> Self {
        NodeId(idx.index() as u32)
    }
}

impl From<NodeId> for NodeIndex<u32> {
    fn from(id: NodeId) -> Self {
        NodeIndex::new(id.0 as usize)
    }
}
