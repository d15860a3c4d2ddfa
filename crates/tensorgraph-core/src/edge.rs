//! Argument edges for the computation graph.
//!
//! Every edge is a data dependency from a producing node to a consuming
//! node. The `position` field gives the edge's place in the consumer's
//! ordered argument list; a node consuming the same value twice gets two
//! parallel edges with distinct positions.

use serde::{Deserialize, Serialize};

/// A data dependency carrying the argument position at the consumer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArgEdge {
    /// Index into the consuming node's argument list.
    pub position: u32,
}

impl ArgEdge {
    pub fn new(position: u32) -> Self {
        ArgEdge { position }
    }
}
