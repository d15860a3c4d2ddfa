//! Topological linearization of a function body.
//!
//! Kahn's algorithm over the nodes reachable from a function's result
//! (plus its declared parameters, which are serialized even when nothing
//! consumes them):
//!
//! 1. `pending[n]` = number of incoming argument edges (with multiplicity).
//! 2. Seed a FIFO queue with `pending == 0` nodes, in insertion order.
//! 3. Pop, append to the output, decrement each user once per connecting
//!    edge; users reaching zero are enqueued in insertion order.
//!
//! The output therefore places every node after all of its inputs, visits
//! each reachable node exactly once, and breaks ties by insertion order --
//! identical inputs always produce identical output. A cycle leaves nodes
//! that never reach `pending == 0`, which surfaces as
//! [`SerialError::GraphNotAcyclic`].

use std::collections::{HashMap, HashSet, VecDeque};

use petgraph::visit::EdgeRef;
use petgraph::Direction;

use tensorgraph_core::{FunctionId, NodeId, Program};

use crate::error::SerialError;

/// Returns a function's serializable nodes in dependency-respecting order.
pub(crate) fn linearize(
    program: &Program,
    function: FunctionId,
) -> Result<Vec<NodeId>, SerialError> {
    let def = program
        .function(function)
        .ok_or(SerialError::FunctionNotFound { id: function })?;
    let result = def.result.ok_or_else(|| SerialError::IncompleteFunction {
        function: def.name.clone(),
    })?;

    let graph = program.graph();

    // Reachable set: ancestors of the result, plus declared parameters.
    let mut reachable: HashSet<NodeId> = HashSet::new();
    let mut stack = vec![result];
    while let Some(id) = stack.pop() {
        if !reachable.insert(id) {
            continue;
        }
        for edge in graph.edges_directed(id.into(), Direction::Incoming) {
            stack.push(NodeId::from(edge.source()));
        }
    }
    reachable.extend(def.params.iter().copied());

    // Enumerate members in insertion order; NodeIds ascend with insertion.
    let mut members: Vec<NodeId> = reachable.iter().copied().collect();
    members.sort_by_key(|id| id.0);

    let mut pending: HashMap<NodeId, usize> = HashMap::with_capacity(members.len());
    for &id in &members {
        let count = graph
            .edges_directed(id.into(), Direction::Incoming)
            .filter(|edge| reachable.contains(&NodeId::from(edge.source())))
            .count();
        pending.insert(id, count);
    }

    let mut queue: VecDeque<NodeId> = members
        .iter()
        .copied()
        .filter(|id| pending[id] == 0)
        .collect();

    let mut order = Vec::with_capacity(members.len());
    while let Some(id) = queue.pop_front() {
        order.push(id);

        let mut ready: Vec<NodeId> = Vec::new();
        for edge in graph.edges_directed(id.into(), Direction::Outgoing) {
            let user = NodeId::from(edge.target());
            if let Some(count) = pending.get_mut(&user) {
                *count -= 1;
                if *count == 0 {
                    ready.push(user);
                }
            }
        }
        // Simultaneously released users enqueue in insertion order.
        ready.sort_by_key(|id| id.0);
        queue.extend(ready);
    }

    if order.len() != members.len() {
        return Err(SerialError::GraphNotAcyclic {
            function: def.name.clone(),
        });
    }

    Ok(order)
}
