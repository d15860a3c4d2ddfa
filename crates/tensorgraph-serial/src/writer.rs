//! Function and node writers.
//!
//! [`write_function`] produces one [`FunctionRecord`] with its body in
//! linearized order; [`write_node`] encodes a node's common fields plus
//! the op-specific attributes. The attribute match is total over the op
//! vocabulary, so every representable node serializes.

use serde_json::{json, Map, Value};

use tensorgraph_core::{FunctionId, NodeId, Op, Program};

use crate::error::SerialError;
use crate::linearize::linearize;
use crate::record::{FunctionRecord, NodeRecord, TypeRecord};

/// Encodes one function, body linearized.
pub(crate) fn write_function(
    program: &Program,
    function: FunctionId,
) -> Result<FunctionRecord, SerialError> {
    let def = program
        .function(function)
        .ok_or(SerialError::FunctionNotFound { id: function })?;
    let result = def.result.ok_or_else(|| SerialError::IncompleteFunction {
        function: def.name.clone(),
    })?;

    let order = linearize(program, function)?;
    let ops = order
        .iter()
        .map(|&id| write_node(program, id))
        .collect::<Result<Vec<_>, _>>()?;

    let parameters = def
        .params
        .iter()
        .map(|&id| node_name(program, id))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(FunctionRecord {
        name: def.name.clone(),
        result_type: TypeRecord::from(def.result_type),
        result_shape: def.result_shape.to_vec(),
        parameters,
        result: vec![node_name(program, result)?],
        ops,
    })
}

/// Encodes one node: common fields plus the per-operation attributes.
pub(crate) fn write_node(program: &Program, id: NodeId) -> Result<NodeRecord, SerialError> {
    let node = program.node(id).ok_or_else(|| SerialError::InvalidGraph {
        reason: format!("node {} not found", id),
    })?;

    let inputs = program
        .inputs(id)
        .into_iter()
        .map(|input| node_name(program, input))
        .collect::<Result<Vec<_>, _>>()?;

    let mut attrs = Map::new();
    match &node.op {
        Op::Unary { .. } | Op::Binary { .. } | Op::Select | Op::Tuple => {}
        Op::Broadcast { shape, axes } => {
            attrs.insert("shape".into(), json!(shape));
            attrs.insert("axes".into(), json!(axes));
        }
        Op::Concat { axis } => {
            attrs.insert("axis".into(), json!(axis));
        }
        Op::Constant { shape, values } => {
            attrs.insert("shape".into(), json!(shape));
            attrs.insert("value".into(), json!(values));
        }
        Op::Convert { target_type } => {
            attrs.insert("target_type".into(), json!(TypeRecord::from(*target_type)));
        }
        Op::FunctionCall { function } => {
            attrs.insert("function".into(), Value::String(callee_name(program, *function)?));
        }
        Op::Parameter { shape } => {
            attrs.insert("shape".into(), json!(shape));
        }
        Op::Reduce {
            function,
            reduction_axes,
        } => {
            attrs.insert("function".into(), Value::String(callee_name(program, *function)?));
            attrs.insert("reduction_axes".into(), json!(reduction_axes));
        }
        Op::Reshape {
            input_order,
            output_shape,
        } => {
            attrs.insert("input_order".into(), json!(input_order));
            attrs.insert("output_shape".into(), json!(output_shape));
        }
        Op::Slice {
            lower_bounds,
            upper_bounds,
            strides,
        } => {
            attrs.insert("lower_bounds".into(), json!(lower_bounds));
            attrs.insert("upper_bounds".into(), json!(upper_bounds));
            attrs.insert("strides".into(), json!(strides));
        }
        Op::Sum { reduction_axes } => {
            attrs.insert("reduction_axes".into(), json!(reduction_axes));
        }
    }

    Ok(NodeRecord {
        name: node.name.clone(),
        op: node.tag().to_string(),
        element_type: TypeRecord::from(node.element_type),
        inputs,
        outputs: vec![node.name.clone()],
        attrs,
    })
}

fn node_name(program: &Program, id: NodeId) -> Result<String, SerialError> {
    program
        .node(id)
        .map(|node| node.name.clone())
        .ok_or_else(|| SerialError::InvalidGraph {
            reason: format!("node {} not found", id),
        })
}

fn callee_name(program: &Program, id: FunctionId) -> Result<String, SerialError> {
    program
        .function(id)
        .map(|def| def.name.clone())
        .ok_or_else(|| SerialError::InvalidGraph {
            reason: format!("callee FunctionId({}) not registered", id),
        })
}
