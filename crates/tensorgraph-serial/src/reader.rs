//! Function and node readers.
//!
//! [`read_function`] consumes one [`FunctionRecord`] in a single forward
//! pass: every node entry resolves its inputs against the names already
//! defined in the function, so definition-before-use is enforced by
//! construction. Callee references resolve against the map of functions
//! that have been *completed* earlier in the document; a function cannot
//! reference itself mid-definition.

use std::collections::HashMap;

use serde::de::DeserializeOwned;

use tensorgraph_core::{
    AxisSet, BinaryOp, CoreError, ElementType, FunctionId, NodeId, Op, Program, Shape, UnaryOp,
    ViewType,
};

use crate::error::SerialError;
use crate::record::{FunctionRecord, NodeRecord, TypeRecord};

/// Reads one function into the program and returns its ID.
///
/// `completed` is the document-wide registry of fully defined functions;
/// the new function registers itself there on success.
pub(crate) fn read_function(
    program: &mut Program,
    record: &FunctionRecord,
    completed: &mut HashMap<String, FunctionId>,
) -> Result<FunctionId, SerialError> {
    let result_type = intern_type(&record.result_type, &record.name)?;

    let function = program
        .add_function(
            &record.name,
            result_type,
            Shape::from_vec(record.result_shape.clone()),
        )
        .map_err(|err| match err {
            CoreError::DuplicateFunctionName { name } => {
                SerialError::DuplicateFunctionName { name }
            }
            other => SerialError::InvalidGraph {
                reason: other.to_string(),
            },
        })?;

    // Function-local name map, threaded through the node pass.
    let mut nodes: HashMap<String, NodeId> = HashMap::with_capacity(record.ops.len());
    for node_record in &record.ops {
        read_node(program, function, record, node_record, &mut nodes, completed)?;
    }

    let mut params = Vec::with_capacity(record.parameters.len());
    for name in &record.parameters {
        let id = *nodes
            .get(name)
            .ok_or_else(|| SerialError::ParameterNotFound {
                function: record.name.clone(),
                node: name.clone(),
            })?;
        if !expect_node(program, id)?.is_parameter() {
            return Err(SerialError::ParameterNotFound {
                function: record.name.clone(),
                node: name.clone(),
            });
        }
        params.push(id);
    }

    if record.result.len() != 1 {
        return Err(SerialError::MalformedDocument {
            detail: format!(
                "function `{}`: result must name exactly one node, found {}",
                record.name,
                record.result.len()
            ),
        });
    }
    let result_name = &record.result[0];
    let result = *nodes
        .get(result_name)
        .ok_or_else(|| SerialError::ResultNotFound {
            function: record.name.clone(),
            node: result_name.clone(),
        })?;

    check_result_type(program, record, result_type, result)?;

    program
        .set_signature(function, params, result)
        .map_err(|err| SerialError::InvalidGraph {
            reason: err.to_string(),
        })?;

    completed.insert(record.name.clone(), function);
    Ok(function)
}

/// Compares the declared result view against what the result node
/// produces: element types always, shapes when the node's op determines
/// one from its attributes.
fn check_result_type(
    program: &Program,
    record: &FunctionRecord,
    declared_type: ElementType,
    result: NodeId,
) -> Result<(), SerialError> {
    let node = expect_node(program, result)?;
    let shape_disagrees = node
        .op
        .determined_shape()
        .is_some_and(|shape| shape.as_slice() != record.result_shape.as_slice());

    if node.element_type != declared_type || shape_disagrees {
        let declared = ViewType::new(
            declared_type,
            Shape::from_vec(record.result_shape.clone()),
        );
        let actual = match node.op.determined_shape() {
            Some(shape) => ViewType::new(node.element_type, shape.clone()).to_string(),
            None => node.element_type.to_string(),
        };
        return Err(SerialError::ResultTypeMismatch {
            function: record.name.clone(),
            node: node.name.clone(),
            declared: declared.to_string(),
            actual,
        });
    }
    Ok(())
}

/// Reads one node entry: resolve inputs, intern the element type, decode
/// the op, and construct it in the graph.
fn read_node(
    program: &mut Program,
    function: FunctionId,
    function_record: &FunctionRecord,
    record: &NodeRecord,
    nodes: &mut HashMap<String, NodeId>,
    completed: &HashMap<String, FunctionId>,
) -> Result<(), SerialError> {
    let function_name = &function_record.name;

    if nodes.contains_key(&record.name) {
        return Err(SerialError::DuplicateNodeName {
            function: function_name.clone(),
            node: record.name.clone(),
        });
    }

    let element_type = intern_type(&record.element_type, function_name)?;

    let mut inputs = Vec::with_capacity(record.inputs.len());
    for input in &record.inputs {
        match nodes.get(input) {
            Some(&id) => inputs.push(id),
            None => {
                return Err(SerialError::DanglingReference {
                    function: function_name.clone(),
                    node: record.name.clone(),
                    input: input.clone(),
                })
            }
        }
    }

    let op = decode_op(record, function_name, completed)?;

    if !op.arity().accepts(inputs.len()) {
        return Err(SerialError::MalformedNode {
            function: function_name.clone(),
            node: record.name.clone(),
            detail: format!(
                "op `{}` expects {} inputs, found {}",
                op.tag(),
                op.arity(),
                inputs.len()
            ),
        });
    }

    let id = program
        .add_op(function, &record.name, op, element_type, &inputs)
        .map_err(|err| SerialError::MalformedNode {
            function: function_name.clone(),
            node: record.name.clone(),
            detail: err.to_string(),
        })?;
    nodes.insert(record.name.clone(), id);
    Ok(())
}

/// Selects the operation constructor for a node entry and decodes its
/// attributes.
fn decode_op(
    record: &NodeRecord,
    function_name: &str,
    completed: &HashMap<String, FunctionId>,
) -> Result<Op, SerialError> {
    let tag = record.op.as_str();

    if let Some(op) = UnaryOp::from_tag(tag) {
        return Ok(Op::Unary { op });
    }
    if let Some(op) = BinaryOp::from_tag(tag) {
        return Ok(Op::Binary { op });
    }

    let op = match tag {
        "Select" => Op::Select,
        "Tuple" => Op::Tuple,
        "Broadcast" => Op::Broadcast {
            shape: attr_shape(record, "shape", function_name)?,
            axes: attr_as::<AxisSet>(record, "axes", function_name)?,
        },
        "Concat" => Op::Concat {
            axis: attr_as::<usize>(record, "axis", function_name)?,
        },
        "Constant" => Op::Constant {
            shape: attr_shape(record, "shape", function_name)?,
            values: attr_as::<Vec<String>>(record, "value", function_name)?,
        },
        "Convert" => Op::Convert {
            target_type: intern_type(
                &attr_as::<TypeRecord>(record, "target_type", function_name)?,
                function_name,
            )?,
        },
        "FunctionCall" => Op::FunctionCall {
            function: resolve_callee(record, "function", function_name, completed)?,
        },
        "Parameter" => Op::Parameter {
            shape: attr_shape(record, "shape", function_name)?,
        },
        "Reduce" => Op::Reduce {
            function: resolve_callee(record, "function", function_name, completed)?,
            reduction_axes: attr_as::<AxisSet>(record, "reduction_axes", function_name)?,
        },
        "Reshape" => Op::Reshape {
            input_order: attr_as::<Vec<usize>>(record, "input_order", function_name)?,
            output_shape: attr_shape(record, "output_shape", function_name)?,
        },
        "Slice" => Op::Slice {
            lower_bounds: attr_as::<Vec<usize>>(record, "lower_bounds", function_name)?,
            upper_bounds: attr_as::<Vec<usize>>(record, "upper_bounds", function_name)?,
            strides: attr_as::<Vec<usize>>(record, "strides", function_name)?,
        },
        "Sum" => Op::Sum {
            reduction_axes: attr_as::<AxisSet>(record, "reduction_axes", function_name)?,
        },
        other => {
            return Err(SerialError::UnknownOperation {
                function: function_name.to_string(),
                node: record.name.clone(),
                op: other.to_string(),
            })
        }
    };
    Ok(op)
}

// ---------------------------------------------------------------------------
// Attribute decoding helpers
// ---------------------------------------------------------------------------

/// Decodes one op-specific attribute into a typed value.
fn attr_as<T: DeserializeOwned>(
    record: &NodeRecord,
    key: &str,
    function_name: &str,
) -> Result<T, SerialError> {
    let value = record
        .attrs
        .get(key)
        .ok_or_else(|| SerialError::MalformedNode {
            function: function_name.to_string(),
            node: record.name.clone(),
            detail: format!("missing attribute `{}`", key),
        })?;
    serde_json::from_value(value.clone()).map_err(|err| SerialError::MalformedNode {
        function: function_name.to_string(),
        node: record.name.clone(),
        detail: format!("attribute `{}`: {}", key, err),
    })
}

fn attr_shape(
    record: &NodeRecord,
    key: &str,
    function_name: &str,
) -> Result<Shape, SerialError> {
    attr_as::<Vec<usize>>(record, key, function_name).map(Shape::from_vec)
}

/// Resolves a callee name against the functions already completed in this
/// document.
fn resolve_callee(
    record: &NodeRecord,
    key: &str,
    function_name: &str,
    completed: &HashMap<String, FunctionId>,
) -> Result<FunctionId, SerialError> {
    let callee = attr_as::<String>(record, key, function_name)?;
    completed
        .get(&callee)
        .copied()
        .ok_or_else(|| SerialError::ForwardFunctionReference {
            function: function_name.to_string(),
            node: record.name.clone(),
            callee,
        })
}

/// Interns an element-type quadruple, failing on unknown members.
fn intern_type(record: &TypeRecord, function_name: &str) -> Result<ElementType, SerialError> {
    record
        .canonical()
        .ok_or_else(|| SerialError::UnknownElementType {
            function: function_name.to_string(),
            bitwidth: record.bitwidth,
            is_real: record.is_real,
            is_signed: record.is_signed,
            c_type: record.c_type_string.clone(),
        })
}

fn expect_node<'a>(
    program: &'a Program,
    id: NodeId,
) -> Result<&'a tensorgraph_core::OpNode, SerialError> {
    program.node(id).ok_or_else(|| SerialError::InvalidGraph {
        reason: format!("node {} not found", id),
    })
}
