//! Serializer/deserializer for tensorgraph programs.
//!
//! The on-disk form is a JSON array of function objects in callee-first
//! order: every function referenced by `FunctionCall` or `Reduce` appears
//! before any function that references it, and the root function is the
//! last element. Within a function, nodes appear in topological order.
//! Both orders are load-time requirements, which lets the reader rebuild
//! the graph in one forward pass with no back-patching.
//!
//! # Modules
//!
//! - [`error`]: [`SerialError`] with all failure modes
//! - [`record`]: wire structs (the document model)
//! - [`linearize`]: Kahn's linearizer for function bodies
//! - [`writer`]: function/node encoding
//! - [`reader`]: function/node decoding and constructor dispatch
//!
//! Serialization is strictly single-threaded and synchronous: input is
//! consumed end-to-end before any graph is produced, output is written in
//! one pass after linearization, and the first error aborts the call.

pub mod error;
pub mod record;

mod linearize;
mod reader;
mod writer;

use std::collections::{HashMap, HashSet};
use std::io::Read;

use tensorgraph_core::{FunctionId, Program};

pub use error::SerialError;
pub use record::{FunctionRecord, NodeRecord, TypeRecord};

/// Serializes the graph rooted at `root` into a JSON document.
///
/// All functions transitively referenced from `root` are emitted,
/// callees before callers, root last.
pub fn serialize(program: &Program, root: FunctionId) -> Result<String, SerialError> {
    let mut order = Vec::new();
    let mut visited = HashSet::new();
    collect_functions(program, root, &mut visited, &mut order)?;

    let records = order
        .iter()
        .map(|&function| writer::write_function(program, function))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(serde_json::to_string(&records)?)
}

/// Deserializes a JSON document into a program, returning the root
/// function (the last function in the document).
pub fn deserialize<R: Read>(reader: R) -> Result<(Program, FunctionId), SerialError> {
    let records: Vec<FunctionRecord> = serde_json::from_reader(reader)?;
    read_document(&records)
}

/// Deserializes a document held in memory.
pub fn deserialize_str(text: &str) -> Result<(Program, FunctionId), SerialError> {
    let records: Vec<FunctionRecord> = serde_json::from_str(text)?;
    read_document(&records)
}

fn read_document(records: &[FunctionRecord]) -> Result<(Program, FunctionId), SerialError> {
    let mut program = Program::new();
    let mut completed: HashMap<String, FunctionId> = HashMap::new();

    let mut root = None;
    for record in records {
        root = Some(reader::read_function(&mut program, record, &mut completed)?);
    }

    match root {
        Some(root) => Ok((program, root)),
        None => Err(SerialError::MalformedDocument {
            detail: "document contains no functions".to_string(),
        }),
    }
}

/// Post-order walk over callee references: callees land in `order` before
/// their callers, so the root ends up last.
fn collect_functions(
    program: &Program,
    function: FunctionId,
    visited: &mut HashSet<FunctionId>,
    order: &mut Vec<FunctionId>,
) -> Result<(), SerialError> {
    if !visited.insert(function) {
        return Ok(());
    }
    if program.function(function).is_none() {
        return Err(SerialError::FunctionNotFound { id: function });
    }

    for id in program.function_nodes(function) {
        if let Some(node) = program.node(id) {
            if let Some(callee) = node.op.callee() {
                collect_functions(program, callee, visited, order)?;
            }
        }
    }

    order.push(function);
    Ok(())
}
