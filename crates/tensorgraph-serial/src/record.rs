//! Wire records: the document model.
//!
//! The on-disk form is a JSON array of [`FunctionRecord`]s. These structs
//! are the intermediate representation between the graph and the byte
//! stream; any conformant JSON codec handles them, so there is no custom
//! parser. Op-specific attributes ride in a flattened key/value map whose
//! backing store iterates in sorted key order, which keeps the encoded
//! text stable for golden-file comparisons.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use tensorgraph_core::ElementType;

/// The self-describing element-type quadruple.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypeRecord {
    pub bitwidth: u64,
    pub is_real: bool,
    pub is_signed: bool,
    pub c_type_string: String,
}

impl TypeRecord {
    /// Interns the quadruple, yielding the canonical descriptor if it
    /// matches a recognized member exactly.
    pub fn canonical(&self) -> Option<ElementType> {
        ElementType::canonical(
            self.bitwidth as usize,
            self.is_real,
            self.is_signed,
            &self.c_type_string,
        )
    }
}

impl From<ElementType> for TypeRecord {
    fn from(t: ElementType) -> Self {
        TypeRecord {
            bitwidth: t.bitwidth() as u64,
            is_real: t.is_real(),
            is_signed: t.is_signed(),
            c_type_string: t.c_type_string().to_string(),
        }
    }
}

/// One serialized node.
///
/// `outputs` carries the node's own name once per produced value and is
/// informational; the reader does not act on it. The flattened `attrs`
/// map holds the op-specific attributes from the per-operation schema.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeRecord {
    pub name: String,
    pub op: String,
    pub element_type: TypeRecord,
    pub inputs: Vec<String>,
    pub outputs: Vec<String>,
    #[serde(flatten)]
    pub attrs: Map<String, Value>,
}

/// One serialized function.
///
/// `ops` is topologically ordered; `result` is a single-element array
/// (wrapped for future multi-output functions).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FunctionRecord {
    pub name: String,
    pub result_type: TypeRecord,
    pub result_shape: Vec<usize>,
    pub parameters: Vec<String>,
    pub result: Vec<String>,
    pub ops: Vec<NodeRecord>,
}
