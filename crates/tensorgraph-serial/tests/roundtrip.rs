//! End-to-end serializer tests: document scenarios, round-trip and
//! idempotence properties, and the on-disk ordering invariants.

use std::collections::HashMap;

use proptest::prelude::*;
use smallvec::smallvec;

use tensorgraph_core::{
    AxisSet, BinaryOp, ElementType, FunctionId, Op, Program, UnaryOp,
};
use tensorgraph_serial::{
    deserialize, deserialize_str, serialize, FunctionRecord, SerialError,
};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Asserts that every node input appears at a strictly smaller index.
fn assert_topological(records: &[FunctionRecord]) {
    for record in records {
        let mut seen: HashMap<&str, usize> = HashMap::new();
        for (idx, node) in record.ops.iter().enumerate() {
            for input in &node.inputs {
                let input_idx = seen
                    .get(input.as_str())
                    .unwrap_or_else(|| panic!("input `{}` not defined before `{}`", input, node.name));
                assert!(*input_idx < idx);
            }
            seen.insert(&node.name, idx);
        }
    }
}

/// Asserts callee-before-caller order across the document.
fn assert_callee_first(records: &[FunctionRecord]) {
    let index: HashMap<&str, usize> = records
        .iter()
        .enumerate()
        .map(|(idx, record)| (record.name.as_str(), idx))
        .collect();
    for (idx, record) in records.iter().enumerate() {
        for node in &record.ops {
            if node.op == "FunctionCall" || node.op == "Reduce" {
                let callee = node.attrs["function"].as_str().unwrap();
                assert!(
                    index[callee] < idx,
                    "callee `{}` does not precede `{}`",
                    callee,
                    record.name
                );
            }
        }
    }
}

/// Asserts node names unique per function and function names unique
/// across the document.
fn assert_names_unique(records: &[FunctionRecord]) {
    let mut function_names = std::collections::HashSet::new();
    for record in records {
        assert!(function_names.insert(&record.name));
        let mut node_names = std::collections::HashSet::new();
        for node in &record.ops {
            assert!(node_names.insert(&node.name));
        }
    }
}

/// Op attributes as a comparable string, with callees resolved to names.
fn op_fingerprint(program: &Program, op: &Op) -> String {
    match op.callee() {
        Some(callee) => {
            let mut normalized = op.clone();
            match &mut normalized {
                Op::FunctionCall { function } | Op::Reduce { function, .. } => {
                    *function = FunctionId(0)
                }
                _ => {}
            }
            let name = program.function(callee).unwrap().name.clone();
            format!("{:?} -> {}", normalized, name)
        }
        None => format!("{:?}", op),
    }
}

/// Structural equality of two functions across two programs: same node
/// set by name and op kind, same element types, same attributes, same
/// edges, same parameter order, same result.
fn assert_functions_match(a: &Program, fa: FunctionId, b: &Program, fb: FunctionId) {
    let da = a.function(fa).unwrap();
    let db = b.function(fb).unwrap();
    assert_eq!(da.name, db.name);
    assert_eq!(da.result_type, db.result_type);
    assert_eq!(da.result_shape, db.result_shape);

    let nodes_a = a.function_nodes(fa);
    let nodes_b = b.function_nodes(fb);
    assert_eq!(nodes_a.len(), nodes_b.len());

    for &id in &nodes_a {
        let node = a.node(id).unwrap();
        let other_id = b
            .resolve(fb, &node.name)
            .unwrap_or_else(|| panic!("node `{}` missing after round-trip", node.name));
        let other = b.node(other_id).unwrap();

        assert_eq!(node.tag(), other.tag());
        assert_eq!(node.element_type, other.element_type);
        assert_eq!(op_fingerprint(a, &node.op), op_fingerprint(b, &other.op));

        let inputs_a: Vec<String> = a
            .inputs(id)
            .iter()
            .map(|&i| a.node(i).unwrap().name.clone())
            .collect();
        let inputs_b: Vec<String> = b
            .inputs(other_id)
            .iter()
            .map(|&i| b.node(i).unwrap().name.clone())
            .collect();
        assert_eq!(inputs_a, inputs_b);
    }

    let params_a: Vec<String> = da
        .params
        .iter()
        .map(|&p| a.node(p).unwrap().name.clone())
        .collect();
    let params_b: Vec<String> = db
        .params
        .iter()
        .map(|&p| b.node(p).unwrap().name.clone())
        .collect();
    assert_eq!(params_a, params_b);

    let result_a = a.node(da.result.unwrap()).unwrap().name.clone();
    let result_b = b.node(db.result.unwrap()).unwrap().name.clone();
    assert_eq!(result_a, result_b);
}

// ---------------------------------------------------------------------------
// Scenario: single-parameter identity function
// ---------------------------------------------------------------------------

fn identity_program() -> (Program, FunctionId) {
    let mut program = Program::new();
    let f = program
        .add_function("F", ElementType::F32, smallvec![2, 3])
        .unwrap();
    let x = program
        .add_op(
            f,
            "x",
            Op::Parameter {
                shape: smallvec![2, 3],
            },
            ElementType::F32,
            &[],
        )
        .unwrap();
    program.set_signature(f, vec![x], x).unwrap();
    (program, f)
}

#[test]
fn identity_function_document_shape() {
    let (program, root) = identity_program();
    let text = serialize(&program, root).unwrap();

    let records: Vec<FunctionRecord> = serde_json::from_str(&text).unwrap();
    assert_eq!(records.len(), 1);
    let record = &records[0];
    assert_eq!(record.name, "F");
    assert_eq!(record.parameters, vec!["x"]);
    assert_eq!(record.result, vec!["x"]);
    assert_eq!(record.result_shape, vec![2, 3]);
    assert_eq!(record.ops.len(), 1);
    assert_eq!(record.ops[0].op, "Parameter");
    assert_eq!(record.ops[0].attrs["shape"], serde_json::json!([2, 3]));
    assert_eq!(record.ops[0].element_type.canonical(), Some(ElementType::F32));
}

#[test]
fn identity_function_golden_document() {
    let (program, root) = identity_program();
    let text = serialize(&program, root).unwrap();
    insta::assert_snapshot!(
        text,
        @r#"[{"name":"F","result_type":{"bitwidth":32,"is_real":true,"is_signed":true,"c_type_string":"float"},"result_shape":[2,3],"parameters":["x"],"result":["x"],"ops":[{"name":"x","op":"Parameter","element_type":{"bitwidth":32,"is_real":true,"is_signed":true,"c_type_string":"float"},"inputs":[],"outputs":["x"],"shape":[2,3]}]}]"#
    );
}

// ---------------------------------------------------------------------------
// Scenario: binary add
// ---------------------------------------------------------------------------

#[test]
fn binary_add_orders_parameters_before_add() {
    let mut program = Program::new();
    let f = program
        .add_function("F", ElementType::F32, smallvec![4])
        .unwrap();
    let a = program
        .add_op(f, "a", Op::Parameter { shape: smallvec![4] }, ElementType::F32, &[])
        .unwrap();
    let b = program
        .add_op(f, "b", Op::Parameter { shape: smallvec![4] }, ElementType::F32, &[])
        .unwrap();
    let sum = program
        .add_op(f, "sum", Op::Binary { op: BinaryOp::Add }, ElementType::F32, &[a, b])
        .unwrap();
    program.set_signature(f, vec![a, b], sum).unwrap();

    let text = serialize(&program, f).unwrap();
    let records: Vec<FunctionRecord> = serde_json::from_str(&text).unwrap();
    let ops: Vec<&str> = records[0].ops.iter().map(|n| n.op.as_str()).collect();
    assert_eq!(ops, vec!["Parameter", "Parameter", "Add"]);
    assert_eq!(records[0].ops[2].inputs, vec!["a", "b"]);
    assert_topological(&records);

    let (reloaded, new_root) = deserialize_str(&text).unwrap();
    assert_functions_match(&program, f, &reloaded, new_root);
}

// ---------------------------------------------------------------------------
// Scenario: broadcast + sum
// ---------------------------------------------------------------------------

#[test]
fn broadcast_sum_attributes_roundtrip() {
    let mut program = Program::new();
    let f = program
        .add_function("F", ElementType::F32, smallvec![2])
        .unwrap();
    let x = program
        .add_op(f, "x", Op::Parameter { shape: smallvec![3] }, ElementType::F32, &[])
        .unwrap();
    let bcast = program
        .add_op(
            f,
            "bcast",
            Op::Broadcast {
                shape: smallvec![2, 3],
                axes: [0].into_iter().collect::<AxisSet>(),
            },
            ElementType::F32,
            &[x],
        )
        .unwrap();
    let total = program
        .add_op(
            f,
            "total",
            Op::Sum {
                reduction_axes: [1].into_iter().collect::<AxisSet>(),
            },
            ElementType::F32,
            &[bcast],
        )
        .unwrap();
    program.set_signature(f, vec![x], total).unwrap();

    let text = serialize(&program, f).unwrap();
    let records: Vec<FunctionRecord> = serde_json::from_str(&text).unwrap();
    let ops: Vec<&str> = records[0].ops.iter().map(|n| n.op.as_str()).collect();
    assert_eq!(ops, vec!["Parameter", "Broadcast", "Sum"]);
    assert_eq!(records[0].ops[1].attrs["shape"], serde_json::json!([2, 3]));
    assert_eq!(records[0].ops[1].attrs["axes"], serde_json::json!([0]));
    assert_eq!(
        records[0].ops[2].attrs["reduction_axes"],
        serde_json::json!([1])
    );

    let (reloaded, new_root) = deserialize_str(&text).unwrap();
    assert_functions_match(&program, f, &reloaded, new_root);
}

// ---------------------------------------------------------------------------
// Scenario: Reduce referencing a helper function
// ---------------------------------------------------------------------------

fn reduce_program() -> (Program, FunctionId) {
    let mut program = Program::new();

    let helper = program
        .add_function("Helper", ElementType::F32, smallvec![])
        .unwrap();
    let a = program
        .add_op(helper, "a", Op::Parameter { shape: smallvec![] }, ElementType::F32, &[])
        .unwrap();
    let b = program
        .add_op(helper, "b", Op::Parameter { shape: smallvec![] }, ElementType::F32, &[])
        .unwrap();
    let sum = program
        .add_op(helper, "sum", Op::Binary { op: BinaryOp::Add }, ElementType::F32, &[a, b])
        .unwrap();
    program.set_signature(helper, vec![a, b], sum).unwrap();

    let f = program
        .add_function("F", ElementType::F32, smallvec![])
        .unwrap();
    let x = program
        .add_op(f, "x", Op::Parameter { shape: smallvec![4] }, ElementType::F32, &[])
        .unwrap();
    let zero = program
        .add_op(
            f,
            "zero",
            Op::Constant {
                shape: smallvec![],
                values: vec!["0".into()],
            },
            ElementType::F32,
            &[],
        )
        .unwrap();
    let reduced = program
        .add_op(
            f,
            "reduced",
            Op::Reduce {
                function: helper,
                reduction_axes: [0].into_iter().collect::<AxisSet>(),
            },
            ElementType::F32,
            &[x, zero],
        )
        .unwrap();
    program.set_signature(f, vec![x], reduced).unwrap();
    (program, f)
}

#[test]
fn reduce_document_places_helper_first() {
    let (program, root) = reduce_program();
    let text = serialize(&program, root).unwrap();
    let records: Vec<FunctionRecord> = serde_json::from_str(&text).unwrap();

    assert_eq!(records.len(), 2);
    assert_eq!(records[0].name, "Helper");
    assert_eq!(records[1].name, "F");
    assert_callee_first(&records);
    assert_names_unique(&records);

    let reduce_node = records[1].ops.iter().find(|n| n.op == "Reduce").unwrap();
    assert_eq!(reduce_node.attrs["function"], serde_json::json!("Helper"));
    assert_eq!(reduce_node.attrs["reduction_axes"], serde_json::json!([0]));

    let (reloaded, new_root) = deserialize_str(&text).unwrap();
    assert_eq!(reloaded.function_count(), 2);
    assert_functions_match(&program, root, &reloaded, new_root);

    // The reloaded Reduce resolves to the reloaded Helper by name.
    let reduced = reloaded.resolve(new_root, "reduced").unwrap();
    let callee = reloaded.node(reduced).unwrap().op.callee().unwrap();
    assert_eq!(reloaded.function(callee).unwrap().name, "Helper");
}

// ---------------------------------------------------------------------------
// Scenario: rejection of malformed documents
// ---------------------------------------------------------------------------

const F32_TYPE: &str =
    r#"{"bitwidth":32,"is_real":true,"is_signed":true,"c_type_string":"float"}"#;

#[test]
fn unknown_op_is_rejected() {
    let doc = format!(
        r#"[{{"name":"F","result_type":{t},"result_shape":[4],"parameters":["x"],"result":["y"],"ops":[
            {{"name":"x","op":"Parameter","element_type":{t},"inputs":[],"outputs":["x"],"shape":[4]}},
            {{"name":"y","op":"Foo","element_type":{t},"inputs":["x"],"outputs":["y"]}}
        ]}}]"#,
        t = F32_TYPE
    );
    let err = deserialize_str(&doc).unwrap_err();
    assert!(matches!(err, SerialError::UnknownOperation { op, .. } if op == "Foo"));
}

#[test]
fn get_tuple_element_is_refused() {
    let doc = format!(
        r#"[{{"name":"F","result_type":{t},"result_shape":[4],"parameters":["x"],"result":["y"],"ops":[
            {{"name":"x","op":"Parameter","element_type":{t},"inputs":[],"outputs":["x"],"shape":[4]}},
            {{"name":"y","op":"GetTupleElement","element_type":{t},"inputs":["x"],"outputs":["y"]}}
        ]}}]"#,
        t = F32_TYPE
    );
    let err = deserialize_str(&doc).unwrap_err();
    assert!(
        matches!(err, SerialError::UnknownOperation { op, .. } if op == "GetTupleElement"),
    );
}

#[test]
fn dangling_input_is_rejected() {
    let doc = format!(
        r#"[{{"name":"F","result_type":{t},"result_shape":[4],"parameters":["x"],"result":["sum"],"ops":[
            {{"name":"x","op":"Parameter","element_type":{t},"inputs":[],"outputs":["x"],"shape":[4]}},
            {{"name":"sum","op":"Add","element_type":{t},"inputs":["x","ghost"],"outputs":["sum"]}}
        ]}}]"#,
        t = F32_TYPE
    );
    let err = deserialize_str(&doc).unwrap_err();
    assert!(matches!(err, SerialError::DanglingReference { input, .. } if input == "ghost"));
}

#[test]
fn root_first_order_is_a_forward_reference() {
    // Legacy emission order: the caller before its callee. A conforming
    // reader refuses it.
    let doc = format!(
        r#"[
            {{"name":"F","result_type":{t},"result_shape":[],"parameters":["x"],"result":["r"],"ops":[
                {{"name":"x","op":"Parameter","element_type":{t},"inputs":[],"outputs":["x"],"shape":[4]}},
                {{"name":"z","op":"Constant","element_type":{t},"inputs":[],"outputs":["z"],"shape":[],"value":["0"]}},
                {{"name":"r","op":"Reduce","element_type":{t},"inputs":["x","z"],"outputs":["r"],"function":"Helper","reduction_axes":[0]}}
            ]}},
            {{"name":"Helper","result_type":{t},"result_shape":[],"parameters":["a","b"],"result":["s"],"ops":[
                {{"name":"a","op":"Parameter","element_type":{t},"inputs":[],"outputs":["a"],"shape":[]}},
                {{"name":"b","op":"Parameter","element_type":{t},"inputs":[],"outputs":["b"],"shape":[]}},
                {{"name":"s","op":"Add","element_type":{t},"inputs":["a","b"],"outputs":["s"]}}
            ]}}
        ]"#,
        t = F32_TYPE
    );
    let err = deserialize_str(&doc).unwrap_err();
    assert!(
        matches!(err, SerialError::ForwardFunctionReference { callee, .. } if callee == "Helper"),
    );
}

#[test]
fn unknown_element_type_is_rejected() {
    let doc = r#"[{"name":"F","result_type":{"bitwidth":16,"is_real":true,"is_signed":true,"c_type_string":"half"},"result_shape":[],"parameters":[],"result":["c"],"ops":[
        {"name":"c","op":"Constant","element_type":{"bitwidth":16,"is_real":true,"is_signed":true,"c_type_string":"half"},"inputs":[],"outputs":["c"],"shape":[],"value":["0"]}
    ]}]"#;
    let err = deserialize_str(doc).unwrap_err();
    assert!(matches!(err, SerialError::UnknownElementType { .. }));
}

// ---------------------------------------------------------------------------
// Universal properties
// ---------------------------------------------------------------------------

#[test]
fn serialization_is_idempotent() {
    let (program, root) = reduce_program();
    let first = serialize(&program, root).unwrap();
    let (reloaded, new_root) = deserialize_str(&first).unwrap();
    let second = serialize(&reloaded, new_root).unwrap();
    assert_eq!(first, second);
}

#[test]
fn element_types_intern_to_the_same_descriptor() {
    let (program, root) = identity_program();
    let text = serialize(&program, root).unwrap();

    let (first, first_root) = deserialize_str(&text).unwrap();
    let (second, second_root) = deserialize_str(&text).unwrap();

    let a = first.node(first.resolve(first_root, "x").unwrap()).unwrap();
    let b = second
        .node(second.resolve(second_root, "x").unwrap())
        .unwrap();
    assert_eq!(a.element_type, ElementType::F32);
    assert_eq!(a.element_type, b.element_type);
}

#[test]
fn deserialize_reads_from_a_byte_source() {
    let (program, root) = reduce_program();
    let text = serialize(&program, root).unwrap();
    let (reloaded, new_root) = deserialize(text.as_bytes()).unwrap();
    assert_eq!(reloaded.function(new_root).unwrap().name, "F");
}

// ---------------------------------------------------------------------------
// Randomized chains
// ---------------------------------------------------------------------------

/// Builds a single-function program where node `i` always consumes node
/// `i-1`, so every node is live and the graph shape is driven by the
/// selector bytes (unary chain links, fan-in to the parameter, and
/// duplicated inputs).
fn build_chain(selectors: &[u8]) -> (Program, FunctionId) {
    let mut program = Program::new();
    let f = program
        .add_function("chain", ElementType::F32, smallvec![4])
        .unwrap();
    let first = program
        .add_op(f, "p0", Op::Parameter { shape: smallvec![4] }, ElementType::F32, &[])
        .unwrap();

    let mut prev = first;
    for (i, &selector) in selectors.iter().enumerate() {
        let name = format!("n{}", i);
        let op = match selector % 5 {
            0 => Op::Unary { op: UnaryOp::Abs },
            1 => Op::Unary { op: UnaryOp::Exp },
            2 => Op::Unary {
                op: UnaryOp::Negative,
            },
            3 => Op::Binary { op: BinaryOp::Add },
            _ => Op::Binary {
                op: BinaryOp::Multiply,
            },
        };
        let inputs: Vec<_> = match selector % 5 {
            0 | 1 | 2 => vec![prev],
            3 => vec![prev, first],
            _ => vec![prev, prev],
        };
        prev = program
            .add_op(f, &name, op, ElementType::F32, &inputs)
            .unwrap();
    }
    program.set_signature(f, vec![first], prev).unwrap();
    (program, f)
}

proptest! {
    #[test]
    fn random_chains_roundtrip(selectors in proptest::collection::vec(any::<u8>(), 0..24)) {
        let (program, root) = build_chain(&selectors);

        let text = serialize(&program, root).unwrap();
        let (reloaded, new_root) = deserialize_str(&text).unwrap();
        assert_functions_match(&program, root, &reloaded, new_root);

        // Byte-for-byte idempotence.
        let text2 = serialize(&reloaded, new_root).unwrap();
        prop_assert_eq!(&text, &text2);

        // On-disk ordering invariants.
        let records: Vec<FunctionRecord> = serde_json::from_str(&text).unwrap();
        assert_topological(&records);
        assert_names_unique(&records);
    }
}
