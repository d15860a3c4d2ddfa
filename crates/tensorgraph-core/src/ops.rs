//! The operation vocabulary of the computation graph.
//!
//! Operations are grouped in two tiers:
//! - **Elementwise** ([`UnaryOp`], [`BinaryOp`]): math and comparison ops
//!   that carry no attributes beyond their inputs.
//! - **Structural** (the remaining [`Op`] variants): ops that reshape,
//!   combine, or produce values and carry attribute records (shapes, axis
//!   sets, literals, callee references).
//!
//! Each variant knows its wire tag ([`Op::tag`]) and its input arity
//! ([`Op::arity`]); the serializer is a total function over this enum, so
//! an unrepresentable op cannot be written and an unrecognized tag is
//! rejected on load.
//!
//! Callee references ([`Op::FunctionCall`], [`Op::Reduce`]) point at other
//! functions by [`FunctionId`]; the on-disk form resolves them by name
//! through the document-wide function registry.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::element::ElementType;
use crate::id::FunctionId;
use crate::types::{AxisSet, Shape};

// ---------------------------------------------------------------------------
// Elementwise sub-enums
// ---------------------------------------------------------------------------

/// Unary elementwise operators. Arity 1, no attributes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UnaryOp {
    Abs,
    Acos,
    Asin,
    Atan,
    Ceiling,
    Cos,
    Cosh,
    Exp,
    Floor,
    Log,
    Negative,
    Sign,
    Sin,
    Sinh,
    Tan,
    Tanh,
}

impl UnaryOp {
    /// The wire tag for this operator.
    pub fn tag(&self) -> &'static str {
        match self {
            UnaryOp::Abs => "Abs",
            UnaryOp::Acos => "Acos",
            UnaryOp::Asin => "Asin",
            UnaryOp::Atan => "Atan",
            UnaryOp::Ceiling => "Ceiling",
            UnaryOp::Cos => "Cos",
            UnaryOp::Cosh => "Cosh",
            UnaryOp::Exp => "Exp",
            UnaryOp::Floor => "Floor",
            UnaryOp::Log => "Log",
            UnaryOp::Negative => "Negative",
            UnaryOp::Sign => "Sign",
            UnaryOp::Sin => "Sin",
            UnaryOp::Sinh => "Sinh",
            UnaryOp::Tan => "Tan",
            UnaryOp::Tanh => "Tanh",
        }
    }

    /// Parses a wire tag back into the operator.
    pub fn from_tag(tag: &str) -> Option<UnaryOp> {
        let op = match tag {
            "Abs" => UnaryOp::Abs,
            "Acos" => UnaryOp::Acos,
            "Asin" => UnaryOp::Asin,
            "Atan" => UnaryOp::Atan,
            "Ceiling" => UnaryOp::Ceiling,
            "Cos" => UnaryOp::Cos,
            "Cosh" => UnaryOp::Cosh,
            "Exp" => UnaryOp::Exp,
            "Floor" => UnaryOp::Floor,
            "Log" => UnaryOp::Log,
            "Negative" => UnaryOp::Negative,
            "Sign" => UnaryOp::Sign,
            "Sin" => UnaryOp::Sin,
            "Sinh" => UnaryOp::Sinh,
            "Tan" => UnaryOp::Tan,
            "Tanh" => UnaryOp::Tanh,
            _ => return None,
        };
        Some(op)
    }
}

/// Binary elementwise and contraction operators. Arity 2, no attributes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BinaryOp {
    Add,
    Divide,
    Dot,
    Equal,
    Greater,
    GreaterEq,
    Less,
    LessEq,
    Maximum,
    Minimum,
    Multiply,
    NotEqual,
    Power,
    Remainder,
    Subtract,
}

impl BinaryOp {
    /// The wire tag for this operator.
    pub fn tag(&self) -> &'static str {
        match self {
            BinaryOp::Add => "Add",
            BinaryOp::Divide => "Divide",
            BinaryOp::Dot => "Dot",
            BinaryOp::Equal => "Equal",
            BinaryOp::Greater => "Greater",
            BinaryOp::GreaterEq => "GreaterEq",
            BinaryOp::Less => "Less",
            BinaryOp::LessEq => "LessEq",
            BinaryOp::Maximum => "Maximum",
            BinaryOp::Minimum => "Minimum",
            BinaryOp::Multiply => "Multiply",
            BinaryOp::NotEqual => "NotEqual",
            BinaryOp::Power => "Power",
            BinaryOp::Remainder => "Remainder",
            BinaryOp::Subtract => "Subtract",
        }
    }

    /// Parses a wire tag back into the operator.
    pub fn from_tag(tag: &str) -> Option<BinaryOp> {
        let op = match tag {
            "Add" => BinaryOp::Add,
            "Divide" => BinaryOp::Divide,
            "Dot" => BinaryOp::Dot,
            "Equal" => BinaryOp::Equal,
            "Greater" => BinaryOp::Greater,
            "GreaterEq" => BinaryOp::GreaterEq,
            "Less" => BinaryOp::Less,
            "LessEq" => BinaryOp::LessEq,
            "Maximum" => BinaryOp::Maximum,
            "Minimum" => BinaryOp::Minimum,
            "Multiply" => BinaryOp::Multiply,
            "NotEqual" => BinaryOp::NotEqual,
            "Power" => BinaryOp::Power,
            "Remainder" => BinaryOp::Remainder,
            "Subtract" => BinaryOp::Subtract,
            _ => return None,
        };
        Some(op)
    }
}

// ---------------------------------------------------------------------------
// Input arity
// ---------------------------------------------------------------------------

/// How many inputs an operation accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arity {
    /// Exactly `n` inputs.
    Exactly(usize),
    /// `n` or more inputs (variadic ops).
    AtLeast(usize),
}

impl Arity {
    /// Returns `true` if an input count satisfies this arity.
    pub fn accepts(&self, count: usize) -> bool {
        match self {
            Arity::Exactly(n) => count == *n,
            Arity::AtLeast(n) => count >= *n,
        }
    }
}

impl fmt::Display for Arity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Arity::Exactly(n) => write!(f, "exactly {}", n),
            Arity::AtLeast(n) => write!(f, "at least {}", n),
        }
    }
}

// ---------------------------------------------------------------------------
// Op: the full vocabulary
// ---------------------------------------------------------------------------

/// A single operation, with its attribute record where the kind has one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Op {
    /// Unary elementwise op.
    Unary { op: UnaryOp },
    /// Binary elementwise or contraction op.
    Binary { op: BinaryOp },
    /// Elementwise choice between two values driven by a boolean condition.
    Select,
    /// Replicate the input along new axes into a larger shape.
    Broadcast { shape: Shape, axes: AxisSet },
    /// Concatenate N inputs along one axis.
    Concat { axis: usize },
    /// A literal tensor. Values are decimal literal strings so text
    /// round-trips exactly; the element type interprets them.
    Constant { shape: Shape, values: Vec<String> },
    /// Elementwise conversion to another element type.
    Convert { target_type: ElementType },
    /// Direct call of another function with the inputs as arguments.
    FunctionCall { function: FunctionId },
    /// A function parameter. Leaf node; shape declared, not inferred.
    Parameter { shape: Shape },
    /// General reduction over `reduction_axes` using a two-argument
    /// reduction function and an initial value (second input).
    Reduce {
        function: FunctionId,
        reduction_axes: AxisSet,
    },
    /// Reorder the input axes by `input_order` and reinterpret as
    /// `output_shape`.
    Reshape {
        input_order: Vec<usize>,
        output_shape: Shape,
    },
    /// Rectangular slab of the input between bounds with strides.
    Slice {
        lower_bounds: Vec<usize>,
        upper_bounds: Vec<usize>,
        strides: Vec<usize>,
    },
    /// Summation over `reduction_axes`.
    Sum { reduction_axes: AxisSet },
    /// Bundle N values into a tuple.
    Tuple,
}

impl Op {
    /// The wire tag identifying this operation kind.
    pub fn tag(&self) -> &'static str {
        match self {
            Op::Unary { op } => op.tag(),
            Op::Binary { op } => op.tag(),
            Op::Select => "Select",
            Op::Broadcast { .. } => "Broadcast",
            Op::Concat { .. } => "Concat",
            Op::Constant { .. } => "Constant",
            Op::Convert { .. } => "Convert",
            Op::FunctionCall { .. } => "FunctionCall",
            Op::Parameter { .. } => "Parameter",
            Op::Reduce { .. } => "Reduce",
            Op::Reshape { .. } => "Reshape",
            Op::Slice { .. } => "Slice",
            Op::Sum { .. } => "Sum",
            Op::Tuple => "Tuple",
        }
    }

    /// How many inputs this operation's constructor takes.
    pub fn arity(&self) -> Arity {
        match self {
            Op::Constant { .. } | Op::Parameter { .. } => Arity::Exactly(0),
            Op::Unary { .. }
            | Op::Broadcast { .. }
            | Op::Convert { .. }
            | Op::Reshape { .. }
            | Op::Slice { .. }
            | Op::Sum { .. } => Arity::Exactly(1),
            Op::Binary { .. } | Op::Reduce { .. } => Arity::Exactly(2),
            Op::Select => Arity::Exactly(3),
            Op::Concat { .. } => Arity::AtLeast(1),
            Op::FunctionCall { .. } | Op::Tuple => Arity::AtLeast(0),
        }
    }

    /// The function this operation references, if any.
    pub fn callee(&self) -> Option<FunctionId> {
        match self {
            Op::FunctionCall { function } | Op::Reduce { function, .. } => Some(*function),
            _ => None,
        }
    }

    /// The output shape when it is fixed by the operation's own attributes.
    ///
    /// Returns `None` for ops whose shape depends on their inputs; general
    /// shape inference is an evaluation concern, not a graph-model one.
    pub fn determined_shape(&self) -> Option<&Shape> {
        match self {
            Op::Parameter { shape }
            | Op::Constant { shape, .. }
            | Op::Broadcast { shape, .. } => Some(shape),
            Op::Reshape { output_shape, .. } => Some(output_shape),
            _ => None,
        }
    }

    /// `true` for leaf ops that take no inputs.
    pub fn is_leaf(&self) -> bool {
        matches!(self, Op::Parameter { .. } | Op::Constant { .. })
    }
}
