//! The closed set of scalar element kinds.
//!
//! Every tensor value carries an [`ElementType`]. The set is finite and
//! closed: eleven members, each uniquely identified by the quadruple
//! (bit-width, is-real, is-signed, C type name). The enum itself is the
//! interning mechanism -- equality is discriminant equality, so two
//! descriptors with the same quadruple are always the same value.
//!
//! The serialized form writes out the full quadruple rather than a name so
//! that documents are self-describing for human inspection; the load path
//! still demands an exact match via [`ElementType::canonical`].

use std::fmt;

use serde::{Deserialize, Serialize};

/// A scalar element kind: boolean, floating-point, or fixed-width integer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ElementType {
    Boolean,
    F32,
    F64,
    I8,
    I16,
    I32,
    I64,
    U8,
    U16,
    U32,
    U64,
}

impl ElementType {
    /// All recognized element types, in canonical order.
    pub const ALL: [ElementType; 11] = [
        ElementType::Boolean,
        ElementType::F32,
        ElementType::F64,
        ElementType::I8,
        ElementType::I16,
        ElementType::I32,
        ElementType::I64,
        ElementType::U8,
        ElementType::U16,
        ElementType::U32,
        ElementType::U64,
    ];

    /// Width of one element in bits.
    pub fn bitwidth(&self) -> usize {
        match self {
            ElementType::Boolean | ElementType::I8 | ElementType::U8 => 8,
            ElementType::I16 | ElementType::U16 => 16,
            ElementType::F32 | ElementType::I32 | ElementType::U32 => 32,
            ElementType::F64 | ElementType::I64 | ElementType::U64 => 64,
        }
    }

    /// `true` for floating-point types.
    pub fn is_real(&self) -> bool {
        matches!(self, ElementType::F32 | ElementType::F64)
    }

    /// `true` for signed types (floats count as signed).
    pub fn is_signed(&self) -> bool {
        matches!(
            self,
            ElementType::F32
                | ElementType::F64
                | ElementType::I8
                | ElementType::I16
                | ElementType::I32
                | ElementType::I64
        )
    }

    /// The C type name used in the serialized quadruple.
    pub fn c_type_string(&self) -> &'static str {
        match self {
            ElementType::Boolean => "char",
            ElementType::F32 => "float",
            ElementType::F64 => "double",
            ElementType::I8 => "int8_t",
            ElementType::I16 => "int16_t",
            ElementType::I32 => "int32_t",
            ElementType::I64 => "int64_t",
            ElementType::U8 => "uint8_t",
            ElementType::U16 => "uint16_t",
            ElementType::U32 => "uint32_t",
            ElementType::U64 => "uint64_t",
        }
    }

    /// Returns the canonical member matching the full quadruple, or `None`
    /// if no recognized element type matches exactly.
    pub fn canonical(
        bitwidth: usize,
        is_real: bool,
        is_signed: bool,
        c_type: &str,
    ) -> Option<ElementType> {
        ElementType::ALL.iter().copied().find(|t| {
            t.bitwidth() == bitwidth
                && t.is_real() == is_real
                && t.is_signed() == is_signed
                && t.c_type_string() == c_type
        })
    }
}

impl fmt::Display for ElementType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tag = match self {
            ElementType::Boolean => "boolean",
            ElementType::F32 => "f32",
            ElementType::F64 => "f64",
            ElementType::I8 => "i8",
            ElementType::I16 => "i16",
            ElementType::I32 => "i32",
            ElementType::I64 => "i64",
            ElementType::U8 => "u8",
            ElementType::U16 => "u16",
            ElementType::U32 => "u32",
            ElementType::U64 => "u64",
        };
        write!(f, "{}", tag)
    }
}
