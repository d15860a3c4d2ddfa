//! Shapes, axis sets, and the tensor-view type.
//!
//! A [`Shape`] is an ordered sequence of dimension extents; ranks up to 4
//! are stored inline. An [`AxisSet`] is a sorted set of axis indices, so
//! its serialized form is deterministic. A [`ViewType`] pairs an element
//! type with a shape and describes the value a node or function produces.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::element::ElementType;

/// Ordered dimension extents of a multi-dimensional value.
pub type Shape = SmallVec<[usize; 4]>;

/// A set of axis indices, ordered for deterministic serialization.
pub type AxisSet = BTreeSet<usize>;

/// The type of a tensor view: element type plus shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewType {
    pub element_type: ElementType,
    pub shape: Shape,
}

impl ViewType {
    pub fn new(element_type: ElementType, shape: Shape) -> Self {
        ViewType {
            element_type,
            shape,
        }
    }

    /// Rank of the view (number of dimensions).
    pub fn rank(&self) -> usize {
        self.shape.len()
    }
}

impl fmt::Display for ViewType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}[", self.element_type)?;
        for (i, dim) in self.shape.iter().enumerate() {
            if i > 0 {
                write!(f, ",")?;
            }
            write!(f, "{}", dim)?;
        }
        write!(f, "]")
    }
}
