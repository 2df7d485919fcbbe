use std::fmt;

use serde::{Deserialize, Serialize};

use super::{DataType, NumericType};

/// Parameter passing direction, consumed by procedure descriptors.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    In,
    Out,
    InOut,
}

impl Direction {
    pub fn fortran_intent(self) -> &'static str {
        match self {
            Direction::In => "in",
            Direction::Out => "out",
            Direction::InOut => "inout",
        }
    }
}

/// A realized value: its type plus the text that computes it.
///
/// Named operands are storage locations and may carry a direction,
/// a `const` qualifier and a declared alignment. Values computed by an
/// operation never do; see [`TypedOperand::computed`].
#[derive(Clone, Debug, PartialEq)]
pub struct TypedOperand {
    pub text: String,
    pub ty: DataType,
    pub name: Option<String>,
    pub direction: Option<Direction>,
    pub constant: bool,
    /// Declared alignment in bytes, if the storage is known to be aligned.
    pub alignment: Option<u32>,
    /// Constant written in the tree. It has no address.
    pub literal: bool,
}

impl TypedOperand {
    /// A named storage location.
    pub fn variable(name: &str, ty: impl Into<DataType>) -> Self {
        Self {
            text: name.to_string(),
            ty: ty.into(),
            name: Some(name.to_string()),
            direction: None,
            constant: false,
            alignment: None,
            literal: false,
        }
    }

    /// The result of an operation: no name, no storage attributes.
    pub fn computed(text: impl Into<String>, ty: impl Into<DataType>) -> Self {
        Self {
            text: text.into(),
            ty: ty.into(),
            name: None,
            direction: None,
            constant: false,
            alignment: None,
            literal: false,
        }
    }

    /// A numeric constant written directly into the tree.
    pub fn literal(text: impl Into<String>, ty: impl Into<DataType>) -> Self {
        Self {
            literal: true,
            ..Self::computed(text, ty)
        }
    }

    pub fn with_direction(mut self, direction: Direction) -> Self {
        self.direction = Some(direction);
        self
    }

    pub fn with_alignment(mut self, alignment: u32) -> Self {
        self.alignment = Some(alignment);
        self
    }

    pub fn constant(mut self) -> Self {
        self.constant = true;
        self
    }

    pub fn numeric(&self) -> Option<&NumericType> {
        self.ty.numeric()
    }

    pub fn vector_length(&self) -> u32 {
        self.ty.vector_length()
    }

    pub fn is_vector(&self) -> bool {
        self.ty.is_vector()
    }

    /// Text of a pointer to this operand: a leading dereference is
    /// dropped, anything else gets an address-of.
    pub fn address(&self) -> String {
        match self.text.trim_start().strip_prefix('*') {
            Some(pointer) => pointer.trim_start().to_string(),
            None => format!("&{}", self.text.trim_start()),
        }
    }
}

impl fmt::Display for TypedOperand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}
