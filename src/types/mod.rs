//! Numeric types of generated values and the operands that carry them.
//!
//! A [`NumericType`] describes a scalar or a vector of lanes. Catalog
//! lookups key on its [`TypeSig`] projection, which drops alignment.

mod operand;
#[cfg(test)]
mod tests;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::target::{Architecture, Language};

pub use operand::{Direction, TypedOperand};

/// Base kind of a numeric type.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Kind {
    Int,
    Float,
}

/// Widest vector a type name may ask for.
pub const MAX_LANES: u32 = 64;

/// A scalar or vector numeric type.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct NumericType {
    pub kind: Kind,
    /// Element width in bits.
    pub width: u32,
    /// Always true for floating types.
    pub signed: bool,
    /// Number of lanes; 1 for scalars.
    pub lanes: u32,
    /// Alignment in bytes.
    pub alignment: u32,
}

impl NumericType {
    pub fn int(width: u32) -> Self {
        Self::scalar_of(Kind::Int, width, true)
    }

    pub fn uint(width: u32) -> Self {
        Self::scalar_of(Kind::Int, width, false)
    }

    pub fn float(width: u32) -> Self {
        Self::scalar_of(Kind::Float, width, true)
    }

    fn scalar_of(kind: Kind, width: u32, signed: bool) -> Self {
        Self {
            kind,
            width,
            signed,
            lanes: 1,
            alignment: width / 8,
        }
    }

    /// Same element type with `lanes` lanes and natural alignment.
    pub fn vector(self, lanes: u32) -> Self {
        let mut ty = Self { lanes, ..self };
        ty.alignment = ty.total_size();
        ty
    }

    /// The element type of this type.
    pub fn scalar(self) -> Self {
        self.vector(1)
    }

    pub fn with_alignment(self, alignment: u32) -> Self {
        Self { alignment, ..self }
    }

    /// Same lanes and signedness, different element width.
    pub fn with_width(self, width: u32) -> Self {
        Self { width, ..self }.vector(self.lanes)
    }

    pub fn is_vector(&self) -> bool {
        self.lanes > 1
    }

    pub fn is_float(&self) -> bool {
        self.kind == Kind::Float
    }

    /// Element size in bytes.
    pub fn element_size(&self) -> u32 {
        self.width / 8
    }

    /// Size of the whole value in bytes.
    pub fn total_size(&self) -> u32 {
        self.element_size().saturating_mul(self.lanes)
    }

    pub fn signature(&self) -> TypeSig {
        TypeSig {
            kind: self.kind,
            width: self.width,
            signed: self.signed,
            lanes: self.lanes,
        }
    }

    /// Declaration spelling of this type in `language`.
    ///
    /// C vector types depend on the architecture (`__m256d` on x86,
    /// `float64x2_t` on NEON); OpenCL C and CUDA use their built-in
    /// vector types.
    pub fn decl(&self, language: Language, architecture: Architecture) -> String {
        if !self.is_vector() {
            return self.scalar_decl(language);
        }
        match language {
            Language::OpenCl => format!("{}{}", self.scalar_decl(language), self.lanes),
            Language::Cuda => format!("{}{}", self.cuda_base(), self.lanes),
            Language::Fortran => {
                format!("{}, dimension({})", self.scalar_decl(language), self.lanes)
            }
            Language::C => match architecture {
                Architecture::X86 => self
                    .x86_vector_decl()
                    .unwrap_or_else(|| self.neon_style_decl()),
                _ => self.neon_style_decl(),
            },
        }
    }

    fn scalar_decl(&self, language: Language) -> String {
        match (language, self.kind) {
            (Language::Fortran, Kind::Int) => format!("integer(kind={})", self.element_size()),
            (Language::Fortran, Kind::Float) => format!("real(kind={})", self.element_size()),
            (_, Kind::Float) => match (language, self.width) {
                (_, 64) => "double".to_string(),
                (Language::OpenCl, 16) => "half".to_string(),
                (Language::Cuda, 16) => "__half".to_string(),
                (_, 16) => "_Float16".to_string(),
                _ => "float".to_string(),
            },
            (Language::OpenCl, Kind::Int) => {
                let base = match self.width {
                    8 => "char",
                    16 => "short",
                    64 => "long",
                    _ => "int",
                };
                if self.signed {
                    base.to_string()
                } else {
                    format!("u{}", base)
                }
            }
            (_, Kind::Int) => {
                let sign = if self.signed { "" } else { "u" };
                format!("{}int{}_t", sign, self.width)
            }
        }
    }

    fn cuda_base(&self) -> String {
        let base = match (self.kind, self.width) {
            (Kind::Float, 64) => return "double".to_string(),
            (Kind::Float, _) => return "float".to_string(),
            (Kind::Int, 8) => "char",
            (Kind::Int, 16) => "short",
            (Kind::Int, 64) => "longlong",
            (Kind::Int, _) => "int",
        };
        if self.signed {
            base.to_string()
        } else {
            format!("u{}", base)
        }
    }

    fn x86_vector_decl(&self) -> Option<String> {
        let bits = self.total_size() * 8;
        if bits == 64 {
            return Some("__m64".to_string());
        }
        if !matches!(bits, 128 | 256 | 512) {
            return None;
        }
        let suffix = match (self.kind, self.width) {
            (Kind::Float, 32) => "",
            (Kind::Float, 64) => "d",
            (Kind::Float, 16) => "h",
            (Kind::Float, _) => return None,
            (Kind::Int, _) => "i",
        };
        Some(format!("__m{}{}", bits, suffix))
    }

    fn neon_style_decl(&self) -> String {
        let base = match (self.kind, self.signed) {
            (Kind::Float, _) => "float",
            (Kind::Int, true) => "int",
            (Kind::Int, false) => "uint",
        };
        format!("{}{}x{}_t", base, self.width, self.lanes)
    }
}

impl fmt::Display for NumericType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.signature(), f)
    }
}

impl FromStr for NumericType {
    type Err = String;

    /// Parse short type names such as `f32`, `i16x8` or `u8x16`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let (elem, lanes) = match s.split_once('x') {
            Some((elem, lanes)) => {
                let lanes: u32 = lanes
                    .parse()
                    .map_err(|_| format!("invalid lane count in '{}'", s))?;
                (elem, lanes)
            }
            None => (s, 1),
        };
        if lanes == 0 {
            return Err(format!("zero lanes in '{}'", s));
        }
        if lanes > MAX_LANES {
            return Err(format!("'{}' exceeds {} lanes", s, MAX_LANES));
        }
        let mut chars = elem.chars();
        let prefix = chars.next().ok_or_else(|| "empty type name".to_string())?;
        let width: u32 = chars
            .as_str()
            .parse()
            .map_err(|_| format!("invalid width in '{}'", s))?;
        let ty = match (prefix, width) {
            ('f', 16 | 32 | 64) => NumericType::float(width),
            ('i', 8 | 16 | 32 | 64) => NumericType::int(width),
            ('u', 8 | 16 | 32 | 64) => NumericType::uint(width),
            _ => return Err(format!("unknown numeric type '{}'", s)),
        };
        Ok(ty.vector(lanes))
    }
}

/// Catalog key projection of a [`NumericType`]: everything but alignment.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypeSig {
    pub kind: Kind,
    pub width: u32,
    pub signed: bool,
    pub lanes: u32,
}

impl TypeSig {
    pub fn to_type(self) -> NumericType {
        let scalar = match (self.kind, self.signed) {
            (Kind::Float, _) => NumericType::float(self.width),
            (Kind::Int, true) => NumericType::int(self.width),
            (Kind::Int, false) => NumericType::uint(self.width),
        };
        scalar.vector(self.lanes)
    }
}

impl fmt::Display for TypeSig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let prefix = match (self.kind, self.signed) {
            (Kind::Float, _) => 'f',
            (Kind::Int, true) => 'i',
            (Kind::Int, false) => 'u',
        };
        write!(f, "{}{}", prefix, self.width)?;
        if self.lanes > 1 {
            write!(f, "x{}", self.lanes)?;
        }
        Ok(())
    }
}

/// Type of a generated value: numeric, or an opaque host-side handle
/// that only takes part in arithmetic through registered transitions.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum DataType {
    Numeric(NumericType),
    Opaque(String),
}

impl DataType {
    pub fn numeric(&self) -> Option<&NumericType> {
        match self {
            DataType::Numeric(ty) => Some(ty),
            DataType::Opaque(_) => None,
        }
    }

    pub fn vector_length(&self) -> u32 {
        self.numeric().map_or(1, |ty| ty.lanes)
    }

    pub fn is_vector(&self) -> bool {
        self.vector_length() > 1
    }

    pub fn class(&self) -> TypeClass {
        match self {
            DataType::Numeric(ty) => match ty.kind {
                Kind::Int => TypeClass::Integer,
                Kind::Float => TypeClass::Floating,
            },
            DataType::Opaque(name) => TypeClass::Opaque(name.clone()),
        }
    }

    pub fn decl(&self, language: Language, architecture: Architecture) -> String {
        match self {
            DataType::Numeric(ty) => ty.decl(language, architecture),
            DataType::Opaque(name) => name.clone(),
        }
    }
}

impl From<NumericType> for DataType {
    fn from(ty: NumericType) -> Self {
        DataType::Numeric(ty)
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataType::Numeric(ty) => fmt::Display::fmt(ty, f),
            DataType::Opaque(name) => f.write_str(name),
        }
    }
}

/// Coarse classification used to key transition overrides.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum TypeClass {
    Integer,
    Floating,
    Opaque(String),
}
