//! Operator catalog: per-language rendering of every operator kind and
//! the lowering of vector operations onto catalog intrinsics.
//!
//! Operands reaching this module are already realized [`TypedOperand`]s.
//! Scalar operators render through [`Operator::render`]; vector memory,
//! construction and fused operations implement [`Lowering`].

mod convert;
mod fma;
mod memory;
mod set;

use tracing::trace;

use crate::context::RenderContext;
use crate::error::{CodegenError, Result};
use crate::intrinsics::IntrinsicOp;
use crate::target::Language;
use crate::types::{DataType, NumericType, TypedOperand};

pub use convert::convert;
pub use fma::Fma;
pub use memory::{Load, MaskLoad, MaskStore, Store};
pub use set::Set;

/// Closed set of expression operators.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Operator {
    Assign,
    Add,
    Sub,
    Mul,
    Div,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    And,
    Or,
    /// Unary minus.
    Neg,
    /// Unary plus.
    Plus,
    Not,
    AddressOf,
    Deref,
    /// Array element access `a[i]`.
    Index,
    Return,
    /// Branch selection of the conditional `(c ? a : b)`, typed from its
    /// two branches.
    Select,
}

impl Operator {
    /// Operator token in `language`.
    pub fn symbol(self, language: Language) -> &'static str {
        let fortran = language == Language::Fortran;
        match self {
            Operator::Assign => "=",
            Operator::Add | Operator::Plus => "+",
            Operator::Sub | Operator::Neg => "-",
            Operator::Mul | Operator::Deref => "*",
            Operator::Div => "/",
            Operator::Eq => "==",
            Operator::Ne if fortran => "/=",
            Operator::Ne => "!=",
            Operator::Lt => "<",
            Operator::Le => "<=",
            Operator::Gt => ">",
            Operator::Ge => ">=",
            Operator::And if fortran => ".and.",
            Operator::And => "&&",
            Operator::Or if fortran => ".or.",
            Operator::Or => "||",
            Operator::Not if fortran => ".not.",
            Operator::Not => "!",
            Operator::AddressOf => "&",
            Operator::Index => "[]",
            Operator::Return => "return",
            Operator::Select => "?:",
        }
    }

    /// Operators taking a single operand on their right.
    pub fn is_unary(self) -> bool {
        matches!(
            self,
            Operator::Neg
                | Operator::Plus
                | Operator::Not
                | Operator::AddressOf
                | Operator::Deref
                | Operator::Return
        )
    }

    /// Catalog operation implementing this operator on C vectors.
    pub fn intrinsic(self) -> Option<IntrinsicOp> {
        match self {
            Operator::Add => Some(IntrinsicOp::Add),
            Operator::Sub => Some(IntrinsicOp::Sub),
            Operator::Mul => Some(IntrinsicOp::Mul),
            Operator::Div => Some(IntrinsicOp::Div),
            _ => None,
        }
    }

    /// Plain textual form of `lhs op rhs`. A missing side renders empty.
    pub fn render(self, lhs: Option<&str>, rhs: Option<&str>, language: Language) -> String {
        let a = lhs.unwrap_or("");
        let b = rhs.unwrap_or("");
        let sym = self.symbol(language);
        match self {
            Operator::Add => format!("{} + {}", a, b),
            Operator::Sub => format!("{} - ({})", a, b),
            Operator::Mul | Operator::Div => format!("({}) {} ({})", a, sym, b),
            Operator::And | Operator::Or => format!("({}) {} ({})", a, sym, b),
            Operator::Neg => format!(" -({})", b),
            Operator::Plus => format!(" +{}", b),
            Operator::Not if language == Language::Fortran => format!(" .not. ({})", b),
            Operator::Not => format!(" !({})", b),
            Operator::AddressOf if language == Language::Fortran => format!(" {}", b),
            Operator::AddressOf => format!(" &{}", b),
            Operator::Deref if lhs.is_some() => format!("{} * {}", a, b),
            Operator::Deref => format!(" *{}", b),
            Operator::Index if language == Language::Fortran => format!("{}({})", a, b),
            Operator::Index => format!("{}[{}]", a, b),
            Operator::Return => format!("return {}", b),
            Operator::Select => format!("{} : {}", a, b),
            _ => format!("{} {} {}", a, sym, b),
        }
    }
}

// ── Lowering ──

/// A vector operation lowered to target text for one context.
pub trait Lowering {
    /// Produce the rendered value of this operation.
    fn lower(&self, cx: &RenderContext<'_>) -> Result<TypedOperand>;
}

/// Value a load or a vector construction reads from.
#[derive(Clone, Copy, Debug)]
pub enum Source<'a> {
    /// Rendered scalars, one per lane.
    Sequence(&'a [String]),
    Value(&'a TypedOperand),
}

/// Apply a binary operator to two realized operands.
///
/// The transition registry picks the result type and the effective
/// operator; assignment and C vector arithmetic lower further.
pub fn binary(
    op: Operator,
    lhs: &TypedOperand,
    rhs: &TypedOperand,
    cx: &RenderContext<'_>,
) -> Result<TypedOperand> {
    let (result, op) = cx.transitions.transition(&lhs.ty, &rhs.ty, op)?;
    trace!(?op, %result, "binary");
    let text = match (op, op.intrinsic(), result.numeric()) {
        (Operator::Assign, _, _) => assign(lhs, rhs, cx)?,
        (_, Some(intrinsic), Some(ty)) if cx.language == Language::C && ty.is_vector() => {
            vector_arithmetic(intrinsic, lhs, rhs, ty, cx)?
        }
        _ => op.render(Some(&lhs.text), Some(&rhs.text), cx.language),
    };
    Ok(TypedOperand::computed(text, result))
}

/// Assignment: a vector destination loads its value, a vector value
/// stored into a scalar-width location becomes a store.
fn assign(lhs: &TypedOperand, rhs: &TypedOperand, cx: &RenderContext<'_>) -> Result<String> {
    if let Some(dest) = lhs.numeric().filter(|ty| ty.is_vector()) {
        let value = Load::new(Source::Value(rhs), *dest).lower(cx)?;
        return Ok(format!("{} = {}", lhs.text, value.text));
    }
    if rhs.is_vector() {
        return Store::new(lhs, rhs).lower(cx).map(|stored| stored.text);
    }
    Ok(Operator::Assign.render(Some(&lhs.text), Some(&rhs.text), cx.language))
}

fn vector_arithmetic(
    op: IntrinsicOp,
    lhs: &TypedOperand,
    rhs: &TypedOperand,
    ty: &NumericType,
    cx: &RenderContext<'_>,
) -> Result<String> {
    let instruction = intrinsic(op, ty, cx)?;
    let a = coerce(lhs, ty, cx)?;
    let b = coerce(rhs, ty, cx)?;
    Ok(format!("{}( {}, {} )", instruction, a, b))
}

/// Bring `value` to type `to`: vectors convert, scalars broadcast into
/// vector destinations and cast into scalar ones.
pub(crate) fn coerce(value: &TypedOperand, to: &NumericType, cx: &RenderContext<'_>) -> Result<String> {
    match value.numeric() {
        Some(ty) if !ty.is_vector() && to.is_vector() => {
            Set::new(Source::Value(value), *to).lower(cx).map(|set| set.text)
        }
        Some(_) => convert(value, to, cx),
        None => Ok(value.text.clone()),
    }
}

/// Catalog instruction or [`CodegenError::UnsupportedOperation`].
pub(crate) fn intrinsic<'c>(
    op: IntrinsicOp,
    ty: &NumericType,
    cx: &RenderContext<'c>,
) -> Result<&'c str> {
    cx.catalog
        .lookup(op, cx.architecture, ty)
        .ok_or_else(|| CodegenError::UnsupportedOperation {
            op,
            architecture: cx.architecture,
            ty: ty.to_string(),
        })
}

/// Fortran has no conditional expression.
pub fn check_ternary(language: Language) -> Result<()> {
    if language == Language::Fortran {
        return Err(CodegenError::unsupported_language("the ternary operator", language));
    }
    Ok(())
}

/// Conditional selection `(cond ? a : b)`.
pub fn ternary(cond: &str, then: &str, otherwise: &str, language: Language) -> Result<String> {
    check_ternary(language)?;
    Ok(format!("({} ? {} : {})", cond, then, otherwise))
}

/// Result of a lowering: the value computed as `text` with type `ty`.
fn lowered(text: String, ty: impl Into<DataType>) -> TypedOperand {
    TypedOperand::computed(text, ty)
}
