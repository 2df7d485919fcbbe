//! Expression trees.
//!
//! Trees are immutable once built and render as a pure function of the
//! tree and a [`RenderContext`]. Every operand goes through
//! [`Operand::resolve`] before an operator sees it.

mod build;
mod sugar;
#[cfg(test)]
mod tests;

use tracing::trace;

use crate::context::RenderContext;
use crate::error::{CodegenError, Result};
use crate::operators::{
    self, Fma, Load, Lowering, MaskLoad, MaskStore, Operator, Set, Source, Store,
};
use crate::types::{DataType, NumericType, TypedOperand};

pub use build::*;

// ── Operands ──

/// A constant written directly into the tree.
#[derive(Clone, Debug, PartialEq)]
pub enum Literal {
    Int(i64),
    Float(f64),
    /// Source text used verbatim. Never typed.
    Raw(String),
}

impl Literal {
    pub fn text(&self) -> String {
        match self {
            Literal::Int(v) => v.to_string(),
            Literal::Float(v) => format!("{:?}", v),
            Literal::Raw(text) => text.clone(),
        }
    }

    /// Typed value following C literal rules: integers are `int32` unless
    /// out of range, floating constants are `double`.
    pub fn resolve(&self) -> Option<TypedOperand> {
        let ty = match self {
            Literal::Int(v) if i32::try_from(*v).is_ok() => NumericType::int(32),
            Literal::Int(_) => NumericType::int(64),
            Literal::Float(_) => NumericType::float(64),
            Literal::Raw(_) => return None,
        };
        Some(TypedOperand::literal(self.text(), ty))
    }

    /// Reject constants no target language can spell.
    fn checked(&self) -> Result<&Self> {
        match self {
            Literal::Float(v) if !v.is_finite() => Err(CodegenError::Construction(format!(
                "non-finite literal {}",
                v
            ))),
            _ => Ok(self),
        }
    }
}

/// One side of an operation.
#[derive(Clone, Debug, PartialEq)]
pub enum Operand {
    Literal(Literal),
    Value(TypedOperand),
    Expr(Box<Expr>),
}

impl Operand {
    /// The realized value of this operand, or `None` when it can only be
    /// rendered as text.
    pub fn resolve(&self, cx: &RenderContext<'_>) -> Result<Option<TypedOperand>> {
        match self {
            Operand::Literal(literal) => Ok(literal.checked()?.resolve()),
            Operand::Value(value) => Ok(Some(value.clone())),
            Operand::Expr(expr) => expr.evaluate(cx).map(Evaluated::into_operand),
        }
    }

    pub fn render(&self, cx: &RenderContext<'_>) -> Result<String> {
        match self {
            Operand::Literal(literal) => Ok(literal.checked()?.text()),
            Operand::Value(value) => Ok(value.text.clone()),
            Operand::Expr(expr) => expr.render(cx),
        }
    }

    /// Resolve, requiring a typed value.
    fn require(&self, what: &str, cx: &RenderContext<'_>) -> Result<TypedOperand> {
        self.resolve(cx)?
            .ok_or_else(|| CodegenError::Construction(format!("{} has no type", what)))
    }
}

impl From<TypedOperand> for Operand {
    fn from(value: TypedOperand) -> Self {
        Operand::Value(value)
    }
}

impl From<&TypedOperand> for Operand {
    fn from(value: &TypedOperand) -> Self {
        Operand::Value(value.clone())
    }
}

impl From<Expr> for Operand {
    fn from(expr: Expr) -> Self {
        Operand::Expr(Box::new(expr))
    }
}

impl From<Literal> for Operand {
    fn from(literal: Literal) -> Self {
        Operand::Literal(literal)
    }
}

impl From<i32> for Operand {
    fn from(v: i32) -> Self {
        Operand::Literal(Literal::Int(v.into()))
    }
}

impl From<i64> for Operand {
    fn from(v: i64) -> Self {
        Operand::Literal(Literal::Int(v))
    }
}

impl From<f64> for Operand {
    fn from(v: f64) -> Self {
        Operand::Literal(Literal::Float(v))
    }
}

impl From<&str> for Operand {
    fn from(text: &str) -> Self {
        Operand::Literal(Literal::Raw(text.to_string()))
    }
}

// ── Nodes ──

/// Operator applied to up to two operands.
#[derive(Clone, Debug, PartialEq)]
pub struct Expression {
    pub operator: Operator,
    pub lhs: Option<Operand>,
    pub rhs: Option<Operand>,
}

impl Expression {
    pub fn new(operator: Operator, lhs: Option<Operand>, rhs: Option<Operand>) -> Self {
        Self { operator, lhs, rhs }
    }

    fn evaluate(&self, cx: &RenderContext<'_>) -> Result<Evaluated> {
        if self.lhs.is_none() && self.rhs.is_none() {
            return Err(CodegenError::Construction(format!(
                "{:?} has no operand",
                self.operator
            )));
        }
        let lhs = resolve_side(self.lhs.as_ref(), cx)?;
        let rhs = resolve_side(self.rhs.as_ref(), cx)?;

        if let (Side::Typed(a), Side::Typed(b)) = (&lhs, &rhs) {
            return operators::binary(self.operator, a, b, cx).map(Evaluated::Typed);
        }
        let text = self.operator.render(lhs.text(), rhs.text(), cx.language);
        // A single typed side types the result.
        let ty = match (lhs, rhs) {
            (Side::Typed(side), _) | (_, Side::Typed(side)) => side.ty,
            _ => return Ok(Evaluated::Text(text)),
        };
        let ty = match (self.operator, &ty) {
            (Operator::Index, DataType::Numeric(ty)) => DataType::Numeric(ty.scalar()),
            _ => ty,
        };
        Ok(Evaluated::Typed(TypedOperand::computed(text, ty)))
    }

    pub fn render(&self, cx: &RenderContext<'_>) -> Result<String> {
        self.evaluate(cx).map(Evaluated::into_text)
    }

    pub fn materialize(&self, cx: &RenderContext<'_>) -> Result<TypedOperand> {
        self.evaluate(cx)?.typed()
    }
}

/// A node of an expression tree.
#[derive(Clone, Debug, PartialEq)]
pub enum Expr {
    Op(Expression),
    Load {
        source: Operand,
        ty: NumericType,
    },
    /// Vector built from one operand per lane.
    LoadSeq {
        lanes: Vec<Operand>,
        ty: NumericType,
    },
    Store {
        dest: Operand,
        source: Operand,
    },
    Set {
        source: Operand,
        ty: NumericType,
    },
    SetSeq {
        lanes: Vec<Operand>,
        ty: NumericType,
    },
    MaskLoad {
        source: Operand,
        mask: Vec<bool>,
        ty: NumericType,
    },
    MaskStore {
        dest: Operand,
        source: Operand,
        mask: Vec<bool>,
    },
    Fma {
        a: Operand,
        b: Operand,
        c: Operand,
    },
    Ternary {
        cond: Operand,
        then: Operand,
        otherwise: Operand,
    },
}

impl Expr {
    /// Source text of this tree.
    pub fn render(&self, cx: &RenderContext<'_>) -> Result<String> {
        trace!(language = %cx.language, architecture = %cx.architecture, "render");
        self.evaluate(cx).map(Evaluated::into_text)
    }

    /// The value of this tree, typed and with storage attributes cleared.
    pub fn materialize(&self, cx: &RenderContext<'_>) -> Result<TypedOperand> {
        self.evaluate(cx)?.typed()
    }

    fn evaluate(&self, cx: &RenderContext<'_>) -> Result<Evaluated> {
        let value = match self {
            Expr::Op(expression) => return expression.evaluate(cx),
            Expr::Load { source, ty } => {
                let source = source.require("load source", cx)?;
                Load::new(Source::Value(&source), *ty).lower(cx)?
            }
            Expr::LoadSeq { lanes, ty } => {
                let lanes = render_all(lanes, cx)?;
                Load::new(Source::Sequence(&lanes), *ty).lower(cx)?
            }
            Expr::Store { dest, source } => {
                let dest = dest.require("store destination", cx)?;
                let source = source.require("stored value", cx)?;
                Store::new(&dest, &source).lower(cx)?
            }
            Expr::Set { source, ty } => match source.resolve(cx)? {
                Some(source) => Set::new(Source::Value(&source), *ty).lower(cx)?,
                None => broadcast_text(&source.render(cx)?, ty, cx)?,
            },
            Expr::SetSeq { lanes, ty } => {
                let lanes = render_all(lanes, cx)?;
                Set::new(Source::Sequence(&lanes), *ty).lower(cx)?
            }
            Expr::MaskLoad { source, mask, ty } => {
                let source = source.require("masked load source", cx)?;
                MaskLoad::new(&source, mask, *ty).lower(cx)?
            }
            Expr::MaskStore { dest, source, mask } => {
                let dest = dest.require("masked store destination", cx)?;
                let source = source.require("masked stored value", cx)?;
                let ty = source.numeric().copied().ok_or_else(|| {
                    CodegenError::Construction("masked stored value is not numeric".to_string())
                })?;
                MaskStore::new(&dest, &source, mask, ty).lower(cx)?
            }
            Expr::Fma { a, b, c } => {
                let sides = (a.resolve(cx)?, b.resolve(cx)?, c.resolve(cx)?);
                match sides {
                    (Some(a), Some(b), Some(c)) => Fma::new(&a, &b, &c).lower(cx)?,
                    // Untyped operands cannot be fused; keep the plain form.
                    _ => return add(c.clone(), mul(a.clone(), b.clone())).evaluate(cx),
                }
            }
            Expr::Ternary {
                cond,
                then,
                otherwise,
            } => return ternary_value(cond, then, otherwise, cx),
        };
        Ok(Evaluated::Typed(value))
    }
}

fn ternary_value(
    cond: &Operand,
    then: &Operand,
    otherwise: &Operand,
    cx: &RenderContext<'_>,
) -> Result<Evaluated> {
    operators::check_ternary(cx.language)?;
    let text = operators::ternary(
        &cond.render(cx)?,
        &then.render(cx)?,
        &otherwise.render(cx)?,
        cx.language,
    )?;
    let ty = match (then.resolve(cx)?, otherwise.resolve(cx)?) {
        (Some(a), Some(b)) => {
            let (ty, _) = cx.transitions.transition(&a.ty, &b.ty, Operator::Select)?;
            Some(ty)
        }
        (Some(side), None) | (None, Some(side)) => Some(side.ty),
        (None, None) => None,
    };
    Ok(match ty {
        Some(ty) => Evaluated::Typed(TypedOperand::computed(text, ty)),
        None => Evaluated::Text(text),
    })
}

/// Broadcast of untyped text, taken as a scalar of the element type.
fn broadcast_text(text: &str, ty: &NumericType, cx: &RenderContext<'_>) -> Result<TypedOperand> {
    let value = TypedOperand::computed(text, ty.scalar());
    Set::new(Source::Value(&value), *ty).lower(cx)
}

fn render_all(operands: &[Operand], cx: &RenderContext<'_>) -> Result<Vec<String>> {
    operands.iter().map(|operand| operand.render(cx)).collect()
}

// ── Evaluation ──

enum Side {
    Missing,
    Text(String),
    Typed(TypedOperand),
}

impl Side {
    fn text(&self) -> Option<&str> {
        match self {
            Side::Missing => None,
            Side::Text(text) => Some(text),
            Side::Typed(value) => Some(&value.text),
        }
    }
}

fn resolve_side(operand: Option<&Operand>, cx: &RenderContext<'_>) -> Result<Side> {
    let Some(operand) = operand else {
        return Ok(Side::Missing);
    };
    let evaluated = match operand {
        Operand::Expr(expr) => expr.evaluate(cx)?,
        Operand::Literal(literal) => match literal.checked()?.resolve() {
            Some(value) => Evaluated::Typed(value),
            None => Evaluated::Text(literal.text()),
        },
        Operand::Value(value) => Evaluated::Typed(value.clone()),
    };
    Ok(match evaluated {
        Evaluated::Typed(value) => Side::Typed(value),
        Evaluated::Text(text) => Side::Text(text),
    })
}

/// Result of evaluating a node: typed, or text only when no operand
/// carried a type.
enum Evaluated {
    Typed(TypedOperand),
    Text(String),
}

impl Evaluated {
    fn into_text(self) -> String {
        match self {
            Evaluated::Typed(value) => value.text,
            Evaluated::Text(text) => text,
        }
    }

    fn into_operand(self) -> Option<TypedOperand> {
        match self {
            Evaluated::Typed(value) => Some(value),
            Evaluated::Text(_) => None,
        }
    }

    fn typed(self) -> Result<TypedOperand> {
        match self {
            Evaluated::Typed(value) => Ok(value),
            Evaluated::Text(text) => Err(CodegenError::Construction(format!(
                "`{}` has no typed operand",
                text.trim()
            ))),
        }
    }
}
