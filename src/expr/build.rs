//! Builder functions, the canonical way to construct trees.

use super::{Expr, Expression, Operand};
use crate::operators::Operator;
use crate::types::NumericType;

fn binary(operator: Operator, lhs: impl Into<Operand>, rhs: impl Into<Operand>) -> Expr {
    Expr::Op(Expression::new(operator, Some(lhs.into()), Some(rhs.into())))
}

fn unary(operator: Operator, operand: impl Into<Operand>) -> Expr {
    Expr::Op(Expression::new(operator, None, Some(operand.into())))
}

// ── Arithmetic and comparison ──

pub fn add(lhs: impl Into<Operand>, rhs: impl Into<Operand>) -> Expr {
    binary(Operator::Add, lhs, rhs)
}

pub fn sub(lhs: impl Into<Operand>, rhs: impl Into<Operand>) -> Expr {
    binary(Operator::Sub, lhs, rhs)
}

pub fn mul(lhs: impl Into<Operand>, rhs: impl Into<Operand>) -> Expr {
    binary(Operator::Mul, lhs, rhs)
}

pub fn div(lhs: impl Into<Operand>, rhs: impl Into<Operand>) -> Expr {
    binary(Operator::Div, lhs, rhs)
}

/// `dest = value`, lowered to a load or store for vector operands.
pub fn assign(dest: impl Into<Operand>, value: impl Into<Operand>) -> Expr {
    binary(Operator::Assign, dest, value)
}

pub fn eq(lhs: impl Into<Operand>, rhs: impl Into<Operand>) -> Expr {
    binary(Operator::Eq, lhs, rhs)
}

pub fn ne(lhs: impl Into<Operand>, rhs: impl Into<Operand>) -> Expr {
    binary(Operator::Ne, lhs, rhs)
}

pub fn lt(lhs: impl Into<Operand>, rhs: impl Into<Operand>) -> Expr {
    binary(Operator::Lt, lhs, rhs)
}

pub fn le(lhs: impl Into<Operand>, rhs: impl Into<Operand>) -> Expr {
    binary(Operator::Le, lhs, rhs)
}

pub fn gt(lhs: impl Into<Operand>, rhs: impl Into<Operand>) -> Expr {
    binary(Operator::Gt, lhs, rhs)
}

pub fn ge(lhs: impl Into<Operand>, rhs: impl Into<Operand>) -> Expr {
    binary(Operator::Ge, lhs, rhs)
}

pub fn and(lhs: impl Into<Operand>, rhs: impl Into<Operand>) -> Expr {
    binary(Operator::And, lhs, rhs)
}

pub fn or(lhs: impl Into<Operand>, rhs: impl Into<Operand>) -> Expr {
    binary(Operator::Or, lhs, rhs)
}

/// `base[index]`, `base(index)` in Fortran.
pub fn index(base: impl Into<Operand>, index: impl Into<Operand>) -> Expr {
    binary(Operator::Index, base, index)
}

// ── Unary ──

pub fn neg(operand: impl Into<Operand>) -> Expr {
    unary(Operator::Neg, operand)
}

pub fn plus(operand: impl Into<Operand>) -> Expr {
    unary(Operator::Plus, operand)
}

pub fn not(operand: impl Into<Operand>) -> Expr {
    unary(Operator::Not, operand)
}

pub fn address_of(operand: impl Into<Operand>) -> Expr {
    unary(Operator::AddressOf, operand)
}

pub fn deref(operand: impl Into<Operand>) -> Expr {
    unary(Operator::Deref, operand)
}

pub fn ret(value: impl Into<Operand>) -> Expr {
    unary(Operator::Return, value)
}

// ── Vector operations ──

/// Read a `ty` vector starting at `source`.
pub fn load(source: impl Into<Operand>, ty: NumericType) -> Expr {
    Expr::Load {
        source: source.into(),
        ty,
    }
}

pub fn load_seq<T: Into<Operand>>(lanes: impl IntoIterator<Item = T>, ty: NumericType) -> Expr {
    Expr::LoadSeq {
        lanes: lanes.into_iter().map(Into::into).collect(),
        ty,
    }
}

pub fn store(dest: impl Into<Operand>, source: impl Into<Operand>) -> Expr {
    Expr::Store {
        dest: dest.into(),
        source: source.into(),
    }
}

/// Broadcast a scalar, or convert a vector, to `ty`.
pub fn set(source: impl Into<Operand>, ty: NumericType) -> Expr {
    Expr::Set {
        source: source.into(),
        ty,
    }
}

pub fn set_seq<T: Into<Operand>>(lanes: impl IntoIterator<Item = T>, ty: NumericType) -> Expr {
    Expr::SetSeq {
        lanes: lanes.into_iter().map(Into::into).collect(),
        ty,
    }
}

pub fn mask_load(source: impl Into<Operand>, mask: &[bool], ty: NumericType) -> Expr {
    Expr::MaskLoad {
        source: source.into(),
        mask: mask.to_vec(),
        ty,
    }
}

pub fn mask_store(dest: impl Into<Operand>, source: impl Into<Operand>, mask: &[bool]) -> Expr {
    Expr::MaskStore {
        dest: dest.into(),
        source: source.into(),
        mask: mask.to_vec(),
    }
}

/// `a * b + c`.
pub fn fma(a: impl Into<Operand>, b: impl Into<Operand>, c: impl Into<Operand>) -> Expr {
    Expr::Fma {
        a: a.into(),
        b: b.into(),
        c: c.into(),
    }
}

pub fn ternary(
    cond: impl Into<Operand>,
    then: impl Into<Operand>,
    otherwise: impl Into<Operand>,
) -> Expr {
    Expr::Ternary {
        cond: cond.into(),
        then: then.into(),
        otherwise: otherwise.into(),
    }
}
