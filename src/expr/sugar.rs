//! `std::ops` shorthand over the builders.

use std::ops;

use super::{build, Expr, Operand};
use crate::types::TypedOperand;

macro_rules! binary_sugar {
    ($ty:ty, $($trait:ident :: $method:ident => $builder:ident),+) => {
        $(
            impl<R: Into<Operand>> ops::$trait<R> for $ty {
                type Output = Expr;

                fn $method(self, rhs: R) -> Expr {
                    build::$builder(self, rhs)
                }
            }
        )+
    };
}

binary_sugar!(Expr, Add::add => add, Sub::sub => sub, Mul::mul => mul, Div::div => div);
binary_sugar!(TypedOperand, Add::add => add, Sub::sub => sub, Mul::mul => mul, Div::div => div);
binary_sugar!(&TypedOperand, Add::add => add, Sub::sub => sub, Mul::mul => mul, Div::div => div);

impl ops::Neg for Expr {
    type Output = Expr;

    fn neg(self) -> Expr {
        build::neg(self)
    }
}

impl ops::Neg for &TypedOperand {
    type Output = Expr;

    fn neg(self) -> Expr {
        build::neg(self)
    }
}

impl ops::Not for Expr {
    type Output = Expr;

    fn not(self) -> Expr {
        build::not(self)
    }
}

impl ops::Not for &TypedOperand {
    type Output = Expr;

    fn not(self) -> Expr {
        build::not(self)
    }
}
