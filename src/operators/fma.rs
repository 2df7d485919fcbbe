use tracing::debug;

use super::{binary, coerce, lowered, Lowering, Operator};
use crate::context::RenderContext;
use crate::error::Result;
use crate::intrinsics::IntrinsicOp;
use crate::target::{Architecture, Language};
use crate::types::TypedOperand;

/// Fused multiply-add `a * b + c`, typed like the accumulator `c`.
#[derive(Clone, Copy, Debug)]
pub struct Fma<'a> {
    pub a: &'a TypedOperand,
    pub b: &'a TypedOperand,
    pub c: &'a TypedOperand,
}

impl<'a> Fma<'a> {
    pub fn new(a: &'a TypedOperand, b: &'a TypedOperand, c: &'a TypedOperand) -> Self {
        Self { a, b, c }
    }

    /// `c + a * b`, exactly as the equivalent expression renders.
    fn decomposed(&self, cx: &RenderContext<'_>) -> Result<TypedOperand> {
        let product = binary(Operator::Mul, self.a, self.b, cx)?;
        binary(Operator::Add, self.c, &product, cx)
    }
}

impl Lowering for Fma<'_> {
    fn lower(&self, cx: &RenderContext<'_>) -> Result<TypedOperand> {
        let ty = self.c.numeric().copied();
        let instruction = ty.and_then(|ty| cx.catalog.lookup(IntrinsicOp::Fmadd, cx.architecture, &ty));
        let fused = cx.language != Language::Fortran
            && (instruction.is_some() || cx.language.has_builtin_fma());
        if !fused {
            debug!(language = %cx.language, "no fused multiply-add, decomposing");
            return self.decomposed(cx);
        }

        let operand = |value: &TypedOperand| match &ty {
            Some(ty) => coerce(value, ty, cx),
            None => Ok(value.text.clone()),
        };
        let (a, b, c) = (operand(self.a)?, operand(self.b)?, operand(self.c)?);
        let text = match (cx.language.has_builtin_fma(), instruction, cx.architecture) {
            (true, _, _) => format!("fma({},{},{})", a, b, c),
            (false, Some(fmadd), Architecture::X86) => format!("{}({},{},{})", fmadd, a, b, c),
            // NEON accumulates into its first argument.
            (false, Some(fmadd), Architecture::Arm) => format!("{}({},{},{})", fmadd, c, a, b),
            _ => {
                let product = binary(Operator::Mul, self.a, self.b, cx)?;
                return binary(Operator::Add, &product, self.c, cx);
            }
        };
        Ok(lowered(text, self.c.ty.clone()))
    }
}
