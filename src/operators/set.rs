use tracing::debug;

use super::{convert, intrinsic, lowered, Lowering, Source};
use crate::context::RenderContext;
use crate::error::{CodegenError, Result};
use crate::intrinsics::IntrinsicOp;
use crate::target::Language;
use crate::types::{NumericType, TypedOperand};

/// Vector construction: one scalar per lane, or a broadcast.
#[derive(Clone, Copy, Debug)]
pub struct Set<'a> {
    pub source: Source<'a>,
    pub ty: NumericType,
}

impl<'a> Set<'a> {
    pub fn new(source: Source<'a>, ty: NumericType) -> Self {
        Self { source, ty }
    }

    fn sequence(&self, lanes: &[String], cx: &RenderContext<'_>) -> Result<TypedOperand> {
        if lanes.len() != self.ty.lanes as usize {
            return Err(CodegenError::ArityMismatch {
                what: "vector initializer",
                expected: self.ty.lanes,
                found: lanes.len(),
            });
        }
        match cx.language {
            Language::OpenCl => {
                let decl = self.ty.decl(cx.language, cx.architecture);
                return Ok(lowered(format!("({})( {} )", decl, lanes.join(", ")), self.ty));
            }
            Language::C => {}
            other => {
                return Err(CodegenError::unsupported_language(
                    "vector construction from a sequence",
                    other,
                ))
            }
        }

        if let Some(instruction) = cx.catalog.lookup(IntrinsicOp::Set, cx.architecture, &self.ty) {
            return Ok(lowered(
                format!("{}( {} )", instruction, lanes.join(", ")),
                self.ty,
            ));
        }

        // Lane by lane from a zero vector.
        let insert = intrinsic(IntrinsicOp::SetLane, &self.ty, cx)?;
        debug!(ty = %self.ty, "no vector constructor, inserting lanes");
        let zero = TypedOperand::computed("0", self.ty.scalar());
        let mut text = Set::new(Source::Value(&zero), self.ty).lower(cx)?.text;
        for (lane, value) in lanes.iter().enumerate() {
            text = format!("{}({}, {}, {})", insert, value, text, lane);
        }
        Ok(lowered(text, self.ty))
    }
}

impl Lowering for Set<'_> {
    fn lower(&self, cx: &RenderContext<'_>) -> Result<TypedOperand> {
        let value = match self.source {
            Source::Sequence(lanes) => return self.sequence(lanes, cx),
            Source::Value(value) => value,
        };
        let vector_language = matches!(cx.language, Language::C | Language::OpenCl);
        let passthrough = lowered(value.text.clone(), self.ty);
        if !vector_language || !self.ty.is_vector() {
            return Ok(passthrough);
        }
        let Some(from) = value.numeric() else {
            return Ok(passthrough);
        };

        if !from.is_vector() {
            let text = if cx.language == Language::OpenCl {
                let decl = self.ty.decl(cx.language, cx.architecture);
                format!("({})( {} )", decl, value.text)
            } else {
                let splat = intrinsic(IntrinsicOp::Set1, &self.ty, cx)?;
                format!("{}( {} )", splat, value.text)
            };
            return Ok(lowered(text, self.ty));
        }
        if from.signature() != self.ty.signature() {
            return Ok(lowered(convert(value, &self.ty, cx)?, self.ty));
        }
        Ok(passthrough)
    }
}
