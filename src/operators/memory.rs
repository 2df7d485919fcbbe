//! Vector loads and stores, plain and masked.
//!
//! Scalar-width operands are turned into addresses: a leading `*` is
//! dropped, anything else gets `&`. The aligned instruction is chosen only
//! when the memory side declares an alignment equal to the vector size.

use super::{convert, intrinsic, lowered, Lowering, Operator, Set, Source};
use crate::context::RenderContext;
use crate::error::{CodegenError, Result};
use crate::intrinsics::IntrinsicOp;
use crate::target::{Architecture, Language};
use crate::types::{Kind, NumericType, TypedOperand};

/// Pointer element type used to cast addresses handed to intrinsics.
///
/// x86 integer loads and stores take a pointer to the vector type.
fn pointer_type(ty: &NumericType, cx: &RenderContext<'_>) -> String {
    if cx.architecture == Architecture::X86 && ty.kind == Kind::Int {
        ty.decl(cx.language, cx.architecture)
    } else {
        ty.scalar().decl(cx.language, cx.architecture)
    }
}

fn sized_memory_op(aligned: bool, aligned_op: IntrinsicOp, op: IntrinsicOp) -> IntrinsicOp {
    if aligned {
        aligned_op
    } else {
        op
    }
}

// ── Load ──

/// Read a vector of type `ty` from memory or from another value.
#[derive(Clone, Copy, Debug)]
pub struct Load<'a> {
    pub source: Source<'a>,
    pub ty: NumericType,
}

impl<'a> Load<'a> {
    pub fn new(source: Source<'a>, ty: NumericType) -> Self {
        Self { source, ty }
    }
}

impl Lowering for Load<'_> {
    fn lower(&self, cx: &RenderContext<'_>) -> Result<TypedOperand> {
        let source = match self.source {
            Source::Sequence(_) => return Set::new(self.source, self.ty).lower(cx),
            Source::Value(source) => source,
        };
        let passthrough = lowered(source.text.clone(), self.ty);
        if !matches!(cx.language, Language::C | Language::OpenCl) {
            return Ok(passthrough);
        }
        let Some(from) = source.numeric() else {
            return Ok(passthrough);
        };
        if from.signature() == self.ty.signature() {
            return Ok(passthrough);
        }
        if from.is_vector() {
            return Ok(lowered(convert(source, &self.ty, cx)?, self.ty));
        }
        // A literal has no address.
        if source.literal {
            return Set::new(self.source, self.ty).lower(cx);
        }

        let address = source.address();
        if cx.language == Language::OpenCl {
            let text = format!("vload{}(0, {})", self.ty.lanes, address);
            return Ok(lowered(text, self.ty));
        }
        if cx.architecture == Architecture::X86 && self.ty.total_size() == 8 {
            let text = format!("_m_from_int64( *((int64_t * ) {} ) )", address);
            return Ok(lowered(text, self.ty));
        }

        let aligned = source.alignment == Some(self.ty.total_size());
        let op = sized_memory_op(aligned, IntrinsicOp::LoadAligned, IntrinsicOp::Load);
        let instruction = intrinsic(op, &self.ty, cx)?;
        let text = if cx.architecture == Architecture::X86 && self.ty.kind == Kind::Int {
            format!("{}( ({} * ) {} )", instruction, pointer_type(&self.ty, cx), address)
        } else {
            format!("{}( {} )", instruction, address)
        };
        Ok(lowered(text, self.ty))
    }
}

// ── Store ──

/// Write vector `source` to the location `dest`.
#[derive(Clone, Copy, Debug)]
pub struct Store<'a> {
    pub dest: &'a TypedOperand,
    pub source: &'a TypedOperand,
}

impl<'a> Store<'a> {
    pub fn new(dest: &'a TypedOperand, source: &'a TypedOperand) -> Self {
        Self { dest, source }
    }
}

impl Lowering for Store<'_> {
    fn lower(&self, cx: &RenderContext<'_>) -> Result<TypedOperand> {
        let (dest, source) = (self.dest, self.source);
        let ty = source.ty.clone();
        let plain = || {
            let text = Operator::Assign.render(Some(&dest.text), Some(&source.text), cx.language);
            lowered(text, ty.clone())
        };
        if !matches!(cx.language, Language::C | Language::OpenCl) {
            return Ok(plain());
        }
        let Some(vector) = source.numeric().filter(|ty| ty.is_vector()) else {
            return Ok(plain());
        };

        let address = dest.address();
        if cx.language == Language::OpenCl {
            let text = format!("vstore{}({}, 0, {})", vector.lanes, source.text, address);
            return Ok(lowered(text, *vector));
        }
        if cx.architecture == Architecture::X86 && vector.total_size() == 8 {
            let text = format!("*((int64_t * ) {}) = _m_to_int64( {} )", address, source.text);
            return Ok(lowered(text, *vector));
        }

        let aligned = dest.alignment == Some(vector.total_size());
        let op = sized_memory_op(aligned, IntrinsicOp::StoreAligned, IntrinsicOp::Store);
        let instruction = intrinsic(op, vector, cx)?;
        let text = format!(
            "{}( ({} * ) {}, {} )",
            instruction,
            pointer_type(vector, cx),
            address,
            source.text
        );
        Ok(lowered(text, *vector))
    }
}

// ── Masked access ──

/// The mask as a vector of all-ones or zero integers of the element width.
fn mask_vector(mask: &[bool], ty: &NumericType, cx: &RenderContext<'_>) -> Result<String> {
    let lanes: Vec<String> = mask
        .iter()
        .map(|&on| if on { "-1" } else { "0" }.to_string())
        .collect();
    let mask_ty = NumericType::int(ty.width).vector(ty.lanes);
    Ok(Load::new(Source::Sequence(&lanes), mask_ty).lower(cx)?.text)
}

fn check_mask(mask: &[bool], ty: &NumericType, language: Language) -> Result<()> {
    if mask.len() != ty.lanes as usize {
        return Err(CodegenError::ArityMismatch {
            what: "mask",
            expected: ty.lanes,
            found: mask.len(),
        });
    }
    if language != Language::C {
        return Err(CodegenError::unsupported_language("masked memory access", language));
    }
    Ok(())
}

/// Load the lanes of `ty` whose mask flag is set.
#[derive(Clone, Copy, Debug)]
pub struct MaskLoad<'a> {
    pub source: &'a TypedOperand,
    pub mask: &'a [bool],
    pub ty: NumericType,
}

impl<'a> MaskLoad<'a> {
    pub fn new(source: &'a TypedOperand, mask: &'a [bool], ty: NumericType) -> Self {
        Self { source, mask, ty }
    }
}

impl Lowering for MaskLoad<'_> {
    fn lower(&self, cx: &RenderContext<'_>) -> Result<TypedOperand> {
        check_mask(self.mask, &self.ty, cx.language)?;
        let instruction = intrinsic(IntrinsicOp::MaskLoad, &self.ty, cx)?;
        let mask = mask_vector(self.mask, &self.ty, cx)?;
        let element = self.ty.scalar().decl(cx.language, cx.architecture);
        let text = format!(
            "{}(({} * ){}, {})",
            instruction,
            element,
            self.source.address(),
            mask
        );
        Ok(lowered(text, self.ty))
    }
}

/// Store the lanes of `source` whose mask flag is set.
#[derive(Clone, Copy, Debug)]
pub struct MaskStore<'a> {
    pub dest: &'a TypedOperand,
    pub source: &'a TypedOperand,
    pub mask: &'a [bool],
    /// Vector type written to memory.
    pub ty: NumericType,
}

impl<'a> MaskStore<'a> {
    pub fn new(
        dest: &'a TypedOperand,
        source: &'a TypedOperand,
        mask: &'a [bool],
        ty: NumericType,
    ) -> Self {
        Self {
            dest,
            source,
            mask,
            ty,
        }
    }
}

impl Lowering for MaskStore<'_> {
    fn lower(&self, cx: &RenderContext<'_>) -> Result<TypedOperand> {
        check_mask(self.mask, &self.ty, cx.language)?;
        let instruction = intrinsic(IntrinsicOp::MaskStore, &self.ty, cx)?;
        let mask = mask_vector(self.mask, &self.ty, cx)?;
        let element = self.ty.scalar().decl(cx.language, cx.architecture);
        let value = convert(self.source, &self.ty, cx)?;
        let text = format!(
            "{}(({} * ){}, {}, {})",
            instruction,
            element,
            self.dest.address(),
            mask,
            value
        );
        Ok(lowered(text, self.ty))
    }
}
