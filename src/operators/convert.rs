use tracing::debug;

use crate::context::RenderContext;
use crate::error::{CodegenError, Result};
use crate::target::Language;
use crate::types::{Kind, NumericType, TypedOperand};

/// Render `value` converted to type `to`.
///
/// Equal signatures pass through. Vector conversions nest the catalog's
/// conversion path around the value, innermost first.
pub fn convert(value: &TypedOperand, to: &NumericType, cx: &RenderContext<'_>) -> Result<String> {
    let Some(from) = value.numeric() else {
        return Ok(value.text.clone());
    };
    if from.signature() == to.signature() {
        return Ok(value.text.clone());
    }
    let decl = to.decl(cx.language, cx.architecture);
    match cx.language {
        Language::OpenCl => return Ok(format!("convert_{}( {} )", decl, value.text)),
        Language::Fortran => {
            let intrinsic = match to.kind {
                Kind::Int => "int",
                Kind::Float => "real",
            };
            return Ok(format!("{}( {}, {} )", intrinsic, value.text, to.element_size()));
        }
        Language::C | Language::Cuda => {}
    }
    if !from.is_vector() && !to.is_vector() {
        return Ok(format!("({})( {} )", decl, value.text));
    }
    if from.is_vector() != to.is_vector() || cx.language == Language::Cuda {
        return Err(CodegenError::ConversionPathNotFound {
            from: from.to_string(),
            to: to.to_string(),
            architecture: cx.architecture,
        });
    }

    let path = cx.catalog.conversion_path(from, to, cx.architecture)?;
    debug!(%from, %to, steps = path.len(), "vector conversion");
    Ok(path
        .iter()
        .fold(value.text.clone(), |text, instruction| {
            format!("{}( {} )", instruction, text)
        }))
}
