//! Code generation errors.

use std::path::PathBuf;

use thiserror::Error;

use crate::intrinsics::IntrinsicOp;
use crate::target::{Architecture, Language};

/// Code generation result type.
pub type Result<T> = std::result::Result<T, CodegenError>;

/// Everything that can abort the generation of a kernel.
///
/// A missing intrinsic is not represented here: catalog lookups return
/// `Option` and callers pick a fallback lowering. Only when no fallback
/// exists does the absence surface as [`CodegenError::UnsupportedOperation`].
#[derive(Debug, Error)]
pub enum CodegenError {
    #[error("invalid expression: {0}")]
    Construction(String),

    #[error("no type transition from {left} and {right} for `{operator}`")]
    TypeTransition {
        left: String,
        right: String,
        operator: String,
    },

    #[error("{op} is not available for {ty} on {architecture}")]
    UnsupportedOperation {
        op: IntrinsicOp,
        architecture: Architecture,
        ty: String,
    },

    #[error("{feature} is not supported in {language}")]
    UnsupportedLanguage {
        feature: &'static str,
        language: Language,
    },

    #[error("{what} has {found} elements, expected {expected}")]
    ArityMismatch {
        what: &'static str,
        expected: u32,
        found: usize,
    },

    #[error("no conversion path from {from} to {to} on {architecture}")]
    ConversionPathNotFound {
        from: String,
        to: String,
        architecture: Architecture,
    },

    #[error("failed to write generated code: {0}")]
    Io(#[from] std::io::Error),

    #[error("{path}: {message}")]
    Config { path: PathBuf, message: String },

    #[error("malformed intrinsic table: {0}")]
    CatalogFormat(String),

    #[error("kernel manifest: {0}")]
    Manifest(#[from] serde_json::Error),
}

impl CodegenError {
    pub(crate) fn unsupported_language(feature: &'static str, language: Language) -> Self {
        CodegenError::UnsupportedLanguage { feature, language }
    }
}
