//! Retargetable kernel code generation.
//!
//! Expression trees built with the functions in [`expr`] render to C,
//! OpenCL C, CUDA or Fortran source text. Vector operations select SIMD
//! intrinsics for the active [`Architecture`] from the [`Catalog`].

pub mod batch;
pub mod config;
pub mod context;
pub mod error;
pub mod expr;
pub mod intrinsics;
pub mod kernel;
pub mod operators;
pub mod procedure;
pub mod target;
pub mod transition;
pub mod types;

pub use context::{Printer, RenderContext};
pub use error::{CodegenError, Result};
pub use expr::{Expr, Expression, Literal, Operand};
pub use intrinsics::{Catalog, IntrinsicOp};
pub use kernel::{Kernel, KernelRunner, RunResult};
pub use operators::Operator;
pub use procedure::{Parameter, Procedure};
pub use target::{Architecture, Language};
pub use transition::TransitionRegistry;
pub use types::{DataType, Direction, Kind, NumericType, TypedOperand};

/// Render `expr` for one language and architecture with the built-in
/// intrinsic tables.
pub fn render(expr: &Expr, language: Language, architecture: Architecture) -> Result<String> {
    expr.render(&RenderContext::new(language, architecture))
}
