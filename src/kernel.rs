//! Generated kernels and the contract of the pipeline that runs them.
//!
//! A [`Kernel`] is the artifact handed to the external compilation
//! pipeline: the rendered source, the procedure descriptor it was
//! rendered for and a fingerprint of both. Compiling, linking and
//! invoking it is the job of a [`KernelRunner`].

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::context::{Printer, RenderContext};
use crate::error::{CodegenError, Result};
use crate::expr::Expr;
use crate::procedure::Procedure;
use crate::target::{Architecture, Language};
use crate::types::{Direction, TypedOperand};

/// One line of a kernel body.
#[derive(Clone, Debug, PartialEq)]
pub enum Statement {
    /// Local variable declaration.
    Declare(TypedOperand),
    /// Expression statement, terminated per language.
    Eval(Expr),
}

impl From<Expr> for Statement {
    fn from(expr: Expr) -> Self {
        Statement::Eval(expr)
    }
}

/// Rendered source of one procedure for one target.
#[derive(Clone, Debug)]
pub struct Kernel {
    pub language: Language,
    pub architecture: Architecture,
    pub procedure: Procedure,
    pub source: String,
    /// BLAKE3 hex digest of (language, architecture, source).
    pub fingerprint: String,
}

impl Kernel {
    /// Wrap already rendered source.
    pub fn new(procedure: Procedure, source: String, cx: &RenderContext<'_>) -> Self {
        let fingerprint = fingerprint(cx.language, cx.architecture, &source);
        Self {
            language: cx.language,
            architecture: cx.architecture,
            procedure,
            source,
            fingerprint,
        }
    }

    /// Render `body` inside `procedure`. Nothing is produced if any
    /// statement fails to render.
    pub fn generate(
        procedure: Procedure,
        body: &[Statement],
        cx: &RenderContext<'_>,
        indent: usize,
    ) -> Result<Self> {
        let mut printer = Printer::new(Vec::new()).with_indent(indent);
        printer.open_procedure(&procedure, cx)?;
        for statement in body {
            match statement {
                Statement::Declare(variable) => printer.declare(variable, cx)?,
                Statement::Eval(expr) => printer.print(expr, cx)?,
            }
        }
        printer.close_procedure(&procedure, cx)?;
        let source = String::from_utf8_lossy(&printer.into_inner()).into_owned();
        debug!(
            name = %procedure.name,
            language = %cx.language,
            architecture = %cx.architecture,
            lines = source.lines().count(),
            "kernel generated"
        );
        Ok(Self::new(procedure, source, cx))
    }

    /// File name of the source, e.g. `saxpy.cl`.
    pub fn file_name(&self) -> String {
        format!("{}{}", self.procedure.name, self.language.source_extension())
    }

    pub fn manifest(&self) -> Manifest {
        let parameters = self
            .procedure
            .parameters
            .iter()
            .map(|p| ParameterManifest {
                name: p.name.clone(),
                ty: p.ty.to_string(),
                direction: p.direction,
                dimension: p.dimension.clone(),
            })
            .collect();
        Manifest {
            name: self.procedure.name.clone(),
            language: self.language,
            architecture: self.architecture,
            file: self.file_name(),
            fingerprint: self.fingerprint.clone(),
            parameters,
            return_type: self.procedure.return_type.as_ref().map(|ty| ty.to_string()),
        }
    }

    /// Write the source and its JSON manifest into `dir`. Returns the
    /// path of the source file.
    pub fn write_to(&self, dir: &Path) -> Result<PathBuf> {
        fs::create_dir_all(dir)?;
        let source_path = dir.join(self.file_name());
        fs::write(&source_path, &self.source)?;
        let manifest = serde_json::to_string_pretty(&self.manifest())?;
        fs::write(dir.join(format!("{}.json", self.procedure.name)), manifest)?;
        Ok(source_path)
    }

    /// Check `args` against the parameter list, then hand the kernel to
    /// `runner`.
    pub fn run(&self, runner: &mut dyn KernelRunner, args: &[Argument]) -> Result<RunResult> {
        let parameters = &self.procedure.parameters;
        if args.len() != parameters.len() {
            return Err(CodegenError::ArityMismatch {
                what: "kernel argument list",
                expected: parameters.len() as u32,
                found: args.len(),
            });
        }
        for (parameter, arg) in parameters.iter().zip(args) {
            if parameter.is_array() != matches!(arg, Argument::Array(_)) {
                return Err(CodegenError::Construction(format!(
                    "argument for `{}` must be {}",
                    parameter.name,
                    if parameter.is_array() { "an array" } else { "a scalar" }
                )));
            }
        }
        runner.run(self, args)
    }
}

/// BLAKE3 digest identifying generated source for one target.
pub fn fingerprint(language: Language, architecture: Architecture, source: &str) -> String {
    let mut hasher = blake3::Hasher::new();
    hasher.update(language.name().as_bytes());
    hasher.update(&[0]);
    hasher.update(architecture.name().as_bytes());
    hasher.update(&[0]);
    hasher.update(source.as_bytes());
    hasher.finalize().to_hex().to_string()
}

// ── Pipeline contract ──

/// Descriptor written next to the source for the compilation pipeline.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Manifest {
    pub name: String,
    pub language: Language,
    pub architecture: Architecture,
    pub file: String,
    pub fingerprint: String,
    pub parameters: Vec<ParameterManifest>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub return_type: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ParameterManifest {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: String,
    pub direction: Direction,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub dimension: Option<String>,
}

/// Value passed for one parameter.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Argument {
    Scalar(f64),
    Array(Vec<f64>),
}

/// What one invocation of a compiled kernel reports.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RunResult {
    /// Timestamps in nanoseconds, from the runner's clock.
    pub start: u64,
    pub end: u64,
    pub duration: Duration,
    pub return_value: Option<f64>,
    /// Final contents of every `out` and `inout` parameter.
    pub outputs: BTreeMap<String, Argument>,
}

/// Compiles, links and invokes kernels. Implemented outside this crate.
pub trait KernelRunner {
    fn run(&mut self, kernel: &Kernel, args: &[Argument]) -> Result<RunResult>;
}
