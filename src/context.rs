//! Rendering context and the statement printer.

use std::io::Write;

use crate::error::Result;
use crate::expr::Expr;
use crate::intrinsics::Catalog;
use crate::procedure::Procedure;
use crate::target::{Architecture, Language};
use crate::transition::TransitionRegistry;
use crate::types::TypedOperand;

/// Everything a render call depends on besides the tree itself.
#[derive(Clone, Copy, Debug)]
pub struct RenderContext<'a> {
    pub language: Language,
    pub architecture: Architecture,
    pub catalog: &'a Catalog,
    pub transitions: &'a TransitionRegistry,
}

impl RenderContext<'static> {
    /// Context over the built-in catalog and transition rules.
    pub fn new(language: Language, architecture: Architecture) -> Self {
        Self {
            language,
            architecture,
            catalog: Catalog::builtin(),
            transitions: TransitionRegistry::builtin(),
        }
    }
}

impl<'a> RenderContext<'a> {
    pub fn with_catalog<'b>(self, catalog: &'b Catalog) -> RenderContext<'b>
    where
        'a: 'b,
    {
        RenderContext {
            language: self.language,
            architecture: self.architecture,
            catalog,
            transitions: self.transitions,
        }
    }

    pub fn with_transitions<'b>(self, transitions: &'b TransitionRegistry) -> RenderContext<'b>
    where
        'a: 'b,
    {
        RenderContext {
            language: self.language,
            architecture: self.architecture,
            catalog: self.catalog,
            transitions,
        }
    }
}

// ── Printer ──

/// Writes the statements of one kernel to an output sink.
pub struct Printer<W: Write> {
    out: W,
    indent_width: usize,
    depth: usize,
}

impl<W: Write> Printer<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            indent_width: 2,
            depth: 0,
        }
    }

    pub fn with_indent(mut self, width: usize) -> Self {
        self.indent_width = width;
        self
    }

    pub fn indent(&mut self) {
        self.depth += 1;
    }

    pub fn dedent(&mut self) {
        self.depth = self.depth.saturating_sub(1);
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Write `text` on its own line at the current depth.
    pub fn line(&mut self, text: &str) -> Result<()> {
        let pad = " ".repeat(self.depth * self.indent_width);
        writeln!(self.out, "{}{}", pad, text)?;
        Ok(())
    }

    /// Render `expr` as a statement. Nothing is written if rendering fails.
    pub fn print(&mut self, expr: &Expr, cx: &RenderContext<'_>) -> Result<()> {
        let text = expr.render(cx)?;
        let statement = format!("{}{}", text.trim_start(), cx.language.statement_terminator());
        self.line(&statement)
    }

    /// Declare a local variable.
    pub fn declare(&mut self, variable: &TypedOperand, cx: &RenderContext<'_>) -> Result<()> {
        let decl = variable.ty.decl(cx.language, cx.architecture);
        let name = variable.name.as_deref().unwrap_or(&variable.text);
        let line = match cx.language {
            Language::Fortran => format!("{} :: {}", decl, name),
            _ => {
                let qualifier = if variable.constant { "const " } else { "" };
                format!("{}{} {};", qualifier, decl, name)
            }
        };
        self.line(&line)
    }

    /// Header and parameter declarations of `procedure`; the body follows
    /// one level deeper.
    pub fn open_procedure(&mut self, procedure: &Procedure, cx: &RenderContext<'_>) -> Result<()> {
        self.line(&procedure.header(cx.language, cx.architecture))?;
        self.indent();
        for declaration in procedure.declarations(cx.language, cx.architecture) {
            self.line(&declaration)?;
        }
        Ok(())
    }

    pub fn close_procedure(&mut self, procedure: &Procedure, cx: &RenderContext<'_>) -> Result<()> {
        self.dedent();
        self.line(&procedure.footer(cx.language))
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}
