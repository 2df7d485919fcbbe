//! Parallel rendering of one tree for many targets.
//!
//! Rendering is pure, so every (language, architecture) pair is
//! independent and fans out over rayon's pool. Results come back in
//! input order.

use rayon::prelude::*;

use crate::context::RenderContext;
use crate::error::Result;
use crate::expr::Expr;
use crate::intrinsics::Catalog;
use crate::target::{Architecture, Language};
use crate::transition::TransitionRegistry;

/// Outcome of rendering for one target.
#[derive(Debug)]
pub struct Rendered {
    pub language: Language,
    pub architecture: Architecture,
    pub source: Result<String>,
}

impl Rendered {
    pub fn is_ok(&self) -> bool {
        self.source.is_ok()
    }
}

/// Every language paired with every architecture.
pub fn all_targets() -> Vec<(Language, Architecture)> {
    Language::ALL
        .iter()
        .flat_map(|&language| Architecture::ALL.iter().map(move |&arch| (language, arch)))
        .collect()
}

/// Render `expr` for each target using the built-in tables.
pub fn render_matrix(expr: &Expr, targets: &[(Language, Architecture)]) -> Vec<Rendered> {
    render_matrix_with(expr, targets, Catalog::builtin(), TransitionRegistry::builtin())
}

/// Render `expr` for each target against the given catalog and rules.
pub fn render_matrix_with(
    expr: &Expr,
    targets: &[(Language, Architecture)],
    catalog: &Catalog,
    transitions: &TransitionRegistry,
) -> Vec<Rendered> {
    targets
        .par_iter()
        .map(|&(language, architecture)| {
            let cx = RenderContext::new(language, architecture)
                .with_catalog(catalog)
                .with_transitions(transitions);
            Rendered {
                language,
                architecture,
                source: expr.render(&cx),
            }
        })
        .collect()
}
