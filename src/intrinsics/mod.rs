//! Intrinsics catalog: architecture- and type-indexed instruction names.
//!
//! Two tables make up the catalog:
//! - primitive operations keyed by `(IntrinsicOp, Architecture, TypeSig)`
//! - single-step conversions keyed by `(Architecture, from, to)`, kept as
//!   one directed graph per architecture so that representations with no
//!   direct instruction between them can be bridged by a chain.
//!
//! A missing entry is an ordinary answer (`None`); the operator lowering
//! decides whether a fallback exists.

mod arm;
mod x86;

use std::collections::HashMap;
use std::fmt;
use std::path::Path;
use std::sync::OnceLock;

use petgraph::graphmap::DiGraphMap;
use serde::Deserialize;
use tracing::debug;

use crate::error::{CodegenError, Result};
use crate::target::Architecture;
use crate::types::{NumericType, TypeSig};

/// A primitive vector operation an architecture may implement.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntrinsicOp {
    Add,
    Sub,
    Mul,
    Div,
    /// Unaligned vector load.
    Load,
    LoadAligned,
    /// Unaligned vector store.
    Store,
    StoreAligned,
    /// Build a vector from one scalar per lane.
    Set,
    /// Broadcast one scalar to every lane.
    Set1,
    /// Replace one lane: `(value, vector, lane)`.
    SetLane,
    MaskLoad,
    MaskStore,
    /// Fused multiply-add.
    Fmadd,
}

impl IntrinsicOp {
    pub fn name(self) -> &'static str {
        match self {
            IntrinsicOp::Add => "add",
            IntrinsicOp::Sub => "sub",
            IntrinsicOp::Mul => "mul",
            IntrinsicOp::Div => "div",
            IntrinsicOp::Load => "load",
            IntrinsicOp::LoadAligned => "load_aligned",
            IntrinsicOp::Store => "store",
            IntrinsicOp::StoreAligned => "store_aligned",
            IntrinsicOp::Set => "set",
            IntrinsicOp::Set1 => "set1",
            IntrinsicOp::SetLane => "set_lane",
            IntrinsicOp::MaskLoad => "mask_load",
            IntrinsicOp::MaskStore => "mask_store",
            IntrinsicOp::Fmadd => "fmadd",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        let op = match name {
            "add" => IntrinsicOp::Add,
            "sub" => IntrinsicOp::Sub,
            "mul" => IntrinsicOp::Mul,
            "div" => IntrinsicOp::Div,
            "load" => IntrinsicOp::Load,
            "load_aligned" | "loada" => IntrinsicOp::LoadAligned,
            "store" => IntrinsicOp::Store,
            "store_aligned" | "storea" => IntrinsicOp::StoreAligned,
            "set" => IntrinsicOp::Set,
            "set1" => IntrinsicOp::Set1,
            "set_lane" => IntrinsicOp::SetLane,
            "mask_load" | "maskload" => IntrinsicOp::MaskLoad,
            "mask_store" | "maskstore" => IntrinsicOp::MaskStore,
            "fmadd" | "fma" => IntrinsicOp::Fmadd,
            _ => return None,
        };
        Some(op)
    }
}

impl fmt::Display for IntrinsicOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Key of the primitive-operation table.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct IntrinsicKey {
    pub op: IntrinsicOp,
    pub architecture: Architecture,
    pub sig: TypeSig,
}

/// Instruction tables for every known architecture.
#[derive(Clone, Debug, Default)]
pub struct Catalog {
    intrinsics: HashMap<IntrinsicKey, String>,
    conversions: HashMap<Architecture, DiGraphMap<TypeSig, String>>,
}

impl Catalog {
    /// An empty catalog: every lookup misses.
    pub fn new() -> Self {
        Self::default()
    }

    /// A fresh catalog holding the built-in x86 and ARM tables.
    pub fn standard() -> Self {
        let mut catalog = Self::new();
        x86::populate(&mut catalog);
        arm::populate(&mut catalog);
        debug!(
            intrinsics = catalog.intrinsics.len(),
            "built-in intrinsic tables loaded"
        );
        catalog
    }

    /// Shared immutable instance of [`Catalog::standard`].
    pub fn builtin() -> &'static Catalog {
        static BUILTIN: OnceLock<Catalog> = OnceLock::new();
        BUILTIN.get_or_init(Catalog::standard)
    }

    pub fn insert(
        &mut self,
        op: IntrinsicOp,
        architecture: Architecture,
        sig: TypeSig,
        name: impl Into<String>,
    ) {
        let key = IntrinsicKey {
            op,
            architecture,
            sig,
        };
        self.intrinsics.insert(key, name.into());
    }

    pub fn insert_conversion(
        &mut self,
        architecture: Architecture,
        from: TypeSig,
        to: TypeSig,
        name: impl Into<String>,
    ) {
        self.conversions
            .entry(architecture)
            .or_default()
            .add_edge(from, to, name.into());
    }

    /// Instruction implementing `op` on `ty` for `architecture`, if any.
    pub fn lookup(
        &self,
        op: IntrinsicOp,
        architecture: Architecture,
        ty: &NumericType,
    ) -> Option<&str> {
        let key = IntrinsicKey {
            op,
            architecture,
            sig: ty.signature(),
        };
        self.intrinsics.get(&key).map(String::as_str)
    }

    /// Single-step conversion instruction between two representations.
    pub fn conversion(
        &self,
        architecture: Architecture,
        from: &NumericType,
        to: &NumericType,
    ) -> Option<&str> {
        self.conversions
            .get(&architecture)?
            .edge_weight(from.signature(), to.signature())
            .map(String::as_str)
    }

    /// Instructions converting `from` into `to`, innermost first.
    ///
    /// Equal representations need no instruction and yield an empty path.
    /// Otherwise the shortest chain of conversion edges is returned.
    pub fn conversion_path(
        &self,
        from: &NumericType,
        to: &NumericType,
        architecture: Architecture,
    ) -> Result<Vec<String>> {
        let (source, goal) = (from.signature(), to.signature());
        if source == goal {
            return Ok(Vec::new());
        }
        let not_found = || CodegenError::ConversionPathNotFound {
            from: source.to_string(),
            to: goal.to_string(),
            architecture,
        };

        let graph = self.conversions.get(&architecture).ok_or_else(not_found)?;
        if !graph.contains_node(source) || !graph.contains_node(goal) {
            return Err(not_found());
        }
        let (_, nodes) = petgraph::algo::astar(graph, source, |n| n == goal, |_| 1usize, |_| 0)
            .ok_or_else(not_found)?;

        let path: Vec<String> = nodes
            .windows(2)
            .filter_map(|step| graph.edge_weight(step[0], step[1]).cloned())
            .collect();
        debug!(%source, %goal, steps = path.len(), "conversion path");
        Ok(path)
    }

    /// All primitive entries of one architecture, sorted by key.
    pub fn entries(&self, architecture: Architecture) -> Vec<(IntrinsicKey, &str)> {
        let mut entries: Vec<_> = self
            .intrinsics
            .iter()
            .filter(|(key, _)| key.architecture == architecture)
            .map(|(key, name)| (*key, name.as_str()))
            .collect();
        entries.sort_by_key(|(key, _)| *key);
        entries
    }

    /// All conversion edges of one architecture, in insertion order.
    pub fn conversion_edges(&self, architecture: Architecture) -> Vec<(TypeSig, TypeSig, &str)> {
        match self.conversions.get(&architecture) {
            Some(graph) => graph
                .all_edges()
                .map(|(from, to, name)| (from, to, name.as_str()))
                .collect(),
            None => Vec::new(),
        }
    }

    /// Merge an intrinsic table file into this catalog.
    pub fn extend_from_json(&mut self, path: &Path) -> Result<()> {
        let content = std::fs::read_to_string(path)?;
        self.extend_from_str(&content)
            .map_err(|e| CodegenError::CatalogFormat(format!("{}: {}", path.display(), e)))
    }

    /// Merge an intrinsic table given as JSON text.
    ///
    /// ```json
    /// { "architecture": "x86",
    ///   "intrinsics": [{ "op": "add", "type": "f32x4", "name": "_mm_add_ps" }],
    ///   "conversions": [{ "from": "i32x4", "to": "f32x4", "name": "_mm_cvtepi32_ps" }] }
    /// ```
    pub fn extend_from_str(&mut self, json: &str) -> Result<()> {
        let table: TableFile =
            serde_json::from_str(json).map_err(|e| CodegenError::CatalogFormat(e.to_string()))?;
        let parse = |name: &str| {
            name.parse::<NumericType>()
                .map(|ty| ty.signature())
                .map_err(CodegenError::CatalogFormat)
        };
        // Nothing is merged unless every row parses.
        let intrinsics = table
            .intrinsics
            .iter()
            .map(|row| Ok((row.op, parse(&row.ty)?, row.name.as_str())))
            .collect::<Result<Vec<_>>>()?;
        let conversions = table
            .conversions
            .iter()
            .map(|row| Ok((parse(&row.from)?, parse(&row.to)?, row.name.as_str())))
            .collect::<Result<Vec<_>>>()?;
        for (op, sig, name) in intrinsics {
            self.insert(op, table.architecture, sig, name);
        }
        for (from, to, name) in conversions {
            self.insert_conversion(table.architecture, from, to, name);
        }
        Ok(())
    }
}

#[derive(Deserialize)]
struct TableFile {
    architecture: Architecture,
    #[serde(default)]
    intrinsics: Vec<IntrinsicRow>,
    #[serde(default)]
    conversions: Vec<ConversionRow>,
}

#[derive(Deserialize)]
struct IntrinsicRow {
    op: IntrinsicOp,
    #[serde(rename = "type")]
    ty: String,
    name: String,
}

#[derive(Deserialize)]
struct ConversionRow {
    from: String,
    to: String,
    name: String,
}
