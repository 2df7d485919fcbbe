//! AArch64 NEON instruction tables.
//!
//! NEON has no constructor taking one scalar per lane, so `Set` is left
//! out and vectors are built lane by lane with `vset_lane`. Loads and
//! stores have no alignment-specific forms; both table slots share the
//! same instruction.

use super::{Catalog, IntrinsicOp};
use crate::target::Architecture;
use crate::types::{Kind, NumericType};

const ARCH: Architecture = Architecture::Arm;

pub(super) fn populate(catalog: &mut Catalog) {
    let mut elements = vec![NumericType::float(32), NumericType::float(64)];
    for width in [8, 16, 32, 64] {
        elements.push(NumericType::int(width));
        elements.push(NumericType::uint(width));
    }

    for element in elements {
        // 64-bit D registers and 128-bit Q registers
        for (bits, q) in [(64, ""), (128, "q")] {
            let lanes = bits / element.width;
            if lanes < 2 {
                continue;
            }
            vector_ops(catalog, element.vector(lanes), q);
        }
    }
    conversions(catalog);
}

/// NEON type suffix: `f32`, `s16`, `u8`, ...
fn suffix(ty: &NumericType) -> String {
    let prefix = match (ty.kind, ty.signed) {
        (Kind::Float, _) => 'f',
        (Kind::Int, true) => 's',
        (Kind::Int, false) => 'u',
    };
    format!("{}{}", prefix, ty.width)
}

fn vector_ops(catalog: &mut Catalog, ty: NumericType, q: &str) {
    let s = suffix(&ty);
    let sig = ty.signature();
    let mut put = |op, name: String| catalog.insert(op, ARCH, sig, name);

    put(IntrinsicOp::Add, format!("vadd{}_{}", q, s));
    put(IntrinsicOp::Sub, format!("vsub{}_{}", q, s));
    if ty.is_float() || ty.width < 64 {
        put(IntrinsicOp::Mul, format!("vmul{}_{}", q, s));
    }
    if ty.is_float() {
        put(IntrinsicOp::Div, format!("vdiv{}_{}", q, s));
        put(IntrinsicOp::Fmadd, format!("vfma{}_{}", q, s));
    }

    put(IntrinsicOp::Load, format!("vld1{}_{}", q, s));
    put(IntrinsicOp::LoadAligned, format!("vld1{}_{}", q, s));
    put(IntrinsicOp::Store, format!("vst1{}_{}", q, s));
    put(IntrinsicOp::StoreAligned, format!("vst1{}_{}", q, s));

    put(IntrinsicOp::Set1, format!("vdup{}_n_{}", q, s));
    put(IntrinsicOp::SetLane, format!("vset{}_lane_{}", q, s));
}

fn conversions(catalog: &mut Catalog) {
    let edges = [
        // int <-> float
        ("i32x2", "f32x2", "vcvt_f32_s32"),
        ("i32x4", "f32x4", "vcvtq_f32_s32"),
        ("u32x4", "f32x4", "vcvtq_f32_u32"),
        ("f32x2", "i32x2", "vcvt_s32_f32"),
        ("f32x4", "i32x4", "vcvtq_s32_f32"),
        ("f32x4", "u32x4", "vcvtq_u32_f32"),
        ("i64x2", "f64x2", "vcvtq_f64_s64"),
        ("f64x2", "i64x2", "vcvtq_s64_f64"),
        // float precision
        ("f32x2", "f64x2", "vcvt_f64_f32"),
        ("f64x2", "f32x2", "vcvt_f32_f64"),
        // integer widening
        ("i8x8", "i16x8", "vmovl_s8"),
        ("u8x8", "u16x8", "vmovl_u8"),
        ("i16x4", "i32x4", "vmovl_s16"),
        ("u16x4", "u32x4", "vmovl_u16"),
        ("i32x2", "i64x2", "vmovl_s32"),
        ("u32x2", "u64x2", "vmovl_u32"),
        // integer narrowing
        ("i16x8", "i8x8", "vmovn_s16"),
        ("i32x4", "i16x4", "vmovn_s32"),
        ("i64x2", "i32x2", "vmovn_s64"),
    ];
    for (from, to, name) in edges {
        if let (Ok(from), Ok(to)) = (from.parse::<NumericType>(), to.parse::<NumericType>()) {
            catalog.insert_conversion(ARCH, from.signature(), to.signature(), name);
        }
    }
}
