//! SSE / AVX / AVX-512 instruction tables.

use super::{Catalog, IntrinsicOp};
use crate::target::Architecture;
use crate::types::NumericType;

const ARCH: Architecture = Architecture::X86;

/// Register widths in bits with their intrinsic prefix.
const REGISTERS: [(u32, &str); 3] = [(128, "_mm"), (256, "_mm256"), (512, "_mm512")];

pub(super) fn populate(catalog: &mut Catalog) {
    for (bits, prefix) in REGISTERS {
        floating(catalog, bits, prefix);
        integer(catalog, bits, prefix);
    }
    conversions(catalog);
}

fn floating(catalog: &mut Catalog, bits: u32, prefix: &str) {
    for (width, suffix) in [(32, "ps"), (64, "pd")] {
        let ty = NumericType::float(width).vector(bits / width).signature();
        let mut put = |op, name: String| catalog.insert(op, ARCH, ty, name);

        // ── Arithmetic ──
        put(IntrinsicOp::Add, format!("{}_add_{}", prefix, suffix));
        put(IntrinsicOp::Sub, format!("{}_sub_{}", prefix, suffix));
        put(IntrinsicOp::Mul, format!("{}_mul_{}", prefix, suffix));
        put(IntrinsicOp::Div, format!("{}_div_{}", prefix, suffix));
        put(IntrinsicOp::Fmadd, format!("{}_fmadd_{}", prefix, suffix));

        // ── Memory ──
        put(IntrinsicOp::Load, format!("{}_loadu_{}", prefix, suffix));
        put(IntrinsicOp::LoadAligned, format!("{}_load_{}", prefix, suffix));
        put(IntrinsicOp::Store, format!("{}_storeu_{}", prefix, suffix));
        put(IntrinsicOp::StoreAligned, format!("{}_store_{}", prefix, suffix));
        if bits < 512 {
            put(IntrinsicOp::MaskLoad, format!("{}_maskload_{}", prefix, suffix));
            put(IntrinsicOp::MaskStore, format!("{}_maskstore_{}", prefix, suffix));
        }

        // ── Construction ──
        put(IntrinsicOp::Set, format!("{}_setr_{}", prefix, suffix));
        put(IntrinsicOp::Set1, format!("{}_set1_{}", prefix, suffix));
    }
}

fn integer(catalog: &mut Catalog, bits: u32, prefix: &str) {
    for width in [8, 16, 32, 64] {
        for signed in [true, false] {
            let scalar = if signed {
                NumericType::int(width)
            } else {
                NumericType::uint(width)
            };
            let ty = scalar.vector(bits / width).signature();
            let mut put = |op, name: String| catalog.insert(op, ARCH, ty, name);

            put(IntrinsicOp::Add, format!("{}_add_epi{}", prefix, width));
            put(IntrinsicOp::Sub, format!("{}_sub_epi{}", prefix, width));
            if width == 16 || width == 32 || (width == 64 && bits == 512) {
                put(IntrinsicOp::Mul, format!("{}_mullo_epi{}", prefix, width));
            }

            put(IntrinsicOp::Load, format!("{}_loadu_si{}", prefix, bits));
            put(IntrinsicOp::LoadAligned, format!("{}_load_si{}", prefix, bits));
            put(IntrinsicOp::Store, format!("{}_storeu_si{}", prefix, bits));
            put(IntrinsicOp::StoreAligned, format!("{}_store_si{}", prefix, bits));
            if bits < 512 && width >= 32 {
                put(IntrinsicOp::MaskLoad, format!("{}_maskload_epi{}", prefix, width));
                put(IntrinsicOp::MaskStore, format!("{}_maskstore_epi{}", prefix, width));
            }

            match (bits, width) {
                (128, 64) => {}
                (256, 64) => put(IntrinsicOp::Set, format!("{}_setr_epi64x", prefix)),
                (512, 8 | 16) => {}
                _ => put(IntrinsicOp::Set, format!("{}_setr_epi{}", prefix, width)),
            }
            if width == 64 && bits < 512 {
                put(IntrinsicOp::Set1, format!("{}_set1_epi64x", prefix));
            } else {
                put(IntrinsicOp::Set1, format!("{}_set1_epi{}", prefix, width));
            }
        }
    }
}

fn conversions(catalog: &mut Catalog) {
    let edges = [
        // int <-> float, same lane count
        ("i32x4", "f32x4", "_mm_cvtepi32_ps"),
        ("f32x4", "i32x4", "_mm_cvtps_epi32"),
        ("i32x8", "f32x8", "_mm256_cvtepi32_ps"),
        ("f32x8", "i32x8", "_mm256_cvtps_epi32"),
        ("i32x16", "f32x16", "_mm512_cvtepi32_ps"),
        ("f32x16", "i32x16", "_mm512_cvtps_epi32"),
        ("i32x4", "f64x4", "_mm256_cvtepi32_pd"),
        ("f64x4", "i32x4", "_mm256_cvtpd_epi32"),
        // float precision
        ("f32x4", "f64x4", "_mm256_cvtps_pd"),
        ("f64x4", "f32x4", "_mm256_cvtpd_ps"),
        ("f32x8", "f64x8", "_mm512_cvtps_pd"),
        ("f64x8", "f32x8", "_mm512_cvtpd_ps"),
        // integer widening
        ("i8x16", "i16x16", "_mm256_cvtepi8_epi16"),
        ("u8x16", "i16x16", "_mm256_cvtepu8_epi16"),
        ("i16x8", "i32x8", "_mm256_cvtepi16_epi32"),
        ("u16x8", "i32x8", "_mm256_cvtepu16_epi32"),
        ("i32x4", "i64x4", "_mm256_cvtepi32_epi64"),
        ("i8x16", "i32x16", "_mm512_cvtepi8_epi32"),
        ("i16x16", "i32x16", "_mm512_cvtepi16_epi32"),
        ("i32x8", "i64x8", "_mm512_cvtepi32_epi64"),
    ];
    for (from, to, name) in edges {
        if let (Ok(from), Ok(to)) = (from.parse::<NumericType>(), to.parse::<NumericType>()) {
            catalog.insert_conversion(ARCH, from.signature(), to.signature(), name);
        }
    }
}
