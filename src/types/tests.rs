use super::*;
use crate::target::{Architecture, Language};

#[test]
fn test_natural_alignment() {
    let f = NumericType::float(32);
    assert_eq!(f.alignment, 4);
    let v = f.vector(8);
    assert_eq!(v.total_size(), 32);
    assert_eq!(v.alignment, 32);
    assert_eq!(v.scalar(), f);
}

#[test]
fn test_equality_includes_alignment() {
    let a = NumericType::float(32).vector(4);
    let b = a.with_alignment(4);
    assert_ne!(a, b);
    assert_eq!(a.signature(), b.signature());
}

#[test]
fn test_parse_short_names() {
    assert_eq!("f32".parse::<NumericType>(), Ok(NumericType::float(32)));
    assert_eq!(
        "i16x8".parse::<NumericType>(),
        Ok(NumericType::int(16).vector(8))
    );
    assert_eq!(
        "u8x16".parse::<NumericType>(),
        Ok(NumericType::uint(8).vector(16))
    );
    assert!("f8".parse::<NumericType>().is_err());
    assert!("i32x0".parse::<NumericType>().is_err());
    assert!("q32".parse::<NumericType>().is_err());
    assert!("".parse::<NumericType>().is_err());
}

#[test]
fn test_parse_rejects_oversized_vectors() {
    assert_eq!(
        "i8x64".parse::<NumericType>(),
        Ok(NumericType::int(8).vector(MAX_LANES))
    );
    assert!("i8x65".parse::<NumericType>().is_err());
    assert!("f32x2000000000".parse::<NumericType>().is_err());
    assert!("f64x4294967295".parse::<NumericType>().is_err());
}

#[test]
fn test_display_matches_parse() {
    for name in ["f64", "f32x4", "i8x16", "u32x8", "i64x2"] {
        let ty: NumericType = name.parse().unwrap();
        assert_eq!(ty.to_string(), name);
        assert_eq!(ty.signature().to_type(), ty);
    }
}

#[test]
fn test_c_scalar_decls() {
    let c = Language::C;
    let x86 = Architecture::X86;
    assert_eq!(NumericType::float(32).decl(c, x86), "float");
    assert_eq!(NumericType::float(64).decl(c, x86), "double");
    assert_eq!(NumericType::int(32).decl(c, x86), "int32_t");
    assert_eq!(NumericType::uint(8).decl(c, x86), "uint8_t");
}

#[test]
fn test_x86_vector_decls() {
    let decl = |s: &str| s.parse::<NumericType>().unwrap().decl(Language::C, Architecture::X86);
    assert_eq!(decl("f32x4"), "__m128");
    assert_eq!(decl("f64x4"), "__m256d");
    assert_eq!(decl("i32x16"), "__m512i");
    assert_eq!(decl("i32x2"), "__m64");
}

#[test]
fn test_neon_vector_decls() {
    let decl = |s: &str| s.parse::<NumericType>().unwrap().decl(Language::C, Architecture::Arm);
    assert_eq!(decl("f32x4"), "float32x4_t");
    assert_eq!(decl("u16x8"), "uint16x8_t");
}

#[test]
fn test_builtin_vector_decls() {
    let ty = NumericType::float(32).vector(4);
    assert_eq!(ty.decl(Language::OpenCl, Architecture::Generic), "float4");
    assert_eq!(ty.decl(Language::Cuda, Architecture::Generic), "float4");
    let ty = NumericType::uint(8).vector(16);
    assert_eq!(ty.decl(Language::OpenCl, Architecture::Generic), "uchar16");
    let ty = NumericType::int(64).vector(2);
    assert_eq!(ty.decl(Language::Cuda, Architecture::Generic), "longlong2");
}

#[test]
fn test_fortran_decls() {
    assert_eq!(
        NumericType::float(64).decl(Language::Fortran, Architecture::Generic),
        "real(kind=8)"
    );
    assert_eq!(
        NumericType::int(32).decl(Language::Fortran, Architecture::Generic),
        "integer(kind=4)"
    );
}

#[test]
fn test_data_type_class() {
    assert_eq!(DataType::from(NumericType::int(8)).class(), TypeClass::Integer);
    assert_eq!(DataType::from(NumericType::float(32)).class(), TypeClass::Floating);
    let opaque = DataType::Opaque("VALUE".to_string());
    assert_eq!(opaque.class(), TypeClass::Opaque("VALUE".to_string()));
    assert_eq!(opaque.vector_length(), 1);
}

#[test]
fn test_variable_and_computed_attributes() {
    let v = TypedOperand::variable("a", NumericType::float(32))
        .with_direction(Direction::In)
        .with_alignment(16)
        .constant();
    assert_eq!(v.name.as_deref(), Some("a"));
    assert_eq!(v.direction, Some(Direction::In));
    assert_eq!(v.alignment, Some(16));
    assert!(v.constant);

    let c = TypedOperand::computed("a + b", NumericType::float(32));
    assert!(c.name.is_none());
    assert!(c.direction.is_none());
    assert!(c.alignment.is_none());
    assert!(!c.constant);
}

#[test]
fn test_address_normalization() {
    let a = TypedOperand::variable("a", NumericType::float(32));
    assert_eq!(a.address(), "&a");
    let p = TypedOperand::computed("*p", NumericType::float(32));
    assert_eq!(p.address(), "p");
    let q = TypedOperand::computed(" *q", NumericType::float(32));
    assert_eq!(q.address(), "q");
}
