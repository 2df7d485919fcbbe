use super::*;
use crate::target::{Architecture, Language};
use crate::transition::{Outcome, TransitionRegistry, TransitionRule};
use crate::types::TypeClass;

fn var(name: &str, ty: &str) -> TypedOperand {
    TypedOperand::variable(name, ty.parse::<NumericType>().unwrap())
}

fn c_x86() -> RenderContext<'static> {
    RenderContext::new(Language::C, Architecture::X86)
}

fn generic(language: Language) -> RenderContext<'static> {
    RenderContext::new(language, Architecture::Generic)
}

#[test]
fn test_literal_typing() {
    let five = Literal::Int(5).resolve().unwrap();
    assert_eq!(five.numeric(), Some(&NumericType::int(32)));
    let big = Literal::Int(1 << 40).resolve().unwrap();
    assert_eq!(big.numeric(), Some(&NumericType::int(64)));
    let half = Literal::Float(0.5).resolve().unwrap();
    assert_eq!(half.text, "0.5");
    assert_eq!(half.numeric(), Some(&NumericType::float(64)));
    assert_eq!(Literal::Float(2.0).text(), "2.0");
    assert!(Literal::Raw("N".to_string()).resolve().is_none());
}

#[test]
fn test_empty_expression_fails_at_render() {
    let empty = Expr::Op(Expression::new(Operator::Add, None, None));
    let cx = c_x86();
    assert!(matches!(empty.render(&cx), Err(CodegenError::Construction(_))));
    assert!(matches!(empty.materialize(&cx), Err(CodegenError::Construction(_))));
}

#[test]
fn test_untyped_sides_render_literally() {
    let cx = c_x86();
    assert_eq!(add("x", "y").render(&cx).unwrap(), "x + y");
    assert!(matches!(
        add("x", "y").materialize(&cx),
        Err(CodegenError::Construction(_))
    ));
    assert_eq!(neg("x").render(&cx).unwrap(), " -(x)");

    let a = var("a", "f32");
    let mixed = add(&a, "k");
    assert_eq!(mixed.render(&cx).unwrap(), "a + k");
    assert_eq!(
        mixed.materialize(&cx).unwrap().numeric(),
        Some(&NumericType::float(32))
    );
}

#[test]
fn test_nested_expressions() {
    let (a, b, c) = (var("a", "f32"), var("b", "f32"), var("c", "f32"));
    let cx = c_x86();
    assert_eq!(mul(add(&a, &b), &c).render(&cx).unwrap(), "(a + b) * (c)");
    assert_eq!(sub(&a, sub(&b, &c)).render(&cx).unwrap(), "a - (b - (c))");
    assert_eq!(div(&a, 2).render(&cx).unwrap(), "(a) / (2)");
}

#[test]
fn test_operator_sugar_matches_builders() {
    let (a, b) = (var("a", "f64"), var("b", "f64"));
    let cx = generic(Language::C);
    assert_eq!(&a + &b, add(&a, &b));
    assert_eq!((&a * &b) - 1.0, sub(mul(&a, &b), 1.0));
    assert_eq!(-&a, neg(&a));
    assert_eq!(!(&a), not(&a));
    assert_eq!((a.clone() / b.clone()).render(&cx).unwrap(), "(a) / (b)");
}

#[test]
fn test_render_is_repeatable() {
    let (a, b) = (var("a", "f32x8"), var("b", "f32x8"));
    let tree = assign(&a, fma(&a, &b, add(&a, 1.0)));
    for language in Language::ALL {
        for architecture in Architecture::ALL {
            let cx = RenderContext::new(language, architecture);
            let first = tree.render(&cx).map_err(|e| e.to_string());
            let second = tree.render(&cx).map_err(|e| e.to_string());
            assert_eq!(first, second);
        }
    }
}

#[test]
fn test_promotion_through_materialize() {
    let cx = c_x86();
    let sum = add(var("i", "i32"), var("x", "f32")).materialize(&cx).unwrap();
    assert_eq!(sum.numeric(), Some(&NumericType::float(32)));
    let err = add(var("u", "i32x4"), var("v", "i32x8")).render(&cx).unwrap_err();
    assert!(matches!(err, CodegenError::TypeTransition { .. }));
}

#[test]
fn test_index_and_return() {
    let a = var("a", "f64");
    let cx = c_x86();
    let element = index(&a, "i");
    assert_eq!(element.render(&cx).unwrap(), "a[i]");
    assert_eq!(
        element.materialize(&cx).unwrap().numeric(),
        Some(&NumericType::float(64))
    );
    assert_eq!(index(&a, 3).render(&generic(Language::Fortran)).unwrap(), "a(3)");
    assert_eq!(ret(&a).render(&cx).unwrap(), "return a");
}

#[test]
fn test_pointer_operators() {
    let p = var("p", "f32");
    assert_eq!(address_of(&p).render(&c_x86()).unwrap(), " &p");
    assert_eq!(address_of(&p).render(&generic(Language::Fortran)).unwrap(), " p");
    assert_eq!(deref(&p).render(&c_x86()).unwrap(), " *p");
}

#[test]
fn test_comparisons_and_logic() {
    let (a, b) = (var("a", "i32"), var("b", "i32"));
    let cx = generic(Language::C);
    let fortran = generic(Language::Fortran);
    assert_eq!(eq(&a, &b).render(&cx).unwrap(), "a == b");
    assert_eq!(ne(&a, &b).render(&fortran).unwrap(), "a /= b");
    assert_eq!(le(&a, 0).render(&cx).unwrap(), "a <= 0");
    assert_eq!(
        and(lt(&a, &b), ge(&a, 1)).render(&cx).unwrap(),
        "(a < b) && (a >= 1)"
    );
    assert_eq!(
        or(gt(&a, &b), not(&a)).render(&fortran).unwrap(),
        "(a > b) .or. ( .not. (a))"
    );
}

#[test]
fn test_vector_assignment_through_index() {
    let (v, p, out) = (var("v", "f32x4"), var("p", "f32"), var("out", "f32"));
    let cx = c_x86();
    assert_eq!(
        assign(&v, index(&p, "i")).render(&cx).unwrap(),
        "v = _mm_loadu_ps( &p[i] )"
    );
    assert_eq!(
        assign(index(&out, "i"), &v).render(&cx).unwrap(),
        "_mm_storeu_ps( (float * ) &out[i], v )"
    );
    assert_eq!(
        store(index(&out, "i"), &v).render(&cx).unwrap(),
        "_mm_storeu_ps( (float * ) &out[i], v )"
    );
}

#[test]
fn test_vector_construction_builders() {
    let f32x4: NumericType = "f32x4".parse().unwrap();
    let cx = c_x86();
    assert_eq!(
        set_seq([1.0, 2.0, 3.0, 4.0], f32x4).render(&cx).unwrap(),
        "_mm_setr_ps( 1.0, 2.0, 3.0, 4.0 )"
    );
    assert_eq!(
        load_seq(["a", "b", "c", "d"], f32x4).render(&cx).unwrap(),
        "_mm_setr_ps( a, b, c, d )"
    );
    assert_eq!(set("x", f32x4).render(&cx).unwrap(), "_mm_set1_ps( x )");
    assert!(matches!(
        set_seq([1, 2, 3], f32x4).render(&cx),
        Err(CodegenError::ArityMismatch { .. })
    ));
}

#[test]
fn test_load_requires_typed_source() {
    let f32x4: NumericType = "f32x4".parse().unwrap();
    let err = load("p", f32x4).render(&c_x86()).unwrap_err();
    assert!(matches!(err, CodegenError::Construction(_)));
    let aligned = var("p", "f32").with_alignment(16);
    assert_eq!(load(&aligned, f32x4).render(&c_x86()).unwrap(), "_mm_load_ps( &p )");
}

#[test]
fn test_masked_builders() {
    let f32x8: NumericType = "f32x8".parse().unwrap();
    let (p, v) = (var("p", "f32"), var("v", "f32x8"));
    let mask = [true, true, false, false, true, true, false, false];
    let cx = c_x86();
    assert_eq!(
        mask_load(&p, &mask, f32x8).render(&cx).unwrap(),
        "_mm256_maskload_ps((float * )&p, _mm256_setr_epi32( -1, -1, 0, 0, -1, -1, 0, 0 ))"
    );
    assert_eq!(
        mask_store(&p, &v, &mask).render(&cx).unwrap(),
        "_mm256_maskstore_ps((float * )&p, _mm256_setr_epi32( -1, -1, 0, 0, -1, -1, 0, 0 ), v)"
    );
    assert!(matches!(
        mask_store(&p, "v", &mask).render(&cx),
        Err(CodegenError::Construction(_))
    ));
}

#[test]
fn test_fma_fallback_equals_plain_expression() {
    let (a, b, c) = (var("a", "f32"), var("b", "f32"), var("c", "f32"));
    let cx = generic(Language::C);
    assert_eq!(
        fma(&a, &b, &c).render(&cx).unwrap(),
        add(&c, mul(&a, &b)).render(&cx).unwrap()
    );
    // Untyped operands take the same path.
    assert_eq!(
        fma("k", &b, &c).render(&c_x86()).unwrap(),
        add(&c, mul("k", &b)).render(&c_x86()).unwrap()
    );
}

#[test]
fn test_fma_with_literals() {
    let x = var("x", "f64");
    let cl = generic(Language::OpenCl);
    assert_eq!(fma(&x, 2.0, &x).render(&cl).unwrap(), "fma(x,2.0,x)");
}

#[test]
fn test_ternary() {
    let (a, b) = (var("a", "f32"), var("b", "i32"));
    let cond = gt(&a, &b);
    for language in [Language::C, Language::OpenCl, Language::Cuda] {
        let picked = ternary(cond.clone(), &a, &b);
        assert_eq!(picked.render(&generic(language)).unwrap(), "(a > b ? a : b)");
    }
    let typed = ternary(cond.clone(), &a, &b)
        .materialize(&generic(Language::C))
        .unwrap();
    assert_eq!(typed.numeric(), Some(&NumericType::float(32)));
    assert!(matches!(
        ternary(cond, &a, &b).render(&generic(Language::Fortran)),
        Err(CodegenError::UnsupportedLanguage { .. })
    ));
}

#[test]
fn test_ternary_branch_types_follow_transitions() {
    let cx = generic(Language::C);
    let (narrow, wide) = (var("a", "f32x4"), var("b", "f32x8"));
    assert!(matches!(
        ternary("c", &narrow, &wide).materialize(&cx),
        Err(CodegenError::TypeTransition { .. })
    ));

    let handle = TypedOperand::variable("h", DataType::Opaque("VALUE".to_string()));
    let index = var("i", "i32");
    assert!(matches!(
        ternary("c", &handle, &index).materialize(&cx),
        Err(CodegenError::TypeTransition { .. })
    ));

    let mut registry = TransitionRegistry::new();
    registry.register(
        TypeClass::Opaque("VALUE".to_string()),
        TypeClass::Integer,
        TransitionRule::new().on(Operator::Select, Outcome::new(|left, _| left.clone())),
    );
    let picked = ternary("c", &handle, &index)
        .materialize(&cx.with_transitions(&registry))
        .unwrap();
    assert_eq!(picked.ty, DataType::Opaque("VALUE".to_string()));
    assert_eq!(picked.text, "(c ? h : i)");
}

#[test]
fn test_non_finite_literals_are_rejected() {
    let cx = c_x86();
    let x = var("x", "f64");
    for value in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
        assert!(matches!(add(&x, value).render(&cx), Err(CodegenError::Construction(_))));
        assert!(matches!(add("y", value).render(&cx), Err(CodegenError::Construction(_))));
    }
    assert_eq!(add(&x, 1.5).render(&cx).unwrap(), "x + 1.5");
}

#[test]
fn test_load_source_literal_or_address() {
    let f32x4: NumericType = "f32x4".parse().unwrap();
    let cx = c_x86();
    assert_eq!(load(0, "i32x4".parse().unwrap()).render(&cx).unwrap(), "_mm_set1_epi32( 0 )");
    let inf = var("inf", "f32");
    assert_eq!(load(&inf, f32x4).render(&cx).unwrap(), "_mm_loadu_ps( &inf )");
}
