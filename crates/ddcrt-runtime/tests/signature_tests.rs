use super::*;
use crate::value::{Args, Value};
use std::cell::Cell;

#[test]
fn test_thunk_runs_once_on_first_query() {
    let rt = Runtime::new();
    let runs = Rc::new(Cell::new(0));
    let counter = runs.clone();
    let a = rt
        .define_class(rt.class_builder("A").signature(move |rt| {
            counter.set(counter.get() + 1);
            Ok(ClassSignature::new().with_method("m", rt.parse_type("() => int")?))
        }))
        .expect("defines");

    assert_eq!(runs.get(), 0);
    assert!(!rt.is_signature_evaluated(a));
    let m = rt.member_type(a, "m", MemberKind::Method).expect("evaluates");
    assert_eq!(m.map(|t| rt.render(t)).as_deref(), Some("() => int"));
    rt.member_type(a, "m", MemberKind::Method).expect("cached");
    assert_eq!(runs.get(), 1);
    assert!(rt.is_signature_evaluated(a));
}

#[test]
fn test_forward_reference_to_later_class() {
    let rt = Runtime::new();
    let a = rt
        .define_class(rt.class_builder("A").signature(|rt| {
            Ok(ClassSignature::new()
                .with_method("pair", rt.parse_type("(B) => A")?)
                .with_field("partner", rt.parse_type("B")?))
        }))
        .expect("defines");
    let b = rt
        .define_class(rt.class_builder("B").signature(|rt| {
            Ok(ClassSignature::new().with_field("partner", rt.parse_type("A")?))
        }))
        .expect("defines");

    let pair = rt
        .member_type(a, "pair", MemberKind::Method)
        .expect("evaluates")
        .expect("declared");
    assert_eq!(rt.render(pair), "(B) => A");
    assert_eq!(
        rt.member_type(b, "partner", MemberKind::Field).expect("evaluates"),
        Some(a)
    );
}

#[test]
fn test_failing_thunk_is_retried() {
    let rt = Runtime::new();
    let a = rt
        .define_class(rt.class_builder("A").signature(|rt| {
            Ok(ClassSignature::new().with_getter("later", rt.parse_type("Later")?))
        }))
        .expect("defines");

    assert!(matches!(
        rt.signature(a),
        Err(ConfigurationError::UnknownType { ref name }) if name == "Later"
    ));
    assert!(!rt.is_signature_evaluated(a));

    let later = rt.define_class(rt.class_builder("Later")).expect("defines");
    assert_eq!(
        rt.member_type(a, "later", MemberKind::Getter).expect("evaluates"),
        Some(later)
    );
}

#[test]
fn test_self_query_during_evaluation_is_cyclic() {
    let rt = Runtime::new();
    let builder = rt.class_builder("Knot");
    let knot = builder.this_type();
    rt.define_class(builder.signature(move |rt| {
        rt.signature(knot)?;
        Ok(ClassSignature::new())
    }))
    .expect("defines");

    assert_eq!(
        rt.signature(knot),
        Err(ConfigurationError::CyclicSignature {
            class: "Knot".to_string()
        })
    );
    // The thunk is kept, not poisoned.
    assert_eq!(
        rt.signature(knot),
        Err(ConfigurationError::CyclicSignature {
            class: "Knot".to_string()
        })
    );
}

#[test]
fn test_set_signature_replaces_and_resets() {
    let rt = Runtime::new();
    let int = rt.core().int;
    let string = rt.core().string;
    let a = rt
        .define_class(
            rt.class_builder("A")
                .signature(move |_| Ok(ClassSignature::new().with_field("v", int))),
        )
        .expect("defines");
    assert_eq!(rt.member_type(a, "v", MemberKind::Field).expect("ok"), Some(int));

    rt.set_signature(a, move |_| Ok(ClassSignature::new().with_field("v", string)))
        .expect("sets");
    assert!(!rt.is_signature_evaluated(a));
    assert_eq!(
        rt.member_type(a, "v", MemberKind::Field).expect("ok"),
        Some(string)
    );
}

#[test]
fn test_accessors_fall_back_to_fields() {
    let sig = ClassSignature::new()
        .with_field("x", TypeId::DYNAMIC)
        .with_getter("y", TypeId::VOID);
    assert_eq!(sig.member("x", MemberKind::Getter), Some(TypeId::DYNAMIC));
    assert_eq!(sig.member("x", MemberKind::Setter), Some(TypeId::DYNAMIC));
    assert_eq!(sig.member("y", MemberKind::Getter), Some(TypeId::VOID));
    assert_eq!(sig.member("y", MemberKind::Setter), None);
    assert_eq!(sig.member("y", MemberKind::Field), None);
}

#[test]
fn test_inherited_and_own_only_kinds() {
    let rt = Runtime::new();
    let int = rt.core().int;
    let base = rt
        .define_class(rt.class_builder("Base").signature(move |rt| {
            Ok(ClassSignature::new()
                .with_method("m", rt.parse_type("() => int")?)
                .with_constructor("", rt.parse_type("() => void")?)
                .with_static("count", int))
        }))
        .expect("defines");
    let derived = rt
        .define_class(rt.class_builder("Derived").extends(base))
        .expect("defines");

    assert!(rt.member_type(derived, "m", MemberKind::Method).expect("ok").is_some());
    assert_eq!(rt.member_type(derived, "", MemberKind::Constructor).expect("ok"), None);
    assert_eq!(rt.member_type(derived, "count", MemberKind::Static).expect("ok"), None);
    assert_eq!(rt.member_type(base, "count", MemberKind::Static).expect("ok"), Some(int));
    assert!(!MemberKind::Static.is_inherited());
    assert!(MemberKind::Setter.is_inherited());
}

#[test]
fn test_signature_drives_dynamic_checks() {
    let rt = Runtime::new();
    let a = rt
        .define_class(
            rt.class_builder("A")
                .method("twice", |_, _, args| {
                    Ok(Value::Int(args.arg(0).as_int().unwrap_or(0) * 2))
                })
                .signature(|rt| {
                    Ok(ClassSignature::new().with_method("twice", rt.parse_type("(int) => int")?))
                }),
        )
        .expect("defines");
    let v = rt.new_instance(a, &Args::none()).expect("constructs");
    assert!(!rt.is_signature_evaluated(a));
    assert_eq!(
        rt.dsend(&v, "twice", &Args::new(vec![Value::Int(4)])).expect("calls"),
        Value::Int(8)
    );
    assert!(rt.is_signature_evaluated(a));
    assert!(rt
        .dsend(&v, "twice", &Args::new(vec![Value::from("4")]))
        .is_err());
}

#[test]
fn test_signature_of_non_class_is_an_error() {
    let rt = Runtime::new();
    let f = rt.parse_type("() => void").expect("parses");
    assert!(matches!(
        rt.signature(f),
        Err(ConfigurationError::NotAClass { .. })
    ));
    assert!(rt.set_signature(f, |_| Ok(ClassSignature::new())).is_err());
}
