use super::*;
use crate::options::RuntimeOptions;
use ddcrt_types::GenericVariance;

#[test]
fn test_core_library_is_bootstrapped() {
    let rt = Runtime::new();
    let core = *rt.core();
    assert_eq!(rt.render(core.object), "Object");
    assert_eq!(rt.render(core.int), "int");
    assert!(rt.is_subtype(core.int, core.num));
    assert!(rt.is_subtype(core.double, core.num));
    assert!(!rt.is_subtype(core.int, core.double));
    assert!(rt.is_subtype(core.string, core.object));
    assert_eq!(rt.lookup_type("String"), Some(core.string));
    assert_eq!(rt.lookup_generic("List"), Some(core.list));
    assert_eq!(rt.lookup_type("List"), None);
}

#[test]
fn test_parse_type_resolves_core_names() {
    let rt = Runtime::new();
    let core = *rt.core();
    let list_int = rt.parse_type("List<int>").expect("parses");
    assert_eq!(list_int, rt.instantiate(core.list, &[core.int]).expect("instantiates"));
    assert_eq!(rt.render(list_int), "List<int>");

    let f = rt.parse_type("(int, [String]) => bool").expect("parses");
    assert_eq!(rt.render(f), "(int, [String]) => bool");
}

#[test]
fn test_parse_type_errors() {
    let rt = Runtime::new();
    assert_eq!(
        rt.parse_type("Nope"),
        Err(ConfigurationError::UnknownType {
            name: "Nope".to_string()
        })
    );
    assert_eq!(
        rt.parse_type("int<String>"),
        Err(ConfigurationError::ArityMismatch {
            generic: "int".to_string(),
            expected: 0,
            actual: 1,
        })
    );
    assert!(matches!(
        rt.parse_type("List<int"),
        Err(ConfigurationError::InvalidTypeExpression { ref expression, .. }) if expression == "List<int"
    ));
}

#[test]
fn test_parse_type_with_bindings() {
    let rt = Runtime::new();
    let int = rt.core().int;
    let bound = rt
        .parse_type_with("(E) => List<E>", &[("E", int)])
        .expect("parses");
    assert_eq!(bound, rt.parse_type("(int) => List<int>").expect("parses"));
    assert!(!rt.interner().contains_type_params(bound));
}

#[test]
fn test_parse_type_with_unbound_variable_is_unknown() {
    let rt = Runtime::new();
    let int = rt.core().int;
    assert!(matches!(
        rt.parse_type_with("(E, F) => void", &[("E", int)]),
        Err(ConfigurationError::UnknownType { ref name }) if name == "F"
    ));
}

#[test]
fn test_wrap_type_is_canonical() {
    let rt = Runtime::new();
    let a = rt.parse_type("Map<String, int>").expect("parses");
    let b = rt.parse_type("Map<String, int>").expect("parses");
    assert!(rt.wrap_type(a).identical(&rt.wrap_type(b)));
    assert!(rt.types_equal(a, b));
}

#[test]
fn test_explain_subtype_failure() {
    let rt = Runtime::new();
    let core = *rt.core();
    assert_eq!(rt.explain_subtype_failure(core.int, core.num), None);
    assert!(rt.explain_subtype_failure(core.string, core.int).is_some());
}

#[test]
fn test_covariant_generics_option() {
    let invariant = Runtime::new();
    let list_int = invariant.parse_type("List<int>").expect("parses");
    let list_num = invariant.parse_type("List<num>").expect("parses");
    assert!(!invariant.is_subtype(list_int, list_num));

    let covariant = Runtime::with_options(RuntimeOptions {
        generic_variance: GenericVariance::Covariant,
        ..RuntimeOptions::default()
    });
    let list_int = covariant.parse_type("List<int>").expect("parses");
    let list_num = covariant.parse_type("List<num>").expect("parses");
    assert!(covariant.is_subtype(list_int, list_num));
    assert!(!covariant.is_subtype(list_num, list_int));
}

#[test]
fn test_callable_class_is_a_function_subtype() {
    let rt = Runtime::new();
    let adder = rt
        .define_class(
            rt.class_builder("Adder")
                .method("call", |_, _, args| {
                    Ok(Value::Int(args.arg(0).as_int().unwrap_or(0) + 1))
                })
                .signature(|rt| {
                    Ok(crate::signature::ClassSignature::new()
                        .with_method("call", rt.parse_type("(int) => int")?))
                }),
        )
        .expect("defines");
    let int_to_int = rt.parse_type("(int) => int").expect("parses");
    let string_to_int = rt.parse_type("(String) => int").expect("parses");
    assert!(rt.is_subtype(adder, int_to_int));
    assert!(!rt.is_subtype(adder, string_to_int));
}

#[test]
fn test_class_of_type_rejects_non_classes() {
    let rt = Runtime::new();
    let f = rt.parse_type("() => void").expect("parses");
    assert!(matches!(
        rt.class_of_type(f),
        Err(ConfigurationError::NotAClass { ref name }) if name == "() => void"
    ));
    assert!(rt.class_of_type(TypeId::DYNAMIC).is_err());
}
