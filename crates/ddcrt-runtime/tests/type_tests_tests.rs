use super::*;
use crate::value::Args;

fn ty(rt: &Runtime, src: &str) -> TypeId {
    rt.parse_type(src).expect("parses")
}

#[test]
fn test_function_values_against_typedefs() {
    let rt = Runtime::new();
    let foo_t = rt.typedef("Foo", ty(&rt, "(bool, [String]) => int"));
    let baz_t = rt.typedef("Baz", ty(&rt, "(bool, {b: String}) => int"));
    let boz_t = rt.typedef("Boz", ty(&rt, "(bool) => int"));

    let foo = rt.fn_(ty(&rt, "(bool, [String]) => int"), |_, _| Ok(Value::Int(0)));
    let baz = rt.fn_(ty(&rt, "(bool, {b: String}) => int"), |_, _| Ok(Value::Int(0)));

    assert!(rt.is(&foo, foo_t));
    assert!(!rt.is(&foo, baz_t));
    assert!(rt.is(&foo, boz_t));

    assert!(!rt.is(&baz, foo_t));
    assert!(rt.is(&baz, baz_t));
    assert!(rt.is(&baz, boz_t));

    assert!(rt.is(&foo, rt.core().function));
    assert!(rt.is(&foo, rt.core().object));
}

#[test]
fn test_primitive_runtime_types() {
    let rt = Runtime::new();
    let core = *rt.core();
    assert_eq!(rt.runtime_type(&Value::Int(1)), core.int);
    assert_eq!(rt.runtime_type(&Value::Double(1.5)), core.double);
    assert_eq!(rt.runtime_type(&Value::from(true)), core.bool_);
    assert_eq!(rt.runtime_type(&Value::from("s")), core.string);
    assert_eq!(rt.runtime_type(&Value::Null), core.null);
    assert_eq!(rt.runtime_type(&rt.wrap_type(core.int)), core.type_);

    assert!(rt.is(&Value::Int(1), core.num));
    assert!(!rt.is(&Value::Int(1), core.double));
    assert!(rt.is(&Value::from("s"), TypeId::DYNAMIC));
}

#[test]
fn test_null_semantics() {
    let rt = Runtime::new();
    let core = *rt.core();

    assert!(rt.is(&Value::Null, TypeId::DYNAMIC));
    assert!(rt.is(&Value::Null, TypeId::VOID));
    assert!(rt.is(&Value::Null, core.object));
    assert!(rt.is(&Value::Null, core.null));
    assert!(!rt.is(&Value::Null, core.int));
    assert!(!rt.is(&Value::Null, core.string));

    // null passes every cast and check, and Null is a subtype of every type.
    assert_eq!(rt.cast(&Value::Null, core.int), Ok(Value::Null));
    assert_eq!(rt.check(&Value::Null, core.string), Ok(Value::Null));
    assert!(rt.is_subtype(core.null, core.int));
}

#[test]
fn test_cast_and_check_raise_different_errors() {
    let rt = Runtime::new();
    let core = *rt.core();

    let cast = rt.cast(&Value::from("x"), core.int).expect_err("String is not int");
    match cast {
        RuntimeError::Cast(e) => {
            assert_eq!(e.actual, "String");
            assert_eq!(e.expected, "int");
            assert!(e.reason.is_some());
        }
        other => panic!("expected CastError, got {other}"),
    }

    let check = rt.check(&Value::from("x"), core.int).expect_err("String is not int");
    assert!(matches!(check, RuntimeError::Type(_)));
    assert!(check.to_string().starts_with("TypeError: Expected a value of type 'int'"));
    assert!(check.is_recoverable());

    assert_eq!(rt.cast(&Value::Int(3), core.num), Ok(Value::Int(3)));
}

#[test]
fn test_generic_instances_check_type_arguments() {
    let rt = Runtime::new();
    let core = *rt.core();
    let ints = rt
        .list(core.int, vec![Value::Int(1), Value::Int(2)])
        .expect("builds");
    assert!(rt.is(&ints, ty(&rt, "List<int>")));
    assert!(!rt.is(&ints, ty(&rt, "List<num>")));
    assert!(rt.is(&ints, ty(&rt, "Iterable<int>")));
    assert!(rt.is(&ints, ty(&rt, "List<dynamic>")));

    let err = rt.cast(&ints, ty(&rt, "List<String>")).expect_err("wrong element type");
    match err {
        RuntimeError::Cast(e) => assert_eq!(e.expected, "List<String>"),
        other => panic!("expected CastError, got {other}"),
    }
}

#[test]
fn test_simple_type_tests_are_nominal() {
    let rt = Runtime::new();
    let plain = rt.define_class(rt.class_builder("Plain")).expect("defines");
    let sub = rt
        .define_class(rt.class_builder("Sub").extends(plain))
        .expect("defines");
    rt.add_simple_type_tests(plain).expect("non-generic");
    assert_eq!(rt.type_test_mode(plain), Some(TypeTestMode::Simple));

    let v = rt.new_instance(sub, &Args::none()).expect("constructs");
    assert!(rt.is(&v, plain));
    assert!(!rt.is(&Value::Int(1), plain));

    rt.add_type_tests(plain).expect("resets");
    assert_eq!(rt.type_test_mode(plain), Some(TypeTestMode::Reified));
    assert!(rt.is(&v, plain));
}

#[test]
fn test_simple_type_tests_rejected_on_generic_instantiations() {
    let rt = Runtime::new();
    let list_int = ty(&rt, "List<int>");
    assert_eq!(
        rt.add_simple_type_tests(list_int),
        Err(ConfigurationError::SimpleTypeTestsOnGeneric {
            class: "List<int>".to_string()
        })
    );
    assert_eq!(rt.type_test_mode(list_int), Some(TypeTestMode::Reified));
}

#[test]
fn test_callable_object_against_function_type() {
    let rt = Runtime::new();
    let callable = rt
        .define_class(
            rt.class_builder("Callable")
                .method("call", |_, _, args| Ok(args.arg(0)))
                .signature(|rt| {
                    Ok(crate::signature::ClassSignature::new()
                        .with_method("call", rt.parse_type("(String) => String")?))
                }),
        )
        .expect("defines");
    let v = rt.new_instance(callable, &Args::none()).expect("constructs");
    assert!(rt.is(&v, ty(&rt, "(String) => String")));
    assert!(!rt.is(&v, ty(&rt, "(int) => String")));
    assert!(rt.is(&v, rt.core().function));
}
