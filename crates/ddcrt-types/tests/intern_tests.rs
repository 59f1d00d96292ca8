use super::*;
use crate::def::TypedefDef;
use crate::errors::ConfigurationError;
use crate::fixtures::World;

#[test]
fn test_intrinsics_have_fixed_ids() {
    let interner = TypeInterner::new();
    assert_eq!(interner.lookup(TypeId::DYNAMIC), Some(TypeData::Dynamic));
    assert_eq!(interner.lookup(TypeId::VOID), Some(TypeData::Void));
    assert_eq!(interner.lookup(TypeId::BOTTOM), Some(TypeData::Bottom));
    assert!(interner.is_empty());
    assert!(TypeId::VOID.is_intrinsic());
    assert!(!TypeId(TypeId::FIRST_USER).is_intrinsic());
}

#[test]
fn test_class_type_is_canonical() {
    let w = World::new();
    let int_class = w.class_of(w.int);
    // wrap_type(C) is identical across calls.
    assert_eq!(w.interner.class_type(int_class), w.int);
    assert_eq!(w.interner.class_type(int_class), w.interner.class_type(int_class));
    assert_ne!(w.int, w.num);
}

#[test]
fn test_unknown_id_reads_as_dynamic() {
    let interner = TypeInterner::new();
    assert_eq!(interner.lookup(TypeId(12345)), None);
    assert_eq!(interner.data(TypeId(12345)), TypeData::Dynamic);
}

#[test]
fn test_type_lists_are_interned() {
    let w = World::new();
    let a = w.interner.type_list(vec![w.int, w.string]);
    let b = w.interner.type_list(vec![w.int, w.string]);
    let c = w.interner.type_list(vec![w.string, w.int]);
    assert_eq!(a, b);
    assert_ne!(a, c);
    assert_eq!(w.interner.type_list(Vec::new()), TypeListId::EMPTY);
    assert_eq!(&*w.interner.type_list_items(a), &[w.int, w.string]);
}

#[test]
fn test_function_named_params_are_order_insensitive() {
    let w = World::new();
    let ab = w.interner.function(
        FunctionShape::new(w.int, vec![w.bool_])
            .with_named(vec![w.named("a", w.int), w.named("b", w.string)]),
    );
    let ba = w.interner.function(
        FunctionShape::new(w.int, vec![w.bool_])
            .with_named(vec![w.named("b", w.string), w.named("a", w.int)]),
    );
    assert_eq!(ab, ba);
}

#[test]
fn test_mixed_parameter_kinds_are_rejected_or_normalized() {
    let w = World::new();
    let mixed = || {
        FunctionShape::new(w.int, vec![w.bool_])
            .with_optional(vec![w.string])
            .with_named(vec![w.named("b", w.string)])
    };

    assert_eq!(
        w.interner.try_function(mixed()),
        Err(ConfigurationError::MixedParameterKinds {
            optional: 1,
            named: 1,
        })
    );

    let optional_only =
        FunctionShape::new(w.int, vec![w.bool_]).with_optional(vec![w.string]);
    let normalized = w.interner.function(mixed());
    assert_eq!(normalized, w.interner.function(optional_only.clone()));
    assert_eq!(w.interner.try_function(optional_only), Ok(normalized));
    assert_eq!(w.render(normalized), "(bool, [String]) => int");
}

#[test]
fn test_function_equality_is_structural() {
    let w = World::new();
    let f1 = w.fn_type(w.int, &[w.bool_]);
    let f2 = w.fn_type(w.int, &[w.bool_]);
    let f3 = w.fn_type(w.num, &[w.bool_]);
    assert_eq!(f1, f2);
    assert_ne!(f1, f3);
}

#[test]
fn test_typedef_is_erased_by_canonicalize() {
    let w = World::new();
    let underlying = w.fn_type(w.int, &[w.int]);
    let td = w.interner.defs.register_typedef(TypedefDef {
        name: w.interner.intern_string("IntOp"),
        origin: None,
        type_args: TypeListId::EMPTY,
        underlying,
    });
    let alias = w.interner.typedef_type(td);

    assert_ne!(alias, underlying);
    assert_eq!(w.interner.unwrap_typedef(alias), underlying);
    assert_eq!(w.interner.canonicalize(alias), underlying);
    assert!(w.interner.types_equal(alias, underlying));

    // Nested inside a function type.
    let takes_alias = w.fn_type(TypeId::VOID, &[alias]);
    let takes_fn = w.fn_type(TypeId::VOID, &[underlying]);
    assert_ne!(takes_alias, takes_fn);
    assert_eq!(w.interner.canonicalize(takes_alias), takes_fn);
    assert!(w.interner.as_function(alias).is_some());
}

#[test]
fn test_contains_type_params_respects_binders() {
    let w = World::new();
    let t_name = w.interner.intern_string("T");
    let t = w.interner.type_param(t_name);
    let list_t = w.interner.application(w.list, vec![t]);
    assert!(w.interner.contains_type_params(t));
    assert!(w.interner.contains_type_params(list_t));
    assert!(!w.interner.contains_type_params(w.int));

    // <T>(T) => List<T> binds its own T.
    let generic_fn = w.interner.function(
        FunctionShape::new(list_t, vec![t]).with_type_params(vec![TypeParamInfo::new(t_name)]),
    );
    assert!(!w.interner.contains_type_params(generic_fn));

    // (T) => int does not.
    let open_fn = w.fn_type(w.int, &[t]);
    assert!(w.interner.contains_type_params(open_fn));
}

#[test]
fn test_generic_function_equality_ignores_parameter_names() {
    let w = World::new();
    let generic = |name: &str, bound: Option<TypeId>, ret: &dyn Fn(TypeId) -> TypeId| {
        let atom = w.interner.intern_string(name);
        let param = w.interner.type_param(atom);
        let info = match bound {
            Some(bound) => TypeParamInfo::bounded(atom, bound),
            None => TypeParamInfo::new(atom),
        };
        w.interner
            .function(FunctionShape::new(ret(param), vec![param]).with_type_params(vec![info]))
    };

    // <T>(T) => T and <U>(U) => U
    let identity_t = generic("T", None, &|p| p);
    let identity_u = generic("U", None, &|p| p);
    assert_ne!(identity_t, identity_u);
    assert!(w.interner.types_equal(identity_t, identity_u));

    // Bounds compare under the same renaming.
    let num_t = generic("T", Some(w.num), &|p| p);
    let num_u = generic("U", Some(w.num), &|p| p);
    assert!(w.interner.types_equal(num_t, num_u));
    assert!(!w.interner.types_equal(num_t, identity_u));

    // <T>(T) => List<T> and <U>(U) => List<U>, but not <U>(U) => List<int>.
    let list_t = generic("T", None, &|p| w.interner.application(w.list, vec![p]));
    let list_u = generic("U", None, &|p| w.interner.application(w.list, vec![p]));
    assert!(w.interner.types_equal(list_t, list_u));
    let list_int = generic("U", None, &|_| w.interner.application(w.list, vec![w.int]));
    assert!(!w.interner.types_equal(list_t, list_int));

    // A free T is not the bound U.
    let t = w.interner.type_param(w.interner.intern_string("T"));
    let free = w.interner.function(
        FunctionShape::new(t, vec![t])
            .with_type_params(vec![TypeParamInfo::new(w.interner.intern_string("U"))]),
    );
    assert!(!w.interner.types_equal(free, identity_u));
    assert!(!w.interner.types_equal(identity_t, free));
}

#[test]
fn test_class_type_args() {
    let w = World::new();
    let map = w.inst(w.map, &[w.string, w.bool_]);
    let class = w.class_of(map);
    assert_eq!(&*w.interner.class_type_args(class), &[w.string, w.bool_]);
    assert!(w.interner.class_type_args(w.class_of(w.int)).is_empty());
}
