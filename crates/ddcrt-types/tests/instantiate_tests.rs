use super::*;
use crate::fixtures::World;

#[test]
fn test_substitution_basic() {
    let interner = TypeInterner::new();
    let t_name = interner.intern_string("T");
    let u_name = interner.intern_string("U");

    let mut subst = TypeSubstitution::new();
    assert!(subst.is_empty());

    subst.insert(t_name, TypeId::VOID);
    assert_eq!(subst.get(t_name), Some(TypeId::VOID));
    assert_eq!(subst.get(u_name), None);
    assert_eq!(subst.len(), 1);
}

#[test]
fn test_substitution_from_args_defaults_to_dynamic() {
    let w = World::new();
    let t = w.interner.intern_string("T");
    let u = w.interner.intern_string("U");
    let params = vec![TypeParamInfo::new(t), TypeParamInfo::new(u)];

    let subst = TypeSubstitution::from_args(&params, &[w.int]);
    assert_eq!(subst.get(t), Some(w.int));
    assert_eq!(subst.get(u), Some(TypeId::DYNAMIC));
}

#[test]
fn test_instantiate_type_parameter() {
    let w = World::new();
    let t_name = w.interner.intern_string("T");
    let t = w.interner.type_param(t_name);
    let mut subst = TypeSubstitution::new();
    subst.insert(t_name, w.string);

    assert_eq!(instantiate_type(&w.interner, t, &subst), w.string);
    // Concrete types are untouched.
    assert_eq!(instantiate_type(&w.interner, w.int, &subst), w.int);
}

#[test]
fn test_instantiate_function_type() {
    let w = World::new();
    let t_name = w.interner.intern_string("T");
    let t = w.interner.type_param(t_name);
    let f = w.interner.function(
        FunctionShape::new(t, vec![t]).with_named(vec![w.named("other", t)]),
    );
    let mut subst = TypeSubstitution::new();
    subst.insert(t_name, w.int);

    let result = instantiate_type(&w.interner, f, &subst);
    assert_eq!(w.render(result), "(int, {other: int}) => int");
}

#[test]
fn test_inner_binder_shadows_substitution() {
    let w = World::new();
    let t_name = w.interner.intern_string("T");
    let t = w.interner.type_param(t_name);
    // (T) => <T>(T) => T: the inner T is a different variable.
    let inner = w.interner.function(
        FunctionShape::new(t, vec![t]).with_type_params(vec![TypeParamInfo::new(t_name)]),
    );
    let outer = w.fn_type(inner, &[t]);
    let mut subst = TypeSubstitution::new();
    subst.insert(t_name, w.int);

    let result = instantiate_type(&w.interner, outer, &subst);
    assert_eq!(w.render(result), "(int) => <T>(T) => T");
}

#[test]
fn test_application_stays_open_without_env() {
    let w = World::new();
    let t_name = w.interner.intern_string("T");
    let t = w.interner.type_param(t_name);
    let list_t = w.interner.application(w.list, vec![t]);
    let mut subst = TypeSubstitution::new();
    subst.insert(t_name, w.int);

    let result = instantiate_type(&w.interner, list_t, &subst);
    assert!(matches!(
        w.interner.data(result),
        TypeData::Application { .. }
    ));
    assert_eq!(w.render(result), "List<int>");
}

#[test]
fn test_application_becomes_class_with_env() {
    let w = World::new();
    let t_name = w.interner.intern_string("T");
    let t = w.interner.type_param(t_name);
    let list_t = w.interner.application(w.list, vec![t]);
    let mut subst = TypeSubstitution::new();
    subst.insert(t_name, w.int);

    let result = instantiate_type_with_env(&w.interner, &w, list_t, &subst).expect("instantiates");
    assert_eq!(result, w.inst(w.list, &[w.int]));
}

#[test]
fn test_bind_type_params() {
    let w = World::new();
    let t_name = w.interner.intern_string("T");
    let t = w.interner.type_param(t_name);
    let list_t = w.interner.application(w.list, vec![t]);
    let generic_fn = w.interner.function(
        FunctionShape::new(list_t, vec![t, t])
            .with_type_params(vec![TypeParamInfo::bounded(t_name, w.num)]),
    );

    let bound = bind_type_params(&w.interner, &w, generic_fn, &[w.int]).expect("binds");
    assert_eq!(w.render(bound), "(int, int) => List<int>");
    let shape = w.interner.as_function(bound).expect("function");
    assert!(!shape.is_generic());
    assert_eq!(shape.return_type, w.inst(w.list, &[w.int]));
}

#[test]
fn test_bind_type_params_arity() {
    let w = World::new();
    let t_name = w.interner.intern_string("T");
    let t = w.interner.type_param(t_name);
    let identity = w.interner.function(
        FunctionShape::new(t, vec![t]).with_type_params(vec![TypeParamInfo::new(t_name)]),
    );

    let err = bind_type_params(&w.interner, &w, identity, &[w.int, w.string])
        .expect_err("arity mismatch");
    assert_eq!(
        err,
        ConfigurationError::ArityMismatch {
            generic: "<T>(T) => T".to_string(),
            expected: 1,
            actual: 2,
        }
    );
    assert!(bind_type_params(&w.interner, &w, w.int, &[w.int]).is_err());
}

#[test]
fn test_instantiate_signature_renames_own_params() {
    let w = World::new();
    let t_name = w.interner.intern_string("T");
    let s_name = w.interner.intern_string("S");
    let t = w.interner.type_param(t_name);
    let shape = FunctionShape::new(t, vec![t]).with_type_params(vec![TypeParamInfo::new(t_name)]);
    let mut subst = TypeSubstitution::new();
    subst.insert(t_name, w.interner.type_param(s_name));

    let renamed = instantiate_signature(&w.interner, &shape, &subst);
    assert!(renamed.type_params.is_empty());
    assert_eq!(renamed.return_type, w.interner.type_param(s_name));
    assert_eq!(renamed.required, vec![w.interner.type_param(s_name)]);
}
