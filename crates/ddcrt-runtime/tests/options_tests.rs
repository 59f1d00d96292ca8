use super::*;

#[test]
fn test_defaults() {
    let options = RuntimeOptions::default();
    assert_eq!(options.generic_variance, GenericVariance::Invariant);
    assert!(options.required_fills_optional);
    assert_eq!(options.max_subtype_depth, 100);
    assert!(!options.trace_instantiations);
}

#[test]
fn test_deserialize_camel_case_with_defaults() {
    let options: RuntimeOptions =
        serde_json::from_str(r#"{ "genericVariance": "covariant", "requiredFillsOptional": false }"#)
            .expect("valid options");
    assert_eq!(options.generic_variance, GenericVariance::Covariant);
    assert!(!options.required_fills_optional);
    assert_eq!(options.max_subtype_depth, MAX_SUBTYPE_DEPTH);

    let empty: RuntimeOptions = serde_json::from_str("{}").expect("empty object");
    assert_eq!(empty, RuntimeOptions::default());
}

#[test]
fn test_unknown_variance_is_rejected() {
    let result: Result<RuntimeOptions, _> =
        serde_json::from_str(r#"{ "genericVariance": "contravariant" }"#);
    assert!(result.is_err());
}

#[test]
fn test_subtype_options_mirror_runtime_options() {
    let options = RuntimeOptions {
        generic_variance: GenericVariance::Covariant,
        required_fills_optional: false,
        max_subtype_depth: 12,
        trace_instantiations: true,
    };
    let subtype = options.subtype_options();
    assert_eq!(subtype.variance, GenericVariance::Covariant);
    assert!(!subtype.required_fills_optional);
    assert_eq!(subtype.max_depth, 12);
}
