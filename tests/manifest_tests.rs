//! End-to-end tests for manifests
//!
//! These tests drive the public API the way generated code does:
//! - Declaring generic classes, mixins and typedefs
//! - Querying subtypes and member signatures
//! - Mixing manifest declarations with hand-built runtime values

use ddcrt::manifest::Manifest;
use ddcrt::{Args, Runtime, RuntimeOptions, Value};
use serde_json::json;

fn evaluate(text: &str) -> Vec<Option<serde_json::Value>> {
    let report = Manifest::from_json(text)
        .expect("manifest parses")
        .evaluate()
        .expect("manifest evaluates");
    report.results.into_iter().map(|r| r.value).collect()
}

#[test]
fn test_generic_mixin_over_nested_instantiation() {
    // class Set<T> {}  class C<U> { U value; }  class D<V> = Object with C<Set<V>>;
    let values = evaluate(
        r#"{
          "declarations": [
            { "kind": "class", "name": "Set", "typeParams": ["T"] },
            { "kind": "class", "name": "C", "typeParams": ["U"], "fields": { "value": "U" } },
            { "kind": "class", "name": "D", "typeParams": ["V"], "mixins": ["C<Set<V>>"] }
          ],
          "queries": [
            { "memberType": { "type": "D<int>", "member": "value", "kind": "field" } },
            { "isSubtype": { "source": "D<int>", "target": "C<Set<int>>" } },
            { "isSubtype": { "source": "D<int>", "target": "C<Set<String>>" } }
          ]
        }"#,
    );
    assert_eq!(
        values,
        vec![Some(json!("Set<int>")), Some(json!(true)), Some(json!(false))]
    );
}

#[test]
fn test_function_typedef_subtyping() {
    let values = evaluate(
        r#"{
          "declarations": [
            { "kind": "typedef", "name": "Foo", "type": "(bool, [String]) => int" },
            { "kind": "typedef", "name": "Baz", "type": "(bool, {b: String}) => int" },
            { "kind": "typedef", "name": "Boz", "type": "(bool) => int" }
          ],
          "queries": [
            { "isSubtype": { "source": "Foo", "target": "Boz" } },
            { "isSubtype": { "source": "Baz", "target": "Boz" } },
            { "isSubtype": { "source": "Boz", "target": "Foo" } },
            { "isSubtype": { "source": "Foo", "target": "Baz" } },
            { "isSubtype": { "source": "Foo", "target": "Function" } }
          ]
        }"#,
    );
    assert_eq!(
        values,
        vec![
            Some(json!(true)),
            Some(json!(true)),
            Some(json!(false)),
            Some(json!(false)),
            Some(json!(true)),
        ]
    );
}

#[test]
fn test_core_generics_are_available() {
    let values = evaluate(
        r#"{
          "queries": [
            { "isSubtype": { "source": "List<int>", "target": "Iterable<int>" } },
            { "isSubtype": { "source": "List<int>", "target": "List<dynamic>" } },
            { "isSubtype": { "source": "List<dynamic>", "target": "List<int>" } },
            { "render": { "type": "Map<String, List<int>>" } },
            { "memberType": { "type": "List<String>", "member": "add" } }
          ]
        }"#,
    );
    assert_eq!(
        values,
        vec![
            Some(json!(true)),
            Some(json!(true)),
            Some(json!(true)),
            Some(json!("Map<String, List<int>>")),
            Some(json!("(String) => void")),
        ]
    );
}

#[test]
fn test_options_in_manifest() {
    let manifest = Manifest::from_json(
        r#"{
          "options": { "genericVariance": "covariant", "requiredFillsOptional": false },
          "queries": [
            { "isSubtype": { "source": "List<int>", "target": "List<num>" } },
            { "isSubtype": { "source": "(int, int) => void", "target": "(int, [int]) => void" } }
          ]
        }"#,
    )
    .expect("parses");
    assert!(!manifest.options.required_fills_optional);
    let report = manifest.evaluate().expect("evaluates");
    assert_eq!(report.results[0].value, Some(json!(true)));
    assert_eq!(report.results[1].value, Some(json!(false)));

    let defaults = manifest
        .evaluate_with(RuntimeOptions::default())
        .expect("evaluates");
    assert_eq!(defaults.results[0].value, Some(json!(false)));
    assert_eq!(defaults.results[1].value, Some(json!(true)));
}

#[test]
fn test_declared_classes_are_usable_at_runtime() {
    let manifest = Manifest::from_json(
        r#"{
          "declarations": [
            { "kind": "class", "name": "Box", "typeParams": ["T"], "fields": { "value": "T" } }
          ]
        }"#,
    )
    .expect("parses");
    let rt = Runtime::new();
    manifest.declare(&rt).expect("declares");

    let box_int = rt.parse_type("Box<int>").expect("parses");
    let b = rt.new_instance(box_int, &Args::none()).expect("constructs");
    assert_eq!(rt.display_string(&b).expect("toString"), "Instance of 'Box<int>'");
    rt.dput(&b, "value", Value::Int(1)).expect("int is accepted");
    assert!(rt.dput(&b, "value", Value::from("one")).is_err());
    assert!(rt.is(&b, box_int));
    assert!(!rt.is(&b, rt.parse_type("Box<String>").expect("parses")));
}
