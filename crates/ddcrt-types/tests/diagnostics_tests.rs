use super::*;
use crate::fixtures::World;

#[test]
fn test_fast_tracer_never_builds_reason() {
    let mut tracer = FastTracer;
    let mut called = false;
    let keep_going = tracer.on_mismatch(|| {
        called = true;
        SubtypeFailureReason::RecursionLimitExceeded
    });
    assert!(!keep_going);
    assert!(!called);
}

#[test]
fn test_diagnostic_tracer_wraps_inner_reason() {
    let w = World::new();
    let mut tracer = DiagnosticTracer::new();
    tracer.on_mismatch(|| SubtypeFailureReason::NotASubclass {
        source_type: w.string,
        target_type: w.int,
    });
    tracer.on_mismatch(|| SubtypeFailureReason::ParameterTypeMismatch {
        param_index: 0,
        source_param: w.int,
        target_param: w.string,
        nested_reason: None,
    });

    let failure = tracer.take_failure().expect("failure recorded");
    assert!(matches!(
        failure,
        SubtypeFailureReason::ParameterTypeMismatch {
            nested_reason: Some(_),
            ..
        }
    ));
    assert_eq!(
        failure.nested(),
        Some(&SubtypeFailureReason::NotASubclass {
            source_type: w.string,
            target_type: w.int,
        })
    );
    assert!(!tracer.has_failure());
}

#[test]
fn test_reason_without_nested_slot_keeps_inner() {
    let w = World::new();
    let mut tracer = DiagnosticTracer::new();
    tracer.on_mismatch(|| SubtypeFailureReason::RecursionLimitExceeded);
    tracer.on_mismatch(|| SubtypeFailureReason::TypeMismatch {
        source_type: w.int,
        target_type: w.string,
    });
    assert_eq!(
        tracer.get_failure(),
        Some(&SubtypeFailureReason::RecursionLimitExceeded)
    );
}

#[test]
fn test_discard_clears_abandoned_failure() {
    let mut tracer = DiagnosticTracer::new();
    tracer.on_mismatch(|| SubtypeFailureReason::RecursionLimitExceeded);
    tracer.discard();
    assert!(!tracer.has_failure());
}

#[test]
fn test_render_chain() {
    let w = World::new();
    let reason = SubtypeFailureReason::ReturnTypeMismatch {
        source_return: w.string,
        target_return: w.int,
        nested_reason: Some(Box::new(SubtypeFailureReason::NotASubclass {
            source_type: w.string,
            target_type: w.int,
        })),
    };
    assert_eq!(
        reason.render(&w.interner),
        "return type 'String' is not a subtype of 'int': \
         'String' does not extend, mix in or implement 'int'"
    );
}

#[test]
fn test_render_named_parameter_reasons() {
    let w = World::new();
    let b = w.interner.intern_string("b");
    assert_eq!(
        SubtypeFailureReason::MissingNamedParameter { name: b }.render(&w.interner),
        "missing named parameter 'b'"
    );
    assert_eq!(
        SubtypeFailureReason::TooFewOptionalParameters {
            source_count: 1,
            target_count: 2,
        }
        .render(&w.interner),
        "accepts 1 positional parameter(s) but 2 may be passed"
    );
}
