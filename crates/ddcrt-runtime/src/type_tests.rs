//! `is` / `as` / `_check` on runtime values.
//!
//! All three reduce to the subtype engine on the value's reified type,
//! except for `null`: `null is T` holds only for `dynamic`, `void`, `Object`
//! and `Null`, while casting or checking `null` always succeeds. `as` fails
//! with a `CastError`, `_check` with a `TypeError`; otherwise they are the
//! same operation.

use crate::error::{CastError, RuntimeError, TypeError};
use crate::runtime::Runtime;
use crate::value::Value;
use ddcrt_types::{ClassId, ConfigurationError, SubtypeFailureReason, TypeId};

/// How `is` tests against a class are decided.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum TypeTestMode {
    /// Full reified check including type arguments (`addTypeTests`).
    #[default]
    Reified,
    /// Nominal class membership only (`addSimpleTypeTests`). Only valid for
    /// classes that do not instantiate a generic.
    Simple,
}

impl Runtime {
    /// Install reified type tests on `class`. Classes start out with them,
    /// so this only matters to undo `add_simple_type_tests`.
    pub fn add_type_tests(&self, class: TypeId) -> Result<(), ConfigurationError> {
        let id = self.class_of_type(class)?;
        if let Some(info) = self.class_info(id) {
            info.type_tests.set(TypeTestMode::Reified);
        }
        Ok(())
    }

    /// Install nominal type tests on a non-generic class.
    pub fn add_simple_type_tests(&self, class: TypeId) -> Result<(), ConfigurationError> {
        let id = self.class_of_type(class)?;
        if self
            .interner
            .defs
            .class(id)
            .is_some_and(|def| def.origin.is_some())
        {
            return Err(ConfigurationError::SimpleTypeTestsOnGeneric {
                class: self.render(class),
            });
        }
        if let Some(info) = self.class_info(id) {
            info.type_tests.set(TypeTestMode::Simple);
        }
        Ok(())
    }

    pub fn type_test_mode(&self, class: TypeId) -> Option<TypeTestMode> {
        let id = self.interner.as_class(class)?;
        self.class_info(id).map(|info| info.type_tests.get())
    }

    /// The reified type of a value.
    pub fn runtime_type(&self, value: &Value) -> TypeId {
        let core = &self.core;
        match value {
            Value::Null => core.null,
            Value::Bool(_) => core.bool_,
            Value::Int(_) => core.int,
            Value::Double(_) => core.double,
            Value::String(_) => core.string,
            Value::Object(inst) => self.interner.class_type(inst.class),
            Value::Function(func) => func.type_id,
            Value::List(list) => list.type_id,
            Value::Type(_) => core.type_,
        }
    }

    /// The class whose members a non-null value dispatches to.
    pub(crate) fn value_class(&self, value: &Value) -> Option<ClassId> {
        match value {
            Value::Null => None,
            Value::Object(inst) => Some(inst.class),
            Value::Function(_) => self.interner.as_class(self.core.function),
            other => self.interner.as_class(self.runtime_type(other)),
        }
    }

    /// `value is target`.
    pub fn is(&self, value: &Value, target: TypeId) -> bool {
        if value.is_null() {
            let target = self.interner.unwrap_typedef(target);
            return target.is_dynamic()
                || target.is_void()
                || target == self.core.object
                || target == self.core.null;
        }
        if let Some(class) = self.interner.as_class(target)
            && self.type_test_mode(target) == Some(TypeTestMode::Simple)
            && let Some(source) = self.value_class(value)
        {
            return self.interner.defs.is_nominal_subclass(source, class);
        }
        self.is_subtype(self.runtime_type(value), target)
    }

    /// Whether `value` may be stored where `target` is expected: `is`, or
    /// `null`.
    pub(crate) fn accepts(&self, value: &Value, target: TypeId) -> bool {
        value.is_null() || self.is(value, target)
    }

    fn failure(&self, value: &Value, target: TypeId) -> (String, String, Option<SubtypeFailureReason>) {
        let actual = self.runtime_type(value);
        let reason = self.explain_subtype_failure(actual, target);
        (self.render(actual), self.render(target), reason)
    }

    /// `value as target`.
    pub fn cast(&self, value: &Value, target: TypeId) -> Result<Value, RuntimeError> {
        if self.accepts(value, target) {
            return Ok(value.clone());
        }
        let (actual, expected, reason) = self.failure(value, target);
        let detail = reason.as_ref().map(|r| r.render(&self.interner));
        Err(CastError {
            actual,
            expected,
            reason,
            detail,
        }
        .into())
    }

    /// Implicit coercion check (`_check`).
    pub fn check(&self, value: &Value, target: TypeId) -> Result<Value, RuntimeError> {
        if self.accepts(value, target) {
            return Ok(value.clone());
        }
        let (actual, expected, reason) = self.failure(value, target);
        let detail = reason.as_ref().map(|r| r.render(&self.interner));
        Err(TypeError {
            actual,
            expected,
            reason,
            detail,
        }
        .into())
    }
}

#[cfg(test)]
#[path = "../tests/type_tests_tests.rs"]
mod tests;
