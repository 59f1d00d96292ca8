//! Dynamic dispatch (`dsend`, `dget`, `dput`, `dcall`).
//!
//! Untyped call sites go through here. Members are found on the receiver's
//! provider list; when the member has a registered signature, the argument
//! shape and types are validated first and a mismatch is a
//! `NoSuchMethodError`. A missing member falls back to the class's
//! [`DynamicDispatchable`] handler if it registered one.

use crate::class::MemberSlot;
use crate::error::{InvocationKind, NoSuchMethodError, RuntimeError, TypeError};
use crate::runtime::Runtime;
use crate::signature::MemberKind;
use crate::value::{Args, FunctionBody, FunctionValue, Value};
use ddcrt_types::{ClassId, ConfigurationError, TypeId};
use std::rc::Rc;
use tracing::trace;

/// A dynamic access that found no member.
#[derive(Clone, Debug)]
pub struct Invocation {
    pub member_name: String,
    pub kind: InvocationKind,
    /// Call arguments; the assigned value for setters.
    pub args: Args,
}

/// `noSuchMethod` capability a class can opt into.
pub trait DynamicDispatchable {
    fn no_such_method(
        &self,
        rt: &Runtime,
        receiver: &Value,
        invocation: &Invocation,
    ) -> Result<Value, RuntimeError>;
}

impl<F> DynamicDispatchable for F
where
    F: Fn(&Runtime, &Value, &Invocation) -> Result<Value, RuntimeError>,
{
    fn no_such_method(
        &self,
        rt: &Runtime,
        receiver: &Value,
        invocation: &Invocation,
    ) -> Result<Value, RuntimeError> {
        self(rt, receiver, invocation)
    }
}

impl Runtime {
    /// Register (or replace) the `noSuchMethod` handler of `class`.
    /// Subclasses inherit it.
    pub fn set_no_such_method<H>(&self, class: TypeId, handler: H) -> Result<(), ConfigurationError>
    where
        H: DynamicDispatchable + 'static,
    {
        let id = self.class_of_type(class)?;
        if let Some(info) = self.class_info(id) {
            *info.dispatch.borrow_mut() = Some(Rc::new(handler));
        }
        Ok(())
    }

    fn dispatch_handler(&self, class: ClassId) -> Option<Rc<dyn DynamicDispatchable>> {
        let info = self.class_info(class)?;
        info.providers.iter().rev().find_map(|&provider| {
            self.class_info(provider)
                .and_then(|p| p.dispatch.borrow().clone())
        })
    }

    fn receiver_name(&self, receiver: &Value) -> String {
        if receiver.is_null() {
            "null".to_string()
        } else {
            self.render(self.runtime_type(receiver))
        }
    }

    fn no_such_method(&self, receiver: &Value, invocation: Invocation) -> Result<Value, RuntimeError> {
        if let Some(class) = self.value_class(receiver)
            && let Some(handler) = self.dispatch_handler(class)
        {
            trace!(member = %invocation.member_name, kind = %invocation.kind, "noSuchMethod");
            return handler.no_such_method(self, receiver, &invocation);
        }
        Err(NoSuchMethodError::missing(
            self.receiver_name(receiver),
            invocation.member_name,
            invocation.kind,
        )
        .into())
    }

    // =========================================================================
    // Argument validation
    // =========================================================================

    /// Validate `args` against the registered type of member `name`, if any.
    pub(crate) fn validate_member_call(
        &self,
        class: ClassId,
        receiver: TypeId,
        name: &str,
        kind: MemberKind,
        args: &Args,
    ) -> Result<(), RuntimeError> {
        let Some(fn_type) = self.lookup_member_type(class, name, kind)? else {
            return Ok(());
        };
        let invocation_kind = match kind {
            MemberKind::Constructor => InvocationKind::Constructor,
            _ => InvocationKind::Method,
        };
        self.check_arguments(fn_type, args, |message| {
            NoSuchMethodError::mismatch(self.render(receiver), name, invocation_kind, message)
        })
    }

    /// Check arity, named parameter names and argument types against a
    /// function type. Generic function types are bound to the passed type
    /// arguments first (`dynamic` for each one when none are passed).
    pub(crate) fn check_arguments(
        &self,
        fn_type: TypeId,
        args: &Args,
        mismatch: impl Fn(String) -> NoSuchMethodError,
    ) -> Result<(), RuntimeError> {
        let Some(mut shape) = self.interner.as_function(fn_type) else {
            return Ok(());
        };
        if shape.is_generic() {
            let type_args = self.effective_type_args(fn_type, args);
            if type_args.len() != shape.type_params.len() {
                return Err(mismatch(format!(
                    "expected {} type argument(s) but got {}",
                    shape.type_params.len(),
                    type_args.len()
                ))
                .into());
            }
            let bound = self.bind_checked(fn_type, &type_args)?;
            match self.interner.as_function(bound) {
                Some(bound_shape) => shape = bound_shape,
                None => return Ok(()),
            }
        } else if !args.type_args.is_empty() {
            return Err(mismatch(format!(
                "expected no type arguments but got {}",
                args.type_args.len()
            ))
            .into());
        }

        let count = args.positional.len();
        if count < shape.required.len() || count > shape.positional_count() {
            let expected = if shape.optional.is_empty() {
                shape.required.len().to_string()
            } else {
                format!("{} to {}", shape.required.len(), shape.positional_count())
            };
            return Err(mismatch(format!(
                "expected {expected} positional argument(s) but got {count}"
            ))
            .into());
        }
        for (index, value) in args.positional.iter().enumerate() {
            if let Some(param) = shape.positional(index)
                && !self.accepts(value, param)
            {
                return Err(mismatch(format!(
                    "argument {index} of type '{}' is not a '{}'",
                    self.render(self.runtime_type(value)),
                    self.render(param)
                ))
                .into());
            }
        }
        for (name, value) in &args.named {
            let declared = self
                .interner
                .lookup_string(name)
                .and_then(|atom| shape.named_param(atom));
            let Some(param) = declared else {
                return Err(mismatch(format!("no named parameter '{name}'")).into());
            };
            if !self.accepts(value, param) {
                return Err(mismatch(format!(
                    "named argument '{name}' of type '{}' is not a '{}'",
                    self.render(self.runtime_type(value)),
                    self.render(param)
                ))
                .into());
            }
        }
        Ok(())
    }

    /// Type arguments a call to `fn_type` runs with: the passed ones, or
    /// `dynamic` for every parameter of a generic function called without.
    fn effective_type_args(&self, fn_type: TypeId, args: &Args) -> Vec<TypeId> {
        match self.interner.as_function(fn_type) {
            Some(shape) if shape.is_generic() && args.type_args.is_empty() => {
                vec![TypeId::DYNAMIC; shape.type_params.len()]
            }
            _ => args.type_args.clone(),
        }
    }

    fn with_effective_type_args(&self, fn_type: Option<TypeId>, args: &Args) -> Option<Args> {
        let fn_type = fn_type?;
        let type_args = self.effective_type_args(fn_type, args);
        (type_args != args.type_args).then(|| args.clone().with_type_args(type_args))
    }

    // =========================================================================
    // Entry points
    // =========================================================================

    /// Call a function value (or a callable object) dynamically.
    pub fn dcall(&self, f: &Value, args: &Args) -> Result<Value, RuntimeError> {
        match f {
            Value::Function(func) => self.call_function(func, args),
            Value::Object(_) => self.dsend(f, "call", args),
            _ => Err(NoSuchMethodError::missing(
                self.receiver_name(f),
                "call",
                InvocationKind::Method,
            )
            .into()),
        }
    }

    fn call_function(&self, func: &FunctionValue, args: &Args) -> Result<Value, RuntimeError> {
        let member = func.name.as_deref().unwrap_or("call");
        self.check_arguments(func.type_id, args, |message| {
            NoSuchMethodError::mismatch(
                self.render(func.type_id),
                member,
                InvocationKind::Method,
                message,
            )
        })?;
        match self.with_effective_type_args(Some(func.type_id), args) {
            Some(filled) => (func.body)(self, &filled),
            None => (func.body)(self, args),
        }
    }

    /// `receiver.name(args)` without static type information.
    pub fn dsend(&self, receiver: &Value, name: &str, args: &Args) -> Result<Value, RuntimeError> {
        if let Value::Function(func) = receiver
            && name == "call"
        {
            return self.call_function(func, args);
        }
        let Some(class) = self.value_class(receiver) else {
            return Err(NoSuchMethodError::missing("null", name, InvocationKind::Method).into());
        };
        self.invoke_in(class, receiver, name, args)
    }

    /// `super.name(args)` from a method of `class`.
    pub fn dsend_super(
        &self,
        class: TypeId,
        receiver: &Value,
        name: &str,
        args: &Args,
    ) -> Result<Value, RuntimeError> {
        let id = self.class_of_type(class)?;
        match self.interner.defs.class(id).and_then(|def| def.supertype) {
            Some(sup) => self.invoke_in(sup, receiver, name, args),
            None => Err(NoSuchMethodError::missing(
                self.render(class),
                name,
                InvocationKind::Method,
            )
            .into()),
        }
    }

    /// Invoke `name` looking it up from `class`'s provider list.
    fn invoke_in(
        &self,
        class: ClassId,
        receiver: &Value,
        name: &str,
        args: &Args,
    ) -> Result<Value, RuntimeError> {
        match self.find_member(class, name, MemberSlot::is_readable) {
            Some((_, MemberSlot {
                method: Some(method),
                ..
            })) => {
                let receiver_type = self.runtime_type(receiver);
                self.validate_member_call(class, receiver_type, name, MemberKind::Method, args)?;
                let fn_type = self.lookup_member_type(class, name, MemberKind::Method)?;
                match self.with_effective_type_args(fn_type, args) {
                    Some(filled) => method(self, receiver, &filled),
                    None => method(self, receiver, args),
                }
            }
            Some((_, slot)) => {
                // A getter or field holding something callable.
                let target = self.read_slot(class, receiver, name, &slot)?;
                self.dcall(&target, args)
            }
            None => self.no_such_method(
                receiver,
                Invocation {
                    member_name: name.to_string(),
                    kind: InvocationKind::Method,
                    args: args.clone(),
                },
            ),
        }
    }

    fn read_slot(
        &self,
        class: ClassId,
        receiver: &Value,
        name: &str,
        slot: &MemberSlot,
    ) -> Result<Value, RuntimeError> {
        if let Some(getter) = &slot.getter {
            return getter(self, receiver);
        }
        if slot.field {
            return Ok(self.read_field(receiver, name).unwrap_or(Value::Null));
        }
        let Some(method) = slot.method.clone() else {
            return Ok(Value::Null);
        };
        // Tear-off: bind the receiver.
        let fn_type = self
            .lookup_member_type(class, name, MemberKind::Method)?
            .unwrap_or(self.core.function);
        let bound_receiver = receiver.clone();
        let body: FunctionBody =
            Rc::new(move |rt: &Runtime, args: &Args| method(rt, &bound_receiver, args));
        Ok(self.make_function(Some(Rc::from(name)), fn_type, body))
    }

    /// `receiver.name` without static type information. Methods are torn
    /// off as bound function values.
    pub fn dget(&self, receiver: &Value, name: &str) -> Result<Value, RuntimeError> {
        if let Value::Function(_) = receiver
            && name == "call"
        {
            return Ok(receiver.clone());
        }
        let Some(class) = self.value_class(receiver) else {
            return Err(NoSuchMethodError::missing("null", name, InvocationKind::Getter).into());
        };
        match self.find_member(class, name, MemberSlot::is_readable) {
            Some((_, slot)) => self.read_slot(class, receiver, name, &slot),
            None => self.no_such_method(
                receiver,
                Invocation {
                    member_name: name.to_string(),
                    kind: InvocationKind::Getter,
                    args: Args::none(),
                },
            ),
        }
    }

    /// `receiver.name = value` without static type information. The value
    /// is checked against the declared setter or field type.
    pub fn dput(&self, receiver: &Value, name: &str, value: Value) -> Result<Value, RuntimeError> {
        let Some(class) = self.value_class(receiver) else {
            return Err(NoSuchMethodError::missing("null", name, InvocationKind::Setter).into());
        };
        let Some((_, slot)) = self.find_member(class, name, MemberSlot::is_writable) else {
            return self.no_such_method(
                receiver,
                Invocation {
                    member_name: name.to_string(),
                    kind: InvocationKind::Setter,
                    args: Args::new(vec![value]),
                },
            );
        };
        if let Some(declared) = self.lookup_member_type(class, name, MemberKind::Setter)?
            && !self.accepts(&value, declared)
        {
            let actual = self.runtime_type(&value);
            return Err(TypeError {
                actual: self.render(actual),
                expected: self.render(declared),
                reason: self.explain_subtype_failure(actual, declared),
                detail: Some(format!("assignment to '{name}'")),
            }
            .into());
        }
        match &slot.setter {
            Some(setter) => setter(self, receiver, value.clone())?,
            None => self.init_field(receiver, name, value.clone()),
        }
        Ok(value)
    }
}

#[cfg(test)]
#[path = "../tests/dispatch_tests.rs"]
mod tests;
