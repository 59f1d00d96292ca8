//! Function values and generic function binding.

use crate::error::{RuntimeError, TypeError};
use crate::runtime::Runtime;
use crate::value::{Args, FunctionBody, FunctionValue, Value};
use ddcrt_types::{TypeId, TypeSubstitution, bind_type_params, instantiate_type_with_env};
use std::rc::Rc;
use tracing::trace;

impl Runtime {
    /// Tag a closure with its reified function type (`dart.fn`).
    ///
    /// A type that is not a function type reifies as `Function`, so the
    /// value passes `is Function` but no structural test.
    pub fn fn_<F>(&self, fn_type: TypeId, body: F) -> Value
    where
        F: Fn(&Runtime, &Args) -> Result<Value, RuntimeError> + 'static,
    {
        self.make_function(None, fn_type, Rc::new(body))
    }

    /// Like [`Runtime::fn_`], with a name for diagnostics.
    pub fn named_fn<F>(&self, name: &str, fn_type: TypeId, body: F) -> Value
    where
        F: Fn(&Runtime, &Args) -> Result<Value, RuntimeError> + 'static,
    {
        self.make_function(Some(Rc::from(name)), fn_type, Rc::new(body))
    }

    pub(crate) fn make_function(
        &self,
        name: Option<Rc<str>>,
        fn_type: TypeId,
        body: FunctionBody,
    ) -> Value {
        let type_id = if self.interner.as_function(fn_type).is_some() {
            fn_type
        } else {
            self.core.function
        };
        Value::Function(Rc::new(FunctionValue {
            type_id,
            body,
            name,
        }))
    }

    /// Bind the type arguments of a generic function type, checking each
    /// argument against its (substituted) bound.
    pub fn bind_checked(&self, fn_type: TypeId, type_args: &[TypeId]) -> Result<TypeId, RuntimeError> {
        let bound = bind_type_params(&self.interner, self, fn_type, type_args)?;
        let Some(shape) = self.interner.as_function(fn_type) else {
            return Ok(bound);
        };
        let subst = TypeSubstitution::from_args(&shape.type_params, type_args);
        for (param, &arg) in shape.type_params.iter().zip(type_args) {
            let Some(declared) = param.bound else {
                continue;
            };
            let limit = instantiate_type_with_env(&self.interner, self, declared, &subst)?;
            if !self.is_subtype(arg, limit) {
                let reason = self.explain_subtype_failure(arg, limit);
                return Err(TypeError {
                    actual: self.render(arg),
                    expected: self.render(limit),
                    reason,
                    detail: Some(format!(
                        "type argument for '{}' does not satisfy its bound",
                        self.interner.resolve_atom(param.name)
                    )),
                }
                .into());
            }
        }
        Ok(bound)
    }

    /// Attach type arguments to a generic function value (`dart.gbind`).
    ///
    /// The result is a non-generic function whose body sees the bound
    /// arguments as `args.type_args`.
    pub fn gbind(&self, f: &Value, type_args: &[TypeId]) -> Result<Value, RuntimeError> {
        let bound = self.bind_checked(self.runtime_type(f), type_args)?;
        let Value::Function(func) = f else {
            // Only function values have generic function types.
            return Ok(f.clone());
        };
        trace!(
            from = func.type_id.0,
            to = bound.0,
            args = type_args.len(),
            "gbind"
        );
        let body = func.body.clone();
        let bound_args = type_args.to_vec();
        let wrapped: FunctionBody = Rc::new(move |rt: &Runtime, args: &Args| {
            let mut args = args.clone();
            args.type_args = bound_args.clone();
            body(rt, &args)
        });
        Ok(self.make_function(func.name.clone(), bound, wrapped))
    }
}

#[cfg(test)]
#[path = "../tests/function_tests.rs"]
mod tests;
