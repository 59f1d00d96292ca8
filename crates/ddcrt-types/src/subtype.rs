//! Subtype checking.
//!
//! Rules, in order:
//! - `dynamic` is compatible with everything in both directions
//! - everything is a subtype of `void` and `Object`; `bottom` and `Null` are
//!   subtypes of everything
//! - classes are nominal: the source hierarchy (superclass chain, applied
//!   mixins, implemented interfaces) must contain the target's class, and for
//!   generic targets the type arguments the source passes up its hierarchy
//!   must match the target's arguments under the configured variance
//! - functions have covariant returns (anything returns into `void`) and
//!   contravariant parameters; optional positional and named parameters never
//!   substitute for each other
//! - function types are subtypes of `Function`; callable classes are
//!   subtypes of function types matching their `call` method
//!
//! Recursive comparisons are coinductive: re-entering a pair that is already
//! being compared assumes it holds.

use crate::diagnostics::{DiagnosticTracer, FastTracer, SubtypeFailureReason, SubtypeTracer};
use crate::environment::TypeEnvironment;
use crate::instantiate::{TypeSubstitution, instantiate_signature, instantiate_type};
use crate::intern::TypeInterner;
use crate::recursion::{RecursionGuard, RecursionResult};
use crate::types::{ClassId, FunctionShape, GenericId, TypeData, TypeId, TypeListId};
use ddcrt_common::Atom;
use ddcrt_common::limits::{MAX_SUBTYPE_DEPTH, MAX_SUBTYPE_ITERATIONS};
use serde::{Deserialize, Serialize};
use tracing::trace;

/// How type arguments of the same generic declaration are compared.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GenericVariance {
    /// `C<int>` and `C<num>` are unrelated. `dynamic` arguments still match
    /// anything.
    #[default]
    Invariant,
    /// `C<int>` is a subtype of `C<num>`.
    Covariant,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SubtypeOptions {
    pub variance: GenericVariance,
    /// Let surplus required positional parameters of the source fill the
    /// target's optional positional slots.
    pub required_fills_optional: bool,
    pub max_depth: u32,
}

impl Default for SubtypeOptions {
    fn default() -> Self {
        Self {
            variance: GenericVariance::Invariant,
            required_fills_optional: true,
            max_depth: MAX_SUBTYPE_DEPTH,
        }
    }
}

pub struct SubtypeChecker<'a, T: SubtypeTracer = FastTracer> {
    interner: &'a TypeInterner,
    env: Option<&'a dyn TypeEnvironment>,
    options: SubtypeOptions,
    guard: RecursionGuard<(TypeId, TypeId)>,
    /// Bounds of the generic function type parameters currently in scope.
    type_param_bounds: Vec<(Atom, Option<TypeId>)>,
    tracer: T,
}

impl<'a> SubtypeChecker<'a, FastTracer> {
    pub fn new(interner: &'a TypeInterner) -> Self {
        Self::with_tracer(interner, FastTracer)
    }
}

impl<'a, T: SubtypeTracer> SubtypeChecker<'a, T> {
    pub fn with_tracer(interner: &'a TypeInterner, tracer: T) -> Self {
        let options = SubtypeOptions::default();
        Self {
            interner,
            env: None,
            options,
            guard: RecursionGuard::new(options.max_depth, MAX_SUBTYPE_ITERATIONS),
            type_param_bounds: Vec::new(),
            tracer,
        }
    }

    pub fn with_env(mut self, env: &'a dyn TypeEnvironment) -> Self {
        self.env = Some(env);
        self
    }

    pub fn with_options(mut self, options: SubtypeOptions) -> Self {
        self.options = options;
        self.guard = RecursionGuard::new(options.max_depth, MAX_SUBTYPE_ITERATIONS);
        self
    }

    pub fn tracer(&self) -> &T {
        &self.tracer
    }

    pub fn into_tracer(self) -> T {
        self.tracer
    }

    pub fn is_subtype_of(&mut self, source: TypeId, target: TypeId) -> bool {
        let result = self.check(source, target);
        trace!(source = source.0, target = target.0, result, "is_subtype_of");
        result
    }

    #[inline]
    fn mismatch(&mut self, reason: impl FnOnce() -> SubtypeFailureReason) -> bool {
        self.tracer.on_mismatch(reason);
        false
    }

    fn check(&mut self, source: TypeId, target: TypeId) -> bool {
        if source == target {
            return true;
        }
        let source = self.interner.unwrap_typedef(source);
        let target = self.interner.unwrap_typedef(target);
        if source == target
            || source.is_dynamic()
            || target.is_dynamic()
            || target.is_void()
            || source == TypeId::BOTTOM
        {
            return true;
        }

        let source_data = self.interner.data(source);
        let target_data = self.interner.data(target);
        if let Some(core) = self.interner.defs.core() {
            if target_data == TypeData::Class(core.object) {
                return true;
            }
            if source_data == TypeData::Class(core.null) && target != TypeId::BOTTOM {
                return true;
            }
        }

        match self.guard.enter((source, target)) {
            RecursionResult::Entered => {}
            RecursionResult::Cycle => return true,
            RecursionResult::DepthExceeded | RecursionResult::IterationExceeded => {
                return self.mismatch(|| SubtypeFailureReason::RecursionLimitExceeded);
            }
        }
        let result = self.check_structural(source, target, source_data, target_data);
        self.guard.leave((source, target));
        result
    }

    fn check_structural(
        &mut self,
        source: TypeId,
        target: TypeId,
        source_data: TypeData,
        target_data: TypeData,
    ) -> bool {
        match (source_data, target_data) {
            (TypeData::Class(s_class), TypeData::Class(t_class)) => {
                self.check_class(source, target, s_class, t_class)
            }
            (TypeData::Function(s_shape), TypeData::Function(t_shape)) => {
                let s_shape = self.interner.function_shape(s_shape);
                let t_shape = self.interner.function_shape(t_shape);
                self.check_function(&s_shape, &t_shape)
            }
            (TypeData::Function(_), TypeData::Class(t_class)) => {
                let is_function_class = self
                    .interner
                    .defs
                    .core()
                    .is_some_and(|core| core.function == t_class);
                is_function_class
                    || self.mismatch(|| SubtypeFailureReason::NotASubclass {
                        source_type: source,
                        target_type: target,
                    })
            }
            (TypeData::Class(s_class), TypeData::Function(_)) => {
                match self.env.and_then(|env| env.call_signature(s_class)) {
                    Some(call) => self.check(call, target),
                    None => self.mismatch(|| SubtypeFailureReason::TypeMismatch {
                        source_type: source,
                        target_type: target,
                    }),
                }
            }
            (TypeData::TypeParameter(name), _) => match self.bound_of(name) {
                Some(bound) => self.check(bound, target),
                None => self.mismatch(|| SubtypeFailureReason::TypeMismatch {
                    source_type: source,
                    target_type: target,
                }),
            },
            (
                TypeData::Application { generic, args },
                TypeData::Application {
                    generic: t_generic,
                    args: t_args,
                },
            ) if generic == t_generic => {
                let s_args = self.interner.type_list_items(args);
                let t_args = self.interner.type_list_items(t_args);
                self.check_type_args(&s_args, &t_args)
            }
            (TypeData::Class(s_class), TypeData::Application { generic, args }) => {
                let t_args = self.interner.type_list_items(args);
                let supers = self.interner.defs.supertypes(s_class);
                self.check_generic_supertypes(source, target, &supers, generic, &t_args)
            }
            (TypeData::Application { generic, args }, _) => {
                match self.erase_application(generic, args) {
                    Some(erased) => self.check(erased, target),
                    None => self.mismatch(|| SubtypeFailureReason::TypeMismatch {
                        source_type: source,
                        target_type: target,
                    }),
                }
            }
            _ => self.mismatch(|| SubtypeFailureReason::TypeMismatch {
                source_type: source,
                target_type: target,
            }),
        }
    }

    fn check_class(
        &mut self,
        source: TypeId,
        target: TypeId,
        s_class: ClassId,
        t_class: ClassId,
    ) -> bool {
        if s_class == t_class {
            return true;
        }
        let Some(t_def) = self.interner.defs.class(t_class) else {
            return self.mismatch(|| SubtypeFailureReason::TypeMismatch {
                source_type: source,
                target_type: target,
            });
        };
        if let Some(core) = self.interner.defs.core()
            && core.function == t_class
            && self
                .env
                .and_then(|env| env.call_signature(s_class))
                .is_some()
        {
            return true;
        }

        let supers = self.interner.defs.supertypes(s_class);
        match t_def.origin {
            None => {
                supers.contains(&t_class)
                    || self.mismatch(|| SubtypeFailureReason::NotASubclass {
                        source_type: source,
                        target_type: target,
                    })
            }
            Some(origin) => {
                let t_args = self.interner.type_list_items(t_def.type_args);
                self.check_generic_supertypes(source, target, &supers, origin, &t_args)
            }
        }
    }

    /// Find the instantiations of `origin` in the source hierarchy and compare
    /// their arguments with the target's.
    fn check_generic_supertypes(
        &mut self,
        source: TypeId,
        target: TypeId,
        supers: &[ClassId],
        origin: GenericId,
        t_args: &[TypeId],
    ) -> bool {
        let mut found = false;
        for &candidate in supers {
            let Some(def) = self.interner.defs.class(candidate) else {
                continue;
            };
            if def.origin != Some(origin) {
                continue;
            }
            found = true;
            let s_args = self.interner.type_list_items(def.type_args);
            if self.check_type_args(&s_args, t_args) {
                self.tracer.discard();
                return true;
            }
        }
        if found {
            // The failing argument comparison has been recorded already.
            return false;
        }
        self.mismatch(|| SubtypeFailureReason::NotASubclass {
            source_type: source,
            target_type: target,
        })
    }

    fn check_type_args(&mut self, s_args: &[TypeId], t_args: &[TypeId]) -> bool {
        if s_args.len() != t_args.len() {
            return self.mismatch(|| SubtypeFailureReason::TypeParameterCountMismatch {
                source_count: s_args.len(),
                target_count: t_args.len(),
            });
        }
        for (index, (&source_arg, &target_arg)) in s_args.iter().zip(t_args).enumerate() {
            let related = match self.options.variance {
                GenericVariance::Covariant => self.check(source_arg, target_arg),
                GenericVariance::Invariant => {
                    self.check(source_arg, target_arg) && self.check(target_arg, source_arg)
                }
            };
            if !related {
                return self.mismatch(|| SubtypeFailureReason::TypeArgumentMismatch {
                    index,
                    source_arg,
                    target_arg,
                    nested_reason: None,
                });
            }
        }
        true
    }

    fn check_function(&mut self, source: &FunctionShape, target: &FunctionShape) -> bool {
        if source.type_params.len() != target.type_params.len() {
            return self.mismatch(|| SubtypeFailureReason::TypeParameterCountMismatch {
                source_count: source.type_params.len(),
                target_count: target.type_params.len(),
            });
        }
        if !source.is_generic() {
            return self.check_signature(source, target);
        }

        // Rename the target's type parameters to the source's.
        let mut subst = TypeSubstitution::new();
        for (s_param, t_param) in source.type_params.iter().zip(&target.type_params) {
            subst.insert(t_param.name, self.interner.type_param(s_param.name));
        }
        for (index, (s_param, t_param)) in source
            .type_params
            .iter()
            .zip(&target.type_params)
            .enumerate()
        {
            let source_bound = s_param.bound.unwrap_or(TypeId::DYNAMIC);
            let target_bound = t_param
                .bound
                .map_or(TypeId::DYNAMIC, |b| instantiate_type(self.interner, b, &subst));
            if !self.check(target_bound, source_bound) {
                return self.mismatch(|| SubtypeFailureReason::TypeParameterBoundMismatch {
                    index,
                    source_bound,
                    target_bound,
                });
            }
        }

        let renamed_target = instantiate_signature(self.interner, target, &subst);
        let plain_source = FunctionShape {
            type_params: Vec::new(),
            ..source.clone()
        };
        let mark = self.type_param_bounds.len();
        self.type_param_bounds
            .extend(source.type_params.iter().map(|p| (p.name, p.bound)));
        let result = self.check_signature(&plain_source, &renamed_target);
        self.type_param_bounds.truncate(mark);
        result
    }

    fn check_signature(&mut self, source: &FunctionShape, target: &FunctionShape) -> bool {
        // Optional positional and named parameters never stand in for each other.
        if !target.optional.is_empty() && !source.named.is_empty() {
            return self.mismatch(|| SubtypeFailureReason::ParameterKindMismatch {
                source_named: true,
            });
        }
        if !target.named.is_empty() && !source.optional.is_empty() {
            return self.mismatch(|| SubtypeFailureReason::ParameterKindMismatch {
                source_named: false,
            });
        }

        let target_return = self.interner.unwrap_typedef(target.return_type);
        if !target_return.is_void() && !self.check(source.return_type, target.return_type) {
            return self.mismatch(|| SubtypeFailureReason::ReturnTypeMismatch {
                source_return: source.return_type,
                target_return: target.return_type,
                nested_reason: None,
            });
        }

        let required_limit = if self.options.required_fills_optional {
            target.positional_count()
        } else {
            target.required.len()
        };
        if source.required.len() > required_limit {
            return self.mismatch(|| SubtypeFailureReason::TooManyRequired {
                source_count: source.required.len(),
                target_count: required_limit,
            });
        }

        let target_total = target.positional_count();
        if source.positional_count() < target_total {
            return self.mismatch(|| SubtypeFailureReason::TooFewOptionalParameters {
                source_count: source.positional_count(),
                target_count: target_total,
            });
        }

        for param_index in 0..target_total {
            let (Some(source_param), Some(target_param)) =
                (source.positional(param_index), target.positional(param_index))
            else {
                break;
            };
            if !self.check(target_param, source_param) {
                return self.mismatch(|| SubtypeFailureReason::ParameterTypeMismatch {
                    param_index,
                    source_param,
                    target_param,
                    nested_reason: None,
                });
            }
        }

        for named in &target.named {
            let Some(source_param) = source.named_param(named.name) else {
                let name = named.name;
                return self.mismatch(|| SubtypeFailureReason::MissingNamedParameter { name });
            };
            if !self.check(named.type_id, source_param) {
                let name = named.name;
                let target_param = named.type_id;
                return self.mismatch(|| SubtypeFailureReason::NamedParameterTypeMismatch {
                    name,
                    source_param,
                    target_param,
                    nested_reason: None,
                });
            }
        }

        true
    }

    fn bound_of(&self, name: Atom) -> Option<TypeId> {
        self.type_param_bounds
            .iter()
            .rev()
            .find(|(param, _)| *param == name)
            .and_then(|(_, bound)| *bound)
    }

    /// Instantiate an open application with its type variables read as
    /// `dynamic`, so it can be compared nominally.
    fn erase_application(&self, generic: GenericId, args: TypeListId) -> Option<TypeId> {
        let env = self.env?;
        let erased: Vec<TypeId> = self
            .interner
            .type_list_items(args)
            .iter()
            .map(|&arg| {
                if self.interner.contains_type_params(arg) {
                    TypeId::DYNAMIC
                } else {
                    arg
                }
            })
            .collect();
        env.instantiate_generic(generic, &erased).ok()
    }
}

impl<'a> SubtypeChecker<'a, DiagnosticTracer> {
    pub fn with_diagnostics(interner: &'a TypeInterner) -> Self {
        Self::with_tracer(interner, DiagnosticTracer::new())
    }

    /// Explain why `source` is not a subtype of `target`.
    ///
    /// Returns `None` if the types are actually related.
    pub fn explain_failure(
        &mut self,
        source: TypeId,
        target: TypeId,
    ) -> Option<SubtypeFailureReason> {
        if self.check(source, target) {
            self.tracer.discard();
            return None;
        }
        Some(
            self.tracer
                .take_failure()
                .unwrap_or(SubtypeFailureReason::TypeMismatch {
                    source_type: source,
                    target_type: target,
                }),
        )
    }
}

#[cfg(test)]
#[path = "../tests/subtype_tests.rs"]
mod tests;
