//! The runtime service.
//!
//! One `Runtime` owns every registry the generated code talks to: the type
//! interner and definition store, the generic builders and their
//! instantiation cache, per-class member tables and signatures, and the name
//! table used to parse type expressions. It is created once at startup and
//! threaded through every call; nothing is global.
//!
//! Execution is single-threaded and cooperative. Tables use `RefCell`, and no
//! borrow is held across a call into user code (builders, thunks, member
//! bodies), since those may re-enter the runtime.

use crate::cache::{CacheStats, InstantiationCache};
use crate::class::ClassInfo;
use crate::core::{self, CoreTypes};
use crate::generic::GenericBuilder;
use crate::options::RuntimeOptions;
use crate::value::Value;
use ddcrt_types::{
    ClassId, ConfigurationError, GenericId, ParseError, SubtypeChecker, SubtypeFailureReason,
    TypeEnvironment, TypeFormatter, TypeId, TypeInterner, TypeNameResolver, TypeParser,
    TypeSubstitution, instantiate_type_with_env,
};
use rustc_hash::FxHashMap;
use std::cell::RefCell;
use std::rc::Rc;
use tracing::trace;

/// What a source-level name denotes in type expressions.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) enum NamedType {
    /// A non-generic class or typedef.
    Type(TypeId),
    Generic(GenericId),
}

pub struct Runtime {
    pub(crate) interner: TypeInterner,
    pub(crate) options: RuntimeOptions,
    pub(crate) core: CoreTypes,
    pub(crate) cache: InstantiationCache,
    pub(crate) builders: RefCell<FxHashMap<GenericId, GenericBuilder>>,
    pub(crate) classes: RefCell<FxHashMap<ClassId, Rc<ClassInfo>>>,
    pub(crate) names: RefCell<FxHashMap<Rc<str>, NamedType>>,
}

impl Default for Runtime {
    fn default() -> Self {
        Self::new()
    }
}

impl Runtime {
    /// A runtime with the core library bootstrapped and default options.
    pub fn new() -> Self {
        Self::with_options(RuntimeOptions::default())
    }

    pub fn with_options(options: RuntimeOptions) -> Self {
        let mut rt = Runtime {
            interner: TypeInterner::new(),
            options,
            core: CoreTypes::UNSET,
            cache: InstantiationCache::new(),
            builders: RefCell::new(FxHashMap::default()),
            classes: RefCell::new(FxHashMap::default()),
            names: RefCell::new(FxHashMap::default()),
        };
        rt.core = core::bootstrap(&rt);
        rt
    }

    pub fn options(&self) -> &RuntimeOptions {
        &self.options
    }

    pub fn interner(&self) -> &TypeInterner {
        &self.interner
    }

    pub fn core(&self) -> &CoreTypes {
        &self.core
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    // =========================================================================
    // Types as values
    // =========================================================================

    /// The reified type object for `ty`. Canonical types are interned, so two
    /// calls with the same type yield identical values.
    pub fn wrap_type(&self, ty: TypeId) -> Value {
        Value::Type(ty)
    }

    /// Display string of a type (`List<int>`, `(bool, [String]) => int`).
    pub fn render(&self, ty: TypeId) -> String {
        TypeFormatter::new(&self.interner).format(ty)
    }

    /// Structural type equality (typedefs erased).
    pub fn types_equal(&self, a: TypeId, b: TypeId) -> bool {
        self.interner.types_equal(a, b)
    }

    // =========================================================================
    // Names
    // =========================================================================

    pub(crate) fn register_name(&self, name: &str, named: NamedType) {
        trace!(name, ?named, "register_name");
        self.names.borrow_mut().insert(Rc::from(name), named);
    }

    /// A non-generic class or typedef declared under `name`.
    pub fn lookup_type(&self, name: &str) -> Option<TypeId> {
        match self.names.borrow().get(name) {
            Some(NamedType::Type(ty)) => Some(*ty),
            _ => None,
        }
    }

    /// A generic class or typedef declared under `name`.
    pub fn lookup_generic(&self, name: &str) -> Option<GenericId> {
        match self.names.borrow().get(name) {
            Some(NamedType::Generic(g)) => Some(*g),
            _ => None,
        }
    }

    /// Parse a type expression against the declared names.
    pub fn parse_type(&self, src: &str) -> Result<TypeId, ConfigurationError> {
        TypeParser::new(&self.interner, self, src)
            .parse()
            .map_err(|e| parse_failure(src, e))
    }

    /// Parse a type expression in which the `bindings` names stand for the
    /// given types (`("E", int)` turns `(E) => void` into `(int) => void`).
    pub fn parse_type_with(
        &self,
        src: &str,
        bindings: &[(&str, TypeId)],
    ) -> Result<TypeId, ConfigurationError> {
        if bindings.is_empty() {
            return self.parse_type(src);
        }
        let names: Vec<_> = bindings
            .iter()
            .map(|(name, _)| self.interner.intern_string(name))
            .collect();
        let open = TypeParser::new(&self.interner, self, src)
            .with_type_params(&names)
            .parse()
            .map_err(|e| parse_failure(src, e))?;
        let mut subst = TypeSubstitution::new();
        for (&name, &(_, ty)) in names.iter().zip(bindings) {
            subst.insert(name, ty);
        }
        instantiate_type_with_env(&self.interner, self, open, &subst)
    }

    // =========================================================================
    // Subtyping
    // =========================================================================

    /// Type-level subtype test under the configured options.
    pub fn is_subtype(&self, source: TypeId, target: TypeId) -> bool {
        SubtypeChecker::new(&self.interner)
            .with_env(self)
            .with_options(self.options.subtype_options())
            .is_subtype_of(source, target)
    }

    /// The first mismatch that makes `source` not a subtype of `target`, or
    /// `None` if it is one.
    pub fn explain_subtype_failure(
        &self,
        source: TypeId,
        target: TypeId,
    ) -> Option<SubtypeFailureReason> {
        SubtypeChecker::with_diagnostics(&self.interner)
            .with_env(self)
            .with_options(self.options.subtype_options())
            .explain_failure(source, target)
    }

    // =========================================================================
    // Class table
    // =========================================================================

    pub(crate) fn class_info(&self, id: ClassId) -> Option<Rc<ClassInfo>> {
        self.classes.borrow().get(&id).cloned()
    }

    /// The class behind a class type, or `NotAClass`.
    pub(crate) fn class_of_type(&self, ty: TypeId) -> Result<ClassId, ConfigurationError> {
        match self.interner.as_class(ty) {
            Some(id) if self.classes.borrow().contains_key(&id) => Ok(id),
            _ => Err(ConfigurationError::NotAClass {
                name: self.render(ty),
            }),
        }
    }
}

fn parse_failure(src: &str, err: ParseError) -> ConfigurationError {
    match err {
        ParseError::Syntax { offset, message } => ConfigurationError::InvalidTypeExpression {
            expression: src.to_string(),
            message: format!("{message} at offset {offset}"),
        },
        ParseError::Resolve(err) => err,
    }
}

impl TypeEnvironment for Runtime {
    fn instantiate_generic(
        &self,
        generic: GenericId,
        args: &[TypeId],
    ) -> Result<TypeId, ConfigurationError> {
        self.instantiate(generic, args)
    }

    fn call_signature(&self, class: ClassId) -> Option<TypeId> {
        self.lookup_member_type(class, "call", crate::signature::MemberKind::Method)
            .ok()
            .flatten()
    }
}

impl TypeNameResolver for Runtime {
    fn resolve_type_name(&self, name: &str, args: &[TypeId]) -> Result<TypeId, ConfigurationError> {
        let named = self.names.borrow().get(name).copied();
        match named {
            None => Err(ConfigurationError::UnknownType {
                name: name.to_string(),
            }),
            Some(NamedType::Type(ty)) => {
                if args.is_empty() {
                    Ok(ty)
                } else {
                    Err(ConfigurationError::ArityMismatch {
                        generic: name.to_string(),
                        expected: 0,
                        actual: args.len(),
                    })
                }
            }
            Some(NamedType::Generic(generic)) => {
                if args.iter().any(|&a| self.interner.contains_type_params(a)) {
                    self.check_arity(generic, args.len())?;
                    return Ok(self.interner.application(generic, args.to_vec()));
                }
                self.instantiate(generic, args)
            }
        }
    }
}

#[cfg(test)]
#[path = "../tests/runtime_tests.rs"]
mod tests;
