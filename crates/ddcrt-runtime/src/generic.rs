//! Generic class factory.
//!
//! `generic(name, params, builder)` declares a parameterized class; each
//! distinct canonical argument tuple runs the builder exactly once and the
//! resulting class is cached under its [`TypeKey`]. A builder that
//! synchronously asks for its own key again gets a `CyclicInstantiation`
//! error instead of a half-built class.

use crate::cache::{BuildConflict, TypeKey};
use crate::class::ClassBuilder;
use crate::runtime::{NamedType, Runtime};
use ddcrt_common::limits::MAX_INSTANTIATION_DEPTH;
use ddcrt_types::{
    ConfigurationError, GenericId, GenericInfo, GenericKind, TypeArgs, TypeFormatter, TypeId,
    TypeListId, TypeParamInfo, TypedefDef,
};
use std::rc::Rc;
use std::sync::Arc;
use tracing::{debug, trace};

/// Configures the class for one instantiation. Receives a builder already
/// carrying the generic's name, origin and arguments.
pub type ClassBuildFn =
    Rc<dyn Fn(&Runtime, ClassBuilder, &[TypeId]) -> Result<ClassBuilder, ConfigurationError>>;

/// Produces the underlying type of one typedef instantiation.
pub type TypedefBuildFn = Rc<dyn Fn(&Runtime, &[TypeId]) -> Result<TypeId, ConfigurationError>>;

#[derive(Clone)]
pub(crate) enum GenericBuilder {
    Class(ClassBuildFn),
    Typedef(TypedefBuildFn),
}

impl Runtime {
    /// Declare a generic class (`C$ = generic((T) => class C ...)`).
    pub fn generic<F>(&self, name: &str, type_params: &[&str], build: F) -> GenericId
    where
        F: Fn(&Runtime, ClassBuilder, &[TypeId]) -> Result<ClassBuilder, ConfigurationError>
            + 'static,
    {
        self.declare_generic(
            name,
            type_params,
            GenericKind::Class,
            GenericBuilder::Class(Rc::new(build)),
        )
    }

    /// Declare a generic typedef (`typedef F<T> = (T) => T`).
    pub fn generic_typedef<F>(&self, name: &str, type_params: &[&str], build: F) -> GenericId
    where
        F: Fn(&Runtime, &[TypeId]) -> Result<TypeId, ConfigurationError> + 'static,
    {
        self.declare_generic(
            name,
            type_params,
            GenericKind::Typedef,
            GenericBuilder::Typedef(Rc::new(build)),
        )
    }

    fn declare_generic(
        &self,
        name: &str,
        type_params: &[&str],
        kind: GenericKind,
        builder: GenericBuilder,
    ) -> GenericId {
        let info = GenericInfo {
            name: self.interner.intern_string(name),
            type_params: type_params
                .iter()
                .map(|p| TypeParamInfo::new(self.interner.intern_string(p)))
                .collect(),
            kind,
        };
        let id = self.interner.defs.register_generic(info);
        self.builders.borrow_mut().insert(id, builder);
        self.register_name(name, NamedType::Generic(id));
        debug!(name, arity = type_params.len(), ?kind, "declare_generic");
        id
    }

    /// Declare a non-generic typedef.
    pub fn typedef(&self, name: &str, underlying: TypeId) -> TypeId {
        let id = self.interner.defs.register_typedef(TypedefDef {
            name: self.interner.intern_string(name),
            origin: None,
            type_args: TypeListId::EMPTY,
            underlying,
        });
        let ty = self.interner.typedef_type(id);
        self.register_name(name, NamedType::Type(ty));
        ty
    }

    pub fn generic_arity(&self, generic: GenericId) -> Option<usize> {
        self.interner
            .defs
            .generic(generic)
            .map(|info| info.type_params.len())
    }

    fn generic_info(&self, generic: GenericId) -> Result<Arc<GenericInfo>, ConfigurationError> {
        self.interner
            .defs
            .generic(generic)
            .ok_or_else(|| ConfigurationError::UnknownType {
                name: format!("generic #{}", generic.0),
            })
    }

    pub(crate) fn check_arity(
        &self,
        generic: GenericId,
        actual: usize,
    ) -> Result<Arc<GenericInfo>, ConfigurationError> {
        let info = self.generic_info(generic)?;
        if info.type_params.len() != actual {
            return Err(ConfigurationError::ArityMismatch {
                generic: self.interner.resolve_atom(info.name).to_string(),
                expected: info.type_params.len(),
                actual,
            });
        }
        Ok(info)
    }

    /// Instantiate (`C$(int)`), building on first request.
    ///
    /// An empty argument list is the raw type: every parameter becomes
    /// `dynamic`. Any other count must match the declaration. Arguments that
    /// still mention type variables produce an open application instead of a
    /// class.
    pub fn instantiate(
        &self,
        generic: GenericId,
        args: &[TypeId],
    ) -> Result<TypeId, ConfigurationError> {
        let info = self.generic_info(generic)?;
        let arity = info.type_params.len();
        let args: TypeArgs = if args.is_empty() {
            std::iter::repeat_n(TypeId::DYNAMIC, arity).collect()
        } else {
            self.check_arity(generic, args.len())?;
            args.iter().map(|&a| self.interner.canonicalize(a)).collect()
        };
        if args.iter().any(|&a| self.interner.contains_type_params(a)) {
            return Ok(self.interner.application(generic, args.to_vec()));
        }

        let key = TypeKey {
            generic,
            args: self.interner.type_list(args.to_vec()),
        };
        if let Some(ty) = self.cache.get(&key) {
            trace!(generic = generic.0, ty = ty.0, "instantiate: cache hit");
            return Ok(ty);
        }

        let name = self.interner.resolve_atom(info.name);
        let _scope = self.cache.begin_build(key).map_err(|conflict| match conflict {
            BuildConflict::Cycle => ConfigurationError::CyclicInstantiation {
                generic: name.to_string(),
                args: TypeFormatter::new(&self.interner).format_list(&args),
            },
            BuildConflict::TooDeep => ConfigurationError::InstantiationTooDeep {
                generic: name.to_string(),
                depth: MAX_INSTANTIATION_DEPTH,
            },
        })?;

        let builder = self.builders.borrow().get(&generic).cloned();
        let ty = match builder {
            Some(GenericBuilder::Class(build)) => {
                let origin = Some((generic, key.args));
                let reserved = ClassBuilder::reserved(self, &name, origin);
                let reserved_id = reserved.id;
                let built = build(self, reserved, &args)
                    .and_then(|class| self.define_class(class.with_origin(generic, key.args)));
                let built_id = built.as_ref().ok().and_then(|&ty| self.interner.as_class(ty));
                if built_id != Some(reserved_id) {
                    self.interner.defs.abandon_class(reserved_id);
                }
                built?
            }
            Some(GenericBuilder::Typedef(build)) => {
                let underlying = build(self, &args)?;
                let id = self.interner.defs.register_typedef(TypedefDef {
                    name: info.name,
                    origin: Some(generic),
                    type_args: key.args,
                    underlying,
                });
                self.interner.typedef_type(id)
            }
            None => {
                return Err(ConfigurationError::UnknownType {
                    name: name.to_string(),
                });
            }
        };

        self.cache.insert(key, ty);
        if self.options.trace_instantiations {
            debug!(
                generic = %name,
                args = %TypeFormatter::new(&self.interner).format_list(&args),
                ty = ty.0,
                "instantiate: built"
            );
        }
        Ok(ty)
    }

    /// The raw type of a generic: every parameter `dynamic`.
    pub fn raw(&self, generic: GenericId) -> Result<TypeId, ConfigurationError> {
        self.instantiate(generic, &[])
    }

    /// An instantiation that has already been built, without building it.
    pub fn cached_instantiation(&self, generic: GenericId, args: &[TypeId]) -> Option<TypeId> {
        let args: Vec<TypeId> = args.iter().map(|&a| self.interner.canonicalize(a)).collect();
        self.cache.peek(&TypeKey {
            generic,
            args: self.interner.type_list(args),
        })
    }
}

#[cfg(test)]
#[path = "../tests/generic_tests.rs"]
mod tests;
