//! Type parameter substitution.
//!
//! Substitution walks a type and replaces free type variables. Function
//! types that declare their own type parameters shadow outer bindings of the
//! same name. With a [`TypeEnvironment`], generic applications whose
//! arguments become fully concrete are instantiated through the generic
//! cache, so `List<T>` with `T = int` yields the same `TypeId` as a direct
//! `List<int>` instantiation.

use crate::environment::TypeEnvironment;
use crate::errors::ConfigurationError;
use crate::format::TypeFormatter;
use crate::intern::TypeInterner;
use crate::recursion::{DepthCounter, RecursionProfile};
use crate::types::{FunctionShape, NamedParam, TypeData, TypeId, TypeParamInfo};
use ddcrt_common::Atom;
use rustc_hash::FxHashMap;
use tracing::trace;

/// A mapping from type variable names to types.
#[derive(Clone, Debug, Default)]
pub struct TypeSubstitution {
    map: FxHashMap<Atom, TypeId>,
}

impl TypeSubstitution {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pair declared parameters with arguments. Missing arguments map to `dynamic`.
    pub fn from_args(params: &[TypeParamInfo], args: &[TypeId]) -> Self {
        let map = params
            .iter()
            .enumerate()
            .map(|(i, p)| (p.name, args.get(i).copied().unwrap_or(TypeId::DYNAMIC)))
            .collect();
        Self { map }
    }

    pub fn insert(&mut self, name: Atom, type_id: TypeId) {
        self.map.insert(name, type_id);
    }

    pub fn get(&self, name: Atom) -> Option<TypeId> {
        self.map.get(&name).copied()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }
}

struct TypeInstantiator<'a> {
    interner: &'a TypeInterner,
    env: Option<&'a dyn TypeEnvironment>,
    subst: &'a TypeSubstitution,
    shadowed: Vec<Atom>,
    depth: DepthCounter,
}

impl<'a> TypeInstantiator<'a> {
    fn new(
        interner: &'a TypeInterner,
        env: Option<&'a dyn TypeEnvironment>,
        subst: &'a TypeSubstitution,
    ) -> Self {
        Self {
            interner,
            env,
            subst,
            shadowed: Vec::new(),
            depth: DepthCounter::with_profile(RecursionProfile::SubtypeCheck),
        }
    }

    fn instantiate(&mut self, id: TypeId) -> Result<TypeId, ConfigurationError> {
        if id.is_intrinsic() {
            return Ok(id);
        }
        if !self.depth.enter() {
            trace!(type_id = id.0, "instantiate: depth limit reached, leaving type as is");
            return Ok(id);
        }
        let result = self.instantiate_inner(id);
        self.depth.leave();
        result
    }

    fn instantiate_inner(&mut self, id: TypeId) -> Result<TypeId, ConfigurationError> {
        match self.interner.data(id) {
            TypeData::TypeParameter(name) => {
                if self.shadowed.contains(&name) {
                    return Ok(id);
                }
                Ok(self.subst.get(name).unwrap_or(id))
            }
            TypeData::Application { generic, args } => {
                let items = self.interner.type_list_items(args);
                let mut new_args = Vec::with_capacity(items.len());
                for &arg in items.iter() {
                    new_args.push(self.instantiate(arg)?);
                }
                let concrete = !new_args
                    .iter()
                    .any(|&arg| self.interner.contains_type_params(arg));
                match self.env {
                    Some(env) if concrete => env.instantiate_generic(generic, &new_args),
                    _ if new_args.as_slice() == &*items => Ok(id),
                    _ => Ok(self.interner.application(generic, new_args)),
                }
            }
            TypeData::Function(shape_id) => {
                let shape = self.interner.function_shape(shape_id);
                let mark = self.shadowed.len();
                self.shadowed.extend(shape.type_params.iter().map(|p| p.name));
                let result = self.instantiate_shape(&shape, shape.type_params.clone());
                self.shadowed.truncate(mark);
                Ok(self.interner.function(result?))
            }
            TypeData::Dynamic
            | TypeData::Void
            | TypeData::Bottom
            | TypeData::Class(_)
            | TypeData::Typedef(_) => Ok(id),
        }
    }

    fn instantiate_shape(
        &mut self,
        shape: &FunctionShape,
        type_params: Vec<TypeParamInfo>,
    ) -> Result<FunctionShape, ConfigurationError> {
        let mut params = Vec::with_capacity(type_params.len());
        for p in type_params {
            let bound = match p.bound {
                Some(bound) => Some(self.instantiate(bound)?),
                None => None,
            };
            params.push(TypeParamInfo { name: p.name, bound });
        }
        let return_type = self.instantiate(shape.return_type)?;
        let required = self.instantiate_all(&shape.required)?;
        let optional = self.instantiate_all(&shape.optional)?;
        let mut named = Vec::with_capacity(shape.named.len());
        for p in &shape.named {
            named.push(NamedParam {
                name: p.name,
                type_id: self.instantiate(p.type_id)?,
            });
        }
        Ok(FunctionShape {
            type_params: params,
            return_type,
            required,
            optional,
            named,
        })
    }

    fn instantiate_all(&mut self, ids: &[TypeId]) -> Result<Vec<TypeId>, ConfigurationError> {
        let mut out = Vec::with_capacity(ids.len());
        for &id in ids {
            out.push(self.instantiate(id)?);
        }
        Ok(out)
    }
}

/// Substitute type variables without touching the generic cache.
///
/// Applications stay applications even when their arguments become concrete.
/// Used when renaming the type parameters of generic function types.
pub fn instantiate_type(interner: &TypeInterner, id: TypeId, subst: &TypeSubstitution) -> TypeId {
    if subst.is_empty() {
        return id;
    }
    let mut inst = TypeInstantiator::new(interner, None, subst);
    // Without an environment nothing can fail.
    inst.instantiate(id).unwrap_or(id)
}

/// Substitute into a signature's parameters and return type.
///
/// The signature's own type parameter list is dropped, so its parameters are
/// substituted rather than shadowed. Used to rename one generic function
/// type's parameters to another's before comparing them.
pub fn instantiate_signature(
    interner: &TypeInterner,
    shape: &FunctionShape,
    subst: &TypeSubstitution,
) -> FunctionShape {
    let mut inst = TypeInstantiator::new(interner, None, subst);
    match inst.instantiate_shape(shape, Vec::new()) {
        Ok(shape) => shape,
        Err(_) => FunctionShape {
            type_params: Vec::new(),
            ..shape.clone()
        },
    }
}

/// Substitute type variables and instantiate applications that become concrete.
pub fn instantiate_type_with_env(
    interner: &TypeInterner,
    env: &dyn TypeEnvironment,
    id: TypeId,
    subst: &TypeSubstitution,
) -> Result<TypeId, ConfigurationError> {
    let mut inst = TypeInstantiator::new(interner, Some(env), subst);
    inst.instantiate(id)
}

/// Bind the type parameters of a generic function type.
///
/// `<T>(T) => List<T>` bound to `[int]` yields `(int) => List<int>`. Bounds
/// are not checked here since that needs the subtype relation.
pub fn bind_type_params(
    interner: &TypeInterner,
    env: &dyn TypeEnvironment,
    fn_type: TypeId,
    args: &[TypeId],
) -> Result<TypeId, ConfigurationError> {
    let Some(shape) = interner.as_function(fn_type) else {
        return Err(ConfigurationError::ArityMismatch {
            generic: TypeFormatter::new(interner).format(fn_type),
            expected: 0,
            actual: args.len(),
        });
    };
    if shape.type_params.len() != args.len() {
        return Err(ConfigurationError::ArityMismatch {
            generic: TypeFormatter::new(interner).format(fn_type),
            expected: shape.type_params.len(),
            actual: args.len(),
        });
    }
    let subst = TypeSubstitution::from_args(&shape.type_params, args);
    let mut inst = TypeInstantiator::new(interner, Some(env), &subst);
    let bound = inst.instantiate_shape(&shape, Vec::new())?;
    Ok(interner.function(bound))
}

#[cfg(test)]
#[path = "../tests/instantiate_tests.rs"]
mod tests;
