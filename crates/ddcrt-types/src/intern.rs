//! Type interning for canonical identity.
//!
//! This module implements the interning engine that converts `TypeData`
//! structures into lightweight `TypeId` handles.
//!
//! Benefits:
//! - O(1) type identity (`wrap_type(C) == wrap_type(C)` is an integer compare)
//! - Each unique structure stored once
//! - Type argument tuples interned too, so cache keys are small and hashable
//!
//! The runtime is single-threaded and cooperative, so tables use `RefCell`.
//! No borrow is held across a call that can re-enter the interner.

use crate::def::DefinitionStore;
use crate::errors::ConfigurationError;
use crate::types::*;
use ddcrt_common::{Atom, Interner};
use rustc_hash::FxHashMap;
use std::cell::RefCell;
use std::hash::Hash;
use std::sync::Arc;
use tracing::warn;

struct SliceInterner<T> {
    items: Vec<Arc<[T]>>,
    map: FxHashMap<Arc<[T]>, u32>,
}

impl<T> SliceInterner<T>
where
    T: Eq + Hash,
{
    fn new() -> Self {
        let empty: Arc<[T]> = Arc::from(Vec::new());
        let mut map = FxHashMap::default();
        map.insert(empty.clone(), 0);
        SliceInterner {
            items: vec![empty],
            map,
        }
    }

    fn intern(&mut self, items: Vec<T>) -> u32 {
        if items.is_empty() {
            return 0;
        }

        if let Some(&id) = self.map.get(items.as_slice()) {
            return id;
        }

        let arc: Arc<[T]> = items.into();
        let id = self.items.len() as u32;
        self.items.push(arc.clone());
        self.map.insert(arc, id);
        id
    }

    fn get(&self, id: u32) -> Option<Arc<[T]>> {
        self.items.get(id as usize).cloned()
    }

    fn empty(&self) -> Arc<[T]> {
        self.items[0].clone()
    }
}

struct ValueInterner<T> {
    items: Vec<Arc<T>>,
    map: FxHashMap<Arc<T>, u32>,
}

impl<T> ValueInterner<T>
where
    T: Eq + Hash,
{
    fn new() -> Self {
        ValueInterner {
            items: Vec::new(),
            map: FxHashMap::default(),
        }
    }

    fn intern(&mut self, value: T) -> u32 {
        if let Some(&id) = self.map.get(&value) {
            return id;
        }

        let arc = Arc::new(value);
        let id = self.items.len() as u32;
        self.items.push(arc.clone());
        self.map.insert(arc, id);
        id
    }

    fn get(&self, id: u32) -> Option<Arc<T>> {
        self.items.get(id as usize).cloned()
    }

    fn len(&self) -> usize {
        self.items.len()
    }
}

/// Type interning table plus the declaration store.
pub struct TypeInterner {
    names: RefCell<Interner>,
    types: RefCell<ValueInterner<TypeData>>,
    type_lists: RefCell<SliceInterner<TypeId>>,
    function_shapes: RefCell<ValueInterner<FunctionShape>>,
    /// Class, typedef and generic declarations.
    pub defs: DefinitionStore,
}

impl Default for TypeInterner {
    fn default() -> Self {
        Self::new()
    }
}

impl TypeInterner {
    /// Create a new type interner with pre-registered intrinsics.
    pub fn new() -> Self {
        let mut types = ValueInterner::new();
        // Intrinsic ids are fixed by insertion order.
        types.intern(TypeData::Dynamic);
        types.intern(TypeData::Void);
        types.intern(TypeData::Bottom);
        debug_assert_eq!(types.len() as u32, TypeId::FIRST_USER);

        let mut names = Interner::new();
        names.intern_common();

        TypeInterner {
            names: RefCell::new(names),
            types: RefCell::new(types),
            type_lists: RefCell::new(SliceInterner::new()),
            function_shapes: RefCell::new(ValueInterner::new()),
            defs: DefinitionStore::new(),
        }
    }

    /// Intern a string into an Atom.
    pub fn intern_string(&self, s: &str) -> Atom {
        self.names.borrow_mut().intern(s)
    }

    /// Look up a name without interning it.
    pub fn lookup_string(&self, s: &str) -> Option<Atom> {
        self.names.borrow().lookup(s)
    }

    /// Resolve an Atom back to its string value.
    pub fn resolve_atom(&self, atom: Atom) -> Arc<str> {
        self.names.borrow().resolve_arc(atom)
    }

    /// Intern a type structure and return its `TypeId`.
    pub fn intern(&self, data: TypeData) -> TypeId {
        TypeId(self.types.borrow_mut().intern(data))
    }

    /// Look up the structure behind a `TypeId`.
    pub fn lookup(&self, id: TypeId) -> Option<TypeData> {
        self.types.borrow().get(id.0).map(|d| (*d).clone())
    }

    /// Like `lookup`, treating unknown ids as `dynamic`.
    pub fn data(&self, id: TypeId) -> TypeData {
        self.lookup(id).unwrap_or(TypeData::Dynamic)
    }

    /// Number of interned types, intrinsics included.
    pub fn len(&self) -> usize {
        self.types.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() <= TypeId::FIRST_USER as usize
    }

    pub fn type_list(&self, items: Vec<TypeId>) -> TypeListId {
        TypeListId(self.type_lists.borrow_mut().intern(items))
    }

    pub fn type_list_items(&self, id: TypeListId) -> Arc<[TypeId]> {
        let lists = self.type_lists.borrow();
        lists.get(id.0).unwrap_or_else(|| lists.empty())
    }

    pub fn function_shape(&self, id: FunctionShapeId) -> Arc<FunctionShape> {
        self.function_shapes
            .borrow()
            .get(id.0)
            .unwrap_or_else(|| Arc::new(FunctionShape::new(TypeId::DYNAMIC, Vec::new())))
    }

    // =========================================================================
    // Constructors
    // =========================================================================

    pub fn class_type(&self, class: ClassId) -> TypeId {
        self.intern(TypeData::Class(class))
    }

    pub fn typedef_type(&self, typedef: TypedefId) -> TypeId {
        self.intern(TypeData::Typedef(typedef))
    }

    pub fn type_param(&self, name: Atom) -> TypeId {
        self.intern(TypeData::TypeParameter(name))
    }

    pub fn application(&self, generic: GenericId, args: Vec<TypeId>) -> TypeId {
        let args = self.type_list(args);
        self.intern(TypeData::Application { generic, args })
    }

    /// Intern a function type, rejecting a shape with both optional
    /// positional and named parameters.
    pub fn try_function(&self, shape: FunctionShape) -> Result<TypeId, ConfigurationError> {
        if !shape.is_well_formed() {
            return Err(ConfigurationError::MixedParameterKinds {
                optional: shape.optional.len(),
                named: shape.named.len(),
            });
        }
        Ok(self.function(shape))
    }

    /// Intern a function type. Named parameters are sorted by name.
    ///
    /// A shape with both optional positional and named parameters keeps only
    /// the optional ones; use [`TypeInterner::try_function`] to reject it.
    pub fn function(&self, mut shape: FunctionShape) -> TypeId {
        if !shape.is_well_formed() {
            warn!(
                optional = shape.optional.len(),
                named = shape.named.len(),
                "function type with optional and named parameters: dropping named"
            );
            shape.named.clear();
        }
        {
            let names = self.names.borrow();
            shape
                .named
                .sort_by(|a, b| names.resolve(a.name).cmp(names.resolve(b.name)));
        }
        let id = FunctionShapeId(self.function_shapes.borrow_mut().intern(shape));
        self.intern(TypeData::Function(id))
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// Strip typedef wrappers at the top level.
    pub fn unwrap_typedef(&self, mut id: TypeId) -> TypeId {
        // Typedefs cannot be recursive, but bound the walk anyway.
        for _ in 0..64 {
            match self.data(id) {
                TypeData::Typedef(td) => match self.defs.typedef(td) {
                    Some(def) => id = def.underlying,
                    None => return id,
                },
                _ => return id,
            }
        }
        id
    }

    /// The canonical form of a type: typedefs erased everywhere.
    ///
    /// Cache keys and structural equality use this form, so `List<F>` for
    /// `typedef F = (int) => int` is the same instantiation as
    /// `List<(int) => int>`.
    pub fn canonicalize(&self, id: TypeId) -> TypeId {
        let id = self.unwrap_typedef(id);
        match self.data(id) {
            TypeData::Function(shape_id) => {
                let shape = self.function_shape(shape_id);
                let canonical = FunctionShape {
                    type_params: shape
                        .type_params
                        .iter()
                        .map(|p| TypeParamInfo {
                            name: p.name,
                            bound: p.bound.map(|b| self.canonicalize(b)),
                        })
                        .collect(),
                    return_type: self.canonicalize(shape.return_type),
                    required: shape.required.iter().map(|&t| self.canonicalize(t)).collect(),
                    optional: shape.optional.iter().map(|&t| self.canonicalize(t)).collect(),
                    named: shape
                        .named
                        .iter()
                        .map(|p| NamedParam {
                            name: p.name,
                            type_id: self.canonicalize(p.type_id),
                        })
                        .collect(),
                };
                if canonical == *shape {
                    id
                } else {
                    self.function(canonical)
                }
            }
            TypeData::Application { generic, args } => {
                let items = self.type_list_items(args);
                let canonical: Vec<TypeId> = items.iter().map(|&t| self.canonicalize(t)).collect();
                if canonical.as_slice() == &*items {
                    id
                } else {
                    self.application(generic, canonical)
                }
            }
            _ => id,
        }
    }

    /// Structural equality of canonical forms. Type parameters bound by a
    /// generic function compare by position, so `<T>(T) => T` equals
    /// `<U>(U) => U`.
    pub fn types_equal(&self, a: TypeId, b: TypeId) -> bool {
        a == b
            || self.equal_up_to_renaming(
                self.canonicalize(a),
                self.canonicalize(b),
                &mut Vec::new(),
            )
    }

    /// `binders` pairs the type parameters of enclosing generic functions,
    /// left side first, innermost last.
    fn equal_up_to_renaming(
        &self,
        a: TypeId,
        b: TypeId,
        binders: &mut Vec<(Atom, Atom)>,
    ) -> bool {
        if a == b && binders.is_empty() {
            return true;
        }
        match (self.data(a), self.data(b)) {
            (TypeData::TypeParameter(left), TypeData::TypeParameter(right)) => {
                match binders.iter().rev().find(|&&(l, r)| l == left || r == right) {
                    Some(&(l, r)) => l == left && r == right,
                    None => left == right,
                }
            }
            (
                TypeData::Application { generic: left, args: left_args },
                TypeData::Application { generic: right, args: right_args },
            ) => {
                let (left_args, right_args) =
                    (self.type_list_items(left_args), self.type_list_items(right_args));
                left == right
                    && left_args.len() == right_args.len()
                    && left_args
                        .iter()
                        .zip(right_args.iter())
                        .all(|(&l, &r)| self.equal_up_to_renaming(l, r, binders))
            }
            (TypeData::Function(left), TypeData::Function(right)) => {
                let (left, right) = (self.function_shape(left), self.function_shape(right));
                if left.type_params.len() != right.type_params.len()
                    || left.required.len() != right.required.len()
                    || left.optional.len() != right.optional.len()
                    || left.named.len() != right.named.len()
                {
                    return false;
                }
                let depth = binders.len();
                binders.extend(
                    left.type_params
                        .iter()
                        .zip(right.type_params.iter())
                        .map(|(l, r)| (l.name, r.name)),
                );
                let mut same = |l: TypeId, r: TypeId| self.equal_up_to_renaming(l, r, binders);
                let equal = left
                    .type_params
                    .iter()
                    .zip(right.type_params.iter())
                    .all(|(l, r)| match (l.bound, r.bound) {
                        (Some(l), Some(r)) => same(l, r),
                        (None, None) => true,
                        _ => false,
                    })
                    && same(left.return_type, right.return_type)
                    && left.required.iter().zip(right.required.iter()).all(|(&l, &r)| same(l, r))
                    && left.optional.iter().zip(right.optional.iter()).all(|(&l, &r)| same(l, r))
                    && left
                        .named
                        .iter()
                        .zip(right.named.iter())
                        .all(|(l, r)| l.name == r.name && same(l.type_id, r.type_id));
                binders.truncate(depth);
                equal
            }
            _ => a == b,
        }
    }

    pub fn as_class(&self, id: TypeId) -> Option<ClassId> {
        match self.data(self.unwrap_typedef(id)) {
            TypeData::Class(class) => Some(class),
            _ => None,
        }
    }

    pub fn as_function(&self, id: TypeId) -> Option<Arc<FunctionShape>> {
        match self.data(self.unwrap_typedef(id)) {
            TypeData::Function(shape_id) => Some(self.function_shape(shape_id)),
            _ => None,
        }
    }

    /// Whether a type mentions a type variable it does not bind itself.
    ///
    /// `List<T>` does, `<T>(T) => T` does not.
    pub fn contains_type_params(&self, id: TypeId) -> bool {
        self.mentions_free_param(id, &[])
    }

    fn mentions_free_param(&self, id: TypeId, bound: &[Atom]) -> bool {
        match self.data(id) {
            TypeData::TypeParameter(name) => !bound.contains(&name),
            TypeData::Application { args, .. } => self
                .type_list_items(args)
                .iter()
                .any(|&t| self.mentions_free_param(t, bound)),
            TypeData::Function(shape_id) => {
                let shape = self.function_shape(shape_id);
                let mut inner = bound.to_vec();
                inner.extend(shape.type_params.iter().map(|p| p.name));
                let mentions = |t: TypeId| self.mentions_free_param(t, &inner);
                mentions(shape.return_type)
                    || shape.required.iter().any(|&t| mentions(t))
                    || shape.optional.iter().any(|&t| mentions(t))
                    || shape.named.iter().any(|p| mentions(p.type_id))
                    || shape.type_params.iter().filter_map(|p| p.bound).any(mentions)
            }
            _ => false,
        }
    }

    /// Type arguments of a class type (empty for non-generic classes).
    pub fn class_type_args(&self, class: ClassId) -> Arc<[TypeId]> {
        match self.defs.class(class) {
            Some(def) => self.type_list_items(def.type_args),
            None => self.type_list_items(TypeListId::EMPTY),
        }
    }
}

#[cfg(test)]
#[path = "../tests/intern_tests.rs"]
mod tests;
