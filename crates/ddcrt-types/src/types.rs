//! Core type representation.
//!
//! Every runtime type is interned into a `TypeId`. Two `TypeId`s are equal iff
//! they denote the same canonical type, so `wrap_type(C) == wrap_type(C)` is an
//! integer comparison and `C<int>` / `C<num>` are distinguishable handles.

use bitflags::bitflags;
use ddcrt_common::Atom;
use ddcrt_common::limits::TYPE_ARGS_INLINE;
use smallvec::SmallVec;

/// Interned type handle.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypeId(pub u32);

impl TypeId {
    /// The top type. Compatible with every type in both directions.
    pub const DYNAMIC: TypeId = TypeId(0);
    /// `void`, meaningful only as a return type.
    pub const VOID: TypeId = TypeId(1);
    /// The bottom type (type of `throw`). Subtype of everything.
    pub const BOTTOM: TypeId = TypeId(2);

    /// First id handed out for non-intrinsic types.
    pub const FIRST_USER: u32 = 3;

    #[inline]
    pub const fn is_intrinsic(self) -> bool {
        self.0 < Self::FIRST_USER
    }

    #[inline]
    pub const fn is_dynamic(self) -> bool {
        self.0 == Self::DYNAMIC.0
    }

    #[inline]
    pub const fn is_void(self) -> bool {
        self.0 == Self::VOID.0
    }
}

/// Identifier of a concrete class (one per generic instantiation).
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ClassId(pub u32);

/// Identifier of a typedef (one per generic instantiation).
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypedefId(pub u32);

/// Identifier of a generic declaration (`C$ = generic(T => ...)`).
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GenericId(pub u32);

/// Interned list of type arguments.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypeListId(pub u32);

impl TypeListId {
    pub const EMPTY: TypeListId = TypeListId(0);
}

/// Interned function shape.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FunctionShapeId(pub u32);

/// Small inline buffer for type argument tuples.
pub type TypeArgs = SmallVec<[TypeId; TYPE_ARGS_INLINE]>;

/// The structure behind a `TypeId`.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum TypeData {
    Dynamic,
    Void,
    Bottom,
    /// A type variable bound by a generic function signature (`T` in `<T>(T) => T`)
    /// or by a type expression scope during parsing.
    TypeParameter(Atom),
    /// A concrete class. Generic instantiations each have their own `ClassId`,
    /// so `List<int>` is `Class(id_of_list_int)`.
    Class(ClassId),
    /// A generic applied to arguments that still mention type variables
    /// (`List<T>` inside `<T>(T) => List<T>`). Substituting concrete arguments
    /// turns it into a `Class` or `Typedef` through the generic cache.
    Application { generic: GenericId, args: TypeListId },
    Function(FunctionShapeId),
    /// Named alias of a function or class type.
    Typedef(TypedefId),
}

/// A declared type parameter with an optional upper bound.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct TypeParamInfo {
    pub name: Atom,
    pub bound: Option<TypeId>,
}

impl TypeParamInfo {
    pub const fn new(name: Atom) -> Self {
        Self { name, bound: None }
    }

    pub const fn bounded(name: Atom, bound: TypeId) -> Self {
        Self {
            name,
            bound: Some(bound),
        }
    }
}

/// A named parameter of a function type.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct NamedParam {
    pub name: Atom,
    pub type_id: TypeId,
}

/// Shape of a function type.
///
/// A single shape has optional positional parameters or named parameters,
/// never both. Named parameters are kept sorted by name so structurally equal
/// shapes intern to the same id.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct FunctionShape {
    pub type_params: Vec<TypeParamInfo>,
    pub return_type: TypeId,
    pub required: Vec<TypeId>,
    pub optional: Vec<TypeId>,
    pub named: Vec<NamedParam>,
}

impl FunctionShape {
    pub fn new(return_type: TypeId, required: Vec<TypeId>) -> Self {
        Self {
            type_params: Vec::new(),
            return_type,
            required,
            optional: Vec::new(),
            named: Vec::new(),
        }
    }

    pub fn with_optional(mut self, optional: Vec<TypeId>) -> Self {
        self.optional = optional;
        self
    }

    pub fn with_named(mut self, named: Vec<NamedParam>) -> Self {
        self.named = named;
        self
    }

    pub fn with_type_params(mut self, type_params: Vec<TypeParamInfo>) -> Self {
        self.type_params = type_params;
        self
    }

    #[inline]
    pub fn is_generic(&self) -> bool {
        !self.type_params.is_empty()
    }

    /// Number of positional parameters, required and optional.
    #[inline]
    pub fn positional_count(&self) -> usize {
        self.required.len() + self.optional.len()
    }

    /// Positional parameter type at `index`, required first then optional.
    pub fn positional(&self, index: usize) -> Option<TypeId> {
        if index < self.required.len() {
            Some(self.required[index])
        } else {
            self.optional.get(index - self.required.len()).copied()
        }
    }

    pub fn named_param(&self, name: Atom) -> Option<TypeId> {
        self.named
            .iter()
            .find(|p| p.name == name)
            .map(|p| p.type_id)
    }

    /// Optional positional and named parameters are mutually exclusive.
    #[inline]
    pub fn is_well_formed(&self) -> bool {
        self.optional.is_empty() || self.named.is_empty()
    }
}

bitflags! {
    /// Flags describing how a class came to be.
    #[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
    pub struct ClassFlags: u32 {
        /// Synthesized link of a mixin composition (`Base with M`).
        const MIXIN_APPLICATION = 1 << 0;
        /// Declared `abstract`; cannot be constructed.
        const ABSTRACT = 1 << 1;
        /// Part of the bootstrapped core library.
        const CORE = 1 << 2;
        /// Id handed out but the hierarchy has not been filled in yet.
        const RESERVED = 1 << 3;
        /// Id handed out, but building the class failed. Never defined.
        const ABANDONED = 1 << 4;
    }
}

/// What a generic declaration produces when instantiated.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum GenericKind {
    Class,
    Typedef,
}
