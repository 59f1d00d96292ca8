//! Class, typedef and generic declaration storage.
//!
//! The store only records the *type-level* facts the subtype engine needs:
//! names, generic origin and type arguments, and the inheritance edges
//! (superclass, mixins, interfaces). Member implementations belong to the
//! runtime.
//!
//! All entries are created during module evaluation and never removed.

use crate::types::{
    ClassFlags, ClassId, GenericId, GenericKind, TypeId, TypeListId, TypeParamInfo, TypedefId,
};
use ddcrt_common::Atom;
use ddcrt_common::limits::MAX_HIERARCHY_WALK;
use rustc_hash::FxHashSet;
use std::cell::{Cell, RefCell};
use std::sync::Arc;
use tracing::trace;

/// Type-level description of a concrete class.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClassDef {
    /// Display name without type arguments (`List`, `B with M`).
    pub name: Atom,
    /// Generic declaration this class instantiates, if any.
    pub origin: Option<GenericId>,
    /// Canonical type arguments (empty for non-generic classes).
    pub type_args: TypeListId,
    pub supertype: Option<ClassId>,
    /// Mixins declared on this class, in application order.
    pub mixins: Vec<ClassId>,
    /// For a mixin application link: the mixin applied at this link.
    pub applied_mixin: Option<ClassId>,
    pub interfaces: Vec<ClassId>,
    pub flags: ClassFlags,
}

impl ClassDef {
    pub fn new(name: Atom) -> Self {
        Self {
            name,
            origin: None,
            type_args: TypeListId::EMPTY,
            supertype: None,
            mixins: Vec::new(),
            applied_mixin: None,
            interfaces: Vec::new(),
            flags: ClassFlags::empty(),
        }
    }

    pub fn with_origin(mut self, origin: GenericId, type_args: TypeListId) -> Self {
        self.origin = Some(origin);
        self.type_args = type_args;
        self
    }

    pub fn with_supertype(mut self, supertype: ClassId) -> Self {
        self.supertype = Some(supertype);
        self
    }

    pub fn with_interfaces(mut self, interfaces: Vec<ClassId>) -> Self {
        self.interfaces = interfaces;
        self
    }

    pub fn with_flags(mut self, flags: ClassFlags) -> Self {
        self.flags |= flags;
        self
    }

    #[inline]
    pub fn is_mixin_application(&self) -> bool {
        self.flags.contains(ClassFlags::MIXIN_APPLICATION)
    }
}

/// A named alias for a function or class type.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TypedefDef {
    pub name: Atom,
    pub origin: Option<GenericId>,
    pub type_args: TypeListId,
    pub underlying: TypeId,
}

/// A generic declaration's static facts. The builder closure and the
/// instantiation cache live in the runtime.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GenericInfo {
    pub name: Atom,
    pub type_params: Vec<TypeParamInfo>,
    pub kind: GenericKind,
}

/// Core classes the subtype rules refer to directly.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct CoreClassIds {
    pub object: ClassId,
    pub null: ClassId,
    pub function: ClassId,
}

/// Append-only storage for declarations.
#[derive(Default)]
pub struct DefinitionStore {
    classes: RefCell<Vec<Arc<ClassDef>>>,
    typedefs: RefCell<Vec<Arc<TypedefDef>>>,
    generics: RefCell<Vec<Arc<GenericInfo>>>,
    core: Cell<Option<CoreClassIds>>,
}

impl DefinitionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Hand out a class id before its hierarchy is known, so the class can
    /// mention itself in its own supertype arguments (`A extends B<A>`).
    pub fn reserve_class(&self, name: Atom) -> ClassId {
        let mut classes = self.classes.borrow_mut();
        let id = ClassId(classes.len() as u32);
        classes.push(Arc::new(
            ClassDef::new(name).with_flags(ClassFlags::RESERVED),
        ));
        trace!(class_id = id.0, "DefinitionStore::reserve_class");
        id
    }

    /// Fill in a reserved class. Each class is defined exactly once.
    pub fn define_class(&self, id: ClassId, def: ClassDef) {
        let mut classes = self.classes.borrow_mut();
        if let Some(slot) = classes.get_mut(id.0 as usize) {
            debug_assert!(
                slot.flags.contains(ClassFlags::RESERVED),
                "class {} defined twice",
                id.0
            );
            let mut def = def;
            def.flags.remove(ClassFlags::RESERVED);
            trace!(class_id = id.0, flags = ?def.flags, "DefinitionStore::define_class");
            *slot = Arc::new(def);
        }
    }

    /// Give up on a reserved class whose definition failed. The id stays
    /// allocated but is flagged [`ClassFlags::ABANDONED`]; classes that were
    /// already defined are left alone.
    pub fn abandon_class(&self, id: ClassId) {
        let mut classes = self.classes.borrow_mut();
        let Some(slot) = classes.get_mut(id.0 as usize) else {
            return;
        };
        if !slot.flags.contains(ClassFlags::RESERVED) {
            return;
        }
        let mut def = (**slot).clone();
        def.flags.remove(ClassFlags::RESERVED);
        def.flags.insert(ClassFlags::ABANDONED);
        trace!(class_id = id.0, "DefinitionStore::abandon_class");
        *slot = Arc::new(def);
    }

    /// Register a fully known class in one step.
    pub fn register_class(&self, def: ClassDef) -> ClassId {
        let id = self.reserve_class(def.name);
        self.define_class(id, def);
        id
    }

    pub fn class(&self, id: ClassId) -> Option<Arc<ClassDef>> {
        self.classes.borrow().get(id.0 as usize).cloned()
    }

    pub fn class_count(&self) -> usize {
        self.classes.borrow().len()
    }

    pub fn register_typedef(&self, def: TypedefDef) -> TypedefId {
        let mut typedefs = self.typedefs.borrow_mut();
        let id = TypedefId(typedefs.len() as u32);
        typedefs.push(Arc::new(def));
        id
    }

    pub fn typedef(&self, id: TypedefId) -> Option<Arc<TypedefDef>> {
        self.typedefs.borrow().get(id.0 as usize).cloned()
    }

    pub fn register_generic(&self, info: GenericInfo) -> GenericId {
        let mut generics = self.generics.borrow_mut();
        let id = GenericId(generics.len() as u32);
        generics.push(Arc::new(info));
        id
    }

    pub fn generic(&self, id: GenericId) -> Option<Arc<GenericInfo>> {
        self.generics.borrow().get(id.0 as usize).cloned()
    }

    pub fn set_core(&self, core: CoreClassIds) {
        self.core.set(Some(core));
    }

    pub fn core(&self) -> Option<CoreClassIds> {
        self.core.get()
    }

    /// All classes `id` is a subtype of by declaration, starting with `id`
    /// itself: the superclass chain, the mixin applied at each link, then each
    /// implemented interface transitively. Duplicates are dropped.
    pub fn supertypes(&self, id: ClassId) -> Vec<ClassId> {
        let mut order = Vec::new();
        let mut seen = FxHashSet::default();
        let mut interfaces = Vec::new();

        // Superclass chain first, collecting mixins as we go.
        let mut current = Some(id);
        while let Some(class_id) = current {
            if !seen.insert(class_id) || order.len() >= MAX_HIERARCHY_WALK {
                break;
            }
            order.push(class_id);
            let Some(def) = self.class(class_id) else {
                break;
            };
            if let Some(mixin) = def.applied_mixin {
                if seen.insert(mixin) {
                    order.push(mixin);
                }
                if let Some(mixin_def) = self.class(mixin) {
                    interfaces.extend(mixin_def.interfaces.iter().copied());
                }
            }
            interfaces.extend(def.interfaces.iter().copied());
            current = def.supertype;
        }

        // Then interfaces, transitively including their own supertypes.
        while let Some(iface) = interfaces.pop() {
            if order.len() >= MAX_HIERARCHY_WALK {
                break;
            }
            if !seen.insert(iface) {
                continue;
            }
            order.push(iface);
            if let Some(def) = self.class(iface) {
                interfaces.extend(def.interfaces.iter().copied());
                if let Some(mixin) = def.applied_mixin {
                    interfaces.push(mixin);
                }
                if let Some(sup) = def.supertype {
                    interfaces.push(sup);
                }
            }
        }

        order
    }

    /// Nominal subclass test ignoring type arguments.
    pub fn is_nominal_subclass(&self, source: ClassId, target: ClassId) -> bool {
        if source == target {
            return true;
        }
        let target_origin = self.class(target).and_then(|d| d.origin);
        self.supertypes(source).into_iter().any(|c| {
            c == target
                || (target_origin.is_some()
                    && self.class(c).and_then(|d| d.origin) == target_origin)
        })
    }
}

#[cfg(test)]
#[path = "../tests/def_tests.rs"]
mod tests;
