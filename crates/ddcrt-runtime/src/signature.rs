//! Lazy signature registry.
//!
//! A class's signature (constructor, method, accessor, field and static
//! types) is attached as a thunk and evaluated on first query, so classes in
//! one module can refer to each other before all of them exist. A thunk that
//! queries its own class's signature gets `CyclicSignature`. A failing thunk
//! is kept and retried on the next query.

use crate::runtime::Runtime;
use ddcrt_types::{ClassId, ConfigurationError, TypeId};
use indexmap::IndexMap;
use std::rc::Rc;
use tracing::trace;

pub type SignatureThunk = Rc<dyn Fn(&Runtime) -> Result<ClassSignature, ConfigurationError>>;

/// Reified member types of one class. The empty constructor name is the
/// default constructor.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ClassSignature {
    pub constructors: IndexMap<String, TypeId>,
    pub methods: IndexMap<String, TypeId>,
    pub getters: IndexMap<String, TypeId>,
    pub setters: IndexMap<String, TypeId>,
    pub fields: IndexMap<String, TypeId>,
    pub statics: IndexMap<String, TypeId>,
}

impl ClassSignature {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_constructor(mut self, name: &str, fn_type: TypeId) -> Self {
        self.constructors.insert(name.to_string(), fn_type);
        self
    }

    pub fn with_method(mut self, name: &str, fn_type: TypeId) -> Self {
        self.methods.insert(name.to_string(), fn_type);
        self
    }

    pub fn with_getter(mut self, name: &str, ty: TypeId) -> Self {
        self.getters.insert(name.to_string(), ty);
        self
    }

    pub fn with_setter(mut self, name: &str, ty: TypeId) -> Self {
        self.setters.insert(name.to_string(), ty);
        self
    }

    pub fn with_field(mut self, name: &str, ty: TypeId) -> Self {
        self.fields.insert(name.to_string(), ty);
        self
    }

    pub fn with_static(mut self, name: &str, ty: TypeId) -> Self {
        self.statics.insert(name.to_string(), ty);
        self
    }

    /// The declared type of `name` as seen by a member access of `kind`.
    /// Accessors fall back to the field of the same name.
    pub fn member(&self, name: &str, kind: MemberKind) -> Option<TypeId> {
        match kind {
            MemberKind::Constructor => self.constructors.get(name).copied(),
            MemberKind::Method => self.methods.get(name).copied(),
            MemberKind::Getter => self
                .getters
                .get(name)
                .or_else(|| self.fields.get(name))
                .copied(),
            MemberKind::Setter => self
                .setters
                .get(name)
                .or_else(|| self.fields.get(name))
                .copied(),
            MemberKind::Field => self.fields.get(name).copied(),
            MemberKind::Static => self.statics.get(name).copied(),
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum MemberKind {
    Constructor,
    Method,
    Getter,
    Setter,
    Field,
    Static,
}

impl MemberKind {
    /// Constructors and statics belong to one class and are not inherited.
    #[inline]
    pub fn is_inherited(self) -> bool {
        !matches!(self, MemberKind::Constructor | MemberKind::Static)
    }
}

pub(crate) enum SignatureState {
    Unset,
    Pending(SignatureThunk),
    Evaluating(SignatureThunk),
    Ready(Rc<ClassSignature>),
}

impl Runtime {
    /// Attach (or replace) the lazy signature of `class`.
    pub fn set_signature<F>(&self, class: TypeId, thunk: F) -> Result<(), ConfigurationError>
    where
        F: Fn(&Runtime) -> Result<ClassSignature, ConfigurationError> + 'static,
    {
        let id = self.class_of_type(class)?;
        self.attach_signature(id, Rc::new(thunk));
        Ok(())
    }

    pub(crate) fn attach_signature(&self, id: ClassId, thunk: SignatureThunk) {
        if let Some(info) = self.class_info(id) {
            *info.signature.borrow_mut() = SignatureState::Pending(thunk);
        }
    }

    /// The signature declared by `class` itself, evaluating it if needed.
    pub fn signature(&self, class: TypeId) -> Result<Option<Rc<ClassSignature>>, ConfigurationError> {
        let id = self.class_of_type(class)?;
        self.class_signature(id)
    }

    /// Whether the signature thunk of `class` has run successfully.
    pub fn is_signature_evaluated(&self, class: TypeId) -> bool {
        self.interner
            .as_class(class)
            .and_then(|id| self.class_info(id))
            .is_some_and(|info| matches!(*info.signature.borrow(), SignatureState::Ready(_)))
    }

    pub(crate) fn class_signature(
        &self,
        id: ClassId,
    ) -> Result<Option<Rc<ClassSignature>>, ConfigurationError> {
        let Some(info) = self.class_info(id) else {
            return Ok(None);
        };
        let thunk = {
            let mut state = info.signature.borrow_mut();
            match &*state {
                SignatureState::Unset => return Ok(None),
                SignatureState::Ready(sig) => return Ok(Some(sig.clone())),
                SignatureState::Evaluating(_) => {
                    return Err(ConfigurationError::CyclicSignature {
                        class: self.render(info.type_id),
                    });
                }
                SignatureState::Pending(thunk) => {
                    let thunk = thunk.clone();
                    *state = SignatureState::Evaluating(thunk.clone());
                    thunk
                }
            }
        };

        trace!(class = id.0, "evaluate signature");
        match thunk(self) {
            Ok(sig) => {
                let sig = Rc::new(sig);
                *info.signature.borrow_mut() = SignatureState::Ready(sig.clone());
                Ok(Some(sig))
            }
            Err(err) => {
                *info.signature.borrow_mut() = SignatureState::Pending(thunk);
                Err(err)
            }
        }
    }

    /// The declared type of member `name` on instances of `class`, searching
    /// providers from most to least derived.
    pub fn member_type(
        &self,
        class: TypeId,
        name: &str,
        kind: MemberKind,
    ) -> Result<Option<TypeId>, ConfigurationError> {
        let id = self.class_of_type(class)?;
        self.lookup_member_type(id, name, kind)
    }

    pub(crate) fn lookup_member_type(
        &self,
        id: ClassId,
        name: &str,
        kind: MemberKind,
    ) -> Result<Option<TypeId>, ConfigurationError> {
        if !kind.is_inherited() {
            return Ok(self.class_signature(id)?.and_then(|sig| sig.member(name, kind)));
        }
        let Some(info) = self.class_info(id) else {
            return Ok(None);
        };
        for &provider in info.providers.iter().rev() {
            if let Some(ty) = self
                .class_signature(provider)?
                .and_then(|sig| sig.member(name, kind))
            {
                return Ok(Some(ty));
            }
        }
        Ok(None)
    }
}

#[cfg(test)]
#[path = "../tests/signature_tests.rs"]
mod tests;
