//! Class definition and construction.
//!
//! Every class gets a flat provider list when it is defined: the
//! superclass's providers, then the mixin applied at this link (for mixin
//! applications), then the class itself. Member lookup scans the list back
//! to front, so a class's own members win over mixins and mixins win over
//! the base. Interfaces contribute no members.

use crate::dispatch::DynamicDispatchable;
use crate::error::{InvocationKind, NoSuchMethodError, RuntimeError};
use crate::lazy::LazyStatic;
use crate::runtime::{NamedType, Runtime};
use crate::signature::{ClassSignature, MemberKind, SignatureState, SignatureThunk};
use crate::type_tests::TypeTestMode;
use crate::value::{Args, ConstructorFn, GetterFn, Instance, MethodFn, SetterFn, Value};
use ddcrt_common::Atom;
use ddcrt_types::{ClassDef, ClassFlags, ClassId, ConfigurationError, GenericId, TypeId, TypeListId};
use indexmap::{IndexMap, IndexSet};
use rustc_hash::FxHashMap;
use std::cell::{Cell, RefCell};
use std::rc::Rc;
use tracing::debug;

/// Everything a class provides under one member name.
#[derive(Clone, Default)]
pub(crate) struct MemberSlot {
    pub method: Option<MethodFn>,
    pub getter: Option<GetterFn>,
    pub setter: Option<SetterFn>,
    pub field: bool,
}

impl MemberSlot {
    #[inline]
    pub fn is_readable(&self) -> bool {
        self.method.is_some() || self.getter.is_some() || self.field
    }

    #[inline]
    pub fn is_writable(&self) -> bool {
        self.setter.is_some() || self.field
    }
}

enum MemberImpl {
    Method(MethodFn),
    Getter(GetterFn),
    Setter(SetterFn),
    Field,
}

/// Runtime-side facts of a defined class.
pub(crate) struct ClassInfo {
    pub type_id: TypeId,
    pub members: FxHashMap<Atom, MemberSlot>,
    /// Fields declared by this class itself.
    pub fields: Vec<Atom>,
    pub providers: Vec<ClassId>,
    pub constructors: RefCell<FxHashMap<String, ConstructorFn>>,
    pub signature: RefCell<SignatureState>,
    pub type_tests: Cell<TypeTestMode>,
    pub dispatch: RefCell<Option<Rc<dyn DynamicDispatchable>>>,
    pub statics: RefCell<IndexMap<String, Rc<LazyStatic>>>,
}

/// Collects a class declaration until [`Runtime::define_class`] installs it.
///
/// The class id is reserved up front, so [`ClassBuilder::this_type`] can be
/// used in the class's own signature and member bodies.
pub struct ClassBuilder {
    pub(crate) id: ClassId,
    pub(crate) type_id: TypeId,
    name: String,
    origin: Option<(GenericId, TypeListId)>,
    supertype: Option<TypeId>,
    mixins: Vec<TypeId>,
    interfaces: Vec<TypeId>,
    pub(crate) applied_mixin: Option<ClassId>,
    pub(crate) flags: ClassFlags,
    members: Vec<(String, MemberImpl)>,
    constructors: Vec<(String, ConstructorFn)>,
    signature: Option<SignatureThunk>,
    dispatch: Option<Rc<dyn DynamicDispatchable>>,
}

impl ClassBuilder {
    pub(crate) fn reserved(
        rt: &Runtime,
        name: &str,
        origin: Option<(GenericId, TypeListId)>,
    ) -> Self {
        let id = rt.interner.defs.reserve_class(rt.interner.intern_string(name));
        Self {
            id,
            type_id: rt.interner.class_type(id),
            name: name.to_string(),
            origin,
            supertype: None,
            mixins: Vec::new(),
            interfaces: Vec::new(),
            applied_mixin: None,
            flags: ClassFlags::empty(),
            members: Vec::new(),
            constructors: Vec::new(),
            signature: None,
            dispatch: None,
        }
    }

    /// The type of the class being built.
    pub fn this_type(&self) -> TypeId {
        self.type_id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn with_origin(mut self, generic: GenericId, args: TypeListId) -> Self {
        self.origin = Some((generic, args));
        self
    }

    /// Superclass. Defaults to `Object`.
    pub fn extends(mut self, supertype: TypeId) -> Self {
        self.supertype = Some(supertype);
        self
    }

    /// Append a mixin (`extends B with M1, M2`). Applied in call order.
    pub fn with_mixin(mut self, mixin: TypeId) -> Self {
        self.mixins.push(mixin);
        self
    }

    pub fn with_mixins(mut self, mixins: &[TypeId]) -> Self {
        self.mixins.extend_from_slice(mixins);
        self
    }

    pub fn implements(mut self, interface: TypeId) -> Self {
        self.interfaces.push(interface);
        self
    }

    pub fn abstract_class(mut self) -> Self {
        self.flags |= ClassFlags::ABSTRACT;
        self
    }

    pub fn method<F>(mut self, name: &str, body: F) -> Self
    where
        F: Fn(&Runtime, &Value, &Args) -> Result<Value, RuntimeError> + 'static,
    {
        self.members
            .push((name.to_string(), MemberImpl::Method(Rc::new(body))));
        self
    }

    pub fn getter<F>(mut self, name: &str, body: F) -> Self
    where
        F: Fn(&Runtime, &Value) -> Result<Value, RuntimeError> + 'static,
    {
        self.members
            .push((name.to_string(), MemberImpl::Getter(Rc::new(body))));
        self
    }

    pub fn setter<F>(mut self, name: &str, body: F) -> Self
    where
        F: Fn(&Runtime, &Value, Value) -> Result<(), RuntimeError> + 'static,
    {
        self.members
            .push((name.to_string(), MemberImpl::Setter(Rc::new(body))));
        self
    }

    /// An instance field, initially `null`. Its declared type comes from the
    /// signature.
    pub fn field(mut self, name: &str) -> Self {
        self.members.push((name.to_string(), MemberImpl::Field));
        self
    }

    /// A constructor body. The empty name is the default constructor.
    pub fn constructor<F>(mut self, name: &str, body: F) -> Self
    where
        F: Fn(&Runtime, &Value, &Args) -> Result<(), RuntimeError> + 'static,
    {
        self.constructors.push((name.to_string(), Rc::new(body)));
        self
    }

    /// Attach the signature lazily: `thunk` runs on first query.
    pub fn signature<F>(mut self, thunk: F) -> Self
    where
        F: Fn(&Runtime) -> Result<ClassSignature, ConfigurationError> + 'static,
    {
        self.signature = Some(Rc::new(thunk));
        self
    }

    /// Opt into a `noSuchMethod` fallback for dynamic calls.
    pub fn no_such_method<H>(mut self, handler: H) -> Self
    where
        H: DynamicDispatchable + 'static,
    {
        self.dispatch = Some(Rc::new(handler));
        self
    }
}

impl Runtime {
    /// Start declaring a non-generic class.
    pub fn class_builder(&self, name: &str) -> ClassBuilder {
        ClassBuilder::reserved(self, name, None)
    }

    /// Install a class. Declared mixins are composed onto the superclass
    /// first, so `class C extends B with M` gets the link `B with M` as its
    /// superclass.
    ///
    /// On failure the reserved class id is flagged [`ClassFlags::ABANDONED`].
    pub fn define_class(&self, builder: ClassBuilder) -> Result<TypeId, ConfigurationError> {
        match self.resolve_hierarchy(&builder) {
            Ok((supertype, mixins, interfaces)) => {
                Ok(self.install_class(builder, Some(supertype), mixins, interfaces))
            }
            Err(err) => {
                debug!(class = %builder.name, error = %err, "define_class: abandoned");
                self.interner.defs.abandon_class(builder.id);
                Err(err)
            }
        }
    }

    fn resolve_hierarchy(
        &self,
        builder: &ClassBuilder,
    ) -> Result<(ClassId, Vec<ClassId>, Vec<ClassId>), ConfigurationError> {
        let supertype = match builder.supertype {
            Some(ty) => self.class_of_type(ty)?,
            None => self.class_of_type(self.core.object)?,
        };
        let mixins = builder
            .mixins
            .iter()
            .map(|&m| self.class_of_type(m))
            .collect::<Result<Vec<_>, _>>()?;
        let interfaces = builder
            .interfaces
            .iter()
            .map(|&i| self.class_of_type(i))
            .collect::<Result<Vec<_>, _>>()?;
        let supertype = if mixins.is_empty() {
            supertype
        } else {
            self.compose_links(supertype, &mixins)?
        };
        Ok((supertype, mixins, interfaces))
    }

    /// Record the definition and build the member tables. Infallible: all
    /// references are already resolved.
    pub(crate) fn install_class(
        &self,
        builder: ClassBuilder,
        supertype: Option<ClassId>,
        mixins: Vec<ClassId>,
        interfaces: Vec<ClassId>,
    ) -> TypeId {
        let ClassBuilder {
            id,
            type_id,
            name,
            origin,
            applied_mixin,
            flags,
            members,
            constructors,
            signature,
            dispatch,
            ..
        } = builder;

        let mut def = ClassDef::new(self.interner.intern_string(&name))
            .with_interfaces(interfaces)
            .with_flags(flags);
        def.supertype = supertype;
        def.mixins = mixins;
        def.applied_mixin = applied_mixin;
        if let Some((generic, args)) = origin {
            def = def.with_origin(generic, args);
        }
        self.interner.defs.define_class(id, def);

        let mut providers = supertype
            .and_then(|s| self.class_info(s))
            .map(|info| info.providers.clone())
            .unwrap_or_default();
        if let Some(mixin) = applied_mixin {
            providers.push(mixin);
        }
        providers.push(id);

        let mut slots: FxHashMap<Atom, MemberSlot> = FxHashMap::default();
        let mut fields = Vec::new();
        for (member_name, member) in members {
            let atom = self.interner.intern_string(&member_name);
            let slot = slots.entry(atom).or_default();
            match member {
                MemberImpl::Method(f) => slot.method = Some(f),
                MemberImpl::Getter(f) => slot.getter = Some(f),
                MemberImpl::Setter(f) => slot.setter = Some(f),
                MemberImpl::Field => {
                    slot.field = true;
                    fields.push(atom);
                }
            }
        }

        let info = ClassInfo {
            type_id,
            members: slots,
            fields,
            providers,
            constructors: RefCell::new(constructors.into_iter().collect()),
            signature: RefCell::new(match signature {
                Some(thunk) => SignatureState::Pending(thunk),
                None => SignatureState::Unset,
            }),
            type_tests: Cell::new(TypeTestMode::default()),
            dispatch: RefCell::new(dispatch),
            statics: RefCell::new(IndexMap::new()),
        };
        debug!(
            class = %name,
            id = id.0,
            providers = info.providers.len(),
            ?flags,
            "define_class"
        );
        self.classes.borrow_mut().insert(id, Rc::new(info));

        if origin.is_none() && !flags.contains(ClassFlags::MIXIN_APPLICATION) {
            self.register_name(&name, NamedType::Type(type_id));
        }
        type_id
    }

    /// Member slot for `name` from the last provider that has one matching
    /// `accept`, with that provider.
    pub(crate) fn find_member(
        &self,
        class: ClassId,
        name: &str,
        accept: impl Fn(&MemberSlot) -> bool,
    ) -> Option<(ClassId, MemberSlot)> {
        let atom = self.interner.lookup_string(name)?;
        let info = self.class_info(class)?;
        info.providers.iter().rev().find_map(|&provider| {
            let provider_info = self.class_info(provider)?;
            let slot = provider_info.members.get(&atom)?;
            accept(slot).then(|| (provider, slot.clone()))
        })
    }

    /// All instance fields of `class`, inherited ones first.
    fn instance_fields(&self, class: ClassId) -> IndexSet<Atom> {
        let mut fields = IndexSet::new();
        if let Some(info) = self.class_info(class) {
            for &provider in &info.providers {
                if let Some(provider_info) = self.class_info(provider) {
                    fields.extend(provider_info.fields.iter().copied());
                }
            }
        }
        fields
    }

    /// Add a named constructor to an already defined class.
    pub fn define_named_constructor<F>(
        &self,
        class: TypeId,
        name: &str,
        body: F,
    ) -> Result<(), ConfigurationError>
    where
        F: Fn(&Runtime, &Value, &Args) -> Result<(), RuntimeError> + 'static,
    {
        let id = self.class_of_type(class)?;
        if let Some(info) = self.class_info(id) {
            info.constructors
                .borrow_mut()
                .insert(name.to_string(), Rc::new(body));
        }
        Ok(())
    }

    /// `new C.name(args)`. The empty name is the default constructor.
    pub fn construct(&self, class: TypeId, name: &str, args: &Args) -> Result<Value, RuntimeError> {
        let id = self.class_of_type(class)?;
        let flags = self
            .interner
            .defs
            .class(id)
            .map(|def| def.flags)
            .unwrap_or_default();
        if flags.contains(ClassFlags::ABSTRACT) {
            return Err(NoSuchMethodError::mismatch(
                self.render(class),
                constructor_name(&self.render(class), name),
                InvocationKind::Constructor,
                "abstract classes cannot be instantiated",
            )
            .into());
        }
        let this = Value::Object(Rc::new(Instance::new(id, self.instance_fields(id))));
        self.run_constructor(id, name, &this, args)?;
        Ok(this)
    }

    /// `new C(args)`.
    pub fn new_instance(&self, class: TypeId, args: &Args) -> Result<Value, RuntimeError> {
        self.construct(class, "", args)
    }

    /// Run the constructor `name` of `class` on `this`.
    ///
    /// Constructors are not inherited. A class without a default constructor
    /// gets an implicit one that takes no arguments and runs the
    /// superclass's default constructor. Mixin application links forward
    /// every constructor call to their superclass unchanged.
    pub(crate) fn run_constructor(
        &self,
        class: ClassId,
        name: &str,
        this: &Value,
        args: &Args,
    ) -> Result<(), RuntimeError> {
        let Some(info) = self.class_info(class) else {
            return Ok(());
        };
        let declared = info.constructors.borrow().get(name).cloned();
        if let Some(body) = declared {
            self.validate_member_call(class, info.type_id, name, MemberKind::Constructor, args)?;
            return body(self, this, args);
        }

        let def = self.interner.defs.class(class);
        let supertype = def.as_ref().and_then(|d| d.supertype);
        if def.as_ref().is_some_and(|d| d.is_mixin_application()) {
            if let Some(sup) = supertype {
                return self.run_constructor(sup, name, this, args);
            }
        }
        if name.is_empty() {
            if !args.is_empty() {
                return Err(NoSuchMethodError::mismatch(
                    self.render(info.type_id),
                    self.render(info.type_id),
                    InvocationKind::Constructor,
                    "the implicit default constructor takes no arguments",
                )
                .into());
            }
            return match supertype {
                Some(sup) => self.run_constructor(sup, "", this, &Args::none()),
                None => Ok(()),
            };
        }
        Err(NoSuchMethodError::missing(
            self.render(info.type_id),
            constructor_name(&self.render(info.type_id), name),
            InvocationKind::Constructor,
        )
        .into())
    }

    /// Explicit `super(...)` / `super.name(...)` from a constructor of
    /// `class`.
    pub fn super_construct(
        &self,
        class: TypeId,
        name: &str,
        this: &Value,
        args: &Args,
    ) -> Result<(), RuntimeError> {
        let id = self.class_of_type(class)?;
        match self.interner.defs.class(id).and_then(|d| d.supertype) {
            Some(sup) => self.run_constructor(sup, name, this, args),
            None => Ok(()),
        }
    }

    /// Store a field directly, bypassing setters and type checks. For
    /// constructor bodies that initialize their own fields.
    pub fn init_field(&self, this: &Value, name: &str, value: Value) {
        if let Value::Object(inst) = this {
            let atom = self.interner.intern_string(name);
            inst.fields.borrow_mut().insert(atom, value);
        }
    }

    /// Read a field directly, bypassing getters.
    pub fn read_field(&self, this: &Value, name: &str) -> Option<Value> {
        let inst = this.as_instance()?;
        let atom = self.interner.lookup_string(name)?;
        inst.fields.borrow().get(&atom).cloned()
    }
}

fn constructor_name(class: &str, name: &str) -> String {
    if name.is_empty() {
        class.to_string()
    } else {
        format!("{class}.{name}")
    }
}

#[cfg(test)]
#[path = "../tests/class_tests.rs"]
mod tests;
