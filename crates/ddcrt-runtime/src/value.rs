//! Runtime values.
//!
//! Values are cheap to clone: heap entities sit behind `Rc`, so cloning a
//! `Value::Object` copies a reference, and identity is pointer identity.

use crate::error::RuntimeError;
use crate::runtime::Runtime;
use ddcrt_common::Atom;
use ddcrt_types::{ClassId, TypeId};
use indexmap::IndexMap;
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

/// Instance method: `(runtime, this, args)`.
pub type MethodFn = Rc<dyn Fn(&Runtime, &Value, &Args) -> Result<Value, RuntimeError>>;
pub type GetterFn = Rc<dyn Fn(&Runtime, &Value) -> Result<Value, RuntimeError>>;
pub type SetterFn = Rc<dyn Fn(&Runtime, &Value, Value) -> Result<(), RuntimeError>>;
/// Constructor body: initializes an already allocated `this`.
pub type ConstructorFn = Rc<dyn Fn(&Runtime, &Value, &Args) -> Result<(), RuntimeError>>;
/// Body of a function value.
pub type FunctionBody = Rc<dyn Fn(&Runtime, &Args) -> Result<Value, RuntimeError>>;

#[derive(Clone)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Double(f64),
    String(Rc<str>),
    Object(Rc<Instance>),
    Function(Rc<FunctionValue>),
    List(Rc<ListValue>),
    /// A reified type (`wrapType`).
    Type(TypeId),
}

impl Value {
    pub fn string(s: &str) -> Self {
        Value::String(Rc::from(s))
    }

    #[inline]
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_instance(&self) -> Option<&Rc<Instance>> {
        match self {
            Value::Object(inst) => Some(inst),
            _ => None,
        }
    }

    pub fn as_type(&self) -> Option<TypeId> {
        match self {
            Value::Type(t) => Some(*t),
            _ => None,
        }
    }

    /// `identical(a, b)`: pointer identity for heap entities, value equality
    /// for primitives and reified types.
    pub fn identical(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Double(a), Value::Double(b)) => a.to_bits() == b.to_bits(),
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Object(a), Value::Object(b)) => Rc::ptr_eq(a, b),
            (Value::Function(a), Value::Function(b)) => Rc::ptr_eq(a, b),
            (Value::List(a), Value::List(b)) => Rc::ptr_eq(a, b),
            (Value::Type(a), Value::Type(b)) => a == b,
            _ => false,
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Double(a), Value::Double(b)) => a == b,
            _ => self.identical(other),
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("null"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Int(i) => write!(f, "{i}"),
            Value::Double(d) => write!(f, "{d:?}"),
            Value::String(s) => write!(f, "{s:?}"),
            Value::Object(inst) => write!(f, "Instance(class #{})", inst.class.0),
            Value::Function(func) => match &func.name {
                Some(name) => write!(f, "Function({name})"),
                None => f.write_str("Function"),
            },
            Value::List(list) => f.debug_list().entries(list.items.borrow().iter()).finish(),
            Value::Type(t) => write!(f, "Type(#{})", t.0),
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<f64> for Value {
    fn from(d: f64) -> Self {
        Value::Double(d)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::string(s)
    }
}

/// An instance of a concrete class. Fields start out `null`.
pub struct Instance {
    pub(crate) class: ClassId,
    pub(crate) fields: RefCell<IndexMap<Atom, Value>>,
}

impl Instance {
    pub(crate) fn new(class: ClassId, fields: impl IntoIterator<Item = Atom>) -> Self {
        Self {
            class,
            fields: RefCell::new(fields.into_iter().map(|f| (f, Value::Null)).collect()),
        }
    }

    pub fn class(&self) -> ClassId {
        self.class
    }

    pub fn field_count(&self) -> usize {
        self.fields.borrow().len()
    }
}

/// A closure tagged with its reified function type (`dart.fn`).
pub struct FunctionValue {
    pub(crate) type_id: TypeId,
    pub(crate) body: FunctionBody,
    pub(crate) name: Option<Rc<str>>,
}

impl FunctionValue {
    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }
}

/// A reified `List<E>`.
pub struct ListValue {
    /// The `List<E>` class type.
    pub(crate) type_id: TypeId,
    pub(crate) element_type: TypeId,
    pub(crate) items: RefCell<Vec<Value>>,
}

impl ListValue {
    pub fn element_type(&self) -> TypeId {
        self.element_type
    }

    pub fn len(&self) -> usize {
        self.items.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.borrow().is_empty()
    }

    pub fn get(&self, index: usize) -> Option<Value> {
        self.items.borrow().get(index).cloned()
    }

    pub fn to_vec(&self) -> Vec<Value> {
        self.items.borrow().clone()
    }
}

/// Arguments of a call.
#[derive(Clone, Debug, Default)]
pub struct Args {
    pub type_args: Vec<TypeId>,
    pub positional: Vec<Value>,
    pub named: IndexMap<String, Value>,
}

impl Args {
    pub fn new(positional: Vec<Value>) -> Self {
        Self {
            positional,
            ..Self::default()
        }
    }

    pub fn none() -> Self {
        Self::default()
    }

    pub fn with_named(mut self, name: &str, value: Value) -> Self {
        self.named.insert(name.to_string(), value);
        self
    }

    pub fn with_type_args(mut self, type_args: Vec<TypeId>) -> Self {
        self.type_args = type_args;
        self
    }

    /// Positional argument `index`, or `null` if it was not passed.
    pub fn arg(&self, index: usize) -> Value {
        self.positional.get(index).cloned().unwrap_or(Value::Null)
    }

    /// Named argument `name`, or `null` if it was not passed.
    pub fn named(&self, name: &str) -> Value {
        self.named.get(name).cloned().unwrap_or(Value::Null)
    }

    pub fn type_arg(&self, index: usize) -> TypeId {
        self.type_args.get(index).copied().unwrap_or(TypeId::DYNAMIC)
    }

    pub fn is_empty(&self) -> bool {
        self.type_args.is_empty() && self.positional.is_empty() && self.named.is_empty()
    }
}

#[cfg(test)]
#[path = "../tests/value_tests.rs"]
mod tests;
