//! Core library bootstrap.
//!
//! Defines the classes every program relies on: `Object`, `Null`, `bool`,
//! `num`, `int`, `double`, `String`, `Function`, `Type` and the generics
//! `Iterable<E>`, `List<E>` and `Map<K, V>`. Primitive values dispatch to
//! these classes.

use crate::class::ClassBuilder;
use crate::error::{InvocationKind, NoSuchMethodError, RuntimeError};
use crate::runtime::Runtime;
use crate::signature::ClassSignature;
use crate::value::{Args, ListValue, Value};
use ddcrt_types::{
    ClassFlags, ConfigurationError, CoreClassIds, FunctionShape, GenericId, TypeId,
};
use std::cell::RefCell;
use std::rc::Rc;
use tracing::debug;

/// Handles of the core classes and generics.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct CoreTypes {
    pub object: TypeId,
    pub null: TypeId,
    pub bool_: TypeId,
    pub num: TypeId,
    pub int: TypeId,
    pub double: TypeId,
    pub string: TypeId,
    pub function: TypeId,
    pub type_: TypeId,
    pub iterable: GenericId,
    pub list: GenericId,
    pub map: GenericId,
}

impl CoreTypes {
    /// Placeholder until [`bootstrap`] has run.
    pub(crate) const UNSET: CoreTypes = CoreTypes {
        object: TypeId::DYNAMIC,
        null: TypeId::DYNAMIC,
        bool_: TypeId::DYNAMIC,
        num: TypeId::DYNAMIC,
        int: TypeId::DYNAMIC,
        double: TypeId::DYNAMIC,
        string: TypeId::DYNAMIC,
        function: TypeId::DYNAMIC,
        type_: TypeId::DYNAMIC,
        iterable: GenericId(u32::MAX),
        list: GenericId(u32::MAX),
        map: GenericId(u32::MAX),
    };
}

fn core_class(rt: &Runtime, mut builder: ClassBuilder, supertype: Option<TypeId>) -> TypeId {
    builder.flags |= ClassFlags::CORE;
    let supertype = supertype.and_then(|t| rt.interner.as_class(t));
    rt.install_class(builder, supertype, Vec::new(), Vec::new())
}

pub(crate) fn bootstrap(rt: &Runtime) -> CoreTypes {
    let object = core_class(
        rt,
        rt.class_builder("Object")
            .method("toString", |rt, this, _| {
                Ok(Value::string(&rt.default_display(this)))
            })
            .getter("runtimeType", |rt, this| {
                Ok(rt.wrap_type(rt.runtime_type(this)))
            }),
        None,
    );
    let plain =
        |name: &str, supertype: TypeId| core_class(rt, rt.class_builder(name), Some(supertype));
    let null = plain("Null", object);
    let bool_ = plain("bool", object);
    let num = plain("num", object);
    let int = plain("int", num);
    let double = plain("double", num);
    let function = plain("Function", object);
    let type_ = plain("Type", object);
    let string = core_class(
        rt,
        rt.class_builder("String").getter("length", |_, this| {
            let len = this.as_str().map_or(0, |s| s.encode_utf16().count());
            Ok(Value::Int(len as i64))
        }),
        Some(object),
    );

    if let (Some(object), Some(null), Some(function)) = (
        rt.interner.as_class(object),
        rt.interner.as_class(null),
        rt.interner.as_class(function),
    ) {
        rt.interner.defs.set_core(CoreClassIds {
            object,
            null,
            function,
        });
    }

    if let Some(id) = rt.interner.as_class(object) {
        rt.attach_signature(
            id,
            Rc::new(move |rt: &Runtime| {
                Ok(ClassSignature::new()
                    .with_method(
                        "toString",
                        rt.interner.function(FunctionShape::new(string, vec![])),
                    )
                    .with_getter("runtimeType", type_))
            }),
        );
    }

    let iterable = rt.generic("Iterable", &["E"], |_, class, _| Ok(class.abstract_class()));
    let list = rt.generic("List", &["E"], move |rt, class, args| {
        list_class(rt, class, iterable, args)
    });
    let map = rt.generic("Map", &["K", "V"], |_, class, _| Ok(class));

    debug!(classes = rt.interner.defs.class_count(), "core library bootstrapped");
    CoreTypes {
        object,
        null,
        bool_,
        num,
        int,
        double,
        string,
        function,
        type_,
        iterable,
        list,
        map,
    }
}

fn list_of(rt: &Runtime, this: &Value) -> Result<Rc<ListValue>, RuntimeError> {
    match this {
        Value::List(list) => Ok(list.clone()),
        other => Err(NoSuchMethodError::mismatch(
            rt.render(rt.runtime_type(other)),
            "List",
            InvocationKind::Method,
            "receiver is not a list",
        )
        .into()),
    }
}

fn list_class(
    rt: &Runtime,
    class: ClassBuilder,
    iterable: GenericId,
    args: &[TypeId],
) -> Result<ClassBuilder, ConfigurationError> {
    let element = args.first().copied().unwrap_or(TypeId::DYNAMIC);
    let iterable_e = rt.instantiate(iterable, &[element])?;
    Ok(class
        .implements(iterable_e)
        .getter("length", |rt, this| {
            Ok(Value::Int(list_of(rt, this)?.len() as i64))
        })
        .method("add", |rt, this, args| {
            let list = list_of(rt, this)?;
            let value = rt.check(&args.arg(0), list.element_type)?;
            list.items.borrow_mut().push(value);
            Ok(Value::Null)
        })
        .method("[]", |rt, this, args| {
            let list = list_of(rt, this)?;
            let index = args.arg(0).as_int().unwrap_or(-1);
            usize::try_from(index)
                .ok()
                .and_then(|i| list.get(i))
                .ok_or_else(|| {
                    NoSuchMethodError::mismatch(
                        rt.render(list.type_id),
                        "[]",
                        InvocationKind::Method,
                        format!("index {index} out of range"),
                    )
                    .into()
                })
        })
        .signature(move |rt| {
            let int = rt.core.int;
            Ok(ClassSignature::new()
                .with_getter("length", int)
                .with_method(
                    "add",
                    rt.interner.function(FunctionShape::new(TypeId::VOID, vec![element])),
                )
                .with_method(
                    "[]",
                    rt.interner.function(FunctionShape::new(element, vec![int])),
                ))
        }))
}

impl Runtime {
    /// A `List<element_type>` holding `items`, each checked against the
    /// element type.
    pub fn list(&self, element_type: TypeId, items: Vec<Value>) -> Result<Value, RuntimeError> {
        let type_id = self.instantiate(self.core.list, &[element_type])?;
        for item in &items {
            self.check(item, element_type)?;
        }
        Ok(Value::List(Rc::new(ListValue {
            type_id,
            element_type,
            items: RefCell::new(items),
        })))
    }

    /// `Object.toString` for values without an override.
    pub(crate) fn default_display(&self, value: &Value) -> String {
        match value {
            Value::Null => "null".to_string(),
            Value::Bool(b) => b.to_string(),
            Value::Int(i) => i.to_string(),
            Value::Double(d) => format!("{d:?}"),
            Value::String(s) => s.to_string(),
            Value::Type(t) => self.render(*t),
            Value::Object(_) => format!("Instance of '{}'", self.render(self.runtime_type(value))),
            Value::Function(func) => format!("Closure: {}", self.render(func.type_id)),
            Value::List(list) => {
                let items: Vec<String> = list
                    .to_vec()
                    .iter()
                    .map(|item| {
                        self.display_string(item)
                            .unwrap_or_else(|_| self.default_display(item))
                    })
                    .collect();
                format!("[{}]", items.join(", "))
            }
        }
    }

    /// `value.toString()` through dynamic dispatch.
    pub fn display_string(&self, value: &Value) -> Result<String, RuntimeError> {
        if value.is_null() {
            return Ok("null".to_string());
        }
        Ok(match self.dsend(value, "toString", &Args::none())? {
            Value::String(s) => s.to_string(),
            other => self.default_display(&other),
        })
    }
}

#[cfg(test)]
#[path = "../tests/core_tests.rs"]
mod tests;
