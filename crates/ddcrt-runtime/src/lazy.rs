//! Lazily initialized statics (`defineLazy`).
//!
//! A lazy static runs its initializer on first read and memoizes the
//! result. Reading it again while the initializer is still running is a
//! `CyclicInitialization` error. Writing before the first read skips the
//! initializer entirely. If the initializer fails, nothing is memoized and
//! the next read tries again.

use crate::error::{InvocationKind, NoSuchMethodError, RuntimeError, TypeError};
use crate::runtime::Runtime;
use crate::signature::MemberKind;
use crate::value::Value;
use ddcrt_types::{ConfigurationError, TypeId};
use once_cell::unsync::OnceCell;
use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;
use tracing::trace;

pub type LazyInit = Rc<dyn Fn(&Runtime) -> Result<Value, RuntimeError>>;

pub struct LazyStatic {
    name: String,
    init: LazyInit,
    value: OnceCell<RefCell<Value>>,
    initializing: Cell<bool>,
}

impl fmt::Debug for LazyStatic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LazyStatic")
            .field("name", &self.name)
            .field("initialized", &self.is_initialized())
            .finish()
    }
}

impl LazyStatic {
    pub fn new<F>(name: &str, init: F) -> Self
    where
        F: Fn(&Runtime) -> Result<Value, RuntimeError> + 'static,
    {
        Self {
            name: name.to_string(),
            init: Rc::new(init),
            value: OnceCell::new(),
            initializing: Cell::new(false),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_initialized(&self) -> bool {
        self.value.get().is_some()
    }

    pub fn get(&self, rt: &Runtime) -> Result<Value, RuntimeError> {
        if let Some(cell) = self.value.get() {
            return Ok(cell.borrow().clone());
        }
        if self.initializing.get() {
            return Err(RuntimeError::CyclicInitialization {
                name: self.name.clone(),
            });
        }

        trace!(name = %self.name, "lazy static: initialize");
        self.initializing.set(true);
        let result = (self.init)(rt);
        self.initializing.set(false);

        let value = result?;
        // An assignment made while the initializer ran wins.
        let cell = self.value.get_or_init(|| RefCell::new(value));
        Ok(cell.borrow().clone())
    }

    pub fn set(&self, value: Value) {
        match self.value.get() {
            Some(cell) => *cell.borrow_mut() = value,
            None => {
                let _ = self.value.set(RefCell::new(value));
            }
        }
    }
}

impl Runtime {
    /// Define a lazy static on `class`.
    pub fn define_lazy<F>(
        &self,
        class: TypeId,
        name: &str,
        init: F,
    ) -> Result<Rc<LazyStatic>, ConfigurationError>
    where
        F: Fn(&Runtime) -> Result<Value, RuntimeError> + 'static,
    {
        let id = self.class_of_type(class)?;
        let lazy = Rc::new(LazyStatic::new(name, init));
        if let Some(info) = self.class_info(id) {
            info.statics
                .borrow_mut()
                .insert(name.to_string(), lazy.clone());
        }
        Ok(lazy)
    }

    fn static_slot(&self, class: TypeId, name: &str) -> Result<Rc<LazyStatic>, RuntimeError> {
        let id = self.class_of_type(class)?;
        self.class_info(id)
            .and_then(|info| info.statics.borrow().get(name).cloned())
            .ok_or_else(|| {
                NoSuchMethodError::missing(self.render(class), name, InvocationKind::Getter).into()
            })
    }

    /// Read the static `name` of `class`, initializing it on first read.
    pub fn get_static(&self, class: TypeId, name: &str) -> Result<Value, RuntimeError> {
        let slot = self.static_slot(class, name)?;
        slot.get(self)
    }

    /// Assign the static `name` of `class`, checked against its declared
    /// type.
    pub fn set_static(&self, class: TypeId, name: &str, value: Value) -> Result<(), RuntimeError> {
        let slot = self.static_slot(class, name)?;
        let id = self.class_of_type(class)?;
        if let Some(declared) = self.lookup_member_type(id, name, MemberKind::Static)?
            && !self.accepts(&value, declared)
        {
            return Err(TypeError {
                actual: self.render(self.runtime_type(&value)),
                expected: self.render(declared),
                reason: None,
                detail: Some(format!("assignment to static '{name}'")),
            }
            .into());
        }
        slot.set(value);
        Ok(())
    }
}

#[cfg(test)]
#[path = "../tests/lazy_tests.rs"]
mod tests;
