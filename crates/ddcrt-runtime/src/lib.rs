//! Runtime Object Model
//!
//! The services compiled Dart code calls at run time:
//!
//! - **Generic class factory**: `generic(name, params, builder)` plus a
//!   cache keyed by canonical type arguments, so `List<int>` is built once
//! - **Classes and mixins**: flat provider lists, constructors, mixin
//!   application links
//! - **Lazy signatures**: member types attached as thunks and evaluated on
//!   first query
//! - **Type tests**: `is`, `as` and `_check` on values, backed by the
//!   subtype engine in `ddcrt-types`
//! - **Dynamic dispatch**: `dsend`, `dget`, `dput`, `dcall` with argument
//!   validation and `noSuchMethod`
//! - **Lazy statics**, function values and generic function binding
//!
//! Everything hangs off one [`Runtime`] value.

mod cache;
mod class;
mod core;
mod dispatch;
mod error;
mod function;
mod generic;
mod lazy;
mod mixin;
mod options;
mod runtime;
mod signature;
mod type_tests;
mod value;

pub use cache::{CacheStats, InstantiationCache, TypeKey};
pub use class::ClassBuilder;
pub use crate::core::CoreTypes;
pub use dispatch::{DynamicDispatchable, Invocation};
pub use error::{CastError, InvocationKind, NoSuchMethodError, RuntimeError, TypeError};
pub use generic::{ClassBuildFn, TypedefBuildFn};
pub use lazy::{LazyInit, LazyStatic};
pub use options::RuntimeOptions;
pub use runtime::Runtime;
pub use signature::{ClassSignature, MemberKind, SignatureThunk};
pub use type_tests::TypeTestMode;
pub use value::{
    Args, ConstructorFn, FunctionBody, FunctionValue, GetterFn, Instance, ListValue, MethodFn,
    SetterFn, Value,
};

pub use ddcrt_types as types;
