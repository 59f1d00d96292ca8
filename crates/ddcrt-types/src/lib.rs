//! Reified Type Layer
//!
//! This crate implements the type side of the runtime:
//!
//! - **Interning**: `TypeData` structures become `TypeId` handles, so type
//!   identity is an integer compare and every canonical type has exactly one id
//! - **Definitions**: class, typedef and generic declaration facts
//! - **Subtyping**: nominal classes with reified type arguments, structural
//!   function types, coinductive cycle handling
//! - **Rendering and parsing** of display strings (`List<int>`,
//!   `(bool, [String]) => int`)
//!
//! Member implementations, instances and the generic instantiation cache live
//! in `ddcrt-runtime`, which plugs in through [`TypeEnvironment`].
pub mod def;
mod diagnostics;
mod environment;
mod errors;
mod format;
mod instantiate;
mod intern;
mod parse;
pub mod recursion;
mod subtype;
pub mod types;

pub use def::{ClassDef, CoreClassIds, DefinitionStore, GenericInfo, TypedefDef};
pub use diagnostics::{DiagnosticTracer, FastTracer, SubtypeFailureReason, SubtypeTracer};
pub use environment::TypeEnvironment;
pub use errors::ConfigurationError;
pub use format::TypeFormatter;
pub use instantiate::{
    TypeSubstitution, bind_type_params, instantiate_signature, instantiate_type,
    instantiate_type_with_env,
};
pub use intern::TypeInterner;
pub use parse::{ParseError, TypeNameResolver, TypeParser};
pub use subtype::{GenericVariance, SubtypeChecker, SubtypeOptions};
pub use types::*;

#[cfg(test)]
#[path = "../tests/fixtures.rs"]
pub(crate) mod fixtures;
