//! Hooks the type layer needs from the runtime that owns the generic builders.

use crate::errors::ConfigurationError;
use crate::types::{ClassId, GenericId, TypeId};

/// Access to runtime-owned facts during substitution and subtype checks.
pub trait TypeEnvironment {
    /// Instantiate `generic` with fully concrete arguments through the
    /// generic cache, returning the class or typedef type.
    fn instantiate_generic(
        &self,
        generic: GenericId,
        args: &[TypeId],
    ) -> Result<TypeId, ConfigurationError>;

    /// The reified type of a callable class's `call` method, if it has one.
    fn call_signature(&self, _class: ClassId) -> Option<TypeId> {
        None
    }
}
