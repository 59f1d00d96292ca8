//! Runtime configuration.

use ddcrt_common::limits::MAX_SUBTYPE_DEPTH;
use ddcrt_types::{GenericVariance, SubtypeOptions};
use serde::{Deserialize, Serialize};

/// Knobs that change how `is`/`as` decide, plus diagnostics switches.
///
/// Deserializes from camelCase JSON with every field optional:
///
/// ```json
/// { "genericVariance": "covariant", "requiredFillsOptional": false }
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RuntimeOptions {
    /// How type arguments of the same generic are compared.
    pub generic_variance: GenericVariance,
    /// Let a function's surplus required positional parameters satisfy the
    /// optional positional slots of a function type it is tested against.
    pub required_fills_optional: bool,
    pub max_subtype_depth: u32,
    /// Emit a `debug!` event for every generic cache miss.
    pub trace_instantiations: bool,
}

impl Default for RuntimeOptions {
    fn default() -> Self {
        Self {
            generic_variance: GenericVariance::Invariant,
            required_fills_optional: true,
            max_subtype_depth: MAX_SUBTYPE_DEPTH,
            trace_instantiations: false,
        }
    }
}

impl RuntimeOptions {
    pub fn subtype_options(&self) -> SubtypeOptions {
        SubtypeOptions {
            variance: self.generic_variance,
            required_fills_optional: self.required_fills_optional,
            max_depth: self.max_subtype_depth,
        }
    }
}

#[cfg(test)]
#[path = "../tests/options_tests.rs"]
mod tests;
