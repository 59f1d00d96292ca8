//! Failure diagnostics for the subtype engine.
//!
//! ## Tracer Pattern
//!
//! The same subtype checking logic serves both fast boolean checks (`is`) and
//! detailed failure reporting (`as` / `check` errors).
//!
//! - **FastTracer**: compiles to a plain `return false`
//! - **DiagnosticTracer**: records a `SubtypeFailureReason` chain
//!
//! Failure reasons are built lazily through a closure, so `FastTracer` never
//! allocates.

use crate::format::TypeFormatter;
use crate::intern::TypeInterner;
use crate::types::TypeId;
use ddcrt_common::Atom;

/// A trait for tracing subtype check failures.
pub trait SubtypeTracer {
    /// Called when a subtype mismatch is detected.
    ///
    /// Returns `true` if checking should continue, `false` to stop.
    fn on_mismatch(&mut self, reason: impl FnOnce() -> SubtypeFailureReason) -> bool;

    /// Forget mismatches recorded by an alternative that was abandoned
    /// because a later alternative succeeded.
    #[inline(always)]
    fn discard(&mut self) {}
}

/// Fast tracer that returns immediately on mismatch.
#[derive(Clone, Copy, Debug, Default)]
pub struct FastTracer;

impl SubtypeTracer for FastTracer {
    #[inline(always)]
    fn on_mismatch(&mut self, _reason: impl FnOnce() -> SubtypeFailureReason) -> bool {
        false
    }
}

/// Diagnostic tracer that collects failure reasons.
///
/// Mismatches are reported innermost first (a parameter type mismatch is found
/// before the enclosing function comparison gives up). Each outer reason that
/// can carry a nested reason wraps the one recorded so far, so the final value
/// reads outermost first.
#[derive(Debug, Default)]
pub struct DiagnosticTracer {
    failure: Option<SubtypeFailureReason>,
}

impl DiagnosticTracer {
    pub fn new() -> Self {
        Self { failure: None }
    }

    pub fn take_failure(&mut self) -> Option<SubtypeFailureReason> {
        self.failure.take()
    }

    pub fn get_failure(&self) -> Option<&SubtypeFailureReason> {
        self.failure.as_ref()
    }

    pub fn has_failure(&self) -> bool {
        self.failure.is_some()
    }
}

impl SubtypeTracer for DiagnosticTracer {
    #[inline]
    fn on_mismatch(&mut self, reason: impl FnOnce() -> SubtypeFailureReason) -> bool {
        let outer = reason();
        self.failure = Some(match self.failure.take() {
            None => outer,
            Some(inner) => outer.wrap(inner),
        });
        false
    }

    fn discard(&mut self) {
        self.failure = None;
    }
}

/// Detailed reason for a subtype check failure.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SubtypeFailureReason {
    /// No more specific reason (e.g. `void` against a class).
    TypeMismatch {
        source_type: TypeId,
        target_type: TypeId,
    },
    /// The source class does not have the target's class in its hierarchy.
    NotASubclass {
        source_type: TypeId,
        target_type: TypeId,
    },
    /// Same generic declaration, incompatible type argument.
    TypeArgumentMismatch {
        index: usize,
        source_arg: TypeId,
        target_arg: TypeId,
        nested_reason: Option<Box<SubtypeFailureReason>>,
    },
    ReturnTypeMismatch {
        source_return: TypeId,
        target_return: TypeId,
        nested_reason: Option<Box<SubtypeFailureReason>>,
    },
    /// A positional parameter of the target is not assignable to the source's.
    ParameterTypeMismatch {
        param_index: usize,
        source_param: TypeId,
        target_param: TypeId,
        nested_reason: Option<Box<SubtypeFailureReason>>,
    },
    NamedParameterTypeMismatch {
        name: Atom,
        source_param: TypeId,
        target_param: TypeId,
        nested_reason: Option<Box<SubtypeFailureReason>>,
    },
    /// The target accepts a named parameter the source does not declare.
    MissingNamedParameter { name: Atom },
    /// The source accepts fewer positional parameters than the target passes.
    TooFewOptionalParameters {
        source_count: usize,
        target_count: usize,
    },
    /// One side takes optional positional parameters and the other takes
    /// named parameters.
    ParameterKindMismatch { source_named: bool },
    /// The source requires more positional arguments than the target guarantees.
    TooManyRequired {
        source_count: usize,
        target_count: usize,
    },
    TypeParameterCountMismatch {
        source_count: usize,
        target_count: usize,
    },
    /// A bound of the target's type parameter is not assignable to the source's.
    TypeParameterBoundMismatch {
        index: usize,
        source_bound: TypeId,
        target_bound: TypeId,
    },
    RecursionLimitExceeded,
}

impl SubtypeFailureReason {
    /// Attach `inner` as the nested reason if this variant carries one.
    /// Variants without a nested slot keep the more specific inner reason.
    fn wrap(self, inner: SubtypeFailureReason) -> SubtypeFailureReason {
        match self {
            Self::TypeArgumentMismatch {
                index,
                source_arg,
                target_arg,
                nested_reason: None,
            } => Self::TypeArgumentMismatch {
                index,
                source_arg,
                target_arg,
                nested_reason: Some(Box::new(inner)),
            },
            Self::ReturnTypeMismatch {
                source_return,
                target_return,
                nested_reason: None,
            } => Self::ReturnTypeMismatch {
                source_return,
                target_return,
                nested_reason: Some(Box::new(inner)),
            },
            Self::ParameterTypeMismatch {
                param_index,
                source_param,
                target_param,
                nested_reason: None,
            } => Self::ParameterTypeMismatch {
                param_index,
                source_param,
                target_param,
                nested_reason: Some(Box::new(inner)),
            },
            Self::NamedParameterTypeMismatch {
                name,
                source_param,
                target_param,
                nested_reason: None,
            } => Self::NamedParameterTypeMismatch {
                name,
                source_param,
                target_param,
                nested_reason: Some(Box::new(inner)),
            },
            _ => inner,
        }
    }

    pub fn nested(&self) -> Option<&SubtypeFailureReason> {
        match self {
            Self::TypeArgumentMismatch { nested_reason, .. }
            | Self::ReturnTypeMismatch { nested_reason, .. }
            | Self::ParameterTypeMismatch { nested_reason, .. }
            | Self::NamedParameterTypeMismatch { nested_reason, .. } => nested_reason.as_deref(),
            _ => None,
        }
    }

    /// Render the reason chain as a single line, outermost first.
    pub fn render(&self, interner: &TypeInterner) -> String {
        let fmt = TypeFormatter::new(interner);
        let mut parts = Vec::new();
        let mut current = Some(self);
        while let Some(reason) = current {
            parts.push(reason.render_one(&fmt, interner));
            current = reason.nested();
        }
        parts.join(": ")
    }

    fn render_one(&self, fmt: &TypeFormatter<'_>, interner: &TypeInterner) -> String {
        match self {
            Self::TypeMismatch {
                source_type,
                target_type,
            } => format!(
                "'{}' is not a subtype of '{}'",
                fmt.format(*source_type),
                fmt.format(*target_type)
            ),
            Self::NotASubclass {
                source_type,
                target_type,
            } => format!(
                "'{}' does not extend, mix in or implement '{}'",
                fmt.format(*source_type),
                fmt.format(*target_type)
            ),
            Self::TypeArgumentMismatch {
                index,
                source_arg,
                target_arg,
                ..
            } => format!(
                "type argument {} '{}' is incompatible with '{}'",
                index,
                fmt.format(*source_arg),
                fmt.format(*target_arg)
            ),
            Self::ReturnTypeMismatch {
                source_return,
                target_return,
                ..
            } => format!(
                "return type '{}' is not a subtype of '{}'",
                fmt.format(*source_return),
                fmt.format(*target_return)
            ),
            Self::ParameterTypeMismatch {
                param_index,
                source_param,
                target_param,
                ..
            } => format!(
                "parameter {} of type '{}' does not accept '{}'",
                param_index,
                fmt.format(*source_param),
                fmt.format(*target_param)
            ),
            Self::NamedParameterTypeMismatch {
                name,
                source_param,
                target_param,
                ..
            } => format!(
                "named parameter '{}' of type '{}' does not accept '{}'",
                interner.resolve_atom(*name),
                fmt.format(*source_param),
                fmt.format(*target_param)
            ),
            Self::MissingNamedParameter { name } => {
                format!("missing named parameter '{}'", interner.resolve_atom(*name))
            }
            Self::TooFewOptionalParameters {
                source_count,
                target_count,
            } => format!(
                "accepts {source_count} positional parameter(s) but {target_count} may be passed"
            ),
            Self::ParameterKindMismatch { source_named } => {
                let (source_kind, target_kind) = if *source_named {
                    ("named", "optional positional")
                } else {
                    ("optional positional", "named")
                };
                format!("takes {source_kind} parameters where {target_kind} parameters are expected")
            }
            Self::TooManyRequired {
                source_count,
                target_count,
            } => format!(
                "requires {source_count} positional parameter(s) but only {target_count} are guaranteed"
            ),
            Self::TypeParameterCountMismatch {
                source_count,
                target_count,
            } => format!("declares {source_count} type parameter(s), expected {target_count}"),
            Self::TypeParameterBoundMismatch {
                index,
                source_bound,
                target_bound,
            } => format!(
                "bound '{}' of type parameter {} does not accept '{}'",
                fmt.format(*source_bound),
                index,
                fmt.format(*target_bound)
            ),
            Self::RecursionLimitExceeded => "type is too deeply nested to compare".to_string(),
        }
    }
}

#[cfg(test)]
#[path = "../tests/diagnostics_tests.rs"]
mod tests;
