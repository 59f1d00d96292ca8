//! Configuration errors.
//!
//! These signal a code-generation bug upstream (wrong arity, cyclic
//! instantiation). They abort the enclosing module evaluation and are not meant
//! to be caught by user code. Names are rendered when the error is created so
//! the error can be displayed without access to the interner.

use std::fmt;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ConfigurationError {
    /// A generic declaration was applied to the wrong number of type arguments.
    ArityMismatch {
        generic: String,
        expected: usize,
        actual: usize,
    },
    /// A generic builder synchronously requested its own instantiation.
    CyclicInstantiation { generic: String, args: String },
    /// Nested instantiation exceeded `MAX_INSTANTIATION_DEPTH`.
    InstantiationTooDeep { generic: String, depth: u32 },
    /// A lazy signature thunk queried its own signature.
    CyclicSignature { class: String },
    /// `add_simple_type_tests` on a class that instantiates a generic.
    SimpleTypeTestsOnGeneric { class: String },
    /// A name used in a type expression does not denote a class, generic or typedef.
    UnknownType { name: String },
    /// A type expression names something that is not a class where a class is required.
    NotAClass { name: String },
    /// A type expression could not be parsed.
    InvalidTypeExpression { expression: String, message: String },
    /// A function shape declares both optional positional and named parameters.
    MixedParameterKinds { optional: usize, named: usize },
}

impl fmt::Display for ConfigurationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ArityMismatch {
                generic,
                expected,
                actual,
            } => write!(
                f,
                "generic '{generic}' expects {expected} type argument(s) but got {actual}"
            ),
            Self::CyclicInstantiation { generic, args } => write!(
                f,
                "cyclic instantiation of '{generic}<{args}>' during its own construction"
            ),
            Self::InstantiationTooDeep { generic, depth } => write!(
                f,
                "instantiation of '{generic}' exceeded the maximum nesting depth of {depth}"
            ),
            Self::CyclicSignature { class } => {
                write!(f, "signature of '{class}' requested while it is being computed")
            }
            Self::SimpleTypeTestsOnGeneric { class } => write!(
                f,
                "simple type tests cannot be installed on generic class '{class}'"
            ),
            Self::UnknownType { name } => write!(f, "unknown type '{name}'"),
            Self::NotAClass { name } => write!(f, "'{name}' is not a class"),
            Self::InvalidTypeExpression {
                expression,
                message,
            } => write!(f, "invalid type expression '{expression}': {message}"),
            Self::MixedParameterKinds { optional, named } => write!(
                f,
                "function type declares {optional} optional positional and {named} named \
                 parameter(s); it may declare only one kind"
            ),
        }
    }
}

impl std::error::Error for ConfigurationError {}
