//! Runtime error taxonomy.
//!
//! `CastError`, `TypeError` and `NoSuchMethodError` are ordinary failures the
//! caller may recover from. Configuration errors are wrapped so they can travel
//! through value-level calls, but they still indicate a code-generation bug.
//! The runtime never logs any of these; surfacing them is the caller's job.

use ddcrt_types::{ConfigurationError, SubtypeFailureReason};
use std::fmt;

/// An explicit `as` failed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CastError {
    /// Rendered runtime type of the value.
    pub actual: String,
    /// Rendered target type.
    pub expected: String,
    /// First mismatch found by the subtype engine, if it could name one.
    pub reason: Option<SubtypeFailureReason>,
    /// Rendered form of `reason`.
    pub detail: Option<String>,
}

/// An implicit parameter, field or return check failed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TypeError {
    pub actual: String,
    pub expected: String,
    pub reason: Option<SubtypeFailureReason>,
    pub detail: Option<String>,
}

/// What a dynamic invocation tried to do.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum InvocationKind {
    Method,
    Getter,
    Setter,
    Constructor,
}

impl fmt::Display for InvocationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Method => "method",
            Self::Getter => "getter",
            Self::Setter => "setter",
            Self::Constructor => "constructor",
        };
        f.write_str(s)
    }
}

/// A dynamic invocation found no member, or its arguments do not fit the
/// member's registered signature.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NoSuchMethodError {
    /// Rendered runtime type of the receiver (`null` for the null value).
    pub receiver: String,
    pub member: String,
    pub kind: InvocationKind,
    /// Why an existing member rejected the call.
    pub message: Option<String>,
}

impl NoSuchMethodError {
    pub fn missing(receiver: impl Into<String>, member: impl Into<String>, kind: InvocationKind) -> Self {
        Self {
            receiver: receiver.into(),
            member: member.into(),
            kind,
            message: None,
        }
    }

    pub fn mismatch(
        receiver: impl Into<String>,
        member: impl Into<String>,
        kind: InvocationKind,
        message: impl Into<String>,
    ) -> Self {
        Self {
            receiver: receiver.into(),
            member: member.into(),
            kind,
            message: Some(message.into()),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RuntimeError {
    Cast(CastError),
    Type(TypeError),
    NoSuchMethod(NoSuchMethodError),
    /// A lazy static was read while its initializer was running.
    CyclicInitialization { name: String },
    Configuration(ConfigurationError),
}

impl RuntimeError {
    /// Whether user code is expected to catch this error.
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, Self::Configuration(_))
    }
}

impl fmt::Display for CastError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "CastError: Casting value of type '{}' to type '{}' failed",
            self.actual, self.expected
        )?;
        if let Some(detail) = &self.detail {
            write!(f, " ({detail})")?;
        }
        Ok(())
    }
}

impl fmt::Display for TypeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "TypeError: Expected a value of type '{}', but got one of type '{}'",
            self.expected, self.actual
        )?;
        if let Some(detail) = &self.detail {
            write!(f, " ({detail})")?;
        }
        Ok(())
    }
}

impl fmt::Display for NoSuchMethodError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.message {
            None => write!(
                f,
                "NoSuchMethodError: {} not found: '{}' on '{}'",
                self.kind, self.member, self.receiver
            ),
            Some(message) => write!(
                f,
                "NoSuchMethodError: {} '{}' on '{}': {message}",
                self.kind, self.member, self.receiver
            ),
        }
    }
}

impl fmt::Display for RuntimeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Cast(e) => e.fmt(f),
            Self::Type(e) => e.fmt(f),
            Self::NoSuchMethod(e) => e.fmt(f),
            Self::CyclicInitialization { name } => {
                write!(f, "cyclic initialization of lazy static '{name}'")
            }
            Self::Configuration(e) => write!(f, "configuration error: {e}"),
        }
    }
}

impl std::error::Error for CastError {}
impl std::error::Error for TypeError {}
impl std::error::Error for NoSuchMethodError {}

impl std::error::Error for RuntimeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Cast(e) => Some(e),
            Self::Type(e) => Some(e),
            Self::NoSuchMethod(e) => Some(e),
            Self::Configuration(e) => Some(e),
            Self::CyclicInitialization { .. } => None,
        }
    }
}

impl From<ConfigurationError> for RuntimeError {
    fn from(e: ConfigurationError) -> Self {
        Self::Configuration(e)
    }
}

impl From<CastError> for RuntimeError {
    fn from(e: CastError) -> Self {
        Self::Cast(e)
    }
}

impl From<TypeError> for RuntimeError {
    fn from(e: TypeError) -> Self {
        Self::Type(e)
    }
}

impl From<NoSuchMethodError> for RuntimeError {
    fn from(e: NoSuchMethodError) -> Self {
        Self::NoSuchMethod(e)
    }
}
