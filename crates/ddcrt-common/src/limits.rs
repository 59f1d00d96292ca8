//! Centralized limits and thresholds for the type runtime.
//!
//! Recursion limits for the subtype engine are exposed through
//! `ddcrt_types::recursion::RecursionProfile`, which reads its defaults from
//! here so the values live in one place.

/// Maximum nesting depth of the subtype relation.
///
/// Deeply nested function types (`(((int) => int) => int) => ...`) or long
/// chains of generic arguments each add one level. The check bails out with
/// `SubtypeFailureReason::RecursionLimitExceeded` beyond this depth.
pub const MAX_SUBTYPE_DEPTH: u32 = 100;

/// Maximum number of subtype steps performed by a single top-level query.
pub const MAX_SUBTYPE_ITERATIONS: u32 = 100_000;

/// Maximum depth of nested generic instantiation.
///
/// A builder for `C<T>` may instantiate other generics (`List<Set<T>>`) which in
/// turn run their builders. A chain deeper than this is treated as runaway
/// instantiation (`C<T>` building `C<List<T>>` building `C<List<List<T>>>` ...).
pub const MAX_INSTANTIATION_DEPTH: u32 = 50;

/// Maximum number of inheritance links walked when searching a class's
/// supertypes. Guards against a malformed (cyclic) hierarchy.
pub const MAX_HIERARCHY_WALK: usize = 10_000;

/// Inline capacity for type argument lists. Almost every generic in practice
/// has one or two parameters.
pub const TYPE_ARGS_INLINE: usize = 4;
