//! Common types and utilities for the ddcrt type runtime.
//!
//! This crate provides foundational types used across all ddcrt crates:
//! - String interning (`Atom`, `Interner`)
//! - Runtime limits and thresholds

// String interning for member and type names
pub mod interner;
pub use interner::{Atom, Interner};

// Centralized limits and thresholds
pub mod limits;
