//! ddcrt: reified generics, subtype tests and lazy class signatures for
//! code compiled from Dart.
//!
//! The runtime itself lives in [`ddcrt_runtime`] and is re-exported here.
//! This crate adds the JSON [`manifest`] format and the `ddcrt` command
//! line tool built on it.

pub use ddcrt_runtime::*;

pub mod cli;
pub mod manifest;
pub mod tracing_config;
