//! Generic instantiation cache.
//!
//! Keys pair a generic declaration with its interned, canonicalized argument
//! list. Since type arguments are interned, two structurally equal argument
//! tuples requested from different call sites produce the same key.

use ddcrt_common::limits::MAX_INSTANTIATION_DEPTH;
use ddcrt_types::{GenericId, TypeId, TypeListId};
use rustc_hash::FxHashMap;
use std::cell::{Cell, RefCell};
use tracing::trace;

/// Cache key of one instantiation.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct TypeKey {
    pub generic: GenericId,
    pub args: TypeListId,
}

/// Why a build could not start.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) enum BuildConflict {
    /// The key is already being built further up the stack.
    Cycle,
    /// Too many nested builds are in flight.
    TooDeep,
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub entries: usize,
    pub hits: u64,
    pub misses: u64,
}

#[derive(Default)]
pub struct InstantiationCache {
    entries: RefCell<FxHashMap<TypeKey, TypeId>>,
    in_progress: RefCell<Vec<TypeKey>>,
    hits: Cell<u64>,
    misses: Cell<u64>,
}

impl InstantiationCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &TypeKey) -> Option<TypeId> {
        let found = self.entries.borrow().get(key).copied();
        match found {
            Some(_) => self.hits.set(self.hits.get() + 1),
            None => self.misses.set(self.misses.get() + 1),
        }
        found
    }

    /// Look up without touching the hit counters.
    pub fn peek(&self, key: &TypeKey) -> Option<TypeId> {
        self.entries.borrow().get(key).copied()
    }

    pub(crate) fn insert(&self, key: TypeKey, value: TypeId) {
        let previous = self.entries.borrow_mut().insert(key, value);
        debug_assert!(previous.is_none(), "instantiation {key:?} built twice");
    }

    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            entries: self.len(),
            hits: self.hits.get(),
            misses: self.misses.get(),
        }
    }

    /// Number of builds currently running.
    pub fn build_depth(&self) -> usize {
        self.in_progress.borrow().len()
    }

    /// Mark `key` as being built. The returned scope unmarks it on drop, so a
    /// failing builder does not leave the key poisoned.
    pub(crate) fn begin_build(&self, key: TypeKey) -> Result<BuildScope<'_>, BuildConflict> {
        let mut in_progress = self.in_progress.borrow_mut();
        if in_progress.contains(&key) {
            return Err(BuildConflict::Cycle);
        }
        if in_progress.len() >= MAX_INSTANTIATION_DEPTH as usize {
            return Err(BuildConflict::TooDeep);
        }
        in_progress.push(key);
        trace!(
            generic = key.generic.0,
            args = key.args.0,
            depth = in_progress.len(),
            "begin_build"
        );
        Ok(BuildScope { cache: self, key })
    }
}

pub(crate) struct BuildScope<'a> {
    cache: &'a InstantiationCache,
    key: TypeKey,
}

impl Drop for BuildScope<'_> {
    fn drop(&mut self) {
        let mut in_progress = self.cache.in_progress.borrow_mut();
        // Builds nest strictly, so the key is on top.
        if let Some(pos) = in_progress.iter().rposition(|k| *k == self.key) {
            in_progress.remove(pos);
        }
    }
}

#[cfg(test)]
#[path = "../tests/cache_tests.rs"]
mod tests;
