//! Per-adapter identifier table between element stable ids and a backend's
//! native object ids.
//!
//! Built once after model load ([`IdentifierMap::rebuild`]) and cleared on
//! dispose. Each adapter instance owns its own table.

use std::collections::HashMap;
use std::hash::Hash;

use crate::models::ElementId;

#[derive(Debug, Clone)]
pub struct IdentifierMap<N> {
    to_native: HashMap<ElementId, N>,
    to_stable: HashMap<N, ElementId>,
}

impl<N> Default for IdentifierMap<N> {
    fn default() -> Self {
        Self {
            to_native: HashMap::new(),
            to_stable: HashMap::new(),
        }
    }
}

impl<N: Clone + Eq + Hash> IdentifierMap<N> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the table with `pairs`. Returns the number of mapped elements.
    ///
    /// A stable id listed twice keeps its first native id.
    pub fn rebuild<I>(&mut self, pairs: I) -> usize
    where
        I: IntoIterator<Item = (ElementId, N)>,
    {
        self.clear();
        for (stable, native) in pairs {
            if self.to_native.contains_key(&stable) {
                log::debug!("Stable id {} mapped twice; keeping first native id", stable);
                continue;
            }
            self.to_stable.insert(native.clone(), stable.clone());
            self.to_native.insert(stable, native);
        }
        self.to_native.len()
    }

    pub fn clear(&mut self) {
        self.to_native.clear();
        self.to_stable.clear();
    }

    pub fn native(&self, id: &ElementId) -> Option<&N> {
        self.to_native.get(id)
    }

    pub fn stable(&self, native: &N) -> Option<&ElementId> {
        self.to_stable.get(native)
    }

    /// Resolve `ids` in order, splitting them into native ids and unresolved stable ids.
    pub fn resolve(&self, ids: &[ElementId]) -> (Vec<N>, Vec<ElementId>) {
        let mut resolved = Vec::with_capacity(ids.len());
        let mut skipped = Vec::new();
        for id in ids {
            match self.to_native.get(id) {
                Some(native) => resolved.push(native.clone()),
                None => skipped.push(id.clone()),
            }
        }
        (resolved, skipped)
    }

    /// Every mapped native id (unordered).
    pub fn natives(&self) -> impl Iterator<Item = &N> + '_ {
        self.to_native.values()
    }

    pub fn len(&self) -> usize {
        self.to_native.len()
    }

    pub fn is_empty(&self) -> bool {
        self.to_native.is_empty()
    }
}
