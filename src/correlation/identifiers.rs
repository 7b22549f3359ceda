// src/correlation/identifiers.rs
// External id -> session token bindings (bind once, never rebind)

use std::collections::HashMap;
use std::collections::hash_map::Entry;

use super::types::{ExternalId, SessionToken};

#[derive(Debug, Default)]
pub struct IdentifierMap {
    bindings: HashMap<ExternalId, SessionToken>,
}

impl IdentifierMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: &ExternalId) -> Option<&SessionToken> {
        self.bindings.get(id)
    }

    /// Bind `id` to `token` unless it is already bound.
    ///
    /// Returns the token the id resolves to afterwards; an existing binding
    /// always wins over the proposed one.
    pub fn bind(&mut self, id: ExternalId, token: SessionToken) -> SessionToken {
        match self.bindings.entry(id) {
            Entry::Occupied(existing) => existing.get().clone(),
            Entry::Vacant(slot) => slot.insert(token).clone(),
        }
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}
